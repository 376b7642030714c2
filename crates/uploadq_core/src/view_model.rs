use crate::{Precedence, RowId, StoreRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueStatus {
    /// Neither source has answered yet.
    #[default]
    Connecting,
    /// The device stopped answering and nothing is known to be pending.
    DeviceOffline,
    Empty,
    Populated,
}

impl QueueStatus {
    /// Placeholder text shown instead of the list; `None` when populated.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            QueueStatus::Connecting => Some("Waiting for device to connect..."),
            QueueStatus::DeviceOffline => Some("Device offline"),
            QueueStatus::Empty => Some("Nothing to upload"),
            QueueStatus::Populated => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueueViewModel {
    pub status: QueueStatus,
    pub queued: usize,
    pub rows: Vec<UploadRowView>,
    pub source: Precedence,
    pub revision: u64,
    pub malformed_items: usize,
}

impl QueueViewModel {
    pub fn row_for_upload(&self, id: &str) -> Option<&UploadRowView> {
        self.rows.iter().find(|row| !row.id.is_empty() && row.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelIcon {
    Priority,
    Standard,
}

/// What sits at the right edge of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTrailing {
    Percent(u32),
    /// Not yet acknowledged by the device.
    Offline,
    /// Acknowledged but not started; the only state that offers cancel-one.
    CancelButton,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadRowView {
    pub row_id: RowId,
    pub id: String,
    pub label: String,
    pub icon: ChannelIcon,
    pub trailing: RowTrailing,
    pub progress: f64,
    pub complete: bool,
    pub created_at: u64,
    pub retry_count: u32,
    pub current: bool,
}

impl UploadRowView {
    pub(crate) fn from_row(row: &StoreRow) -> Self {
        let item = row.item.as_ref();
        let percent = progress_percent(item.progress);
        let trailing = if !item.is_acknowledged() {
            RowTrailing::Offline
        } else if item.is_cancelable() {
            RowTrailing::CancelButton
        } else {
            RowTrailing::Percent(percent)
        };
        Self {
            row_id: row.row_id,
            id: item.id.clone(),
            label: format!("{} {} {}", item.route, item.segment, item.filename),
            icon: if item.is_priority_channel {
                ChannelIcon::Priority
            } else {
                ChannelIcon::Standard
            },
            trailing,
            progress: item.progress,
            complete: percent == 100,
            created_at: item.created_at,
            retry_count: item.retry_count,
            current: item.current,
        }
    }

    pub fn offers_cancel(&self) -> bool {
        self.trailing == RowTrailing::CancelButton
    }
}

/// Rounded percentage in `0..=100`; anything non-finite reads as 0.
pub fn progress_percent(progress: f64) -> u32 {
    if !progress.is_finite() {
        return 0;
    }
    (progress * 100.0).round().clamp(0.0, 100.0) as u32
}
