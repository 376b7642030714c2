/// Identity of an uploaded artifact, extracted from its target URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathIdentity {
    pub route: String,
    pub segment: u32,
    pub filename: String,
    pub is_priority_channel: bool,
}

/// A decorated upload queue entry.
///
/// Synthesized fresh from every poll response and never mutated afterwards.
/// An empty `id` means the device has not acknowledged the upload yet.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadItem {
    pub id: String,
    pub url: String,
    pub path: String,
    pub route: String,
    pub segment: u32,
    pub filename: String,
    pub is_priority_channel: bool,
    pub progress: f64,
    pub created_at: u64,
    pub retry_count: u32,
    pub current: bool,
}

impl UploadItem {
    /// True when the device has assigned an id to this upload.
    pub fn is_acknowledged(&self) -> bool {
        !self.id.is_empty()
    }

    /// Cancel-one is only offered for acknowledged uploads that have not
    /// started moving bytes.
    pub fn is_cancelable(&self) -> bool {
        self.is_acknowledged() && self.progress == 0.0
    }

    pub(crate) fn row_key(&self) -> RowKey {
        (
            self.route.clone(),
            self.segment,
            self.filename.clone(),
            self.id.clone(),
        )
    }
}

/// `(route, segment, filename, id)`
pub(crate) type RowKey = (String, u32, String, String);
