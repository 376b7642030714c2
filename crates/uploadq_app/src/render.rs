use chrono::{DateTime, TimeZone};
use uploadq_core::{ChannelIcon, Precedence, QueueStatus, QueueViewModel, RowTrailing, UploadRowView};

const BAR_WIDTH: usize = 20;

/// Renders the queue view as terminal lines.
pub fn render<Tz: TimeZone>(view: &QueueViewModel, now: &DateTime<Tz>) -> Vec<String>
where
    Tz::Offset: std::fmt::Display,
{
    let source = match view.source {
        Precedence::Online => "device",
        Precedence::Offline => "offline queue",
    };
    let mut lines = vec![format!(
        "Queued: {} | source: {} | updated {}",
        view.queued,
        source,
        now.format("%H:%M:%S")
    )];

    match view.status {
        QueueStatus::Populated => {
            let width = view.rows.iter().map(|row| row.label.len()).max().unwrap_or(0);
            lines.extend(view.rows.iter().map(|row| render_row(row, width)));
        }
        status => {
            let marker = match status {
                QueueStatus::Connecting => "...",
                QueueStatus::DeviceOffline => "(!)",
                _ => "(ok)",
            };
            lines.push(format!(
                "  {} {}",
                marker,
                status.message().unwrap_or_default()
            ));
        }
    }

    if view.malformed_items > 0 {
        lines.push(format!(
            "  ({} entr{} with an unrecognised upload url hidden)",
            view.malformed_items,
            if view.malformed_items == 1 { "y" } else { "ies" }
        ));
    }
    lines
}

fn render_row(row: &UploadRowView, width: usize) -> String {
    let icon = match row.icon {
        ChannelIcon::Priority => "[fire]",
        ChannelIcon::Standard => "[user]",
    };
    let trailing = match row.trailing {
        RowTrailing::Percent(percent) => format!("{percent:>3}%"),
        RowTrailing::Offline => "Offline".to_string(),
        RowTrailing::CancelButton => format!("[cancel {}]", row.id),
    };
    format!(
        "  {icon} {label:<width$}  {bar}  {trailing}",
        label = row.label,
        bar = progress_bar(row.progress, row.complete),
    )
}

fn progress_bar(progress: f64, complete: bool) -> String {
    let filled = if complete {
        BAR_WIDTH
    } else {
        let fraction = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        (fraction * BAR_WIDTH as f64).floor() as usize
    };
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
