use crate::{SourceState, UploadItem};

/// Which source supplied the visible set for a refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precedence {
    /// Device reachable: its own queue is authoritative.
    Online,
    /// Device unreachable or not yet asked: persisted intent is shown.
    #[default]
    Offline,
}

/// Selects the visible set. The sources are alternates, never unioned, so the
/// same `(route, segment, filename)` can not be counted twice.
pub fn merge(online: &SourceState, offline: &SourceState) -> (Precedence, Vec<UploadItem>) {
    if online.latest_succeeded() {
        (Precedence::Online, online.items().to_vec())
    } else {
        (Precedence::Offline, offline.items().to_vec())
    }
}
