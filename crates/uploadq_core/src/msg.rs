use crate::{OnlineQueueResponse, RawOfflineCommand, SourceFetchFailure};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Online poller finished attempt `seq`.
    OnlineQueueFetched {
        seq: u64,
        result: Result<OnlineQueueResponse, SourceFetchFailure>,
    },
    /// Offline poller finished attempt `seq`.
    OfflineQueueFetched {
        seq: u64,
        result: Result<Vec<RawOfflineCommand>, SourceFetchFailure>,
    },
    /// User asked to cancel every acknowledged upload.
    CancelAllClicked,
    /// User asked to cancel a single upload.
    CancelOneClicked { id: String },
}
