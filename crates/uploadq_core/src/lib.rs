//! Upload queue core: pure reconciliation state machine and view-model helpers.
mod decode;
mod effect;
mod error;
mod item;
mod merge;
mod msg;
mod source;
mod state;
mod store;
mod update;
mod view_model;

pub use decode::{decode_upload_path, PathDecoder, PRIORITY_UPLOAD_HOST};
pub use effect::Effect;
pub use error::{DecodeError, SourceFetchFailure};
pub use item::{PathIdentity, UploadItem};
pub use merge::{merge, Precedence};
pub use msg::Msg;
pub use source::{
    map_offline, map_online, FileToUpload, MappedSource, OnlineQueueResponse, RawOfflineCommand,
    RawOnlineItem, SourceKind, SourceState, UploadFilesToUrlsParams, UPLOAD_FILES_TO_URLS,
};
pub use state::QueueState;
pub use store::{ReconcileReport, ReconciledStore, RowId, StoreRow};
pub use update::update;
pub use view_model::{
    progress_percent, ChannelIcon, QueueStatus, QueueViewModel, RowTrailing, UploadRowView,
};
