use std::fmt;

use serde::{Deserialize, Serialize};
use uploadq_logging::{uploadq_debug, uploadq_warn};

use crate::{PathDecoder, PathIdentity, SourceFetchFailure, UploadItem};

/// Offline command method carrying a batch of file uploads.
pub const UPLOAD_FILES_TO_URLS: &str = "uploadFilesToUrls";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Queue reported live by the connected device.
    Online,
    /// Persisted upload commands waiting for the device to come back.
    Offline,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Online => write!(f, "online"),
            SourceKind::Offline => write!(f, "offline"),
        }
    }
}

/// Entry of the device-reported upload queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOnlineItem {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub current: bool,
}

/// Response of the online queue call. A missing `result` is an empty queue.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OnlineQueueResponse {
    #[serde(default)]
    pub result: Option<Vec<RawOnlineItem>>,
}

impl OnlineQueueResponse {
    pub fn with_items(items: Vec<RawOnlineItem>) -> Self {
        Self {
            result: Some(items),
        }
    }
}

/// A command persisted for the device while it was unreachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOfflineCommand {
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RawOfflineCommand {
    /// Params of an `uploadFilesToUrls` command; `None` for any other method.
    pub fn upload_files(&self) -> Option<Result<UploadFilesToUrlsParams, serde_json::Error>> {
        if self.method != UPLOAD_FILES_TO_URLS {
            return None;
        }
        Some(serde_json::from_value(self.params.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFilesToUrlsParams {
    pub files_data: Vec<FileToUpload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileToUpload {
    pub url: String,
    #[serde(rename = "fn")]
    pub file_name: String,
}

/// Items produced from one successful poll, plus how many entries were dropped
/// because their URL could not be decoded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappedSource {
    pub items: Vec<UploadItem>,
    pub malformed: usize,
}

/// Maps a device-reported queue into decorated items, furthest progress first.
pub fn map_online(decoder: &PathDecoder, response: OnlineQueueResponse) -> MappedSource {
    let mut malformed = 0;
    let mut items: Vec<UploadItem> = response
        .result
        .unwrap_or_default()
        .into_iter()
        .filter_map(|raw| match decoder.decode(&raw.url) {
            Ok(identity) => Some(online_item(raw, identity)),
            Err(err) => {
                uploadq_warn!("Skipping online upload id={}: {}", raw.id, err);
                malformed += 1;
                None
            }
        })
        .collect();
    // Stable sort keeps source order for equal progress.
    items.sort_by(|a, b| b.progress.total_cmp(&a.progress));
    MappedSource { items, malformed }
}

/// Expands persisted `uploadFilesToUrls` commands into one item per file.
pub fn map_offline(decoder: &PathDecoder, commands: Vec<RawOfflineCommand>) -> MappedSource {
    let mut mapped = MappedSource::default();
    for command in commands {
        let params = match command.upload_files() {
            None => {
                uploadq_debug!("Ignoring offline command method={}", command.method);
                continue;
            }
            Some(Ok(params)) => params,
            Some(Err(err)) => {
                uploadq_warn!("Skipping offline {} command: {}", command.method, err);
                mapped.malformed += 1;
                continue;
            }
        };
        for file in params.files_data {
            match decoder.decode(&file.url) {
                Ok(identity) => mapped.items.push(offline_item(file, identity)),
                Err(err) => {
                    uploadq_warn!("Skipping offline upload fn={}: {}", file.file_name, err);
                    mapped.malformed += 1;
                }
            }
        }
    }
    mapped
}

fn online_item(raw: RawOnlineItem, identity: PathIdentity) -> UploadItem {
    UploadItem {
        id: raw.id,
        url: raw.url,
        path: raw.path,
        route: identity.route,
        segment: identity.segment,
        filename: identity.filename,
        is_priority_channel: identity.is_priority_channel,
        progress: raw.progress,
        created_at: raw.created_at,
        retry_count: raw.retry_count,
        current: raw.current,
    }
}

fn offline_item(file: FileToUpload, identity: PathIdentity) -> UploadItem {
    UploadItem {
        id: String::new(),
        url: file.url,
        path: file.file_name,
        route: identity.route,
        segment: identity.segment,
        filename: identity.filename,
        is_priority_channel: identity.is_priority_channel,
        progress: 0.0,
        created_at: 0,
        retry_count: 0,
        current: false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Succeeded,
    Failed,
}

/// Poll bookkeeping for one source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceState {
    completed_attempts: u64,
    ever_succeeded: bool,
    latest: Option<Attempt>,
    last_seq: Option<u64>,
    items: Vec<UploadItem>,
    malformed: usize,
    last_failure: Option<SourceFetchFailure>,
}

impl SourceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_completed_attempt(&self) -> bool {
        self.completed_attempts > 0
    }

    pub fn completed_attempts(&self) -> u64 {
        self.completed_attempts
    }

    pub fn ever_succeeded(&self) -> bool {
        self.ever_succeeded
    }

    pub fn latest_succeeded(&self) -> bool {
        self.latest == Some(Attempt::Succeeded)
    }

    pub fn latest_failed(&self) -> bool {
        self.latest == Some(Attempt::Failed)
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn malformed(&self) -> usize {
        self.malformed
    }

    pub fn last_failure(&self) -> Option<&SourceFetchFailure> {
        self.last_failure.as_ref()
    }

    /// Only results newer than the last applied one are accepted.
    pub fn accepts(&self, seq: u64) -> bool {
        self.last_seq.map_or(true, |last| seq > last)
    }

    pub(crate) fn record_success(&mut self, seq: u64, mapped: MappedSource) {
        self.last_seq = Some(seq);
        self.completed_attempts += 1;
        self.ever_succeeded = true;
        self.latest = Some(Attempt::Succeeded);
        self.items = mapped.items;
        self.malformed = mapped.malformed;
        self.last_failure = None;
    }

    pub(crate) fn record_failure(&mut self, seq: u64, failure: SourceFetchFailure) {
        self.last_seq = Some(seq);
        self.completed_attempts += 1;
        self.latest = Some(Attempt::Failed);
        self.items.clear();
        self.malformed = 0;
        self.last_failure = Some(failure);
    }
}
