use uploadq_logging::{uploadq_debug, uploadq_info};

use crate::view_model::{QueueStatus, QueueViewModel, UploadRowView};
use crate::{
    map_offline, map_online, merge, MappedSource, OnlineQueueResponse, PathDecoder, Precedence,
    RawOfflineCommand, ReconciledStore, SourceFetchFailure, SourceKind, SourceState, UploadItem,
};

/// Everything the queue view is derived from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueueState {
    decoder: PathDecoder,
    online: SourceState,
    offline: SourceState,
    precedence: Precedence,
    store: ReconciledStore,
    dirty: bool,
}

/// Parts of the view that change without the store changing.
type Fingerprint = (QueueStatus, Precedence, u64, usize);

impl QueueState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decoder(decoder: PathDecoder) -> Self {
        Self {
            decoder,
            ..Self::default()
        }
    }

    pub fn online(&self) -> &SourceState {
        &self.online
    }

    pub fn offline(&self) -> &SourceState {
        &self.offline
    }

    pub fn store(&self) -> &ReconciledStore {
        &self.store
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    /// The offline queue is only worth asking while the device itself is not
    /// answering.
    pub fn offline_poll_enabled(&self) -> bool {
        !self.online.latest_succeeded()
    }

    pub fn status(&self) -> QueueStatus {
        if !self.online.has_completed_attempt() && !self.offline.has_completed_attempt() {
            return QueueStatus::Connecting;
        }
        if !self.store.is_empty() {
            return QueueStatus::Populated;
        }
        if self.online.has_completed_attempt() && !self.online.latest_succeeded() {
            QueueStatus::DeviceOffline
        } else {
            QueueStatus::Empty
        }
    }

    /// Malformed entries dropped from the source currently shown.
    pub fn malformed_items(&self) -> usize {
        match self.precedence {
            Precedence::Online => self.online.malformed(),
            Precedence::Offline => self.offline.malformed(),
        }
    }

    /// Ids the device could cancel right now, in display order.
    pub fn cancelable_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for item in self.store.items().filter(|item| item.is_acknowledged()) {
            if !ids.contains(&item.id) {
                ids.push(item.id.clone());
            }
        }
        ids
    }

    pub fn can_cancel_one(&self, id: &str) -> bool {
        !id.is_empty()
            && self
                .store
                .items()
                .any(|item| item.id == id && item.is_cancelable())
    }

    pub fn view(&self) -> QueueViewModel {
        QueueViewModel {
            status: self.status(),
            queued: self.store.len(),
            rows: self.store.rows().iter().map(UploadRowView::from_row).collect(),
            source: self.precedence,
            revision: self.store.revision(),
            malformed_items: self.malformed_items(),
        }
    }

    /// Returns whether the view changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn apply_online(
        &mut self,
        seq: u64,
        result: Result<OnlineQueueResponse, SourceFetchFailure>,
    ) {
        let mapped = result.map(|response| map_online(&self.decoder, response));
        self.apply(SourceKind::Online, seq, mapped)
    }

    pub(crate) fn apply_offline(
        &mut self,
        seq: u64,
        result: Result<Vec<RawOfflineCommand>, SourceFetchFailure>,
    ) {
        let mapped = result.map(|commands| map_offline(&self.decoder, commands));
        self.apply(SourceKind::Offline, seq, mapped)
    }

    fn apply(
        &mut self,
        kind: SourceKind,
        seq: u64,
        mapped: Result<MappedSource, SourceFetchFailure>,
    ) {
        if !self.source_mut(kind).accepts(seq) {
            uploadq_debug!("Dropping stale {} poll result seq={}", kind, seq);
            return;
        }

        let before = self.fingerprint();
        let source = self.source_mut(kind);
        match mapped {
            Ok(mapped) => source.record_success(seq, mapped),
            Err(failure) => source.record_failure(seq, failure),
        }
        self.remerge();
        if self.fingerprint() != before {
            self.dirty = true;
        }
    }

    fn source_mut(&mut self, kind: SourceKind) -> &mut SourceState {
        match kind {
            SourceKind::Online => &mut self.online,
            SourceKind::Offline => &mut self.offline,
        }
    }

    fn remerge(&mut self) {
        let (precedence, visible) = merge(&self.online, &self.offline);
        if precedence != self.precedence {
            uploadq_info!("Upload queue now follows the {:?} source", precedence);
        }
        self.log_progress_regressions(&visible);
        self.precedence = precedence;
        self.store.update(visible);
    }

    fn log_progress_regressions(&self, visible: &[UploadItem]) {
        for item in visible.iter().filter(|item| item.is_acknowledged()) {
            if let Some(previous) = self.store.items().find(|prev| prev.id == item.id) {
                if item.progress < previous.progress {
                    uploadq_debug!(
                        "Upload {} progress went backwards: {} -> {}",
                        item.id,
                        previous.progress,
                        item.progress
                    );
                }
            }
        }
    }

    fn fingerprint(&self) -> Fingerprint {
        (
            self.status(),
            self.precedence,
            self.store.revision(),
            self.malformed_items(),
        )
    }
}
