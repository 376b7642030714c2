use uploadq_logging::{uploadq_debug, uploadq_warn};

use crate::{Effect, Msg, QueueState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: QueueState, msg: Msg) -> (QueueState, Vec<Effect>) {
    let effects = match msg {
        Msg::OnlineQueueFetched { seq, result } => {
            if let Err(failure) = &result {
                uploadq_warn!("Online queue poll seq={} failed: {}", seq, failure);
            }
            state.apply_online(seq, result);
            Vec::new()
        }
        Msg::OfflineQueueFetched { seq, result } => {
            if let Err(failure) = &result {
                uploadq_warn!("Offline queue poll seq={} failed: {}", seq, failure);
            }
            state.apply_offline(seq, result);
            Vec::new()
        }
        Msg::CancelAllClicked => {
            // Unacknowledged (offline-only) uploads can not be cancelled remotely.
            let ids = state.cancelable_ids();
            if ids.is_empty() {
                uploadq_debug!("Cancel all: nothing the device can cancel");
                Vec::new()
            } else {
                vec![Effect::CancelUploads { ids }]
            }
        }
        Msg::CancelOneClicked { id } => {
            if state.can_cancel_one(&id) {
                vec![Effect::CancelUploads { ids: vec![id] }]
            } else {
                uploadq_debug!("Cancel one: upload {:?} is not cancelable", id);
                Vec::new()
            }
        }
    };

    (state, effects)
}
