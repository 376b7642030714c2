use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uploadq_core::{
    update, Effect, Msg, PathDecoder, QueueState, QueueViewModel, SourceFetchFailure, SourceKind,
};
use uploadq_logging::{uploadq_debug, uploadq_error, uploadq_info};

use crate::poller::Poller;
use crate::DeviceApi;

pub const DEFAULT_ONLINE_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_OFFLINE_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub device_id: String,
    pub online_interval: Duration,
    pub offline_interval: Duration,
    pub decoder: PathDecoder,
}

impl EngineConfig {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            online_interval: DEFAULT_ONLINE_INTERVAL,
            offline_interval: DEFAULT_OFFLINE_INTERVAL,
            decoder: PathDecoder::default(),
        }
    }
}

/// Owns the pollers and the reducer for one device.
///
/// The reducer task is the only writer of [`QueueState`]; everybody else sees
/// whole [`QueueViewModel`] snapshots through a watch channel. Must be created
/// from inside a tokio runtime.
pub struct EngineHandle {
    msg_tx: mpsc::UnboundedSender<Msg>,
    view_rx: watch::Receiver<QueueViewModel>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn spawn(config: EngineConfig, api: Arc<dyn DeviceApi>) -> Self {
        let EngineConfig {
            device_id,
            online_interval,
            offline_interval,
            decoder,
        } = config;
        let device_id: Arc<str> = Arc::from(device_id);
        let cancel = CancellationToken::new();
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let state = QueueState::with_decoder(decoder);
        let offline_enabled = Arc::new(AtomicBool::new(state.offline_poll_enabled()));
        let (view_tx, view_rx) = watch::channel(state.view());

        uploadq_info!("Watching upload queue of device {}", device_id);

        let reducer = Reducer {
            device_id: device_id.clone(),
            api: api.clone(),
            view_tx,
            offline_enabled: offline_enabled.clone(),
        };
        let mut tasks = vec![tokio::spawn(reducer.run(state, msg_rx, cancel.clone()))];

        let online = Poller::new(
            SourceKind::Online,
            online_interval,
            || true,
            cancel.clone(),
        );
        tasks.push(tokio::spawn(online.run({
            let api = api.clone();
            let device_id = device_id.clone();
            let msg_tx = msg_tx.clone();
            move |seq| {
                let api = api.clone();
                let device_id = device_id.clone();
                let msg_tx = msg_tx.clone();
                async move {
                    let result = api
                        .fetch_online_queue(&device_id)
                        .await
                        .map_err(SourceFetchFailure::from);
                    let _ = msg_tx.send(Msg::OnlineQueueFetched { seq, result });
                }
            }
        })));

        let offline = Poller::new(
            SourceKind::Offline,
            offline_interval,
            move || offline_enabled.load(Ordering::Acquire),
            cancel.clone(),
        );
        tasks.push(tokio::spawn(offline.run({
            let msg_tx = msg_tx.clone();
            move |seq| {
                let api = api.clone();
                let device_id = device_id.clone();
                let msg_tx = msg_tx.clone();
                async move {
                    let result = api
                        .fetch_offline_queue(&device_id)
                        .await
                        .map_err(SourceFetchFailure::from);
                    let _ = msg_tx.send(Msg::OfflineQueueFetched { seq, result });
                }
            }
        })));

        Self {
            msg_tx,
            view_rx,
            cancel,
            tasks,
        }
    }

    /// Cancels every upload the device has acknowledged. Does not wait for
    /// the device; the next poll shows whether it took effect.
    pub fn cancel_all(&self) {
        let _ = self.msg_tx.send(Msg::CancelAllClicked);
    }

    pub fn cancel_one(&self, id: impl Into<String>) {
        let _ = self.msg_tx.send(Msg::CancelOneClicked { id: id.into() });
    }

    pub fn subscribe(&self) -> watch::Receiver<QueueViewModel> {
        self.view_rx.clone()
    }

    pub fn current_view(&self) -> QueueViewModel {
        self.view_rx.borrow().clone()
    }

    /// Stops the pollers and the reducer. In-flight cancel requests are left
    /// to finish on their own.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for task in std::mem::take(&mut self.tasks) {
            let _ = task.await;
        }
        uploadq_info!("Upload queue engine stopped");
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Reducer {
    device_id: Arc<str>,
    api: Arc<dyn DeviceApi>,
    view_tx: watch::Sender<QueueViewModel>,
    offline_enabled: Arc<AtomicBool>,
}

impl Reducer {
    async fn run(
        self,
        mut state: QueueState,
        mut msg_rx: mpsc::UnboundedReceiver<Msg>,
        cancel: CancellationToken,
    ) {
        loop {
            let msg = tokio::select! {
                _ = cancel.cancelled() => break,
                msg = msg_rx.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
            };

            let (next, effects) = update(state, msg);
            state = next;
            self.offline_enabled
                .store(state.offline_poll_enabled(), Ordering::Release);
            if state.consume_dirty() {
                let view = state.view();
                uploadq_debug!(
                    "Queue view {:?}: {} item(s), revision {}",
                    view.status,
                    view.queued,
                    view.revision
                );
                self.view_tx.send_replace(view);
            }
            for effect in effects {
                self.execute(effect);
            }
        }
    }

    fn execute(&self, effect: Effect) {
        match effect {
            Effect::CancelUploads { ids } => {
                uploadq_info!("Cancelling {} upload(s): {:?}", ids.len(), ids);
                let api = self.api.clone();
                let device_id = self.device_id.clone();
                // Fire and forget: the reducer never waits on the device.
                tokio::spawn(async move {
                    if let Err(err) = api.cancel_upload(&device_id, &ids).await {
                        uploadq_error!("Error canceling uploads {:?}: {}", ids, err);
                    }
                });
            }
        }
    }
}
