use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uploadq_core::SourceKind;
use uploadq_logging::{uploadq_debug, uploadq_trace};

/// Repeating poll of one queue source.
///
/// Every attempt is awaited before the next tick is taken, so a poller never
/// overlaps itself; a slow attempt simply pushes the next one back. Attempts
/// are numbered from 1 so the reducer can drop out-of-order results.
pub(crate) struct Poller<E> {
    kind: SourceKind,
    interval: Duration,
    enabled: E,
    cancel: CancellationToken,
}

impl<E> Poller<E>
where
    E: Fn() -> bool + Send + 'static,
{
    pub(crate) fn new(
        kind: SourceKind,
        interval: Duration,
        enabled: E,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            kind,
            interval,
            enabled,
            cancel,
        }
    }

    pub(crate) async fn run<F, Fut>(self, mut attempt: F)
    where
        F: FnMut(u64) -> Fut + Send,
        Fut: Future<Output = ()> + Send,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut seq = 0u64;
        uploadq_debug!(
            "Starting {} poller every {}ms",
            self.kind,
            self.interval.as_millis()
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if !(self.enabled)() {
                uploadq_trace!("{} poller disabled, skipping tick", self.kind);
                continue;
            }

            seq += 1;
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = attempt(seq) => {}
            }
        }
        uploadq_debug!("Stopped {} poller after {} attempts", self.kind, seq);
    }
}
