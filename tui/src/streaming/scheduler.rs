//! Timers that turn [`RevealEffect::Schedule`](super::reveal::RevealEffect::Schedule) into
//! delivered ticks.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;

pub trait RevealScheduler {
    /// Arrange for `AppEvent::RevealTick { generation }` to be delivered after `delay`.
    fn schedule(&mut self, generation: u64, delay: Duration);

    /// Drop every pending tick. Ticks already delivered are filtered by generation instead.
    fn cancel_all(&mut self);
}

/// Spawns one sleeping task per tick on the current tokio runtime.
pub struct TokioRevealScheduler {
    app_event_tx: AppEventSender,
    cancel: CancellationToken,
}

impl TokioRevealScheduler {
    pub fn new(app_event_tx: AppEventSender) -> Self {
        Self {
            app_event_tx,
            cancel: CancellationToken::new(),
        }
    }
}

impl RevealScheduler for TokioRevealScheduler {
    fn schedule(&mut self, generation: u64, delay: Duration) {
        let tx = self.app_event_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    tx.send(AppEvent::RevealTick { generation });
                }
            }
        });
    }

    fn cancel_all(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
    }
}

impl Drop for TokioRevealScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Records scheduled ticks so tests can fire them by hand.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ManualRevealScheduler {
    pub pending: Vec<(u64, Duration)>,
}

#[cfg(test)]
impl ManualRevealScheduler {
    pub fn take_pending(&mut self) -> Vec<(u64, Duration)> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
impl RevealScheduler for ManualRevealScheduler {
    fn schedule(&mut self, generation: u64, delay: Duration) {
        self.pending.push((generation, delay));
    }

    fn cancel_all(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test(start_paused = true)]
    async fn delivers_tick_after_delay() {
        let (tx, mut rx) = unbounded_channel();
        let mut scheduler = TokioRevealScheduler::new(AppEventSender::new(tx));

        let started = tokio::time::Instant::now();
        scheduler.schedule(3, Duration::from_millis(50));

        assert_eq!(rx.recv().await, Some(AppEvent::RevealTick { generation: 3 }));
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_ticks_never_arrive() {
        let (tx, mut rx) = unbounded_channel();
        let mut scheduler = TokioRevealScheduler::new(AppEventSender::new(tx));

        scheduler.schedule(1, Duration::from_millis(50));
        scheduler.cancel_all();
        scheduler.schedule(2, Duration::from_millis(80));

        assert_eq!(rx.recv().await, Some(AppEvent::RevealTick { generation: 2 }));
        let next = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
        assert!(next.is_err());
    }
}
