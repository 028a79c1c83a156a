use tokio::sync::mpsc::UnboundedSender;

use crate::app_event::AppEvent;

/// Cloneable handle used by widgets and timers to post [`AppEvent`]s.
#[derive(Clone, Debug)]
pub struct AppEventSender {
    app_event_tx: UnboundedSender<AppEvent>,
}

impl AppEventSender {
    pub fn new(app_event_tx: UnboundedSender<AppEvent>) -> Self {
        Self { app_event_tx }
    }

    /// Send an event to the app loop. Failures are logged because the receiver only goes away
    /// during shutdown.
    pub fn send(&self, event: AppEvent) {
        if let Err(err) = self.app_event_tx.send(event) {
            tracing::error!("failed to send event: {err}");
        }
    }
}
