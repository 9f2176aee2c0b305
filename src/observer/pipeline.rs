//! Fire-and-forget event delivery.
//!
//! Mutations hand events to [`EventDispatcher::dispatch`] after they have committed.
//! A single background task delivers them to the sink in submission order, each
//! delivery bounded by a timeout. Failures are logged and never reach the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use crate::observer::context::TodoEvent;
use crate::observer::error::ObserverError;
use crate::observer::traits::NotificationSink;

/// Default delivery timeout, matching the notification ring budget
pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(5);

enum Command {
    Deliver(TodoEvent),
    Flush(oneshot::Sender<()>),
}

/// Handle to the delivery task. Cheap to clone.
#[derive(Clone)]
pub struct EventDispatcher {
    tx: mpsc::Sender<Command>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher").finish_non_exhaustive()
    }
}

impl EventDispatcher {
    /// Spawn the delivery task. Requires a running tokio runtime.
    pub fn spawn(sink: Arc<dyn NotificationSink>, capacity: usize, sink_timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(run(sink, rx, sink_timeout));
        Self { tx }
    }

    /// Queue an event. Never blocks and never fails; a full queue drops the event.
    pub fn dispatch(&self, event: TodoEvent) {
        let name = event.name;
        if let Err(e) = self.tx.try_send(Command::Deliver(event)) {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "queue full",
                mpsc::error::TrySendError::Closed(_) => "dispatcher stopped",
            };
            tracing::warn!("Dropping {} notification: {}", name, reason);
        }
    }

    /// Wait until every event queued before this call has been handled
    pub async fn flush(&self) -> Result<(), ObserverError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(done_tx))
            .await
            .map_err(|_| ObserverError::ChannelClosed)?;
        done_rx.await.map_err(|_| ObserverError::ChannelClosed)
    }
}

async fn run(sink: Arc<dyn NotificationSink>, mut rx: mpsc::Receiver<Command>, sink_timeout: Duration) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Deliver(event) => deliver(sink.as_ref(), event, sink_timeout).await,
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("Event dispatcher stopped");
}

async fn deliver(sink: &dyn NotificationSink, event: TodoEvent, sink_timeout: Duration) {
    let name = event.name;
    let topic = event.audience.topic();
    let start = Instant::now();

    match timeout(sink_timeout, sink.deliver(event)).await {
        Ok(Ok(())) => {
            tracing::debug!("Delivered {} to {} in {:?}", name, topic, start.elapsed());
        }
        Ok(Err(error)) => {
            tracing::warn!("Delivery of {} to {} failed in {:?}: {}", name, topic, start.elapsed(), error);
        }
        Err(_timeout) => {
            let error = ObserverError::TimeoutError(format!("{} to {} timed out after {:?}", name, topic, sink_timeout));
            tracing::error!("{}", error);
        }
    }
}
