use thiserror::Error;

/// Notification delivery errors. Never surfaced to callers of the list service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObserverError {
    #[error("Sink error: {0}")]
    SinkError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Dispatcher stopped")]
    ChannelClosed,
}
