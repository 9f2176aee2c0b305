pub mod context;
pub mod error;
pub mod hub;
pub mod pipeline;
pub mod traits;

pub use context::{Audience, EventName, TodoEvent};
pub use error::ObserverError;
pub use hub::{TopicHub, TopicMessage};
pub use pipeline::{EventDispatcher, DEFAULT_SINK_TIMEOUT};
pub use traits::NotificationSink;
