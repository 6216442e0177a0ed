//! Benchdesk engine: backend client, event transports and effect execution.
mod api;
mod engine;
mod settings;
mod source;
mod types;

pub use api::{Backend, ReqwestBackend};
pub use engine::EngineHandle;
pub use settings::{ClientSettings, Transport};
pub use source::{ChannelEventSink, EventSink, EventSource, PollSource, StreamSource};
pub use types::{ClientError, EngineError, EngineEvent, FailureKind, SourceExit};
