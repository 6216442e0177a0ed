//! Event sources: the two transports that deliver task events.
mod poll;
mod stream;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};

use benchdesk_core::{TaskEvent, TaskId};
use benchdesk_logging::desk_trace;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, SourceExit};

pub use poll::PollSource;
pub use stream::StreamSource;

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Forwards only while its generation is still the current one, so a
/// replaced source cannot leak events after it was closed.
pub(crate) struct GenerationSink {
    inner: ChannelEventSink,
    generation: u64,
    current: Arc<AtomicU64>,
}

impl GenerationSink {
    pub(crate) fn new(
        tx: mpsc::Sender<EngineEvent>,
        generation: u64,
        current: Arc<AtomicU64>,
    ) -> Self {
        Self {
            inner: ChannelEventSink::new(tx),
            generation,
            current,
        }
    }
}

impl EventSink for GenerationSink {
    fn emit(&self, event: EngineEvent) {
        if self.current.load(Ordering::SeqCst) == self.generation {
            self.inner.emit(event);
        } else {
            desk_trace!("source {} superseded, dropping {:?}", self.generation, event);
        }
    }
}

/// Delivers the events of one task, in order, until it has to stop.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    async fn run(
        &self,
        task_id: &TaskId,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> SourceExit;
}

pub(crate) enum Route {
    Skip,
    Forward,
    /// Forward, then stop the source.
    Last(SourceExit),
}

pub(crate) fn route(event: &TaskEvent, task_id: &TaskId) -> Route {
    if event.task_id() != Some(task_id) {
        desk_trace!("skipping event of task {:?}", event.task_id());
        return Route::Skip;
    }
    if event.is_end() {
        Route::Last(SourceExit::Completed)
    } else if event.is_blocking_prompt() {
        Route::Last(SourceExit::PromptOutstanding)
    } else {
        Route::Forward
    }
}

/// Applies the routing decision. Returns the exit if the source must stop.
pub(crate) fn deliver(
    event: TaskEvent,
    task_id: &TaskId,
    sink: &dyn EventSink,
) -> Option<SourceExit> {
    match route(&event, task_id) {
        Route::Skip => None,
        Route::Forward => {
            sink.emit(EngineEvent::SourceEvent(event));
            None
        }
        Route::Last(exit) => {
            sink.emit(EngineEvent::SourceEvent(event));
            Some(exit)
        }
    }
}
