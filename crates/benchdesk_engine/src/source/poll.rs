use std::sync::Arc;

use benchdesk_core::TaskId;
use benchdesk_logging::{desk_debug, desk_warn};
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use super::{deliver, EventSink, EventSource};
use crate::{Backend, ClientSettings, SourceExit};

/// Repeated `GET /events`; request N+1 is only sent after request N resolved.
pub struct PollSource {
    backend: Arc<dyn Backend>,
    settings: ClientSettings,
}

impl PollSource {
    pub fn new(backend: Arc<dyn Backend>, settings: ClientSettings) -> Self {
        Self { backend, settings }
    }
}

#[async_trait::async_trait]
impl EventSource for PollSource {
    async fn run(
        &self,
        task_id: &TaskId,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> SourceExit {
        let deadline = Instant::now() + self.settings.poll_max_lifetime;
        let mut failures = 0u32;

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return SourceExit::Cancelled,
                _ = sleep_until(deadline) => return SourceExit::Expired,
                next = self.backend.next_event() => next,
            };

            match next {
                Ok(Some(event)) => {
                    failures = 0;
                    if let Some(exit) = deliver(event, task_id, sink) {
                        desk_debug!("poll source for {} stopped: {:?}", task_id, exit);
                        return exit;
                    }
                }
                Ok(None) => failures = 0,
                Err(err) => {
                    failures += 1;
                    if failures > self.settings.poll_max_retries {
                        desk_warn!("giving up polling after {} failures: {}", failures, err);
                        return SourceExit::Failed(err);
                    }
                    let delay = self.settings.backoff(failures);
                    desk_warn!("poll failed ({}), retrying in {:?}", err, delay);
                    tokio::select! {
                        _ = cancel.cancelled() => return SourceExit::Cancelled,
                        _ = sleep_until(deadline) => return SourceExit::Expired,
                        _ = sleep(delay) => {}
                    }
                }
            }
        }
    }
}
