use benchdesk_core::{parse_event, TaskId};
use benchdesk_logging::{desk_debug, desk_warn};
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use super::{deliver, EventSink, EventSource};
use crate::api::{check_status, map_reqwest_error};
use crate::{ClientError, FailureKind, ReqwestBackend, SourceExit};

/// Server-sent events from `GET /events?stream_old=true`.
pub struct StreamSource {
    backend: ReqwestBackend,
}

impl StreamSource {
    pub fn new(backend: ReqwestBackend) -> Self {
        Self { backend }
    }
}

#[async_trait::async_trait]
impl EventSource for StreamSource {
    async fn run(
        &self,
        task_id: &TaskId,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> SourceExit {
        let settings = self.backend.settings();
        let deadline = Instant::now() + settings.poll_max_lifetime;

        let request = self
            .backend
            .client()
            .get(settings.endpoint("/events"))
            .query(&[("stream_old", "true")])
            .header(ACCEPT, "text/event-stream")
            .send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return SourceExit::Cancelled,
            _ = sleep_until(deadline) => return SourceExit::Expired,
            response = request => response,
        };
        let response = match response.map_err(map_reqwest_error).and_then(check_status) {
            Ok(response) => response,
            Err(err) => {
                desk_warn!("could not open event stream: {}", err);
                return SourceExit::Failed(err);
            }
        };

        let mut stream = response.bytes_stream().eventsource();
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return SourceExit::Cancelled,
                _ = sleep_until(deadline) => return SourceExit::Expired,
                next = stream.next() => next,
            };
            match next {
                Some(Ok(message)) => match parse_event(&message.data) {
                    Ok(event) => {
                        if let Some(exit) = deliver(event, task_id, sink) {
                            desk_debug!("event stream for {} stopped: {:?}", task_id, exit);
                            return exit;
                        }
                    }
                    Err(err) => desk_debug!("dropping malformed event: {}", err),
                },
                Some(Err(err)) => {
                    desk_warn!("event stream broke: {}", err);
                    return SourceExit::Failed(ClientError::new(
                        FailureKind::Network,
                        err.to_string(),
                    ));
                }
                None => {
                    return SourceExit::Failed(ClientError::new(
                        FailureKind::Network,
                        "event stream closed before the task ended",
                    ));
                }
            }
        }
    }
}
