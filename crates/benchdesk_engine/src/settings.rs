use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How task events are pulled from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// One `GET /events` per event.
    #[default]
    Poll,
    /// Server-sent events from `GET /events?stream_old=true`.
    Stream,
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub transport: Transport,
    pub poll_backoff_initial: Duration,
    pub poll_backoff_max: Duration,
    /// Consecutive failures tolerated before a source gives up.
    pub poll_max_retries: u32,
    /// Upper bound on how long one event source may stay open.
    pub poll_max_lifetime: Duration,
    /// Attempts at resolving the running task id while the backend reports none.
    pub task_id_attempts: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8100".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            transport: Transport::Poll,
            poll_backoff_initial: Duration::from_millis(250),
            poll_backoff_max: Duration::from_secs(8),
            poll_max_retries: 5,
            poll_max_lifetime: Duration::from_secs(6 * 60 * 60),
            task_id_attempts: 10,
        }
    }
}

impl ClientSettings {
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Delay before retry number `attempt` (starting at 1).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.poll_backoff_initial
            .saturating_mul(factor)
            .min(self.poll_backoff_max)
    }
}
