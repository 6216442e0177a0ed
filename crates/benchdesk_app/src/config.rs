//! Application configuration: an optional RON file overlaid with CLI flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use benchdesk_core::{SessionConfig, DEFAULT_MAX_LOG_MESSAGES, DEFAULT_PENDING_EVENT_LIMIT};
use benchdesk_engine::{ClientSettings, Transport};
use benchdesk_logging::desk_info;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, LogArg, TransportArg};
use crate::logging::{LogDestination, LogLevel};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub transport: Transport,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub poll_backoff_initial_ms: u64,
    pub poll_backoff_max_ms: u64,
    pub poll_max_retries: u32,
    pub poll_max_lifetime_secs: u64,
    pub task_id_attempts: u32,
    pub max_log_messages: usize,
    pub pending_event_limit: usize,
    pub log: LogDestination,
    pub log_level: LogLevel,
    pub log_file: PathBuf,
    /// Seconds between notification refreshes in the notifications view.
    pub notification_refresh_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            base_url: client.base_url,
            transport: client.transport,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: client.request_timeout.as_secs(),
            poll_backoff_initial_ms: client.poll_backoff_initial.as_millis() as u64,
            poll_backoff_max_ms: client.poll_backoff_max.as_millis() as u64,
            poll_max_retries: client.poll_max_retries,
            poll_max_lifetime_secs: client.poll_max_lifetime.as_secs(),
            task_id_attempts: client.task_id_attempts,
            max_log_messages: DEFAULT_MAX_LOG_MESSAGES,
            pending_event_limit: DEFAULT_PENDING_EVENT_LIMIT,
            log: LogDestination::File,
            log_level: LogLevel::Info,
            log_file: PathBuf::from("./benchdesk.log"),
            notification_refresh_secs: 10,
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                desk_info!("no config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(base_url) = &cli.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(transport) = cli.transport {
            self.transport = match transport {
                TransportArg::Poll => Transport::Poll,
                TransportArg::Stream => Transport::Stream,
            };
        }
        if let Some(log) = cli.log {
            self.log = match log {
                LogArg::File => LogDestination::File,
                LogArg::Terminal => LogDestination::Terminal,
                LogArg::Both => LogDestination::Both,
            };
        }
        if cli.verbose {
            self.log_level = LogLevel::Debug;
        }
        if let Some(max) = cli.max_log_messages {
            self.max_log_messages = max;
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            transport: self.transport,
            poll_backoff_initial: Duration::from_millis(self.poll_backoff_initial_ms),
            poll_backoff_max: Duration::from_millis(self.poll_backoff_max_ms),
            poll_max_retries: self.poll_max_retries,
            poll_max_lifetime: Duration::from_secs(self.poll_max_lifetime_secs),
            task_id_attempts: self.task_id_attempts,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_log_messages: self.max_log_messages,
            pending_event_limit: self.pending_event_limit,
        }
    }
}
