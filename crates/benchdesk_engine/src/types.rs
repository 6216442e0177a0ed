use std::fmt;

use benchdesk_core::{ActionResponse, FolderListing, Notification, TaskEvent, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Timeout,
    HttpStatus(u16),
    /// The body did not have the expected shape.
    Decode,
    /// The backend answered but had nothing for us (no running task).
    Unavailable,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Unavailable => write!(f, "unavailable"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Why an event source stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceExit {
    /// The end marker of the followed task was forwarded.
    Completed,
    /// A blocking prompt was forwarded; a fresh source opens after the answer.
    PromptOutstanding,
    Cancelled,
    /// The source reached its maximum lifetime.
    Expired,
    Failed(ClientError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    TaskIdResolved(Result<TaskId, ClientError>),
    SourceEvent(TaskEvent),
    SourceClosed(SourceExit),
    ActionCompleted {
        endpoint: String,
        result: Result<ActionResponse, ClientError>,
    },
    PromptResponseSent(Result<(), ClientError>),
    EventAcknowledged {
        event_id: String,
        result: Result<(), ClientError>,
    },
    NotificationsFetched(Result<Vec<Notification>, ClientError>),
    NotificationMarkedRead {
        id: String,
        result: Result<(), ClientError>,
    },
    NotificationDeleted {
        id: String,
        result: Result<(), ClientError>,
    },
    FolderListed(Result<FolderListing, ClientError>),
    YamlFetched(Result<String, ClientError>),
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start the engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Client(#[from] ClientError),
}
