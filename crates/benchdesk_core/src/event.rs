use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque handle of a backend task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Text,
    Print,
    Warning,
    Error,
    Highlight,
    Prompt,
    Yaml,
    Url,
    Code,
}

impl EventKind {
    pub fn parse(tag: &str) -> Option<Self> {
        let kind = match tag {
            "text" => EventKind::Text,
            "print" => EventKind::Print,
            "warning" => EventKind::Warning,
            "error" => EventKind::Error,
            "highlight" => EventKind::Highlight,
            "prompt" => EventKind::Prompt,
            "yaml" => EventKind::Yaml,
            "url" => EventKind::Url,
            "code" => EventKind::Code,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Text => "text",
            EventKind::Print => "print",
            EventKind::Warning => "warning",
            EventKind::Error => "error",
            EventKind::Highlight => "highlight",
            EventKind::Prompt => "prompt",
            EventKind::Yaml => "yaml",
            EventKind::Url => "url",
            EventKind::Code => "code",
        }
    }
}

/// One unit of task output, as consumed by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    Message {
        task_id: Option<TaskId>,
        kind: EventKind,
        interactive: bool,
        message: String,
    },
    /// Batched log lines. Only ever routed to the log buffer.
    Chunk {
        task_id: Option<TaskId>,
        lines: Vec<String>,
    },
    /// End-of-task marker carrying the optional final payload.
    End {
        task_id: Option<TaskId>,
        response: Option<Value>,
    },
}

impl TaskEvent {
    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            TaskEvent::Message { task_id, .. }
            | TaskEvent::Chunk { task_id, .. }
            | TaskEvent::End { task_id, .. } => task_id.as_ref(),
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, TaskEvent::End { .. })
    }

    /// Non-interactive prompts block the feed until answered.
    pub fn is_blocking_prompt(&self) -> bool {
        matches!(
            self,
            TaskEvent::Message {
                kind: EventKind::Prompt,
                interactive: false,
                ..
            }
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventParseError {
    #[error("invalid event json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown event type {0:?}")]
    UnknownType(String),
    #[error("event is missing field {0}")]
    MissingField(&'static str),
}

/// Loose wire shape shared by plain events, chunks and end markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireEvent {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub interactive: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub end: Option<bool>,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub events: Vec<WireChunkLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireChunkLine {
    #[serde(default)]
    pub message: Option<String>,
}

impl TryFrom<WireEvent> for TaskEvent {
    type Error = EventParseError;

    fn try_from(wire: WireEvent) -> Result<Self, Self::Error> {
        let task_id = wire.task_id.map(TaskId::new);

        if wire.end.unwrap_or(false) {
            return Ok(TaskEvent::End {
                task_id,
                response: wire.response.filter(|value| !value.is_null()),
            });
        }

        if wire.kind.as_deref() == Some("chunk") {
            let lines = wire
                .events
                .into_iter()
                .filter_map(|line| line.message)
                .collect();
            return Ok(TaskEvent::Chunk { task_id, lines });
        }

        let tag = wire
            .event_type
            .ok_or(EventParseError::MissingField("type"))?;
        let kind = EventKind::parse(&tag).ok_or(EventParseError::UnknownType(tag))?;
        let message = wire
            .message
            .ok_or(EventParseError::MissingField("message"))?;

        Ok(TaskEvent::Message {
            task_id,
            kind,
            interactive: wire.interactive.unwrap_or(false),
            message,
        })
    }
}

/// Parses one JSON-encoded wire record.
pub fn parse_event(raw: &str) -> Result<TaskEvent, EventParseError> {
    let wire: WireEvent = serde_json::from_str(raw)?;
    TaskEvent::try_from(wire)
}
