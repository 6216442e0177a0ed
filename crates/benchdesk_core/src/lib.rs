//! benchdesk core: pure session state machine for task-event consoles.
//!
//! Everything here is free of I/O. The [`update`] function applies a [`Msg`]
//! to a [`SessionState`] and returns the [`Effect`]s the caller must execute.
mod action;
mod ansi;
mod effect;
mod email_chips;
mod event;
mod folder;
mod log_buffer;
mod modal;
mod msg;
mod notifications;
mod prompt;
mod stages;
mod state;
mod update;
mod view_model;

pub use action::{ActionRequest, ActionResponse};
pub use ansi::strip_ansi;
pub use effect::Effect;
pub use email_chips::{is_valid_email, EmailChips};
pub use event::{
    parse_event, EventKind, EventParseError, TaskEvent, TaskId, WireChunkLine, WireEvent,
};
pub use folder::{EntryType, FolderBrowser, FolderEntry, FolderListing, PathKind};
pub use log_buffer::{LogBuffer, DEFAULT_MAX_LOG_MESSAGES};
pub use modal::{Modal, ModalKind, ModalQueue};
pub use msg::Msg;
pub use notifications::{time_ago, Notification, NotificationCenter, NotificationKind, Toast};
pub use prompt::{PendingPrompt, PromptCycle, PromptPhase};
pub use stages::{StageList, StageRow, StageStatus};
pub use state::{
    FeedCloseReason, FeedStatus, ResultBlock, ResultStyle, SessionConfig, SessionState,
    YamlViewer, DEFAULT_PENDING_EVENT_LIMIT,
};
pub use update::update;
pub use view_model::{FolderView, SessionView, StageRowView};
