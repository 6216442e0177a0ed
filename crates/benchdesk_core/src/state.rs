use std::collections::VecDeque;

use serde_json::Value;

use crate::view_model::{FolderView, SessionView, StageRowView};
use crate::{
    ActionRequest, EmailChips, FolderBrowser, LogBuffer, ModalQueue, NotificationCenter,
    PromptCycle, StageList, TaskEvent, TaskId, Toast, DEFAULT_MAX_LOG_MESSAGES,
};

pub const DEFAULT_PENDING_EVENT_LIMIT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub max_log_messages: usize,
    /// Events held back while the task id is unknown.
    pub pending_event_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_log_messages: DEFAULT_MAX_LOG_MESSAGES,
            pending_event_limit: DEFAULT_PENDING_EVENT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStatus {
    #[default]
    Idle,
    ResolvingTask,
    Streaming,
    /// Consumption is paused until the visible prompt is answered.
    Suspended,
    Finished,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCloseReason {
    Completed,
    PromptOutstanding,
    Expired,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStyle {
    Print,
    Warning,
    Error,
    Highlight,
    Url,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBlock {
    pub style: ResultStyle,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum YamlViewer {
    #[default]
    Hidden,
    Loading,
    Loaded(String),
    Failed(String),
}

/// Everything the console knows for the current view.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    config: SessionConfig,
    pub(crate) panel_title: Option<String>,
    pub(crate) active_task: Option<TaskId>,
    pub(crate) awaiting_task_id: bool,
    pub(crate) pending_events: VecDeque<TaskEvent>,
    /// Page history waiting for the task id; not subject to the pending limit.
    pub(crate) restored_events: Vec<TaskEvent>,
    pub(crate) deferred_events: VecDeque<TaskEvent>,
    pub(crate) pending_action: Option<ActionRequest>,
    pub(crate) stages: StageList,
    pub(crate) log: LogBuffer,
    pub(crate) results: Vec<ResultBlock>,
    pub(crate) yaml: Option<String>,
    pub(crate) prompts: PromptCycle,
    pub(crate) modals: ModalQueue,
    pub(crate) notifications: NotificationCenter,
    pub(crate) toasts: Vec<Toast>,
    pub(crate) emails: EmailChips,
    pub(crate) folders: FolderBrowser,
    pub(crate) selected_folder: Option<String>,
    pub(crate) yaml_viewer: YamlViewer,
    pub(crate) feed: FeedStatus,
    pub(crate) task_response: Option<Value>,
    pub(crate) last_failure: Option<String>,
    dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            panel_title: None,
            active_task: None,
            awaiting_task_id: false,
            pending_events: VecDeque::new(),
            restored_events: Vec::new(),
            deferred_events: VecDeque::new(),
            pending_action: None,
            stages: StageList::new(),
            log: LogBuffer::new(config.max_log_messages),
            results: Vec::new(),
            yaml: None,
            prompts: PromptCycle::new(),
            modals: ModalQueue::new(),
            notifications: NotificationCenter::new(),
            toasts: Vec::new(),
            emails: EmailChips::new(),
            folders: FolderBrowser::default(),
            selected_folder: None,
            yaml_viewer: YamlViewer::Hidden,
            feed: FeedStatus::Idle,
            task_response: None,
            last_failure: None,
            dirty: false,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn active_task(&self) -> Option<&TaskId> {
        self.active_task.as_ref()
    }

    pub fn feed(&self) -> FeedStatus {
        self.feed
    }

    pub fn is_prompt_outstanding(&self) -> bool {
        self.prompts.is_outstanding()
    }

    pub fn stages(&self) -> &StageList {
        &self.stages
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn results(&self) -> &[ResultBlock] {
        &self.results
    }

    pub fn prompts(&self) -> &PromptCycle {
        &self.prompts
    }

    pub fn modals(&self) -> &ModalQueue {
        &self.modals
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn emails(&self) -> &EmailChips {
        &self.emails
    }

    pub fn folders(&self) -> &FolderBrowser {
        &self.folders
    }

    pub fn task_response(&self) -> Option<&Value> {
        self.task_response.as_ref()
    }

    /// An action was submitted and its response has not arrived yet.
    pub fn is_action_pending(&self) -> bool {
        self.pending_action.is_some()
    }

    pub fn pending_event_count(&self) -> usize {
        self.pending_events.len()
    }

    pub fn restored_event_count(&self) -> usize {
        self.restored_events.len()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            panel_title: self.panel_title.clone(),
            feed: self.feed,
            active_task: self.active_task.as_ref().map(ToString::to_string),
            stages: self
                .stages
                .rows()
                .iter()
                .map(|row| StageRowView {
                    label: row.label.clone(),
                    status: row.status,
                })
                .collect(),
            completed_stages: self.stages.completed_count(),
            log_lines: self.log.lines().map(ToOwned::to_owned).collect(),
            evicted_log_lines: self.log.evicted(),
            results: self.results.clone(),
            yaml: self.yaml.clone(),
            prompt: self.prompts.visible().map(|p| p.message.clone()),
            queued_prompts: self.prompts.queued_len(),
            modal: self.modals.visible().cloned(),
            queued_modals: self.modals.queued_len(),
            notifications: self.notifications.items().to_vec(),
            unread_notifications: self.notifications.unread_count(),
            emails: self.emails.emails().to_vec(),
            folder: FolderView {
                selected_path: self.folders.selected_path().to_string(),
                path_kind: self.folders.path_kind(),
                listing: self.folders.listing().cloned(),
                confirmed: self.selected_folder.clone(),
            },
            yaml_viewer: self.yaml_viewer.clone(),
            task_response: self.task_response.clone(),
            last_failure: self.last_failure.clone(),
            dirty: self.dirty,
        }
    }

    /// Clears the task panel ahead of a new action.
    pub(crate) fn reset_panel(&mut self, title: String) {
        self.panel_title = Some(title);
        self.active_task = None;
        self.pending_events.clear();
        self.restored_events.clear();
        self.deferred_events.clear();
        self.stages.clear();
        self.log.clear();
        self.results.clear();
        self.yaml = None;
        self.prompts.clear();
        self.task_response = None;
        self.last_failure = None;
    }

    /// Holds an event until the task id is known, dropping the oldest on overflow.
    pub(crate) fn hold_pending(&mut self, event: TaskEvent) {
        self.pending_events.push_back(event);
        while self.pending_events.len() > self.config.pending_event_limit.max(1) {
            self.pending_events.pop_front();
        }
    }

    /// Restored history first, then events held back while resolving.
    pub(crate) fn take_pending(&mut self) -> Vec<TaskEvent> {
        let mut events = std::mem::take(&mut self.restored_events);
        events.extend(self.pending_events.drain(..));
        events
    }

    pub(crate) fn take_deferred(&mut self) -> Vec<TaskEvent> {
        self.deferred_events.drain(..).collect()
    }

    /// Drains toasts raised since the last call.
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the state changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
