use serde_json::Value;

use crate::{
    FeedStatus, FolderListing, Modal, Notification, PathKind, ResultBlock, StageStatus, YamlViewer,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionView {
    pub panel_title: Option<String>,
    pub feed: FeedStatus,
    pub active_task: Option<String>,
    pub stages: Vec<StageRowView>,
    pub completed_stages: usize,
    pub log_lines: Vec<String>,
    pub evicted_log_lines: u64,
    pub results: Vec<ResultBlock>,
    pub yaml: Option<String>,
    pub prompt: Option<String>,
    pub queued_prompts: usize,
    pub modal: Option<Modal>,
    pub queued_modals: usize,
    pub notifications: Vec<Notification>,
    pub unread_notifications: usize,
    pub emails: Vec<String>,
    pub folder: FolderView,
    pub yaml_viewer: YamlViewer,
    pub task_response: Option<Value>,
    pub last_failure: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRowView {
    pub label: String,
    pub status: StageStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FolderView {
    pub selected_path: String,
    pub path_kind: PathKind,
    pub listing: Option<FolderListing>,
    /// Path the user confirmed with "select".
    pub confirmed: Option<String>,
}
