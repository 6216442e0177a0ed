use crate::{ActionRequest, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitAction(ActionRequest),
    FetchTaskId,
    OpenEventSource { task_id: TaskId },
    CloseEventSource,
    SendPromptResponse { approved: bool },
    AcknowledgeEvent { event_id: String },
    FetchNotifications,
    MarkNotificationRead { id: String },
    DeleteNotification { id: String },
    BrowseFolder { path: String, with_files: bool },
    FetchYaml {
        entity: String,
        entity_uid: String,
        field: String,
    },
}
