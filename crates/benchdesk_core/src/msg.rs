use crate::{
    ActionRequest, ActionResponse, FeedCloseReason, FolderListing, Modal, Notification, TaskEvent,
    TaskId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted an action form; the panel is reset for the new task.
    ActionSubmitted(ActionRequest),
    /// Attach to a task that is already running on the backend.
    ResumeRequested { title: Option<String> },
    /// Engine resolved the id of the running task.
    TaskIdResolved(TaskId),
    /// One event from the task feed.
    EventReceived(TaskEvent),
    /// Events the server rendered into the page before the client started.
    PreviousEventsRestored(Vec<TaskEvent>),
    /// The event source stopped.
    FeedClosed(FeedCloseReason),
    /// User answered the visible prompt.
    PromptAnswered { approved: bool },
    /// Action endpoint returned its response.
    ActionCompleted(ActionResponse),
    ModalRequested(Modal),
    ModalClosed,
    ModalConfirmed,
    /// User asked for a confirmation dialog before running an action.
    ConfirmRequested {
        question: String,
        request: ActionRequest,
    },
    CriticalWarningReceived { event_id: String, message: String },
    /// Notifications rendered with the page; no toasts.
    NotificationsLoaded(Vec<Notification>),
    NotificationsRequested,
    /// Fresh notifications fetched from the backend; each one raises a toast.
    NotificationsReceived(Vec<Notification>),
    MarkNotificationRead { id: String },
    NotificationMarkedRead { id: String },
    DeleteNotification { id: String },
    NotificationDeleted { id: String },
    EmailKeyEntered(String),
    EmailsPasted(String),
    EmailsSeeded(String),
    EmailChipRemoved(usize),
    FolderBrowserOpened { with_files: bool },
    FolderListed(FolderListing),
    FolderEntryClicked(usize),
    FolderParentClicked,
    FolderSelectionConfirmed,
    YamlRequested {
        entity: String,
        entity_uid: String,
        field: String,
    },
    YamlLoaded(String),
    YamlFailed(String),
    YamlHidden,
    /// A backend request failed at the transport level.
    RequestFailed { request: String, message: String },
    /// Render tick used to coalesce rendering.
    Tick,
    NoOp,
}
