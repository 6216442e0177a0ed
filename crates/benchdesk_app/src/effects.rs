use std::cell::Cell;

use benchdesk_core::{ActionResponse, Effect, FeedCloseReason, Msg};
use benchdesk_engine::{EngineEvent, EngineHandle, SourceExit};
use benchdesk_logging::{desk_debug, desk_info, desk_warn};

/// Turns reducer effects into engine commands and engine events into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    first_notifications: Cell<bool>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            first_notifications: Cell::new(true),
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitAction(request) => {
                    desk_info!(
                        "SubmitAction endpoint={} fields={}",
                        request.endpoint,
                        request.fields.len()
                    );
                    self.engine.submit_action(request);
                }
                Effect::FetchTaskId => self.engine.resolve_task(),
                Effect::OpenEventSource { task_id } => self.engine.open_source(task_id),
                Effect::CloseEventSource => self.engine.close_source(),
                Effect::SendPromptResponse { approved } => {
                    desk_info!("SendPromptResponse approved={}", approved);
                    self.engine.respond_prompt(approved);
                }
                Effect::AcknowledgeEvent { event_id } => self.engine.acknowledge_event(event_id),
                Effect::FetchNotifications => self.engine.fetch_notifications(),
                Effect::MarkNotificationRead { id } => self.engine.mark_notification_read(id),
                Effect::DeleteNotification { id } => self.engine.delete_notification(id),
                Effect::BrowseFolder { path, with_files } => self.engine.browse(path, with_files),
                Effect::FetchYaml {
                    entity,
                    entity_uid,
                    field,
                } => self.engine.fetch_yaml(entity, entity_uid, field),
            }
        }
    }

    /// Drains engine events that arrived since the last call.
    pub fn poll(&self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            let first = self.first_notifications.get();
            if let EngineEvent::NotificationsFetched(Ok(_)) = &event {
                self.first_notifications.set(false);
            }
            if let Some(msg) = engine_event_to_msg(event, first) {
                msgs.push(msg);
            }
        }
        msgs
    }
}

/// Maps one engine event. The first notification fetch loads the list
/// without raising toasts.
pub fn engine_event_to_msg(event: EngineEvent, first_notifications: bool) -> Option<Msg> {
    let msg = match event {
        EngineEvent::TaskIdResolved(Ok(task_id)) => Msg::TaskIdResolved(task_id),
        EngineEvent::TaskIdResolved(Err(err)) => {
            Msg::FeedClosed(FeedCloseReason::Failed(format!("current task: {err}")))
        }
        EngineEvent::SourceEvent(event) => Msg::EventReceived(event),
        EngineEvent::SourceClosed(exit) => {
            let reason = match exit {
                SourceExit::Completed => FeedCloseReason::Completed,
                SourceExit::PromptOutstanding => FeedCloseReason::PromptOutstanding,
                SourceExit::Expired => FeedCloseReason::Expired,
                SourceExit::Failed(err) => FeedCloseReason::Failed(err.to_string()),
                SourceExit::Cancelled => {
                    desk_debug!("event source cancelled");
                    return None;
                }
            };
            Msg::FeedClosed(reason)
        }
        EngineEvent::ActionCompleted { endpoint, result } => match result {
            Ok(response) => Msg::ActionCompleted(response),
            Err(err) => {
                desk_warn!("action {} failed: {}", endpoint, err);
                Msg::ActionCompleted(ActionResponse {
                    error: Some(err.to_string()),
                    ..ActionResponse::default()
                })
            }
        },
        EngineEvent::PromptResponseSent(Ok(())) => return None,
        EngineEvent::PromptResponseSent(Err(err)) => failed("prompt response", err.to_string()),
        EngineEvent::EventAcknowledged { result: Ok(()), .. } => return None,
        EngineEvent::EventAcknowledged {
            event_id,
            result: Err(err),
        } => failed(&format!("acknowledge event {event_id}"), err.to_string()),
        EngineEvent::NotificationsFetched(Ok(list)) if first_notifications => {
            Msg::NotificationsLoaded(list)
        }
        EngineEvent::NotificationsFetched(Ok(list)) => Msg::NotificationsReceived(list),
        EngineEvent::NotificationsFetched(Err(err)) => failed("notifications", err.to_string()),
        EngineEvent::NotificationMarkedRead { id, result: Ok(()) } => {
            Msg::NotificationMarkedRead { id }
        }
        EngineEvent::NotificationMarkedRead { id, result: Err(err) } => {
            failed(&format!("mark notification {id} read"), err.to_string())
        }
        EngineEvent::NotificationDeleted { id, result: Ok(()) } => Msg::NotificationDeleted { id },
        EngineEvent::NotificationDeleted { id, result: Err(err) } => {
            failed(&format!("delete notification {id}"), err.to_string())
        }
        EngineEvent::FolderListed(Ok(listing)) => Msg::FolderListed(listing),
        EngineEvent::FolderListed(Err(err)) => failed("browse", err.to_string()),
        EngineEvent::YamlFetched(Ok(content)) => Msg::YamlLoaded(content),
        EngineEvent::YamlFetched(Err(err)) => Msg::YamlFailed(err.message),
    };
    Some(msg)
}

fn failed(request: &str, message: String) -> Msg {
    Msg::RequestFailed {
        request: request.to_string(),
        message,
    }
}
