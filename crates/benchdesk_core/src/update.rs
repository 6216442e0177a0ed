use benchdesk_logging::{desk_debug, desk_warn};

use crate::{
    strip_ansi, ActionRequest, Effect, EventKind, FeedCloseReason, FeedStatus, Modal, Msg,
    PendingPrompt, ResultBlock, ResultStyle, SessionState, TaskEvent, Toast, YamlViewer,
};

const RELOAD_SECONDS: u32 = 3;

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::ActionSubmitted(request) => submit_action(&mut state, request),
        Msg::ResumeRequested { title } => {
            if title.is_some() {
                state.panel_title = title;
            }
            state.active_task = None;
            state.awaiting_task_id = true;
            state.feed = FeedStatus::ResolvingTask;
            state.mark_dirty();
            vec![Effect::FetchTaskId]
        }
        Msg::TaskIdResolved(task_id) => {
            desk_debug!("following task {}", task_id);
            state.active_task = Some(task_id.clone());
            state.awaiting_task_id = false;
            if state.feed != FeedStatus::Finished {
                state.feed = FeedStatus::Streaming;
            }
            for event in state.take_pending() {
                apply_event(&mut state, event);
            }
            state.mark_dirty();
            resume_feed(&mut state)
        }
        Msg::EventReceived(event) => {
            apply_event(&mut state, event);
            Vec::new()
        }
        Msg::PreviousEventsRestored(events) => {
            if state.active_task.is_some() && !state.awaiting_task_id {
                for event in events {
                    apply_event(&mut state, event);
                }
            } else {
                desk_debug!(
                    "holding {} restored events until the task id is known",
                    events.len()
                );
                state.restored_events.extend(events);
            }
            Vec::new()
        }
        Msg::FeedClosed(reason) => {
            close_feed(&mut state, reason);
            Vec::new()
        }
        Msg::PromptAnswered { approved } => answer_prompt(&mut state, approved),
        Msg::ActionCompleted(response) => {
            let request = state.pending_action.take();
            let modal = if response.is_success() {
                state.stages.complete_all();
                let title = request
                    .map(|r| r.success_title)
                    .unwrap_or_else(|| "Action Succeeded".to_string());
                Modal::reload(title, RELOAD_SECONDS)
            } else {
                let title = request
                    .map(|r| r.failure_title)
                    .unwrap_or_else(|| "Action Failed".to_string());
                Modal::error(title, &response)
            };
            state.modals.show(modal);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ModalRequested(modal) => {
            state.modals.show(modal);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ModalClosed => {
            if state.modals.close().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ModalConfirmed => match state.modals.close() {
            Some(modal) => {
                state.mark_dirty();
                match modal.on_confirm {
                    Some(Effect::SubmitAction(request)) => submit_action(&mut state, request),
                    Some(effect) => vec![effect],
                    None => Vec::new(),
                }
            }
            None => Vec::new(),
        },
        Msg::ConfirmRequested { question, request } => {
            state
                .modals
                .show(Modal::confirm(&question, Effect::SubmitAction(request)));
            state.mark_dirty();
            Vec::new()
        }
        Msg::CriticalWarningReceived { event_id, message } => {
            state.modals.show(Modal::critical(event_id, message));
            state.mark_dirty();
            Vec::new()
        }
        Msg::NotificationsLoaded(notifications) => {
            for notification in notifications {
                state.notifications.add(notification);
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::NotificationsRequested => vec![Effect::FetchNotifications],
        Msg::NotificationsReceived(notifications) => {
            if notifications.is_empty() {
                return (state, Vec::new());
            }
            for notification in notifications {
                state.toasts.push(Toast {
                    kind: notification.kind,
                    message: notification.message.clone(),
                });
                state.notifications.add(notification);
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::MarkNotificationRead { id } => match state.notifications.get(&id) {
            Some(notification) if !notification.read => vec![Effect::MarkNotificationRead { id }],
            _ => Vec::new(),
        },
        Msg::NotificationMarkedRead { id } => {
            if state.notifications.mark_read(&id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DeleteNotification { id } => {
            if state.notifications.get(&id).is_some() {
                vec![Effect::DeleteNotification { id }]
            } else {
                Vec::new()
            }
        }
        Msg::NotificationDeleted { id } => {
            if state.notifications.remove(&id).is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::EmailKeyEntered(raw) => {
            if state.emails.key_entered(&raw) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::EmailsPasted(raw) => {
            if state.emails.paste(&raw) > 0 {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::EmailsSeeded(raw) => {
            match state.emails.seed_from_json(&raw) {
                Ok(0) => {}
                Ok(_) => state.mark_dirty(),
                Err(err) => desk_warn!("ignoring malformed email allow list: {}", err),
            }
            Vec::new()
        }
        Msg::EmailChipRemoved(index) => {
            if state.emails.remove(index).is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FolderBrowserOpened { with_files } => {
            state.folders.set_with_files(with_files);
            let path = state.folders.open();
            state.mark_dirty();
            vec![Effect::BrowseFolder { path, with_files }]
        }
        Msg::FolderListed(listing) => {
            state.folders.listing_received(listing);
            state.mark_dirty();
            Vec::new()
        }
        Msg::FolderEntryClicked(index) => {
            let next = state.folders.click_entry(index);
            state.mark_dirty();
            browse_to(&state, next)
        }
        Msg::FolderParentClicked => {
            let next = state.folders.click_parent();
            browse_to(&state, next)
        }
        Msg::FolderSelectionConfirmed => {
            state.selected_folder = Some(state.folders.selected_path().to_string());
            state.mark_dirty();
            Vec::new()
        }
        Msg::YamlRequested {
            entity,
            entity_uid,
            field,
        } => {
            state.yaml_viewer = YamlViewer::Loading;
            state.mark_dirty();
            vec![Effect::FetchYaml {
                entity,
                entity_uid,
                field,
            }]
        }
        Msg::YamlLoaded(content) => {
            state.yaml_viewer = YamlViewer::Loaded(content);
            state.mark_dirty();
            Vec::new()
        }
        Msg::YamlFailed(detail) => {
            state.yaml_viewer = YamlViewer::Failed(detail);
            state.mark_dirty();
            Vec::new()
        }
        Msg::YamlHidden => {
            state.yaml_viewer = YamlViewer::Hidden;
            state.mark_dirty();
            Vec::new()
        }
        Msg::RequestFailed { request, message } => {
            desk_warn!("request {} failed: {}", request, message);
            state.last_failure = Some(format!("{request}: {message}"));
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit_action(state: &mut SessionState, request: ActionRequest) -> Vec<Effect> {
    state.reset_panel(request.panel_title.clone());
    state.awaiting_task_id = true;
    state.feed = FeedStatus::ResolvingTask;
    state.pending_action = Some(request.clone());
    state.mark_dirty();
    vec![
        Effect::CloseEventSource,
        Effect::SubmitAction(request),
        Effect::FetchTaskId,
    ]
}

/// Opens the event source again unless the task ended or a prompt blocks it.
fn resume_feed(state: &mut SessionState) -> Vec<Effect> {
    if state.feed == FeedStatus::Finished {
        return Vec::new();
    }
    if state.prompts.is_outstanding() {
        state.feed = FeedStatus::Suspended;
        return Vec::new();
    }
    match state.active_task.clone() {
        Some(task_id) => {
            state.feed = FeedStatus::Streaming;
            vec![Effect::OpenEventSource { task_id }]
        }
        None => Vec::new(),
    }
}

fn answer_prompt(state: &mut SessionState, approved: bool) -> Vec<Effect> {
    if state.prompts.answer().is_none() {
        return Vec::new();
    }
    state.mark_dirty();
    let mut effects = vec![Effect::SendPromptResponse { approved }];
    if state.prompts.is_outstanding() {
        return effects;
    }

    if state.feed != FeedStatus::Finished {
        state.feed = FeedStatus::Streaming;
    }
    for event in state.take_deferred() {
        apply_event(state, event);
    }
    effects.extend(resume_feed(state));
    effects
}

fn close_feed(state: &mut SessionState, reason: FeedCloseReason) {
    match reason {
        FeedCloseReason::Completed => {
            if matches!(state.feed, FeedStatus::Streaming | FeedStatus::Suspended) {
                state.stages.complete_all();
                state.feed = FeedStatus::Finished;
            }
        }
        FeedCloseReason::PromptOutstanding => {
            if state.prompts.is_outstanding() {
                state.feed = FeedStatus::Suspended;
            }
        }
        FeedCloseReason::Expired => {
            state.feed = FeedStatus::Failed;
            state.last_failure = Some("event feed reached its maximum lifetime".to_string());
        }
        FeedCloseReason::Failed(message) => {
            state.feed = FeedStatus::Failed;
            state.last_failure = Some(message);
        }
    }
    state.mark_dirty();
}

fn browse_to(state: &SessionState, next: Option<String>) -> Vec<Effect> {
    match next {
        Some(path) => vec![Effect::BrowseFolder {
            path,
            with_files: state.folders.with_files(),
        }],
        None => Vec::new(),
    }
}

/// Filters an event by task and prompt gate, then dispatches it.
fn apply_event(state: &mut SessionState, event: TaskEvent) {
    if state.awaiting_task_id && state.active_task.is_none() {
        state.hold_pending(event);
        return;
    }
    if event.task_id() != state.active_task.as_ref() {
        desk_debug!(
            "dropping event for task {:?} (active {:?})",
            event.task_id(),
            state.active_task
        );
        return;
    }
    if state.prompts.is_outstanding() && !event.is_blocking_prompt() {
        state.deferred_events.push_back(event);
        return;
    }
    dispatch_event(state, event);
}

fn dispatch_event(state: &mut SessionState, event: TaskEvent) {
    match event {
        TaskEvent::End { response, .. } => {
            state.stages.complete_all();
            state.task_response = response;
            state.feed = FeedStatus::Finished;
        }
        TaskEvent::Chunk { lines, .. } => {
            state
                .log
                .extend(lines.iter().map(|line| strip_ansi(line).into_owned()));
        }
        TaskEvent::Message {
            kind,
            interactive: true,
            message,
            ..
        } => {
            let clean = strip_ansi(&message).into_owned();
            if kind == EventKind::Text {
                state.stages.advance(clean);
            } else {
                state.log.push(clean);
            }
        }
        TaskEvent::Message {
            task_id,
            kind,
            interactive: false,
            message,
        } => {
            let clean = strip_ansi(&message).into_owned();
            let style = match kind {
                EventKind::Print => ResultStyle::Print,
                EventKind::Warning => ResultStyle::Warning,
                EventKind::Error => ResultStyle::Error,
                EventKind::Highlight => ResultStyle::Highlight,
                EventKind::Url => ResultStyle::Url,
                EventKind::Code => ResultStyle::Code,
                EventKind::Yaml => {
                    state.yaml = Some(message);
                    state.mark_dirty();
                    return;
                }
                EventKind::Prompt => {
                    state.prompts.receive(PendingPrompt {
                        task_id,
                        message: clean,
                    });
                    state.feed = FeedStatus::Suspended;
                    state.mark_dirty();
                    return;
                }
                EventKind::Text => return,
            };
            state.results.push(ResultBlock { style, text: clean });
        }
    }
    state.mark_dirty();
}
