use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use benchdesk_core::{ActionRequest, TaskId};
use benchdesk_logging::{desk_debug, desk_info, desk_warn};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::source::{
    ChannelEventSink, EventSink, EventSource, GenerationSink, PollSource, StreamSource,
};
use crate::{
    Backend, ClientError, ClientSettings, EngineError, EngineEvent, FailureKind, ReqwestBackend,
    Transport,
};

enum EngineCommand {
    OpenSource { task_id: TaskId },
    CloseSource,
    Request(Request),
}

/// One-shot backend calls; each answers with exactly one `EngineEvent`.
enum Request {
    ResolveTask,
    SubmitAction(ActionRequest),
    RespondPrompt { approved: bool },
    Acknowledge { event_id: String },
    FetchNotifications,
    MarkNotificationRead { id: String },
    DeleteNotification { id: String },
    Browse { path: String, with_files: bool },
    FetchYaml {
        entity: String,
        entity_uid: String,
        field: String,
    },
}

/// Handle to the worker thread that talks to the backend.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    /// Builds the HTTP client and the event source selected by `settings.transport`.
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let backend = ReqwestBackend::new(settings.clone())?;
        let source: Arc<dyn EventSource> = match settings.transport {
            Transport::Poll => Arc::new(PollSource::new(
                Arc::new(backend.clone()),
                settings.clone(),
            )),
            Transport::Stream => Arc::new(StreamSource::new(backend.clone())),
        };
        Self::with_parts(Arc::new(backend), source, settings)
    }

    pub fn with_parts(
        backend: Arc<dyn Backend>,
        source: Arc<dyn EventSource>,
        settings: ClientSettings,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = Runtime::new()?;

        thread::spawn(move || {
            let worker = Worker {
                backend,
                source,
                settings,
                event_tx,
                generation: Arc::new(AtomicU64::new(0)),
                open_source: None,
            };
            worker.run(runtime, cmd_rx);
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn resolve_task(&self) {
        self.send(EngineCommand::Request(Request::ResolveTask));
    }

    /// Opens an event source for `task_id`, closing any source still open.
    pub fn open_source(&self, task_id: TaskId) {
        self.send(EngineCommand::OpenSource { task_id });
    }

    pub fn close_source(&self) {
        self.send(EngineCommand::CloseSource);
    }

    pub fn submit_action(&self, request: ActionRequest) {
        self.send(EngineCommand::Request(Request::SubmitAction(request)));
    }

    pub fn respond_prompt(&self, approved: bool) {
        self.send(EngineCommand::Request(Request::RespondPrompt { approved }));
    }

    pub fn acknowledge_event(&self, event_id: impl Into<String>) {
        self.send(EngineCommand::Request(Request::Acknowledge {
            event_id: event_id.into(),
        }));
    }

    pub fn fetch_notifications(&self) {
        self.send(EngineCommand::Request(Request::FetchNotifications));
    }

    pub fn mark_notification_read(&self, id: impl Into<String>) {
        self.send(EngineCommand::Request(Request::MarkNotificationRead { id: id.into() }));
    }

    pub fn delete_notification(&self, id: impl Into<String>) {
        self.send(EngineCommand::Request(Request::DeleteNotification { id: id.into() }));
    }

    pub fn browse(&self, path: impl Into<String>, with_files: bool) {
        self.send(EngineCommand::Request(Request::Browse {
            path: path.into(),
            with_files,
        }));
    }

    pub fn fetch_yaml(
        &self,
        entity: impl Into<String>,
        entity_uid: impl Into<String>,
        field: impl Into<String>,
    ) {
        self.send(EngineCommand::Request(Request::FetchYaml {
            entity: entity.into(),
            entity_uid: entity_uid.into(),
            field: field.into(),
        }));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            desk_warn!("engine worker is gone, dropping command");
        }
    }
}

struct Worker {
    backend: Arc<dyn Backend>,
    source: Arc<dyn EventSource>,
    settings: ClientSettings,
    event_tx: mpsc::Sender<EngineEvent>,
    generation: Arc<AtomicU64>,
    open_source: Option<CancellationToken>,
}

impl Worker {
    fn run(mut self, runtime: Runtime, cmd_rx: mpsc::Receiver<EngineCommand>) {
        while let Ok(command) = cmd_rx.recv() {
            match command {
                EngineCommand::OpenSource { task_id } => {
                    self.close_source();
                    let cancel = CancellationToken::new();
                    self.open_source = Some(cancel.clone());
                    let generation = self.generation.load(Ordering::SeqCst);
                    let sink = GenerationSink::new(
                        self.event_tx.clone(),
                        generation,
                        self.generation.clone(),
                    );
                    let source = self.source.clone();
                    desk_info!("opening event source {} for task {}", generation, task_id);
                    runtime.spawn(async move {
                        let exit = source.run(&task_id, &sink, &cancel).await;
                        sink.emit(EngineEvent::SourceClosed(exit));
                    });
                }
                EngineCommand::CloseSource => self.close_source(),
                EngineCommand::Request(request) => {
                    let backend = self.backend.clone();
                    let settings = self.settings.clone();
                    let sink = ChannelEventSink::new(self.event_tx.clone());
                    runtime.spawn(async move {
                        let event = handle_request(backend.as_ref(), &settings, request).await;
                        sink.emit(event);
                    });
                }
            }
        }
        self.close_source();
        desk_debug!("engine command channel closed");
    }

    /// Cancels the open source and retires its generation.
    fn close_source(&mut self) {
        if let Some(cancel) = self.open_source.take() {
            cancel.cancel();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

async fn handle_request(
    backend: &dyn Backend,
    settings: &ClientSettings,
    request: Request,
) -> EngineEvent {
    match request {
        Request::ResolveTask => {
            EngineEvent::TaskIdResolved(resolve_task(backend, settings).await)
        }
        Request::SubmitAction(request) => {
            let result = backend.submit_action(&request).await;
            EngineEvent::ActionCompleted {
                endpoint: request.endpoint,
                result,
            }
        }
        Request::RespondPrompt { approved } => {
            EngineEvent::PromptResponseSent(backend.respond_prompt(approved).await)
        }
        Request::Acknowledge { event_id } => {
            let result = backend.acknowledge_event(&event_id).await;
            EngineEvent::EventAcknowledged { event_id, result }
        }
        Request::FetchNotifications => {
            EngineEvent::NotificationsFetched(backend.notifications().await)
        }
        Request::MarkNotificationRead { id } => {
            let result = backend.mark_notification_read(&id).await;
            EngineEvent::NotificationMarkedRead { id, result }
        }
        Request::DeleteNotification { id } => {
            let result = backend.delete_notification(&id).await;
            EngineEvent::NotificationDeleted { id, result }
        }
        Request::Browse { path, with_files } => {
            EngineEvent::FolderListed(backend.browse(&path, with_files).await)
        }
        Request::FetchYaml {
            entity,
            entity_uid,
            field,
        } => EngineEvent::YamlFetched(backend.fetch_yaml(&entity, &entity_uid, &field).await),
    }
}

/// Asks for the running task id, retrying while the backend has not registered one yet.
async fn resolve_task(
    backend: &dyn Backend,
    settings: &ClientSettings,
) -> Result<TaskId, ClientError> {
    let attempts = settings.task_id_attempts.max(1);
    let mut last_error = ClientError::new(FailureKind::Unavailable, "no running task");
    for attempt in 1..=attempts {
        match backend.current_task().await {
            Ok(Some(task_id)) => return Ok(task_id),
            Ok(None) => desk_debug!("no running task yet (attempt {})", attempt),
            Err(err) => {
                desk_warn!("failed to fetch the running task: {}", err);
                last_error = err;
            }
        }
        if attempt < attempts {
            tokio::time::sleep(settings.backoff(attempt)).await;
        }
    }
    Err(last_error)
}
