use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use benchdesk_core::{
    parse_event, update, ActionRequest, FeedCloseReason, FeedStatus, ModalKind, Msg,
    SessionState, TaskEvent, YamlViewer,
};
use benchdesk_engine::EngineHandle;
use benchdesk_logging::{desk_info, desk_warn, set_active_task};

use crate::cli::Command;
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::input::{self, Input, HELP};
use crate::render::{render_toast, Renderer};

const LOOP_INTERVAL: Duration = Duration::from_millis(20);

/// When the console stops on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitWhen {
    /// The task feed settled and nothing waits on the user.
    TaskSettled,
    /// The YAML viewer has content or an error.
    YamlShown,
    /// Only on `quit` or end of input.
    Never,
}

pub fn run(config: &AppConfig, command: Command) -> anyhow::Result<()> {
    let engine =
        EngineHandle::new(config.client_settings()).context("failed to start the engine")?;
    let mut console = Console::new(config, EffectRunner::new(engine));

    let (exit_when, initial) = initial_messages(command)?;
    let refresh = match exit_when {
        ExitWhen::Never => Some(Duration::from_secs(config.notification_refresh_secs.max(1))),
        _ => None,
    };

    let (input_tx, input_rx) = mpsc::channel();
    input::spawn_reader(input_tx);

    for msg in initial {
        console.dispatch(msg);
    }
    let mut last_refresh = Instant::now();
    let mut input_open = true;

    loop {
        for msg in console.effects.poll() {
            console.dispatch(msg);
        }

        if input_open {
            match input_rx.try_recv() {
                Ok(Some(Input::Msg(msg))) => console.dispatch(msg),
                Ok(Some(Input::Help)) => console.print(HELP.lines().map(str::to_string))?,
                Ok(Some(Input::Quit)) => break,
                Ok(None) => console.print(["unknown command, type help".to_string()])?,
                Err(TryRecvError::Empty) => {}
                // Without stdin a task still runs to its end.
                Err(TryRecvError::Disconnected) => {
                    if exit_when != ExitWhen::TaskSettled {
                        break;
                    }
                    input_open = false;
                }
            }
        }

        if let Some(interval) = refresh {
            if last_refresh.elapsed() >= interval {
                console.dispatch(Msg::NotificationsRequested);
                last_refresh = Instant::now();
            }
        }

        console.close_expired_reload();
        console.flush()?;

        if console.should_exit(exit_when) {
            desk_info!("console finished");
            break;
        }
        thread::sleep(LOOP_INTERVAL);
    }
    Ok(())
}

fn initial_messages(command: Command) -> anyhow::Result<(ExitWhen, Vec<Msg>)> {
    let plan = match command {
        Command::Follow {
            title,
            previous_events,
            critical,
        } => {
            let mut msgs = Vec::new();
            if let Some(path) = previous_events {
                msgs.push(Msg::PreviousEventsRestored(load_previous_events(&path)?));
            }
            msgs.push(Msg::ResumeRequested { title });
            for (event_id, message) in critical {
                msgs.push(Msg::CriticalWarningReceived { event_id, message });
            }
            (ExitWhen::TaskSettled, msgs)
        }
        Command::Run {
            endpoint,
            fields,
            title,
            confirm,
        } => {
            let mut request = ActionRequest::new(endpoint);
            request.fields = fields;
            if let Some(title) = title {
                request = request.panel_title(title);
            }
            let msg = match confirm {
                Some(question) => Msg::ConfirmRequested { question, request },
                None => Msg::ActionSubmitted(request),
            };
            (ExitWhen::TaskSettled, vec![msg])
        }
        Command::Notifications => (ExitWhen::Never, vec![Msg::NotificationsRequested]),
        Command::Browse { with_files } => (
            ExitWhen::Never,
            vec![Msg::FolderBrowserOpened { with_files }],
        ),
        Command::Yaml {
            entity,
            entity_uid,
            field,
        } => (
            ExitWhen::YamlShown,
            vec![Msg::YamlRequested {
                entity,
                entity_uid,
                field,
            }],
        ),
    };
    Ok(plan)
}

/// Reads a JSON array of raw event records. Records that do not parse are skipped.
fn load_previous_events(path: &Path) -> anyhow::Result<Vec<TaskEvent>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))?;
    let records: Vec<serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("{path:?} is not a JSON array of events"))?;

    let mut events = Vec::with_capacity(records.len());
    for record in records {
        match parse_event(&record.to_string()) {
            Ok(event) => events.push(event),
            Err(err) => desk_warn!("skipping previous event: {}", err),
        }
    }
    desk_info!("restored {} previous events from {:?}", events.len(), path);
    Ok(events)
}

/// How `msg` changes the task tag on this thread's log records.
/// `Some(None)` clears it.
fn task_label_change(msg: &Msg) -> Option<Option<&str>> {
    match msg {
        Msg::TaskIdResolved(task_id) => Some(Some(task_id.as_str())),
        Msg::ActionSubmitted(_)
        | Msg::ResumeRequested { .. }
        | Msg::FeedClosed(
            FeedCloseReason::Completed | FeedCloseReason::Expired | FeedCloseReason::Failed(_),
        ) => Some(None),
        _ => None,
    }
}

struct Console {
    state: SessionState,
    effects: EffectRunner,
    renderer: Renderer,
    reload_deadline: Option<Instant>,
}

impl Console {
    fn new(config: &AppConfig, effects: EffectRunner) -> Self {
        Self {
            state: SessionState::with_config(config.session_config()),
            effects,
            renderer: Renderer::new(),
            reload_deadline: None,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        if let Some(label) = task_label_change(&msg) {
            set_active_task(label);
        }
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.effects.enqueue(effects);
    }

    /// Reload dialogs close themselves once their countdown runs out.
    fn close_expired_reload(&mut self) {
        let seconds = match self.state.modals().visible().map(|modal| modal.kind) {
            Some(ModalKind::Reload { seconds }) => seconds,
            _ => {
                self.reload_deadline = None;
                return;
            }
        };
        let deadline = *self
            .reload_deadline
            .get_or_insert_with(|| Instant::now() + Duration::from_secs(u64::from(seconds)));
        if Instant::now() >= deadline {
            self.reload_deadline = None;
            self.dispatch(Msg::ModalClosed);
        }
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        let toasts = self.state.take_toasts();
        if !toasts.is_empty() {
            self.print(toasts.iter().map(render_toast))?;
        }
        if self.state.consume_dirty() {
            let now = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
            let lines = self.renderer.render(&self.state.view(), now);
            self.print(lines)?;
        }
        Ok(())
    }

    fn print(&self, lines: impl IntoIterator<Item = String>) -> anyhow::Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for line in lines {
            writeln!(out, "{line}")?;
        }
        out.flush()?;
        Ok(())
    }

    fn should_exit(&self, exit_when: ExitWhen) -> bool {
        let state = &self.state;
        match exit_when {
            ExitWhen::TaskSettled => {
                matches!(
                    state.feed(),
                    FeedStatus::Idle | FeedStatus::Finished | FeedStatus::Failed
                ) && !state.is_prompt_outstanding()
                    && !state.is_action_pending()
                    && state.modals().visible().is_none()
            }
            ExitWhen::YamlShown => matches!(
                state.view().yaml_viewer,
                YamlViewer::Loaded(_) | YamlViewer::Failed(_)
            ),
            ExitWhen::Never => false,
        }
    }
}
