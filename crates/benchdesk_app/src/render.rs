use benchdesk_core::{
    time_ago, EntryType, FeedStatus, FolderView, Modal, ModalKind, Notification, NotificationKind,
    ResultBlock, ResultStyle, SessionView, StageStatus, Toast, YamlViewer,
};

/// Prints only what changed since the previous view, so the terminal reads
/// like a transcript of the task.
#[derive(Debug, Default)]
pub struct Renderer {
    panel_title: Option<String>,
    active_task: Option<String>,
    feed: FeedStatus,
    stages: Vec<StageStatus>,
    log_total: u64,
    results: usize,
    yaml: Option<String>,
    prompt: Option<String>,
    modal: Option<Modal>,
    notifications: Vec<Notification>,
    emails: Vec<String>,
    folder: FolderView,
    yaml_viewer: YamlViewer,
    last_failure: Option<String>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines to print for `view`. `now` is the current time in epoch seconds.
    pub fn render(&mut self, view: &SessionView, now: f64) -> Vec<String> {
        let mut out = Vec::new();

        if view.panel_title != self.panel_title {
            if let Some(title) = &view.panel_title {
                out.push(format!("== {title} =="));
            }
            self.panel_title = view.panel_title.clone();
            self.forget_panel();
        }
        // A task that replaces another one starts with an empty panel.
        if view.active_task != self.active_task {
            if self.active_task.is_some() {
                self.forget_panel();
            }
            self.active_task = view.active_task.clone();
        }

        self.render_stages(view, &mut out);
        self.render_log(view, &mut out);
        self.render_results(view, &mut out);

        if view.yaml != self.yaml {
            if let Some(yaml) = &view.yaml {
                out.push("--- yaml ---".to_string());
                out.extend(yaml.lines().map(str::to_string));
            }
            self.yaml = view.yaml.clone();
        }

        if view.prompt != self.prompt {
            if let Some(prompt) = &view.prompt {
                out.push(format!("? {prompt} [y/n]"));
            }
            self.prompt = view.prompt.clone();
        }

        if view.modal != self.modal {
            if let Some(modal) = &view.modal {
                out.extend(render_modal(modal));
            }
            self.modal = view.modal.clone();
        }

        if view.feed != self.feed {
            match view.feed {
                FeedStatus::Finished => out.push("task finished".to_string()),
                FeedStatus::Failed => out.push("event feed stopped".to_string()),
                _ => {}
            }
            self.feed = view.feed;
        }

        if view.notifications != self.notifications {
            out.push(format!(
                "notifications ({} unread):",
                view.unread_notifications
            ));
            out.extend(
                view.notifications
                    .iter()
                    .map(|notification| render_notification(notification, now)),
            );
            self.notifications = view.notifications.clone();
        }

        if view.emails != self.emails {
            out.push(format!("emails: {}", view.emails.join(", ")));
            self.emails = view.emails.clone();
        }

        self.render_folder(view, &mut out);

        if view.yaml_viewer != self.yaml_viewer {
            match &view.yaml_viewer {
                YamlViewer::Hidden => {}
                YamlViewer::Loading => out.push("loading yaml...".to_string()),
                YamlViewer::Loaded(content) => out.extend(content.lines().map(str::to_string)),
                YamlViewer::Failed(detail) => out.push(format!("yaml error: {detail}")),
            }
            self.yaml_viewer = view.yaml_viewer.clone();
        }

        if view.last_failure != self.last_failure {
            if let Some(failure) = &view.last_failure {
                out.push(format!("error: {failure}"));
            }
            self.last_failure = view.last_failure.clone();
        }

        out
    }

    fn forget_panel(&mut self) {
        self.stages.clear();
        self.log_total = 0;
        self.results = 0;
        self.yaml = None;
    }

    fn render_stages(&mut self, view: &SessionView, out: &mut Vec<String>) {
        if view.stages.len() < self.stages.len() {
            self.stages.clear();
        }
        for (index, row) in view.stages.iter().enumerate() {
            match self.stages.get(index).copied() {
                None => {
                    out.push(format!("{} {}", stage_marker(row.status), row.label));
                    self.stages.push(row.status);
                }
                Some(StageStatus::InProgress) if row.status == StageStatus::Complete => {
                    out.push(format!("{} {}", stage_marker(row.status), row.label));
                    self.stages[index] = row.status;
                }
                Some(_) => {}
            }
        }
    }

    fn render_log(&mut self, view: &SessionView, out: &mut Vec<String>) {
        let total = view.evicted_log_lines + view.log_lines.len() as u64;
        if total < self.log_total {
            self.log_total = 0;
        }
        let fresh = (total - self.log_total).min(view.log_lines.len() as u64) as usize;
        let start = view.log_lines.len() - fresh;
        out.extend(view.log_lines[start..].iter().map(|line| format!("  | {line}")));
        self.log_total = total;
    }

    fn render_results(&mut self, view: &SessionView, out: &mut Vec<String>) {
        if view.results.len() < self.results {
            self.results = 0;
        }
        out.extend(view.results[self.results..].iter().map(render_result));
        self.results = view.results.len();
    }

    fn render_folder(&mut self, view: &SessionView, out: &mut Vec<String>) {
        let folder = &view.folder;
        if folder.listing != self.folder.listing {
            if let Some(listing) = &folder.listing {
                out.push(format!("folder: {}", listing.current_folder));
                if listing.have_parent {
                    out.push("  up  ..".to_string());
                }
                for (index, entry) in listing.folders.iter().enumerate() {
                    let suffix = match entry.entry_type {
                        EntryType::Dir => "/",
                        EntryType::File => "",
                    };
                    out.push(format!("  {index:>3}  {}{suffix}", entry.name));
                }
            }
        }
        if folder.confirmed != self.folder.confirmed {
            if let Some(path) = &folder.confirmed {
                out.push(format!("selected: {path}"));
            }
        }
        self.folder = folder.clone();
    }
}

fn stage_marker(status: StageStatus) -> &'static str {
    match status {
        StageStatus::InProgress => "[..]",
        StageStatus::Complete => "[ok]",
    }
}

fn render_result(block: &ResultBlock) -> String {
    let text = &block.text;
    match block.style {
        ResultStyle::Print => text.clone(),
        ResultStyle::Warning => format!("warning: {text}"),
        ResultStyle::Error => format!("error: {text}"),
        ResultStyle::Highlight => format!("** {text} **"),
        ResultStyle::Url => format!("link: {text}"),
        ResultStyle::Code => format!("code: {text}"),
    }
}

fn render_modal(modal: &Modal) -> Vec<String> {
    let hint = match modal.kind {
        ModalKind::Info | ModalKind::Error | ModalKind::Reload { .. } => "(close)",
        ModalKind::Confirm => "(ok / close)",
        ModalKind::Critical => "(ok to acknowledge)",
    };
    let mut lines = vec![format!("[{}] {hint}", modal.title)];
    lines.extend(modal.body.lines().map(|line| format!("  {line}")));
    lines
}

fn render_notification(notification: &Notification, now: f64) -> String {
    let marker = if notification.read { ' ' } else { '*' };
    let mut line = format!(
        "{marker} {:<8} {} ({}) [{}]",
        kind_label(notification.kind),
        notification.message,
        time_ago(notification.timestamp, now),
        notification.id
    );
    if let Some(url) = &notification.url {
        line.push_str(&format!(" {url}"));
    }
    line
}

pub fn render_toast(toast: &Toast) -> String {
    format!(">> {}: {}", kind_label(toast.kind), toast.message)
}

fn kind_label(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Success => "success",
        NotificationKind::Failed => "failed",
        NotificationKind::Info => "info",
    }
}
