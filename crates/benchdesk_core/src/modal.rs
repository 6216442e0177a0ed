use std::collections::VecDeque;

use crate::{ActionResponse, Effect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Info,
    Error,
    Confirm,
    Reload { seconds: u32 },
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub kind: ModalKind,
    pub title: String,
    pub body: String,
    /// Executed when the user confirms the dialog.
    pub on_confirm: Option<Effect>,
}

impl Modal {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: ModalKind::Info,
            title: title.into(),
            body: body.into(),
            on_confirm: None,
        }
    }

    pub fn error(title: impl Into<String>, response: &ActionResponse) -> Self {
        Self {
            kind: ModalKind::Error,
            title: title.into(),
            body: response.error_text(),
            on_confirm: None,
        }
    }

    pub fn confirm(question: &str, on_confirm: Effect) -> Self {
        Self {
            kind: ModalKind::Confirm,
            title: "Confirmation Prompt".to_string(),
            body: format!("Are you sure you want to {question}"),
            on_confirm: Some(on_confirm),
        }
    }

    pub fn reload(title: impl Into<String>, seconds: u32) -> Self {
        Self {
            kind: ModalKind::Reload { seconds },
            title: title.into(),
            body: format!("The view will reload in {seconds} ..."),
            on_confirm: None,
        }
    }

    pub fn critical(event_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ModalKind::Critical,
            title: "Critical Warning".to_string(),
            body: message.into(),
            on_confirm: Some(Effect::AcknowledgeEvent {
                event_id: event_id.into(),
            }),
        }
    }
}

/// Single-visible modal slot with a FIFO of waiting requests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalQueue {
    visible: Option<Modal>,
    queued: VecDeque<Modal>,
}

impl ModalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the modal is shown right away.
    pub fn show(&mut self, modal: Modal) -> bool {
        if self.visible.is_none() {
            self.visible = Some(modal);
            true
        } else {
            self.queued.push_back(modal);
            false
        }
    }

    /// Closes the visible modal and shows the next queued one.
    pub fn close(&mut self) -> Option<Modal> {
        let closed = self.visible.take();
        if closed.is_some() {
            self.visible = self.queued.pop_front();
        }
        closed
    }

    pub fn visible(&self) -> Option<&Modal> {
        self.visible.as_ref()
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{Modal, ModalQueue};

    #[test]
    fn three_requests_show_one_at_a_time_in_order() {
        let mut queue = ModalQueue::new();
        assert!(queue.show(Modal::info("one", "")));
        assert!(!queue.show(Modal::info("two", "")));
        assert!(!queue.show(Modal::info("three", "")));

        let mut shown = Vec::new();
        while let Some(visible) = queue.visible() {
            shown.push(visible.title.clone());
            assert!(queue.queued_len() <= 2);
            queue.close();
        }
        assert_eq!(shown, vec!["one", "two", "three"]);
    }

    #[test]
    fn close_without_visible_modal_is_noop() {
        let mut queue = ModalQueue::new();
        assert!(queue.close().is_none());
        assert!(queue.visible().is_none());
    }

    #[test]
    fn confirm_modal_phrases_question() {
        let modal = Modal::confirm("logout?", crate::Effect::FetchNotifications);
        assert_eq!(modal.body, "Are you sure you want to logout?");
    }
}
