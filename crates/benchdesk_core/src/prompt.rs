use std::collections::VecDeque;

use crate::TaskId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPrompt {
    pub task_id: Option<TaskId>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptPhase {
    #[default]
    Idle,
    AwaitingResponse,
}

/// Yes/no prompt cycle. One prompt is visible; later ones wait in FIFO order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PromptCycle {
    visible: Option<PendingPrompt>,
    queued: VecDeque<PendingPrompt>,
}

impl PromptCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the prompt became visible immediately.
    pub fn receive(&mut self, prompt: PendingPrompt) -> bool {
        if self.visible.is_none() {
            self.visible = Some(prompt);
            true
        } else {
            self.queued.push_back(prompt);
            false
        }
    }

    /// Resolves the visible prompt and promotes the next queued one.
    pub fn answer(&mut self) -> Option<PendingPrompt> {
        let answered = self.visible.take()?;
        self.visible = self.queued.pop_front();
        Some(answered)
    }

    pub fn phase(&self) -> PromptPhase {
        if self.visible.is_some() {
            PromptPhase::AwaitingResponse
        } else {
            PromptPhase::Idle
        }
    }

    pub fn is_outstanding(&self) -> bool {
        self.phase() == PromptPhase::AwaitingResponse
    }

    pub fn visible(&self) -> Option<&PendingPrompt> {
        self.visible.as_ref()
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    pub fn clear(&mut self) {
        self.visible = None;
        self.queued.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{PendingPrompt, PromptCycle, PromptPhase};

    fn prompt(message: &str) -> PendingPrompt {
        PendingPrompt {
            task_id: None,
            message: message.to_string(),
        }
    }

    #[test]
    fn idle_to_awaiting_to_idle() {
        let mut cycle = PromptCycle::new();
        assert_eq!(cycle.phase(), PromptPhase::Idle);
        assert!(cycle.receive(prompt("send report?")));
        assert_eq!(cycle.phase(), PromptPhase::AwaitingResponse);
        assert_eq!(cycle.answer().map(|p| p.message), Some("send report?".into()));
        assert_eq!(cycle.phase(), PromptPhase::Idle);
    }

    #[test]
    fn second_prompt_waits_for_first_answer() {
        let mut cycle = PromptCycle::new();
        cycle.receive(prompt("first"));
        assert!(!cycle.receive(prompt("second")));
        assert_eq!(cycle.queued_len(), 1);

        cycle.answer();
        assert_eq!(cycle.visible().map(|p| p.message.as_str()), Some("second"));
        assert!(cycle.is_outstanding());
    }

    #[test]
    fn answer_without_prompt_is_none() {
        let mut cycle = PromptCycle::new();
        assert!(cycle.answer().is_none());
    }
}
