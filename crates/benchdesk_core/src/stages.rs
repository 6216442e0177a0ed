#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageStatus {
    #[default]
    InProgress,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRow {
    pub label: String,
    pub status: StageStatus,
}

/// Append-only list of task stages with a pointer to the open one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StageList {
    rows: Vec<StageRow>,
    current: Option<usize>,
}

impl StageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an in-progress row and makes it the current stage.
    pub fn push_in_progress(&mut self, label: impl Into<String>) -> usize {
        self.rows.push(StageRow {
            label: label.into(),
            status: StageStatus::InProgress,
        });
        let index = self.rows.len() - 1;
        self.current = Some(index);
        index
    }

    /// Marks a row complete. Out-of-range indexes are ignored.
    pub fn complete(&mut self, index: usize) {
        if let Some(row) = self.rows.get_mut(index) {
            row.status = StageStatus::Complete;
        }
    }

    /// Completes the current stage (if any) and opens a new one.
    pub fn advance(&mut self, label: impl Into<String>) -> usize {
        if let Some(current) = self.current {
            self.complete(current);
        }
        self.push_in_progress(label)
    }

    pub fn complete_all(&mut self) {
        for row in &mut self.rows {
            row.status = StageStatus::Complete;
        }
    }

    pub fn current(&self) -> Option<&StageRow> {
        self.current.and_then(|index| self.rows.get(index))
    }

    pub fn rows(&self) -> &[StageRow] {
        &self.rows
    }

    pub fn completed_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.status == StageStatus::Complete)
            .count()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{StageList, StageStatus};

    #[test]
    fn advance_completes_previous_stage() {
        let mut stages = StageList::new();
        stages.advance("download");
        stages.advance("verify");

        let statuses: Vec<_> = stages.rows().iter().map(|row| row.status).collect();
        assert_eq!(statuses, vec![StageStatus::Complete, StageStatus::InProgress]);
        assert_eq!(stages.current().map(|row| row.label.as_str()), Some("verify"));
    }

    #[test]
    fn completing_unknown_row_is_noop() {
        let mut stages = StageList::new();
        stages.complete(3);
        assert!(stages.rows().is_empty());
    }

    #[test]
    fn complete_all_closes_open_stage() {
        let mut stages = StageList::new();
        stages.advance("a");
        stages.advance("b");
        stages.complete_all();
        assert_eq!(stages.completed_count(), 2);
    }
}
