//! Undo/redo over whole stroke groups.
//!
//! The log itself is the undo side: its groups are undone newest first. Undone
//! groups land on the redo stack and are discarded as soon as a new stroke
//! starts.

use crate::log::{Action, ActionLog, LogResult, StrokeGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    Applied,
    Empty,
}

impl HistoryOutcome {
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    log: ActionLog,
    redo_stack: Vec<StrokeGroup>,
}

impl History {
    pub const fn new() -> Self {
        Self {
            log: ActionLog::new(),
            redo_stack: Vec::new(),
        }
    }

    pub const fn from_log(log: ActionLog) -> Self {
        Self {
            log,
            redo_stack: Vec::new(),
        }
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    /// Appends live input. A new stroke start discards the redo future.
    pub fn append(&mut self, action: Action) -> LogResult<()> {
        self.log.append(action)?;
        if action.is_stroke_start() && !self.redo_stack.is_empty() {
            tracing::debug!(
                discarded = self.redo_stack.len(),
                "new stroke cleared redo stack"
            );
            self.redo_stack.clear();
        }
        Ok(())
    }

    pub fn undo(&mut self) -> HistoryOutcome {
        let Some(group) = self.log.pop_last_group() else {
            return HistoryOutcome::Empty;
        };
        tracing::debug!(segments = group.segment_count(), "undo stroke group");
        self.redo_stack.push(group);
        HistoryOutcome::Applied
    }

    pub fn redo(&mut self) -> HistoryOutcome {
        let Some(group) = self.redo_stack.pop() else {
            return HistoryOutcome::Empty;
        };
        tracing::debug!(segments = group.segment_count(), "redo stroke group");
        self.log.push_group(group);
        HistoryOutcome::Applied
    }

    pub fn undo_depth(&self) -> usize {
        self.log.group_count()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.log.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}
