//! Append-only action log and the stroke group index derived from it.

mod groups;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Color, Point};

pub use groups::{StrokeGroup, StrokeGroups};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
}

/// A single recorded drawing step.
///
/// `DrawSegment` only carries the new endpoint; the segment runs from the
/// point established by the previous action to this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    #[serde(rename = "start")]
    StartStroke {
        point: Point,
        color: Color,
        width: u32,
        tool: Tool,
    },
    #[serde(rename = "draw")]
    DrawSegment { point: Point },
}

impl Action {
    pub const fn point(&self) -> Point {
        match self {
            Self::StartStroke { point, .. } | Self::DrawSegment { point } => *point,
        }
    }

    pub const fn is_stroke_start(&self) -> bool {
        matches!(self, Self::StartStroke { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    #[error("draw segment at index {index} has no preceding stroke start")]
    OrphanSegment { index: usize },
    #[error("failed to parse action log document: {0}")]
    Parse(String),
    #[error("failed to encode action log document: {0}")]
    Encode(String),
}

pub type LogResult<T> = std::result::Result<T, LogError>;

/// On-disk shape of a log: `{"actions": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LogDocument {
    actions: Vec<Action>,
}

/// Ordered drawing actions; insertion order is time order.
///
/// Every `DrawSegment` is governed by an earlier `StartStroke`, so the log
/// always partitions exactly into stroke groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionLog {
    actions: Vec<Action>,
}

impl ActionLog {
    pub const fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    pub fn from_actions(actions: Vec<Action>) -> LogResult<Self> {
        if let Some(first) = actions.first() {
            if !first.is_stroke_start() {
                return Err(LogError::OrphanSegment { index: 0 });
            }
        }
        Ok(Self { actions })
    }

    pub fn from_json(json: &str) -> LogResult<Self> {
        let document: LogDocument =
            serde_json::from_str(json).map_err(|err| LogError::Parse(err.to_string()))?;
        Self::from_actions(document.actions)
    }

    pub fn to_json(&self) -> LogResult<String> {
        let document = LogDocument {
            actions: self.actions.clone(),
        };
        serde_json::to_string_pretty(&document).map_err(|err| LogError::Encode(err.to_string()))
    }

    pub fn append(&mut self, action: Action) -> LogResult<()> {
        if self.actions.is_empty() && !action.is_stroke_start() {
            tracing::warn!(?action, "rejecting draw segment without a stroke start");
            return Err(LogError::OrphanSegment { index: 0 });
        }
        self.actions.push(action);
        Ok(())
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Index of the `StartStroke` that opens the trailing group.
    fn last_group_start(&self) -> Option<usize> {
        self.actions.iter().rposition(Action::is_stroke_start)
    }

    /// The trailing stroke group: the last `StartStroke` and everything after it.
    pub fn last_group(&self) -> Option<&[Action]> {
        self.last_group_start().map(|start| &self.actions[start..])
    }

    pub fn groups(&self) -> StrokeGroups<'_> {
        StrokeGroups::new(&self.actions)
    }

    pub fn group_count(&self) -> usize {
        self.groups().count()
    }

    pub(crate) fn pop_last_group(&mut self) -> Option<StrokeGroup> {
        let start = self.last_group_start()?;
        Some(StrokeGroup::from_tail(self.actions.split_off(start)))
    }

    pub(crate) fn push_group(&mut self, group: StrokeGroup) {
        self.actions.extend(group.into_actions());
    }
}
