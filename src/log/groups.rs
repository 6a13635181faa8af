use super::Action;

/// An owned stroke group: one `StartStroke` followed by its `DrawSegment`s.
///
/// Groups only come out of [`super::ActionLog`], which guarantees the leading
/// action is a stroke start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrokeGroup {
    actions: Vec<Action>,
}

impl StrokeGroup {
    pub(super) fn from_tail(actions: Vec<Action>) -> Self {
        debug_assert!(actions.first().is_some_and(Action::is_stroke_start));
        Self { actions }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn start(&self) -> Option<&Action> {
        self.actions.first()
    }

    pub fn segment_count(&self) -> usize {
        self.actions.len().saturating_sub(1)
    }

    pub(super) fn into_actions(self) -> Vec<Action> {
        self.actions
    }
}

/// Borrowing iterator over the maximal stroke groups of a log, oldest first.
#[derive(Debug, Clone)]
pub struct StrokeGroups<'a> {
    remaining: &'a [Action],
}

impl<'a> StrokeGroups<'a> {
    pub(super) fn new(actions: &'a [Action]) -> Self {
        Self { remaining: actions }
    }
}

impl<'a> Iterator for StrokeGroups<'a> {
    type Item = &'a [Action];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let end = self.remaining[1..]
            .iter()
            .position(Action::is_stroke_start)
            .map_or(self.remaining.len(), |offset| offset + 1);
        let (group, rest) = self.remaining.split_at(end);
        self.remaining = rest;
        Some(group)
    }
}
