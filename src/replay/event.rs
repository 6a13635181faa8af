use super::model::ReplayState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplayEvent {
    Start,
    Complete,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayTransition {
    pub from: ReplayState,
    pub event: ReplayEvent,
    pub to: ReplayState,
}

impl ReplayTransition {
    pub const fn new(from: ReplayState, event: ReplayEvent, to: ReplayState) -> Self {
        Self { from, event, to }
    }
}
