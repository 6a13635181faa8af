use super::error::{ReplayError, ReplayResult};
use super::{ReplayEvent, ReplayState, ReplayTransition};

#[derive(Debug, Clone, Default)]
pub struct ReplayStateMachine {
    state: ReplayState,
    transition_history: Vec<ReplayTransition>,
}

impl ReplayStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    pub fn can_transition(&self, event: ReplayEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: ReplayEvent) -> Option<ReplayState> {
        use ReplayEvent::*;
        match (self.state, event) {
            (ReplayState::Idle | ReplayState::Finished | ReplayState::Cancelled, Start) => {
                Some(ReplayState::Running)
            }
            (ReplayState::Running, Complete) => Some(ReplayState::Finished),
            (ReplayState::Running, Cancel) => Some(ReplayState::Cancelled),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: ReplayEvent) -> ReplayResult<ReplayState> {
        tracing::debug!(from = ?self.state, event = ?event, "request replay transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid replay transition requested");
            ReplayError::InvalidTransition { from, event }
        })?;

        self.transition_history
            .push(ReplayTransition::new(self.state, event, next));
        self.state = next;
        Ok(self.state)
    }

    pub fn history(&self) -> &[ReplayTransition] {
        &self.transition_history
    }
}

impl std::fmt::Display for ReplayStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReplayState::{:?}", self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_transition_tracks_valid_and_invalid_events() {
        let mut machine = ReplayStateMachine::new();
        assert!(machine.can_transition(ReplayEvent::Start));
        assert!(!machine.can_transition(ReplayEvent::Complete));
        assert!(!machine.can_transition(ReplayEvent::Cancel));

        machine
            .transition(ReplayEvent::Start)
            .expect("idle -> running should transition");

        assert!(machine.can_transition(ReplayEvent::Complete));
        assert!(machine.can_transition(ReplayEvent::Cancel));
        assert!(!machine.can_transition(ReplayEvent::Start));
    }

    #[test]
    fn transition_records_history_with_ordered_entries() {
        let mut machine = ReplayStateMachine::new();
        machine.transition(ReplayEvent::Start).expect("start");
        machine.transition(ReplayEvent::Cancel).expect("cancel");
        machine.transition(ReplayEvent::Start).expect("restart");
        machine.transition(ReplayEvent::Complete).expect("complete");

        assert_eq!(machine.state(), ReplayState::Finished);
        assert_eq!(
            machine.history(),
            &[
                ReplayTransition::new(ReplayState::Idle, ReplayEvent::Start, ReplayState::Running),
                ReplayTransition::new(
                    ReplayState::Running,
                    ReplayEvent::Cancel,
                    ReplayState::Cancelled
                ),
                ReplayTransition::new(
                    ReplayState::Cancelled,
                    ReplayEvent::Start,
                    ReplayState::Running
                ),
                ReplayTransition::new(
                    ReplayState::Running,
                    ReplayEvent::Complete,
                    ReplayState::Finished
                ),
            ]
        );
    }

    #[test]
    fn invalid_transition_returns_error_without_mutating_history() {
        let mut machine = ReplayStateMachine::new();

        let err = machine
            .transition(ReplayEvent::Cancel)
            .expect_err("idle -> cancel should fail");
        assert_eq!(
            err,
            ReplayError::InvalidTransition {
                from: ReplayState::Idle,
                event: ReplayEvent::Cancel
            }
        );
        assert_eq!(machine.state(), ReplayState::Idle);
        assert!(machine.history().is_empty());
    }
}
