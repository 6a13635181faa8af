use super::event::ReplayEvent;
use super::model::ReplayState;
use thiserror::Error;

pub type ReplayResult<T> = std::result::Result<T, ReplayError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("invalid replay transition: from {from:?} using event {event:?}")]
    InvalidTransition {
        from: ReplayState,
        event: ReplayEvent,
    },
}
