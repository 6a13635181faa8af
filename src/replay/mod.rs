//! Tick-driven replay of an action log, independent of the original timing.

pub mod driver;
pub mod error;
pub mod event;
pub mod machine;
pub mod model;
pub mod scheduler;
pub mod ticks;

pub use driver::{drive_replay, drive_replay_until, CancelToken, ReplayFrame};
pub use error::{ReplayError, ReplayResult};
pub use event::{ReplayEvent, ReplayTransition};
pub use machine::ReplayStateMachine;
pub use model::ReplayState;
pub use scheduler::{ReplayScheduler, DEFAULT_TICK_INTERVAL};
pub use ticks::{CountedTicks, IntervalTicks, TickSource};
