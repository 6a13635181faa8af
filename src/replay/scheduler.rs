use std::time::Duration;

use super::error::ReplayResult;
use super::{ReplayEvent, ReplayState, ReplayStateMachine};
use crate::log::Action;
use crate::projector::PenState;
use crate::surface::RasterSurface;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Cooperative replay player. Each `tick` applies exactly one action; the
/// scheduler does no work between ticks.
#[derive(Debug, Clone)]
pub struct ReplayScheduler {
    machine: ReplayStateMachine,
    cursor: usize,
    pen: PenState,
    interval: Duration,
}

impl Default for ReplayScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl ReplayScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            machine: ReplayStateMachine::new(),
            cursor: 0,
            pen: PenState::new(),
            interval,
        }
    }

    pub fn state(&self) -> ReplayState {
        self.machine.state()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Clears `surface`, rewinds to the first action and enters `Running`.
    pub fn start(&mut self, surface: &mut RasterSurface) -> ReplayResult<ReplayState> {
        let state = self.machine.transition(ReplayEvent::Start)?;
        surface.clear();
        self.cursor = 0;
        self.pen = PenState::new();
        Ok(state)
    }

    /// Applies the action under the cursor and advances it. Reaching the end
    /// of `actions` completes the replay. Ticks outside `Running` do nothing.
    pub fn tick(&mut self, actions: &[Action], surface: &mut RasterSurface) -> ReplayState {
        if !self.state().is_running() {
            return self.state();
        }

        if let Some(action) = actions.get(self.cursor) {
            self.pen.apply(action, surface);
            self.cursor += 1;
        }

        if self.cursor >= actions.len() {
            self.complete();
        }
        self.state()
    }

    /// Stops a running replay, leaving `surface` partially replayed.
    pub fn cancel(&mut self) -> ReplayResult<ReplayState> {
        let state = self.machine.transition(ReplayEvent::Cancel)?;
        tracing::debug!(cursor = self.cursor, "replay cancelled");
        Ok(state)
    }

    fn complete(&mut self) {
        if let Err(err) = self.machine.transition(ReplayEvent::Complete) {
            tracing::warn!(?err, "replay completion rejected");
        }
    }
}
