//! Drawing session: owns the log, the undo/redo stacks, the raster surface,
//! tool settings and the replay scheduler.
//!
//! Live pointer input draws incrementally. Undo and redo rebuild the surface
//! from the log. While a replay is running the log is frozen: stroke input,
//! undo and redo are rejected until the replay finishes or is cancelled.

mod settings;

use std::time::Duration;

use thiserror::Error;

use crate::geometry::{Color, Dimensions, Point};
use crate::history::{History, HistoryOutcome};
use crate::log::{Action, ActionLog, LogError, Tool};
use crate::projector::{project_onto, PenState};
use crate::replay::{ReplayError, ReplayScheduler, ReplayState, DEFAULT_TICK_INTERVAL};
use crate::surface::RasterSurface;

pub use settings::{ToolSettings, ERASER_WIDTH_RANGE, PEN_WIDTH_RANGE};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a replay is running; editing is disabled until it finishes or is cancelled")]
    ReplayActive,
    #[error("a stroke is in progress")]
    StrokeInProgress,
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone)]
pub struct Session {
    history: History,
    surface: RasterSurface,
    settings: ToolSettings,
    pen: PenState,
    drawing: bool,
    replay: ReplayScheduler,
    surface_stale: bool,
}

impl Session {
    pub fn new(dims: Dimensions, settings: ToolSettings) -> Self {
        Self::with_log(ActionLog::new(), dims, settings, DEFAULT_TICK_INTERVAL)
    }

    /// Opens an existing log; the surface is projected from it.
    pub fn with_log(
        log: ActionLog,
        dims: Dimensions,
        settings: ToolSettings,
        replay_interval: Duration,
    ) -> Self {
        let mut surface = RasterSurface::new(dims);
        project_onto(log.actions(), &mut surface);
        Self {
            history: History::from_log(log),
            surface,
            settings,
            pen: PenState::new(),
            drawing: false,
            replay: ReplayScheduler::new(replay_interval),
            surface_stale: false,
        }
    }

    pub fn log(&self) -> &ActionLog {
        self.history.log()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn dimensions(&self) -> Dimensions {
        self.surface.dimensions()
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn replay_state(&self) -> ReplayState {
        self.replay.state()
    }

    pub fn replay_interval(&self) -> Duration {
        self.replay.interval()
    }

    /// `(applied, total)` for the current or last replay.
    pub fn replay_progress(&self) -> (usize, usize) {
        (self.replay.cursor(), self.log().len())
    }

    pub fn set_color(&mut self, color: Color) {
        self.settings.set_pen_color(color);
    }

    pub fn set_pen_width(&mut self, width: u32) {
        self.settings.set_pen_width(width);
    }

    pub fn set_eraser_width(&mut self, width: u32) {
        self.settings.set_eraser_width(width);
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.settings.set_tool(tool);
    }

    pub fn pointer_down(&mut self, point: Point) -> SessionResult<()> {
        self.ensure_editable()?;
        self.ensure_projected();
        let action = self.settings.stroke_start(point);
        self.history.append(action)?;
        self.pen.apply(&action, &mut self.surface);
        self.drawing = true;
        tracing::debug!(?point, tool = ?self.settings.tool(), "stroke started");
        Ok(())
    }

    /// Extends the active stroke. Returns `false` when no stroke is active.
    pub fn pointer_move(&mut self, point: Point) -> SessionResult<bool> {
        if !self.drawing {
            return Ok(false);
        }
        let action = Action::DrawSegment { point };
        self.history.append(action)?;
        self.pen.apply(&action, &mut self.surface);
        Ok(true)
    }

    pub fn pointer_up(&mut self) {
        if self.drawing {
            tracing::debug!(actions = self.log().len(), "stroke committed");
        }
        self.drawing = false;
    }

    pub fn undo(&mut self) -> SessionResult<HistoryOutcome> {
        self.ensure_idle_input()?;
        let outcome = self.history.undo();
        self.after_history_change(outcome, "undo");
        Ok(outcome)
    }

    pub fn redo(&mut self) -> SessionResult<HistoryOutcome> {
        self.ensure_idle_input()?;
        let outcome = self.history.redo();
        self.after_history_change(outcome, "redo");
        Ok(outcome)
    }

    /// Copies current pixels into a surface of `dims`; the log is not replayed.
    pub fn resize(&mut self, dims: Dimensions) {
        self.surface.resize(dims);
    }

    pub fn start_replay(&mut self) -> SessionResult<ReplayState> {
        self.ensure_idle_input()?;
        let state = self.replay.start(&mut self.surface)?;
        self.surface_stale = true;
        tracing::debug!(actions = self.log().len(), "replay started");
        Ok(state)
    }

    pub fn tick_replay(&mut self) -> ReplayState {
        let state = self.replay.tick(self.history.log().actions(), &mut self.surface);
        if state == ReplayState::Finished && self.surface_stale {
            self.surface_stale = false;
            tracing::debug!(actions = self.log().len(), "replay finished");
        }
        state
    }

    /// Stops a running replay, leaving the surface partially replayed. A no-op
    /// when no replay is running.
    pub fn cancel_replay(&mut self) -> SessionResult<ReplayState> {
        if !self.replay.state().is_running() {
            return Ok(self.replay.state());
        }
        Ok(self.replay.cancel()?)
    }

    /// Rebuilds the surface from the log if a cancelled replay left it partial.
    pub fn ensure_projected(&mut self) {
        if self.surface_stale && !self.replay.state().is_running() {
            project_onto(self.history.log().actions(), &mut self.surface);
            self.surface_stale = false;
        }
    }

    fn ensure_editable(&self) -> SessionResult<()> {
        if self.replay.state().is_running() {
            tracing::warn!("edit rejected while replay is running");
            return Err(SessionError::ReplayActive);
        }
        Ok(())
    }

    fn ensure_idle_input(&self) -> SessionResult<()> {
        self.ensure_editable()?;
        if self.drawing {
            return Err(SessionError::StrokeInProgress);
        }
        Ok(())
    }

    fn after_history_change(&mut self, outcome: HistoryOutcome, label: &'static str) {
        match outcome {
            HistoryOutcome::Applied => {
                project_onto(self.history.log().actions(), &mut self.surface);
                self.surface_stale = false;
            }
            HistoryOutcome::Empty => {
                tracing::debug!("{label} stack empty");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::project;

    fn session() -> Session {
        Session::new(Dimensions::new(40, 40), ToolSettings::default())
    }

    fn stroke(session: &mut Session, points: &[(i32, i32)]) {
        let (first, rest) = points.split_first().unwrap();
        session.pointer_down(Point::from(*first)).unwrap();
        for point in rest {
            session.pointer_move(Point::from(*point)).unwrap();
        }
        session.pointer_up();
    }

    fn assert_consistent(session: &Session) {
        let expected = project(session.log().actions(), session.dimensions());
        assert_eq!(session.surface().as_raw(), expected.as_raw());
    }

    #[test]
    fn live_drawing_matches_projection() {
        let mut session = session();
        stroke(&mut session, &[(2, 2), (20, 5), (30, 30)]);
        session.set_tool(Tool::Eraser);
        stroke(&mut session, &[(25, 0), (25, 39)]);
        assert_eq!(session.log().len(), 5);
        assert_consistent(&session);
    }

    #[test]
    fn settings_changed_mid_stroke_do_not_affect_it() {
        let mut session = session();
        session.pointer_down(Point::new(5, 5)).unwrap();
        session.set_color(Color::new(0, 200, 0));
        session.set_pen_width(9);
        session.pointer_move(Point::new(30, 5)).unwrap();
        session.pointer_up();

        assert_eq!(session.surface().pixel(20, 5), Some(Color::BLACK));
        assert_eq!(session.surface().pixel(20, 8), Some(Color::WHITE));
        assert_consistent(&session);
    }

    #[test]
    fn pointer_move_without_press_is_ignored() {
        let mut session = session();
        assert!(!session.pointer_move(Point::new(3, 3)).unwrap());
        assert!(session.log().is_empty());
    }

    #[test]
    fn undo_is_rejected_mid_stroke() {
        let mut session = session();
        session.pointer_down(Point::new(1, 1)).unwrap();
        session.pointer_move(Point::new(4, 4)).unwrap();
        assert!(matches!(session.undo(), Err(SessionError::StrokeInProgress)));
        assert_eq!(session.log().len(), 2);
    }

    #[test]
    fn undo_and_redo_rebuild_the_surface() {
        let mut session = session();
        stroke(&mut session, &[(2, 2), (10, 10)]);
        stroke(&mut session, &[(30, 2), (30, 30)]);

        assert_eq!(session.undo().unwrap(), HistoryOutcome::Applied);
        assert_eq!(session.surface().pixel(30, 20), Some(Color::WHITE));
        assert_eq!(session.surface().pixel(6, 6), Some(Color::BLACK));
        assert_consistent(&session);

        assert_eq!(session.redo().unwrap(), HistoryOutcome::Applied);
        assert_eq!(session.surface().pixel(30, 20), Some(Color::BLACK));
        assert_consistent(&session);
    }

    #[test]
    fn editing_is_rejected_while_replay_runs() {
        let mut session = session();
        stroke(&mut session, &[(2, 2), (10, 10), (20, 20)]);
        session.start_replay().unwrap();

        assert!(matches!(
            session.pointer_down(Point::new(1, 1)),
            Err(SessionError::ReplayActive)
        ));
        assert!(matches!(session.undo(), Err(SessionError::ReplayActive)));
        assert!(matches!(session.redo(), Err(SessionError::ReplayActive)));
        assert!(matches!(session.start_replay(), Err(SessionError::ReplayActive)));
        assert!(!session.pointer_move(Point::new(5, 5)).unwrap());

        session.set_color(Color::new(1, 2, 3));
        assert_eq!(session.settings().pen_color(), Color::new(1, 2, 3));
    }

    #[test]
    fn replay_cannot_start_mid_stroke() {
        let mut session = session();
        session.pointer_down(Point::new(1, 1)).unwrap();
        assert!(matches!(
            session.start_replay(),
            Err(SessionError::StrokeInProgress)
        ));
    }

    #[test]
    fn cancelled_replay_surface_is_rebuilt_before_next_edit() {
        let mut session = session();
        stroke(&mut session, &[(2, 2), (10, 10), (20, 20), (30, 30)]);
        session.start_replay().unwrap();
        session.tick_replay();
        session.tick_replay();
        assert_eq!(session.cancel_replay().unwrap(), ReplayState::Cancelled);
        assert_eq!(session.surface().pixel(25, 25), Some(Color::WHITE));

        session.pointer_down(Point::new(35, 2)).unwrap();
        session.pointer_up();
        assert_eq!(session.surface().pixel(25, 25), Some(Color::BLACK));
        assert_consistent(&session);
    }

    #[test]
    fn cancel_without_running_replay_is_a_noop() {
        let mut session = session();
        assert_eq!(session.cancel_replay().unwrap(), ReplayState::Idle);
    }

    #[test]
    fn finished_replay_leaves_surface_consistent() {
        let mut session = session();
        stroke(&mut session, &[(2, 2), (10, 10)]);
        stroke(&mut session, &[(12, 30), (30, 12)]);
        session.start_replay().unwrap();
        while session.tick_replay().is_running() {}
        assert_eq!(session.replay_state(), ReplayState::Finished);
        assert_eq!(session.replay_progress(), (4, 4));
        assert_consistent(&session);
    }

    #[test]
    fn resize_copies_pixels_without_replaying() {
        let mut session = session();
        stroke(&mut session, &[(30, 30), (35, 35)]);
        session.resize(Dimensions::new(20, 20));
        session.resize(Dimensions::new(40, 40));
        assert!(session.surface().is_blank());
        assert_eq!(session.log().len(), 2);
    }

    #[test]
    fn opening_a_log_projects_it() {
        let mut source = session();
        stroke(&mut source, &[(3, 3), (33, 3)]);
        let reopened = Session::with_log(
            source.log().clone(),
            source.dimensions(),
            ToolSettings::default(),
            DEFAULT_TICK_INTERVAL,
        );
        assert_eq!(reopened.surface(), source.surface());
    }
}
