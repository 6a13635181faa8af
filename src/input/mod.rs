//! Input events consumed by the core and their dispatch onto a [`Session`].

use crate::geometry::{Color, Point};
use crate::history::HistoryOutcome;
use crate::log::Tool;
use crate::replay::ReplayState;
use crate::session::{Session, SessionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    SetColor(Color),
    SetWidth(u32),
    SetEraserWidth(u32),
    SetTool(Tool),
    Undo,
    Redo,
    StartReplay,
    CancelReplay,
}

/// Observable result of a handled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Handled,
    Ignored,
    History(HistoryOutcome),
    Replay(ReplayState),
}

impl Session {
    pub fn handle(&mut self, event: InputEvent) -> SessionResult<InputOutcome> {
        let outcome = match event {
            InputEvent::PointerDown(point) => {
                self.pointer_down(point)?;
                InputOutcome::Handled
            }
            InputEvent::PointerMove(point) => {
                if self.pointer_move(point)? {
                    InputOutcome::Handled
                } else {
                    InputOutcome::Ignored
                }
            }
            InputEvent::PointerUp => {
                self.pointer_up();
                InputOutcome::Handled
            }
            InputEvent::SetColor(color) => {
                self.set_color(color);
                InputOutcome::Handled
            }
            InputEvent::SetWidth(width) => {
                self.set_pen_width(width);
                InputOutcome::Handled
            }
            InputEvent::SetEraserWidth(width) => {
                self.set_eraser_width(width);
                InputOutcome::Handled
            }
            InputEvent::SetTool(tool) => {
                self.set_tool(tool);
                InputOutcome::Handled
            }
            InputEvent::Undo => InputOutcome::History(self.undo()?),
            InputEvent::Redo => InputOutcome::History(self.redo()?),
            InputEvent::StartReplay => InputOutcome::Replay(self.start_replay()?),
            InputEvent::CancelReplay => InputOutcome::Replay(self.cancel_replay()?),
        };
        tracing::trace!(?event, ?outcome, "input handled");
        Ok(outcome)
    }
}
