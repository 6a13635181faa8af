//! Deterministic reconstruction of raster state from an action log.

use crate::geometry::{Color, Dimensions, Point};
use crate::log::{Action, Tool};
use crate::surface::{RasterSurface, StrokeStyle, BACKGROUND};

/// Settings of the stroke currently governing `DrawSegment`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveStroke {
    color: Color,
    width: u32,
    tool: Tool,
}

impl ActiveStroke {
    fn style(self) -> StrokeStyle {
        match self.tool {
            Tool::Pen => StrokeStyle::new(self.color, self.width),
            Tool::Eraser => StrokeStyle::new(BACKGROUND, self.width),
        }
    }
}

/// Running interpreter state: current point and governing stroke.
///
/// The live input path, the projector and the replay scheduler all feed
/// actions through the same `PenState`, which keeps their pixels identical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PenState {
    current: Point,
    stroke: Option<ActiveStroke>,
}

impl PenState {
    pub const fn new() -> Self {
        Self {
            current: Point::new(0, 0),
            stroke: None,
        }
    }

    /// Applies one action to `surface`.
    ///
    /// # Panics
    ///
    /// Panics on a `DrawSegment` with no governing `StartStroke`. `ActionLog`
    /// rejects such sequences, so reaching this is a programming error.
    pub fn apply(&mut self, action: &Action, surface: &mut RasterSurface) {
        match *action {
            Action::StartStroke {
                point,
                color,
                width,
                tool,
            } => {
                self.current = point;
                self.stroke = Some(ActiveStroke { color, width, tool });
            }
            Action::DrawSegment { point } => {
                let Some(stroke) = self.stroke else {
                    unreachable!("draw segment to {point:?} has no governing stroke start");
                };
                surface.draw_segment(self.current, point, stroke.style());
                self.current = point;
            }
        }
    }
}

/// Replays `actions` onto a fresh background-filled surface of `dims`.
pub fn project(actions: &[Action], dims: Dimensions) -> RasterSurface {
    let mut surface = RasterSurface::new(dims);
    replay_onto(actions, &mut surface);
    surface
}

/// Clears `surface` and replays `actions` onto it, keeping its dimensions.
pub fn project_onto(actions: &[Action], surface: &mut RasterSurface) {
    surface.clear();
    replay_onto(actions, surface);
    tracing::debug!(
        actions = actions.len(),
        dims = ?surface.dimensions(),
        "rebuilt raster from log"
    );
}

fn replay_onto(actions: &[Action], surface: &mut RasterSurface) {
    let mut pen = PenState::new();
    for action in actions {
        pen.apply(action, surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: Color = Color::new(0, 0, 255);

    fn start(x: i32, y: i32, tool: Tool, width: u32) -> Action {
        Action::StartStroke {
            point: Point::new(x, y),
            color: BLUE,
            width,
            tool,
        }
    }

    fn draw(x: i32, y: i32) -> Action {
        Action::DrawSegment {
            point: Point::new(x, y),
        }
    }

    #[test]
    fn empty_log_projects_to_blank_surface() {
        assert!(project(&[], Dimensions::new(8, 8)).is_blank());
    }

    #[test]
    fn stroke_start_alone_draws_nothing() {
        let surface = project(&[start(3, 3, Tool::Pen, 4)], Dimensions::new(8, 8));
        assert!(surface.is_blank());
    }

    #[test]
    fn segments_chain_from_previous_point() {
        let actions = [start(0, 0, Tool::Pen, 1), draw(5, 0), draw(5, 5)];
        let surface = project(&actions, Dimensions::new(10, 10));
        assert_eq!(surface.pixel(3, 0), Some(BLUE));
        assert_eq!(surface.pixel(5, 3), Some(BLUE));
        assert_eq!(surface.pixel(3, 3), Some(Color::WHITE));
    }

    #[test]
    fn eraser_paints_background_with_its_recorded_width() {
        let actions = [
            start(0, 5, Tool::Pen, 5),
            draw(19, 5),
            start(10, 0, Tool::Eraser, 3),
            draw(10, 19),
        ];
        let surface = project(&actions, Dimensions::new(20, 20));
        assert_eq!(surface.pixel(2, 5), Some(BLUE));
        assert_eq!(surface.pixel(10, 5), Some(Color::WHITE));
        assert_eq!(surface.pixel(12, 5), Some(BLUE));
    }

    #[test]
    fn projection_is_deterministic() {
        let actions = [
            start(1, 1, Tool::Pen, 7),
            draw(30, 12),
            draw(2, 28),
            start(15, 15, Tool::Eraser, 4),
            draw(20, 3),
        ];
        let first = project(&actions, Dimensions::new(32, 32));
        let second = project(&actions, Dimensions::new(32, 32));
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn project_onto_discards_previous_pixels() {
        let mut surface = project(&[start(0, 0, Tool::Pen, 2), draw(9, 9)], Dimensions::new(10, 10));
        project_onto(&[], &mut surface);
        assert!(surface.is_blank());
        assert_eq!(surface.dimensions(), Dimensions::new(10, 10));
    }

    #[test]
    fn loaded_log_with_maximal_width_projects_full_coverage() {
        let log = crate::log::ActionLog::from_json(
            r##"{"actions":[
                {"type":"start","point":[2,2],"color":"#0000ff","width":4294967295,"tool":"pen"},
                {"type":"draw","point":[3,3]}
            ]}"##,
        )
        .unwrap();
        let surface = project(log.actions(), Dimensions::new(16, 10));
        assert!(surface.image().pixels().all(|pixel| pixel.0 == BLUE.channels()));
    }

    #[test]
    #[should_panic(expected = "no governing stroke start")]
    fn orphan_segment_is_a_contract_violation() {
        project(&[draw(1, 1)], Dimensions::new(4, 4));
    }
}
