use std::ops::RangeInclusive;

use crate::config::ToolConfig;
use crate::geometry::{Color, Point};
use crate::log::{Action, Tool};

pub const PEN_WIDTH_RANGE: RangeInclusive<u32> = 1..=50;
pub const ERASER_WIDTH_RANGE: RangeInclusive<u32> = 1..=255;

fn clamp_width(width: u32, range: &RangeInclusive<u32>) -> u32 {
    width.clamp(*range.start(), *range.end())
}

/// Live tool settings. They only govern strokes started after they change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSettings {
    pen_color: Color,
    pen_width: u32,
    eraser_width: u32,
    tool: Tool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from_config(&ToolConfig::default())
    }
}

impl ToolSettings {
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            pen_color: config.pen_color,
            pen_width: clamp_width(config.pen_width, &PEN_WIDTH_RANGE),
            eraser_width: clamp_width(config.eraser_width, &ERASER_WIDTH_RANGE),
            tool: Tool::Pen,
        }
    }

    pub const fn pen_color(&self) -> Color {
        self.pen_color
    }

    pub const fn pen_width(&self) -> u32 {
        self.pen_width
    }

    pub const fn eraser_width(&self) -> u32 {
        self.eraser_width
    }

    pub const fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_pen_color(&mut self, color: Color) {
        self.pen_color = color;
    }

    pub fn set_pen_width(&mut self, width: u32) {
        self.pen_width = clamp_width(width, &PEN_WIDTH_RANGE);
    }

    pub fn set_eraser_width(&mut self, width: u32) {
        self.eraser_width = clamp_width(width, &ERASER_WIDTH_RANGE);
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// The `StartStroke` recording these settings. Eraser strokes record white
    /// and the eraser width.
    pub fn stroke_start(&self, point: Point) -> Action {
        let (color, width) = match self.tool {
            Tool::Pen => (self.pen_color, self.pen_width),
            Tool::Eraser => (Color::WHITE, self.eraser_width),
        };
        Action::StartStroke {
            point,
            color,
            width,
            tool: self.tool,
        }
    }
}
