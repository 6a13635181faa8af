//! Raster surface: an RGB pixel grid with a white reset and a capsule line primitive.

use std::io::Cursor;

use image::{imageops, ImageFormat, Rgb, RgbImage};
use thiserror::Error;

use crate::geometry::{Color, Dimensions, Point};

pub const BACKGROUND: Color = Color::WHITE;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("failed to encode surface as png: {0}")]
    Encode(#[from] image::ImageError),
}

pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

/// Pen used for a single segment. Caps and joins are always round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: u32,
}

impl StrokeStyle {
    pub const fn new(color: Color, width: u32) -> Self {
        Self { color, width }
    }

    fn radius(self) -> f32 {
        (self.width as f32 / 2.0).max(0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRect {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl PixelRect {
    fn around_segment(from: Point, to: Point, pad: i32, dims: Dimensions) -> Option<Self> {
        let max_x = i32::try_from(dims.width()).unwrap_or(i32::MAX) - 1;
        let max_y = i32::try_from(dims.height()).unwrap_or(i32::MAX) - 1;
        let rect = Self {
            x0: from.x.min(to.x).saturating_sub(pad).max(0),
            y0: from.y.min(to.y).saturating_sub(pad).max(0),
            x1: from.x.max(to.x).saturating_add(pad).min(max_x),
            y1: from.y.max(to.y).saturating_add(pad).min(max_y),
        };
        (rect.x0 <= rect.x1 && rect.y0 <= rect.y1).then_some(rect)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSurface {
    pixels: RgbImage,
}

impl RasterSurface {
    pub fn new(dims: Dimensions) -> Self {
        Self {
            pixels: RgbImage::from_pixel(dims.width(), dims.height(), Rgb(BACKGROUND.channels())),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.pixels.width(), self.pixels.height())
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = Rgb(BACKGROUND.channels());
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.pixels.width() || y >= self.pixels.height() {
            return None;
        }
        let Rgb([r, g, b]) = *self.pixels.get_pixel(x, y);
        Some(Color::new(r, g, b))
    }

    pub fn is_blank(&self) -> bool {
        self.pixels
            .pixels()
            .all(|pixel| pixel.0 == BACKGROUND.channels())
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn image(&self) -> &RgbImage {
        &self.pixels
    }

    /// Paints every pixel within `width / 2` of the segment, clipped to the surface.
    pub fn draw_segment(&mut self, from: Point, to: Point, style: StrokeStyle) {
        let radius = style.radius();
        let pad = (radius.ceil() as i32).saturating_add(1);
        let Some(rect) = PixelRect::around_segment(from, to, pad, self.dimensions()) else {
            return;
        };

        let radius_sq = radius * radius;
        let color = Rgb(style.color.channels());
        for y in rect.y0..=rect.y1 {
            for x in rect.x0..=rect.x1 {
                if point_segment_distance_sq(Point::new(x, y), from, to) <= radius_sq {
                    self.pixels.put_pixel(x as u32, y as u32, color);
                }
            }
        }
    }

    /// Reallocates to `dims`, keeping existing content anchored top-left.
    pub fn resize(&mut self, dims: Dimensions) {
        if dims == self.dimensions() {
            return;
        }
        let mut resized = RasterSurface::new(dims);
        imageops::replace(&mut resized.pixels, &self.pixels, 0, 0);
        tracing::debug!(
            from = ?self.dimensions(),
            to = ?dims,
            "resized raster surface"
        );
        *self = resized;
    }

    pub fn encode_png(&self) -> SurfaceResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.pixels.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

fn point_segment_distance_sq(point: Point, start: Point, end: Point) -> f32 {
    let (px, py) = (point.x as f32, point.y as f32);
    let (x0, y0) = (start.x as f32, start.y as f32);
    let (x1, y1) = (end.x as f32, end.y as f32);
    let (vx, vy) = (x1 - x0, y1 - y0);
    let (wx, wy) = (px - x0, py - y0);
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = px - (x0 + vx * t);
    let dy = py - (y0 + vy * t);
    dx * dx + dy * dy
}
