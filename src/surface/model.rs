use crate::command::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgb> for Color {
    fn from(value: Rgb) -> Self {
        Self::rgba(value.r, value.g, value.b, 255)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    /// Brush diameter in pixels.
    pub width: u32,
    pub color: Rgb,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: crate::command::SMALL_BRUSH,
            color: Rgb::RED,
        }
    }
}

/// A freehand polyline in window-local coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stroke {
    pub style: StrokeStyle,
    pub points: Vec<(i32, i32)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanvasModel {
    pub strokes: Vec<Stroke>,
}

impl CanvasModel {
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}
