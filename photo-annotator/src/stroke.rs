//! Freehand stroke recording with undo history

use crate::geometry::CanvasPoint;
use serde::{Deserialize, Serialize};

/// Opaque brush color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StrokeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl StrokeColor {
    pub const RED: StrokeColor = StrokeColor::rgb(0xFF, 0x00, 0x00);
    pub const BLACK: StrokeColor = StrokeColor::rgb(0x00, 0x00, 0x00);
    pub const WHITE: StrokeColor = StrokeColor::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB`, `#RGB` or one of the basic CSS color names
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return Self::parse_hex(hex);
        }

        let named = match value.to_ascii_lowercase().as_str() {
            "black" => Self::rgb(0, 0, 0),
            "white" => Self::rgb(255, 255, 255),
            "red" => Self::rgb(255, 0, 0),
            "lime" => Self::rgb(0, 255, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "orange" => Self::rgb(255, 165, 0),
            "magenta" | "fuchsia" => Self::rgb(255, 0, 255),
            "cyan" | "aqua" => Self::rgb(0, 255, 255),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            _ => return None,
        };
        Some(named)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => Some(Self::rgb(
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            )),
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
                Some(Self::rgb(digit(0)?, digit(1)?, digit(2)?))
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        StrokeColor::RED
    }
}

impl TryFrom<String> for StrokeColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StrokeColor::parse(&value).ok_or_else(|| format!("invalid color: {}", value))
    }
}

impl From<StrokeColor> for String {
    fn from(color: StrokeColor) -> Self {
        color.to_hex()
    }
}

/// Brush settings applied to the next stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub color: StrokeColor,
    pub size: f32,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: StrokeColor::RED,
            size: 4.0,
        }
    }
}

/// One recorded sample, in display-canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
    pub color: StrokeColor,
    pub size: f32,
}

/// A committed freehand stroke. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<StrokePoint>,
}

impl Stroke {
    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&StrokePoint> {
        self.points.first()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_single_point(&self) -> bool {
        self.points.len() == 1
    }
}

/// Committed strokes in commit order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingHistory {
    strokes: Vec<Stroke>,
}

impl DrawingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.strokes.is_empty()
    }

    fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    fn pop(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    fn clear(&mut self) {
        self.strokes.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Drawing,
}

/// Idle -> Drawing -> Idle state machine building a [`DrawingHistory`]
#[derive(Debug, Clone, Default)]
pub struct StrokeRecorder {
    state: RecorderState,
    brush: Brush,
    current: Vec<StrokePoint>,
    history: DrawingHistory,
}

impl StrokeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        self.state == RecorderState::Drawing
    }

    pub fn history(&self) -> &DrawingHistory {
        &self.history
    }

    /// Points of the stroke in progress
    pub fn current(&self) -> &[StrokePoint] {
        &self.current
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Starts a stroke. Color and size are frozen until the stroke is committed.
    pub fn begin_stroke(&mut self, point: CanvasPoint, color: StrokeColor, size: f32) {
        self.state = RecorderState::Drawing;
        self.brush = Brush { color, size };
        self.current.clear();
        self.current.push(StrokePoint {
            x: point.x,
            y: point.y,
            color,
            size,
        });
    }

    pub fn extend_stroke(&mut self, point: CanvasPoint) {
        if self.state != RecorderState::Drawing {
            return;
        }
        self.current.push(StrokePoint {
            x: point.x,
            y: point.y,
            color: self.brush.color,
            size: self.brush.size,
        });
    }

    /// Ends the gesture; returns true if a stroke was added to the history
    pub fn commit_stroke(&mut self) -> bool {
        if self.state != RecorderState::Drawing {
            return false;
        }
        self.state = RecorderState::Idle;

        if self.current.is_empty() {
            return false;
        }
        let points = std::mem::take(&mut self.current);
        log::debug!("Committed stroke with {} points", points.len());
        self.history.push(Stroke { points });
        true
    }

    /// Removes the most recent stroke; returns whether further undo is possible
    pub fn undo(&mut self) -> bool {
        self.history.pop();
        self.history.can_undo()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Drops the history and any stroke in progress
    pub fn reset(&mut self) {
        self.state = RecorderState::Idle;
        self.current.clear();
        self.history.clear();
    }
}
