//! Crop rectangles and rotation between upright and sensor coordinates.
//!
//! Face detectors report boxes in the upright (display) orientation while the
//! sensor delivers frames in its native orientation. [`Rotation`] describes how
//! far the sensor image must be turned clockwise to look upright; the sampler
//! uses [`Rotation::to_sensor`] to walk that back for every sample it takes.

use std::ops::{Add, Mul};

use log::debug;
use serde::{Deserialize, Serialize};

/// Point in continuous pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

/// Component-wise scale.
impl Mul<Point> for Point {
    type Output = Point;

    fn mul(self, other: Point) -> Point {
        Point::new(self.x * other.x, self.y * other.y)
    }
}

/// Integer crop rectangle in upright coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropRegion {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl CropRegion {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Coerce every field into `[0, max]` for its axis.
    ///
    /// Detector boxes routinely poke outside the frame; capture code clamps
    /// them this way before asking for a tensor. The result can still extend
    /// past the right or bottom edge, which the sampler tolerates by clamping
    /// sample positions.
    pub fn clamped_to(self, upright_width: u32, upright_height: u32) -> Self {
        let max_x = i32::try_from(upright_width).unwrap_or(i32::MAX);
        let max_y = i32::try_from(upright_height).unwrap_or(i32::MAX);
        Self {
            left: self.left.clamp(0, max_x),
            top: self.top.clamp(0, max_y),
            width: self.width.clamp(0, max_x),
            height: self.height.clamp(0, max_y),
        }
    }

    /// Whether the rectangle lies entirely inside an upright frame.
    pub fn fits_within(&self, upright_width: u32, upright_height: u32) -> bool {
        let right = self.left as i64 + self.width as i64;
        let bottom = self.top as i64 + self.height as i64;
        self.left >= 0
            && self.top >= 0
            && self.width >= 0
            && self.height >= 0
            && right <= upright_width as i64
            && bottom <= upright_height as i64
    }

    pub(crate) fn origin(&self) -> Point {
        Point::new(self.left as f32, self.top as f32)
    }

    pub(crate) fn extent(&self) -> Point {
        Point::new(self.width as f32, self.height as f32)
    }
}

/// Clockwise rotation that brings the sensor image upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Interpret a rotation hint in degrees.
    ///
    /// Values other than 0, 90, 180 and 270 fall back to [`Rotation::Deg0`].
    /// Capture stacks only ever report the four canonical values, so an odd
    /// value is logged rather than treated as a failure.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees {
            0 => Rotation::Deg0,
            90 => Rotation::Deg90,
            180 => Rotation::Deg180,
            270 => Rotation::Deg270,
            other => {
                debug!("Unsupported rotation hint {other} degrees; sampling without rotation");
                Rotation::Deg0
            }
        }
    }

    pub const fn degrees(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Dimensions of the upright image for a sensor frame of `width x height`.
    pub const fn upright_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Rotation::Deg0 | Rotation::Deg180 => (width, height),
            Rotation::Deg90 | Rotation::Deg270 => (height, width),
        }
    }

    /// Map an upright position back to sensor coordinates.
    ///
    /// `width` and `height` are the sensor frame dimensions. The quarter-turn
    /// cases reflect against the sensor width (90) and height (270); callers
    /// depend on exactly this mapping, so it is kept even though it is not
    /// the textbook inverse for non-square frames.
    #[inline]
    pub fn to_sensor(self, upright: Point, width: u32, height: u32) -> Point {
        let (w, h) = (width as f32, height as f32);
        let Point { x: sx, y: sy } = upright;
        match self {
            Rotation::Deg0 => upright,
            Rotation::Deg90 => Point::new(sy, w - sx - 1.0),
            Rotation::Deg180 => Point::new(w - sx - 1.0, h - sy - 1.0),
            Rotation::Deg270 => Point::new(h - sy - 1.0, sx),
        }
    }
}

impl From<i32> for Rotation {
    fn from(degrees: i32) -> Self {
        Rotation::from_degrees(degrees)
    }
}
