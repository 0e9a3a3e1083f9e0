use std::fmt;

use thiserror::Error;

/// Identifies one of the three planes of a YUV frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneKind {
    Y,
    U,
    V,
}

impl fmt::Display for PlaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlaneKind::Y => "Y",
            PlaneKind::U => "U",
            PlaneKind::V => "V",
        })
    }
}

/// Failures of the frame transforms. Nothing is written to the output when
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("{plane} plane is missing or too short (needs {required} bytes, has {actual})")]
    InvalidBuffer {
        plane: PlaneKind,
        required: usize,
        actual: usize,
    },
    #[error("{plane} plane strides cannot address its samples (row {row_stride}, pixel {pixel_stride})")]
    InvalidStride {
        plane: PlaneKind,
        row_stride: usize,
        pixel_stride: usize,
    },
    #[error("output buffer holds {actual} elements, expected {expected}")]
    OutputSizeMismatch { expected: usize, actual: usize },
    #[error("frame {width}x{height} is too small for bilinear sampling (needs at least 2x2)")]
    FrameTooSmall { width: u32, height: u32 },
    #[error("frame {width}x{height} exceeds the supported {max}x{max}")]
    FrameTooLarge { width: u32, height: u32, max: u32 },
    #[error("frame has no pixels ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("output size must be greater than zero")]
    ZeroOutputSize,
}

/// Failures of the cosine comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("embedding lengths differ ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
    #[error("embedding has zero or near-zero magnitude")]
    DegenerateVector,
}

impl CompareError {
    /// Distance reported for this failure in sentinel mode.
    pub const fn sentinel(self) -> f32 {
        crate::compare::DEGENERATE_DISTANCE
    }
}
