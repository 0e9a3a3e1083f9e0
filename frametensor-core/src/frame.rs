//! Borrowed views over planar YUV 4:2:0 camera frames.
//!
//! Camera stacks hand out three separate byte planes with their own row and
//! pixel strides (semi-planar layouts show up as U/V planes with a pixel stride
//! of 2 that alias the same memory). [`PlanarYuvFrame`] wraps those planes for
//! the duration of a call and checks once, up front, that every sample the
//! transforms may touch lies inside its plane. After [`PlanarYuvFrame::validate`]
//! succeeds the per-pixel accessors index without further range checks beyond
//! the slice's own.

use crate::error::{FrameError, PlaneKind};

/// Largest width or height accepted by [`PlanarYuvFrame::validate`]. Sample
/// coordinates are clamped in `i32`.
pub const MAX_FRAME_DIMENSION: u32 = i32::MAX as u32;

/// One plane of a frame: bytes plus the distance between rows and between
/// neighbouring samples within a row.
#[derive(Debug, Clone, Copy)]
pub struct PlaneView<'a> {
    data: &'a [u8],
    row_stride: usize,
    pixel_stride: usize,
}

impl<'a> PlaneView<'a> {
    pub const fn new(data: &'a [u8], row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride,
        }
    }

    /// Tightly packed plane (`pixel_stride == 1`).
    pub const fn packed(data: &'a [u8], row_stride: usize) -> Self {
        Self::new(data, row_stride, 1)
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes needed to address samples `[0, cols) x [0, rows)`.
    ///
    /// Only the final sample of the final row has to exist, which matches how
    /// camera HALs trim the trailing padding of the last row. `None` when the
    /// strides overflow the address space.
    pub fn required_len(&self, cols: usize, rows: usize) -> Option<usize> {
        if cols == 0 || rows == 0 {
            return Some(0);
        }
        (rows - 1)
            .checked_mul(self.row_stride)?
            .checked_add(self.row_span(cols)?)
    }

    /// Bytes covered by `cols` samples of one row.
    fn row_span(&self, cols: usize) -> Option<usize> {
        (cols - 1).checked_mul(self.pixel_stride)?.checked_add(1)
    }

    #[inline]
    pub(crate) fn sample(&self, col: usize, row: usize) -> u8 {
        self.data[row * self.row_stride + col * self.pixel_stride]
    }

    fn check(&self, kind: PlaneKind, cols: usize, rows: usize) -> Result<(), FrameError> {
        if cols == 0 || rows == 0 {
            return Ok(());
        }
        let required = self.required_len(cols, rows).unwrap_or(usize::MAX);
        if self.data.is_empty() || self.data.len() < required {
            return Err(FrameError::InvalidBuffer {
                plane: kind,
                required,
                actual: self.data.len(),
            });
        }
        // Samples of a row must be distinct and rows must not overlap.
        let overlapping_rows =
            rows > 1 && self.row_span(cols).is_none_or(|span| self.row_stride < span);
        if self.pixel_stride == 0 || overlapping_rows {
            return Err(FrameError::InvalidStride {
                plane: kind,
                row_stride: self.row_stride,
                pixel_stride: self.pixel_stride,
            });
        }
        Ok(())
    }
}

/// A raw 4:2:0 frame in sensor orientation.
///
/// U and V share a stride pair, as reported by the capture layer for the
/// chroma planes.
#[derive(Debug, Clone, Copy)]
pub struct PlanarYuvFrame<'a> {
    pub width: u32,
    pub height: u32,
    pub y: PlaneView<'a>,
    pub u: PlaneView<'a>,
    pub v: PlaneView<'a>,
}

impl<'a> PlanarYuvFrame<'a> {
    pub fn new(
        width: u32,
        height: u32,
        y: PlaneView<'a>,
        u: PlaneView<'a>,
        v: PlaneView<'a>,
    ) -> Self {
        Self {
            width,
            height,
            y,
            u,
            v,
        }
    }

    /// Build a frame from raw buffers and the stride metadata the camera
    /// layer reports, in the order it reports them.
    #[allow(clippy::too_many_arguments)]
    pub fn from_strides(
        y: &'a [u8],
        u: &'a [u8],
        v: &'a [u8],
        width: u32,
        height: u32,
        y_row_stride: usize,
        uv_row_stride: usize,
        y_pixel_stride: usize,
        uv_pixel_stride: usize,
    ) -> Self {
        Self::new(
            width,
            height,
            PlaneView::new(y, y_row_stride, y_pixel_stride),
            PlaneView::new(u, uv_row_stride, uv_pixel_stride),
            PlaneView::new(v, uv_row_stride, uv_pixel_stride),
        )
    }

    /// Luma samples addressable per row and column count.
    pub fn luma_extent(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize)
    }

    /// Chroma samples reachable from the visible luma area.
    ///
    /// Luma pixel `(x, y)` reads chroma at `(x / 2, y / 2)`, so the last
    /// reachable chroma column is `(width - 1) / 2`.
    pub fn chroma_extent(&self) -> (usize, usize) {
        let (w, h) = self.luma_extent();
        (w.div_ceil(2), h.div_ceil(2))
    }

    /// Check that every plane can serve every sample of the frame.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::EmptyFrame {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_FRAME_DIMENSION || self.height > MAX_FRAME_DIMENSION {
            return Err(FrameError::FrameTooLarge {
                width: self.width,
                height: self.height,
                max: MAX_FRAME_DIMENSION,
            });
        }
        let (w, h) = self.luma_extent();
        let (cw, ch) = self.chroma_extent();
        self.y.check(PlaneKind::Y, w, h)?;
        self.u.check(PlaneKind::U, cw, ch)?;
        self.v.check(PlaneKind::V, cw, ch)?;
        Ok(())
    }

    #[inline]
    pub(crate) fn luma(&self, x: usize, y: usize) -> u8 {
        self.y.sample(x, y)
    }

    /// Bias-shifted `(U, V)` at chroma coordinates.
    #[inline]
    pub(crate) fn chroma(&self, cx: usize, cy: usize) -> (i32, i32) {
        (
            self.u.sample(cx, cy) as i32 - 128,
            self.v.sample(cx, cy) as i32 - 128,
        )
    }
}

#[cfg(test)]
pub(crate) mod test_frames {
    //! Owned backing storage for synthetic frames used across the crate's tests.

    use super::*;

    pub struct OwnedFrame {
        pub width: u32,
        pub height: u32,
        pub y: Vec<u8>,
        pub u: Vec<u8>,
        pub v: Vec<u8>,
        pub y_row_stride: usize,
        pub uv_row_stride: usize,
        pub uv_pixel_stride: usize,
    }

    impl OwnedFrame {
        /// I420 frame with constant planes and optional row padding.
        pub fn constant(width: u32, height: u32, y: u8, u: u8, v: u8, padding: usize) -> Self {
            let (w, h) = (width as usize, height as usize);
            let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
            let y_row_stride = w + padding;
            let uv_row_stride = cw + padding;
            Self {
                width,
                height,
                y: vec![y; y_row_stride * h],
                u: vec![u; uv_row_stride * ch],
                v: vec![v; uv_row_stride * ch],
                y_row_stride,
                uv_row_stride,
                uv_pixel_stride: 1,
            }
        }

        /// Neutral-chroma frame whose luma is produced by `f(x, y)`.
        pub fn luma_pattern(width: u32, height: u32, f: impl Fn(usize, usize) -> u8) -> Self {
            let mut frame = Self::constant(width, height, 0, 128, 128, 0);
            for row in 0..height as usize {
                for col in 0..width as usize {
                    frame.y[row * frame.y_row_stride + col] = f(col, row);
                }
            }
            frame
        }

        pub fn view(&self) -> PlanarYuvFrame<'_> {
            PlanarYuvFrame::from_strides(
                &self.y,
                &self.u,
                &self.v,
                self.width,
                self.height,
                self.y_row_stride,
                self.uv_row_stride,
                1,
                self.uv_pixel_stride,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_frames::OwnedFrame;
    use super::*;

    #[test]
    fn required_len_ignores_trailing_row_padding() {
        let plane = PlaneView::new(&[], 16, 2);
        assert_eq!(plane.required_len(4, 3), Some(2 * 16 + 3 * 2 + 1));
        assert_eq!(plane.required_len(0, 3), Some(0));
    }

    #[test]
    fn required_len_reports_stride_overflow() {
        let plane = PlaneView::new(&[], usize::MAX / 2, 1);
        assert_eq!(plane.required_len(4, 4), None);
    }

    #[test]
    fn validate_rejects_overflowing_row_stride() {
        let frame = OwnedFrame::constant(4, 4, 10, 128, 128, 0);
        let mut view = frame.view();
        view.y = PlaneView::new(&frame.y, usize::MAX / 2, 1);
        assert_eq!(
            view.validate(),
            Err(FrameError::InvalidBuffer {
                plane: PlaneKind::Y,
                required: usize::MAX,
                actual: 16
            })
        );
    }

    #[test]
    fn validate_rejects_zero_pixel_stride() {
        let frame = OwnedFrame::constant(4, 4, 10, 128, 128, 0);
        let mut view = frame.view();
        view.u = PlaneView::new(&frame.u, 2, 0);
        assert_eq!(
            view.validate(),
            Err(FrameError::InvalidStride {
                plane: PlaneKind::U,
                row_stride: 2,
                pixel_stride: 0
            })
        );
    }

    #[test]
    fn validate_rejects_overlapping_rows() {
        let frame = OwnedFrame::constant(4, 4, 10, 128, 128, 0);
        let mut view = frame.view();
        view.y = PlaneView::new(&frame.y, 2, 1);
        assert!(matches!(
            view.validate(),
            Err(FrameError::InvalidStride {
                plane: PlaneKind::Y,
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_dimensions_past_i32() {
        let plane = [10u8; 4];
        let frame = PlanarYuvFrame::new(
            3_000_000_000,
            2,
            PlaneView::new(&plane, 1, 0),
            PlaneView::new(&plane, 1, 0),
            PlaneView::new(&plane, 1, 0),
        );
        assert_eq!(
            frame.validate(),
            Err(FrameError::FrameTooLarge {
                width: 3_000_000_000,
                height: 2,
                max: MAX_FRAME_DIMENSION
            })
        );
    }

    #[test]
    fn validate_accepts_well_formed_frame() {
        let frame = OwnedFrame::constant(6, 4, 10, 128, 128, 3);
        frame.view().validate().expect("frame should validate");
    }

    #[test]
    fn validate_accepts_odd_dimensions() {
        let frame = OwnedFrame::constant(5, 3, 10, 128, 128, 0);
        frame.view().validate().expect("odd frame should validate");
    }

    #[test]
    fn validate_reports_empty_plane() {
        let frame = OwnedFrame::constant(4, 4, 10, 128, 128, 0);
        let mut view = frame.view();
        view.u = PlaneView::new(&[], 2, 1);
        assert_eq!(
            view.validate(),
            Err(FrameError::InvalidBuffer {
                plane: PlaneKind::U,
                required: 4,
                actual: 0
            })
        );
    }

    #[test]
    fn validate_reports_short_luma_plane() {
        let frame = OwnedFrame::constant(4, 4, 10, 128, 128, 0);
        let mut view = frame.view();
        view.y = PlaneView::packed(&frame.y[..10], 4);
        assert!(matches!(
            view.validate(),
            Err(FrameError::InvalidBuffer {
                plane: PlaneKind::Y,
                required: 16,
                actual: 10
            })
        ));
    }

    #[test]
    fn semi_planar_chroma_aliases_one_buffer() {
        // NV21-style interleaved VU with pixel stride 2; V starts one byte earlier.
        let y = [100u8; 16];
        let vu = [200u8, 60, 200, 60, 200, 60, 200, 60];
        let frame = PlanarYuvFrame::from_strides(&y, &vu[1..], &vu[..7], 4, 4, 4, 4, 1, 2);
        frame.validate().expect("semi-planar frame should validate");
        assert_eq!(frame.chroma(1, 1), (60 - 128, 200 - 128));
    }
}
