//! Raw frame file loading.

use std::{fs, ops::Range};

use anyhow::{Context, Result};
use frametensor_core::{PlanarYuvFrame, PlaneView};
use frametensor_utils::normalize_path;
use log::{debug, warn};

use crate::args::{FrameArgs, FrameLayout};

/// A frame file read into memory, with plane offsets resolved from its layout.
#[derive(Debug)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub layout: FrameLayout,
    data: Vec<u8>,
    y: Range<usize>,
    u: Range<usize>,
    v: Range<usize>,
    y_row_stride: usize,
    uv_row_stride: usize,
    uv_pixel_stride: usize,
}

impl RawFrame {
    pub fn load(args: &FrameArgs) -> Result<Self> {
        let path = normalize_path(&args.input)?;
        let data =
            fs::read(&path).with_context(|| format!("failed to read frame {}", path.display()))?;
        debug!(
            "Read {} bytes from {} ({} {}x{})",
            data.len(),
            path.display(),
            args.layout.name(),
            args.width,
            args.height
        );
        Self::from_bytes(data, args.width, args.height, args.layout, args.row_padding)
    }

    /// Lay planes out over `data`.
    ///
    /// A short file is not rejected here: planes that run past the end are
    /// truncated so the frame transforms can report (or skip) them. Geometry
    /// whose plane sizes do not fit in memory is an error.
    pub fn from_bytes(
        data: Vec<u8>,
        width: u32,
        height: u32,
        layout: FrameLayout,
        row_padding: usize,
    ) -> Result<Self> {
        let (w, h) = (width as usize, height as usize);
        let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
        let overflow = || {
            anyhow::anyhow!(
                "{} {width}x{height} with {row_padding} bytes of row padding is too large",
                layout.name()
            )
        };

        let y_row_stride = w.checked_add(row_padding).ok_or_else(overflow)?;
        let y_len = y_row_stride.checked_mul(h).ok_or_else(overflow)?;
        let (uv_row_stride, uv_pixel_stride, planes) = match layout {
            FrameLayout::I420 => (cw.checked_add(row_padding), 1, 2),
            FrameLayout::Nv12 | FrameLayout::Nv21 => {
                (cw.checked_mul(2).and_then(|n| n.checked_add(row_padding)), 2, 1)
            }
        };
        let uv_row_stride = uv_row_stride.ok_or_else(overflow)?;
        let plane = uv_row_stride.checked_mul(ch).ok_or_else(overflow)?;
        let expected = plane
            .checked_mul(planes)
            .and_then(|chroma| chroma.checked_add(y_len))
            .ok_or_else(overflow)?;

        let (u, v) = match layout {
            FrameLayout::I420 => (y_len..y_len + plane, y_len + plane..expected),
            FrameLayout::Nv12 => (y_len..expected, y_len + 1..expected),
            FrameLayout::Nv21 => (y_len + 1..expected, y_len..expected),
        };

        if data.len() < expected {
            warn!(
                "frame file holds {} bytes, {} {}x{} needs {expected}",
                data.len(),
                layout.name(),
                width,
                height
            );
        }

        Ok(Self {
            width,
            height,
            layout,
            data,
            y: 0..y_len,
            u,
            v,
            y_row_stride,
            uv_row_stride,
            uv_pixel_stride,
        })
    }

    pub fn view(&self) -> PlanarYuvFrame<'_> {
        PlanarYuvFrame::new(
            self.width,
            self.height,
            PlaneView::new(self.plane(&self.y), self.y_row_stride, 1),
            PlaneView::new(self.plane(&self.u), self.uv_row_stride, self.uv_pixel_stride),
            PlaneView::new(self.plane(&self.v), self.uv_row_stride, self.uv_pixel_stride),
        )
    }

    fn plane(&self, range: &Range<usize>) -> &[u8] {
        let end = range.end.min(self.data.len());
        let start = range.start.min(end);
        &self.data[start..end]
    }
}
