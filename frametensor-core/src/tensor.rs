//! Owned `size x size x 3` tensor for callers that don't manage their own buffer.

use anyhow::Result;
use image::RgbImage;
use ndarray::{Array3, ArrayView3};

/// Channel-interleaved (HWC) RGB tensor with values in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    size: u32,
    data: Array3<f32>,
}

impl NormalizedTensor {
    /// Zero-filled tensor of `size x size x 3`.
    pub fn new(size: u32) -> Self {
        let edge = size as usize;
        Self {
            size,
            data: Array3::zeros((edge, edge, 3)),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// `[height, width, channels]`
    pub fn shape(&self) -> [usize; 3] {
        let edge = self.size as usize;
        [edge, edge, 3]
    }

    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// Flat interleaved data, the layout inference engines consume.
    pub fn as_slice(&self) -> &[f32] {
        // Always standard layout: the array is only ever built by `zeros`.
        self.data.as_slice().unwrap_or_default()
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        self.data.as_slice_mut().unwrap_or_default()
    }

    /// Native-endian bytes of the tensor, ready to copy into an engine's input.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }

    /// `[r, g, b]` at upright output position `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[f32; 3]> {
        let r = *self.data.get((y, x, 0))?;
        let g = *self.data.get((y, x, 1))?;
        let b = *self.data.get((y, x, 2))?;
        Some([r, g, b])
    }

    /// Planar copy `[3, size, size]` for engines that expect CHW input.
    pub fn to_chw(&self) -> Array3<f32> {
        self.data
            .view()
            .permuted_axes([2, 0, 1])
            .as_standard_layout()
            .into_owned()
    }

    /// De-normalized 8-bit preview of the tensor.
    pub fn to_rgb_image(&self) -> Result<RgbImage> {
        frametensor_utils::tensor_to_rgb_image(self.size, self.as_slice())
    }

    pub fn into_array(self) -> Array3<f32> {
        self.data
    }
}
