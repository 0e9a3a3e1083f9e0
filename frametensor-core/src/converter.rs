//! Full-frame YUV to packed ARGB conversion for previews and debugging.
//!
//! Unlike [`crate::sampler`], nothing is cropped, rotated or resized: output
//! pixel `(x, y)` is sensor pixel `(x, y)`.

use frametensor_utils::{config::PreviewSettings, telemetry::timing_guard};

use crate::{
    error::FrameError,
    frame::PlanarYuvFrame,
    pixel::{clamp_channel_int, pack_argb, yuv_to_rgb},
    policy::{self, Conversion, InvalidInputPolicy},
};

/// Converts whole frames into `0xFFRRGGBB` pixels in raster order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameColorConverter {
    invalid_input: InvalidInputPolicy,
}

impl From<PreviewSettings> for FrameColorConverter {
    fn from(settings: PreviewSettings) -> Self {
        Self::new(settings.invalid_input)
    }
}

impl FrameColorConverter {
    pub fn new(invalid_input: InvalidInputPolicy) -> Self {
        Self { invalid_input }
    }

    /// Convert `frame` into `out`, which must hold exactly `width * height` pixels.
    pub fn convert_into(
        &self,
        frame: &PlanarYuvFrame<'_>,
        out: &mut [u32],
    ) -> Result<Conversion, FrameError> {
        let _guard = timing_guard("frametensor_core::yuv_to_argb", log::Level::Trace);
        let validated = validate(frame, out.len());
        if let Some(skipped) = policy::resolve(self.invalid_input, "yuv_to_argb", validated)? {
            return Ok(skipped);
        }

        let width = frame.width as usize;
        for (y, row) in out.chunks_exact_mut(width).enumerate() {
            let cy = y / 2;
            for (x, pixel) in row.iter_mut().enumerate() {
                let luma = frame.luma(x, y) as f32;
                let (u, v) = frame.chroma(x / 2, cy);
                let [r, g, b] = yuv_to_rgb(luma, u as f32, v as f32);
                // Truncate toward zero before clamping.
                *pixel = pack_argb(
                    clamp_channel_int(r as i32),
                    clamp_channel_int(g as i32),
                    clamp_channel_int(b as i32),
                );
            }
        }
        Ok(Conversion::Written)
    }

    /// Convert into a freshly allocated buffer. Failures are always reported.
    pub fn convert(&self, frame: &PlanarYuvFrame<'_>) -> Result<Vec<u32>, FrameError> {
        let len = frame.width as usize * frame.height as usize;
        let mut out = vec![0u32; len];
        FrameColorConverter::new(InvalidInputPolicy::Report).convert_into(frame, &mut out)?;
        Ok(out)
    }
}

/// One-shot conversion with explicit error reporting.
pub fn yuv_to_argb(frame: &PlanarYuvFrame<'_>, out: &mut [u32]) -> Result<(), FrameError> {
    FrameColorConverter::default()
        .convert_into(frame, out)
        .map(|_| ())
}

fn validate(frame: &PlanarYuvFrame<'_>, out_len: usize) -> Result<(), FrameError> {
    frame.validate()?;
    let expected = frame.width as usize * frame.height as usize;
    if out_len != expected {
        return Err(FrameError::OutputSizeMismatch {
            expected,
            actual: out_len,
        });
    }
    Ok(())
}
