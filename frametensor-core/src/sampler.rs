//! Crop, rotate, resize and normalize a face region straight out of a YUV frame.
//!
//! The sampler walks the *output* grid. For every output pixel it picks the
//! matching point inside the upright crop rectangle, maps it back into sensor
//! coordinates, bilinearly interpolates luma, reads chroma from the nearest
//! half-resolution sample and writes normalized RGB. No intermediate RGB image
//! or rotated copy of the frame is ever materialized.

use frametensor_utils::{config::SamplerSettings, telemetry::timing_guard};

use crate::{
    error::FrameError,
    frame::PlanarYuvFrame,
    geometry::{CropRegion, Point, Rotation},
    pixel::{normalize_channel, yuv_to_rgb},
    policy::{self, Conversion, InvalidInputPolicy},
    tensor::NormalizedTensor,
};

/// Configuration for [`FrameSampler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Edge length of the square output tensor.
    pub output_size: u32,
    pub invalid_input: InvalidInputPolicy,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerSettings::default().into()
    }
}

impl From<SamplerSettings> for SamplerConfig {
    fn from(settings: SamplerSettings) -> Self {
        Self {
            output_size: settings.output_size,
            invalid_input: settings.invalid_input,
        }
    }
}

impl From<&SamplerSettings> for SamplerConfig {
    fn from(settings: &SamplerSettings) -> Self {
        (*settings).into()
    }
}

/// Extracts fixed-size normalized RGB tensors from YUV frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameSampler {
    config: SamplerConfig,
}

impl FrameSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Sampler with the given output size and the default (reporting) policy.
    pub fn with_output_size(output_size: u32) -> Self {
        Self::new(SamplerConfig {
            output_size,
            ..SamplerConfig::default()
        })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Number of `f32` elements a caller must provide to [`Self::sample_into`].
    pub fn output_len(&self) -> usize {
        tensor_len(self.config.output_size)
    }

    /// Fill `out` with the `output_size x output_size x 3` tensor for `crop`.
    ///
    /// `crop` is in upright coordinates; `rotation` says how the sensor frame
    /// is turned relative to upright. All checks run before the first write,
    /// so on error (or [`Conversion::Skipped`]) `out` is unchanged.
    pub fn sample_into(
        &self,
        frame: &PlanarYuvFrame<'_>,
        crop: CropRegion,
        rotation: Rotation,
        out: &mut [f32],
    ) -> Result<Conversion, FrameError> {
        let _guard = timing_guard("frametensor_core::sample_face", log::Level::Trace);
        let size = self.config.output_size;
        let validated = validate(frame, size, out.len());
        if let Some(skipped) = policy::resolve(self.config.invalid_input, "sample_face", validated)? {
            return Ok(skipped);
        }

        write_tensor(frame, crop, rotation, size as usize, out);
        Ok(Conversion::Written)
    }

    /// Allocate a tensor and sample into it.
    ///
    /// There is no caller buffer to leave untouched here, so every failure is
    /// reported regardless of the configured policy.
    pub fn sample_owned(
        &self,
        frame: &PlanarYuvFrame<'_>,
        crop: CropRegion,
        rotation: Rotation,
    ) -> Result<NormalizedTensor, FrameError> {
        let size = self.config.output_size;
        validate(frame, size, tensor_len(size))?;
        let mut tensor = NormalizedTensor::new(size);
        write_tensor(frame, crop, rotation, size as usize, tensor.as_mut_slice());
        Ok(tensor)
    }
}

/// One-shot sampling with explicit error reporting.
///
/// Equivalent to `FrameSampler::with_output_size(output_size).sample_into(..)`.
pub fn sample_face(
    frame: &PlanarYuvFrame<'_>,
    crop: CropRegion,
    rotation: Rotation,
    output_size: u32,
    out: &mut [f32],
) -> Result<(), FrameError> {
    FrameSampler::with_output_size(output_size)
        .sample_into(frame, crop, rotation, out)
        .map(|_| ())
}

fn tensor_len(output_size: u32) -> usize {
    let size = output_size as usize;
    size.saturating_mul(size).saturating_mul(3)
}

fn validate(frame: &PlanarYuvFrame<'_>, output_size: u32, out_len: usize) -> Result<(), FrameError> {
    if output_size == 0 {
        return Err(FrameError::ZeroOutputSize);
    }
    frame.validate()?;
    if frame.width < 2 || frame.height < 2 {
        return Err(FrameError::FrameTooSmall {
            width: frame.width,
            height: frame.height,
        });
    }
    let expected = tensor_len(output_size);
    if out_len != expected {
        return Err(FrameError::OutputSizeMismatch {
            expected,
            actual: out_len,
        });
    }
    Ok(())
}

fn write_tensor(
    frame: &PlanarYuvFrame<'_>,
    crop: CropRegion,
    rotation: Rotation,
    size: usize,
    out: &mut [f32],
) {
    let origin = crop.origin();
    let extent = crop.extent();
    let scale = size as f32;

    for (oy, row) in out.chunks_exact_mut(size * 3).enumerate() {
        let fy = (oy as f32 + 0.5) / scale;
        for (ox, pixel) in row.chunks_exact_mut(3).enumerate() {
            let fx = (ox as f32 + 0.5) / scale;
            let upright = origin + Point::new(fx, fy) * extent;
            let raw = rotation.to_sensor(upright, frame.width, frame.height);

            let luma = bilinear_luma(frame, raw);
            let (u, v) = nearest_chroma(frame, raw);
            let rgb = yuv_to_rgb(luma, u as f32, v as f32);

            pixel[0] = normalize_channel(rgb[0]);
            pixel[1] = normalize_channel(rgb[1]);
            pixel[2] = normalize_channel(rgb[2]);
        }
    }
}

/// Bilinear luma at `p`.
///
/// The top-left neighbour is clamped so the 2x2 block always lies inside the
/// frame. Offsets are measured from the clamped corner, so positions past the
/// edge extrapolate from the border block; the RGB clamp bounds the result.
#[inline]
fn bilinear_luma(frame: &PlanarYuvFrame<'_>, p: Point) -> f32 {
    let max_x = frame.width as i32 - 2;
    let max_y = frame.height as i32 - 2;
    let x0 = (p.x.floor() as i32).clamp(0, max_x);
    let y0 = (p.y.floor() as i32).clamp(0, max_y);
    let dx = p.x - x0 as f32;
    let dy = p.y - y0 as f32;

    let (x0, y0) = (x0 as usize, y0 as usize);
    let v00 = frame.luma(x0, y0) as f32;
    let v10 = frame.luma(x0 + 1, y0) as f32;
    let v01 = frame.luma(x0, y0 + 1) as f32;
    let v11 = frame.luma(x0 + 1, y0 + 1) as f32;

    // Lerp form keeps flat regions exact.
    let top = v00 + (v10 - v00) * dx;
    let bottom = v01 + (v11 - v01) * dx;
    top + (bottom - top) * dy
}

#[inline]
fn nearest_chroma(frame: &PlanarYuvFrame<'_>, p: Point) -> (i32, i32) {
    let max_cx = (frame.width / 2) as i32 - 1;
    let max_cy = (frame.height / 2) as i32 - 1;
    let cx = ((p.x.floor() as i32) >> 1).clamp(0, max_cx);
    let cy = ((p.y.floor() as i32) >> 1).clamp(0, max_cy);
    frame.chroma(cx as usize, cy as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaneKind;
    use crate::frame::{PlaneView, test_frames::OwnedFrame};

    #[test]
    fn constant_frame_produces_constant_tensor() {
        let frame = OwnedFrame::constant(8, 8, 200, 128, 128, 0);
        let sampler = FrameSampler::with_output_size(4);
        let mut out = vec![f32::NAN; sampler.output_len()];

        let result = sampler
            .sample_into(&frame.view(), CropRegion::new(2, 2, 4, 4), Rotation::Deg0, &mut out)
            .expect("sample");

        assert_eq!(result, Conversion::Written);
        let expected = (200.0f32 - 127.5) / 128.0;
        assert!(out.iter().all(|v| *v == expected));
    }

    #[test]
    fn luma_is_interpolated_between_neighbours() {
        // Horizontal ramp: Y = 10 * x.
        let frame = OwnedFrame::luma_pattern(8, 4, |x, _| (10 * x) as u8);
        let mut out = vec![0.0; 3];
        // 1x1 output over a 2-pixel wide crop samples the crop centre, x = 2.0 + 1.0.
        sample_face(&frame.view(), CropRegion::new(2, 0, 2, 2), Rotation::Deg0, 1, &mut out)
            .expect("sample");
        let expected = (30.0f32 - 127.5) / 128.0;
        assert!(out.iter().all(|v| (*v - expected).abs() < 1e-6), "{out:?}");

        // Half a pixel right of a sample blends two columns equally.
        sample_face(&frame.view(), CropRegion::new(2, 0, 1, 2), Rotation::Deg0, 1, &mut out)
            .expect("sample");
        let expected = (25.0f32 - 127.5) / 128.0;
        assert!(out.iter().all(|v| (*v - expected).abs() < 1e-6), "{out:?}");
    }

    #[test]
    fn chroma_shifts_channels() {
        // Strong V pushes red up and green down, B stays at luma.
        let frame = OwnedFrame::constant(4, 4, 100, 128, 178, 0);
        let mut out = vec![0.0; 3];
        sample_face(&frame.view(), CropRegion::new(0, 0, 4, 4), Rotation::Deg0, 1, &mut out)
            .expect("sample");
        let r = (100.0 + 1.402 * 50.0 - 127.5) / 128.0;
        let g = (100.0 - 0.714136 * 50.0 - 127.5) / 128.0;
        let b = (100.0f32 - 127.5) / 128.0;
        assert!((out[0] - r).abs() < 1e-5);
        assert!((out[1] - g).abs() < 1e-5);
        assert!((out[2] - b).abs() < 1e-6);
    }

    #[test]
    fn half_turn_reads_mirrored_corner() {
        // Only the sensor's bottom-right 2x2 block is bright.
        let frame = OwnedFrame::luma_pattern(6, 6, |x, y| if x >= 4 && y >= 4 { 250 } else { 0 });
        let mut out = vec![0.0; 3];
        // Upright top-left 2x2 block; centre (1, 1) maps to sensor (4, 4).
        sample_face(&frame.view(), CropRegion::new(0, 0, 2, 2), Rotation::Deg180, 1, &mut out)
            .expect("sample");
        let expected = (250.0f32 - 127.5) / 128.0;
        assert!(out.iter().all(|v| *v == expected), "{out:?}");
    }

    #[test]
    fn empty_plane_reports_and_leaves_output_untouched() {
        let frame = OwnedFrame::constant(4, 4, 100, 128, 128, 0);
        let mut view = frame.view();
        view.v = PlaneView::new(&[], 2, 1);
        let mut out = vec![7.0; 3 * 2 * 2];

        let err = sample_face(&view, CropRegion::new(0, 0, 4, 4), Rotation::Deg0, 2, &mut out)
            .expect_err("empty plane must fail");
        assert!(matches!(
            err,
            FrameError::InvalidBuffer {
                plane: PlaneKind::V,
                ..
            }
        ));
        assert!(out.iter().all(|v| *v == 7.0));
    }

    #[test]
    fn skip_policy_is_a_no_op() {
        let frame = OwnedFrame::constant(4, 4, 100, 128, 128, 0);
        let sampler = FrameSampler::new(SamplerConfig {
            output_size: 2,
            invalid_input: InvalidInputPolicy::Skip,
        });
        let mut out = vec![7.0; 5];

        let result = sampler
            .sample_into(&frame.view(), CropRegion::new(0, 0, 4, 4), Rotation::Deg0, &mut out)
            .expect("skip policy does not fail on buffer errors");
        assert_eq!(result, Conversion::Skipped);
        assert!(out.iter().all(|v| *v == 7.0));
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        let frame = OwnedFrame::constant(1, 4, 100, 128, 128, 0);
        let mut out = vec![0.0; 3];
        assert_eq!(
            sample_face(&frame.view(), CropRegion::new(0, 0, 1, 1), Rotation::Deg0, 1, &mut out),
            Err(FrameError::FrameTooSmall {
                width: 1,
                height: 4
            })
        );
        assert_eq!(
            sample_face(&frame.view(), CropRegion::new(0, 0, 1, 1), Rotation::Deg0, 0, &mut []),
            Err(FrameError::ZeroOutputSize)
        );
    }

    #[test]
    fn oversized_frame_is_rejected_before_sampling() {
        let plane = [10u8; 4];
        let view = PlanarYuvFrame::new(
            3_000_000_000,
            2,
            PlaneView::new(&plane, 1, 0),
            PlaneView::new(&plane, 1, 0),
            PlaneView::new(&plane, 1, 0),
        );
        let mut out = vec![7.0; 3];
        let err = sample_face(&view, CropRegion::new(0, 0, 2, 2), Rotation::Deg0, 1, &mut out)
            .expect_err("frame wider than i32 must fail");
        assert!(matches!(err, FrameError::FrameTooLarge { .. }));
        assert!(out.iter().all(|v| *v == 7.0));
    }

    #[test]
    fn zero_pixel_stride_is_skippable() {
        let frame = OwnedFrame::constant(4, 4, 100, 128, 128, 0);
        let mut view = frame.view();
        view.y = PlaneView::new(&frame.y, 4, 0);
        let sampler = FrameSampler::new(SamplerConfig {
            output_size: 2,
            invalid_input: InvalidInputPolicy::Skip,
        });
        let mut out = vec![7.0; 12];
        let result = sampler
            .sample_into(&view, CropRegion::new(0, 0, 4, 4), Rotation::Deg0, &mut out)
            .expect("stride errors follow the skip policy");
        assert_eq!(result, Conversion::Skipped);
        assert!(out.iter().all(|v| *v == 7.0));
    }

    #[test]
    fn owned_tensor_matches_borrowed_output() {
        let frame = OwnedFrame::luma_pattern(16, 12, |x, y| (x * 13 + y * 7) as u8);
        let sampler = FrameSampler::with_output_size(5);
        let crop = CropRegion::new(1, 2, 9, 8);

        let owned = sampler
            .sample_owned(&frame.view(), crop, Rotation::Deg270)
            .expect("owned sample");
        let mut borrowed = vec![0.0; sampler.output_len()];
        let _ = sampler
            .sample_into(&frame.view(), crop, Rotation::Deg270, &mut borrowed)
            .expect("borrowed sample");

        assert_eq!(owned.as_slice(), borrowed.as_slice());
    }
}
