//! Cheap brightness estimate used to skip frames that are too dark to sample.

use std::fmt;

use frametensor_utils::config::ExposureSettings;
use serde::Serialize;

use crate::{error::FrameError, frame::PlanarYuvFrame};

/// Mean of every `step`-th visible luma sample, in raster order.
///
/// Row padding is skipped. A `step` of zero reads every sample.
pub fn mean_luminance(frame: &PlanarYuvFrame<'_>, step: usize) -> Result<f64, FrameError> {
    frame.validate()?;
    let (width, height) = frame.luma_extent();
    let step = step.max(1);

    let (sum, count) = (0..width * height)
        .step_by(step)
        .fold((0u64, 0u64), |(sum, count), index| {
            let sample = frame.luma(index % width, index / width);
            (sum + sample as u64, count + 1)
        });

    // `validate` rejects empty frames, so `count` is at least one.
    Ok(sum as f64 / count as f64)
}

/// Brightness bucket of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Exposure {
    Dark,
    Normal,
}

impl fmt::Display for Exposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Exposure::Dark => "dark",
            Exposure::Normal => "normal",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExposureReport {
    pub mean_luma: f64,
    pub exposure: Exposure,
}

/// Classifies frames against a minimum mean luma.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureCheck {
    pub min_mean_luma: f64,
    pub sample_step: usize,
}

impl Default for ExposureCheck {
    fn default() -> Self {
        ExposureSettings::default().into()
    }
}

impl From<ExposureSettings> for ExposureCheck {
    fn from(settings: ExposureSettings) -> Self {
        Self {
            min_mean_luma: settings.min_mean_luma,
            sample_step: settings.sample_step,
        }
    }
}

impl ExposureCheck {
    pub fn classify(&self, mean_luma: f64) -> Exposure {
        if mean_luma < self.min_mean_luma {
            Exposure::Dark
        } else {
            Exposure::Normal
        }
    }

    pub fn evaluate(&self, frame: &PlanarYuvFrame<'_>) -> Result<ExposureReport, FrameError> {
        let mean_luma = mean_luminance(frame, self.sample_step)?;
        let exposure = self.classify(mean_luma);
        log::debug!("mean luma {mean_luma:.1} -> {exposure}");
        Ok(ExposureReport {
            mean_luma,
            exposure,
        })
    }
}
