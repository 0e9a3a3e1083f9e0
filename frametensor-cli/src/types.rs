//! Serializable records printed by the frametensor CLI.

use frametensor_core::{CompareError, CropRegion, Exposure};
use serde::Serialize;

/// Summary of one `sample` run.
#[derive(Debug, Serialize)]
pub struct SampleRecord {
    pub input: String,
    pub layout: &'static str,
    pub width: u32,
    pub height: u32,
    pub rotation: i32,
    pub crop: CropRegion,
    pub output_size: u32,
    pub written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<TensorStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Per-channel mean plus overall range of a tensor.
#[derive(Debug, Serialize)]
pub struct TensorStats {
    pub min: f32,
    pub max: f32,
    pub channel_mean: [f32; 3],
}

impl TensorStats {
    pub fn from_interleaved(values: &[f32]) -> Self {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sums = [0.0f64; 3];
        for pixel in values.chunks_exact(3) {
            for (channel, &value) in pixel.iter().enumerate() {
                min = min.min(value);
                max = max.max(value);
                sums[channel] += value as f64;
            }
        }
        let pixels = (values.len() / 3).max(1) as f64;
        Self {
            min,
            max,
            channel_mean: sums.map(|sum| (sum / pixels) as f32),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PreviewRecord {
    pub input: String,
    pub width: u32,
    pub height: u32,
    pub written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Distance to one candidate, or why it could not be computed.
#[derive(Debug, Serialize)]
pub struct DistanceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DistanceRecord {
    pub fn new(name: Option<String>, result: Result<f32, CompareError>) -> Self {
        match result {
            Ok(distance) => Self {
                name,
                distance: Some(distance),
                error: None,
            },
            Err(err) => Self {
                name,
                distance: None,
                error: Some(err.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LumaRecord {
    pub input: String,
    pub mean_luma: f64,
    pub exposure: Exposure,
    pub min_mean_luma: f64,
}
