//! Shared configuration types consumed across the frametensor workspace.
//!
//! These structures describe how frames are sampled, how embedding comparisons
//! report failures, and how telemetry behaves. They serialize to a single JSON
//! file so the CLI and embedding hosts can share one settings document.

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Input edge length of the face-embedding model the sampler feeds by default.
pub const DEFAULT_OUTPUT_SIZE: u32 = 112;

/// Largest accepted output edge length (a 4096x4096x3 `f32` tensor is 192 MiB).
pub const MAX_OUTPUT_SIZE: u32 = 4096;

/// Reject output sizes the sampler cannot serve.
pub fn check_output_size(size: u32) -> Result<()> {
    anyhow::ensure!(size > 0, "output size must be greater than zero");
    anyhow::ensure!(
        size <= MAX_OUTPUT_SIZE,
        "output size {size} exceeds the maximum of {MAX_OUTPUT_SIZE}"
    );
    Ok(())
}

/// What a frame transform does when its input or output buffer is unusable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvalidInputPolicy {
    /// Return the error to the caller.
    #[default]
    Report,
    /// Log a warning and leave the output untouched.
    Skip,
}

impl fmt::Display for InvalidInputPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InvalidInputPolicy::Report => "report",
            InvalidInputPolicy::Skip => "skip",
        })
    }
}

impl FromStr for InvalidInputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "report" | "error" => Ok(InvalidInputPolicy::Report),
            "skip" | "noop" | "no-op" => Ok(InvalidInputPolicy::Skip),
            other => Err(format!(
                "invalid input policy '{other}'; expected 'report' or 'skip'"
            )),
        }
    }
}

/// Settings for cropping a face region into a model tensor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SamplerSettings {
    /// Edge length of the square output tensor in pixels.
    pub output_size: u32,
    /// Behaviour on missing or undersized buffers.
    pub invalid_input: InvalidInputPolicy,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            output_size: DEFAULT_OUTPUT_SIZE,
            invalid_input: InvalidInputPolicy::Report,
        }
    }
}

/// Settings for full-frame preview conversion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PreviewSettings {
    pub invalid_input: InvalidInputPolicy,
}

/// How comparison failures surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// Length mismatches and degenerate vectors both yield distance `1.0`.
    #[default]
    Sentinel,
    /// Failures are reported as distinct errors.
    Strict,
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComparisonMode::Sentinel => "sentinel",
            ComparisonMode::Strict => "strict",
        })
    }
}

impl FromStr for ComparisonMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentinel" | "compat" => Ok(ComparisonMode::Sentinel),
            "strict" => Ok(ComparisonMode::Strict),
            other => Err(format!(
                "invalid comparison mode '{other}'; expected 'sentinel' or 'strict'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ComparisonSettings {
    pub mode: ComparisonMode,
}

/// Luminance gate applied before a frame is worth sampling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExposureSettings {
    /// Frames whose mean luma falls below this are considered too dark.
    pub min_mean_luma: f64,
    /// Only every `sample_step`-th luma sample is read.
    pub sample_step: usize,
}

impl Default for ExposureSettings {
    fn default() -> Self {
        Self {
            min_mean_luma: 30.0,
            sample_step: 10,
        }
    }
}

/// Settings controlling optional runtime telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Whether telemetry timing logs are enabled.
    pub enabled: bool,
    /// Logging level for telemetry output (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "debug".to_string(),
        }
    }
}

impl TelemetrySettings {
    /// Resolve the configured level string into a `LevelFilter`.
    ///
    /// Unknown strings fall back to `Debug`.
    pub fn level_filter(&self) -> LevelFilter {
        self.level.trim().parse().unwrap_or(LevelFilter::Debug)
    }

    pub fn set_level(&mut self, level: LevelFilter) {
        self.level = level.as_str().to_ascii_lowercase();
    }
}

/// Persistent settings shared by the CLI and library hosts.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    pub sampler: SamplerSettings,
    pub preview: PreviewSettings,
    pub comparison: ComparisonSettings,
    pub exposure: ExposureSettings,
    pub telemetry: TelemetrySettings,
}

impl AppSettings {
    /// Load settings from a JSON file.
    ///
    /// Missing sections fall back to their defaults. An `output_size` outside
    /// `1..=MAX_OUTPUT_SIZE` is rejected here so the error points at the file
    /// rather than at a later frame.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let settings: AppSettings = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings JSON at {}", path.display()))?;
        check_output_size(settings.sampler.output_size)
            .with_context(|| format!("invalid sampler.output_size in {}", path.display()))?;
        Ok(settings)
    }

    /// Serialize settings to disk as pretty-printed JSON, overwriting any existing file.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let payload =
            serde_json::to_string_pretty(self).context("failed to serialize settings JSON")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }
}

/// Returns the default path for persisted settings (`config/frametensor.json`).
pub fn default_settings_path() -> PathBuf {
    env::current_dir()
        .map(|dir| dir.join("config/frametensor.json"))
        .unwrap_or_else(|_| PathBuf::from("config/frametensor.json"))
}
