//! Common helpers shared across frametensor crates.

/// Application configuration and settings management.
pub mod config;
/// Fixture loading and path resolution for tests and benches.
pub mod fixtures;
/// Conversions from raw pixel buffers into `image` types for previews.
pub mod image_utils;
/// Instrumentation helpers for optional performance tracing.
pub mod telemetry;

use std::path::Path;

use anyhow::Result;
use log::LevelFilter;

pub use config::{
    AppSettings, ComparisonMode, ComparisonSettings, ExposureSettings, InvalidInputPolicy,
    PreviewSettings, SamplerSettings, TelemetrySettings, default_settings_path,
};
pub use fixtures::{fixture_path, fixtures_dir, load_fixture_bytes, load_fixture_json};
pub use image_utils::{argb_to_rgba_image, denormalize_channel, save_png, tensor_to_rgb_image};
pub use telemetry::{
    TimingGuard, configure as configure_telemetry, telemetry_allows, telemetry_enabled,
    telemetry_level, timing_guard, timing_guard_if,
};

/// Log target used by [`telemetry`] timing guards.
pub const TELEMETRY_TARGET: &str = "frametensor::telemetry";

/// Initialize logging once for CLI and test environments.
///
/// `RUST_LOG` wins when it is set; otherwise `default_filter` applies. The
/// telemetry target is always allowed through so that runtime toggles via
/// [`configure_telemetry`] take effect without restarting the logger.
pub fn init_logging(default_filter: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    builder.filter_module(TELEMETRY_TARGET, LevelFilter::Trace);

    if builder.try_init().is_err() {
        // Logger already initialized; nothing to do.
    }
    Ok(())
}

/// Validate that a path exists and resolve it to an absolute path.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> Result<std::path::PathBuf> {
    let path = path.as_ref();
    anyhow::ensure!(path.exists(), "path does not exist: {}", path.display());
    Ok(path.canonicalize()?)
}
