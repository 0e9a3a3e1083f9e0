//! Configuration loading and CLI override logic.

use std::path::PathBuf;

use anyhow::{Context, Result};
use frametensor_utils::{
    config::{AppSettings, check_output_size, default_settings_path},
    normalize_path,
};
use log::info;

use crate::args::{Cli, Command};

/// Load application settings from a file or use defaults.
pub fn load_settings(config_path: Option<&PathBuf>) -> Result<AppSettings> {
    if let Some(path) = config_path {
        let resolved = normalize_path(path)?;
        let settings = AppSettings::load_from_path(&resolved)?;
        info!("Loaded settings from {}", resolved.display());
        Ok(settings)
    } else {
        let default_path = default_settings_path();
        if default_path.exists() {
            let settings = AppSettings::load_from_path(&default_path).with_context(|| {
                format!(
                    "failed to load default settings from {}",
                    default_path.display()
                )
            })?;
            info!("Loaded settings from {}", default_path.display());
            Ok(settings)
        } else {
            Ok(AppSettings::default())
        }
    }
}

/// Apply command-line arguments to override loaded or default settings.
pub fn apply_cli_overrides(settings: &mut AppSettings, cli: &Cli) -> Result<()> {
    if cli.telemetry {
        settings.telemetry.enabled = true;
    }
    if let Some(level) = cli.telemetry_level.as_ref() {
        let normalized = level.trim();
        if !normalized.is_empty() {
            let lower = normalized.to_ascii_lowercase();
            settings.telemetry.level = lower.clone();
            if lower == "off" {
                settings.telemetry.enabled = false;
            }
        }
    }

    match &cli.command {
        Command::Sample(args) => {
            if let Some(size) = args.output_size {
                check_output_size(size).context("invalid --output-size")?;
                settings.sampler.output_size = size;
            }
            if let Some(policy) = args.on_invalid {
                settings.sampler.invalid_input = policy;
            }
        }
        Command::Preview(args) => {
            if let Some(policy) = args.on_invalid {
                settings.preview.invalid_input = policy;
            }
        }
        Command::Compare(args) => {
            if let Some(mode) = args.mode {
                settings.comparison.mode = mode;
            }
        }
        Command::Luma(args) => {
            if let Some(step) = args.sample_step {
                settings.exposure.sample_step = step;
            }
            if let Some(min) = args.min_mean_luma {
                settings.exposure.min_mean_luma = min;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use frametensor_utils::config::{ComparisonMode, InvalidInputPolicy};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("frametensor").chain(args.iter().copied()))
            .expect("parse")
    }

    #[test]
    fn sample_overrides_reach_sampler_settings() {
        let cli = parse(&[
            "sample", "-i", "f.yuv", "--width", "8", "--height", "8", "--output-size", "64",
            "--on-invalid", "skip",
        ]);
        let mut settings = AppSettings::default();
        apply_cli_overrides(&mut settings, &cli).expect("overrides");
        assert_eq!(settings.sampler.output_size, 64);
        assert_eq!(settings.sampler.invalid_input, InvalidInputPolicy::Skip);
        assert_eq!(settings.preview.invalid_input, InvalidInputPolicy::Report);
    }

    #[test]
    fn zero_output_size_is_rejected() {
        let cli = parse(&[
            "sample", "-i", "f.yuv", "--width", "8", "--height", "8", "--output-size", "0",
        ]);
        assert!(apply_cli_overrides(&mut AppSettings::default(), &cli).is_err());
    }

    #[test]
    fn huge_output_size_is_rejected_before_allocation() {
        let cli = parse(&[
            "sample", "-i", "f.yuv", "--width", "8", "--height", "8", "--output-size", "100000",
        ]);
        let mut settings = AppSettings::default();
        let err = apply_cli_overrides(&mut settings, &cli).expect_err("too large");
        assert!(format!("{err:#}").contains("exceeds the maximum"));
        assert_eq!(settings.sampler.output_size, 112);
    }

    #[test]
    fn telemetry_level_off_disables_telemetry() {
        let cli = parse(&[
            "--telemetry",
            "--telemetry-level",
            "OFF",
            "compare",
            "a.json",
            "b.json",
            "--mode",
            "strict",
        ]);
        let mut settings = AppSettings::default();
        apply_cli_overrides(&mut settings, &cli).expect("overrides");
        assert!(!settings.telemetry.enabled);
        assert_eq!(settings.telemetry.level, "off");
        assert_eq!(settings.comparison.mode, ComparisonMode::Strict);
    }
}
