use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use clap::Parser;
use log::{Level, LevelFilter, info, warn};
use serde::{Serialize, de::DeserializeOwned};

use frametensor_core::{
    Conversion, CropRegion, ExposureCheck, FrameColorConverter, FrameSampler, NormalizedTensor,
    Rotation, SamplerConfig, VectorComparator, l2_normalize,
};
use frametensor_utils::{
    argb_to_rgba_image, config::AppSettings, configure_telemetry, init_logging, normalize_path,
    save_png, timing_guard,
};

mod args;
mod config;
mod input;
mod types;

use crate::{
    args::{Cli, Command, CompareArgs, LumaArgs, PreviewArgs, SampleArgs},
    config::{apply_cli_overrides, load_settings},
    input::RawFrame,
    types::{DistanceRecord, LumaRecord, PreviewRecord, SampleRecord, TensorStats},
};

fn main() -> Result<()> {
    init_logging(LevelFilter::Info)?;
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_ref())?;
    apply_cli_overrides(&mut settings, &cli)?;
    configure_telemetry(
        settings.telemetry.enabled,
        settings.telemetry.level_filter(),
    );

    match &cli.command {
        Command::Sample(args) => run_sample(&settings, args),
        Command::Preview(args) => run_preview(&settings, args),
        Command::Compare(args) => run_compare(&settings, args),
        Command::Luma(args) => run_luma(&settings, args),
    }
}

fn run_sample(settings: &AppSettings, args: &SampleArgs) -> Result<()> {
    let _guard = timing_guard("frametensor_cli::sample", Level::Debug);
    let frame = RawFrame::load(&args.frame)?;
    let view = frame.view();

    let rotation = Rotation::from_degrees(args.rotation);
    let (upright_w, upright_h) = rotation.upright_dimensions(frame.width, frame.height);
    let mut crop = match args.crop {
        Some(crop) => crop,
        None => CropRegion::new(
            0,
            0,
            i32::try_from(upright_w).context("frame width does not fit a crop rectangle")?,
            i32::try_from(upright_h).context("frame height does not fit a crop rectangle")?,
        ),
    };
    if args.clamp_crop {
        crop = crop.clamped_to(upright_w, upright_h);
    }
    if !crop.fits_within(upright_w, upright_h) {
        warn!(
            "crop {crop:?} extends past the {upright_w}x{upright_h} upright frame; edge samples will repeat"
        );
    }

    let sampler = FrameSampler::new(SamplerConfig::from(&settings.sampler));
    let output_size = sampler.config().output_size;
    let mut tensor = NormalizedTensor::new(output_size);
    let conversion = sampler.sample_into(&view, crop, rotation, tensor.as_mut_slice())?;

    let mut record = SampleRecord {
        input: args.frame.input.display().to_string(),
        layout: frame.layout.name(),
        width: frame.width,
        height: frame.height,
        rotation: rotation.degrees(),
        crop,
        output_size,
        written: conversion.is_written(),
        stats: None,
        output: None,
        preview: None,
    };

    if conversion == Conversion::Skipped {
        warn!("frame was skipped; no tensor written");
        return print_json(&record);
    }

    record.stats = Some(TensorStats::from_interleaved(tensor.as_slice()));
    if let Some(path) = args.output.as_ref() {
        write_tensor(path, &tensor)?;
        info!("Wrote {output_size}x{output_size}x3 tensor to {}", path.display());
        record.output = Some(path.display().to_string());
    }
    if let Some(path) = args.preview.as_ref() {
        save_png(path, tensor.to_rgb_image()?)?;
        info!("Wrote tensor preview to {}", path.display());
        record.preview = Some(path.display().to_string());
    }
    print_json(&record)
}

fn run_preview(settings: &AppSettings, args: &PreviewArgs) -> Result<()> {
    let _guard = timing_guard("frametensor_cli::preview", Level::Debug);
    let frame = RawFrame::load(&args.frame)?;
    let view = frame.view();

    let converter = FrameColorConverter::from(settings.preview);
    let mut pixels = vec![0u32; frame.width as usize * frame.height as usize];
    let conversion = converter.convert_into(&view, &mut pixels)?;

    let mut record = PreviewRecord {
        input: args.frame.input.display().to_string(),
        width: frame.width,
        height: frame.height,
        written: conversion.is_written(),
        output: None,
    };
    if conversion.is_written() {
        let image = argb_to_rgba_image(frame.width, frame.height, &pixels)?;
        save_png(&args.output, image)?;
        info!("Wrote preview to {}", args.output.display());
        record.output = Some(args.output.display().to_string());
    } else {
        warn!("frame was skipped; no preview written");
    }
    print_json(&record)
}

fn run_compare(settings: &AppSettings, args: &CompareArgs) -> Result<()> {
    let comparator = VectorComparator::from(settings.comparison);
    let mut probe: Vec<f32> = read_json(&args.probe)?;
    if args.normalize {
        l2_normalize(&mut probe);
    }

    if let Some(gallery_path) = args.gallery.as_ref() {
        let gallery: BTreeMap<String, Vec<f32>> = read_json(gallery_path)?;
        let (names, mut embeddings): (Vec<String>, Vec<Vec<f32>>) = gallery.into_iter().unzip();
        if args.normalize {
            embeddings.iter_mut().for_each(|e| l2_normalize(e));
        }
        info!(
            "Comparing probe against {} gallery entries ({} mode)",
            embeddings.len(),
            comparator.mode()
        );

        let mut records: Vec<DistanceRecord> = names
            .into_iter()
            .zip(comparator.distances_to_gallery(&probe, &embeddings))
            .map(|(name, result)| DistanceRecord::new(Some(name), result))
            .collect();
        // Closest first; entries that could not be compared go last.
        records.sort_by(|a, b| match (a.distance, b.distance) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        return print_json(&records);
    }

    let Some(candidate_path) = args.candidate.as_ref() else {
        anyhow::bail!("either a candidate embedding or --gallery is required");
    };
    let mut candidate: Vec<f32> = read_json(candidate_path)?;
    if args.normalize {
        l2_normalize(&mut candidate);
    }

    let result = comparator.distance(&probe, &candidate);
    print_json(&DistanceRecord::new(None, result))?;
    result.map(|_| ()).context("comparison failed")
}

fn run_luma(settings: &AppSettings, args: &LumaArgs) -> Result<()> {
    let frame = RawFrame::load(&args.frame)?;
    let check = ExposureCheck::from(settings.exposure);
    let report = check.evaluate(&frame.view())?;
    print_json(&LumaRecord {
        input: args.frame.input.display().to_string(),
        mean_luma: report.mean_luma,
        exposure: report.exposure,
        min_mean_luma: check.min_mean_luma,
    })
}

fn write_tensor(path: &Path, tensor: &NormalizedTensor) -> Result<()> {
    ensure_parent(path)?;
    let bytes: Vec<u8> = tensor
        .as_slice()
        .iter()
        .flat_map(|value| value.to_le_bytes())
        .collect();
    fs::write(path, bytes).with_context(|| format!("failed to write tensor {}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let resolved = normalize_path(path)?;
    let contents = fs::read_to_string(&resolved)
        .with_context(|| format!("failed to read {}", resolved.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse JSON at {}", resolved.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}
