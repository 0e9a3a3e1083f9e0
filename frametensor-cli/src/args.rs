//! Command-line argument definitions for the frametensor CLI.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use frametensor_core::CropRegion;
use frametensor_utils::config::{ComparisonMode, InvalidInputPolicy};
use std::path::PathBuf;

/// Sample face tensors from raw YUV frames and compare face embeddings.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional settings JSON. Defaults to `config/frametensor.json` when present, otherwise built-in parameters.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable telemetry timing logs (defaults to settings file).
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub telemetry: bool,

    /// Override telemetry logging level (error, warn, info, debug, trace).
    #[arg(long, global = true, value_name = "LEVEL")]
    pub telemetry_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Crop, rotate and normalize a face region into a model tensor.
    Sample(SampleArgs),
    /// Convert a whole frame to a PNG preview.
    Preview(PreviewArgs),
    /// Cosine distance between embeddings stored as JSON arrays.
    Compare(CompareArgs),
    /// Report the mean luminance of a frame.
    Luma(LumaArgs),
}

/// Memory layout of a raw 4:2:0 frame file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum FrameLayout {
    /// Y plane, then U plane, then V plane.
    #[default]
    I420,
    /// Y plane, then interleaved UV.
    Nv12,
    /// Y plane, then interleaved VU.
    Nv21,
}

impl FrameLayout {
    pub fn name(self) -> &'static str {
        match self {
            FrameLayout::I420 => "i420",
            FrameLayout::Nv12 => "nv12",
            FrameLayout::Nv21 => "nv21",
        }
    }
}

/// Location and geometry of a raw frame file.
#[derive(Debug, Args)]
pub struct FrameArgs {
    /// Raw frame file.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Frame width in pixels.
    #[arg(long)]
    pub width: u32,

    /// Frame height in pixels.
    #[arg(long)]
    pub height: u32,

    /// Plane layout of the file.
    #[arg(long, value_enum, default_value_t = FrameLayout::I420)]
    pub layout: FrameLayout,

    /// Padding bytes at the end of every row, in every plane.
    #[arg(long, default_value_t = 0)]
    pub row_padding: usize,
}

#[derive(Debug, Args)]
pub struct SampleArgs {
    #[command(flatten)]
    pub frame: FrameArgs,

    /// Crop rectangle in upright coordinates as LEFT,TOP,WIDTH,HEIGHT. Defaults to the whole upright frame.
    #[arg(long, value_name = "RECT", value_parser = parse_crop)]
    pub crop: Option<CropRegion>,

    /// Clamp the crop rectangle into the upright frame before sampling.
    #[arg(long, action = ArgAction::SetTrue)]
    pub clamp_crop: bool,

    /// Clockwise rotation in degrees that brings the sensor image upright (0, 90, 180, 270).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub rotation: i32,

    /// Edge length of the output tensor.
    #[arg(long)]
    pub output_size: Option<u32>,

    /// What to do with missing or undersized planes: `report` or `skip`.
    #[arg(long, value_name = "POLICY")]
    pub on_invalid: Option<InvalidInputPolicy>,

    /// Write the tensor as little-endian f32 values.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a de-normalized PNG of the tensor.
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub frame: FrameArgs,

    /// Destination PNG.
    #[arg(short, long)]
    pub output: PathBuf,

    /// What to do with missing or undersized planes: `report` or `skip`.
    #[arg(long, value_name = "POLICY")]
    pub on_invalid: Option<InvalidInputPolicy>,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Probe embedding (JSON array of numbers).
    pub probe: PathBuf,

    /// Embedding to compare against.
    #[arg(required_unless_present = "gallery", conflicts_with = "gallery")]
    pub candidate: Option<PathBuf>,

    /// JSON object mapping names to embeddings; prints every distance, closest first.
    #[arg(long)]
    pub gallery: Option<PathBuf>,

    /// Failure reporting: `sentinel` (distance 1.0) or `strict` (explicit errors).
    #[arg(long, value_name = "MODE")]
    pub mode: Option<ComparisonMode>,

    /// L2-normalize embeddings before comparing.
    #[arg(long, action = ArgAction::SetTrue)]
    pub normalize: bool,
}

#[derive(Debug, Args)]
pub struct LumaArgs {
    #[command(flatten)]
    pub frame: FrameArgs,

    /// Read every N-th luma sample.
    #[arg(long)]
    pub sample_step: Option<usize>,

    /// Mean luma below which the frame is reported as dark.
    #[arg(long)]
    pub min_mean_luma: Option<f64>,
}

fn parse_crop(value: &str) -> Result<CropRegion, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid crop '{value}': {err}"))?;
    match parts.as_slice() {
        &[left, top, width, height] => Ok(CropRegion::new(left, top, width, height)),
        _ => Err(format!(
            "invalid crop '{value}': expected LEFT,TOP,WIDTH,HEIGHT"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_parses_four_integers() {
        assert_eq!(
            parse_crop("10, -4,64,80"),
            Ok(CropRegion::new(10, -4, 64, 80))
        );
        assert!(parse_crop("1,2,3").is_err());
        assert!(parse_crop("a,b,c,d").is_err());
    }

    #[test]
    fn sample_command_parses() {
        let cli = Cli::try_parse_from([
            "frametensor",
            "sample",
            "--input",
            "frame.yuv",
            "--width",
            "640",
            "--height",
            "480",
            "--layout",
            "nv21",
            "--crop",
            "100,80,200,200",
            "--rotation",
            "270",
            "--on-invalid",
            "skip",
            "--telemetry",
        ])
        .expect("parse");
        assert!(cli.telemetry);
        let Command::Sample(args) = cli.command else {
            panic!("expected sample command");
        };
        assert_eq!(args.frame.layout, FrameLayout::Nv21);
        assert_eq!(args.rotation, 270);
        assert_eq!(args.crop, Some(CropRegion::new(100, 80, 200, 200)));
        assert_eq!(args.on_invalid, Some(InvalidInputPolicy::Skip));
    }

    #[test]
    fn compare_requires_candidate_or_gallery() {
        assert!(Cli::try_parse_from(["frametensor", "compare", "a.json"]).is_err());
        assert!(Cli::try_parse_from(["frametensor", "compare", "a.json", "b.json"]).is_ok());
        assert!(
            Cli::try_parse_from(["frametensor", "compare", "a.json", "--gallery", "g.json"]).is_ok()
        );
    }
}
