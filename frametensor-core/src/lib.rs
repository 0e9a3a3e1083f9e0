//! Frame-to-tensor primitives for on-device face recognition.
//!
//! This crate turns raw YUV 4:2:0 camera frames into the normalized RGB tensors
//! a face-embedding model consumes, converts whole frames to ARGB for previews,
//! and compares the embeddings that come back.

/// Cosine distance between embeddings.
pub mod compare;
/// Full-frame YUV to ARGB conversion.
pub mod converter;
/// Error types returned by the transforms and the comparator.
pub mod error;
/// Borrowed plane and frame views.
pub mod frame;
/// Crop rectangles and rotation handling.
pub mod geometry;
/// Frame brightness estimate.
pub mod luma;
/// BT.601 color math and normalization.
pub mod pixel;
/// Invalid-input policy shared by the frame transforms.
pub mod policy;
/// Crop + rotate + resize + normalize sampler.
pub mod sampler;
/// Owned output tensor.
pub mod tensor;

pub use compare::{
    DEGENERATE_DISTANCE, VectorComparator, cosine_distance, distances_to_gallery, l2_normalize,
    l2_normalized, try_cosine_distance, try_cosine_similarity,
};
pub use converter::{FrameColorConverter, yuv_to_argb};
pub use error::{CompareError, FrameError, PlaneKind};
pub use frame::{MAX_FRAME_DIMENSION, PlanarYuvFrame, PlaneView};
pub use geometry::{CropRegion, Point, Rotation};
pub use luma::{Exposure, ExposureCheck, ExposureReport, mean_luminance};
pub use pixel::normalize_pixels;
pub use policy::{Conversion, InvalidInputPolicy};
pub use sampler::{FrameSampler, SamplerConfig, sample_face};
pub use tensor::NormalizedTensor;

/// Returns the crate version for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
