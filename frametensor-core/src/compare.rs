//! Cosine distance between face embeddings.
//!
//! Distances live in `[0, 2]`: 0 for vectors pointing the same way, 2 for
//! opposite vectors. Pairs that cannot be compared (different lengths, or a
//! vector with no direction) have two treatments:
//!
//! * [`cosine_distance`] returns [`DEGENERATE_DISTANCE`] (`1.0`), the value
//!   existing match thresholds were tuned against. It sits in the middle of
//!   the range so it never reads as a confident match or a confident reject.
//! * [`try_cosine_distance`] returns a [`CompareError`] naming the cause.

use frametensor_utils::config::{ComparisonMode, ComparisonSettings};
use rayon::prelude::*;

use crate::error::CompareError;

/// Magnitude product below which a pair is treated as degenerate.
pub const DEGENERATE_EPSILON: f64 = 1e-10;
/// Distance reported for pairs that cannot be compared in sentinel mode.
pub const DEGENERATE_DISTANCE: f32 = 1.0;
/// Magnitude below which [`l2_normalize`] zero-fills instead of dividing.
pub const NORMALIZE_EPSILON: f32 = 1e-10;

/// Cosine similarity in `[-1, 1]`.
///
/// Dot product and both squared norms are accumulated together in `f64`.
pub fn try_cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, CompareError> {
    Ok(similarity_f64(a, b)? as f32)
}

/// `1 - cosine_similarity`, in `[0, 2]`.
pub fn try_cosine_distance(a: &[f32], b: &[f32]) -> Result<f32, CompareError> {
    Ok((1.0 - similarity_f64(a, b)?) as f32)
}

/// Like [`try_cosine_distance`] but every failure maps to [`DEGENERATE_DISTANCE`].
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    try_cosine_distance(a, b).unwrap_or_else(CompareError::sentinel)
}

fn similarity_f64(a: &[f32], b: &[f32]) -> Result<f64, CompareError> {
    if a.len() != b.len() {
        return Err(CompareError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (x as f64, y as f64);
            (dot + x * y, na + x * x, nb + y * y)
        },
    );

    let denom = norm_a.sqrt() * norm_b.sqrt();
    // Negated so NaN magnitudes land here too.
    if !(denom >= DEGENERATE_EPSILON) {
        return Err(CompareError::DegenerateVector);
    }
    Ok((dot / denom).clamp(-1.0, 1.0))
}

/// Scale `embedding` to unit length in place.
///
/// Vectors with magnitude below [`NORMALIZE_EPSILON`] are zero-filled rather
/// than blown up; a later comparison then reports them as degenerate.
pub fn l2_normalize(embedding: &mut [f32]) {
    let magnitude = embedding
        .iter()
        .map(|&v| v as f64 * v as f64)
        .sum::<f64>()
        .sqrt() as f32;

    if magnitude < NORMALIZE_EPSILON || !magnitude.is_finite() {
        embedding.fill(0.0);
        return;
    }
    for value in embedding.iter_mut() {
        *value /= magnitude;
    }
}

/// Owned variant of [`l2_normalize`].
pub fn l2_normalized(embedding: &[f32]) -> Vec<f32> {
    let mut out = embedding.to_vec();
    l2_normalize(&mut out);
    out
}

/// Comparator bound to a [`ComparisonMode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VectorComparator {
    mode: ComparisonMode,
}

impl From<ComparisonSettings> for VectorComparator {
    fn from(settings: ComparisonSettings) -> Self {
        Self::new(settings.mode)
    }
}

impl VectorComparator {
    pub fn new(mode: ComparisonMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    /// Distance under the configured mode. Never fails in sentinel mode.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32, CompareError> {
        match self.mode {
            ComparisonMode::Strict => try_cosine_distance(a, b),
            ComparisonMode::Sentinel => Ok(cosine_distance(a, b)),
        }
    }

    /// Distance from `probe` to every gallery entry, computed in parallel.
    ///
    /// Results keep the gallery order.
    pub fn distances_to_gallery<G>(&self, probe: &[f32], gallery: &[G]) -> Vec<Result<f32, CompareError>>
    where
        G: AsRef<[f32]> + Sync,
    {
        gallery
            .par_iter()
            .map(|entry| self.distance(probe, entry.as_ref()))
            .collect()
    }
}

/// Strict distances from `probe` to every gallery entry, in gallery order.
pub fn distances_to_gallery<G>(probe: &[f32], gallery: &[G]) -> Vec<Result<f32, CompareError>>
where
    G: AsRef<[f32]> + Sync,
{
    VectorComparator::new(ComparisonMode::Strict).distances_to_gallery(probe, gallery)
}
