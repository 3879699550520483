//! Controlled damage for exercising error correction.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::matrix::{ModuleKind, QrMatrix};
use crate::pixel_mapping::data_positions;

/// Returns a copy of `matrix` with `count` distinct data modules flipped.
/// Finder, timing, alignment, format and version modules are never
/// touched. The same `seed` always flips the same modules.
///
/// `count` is capped at the number of data modules.
pub fn flip_data_modules(matrix: &QrMatrix, count: usize, seed: u64) -> QrMatrix {
    let mut noisy = matrix.clone();
    let positions = data_positions(matrix.grid());
    let mut rng = StdRng::seed_from_u64(seed);

    let chosen: Vec<(usize, usize)> = positions.choose_multiple(&mut rng, count).copied().collect();
    for &(row, col) in &chosen {
        debug_assert_eq!(matrix.module_kind(row, col), ModuleKind::Data);
        noisy.grid_mut().flip(row, col);
    }
    debug!(requested = count, flipped = chosen.len(), seed, "data modules flipped");
    noisy
}

/// Flips roughly `percentage` percent of the data modules.
pub fn flip_data_percentage(matrix: &QrMatrix, percentage: f64, seed: u64) -> QrMatrix {
    let total = data_positions(matrix.grid()).len();
    let count = (total as f64 * percentage.clamp(0.0, 100.0) / 100.0).round() as usize;
    flip_data_modules(matrix, count, seed)
}
