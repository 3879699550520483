use tracing::{debug, info};

use crate::alignment::alignment_centers;
use crate::capacity::{boost_error_correction, select_version};
use crate::ecc::{build_blocks, interleave};
use crate::encoding::{detect_mode, encode_data, Segment};
use crate::error::EncodeError;
use crate::mask::{apply_mask, penalty_score, select_mask};
use crate::matrix::{Grid, QrMatrix};
use crate::pixel_mapping::data_positions;
use crate::types::{ErrorCorrection, MaskPattern, QrConfig, Version};

/// Runs the whole pipeline: mode detection, version selection, bit
/// stream, Reed-Solomon blocks, module placement and masking.
///
/// Every error is raised before any ECC work starts; a matrix is only
/// returned when encoding fully succeeds.
pub fn generate_qr_matrix(text: &str, config: &QrConfig) -> Result<QrMatrix, EncodeError> {
    if text.is_empty() {
        return Err(EncodeError::InvalidInput("input text is empty".to_string()));
    }

    let mode = config.data_mode.unwrap_or_else(|| detect_mode(text));
    let segment = Segment::new(text, mode, config.charset)?;
    debug!(%mode, chars = segment.char_count, forced = config.data_mode.is_some(), "data analyzed");

    let version = select_version(&segment, config.error_correction, config.min_version)?;
    let error_correction = if config.boost_error_correction {
        boost_error_correction(&segment, version, config.error_correction)
    } else {
        config.error_correction
    };

    let data = encode_data(&segment, version, error_correction);
    let blocks = build_blocks(&data, version, error_correction);
    let codewords = interleave(&blocks);

    let mut grid = function_grid(version);
    place_codewords(&mut grid, &codewords);

    let (mask, penalty, grid) = match config.mask_pattern {
        Some(mask) => {
            apply_mask(&mut grid, mask);
            add_format_info(&mut grid, error_correction, mask);
            let penalty = penalty_score(&grid);
            (mask, penalty, grid)
        }
        None => select_mask(&grid, error_correction),
    };

    info!(
        %version,
        size = version.size(),
        ec = %error_correction,
        %mode,
        mask = mask.index(),
        penalty,
        "qr symbol generated"
    );
    Ok(QrMatrix::new(grid, version, error_correction, mode, mask, penalty))
}

/// A blank symbol of `version` with every function pattern drawn, the
/// version information written, and the format areas reserved.
pub(crate) fn function_grid(version: Version) -> Grid {
    let size = version.size();
    let mut grid = Grid::new(size);

    add_timing_patterns(&mut grid);
    add_position_pattern(&mut grid, 3, 3);
    add_position_pattern(&mut grid, 3, size - 4);
    add_position_pattern(&mut grid, size - 4, 3);
    for (row, col) in alignment_centers(version) {
        add_alignment_pattern(&mut grid, row, col);
    }

    // Placeholder bits until the mask is known
    let (first, second) = format_positions(size);
    for &(row, col) in first.iter().chain(second.iter()) {
        grid.set_reserved(row, col, false);
    }
    add_dark_module(&mut grid);

    if version >= Version::V7 {
        add_version_info(&mut grid, version);
    }
    grid
}

/// Finder pattern centred on (`row`, `col`), including its light separator.
fn add_position_pattern(grid: &mut Grid, row: usize, col: usize) {
    let size = grid.size() as isize;
    for dy in -4isize..=4 {
        for dx in -4isize..=4 {
            let r = row as isize + dy;
            let c = col as isize + dx;
            if r < 0 || c < 0 || r >= size || c >= size {
                continue;
            }
            let ring = dy.abs().max(dx.abs());
            grid.set_function(r as usize, c as usize, ring != 2 && ring != 4);
        }
    }
}

fn add_alignment_pattern(grid: &mut Grid, row: usize, col: usize) {
    for dy in -2isize..=2 {
        for dx in -2isize..=2 {
            let ring = dy.abs().max(dx.abs());
            let r = (row as isize + dy) as usize;
            let c = (col as isize + dx) as usize;
            grid.set_function(r, c, ring != 1);
        }
    }
}

fn add_timing_patterns(grid: &mut Grid) {
    for i in 0..grid.size() {
        grid.set_function(6, i, i % 2 == 0);
        grid.set_function(i, 6, i % 2 == 0);
    }
}

fn add_dark_module(grid: &mut Grid) {
    let size = grid.size();
    grid.set_function(size - 8, 8, true);
}

/// Module positions of the two format information copies. Entry `i`
/// holds bit `i` of the 15-bit word (bit 0 least significant).
pub(crate) fn format_positions(size: usize) -> ([(usize, usize); 15], [(usize, usize); 15]) {
    let mut first = [(0, 0); 15];
    let mut second = [(0, 0); 15];
    for i in 0..15 {
        first[i] = match i {
            0..=5 => (i, 8),
            6 => (7, 8),
            7 => (8, 8),
            8 => (8, 7),
            _ => (8, 14 - i),
        };
        second[i] = if i < 8 {
            (8, size - 1 - i)
        } else {
            (size - 15 + i, 8)
        };
    }
    (first, second)
}

/// 15-bit format word: EC level and mask, BCH(15,5) protected and XORed
/// with 0x5412.
pub fn get_format_info(error_correction: ErrorCorrection, mask_pattern: MaskPattern) -> u16 {
    let data = (error_correction.format_bits() << 3) | u16::from(mask_pattern.index());

    // x^10 + x^8 + x^5 + x^4 + x^2 + x + 1
    let mut remainder = data;
    for _ in 0..10 {
        remainder = (remainder << 1) ^ ((remainder >> 9) * 0x537);
    }
    ((data << 10) | remainder) ^ 0x5412
}

pub(crate) fn add_format_info(grid: &mut Grid, error_correction: ErrorCorrection, mask_pattern: MaskPattern) {
    let format_info = get_format_info(error_correction, mask_pattern);
    let (first, second) = format_positions(grid.size());
    for i in 0..15 {
        let bit = (format_info >> i) & 1 != 0;
        let (r, c) = first[i];
        grid.set_reserved(r, c, bit);
        let (r, c) = second[i];
        grid.set_reserved(r, c, bit);
    }
}

/// 18-bit version word: the version number, BCH(18,6) protected.
pub fn get_version_info(version: Version) -> Option<u32> {
    if version < Version::V7 {
        return None;
    }
    let v = version.number() as u32;

    // x^12 + x^11 + x^10 + x^9 + x^8 + x^5 + x^2 + 1
    let mut remainder = v;
    for _ in 0..12 {
        remainder = (remainder << 1) ^ ((remainder >> 11) * 0x1F25);
    }
    Some((v << 12) | remainder)
}

/// Positions of both version information copies. Entry `i` holds bit `i`.
pub(crate) fn version_positions(size: usize) -> ([(usize, usize); 18], [(usize, usize); 18]) {
    let mut bottom_left = [(0, 0); 18];
    let mut top_right = [(0, 0); 18];
    for i in 0..18 {
        let a = size - 11 + i % 3;
        let b = i / 3;
        bottom_left[i] = (a, b);
        top_right[i] = (b, a);
    }
    (bottom_left, top_right)
}

fn add_version_info(grid: &mut Grid, version: Version) {
    let Some(version_info) = get_version_info(version) else {
        return;
    };
    let (bottom_left, top_right) = version_positions(grid.size());
    for i in 0..18 {
        let bit = (version_info >> i) & 1 != 0;
        let (r, c) = bottom_left[i];
        grid.set_reserved(r, c, bit);
        let (r, c) = top_right[i];
        grid.set_reserved(r, c, bit);
    }
}

/// Writes codeword bits, most significant first, along the zig-zag path.
/// Remainder modules past the last codeword stay light.
fn place_codewords(grid: &mut Grid, codewords: &[u8]) {
    let bit_count = codewords.len() * 8;
    for (i, (row, col)) in data_positions(grid).into_iter().enumerate() {
        let dark = i < bit_count && (codewords[i / 8] >> (7 - i % 8)) & 1 != 0;
        grid.set(row, col, dark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::ModuleKind;
    use pretty_assertions::assert_eq;

    fn encode(text: &str, ec: ErrorCorrection) -> QrMatrix {
        generate_qr_matrix(text, &QrConfig::with_error_correction(ec)).unwrap()
    }

    #[test]
    fn test_format_info_known_value() {
        let bits = get_format_info(ErrorCorrection::L, MaskPattern::Pattern4);
        assert_eq!(format!("{bits:015b}"), "110011000101111");
        assert_eq!(get_format_info(ErrorCorrection::M, MaskPattern::Pattern0), 0x5412);
    }

    #[test]
    fn test_version_info_known_values() {
        assert_eq!(get_version_info(Version::V6), None);
        assert_eq!(get_version_info(Version::V7), Some(0x07C94));
        assert_eq!(get_version_info(Version::V20), Some(0x149A6));
        assert_eq!(get_version_info(Version::V40), Some(0x28C69));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let err = generate_qr_matrix("", &QrConfig::default()).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidInput(_)));
    }

    #[test]
    fn test_hello_world_is_version_1() {
        let matrix = encode("HELLO WORLD", ErrorCorrection::M);
        assert_eq!(matrix.version(), Version::V1);
        assert_eq!(matrix.dimension(), 21);
    }

    #[test]
    fn test_dark_module_is_set() {
        for version in [Version::V1, Version::V7, Version::V23] {
            let grid = function_grid(version);
            assert!(grid.get(version.size() - 8, 8));
            assert_eq!(grid.kind(version.size() - 8, 8), ModuleKind::Function);
        }
    }

    #[test]
    fn test_format_copies_agree() {
        let matrix = encode("https://www.example.com/", ErrorCorrection::Q);
        let (first, second) = format_positions(matrix.dimension());
        for i in 0..15 {
            let (r1, c1) = first[i];
            let (r2, c2) = second[i];
            assert_eq!(matrix.get(r1, c1), matrix.get(r2, c2), "bit {i}");
        }
    }

    #[test]
    fn test_version_info_written_from_version_7() {
        let text = "A".repeat(200);
        let matrix = encode(&text, ErrorCorrection::H);
        assert!(matrix.version() >= Version::V7);
        let expected = get_version_info(matrix.version()).unwrap();
        let (bottom_left, top_right) = version_positions(matrix.dimension());
        for i in 0..18 {
            let bit = (expected >> i) & 1 != 0;
            assert_eq!(matrix.get(bottom_left[i].0, bottom_left[i].1), bit);
            assert_eq!(matrix.get(top_right[i].0, top_right[i].1), bit);
        }
    }

    #[test]
    fn test_forced_mask_is_used() {
        let config = QrConfig {
            mask_pattern: Some(MaskPattern::Pattern5),
            ..QrConfig::default()
        };
        let matrix = generate_qr_matrix("HELLO WORLD", &config).unwrap();
        assert_eq!(matrix.mask(), MaskPattern::Pattern5);
    }

    #[test]
    fn test_boost_is_opt_in() {
        let plain = generate_qr_matrix("7", &QrConfig::with_error_correction(ErrorCorrection::L)).unwrap();
        assert_eq!(plain.error_correction(), ErrorCorrection::L);

        let config = QrConfig {
            error_correction: ErrorCorrection::L,
            boost_error_correction: true,
            ..QrConfig::default()
        };
        let boosted = generate_qr_matrix("7", &config).unwrap();
        assert_eq!(boosted.error_correction(), ErrorCorrection::H);
        assert_eq!(boosted.version(), Version::V1);
    }
}
