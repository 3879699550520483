//! Reads a symbol back into text and reports on its structure.
//!
//! The reader walks the same layout the generator writes: format
//! information, function patterns, the zig-zag data path and the block
//! interleaving. Damaged blocks are repaired with Reed-Solomon before the
//! segment is parsed, so the report doubles as a check of the ECC.

use std::path::Path;

use image::GrayImage;
use serde::Serialize;
use tracing::{debug, warn};

use crate::alignment::alignment_centers;
use crate::ecc::{correct_errors, deinterleave, CorrectionResult};
use crate::ecc_data::{get_total_codewords, BlockLayout};
use crate::encoding::alphanumeric_char;
use crate::error::AnalyzeError;
use crate::generator::{format_positions, function_grid, get_format_info, get_version_info, version_positions};
use crate::mask::mask_bit;
use crate::matrix::{Grid, QrMatrix};
use crate::pixel_mapping::data_positions;
use crate::types::{DataMode, ErrorCorrection, MaskPattern, Version};

/// Farthest a read format or version word may be from a valid one.
const MAX_INFO_DISTANCE: u32 = 3;

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub size: usize,
    pub version: Version,
    pub error_correction: ErrorCorrection,
    pub mask_pattern: MaskPattern,
    pub data_mode: DataMode,
    pub char_count: usize,
    pub text: String,
    pub errors_corrected: usize,
    pub format_info: FormatInfo,
    pub version_info: Option<VersionInfo>,
    pub block_structure: BlockLayout,
    pub finder_patterns: Vec<FinderPattern>,
    pub timing_patterns: TimingPatterns,
    pub dark_module: DarkModule,
    pub alignment_patterns: Vec<AlignmentPattern>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatInfo {
    pub raw_bits_copy1: String,
    pub raw_bits_copy2: String,
    pub copies_match: bool,
    /// Bit errors between the best copy and the code it was decoded to.
    pub distance: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub raw_bits_copy1: String,
    pub raw_bits_copy2: String,
    pub copies_match: bool,
    /// Version decoded from the version blocks, if any copy was readable.
    pub version: Option<Version>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinderPattern {
    pub position: String,
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimingPatterns {
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DarkModule {
    pub present: bool,
    pub position: (usize, usize),
}

#[derive(Debug, Clone, Serialize)]
pub struct AlignmentPattern {
    pub row: usize,
    pub col: usize,
    pub valid: bool,
}

pub fn analyze(matrix: &QrMatrix) -> Result<Analysis, AnalyzeError> {
    analyze_modules(&matrix.rows())
}

/// Analyzes a square grid of modules (`true` is dark) without quiet zone.
pub fn analyze_modules(rows: &[Vec<bool>]) -> Result<Analysis, AnalyzeError> {
    let size = rows.len();
    if rows.iter().any(|row| row.len() != size) {
        return Err(AnalyzeError::InvalidSize(size));
    }
    let version = Version::from_size(size).ok_or(AnalyzeError::InvalidSize(size))?;
    let grid = function_grid(version).with_modules(rows);

    let (format_info, error_correction, mask_pattern) = read_format_info(&grid)?;
    let version_info = (version >= Version::V7).then(|| read_version_info(&grid));
    if let Some(info) = version_info.as_ref().filter(|info| info.version != Some(version)) {
        warn!(from_size = %version, from_info = ?info.version, "version information disagrees with size");
    }
    debug!(%version, ec = %error_correction, mask = mask_pattern.index(), "format information read");

    let codewords = read_codewords(&grid, version, mask_pattern);
    let layout = BlockLayout::new(version, error_correction);
    let mut data = Vec::with_capacity(layout.data_codewords());
    let mut errors_corrected = 0;
    for (block, received) in deinterleave(&codewords, &layout).iter().enumerate() {
        match correct_errors(received, layout.ecc_codewords_per_block) {
            CorrectionResult::ErrorFree(block_data) => data.extend(block_data),
            CorrectionResult::Corrected { data: block_data, errors } => {
                debug!(block, errors, "block corrected");
                errors_corrected += errors;
                data.extend(block_data);
            }
            CorrectionResult::Uncorrectable => return Err(AnalyzeError::Uncorrectable { block }),
        }
    }

    let (data_mode, char_count, text) = parse_segment(&data, version)?;

    Ok(Analysis {
        size,
        version,
        error_correction,
        mask_pattern,
        data_mode,
        char_count,
        text,
        errors_corrected,
        format_info,
        version_info,
        block_structure: layout,
        finder_patterns: check_finder_patterns(&grid),
        timing_patterns: TimingPatterns { valid: check_timing_patterns(&grid) },
        dark_module: DarkModule {
            present: grid.get(size - 8, 8),
            position: (size - 8, 8),
        },
        alignment_patterns: alignment_centers(version)
            .into_iter()
            .map(|(row, col)| AlignmentPattern {
                row,
                col,
                valid: check_alignment_pattern(&grid, row, col),
            })
            .collect(),
    })
}

/// Loads a PNG written by the renderer and analyzes it.
pub fn analyze_image(path: &Path) -> Result<Analysis, AnalyzeError> {
    let img = image::open(path)
        .map_err(|e| AnalyzeError::Image(e.to_string()))?
        .to_luma8();
    analyze_modules(&from_image(&img)?)
}

/// Samples the module grid out of a rendered image. The quiet zone width
/// and module scale are found from the top-left finder pattern.
pub fn from_image(img: &GrayImage) -> Result<Vec<Vec<bool>>, AnalyzeError> {
    let (width, height) = img.dimensions();
    if width != height {
        return Err(AnalyzeError::NotSquare { width, height });
    }
    let dark = |x: u32, y: u32| img.get_pixel(x, y)[0] < 128;

    let offset = (0..width)
        .find(|&i| dark(i, i))
        .ok_or_else(|| AnalyzeError::Image("no dark modules found".to_string()))?;
    let run = (offset..width).take_while(|&x| dark(x, offset)).count() as u32;
    if run == 0 || run % 7 != 0 {
        return Err(AnalyzeError::Image(format!("finder pattern edge is {run} pixels wide")));
    }
    let scale = run / 7;
    let modules = width.saturating_sub(2 * offset) / scale;
    debug!(offset, scale, modules, "image sampled");

    let center = |i: usize| offset + i as u32 * scale + scale / 2;
    Ok((0..modules as usize)
        .map(|r| (0..modules as usize).map(|c| dark(center(c), center(r))).collect())
        .collect())
}

fn read_format_info(grid: &Grid) -> Result<(FormatInfo, ErrorCorrection, MaskPattern), AnalyzeError> {
    let (first, second) = format_positions(grid.size());
    let copy1 = read_word(grid, &first);
    let copy2 = read_word(grid, &second);

    let (ec, mask, distance) = [copy1, copy2]
        .into_iter()
        .filter_map(decode_format_info)
        .min_by_key(|&(_, _, distance)| distance)
        .ok_or(AnalyzeError::FormatInfo)?;

    let info = FormatInfo {
        raw_bits_copy1: format!("{copy1:015b}"),
        raw_bits_copy2: format!("{copy2:015b}"),
        copies_match: copy1 == copy2,
        distance,
    };
    Ok((info, ec, mask))
}

/// Nearest valid format word to `word`, if within correction range.
fn decode_format_info(word: u32) -> Option<(ErrorCorrection, MaskPattern, u32)> {
    ErrorCorrection::ALL
        .into_iter()
        .flat_map(|ec| MaskPattern::ALL.into_iter().map(move |mask| (ec, mask)))
        .map(|(ec, mask)| (ec, mask, (u32::from(get_format_info(ec, mask)) ^ word).count_ones()))
        .min_by_key(|&(_, _, distance)| distance)
        .filter(|&(_, _, distance)| distance <= MAX_INFO_DISTANCE)
}

fn read_version_info(grid: &Grid) -> VersionInfo {
    let (bottom_left, top_right) = version_positions(grid.size());
    let copy1 = read_word(grid, &bottom_left);
    let copy2 = read_word(grid, &top_right);

    let version = [copy1, copy2]
        .into_iter()
        .filter_map(decode_version_info)
        .min_by_key(|&(_, distance)| distance)
        .map(|(version, _)| version);

    VersionInfo {
        raw_bits_copy1: format!("{copy1:018b}"),
        raw_bits_copy2: format!("{copy2:018b}"),
        copies_match: copy1 == copy2,
        version,
    }
}

fn decode_version_info(word: u32) -> Option<(Version, u32)> {
    Version::V7
        .from_here_up()
        .filter_map(|v| get_version_info(v).map(|info| (v, (info ^ word).count_ones())))
        .min_by_key(|&(_, distance)| distance)
        .filter(|&(_, distance)| distance <= MAX_INFO_DISTANCE)
}

/// Bit `i` of the result is the module at `positions[i]`.
fn read_word(grid: &Grid, positions: &[(usize, usize)]) -> u32 {
    positions
        .iter()
        .enumerate()
        .filter(|&(_, &(r, c))| grid.get(r, c))
        .fold(0, |word, (i, _)| word | (1 << i))
}

/// Unmasks the data region and packs it into codewords, dropping the
/// remainder bits.
fn read_codewords(grid: &Grid, version: Version, mask_pattern: MaskPattern) -> Vec<u8> {
    let total = get_total_codewords(version);
    let mut codewords = vec![0u8; total];
    for (i, (row, col)) in data_positions(grid).into_iter().take(total * 8).enumerate() {
        if grid.get(row, col) ^ mask_bit(mask_pattern, row, col) {
            codewords[i / 8] |= 0x80 >> (i % 8);
        }
    }
    codewords
}

struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn read(&mut self, len: usize) -> Result<u32, AnalyzeError> {
        if self.pos + len > self.bytes.len() * 8 {
            return Err(AnalyzeError::Segment(format!("bit stream ends before bit {}", self.pos + len)));
        }
        let mut value = 0;
        for _ in 0..len {
            let bit = (self.bytes[self.pos / 8] >> (7 - self.pos % 8)) & 1;
            value = (value << 1) | u32::from(bit);
            self.pos += 1;
        }
        Ok(value)
    }
}

fn parse_segment(data: &[u8], version: Version) -> Result<(DataMode, usize, String), AnalyzeError> {
    let mut reader = BitReader::new(data);
    let indicator = reader.read(4)?;
    let mode = DataMode::from_indicator(indicator)
        .ok_or_else(|| AnalyzeError::Segment(format!("unsupported mode indicator {indicator:04b}")))?;
    let count = reader.read(mode.char_count_bits(version))? as usize;

    let text = match mode {
        DataMode::Numeric => {
            let mut text = String::with_capacity(count);
            let mut remaining = count;
            while remaining > 0 {
                let (digits, bits) = match remaining {
                    1 => (1, 4),
                    2 => (2, 7),
                    _ => (3, 10),
                };
                let value = reader.read(bits)?;
                if value >= 10u32.pow(digits as u32) {
                    return Err(AnalyzeError::Segment(format!("numeric group {value} out of range")));
                }
                text.push_str(&format!("{value:0digits$}"));
                remaining -= digits;
            }
            text
        }
        DataMode::Alphanumeric => {
            let mut text = String::with_capacity(count);
            let char_at = |value: u32| {
                alphanumeric_char(value as u16)
                    .ok_or_else(|| AnalyzeError::Segment(format!("alphanumeric value {value} out of range")))
            };
            for _ in 0..count / 2 {
                let pair = reader.read(11)?;
                text.push(char_at(pair / 45)?);
                text.push(char_at(pair % 45)?);
            }
            if count % 2 == 1 {
                text.push(char_at(reader.read(6)?)?);
            }
            text
        }
        DataMode::Byte => {
            let bytes = (0..count)
                .map(|_| reader.read(8).map(|b| b as u8))
                .collect::<Result<Vec<u8>, _>>()?;
            // Latin-1 payloads are not valid UTF-8; map bytes to code points
            match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
            }
        }
    };
    Ok((mode, count, text))
}

fn check_finder_patterns(grid: &Grid) -> Vec<FinderPattern> {
    let size = grid.size();
    [("top-left", 3, 3), ("top-right", 3, size - 4), ("bottom-left", size - 4, 3)]
        .into_iter()
        .map(|(position, row, col)| FinderPattern {
            position: position.to_string(),
            valid: check_square_pattern(grid, row, col, 3, |ring| ring != 2),
        })
        .collect()
}

fn check_alignment_pattern(grid: &Grid, row: usize, col: usize) -> bool {
    check_square_pattern(grid, row, col, 2, |ring| ring != 1)
}

/// Compares the square of `radius` around (`row`, `col`) against a
/// concentric pattern where `dark(ring)` gives each ring's colour.
fn check_square_pattern(grid: &Grid, row: usize, col: usize, radius: usize, dark: impl Fn(usize) -> bool) -> bool {
    (row - radius..=row + radius).all(|r| {
        (col - radius..=col + radius).all(|c| {
            let ring = r.abs_diff(row).max(c.abs_diff(col));
            grid.get(r, c) == dark(ring)
        })
    })
}

fn check_timing_patterns(grid: &Grid) -> bool {
    (8..grid.size() - 8).all(|i| grid.get(6, i) == (i % 2 == 0) && grid.get(i, 6) == (i % 2 == 0))
}
