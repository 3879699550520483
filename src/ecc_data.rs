use crate::types::{ErrorCorrection, Version};

/// Total codewords (data + ECC) a symbol of `version` holds.
pub fn get_total_codewords(version: Version) -> usize {
    let v = version.number();
    match v {
        1..=9 => [26, 44, 70, 100, 134, 172, 196, 242, 292][v - 1],
        10..=19 => [346, 404, 466, 532, 581, 655, 733, 815, 901, 991][v - 10],
        20..=29 => [1085, 1156, 1258, 1364, 1474, 1588, 1706, 1828, 1921, 2051][v - 20],
        _ => [2185, 2323, 2465, 2611, 2761, 2876, 3034, 3196, 3362, 3532, 3706][v - 30],
    }
}

/// Leftover data-region modules after the last codeword.
pub fn get_remainder_bits(version: Version) -> usize {
    match version.number() {
        2..=6 => 7,
        14..=20 | 28..=34 => 3,
        21..=27 => 4,
        _ => 0,
    }
}

// Index 0 is unused so the tables can be indexed by version number.
static ECC_CODEWORDS_PER_BLOCK: [[u8; 41]; 4] = [
    [
        0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // L
    [
        0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // M
    [
        0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Q
    [
        0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // H
];

static NUM_ERROR_CORRECTION_BLOCKS: [[u8; 41]; 4] = [
    [
        0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13,
        14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // L
    [
        0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // M
    [
        0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Q
    [
        0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // H
];

pub fn get_ecc_codewords_per_block(version: Version, error_correction: ErrorCorrection) -> usize {
    ECC_CODEWORDS_PER_BLOCK[error_correction.ordinal()][version.number()] as usize
}

pub fn get_num_blocks(version: Version, error_correction: ErrorCorrection) -> usize {
    NUM_ERROR_CORRECTION_BLOCKS[error_correction.ordinal()][version.number()] as usize
}

pub fn get_ecc_codewords(version: Version, error_correction: ErrorCorrection) -> usize {
    get_ecc_codewords_per_block(version, error_correction) * get_num_blocks(version, error_correction)
}

pub fn get_data_codewords(version: Version, error_correction: ErrorCorrection) -> usize {
    get_total_codewords(version) - get_ecc_codewords(version, error_correction)
}

/// Shape of the codeword blocks for one (version, EC level).
///
/// Short blocks come first; long blocks carry one extra data codeword.
/// Every block has the same number of ECC codewords.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BlockLayout {
    pub short_blocks: usize,
    pub short_data_codewords: usize,
    pub long_blocks: usize,
    pub ecc_codewords_per_block: usize,
}

impl BlockLayout {
    pub fn new(version: Version, error_correction: ErrorCorrection) -> Self {
        let num_blocks = get_num_blocks(version, error_correction);
        let ecc_codewords_per_block = get_ecc_codewords_per_block(version, error_correction);
        let data = get_data_codewords(version, error_correction);
        let short_data_codewords = data / num_blocks;
        let long_blocks = data % num_blocks;
        Self {
            short_blocks: num_blocks - long_blocks,
            short_data_codewords,
            long_blocks,
            ecc_codewords_per_block,
        }
    }

    pub fn num_blocks(&self) -> usize {
        self.short_blocks + self.long_blocks
    }

    pub fn data_codewords_in_block(&self, block: usize) -> usize {
        if block < self.short_blocks {
            self.short_data_codewords
        } else {
            self.short_data_codewords + 1
        }
    }

    pub fn data_codewords(&self) -> usize {
        self.short_blocks * self.short_data_codewords
            + self.long_blocks * (self.short_data_codewords + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_totals_match_symbol_capacity() {
        for version in Version::all() {
            for ec in ErrorCorrection::ALL {
                let layout = BlockLayout::new(version, ec);
                let total = layout.data_codewords()
                    + layout.num_blocks() * layout.ecc_codewords_per_block;
                assert_eq!(total, get_total_codewords(version), "version {version} level {ec}");
            }
        }
    }

    #[test]
    fn test_known_block_layouts() {
        // 5-Q: 2 blocks of 15 and 2 blocks of 16 data codewords, 18 ECC each
        assert_eq!(
            BlockLayout::new(Version::V5, ErrorCorrection::Q),
            BlockLayout {
                short_blocks: 2,
                short_data_codewords: 15,
                long_blocks: 2,
                ecc_codewords_per_block: 18,
            }
        );
        // 1-M: a single block of 16 data codewords
        let layout = BlockLayout::new(Version::V1, ErrorCorrection::M);
        assert_eq!(layout.num_blocks(), 1);
        assert_eq!(layout.data_codewords(), 16);
        assert_eq!(layout.ecc_codewords_per_block, 10);
    }

    #[test]
    fn test_total_ecc_codewords() {
        assert_eq!(get_ecc_codewords(Version::V1, ErrorCorrection::L), 7);
        assert_eq!(get_ecc_codewords(Version::V14, ErrorCorrection::M), 216);
        assert_eq!(get_ecc_codewords(Version::V22, ErrorCorrection::H), 816);
        assert_eq!(get_ecc_codewords(Version::V40, ErrorCorrection::L), 750);
        assert_eq!(get_data_codewords(Version::V40, ErrorCorrection::L), 2956);
    }
}
