use tracing::debug;

use crate::ecc_data::get_data_codewords;
use crate::encoding::Segment;
use crate::error::EncodeError;
use crate::types::{DataMode, ErrorCorrection, Version};

/// Data bits a symbol of (`version`, `error_correction`) can hold.
pub fn data_capacity_bits(version: Version, error_correction: ErrorCorrection) -> usize {
    get_data_codewords(version, error_correction) * 8
}

/// Largest number of characters (digits, alphanumeric characters or
/// bytes) of `mode` that fit in (`version`, `error_correction`).
pub fn get_unencoded_capacity(version: Version, error_correction: ErrorCorrection, data_mode: DataMode) -> usize {
    let available = data_capacity_bits(version, error_correction)
        .saturating_sub(4 + data_mode.char_count_bits(version));
    let chars = match data_mode {
        DataMode::Numeric => {
            let groups = available / 10;
            let extra = match available % 10 {
                7..=9 => 2,
                4..=6 => 1,
                _ => 0,
            };
            groups * 3 + extra
        }
        DataMode::Alphanumeric => available / 11 * 2 + usize::from(available % 11 >= 6),
        DataMode::Byte => available / 8,
    };
    chars.min((1 << data_mode.char_count_bits(version)) - 1)
}

/// Smallest version, not below `min_version`, whose capacity at
/// `error_correction` holds `segment`.
///
/// Fails with [`EncodeError::DataTooLong`] if version 40 cannot hold it.
/// The EC level is never lowered here; retrying at a lower level is the
/// caller's decision.
pub fn select_version(
    segment: &Segment,
    error_correction: ErrorCorrection,
    min_version: Version,
) -> Result<Version, EncodeError> {
    for version in min_version.from_here_up() {
        let capacity = data_capacity_bits(version, error_correction);
        if let Some(bits) = segment.total_bits(version) {
            if bits <= capacity {
                debug!(%version, bits, capacity, "version selected");
                return Ok(version);
            }
        }
    }

    let capacity = data_capacity_bits(Version::MAX, error_correction);
    // An overflowing count field is reported against the bit length the
    // payload would need with a wide enough field.
    let bits = segment
        .total_bits(Version::MAX)
        .unwrap_or(4 + segment.mode.char_count_bits(Version::MAX) + segment.data.len());
    Err(EncodeError::DataTooLong {
        mode: segment.mode,
        ec: error_correction,
        bits,
        capacity,
    })
}

/// Highest EC level at or above `error_correction` that still holds
/// `segment` in `version`.
pub fn boost_error_correction(
    segment: &Segment,
    version: Version,
    error_correction: ErrorCorrection,
) -> ErrorCorrection {
    let Some(bits) = segment.total_bits(version) else {
        return error_correction;
    };
    let boosted = ErrorCorrection::ALL
        .into_iter()
        .filter(|&ec| ec >= error_correction)
        .filter(|&ec| bits <= data_capacity_bits(version, ec))
        .max()
        .unwrap_or(error_correction);
    if boosted != error_correction {
        debug!(from = %error_correction, to = %boosted, %version, "error correction boosted");
    }
    boosted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ByteCharset;

    fn segment(text: &str) -> Segment {
        Segment::new(text, crate::encoding::detect_mode(text), ByteCharset::Utf8).unwrap()
    }

    #[test]
    fn test_character_capacities_match_published_table() {
        // (version, level, mode, capacity) from the ISO 18004 capacity table
        let cases = [
            (Version::V1, ErrorCorrection::L, DataMode::Numeric, 41),
            (Version::V1, ErrorCorrection::M, DataMode::Alphanumeric, 20),
            (Version::V1, ErrorCorrection::H, DataMode::Byte, 7),
            (Version::V5, ErrorCorrection::Q, DataMode::Byte, 60),
            (Version::V10, ErrorCorrection::M, DataMode::Numeric, 513),
            (Version::V10, ErrorCorrection::H, DataMode::Alphanumeric, 174),
            (Version::V40, ErrorCorrection::L, DataMode::Numeric, 7089),
            (Version::V40, ErrorCorrection::L, DataMode::Alphanumeric, 4296),
            (Version::V40, ErrorCorrection::L, DataMode::Byte, 2953),
            (Version::V40, ErrorCorrection::H, DataMode::Byte, 1273),
        ];
        for (version, ec, mode, expected) in cases {
            assert_eq!(
                get_unencoded_capacity(version, ec, mode),
                expected,
                "{version}-{ec} {mode}"
            );
        }
    }

    #[test]
    fn test_hello_world_fits_version_1() {
        let version = select_version(&segment("HELLO WORLD"), ErrorCorrection::M, Version::MIN).unwrap();
        assert_eq!(version, Version::V1);
    }

    #[test]
    fn test_version_grows_with_payload() {
        let text = "a".repeat(100);
        let version = select_version(&segment(&text), ErrorCorrection::M, Version::MIN).unwrap();
        // 1-M..5-M hold at most 84 bytes, 6-M holds 106
        assert_eq!(version, Version::V6);
    }

    #[test]
    fn test_min_version_is_honoured() {
        let version = select_version(&segment("1"), ErrorCorrection::L, Version::V12).unwrap();
        assert_eq!(version, Version::V12);
    }

    #[test]
    fn test_too_long_payload_reports_capacity() {
        let text = "a".repeat(2954);
        let err = select_version(&segment(&text), ErrorCorrection::L, Version::MIN).unwrap_err();
        assert_eq!(
            err,
            EncodeError::DataTooLong {
                mode: DataMode::Byte,
                ec: ErrorCorrection::L,
                bits: 4 + 16 + 2954 * 8,
                capacity: 2956 * 8,
            }
        );
    }

    #[test]
    fn test_boost_raises_level_when_room_remains() {
        // 1 digit needs 18 bits; 1-H holds 72
        let seg = segment("7");
        assert_eq!(boost_error_correction(&seg, Version::V1, ErrorCorrection::L), ErrorCorrection::H);
        // 17 bytes only fit 1-L
        let seg = segment("abcdefghijklmnopq");
        assert_eq!(boost_error_correction(&seg, Version::V1, ErrorCorrection::L), ErrorCorrection::L);
    }
}
