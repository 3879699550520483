use std::fmt;
use std::str::FromStr;

/// Symbol version. Version `n` is a square of `17 + 4n` modules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[repr(u8)]
pub enum Version {
    V1 = 1, V2, V3, V4, V5, V6, V7, V8, V9, V10,
    V11, V12, V13, V14, V15, V16, V17, V18, V19, V20,
    V21, V22, V23, V24, V25, V26, V27, V28, V29, V30,
    V31, V32, V33, V34, V35, V36, V37, V38, V39, V40,
}

static ALL_VERSIONS: [Version; 40] = [
    Version::V1, Version::V2, Version::V3, Version::V4, Version::V5,
    Version::V6, Version::V7, Version::V8, Version::V9, Version::V10,
    Version::V11, Version::V12, Version::V13, Version::V14, Version::V15,
    Version::V16, Version::V17, Version::V18, Version::V19, Version::V20,
    Version::V21, Version::V22, Version::V23, Version::V24, Version::V25,
    Version::V26, Version::V27, Version::V28, Version::V29, Version::V30,
    Version::V31, Version::V32, Version::V33, Version::V34, Version::V35,
    Version::V36, Version::V37, Version::V38, Version::V39, Version::V40,
];

impl Version {
    pub const MIN: Version = Version::V1;
    pub const MAX: Version = Version::V40;

    pub fn number(self) -> usize {
        self as usize
    }

    /// Side length in modules.
    pub fn size(self) -> usize {
        17 + 4 * self.number()
    }

    pub fn from_u8(n: u8) -> Option<Version> {
        match n {
            1..=40 => Some(ALL_VERSIONS[n as usize - 1]),
            _ => None,
        }
    }

    pub fn from_size(size: usize) -> Option<Version> {
        if size < 21 || (size - 17) % 4 != 0 {
            return None;
        }
        u8::try_from((size - 17) / 4).ok().and_then(Version::from_u8)
    }

    /// Versions from `self` up to 40, in ascending order.
    pub fn from_here_up(self) -> impl Iterator<Item = Version> {
        ALL_VERSIONS[self.number() - 1..].iter().copied()
    }

    pub fn all() -> impl Iterator<Item = Version> {
        ALL_VERSIONS.iter().copied()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum ErrorCorrection {
    L, // Low (~7%)
    M, // Medium (~15%)
    Q, // Quartile (~25%)
    H, // High (~30%)
}

impl ErrorCorrection {
    pub const ALL: [ErrorCorrection; 4] = [
        ErrorCorrection::L,
        ErrorCorrection::M,
        ErrorCorrection::Q,
        ErrorCorrection::H,
    ];

    /// Row index into the per-level tables.
    pub fn ordinal(self) -> usize {
        match self {
            ErrorCorrection::L => 0,
            ErrorCorrection::M => 1,
            ErrorCorrection::Q => 2,
            ErrorCorrection::H => 3,
        }
    }

    /// Two-bit indicator stored in the format information.
    pub fn format_bits(self) -> u16 {
        match self {
            ErrorCorrection::L => 0b01,
            ErrorCorrection::M => 0b00,
            ErrorCorrection::Q => 0b11,
            ErrorCorrection::H => 0b10,
        }
    }

    pub fn from_format_bits(bits: u16) -> ErrorCorrection {
        match bits & 0b11 {
            0b01 => ErrorCorrection::L,
            0b00 => ErrorCorrection::M,
            0b11 => ErrorCorrection::Q,
            _ => ErrorCorrection::H,
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCorrection::L => "L",
            ErrorCorrection::M => "M",
            ErrorCorrection::Q => "Q",
            ErrorCorrection::H => "H",
        };
        f.write_str(s)
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "L" | "LOW" => Ok(ErrorCorrection::L),
            "M" | "MEDIUM" => Ok(ErrorCorrection::M),
            "Q" | "QUARTILE" => Ok(ErrorCorrection::Q),
            "H" | "HIGH" => Ok(ErrorCorrection::H),
            other => Err(format!("invalid error correction level '{other}', use L, M, Q or H")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum DataMode {
    Numeric,
    Alphanumeric,
    Byte,
}

impl DataMode {
    /// Four-bit mode indicator.
    pub fn indicator(self) -> u32 {
        match self {
            DataMode::Numeric => 0b0001,
            DataMode::Alphanumeric => 0b0010,
            DataMode::Byte => 0b0100,
        }
    }

    pub fn from_indicator(bits: u32) -> Option<DataMode> {
        match bits {
            0b0001 => Some(DataMode::Numeric),
            0b0010 => Some(DataMode::Alphanumeric),
            0b0100 => Some(DataMode::Byte),
            _ => None,
        }
    }

    /// Width of the character count indicator for this mode at `version`.
    pub fn char_count_bits(self, version: Version) -> usize {
        let range = match version.number() {
            1..=9 => 0,
            10..=26 => 1,
            _ => 2,
        };
        match self {
            DataMode::Numeric => [10, 12, 14][range],
            DataMode::Alphanumeric => [9, 11, 13][range],
            DataMode::Byte => [8, 16, 16][range],
        }
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataMode::Numeric => "numeric",
            DataMode::Alphanumeric => "alphanumeric",
            DataMode::Byte => "byte",
        };
        f.write_str(s)
    }
}

impl FromStr for DataMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "numeric" => Ok(DataMode::Numeric),
            "alphanumeric" => Ok(DataMode::Alphanumeric),
            "byte" => Ok(DataMode::Byte),
            other => Err(format!("invalid data mode '{other}', use numeric, alphanumeric or byte")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub enum MaskPattern {
    #[default]
    Pattern0,
    Pattern1,
    Pattern2,
    Pattern3,
    Pattern4,
    Pattern5,
    Pattern6,
    Pattern7,
}

impl MaskPattern {
    pub const ALL: [MaskPattern; 8] = [
        MaskPattern::Pattern0,
        MaskPattern::Pattern1,
        MaskPattern::Pattern2,
        MaskPattern::Pattern3,
        MaskPattern::Pattern4,
        MaskPattern::Pattern5,
        MaskPattern::Pattern6,
        MaskPattern::Pattern7,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(n: u8) -> Option<MaskPattern> {
        MaskPattern::ALL.get(n as usize).copied()
    }
}

/// Character set used to turn text into byte-mode payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize)]
pub enum ByteCharset {
    #[default]
    Utf8,
    /// ISO-8859-1, the default interpretation of byte mode. Text outside
    /// U+0000..=U+00FF cannot be carried.
    Latin1,
}

/// Encoder options. `QrConfig::default()` matches `encode(text, M)`.
#[derive(Clone, Debug)]
pub struct QrConfig {
    pub error_correction: ErrorCorrection,
    /// Force a data mode instead of picking the narrowest one.
    pub data_mode: Option<DataMode>,
    /// Force a mask instead of picking the lowest penalty one.
    pub mask_pattern: Option<MaskPattern>,
    pub min_version: Version,
    /// Raise the EC level while the data still fits the chosen version.
    pub boost_error_correction: bool,
    pub charset: ByteCharset,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::M,
            data_mode: None,
            mask_pattern: None,
            min_version: Version::MIN,
            boost_error_correction: false,
            charset: ByteCharset::Utf8,
        }
    }
}

impl QrConfig {
    pub fn with_error_correction(error_correction: ErrorCorrection) -> Self {
        Self {
            error_correction,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_sizes() {
        assert_eq!(Version::V1.size(), 21);
        assert_eq!(Version::V7.size(), 45);
        assert_eq!(Version::V40.size(), 177);
    }

    #[test]
    fn test_version_from_size_round_trips() {
        for version in Version::all() {
            assert_eq!(Version::from_size(version.size()), Some(version));
        }
        assert_eq!(Version::from_size(22), None);
        assert_eq!(Version::from_size(181), None);
        assert_eq!(Version::from_size(17), None);
    }

    #[test]
    fn test_from_here_up_starts_at_self() {
        let versions: Vec<Version> = Version::V38.from_here_up().collect();
        assert_eq!(versions, vec![Version::V38, Version::V39, Version::V40]);
    }

    #[test]
    fn test_char_count_widths() {
        assert_eq!(DataMode::Numeric.char_count_bits(Version::V9), 10);
        assert_eq!(DataMode::Numeric.char_count_bits(Version::V10), 12);
        assert_eq!(DataMode::Alphanumeric.char_count_bits(Version::V26), 11);
        assert_eq!(DataMode::Alphanumeric.char_count_bits(Version::V27), 13);
        assert_eq!(DataMode::Byte.char_count_bits(Version::V1), 8);
        assert_eq!(DataMode::Byte.char_count_bits(Version::V40), 16);
    }

    #[test]
    fn test_error_correction_parsing() {
        assert_eq!("q".parse::<ErrorCorrection>(), Ok(ErrorCorrection::Q));
        assert_eq!("High".parse::<ErrorCorrection>(), Ok(ErrorCorrection::H));
        assert!("X".parse::<ErrorCorrection>().is_err());
    }

    #[test]
    fn test_format_bits_round_trip() {
        for ec in ErrorCorrection::ALL {
            assert_eq!(ErrorCorrection::from_format_bits(ec.format_bits()), ec);
        }
    }
}
