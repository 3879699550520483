use tracing::debug;

use crate::ecc_data::get_data_codewords;
use crate::error::EncodeError;
use crate::types::{ByteCharset, DataMode, ErrorCorrection, Version};

const PAD_CODEWORDS: [u8; 2] = [0xEC, 0x11];

/// Append-only sequence of bits, most significant bit first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bits: Vec<bool>,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Appends the low `len` bits of `value`.
    pub fn append_bits(&mut self, value: u32, len: usize) {
        debug_assert!(len <= 31 && value >> len == 0, "value does not fit in {len} bits");
        for i in (0..len).rev() {
            self.bits.push((value >> i) & 1 != 0);
        }
    }

    pub fn extend(&mut self, other: &BitBuffer) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Packs into bytes. The last byte is zero-padded if the length is
    /// not a multiple of 8.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |byte, (i, &bit)| byte | ((bit as u8) << (7 - i)))
            })
            .collect()
    }
}

pub fn alphanumeric_value(c: char) -> Option<u16> {
    match c {
        '0'..='9' => Some((c as u16) - ('0' as u16)),
        'A'..='Z' => Some((c as u16) - ('A' as u16) + 10),
        ' ' => Some(36), '$' => Some(37), '%' => Some(38), '*' => Some(39), '+' => Some(40),
        '-' => Some(41), '.' => Some(42), '/' => Some(43), ':' => Some(44),
        _ => None,
    }
}

pub fn alphanumeric_char(value: u16) -> Option<char> {
    const TABLE: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";
    TABLE.get(value as usize).map(|&b| b as char)
}

pub fn is_numeric(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_digit())
}

pub fn is_alphanumeric(text: &str) -> bool {
    text.chars().all(|c| alphanumeric_value(c).is_some())
}

/// Picks the narrowest mode that represents `text` without loss.
/// Byte mode always works, so this never fails.
pub fn detect_mode(text: &str) -> DataMode {
    if is_numeric(text) {
        DataMode::Numeric
    } else if is_alphanumeric(text) {
        DataMode::Alphanumeric
    } else {
        DataMode::Byte
    }
}

/// A single-mode run of input: character count plus packed payload bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub mode: DataMode,
    /// Digits, characters or bytes, depending on `mode`.
    pub char_count: usize,
    pub data: BitBuffer,
}

impl Segment {
    pub fn new(text: &str, mode: DataMode, charset: ByteCharset) -> Result<Self, EncodeError> {
        match mode {
            DataMode::Numeric => make_numeric(text),
            DataMode::Alphanumeric => make_alphanumeric(text),
            DataMode::Byte => make_bytes(text, charset),
        }
    }

    /// Header plus payload length at `version`, or `None` when the
    /// character count overflows the count indicator.
    pub fn total_bits(&self, version: Version) -> Option<usize> {
        let count_bits = self.mode.char_count_bits(version);
        if self.char_count >= 1 << count_bits {
            return None;
        }
        Some(4 + count_bits + self.data.len())
    }
}

fn make_numeric(text: &str) -> Result<Segment, EncodeError> {
    if !is_numeric(text) {
        return Err(EncodeError::InvalidInput(
            "numeric mode only carries the digits 0-9".to_string(),
        ));
    }
    let digits = text.as_bytes();
    let mut data = BitBuffer::new();
    for group in digits.chunks(3) {
        let value = group
            .iter()
            .fold(0u32, |acc, &d| acc * 10 + u32::from(d - b'0'));
        data.append_bits(value, group.len() * 3 + 1);
    }
    Ok(Segment {
        mode: DataMode::Numeric,
        char_count: digits.len(),
        data,
    })
}

fn make_alphanumeric(text: &str) -> Result<Segment, EncodeError> {
    let values: Vec<u16> = text
        .chars()
        .map(|c| {
            alphanumeric_value(c).ok_or_else(|| {
                EncodeError::InvalidInput(format!(
                    "character {c:?} is outside the alphanumeric set"
                ))
            })
        })
        .collect::<Result<_, _>>()?;

    let mut data = BitBuffer::new();
    for pair in values.chunks(2) {
        match *pair {
            [a, b] => data.append_bits(u32::from(a * 45 + b), 11),
            [a] => data.append_bits(u32::from(a), 6),
            _ => unreachable!(),
        }
    }
    Ok(Segment {
        mode: DataMode::Alphanumeric,
        char_count: values.len(),
        data,
    })
}

fn make_bytes(text: &str, charset: ByteCharset) -> Result<Segment, EncodeError> {
    let bytes: Vec<u8> = match charset {
        ByteCharset::Utf8 => text.as_bytes().to_vec(),
        ByteCharset::Latin1 => text
            .chars()
            .map(|c| {
                u8::try_from(u32::from(c)).map_err(|_| {
                    EncodeError::InvalidInput(format!(
                        "character {c:?} cannot be carried in ISO-8859-1 byte mode"
                    ))
                })
            })
            .collect::<Result<_, _>>()?,
    };

    let mut data = BitBuffer::new();
    for &b in &bytes {
        data.append_bits(u32::from(b), 8);
    }
    Ok(Segment {
        mode: DataMode::Byte,
        char_count: bytes.len(),
        data,
    })
}

/// Builds the full data codeword sequence for `segment` at
/// (`version`, `error_correction`): header, payload, terminator and pad
/// codewords. The caller must already have checked that it fits.
pub fn encode_data(segment: &Segment, version: Version, error_correction: ErrorCorrection) -> Vec<u8> {
    let capacity_bits = get_data_codewords(version, error_correction) * 8;

    let mut bits = BitBuffer::new();
    bits.append_bits(segment.mode.indicator(), 4);
    bits.append_bits(segment.char_count as u32, segment.mode.char_count_bits(version));
    bits.extend(&segment.data);
    debug_assert!(bits.len() <= capacity_bits);

    // Terminator, then zero-fill to the next byte boundary
    let terminator = (capacity_bits - bits.len()).min(4);
    bits.append_bits(0, terminator);
    bits.append_bits(0, (8 - bits.len() % 8) % 8);

    let mut codewords = bits.to_bytes();
    let data_codewords = capacity_bits / 8;
    let pad_count = data_codewords - codewords.len();
    codewords.extend(PAD_CODEWORDS.iter().cycle().take(pad_count));

    debug!(
        mode = %segment.mode,
        chars = segment.char_count,
        payload_bits = segment.data.len(),
        pad_count,
        "bit stream encoded"
    );
    codewords
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_digit_strings_are_numeric() {
        for text in ["0", "42", "01234567", "9999999999999999"] {
            assert_eq!(detect_mode(text), DataMode::Numeric, "{text}");
        }
    }

    #[test]
    fn test_lowercase_forces_byte_mode() {
        for text in ["hello", "HELLo", "https://www.example.com/", "a1"] {
            assert_eq!(detect_mode(text), DataMode::Byte, "{text}");
        }
    }

    #[test]
    fn test_alphanumeric_detection() {
        assert_eq!(detect_mode("HELLO WORLD"), DataMode::Alphanumeric);
        assert_eq!(detect_mode("AC-42"), DataMode::Alphanumeric);
        assert_eq!(detect_mode("$%*+-./: "), DataMode::Alphanumeric);
        assert_eq!(detect_mode("HELLO!"), DataMode::Byte);
    }

    #[test]
    fn test_alphanumeric_table_is_consistent() {
        for value in 0..45 {
            let c = alphanumeric_char(value).unwrap();
            assert_eq!(alphanumeric_value(c), Some(value));
        }
        assert_eq!(alphanumeric_char(45), None);
    }

    #[test]
    fn test_numeric_packing() {
        // "01234567": 012 -> 10 bits, 345 -> 10 bits, 67 -> 7 bits
        let segment = Segment::new("01234567", DataMode::Numeric, ByteCharset::Utf8).unwrap();
        assert_eq!(segment.char_count, 8);
        assert_eq!(segment.data.len(), 27);
        let mut expected = BitBuffer::new();
        expected.append_bits(12, 10);
        expected.append_bits(345, 10);
        expected.append_bits(67, 7);
        assert_eq!(segment.data, expected);
    }

    #[test]
    fn test_numeric_single_digit_remainder() {
        let segment = Segment::new("1234", DataMode::Numeric, ByteCharset::Utf8).unwrap();
        assert_eq!(segment.data.len(), 14);
    }

    #[test]
    fn test_alphanumeric_packing() {
        // "AC-42": (10,12) -> 462, (41,4) -> 1849, (2) -> 2
        let segment = Segment::new("AC-42", DataMode::Alphanumeric, ByteCharset::Utf8).unwrap();
        let mut expected = BitBuffer::new();
        expected.append_bits(462, 11);
        expected.append_bits(1849, 11);
        expected.append_bits(2, 6);
        assert_eq!(segment.data, expected);
    }

    #[test]
    fn test_forced_mode_rejects_foreign_characters() {
        assert!(matches!(
            Segment::new("12a", DataMode::Numeric, ByteCharset::Utf8),
            Err(EncodeError::InvalidInput(_))
        ));
        assert!(matches!(
            Segment::new("hello", DataMode::Alphanumeric, ByteCharset::Utf8),
            Err(EncodeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_byte_charsets() {
        let utf8 = Segment::new("é", DataMode::Byte, ByteCharset::Utf8).unwrap();
        assert_eq!(utf8.char_count, 2);
        let latin1 = Segment::new("é", DataMode::Byte, ByteCharset::Latin1).unwrap();
        assert_eq!(latin1.char_count, 1);
        assert_eq!(latin1.data.to_bytes(), vec![0xE9]);
        assert!(matches!(
            Segment::new("€", DataMode::Byte, ByteCharset::Latin1),
            Err(EncodeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_hello_world_data_codewords() {
        let segment = Segment::new("HELLO WORLD", DataMode::Alphanumeric, ByteCharset::Utf8).unwrap();
        let codewords = encode_data(&segment, Version::V1, ErrorCorrection::M);
        assert_eq!(
            codewords,
            vec![32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17]
        );
    }

    #[test]
    fn test_numeric_data_codewords() {
        let segment = Segment::new("01234567", DataMode::Numeric, ByteCharset::Utf8).unwrap();
        let codewords = encode_data(&segment, Version::V1, ErrorCorrection::M);
        assert_eq!(
            codewords,
            vec![
                0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11,
                0xEC, 0x11
            ]
        );
    }

    #[test]
    fn test_short_terminator_when_nearly_full() {
        // 1-L holds 19 codewords = 152 bits; 17 bytes use 4 + 8 + 136 = 148
        let segment = Segment::new("ABCDEFGHIJKLMNOPQ", DataMode::Byte, ByteCharset::Utf8).unwrap();
        let codewords = encode_data(&segment, Version::V1, ErrorCorrection::L);
        assert_eq!(codewords.len(), 19);
        assert_eq!(codewords[18] & 0x0F, 0);
    }

    #[test]
    fn test_char_count_overflow_is_detected() {
        let text = "1".repeat(1024);
        let segment = Segment::new(&text, DataMode::Numeric, ByteCharset::Utf8).unwrap();
        assert_eq!(segment.total_bits(Version::V1), None);
        assert!(segment.total_bits(Version::V10).is_some());
    }
}
