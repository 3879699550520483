use thiserror::Error;

use crate::types::{DataMode, ErrorCorrection};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("data too long: {bits} bits of {mode} data exceed the {capacity}-bit capacity of version 40-{ec}")]
    DataTooLong {
        mode: DataMode,
        ec: ErrorCorrection,
        bits: usize,
        capacity: usize,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid colour '{0}', expected #rrggbb")]
    InvalidColor(String),

    #[error("image too large: {modules} modules at {scale} pixels each")]
    TooLarge { modules: usize, scale: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("symbol is {0}x{0} modules, not a valid QR size")]
    InvalidSize(usize),

    #[error("image is not square: {width}x{height}")]
    NotSquare { width: u32, height: u32 },

    #[error("unreadable format information")]
    FormatInfo,

    #[error("block {block} has too many errors to correct")]
    Uncorrectable { block: usize },

    #[error("malformed segment: {0}")]
    Segment(String),

    #[error("image error: {0}")]
    Image(String),
}
