//! QR code (model 2, versions 1–40) symbol encoder.
//!
//! [`encode`] turns text into a [`QrMatrix`]: the narrowest data mode is
//! chosen, the smallest version that fits is selected, the bit stream is
//! split into Reed-Solomon protected blocks, modules are placed and the
//! lowest-penalty mask is applied. Rendering ([`render`]) and reading a
//! symbol back ([`analyzer`]) are layered on top of the finished matrix.

pub mod alignment;
pub mod analyzer;
pub mod capacity;
pub mod ecc;
pub mod ecc_data;
pub mod encoding;
pub mod error;
pub mod generator;
pub mod logging;
pub mod mask;
pub mod matrix;
pub mod noise;
pub mod pixel_mapping;
pub mod render;
pub mod types;

use rayon::prelude::*;

pub use error::{AnalyzeError, EncodeError, RenderError};
pub use matrix::{ModuleKind, QrMatrix, QUIET_ZONE};
pub use types::{ByteCharset, DataMode, ErrorCorrection, MaskPattern, QrConfig, Version};

/// Encodes `text` at `error_correction` with every other choice made
/// automatically.
pub fn encode(text: &str, error_correction: ErrorCorrection) -> Result<QrMatrix, EncodeError> {
    generator::generate_qr_matrix(text, &QrConfig::with_error_correction(error_correction))
}

pub fn encode_with(text: &str, config: &QrConfig) -> Result<QrMatrix, EncodeError> {
    generator::generate_qr_matrix(text, config)
}

/// Encodes every input independently on the rayon pool. Results are in
/// input order; one failure does not affect the others.
pub fn encode_batch<S>(texts: &[S], config: &QrConfig) -> Vec<Result<QrMatrix, EncodeError>>
where
    S: AsRef<str> + Sync,
{
    texts
        .par_iter()
        .map(|text| generator::generate_qr_matrix(text.as_ref(), config))
        .collect()
}
