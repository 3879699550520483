use reed_solomon::Decoder;
use tracing::debug;

use crate::ecc_data::BlockLayout;
use crate::types::{ErrorCorrection, Version};

/// x^8 + x^4 + x^3 + x^2 + 1
const GF_PRIMITIVE: u16 = 0x11D;

const fn build_gf_tables() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= GF_PRIMITIVE;
        }
        i += 1;
    }
    exp[255] = exp[0];
    (exp, log)
}

static GF_TABLES: ([u8; 256], [u8; 256]) = build_gf_tables();

fn gf_exp(exp: usize) -> u8 {
    GF_TABLES.0[exp % 255]
}

fn gf_log(val: u8) -> usize {
    debug_assert!(val != 0, "log of 0 in GF(256)");
    GF_TABLES.1[val as usize] as usize
}

fn gf_multiply(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    gf_exp(gf_log(a) + gf_log(b))
}

/// Coefficients of `(x - α^0)(x - α^1)…(x - α^(degree-1))`, highest power
/// first. The leading coefficient is always 1.
fn get_generator_polynomial(degree: usize) -> Vec<u8> {
    let mut poly = vec![1];
    for i in 0..degree {
        let mut next = vec![0; poly.len() + 1];
        for (j, &coeff) in poly.iter().enumerate() {
            next[j] ^= coeff;
            next[j + 1] ^= gf_multiply(coeff, gf_exp(i));
        }
        poly = next;
    }
    poly
}

/// Generate ECC codewords for given data using Reed-Solomon algorithm
///
/// # Arguments
/// * `data` - The input data bytes
/// * `num_ecc_codewords` - Number of ECC codewords to generate
/// # Returns
/// A vector containing _only_ the ECC codewords
pub fn generate_ecc(data: &[u8], num_ecc_codewords: usize) -> Vec<u8> {
    let generator = get_generator_polynomial(num_ecc_codewords);

    let mut message = data.to_vec();
    message.resize(data.len() + num_ecc_codewords, 0);

    for i in 0..data.len() {
        let coeff = message[i];
        if coeff != 0 {
            for (j, &g) in generator.iter().enumerate() {
                message[i + j] ^= gf_multiply(g, coeff);
            }
        }
    }

    message.split_off(data.len())
}

/// One codeword block: its slice of the data codewords and the ECC
/// computed over it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub data: Vec<u8>,
    pub ecc: Vec<u8>,
}

/// Splits `data` into blocks per `(version, error_correction)` and
/// computes ECC for each one.
pub fn build_blocks(data: &[u8], version: Version, error_correction: ErrorCorrection) -> Vec<Block> {
    let layout = BlockLayout::new(version, error_correction);
    debug_assert_eq!(data.len(), layout.data_codewords());
    debug!(
        %version,
        ec = %error_correction,
        short_blocks = layout.short_blocks,
        long_blocks = layout.long_blocks,
        short_len = layout.short_data_codewords,
        ecc_per_block = layout.ecc_codewords_per_block,
        "codeword blocks"
    );

    let mut blocks = Vec::with_capacity(layout.num_blocks());
    let mut offset = 0;
    for b in 0..layout.num_blocks() {
        let len = layout.data_codewords_in_block(b);
        let block_data = data[offset..offset + len].to_vec();
        offset += len;
        let ecc = generate_ecc(&block_data, layout.ecc_codewords_per_block);
        blocks.push(Block { data: block_data, ecc });
    }
    blocks
}

/// Interleaves codewords column by column: codeword `i` of every block
/// before codeword `i + 1` of any block, data first, then ECC.
pub fn interleave(blocks: &[Block]) -> Vec<u8> {
    let max_data_len = blocks.iter().map(|b| b.data.len()).max().unwrap_or(0);
    let max_ecc_len = blocks.iter().map(|b| b.ecc.len()).max().unwrap_or(0);
    let total: usize = blocks.iter().map(|b| b.data.len() + b.ecc.len()).sum();

    let mut out = Vec::with_capacity(total);
    for i in 0..max_data_len {
        out.extend(blocks.iter().filter_map(|b| b.data.get(i)));
    }
    for i in 0..max_ecc_len {
        out.extend(blocks.iter().filter_map(|b| b.ecc.get(i)));
    }
    out
}

/// Reverses [`interleave`] for the given layout, returning each block as
/// `data ‖ ecc`.
pub fn deinterleave(codewords: &[u8], layout: &BlockLayout) -> Vec<Vec<u8>> {
    let num_blocks = layout.num_blocks();
    let mut blocks: Vec<Vec<u8>> = (0..num_blocks)
        .map(|b| Vec::with_capacity(layout.data_codewords_in_block(b) + layout.ecc_codewords_per_block))
        .collect();
    let mut iter = codewords.iter().copied();

    for i in 0..=layout.short_data_codewords {
        for (b, block) in blocks.iter_mut().enumerate() {
            if i < layout.data_codewords_in_block(b) {
                block.extend(iter.next());
            }
        }
    }
    for _ in 0..layout.ecc_codewords_per_block {
        for block in blocks.iter_mut() {
            block.extend(iter.next());
        }
    }
    blocks
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrectionResult {
    ErrorFree(Vec<u8>),
    Corrected { data: Vec<u8>, errors: usize },
    Uncorrectable,
}

/// Correct errors in the received codeword using Reed-Solomon algorithm
///
/// # Arguments
/// * `received` - The received codeword (data + ECC)
/// * `num_ecc_codewords` - Number of ECC codewords in the received data
///
/// # Returns
/// A `CorrectionResult` indicating whether the data was error-free, corrected, or uncorrectable. If the errors could be corrected, the corrected data (without ECC) is returned.
pub fn correct_errors(received: &[u8], num_ecc_codewords: usize) -> CorrectionResult {
    if received.len() <= num_ecc_codewords {
        return CorrectionResult::Uncorrectable;
    }
    let data_len = received.len() - num_ecc_codewords;

    let decoder = Decoder::new(num_ecc_codewords);
    if !decoder.is_corrupted(received) {
        return CorrectionResult::ErrorFree(received[..data_len].to_vec());
    }

    let mut buffer = received.to_vec();
    match decoder.correct(&mut buffer, None) {
        Ok(fixed) => {
            let corrected: Vec<u8> = fixed.data().iter().chain(fixed.ecc()).copied().collect();
            let errors = corrected
                .iter()
                .zip(received)
                .filter(|(a, b)| a != b)
                .count();
            // The decoder can land on a different codeword when the damage
            // exceeds half the ECC length; reject anything beyond the bound.
            if errors == 0 || errors > num_ecc_codewords / 2 {
                return CorrectionResult::Uncorrectable;
            }
            CorrectionResult::Corrected {
                data: corrected[..data_len].to_vec(),
                errors,
            }
        }
        Err(_) => CorrectionResult::Uncorrectable,
    }
}
