//! Rasterizers for a finished [`QrMatrix`]. Nothing here feeds back into
//! encoding; each backend only reads modules.

use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::error::RenderError;
use crate::matrix::{QrMatrix, QUIET_ZONE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Text => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(format!("invalid format '{other}', use png, svg or text")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Pixels per module. Ignored when `size` is set.
    pub scale: u32,
    /// Target image side in pixels; the scale is derived from it.
    pub size: Option<u32>,
    pub quiet_zone: usize,
    pub dark: Rgb<u8>,
    pub light: Rgb<u8>,
    pub format: OutputFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 10,
            size: None,
            quiet_zone: QUIET_ZONE,
            dark: Rgb([0, 0, 0]),
            light: Rgb([255, 255, 255]),
            format: OutputFormat::Png,
        }
    }
}

impl RenderOptions {
    /// Pixels per module for a symbol of `dimension` modules.
    pub fn module_scale(&self, dimension: usize) -> u32 {
        match self.size {
            Some(size) => {
                let modules = dimension.saturating_add(self.quiet_zone.saturating_mul(2));
                let modules = u32::try_from(modules).unwrap_or(u32::MAX);
                (size / modules.max(1)).max(1)
            }
            None => self.scale.max(1),
        }
    }

    /// Side length in pixels, quiet zone included, and the module scale.
    pub fn image_size(&self, dimension: usize) -> Result<(u32, u32), RenderError> {
        let scale = self.module_scale(dimension);
        let modules = self
            .quiet_zone
            .checked_mul(2)
            .and_then(|border| border.checked_add(dimension));
        let total = modules
            .and_then(|modules| u32::try_from(modules).ok())
            .and_then(|modules| modules.checked_mul(scale));
        match total {
            Some(total) => Ok((total, scale)),
            None => Err(RenderError::TooLarge {
                modules: modules.unwrap_or(usize::MAX),
                scale,
            }),
        }
    }
}

/// Parses `#rrggbb` (the leading `#` is optional).
pub fn parse_color(hex: &str) -> Result<Rgb<u8>, RenderError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(RenderError::InvalidColor(hex.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| RenderError::InvalidColor(hex.to_string()))
    };
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

fn hex_color(color: Rgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

pub fn to_image(matrix: &QrMatrix, options: &RenderOptions) -> Result<RgbImage, RenderError> {
    let size = matrix.dimension();
    let (total_size, scale) = options.image_size(size)?;
    // Bounded by total_size
    let border = options.quiet_zone as u32 * scale;

    let mut img = ImageBuffer::from_pixel(total_size, total_size, options.light);
    for row in 0..size {
        for col in 0..size {
            if !matrix.get(row, col) {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = border + col as u32 * scale + dx;
                    let py = border + row as u32 * scale + dy;
                    img.put_pixel(px, py, options.dark);
                }
            }
        }
    }
    Ok(img)
}

pub fn to_svg(matrix: &QrMatrix, options: &RenderOptions) -> Result<String, RenderError> {
    let size = matrix.dimension();
    let (total_size, scale) = options.image_size(size)?;
    let border = options.quiet_zone as u32 * scale;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{total_size}" height="{total_size}" viewBox="0 0 {total_size} {total_size}">"#
    );
    let _ = write!(
        svg,
        r#"<rect width="{total_size}" height="{total_size}" fill="{}"/>"#,
        hex_color(options.light)
    );

    let dark = hex_color(options.dark);
    for row in 0..size {
        for col in 0..size {
            if matrix.get(row, col) {
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{scale}" height="{scale}" fill="{dark}"/>"#,
                    border + col as u32 * scale,
                    border + row as u32 * scale,
                );
            }
        }
    }
    svg.push_str("</svg>");
    Ok(svg)
}

/// Terminal rendering: each character cell stacks two module rows using
/// half-block glyphs. Dark modules are drawn and light ones left blank,
/// so it reads correctly on a light terminal background.
pub fn to_text(matrix: &QrMatrix, quiet_zone: usize) -> String {
    let size = matrix.dimension();
    let total = size + 2 * quiet_zone;
    let dark = |row: usize, col: usize| -> bool {
        let (Some(r), Some(c)) = (row.checked_sub(quiet_zone), col.checked_sub(quiet_zone)) else {
            return false;
        };
        r < size && c < size && matrix.get(r, c)
    };

    let mut out = String::with_capacity((total + 1) * total.div_ceil(2) * 3);
    for row in (0..total).step_by(2) {
        for col in 0..total {
            let glyph = match (dark(row, col), dark(row + 1, col)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

pub fn to_png(matrix: &QrMatrix, options: &RenderOptions, path: &Path) -> Result<(), RenderError> {
    to_image(matrix, options)?.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Writes `matrix` to `path` in `options.format`.
pub fn save(matrix: &QrMatrix, options: &RenderOptions, path: &Path) -> Result<(), RenderError> {
    match options.format {
        OutputFormat::Png => to_png(matrix, options, path)?,
        OutputFormat::Svg => std::fs::write(path, to_svg(matrix, options)?)?,
        OutputFormat::Text => std::fs::write(path, to_text(matrix, options.quiet_zone))?,
    }
    Ok(())
}
