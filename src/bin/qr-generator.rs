use std::io::BufRead;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;

use qr_tools::capacity::get_unencoded_capacity;
use qr_tools::render::{self, parse_color, OutputFormat, RenderOptions};
use qr_tools::{
    encode_batch, encode_with, ByteCharset, DataMode, ErrorCorrection, MaskPattern, QrConfig, QrMatrix, Version,
    QUIET_ZONE,
};

#[derive(Parser)]
#[command(name = "qr-generator", version, about = "Generate QR codes from text input")]
struct Cli {
    /// Text to encode. Omit with --batch.
    #[arg(required_unless_present = "batch")]
    text: Option<String>,

    /// Error correction level (L, M, Q, H)
    #[arg(short, long, default_value = "M")]
    error_correction: ErrorCorrection,

    /// Force a mask pattern (0-7) instead of picking the lowest penalty
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=7))]
    mask: Option<u8>,

    /// Force a data mode (numeric, alphanumeric, byte)
    #[arg(short, long)]
    data_mode: Option<DataMode>,

    /// Smallest version to use (1-40)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=40))]
    min_version: u8,

    /// Raise the EC level while the data still fits the chosen version
    #[arg(long)]
    boost: bool,

    /// Encode byte mode as ISO-8859-1 instead of UTF-8
    #[arg(long)]
    latin1: bool,

    /// Output file [default: qr-code.<format>; text goes to stdout]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (png, svg, text)
    #[arg(short, long, default_value = "png")]
    format: OutputFormat,

    /// Pixels per module
    #[arg(long, default_value_t = 10)]
    scale: u32,

    /// Target image size in pixels; overrides --scale
    #[arg(long)]
    size: Option<u32>,

    /// Quiet zone width in modules
    #[arg(long, default_value_t = QUIET_ZONE)]
    quiet_zone: usize,

    /// Dark module colour (#rrggbb)
    #[arg(long, default_value = "#000000")]
    dark: String,

    /// Light module colour (#rrggbb)
    #[arg(long, default_value = "#ffffff")]
    light: String,

    /// Read one input per line from stdin; outputs are numbered
    #[arg(long)]
    batch: bool,

    /// Print a JSON summary of each symbol
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    input: &'a str,
    output: Option<String>,
    version: Version,
    dimension: usize,
    error_correction: ErrorCorrection,
    data_mode: DataMode,
    mask_pattern: MaskPattern,
    penalty: u32,
    /// Characters of `data_mode` this version and level can hold.
    capacity: usize,
    min_quiet_zone: usize,
}

impl Cli {
    fn config(&self) -> QrConfig {
        QrConfig {
            error_correction: self.error_correction,
            data_mode: self.data_mode,
            mask_pattern: self.mask.and_then(MaskPattern::from_index),
            min_version: Version::from_u8(self.min_version).unwrap_or(Version::MIN),
            boost_error_correction: self.boost,
            charset: if self.latin1 { ByteCharset::Latin1 } else { ByteCharset::Utf8 },
        }
    }

    fn render_options(&self) -> Result<RenderOptions, Box<dyn std::error::Error>> {
        Ok(RenderOptions {
            scale: self.scale,
            size: self.size,
            quiet_zone: self.quiet_zone,
            dark: parse_color(&self.dark)?,
            light: parse_color(&self.light)?,
            format: self.format,
        })
    }

    /// Where output `index` goes; `None` means stdout.
    fn output_path(&self, index: Option<usize>) -> Option<PathBuf> {
        let base = match &self.output {
            Some(path) => path.clone(),
            None if self.format == OutputFormat::Text && index.is_none() => return None,
            None => PathBuf::from(format!("qr-code.{}", self.format.extension())),
        };
        let Some(index) = index else {
            return Some(base);
        };
        let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("qr-code");
        let extension = base
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or(self.format.extension());
        Some(base.with_file_name(format!("{stem}-{index}.{extension}")))
    }
}

fn write_output(
    matrix: &QrMatrix,
    options: &RenderOptions,
    path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(path) => render::save(matrix, options, path)?,
        None => print!("{}", render::to_text(matrix, options.quiet_zone)),
    }
    Ok(())
}

fn summarize(
    input: &str,
    matrix: &QrMatrix,
    path: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let summary = Summary {
            input,
            output: path.map(|p| p.display().to_string()),
            version: matrix.version(),
            dimension: matrix.dimension(),
            error_correction: matrix.error_correction(),
            data_mode: matrix.data_mode(),
            mask_pattern: matrix.mask(),
            penalty: matrix.penalty(),
            capacity: get_unencoded_capacity(matrix.version(), matrix.error_correction(), matrix.data_mode()),
            min_quiet_zone: matrix.quiet_zone(),
        };
        println!("{}", serde_json::to_string(&summary)?);
    } else if let Some(path) = path {
        eprintln!(
            "QR code generated: {} (version {}-{}, mask {})",
            path.display(),
            matrix.version(),
            matrix.error_correction(),
            matrix.mask().index()
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    qr_tools::logging::init(cli.verbose);

    let config = cli.config();
    let options = cli.render_options()?;

    if !cli.batch {
        let text = cli.text.as_deref().unwrap_or_default();
        let matrix = encode_with(text, &config)?;
        let path = cli.output_path(None);
        write_output(&matrix, &options, path.as_deref())?;
        return summarize(text, &matrix, path.as_deref(), cli.json);
    }

    let inputs: Vec<String> = std::io::stdin()
        .lock()
        .lines()
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect();

    let mut failed = 0;
    for (index, (input, result)) in inputs.iter().zip(encode_batch(&inputs, &config)).enumerate() {
        match result {
            Ok(matrix) => {
                let path = cli.output_path(Some(index));
                write_output(&matrix, &options, path.as_deref())?;
                summarize(input, &matrix, path.as_deref(), cli.json)?;
            }
            Err(e) => {
                eprintln!("Error: input {index}: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} inputs failed", inputs.len()).into());
    }
    Ok(())
}
