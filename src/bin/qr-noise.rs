use std::path::PathBuf;

use clap::Parser;

use qr_tools::noise::{flip_data_modules, flip_data_percentage};
use qr_tools::render::{self, OutputFormat, RenderOptions};
use qr_tools::{analyzer, encode, ErrorCorrection};

/// Encode text, damage its data region, and check whether it still reads.
#[derive(Parser)]
#[command(name = "qr-noise", version)]
struct Cli {
    /// Text to encode
    text: String,

    /// Error correction level (L, M, Q, H)
    #[arg(short, long, default_value = "M")]
    error_correction: ErrorCorrection,

    /// Number of data modules to flip
    #[arg(short, long, conflicts_with = "percentage")]
    count: Option<usize>,

    /// Percentage of data modules to flip (0-100)
    #[arg(short, long)]
    percentage: Option<f64>,

    /// RNG seed; the same seed flips the same modules
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Output PNG file
    #[arg(short, long, default_value = "qr-noise.png")]
    output: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    qr_tools::logging::init(cli.verbose);

    let matrix = encode(&cli.text, cli.error_correction)?;
    let noisy = match (cli.count, cli.percentage) {
        (Some(count), _) => flip_data_modules(&matrix, count, cli.seed),
        (None, Some(percentage)) if (0.0..=100.0).contains(&percentage) => {
            flip_data_percentage(&matrix, percentage, cli.seed)
        }
        (None, Some(_)) => return Err("--percentage must be between 0 and 100".into()),
        (None, None) => return Err("one of --count or --percentage is required".into()),
    };

    let options = RenderOptions {
        format: OutputFormat::Png,
        ..RenderOptions::default()
    };
    render::save(&noisy, &options, &cli.output)?;
    println!("Noisy QR code written to {}", cli.output.display());

    match analyzer::analyze(&noisy) {
        Ok(analysis) if analysis.text == cli.text => println!(
            "Recovered {:?} after correcting {} codewords",
            analysis.text, analysis.errors_corrected
        ),
        Ok(analysis) => println!("Decoded to different text: {:?}", analysis.text),
        Err(e) => println!("Not recoverable: {e}"),
    }
    Ok(())
}
