use std::path::PathBuf;

use clap::Parser;

use qr_tools::analyzer::analyze_image;

/// Read a QR code PNG back and print a JSON report of its structure and
/// contents.
#[derive(Parser)]
#[command(name = "qr-analyzer", version)]
struct Cli {
    /// PNG file written by qr-generator
    image: PathBuf,

    /// Print compact JSON on one line
    #[arg(long)]
    compact: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    qr_tools::logging::init(cli.verbose);

    let analysis = analyze_image(&cli.image)?;
    let json = if cli.compact {
        serde_json::to_string(&analysis)?
    } else {
        serde_json::to_string_pretty(&analysis)?
    };
    println!("{json}");
    Ok(())
}
