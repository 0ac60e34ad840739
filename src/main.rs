//! Reads fractions from the command line and prints what the crate knows about each.

use clap::Parser;
use fractions::{Fraction, DEFAULT_MAX_DENOMINATOR};
use tracing::info;

#[derive(Parser)]
#[command(name = "fractions")]
#[command(about = "Inspect exact rational numbers")]
struct Cli {
    /// Values to inspect, such as `3/4`, `-12` or `1.5e-3`
    #[arg(required = true, allow_hyphen_values = true)]
    values: Vec<String>,

    /// Largest denominator of the printed best approximation
    #[arg(short, long, default_value_t = DEFAULT_MAX_DENOMINATOR)]
    max_denominator: u64,

    /// Decimal digits to round to
    #[arg(short, long, default_value_t = 6)]
    digits: i32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    info!(count = cli.values.len(), "inspecting values");

    for text in &cli.values {
        let value: Fraction = text.parse()?;
        let approximation = value.limit_denominator(cli.max_denominator)?;
        println!("{value}");
        match value.checked_to_f64() {
            Ok(float) => println!("  float:       {float:?}"),
            Err(e) => println!("  float:       {e}"),
        }
        println!("  floor/ceil:  {} / {}", value.floor(), value.ceil());
        println!("  rounded:     {}", value.round_to(cli.digits));
        println!(
            "  best (<= {}): {approximation}",
            cli.max_denominator
        );
    }
    Ok(())
}
