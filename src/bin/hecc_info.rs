//! Heliocentric Position Information Tool
//!
//! Evaluates a planet's truncated series at one instant and prints the raw
//! l, b, r values, the spherical coordinate and the error estimates of every
//! truncation in use.
//!
//! Usage:
//!   cargo run --bin hecc_info -- [--jde 2448908.5] [--accuracy low]
//!   cargo run --bin hecc_info -- --quantity r --max-error 1e-7 --mode mean
//!   cargo run --bin hecc_info -- --tables mars.json --presets mars_presets.json

use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use helioseries::constants::RAD2DEG;
use helioseries::planets::{Accuracy, AccuracyPresets, PlanetHecc, PlanetTables};
use helioseries::series::{ErrorMode, Quantity};
use helioseries::time::{ObservationTime, Time};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Heliocentric Position Information Tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Evaluates truncated planetary series and reports their error bounds",
    long_about = None
)]
struct Args {
    /// Julian Ephemeris Day of the observation (defaults to J2000)
    #[arg(long)]
    jde: Option<f64>,

    /// Accuracy level: low, normal, high, fine or complete
    #[arg(short, long, default_value = "normal")]
    accuracy: Accuracy,

    /// Quantity to truncate with --max-error: l, b or r
    #[arg(short, long)]
    quantity: Option<Quantity>,

    /// Error budget for --quantity (radians or AU)
    #[arg(short = 'e', long, requires = "quantity")]
    max_error: Option<f64>,

    /// Error estimate mode: true, mean or safe
    #[arg(short, long, default_value = "true")]
    mode: ErrorMode,

    /// Coefficient tables as JSON (defaults to the bundled Earth tables)
    #[arg(long)]
    tables: Option<String>,

    /// Accuracy presets as JSON (defaults to the bundled presets)
    #[arg(long)]
    presets: Option<String>,
}

/// Prints a section header with a title and separator line
fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

/// Helper to print named values in a formatted way
fn print_named_value(name: &str, value: impl std::fmt::Display) {
    println!("{:<24}{}", format!("{}:", name), value);
}

fn display_truncations(hecc: &PlanetHecc, mode: ErrorMode) -> Result<()> {
    print_section_header(&format!("Truncation ({} accuracy)", hecc.accuracy()));
    for quantity in Quantity::ALL {
        let truncation = hecc.truncation(quantity);
        print_named_value(
            &format!("{} terms", quantity),
            format!("{} ({} total)", truncation, truncation.total_terms()),
        );
        print_named_value(
            &format!("{} error ({})", quantity, mode),
            format!("{:.3e}", hecc.max_error(quantity, mode)?),
        );
    }
    Ok(())
}

fn display_position(hecc: &mut PlanetHecc) -> Result<()> {
    print_section_header("Heliocentric Ecliptic Position");
    print_named_value("L (rad)", format!("{:.10}", hecc.l()?));
    print_named_value("B (rad)", format!("{:.10}", hecc.b()?));
    print_named_value("R (AU)", format!("{:.10}", hecc.r()?));

    let sc = hecc.sc()?;
    print_named_value("Longitude (deg)", format!("{:.8}", sc.longitude() * RAD2DEG));
    print_named_value("Latitude (deg)", format!("{:.8}", sc.latitude() * RAD2DEG));

    let xyz = sc.to_cartesian();
    print_named_value(
        "Rectangular (AU)",
        format!("[{:.10}, {:.10}, {:.10}]", xyz.x, xyz.y, xyz.z),
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let tables = match &args.tables {
        Some(path) => PlanetTables::from_json_file(path)?,
        None => PlanetTables::earth()?,
    };
    let presets = match &args.presets {
        Some(path) => AccuracyPresets::from_json(&std::fs::read_to_string(path)?)?,
        None => AccuracyPresets::builtin()?,
    };

    let time = match args.jde {
        Some(jde) => Time::from_jde(jde)?,
        None => Time::J2000,
    };
    let clock = Rc::new(ObservationTime::new(time));

    let mut hecc = PlanetHecc::new(tables, Arc::new(presets), clock, args.accuracy)?;

    if let (Some(quantity), Some(max_error)) = (args.quantity, args.max_error) {
        let start_time = Instant::now();
        hecc.set_max_error(quantity, max_error, args.mode)?;
        println!(
            "Derived {} truncation for error {:e} in {:.2?}",
            quantity,
            max_error,
            start_time.elapsed()
        );
    }

    println!("Planet: {}", hecc.planet());
    println!("Observation time: JDE {}", hecc.ob_time().jde());
    println!("-------------------------------------------------------");

    display_truncations(&hecc, args.mode)?;

    let start_time = Instant::now();
    display_position(&mut hecc)?;
    println!("\nEvaluated in {:.2?}", start_time.elapsed());

    Ok(())
}
