//! Time Scale Inspection Tool
//!
//! This binary takes a UTC timestamp and prints the instant in every time
//! scale the library supports, together with the Earth orientation
//! quantities derived from it.
//!
//! Usage:
//!   cargo run --bin time_info -- 2024-03-20T03:06:00Z --delta-t 69.2
//!   cargo run --bin time_info -- 2024-03-20T03:06:00Z \
//!       --longitude-table tab5.3a.txt --obliquity-table tab5.3b.txt

use clap::{ArgAction, Parser};
use skypath::earthlib::earth_rotation_angle;
use skypath::nutationlib::{NutationModel, NutationSeries};
use std::path::PathBuf;
use skypath::{Time, Timescale};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Time Scale Inspection Tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Prints an instant in every time scale along with Earth orientation angles",
    long_about = None
)]
struct Args {
    /// ISO 8601 UTC timestamp, e.g. 2024-03-20T03:06:00Z
    timestamp: String,

    /// TT minus UT1 in seconds
    #[arg(long, allow_hyphen_values = true)]
    delta_t: Option<f64>,

    /// Use the truncated IAU 2000B nutation series
    #[arg(long, action = ArgAction::SetTrue)]
    iau2000b: bool,

    /// IERS Conventions Table 5.3a (nutation in longitude) for the full series
    #[arg(long, requires = "obliquity_table", conflicts_with = "iau2000b")]
    longitude_table: Option<PathBuf>,

    /// IERS Conventions Table 5.3b (nutation in obliquity)
    #[arg(long, requires = "longitude_table")]
    obliquity_table: Option<PathBuf>,

    /// Digits after the decimal point for Julian dates
    #[arg(long, default_value_t = 10)]
    places: usize,
}

/// Prints a section header with a title and separator line
fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

/// Helper to print named values in a formatted way
fn print_named_value(name: &str, value: impl std::fmt::Display) {
    println!("{:<28}{}", format!("{}:", name), value);
}

fn display_scales(t: &Time, places: usize) {
    print_section_header("Time scales");
    print_named_value("UTC", &t.utc_iso(3)[0]);
    print_named_value("UTC (JPL)", &t.utc_jpl()[0]);
    print_named_value("TAI", format!("{:.*}", places, t.tai()[0]));
    print_named_value("TT", format!("{:.*}", places, t.tt()[0]));
    print_named_value("TDB", format!("{:.*}", places, t.tdb()[0]));
    print_named_value("UT1", format!("{:.*}", places, t.ut1()[0]));
    print_named_value("Julian year (TT)", format!("{:.6}", t.j()[0]));
    print_named_value("Delta T (s)", format!("{:.3}", t.delta_t()[0]));
    print_named_value("Leap seconds (s)", t.leap_seconds()[0]);
}

fn display_orientation(t: &Time) {
    print_section_header("Earth orientation");
    let era = earth_rotation_angle(t.whole()[0], t.ut1_fraction()[0]);
    print_named_value("Earth rotation angle (deg)", format!("{:.9}", era * 360.0));
    print_named_value("GMST (h)", format!("{:.12}", t.gmst()[0]));
    print_named_value("GAST (h)", format!("{:.12}", t.gast()[0]));

    let tilt = t.earth_tilt()[0];
    print_named_value("Mean obliquity (deg)", format!("{:.9}", tilt.mean_obliquity));
    print_named_value("True obliquity (deg)", format!("{:.9}", tilt.true_obliquity));
    print_named_value("Nutation in longitude (\")", format!("{:.6}", tilt.dpsi));
    print_named_value("Nutation in obliquity (\")", format!("{:.6}", tilt.deps));
    print_named_value(
        "Equation of equinoxes (s)",
        format!("{:.6}", tilt.equation_of_the_equinoxes),
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut ts = Timescale::default();
    if let Some(delta_t) = args.delta_t {
        ts = ts.with_delta_t(delta_t);
    }
    if args.iau2000b {
        ts = ts.with_nutation_model(NutationModel::Iau2000B);
    }
    if let (Some(lon), Some(obl)) = (&args.longitude_table, &args.obliquity_table) {
        let series = NutationSeries::from_iers_tables(
            &std::fs::read_to_string(lon)?,
            &std::fs::read_to_string(obl)?,
        )?;
        println!(
            "Nutation series: {} longitude and {} obliquity terms",
            series.longitude_terms(),
            series.obliquity_terms()
        );
        ts = ts.with_nutation_series(series);
    }

    let t = ts.from_iso(&args.timestamp)?;
    println!("Instant: {}", t);

    display_scales(&t, args.places);
    display_orientation(&t);

    Ok(())
}
