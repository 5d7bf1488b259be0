//! Nutation series in the layout of IERS Conventions (2010) Tables 5.3a/5.3b
//!
//! Every term carries fourteen argument multipliers (the Delaunay variables,
//! Mercury through Neptune, and the general precession) with a sine and a
//! cosine amplitude. Terms are grouped by the power of time they multiply.
//! The published tables hold 1358 longitude and 1056 obliquity terms, so
//! loading them gives the full IAU 2000A series; [`NutationSeries::builtin`]
//! wraps the dominant terms compiled into the crate.

use super::iau2000a_data::{
    LUNISOLAR_LONGITUDE, LUNISOLAR_OBLIQUITY, NALS_T, NAPL_T, PLANETARY_LONGITUDE,
    PLANETARY_OBLIQUITY,
};
use super::iers_arguments;
use crate::constants::{J2000, JULIAN_CENTURY};
use crate::errors::{Result, SkypathError};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Table files quote amplitudes in µas; the series works in 0.1 µas
const USEC_TO_TENTH_USEC: f64 = 10.0;

/// `j = 1  Number of terms = 38`
static BLOCK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"j\s*=\s*(\d+)(?:\s+Number\s+of\s+terms\s*=\s*(\d+))?")
        .expect("block header pattern is valid")
});

/// One periodic term, amplitudes in 0.1 µas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutationTerm {
    pub multipliers: [i8; 14],
    pub sin: f64,
    pub cos: f64,
}

impl NutationTerm {
    fn value(&self, args: &[f64; 14]) -> f64 {
        let arg: f64 = self
            .multipliers
            .iter()
            .zip(args.iter())
            .map(|(&m, &a)| m as f64 * a)
            .sum();
        let (sarg, carg) = arg.sin_cos();
        self.sin * sarg + self.cos * carg
    }
}

/// Nutation in longitude and obliquity as Poisson series
///
/// `longitude[j]` and `obliquity[j]` hold the terms multiplied by `t^j`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutationSeries {
    longitude: Vec<Vec<NutationTerm>>,
    obliquity: Vec<Vec<NutationTerm>>,
}

impl NutationSeries {
    /// The luni-solar and planetary terms compiled into the crate
    pub fn builtin() -> Self {
        let mut series = Self::default();

        for ((mult, lon), obl) in NALS_T
            .iter()
            .zip(LUNISOLAR_LONGITUDE.iter())
            .zip(LUNISOLAR_OBLIQUITY.iter())
        {
            let mut multipliers = [0i8; 14];
            multipliers[..5].copy_from_slice(mult);

            push(&mut series.longitude, 0, multipliers, lon[0], lon[2]);
            push(&mut series.longitude, 1, multipliers, lon[1], 0.0);
            push(&mut series.obliquity, 0, multipliers, obl[2], obl[0]);
            push(&mut series.obliquity, 1, multipliers, 0.0, obl[1]);
        }

        for ((mult, lon), obl) in NAPL_T
            .iter()
            .zip(PLANETARY_LONGITUDE.iter())
            .zip(PLANETARY_OBLIQUITY.iter())
        {
            push(&mut series.longitude, 0, *mult, lon[0], lon[1]);
            push(&mut series.obliquity, 0, *mult, obl[0], obl[1]);
        }

        series
    }

    /// Parse the text of IERS Conventions (2010) Tables 5.3a (longitude) and
    /// 5.3b (obliquity)
    ///
    /// Each data row is an index, the sine and cosine amplitudes in µas, then
    /// the fourteen argument multipliers. A `j = N` line starts the block of
    /// terms multiplied by `t^N`; when it also states `Number of terms = M`
    /// the block must hold exactly M rows. Lines that do not start with an
    /// integer index are treated as headers.
    pub fn from_iers_tables(longitude: &str, obliquity: &str) -> Result<Self> {
        let series = Self {
            longitude: parse_table(longitude, "longitude")?,
            obliquity: parse_table(obliquity, "obliquity")?,
        };
        debug!(
            "loaded nutation series with {} longitude and {} obliquity terms",
            series.longitude_terms(),
            series.obliquity_terms()
        );
        Ok(series)
    }

    pub fn longitude_terms(&self) -> usize {
        self.longitude.iter().map(Vec::len).sum()
    }

    pub fn obliquity_terms(&self) -> usize {
        self.obliquity.iter().map(Vec::len).sum()
    }

    /// Nutation angles (delta-psi, delta-epsilon) in units of 0.1 µas at a
    /// TT Julian date
    pub fn evaluate(&self, jd_tt: f64) -> (f64, f64) {
        let t = (jd_tt - J2000) / JULIAN_CENTURY;
        let args = iers_arguments(t);
        (
            poisson_sum(&self.longitude, &args, t),
            poisson_sum(&self.obliquity, &args, t),
        )
    }
}

fn push(
    blocks: &mut Vec<Vec<NutationTerm>>,
    power: usize,
    multipliers: [i8; 14],
    sin: f64,
    cos: f64,
) {
    if sin == 0.0 && cos == 0.0 {
        return;
    }
    if blocks.len() <= power {
        blocks.resize_with(power + 1, Vec::new);
    }
    blocks[power].push(NutationTerm {
        multipliers,
        sin,
        cos,
    });
}

fn poisson_sum(blocks: &[Vec<NutationTerm>], args: &[f64; 14], t: f64) -> f64 {
    // Horner over the powers of t, smallest terms of each block first
    blocks.iter().rev().fold(0.0, |acc, block| {
        acc * t + block.iter().rev().map(|term| term.value(args)).sum::<f64>()
    })
}

fn parse_table(text: &str, name: &str) -> Result<Vec<Vec<NutationTerm>>> {
    let mut blocks: Vec<Vec<NutationTerm>> = Vec::new();
    let mut declared: Vec<Option<usize>> = Vec::new();
    let mut power = 0usize;

    for (lineno, line) in text.lines().enumerate() {
        if let Some(caps) = BLOCK_HEADER.captures(line) {
            power = caps[1]
                .parse()
                .map_err(|_| table_error(name, lineno, "bad power of t"))?;
            if declared.len() <= power {
                declared.resize(power + 1, None);
            }
            declared[power] = caps.get(2).and_then(|m| m.as_str().parse().ok());
            if blocks.len() <= power {
                blocks.resize_with(power + 1, Vec::new);
            }
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() || fields[0].parse::<u32>().is_err() {
            continue;
        }
        if fields.len() != 17 {
            return Err(table_error(
                name,
                lineno,
                &format!("expected 17 columns, found {}", fields.len()),
            ));
        }

        let amplitude = |s: &str| {
            s.parse::<f64>()
                .map(|v| v * USEC_TO_TENTH_USEC)
                .map_err(|_| table_error(name, lineno, &format!("bad amplitude {:?}", s)))
        };
        let sin = amplitude(fields[1])?;
        let cos = amplitude(fields[2])?;

        let mut multipliers = [0i8; 14];
        for (m, field) in multipliers.iter_mut().zip(&fields[3..]) {
            *m = field
                .parse()
                .map_err(|_| table_error(name, lineno, &format!("bad multiplier {:?}", field)))?;
        }

        if blocks.len() <= power {
            blocks.resize_with(power + 1, Vec::new);
        }
        blocks[power].push(NutationTerm {
            multipliers,
            sin,
            cos,
        });
    }

    for (power, (block, expected)) in blocks.iter().zip(declared.iter()).enumerate() {
        if let Some(expected) = expected {
            if block.len() != *expected {
                return Err(SkypathError::NutationTable(format!(
                    "{} table block j = {} declares {} terms but holds {}",
                    name,
                    power,
                    expected,
                    block.len()
                )));
            }
        }
    }

    if blocks.iter().all(Vec::is_empty) {
        return Err(SkypathError::NutationTable(format!(
            "{} table holds no terms",
            name
        )));
    }
    Ok(blocks)
}

fn table_error(name: &str, lineno: usize, what: &str) -> SkypathError {
    SkypathError::NutationTable(format!("{} table line {}: {}", name, lineno + 1, what))
}
