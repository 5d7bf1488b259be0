//! Skypath: apparent positions of planets, stars and Earth satellites
//!
//! This crate follows the skyfield pipeline: a [`Time`] carries every time
//! scale and the Earth's orientation, an observer is placed with
//! [`Planet::at`] or [`Topos::at`], and observing a target gives an
//! astrometric position that can be corrected to an apparent one and read
//! out as right ascension and declination or altitude and azimuth.
//!
//! ```
//! use skypath::{Timescale, Topos};
//!
//! let ts = Timescale::default();
//! let t = ts.from_iso("2024-03-20T03:06:00Z")?;
//! assert!((0.0..24.0).contains(&t.gast()[0]));
//!
//! let greenwich = Topos::new(51.4769, -0.0005, 46.0)?;
//! let (position, _) = greenwich.gcrs(&t);
//! assert!(position[0].norm() < 5e-5);
//! # Ok::<(), skypath::SkypathError>(())
//! ```
//!
//! Ephemeris data comes from the caller through [`EphemerisSource`]; the
//! crate itself never reads files or touches the network.

pub mod celestial;
pub mod constants;
pub mod coordinates;
pub mod earthlib;
pub mod errors;
pub mod framelib;
pub mod nutationlib;
pub mod planetlib;
pub mod positions;
pub mod precessionlib;
pub mod relativity;
pub mod sgp4lib;
pub mod time;
pub mod toposlib;
pub mod units;

#[cfg(test)]
mod test_helpers;

// Re-export commonly used types
pub use celestial::{Observable, Star};
pub use coordinates::{AltAz, Angle, RaDec};
pub use errors::{Result, SkypathError};
pub use nutationlib::{NutationModel, NutationSeries};
pub use planetlib::{Body, Ephemeris, EphemerisSource, Planet, Segment};
pub use positions::{Apparent, ApparentOptions, Astrometric, Barycentric, SkyPosition};
pub use sgp4lib::{EarthSatellite, TemePropagator};
pub use time::{CalendarTuple, Time, TimeError, Timescale};
pub use toposlib::Topos;
pub use units::Distance;
