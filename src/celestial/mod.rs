//! Targets that can be observed

pub mod star;

pub use star::Star;

use crate::errors::Result;
use crate::planetlib::Planet;
use crate::positions::{Astrometric, Barycentric, SkyPosition};
use crate::relativity::correct_for_light_travel_time;

/// A trait for objects that have a position in the sky
pub trait Observable {
    /// Light-time corrected position of this object as seen by `observer`
    fn observe_from(&self, observer: &Barycentric) -> Result<Astrometric>;
}

impl Observable for Planet {
    fn observe_from(&self, observer: &Barycentric) -> Result<Astrometric> {
        let tdb = observer.t().tdb().to_vec();
        let (position, velocity, light_time) = correct_for_light_travel_time(
            observer.position(),
            observer.velocity(),
            &tdb,
            |t| self.state_au(t),
        )?;
        Astrometric::new(position, velocity, light_time, observer.clone())
    }
}
