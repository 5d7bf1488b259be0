//! Distances with unit accessors

use crate::constants::{AU_KM, AU_M, C_AUDAY};
use std::fmt;

/// A distance, stored in astronomical units
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Distance {
    au: f64,
}

impl Distance {
    pub fn from_au(au: f64) -> Self {
        Self { au }
    }

    pub fn from_km(km: f64) -> Self {
        Self { au: km / AU_KM }
    }

    pub fn from_m(m: f64) -> Self {
        Self { au: m / AU_M }
    }

    pub fn au(&self) -> f64 {
        self.au
    }

    pub fn km(&self) -> f64 {
        self.au * AU_KM
    }

    pub fn m(&self) -> f64 {
        self.au * AU_M
    }

    /// Light-travel time across this distance, in seconds
    pub fn light_seconds(&self) -> f64 {
        self.au / C_AUDAY * 86_400.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6e} au", self.au)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_accessors() {
        let d = Distance::from_au(1.0);
        assert_eq!(d.km(), AU_KM);
        assert_eq!(d.m(), AU_M);
        assert_relative_eq!(Distance::from_km(AU_KM).au(), 1.0);
        assert_relative_eq!(Distance::from_m(6_378_136.6).km(), 6_378.1366, max_relative = 1e-15);
    }

    #[test]
    fn test_light_seconds() {
        // One AU is about 499 light seconds
        assert_relative_eq!(Distance::from_au(1.0).light_seconds(), 499.004_784, max_relative = 1e-8);
    }
}
