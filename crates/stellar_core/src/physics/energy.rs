//! Nuclear energy generation: the regime table and the max-rate selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Composition;

/// Fusion pathway of an energy-generation regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cycle {
    ProtonProton,
    CarbonNitrogen,
}

impl Cycle {
    /// Mass fractions (X1, X2) of the two reacting species.
    pub fn mass_fractions(self, composition: &Composition) -> (f64, f64) {
        match self {
            Cycle::ProtonProton => (composition.hydrogen, composition.hydrogen),
            Cycle::CarbonNitrogen => (composition.hydrogen, composition.metals() / 3.0),
        }
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cycle::ProtonProton => write!(f, "pp"),
            Cycle::CarbonNitrogen => write!(f, "CN"),
        }
    }
}

/// One row of the regime table, valid for `t_min <= T < t_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyRegime {
    pub cycle: Cycle,
    pub t_min: f64,
    pub t_max: f64,
    pub log10_epsilon1: f64,
    pub nu: f64,
}

impl EnergyRegime {
    pub const fn new(cycle: Cycle, t_min: f64, t_max: f64, log10_epsilon1: f64, nu: f64) -> Self {
        Self {
            cycle,
            t_min,
            t_max,
            log10_epsilon1,
            nu,
        }
    }

    pub fn contains(&self, temperature: f64) -> bool {
        self.t_min <= temperature && temperature < self.t_max
    }
}

use Cycle::{CarbonNitrogen as CN, ProtonProton as PP};

/// Standard regime table; temperatures in 1e7 K.
pub const STANDARD_REGIMES: [EnergyRegime; 10] = [
    EnergyRegime::new(PP, 0.40, 0.60, -6.84, 6.0),
    EnergyRegime::new(PP, 0.60, 0.95, -6.04, 5.0),
    EnergyRegime::new(PP, 0.95, 1.20, -5.56, 4.5),
    EnergyRegime::new(PP, 1.20, 1.65, -5.02, 4.0),
    EnergyRegime::new(PP, 1.65, 2.40, -4.40, 3.5),
    EnergyRegime::new(CN, 1.20, 1.60, -22.2, 20.0),
    EnergyRegime::new(CN, 1.60, 2.25, -19.8, 18.0),
    EnergyRegime::new(CN, 2.25, 2.75, -17.1, 16.0),
    EnergyRegime::new(CN, 2.75, 3.60, -15.6, 15.0),
    EnergyRegime::new(CN, 3.60, 5.00, -12.5, 13.0),
];

/// Energy generation selected at one (P, T) point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyGeneration {
    /// ε = ε1 X1 X2 ρ (10 T)^ν in erg g⁻¹ s⁻¹.
    pub rate: f64,
    /// ε1 = 10^log10(ε1).
    pub epsilon1: f64,
    pub x1: f64,
    pub x2: f64,
    pub nu: f64,
    /// `None` when no regime covers the temperature.
    pub cycle: Option<Cycle>,
}

impl EnergyGeneration {
    pub fn inactive() -> Self {
        Self {
            rate: 0.0,
            epsilon1: 0.0,
            x1: 0.0,
            x2: 0.0,
            nu: 0.0,
            cycle: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.cycle.is_some()
    }
}

/// Picks the active regime with the largest rate.
///
/// Equal rates keep the regime encountered first in table order.
pub fn select_regime(
    regimes: &[EnergyRegime],
    density: f64,
    temperature: f64,
    composition: &Composition,
) -> EnergyGeneration {
    let mut best: Option<EnergyGeneration> = None;

    for regime in regimes.iter().filter(|r| r.contains(temperature)) {
        let (x1, x2) = regime.cycle.mass_fractions(composition);
        let epsilon1 = 10f64.powf(regime.log10_epsilon1);
        let rate = epsilon1 * x1 * x2 * density * (10.0 * temperature).powf(regime.nu);
        let candidate = EnergyGeneration {
            rate,
            epsilon1,
            x1,
            x2,
            nu: regime.nu,
            cycle: Some(regime.cycle),
        };
        match best {
            Some(current) if candidate.rate <= current.rate => {}
            _ => best = Some(candidate),
        }
    }

    best.unwrap_or_else(EnergyGeneration::inactive)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RHO: f64 = 10.0;

    fn select(temperature: f64) -> EnergyGeneration {
        select_regime(&STANDARD_REGIMES, RHO, temperature, &Composition::default())
    }

    #[test]
    fn single_range_selects_that_regime() {
        let generation = select(0.5);
        assert_eq!(generation.cycle, Some(Cycle::ProtonProton));
        assert_eq!(generation.nu, 6.0);
        assert!((generation.epsilon1 - 10f64.powf(-6.84)).abs() < 1e-20);

        let generation = select(4.0);
        assert_eq!(generation.cycle, Some(Cycle::CarbonNitrogen));
        assert_eq!(generation.nu, 13.0);
    }

    #[test]
    fn lower_bound_is_inclusive_upper_bound_exclusive() {
        assert_eq!(select(0.40).nu, 6.0);
        assert_eq!(select(0.60).nu, 5.0);
        assert!(!select(5.0).is_active());
    }

    #[test]
    fn no_matching_range_is_inactive() {
        let generation = select(0.2);
        assert_eq!(generation, EnergyGeneration::inactive());
        assert_eq!(generation.rate, 0.0);
    }

    #[test]
    fn overlap_picks_the_larger_rate() {
        // pp dominates at 1.5e7 K, CN at 2.0e7 K.
        let cool = select(1.5);
        assert_eq!(cool.cycle, Some(Cycle::ProtonProton));
        let hot = select(2.0);
        assert_eq!(hot.cycle, Some(Cycle::CarbonNitrogen));
        assert_eq!(hot.nu, 18.0);
        assert!((hot.x2 - 0.01).abs() < 1e-12);
    }

    #[test]
    fn synthetic_overlap_prefers_strictly_larger_rate() {
        let table = [
            EnergyRegime::new(Cycle::ProtonProton, 1.0, 3.0, -2.0, 1.0),
            EnergyRegime::new(Cycle::CarbonNitrogen, 1.0, 3.0, -1.0, 1.0),
        ];
        let composition = Composition::new(0.5, 0.2).unwrap();
        let generation = select_regime(&table, 2.0, 2.0, &composition);

        // pp: 1e-2 * 0.25 * 2 * 20 = 0.1 ; CN: 1e-1 * 0.5 * 0.1 * 2 * 20 = 0.2
        assert_eq!(generation.cycle, Some(Cycle::CarbonNitrogen));
        assert!((generation.rate - 0.2).abs() < 1e-12);
    }

    #[test]
    fn equal_rates_keep_first_regime() {
        let table = [
            EnergyRegime::new(Cycle::CarbonNitrogen, 1.0, 3.0, -1.0, 2.0),
            EnergyRegime::new(Cycle::ProtonProton, 1.0, 3.0, -1.0, 2.0),
        ];
        // Equal composition factors make both candidates identical.
        let composition = Composition {
            hydrogen: 0.25,
            helium: 0.0,
        };
        let generation = select_regime(&table, 1.0, 1.5, &composition);
        assert_eq!(generation.cycle, Some(Cycle::CarbonNitrogen));
    }

    #[test]
    fn cycle_labels() {
        assert_eq!(Cycle::ProtonProton.to_string(), "pp");
        assert_eq!(Cycle::CarbonNitrogen.to_string(), "CN");
    }
}
