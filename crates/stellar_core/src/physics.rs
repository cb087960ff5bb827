//! Physical closures of the structure equations.
//!
//! [`Physics`] bundles the composition, the gas constant and the nuclear
//! regime table so that models with different mixtures can be evaluated side
//! by side. Every method is a pure function of its arguments.

pub mod energy;
pub mod transport;

pub use energy::{select_regime, Cycle, EnergyGeneration, EnergyRegime, STANDARD_REGIMES};

use crate::config::Composition;
use crate::error::StellarError;

/// Ideal gas constant in erg K⁻¹ mol⁻¹.
pub const GAS_CONSTANT: f64 = 8.31447e7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Physics {
    composition: Composition,
    gas_constant: f64,
    regimes: &'static [EnergyRegime],
    mu: f64,
}

impl Default for Physics {
    fn default() -> Self {
        Self::from_parts(Composition::default(), GAS_CONSTANT, &STANDARD_REGIMES)
    }
}

impl Physics {
    pub fn new(composition: Composition) -> Result<Self, StellarError> {
        composition.validate()?;
        Ok(Self::from_parts(composition, GAS_CONSTANT, &STANDARD_REGIMES))
    }

    /// Replaces the nuclear regime table, e.g. for a synthetic test table.
    pub fn with_regimes(mut self, regimes: &'static [EnergyRegime]) -> Self {
        self.regimes = regimes;
        self
    }

    fn from_parts(
        composition: Composition,
        gas_constant: f64,
        regimes: &'static [EnergyRegime],
    ) -> Self {
        Self {
            composition,
            gas_constant,
            regimes,
            mu: composition.mean_molecular_weight(),
        }
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn regimes(&self) -> &'static [EnergyRegime] {
        self.regimes
    }

    /// Mean molecular weight μ.
    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn hydrogen(&self) -> f64 {
        self.composition.hydrogen
    }

    pub fn metals(&self) -> f64 {
        self.composition.metals()
    }

    /// Ideal-gas density in g cm⁻³ from model-unit pressure and temperature.
    pub fn density(&self, pressure: f64, temperature: f64) -> f64 {
        (self.mu / self.gas_constant) * ((pressure * 1e15) / (temperature * 1e7))
    }

    /// Nuclear energy generation at (P, T), picking the most productive active regime.
    pub fn energy_generation(&self, pressure: f64, temperature: f64) -> EnergyGeneration {
        select_regime(
            self.regimes,
            self.density(pressure, temperature),
            temperature,
            &self.composition,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_follows_ideal_gas_law() {
        let physics = Physics::default();
        let rho = physics.density(10.0, 2.0);
        let expected = physics.mu() / GAS_CONSTANT * 1e16 / 2e7;
        assert!((rho - expected).abs() < 1e-15 * expected.abs().max(1.0));

        // Doubling pressure doubles density; doubling temperature halves it.
        assert!((physics.density(20.0, 2.0) / rho - 2.0).abs() < 1e-12);
        assert!((physics.density(10.0, 4.0) / rho - 0.5).abs() < 1e-12);
    }

    static OVERLAPPING: [EnergyRegime; 2] = [
        EnergyRegime::new(Cycle::ProtonProton, 1.0, 3.0, -2.0, 1.0),
        EnergyRegime::new(Cycle::CarbonNitrogen, 1.0, 3.0, -1.0, 1.0),
    ];

    #[test]
    fn custom_regime_table_drives_energy_generation() {
        let physics = Physics::new(Composition::new(0.5, 0.2).unwrap())
            .unwrap()
            .with_regimes(&OVERLAPPING);
        assert_eq!(physics.regimes().len(), 2);

        let (pressure, temperature) = (1.0, 2.0);
        let rho = physics.density(pressure, temperature);
        let generation = physics.energy_generation(pressure, temperature);

        // pp: 1e-2 * 0.5 * 0.5 ; CN: 1e-1 * 0.5 * (0.3 / 3), both times rho * 20.
        assert_eq!(generation.cycle, Some(Cycle::CarbonNitrogen));
        let expected = 1e-1 * 0.5 * 0.1 * rho * 20.0;
        assert!((generation.rate - expected).abs() < 1e-12 * expected);

        // Outside the synthetic table nothing burns, even where the standard table would.
        assert!(!physics.energy_generation(pressure, 0.5).is_active());
        assert!(Physics::default().energy_generation(pressure, 0.5).is_active());
    }

    #[test]
    fn composition_is_threaded_through_mu() {
        let hydrogen_rich = Physics::new(Composition::new(0.9, 0.09).unwrap()).unwrap();
        let reference = Physics::default();
        assert!(hydrogen_rich.mu() < reference.mu());
        assert!(hydrogen_rich.density(1.0, 1.0) < reference.density(1.0, 1.0));
    }
}
