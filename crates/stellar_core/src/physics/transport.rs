//! Radial derivatives of M, P, L and T under radiative and convective transport.
//!
//! Convective formulas take the polytropic constant K and use P = K T^2.5 in
//! place of the pressure. Both pressure- and temperature-convective gradients
//! are defined as zero at the origin.

use super::{Cycle, Physics};

const MASS_COEFF: f64 = 0.01523;
const PRESSURE_COEFF: f64 = 8.084;
const LUMINOSITY_COEFF: f64 = 0.01845;
const RADIATIVE_TEMPERATURE_COEFF: f64 = 0.01679;
const CONVECTIVE_TEMPERATURE_COEFF: f64 = 3.234;

impl Physics {
    /// Prefactor ε1 X1 X2 10^ν μ² of both luminosity gradients, plus ν and the cycle.
    fn luminosity_prefactor(&self, pressure: f64, temperature: f64) -> (f64, f64, Option<Cycle>) {
        let generation = self.energy_generation(pressure, temperature);
        let prefactor = generation.epsilon1
            * generation.x1
            * generation.x2
            * 10f64.powf(generation.nu)
            * self.mu().powi(2);
        (prefactor, generation.nu, generation.cycle)
    }

    pub fn mass_gradient_radiative(&self, r: f64, pressure: f64, temperature: f64) -> f64 {
        MASS_COEFF * self.mu() * pressure * r * r / temperature
    }

    pub fn pressure_gradient_radiative(
        &self,
        r: f64,
        pressure: f64,
        temperature: f64,
        mass: f64,
    ) -> f64 {
        -PRESSURE_COEFF * self.mu() * pressure * mass / (temperature * r * r)
    }

    pub fn luminosity_gradient_radiative(
        &self,
        r: f64,
        pressure: f64,
        temperature: f64,
    ) -> (f64, Option<Cycle>) {
        let (prefactor, nu, cycle) = self.luminosity_prefactor(pressure, temperature);
        let gradient =
            LUMINOSITY_COEFF * prefactor * (pressure * r).powi(2) * temperature.powf(nu - 2.0);
        (gradient, cycle)
    }

    pub fn temperature_gradient_radiative(
        &self,
        r: f64,
        pressure: f64,
        temperature: f64,
        luminosity: f64,
    ) -> f64 {
        let ct = RADIATIVE_TEMPERATURE_COEFF
            * self.metals()
            * (1.0 + self.hydrogen())
            * self.mu().powi(2);
        -ct * luminosity * pressure * pressure / (temperature.powf(8.5) * r * r)
    }

    pub fn mass_gradient_convective(&self, r: f64, temperature: f64, k: f64) -> f64 {
        MASS_COEFF * self.mu() * k * temperature.powf(1.5) * r * r
    }

    pub fn pressure_gradient_convective(&self, r: f64, temperature: f64, mass: f64, k: f64) -> f64 {
        if r == 0.0 {
            return 0.0;
        }
        -PRESSURE_COEFF * self.mu() * k * temperature.powf(1.5) * mass / (r * r)
    }

    pub fn luminosity_gradient_convective(
        &self,
        r: f64,
        pressure: f64,
        temperature: f64,
        k: f64,
    ) -> (f64, Option<Cycle>) {
        let (prefactor, nu, cycle) = self.luminosity_prefactor(pressure, temperature);
        let gradient = LUMINOSITY_COEFF * prefactor * k * k * temperature.powf(3.0 + nu) * r * r;
        (gradient, cycle)
    }

    pub fn temperature_gradient_convective(&self, r: f64, mass: f64) -> f64 {
        if r == 0.0 {
            return 0.0;
        }
        -CONVECTIVE_TEMPERATURE_COEFF * self.mu() * mass / (r * r)
    }
}
