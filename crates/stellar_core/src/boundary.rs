//! Starting values near the surface and near the centre.
//!
//! The multi-step formulas of the stepper need three accepted layers of
//! history, so each integration begins with three layers computed in closed
//! form from the expressions below.

use crate::config::GlobalParameters;
use crate::error::{finite, StellarError};
use crate::physics::{Cycle, Physics};
use crate::stepper::{Derivatives, Layer, Zone};

/// Polytropic constant K = P / T^2.5.
pub fn polytropic_constant(pressure: f64, temperature: f64) -> f64 {
    pressure / temperature.powf(2.5)
}

/// Pressure on the polytrope, P = K T^2.5.
pub fn polytrope(k: f64, temperature: f64) -> f64 {
    k * temperature.powf(2.5)
}

#[derive(Debug, Clone, Copy)]
pub struct BoundaryEstimator<'a> {
    physics: &'a Physics,
    params: &'a GlobalParameters,
}

impl<'a> BoundaryEstimator<'a> {
    pub fn new(physics: &'a Physics, params: &'a GlobalParameters) -> Self {
        Self { physics, params }
    }

    /// Radiative envelope: T(r) = A1 (1/r - 1/Rtot).
    pub fn surface_temperature(&self, r: f64) -> f64 {
        let a1 = 1.9022 * self.physics.mu() * self.params.mass;
        a1 * (1.0 / r - 1.0 / self.params.radius)
    }

    /// Convective envelope relation P = A2 T^4.25.
    pub fn surface_pressure(&self, temperature: f64) -> f64 {
        let physics = self.physics;
        let a2 = 10.645
            * ((self.params.mass / self.params.luminosity)
                / (physics.mu() * physics.metals() * (1.0 + physics.hydrogen())))
            .sqrt();
        a2 * temperature.powf(4.25)
    }

    pub fn central_mass(&self, r: f64, temperature: f64, k: f64) -> f64 {
        0.005077 * self.physics.mu() * k * temperature.powf(1.5) * r.powi(3)
    }

    /// Luminosity enclosed at small r, with the energy regime of (P, T).
    pub fn central_luminosity(
        &self,
        r: f64,
        pressure: f64,
        temperature: f64,
        k: f64,
    ) -> (f64, Option<Cycle>) {
        let generation = self.physics.energy_generation(pressure, temperature);
        let tc = self.params.central_temperature;
        let luminosity = 0.006150
            * generation.epsilon1
            * generation.x1
            * generation.x2
            * 10f64.powf(generation.nu)
            * self.physics.mu().powi(2)
            * k
            * k
            * tc.powf(3.0 + generation.nu)
            * r.powi(3);
        (luminosity, generation.cycle)
    }

    /// Quadratic temperature drop away from the centre.
    pub fn central_temperature(&self, r: f64, k: f64) -> f64 {
        let tc = self.params.central_temperature;
        tc - 0.008207 * self.physics.mu().powi(2) * k * tc.powf(1.5) * r * r
    }

    pub fn central_pressure(&self, temperature: f64, k: f64) -> f64 {
        polytrope(k, temperature)
    }

    /// Start-up layer of the surface integration.
    ///
    /// Mass and luminosity are held at their totals, so their derivatives are zero.
    pub fn surface_layer(&self, index: usize, r: f64) -> Result<(Layer, Derivatives), StellarError> {
        let temperature = finite(self.surface_temperature(r), "surface temperature", r)?;
        let pressure = finite(self.surface_pressure(temperature), "surface pressure", r)?;
        let mass = self.params.mass;
        let luminosity = self.params.luminosity;

        let derivatives = Derivatives {
            pressure: finite(
                self.physics
                    .pressure_gradient_radiative(r, pressure, temperature, mass),
                "dP/dr",
                r,
            )?,
            temperature: finite(
                self.physics
                    .temperature_gradient_radiative(r, pressure, temperature, luminosity),
                "dT/dr",
                r,
            )?,
            luminosity: 0.0,
            mass: 0.0,
        };
        let layer = Layer {
            index,
            radius: r,
            pressure,
            temperature,
            luminosity,
            mass,
            zone: Zone::Radiative,
            cycle: self.physics.energy_generation(pressure, temperature).cycle,
            n_plus_one: None,
        };
        Ok((layer, derivatives))
    }

    /// Start-up layer of the centre integration on the polytrope of constant `k`.
    pub fn central_layer(
        &self,
        index: usize,
        r: f64,
        k: f64,
    ) -> Result<(Layer, Derivatives), StellarError> {
        let physics = self.physics;
        let temperature = finite(self.central_temperature(r, k), "central temperature", r)?;
        let pressure = finite(self.central_pressure(temperature, k), "central pressure", r)?;
        let mass = finite(self.central_mass(r, temperature, k), "central mass", r)?;
        let (luminosity, cycle) = self.central_luminosity(r, pressure, temperature, k);
        let luminosity = finite(luminosity, "central luminosity", r)?;

        let derivatives = Derivatives {
            pressure: physics.pressure_gradient_convective(r, temperature, mass, k),
            temperature: physics.temperature_gradient_convective(r, mass),
            luminosity: physics
                .luminosity_gradient_convective(r, pressure, temperature, k)
                .0,
            mass: physics.mass_gradient_convective(r, temperature, k),
        };
        let layer = Layer {
            index,
            radius: r,
            pressure,
            temperature,
            luminosity,
            mass,
            zone: Zone::Convective,
            cycle,
            n_plus_one: None,
        };
        Ok((layer, derivatives))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GlobalParameters {
        GlobalParameters::new(5.0, 11.5, 70.0, 2.0)
    }

    #[test]
    fn polytrope_round_trip() {
        for &k in &[0.5, 3.2, 8.0, 120.0] {
            for &t in &[0.3, 1.0, 1.95, 4.2] {
                let recovered = polytropic_constant(polytrope(k, t), t);
                assert!((recovered - k).abs() < 1e-12 * k, "k = {k}, t = {t}");
            }
        }
    }

    #[test]
    fn surface_temperature_vanishes_at_total_radius() {
        let physics = Physics::default();
        let params = params();
        let boundary = BoundaryEstimator::new(&physics, &params);
        assert_eq!(boundary.surface_temperature(params.radius), 0.0);
        assert!(boundary.surface_temperature(0.9 * params.radius) > 0.0);
    }

    #[test]
    fn surface_layer_holds_totals_fixed() {
        let physics = Physics::default();
        let params = params();
        let boundary = BoundaryEstimator::new(&physics, &params);
        let (layer, derivatives) = boundary.surface_layer(1, 10.3).expect("surface layer");

        assert_eq!(layer.index, 1);
        assert_eq!(layer.mass, params.mass);
        assert_eq!(layer.luminosity, params.luminosity);
        assert_eq!(derivatives.mass, 0.0);
        assert_eq!(derivatives.luminosity, 0.0);
        assert!(derivatives.pressure < 0.0);
        assert!(derivatives.temperature < 0.0);
        assert_eq!(layer.cycle, None);
    }

    #[test]
    fn central_layer_at_origin_is_the_centre() {
        let physics = Physics::default();
        let params = params();
        let boundary = BoundaryEstimator::new(&physics, &params);
        let k = 8.0;
        let (layer, derivatives) = boundary.central_layer(100, 0.0, k).expect("centre");

        assert_eq!(layer.temperature, params.central_temperature);
        assert_eq!(layer.pressure, polytrope(k, params.central_temperature));
        assert_eq!(layer.mass, 0.0);
        assert_eq!(layer.luminosity, 0.0);
        assert_eq!(derivatives.pressure, 0.0);
        assert_eq!(derivatives.temperature, 0.0);
        assert_eq!(layer.zone, Zone::Convective);
    }

    #[test]
    fn central_profiles_grow_outward() {
        let physics = Physics::default();
        let params = params();
        let boundary = BoundaryEstimator::new(&physics, &params);
        let k = 8.0;
        let (inner, _) = boundary.central_layer(99, 0.1, k).expect("inner");
        let (outer, _) = boundary.central_layer(98, 0.2, k).expect("outer");

        assert!(outer.temperature < inner.temperature);
        assert!(outer.pressure < inner.pressure);
        assert!(outer.mass > inner.mass);
        assert!(outer.luminosity > inner.luminosity);
    }
}
