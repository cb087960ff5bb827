//! Model inputs and integration settings.
//!
//! All quantities use the model unit system: radius in 1e10 cm, pressure in
//! 1e15 dyn cm⁻², temperature in 1e7 K, mass in 1e33 g and luminosity in
//! 1e33 erg s⁻¹.

use serde::{Deserialize, Serialize};

use crate::error::StellarError;

/// Chemical composition as mass fractions of hydrogen and helium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub hydrogen: f64,
    pub helium: f64,
}

impl Default for Composition {
    fn default() -> Self {
        Self {
            hydrogen: 0.75,
            helium: 0.22,
        }
    }
}

impl Composition {
    pub fn new(hydrogen: f64, helium: f64) -> Result<Self, StellarError> {
        let composition = Self { hydrogen, helium };
        composition.validate()?;
        Ok(composition)
    }

    /// Heavy-element fraction Z = 1 - X - Y.
    pub fn metals(&self) -> f64 {
        1.0 - self.hydrogen - self.helium
    }

    /// Mean molecular weight of a fully ionised gas.
    pub fn mean_molecular_weight(&self) -> f64 {
        1.0 / (2.0 * self.hydrogen + 0.75 * self.helium + 0.5 * self.metals())
    }

    pub fn validate(&self) -> Result<(), StellarError> {
        let fractions = [self.hydrogen, self.helium, self.metals()];
        if fractions.iter().any(|f| !f.is_finite() || *f < 0.0 || *f > 1.0) {
            return Err(StellarError::InvalidParameters(format!(
                "composition fractions must lie in [0, 1] (X = {}, Y = {}, Z = {})",
                self.hydrogen,
                self.helium,
                self.metals()
            )));
        }
        Ok(())
    }
}

/// Global parameters of one model evaluation.
///
/// The mass is held fixed; radius, luminosity and central temperature are the
/// free parameters tuned by the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalParameters {
    pub mass: f64,
    pub radius: f64,
    pub luminosity: f64,
    pub central_temperature: f64,
}

impl GlobalParameters {
    pub fn new(mass: f64, radius: f64, luminosity: f64, central_temperature: f64) -> Self {
        Self {
            mass,
            radius,
            luminosity,
            central_temperature,
        }
    }

    pub fn validate(&self) -> Result<(), StellarError> {
        let named = [
            ("mass", self.mass),
            ("radius", self.radius),
            ("luminosity", self.luminosity),
            ("central temperature", self.central_temperature),
        ];
        for (name, value) in named {
            if !value.is_finite() || value <= 0.0 {
                return Err(StellarError::InvalidParameters(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Settings for the two-sided layer integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    /// Number of radial increments between the starting radius and the centre.
    pub layers: usize,
    /// Starting radius of the surface integration as a fraction of the total radius.
    pub start_fraction: f64,
    /// Relative tolerance of the predictor-corrector agreement tests.
    pub tolerance: f64,
    /// Correction passes attempted per layer before the layer is accepted anyway.
    pub max_corrector_passes: usize,
    /// A layer is convective when n+1 falls to or below this value.
    pub transition_threshold: f64,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            layers: 100,
            start_fraction: 0.9,
            tolerance: 1e-4,
            max_corrector_passes: 20,
            transition_threshold: 2.5,
        }
    }
}

impl IntegrationSettings {
    pub fn validate(&self) -> Result<(), StellarError> {
        if self.layers < 4 {
            return Err(StellarError::InvalidSettings(format!(
                "layers must be at least 4, got {}",
                self.layers
            )));
        }
        if !(self.start_fraction > 0.0 && self.start_fraction < 1.0) {
            return Err(StellarError::InvalidSettings(format!(
                "start_fraction must lie in (0, 1), got {}",
                self.start_fraction
            )));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(StellarError::InvalidSettings(
                "tolerance must be positive".to_string(),
            ));
        }
        if self.max_corrector_passes == 0 {
            return Err(StellarError::InvalidSettings(
                "max_corrector_passes must be greater than zero".to_string(),
            ));
        }
        if !(self.transition_threshold > 0.0 && self.transition_threshold.is_finite()) {
            return Err(StellarError::InvalidSettings(
                "transition_threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Absolute radial increment for a star of the given total radius.
    pub fn step(&self, radius: f64) -> f64 {
        self.start_fraction * radius / self.layers as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_composition_matches_reference_mixture() {
        let composition = Composition::default();
        assert!((composition.metals() - 0.03).abs() < 1e-12);
        assert!((composition.mean_molecular_weight() - 1.0 / 1.68).abs() < 1e-12);
    }

    #[test]
    fn composition_rejects_overfull_mixture() {
        let err = Composition::new(0.8, 0.3).expect_err("Z would be negative");
        assert!(format!("{err}").contains("composition"));
    }

    #[test]
    fn parameters_must_be_positive() {
        let params = GlobalParameters::new(5.0, -1.0, 70.0, 2.0);
        let err = params.validate().expect_err("negative radius");
        assert!(format!("{err}").contains("radius"));
        assert!(GlobalParameters::new(5.0, 11.5, 70.0, 2.0).validate().is_ok());
    }

    #[test]
    fn settings_validation_catches_each_field() {
        let base = IntegrationSettings::default();
        assert!(base.validate().is_ok());

        let cases = [
            IntegrationSettings { layers: 3, ..base },
            IntegrationSettings {
                start_fraction: 0.0,
                ..base
            },
            IntegrationSettings {
                start_fraction: 1.0,
                ..base
            },
            IntegrationSettings {
                tolerance: 0.0,
                ..base
            },
            IntegrationSettings {
                max_corrector_passes: 0,
                ..base
            },
        ];
        for settings in cases {
            assert!(settings.validate().is_err(), "{settings:?} should be rejected");
        }
    }

    #[test]
    fn step_divides_starting_radius_into_layers() {
        let settings = IntegrationSettings::default();
        assert!((settings.step(10.0) - 0.09).abs() < 1e-15);
    }
}
