//! Predictor-corrector layer stepping.
//!
//! One step advances an accepted layer `i` to `i + 1` over the radial
//! increment `h`:
//!
//! 1. **Predict** P and T from the derivative history (explicit multi-step).
//! 2. **Correct** M, P, L and T at the new radius with the closure of the
//!    current [`Zone`], each against its own derivative history.
//! 3. **Test** the predicted and corrected P and T for relative agreement.
//!
//! The stepper never re-iterates on its own: [`StepOutcome`] reports whether
//! the tests passed and the caller decides what to do. History is always
//! indexed in integration order, so the same formulas serve both integration
//! directions; the sign of `h` carries the direction.

use serde::{Deserialize, Serialize};

use crate::boundary::polytrope;
use crate::error::{checked_ratio, finite, StellarError};
use crate::physics::{Cycle, Physics};

/// Energy transport regime governing a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    Radiative,
    Convective,
}

impl Zone {
    /// Zone used for the step following a layer with the given n+1.
    ///
    /// The test runs on the layer just accepted, so a transition only affects
    /// the next step.
    pub fn after(self, n_plus_one: f64, threshold: f64) -> Zone {
        match self {
            Zone::Radiative if n_plus_one <= threshold => Zone::Convective,
            zone => zone,
        }
    }
}

/// One radial sample of the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Grid index counted from the starting radius of the surface integration.
    pub index: usize,
    pub radius: f64,
    pub pressure: f64,
    pub temperature: f64,
    pub luminosity: f64,
    pub mass: f64,
    /// Closure the layer was computed with.
    pub zone: Zone,
    pub cycle: Option<Cycle>,
    /// Radiative gradient exponent, recorded on stepped radiative layers.
    pub n_plus_one: Option<f64>,
}

impl Layer {
    /// Fails on a negative pressure, temperature, mass or luminosity.
    pub fn ensure_physical(&self) -> Result<(), StellarError> {
        let values = [
            ("pressure", self.pressure),
            ("temperature", self.temperature),
            ("mass", self.mass),
            ("luminosity", self.luminosity),
        ];
        match values.into_iter().find(|(_, value)| *value < 0.0) {
            Some((quantity, _)) => Err(StellarError::domain(quantity, self.radius)),
            None => Ok(()),
        }
    }
}

/// Radial derivatives (fP, fT, fL, fM) at an accepted layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Derivatives {
    pub pressure: f64,
    pub temperature: f64,
    pub luminosity: f64,
    pub mass: f64,
}

/// Derivatives of the last three accepted layers, newest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct History {
    pub current: Derivatives,
    pub previous: Derivatives,
    pub earlier: Derivatives,
}

impl History {
    pub fn new(current: Derivatives, previous: Derivatives, earlier: Derivatives) -> Self {
        Self {
            current,
            previous,
            earlier,
        }
    }

    /// Takes the three most recent records of a sequence kept in integration order.
    pub fn latest(records: &[Derivatives]) -> Option<Self> {
        match records {
            [.., earlier, previous, current] => Some(Self::new(*current, *previous, *earlier)),
            _ => None,
        }
    }
}

/// Predicted pressure and temperature at the new layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub pressure: f64,
    pub temperature: f64,
}

/// Result of one correction pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub layer: Layer,
    pub derivatives: Derivatives,
    pub estimate: Estimate,
    pub pressure_converged: bool,
    pub temperature_converged: bool,
}

impl StepOutcome {
    pub fn converged(&self) -> bool {
        self.pressure_converged && self.temperature_converged
    }

    /// Estimate for another pass, seeded with the values just calculated.
    pub fn refined_estimate(&self) -> Estimate {
        Estimate {
            pressure: self.layer.pressure,
            temperature: self.layer.temperature,
        }
    }
}

/// Inputs shared by every pass of one step.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub physics: &'a Physics,
    pub layer: &'a Layer,
    pub history: &'a History,
    pub h: f64,
    pub next_index: usize,
    pub tolerance: f64,
}

impl StepContext<'_> {
    fn radius(&self) -> f64 {
        self.layer.radius + self.h
    }
}

/// Closure-specific predictor and corrector.
pub trait Closure {
    fn zone(&self) -> Zone;

    fn predict(&self, ctx: &StepContext<'_>) -> Estimate;

    fn correct(&self, ctx: &StepContext<'_>, estimate: Estimate)
        -> Result<StepOutcome, StellarError>;
}

/// `|calculated - estimated| / |calculated| < tolerance`; false when `calculated` is zero.
pub fn relative_error_below(calculated: f64, estimated: f64, tolerance: f64) -> bool {
    if calculated == 0.0 {
        return false;
    }
    ((calculated - estimated) / calculated).abs() < tolerance
}

/// Radiative gradient exponent n+1 = T fP / (P fT).
///
/// A negative ratio means one of the gradients changed sign and is rejected.
pub fn n_plus_one(layer: &Layer, derivatives: &Derivatives) -> Result<f64, StellarError> {
    let ratio = checked_ratio(
        layer.temperature * derivatives.pressure,
        layer.pressure * derivatives.temperature,
        "n+1",
        layer.radius,
    )?;
    if ratio < 0.0 {
        return Err(StellarError::domain("n+1", layer.radius));
    }
    Ok(ratio)
}

/// y_{i+1} = y_i + h f_{i+1} - h (f_{i+1} - f_i) / 2
fn one_step_correction(value: f64, h: f64, derivative: f64, current: f64) -> f64 {
    let delta1 = h * (derivative - current);
    value + h * derivative - delta1 / 2.0
}

/// One-step correction plus the second backward difference term.
fn two_step_correction(value: f64, h: f64, derivative: f64, current: f64, previous: f64) -> f64 {
    let delta2 = h * (derivative - 2.0 * current + previous);
    one_step_correction(value, h, derivative, current) - delta2 / 12.0
}

/// y_{i+1} ≈ y_i + h f_i + Δ1/2 + 5 Δ2/12, with backward differences at i.
fn predict_second_order(value: f64, h: f64, current: f64, previous: f64, earlier: f64) -> f64 {
    let delta1 = h * (current - previous);
    let delta2 = h * (current - 2.0 * previous + earlier);
    value + h * current + delta1 / 2.0 + 5.0 * delta2 / 12.0
}

fn predict_first_order(value: f64, h: f64, current: f64, previous: f64) -> f64 {
    let delta1 = h * (current - previous);
    value + h * current + delta1 / 2.0
}

fn nonzero_radius(ctx: &StepContext<'_>) -> Result<f64, StellarError> {
    let r = ctx.radius();
    if r == 0.0 || !r.is_finite() {
        return Err(StellarError::domain("radius", r));
    }
    Ok(r)
}

/// Radiative transport: full predictor-corrector on P and T.
#[derive(Debug, Clone, Copy, Default)]
pub struct Radiative;

impl Closure for Radiative {
    fn zone(&self) -> Zone {
        Zone::Radiative
    }

    fn predict(&self, ctx: &StepContext<'_>) -> Estimate {
        let (layer, history, h) = (ctx.layer, ctx.history, ctx.h);
        Estimate {
            pressure: predict_second_order(
                layer.pressure,
                h,
                history.current.pressure,
                history.previous.pressure,
                history.earlier.pressure,
            ),
            temperature: predict_first_order(
                layer.temperature,
                h,
                history.current.temperature,
                history.previous.temperature,
            ),
        }
    }

    fn correct(
        &self,
        ctx: &StepContext<'_>,
        estimate: Estimate,
    ) -> Result<StepOutcome, StellarError> {
        let (physics, layer, history, h) = (ctx.physics, ctx.layer, ctx.history, ctx.h);
        let r = nonzero_radius(ctx)?;
        let current = &history.current;

        let f_mass = physics.mass_gradient_radiative(r, estimate.pressure, estimate.temperature);
        let mass = finite(
            one_step_correction(layer.mass, h, f_mass, current.mass),
            "mass",
            r,
        )?;

        let f_pressure =
            physics.pressure_gradient_radiative(r, estimate.pressure, estimate.temperature, mass);
        let pressure = finite(
            one_step_correction(layer.pressure, h, f_pressure, current.pressure),
            "pressure",
            r,
        )?;
        let pressure_converged = relative_error_below(pressure, estimate.pressure, ctx.tolerance);

        let (f_luminosity, cycle) =
            physics.luminosity_gradient_radiative(r, pressure, estimate.temperature);
        let luminosity = finite(
            two_step_correction(
                layer.luminosity,
                h,
                f_luminosity,
                current.luminosity,
                history.previous.luminosity,
            ),
            "luminosity",
            r,
        )?;

        let f_temperature =
            physics.temperature_gradient_radiative(r, pressure, estimate.temperature, luminosity);
        let temperature = finite(
            one_step_correction(layer.temperature, h, f_temperature, current.temperature),
            "temperature",
            r,
        )?;
        let temperature_converged =
            relative_error_below(temperature, estimate.temperature, ctx.tolerance);

        Ok(StepOutcome {
            layer: Layer {
                index: ctx.next_index,
                radius: r,
                pressure,
                temperature,
                luminosity,
                mass,
                zone: Zone::Radiative,
                cycle,
                n_plus_one: None,
            },
            derivatives: Derivatives {
                pressure: finite(f_pressure, "dP/dr", r)?,
                temperature: finite(f_temperature, "dT/dr", r)?,
                luminosity: finite(f_luminosity, "dL/dr", r)?,
                mass: finite(f_mass, "dM/dr", r)?,
            },
            estimate,
            pressure_converged,
            temperature_converged,
        })
    }
}

/// Convective transport on the polytrope P = K T^2.5.
///
/// Only T is predicted; P follows from the polytrope, and the corrector works
/// on M and T against the convective derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convective {
    pub k: f64,
}

impl Closure for Convective {
    fn zone(&self) -> Zone {
        Zone::Convective
    }

    fn predict(&self, ctx: &StepContext<'_>) -> Estimate {
        let temperature = predict_first_order(
            ctx.layer.temperature,
            ctx.h,
            ctx.history.current.temperature,
            ctx.history.previous.temperature,
        );
        Estimate {
            pressure: polytrope(self.k, temperature),
            temperature,
        }
    }

    fn correct(
        &self,
        ctx: &StepContext<'_>,
        estimate: Estimate,
    ) -> Result<StepOutcome, StellarError> {
        let (physics, layer, history, h) = (ctx.physics, ctx.layer, ctx.history, ctx.h);
        let r = ctx.radius();
        if !r.is_finite() {
            return Err(StellarError::domain("radius", r));
        }
        let current = &history.current;

        let f_mass = physics.mass_gradient_convective(r, estimate.temperature, self.k);
        let mass = finite(
            one_step_correction(layer.mass, h, f_mass, current.mass),
            "mass",
            r,
        )?;

        let f_temperature = physics.temperature_gradient_convective(r, mass);
        let temperature = finite(
            one_step_correction(layer.temperature, h, f_temperature, current.temperature),
            "temperature",
            r,
        )?;
        let temperature_converged =
            relative_error_below(temperature, estimate.temperature, ctx.tolerance);

        let pressure = finite(polytrope(self.k, temperature), "pressure", r)?;
        let pressure_converged = relative_error_below(pressure, estimate.pressure, ctx.tolerance);
        let f_pressure = physics.pressure_gradient_convective(r, temperature, mass, self.k);

        let (f_luminosity, cycle) =
            physics.luminosity_gradient_convective(r, pressure, temperature, self.k);
        let luminosity = finite(
            two_step_correction(
                layer.luminosity,
                h,
                f_luminosity,
                current.luminosity,
                history.previous.luminosity,
            ),
            "luminosity",
            r,
        )?;

        Ok(StepOutcome {
            layer: Layer {
                index: ctx.next_index,
                radius: r,
                pressure,
                temperature,
                luminosity,
                mass,
                zone: Zone::Convective,
                cycle,
                n_plus_one: None,
            },
            derivatives: Derivatives {
                pressure: finite(f_pressure, "dP/dr", r)?,
                temperature: f_temperature,
                luminosity: finite(f_luminosity, "dL/dr", r)?,
                mass: f_mass,
            },
            estimate,
            pressure_converged,
            temperature_converged,
        })
    }
}
