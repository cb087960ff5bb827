//! Steepest descent with a golden-section line search.
//!
//! Each outer iteration estimates the gradient by central differences,
//! normalizes it, and minimizes the objective along that direction over the
//! line-search bracket. The loop stops once successive iterates are closer
//! than the tolerance.

use anyhow::{bail, Context, Result};
use log::info;
use nalgebra::SVector;
use serde::{Deserialize, Serialize};

use super::golden_section::golden_section;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescentSettings {
    /// Stop once an outer step moves the iterate by at most this distance.
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Full width of the central-difference stencil.
    pub gradient_step: f64,
    /// Range of the step along the normalized gradient.
    pub line_search_bracket: [f64; 2],
    pub line_search_tolerance: f64,
}

impl Default for DescentSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            max_iterations: 500,
            gradient_step: 1e-5,
            line_search_bracket: [-1.0, 1.0],
            line_search_tolerance: 1e-6,
        }
    }
}

impl DescentSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance >= 0.0 && self.tolerance.is_finite()) {
            bail!("Descent tolerance must be finite and non-negative.");
        }
        if self.max_iterations == 0 {
            bail!("max_iterations must be at least 1.");
        }
        if !(self.gradient_step > 0.0 && self.gradient_step.is_finite()) {
            bail!("Gradient step must be positive.");
        }
        let [a, b] = self.line_search_bracket;
        if !(a.is_finite() && b.is_finite()) || a == b {
            bail!("Line search bracket must be a finite, non-empty interval.");
        }
        if !(self.line_search_tolerance > 0.0 && self.line_search_tolerance.is_finite()) {
            bail!("Line search tolerance must be positive.");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Converged,
    /// The iteration cap was reached before the step fell below tolerance.
    MaxIterations,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Minimum<const N: usize> {
    pub point: SVector<f64, N>,
    pub value: f64,
    pub iterations: usize,
    pub status: Status,
    /// Objective at the start and after every accepted step.
    pub trace: Vec<f64>,
}

/// Central-difference gradient, `(f(x + h/2 eᵢ) - f(x - h/2 eᵢ)) / h` per coordinate.
pub fn central_gradient<F, const N: usize>(
    objective: &mut F,
    point: &SVector<f64, N>,
    step: f64,
) -> Result<SVector<f64, N>>
where
    F: FnMut(&SVector<f64, N>) -> Result<f64>,
{
    let mut gradient = SVector::<f64, N>::zeros();
    for i in 0..N {
        let mut forward = *point;
        let mut backward = *point;
        forward[i] += 0.5 * step;
        backward[i] -= 0.5 * step;
        let component = (objective(&forward)? - objective(&backward)?) / step;
        if !component.is_finite() {
            bail!("Gradient component {i} is not finite at {:?}", point.as_slice());
        }
        gradient[i] = component;
    }
    Ok(gradient)
}

/// Minimizes `objective` from `initial`.
///
/// A line-search result that would raise the objective is not taken; the
/// descent then reports convergence at the current point, so the trace never
/// increases.
pub fn gradient_descent<F, const N: usize>(
    mut objective: F,
    initial: SVector<f64, N>,
    settings: &DescentSettings,
) -> Result<Minimum<N>>
where
    F: FnMut(&SVector<f64, N>) -> Result<f64>,
{
    settings.validate()?;

    let mut point = initial;
    let mut value = objective(&point).context("Objective failed at the initial point")?;
    if !value.is_finite() {
        bail!("Objective is not finite at the initial point {:?}", point.as_slice());
    }
    let mut trace = vec![value];

    for iteration in 1..=settings.max_iterations {
        let gradient = central_gradient(&mut objective, &point, settings.gradient_step)
            .with_context(|| format!("Gradient estimate failed at iteration {iteration}"))?;
        let norm = gradient.norm();
        if norm == 0.0 {
            return Ok(Minimum {
                point,
                value,
                iterations: iteration,
                status: Status::Converged,
                trace,
            });
        }
        let direction = gradient / norm;

        let origin = point;
        let t = golden_section(
            |t| objective(&(origin + direction * t)),
            settings.line_search_bracket,
            settings.line_search_tolerance,
        )
        .with_context(|| format!("Line search failed at iteration {iteration}"))?;

        let candidate = origin + direction * t;
        let candidate_value = objective(&candidate)?;
        if !(candidate_value <= value) {
            info!("descent iteration {iteration}: no downhill step, stopping at f = {value:e}");
            return Ok(Minimum {
                point,
                value,
                iterations: iteration,
                status: Status::Converged,
                trace,
            });
        }

        let displacement = (candidate - origin).norm();
        point = candidate;
        value = candidate_value;
        trace.push(value);
        info!(
            "descent iteration {iteration}: x = {:?}, f = {value:e}, step = {displacement:e}",
            point.as_slice()
        );

        if displacement <= settings.tolerance {
            return Ok(Minimum {
                point,
                value,
                iterations: iteration,
                status: Status::Converged,
                trace,
            });
        }
    }

    Ok(Minimum {
        point,
        value,
        iterations: settings.max_iterations,
        status: Status::MaxIterations,
        trace,
    })
}
