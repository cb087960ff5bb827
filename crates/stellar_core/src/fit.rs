//! Fitting the free global parameters to a vanishing join error.
//!
//! The total mass stays fixed. Parameter sets the model cannot integrate are
//! scored as infinitely bad, so the line search backs away from them.

use anyhow::{Context, Result};
use log::debug;
use nalgebra::{Vector2, Vector3};

use crate::config::GlobalParameters;
use crate::optimize::{gradient_descent, DescentSettings, Minimum};
use crate::shooting::{ModelSolution, StellarModel};

/// Fitted parameters together with the optimizer record and the final model.
#[derive(Debug, Clone)]
pub struct Fit<const N: usize> {
    pub parameters: GlobalParameters,
    pub minimum: Minimum<N>,
    pub solution: ModelSolution,
}

fn scored(model: &StellarModel, params: &GlobalParameters) -> f64 {
    match model.join_error(params) {
        Ok(error) => error,
        Err(err) => {
            debug!("infeasible parameters {params:?}: {err}");
            f64::INFINITY
        }
    }
}

fn finish<const N: usize>(
    model: &StellarModel,
    parameters: GlobalParameters,
    minimum: Minimum<N>,
) -> Result<Fit<N>> {
    let solution = model
        .solve(&parameters)
        .with_context(|| format!("Fitted parameters {parameters:?} do not solve"))?;
    Ok(Fit {
        parameters,
        minimum,
        solution,
    })
}

/// Minimizes the join error over (Rtot, Ltot) with M and Tc held at `initial`.
pub fn fit_radius_luminosity(
    model: &StellarModel,
    initial: &GlobalParameters,
    settings: &DescentSettings,
) -> Result<Fit<2>> {
    let with = |x: &Vector2<f64>| GlobalParameters {
        radius: x[0],
        luminosity: x[1],
        ..*initial
    };
    let minimum = gradient_descent(
        |x: &Vector2<f64>| Ok(scored(model, &with(x))),
        Vector2::new(initial.radius, initial.luminosity),
        settings,
    )
    .context("Radius-luminosity fit failed")?;
    let parameters = with(&minimum.point);
    finish(model, parameters, minimum)
}

/// Minimizes the join error over (Rtot, Ltot, Tc) with M held at `initial`.
pub fn fit_radius_luminosity_temperature(
    model: &StellarModel,
    initial: &GlobalParameters,
    settings: &DescentSettings,
) -> Result<Fit<3>> {
    let with = |x: &Vector3<f64>| GlobalParameters {
        radius: x[0],
        luminosity: x[1],
        central_temperature: x[2],
        ..*initial
    };
    let minimum = gradient_descent(
        |x: &Vector3<f64>| Ok(scored(model, &with(x))),
        Vector3::new(initial.radius, initial.luminosity, initial.central_temperature),
        settings,
    )
    .context("Radius-luminosity-temperature fit failed")?;
    let parameters = with(&minimum.point);
    finish(model, parameters, minimum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::Status;

    fn assert_monotone(trace: &[f64]) {
        for pair in trace.windows(2) {
            assert!(pair[1] <= pair[0], "objective rose: {trace:?}");
        }
    }

    #[test]
    fn infeasible_parameters_score_infinite() {
        let model = StellarModel::default();
        let bad = GlobalParameters::new(5.0, -1.0, 70.0, 1.95);
        assert_eq!(scored(&model, &bad), f64::INFINITY);
        let good = GlobalParameters::new(5.0, 10.93, 73.52, 1.95);
        assert!(scored(&model, &good).is_finite());
    }

    #[test]
    fn radius_luminosity_descent_never_climbs() {
        let model = StellarModel::default();
        let initial = GlobalParameters::new(5.0, 11.5, 70.0, 1.95);
        let settings = DescentSettings {
            tolerance: 1e-5,
            ..DescentSettings::default()
        };
        let fit = fit_radius_luminosity(&model, &initial, &settings).expect("fit");

        assert!(matches!(
            fit.minimum.status,
            Status::Converged | Status::MaxIterations
        ));
        assert!(fit.minimum.iterations <= settings.max_iterations);
        assert_monotone(&fit.minimum.trace);
        assert!(fit.minimum.value <= fit.minimum.trace[0]);
        assert_eq!(fit.parameters.mass, initial.mass);
        assert_eq!(fit.parameters.central_temperature, initial.central_temperature);
        assert_eq!(fit.solution.relative_error, fit.minimum.value);
    }

    #[test]
    fn three_parameter_fit_never_climbs() {
        let model = StellarModel::default();
        let initial = GlobalParameters::new(5.0, 11.5, 70.0, 2.0);
        let settings = DescentSettings {
            max_iterations: 10,
            ..DescentSettings::default()
        };
        let fit = fit_radius_luminosity_temperature(&model, &initial, &settings).expect("fit");

        assert_monotone(&fit.minimum.trace);
        assert!(fit.minimum.value <= fit.minimum.trace[0]);
        assert_eq!(fit.parameters.mass, initial.mass);
        assert_eq!(fit.parameters.radius, fit.minimum.point[0]);
        assert_eq!(fit.parameters.central_temperature, fit.minimum.point[2]);
    }
}
