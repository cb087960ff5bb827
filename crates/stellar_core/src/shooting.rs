//! Two-sided shooting integration and the join mismatch.
//!
//! The surface integration starts at `start_fraction * Rtot` and steps inward
//! with the radiative closure until the n+1 test first classifies a layer as
//! convective. That layer is the join: it seeds the polytropic constant K and
//! fixes the grid index at which the centre integration, stepping outward on
//! the polytrope from r = 0, is compared against it.
//!
//! Both integrations share one radial grid, so the surface layer `i` and the
//! centre layer `layers - i` sit at the same radius.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::boundary::{polytropic_constant, BoundaryEstimator};
use crate::config::{GlobalParameters, IntegrationSettings};
use crate::error::{checked_ratio, StellarError};
use crate::physics::Physics;
use crate::stepper::{
    n_plus_one, Closure, Convective, Derivatives, History, Layer, Radiative, StepContext,
    StepOutcome, Zone,
};

/// Layers computed in closed form before the multi-step formulas take over.
const STARTUP_LAYERS: usize = 3;

/// Accepted layers and their derivatives, in integration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    pub layers: Vec<Layer>,
    pub derivatives: Vec<Derivatives>,
    /// Layers accepted after exhausting the corrector passes.
    pub nonconverged_layers: usize,
}

impl Integration {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            layers: Vec::with_capacity(capacity),
            derivatives: Vec::with_capacity(capacity),
            nonconverged_layers: 0,
        }
    }

    fn push(&mut self, layer: Layer, derivatives: Derivatives) {
        self.layers.push(layer);
        self.derivatives.push(derivatives);
    }

    pub fn last(&self) -> Option<&Layer> {
        self.layers.last()
    }
}

/// Complete two-sided solution for one set of global parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSolution {
    pub parameters: GlobalParameters,
    pub polytropic_constant: f64,
    /// Surface integration, from the starting radius down to the join.
    pub surface: Integration,
    /// Centre integration, from r = 0 up to the join.
    pub center: Integration,
    /// Grid index of the join layer.
    pub join_index: usize,
    /// Euclidean norm of the relative P, T, L, M differences at the join.
    pub relative_error: f64,
}

impl ModelSolution {
    pub fn error_percent(&self) -> f64 {
        100.0 * self.relative_error
    }

    /// Surface layer at the join.
    pub fn radiative_join(&self) -> Option<&Layer> {
        self.surface.last()
    }

    /// Centre layer at the join.
    pub fn convective_join(&self) -> Option<&Layer> {
        self.center.last()
    }

    /// The whole model ordered by grid index: surface layers down to the join,
    /// then the centre layers below it.
    pub fn joined_layers(&self) -> Vec<Layer> {
        let below_join = self.center.layers.len().saturating_sub(1);
        self.surface
            .layers
            .iter()
            .chain(self.center.layers[..below_join].iter().rev())
            .copied()
            .collect()
    }
}

/// Relative mismatch sqrt(Σ ((X_rad - X_conv) / X_rad)²) over X ∈ {P, T, L, M}.
pub fn total_relative_error(radiative: &Layer, convective: &Layer) -> Result<f64, StellarError> {
    let pairs = [
        ("relative pressure error", radiative.pressure, convective.pressure),
        ("relative temperature error", radiative.temperature, convective.temperature),
        ("relative luminosity error", radiative.luminosity, convective.luminosity),
        ("relative mass error", radiative.mass, convective.mass),
    ];
    let mut sum = 0.0;
    for (quantity, rad, conv) in pairs {
        let relative = checked_ratio(rad - conv, rad, quantity, radiative.radius)?;
        sum += relative * relative;
    }
    Ok(sum.sqrt())
}

/// Stateless model evaluator; one instance may serve any number of evaluations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StellarModel {
    physics: Physics,
    settings: IntegrationSettings,
}

impl StellarModel {
    pub fn new(physics: Physics, settings: IntegrationSettings) -> Result<Self, StellarError> {
        settings.validate()?;
        Ok(Self { physics, settings })
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    pub fn settings(&self) -> &IntegrationSettings {
        &self.settings
    }

    /// Join error for the given parameters, as a fraction.
    pub fn join_error(&self, params: &GlobalParameters) -> Result<f64, StellarError> {
        Ok(self.solve(params)?.relative_error)
    }

    pub fn solve(&self, params: &GlobalParameters) -> Result<ModelSolution, StellarError> {
        params.validate()?;

        let surface = self.integrate_from_surface(params)?;
        let join = match surface.last() {
            Some(layer) => *layer,
            None => return Err(StellarError::NoConvectiveTransition { layers: 0 }),
        };
        let k = polytropic_constant(join.pressure, join.temperature);
        if !k.is_finite() || k <= 0.0 {
            return Err(StellarError::domain("polytropic constant", join.radius));
        }
        debug!(
            "join at layer {} (r = {:.5}), K = {:.6}",
            join.index, join.radius, k
        );

        let center = self.integrate_from_center(params, k, join.index)?;
        let convective = match center.last() {
            Some(layer) => *layer,
            None => return Err(StellarError::domain("centre integration", 0.0)),
        };
        let relative_error = total_relative_error(&join, &convective)?;

        Ok(ModelSolution {
            parameters: *params,
            polytropic_constant: k,
            join_index: join.index,
            surface,
            center,
            relative_error,
        })
    }

    /// Inward integration ending at the first layer classified convective.
    pub fn integrate_from_surface(
        &self,
        params: &GlobalParameters,
    ) -> Result<Integration, StellarError> {
        let n = self.settings.layers;
        let h = -self.settings.step(params.radius);
        let start = self.settings.start_fraction * params.radius;
        let boundary = BoundaryEstimator::new(&self.physics, params);

        let mut integration = Integration::with_capacity(n);
        for i in 0..STARTUP_LAYERS {
            let (layer, derivatives) = boundary.surface_layer(i, start + i as f64 * h)?;
            integration.push(layer, derivatives);
        }

        let mut zone = Zone::Radiative;
        // The grid point at index n is the origin, where the radiative closure is singular.
        for index in STARTUP_LAYERS..n {
            let outcome = self.advance(&Radiative, &mut integration, h, index)?;
            let mut layer = outcome.layer;
            layer.ensure_physical()?;
            let n1 = n_plus_one(&layer, &outcome.derivatives)?;
            layer.n_plus_one = Some(n1);
            integration.push(layer, outcome.derivatives);

            zone = zone.after(n1, self.settings.transition_threshold);
            if zone == Zone::Convective {
                debug!("convective transition at layer {index}, n+1 = {n1:.4}");
                return Ok(integration);
            }
        }

        Err(StellarError::NoConvectiveTransition { layers: n })
    }

    /// Outward integration on the polytrope of constant `k`, up to grid index `join_index`.
    pub fn integrate_from_center(
        &self,
        params: &GlobalParameters,
        k: f64,
        join_index: usize,
    ) -> Result<Integration, StellarError> {
        let n = self.settings.layers;
        if join_index > n {
            return Err(StellarError::InvalidSettings(format!(
                "join index {join_index} lies beyond the {n}-layer grid"
            )));
        }
        let h = self.settings.step(params.radius);
        let steps = n - join_index;
        let boundary = BoundaryEstimator::new(&self.physics, params);
        let closure = Convective { k };

        let mut integration = Integration::with_capacity(steps + 1);
        for j in 0..=steps.min(STARTUP_LAYERS - 1) {
            let (layer, derivatives) = boundary.central_layer(n - j, j as f64 * h, k)?;
            integration.push(layer, derivatives);
        }
        for j in STARTUP_LAYERS..=steps {
            let outcome = self.advance(&closure, &mut integration, h, n - j)?;
            outcome.layer.ensure_physical()?;
            integration.push(outcome.layer, outcome.derivatives);
        }

        Ok(integration)
    }

    /// Runs correction passes until both agreement tests pass.
    ///
    /// When the pass budget runs out the last pass is accepted and counted.
    fn advance<C: Closure>(
        &self,
        closure: &C,
        integration: &mut Integration,
        h: f64,
        next_index: usize,
    ) -> Result<StepOutcome, StellarError> {
        let history = History::latest(&integration.derivatives);
        let (Some(history), Some(&layer)) = (history, integration.last()) else {
            return Err(StellarError::InvalidSettings(
                "stepping needs three accepted layers".to_string(),
            ));
        };
        let ctx = StepContext {
            physics: &self.physics,
            layer: &layer,
            history: &history,
            h,
            next_index,
            tolerance: self.settings.tolerance,
        };

        let mut estimate = closure.predict(&ctx);
        let mut passes = 0;
        loop {
            passes += 1;
            let outcome = closure.correct(&ctx, estimate)?;
            if outcome.converged() {
                return Ok(outcome);
            }
            if passes >= self.settings.max_corrector_passes {
                warn!(
                    "{:?} layer {} accepted without convergence after {} passes (P ok: {}, T ok: {})",
                    closure.zone(),
                    next_index,
                    passes,
                    outcome.pressure_converged,
                    outcome.temperature_converged
                );
                integration.nonconverged_layers += 1;
                return Ok(outcome);
            }
            estimate = outcome.refined_estimate();
        }
    }
}
