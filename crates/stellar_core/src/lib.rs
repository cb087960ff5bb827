//! The `stellar_core` crate builds static stellar interior models by shooting.
//! A radiative envelope is integrated inward from near the surface and a
//! convective core outward from the centre; the mismatch where they meet is
//! the objective minimized over the global parameters.
//!
//! Key components:
//! - **Physics**: composition, density, the nuclear regime table and the radiative/convective closures.
//! - **Boundary**: closed-form start-up layers at the surface and at the centre.
//! - **Stepper**: the predictor-corrector step and the radiative/convective zone state.
//! - **Shooting**: `StellarModel`, the two integrations and the join error.
//! - **Optimize / Fit / Grid**: golden-section line search, gradient descent, parameter fits and error maps.
pub mod boundary;
pub mod config;
pub mod error;
pub mod fit;
pub mod grid;
pub mod optimize;
pub mod physics;
pub mod shooting;
pub mod stepper;

pub use config::{Composition, GlobalParameters, IntegrationSettings};
pub use error::StellarError;
pub use physics::Physics;
pub use shooting::{ModelSolution, StellarModel};
