use thiserror::Error;

/// Failures raised while building or integrating a stellar model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StellarError {
    #[error("Invalid model parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid integration settings: {0}")]
    InvalidSettings(String),

    /// A denominator vanished or a value stopped being finite.
    #[error("Numeric domain error evaluating {quantity} at r = {radius}")]
    NumericDomain { quantity: &'static str, radius: f64 },

    #[error("Surface integration reached the centre after {layers} layers without a convective transition")]
    NoConvectiveTransition { layers: usize },
}

impl StellarError {
    pub(crate) fn domain(quantity: &'static str, radius: f64) -> Self {
        StellarError::NumericDomain { quantity, radius }
    }
}

/// Returns `value` when it is finite, otherwise a [`StellarError::NumericDomain`].
pub(crate) fn finite(value: f64, quantity: &'static str, radius: f64) -> Result<f64, StellarError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StellarError::domain(quantity, radius))
    }
}

/// Divides `numerator` by `denominator`, refusing zero or non-finite results.
pub(crate) fn checked_ratio(
    numerator: f64,
    denominator: f64,
    quantity: &'static str,
    radius: f64,
) -> Result<f64, StellarError> {
    if denominator == 0.0 || !denominator.is_finite() {
        return Err(StellarError::domain(quantity, radius));
    }
    finite(numerator / denominator, quantity, radius)
}
