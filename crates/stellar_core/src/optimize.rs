//! Derivative-free line search and gradient descent over model parameters.

pub mod descent;
pub mod golden_section;

pub use descent::{central_gradient, gradient_descent, DescentSettings, Minimum, Status};
pub use golden_section::golden_section;
