//! Join error sampled on a radius-luminosity grid around a reference point.

use nalgebra::DMatrix;

use crate::config::GlobalParameters;
use crate::error::StellarError;
use crate::shooting::StellarModel;

/// Join error in percent on a `(2n+1) × (2n+1)` grid.
///
/// Column `j` holds `Rtot + (j - n) δR` and row `i` holds `Ltot + (i - n) δL`;
/// mass and central temperature are taken from `center`.
pub fn error_grid(
    model: &StellarModel,
    center: &GlobalParameters,
    n: usize,
    delta_radius: f64,
    delta_luminosity: f64,
) -> Result<DMatrix<f64>, StellarError> {
    if !(delta_radius.is_finite() && delta_luminosity.is_finite()) {
        return Err(StellarError::InvalidParameters(
            "grid spacing must be finite".to_string(),
        ));
    }
    let size = 2 * n + 1;
    let offset = |k: usize| k as f64 - n as f64;

    let mut grid = DMatrix::zeros(size, size);
    for i in 0..size {
        for j in 0..size {
            let params = GlobalParameters {
                radius: center.radius + offset(j) * delta_radius,
                luminosity: center.luminosity + offset(i) * delta_luminosity,
                ..*center
            };
            grid[(i, j)] = model.solve(&params)?.error_percent();
        }
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_centre_matches_direct_evaluation() {
        let model = StellarModel::default();
        let center = GlobalParameters::new(5.0, 10.93, 73.52, 1.95);
        let grid = error_grid(&model, &center, 1, 0.05, 0.5).expect("grid");

        assert_eq!(grid.shape(), (3, 3));
        let direct = model.solve(&center).expect("centre").error_percent();
        assert_eq!(grid[(1, 1)], direct);
        assert!(grid.iter().all(|e| e.is_finite() && *e >= 0.0));

        let shifted = GlobalParameters {
            radius: center.radius + 0.05,
            luminosity: center.luminosity - 0.5,
            ..center
        };
        let corner = model.solve(&shifted).expect("corner").error_percent();
        assert_eq!(grid[(0, 2)], corner);
    }

    #[test]
    fn zero_width_grid_is_a_single_point() {
        let model = StellarModel::default();
        let center = GlobalParameters::new(5.0, 10.93, 73.52, 1.95);
        let grid = error_grid(&model, &center, 0, 0.1, 1.0).expect("grid");
        assert_eq!(grid.shape(), (1, 1));
    }

    #[test]
    fn invalid_points_fail_the_grid() {
        let model = StellarModel::default();
        let center = GlobalParameters::new(5.0, 0.5, 73.52, 1.95);
        let err = error_grid(&model, &center, 1, 1.0, 1.0).expect_err("negative radius");
        assert!(matches!(err, StellarError::InvalidParameters(_)));
    }
}
