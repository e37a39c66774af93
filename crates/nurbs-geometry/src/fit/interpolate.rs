//! Global curve interpolation through sample points.

use log::debug;
use nurbs_core::{Result, SplineError};
use nurbs_math::{DMatrix, DVector, LuDecomposition};

use crate::basis::{basis_functions, find_span};
use crate::spline::{Curve, Spline, Workspace};

/// Fit a non-rational curve exactly through the given samples.
///
/// `points` holds one channel per spatial dimension, each with one value
/// per parameter in `params`; `knots` is a clamped knot vector over the
/// parameter range (see [`crate::fit::build_knot_vector`]). A collocation
/// matrix of basis values is assembled, LU-decomposed once, and re-solved
/// per channel; the solution becomes that channel's control points. The
/// result carries `knots` verbatim.
pub fn global(order: usize, params: &[f64], knots: &[f64], points: &[Vec<f64>]) -> Result<Curve> {
    let n = params.len();
    if n < order.max(2) {
        return Err(SplineError::InsufficientData(format!(
            "{} samples cannot support an order {} fit",
            n, order
        )));
    }
    if knots.len() != n + order {
        return Err(SplineError::Precondition(format!(
            "{} knots for {} samples of order {}, expected {}",
            knots.len(),
            n,
            order,
            n + order
        )));
    }
    if points.is_empty() {
        return Err(SplineError::InsufficientData("no sample channels".into()));
    }
    if points.iter().any(|channel| channel.len() != n) {
        return Err(SplineError::Precondition(format!(
            "every sample channel must hold {} values",
            n
        )));
    }

    let degree = order - 1;

    // Collocation matrix: row r holds the basis values at params[r], in
    // the columns of the control points they weight.
    let mut a = DMatrix::zeros(n, n);
    let mut ws = Workspace::with_order(order);
    for (row, &u) in params.iter().enumerate() {
        let span = find_span(knots, n, degree, u);
        basis_functions(knots, order, span, u, &mut ws);
        let base = span - degree;
        for i in 0..order {
            a[(row, base + i)] = ws.basis[i];
        }
    }

    let lu = LuDecomposition::new(a)?;
    debug!(
        "interpolating {} samples x {} channels, order {}",
        n,
        points.len(),
        order
    );

    let mut spline = Spline::resize(points.len(), &[order], &[n], false)?;
    spline.knots_mut(0).copy_from_slice(knots);

    let mut rhs = DVector::zeros(n);
    for (channel, samples) in points.iter().enumerate() {
        for (k, &value) in samples.iter().enumerate() {
            rhs[k] = value;
        }
        lu.solve_in_place(&mut rhs)?;
        let ctr_pts = spline.control_points_mut(channel);
        for k in 0..n {
            ctr_pts[k] = rhs[k];
        }
    }

    Curve::new(spline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::{build_knot_vector, parameterize, CENTRIPETAL_FIT};
    use approx::assert_relative_eq;

    fn fit(points: &[Vec<f64>], order: usize) -> (Curve, Vec<f64>) {
        let params = parameterize(points, CENTRIPETAL_FIT).unwrap();
        let mut knots = vec![0.0; params.len() + order];
        build_knot_vector(&params, order, &mut knots).unwrap();
        let curve = global(order, &params, &knots, points).unwrap();
        (curve, params)
    }

    #[test]
    fn fitted_curve_passes_through_samples() {
        let points = vec![
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            vec![1.0, 2.0, 1.0, 2.0, 1.0, 2.0],
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        ];
        let (curve, params) = fit(&points, 4);

        let mut ws = Workspace::new();
        let mut pt = [0.0; 3];
        for (k, &u) in params.iter().enumerate() {
            curve.point_with(u, &mut ws, &mut pt).unwrap();
            for (channel, samples) in points.iter().enumerate() {
                assert_relative_eq!(pt[channel], samples[k], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn fitted_curve_carries_input_knots_verbatim() {
        let points = vec![
            vec![0.0, 2.0, 3.0, 7.0],
            vec![0.0, 1.0, -1.0, 0.5],
        ];
        let params = parameterize(&points, CENTRIPETAL_FIT).unwrap();
        let mut knots = vec![0.0; params.len() + 3];
        build_knot_vector(&params, 3, &mut knots).unwrap();
        let curve = global(3, &params, &knots, &points).unwrap();

        assert_eq!(curve.knot_vector(0), knots.as_slice());
        assert!(!curve.rational());
        assert_eq!(curve.num_control_points(0), 4);
        assert_eq!(curve.dimension(), 2);
    }

    #[test]
    fn order_two_fit_is_a_polyline() {
        // Order 2 interpolation reproduces the samples as control points.
        let points = vec![vec![0.0, 1.0, 4.0], vec![0.0, 3.0, 0.0]];
        let (curve, _) = fit(&points, 2);
        for (channel, samples) in points.iter().enumerate() {
            for (k, &value) in samples.iter().enumerate() {
                assert_relative_eq!(curve.control_point(channel, k), value, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn rejects_mismatched_inputs() {
        let params = [0.0, 0.5, 1.0];
        let knots = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let points = vec![vec![0.0, 1.0, 2.0]];
        assert!(global(3, &params, &knots, &points).is_ok());

        let short_knots = [0.0, 0.0, 1.0, 1.0];
        assert!(global(3, &params, &short_knots, &points).is_err());

        let ragged = vec![vec![0.0, 1.0]];
        assert!(global(3, &params, &knots, &ragged).is_err());

        assert!(global(3, &params, &knots, &[]).is_err());
        assert!(global(4, &params[..2], &knots, &points).is_err());
    }
}
