//! Knot vector construction from fitted parameters.

use nurbs_core::{Result, SplineError};

/// Fill `knots` with a clamped knot vector matched to `params`.
///
/// The first and last `order` entries clamp to the parameter range. When
/// `knots.len() == params.len() + order` the interior knots average
/// consecutive parameters (interpolation, NURBS Book eq. 9.8); when
/// shorter, they follow the weighted-index averaging used for
/// least-squares approximation (eq. 9.69).
pub fn build_knot_vector(params: &[f64], order: usize, knots: &mut [f64]) -> Result<()> {
    if order < 2 {
        return Err(SplineError::Precondition(format!(
            "order {} is below the minimum of 2",
            order
        )));
    }
    if knots.len() < 2 * order {
        return Err(SplineError::Precondition(format!(
            "{} knots cannot hold two clamps of order {}",
            knots.len(),
            order
        )));
    }
    if params.len() < 2 {
        return Err(SplineError::InsufficientData(format!(
            "{} parameters, need at least 2",
            params.len()
        )));
    }
    if knots.len() > params.len() + order {
        return Err(SplineError::Precondition(format!(
            "{} knots exceed the {} parameters plus order {}",
            knots.len(),
            params.len(),
            order
        )));
    }

    let num_ctr_pts = knots.len() - order;
    let degree = order - 1;
    let first = params[0];
    let last = params[params.len() - 1];

    for knot in knots[..order].iter_mut() {
        *knot = first;
    }
    for knot in knots[num_ctr_pts..].iter_mut() {
        *knot = last;
    }

    if knots.len() == params.len() + order {
        // Interpolation: each interior knot averages `degree` consecutive
        // parameters.
        for j in 0..num_ctr_pts - order {
            let window = &params[j + 1..j + 1 + degree];
            knots[order + j] = window.iter().sum::<f64>() / degree as f64;
        }
    } else {
        // Approximation: spread parameter indices evenly across the fewer
        // interior knots.
        let n = num_ctr_pts - 1;
        let d = params.len() as f64 / (n - degree + 1) as f64;
        for j in 1..=(n - degree) {
            let jd = j as f64 * d;
            let i = jd.floor() as usize;
            let alpha = jd - i as f64;
            knots[degree + j] = (1.0 - alpha) * params[i - 1] + alpha * params[i];
        }
    }

    Ok(())
}
