//! Point and derivative evaluation for curves and tensor-product surfaces.
//!
//! Every function takes the spline read-only plus caller-supplied scratch,
//! and writes into a caller-supplied output slice. When the output slice is
//! shorter than the spline's dimension, only the leading channels are
//! computed; this lets a consumer holding a many-channel spline (say, a
//! camera path storing eye, center, and up) evaluate just the channels it
//! needs.

use nurbs_core::{Result, SplineError};

use crate::basis::{basis_function_derivs, basis_functions, find_span};
use crate::spline::{Spline, Workspace};

fn check_domain(spline: &Spline, which_indep_var: usize, u: f64) -> Result<()> {
    if !spline.in_domain(which_indep_var, u) {
        return Err(SplineError::Domain(format!(
            "parameter {} outside [{}, {}] for direction {}",
            u,
            spline.first_knot(which_indep_var),
            spline.last_knot(which_indep_var),
            which_indep_var
        )));
    }
    Ok(())
}

fn check_curve(spline: &Spline) -> Result<()> {
    if spline.num_indep_vars() != 1 {
        return Err(SplineError::Precondition(format!(
            "curve evaluation needs 1 independent direction, spline has {}",
            spline.num_indep_vars()
        )));
    }
    Ok(())
}

/// Evaluate a point on a curve at parameter `u`.
///
/// Writes `min(out.len(), dimension)` channels; any trailing entries of
/// `out` are zeroed. Rational curves get the homogeneous perspective
/// division, failing on a zero weight sum.
pub fn curve_point(spline: &Spline, u: f64, ws: &mut Workspace, out: &mut [f64]) -> Result<()> {
    check_curve(spline)?;
    check_domain(spline, 0, u)?;

    let order = spline.order(0);
    let degree = order - 1;
    let knots = spline.knot_vector(0);

    let span = find_span(knots, spline.num_control_points(0), degree, u);
    basis_functions(knots, order, span, u, ws);

    out.fill(0.0);
    let dimension = out.len().min(spline.dimension());
    let base = span - degree;

    if spline.rational() {
        let mut weight = 0.0;
        for i in 0..order {
            let index = base + i;
            let n = ws.basis[i];
            for (d, o) in out[..dimension].iter_mut().enumerate() {
                *o += n * spline.control_point(d, index);
            }
            weight += n * spline.weight(index);
        }

        if weight == 0.0 {
            return Err(SplineError::Domain(format!(
                "zero homogeneous weight at u = {}",
                u
            )));
        }
        let inv_weight = 1.0 / weight;
        for o in out[..dimension].iter_mut() {
            *o *= inv_weight;
        }
    } else {
        for i in 0..order {
            let index = base + i;
            let n = ws.basis[i];
            for (d, o) in out[..dimension].iter_mut().enumerate() {
                *o += n * spline.control_point(d, index);
            }
        }
    }

    Ok(())
}

/// Evaluate the first derivative of a curve at parameter `u`.
///
/// Non-rational curves blend control points with the basis derivatives;
/// rational curves apply the quotient rule to the homogeneous sums.
///
/// Unlike [`curve_point`], this allocates the triangular derivative table
/// per call; the [`Workspace`] buffers are shaped for the value recurrence
/// only.
pub fn curve_tangent(spline: &Spline, u: f64, out: &mut [f64]) -> Result<()> {
    check_curve(spline)?;
    check_domain(spline, 0, u)?;

    let degree = spline.degree(0);
    let knots = spline.knot_vector(0);

    let span = find_span(knots, spline.num_control_points(0), degree, u);
    let (values, derivs) = basis_function_derivs(knots, degree, span, u);

    out.fill(0.0);
    let dimension = out.len().min(spline.dimension());
    let base = span - degree;

    if spline.rational() {
        let mut pos = vec![0.0; dimension];
        let mut weight = 0.0;
        let mut d_weight = 0.0;

        for i in 0..=degree {
            let index = base + i;
            for d in 0..dimension {
                let cp = spline.control_point(d, index);
                pos[d] += values[i] * cp;
                out[d] += derivs[i] * cp;
            }
            weight += values[i] * spline.weight(index);
            d_weight += derivs[i] * spline.weight(index);
        }

        if weight == 0.0 {
            return Err(SplineError::Domain(format!(
                "zero homogeneous weight at u = {}",
                u
            )));
        }
        // (A/w)' = (A' - w' * A/w) / w
        for d in 0..dimension {
            out[d] = (out[d] - d_weight * pos[d] / weight) / weight;
        }
    } else {
        for i in 0..=degree {
            let index = base + i;
            for (d, o) in out[..dimension].iter_mut().enumerate() {
                *o += derivs[i] * spline.control_point(d, index);
            }
        }
    }

    Ok(())
}

/// Evaluate a point on a tensor-product surface at `(u, v)`.
///
/// Blends the `order(1)` v-direction rows, each itself blended across the
/// `order(0)` u-direction columns; the rational division happens once at
/// the end. Control points are stored with the v direction varying fastest.
pub fn surface_point(
    spline: &Spline,
    u: f64,
    v: f64,
    ws_u: &mut Workspace,
    ws_v: &mut Workspace,
    out: &mut [f64],
) -> Result<()> {
    if spline.num_indep_vars() != 2 {
        return Err(SplineError::Precondition(format!(
            "surface evaluation needs 2 independent directions, spline has {}",
            spline.num_indep_vars()
        )));
    }
    check_domain(spline, 0, u)?;
    check_domain(spline, 1, v)?;

    let order_u = spline.order(0);
    let order_v = spline.order(1);
    let span_u = find_span(spline.knot_vector(0), spline.num_control_points(0), order_u - 1, u);
    let span_v = find_span(spline.knot_vector(1), spline.num_control_points(1), order_v - 1, v);
    basis_functions(spline.knot_vector(0), order_u, span_u, u, ws_u);
    basis_functions(spline.knot_vector(1), order_v, span_v, v, ws_v);

    out.fill(0.0);
    let dimension = out.len().min(spline.dimension());
    let base_u = span_u - (order_u - 1);
    let base_v = span_v - (order_v - 1);
    let stride = spline.num_control_points(1);

    let mut weight = 0.0;
    for i in 0..order_u {
        let row = (base_u + i) * stride;
        for j in 0..order_v {
            let index = row + base_v + j;
            let blend = ws_u.basis[i] * ws_v.basis[j];
            for (d, o) in out[..dimension].iter_mut().enumerate() {
                *o += blend * spline.control_point(d, index);
            }
            if spline.rational() {
                weight += blend * spline.weight(index);
            }
        }
    }

    if spline.rational() {
        if weight == 0.0 {
            return Err(SplineError::Domain(format!(
                "zero homogeneous weight at (u, v) = ({}, {})",
                u, v
            )));
        }
        let inv_weight = 1.0 / weight;
        for o in out[..dimension].iter_mut() {
            *o *= inv_weight;
        }
    }

    Ok(())
}
