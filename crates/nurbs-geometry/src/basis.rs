//! Knot span location and Cox-de Boor basis function evaluation.

use crate::spline::Workspace;

/// One combine step of the triangular recurrence.
///
/// A zero denominator means a zero-width span from a repeated knot; the
/// knot-multiplicity convention defines that contribution as zero. Both the
/// unrolled and general paths go through here so they stay bit-for-bit
/// identical.
#[inline(always)]
fn combine(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Find the knot span index for parameter `u`.
///
/// Returns `s` such that `knots[s] <= u < knots[s + 1]`, always the
/// rightmost span containing a repeated knot value, with the upper
/// boundary `u == knots[num_ctr_pts]` mapping to `num_ctr_pts - 1`.
///
/// The caller guarantees `u` lies within `[first_knot, last_knot]`; this
/// function does not re-check the domain.
pub fn find_span(knots: &[f64], num_ctr_pts: usize, degree: usize, u: f64) -> usize {
    debug_assert!(degree > 0);
    debug_assert!(num_ctr_pts >= 2);
    debug_assert!(knots.len() >= num_ctr_pts + degree + 1);

    // Last distinct knot before the end clamp.
    if u >= knots[num_ctr_pts] {
        return num_ctr_pts - 1;
    }
    if u <= knots[degree] {
        return degree;
    }

    let mut low = degree;
    let mut high = num_ctr_pts;
    let mut mid = (low + high) / 2;

    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }

    mid
}

/// Compute the `order` non-vanishing basis functions at `u` into
/// `ws.basis[..order]` (NURBS Book A2.2).
///
/// `ws.basis[i]` pairs with control point `span - order + 1 + i`. The
/// common low orders are unrolled; the unrolling is an optimization, not a
/// semantic branch, and agrees exactly with the general loop.
pub fn basis_functions(knots: &[f64], order: usize, span: usize, u: f64, ws: &mut Workspace) {
    debug_assert!(order >= 2);
    debug_assert!(span + order <= knots.len());

    ws.accommodate(order);
    let Workspace { left, right, basis: n } = ws;

    n[0] = 1.0;

    match order {
        2 => {
            left[1] = u - knots[span];
            right[1] = knots[span + 1] - u;
            let mut saved = 0.0;

            let temp = combine(n[0], right[1] + left[1]);
            n[0] = right[1] * temp + saved;
            saved = left[1] * temp;

            n[1] = saved;
        }

        3 => {
            left[1] = u - knots[span];
            right[1] = knots[span + 1] - u;
            let mut saved = 0.0;

            let mut temp = combine(n[0], right[1] + left[1]);
            n[0] = right[1] * temp + saved;
            saved = left[1] * temp;

            n[1] = saved;

            left[2] = u - knots[span - 1];
            right[2] = knots[span + 2] - u;
            saved = 0.0;

            temp = combine(n[0], right[1] + left[2]);
            n[0] = right[1] * temp + saved;
            saved = left[2] * temp;

            temp = combine(n[1], right[2] + left[1]);
            n[1] = right[2] * temp + saved;
            saved = left[1] * temp;

            n[2] = saved;
        }

        4 => {
            left[1] = u - knots[span];
            right[1] = knots[span + 1] - u;
            let mut saved = 0.0;

            let mut temp = combine(n[0], right[1] + left[1]);
            n[0] = right[1] * temp + saved;
            saved = left[1] * temp;

            n[1] = saved;

            left[2] = u - knots[span - 1];
            right[2] = knots[span + 2] - u;
            saved = 0.0;

            temp = combine(n[0], right[1] + left[2]);
            n[0] = right[1] * temp + saved;
            saved = left[2] * temp;

            temp = combine(n[1], right[2] + left[1]);
            n[1] = right[2] * temp + saved;
            saved = left[1] * temp;

            n[2] = saved;

            left[3] = u - knots[span - 2];
            right[3] = knots[span + 3] - u;
            saved = 0.0;

            temp = combine(n[0], right[1] + left[3]);
            n[0] = right[1] * temp + saved;
            saved = left[3] * temp;

            temp = combine(n[1], right[2] + left[2]);
            n[1] = right[2] * temp + saved;
            saved = left[2] * temp;

            temp = combine(n[2], right[3] + left[1]);
            n[2] = right[3] * temp + saved;
            saved = left[1] * temp;

            n[3] = saved;
        }

        5 => {
            left[1] = u - knots[span];
            right[1] = knots[span + 1] - u;
            let mut saved = 0.0;

            let mut temp = combine(n[0], right[1] + left[1]);
            n[0] = right[1] * temp + saved;
            saved = left[1] * temp;

            n[1] = saved;

            left[2] = u - knots[span - 1];
            right[2] = knots[span + 2] - u;
            saved = 0.0;

            temp = combine(n[0], right[1] + left[2]);
            n[0] = right[1] * temp + saved;
            saved = left[2] * temp;

            temp = combine(n[1], right[2] + left[1]);
            n[1] = right[2] * temp + saved;
            saved = left[1] * temp;

            n[2] = saved;

            left[3] = u - knots[span - 2];
            right[3] = knots[span + 3] - u;
            saved = 0.0;

            temp = combine(n[0], right[1] + left[3]);
            n[0] = right[1] * temp + saved;
            saved = left[3] * temp;

            temp = combine(n[1], right[2] + left[2]);
            n[1] = right[2] * temp + saved;
            saved = left[2] * temp;

            temp = combine(n[2], right[3] + left[1]);
            n[2] = right[3] * temp + saved;
            saved = left[1] * temp;

            n[3] = saved;

            left[4] = u - knots[span - 3];
            right[4] = knots[span + 4] - u;
            saved = 0.0;

            temp = combine(n[0], right[1] + left[4]);
            n[0] = right[1] * temp + saved;
            saved = left[4] * temp;

            temp = combine(n[1], right[2] + left[3]);
            n[1] = right[2] * temp + saved;
            saved = left[3] * temp;

            temp = combine(n[2], right[3] + left[2]);
            n[2] = right[3] * temp + saved;
            saved = left[2] * temp;

            temp = combine(n[3], right[4] + left[1]);
            n[3] = right[4] * temp + saved;
            saved = left[1] * temp;

            n[4] = saved;
        }

        _ => {
            for j in 1..order {
                left[j] = u - knots[span + 1 - j];
                right[j] = knots[span + j] - u;
                let mut saved = 0.0;

                for r in 0..j {
                    let temp = combine(n[r], right[r + 1] + left[j - r]);
                    n[r] = right[r + 1] * temp + saved;
                    saved = left[j - r] * temp;
                }

                n[j] = saved;
            }
        }
    }
}

/// Basis function values and first derivatives at `u` (NURBS Book A2.3,
/// truncated to the first derivative).
pub fn basis_function_derivs(
    knots: &[f64],
    degree: usize,
    span: usize,
    u: f64,
) -> (Vec<f64>, Vec<f64>) {
    let p = degree;

    // Triangular table of basis values and knot differences.
    let mut ndu = vec![vec![0.0; p + 1]; p + 1];
    let mut left = vec![0.0; p + 1];
    let mut right = vec![0.0; p + 1];

    ndu[0][0] = 1.0;

    for j in 1..=p {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;

        for r in 0..j {
            ndu[j][r] = right[r + 1] + left[j - r];
            let temp = combine(ndu[r][j - 1], ndu[j][r]);

            ndu[r][j] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        ndu[j][j] = saved;
    }

    let mut values = vec![0.0; p + 1];
    for j in 0..=p {
        values[j] = ndu[j][p];
    }

    let mut derivs = vec![0.0; p + 1];
    if p == 0 {
        return (values, derivs);
    }

    // First derivative of N_r: difference of the two degree p-1 columns.
    for r in 0..=p {
        let mut d = 0.0;
        if r >= 1 {
            d += combine(ndu[r - 1][p - 1], ndu[p][r - 1]);
        }
        if r <= p - 1 {
            d -= combine(ndu[r][p - 1], ndu[p][r]);
        }
        derivs[r] = d * p as f64;
    }

    (values, derivs)
}
