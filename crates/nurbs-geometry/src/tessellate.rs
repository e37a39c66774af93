//! Adaptive curve flattening by chord-height bisection.

use log::trace;
use nurbs_core::{Result, SplineError, Tolerance};

use crate::evaluate;
use crate::spline::{Curve, Workspace};

/// Flatten `[u0, u1]` into parameters whose polyline stays within
/// `chord_height` of the curve.
///
/// The returned sequence is strictly increasing and always starts at `u0`
/// and ends at `u1`. Uses the default minimum parametric interval; see
/// [`bisect_with_tolerance`] to tune it.
pub fn bisect(curve: &Curve, u0: f64, u1: f64, chord_height: f64) -> Result<Vec<f64>> {
    bisect_with_tolerance(
        curve,
        u0,
        u1,
        Tolerance::new(chord_height, Tolerance::DEFAULT_MIN_PARAM_INTERVAL),
    )
}

/// [`bisect`] with an explicit [`Tolerance`].
///
/// An interval `(ua, ub)` splits at its midpoint whenever the curve's
/// midpoint deviates from the chord midpoint by at least the chord height;
/// intervals narrower than `tolerance.min_param_interval` never split, so
/// zero-width spans from repeated knots cannot recurse forever.
pub fn bisect_with_tolerance(
    curve: &Curve,
    u0: f64,
    u1: f64,
    tolerance: Tolerance,
) -> Result<Vec<f64>> {
    if tolerance.chord_height <= 0.0 {
        return Err(SplineError::Precondition(format!(
            "chord height {} must be positive",
            tolerance.chord_height
        )));
    }
    if u1 <= u0 {
        return Err(SplineError::Domain(format!(
            "empty tessellation interval [{}, {}]",
            u0, u1
        )));
    }
    if !curve.in_domain(0, u0) || !curve.in_domain(0, u1) {
        return Err(SplineError::Domain(format!(
            "tessellation interval [{}, {}] outside the curve domain",
            u0, u1
        )));
    }

    let mut tess = Tessellation {
        curve,
        chord_height2: tolerance.chord_height * tolerance.chord_height,
        tolerance,
        ws: Workspace::with_order(curve.order(0)),
        params: Vec::new(),
    };

    let dimension = curve.dimension();
    let mut p0 = vec![0.0; dimension];
    let mut p1 = vec![0.0; dimension];
    evaluate::curve_point(curve.spline(), u0, &mut tess.ws, &mut p0)?;
    evaluate::curve_point(curve.spline(), u1, &mut tess.ws, &mut p1)?;

    tess.params.push(u0);
    tess.subdivide(u0, &p0, u1, &p1)?;
    tess.params.push(u1);

    Ok(tess.params)
}

struct Tessellation<'a> {
    curve: &'a Curve,
    tolerance: Tolerance,
    chord_height2: f64,
    ws: Workspace,
    params: Vec<f64>,
}

impl Tessellation<'_> {
    /// In-order recursion keeps `params` sorted without a final sort.
    fn subdivide(&mut self, ua: f64, pa: &[f64], ub: f64, pb: &[f64]) -> Result<()> {
        if self.tolerance.degenerate_interval(ua, ub) {
            // Typically a discontinuity at a full-multiplicity knot.
            trace!("stopping bisection on degenerate interval [{}, {}]", ua, ub);
            return Ok(());
        }

        let um = 0.5 * (ua + ub);
        let mut pm = vec![0.0; pa.len()];
        evaluate::curve_point(self.curve.spline(), um, &mut self.ws, &mut pm)?;

        let mut deviation2 = 0.0;
        for d in 0..pa.len() {
            let chord_mid = 0.5 * (pa[d] + pb[d]);
            let diff = chord_mid - pm[d];
            deviation2 += diff * diff;
        }

        if deviation2 >= self.chord_height2 {
            self.subdivide(ua, pa, um, &pm)?;
            self.params.push(um);
            self.subdivide(um, &pm, ub, pb)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spline::Spline;

    /// Cubic arc-like curve bending away from its chord.
    fn bent_cubic() -> Curve {
        let mut s = Spline::resize(2, &[4], &[7], false).unwrap();
        s.knots_mut(0)
            .copy_from_slice(&[0.0, 0.0, 0.0, 0.0, 0.2, 0.5, 0.8, 1.0, 1.0, 1.0, 1.0]);
        s.control_points_mut(0)
            .copy_from_slice(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        s.control_points_mut(1)
            .copy_from_slice(&[0.0, 2.0, 4.0, 4.5, 4.0, 2.0, 0.0]);
        Curve::new(s).unwrap()
    }

    fn straight_line() -> Curve {
        let mut s = Spline::resize(2, &[2], &[2], false).unwrap();
        s.knots_mut(0).copy_from_slice(&[0.0, 0.0, 1.0, 1.0]);
        s.control_points_mut(0).copy_from_slice(&[0.0, 10.0]);
        s.control_points_mut(1).copy_from_slice(&[0.0, 0.0]);
        Curve::new(s).unwrap()
    }

    #[test]
    fn endpoints_and_strict_ordering() {
        let curve = bent_cubic();
        let params = bisect(&curve, 0.0, 1.0, 0.01).unwrap();

        assert_eq!(params[0], 0.0);
        assert_eq!(*params.last().unwrap(), 1.0);
        for pair in params.windows(2) {
            assert!(pair[0] < pair[1], "parameters not strictly increasing");
        }
        assert!(params.len() > 2, "curved segment should subdivide");
    }

    #[test]
    fn straight_line_needs_no_subdivision() {
        let params = bisect(&straight_line(), 0.0, 1.0, 0.01).unwrap();
        assert_eq!(params, vec![0.0, 1.0]);
    }

    #[test]
    fn polyline_respects_chord_height() {
        let curve = bent_cubic();
        let chord_height = 0.01;
        let params = bisect(&curve, 0.0, 1.0, chord_height).unwrap();

        // Check the midpoint deviation of every produced segment.
        let mut ws = Workspace::new();
        for pair in params.windows(2) {
            let mut pa = [0.0; 2];
            let mut pb = [0.0; 2];
            let mut pm = [0.0; 2];
            curve.point_with(pair[0], &mut ws, &mut pa).unwrap();
            curve.point_with(pair[1], &mut ws, &mut pb).unwrap();
            curve
                .point_with(0.5 * (pair[0] + pair[1]), &mut ws, &mut pm)
                .unwrap();
            let dev2 = (0..2)
                .map(|d| {
                    let mid = 0.5 * (pa[d] + pb[d]);
                    (mid - pm[d]) * (mid - pm[d])
                })
                .sum::<f64>();
            assert!(
                dev2 < chord_height * chord_height,
                "segment [{}, {}] deviates too far",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn tighter_tolerance_yields_more_segments() {
        let curve = bent_cubic();
        let loose = bisect(&curve, 0.0, 1.0, 0.01).unwrap();
        let tight = bisect(&curve, 0.0, 1.0, 0.0001).unwrap();
        assert!(tight.len() > loose.len());
    }

    #[test]
    fn sub_interval_tessellation() {
        let curve = bent_cubic();
        let params = bisect(&curve, 0.25, 0.75, 0.01).unwrap();
        assert_eq!(params[0], 0.25);
        assert_eq!(*params.last().unwrap(), 0.75);
    }

    #[test]
    fn min_interval_guard_terminates() {
        let curve = bent_cubic();
        // An absurdly tight chord height cannot recurse past the guard.
        let params = bisect_with_tolerance(
            &curve,
            0.0,
            1.0,
            Tolerance::new(1e-300, 1e-3),
        )
        .unwrap();
        for pair in params.windows(2) {
            assert!(pair[1] - pair[0] >= 0.5e-3);
        }
    }

    #[test]
    fn rejects_bad_intervals() {
        let curve = bent_cubic();
        assert!(bisect(&curve, 0.5, 0.5, 0.01).is_err());
        assert!(bisect(&curve, 0.8, 0.2, 0.01).is_err());
        assert!(bisect(&curve, -0.1, 1.0, 0.01).is_err());
        assert!(bisect(&curve, 0.0, 1.0, 0.0).is_err());
    }
}
