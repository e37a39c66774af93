//! The spline data model: storage, accessors, validation, and views.

use nurbs_core::{Result, SplineError, Validate};
use serde::{Deserialize, Serialize};

use crate::evaluate;

/// Minimum order (degree + 1) per independent direction.
pub const MIN_ORDER: usize = 2;

/// Minimum number of control points per independent direction.
pub const MIN_NUM_CTR_PTS: usize = 2;

/// A clamped B-spline or NURBS of arbitrary parametric dimension.
///
/// One knot vector and one order per independent direction; one flat
/// control-point sequence per dependent channel, with the last independent
/// direction varying fastest. A rational spline carries its per-point
/// weights as the final dependent channel.
///
/// The shape is fixed at construction ([`Spline::resize`]); values are
/// populated through the mutable accessors or produced wholesale by
/// [`crate::fit::global`]. Evaluation never mutates the spline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spline {
    order: Vec<usize>,
    num_ctr_pts: Vec<usize>,
    knots: Vec<Vec<f64>>,
    ctr_pts: Vec<Vec<f64>>,
    rational: bool,
}

impl Spline {
    /// Allocate a zero-initialized spline.
    ///
    /// `dimension` is the spatial dimension; a rational spline gets one
    /// extra dependent channel for the weights. One entry of `orders` and
    /// `num_ctr_pts` per independent direction.
    pub fn resize(
        dimension: usize,
        orders: &[usize],
        num_ctr_pts: &[usize],
        rational: bool,
    ) -> Result<Self> {
        if orders.is_empty() {
            return Err(SplineError::Precondition(
                "spline needs at least one independent direction".into(),
            ));
        }
        if orders.len() != num_ctr_pts.len() {
            return Err(SplineError::Precondition(format!(
                "got {} orders but {} control-point counts",
                orders.len(),
                num_ctr_pts.len()
            )));
        }
        if dimension < 1 {
            return Err(SplineError::Precondition(
                "spline needs at least one dependent channel".into(),
            ));
        }
        for (i, (&order, &num)) in orders.iter().zip(num_ctr_pts).enumerate() {
            if order < MIN_ORDER {
                return Err(SplineError::Precondition(format!(
                    "order {} for direction {} is below the minimum of {}",
                    order, i, MIN_ORDER
                )));
            }
            if num < order.max(MIN_NUM_CTR_PTS) {
                return Err(SplineError::Precondition(format!(
                    "{} control points for direction {} is fewer than the order {}",
                    num, i, order
                )));
            }
        }

        let num_dep_vars = if rational { dimension + 1 } else { dimension };
        let total: usize = num_ctr_pts.iter().product();

        Ok(Self {
            order: orders.to_vec(),
            num_ctr_pts: num_ctr_pts.to_vec(),
            knots: orders
                .iter()
                .zip(num_ctr_pts)
                .map(|(&o, &n)| vec![0.0; o + n])
                .collect(),
            ctr_pts: vec![vec![0.0; total]; num_dep_vars],
            rational,
        })
    }

    pub fn num_indep_vars(&self) -> usize {
        self.order.len()
    }

    pub fn num_dep_vars(&self) -> usize {
        self.ctr_pts.len()
    }

    pub fn rational(&self) -> bool {
        self.rational
    }

    /// Spatial dimension: the dependent-channel count, minus one for the
    /// weight channel when rational.
    pub fn dimension(&self) -> usize {
        let num_dep_vars = self.num_dep_vars();
        if self.rational && num_dep_vars > 0 {
            num_dep_vars - 1
        } else {
            num_dep_vars
        }
    }

    /// order == degree + 1.
    pub fn order(&self, which_indep_var: usize) -> usize {
        self.order[which_indep_var]
    }

    pub fn degree(&self, which_indep_var: usize) -> usize {
        self.order[which_indep_var] - 1
    }

    pub fn num_control_points(&self, which_indep_var: usize) -> usize {
        self.num_ctr_pts[which_indep_var]
    }

    pub fn num_knots(&self, which_indep_var: usize) -> usize {
        self.knots[which_indep_var].len()
    }

    /// Control-point count over the whole independent-variable grid.
    pub fn total_control_points(&self) -> usize {
        self.ctr_pts.first().map_or(0, Vec::len)
    }

    pub fn knot_vector(&self, which_indep_var: usize) -> &[f64] {
        &self.knots[which_indep_var]
    }

    pub fn knots_mut(&mut self, which_indep_var: usize) -> &mut [f64] {
        &mut self.knots[which_indep_var]
    }

    pub fn knot(&self, which_indep_var: usize, which_knot: usize) -> f64 {
        self.knots[which_indep_var][which_knot]
    }

    pub fn set_knot(&mut self, which_indep_var: usize, which_knot: usize, value: f64) {
        self.knots[which_indep_var][which_knot] = value;
    }

    pub fn first_knot(&self, which_indep_var: usize) -> f64 {
        self.knots[which_indep_var][0]
    }

    pub fn last_knot(&self, which_indep_var: usize) -> f64 {
        self.knots[which_indep_var][self.num_knots(which_indep_var) - 1]
    }

    /// Count of consecutive knots equal to `u`, starting at its first exact
    /// occurrence. Zero if absent.
    pub fn knot_multiplicity(&self, which_indep_var: usize, u: f64) -> usize {
        let knots = &self.knots[which_indep_var];
        match knots.iter().position(|&k| k == u) {
            Some(first) => knots[first..].iter().take_while(|&&k| k == u).count(),
            None => 0,
        }
    }

    pub fn control_point(&self, which_dep_var: usize, which_point: usize) -> f64 {
        self.ctr_pts[which_dep_var][which_point]
    }

    pub fn set_control_point(&mut self, which_dep_var: usize, which_point: usize, value: f64) {
        self.ctr_pts[which_dep_var][which_point] = value;
    }

    pub fn control_points(&self, which_dep_var: usize) -> &[f64] {
        &self.ctr_pts[which_dep_var]
    }

    pub fn control_points_mut(&mut self, which_dep_var: usize) -> &mut [f64] {
        &mut self.ctr_pts[which_dep_var]
    }

    /// The homogeneous weight of a control point. The spline must be
    /// rational; weights live in the last dependent channel.
    pub fn weight(&self, which_point: usize) -> f64 {
        debug_assert!(self.rational);
        self.ctr_pts[self.dimension()][which_point]
    }

    pub fn set_weight(&mut self, which_point: usize, value: f64) {
        debug_assert!(self.rational);
        let channel = self.dimension();
        self.ctr_pts[channel][which_point] = value;
    }

    /// Whether `u` lies in the evaluable range of the given direction.
    pub fn in_domain(&self, which_indep_var: usize, u: f64) -> bool {
        u >= self.first_knot(which_indep_var) && u <= self.last_knot(which_indep_var)
    }
}

impl Validate for Spline {
    /// Comprehensive structural check; errors are reported, never silently
    /// repaired. Restrict calls to code paths where speed is not critical.
    fn validate(&self) -> Result<()> {
        let num_indep_vars = self.num_indep_vars();
        if num_indep_vars < 1 {
            return Err(SplineError::Precondition(
                "no independent directions".into(),
            ));
        }
        if self.num_ctr_pts.len() != num_indep_vars || self.knots.len() != num_indep_vars {
            return Err(SplineError::Precondition(format!(
                "inconsistent direction counts: {} orders, {} control-point counts, {} knot vectors",
                num_indep_vars,
                self.num_ctr_pts.len(),
                self.knots.len()
            )));
        }
        let min_dep = if self.rational { 2 } else { 1 };
        if self.num_dep_vars() < min_dep {
            return Err(SplineError::Precondition(format!(
                "{} dependent channels is too few (rational = {})",
                self.num_dep_vars(),
                self.rational
            )));
        }

        for i in 0..num_indep_vars {
            let order = self.order[i];
            let num = self.num_ctr_pts[i];
            let knots = &self.knots[i];

            if order < MIN_ORDER {
                return Err(SplineError::Precondition(format!(
                    "direction {}: order {} below minimum {}",
                    i, order, MIN_ORDER
                )));
            }
            if num < order {
                return Err(SplineError::Precondition(format!(
                    "direction {}: {} control points for order {}",
                    i, num, order
                )));
            }
            if knots.len() != num + order {
                return Err(SplineError::Precondition(format!(
                    "direction {}: {} knots, expected {} + {}",
                    i,
                    knots.len(),
                    num,
                    order
                )));
            }

            for (k, pair) in knots.windows(2).enumerate() {
                if !pair[1].is_finite() {
                    return Err(SplineError::Precondition(format!(
                        "direction {}: knot {} is not finite",
                        i,
                        k + 1
                    )));
                }
                if pair[0] > pair[1] {
                    return Err(SplineError::Precondition(format!(
                        "direction {}: knots decrease at index {} ({} > {})",
                        i,
                        k + 1,
                        pair[0],
                        pair[1]
                    )));
                }
            }
            if !knots[0].is_finite() {
                return Err(SplineError::Precondition(format!(
                    "direction {}: first knot is not finite",
                    i
                )));
            }

            // Clamped spline: both end knots repeated exactly `order` times.
            let first = knots[0];
            let last = knots[knots.len() - 1];
            if self.knot_multiplicity(i, first) != order {
                return Err(SplineError::Precondition(format!(
                    "direction {}: first knot {} repeated {} times, expected {}",
                    i,
                    first,
                    self.knot_multiplicity(i, first),
                    order
                )));
            }
            if self.knot_multiplicity(i, last) != order {
                return Err(SplineError::Precondition(format!(
                    "direction {}: last knot {} repeated {} times, expected {}",
                    i,
                    last,
                    self.knot_multiplicity(i, last),
                    order
                )));
            }
        }

        let total: usize = self.num_ctr_pts.iter().product();
        for (j, channel) in self.ctr_pts.iter().enumerate() {
            if channel.len() != total {
                return Err(SplineError::Precondition(format!(
                    "dependent channel {} holds {} values, expected {}",
                    j,
                    channel.len(),
                    total
                )));
            }
            if let Some(k) = channel.iter().position(|v| !v.is_finite()) {
                return Err(SplineError::Precondition(format!(
                    "dependent channel {}: value {} is not finite",
                    j, k
                )));
            }
        }

        Ok(())
    }
}

/// Scratch buffers for basis-function evaluation.
///
/// Per-call state, caller-owned: pass one workspace per concurrent
/// evaluation. Attaching shared scratch to the spline itself would alias
/// across threads, so the engine never does that.
#[derive(Debug, Default, Clone)]
pub struct Workspace {
    pub left: Vec<f64>,
    pub right: Vec<f64>,
    pub basis: Vec<f64>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(order: usize) -> Self {
        let mut ws = Self::default();
        ws.accommodate(order);
        ws
    }

    /// Grow the buffers to hold `order` coefficients. Never shrinks.
    pub fn accommodate(&mut self, order: usize) {
        if self.left.len() < order {
            self.left.resize(order, 0.0);
            self.right.resize(order, 0.0);
            self.basis.resize(order, 0.0);
        }
    }
}

/// A spline with exactly one independent direction.
///
/// A view/refinement over [`Spline`] storage: no new fields, only narrowed
/// preconditions on the shared operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curve {
    spline: Spline,
}

impl Curve {
    pub fn new(spline: Spline) -> Result<Self> {
        if spline.num_indep_vars() != 1 {
            return Err(SplineError::Precondition(format!(
                "a curve has exactly 1 independent direction, this spline has {}",
                spline.num_indep_vars()
            )));
        }
        Ok(Self { spline })
    }

    pub fn spline(&self) -> &Spline {
        &self.spline
    }

    pub fn spline_mut(&mut self) -> &mut Spline {
        &mut self.spline
    }

    pub fn into_spline(self) -> Spline {
        self.spline
    }

    /// The evaluable parameter range `[first_knot, last_knot]`.
    pub fn domain(&self) -> (f64, f64) {
        (self.spline.first_knot(0), self.spline.last_knot(0))
    }

    /// Evaluate a point, allocating scratch per call. For hot loops use
    /// [`Curve::point_with`] with a reused [`Workspace`].
    pub fn point(&self, u: f64, out: &mut [f64]) -> Result<()> {
        let mut ws = Workspace::with_order(self.spline.order(0));
        evaluate::curve_point(&self.spline, u, &mut ws, out)
    }

    pub fn point_with(&self, u: f64, ws: &mut Workspace, out: &mut [f64]) -> Result<()> {
        evaluate::curve_point(&self.spline, u, ws, out)
    }

    /// First derivative with respect to the parameter.
    pub fn tangent(&self, u: f64, out: &mut [f64]) -> Result<()> {
        evaluate::curve_tangent(&self.spline, u, out)
    }
}

impl std::ops::Deref for Curve {
    type Target = Spline;

    fn deref(&self) -> &Spline {
        &self.spline
    }
}

impl Validate for Curve {
    fn validate(&self) -> Result<()> {
        self.spline.validate()
    }
}

/// A spline with exactly two independent directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surface {
    spline: Spline,
}

impl Surface {
    pub fn new(spline: Spline) -> Result<Self> {
        if spline.num_indep_vars() != 2 {
            return Err(SplineError::Precondition(format!(
                "a surface has exactly 2 independent directions, this spline has {}",
                spline.num_indep_vars()
            )));
        }
        Ok(Self { spline })
    }

    pub fn spline(&self) -> &Spline {
        &self.spline
    }

    pub fn spline_mut(&mut self) -> &mut Spline {
        &mut self.spline
    }

    pub fn into_spline(self) -> Spline {
        self.spline
    }

    pub fn domain_u(&self) -> (f64, f64) {
        (self.spline.first_knot(0), self.spline.last_knot(0))
    }

    pub fn domain_v(&self) -> (f64, f64) {
        (self.spline.first_knot(1), self.spline.last_knot(1))
    }

    pub fn point(&self, u: f64, v: f64, out: &mut [f64]) -> Result<()> {
        let mut ws_u = Workspace::with_order(self.spline.order(0));
        let mut ws_v = Workspace::with_order(self.spline.order(1));
        evaluate::surface_point(&self.spline, u, v, &mut ws_u, &mut ws_v, out)
    }

    pub fn point_with(
        &self,
        u: f64,
        v: f64,
        ws_u: &mut Workspace,
        ws_v: &mut Workspace,
        out: &mut [f64],
    ) -> Result<()> {
        evaluate::surface_point(&self.spline, u, v, ws_u, ws_v, out)
    }
}

impl std::ops::Deref for Surface {
    type Target = Spline;

    fn deref(&self) -> &Spline {
        &self.spline
    }
}

impl Validate for Surface {
    fn validate(&self) -> Result<()> {
        self.spline.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic_curve() -> Spline {
        let mut s = Spline::resize(2, &[4], &[7], false).unwrap();
        s.knots_mut(0)
            .copy_from_slice(&[0.0, 0.0, 0.0, 0.0, 0.2, 0.5, 0.8, 1.0, 1.0, 1.0, 1.0]);
        for k in 0..7 {
            s.set_control_point(0, k, k as f64);
            s.set_control_point(1, k, (k % 2) as f64);
        }
        s
    }

    #[test]
    fn resize_shapes_storage() {
        let s = Spline::resize(3, &[4, 3], &[6, 5], true).unwrap();
        assert_eq!(s.num_indep_vars(), 2);
        assert_eq!(s.num_dep_vars(), 4);
        assert_eq!(s.dimension(), 3);
        assert_eq!(s.num_knots(0), 10);
        assert_eq!(s.num_knots(1), 8);
        assert_eq!(s.total_control_points(), 30);
        assert!(s.rational());
    }

    #[test]
    fn resize_rejects_bad_shapes() {
        assert!(Spline::resize(3, &[], &[], false).is_err());
        assert!(Spline::resize(3, &[1], &[5], false).is_err());
        assert!(Spline::resize(3, &[4], &[3], false).is_err());
        assert!(Spline::resize(0, &[4], &[6], false).is_err());
        assert!(Spline::resize(3, &[4, 3], &[6], false).is_err());
    }

    #[test]
    fn validate_accepts_well_formed() {
        use nurbs_core::Validate;
        cubic_curve().validate().unwrap();
    }

    #[test]
    fn validate_rejects_decreasing_knots() {
        use nurbs_core::Validate;
        let mut s = cubic_curve();
        s.set_knot(0, 5, 0.1); // was 0.5, now below its neighbor
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_unclamped_ends() {
        use nurbs_core::Validate;
        let mut s = cubic_curve();
        // Still non-decreasing, but the first knot now repeats 3 times.
        s.set_knot(0, 3, 0.1);
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite_values() {
        use nurbs_core::Validate;
        let mut s = cubic_curve();
        s.set_control_point(1, 3, f64::NAN);
        assert!(s.validate().is_err());

        let mut s = cubic_curve();
        s.set_knot(0, 4, f64::INFINITY);
        assert!(s.validate().is_err());
    }

    #[test]
    fn end_knot_accessors_bound_the_domain() {
        let s = cubic_curve();
        assert_eq!(s.first_knot(0), 0.0);
        assert_eq!(s.last_knot(0), 1.0);
        assert!(s.in_domain(0, 0.0));
        assert!(s.in_domain(0, 1.0));
        assert!(!s.in_domain(0, 1.0 + 1e-12));
    }

    #[test]
    fn knot_multiplicity_counts_exact_runs() {
        let s = cubic_curve();
        assert_eq!(s.knot_multiplicity(0, 0.0), 4);
        assert_eq!(s.knot_multiplicity(0, 0.5), 1);
        assert_eq!(s.knot_multiplicity(0, 1.0), 4);
        assert_eq!(s.knot_multiplicity(0, 0.3), 0);
    }

    #[test]
    fn curve_view_requires_one_direction() {
        assert!(Curve::new(cubic_curve()).is_ok());
        let surface_shaped = Spline::resize(3, &[2, 2], &[2, 2], false).unwrap();
        assert!(Curve::new(surface_shaped).is_err());
    }

    #[test]
    fn surface_view_requires_two_directions() {
        assert!(Surface::new(cubic_curve()).is_err());
        let s = Spline::resize(3, &[2, 2], &[2, 2], false).unwrap();
        assert!(Surface::new(s).is_ok());
    }

    #[test]
    fn workspace_accommodate_never_shrinks() {
        let mut ws = Workspace::with_order(6);
        ws.accommodate(3);
        assert_eq!(ws.basis.len(), 6);
        ws.accommodate(8);
        assert_eq!(ws.left.len(), 8);
    }
}
