//! Knot insertion feasibility.

use thiserror::Error;

use crate::spline::Spline;

/// Why a prospective knot insertion is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InsertionRejection {
    #[error("spline has no independent direction {which}")]
    NoSuchDirection { which: usize },

    #[error("knot {value} must lie strictly inside ({min}, {max})")]
    OutsideDomain { value: f64, min: f64, max: f64 },

    #[error(
        "inserting {requested} time(s) on top of multiplicity {current} \
         would exceed the degree {degree}"
    )]
    MultiplicityOverflow {
        current: usize,
        requested: usize,
        degree: usize,
    },
}

/// Check whether `new_knot` may be inserted `num_times` into the given
/// direction without breaking the spline. Pure predicate; nothing is
/// mutated. Insertion is legal exactly while the resulting multiplicity
/// stays at or below the degree.
pub fn can_insert_knot(
    spline: &Spline,
    which_indep_var: usize,
    new_knot: f64,
    num_times: usize,
) -> Result<(), InsertionRejection> {
    if which_indep_var >= spline.num_indep_vars() {
        return Err(InsertionRejection::NoSuchDirection {
            which: which_indep_var,
        });
    }

    let first = spline.first_knot(which_indep_var);
    let last = spline.last_knot(which_indep_var);
    if new_knot <= first || new_knot >= last {
        return Err(InsertionRejection::OutsideDomain {
            value: new_knot,
            min: first,
            max: last,
        });
    }

    let degree = spline.degree(which_indep_var);
    let current = spline.knot_multiplicity(which_indep_var, new_knot);
    if num_times + current > degree {
        return Err(InsertionRejection::MultiplicityOverflow {
            current,
            requested: num_times,
            degree,
        });
    }

    Ok(())
}
