//! Parameter assignment for sample points.

use nurbs_core::{Result, SplineError};

/// Accumulated chord length: parameters proportional to point spacing.
pub const CHORDAL_FIT: f64 = 1.0;

/// Square root of chord length: smooths out unevenly spaced samples.
pub const CENTRIPETAL_FIT: f64 = 0.5;

/// Assign a parameter in `[0, 1]` to each of `n + 1` sample points.
///
/// `points` holds one channel per spatial dimension, each of length
/// `n + 1`. Interior parameters accumulate `dist^power` over adjacent
/// pairs; the power is halved internally so it applies directly to squared
/// distances, saving a square root per term for the chordal case.
///
/// Adjacent samples must be distinct: a coincident pair would repeat a
/// parameter and later make the interpolation collocation matrix singular,
/// so it is rejected here with the offending sample index.
pub fn parameterize(points: &[Vec<f64>], power: f64) -> Result<Vec<f64>> {
    if points.is_empty() {
        return Err(SplineError::InsufficientData(
            "no sample point channels".into(),
        ));
    }
    let num_points = points[0].len();
    if num_points < 2 {
        return Err(SplineError::InsufficientData(format!(
            "{} sample points, need at least 2",
            num_points
        )));
    }
    if points.iter().any(|channel| channel.len() != num_points) {
        return Err(SplineError::InsufficientData(
            "sample point channels have unequal lengths".into(),
        ));
    }

    // Halved so that it exponentiates squared distances.
    let exponent = 0.5 * power;

    let mut distances = Vec::with_capacity(num_points - 1);
    let mut total = 0.0;
    for k in 1..num_points {
        let mut dist2 = 0.0;
        for channel in points {
            let diff = channel[k] - channel[k - 1];
            dist2 += diff * diff;
        }
        if dist2 == 0.0 {
            return Err(SplineError::InsufficientData(format!(
                "sample points {} and {} coincide",
                k - 1,
                k
            )));
        }
        let d = dist2.powf(exponent);
        total += d;
        distances.push(d);
    }

    let mut params = vec![0.0; num_points];
    for k in 1..num_points - 1 {
        params[k] = params[k - 1] + distances[k - 1] / total;
    }
    params[num_points - 1] = 1.0;

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Five collinear points at unequal spacing.
    fn uneven_line() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 1.0, 2.0, 6.0, 10.0],
            vec![0.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0, 0.0],
        ]
    }

    #[test]
    fn chordal_is_proportional_to_arc_length() {
        let params = parameterize(&uneven_line(), CHORDAL_FIT).unwrap();
        assert_eq!(params.len(), 5);
        assert_relative_eq!(params[0], 0.0);
        assert_relative_eq!(params[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(params[2], 0.2, epsilon = 1e-12);
        assert_relative_eq!(params[3], 0.6, epsilon = 1e-12);
        assert_relative_eq!(params[4], 1.0);
    }

    #[test]
    fn centripetal_smooths_uneven_spacing() {
        let chordal = parameterize(&uneven_line(), CHORDAL_FIT).unwrap();
        let centripetal = parameterize(&uneven_line(), CENTRIPETAL_FIT).unwrap();

        // sqrt spacing: 1, 1, 2, 2 over a total of 6.
        assert_relative_eq!(centripetal[1], 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(centripetal[2], 2.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(centripetal[3], 4.0 / 6.0, epsilon = 1e-12);

        // The two schemes genuinely differ on uneven spacing, and the
        // centripetal gaps vary less.
        assert!((chordal[3] - centripetal[3]).abs() > 1e-3);
        let spread = |p: &[f64]| {
            let gaps: Vec<f64> = p.windows(2).map(|w| w[1] - w[0]).collect();
            let max = gaps.iter().cloned().fold(f64::MIN, f64::max);
            let min = gaps.iter().cloned().fold(f64::MAX, f64::min);
            max - min
        };
        assert!(spread(&centripetal) < spread(&chordal));
    }

    #[test]
    fn parameters_are_strictly_increasing() {
        let points = vec![
            vec![0.0, 1.0, 1.5, 3.0],
            vec![0.0, 2.0, 1.0, 0.5],
        ];
        let params = parameterize(&points, CENTRIPETAL_FIT).unwrap();
        for pair in params.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn rejects_degenerate_input() {
        assert!(parameterize(&[], CHORDAL_FIT).is_err());
        assert!(parameterize(&[vec![1.0]], CHORDAL_FIT).is_err());
        assert!(parameterize(&[vec![1.0, 2.0], vec![1.0]], CHORDAL_FIT).is_err());
        assert!(parameterize(&[vec![3.0, 3.0, 3.0]], CHORDAL_FIT).is_err());
    }

    #[test]
    fn rejects_coincident_adjacent_samples() {
        // A repeated interior sample would repeat its parameter and make
        // any downstream collocation matrix singular.
        let points = vec![vec![0.0, 1.0, 1.0, 2.0]];
        let err = parameterize(&points, CHORDAL_FIT).unwrap_err();
        match err {
            SplineError::InsufficientData(msg) => {
                assert!(msg.contains("1 and 2"), "unexpected message: {}", msg);
            }
            other => panic!("expected InsufficientData, got {:?}", other),
        }

        // Distinct in another channel is fine.
        let points = vec![vec![0.0, 1.0, 1.0, 2.0], vec![0.0, 0.0, 1.0, 1.0]];
        assert!(parameterize(&points, CENTRIPETAL_FIT).is_ok());
    }
}
