/// Tolerance configuration for evaluation and tessellation.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Chord-height tolerance for adaptive tessellation (in model units)
    pub chord_height: f64,
    /// Minimum parametric interval below which subdivision stops
    pub min_param_interval: f64,
}

impl Tolerance {
    pub const DEFAULT_CHORD_HEIGHT: f64 = 0.01;

    /// Guard against endless bisection across zero-width spans caused by
    /// repeated knots. Tied to f64 precision rather than hard-coded at
    /// call sites.
    pub const DEFAULT_MIN_PARAM_INTERVAL: f64 = 1e-8;

    pub fn new(chord_height: f64, min_param_interval: f64) -> Self {
        Self {
            chord_height,
            min_param_interval,
        }
    }

    /// Tessellation tolerance suitable for interactive display.
    pub fn loose() -> Self {
        Self {
            chord_height: 0.01,
            min_param_interval: Self::DEFAULT_MIN_PARAM_INTERVAL,
        }
    }

    /// Tessellation tolerance suitable for export-quality polylines.
    pub fn tight() -> Self {
        Self {
            chord_height: 0.0001,
            min_param_interval: Self::DEFAULT_MIN_PARAM_INTERVAL,
        }
    }

    /// Check if a parametric interval is too narrow to subdivide further.
    pub fn degenerate_interval(self, u0: f64, u1: f64) -> bool {
        (u1 - u0).abs() < self.min_param_interval
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            chord_height: Self::DEFAULT_CHORD_HEIGHT,
            min_param_interval: Self::DEFAULT_MIN_PARAM_INTERVAL,
        }
    }
}
