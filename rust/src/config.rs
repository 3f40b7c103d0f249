//! Configuration for phase analysis.

/// Phase analyzed when the caller does not name one.
pub const DEFAULT_PHASE: &str = "pre-commit";

/// Tunables for duration estimation and report shaping.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyzerConfig {
    /// Fraction of the declared timeout assumed for hooks without history.
    pub timeout_safety_factor: f64,
    /// Duration used for hooks that are neither measured nor declared.
    pub fallback_duration_ms: f64,
    /// Timeout assigned to manifest entries that omit `timeout`.
    pub default_timeout_ms: f64,
    /// Number of optimization candidates reported per phase.
    pub max_optimization_candidates: usize,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    pub verbosity: u8,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            timeout_safety_factor: 0.7,
            fallback_duration_ms: 1000.0,
            default_timeout_ms: 3000.0,
            max_optimization_candidates: 5,
            verbosity: 0,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }
}
