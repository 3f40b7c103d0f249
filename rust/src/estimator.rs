//! Effective duration resolution for a single hook.

use crate::config::AnalyzerConfig;
use crate::models::HookCatalog;

/// Resolves hook durations from history, the manifest, or a fallback.
#[derive(Clone, Copy, Debug)]
pub struct DurationEstimator<'a> {
    catalog: &'a HookCatalog,
    config: &'a AnalyzerConfig,
}

impl<'a> DurationEstimator<'a> {
    pub fn new(catalog: &'a HookCatalog, config: &'a AnalyzerConfig) -> Self {
        Self { catalog, config }
    }

    /// Estimated duration in milliseconds.
    ///
    /// Resolution order:
    /// 1. historical p95 duration
    /// 2. historical observed duration
    /// 3. declared timeout scaled by the safety factor
    /// 4. the configured fallback
    pub fn estimate(&self, hook_name: &str) -> f64 {
        if let Some(sample) = self.catalog.sample(hook_name) {
            if let Some(p95) = sample.p95_duration_ms {
                return p95;
            }
            if let Some(observed) = sample.duration_ms {
                return observed;
            }
        }

        match self.catalog.hook(hook_name) {
            Some(hook) => hook.timeout_ms * self.config.timeout_safety_factor,
            None => self.config.fallback_duration_ms,
        }
    }
}
