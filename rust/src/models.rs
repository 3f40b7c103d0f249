//! Core data types for hook phase analysis.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::logging::{Diagnostic, DiagnosticKind};

/// A hook declared in the manifest, validated at load time.
#[derive(Clone, Debug, PartialEq)]
pub struct Hook {
    pub name: String,
    pub phase: String,
    /// Declared dependencies, possibly in other phases or unknown.
    pub depends_on: Vec<String>,
    pub timeout_ms: f64,
}

impl Hook {
    pub fn new(name: &str, phase: &str, depends_on: &[&str], timeout_ms: f64) -> Self {
        Self {
            name: name.to_string(),
            phase: phase.to_string(),
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
            timeout_ms,
        }
    }
}

/// Observed timings for a hook from previous runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoricalSample {
    pub duration_ms: Option<f64>,
    pub p95_duration_ms: Option<f64>,
}

/// Immutable manifest and metrics tables shared by all analyses.
///
/// Refresh by building a new catalog and swapping it in; never mutate one
/// that is being read.
#[derive(Clone, Debug, Default)]
pub struct HookCatalog {
    hooks: Vec<Hook>,
    by_name: FxHashMap<String, usize>,
    samples: FxHashMap<String, HistoricalSample>,
    warnings: Vec<Diagnostic>,
}

impl HookCatalog {
    /// Build a catalog. Later declarations of an already-seen name are dropped.
    pub fn new(hooks: Vec<Hook>, samples: FxHashMap<String, HistoricalSample>) -> Self {
        let mut catalog = Self {
            hooks: Vec::with_capacity(hooks.len()),
            by_name: FxHashMap::with_capacity_and_hasher(hooks.len(), Default::default()),
            samples,
            warnings: Vec::new(),
        };

        for hook in hooks {
            if catalog.by_name.contains_key(&hook.name) {
                let message = format!(
                    "Duplicate hook '{}' in phase '{}' ignored; keeping first declaration",
                    hook.name, hook.phase
                );
                tracing::warn!(hook = %hook.name, "{}", message);
                catalog.warnings.push(Diagnostic {
                    kind: DiagnosticKind::DuplicateHook,
                    hook: Some(hook.name),
                    message,
                });
                continue;
            }
            catalog.by_name.insert(hook.name.clone(), catalog.hooks.len());
            catalog.hooks.push(hook);
        }

        catalog
    }

    /// Attach warnings produced while loading the inputs.
    pub fn with_load_warnings(mut self, mut warnings: Vec<Diagnostic>) -> Self {
        warnings.append(&mut self.warnings);
        self.warnings = warnings;
        self
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn hook(&self, name: &str) -> Option<&Hook> {
        self.by_name.get(name).map(|&i| &self.hooks[i])
    }

    pub fn sample(&self, name: &str) -> Option<&HistoricalSample> {
        self.samples.get(name)
    }

    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    /// Hooks of one phase, in manifest order.
    pub fn hooks_in_phase<'a>(&'a self, phase: &'a str) -> impl Iterator<Item = &'a Hook> + 'a {
        self.hooks.iter().filter(move |h| h.phase == phase)
    }

    /// Distinct phase names, sorted.
    pub fn phases(&self) -> Vec<String> {
        let mut phases: Vec<String> = self.hooks.iter().map(|h| h.phase.clone()).collect();
        phases.sort();
        phases.dedup();
        phases
    }

    /// Problems found while loading or indexing the inputs.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Per-hook timing record for one phase analysis.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HookMetrics {
    pub name: String,
    pub phase: String,
    pub duration_ms: f64,
    /// Dependencies restricted to the same phase.
    pub dependencies: Vec<String>,
    /// Reverse of `dependencies`, same phase only.
    pub dependents: Vec<String>,
    pub earliest_start: f64,
    pub earliest_finish: f64,
    pub latest_start: f64,
    pub latest_finish: f64,
    /// `latest_start - earliest_start`.
    pub slack: f64,
    pub on_critical_path: bool,
}

/// Why a hook is missing from an ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// The hook sits on a dependency cycle inside the phase.
    Cycle,
}

/// A hook dropped from an ordering, with the reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExcludedHook {
    pub name: String,
    pub reason: ExclusionReason,
}

/// A non-critical hook worth optimizing by hand.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimizationCandidate {
    pub name: String,
    pub duration_ms: f64,
    pub slack_ms: f64,
}

/// Analysis report for one phase.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PhaseAnalysisResult {
    pub phase: String,
    /// Critical hooks in dependency order.
    pub critical_path: Vec<String>,
    /// Total phase duration.
    pub critical_path_length: f64,
    pub total_hooks: usize,
    pub critical_hooks: usize,
    pub speedup_potential: f64,
    /// Suggested execution order.
    pub optimal_order: Vec<String>,
    /// Hooks with positive slack.
    pub parallelizable_count: usize,
    pub optimization_candidates: Vec<OptimizationCandidate>,
    /// Hooks the ordering dropped because they sit on a cycle.
    pub excluded: Vec<ExcludedHook>,
    /// Hooks appended to `optimal_order` without their dependencies satisfied.
    pub forced_order: Vec<String>,
    pub hook_metrics: BTreeMap<String, HookMetrics>,
    pub warnings: Vec<Diagnostic>,
}

impl PhaseAnalysisResult {
    /// Zero-valued report for a phase without hooks.
    pub fn empty(phase: &str, warnings: Vec<Diagnostic>) -> Self {
        Self {
            phase: phase.to_string(),
            speedup_potential: 0.0,
            warnings,
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
