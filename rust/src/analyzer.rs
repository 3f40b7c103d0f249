//! Phase performance analysis.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::config::AnalyzerConfig;
use crate::critical_path::{calculate_critical_path, CriticalPathResult};
use crate::estimator::DurationEstimator;
use crate::graph::PhaseGraph;
use crate::interner::HookId;
use crate::logging::{DiagnosticKind, Diagnostics};
use crate::models::{
    ExcludedHook, HookCatalog, OptimizationCandidate, PhaseAnalysisResult,
};
use crate::scheduler::{suggest_order, OrderPlan, Placement};

/// Analyzes hook phases against a shared, immutable catalog.
///
/// Each call builds its own graph and diagnostics, so one analyzer can serve
/// concurrent callers.
#[derive(Clone, Debug)]
pub struct HookAnalyzer {
    catalog: Arc<HookCatalog>,
    config: AnalyzerConfig,
}

impl HookAnalyzer {
    pub fn new(catalog: Arc<HookCatalog>, config: AnalyzerConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &Arc<HookCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Swap in refreshed inputs. Analyses already holding the old catalog
    /// finish against it.
    pub fn replace_catalog(&mut self, catalog: Arc<HookCatalog>) -> Arc<HookCatalog> {
        std::mem::replace(&mut self.catalog, catalog)
    }

    /// Build the phase graph with durations resolved for every hook.
    pub fn build_graph(&self, phase: &str) -> PhaseGraph {
        let estimator = DurationEstimator::new(&self.catalog, &self.config);
        PhaseGraph::build(phase, &self.catalog, &estimator)
    }

    /// Analyze one phase. Never fails; problems are reported in `warnings`,
    /// starting with those found while loading the catalog.
    pub fn analyze_phase(&self, phase: &str) -> PhaseAnalysisResult {
        let mut diagnostics = Diagnostics::new(phase, self.config.verbosity);
        diagnostics.carry(self.catalog.warnings());
        let graph = self.build_graph(phase);

        if graph.is_empty() {
            diagnostics.warn(
                DiagnosticKind::EmptyPhase,
                None,
                format!("No hooks found for phase '{}'", phase),
            );
            return PhaseAnalysisResult::empty(phase, diagnostics.into_records());
        }

        let timing = calculate_critical_path(&graph, &mut diagnostics);
        let plan = suggest_order(&graph, &timing, &mut diagnostics);

        self.summarize(&graph, &timing, &plan, diagnostics)
    }

    /// Analyze every phase in the catalog, in sorted phase order.
    pub fn analyze_all_phases(&self) -> Vec<PhaseAnalysisResult> {
        self.catalog
            .phases()
            .iter()
            .map(|phase| self.analyze_phase(phase))
            .collect()
    }

    fn summarize(
        &self,
        graph: &PhaseGraph,
        timing: &CriticalPathResult,
        plan: &OrderPlan,
        diagnostics: Diagnostics,
    ) -> PhaseAnalysisResult {
        let names = |ids: &[HookId]| -> Vec<String> {
            ids.iter().map(|&id| graph.name(id).to_string()).collect()
        };

        let mut hook_metrics = graph.metrics();
        for id in graph.ids() {
            let t = timing.timing(id);
            if let Some(record) = hook_metrics.get_mut(graph.name(id)) {
                record.earliest_start = t.earliest_start;
                record.earliest_finish = t.earliest_finish;
                record.latest_start = t.latest_start;
                record.latest_finish = t.latest_finish;
                record.slack = t.slack;
                record.on_critical_path = t.is_critical();
            }
        }

        let parallelizable_count = timing.timings.iter().filter(|t| t.has_slack()).count();

        PhaseAnalysisResult {
            phase: graph.phase.clone(),
            critical_path: names(&timing.critical_path),
            critical_path_length: timing.critical_path_length,
            total_hooks: graph.len(),
            critical_hooks: timing.critical_path.len(),
            speedup_potential: timing.speedup_potential,
            optimal_order: names(&plan.order),
            parallelizable_count,
            optimization_candidates: self.optimization_candidates(graph, timing),
            excluded: plan
                .placements(graph.len())
                .into_iter()
                .zip(graph.ids())
                .filter_map(|(placement, id)| match placement {
                    Placement::Excluded(reason) => Some(ExcludedHook {
                        name: graph.name(id).to_string(),
                        reason,
                    }),
                    Placement::Scheduled(_) => None,
                })
                .collect(),
            forced_order: names(&plan.forced),
            hook_metrics,
            warnings: diagnostics.into_records(),
        }
    }

    /// Longest non-critical hooks with positive slack: shortening them can
    /// never lengthen the phase.
    fn optimization_candidates(
        &self,
        graph: &PhaseGraph,
        timing: &CriticalPathResult,
    ) -> Vec<OptimizationCandidate> {
        let mut candidates: Vec<OptimizationCandidate> = graph
            .ids()
            .filter(|&id| timing.timing(id).has_slack())
            .map(|id| OptimizationCandidate {
                name: graph.name(id).to_string(),
                duration_ms: graph.duration(id),
                slack_ms: timing.timing(id).slack,
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.duration_ms
                .partial_cmp(&a.duration_ms)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        candidates.truncate(self.config.max_optimization_candidates);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistoricalSample, Hook};
    use rustc_hash::FxHashMap;

    fn make_analyzer(hooks: &[(&str, &str, f64, &[&str])]) -> HookAnalyzer {
        let mut samples = FxHashMap::default();
        let mut manifest = Vec::new();
        for &(name, phase, duration, deps) in hooks {
            manifest.push(Hook::new(name, phase, deps, 3000.0));
            samples.insert(
                name.to_string(),
                HistoricalSample {
                    duration_ms: None,
                    p95_duration_ms: Some(duration),
                },
            );
        }
        HookAnalyzer::new(
            Arc::new(HookCatalog::new(manifest, samples)),
            AnalyzerConfig::default(),
        )
    }

    #[test]
    fn test_linear_chain() {
        let analyzer = make_analyzer(&[("a", "p", 10.0, &[]), ("b", "p", 5.0, &["a"])]);

        let result = analyzer.analyze_phase("p");

        assert_eq!(result.hook_metrics["a"].earliest_start, 0.0);
        assert_eq!(result.hook_metrics["b"].earliest_start, 10.0);
        assert_eq!(result.critical_path_length, 15.0);
        assert_eq!(result.critical_path, vec!["a", "b"]);
        assert_eq!(result.speedup_potential, 1.0);
        assert_eq!(result.parallelizable_count, 0);
        assert!(result.optimization_candidates.is_empty());
    }

    #[test]
    fn test_independent_hooks() {
        let analyzer = make_analyzer(&[
            ("a", "p", 100.0, &[]),
            ("b", "p", 200.0, &[]),
            ("c", "p", 300.0, &[]),
        ]);

        let result = analyzer.analyze_phase("p");

        assert_eq!(result.critical_path, vec!["c"]);
        assert!((result.hook_metrics["a"].slack - 200.0).abs() < 1e-9);
        assert!((result.hook_metrics["b"].slack - 100.0).abs() < 1e-9);
        assert_eq!(result.parallelizable_count, 2);
        assert_eq!(result.critical_hooks, 1);
        assert_eq!(result.total_hooks, 3);
        let candidates: Vec<&str> = result
            .optimization_candidates
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(candidates, vec!["b", "a"]);
    }

    #[test]
    fn test_diamond() {
        let analyzer = make_analyzer(&[
            ("a", "p", 10.0, &[]),
            ("b", "p", 5.0, &["a"]),
            ("c", "p", 20.0, &["a"]),
            ("d", "p", 5.0, &["b", "c"]),
        ]);

        let result = analyzer.analyze_phase("p");

        assert_eq!(result.critical_path_length, 35.0);
        assert_eq!(result.critical_path, vec!["a", "c", "d"]);
        assert_eq!(result.hook_metrics["b"].latest_start, 25.0);
        assert!((result.hook_metrics["b"].slack - 15.0).abs() < 1e-9);
        assert!(result.hook_metrics["c"].on_critical_path);
        assert!(!result.hook_metrics["b"].on_critical_path);
        assert_eq!(result.hook_metrics["d"].dependencies, vec!["b", "c"]);
        assert_eq!(result.hook_metrics["a"].dependents, vec!["b", "c"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unknown_phase() {
        let analyzer = make_analyzer(&[("a", "p", 10.0, &[])]);

        let result = analyzer.analyze_phase("missing");

        assert_eq!(result.phase, "missing");
        assert_eq!(result.total_hooks, 0);
        assert!(result.critical_path.is_empty());
        assert_eq!(result.speedup_potential, 0.0);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, DiagnosticKind::EmptyPhase);
    }

    #[test]
    fn test_candidates_capped_and_ranked_by_duration() {
        let mut hooks: Vec<(String, f64)> = (1..=8)
            .map(|i| (format!("h{}", i), i as f64 * 10.0))
            .collect();
        hooks.push(("anchor".to_string(), 1000.0));
        let entries: Vec<(&str, &str, f64, &[&str])> = hooks
            .iter()
            .map(|(name, duration)| (name.as_str(), "p", *duration, &[][..]))
            .collect();
        let analyzer = make_analyzer(&entries);

        let result = analyzer.analyze_phase("p");

        let candidates: Vec<&str> = result
            .optimization_candidates
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(candidates, vec!["h8", "h7", "h6", "h5", "h4"]);
        assert_eq!(result.parallelizable_count, 8);
    }

    #[test]
    fn test_all_phases_sorted() {
        let analyzer = make_analyzer(&[
            ("push_tests", "pre-push", 10.0, &[]),
            ("fmt", "pre-commit", 1.0, &[]),
        ]);

        let phases: Vec<String> = analyzer
            .analyze_all_phases()
            .into_iter()
            .map(|r| r.phase)
            .collect();

        assert_eq!(phases, vec!["pre-commit", "pre-push"]);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let analyzer = make_analyzer(&[
            ("a", "p", 10.0, &[]),
            ("b", "p", 5.0, &["a"]),
            ("c", "p", 20.0, &["a"]),
            ("d", "p", 5.0, &["b", "c"]),
            ("x", "p", 3.0, &["y"]),
            ("y", "p", 3.0, &["x"]),
        ]);

        let first = analyzer.analyze_phase("p");
        let second = analyzer.analyze_phase("p");

        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn test_concurrent_analyses_share_catalog() {
        let analyzer = make_analyzer(&[
            ("a", "p", 10.0, &[]),
            ("b", "p", 5.0, &["a"]),
            ("x", "q", 3.0, &["y"]),
            ("y", "q", 3.0, &["x"]),
        ]);
        let expected_p = analyzer.analyze_phase("p");
        let expected_q = analyzer.analyze_phase("q");

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let analyzer = &analyzer;
                    s.spawn(move || analyzer.analyze_phase(if i % 2 == 0 { "p" } else { "q" }))
                })
                .collect();
            for (i, handle) in handles.into_iter().enumerate() {
                let result = handle.join().unwrap();
                let expected = if i % 2 == 0 { &expected_p } else { &expected_q };
                assert_eq!(&result, expected);
            }
        });
    }

    #[test]
    fn test_catalog_warnings_lead_every_report() {
        let manifest = r#"{"hooks": [
            {"name": "a", "phase": "p", "timeout": 1000},
            {"name": "a", "phase": "p", "timeout": 5000},
            {"phase": "p", "timeout": 1000},
            {"name": "x", "phase": "p", "dependsOn": ["y"]},
            {"name": "y", "phase": "p", "dependsOn": ["x"]}
        ]}"#;
        let config = AnalyzerConfig::default();
        let catalog = crate::loader::catalog_from_json(manifest, None, &config);
        let analyzer = HookAnalyzer::new(Arc::new(catalog), config);

        let result = analyzer.analyze_phase("p");

        let kinds: Vec<DiagnosticKind> = result.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds[0], DiagnosticKind::InvalidHook);
        assert_eq!(kinds[1], DiagnosticKind::DuplicateHook);
        assert_eq!(result.warnings[1].hook.as_deref(), Some("a"));
        assert!(kinds.contains(&DiagnosticKind::ForwardCycle));
        assert_eq!(result.total_hooks, 3);

        let missing = analyzer.analyze_phase("missing");
        let kinds: Vec<DiagnosticKind> = missing.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::InvalidHook,
                DiagnosticKind::DuplicateHook,
                DiagnosticKind::EmptyPhase
            ]
        );
    }

    #[test]
    fn test_cycle_members_reported_as_excluded() {
        // Zero-duration cycle: both members are critical and cannot be ordered
        let analyzer = make_analyzer(&[("a", "p", 0.0, &["b"]), ("b", "p", 0.0, &["a"])]);

        let result = analyzer.analyze_phase("p");

        let excluded: Vec<&str> = result.excluded.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(excluded, vec!["a", "b"]);
        assert!(result
            .excluded
            .iter()
            .all(|e| e.reason == crate::models::ExclusionReason::Cycle));
        assert!(result.optimal_order.is_empty());
        assert_eq!(result.total_hooks, 2);
    }

    #[test]
    fn test_replace_catalog() {
        let mut analyzer = make_analyzer(&[("a", "p", 10.0, &[])]);
        let old = analyzer.replace_catalog(Arc::new(HookCatalog::empty()));

        assert_eq!(old.len(), 1);
        assert_eq!(analyzer.analyze_phase("p").total_hooks, 0);
    }
}
