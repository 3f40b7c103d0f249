//! Critical path calculation using forward and backward passes.

use crate::graph::PhaseGraph;
use crate::interner::HookId;
use crate::logging::{DiagnosticKind, Diagnostics};
use crate::sorting::topological_order;
use crate::{log_changes, log_debug};

use super::types::{CriticalPathResult, HookTiming};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    Visiting,
    Done,
}

/// Memoized depth-first fold over `adjacency`.
///
/// Each hook's value is `finish(hook, acc)` where `acc` folds `combine` over
/// the values of its neighbours, starting from `seed`. Every hook is finished
/// exactly once, so a pass is O(n + m). A neighbour that is still on the
/// stack closes a cycle: `on_cycle` is called and the neighbour's current
/// value in `values` is used as-is.
fn fold_depth_first<C, F, W>(
    adjacency: &[Vec<HookId>],
    values: &mut [f64],
    seed: f64,
    mut combine: C,
    mut finish: F,
    mut on_cycle: W,
) where
    C: FnMut(f64, f64, HookId) -> f64,
    F: FnMut(HookId, f64) -> f64,
    W: FnMut(HookId, HookId),
{
    let n = adjacency.len();
    let mut visits = vec![Visit::Unvisited; n];
    // (hook, next neighbour index, accumulator)
    let mut stack: Vec<(HookId, usize, f64)> = Vec::new();

    for root in 0..n as HookId {
        if visits[root as usize] != Visit::Unvisited {
            continue;
        }
        visits[root as usize] = Visit::Visiting;
        stack.push((root, 0, seed));

        while let Some(frame) = stack.last_mut() {
            let (node, next, acc) = *frame;
            let Some(&neighbour) = adjacency[node as usize].get(next) else {
                values[node as usize] = finish(node, acc);
                visits[node as usize] = Visit::Done;
                stack.pop();
                continue;
            };

            match visits[neighbour as usize] {
                Visit::Unvisited => {
                    // Revisited as Done once the neighbour is finished
                    visits[neighbour as usize] = Visit::Visiting;
                    stack.push((neighbour, 0, seed));
                }
                Visit::Visiting => {
                    on_cycle(node, neighbour);
                    frame.1 += 1;
                    frame.2 = combine(acc, values[neighbour as usize], neighbour);
                }
                Visit::Done => {
                    frame.1 += 1;
                    frame.2 = combine(acc, values[neighbour as usize], neighbour);
                }
            }
        }
    }
}

/// Forward pass: earliest start for every hook.
///
/// A hook without in-phase dependencies starts at 0; otherwise at the
/// latest `earliest_start + duration` among its dependencies.
pub fn forward_pass(graph: &PhaseGraph, diagnostics: &mut Diagnostics) -> Vec<f64> {
    let mut earliest = vec![0.0; graph.len()];

    fold_depth_first(
        &graph.deps,
        &mut earliest,
        0.0,
        |acc, dep_start, dep| acc.max(dep_start + graph.duration(dep)),
        |_, acc| acc,
        |node, dep| {
            diagnostics.warn(
                DiagnosticKind::ForwardCycle,
                Some(graph.name(dep)),
                format!(
                    "Circular dependency between '{}' and '{}'; using current earliest start",
                    graph.name(node),
                    graph.name(dep)
                ),
            );
        },
    );

    earliest
}

/// Backward pass: latest start for every hook.
///
/// A hook without in-phase dependents must finish by `project_end`;
/// otherwise before the earliest latest-start among its dependents.
pub fn backward_pass(
    graph: &PhaseGraph,
    project_end: f64,
    diagnostics: &mut Diagnostics,
) -> Vec<f64> {
    // Seeded with the unconstrained value, which is what a cyclic
    // dependent contributes
    let mut latest: Vec<f64> = graph
        .ids()
        .map(|id| project_end - graph.duration(id))
        .collect();

    fold_depth_first(
        &graph.dependents,
        &mut latest,
        f64::INFINITY,
        |acc, dependent_start, _| acc.min(dependent_start),
        |node, acc| {
            let finish_by = if graph.dependents[node as usize].is_empty() {
                project_end
            } else {
                acc
            };
            finish_by - graph.duration(node)
        },
        |node, dependent| {
            diagnostics.warn(
                DiagnosticKind::BackwardCycle,
                Some(graph.name(dependent)),
                format!(
                    "Circular dependency between '{}' and '{}'; using unconstrained latest start",
                    graph.name(node),
                    graph.name(dependent)
                ),
            );
        },
    );

    latest
}

/// Ratio by which the phase could shrink if positive slack were removed.
///
/// `project_end / (project_end - total_positive_slack)`, exactly 1.0 when
/// nothing has slack. When the slack reaches or exceeds the project length
/// the ratio is undefined and the hook count is returned instead.
pub fn speedup_potential(project_end: f64, total_positive_slack: f64, hook_count: usize) -> f64 {
    if total_positive_slack <= 0.0 {
        return 1.0;
    }
    let remaining = project_end - total_positive_slack;
    if remaining <= 0.0 {
        return (hook_count as f64).max(1.0);
    }
    project_end / remaining
}

/// Calculate timing, slack and the ordered critical path for a phase.
///
/// Never fails: cycles are reported through `diagnostics` and handled
/// fail-soft.
pub fn calculate_critical_path(
    graph: &PhaseGraph,
    diagnostics: &mut Diagnostics,
) -> CriticalPathResult {
    if graph.is_empty() {
        return CriticalPathResult::default();
    }

    let earliest = forward_pass(graph, diagnostics);
    let project_end = graph
        .ids()
        .map(|id| earliest[id as usize] + graph.duration(id))
        .fold(0.0, f64::max);

    let latest = backward_pass(graph, project_end, diagnostics);

    let timings: Vec<HookTiming> = graph
        .ids()
        .map(|id| {
            let idx = id as usize;
            let duration = graph.duration(id);
            HookTiming {
                earliest_start: earliest[idx],
                earliest_finish: earliest[idx] + duration,
                latest_start: latest[idx],
                latest_finish: latest[idx] + duration,
                slack: latest[idx] - earliest[idx],
            }
        })
        .collect();

    for id in graph.ids() {
        let t = &timings[id as usize];
        log_debug!(
            diagnostics.verbosity(),
            "  {}: es={} ls={} slack={}",
            graph.name(id),
            t.earliest_start,
            t.latest_start,
            t.slack
        );
    }

    let total_positive_slack: f64 = timings
        .iter()
        .filter(|t| t.has_slack())
        .map(|t| t.slack)
        .sum();

    let critical: Vec<HookId> = graph
        .ids()
        .filter(|&id| timings[id as usize].is_critical())
        .collect();
    let topo = topological_order(graph, &critical, diagnostics);

    let speedup = speedup_potential(project_end, total_positive_slack, graph.len());

    log_changes!(
        diagnostics.verbosity(),
        "phase '{}': length={} critical={} speedup={:.3}",
        graph.phase,
        project_end,
        topo.order.len(),
        speedup
    );

    CriticalPathResult {
        timings,
        critical_path_length: project_end,
        critical_path: topo.order,
        excluded: topo.excluded,
        total_positive_slack,
        speedup_potential: speedup,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::estimator::DurationEstimator;
    use crate::models::{HistoricalSample, Hook, HookCatalog};
    use rustc_hash::FxHashMap;

    fn make_graph(hooks: &[(&str, f64, &[&str])]) -> PhaseGraph {
        let mut samples = FxHashMap::default();
        let mut manifest = Vec::new();
        for &(name, duration, deps) in hooks {
            manifest.push(Hook::new(name, "p", deps, 3000.0));
            samples.insert(
                name.to_string(),
                HistoricalSample {
                    duration_ms: Some(duration),
                    p95_duration_ms: None,
                },
            );
        }
        let catalog = HookCatalog::new(manifest, samples);
        let config = AnalyzerConfig::default();
        let estimator = DurationEstimator::new(&catalog, &config);
        PhaseGraph::build("p", &catalog, &estimator)
    }

    fn critical_names(graph: &PhaseGraph, result: &CriticalPathResult) -> Vec<String> {
        result
            .critical_path
            .iter()
            .map(|&id| graph.name(id).to_string())
            .collect()
    }

    fn timing<'a>(graph: &PhaseGraph, result: &'a CriticalPathResult, name: &str) -> &'a HookTiming {
        result.timing(graph.index.get(name).unwrap())
    }

    #[test]
    fn test_linear_chain() {
        let graph = make_graph(&[("a", 10.0, &[]), ("b", 5.0, &["a"])]);
        let mut diag = Diagnostics::new("p", 0);

        let result = calculate_critical_path(&graph, &mut diag);

        assert_eq!(timing(&graph, &result, "a").earliest_start, 0.0);
        assert_eq!(timing(&graph, &result, "b").earliest_start, 10.0);
        assert_eq!(result.critical_path_length, 15.0);
        assert_eq!(critical_names(&graph, &result), vec!["a", "b"]);
        assert_eq!(result.speedup_potential, 1.0);
        assert!(diag.records().is_empty());
    }

    #[test]
    fn test_independent_hooks() {
        let graph = make_graph(&[("a", 100.0, &[]), ("b", 200.0, &[]), ("c", 300.0, &[])]);
        let mut diag = Diagnostics::new("p", 0);

        let result = calculate_critical_path(&graph, &mut diag);

        assert_eq!(critical_names(&graph, &result), vec!["c"]);
        assert!((timing(&graph, &result, "a").slack - 200.0).abs() < 1e-9);
        assert!((timing(&graph, &result, "b").slack - 100.0).abs() < 1e-9);
        assert!((result.total_positive_slack - 300.0).abs() < 1e-9);
        // Slack equals the project length: falls back to the hook count
        assert_eq!(result.speedup_potential, 3.0);
    }

    #[test]
    fn test_speedup_can_exceed_hook_count() {
        let graph = make_graph(&[("a", 100.0, &[]), ("b", 60.0, &[]), ("c", 60.0, &[])]);
        let mut diag = Diagnostics::new("p", 0);

        let result = calculate_critical_path(&graph, &mut diag);

        // end 100, slack 40 + 40: 100 / 20
        assert!((result.total_positive_slack - 80.0).abs() < 1e-9);
        assert!((result.speedup_potential - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_diamond() {
        let graph = make_graph(&[
            ("a", 10.0, &[]),
            ("b", 5.0, &["a"]),
            ("c", 20.0, &["a"]),
            ("d", 5.0, &["b", "c"]),
        ]);
        let mut diag = Diagnostics::new("p", 0);

        let result = calculate_critical_path(&graph, &mut diag);

        assert_eq!(result.critical_path_length, 35.0);
        assert_eq!(critical_names(&graph, &result), vec!["a", "c", "d"]);

        let b = timing(&graph, &result, "b");
        assert_eq!(b.earliest_start, 10.0);
        assert_eq!(b.latest_start, 25.0);
        assert!((b.slack - 15.0).abs() < 1e-9);
        assert_eq!(timing(&graph, &result, "d").earliest_start, 30.0);
        assert_eq!(timing(&graph, &result, "d").latest_start, 30.0);
        assert!(timing(&graph, &result, "c").is_critical());

        // 35 / (35 - 15)
        assert!((result.speedup_potential - 1.75).abs() < 1e-9);
    }

    #[test]
    fn test_slack_never_negative_and_path_sums_to_length() {
        let graph = make_graph(&[
            ("checkout", 4.0, &[]),
            ("deps", 30.0, &["checkout"]),
            ("fmt", 3.0, &["checkout"]),
            ("lint", 12.0, &["deps", "fmt"]),
            ("typecheck", 25.0, &["deps"]),
            ("unit", 40.0, &["deps"]),
            ("docs", 8.0, &[]),
            ("report", 2.0, &["lint", "typecheck", "unit"]),
        ]);
        let mut diag = Diagnostics::new("p", 0);

        let result = calculate_critical_path(&graph, &mut diag);

        for t in &result.timings {
            assert!(t.slack >= -1e-9);
            assert!((t.slack - (t.latest_start - t.earliest_start)).abs() < 1e-9);
        }
        let path_sum: f64 = result
            .critical_path
            .iter()
            .map(|&id| graph.duration(id))
            .sum();
        assert_eq!(critical_names(&graph, &result), vec!["checkout", "deps", "unit", "report"]);
        assert!((path_sum - result.critical_path_length).abs() < 1e-9);
        let max_finish = result
            .timings
            .iter()
            .map(|t| t.earliest_finish)
            .fold(0.0, f64::max);
        assert_eq!(result.critical_path_length, max_finish);
    }

    #[test]
    fn test_empty_graph() {
        let graph = make_graph(&[]);
        let mut diag = Diagnostics::new("p", 0);
        let result = calculate_critical_path(&graph, &mut diag);
        assert!(result.critical_path.is_empty());
        assert_eq!(result.critical_path_length, 0.0);
    }

    #[test]
    fn test_cycle_is_fail_soft() {
        // a <-> b, c independent
        let graph = make_graph(&[("a", 10.0, &["b"]), ("b", 20.0, &["a"]), ("c", 5.0, &[])]);
        let mut diag = Diagnostics::new("p", 0);

        let result = calculate_critical_path(&graph, &mut diag);

        assert_eq!(diag.count(DiagnosticKind::ForwardCycle), 1);
        assert_eq!(diag.count(DiagnosticKind::BackwardCycle), 1);
        assert_eq!(result.timings.len(), 3);
        assert!(result.critical_path_length.is_finite());
        assert!(result.speedup_potential >= 1.0);
        // es: a=30 b=10 c=0, end=40; ls: b=10 via stale a, a=0, c=35
        assert_eq!(critical_names(&graph, &result), vec!["b"]);
        assert!((timing(&graph, &result, "c").slack - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_forward_pass_uses_stale_value_on_cycle() {
        // a depends on b, b depends on a: visiting a first, b sees a still
        // in progress with earliest start 0 and waits for its duration
        let graph = make_graph(&[("a", 10.0, &["b"]), ("b", 20.0, &["a"])]);
        let mut diag = Diagnostics::new("p", 0);

        let earliest = forward_pass(&graph, &mut diag);

        assert_eq!(earliest[1], 10.0);
        assert_eq!(earliest[0], 30.0);
    }

    #[test]
    fn test_speedup_potential_guards() {
        assert_eq!(speedup_potential(100.0, 0.0, 4), 1.0);
        assert!((speedup_potential(100.0, 50.0, 4) - 2.0).abs() < 1e-9);
        assert_eq!(speedup_potential(100.0, 100.0, 4), 4.0);
        assert!((speedup_potential(100.0, 99.0, 4) - 100.0).abs() < 1e-9);
        assert!((speedup_potential(100.0, 90.0, 2) - 10.0).abs() < 1e-9);
        assert_eq!(speedup_potential(100.0, 150.0, 4), 4.0);
        assert_eq!(speedup_potential(0.0, 0.0, 0), 1.0);
    }
}
