//! Round-based interleaving of critical and non-critical hooks.

use crate::critical_path::CriticalPathResult;
use crate::graph::PhaseGraph;
use crate::interner::HookId;
use crate::logging::{DiagnosticKind, Diagnostics};
use crate::models::ExclusionReason;
use crate::sorting::sort_non_critical;
use crate::{log_changes, log_checks};

use super::state::OrderState;

/// Where a hook ended up in a suggested order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Position in [`OrderPlan::order`].
    Scheduled(usize),
    Excluded(ExclusionReason),
}

/// Suggested execution order for a phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderPlan {
    /// Every hook except `excluded`, dependencies first except for `forced`.
    pub order: Vec<HookId>,
    /// Critical hooks dropped because they sit on a cycle.
    pub excluded: Vec<HookId>,
    /// Tail of `order` appended after scheduling deadlocked.
    pub forced: Vec<HookId>,
}

impl OrderPlan {
    /// Placement of every hook, indexed by [`HookId`].
    pub fn placements(&self, hook_count: usize) -> Vec<Placement> {
        let mut placements = vec![Placement::Excluded(ExclusionReason::Cycle); hook_count];
        for (position, &id) in self.order.iter().enumerate() {
            placements[id as usize] = Placement::Scheduled(position);
        }
        placements
    }
}

/// Interleave critical and non-critical hooks into one feasible order.
///
/// Critical hooks keep the dependency order in `timing.critical_path`.
/// Non-critical hooks are prioritised by least slack, then longest duration.
/// Each round emits the first ready critical hook, then every ready
/// non-critical hook. A round that emits nothing can only happen with cyclic
/// input; the remaining hooks are then appended as they stand.
pub fn suggest_order(
    graph: &PhaseGraph,
    timing: &CriticalPathResult,
    diagnostics: &mut Diagnostics,
) -> OrderPlan {
    let verbosity = diagnostics.verbosity();
    let non_critical: Vec<HookId> = graph
        .ids()
        .filter(|&id| !timing.is_critical(id))
        .collect();

    let mut critical: Vec<HookId> = timing.critical_path.clone();
    let mut non_critical = sort_non_critical(graph, &non_critical, &timing.slack_vec());
    let mut state = OrderState::new(graph.len());
    let mut forced = Vec::new();
    let mut round = 0usize;

    while !critical.is_empty() || !non_critical.is_empty() {
        round += 1;
        let before = state.len();

        if let Some(pos) = critical.iter().position(|&id| state.is_ready(graph, id)) {
            let id = critical.remove(pos);
            log_checks!(verbosity, "round {}: critical '{}'", round, graph.name(id));
            state.emit(id);
        }

        let mut waiting = Vec::with_capacity(non_critical.len());
        for id in non_critical.drain(..) {
            if state.is_ready(graph, id) {
                log_checks!(verbosity, "round {}: non-critical '{}'", round, graph.name(id));
                state.emit(id);
            } else {
                waiting.push(id);
            }
        }
        non_critical = waiting;

        if state.len() == before {
            let stuck: Vec<&str> = critical
                .iter()
                .chain(non_critical.iter())
                .map(|&id| graph.name(id))
                .collect();
            diagnostics.warn(
                DiagnosticKind::SchedulingDeadlock,
                None,
                format!(
                    "No hook ready in round {}; appending {} remaining hooks unordered: {:?}",
                    round,
                    stuck.len(),
                    stuck
                ),
            );
            for id in critical.drain(..).chain(non_critical.drain(..)) {
                state.emit(id);
                forced.push(id);
            }
            break;
        }
    }

    log_changes!(
        verbosity,
        "phase '{}': ordered {} hooks in {} rounds ({} forced)",
        graph.phase,
        state.len(),
        round,
        forced.len()
    );

    OrderPlan {
        order: state.order,
        excluded: timing.excluded.clone(),
        forced,
    }
}
