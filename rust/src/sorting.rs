//! Orderings over a phase graph.
//!
//! - [`topological_order`]: depth-first dependency order that drops hooks on
//!   cycles instead of failing
//! - [`NonCriticalKey`]: slack ascending, duration descending, name

use std::cmp::Ordering;

use crate::graph::PhaseGraph;
use crate::interner::HookId;
use crate::log_debug;
use crate::logging::{DiagnosticKind, Diagnostics};

/// Result of a cycle-tolerant topological sort.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopoOrder {
    /// Members in dependency order (dependencies first).
    pub order: Vec<HookId>,
    /// Members found on a cycle, in the order the sort finished them.
    pub excluded: Vec<HookId>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Depth-first topological sort of `members`, following only edges whose
/// endpoints are both members.
///
/// Roots are taken in the order given. When a back edge is found, every hook
/// on the cycle is reported in `excluded` rather than `order` and a warning
/// is recorded. Runs with an explicit stack, so deep chains cannot overflow.
pub fn topological_order(
    graph: &PhaseGraph,
    members: &[HookId],
    diagnostics: &mut Diagnostics,
) -> TopoOrder {
    let n = graph.len();
    let mut is_member = vec![false; n];
    for &id in members {
        is_member[id as usize] = true;
    }

    let mut marks = vec![Mark::Unvisited; n];
    let mut on_cycle = vec![false; n];
    let mut result = TopoOrder {
        order: Vec::with_capacity(members.len()),
        excluded: Vec::new(),
    };
    // (hook, index of next dependency to inspect)
    let mut stack: Vec<(HookId, usize)> = Vec::new();

    for &root in members {
        if marks[root as usize] != Mark::Unvisited {
            continue;
        }
        marks[root as usize] = Mark::Visiting;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let Some(&dep) = graph.deps[node as usize].get(frame.1) else {
                stack.pop();
                marks[node as usize] = Mark::Done;
                if on_cycle[node as usize] {
                    result.excluded.push(node);
                } else {
                    result.order.push(node);
                }
                continue;
            };
            frame.1 += 1;

            if !is_member[dep as usize] {
                continue;
            }
            match marks[dep as usize] {
                Mark::Unvisited => {
                    marks[dep as usize] = Mark::Visiting;
                    stack.push((dep, 0));
                }
                Mark::Visiting => {
                    diagnostics.warn(
                        DiagnosticKind::OrderingCycle,
                        Some(graph.name(dep)),
                        format!(
                            "Circular dependency: '{}' depends on '{}' which is still being ordered; \
                             dropping the cycle from the ordering",
                            graph.name(node),
                            graph.name(dep)
                        ),
                    );
                    for &(id, _) in stack.iter().rev() {
                        on_cycle[id as usize] = true;
                        if id == dep {
                            break;
                        }
                    }
                }
                Mark::Done => {}
            }
        }
    }

    log_debug!(
        diagnostics.verbosity(),
        "topological order: {} ordered, {} excluded",
        result.order.len(),
        result.excluded.len()
    );

    result
}

/// Compare f64 values for sorting, treating NaN as equal.
fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Priority key for non-critical hooks: least slack first, then longest
/// duration, then name for a stable result.
#[derive(Debug, Clone, PartialEq)]
pub struct NonCriticalKey<'a> {
    pub slack: f64,
    pub duration: f64,
    pub name: &'a str,
    pub id: HookId,
}

impl Eq for NonCriticalKey<'_> {}

impl Ord for NonCriticalKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_f64(self.slack, other.slack)
            .then(cmp_f64(other.duration, self.duration))
            .then(self.name.cmp(other.name))
    }
}

impl PartialOrd for NonCriticalKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort hooks by [`NonCriticalKey`] using the given slack values.
pub fn sort_non_critical(graph: &PhaseGraph, ids: &[HookId], slack: &[f64]) -> Vec<HookId> {
    let mut keys: Vec<NonCriticalKey<'_>> = ids
        .iter()
        .map(|&id| NonCriticalKey {
            slack: slack[id as usize],
            duration: graph.duration(id),
            name: graph.name(id),
            id,
        })
        .collect();
    keys.sort();
    keys.into_iter().map(|k| k.id).collect()
}
