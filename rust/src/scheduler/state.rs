//! Emission state for round-based order scheduling.

use crate::graph::PhaseGraph;
use crate::interner::HookId;

/// Hooks emitted so far, in order, with O(1) membership.
#[derive(Clone, Debug)]
pub struct OrderState {
    /// `emitted[id]` is true once the hook is in `order`.
    pub emitted: Vec<bool>,
    /// Emitted hooks in emission order.
    pub order: Vec<HookId>,
}

impl OrderState {
    pub fn new(hook_count: usize) -> Self {
        Self {
            emitted: vec![false; hook_count],
            order: Vec::with_capacity(hook_count),
        }
    }

    /// True when every in-phase dependency of `id` has been emitted.
    pub fn is_ready(&self, graph: &PhaseGraph, id: HookId) -> bool {
        graph.deps[id as usize]
            .iter()
            .all(|&dep| self.emitted[dep as usize])
    }

    pub fn emit(&mut self, id: HookId) {
        self.emitted[id as usize] = true;
        self.order.push(id);
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
