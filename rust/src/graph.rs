//! Phase graph construction.

use std::collections::BTreeMap;

use crate::estimator::DurationEstimator;
use crate::interner::{HookId, HookIndex};
use crate::models::{HookCatalog, HookMetrics};

/// Dependency graph of the hooks in one phase.
///
/// All per-hook data is indexed by [`HookId`]; IDs follow manifest order.
/// Edges to hooks in other phases, or to hooks the manifest does not
/// declare, are dropped: phases run sequentially relative to each other.
#[derive(Clone, Debug, Default)]
pub struct PhaseGraph {
    pub phase: String,
    pub index: HookIndex,
    pub durations: Vec<f64>,
    /// In-phase dependencies, in declaration order.
    pub deps: Vec<Vec<HookId>>,
    /// In-phase dependents, in manifest order.
    pub dependents: Vec<Vec<HookId>>,
}

impl PhaseGraph {
    pub fn build(phase: &str, catalog: &HookCatalog, estimator: &DurationEstimator<'_>) -> Self {
        let members: Vec<_> = catalog.hooks_in_phase(phase).collect();
        let n = members.len();

        let mut index = HookIndex::with_capacity(n);
        for hook in &members {
            index.intern(&hook.name);
        }

        let mut durations = Vec::with_capacity(n);
        let mut deps: Vec<Vec<HookId>> = vec![Vec::new(); n];
        let mut dependents: Vec<Vec<HookId>> = vec![Vec::new(); n];

        for (idx, hook) in members.iter().enumerate() {
            durations.push(estimator.estimate(&hook.name));
            for dep_name in &hook.depends_on {
                if let Some(dep) = index.get(dep_name) {
                    if !deps[idx].contains(&dep) {
                        deps[idx].push(dep);
                    }
                }
            }
        }

        for id in index.ids() {
            for &dep in &deps[id as usize] {
                dependents[dep as usize].push(id);
            }
        }

        Self {
            phase: phase.to_string(),
            index,
            durations,
            deps,
            dependents,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn name(&self, id: HookId) -> &str {
        self.index.name(id)
    }

    #[inline]
    pub fn duration(&self, id: HookId) -> f64 {
        self.durations[id as usize]
    }

    pub fn ids(&self) -> impl Iterator<Item = HookId> {
        self.index.ids()
    }

    fn names_of(&self, ids: &[HookId]) -> Vec<String> {
        ids.iter().map(|&id| self.name(id).to_string()).collect()
    }

    /// One metrics record per hook, with timing fields left at zero.
    pub fn metrics(&self) -> BTreeMap<String, HookMetrics> {
        self.ids()
            .map(|id| {
                let idx = id as usize;
                let name = self.name(id).to_string();
                let record = HookMetrics {
                    name: name.clone(),
                    phase: self.phase.clone(),
                    duration_ms: self.durations[idx],
                    dependencies: self.names_of(&self.deps[idx]),
                    dependents: self.names_of(&self.dependents[idx]),
                    ..HookMetrics::default()
                };
                (name, record)
            })
            .collect()
    }
}
