//! Index-based hook identity.
//!
//! Every hook in a phase is assigned a dense integer ID so the graph passes
//! work on `Vec`s instead of name-keyed maps.

use rustc_hash::FxHashMap;

/// Dense hook ID within one phase graph.
pub type HookId = u32;

/// Bidirectional mapping between hook names and dense IDs.
///
/// IDs are handed out in insertion order, so iterating `0..len()` walks the
/// hooks in manifest order.
#[derive(Debug, Clone)]
pub struct HookIndex {
    to_id: FxHashMap<String, HookId>,
    names: Vec<String>,
}

impl HookIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_id: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            names: Vec::with_capacity(capacity),
        }
    }

    /// Intern a name, returning its ID. Re-interning returns the existing ID.
    pub fn intern(&mut self, name: &str) -> HookId {
        if let Some(&id) = self.to_id.get(name) {
            return id;
        }
        let id = self.names.len() as HookId;
        self.names.push(name.to_string());
        self.to_id.insert(name.to_string(), id);
        id
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<HookId> {
        self.to_id.get(name).copied()
    }

    /// Name for an ID. IDs always come from this index, so indexing is safe.
    #[inline]
    pub fn name(&self, id: HookId) -> &str {
        &self.names[id as usize]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All IDs in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = HookId> {
        0..self.names.len() as HookId
    }
}

impl Default for HookIndex {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
