//! Renderer-owned table of clone blanks.

use easel_core::{BlankLookup, CloneBlank, CloneId};
use std::collections::HashMap;

/// Blanks registered at scene setup, looked up by id every frame.
#[derive(Debug, Clone, Default)]
pub struct BlankRegistry {
    blanks: HashMap<CloneId, CloneBlank>,
}

impl BlankRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blank under its own id. Returns the blank it replaced, if any.
    pub fn register(&mut self, blank: CloneBlank) -> Option<CloneBlank> {
        let id = blank.id();
        let previous = self.blanks.insert(id, blank);
        if previous.is_some() {
            log::debug!("replaced clone blank `{id}`");
        }
        previous
    }

    pub fn unregister(&mut self, id: CloneId) -> Option<CloneBlank> {
        self.blanks.remove(&id)
    }

    pub fn get(&self, id: CloneId) -> Option<&CloneBlank> {
        self.blanks.get(&id)
    }

    pub fn contains(&self, id: CloneId) -> bool {
        self.blanks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.blanks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blanks.is_empty()
    }
}

impl BlankLookup for BlankRegistry {
    fn blank(&self, id: CloneId) -> Option<&CloneBlank> {
        self.get(id)
    }
}

impl FromIterator<CloneBlank> for BlankRegistry {
    fn from_iter<I: IntoIterator<Item = CloneBlank>>(iter: I) -> Self {
        let mut registry = Self::new();
        for blank in iter {
            registry.register(blank);
        }
        registry
    }
}
