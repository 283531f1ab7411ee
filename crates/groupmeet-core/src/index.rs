//! Dense identifier mapping.
//!
//! Students and units get dense integer ids so the constraint builder
//! and solution decoder can index the boolean variable grid without
//! string comparisons. The maps are built once per run and read-only
//! afterwards; they are owned by the caller, never ambient state.

use std::collections::HashMap;
use std::hash::Hash;

use crate::expand::ExpandedAvailability;
use crate::model::Unit;

/// A bidirectional entity <-> dense id map.
#[derive(Debug, Clone)]
pub struct IdMap<T> {
    by_id: Vec<T>,
    by_entity: HashMap<T, usize>,
}

impl<T: Clone + Eq + Hash> IdMap<T> {
    /// Builds the map from an iterator; insertion order defines ids.
    pub fn from_entities(entities: impl IntoIterator<Item = T>) -> Self {
        let mut by_id = Vec::new();
        let mut by_entity = HashMap::new();
        for entity in entities {
            if !by_entity.contains_key(&entity) {
                by_entity.insert(entity.clone(), by_id.len());
                by_id.push(entity);
            }
        }
        Self { by_id, by_entity }
    }

    pub fn id_of(&self, entity: &T) -> Option<usize> {
        self.by_entity.get(entity).copied()
    }

    pub fn get(&self, id: usize) -> &T {
        &self.by_id[id]
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Iterates entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.by_id.iter().enumerate()
    }
}

/// The indexing scheme for one run's boolean variable grid.
#[derive(Debug, Clone)]
pub struct ProblemIndex {
    pub students: IdMap<String>,
    pub units: IdMap<Unit>,
}

impl ProblemIndex {
    /// Builds dense ids from the expanded availability. Both maps are
    /// fed from ordered containers, so ids are deterministic across
    /// runs on identical input.
    pub fn build(expanded: &ExpandedAvailability) -> Self {
        Self {
            students: IdMap::from_entities(expanded.available.keys().cloned()),
            units: IdMap::from_entities(expanded.units.iter().cloned()),
        }
    }
}
