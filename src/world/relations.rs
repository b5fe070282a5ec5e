//! Directed, typed, many-to-many relation storage
//!
//! Per relation type: a sparse adjacency of source -> (target -> payload).
//! `BTreeMap` keeps edge iteration in entity order, which the simulation's
//! determinism guarantee depends on.

use std::any::Any;
use std::collections::BTreeMap;

use super::entity::Entity;

/// Type-erased view the world uses to prune edges at commit.
pub(crate) trait AnyRelations {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Removes every edge in which the entity appears, either side.
    fn discard(&mut self, entity: Entity);
}

pub(crate) struct RelationStore<R> {
    edges: BTreeMap<Entity, BTreeMap<Entity, R>>,
}

impl<R: 'static> RelationStore<R> {
    pub fn new() -> Self {
        Self {
            edges: BTreeMap::new(),
        }
    }

    /// Creates the edge, overwriting any existing payload.
    pub fn relate(&mut self, a: Entity, b: Entity, payload: R) {
        self.edges.entry(a).or_default().insert(b, payload);
    }

    pub fn unrelate(&mut self, a: Entity, b: Entity) {
        if let Some(targets) = self.edges.get_mut(&a) {
            targets.remove(&b);
            if targets.is_empty() {
                self.edges.remove(&a);
            }
        }
    }

    pub fn unrelate_all(&mut self, a: Entity) {
        self.edges.remove(&a);
    }

    pub fn related(&self, a: Entity, b: Entity) -> bool {
        self.edges.get(&a).is_some_and(|targets| targets.contains_key(&b))
    }

    pub fn payload(&self, a: Entity, b: Entity) -> Option<&R> {
        self.edges.get(&a).and_then(|targets| targets.get(&b))
    }

    /// Outgoing targets of `a`, in entity order.
    pub fn out(&self, a: Entity) -> impl Iterator<Item = Entity> + '_ {
        self.edges
            .get(&a)
            .into_iter()
            .flat_map(|targets| targets.keys().copied())
    }

    pub fn out_count(&self, a: Entity) -> usize {
        self.edges.get(&a).map_or(0, BTreeMap::len)
    }
}

impl<R: 'static> AnyRelations for RelationStore<R> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn discard(&mut self, entity: Entity) {
        self.edges.remove(&entity);
        self.edges.retain(|_, targets| {
            targets.remove(&entity);
            !targets.is_empty()
        });
    }
}
