//! Entity-component-relation substrate
//!
//! The minimal world the simulation core runs on: sparse typed component
//! storage, directed typed relations with optional payload, typed message
//! queues, and deferred destruction applied at an end-of-tick commit.
//!
//! Fault model: `get` on an absent component and `out_relation_singleton`
//! with an edge count other than one are precondition violations and
//! panic. Callers confirm presence first via `has`, queries, or the
//! `try_get` probe; nothing here is meant to be caught or retried.

pub mod entity;

mod messages;
mod relations;
mod store;

use std::any::{TypeId, type_name};
use std::collections::HashMap;

pub use entity::Entity;

use entity::Entities;
use messages::{AnyMailbox, Mailbox};
use relations::{AnyRelations, RelationStore};
use store::{AnyStore, ComponentStore};

/// A component-type set for [`World::query`], implemented for tuples of
/// one to three component types.
pub trait ComponentSet {
    fn matches(world: &World, entity: Entity) -> bool;
}

impl<A: 'static> ComponentSet for (A,) {
    fn matches(world: &World, entity: Entity) -> bool {
        world.has::<A>(entity)
    }
}

impl<A: 'static, B: 'static> ComponentSet for (A, B) {
    fn matches(world: &World, entity: Entity) -> bool {
        world.has::<A>(entity) && world.has::<B>(entity)
    }
}

impl<A: 'static, B: 'static, C: 'static> ComponentSet for (A, B, C) {
    fn matches(world: &World, entity: Entity) -> bool {
        world.has::<A>(entity) && world.has::<B>(entity) && world.has::<C>(entity)
    }
}

/// The entity-component-relation world.
///
/// All state is exclusively owned by the currently executing tick; there
/// is no interior mutability and no locking.
#[derive(Default)]
pub struct World {
    entities: Entities,
    stores: HashMap<TypeId, Box<dyn AnyStore>>,
    relations: HashMap<TypeId, Box<dyn AnyRelations>>,
    mailboxes: HashMap<TypeId, Box<dyn AnyMailbox>>,
    pending_destroy: Vec<Entity>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Entities ───

    pub fn spawn(&mut self) -> Entity {
        self.entities.spawn()
    }

    /// False for destroyed entities and for stale handles whose slot was
    /// reused.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Marks the entity for destruction at the next [`commit`](Self::commit).
    ///
    /// The entity stays fully readable (components, relations, queries)
    /// until then, so in-progress iteration over this tick's filters is
    /// never invalidated.
    pub fn destroy(&mut self, entity: Entity) {
        if self.entities.is_alive(entity) && !self.pending_destroy.contains(&entity) {
            self.pending_destroy.push(entity);
        }
    }

    /// End-of-tick commit: applies pending destroys in one pass (dropping
    /// their components and pruning every relation edge that references
    /// them), then clears all message queues.
    pub fn commit(&mut self) {
        let dead = std::mem::take(&mut self.pending_destroy);
        for &entity in &dead {
            for relations in self.relations.values_mut() {
                relations.discard(entity);
            }
            for store in self.stores.values_mut() {
                store.discard(entity.index() as usize);
            }
            self.entities.free(entity);
        }
        for mailbox in self.mailboxes.values_mut() {
            mailbox.clear();
        }
    }

    // ─── Components ───

    /// Upserts a typed component on the entity. Ignored for dead entities.
    pub fn set<T: 'static>(&mut self, entity: Entity, value: T) {
        if !self.entities.is_alive(entity) {
            return;
        }
        self.store_mut::<T>().set(entity.index() as usize, value);
    }

    /// Reads a component the caller has already confirmed present.
    ///
    /// # Panics
    ///
    /// Panics if the entity is dead or does not carry the component.
    pub fn get<T: 'static>(&self, entity: Entity) -> &T {
        match self.try_get::<T>(entity) {
            Some(value) => value,
            None => panic!(
                "get::<{}> on an entity without that component",
                type_name::<T>()
            ),
        }
    }

    pub fn try_get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        self.store::<T>()?.get(entity.index() as usize)
    }

    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        self.try_get::<T>(entity).is_some()
    }

    pub fn remove<T: 'static>(&mut self, entity: Entity) {
        if !self.entities.is_alive(entity) {
            return;
        }
        if let Some(store) = self.store_mut_existing::<T>() {
            store.remove(entity.index() as usize);
        }
    }

    /// Live entities carrying every component type in `S`, in ascending
    /// slot order. Re-evaluated against the live world on each call; to
    /// mutate while iterating, collect the snapshot first.
    pub fn query<S: ComponentSet>(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities
            .iter()
            .filter(move |&entity| S::matches(self, entity))
    }

    // ─── Relations ───

    /// Creates (or overwrites) the directed edge `a -> b`.
    pub fn relate<R: 'static>(&mut self, a: Entity, b: Entity, payload: R) {
        if !self.entities.is_alive(a) || !self.entities.is_alive(b) {
            return;
        }
        self.relations_mut::<R>().relate(a, b, payload);
    }

    pub fn unrelate<R: 'static>(&mut self, a: Entity, b: Entity) {
        if let Some(relations) = self.relations_mut_existing::<R>() {
            relations.unrelate(a, b);
        }
    }

    /// Removes every outgoing `R` edge of `a`.
    pub fn unrelate_all<R: 'static>(&mut self, a: Entity) {
        if let Some(relations) = self.relations_mut_existing::<R>() {
            relations.unrelate_all(a);
        }
    }

    pub fn related<R: 'static>(&self, a: Entity, b: Entity) -> bool {
        self.relations_ref::<R>()
            .is_some_and(|relations| relations.related(a, b))
    }

    /// Payload of the edge `a -> b`, if the edge exists.
    pub fn relation<R: 'static>(&self, a: Entity, b: Entity) -> Option<&R> {
        self.relations_ref::<R>()?.payload(a, b)
    }

    /// Outgoing `R` targets of `a`, in entity order.
    pub fn out_relations<R: 'static>(&self, a: Entity) -> impl Iterator<Item = Entity> + '_ {
        self.relations_ref::<R>()
            .into_iter()
            .flat_map(move |relations| relations.out(a))
    }

    pub fn has_out_relation<R: 'static>(&self, a: Entity) -> bool {
        self.relations_ref::<R>()
            .is_some_and(|relations| relations.out_count(a) > 0)
    }

    /// The one expected target of `a`'s outgoing `R` edge.
    ///
    /// # Panics
    ///
    /// Panics unless `a` has exactly one outgoing `R` edge.
    pub fn out_relation_singleton<R: 'static>(&self, a: Entity) -> Entity {
        let count = self
            .relations_ref::<R>()
            .map_or(0, |relations| relations.out_count(a));
        if count != 1 {
            panic!(
                "out_relation_singleton::<{}> expected exactly one edge, found {count}",
                type_name::<R>()
            );
        }
        self.out_relations::<R>(a)
            .next()
            .unwrap_or_else(|| unreachable!())
    }

    // ─── Messages ───

    /// Enqueues a typed event for systems running later this tick.
    pub fn send<M: 'static>(&mut self, message: M) {
        self.mailbox_mut::<M>().send(message);
    }

    /// Drains pending events of type `M` in send order.
    pub fn read_messages<M: 'static>(&mut self) -> Vec<M> {
        self.mailbox_mut_existing::<M>()
            .map(Mailbox::drain)
            .unwrap_or_default()
    }

    /// Tests for pending events of type `M` without draining them.
    pub fn some_message<M: 'static>(&self) -> bool {
        self.mailboxes
            .get(&TypeId::of::<M>())
            .and_then(|mailbox| mailbox.as_any().downcast_ref::<Mailbox<M>>())
            .is_some_and(|mailbox| !mailbox.is_empty())
    }

    // ─── Type-erasure plumbing ───

    fn store<T: 'static>(&self) -> Option<&ComponentStore<T>> {
        self.stores
            .get(&TypeId::of::<T>())
            .and_then(|store| store.as_any().downcast_ref())
    }

    fn store_mut<T: 'static>(&mut self) -> &mut ComponentStore<T> {
        self.stores
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStore::<T>::new()))
            .as_any_mut()
            .downcast_mut()
            .unwrap_or_else(|| unreachable!())
    }

    fn store_mut_existing<T: 'static>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|store| store.as_any_mut().downcast_mut())
    }

    fn relations_ref<R: 'static>(&self) -> Option<&RelationStore<R>> {
        self.relations
            .get(&TypeId::of::<R>())
            .and_then(|relations| relations.as_any().downcast_ref())
    }

    fn relations_mut<R: 'static>(&mut self) -> &mut RelationStore<R> {
        self.relations
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Box::new(RelationStore::<R>::new()))
            .as_any_mut()
            .downcast_mut()
            .unwrap_or_else(|| unreachable!())
    }

    fn relations_mut_existing<R: 'static>(&mut self) -> Option<&mut RelationStore<R>> {
        self.relations
            .get_mut(&TypeId::of::<R>())
            .and_then(|relations| relations.as_any_mut().downcast_mut())
    }

    fn mailbox_mut<M: 'static>(&mut self) -> &mut Mailbox<M> {
        self.mailboxes
            .entry(TypeId::of::<M>())
            .or_insert_with(|| Box::new(Mailbox::<M>::new()))
            .as_any_mut()
            .downcast_mut()
            .unwrap_or_else(|| unreachable!())
    }

    fn mailbox_mut_existing<M: 'static>(&mut self) -> Option<&mut Mailbox<M>> {
        self.mailboxes
            .get_mut(&TypeId::of::<M>())
            .and_then(|mailbox| mailbox.as_any_mut().downcast_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Health(u32);
    struct Marker;
    struct Owns;
    #[derive(Debug, PartialEq)]
    struct Ping(u8);

    #[test]
    fn test_component_set_get_remove() {
        let mut world = World::new();
        let e = world.spawn();

        assert!(!world.has::<Health>(e));
        world.set(e, Health(10));
        assert!(world.has::<Health>(e));
        assert_eq!(world.get::<Health>(e), &Health(10));

        world.set(e, Health(20));
        assert_eq!(world.get::<Health>(e), &Health(20));

        world.remove::<Health>(e);
        assert!(!world.has::<Health>(e));
        assert_eq!(world.try_get::<Health>(e), None);
    }

    #[test]
    #[should_panic(expected = "get::")]
    fn test_get_absent_component_panics() {
        let mut world = World::new();
        let e = world.spawn();
        let _ = world.get::<Health>(e);
    }

    #[test]
    fn test_query_matches_component_sets() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();
        let c = world.spawn();

        world.set(a, Health(1));
        world.set(a, Marker);
        world.set(b, Health(2));
        world.set(c, Marker);

        let both: Vec<Entity> = world.query::<(Health, Marker)>().collect();
        assert_eq!(both, vec![a]);

        let health_only: Vec<Entity> = world.query::<(Health,)>().collect();
        assert_eq!(health_only, vec![a, b]);
    }

    #[test]
    fn test_relations_roundtrip() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();
        let c = world.spawn();

        world.relate(a, b, Owns);
        world.relate(a, c, Owns);
        assert!(world.related::<Owns>(a, b));
        assert!(!world.related::<Owns>(b, a));
        assert!(world.has_out_relation::<Owns>(a));
        assert_eq!(world.out_relations::<Owns>(a).collect::<Vec<_>>(), vec![b, c]);

        world.unrelate::<Owns>(a, b);
        assert_eq!(world.out_relation_singleton::<Owns>(a), c);

        world.unrelate_all::<Owns>(a);
        assert!(!world.has_out_relation::<Owns>(a));
    }

    #[test]
    fn test_relation_payload_readback() {
        struct Strength(f32);
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();

        world.relate(a, b, Strength(0.5));
        assert_eq!(world.relation::<Strength>(a, b).map(|s| s.0), Some(0.5));
        assert!(world.relation::<Strength>(b, a).is_none());
    }

    #[test]
    #[should_panic(expected = "expected exactly one edge")]
    fn test_singleton_with_two_edges_panics() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();
        let c = world.spawn();
        world.relate(a, b, Owns);
        world.relate(a, c, Owns);
        let _ = world.out_relation_singleton::<Owns>(a);
    }

    #[test]
    fn test_destroy_is_deferred_until_commit() {
        let mut world = World::new();
        let e = world.spawn();
        world.set(e, Health(3));

        world.destroy(e);
        // Still readable mid-tick.
        assert!(world.is_alive(e));
        assert_eq!(world.get::<Health>(e), &Health(3));
        assert_eq!(world.query::<(Health,)>().count(), 1);

        world.commit();
        assert!(!world.is_alive(e));
        assert_eq!(world.query::<(Health,)>().count(), 0);
    }

    #[test]
    fn test_commit_prunes_edges_of_destroyed_entities() {
        let mut world = World::new();
        let holder = world.spawn();
        let held = world.spawn();
        world.relate(holder, held, Owns);
        world.relate(held, holder, Owns);

        world.destroy(held);
        world.commit();

        assert!(!world.related::<Owns>(holder, held));
        assert!(!world.has_out_relation::<Owns>(holder));
    }

    #[test]
    fn test_stale_handle_reads_as_absent_after_reuse() {
        let mut world = World::new();
        let old = world.spawn();
        world.set(old, Health(9));
        world.destroy(old);
        world.commit();

        let new = world.spawn();
        world.set(new, Health(1));
        assert_eq!(old.index(), new.index());
        assert!(!world.has::<Health>(old));
        assert_eq!(world.try_get::<Health>(old), None);
    }

    #[test]
    fn test_messages_drain_and_clear_at_commit() {
        let mut world = World::new();
        world.send(Ping(1));
        world.send(Ping(2));
        assert!(world.some_message::<Ping>());

        assert_eq!(world.read_messages::<Ping>(), vec![Ping(1), Ping(2)]);
        assert!(!world.some_message::<Ping>());

        world.send(Ping(3));
        world.commit();
        assert!(!world.some_message::<Ping>());
        assert!(world.read_messages::<Ping>().is_empty());
    }
}
