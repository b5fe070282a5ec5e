//! Entity handles and slot allocation
//!
//! An entity is an opaque identifier: an index into the world's sparse
//! stores plus a generation counter so a handle held across a destroy
//! fails safely instead of aliasing the slot's next occupant.

use serde::{Deserialize, Serialize};

/// Generation-checked entity handle.
///
/// Ordering is by index first, which gives queries and relation maps a
/// stable, spawn-order iteration - a determinism requirement, not a
/// convenience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index into the world's sparse stores.
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation the slot had when this handle was issued.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Slot allocator: generation per slot, liveness flags, LIFO free list.
#[derive(Debug, Default)]
pub(crate) struct Entities {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free: Vec<u32>,
}

impl Entities {
    pub fn spawn(&mut self) -> Entity {
        if let Some(index) = self.free.pop() {
            self.alive[index as usize] = true;
            Entity::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            Entity::new(index, 0)
        }
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        let i = entity.index() as usize;
        i < self.alive.len() && self.alive[i] && self.generations[i] == entity.generation()
    }

    /// Frees the slot and bumps its generation, invalidating stale handles.
    pub fn free(&mut self, entity: Entity) {
        if self.is_alive(entity) {
            let i = entity.index() as usize;
            self.alive[i] = false;
            self.generations[i] += 1;
            self.free.push(entity.index());
        }
    }

    /// All live entities in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|&(_, &alive)| alive)
            .map(|(i, _)| Entity::new(i as u32, self.generations[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_liveness() {
        let mut entities = Entities::default();
        let a = entities.spawn();
        let b = entities.spawn();
        assert!(entities.is_alive(a));
        assert!(entities.is_alive(b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut entities = Entities::default();
        let a = entities.spawn();
        entities.free(a);
        assert!(!entities.is_alive(a));

        // Slot is reused with a new generation; the old handle stays dead.
        let b = entities.spawn();
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(entities.is_alive(b));
        assert!(!entities.is_alive(a));
    }

    #[test]
    fn test_iter_is_ascending_and_live_only() {
        let mut entities = Entities::default();
        let a = entities.spawn();
        let b = entities.spawn();
        let c = entities.spawn();
        entities.free(b);

        let live: Vec<Entity> = entities.iter().collect();
        assert_eq!(live, vec![a, c]);
    }

    #[test]
    fn test_double_free_is_harmless() {
        let mut entities = Entities::default();
        let a = entities.spawn();
        entities.free(a);
        entities.free(a);
        let b = entities.spawn();
        let c = entities.spawn();
        assert_ne!(b.index(), c.index());
    }
}
