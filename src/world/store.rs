//! Sparse per-type component storage
//!
//! One store per component type, indexed by entity slot. Zero-size tag
//! components use the same representation: the `Option` is then just a
//! sparse presence bit, so "capability present" never needs dispatch.

use std::any::Any;

/// Type-erased view the world uses to discard components at commit.
pub(crate) trait AnyStore {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Drops whatever the given slot holds.
    fn discard(&mut self, index: usize);
}

pub(crate) struct ComponentStore<T> {
    slots: Vec<Option<T>>,
}

impl<T: 'static> ComponentStore<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn set(&mut self, index: usize, value: T) {
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(value);
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        self.slots.get_mut(index).and_then(|slot| slot.take())
    }
}

impl<T: 'static> AnyStore for ComponentStore<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn discard(&mut self, index: usize) {
        self.remove(index);
    }
}
