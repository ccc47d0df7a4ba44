//! Generation-checked slot storage for nodes and values.
//!
//! Handles are `(index, generation)` pairs. Freeing a slot bumps its
//! generation, so a handle kept across an erase no longer resolves instead of
//! silently aliasing whatever reuses the slot.
//!
//! Iteration is by slot index and therefore deterministic for a given
//! sequence of allocations and frees.

use std::fmt;
use std::marker::PhantomData;

/// Typed handle into an [`Arena`].
pub trait ArenaKey: Copy + Eq {
    fn from_parts(index: u32, generation: u32) -> Self;
    fn index(self) -> u32;
    fn generation(self) -> u32;
}

macro_rules! arena_key {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl ArenaKey for $name {
            #[inline]
            fn from_parts(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }

            #[inline]
            fn index(self) -> u32 {
                self.index
            }

            #[inline]
            fn generation(self) -> u32 {
                self.generation
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.generation == 0 {
                    write!(f, concat!($prefix, "{}"), self.index)
                } else {
                    write!(f, concat!($prefix, "{}.{}"), self.index, self.generation)
                }
            }
        }
    };
}

arena_key!(
    /// Handle of a node (load or apply) in a [`crate::Graph`].
    NodeId,
    "n"
);

arena_key!(
    /// Handle of a single-assignment value in a [`crate::Graph`].
    ValueId,
    "v"
);

#[derive(Debug, Clone)]
struct Slot<T> {
    data: Option<T>,
    generation: u32,
    next_free: Option<u32>,
}

/// Contiguous storage with free-list reuse.
#[derive(Debug, Clone)]
pub struct Arena<K, T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    live: usize,
    _key: PhantomData<K>,
}

impl<K: ArenaKey, T> Arena<K, T> {
    pub fn new() -> Self {
        Self { slots: Vec::new(), free_head: None, live: 0, _key: PhantomData }
    }

    /// Stores `data` and returns its handle, reusing the most recently freed slot.
    pub fn insert(&mut self, data: T) -> K {
        self.live += 1;
        if let Some(index) = self.free_head {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.data.is_none(), "free slot should have no data");
            self.free_head = slot.next_free.take();
            slot.data = Some(data);
            return K::from_parts(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        assert!(index < u32::MAX, "arena exhausted");
        self.slots.push(Slot { data: Some(data), generation: 0, next_free: None });
        K::from_parts(index, 0)
    }

    /// Removes the entry behind `key`, returning it if the handle was live.
    pub fn remove(&mut self, key: K) -> Option<T> {
        let slot = self.slots.get_mut(key.index() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        let data = slot.data.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        slot.next_free = self.free_head;
        self.free_head = Some(key.index());
        self.live -= 1;
        Some(data)
    }

    pub fn get(&self, key: K) -> Option<&T> {
        self.slots
            .get(key.index() as usize)
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.data.as_ref())
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.slots
            .get_mut(key.index() as usize)
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.data.as_mut())
    }

    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.data.as_ref().map(|data| (K::from_parts(index as u32, slot.generation), data))
        })
    }
}

impl<K: ArenaKey, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
