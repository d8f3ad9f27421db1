//! Thread-safe registry of drawables.
//!
//! The registry is the only owner of drawables inside the engine. Everything else
//! (records, draw descriptors) refers to them through [`RendererHandle`], a slot
//! index plus a generation counter, so a handle to an unregistered drawable simply
//! stops resolving instead of keeping the drawable alive.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::{backend::GraphicsBackend, submission::renderable::Renderable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    /// Drawables submitted to the shadow and main paths.
    World,
    Ui,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RendererHandle {
    kind: RegistryKind,
    index: u32,
    generation: u32,
}

impl RendererHandle {
    pub fn kind(self) -> RegistryKind {
        self.kind
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

struct Slot<B: GraphicsBackend> {
    generation: u32,
    drawable: Option<Arc<dyn Renderable<B>>>,
}

/// The registry contents, accessible while the registry lock is held.
pub struct RegistrySlots<B: GraphicsBackend> {
    kind: RegistryKind,
    slots: Vec<Slot<B>>,
    free: Vec<u32>,
    len: usize,
}

impl<B: GraphicsBackend> RegistrySlots<B> {
    fn new(kind: RegistryKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    fn insert(&mut self, drawable: Arc<dyn Renderable<B>>) -> RendererHandle {
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].drawable = Some(drawable);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    drawable: Some(drawable),
                });
                (self.slots.len() - 1) as u32
            }
        };

        self.len += 1;

        RendererHandle {
            kind: self.kind,
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    fn remove(&mut self, handle: RendererHandle) -> Option<Arc<dyn Renderable<B>>> {
        if handle.kind != self.kind {
            return None;
        }

        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }

        let drawable = slot.drawable.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;

        Some(drawable)
    }

    /// Resolves a handle. Returns `None` for handles of unregistered drawables.
    pub fn get(&self, handle: RendererHandle) -> Option<&Arc<dyn Renderable<B>>> {
        if handle.kind != self.kind {
            return None;
        }

        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.drawable.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (RendererHandle, &Arc<dyn Renderable<B>>)> {
        let kind = self.kind;
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            slot.drawable.as_ref().map(|drawable| {
                (
                    RendererHandle {
                        kind,
                        index: index as u32,
                        generation: slot.generation,
                    },
                    drawable,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

pub struct RendererRegistry<B: GraphicsBackend> {
    slots: Mutex<RegistrySlots<B>>,
}

impl<B: GraphicsBackend> RendererRegistry<B> {
    pub fn new(kind: RegistryKind) -> Self {
        Self {
            slots: Mutex::new(RegistrySlots::new(kind)),
        }
    }

    pub fn register(&self, drawable: Arc<dyn Renderable<B>>) -> RendererHandle {
        self.slots.lock().insert(drawable)
    }

    /// Removes a drawable and hands back the registry's reference to it. Unknown or
    /// already-removed handles are reported and ignored.
    pub fn unregister(&self, handle: RendererHandle) -> Option<Arc<dyn Renderable<B>>> {
        let removed = self.slots.lock().remove(handle);

        if removed.is_none() {
            log::warn!("Ignoring unregister of stale renderer handle {:?}", handle);
        }

        removed
    }

    /// Locks the registry. Registration from other threads blocks until the guard is
    /// dropped.
    pub fn lock(&self) -> MutexGuard<'_, RegistrySlots<B>> {
        self.slots.lock()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
