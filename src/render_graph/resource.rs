//! Linkable resources and the cells passes keep them in

use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Stable identity of a linkable resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceTag(&'static str);

impl ResourceTag {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ResourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A resource type that can travel across a producer/consumer link.
///
/// Tags must be unique among the types linked within one renderer.
pub trait Tagged: Any + Send + Sync {
    const TAG: ResourceTag;
}

/// A type-erased resource handed out by a producer.
#[derive(Clone)]
pub struct SharedResource {
    tag: ResourceTag,
    value: Arc<dyn Any + Send + Sync>,
}

impl SharedResource {
    pub fn new<T: Tagged>(value: Arc<T>) -> Self {
        Self { tag: T::TAG, value }
    }

    pub fn tag(&self) -> ResourceTag {
        self.tag
    }

    /// Narrow back to the concrete type. `None` when the tag doesn't match.
    pub fn downcast<T: Tagged>(self) -> Option<Arc<T>> {
        if self.tag != T::TAG {
            return None;
        }
        self.value.downcast::<T>().ok()
    }
}

impl fmt::Debug for SharedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedResource")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// A shared, optionally filled cell for a resource.
///
/// A consumer and a producer of the same pass hold clones of one slot, so
/// whatever the consumer links in is what the producer re-exposes.
pub type Slot<T> = Arc<RwLock<Option<Arc<T>>>>;

/// Create an empty slot.
pub fn empty_slot<T: ?Sized>() -> Slot<T> {
    Arc::new(RwLock::new(None))
}

/// Create a slot already holding `value`.
pub fn filled_slot<T: ?Sized>(value: Arc<T>) -> Slot<T> {
    Arc::new(RwLock::new(Some(value)))
}

/// Read the current content of a slot.
pub fn slot_get<T: ?Sized>(slot: &Slot<T>) -> Option<Arc<T>> {
    slot.read().clone()
}
