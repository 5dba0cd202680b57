//! Content-addressed bindable cache
//!
//! Requests with equal construction parameters share a single instance.
//! Entries nobody outside the cache holds any more are reclaimed by
//! [`BindableCache::garbage_collect`].

use crate::backend::{BackendResult, GraphicsDevice};
use crate::bindable::Bindable;
use crate::error::{RenderError, RenderResult};
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A bindable kind the cache knows how to build and key.
pub trait Cacheable: Bindable + Sized {
    type Params;

    /// Canonical key string. Must be injective over `Params`.
    fn content_key(params: &Self::Params) -> String;

    fn create(device: &mut dyn GraphicsDevice, params: &Self::Params) -> BackendResult<Self>;
}

/// Type identity plus canonical construction parameters
#[derive(Debug, Clone)]
pub struct ContentAddress {
    type_id: TypeId,
    type_name: &'static str,
    params: String,
}

impl ContentAddress {
    pub fn of<T: Cacheable>(params: &T::Params) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            params: T::content_key(params),
        }
    }

    pub fn params(&self) -> &str {
        &self.params
    }
}

impl PartialEq for ContentAddress {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.params == other.params
    }
}

impl Eq for ContentAddress {}

impl Hash for ContentAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.params.hash(state);
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.type_name.rsplit("::").next().unwrap_or(self.type_name);
        write!(f, "{}#{}", short, self.params)
    }
}

/// Shared bindable cache
#[derive(Default)]
pub struct BindableCache {
    entries: Mutex<HashMap<ContentAddress, Arc<dyn Any + Send + Sync>>>,
}

impl BindableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the instance for `params`, creating it on first request.
    pub fn fetch<T: Cacheable>(
        &self,
        device: &mut dyn GraphicsDevice,
        params: &T::Params,
    ) -> RenderResult<Arc<T>> {
        let address = ContentAddress::of::<T>(params);
        let mut entries = self.entries.lock();

        if let Some(existing) = entries.get(&address) {
            return Arc::clone(existing).downcast::<T>().map_err(|_| {
                log::warn!("Bindable cache entry {} holds an unexpected type", address);
                RenderError::CacheTypeMismatch {
                    key: address.to_string(),
                    requested: std::any::type_name::<T>(),
                }
            });
        }

        let instance = Arc::new(T::create(device, params)?);
        log::debug!("Bindable cache: created {}", address);
        entries.insert(address, Arc::clone(&instance) as Arc<dyn Any + Send + Sync>);
        Ok(instance)
    }

    /// Whether an instance for `params` is currently cached.
    pub fn contains<T: Cacheable>(&self, params: &T::Params) -> bool {
        self.entries
            .lock()
            .contains_key(&ContentAddress::of::<T>(params))
    }

    /// Number of cached instances.
    pub fn instance_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Number of cached instances held by nobody but the cache.
    pub fn garbage_count(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|entry| Arc::strong_count(entry) == 1)
            .count()
    }

    /// Drop every instance held by nobody but the cache. Returns how many
    /// were removed.
    pub fn garbage_collect(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| Arc::strong_count(entry) > 1);
        let removed = before - entries.len();
        if removed > 0 {
            log::debug!("Bindable cache: collected {} unused instances", removed);
        }
        removed
    }

    /// Drop every entry. Instances still held elsewhere stay alive.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl fmt::Debug for BindableCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindableCache")
            .field("instances", &self.instance_count())
            .finish()
    }
}
