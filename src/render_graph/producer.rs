//! Producers: named export points of a pass or of the renderer

use crate::error::{RenderError, RenderResult};
use crate::render_graph::naming::validate_identifier;
use crate::render_graph::resource::*;
use std::sync::Arc;

/// A named export point exposing one resource
pub trait Producer: Send + Sync {
    fn name(&self) -> &str;

    /// Tag of the resource type this producer exposes.
    fn resource_tag(&self) -> ResourceTag;

    /// Whether the resource may be handed out only once.
    fn is_exclusive(&self) -> bool {
        false
    }

    /// Whether `expose` would succeed right now. Never changes state.
    fn check_expose(&self) -> RenderResult<()> {
        Ok(())
    }

    /// Hand the resource out to a consumer.
    fn expose(&mut self) -> RenderResult<SharedResource>;
}

/// Producer of a shareable resource. Any number of consumers may read it.
pub struct BindableProducer<T: Tagged> {
    name: String,
    slot: Slot<T>,
}

/// A producer exposing a shareable bindable to many passes.
pub type Linker<T> = BindableProducer<T>;

impl<T: Tagged> BindableProducer<T> {
    /// Expose the content of `slot` under `name`.
    pub fn new(name: impl Into<String>, slot: Slot<T>) -> RenderResult<Self> {
        let name = name.into();
        validate_identifier("producer", &name)?;
        Ok(Self { name, slot })
    }

    /// Expose a fixed resource under `name`.
    pub fn with_resource(name: impl Into<String>, resource: Arc<T>) -> RenderResult<Self> {
        Self::new(name, filled_slot(resource))
    }
}

impl<T: Tagged> Producer for BindableProducer<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource_tag(&self) -> ResourceTag {
        T::TAG
    }

    fn check_expose(&self) -> RenderResult<()> {
        if slot_get(&self.slot).is_none() {
            return Err(RenderError::EmptyProducer {
                producer: self.name.clone(),
            });
        }
        Ok(())
    }

    fn expose(&mut self) -> RenderResult<SharedResource> {
        let resource = slot_get(&self.slot).ok_or_else(|| RenderError::EmptyProducer {
            producer: self.name.clone(),
        })?;
        Ok(SharedResource::new(resource))
    }
}

/// Producer of a render surface. Exactly one consumer may take it; the
/// surface is then threaded on from pass to pass.
pub struct SurfaceProducer<T: Tagged> {
    name: String,
    slot: Slot<T>,
    exposed: bool,
}

impl<T: Tagged> SurfaceProducer<T> {
    pub fn new(name: impl Into<String>, slot: Slot<T>) -> RenderResult<Self> {
        let name = name.into();
        validate_identifier("producer", &name)?;
        Ok(Self {
            name,
            slot,
            exposed: false,
        })
    }

    /// Whether a consumer has already taken the surface.
    pub fn is_exposed(&self) -> bool {
        self.exposed
    }
}

impl<T: Tagged> Producer for SurfaceProducer<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource_tag(&self) -> ResourceTag {
        T::TAG
    }

    fn is_exclusive(&self) -> bool {
        true
    }

    fn check_expose(&self) -> RenderResult<()> {
        if self.exposed {
            return Err(RenderError::ExclusiveResourceReuse {
                producer: self.name.clone(),
            });
        }
        if slot_get(&self.slot).is_none() {
            return Err(RenderError::EmptyProducer {
                producer: self.name.clone(),
            });
        }
        Ok(())
    }

    fn expose(&mut self) -> RenderResult<SharedResource> {
        self.check_expose()?;
        let resource = slot_get(&self.slot).ok_or_else(|| RenderError::EmptyProducer {
            producer: self.name.clone(),
        })?;
        self.exposed = true;
        Ok(SharedResource::new(resource))
    }
}
