//! Render pass definitions for the pass graph

use crate::backend::GraphicsDevice;
use crate::bindable::Bindable;
use crate::error::{RenderError, RenderResult};
use crate::render_graph::consumer::{Binder, Consumer, SlotConsumer};
use crate::render_graph::naming::validate_identifier;
use crate::render_graph::producer::{Linker, Producer, SurfaceProducer};
use crate::render_graph::queue::RenderQueuePass;
use crate::render_graph::resource::*;
use crate::surface::{DepthStencil, RenderSurface, RenderTarget};
use std::any::Any;
use std::sync::Arc;

/// One entry of a pass's bindable list
struct BindableEntry {
    slot: Slot<dyn Bindable>,
    /// Name of the binder filling this entry, if it is filled at link time.
    binder: Option<String>,
}

/// State shared by every pass: name, bindables, consumers, producers and
/// the owned color/depth surfaces.
pub struct PassBase {
    name: String,
    active: bool,
    binds_surfaces_dynamically: bool,
    bindables: Vec<BindableEntry>,
    consumers: Vec<Box<dyn Consumer>>,
    producers: Vec<Box<dyn Producer>>,
    render_target: Slot<RenderTarget>,
    depth_stencil: Slot<DepthStencil>,
}

impl PassBase {
    pub fn new(name: impl Into<String>) -> RenderResult<Self> {
        let name = name.into();
        validate_identifier("pass", &name)?;
        Ok(Self {
            name,
            active: true,
            binds_surfaces_dynamically: false,
            bindables: Vec::new(),
            consumers: Vec::new(),
            producers: Vec::new(),
            render_target: empty_slot(),
            depth_stencil: empty_slot(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Declare that this pass binds its surfaces itself while running, so it
    /// needs no owned color or depth surface.
    pub fn set_binds_surfaces_dynamically(&mut self, dynamic: bool) {
        self.binds_surfaces_dynamically = dynamic;
    }

    pub fn binds_surfaces_dynamically(&self) -> bool {
        self.binds_surfaces_dynamically
    }

    // Assembly

    /// Append a bindable bound on every run, in insertion order.
    pub fn add_bindable(&mut self, bindable: Arc<dyn Bindable>) {
        self.bindables.push(BindableEntry {
            slot: filled_slot(bindable),
            binder: None,
        });
    }

    pub fn add_consumer(&mut self, consumer: Box<dyn Consumer>) -> RenderResult<()> {
        if self.consumers.iter().any(|c| c.name() == consumer.name()) {
            return Err(RenderError::DuplicateConsumer {
                pass: self.name.clone(),
                consumer: consumer.name().to_string(),
            });
        }
        self.consumers.push(consumer);
        Ok(())
    }

    pub fn add_producer(&mut self, producer: Box<dyn Producer>) -> RenderResult<()> {
        if self.producers.iter().any(|p| p.name() == producer.name()) {
            return Err(RenderError::DuplicateProducer {
                pass: self.name.clone(),
                producer: producer.name().to_string(),
            });
        }
        self.producers.push(producer);
        Ok(())
    }

    /// Reserve a bindable entry filled at link time by a consumer named
    /// `name`.
    pub fn add_binder<T: Bindable + Tagged>(&mut self, name: &str) -> RenderResult<()> {
        let slot: Slot<dyn Bindable> = empty_slot();
        self.add_consumer(Box::new(Binder::<T>::new(name, Arc::clone(&slot))?))?;
        self.bindables.push(BindableEntry {
            slot,
            binder: Some(name.to_string()),
        });
        Ok(())
    }

    /// Export a shareable resource under `name`.
    pub fn add_linker<T: Tagged>(&mut self, name: &str, resource: Arc<T>) -> RenderResult<()> {
        self.add_producer(Box::new(Linker::with_resource(name, resource)?))
    }

    /// Take the color surface from another pass under consumer `name`.
    pub fn consume_render_target(&mut self, name: &str) -> RenderResult<()> {
        let slot = Arc::clone(&self.render_target);
        self.add_consumer(Box::new(SlotConsumer::new(name, slot)?))
    }

    /// Take the depth surface from another pass under consumer `name`.
    pub fn consume_depth_stencil(&mut self, name: &str) -> RenderResult<()> {
        let slot = Arc::clone(&self.depth_stencil);
        self.add_consumer(Box::new(SlotConsumer::new(name, slot)?))
    }

    /// Hand the color surface on to exactly one later consumer.
    pub fn produce_render_target(&mut self, name: &str) -> RenderResult<()> {
        let slot = Arc::clone(&self.render_target);
        self.add_producer(Box::new(SurfaceProducer::new(name, slot)?))
    }

    /// Hand the depth surface on to exactly one later consumer.
    pub fn produce_depth_stencil(&mut self, name: &str) -> RenderResult<()> {
        let slot = Arc::clone(&self.depth_stencil);
        self.add_producer(Box::new(SurfaceProducer::new(name, slot)?))
    }

    /// Own a color surface directly instead of consuming one.
    pub fn set_render_target(&mut self, target: Arc<RenderTarget>) {
        *self.render_target.write() = Some(target);
    }

    /// Own a depth surface directly instead of consuming one.
    pub fn set_depth_stencil(&mut self, depth: Arc<DepthStencil>) {
        *self.depth_stencil.write() = Some(depth);
    }

    pub fn render_target(&self) -> Option<Arc<RenderTarget>> {
        slot_get(&self.render_target)
    }

    pub fn depth_stencil(&self) -> Option<Arc<DepthStencil>> {
        slot_get(&self.depth_stencil)
    }

    /// Record where consumer `consumer` links to.
    pub fn setup_consumer_target(
        &mut self,
        consumer: &str,
        pass: &str,
        producer: &str,
    ) -> RenderResult<()> {
        let owner = &self.name;
        let target = self
            .consumers
            .iter_mut()
            .find(|c| c.name() == consumer)
            .ok_or_else(|| RenderError::ConsumerNotFound {
                pass: owner.clone(),
                consumer: consumer.to_string(),
            })?;
        target.set_target(pass, producer)
    }

    // Lookup

    pub fn consumers(&self) -> impl Iterator<Item = &dyn Consumer> {
        self.consumers.iter().map(|c| c.as_ref())
    }

    pub(crate) fn consumers_mut(&mut self) -> &mut [Box<dyn Consumer>] {
        &mut self.consumers
    }

    pub fn producers(&self) -> impl Iterator<Item = &dyn Producer> {
        self.producers.iter().map(|p| p.as_ref())
    }

    pub fn producer_mut(&mut self, name: &str) -> Option<&mut dyn Producer> {
        self.producers
            .iter_mut()
            .find(|p| p.name() == name)
            .map(|p| p.as_mut() as &mut dyn Producer)
    }

    pub fn bindable_count(&self) -> usize {
        self.bindables.len()
    }

    // Execution

    /// Bind the color surface (with depth attached) or the depth surface
    /// alone, then every bindable in insertion order.
    pub fn bind(&self, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        let depth = self.depth_stencil();
        if let Some(rt) = self.render_target() {
            rt.bind_with_depth(device, depth.as_deref());
        } else if let Some(ds) = depth {
            ds.bind_as_target(device);
        }

        for entry in &self.bindables {
            match slot_get(&entry.slot) {
                Some(bindable) => bindable.bind(device),
                None => {
                    return Err(RenderError::LinkageUnresolved {
                        pass: self.name.clone(),
                        consumer: entry.binder.clone().unwrap_or_default(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Check every consumer is linked and that some surface is available.
    pub fn validate(&self) -> RenderResult<()> {
        for consumer in &self.consumers {
            consumer.validate_linkage(&self.name)?;
        }
        if !self.binds_surfaces_dynamically
            && self.render_target.read().is_none()
            && self.depth_stencil.read().is_none()
        {
            return Err(RenderError::MissingRenderSurface {
                pass: self.name.clone(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for PassBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassBase")
            .field("name", &self.name)
            .field("active", &self.active)
            .field("bindables", &self.bindables.len())
            .field(
                "consumers",
                &self.consumers.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field(
                "producers",
                &self.producers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Trait for render passes
pub trait Pass: Send + Sync {
    fn base(&self) -> &PassBase;
    fn base_mut(&mut self) -> &mut PassBase;

    fn name(&self) -> &str {
        self.base().name()
    }

    /// Record this pass's commands for the current frame.
    fn run(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<()>;

    /// Drop per-frame state after the frame has been executed.
    fn reset(&mut self) {}

    fn validate(&self) -> RenderResult<()> {
        self.base().validate()
    }

    /// The render queue this pass draws from, if it has one.
    fn as_render_queue_mut(&mut self) -> Option<&mut RenderQueuePass> {
        None
    }

    /// Allow downcasting
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
