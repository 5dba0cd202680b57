//! Consumers: named import points resolved to exactly one producer

use crate::bindable::Bindable;
use crate::error::{RenderError, RenderResult};
use crate::render_graph::naming::{validate_identifier, validate_target_pass};
use crate::render_graph::producer::Producer;
use crate::render_graph::resource::*;
use std::sync::Arc;

/// `(pass, producer)` a consumer intends to link to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub pass: String,
    pub producer: String,
}

impl LinkTarget {
    pub fn new(pass: &str, producer: &str) -> RenderResult<Self> {
        validate_target_pass(pass)?;
        validate_identifier("target producer", producer)?;
        Ok(Self {
            pass: pass.to_string(),
            producer: producer.to_string(),
        })
    }
}

impl std::fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.pass, self.producer)
    }
}

/// A named import point
pub trait Consumer: Send + Sync {
    fn name(&self) -> &str;

    /// Tag of the resource type this consumer accepts.
    fn expected_tag(&self) -> ResourceTag;

    /// Record the intended linkage. Nothing is resolved yet.
    fn set_target(&mut self, pass: &str, producer: &str) -> RenderResult<()>;

    fn target(&self) -> Option<&LinkTarget>;

    fn is_linked(&self) -> bool;

    /// Take the producer's resource into this consumer's cell.
    ///
    /// On a type mismatch the cell is left untouched and the producer is not
    /// asked to expose anything.
    fn link(&mut self, owner: &str, producer: &mut dyn Producer) -> RenderResult<()>;

    fn validate_linkage(&self, owner: &str) -> RenderResult<()> {
        if self.is_linked() {
            Ok(())
        } else {
            Err(RenderError::LinkageUnresolved {
                pass: owner.to_string(),
                consumer: self.name().to_string(),
            })
        }
    }
}

/// Shared bookkeeping for every consumer kind.
struct ConsumerState {
    name: String,
    target: Option<LinkTarget>,
    linked: bool,
}

impl ConsumerState {
    fn new(name: String) -> RenderResult<Self> {
        validate_identifier("consumer", &name)?;
        Ok(Self {
            name,
            target: None,
            linked: false,
        })
    }

    fn resolve<T: Tagged>(
        &self,
        owner: &str,
        producer: &mut dyn Producer,
    ) -> RenderResult<Arc<T>> {
        let target = match &self.target {
            Some(t) => t.to_string(),
            None => format!("?.{}", producer.name()),
        };
        let mismatch = |actual: ResourceTag| RenderError::LinkageTypeMismatch {
            pass: owner.to_string(),
            consumer: self.name.clone(),
            target: target.clone(),
            expected: T::TAG.name(),
            actual: actual.name(),
        };

        let actual = producer.resource_tag();
        if actual != T::TAG {
            return Err(mismatch(actual));
        }
        let resource = producer.expose()?;
        let tag = resource.tag();
        resource.downcast::<T>().ok_or_else(|| mismatch(tag))
    }
}

/// Consumer that fills a typed slot, e.g. a pass's color or depth surface.
pub struct SlotConsumer<T: Tagged> {
    state: ConsumerState,
    slot: Slot<T>,
}

impl<T: Tagged> SlotConsumer<T> {
    pub fn new(name: impl Into<String>, slot: Slot<T>) -> RenderResult<Self> {
        Ok(Self {
            state: ConsumerState::new(name.into())?,
            slot,
        })
    }
}

impl<T: Tagged> Consumer for SlotConsumer<T> {
    fn name(&self) -> &str {
        &self.state.name
    }

    fn expected_tag(&self) -> ResourceTag {
        T::TAG
    }

    fn set_target(&mut self, pass: &str, producer: &str) -> RenderResult<()> {
        self.state.target = Some(LinkTarget::new(pass, producer)?);
        Ok(())
    }

    fn target(&self) -> Option<&LinkTarget> {
        self.state.target.as_ref()
    }

    fn is_linked(&self) -> bool {
        self.state.linked
    }

    fn link(&mut self, owner: &str, producer: &mut dyn Producer) -> RenderResult<()> {
        let resource = self.state.resolve::<T>(owner, producer)?;
        *self.slot.write() = Some(resource);
        self.state.linked = true;
        Ok(())
    }
}

/// Consumer whose cell is one entry of the owning pass's bindable list, so
/// the linked resource is bound on every run with the pass's own bindables.
pub struct Binder<T: Bindable + Tagged> {
    state: ConsumerState,
    slot: Slot<dyn Bindable>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Bindable + Tagged> Binder<T> {
    pub fn new(name: impl Into<String>, slot: Slot<dyn Bindable>) -> RenderResult<Self> {
        Ok(Self {
            state: ConsumerState::new(name.into())?,
            slot,
            _marker: std::marker::PhantomData,
        })
    }
}

impl<T: Bindable + Tagged> Consumer for Binder<T> {
    fn name(&self) -> &str {
        &self.state.name
    }

    fn expected_tag(&self) -> ResourceTag {
        T::TAG
    }

    fn set_target(&mut self, pass: &str, producer: &str) -> RenderResult<()> {
        self.state.target = Some(LinkTarget::new(pass, producer)?);
        Ok(())
    }

    fn target(&self) -> Option<&LinkTarget> {
        self.state.target.as_ref()
    }

    fn is_linked(&self) -> bool {
        self.state.linked
    }

    fn link(&mut self, owner: &str, producer: &mut dyn Producer) -> RenderResult<()> {
        let resource: Arc<dyn Bindable> = self.state.resolve::<T>(owner, producer)?;
        *self.slot.write() = Some(resource);
        self.state.linked = true;
        Ok(())
    }
}
