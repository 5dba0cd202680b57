//! Renderer: owns the passes, wires them by name and runs them in order
//!
//! Lifecycle: passes and globals are added (assembly), consumers are
//! validated exactly once, then [`Renderer::run`] is called once per frame.
//! Pass consumers are linked as each pass is added, so a pass may only
//! consume from passes added before it or from the global scope.

use crate::backend::GraphicsDevice;
use crate::error::{RenderError, RenderResult};
use crate::render_graph::consumer::{Consumer, LinkTarget};
use crate::render_graph::naming::GLOBAL_SCOPE;
use crate::render_graph::pass::Pass;
use crate::render_graph::producer::Producer;
use crate::render_graph::queue::RenderQueuePass;
use std::collections::HashMap;

/// Position of a pass in its renderer, stable for the renderer's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassIndex(pub(crate) usize);

impl PassIndex {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Ordered collection of passes with a global producer/consumer scope
#[derive(Default)]
pub struct Renderer {
    passes: Vec<Box<dyn Pass>>,
    pass_indices: HashMap<String, PassIndex>,
    global_producers: Vec<Box<dyn Producer>>,
    global_consumers: Vec<Box<dyn Consumer>>,
    validated: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    // Assembly

    /// Add a pass, linking its consumers against the passes already added.
    ///
    /// Execution order is insertion order.
    pub fn add_pass<P: Pass + 'static>(&mut self, pass: P) -> RenderResult<PassIndex> {
        self.add_boxed_pass(Box::new(pass))
    }

    pub fn add_boxed_pass(&mut self, mut pass: Box<dyn Pass>) -> RenderResult<PassIndex> {
        if self.validated {
            return Err(RenderError::AssemblyClosed);
        }
        if self.pass_indices.contains_key(pass.name()) {
            return Err(RenderError::DuplicatePassName(pass.name().to_string()));
        }

        self.link_pass_consumers(pass.as_mut())?;

        let index = PassIndex(self.passes.len());
        log::debug!("Renderer: added pass '{}' at {}", pass.name(), index.0);
        self.pass_indices.insert(pass.name().to_string(), index);
        self.passes.push(pass);
        Ok(index)
    }

    pub fn add_global_producer(&mut self, producer: Box<dyn Producer>) -> RenderResult<()> {
        if self.validated {
            return Err(RenderError::AssemblyClosed);
        }
        if self.global_producers.iter().any(|p| p.name() == producer.name()) {
            return Err(RenderError::DuplicateProducer {
                pass: GLOBAL_SCOPE.to_string(),
                producer: producer.name().to_string(),
            });
        }
        self.global_producers.push(producer);
        Ok(())
    }

    pub fn add_global_consumer(&mut self, consumer: Box<dyn Consumer>) -> RenderResult<()> {
        if self.validated {
            return Err(RenderError::AssemblyClosed);
        }
        if self.global_consumers.iter().any(|c| c.name() == consumer.name()) {
            return Err(RenderError::DuplicateConsumer {
                pass: GLOBAL_SCOPE.to_string(),
                consumer: consumer.name().to_string(),
            });
        }
        self.global_consumers.push(consumer);
        Ok(())
    }

    pub fn setup_global_consumer_target(
        &mut self,
        consumer: &str,
        pass: &str,
        producer: &str,
    ) -> RenderResult<()> {
        let target = self
            .global_consumers
            .iter_mut()
            .find(|c| c.name() == consumer)
            .ok_or_else(|| RenderError::ConsumerNotFound {
                pass: GLOBAL_SCOPE.to_string(),
                consumer: consumer.to_string(),
            })?;
        target.set_target(pass, producer)
    }

    // Linking

    /// Resolve every consumer of `pass` against the passes added so far and
    /// the global producers.
    ///
    /// All targets are resolved and checked before any producer is exposed,
    /// so a rejected pass leaves every exclusive surface available.
    pub fn link_pass_consumers(&mut self, pass: &mut dyn Pass) -> RenderResult<()> {
        let owner = pass.name().to_string();
        let mut claimed = Vec::new();
        for consumer in pass.base().consumers() {
            check_link(
                &owner,
                consumer,
                &self.passes,
                &self.pass_indices,
                &self.global_producers,
                &mut claimed,
            )?;
        }

        for consumer in pass.base_mut().consumers_mut() {
            link_consumer(
                &owner,
                consumer.as_mut(),
                &mut self.passes,
                &self.pass_indices,
                &mut self.global_producers,
            )?;
        }
        Ok(())
    }

    /// Validate every pass. Can only succeed once; closes assembly.
    pub fn validate_consumers_linkage(&mut self) -> RenderResult<()> {
        if self.validated {
            return Err(RenderError::AlreadyValidated);
        }
        self.validate_passes()?;
        self.validated = true;
        log::info!("Renderer: validated {} passes", self.passes.len());
        Ok(())
    }

    fn validate_passes(&self) -> RenderResult<()> {
        for pass in &self.passes {
            pass.validate()?;
        }
        Ok(())
    }

    /// Resolve the global consumers against the passes, then check each of
    /// them is linked. Consumers already linked are left as they are.
    ///
    /// On failure the renderer is left unvalidated, so it refuses to run
    /// until a later attempt succeeds.
    pub fn link_global_consumers(&mut self) -> RenderResult<()> {
        let result = self.try_link_global_consumers();
        if result.is_err() {
            self.validated = false;
        }
        result
    }

    fn try_link_global_consumers(&mut self) -> RenderResult<()> {
        let mut claimed = Vec::new();
        for consumer in &self.global_consumers {
            if consumer.is_linked() || consumer.target().is_none() {
                continue;
            }
            check_link(
                GLOBAL_SCOPE,
                consumer.as_ref(),
                &self.passes,
                &self.pass_indices,
                &self.global_producers,
                &mut claimed,
            )?;
        }

        for consumer in &mut self.global_consumers {
            if consumer.is_linked() || consumer.target().is_none() {
                continue;
            }
            link_consumer(
                GLOBAL_SCOPE,
                consumer.as_mut(),
                &mut self.passes,
                &self.pass_indices,
                &mut self.global_producers,
            )?;
        }
        for consumer in &self.global_consumers {
            consumer.validate_linkage(GLOBAL_SCOPE)?;
        }
        Ok(())
    }

    /// Validate the passes, then link and validate the global consumers.
    ///
    /// The renderer counts as validated only once both steps succeed.
    pub fn finalize(&mut self) -> RenderResult<()> {
        if self.validated {
            return Err(RenderError::AlreadyValidated);
        }
        self.validate_passes()?;
        self.try_link_global_consumers()?;
        self.validated = true;
        log::info!("Renderer: finalized {} passes", self.passes.len());
        Ok(())
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    // Execution

    /// Run every active pass in insertion order.
    pub fn run(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        if !self.validated {
            return Err(RenderError::NotValidated);
        }
        for pass in &mut self.passes {
            if !pass.base().is_active() {
                log::trace!("Renderer: skipping inactive pass '{}'", pass.name());
                continue;
            }
            log::trace!("Renderer: running pass '{}'", pass.name());
            pass.run(device)?;
        }
        Ok(())
    }

    /// Drop every pass's per-frame state.
    pub fn reset(&mut self) {
        for pass in &mut self.passes {
            pass.reset();
        }
    }

    // Lookup

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Pass names in execution order.
    pub fn pass_names(&self) -> impl Iterator<Item = &str> {
        self.passes.iter().map(|p| p.name())
    }

    pub fn pass_index(&self, name: &str) -> Option<PassIndex> {
        self.pass_indices.get(name).copied()
    }

    pub fn pass(&self, name: &str) -> Option<&dyn Pass> {
        let index = self.pass_index(name)?;
        self.passes.get(index.0).map(|p| p.as_ref())
    }

    pub fn pass_mut(&mut self, name: &str) -> Option<&mut dyn Pass> {
        let index = self.pass_index(name)?;
        self.pass_at_mut(index)
    }

    pub fn pass_at_mut(&mut self, index: PassIndex) -> Option<&mut dyn Pass> {
        self.passes
            .get_mut(index.0)
            .map(|p| p.as_mut() as &mut dyn Pass)
    }

    /// Downcast a pass to its concrete type.
    pub fn pass_as_mut<T: Pass + 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.pass_mut(name)?.as_any_mut().downcast_mut::<T>()
    }

    /// The render queue of pass `name`, for job submission.
    pub fn render_queue_pass_mut(&mut self, name: &str) -> RenderResult<&mut RenderQueuePass> {
        let index = self
            .pass_index(name)
            .ok_or_else(|| RenderError::UnknownPass(name.to_string()))?;
        self.render_queue_at_mut(index)
    }

    pub fn render_queue_at_mut(&mut self, index: PassIndex) -> RenderResult<&mut RenderQueuePass> {
        let pass = self
            .passes
            .get_mut(index.0)
            .ok_or_else(|| RenderError::UnknownPass(format!("#{}", index.0)))?;
        let name = pass.name().to_string();
        pass.as_render_queue_mut()
            .ok_or(RenderError::NotARenderQueuePass(name))
    }

    pub fn set_pass_active(&mut self, name: &str, active: bool) -> RenderResult<()> {
        let pass = self
            .pass_mut(name)
            .ok_or_else(|| RenderError::UnknownPass(name.to_string()))?;
        pass.base_mut().set_active(active);
        Ok(())
    }

    pub fn global_consumer(&self, name: &str) -> Option<&dyn Consumer> {
        self.global_consumers
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }
}

fn target_of(owner: &str, consumer: &dyn Consumer) -> RenderResult<LinkTarget> {
    consumer
        .target()
        .cloned()
        .ok_or_else(|| RenderError::LinkageUnresolved {
            pass: owner.to_string(),
            consumer: consumer.name().to_string(),
        })
}

fn producer_not_found(owner: &str, consumer: &dyn Consumer, target: &LinkTarget) -> RenderError {
    RenderError::ProducerNotFound {
        pass: owner.to_string(),
        consumer: consumer.name().to_string(),
        target_pass: target.pass.clone(),
        producer: target.producer.clone(),
    }
}

fn target_pass_index(
    owner: &str,
    consumer: &dyn Consumer,
    target: &LinkTarget,
    pass_indices: &HashMap<String, PassIndex>,
) -> RenderResult<PassIndex> {
    pass_indices
        .get(&target.pass)
        .copied()
        .ok_or_else(|| RenderError::PassNotFound {
            pass: owner.to_string(),
            consumer: consumer.name().to_string(),
            target_pass: target.pass.clone(),
        })
}

/// Check that `consumer` would link without exposing anything.
///
/// Exclusive targets are recorded in `claimed`; naming one twice is
/// reported as reuse.
fn check_link(
    owner: &str,
    consumer: &dyn Consumer,
    passes: &[Box<dyn Pass>],
    pass_indices: &HashMap<String, PassIndex>,
    global_producers: &[Box<dyn Producer>],
    claimed: &mut Vec<LinkTarget>,
) -> RenderResult<()> {
    let target = target_of(owner, consumer)?;

    let producer: &dyn Producer = if target.pass == GLOBAL_SCOPE {
        global_producers
            .iter()
            .find(|p| p.name() == target.producer)
            .map(|p| p.as_ref())
            .ok_or_else(|| producer_not_found(owner, consumer, &target))?
    } else {
        let index = target_pass_index(owner, consumer, &target, pass_indices)?;
        passes[index.0]
            .base()
            .producers()
            .find(|p| p.name() == target.producer)
            .ok_or_else(|| producer_not_found(owner, consumer, &target))?
    };

    let actual = producer.resource_tag();
    if actual != consumer.expected_tag() {
        return Err(RenderError::LinkageTypeMismatch {
            pass: owner.to_string(),
            consumer: consumer.name().to_string(),
            target: target.to_string(),
            expected: consumer.expected_tag().name(),
            actual: actual.name(),
        });
    }
    producer.check_expose()?;

    if producer.is_exclusive() {
        if claimed.contains(&target) {
            return Err(RenderError::ExclusiveResourceReuse {
                producer: target.producer,
            });
        }
        claimed.push(target);
    }
    Ok(())
}

/// Find the producer `consumer` targets and link it.
fn link_consumer(
    owner: &str,
    consumer: &mut dyn Consumer,
    passes: &mut [Box<dyn Pass>],
    pass_indices: &HashMap<String, PassIndex>,
    global_producers: &mut [Box<dyn Producer>],
) -> RenderResult<()> {
    let target = target_of(owner, consumer)?;

    let producer: &mut dyn Producer = if target.pass == GLOBAL_SCOPE {
        match global_producers
            .iter_mut()
            .find(|p| p.name() == target.producer)
        {
            Some(p) => p.as_mut(),
            None => return Err(producer_not_found(owner, consumer, &target)),
        }
    } else {
        let index = target_pass_index(owner, consumer, &target, pass_indices)?;
        match passes[index.0].base_mut().producer_mut(&target.producer) {
            Some(p) => p,
            None => return Err(producer_not_found(owner, consumer, &target)),
        }
    };

    consumer.link(owner, producer)?;
    log::debug!("Renderer: linked {}.{} <- {}", owner, consumer.name(), target);
    Ok(())
}
