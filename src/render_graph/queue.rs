//! Render queue passes: per-frame draw jobs sorted by camera distance
//!
//! Opaque jobs are drawn front to back, transparent jobs back to front.
//! Ties keep submission order. The queue must be [`reset`](Pass::reset)
//! between frames; jobs left over from an executed frame are drawn again.

use crate::backend::GraphicsDevice;
use crate::bindable::Bindable;
use crate::error::RenderResult;
use crate::render_graph::pass::{Pass, PassBase};
use glam::Vec3;
use std::any::Any;
use std::sync::Arc;

/// Geometry a job draws: binds its own buffers and topology.
pub trait Drawable: Send + Sync {
    fn bind(&self, device: &mut dyn GraphicsDevice);
    fn index_count(&self) -> u32;
}

/// Per-technique state bound after the drawable.
pub trait Effect: Send + Sync {
    fn bind(&self, device: &mut dyn GraphicsDevice);
}

/// A single draw: a drawable rendered with an effect.
#[derive(Clone)]
pub struct Job {
    drawable: Arc<dyn Drawable>,
    effect: Arc<dyn Effect>,
}

impl Job {
    pub fn new(drawable: Arc<dyn Drawable>, effect: Arc<dyn Effect>) -> Self {
        Self { drawable, effect }
    }

    pub fn run(&self, device: &mut dyn GraphicsDevice) {
        self.drawable.bind(device);
        self.effect.bind(device);
        device.draw_indexed(self.drawable.index_count());
    }
}

/// Drawable made of an index count and the bindables that describe it.
pub struct IndexedDrawable {
    index_count: u32,
    bindables: Vec<Arc<dyn Bindable>>,
}

impl IndexedDrawable {
    pub fn new(index_count: u32) -> Self {
        Self {
            index_count,
            bindables: Vec::new(),
        }
    }

    pub fn with_bindable(mut self, bindable: Arc<dyn Bindable>) -> Self {
        self.bindables.push(bindable);
        self
    }
}

impl Drawable for IndexedDrawable {
    fn bind(&self, device: &mut dyn GraphicsDevice) {
        for b in &self.bindables {
            b.bind(device);
        }
    }

    fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Effect that binds a fixed list of bindables.
#[derive(Default)]
pub struct BindableEffect {
    bindables: Vec<Arc<dyn Bindable>>,
}

impl BindableEffect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindable(mut self, bindable: Arc<dyn Bindable>) -> Self {
        self.bindables.push(bindable);
        self
    }
}

impl Effect for BindableEffect {
    fn bind(&self, device: &mut dyn GraphicsDevice) {
        for b in &self.bindables {
            b.bind(device);
        }
    }
}

/// Where a queue is in its per-frame cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Empty,
    Accumulating,
    Sorted,
    Executed,
}

struct QueuedJob {
    job: Job,
    distance: f32,
}

/// A pass that draws the jobs submitted to it this frame.
pub struct RenderQueuePass {
    base: PassBase,
    opaque: Vec<QueuedJob>,
    transparent: Vec<QueuedJob>,
    state: QueueState,
}

impl RenderQueuePass {
    pub fn new(name: impl Into<String>) -> RenderResult<Self> {
        Self::with_capacity(name, 0)
    }

    /// Queue with room for `capacity` jobs in each bucket.
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> RenderResult<Self> {
        Ok(Self {
            base: PassBase::new(name)?,
            opaque: Vec::with_capacity(capacity),
            transparent: Vec::with_capacity(capacity),
            state: QueueState::Empty,
        })
    }

    /// Submit a job at `distance` from the camera.
    pub fn add_job(&mut self, job: Job, distance: f32, is_transparent: bool) {
        if self.state == QueueState::Executed {
            log::warn!(
                "Pass '{}': job added to an executed queue without reset; previous jobs will draw again",
                self.base.name()
            );
        }
        let queued = QueuedJob { job, distance };
        if is_transparent {
            self.transparent.push(queued);
        } else {
            self.opaque.push(queued);
        }
        self.state = QueueState::Accumulating;
    }

    /// Submit a job, measuring its distance from `camera` to `object`.
    pub fn add_job_at(&mut self, job: Job, camera: Vec3, object: Vec3, is_transparent: bool) {
        self.add_job(job, camera.distance(object), is_transparent);
    }

    pub fn job_count(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    pub fn opaque_count(&self) -> usize {
        self.opaque.len()
    }

    pub fn transparent_count(&self) -> usize {
        self.transparent.len()
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    /// Order opaque jobs nearest first and transparent jobs farthest first.
    pub fn sort(&mut self) {
        self.opaque.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        self.transparent.sort_by(|a, b| b.distance.total_cmp(&a.distance));
        self.state = QueueState::Sorted;
    }

    /// Submission distances in current bucket order, opaque then transparent.
    pub fn distances(&self) -> (Vec<f32>, Vec<f32>) {
        (
            self.opaque.iter().map(|q| q.distance).collect(),
            self.transparent.iter().map(|q| q.distance).collect(),
        )
    }

    /// Draw the sorted jobs without binding pass state.
    pub fn execute_jobs(&mut self, device: &mut dyn GraphicsDevice) {
        if self.state != QueueState::Sorted {
            self.sort();
        }
        for queued in self.opaque.iter().chain(self.transparent.iter()) {
            queued.job.run(device);
        }
        self.state = QueueState::Executed;
    }
}

impl Pass for RenderQueuePass {
    fn base(&self) -> &PassBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PassBase {
        &mut self.base
    }

    fn run(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        self.base.bind(device)?;
        self.execute_jobs(device);
        log::trace!(
            "Pass '{}': drew {} opaque, {} transparent",
            self.base.name(),
            self.opaque.len(),
            self.transparent.len()
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.opaque.clear();
        self.transparent.clear();
        self.state = QueueState::Empty;
    }

    fn as_render_queue_mut(&mut self) -> Option<&mut RenderQueuePass> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
