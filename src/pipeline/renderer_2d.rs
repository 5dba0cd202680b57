//! Minimal 2D pipeline: clear, then one sprite queue

use crate::backend::GraphicsDevice;
use crate::bindable::BindableCache;
use crate::config::RendererConfig;
use crate::error::RenderResult;
use crate::pipeline::passes::*;
use crate::pipeline::renderer_3d::{BACK_COLOR_BUFFER, BACK_DEPTH_BUFFER};
use crate::render_graph::*;
use crate::surface::{DepthStencil, RenderTarget};
use std::sync::Arc;

/// Name of the sprite queue pass.
pub const PASS_2D: &str = "pass2d";

/// Assembled 2D renderer
pub struct Renderer2d {
    renderer: Renderer,
    queue: PassIndex,
    back_color: Slot<RenderTarget>,
}

impl Renderer2d {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        cache: &BindableCache,
        config: &RendererConfig,
    ) -> RenderResult<Self> {
        let mut renderer = Renderer::new();

        let color = RenderTarget::new(
            device,
            "backColor",
            config.width,
            config.height,
            config.color_format,
        )?
        .with_clear_color(config.clear_color);
        let depth = DepthStencil::new(
            device,
            "backDepth",
            config.width,
            config.height,
            config.depth_format,
        )?
        .with_clear_depth(config.clear_depth);

        let back_color = filled_slot(Arc::new(color));
        renderer.add_global_producer(Box::new(SurfaceProducer::new(
            BACK_COLOR_BUFFER,
            Arc::clone(&back_color),
        )?))?;
        renderer.add_global_consumer(Box::new(SlotConsumer::new(
            BACK_COLOR_BUFFER,
            Arc::clone(&back_color),
        )?))?;
        renderer.add_global_producer(Box::new(SurfaceProducer::new(
            BACK_DEPTH_BUFFER,
            filled_slot(Arc::new(depth)),
        )?))?;

        let mut clear_rt = ClearPass::<RenderTarget>::new("clearRt")?;
        clear_rt
            .base_mut()
            .setup_consumer_target(CLEAR_BUFFER, GLOBAL_SCOPE, BACK_COLOR_BUFFER)?;
        renderer.add_pass(clear_rt)?;

        let mut clear_ds = ClearPass::<DepthStencil>::new("clearDs")?;
        clear_ds
            .base_mut()
            .setup_consumer_target(CLEAR_BUFFER, GLOBAL_SCOPE, BACK_DEPTH_BUFFER)?;
        renderer.add_pass(clear_ds)?;

        let mut sprites = sprite_pass(device, cache, PASS_2D, config.job_capacity)?;
        let base = sprites.base_mut();
        base.setup_consumer_target(RENDER_TARGET, "clearRt", CLEAR_BUFFER)?;
        base.setup_consumer_target(DEPTH_STENCIL, "clearDs", CLEAR_BUFFER)?;
        let queue = renderer.add_pass(sprites)?;

        renderer.setup_global_consumer_target(BACK_COLOR_BUFFER, PASS_2D, RENDER_TARGET)?;
        renderer.finalize()?;

        Ok(Self {
            renderer,
            queue,
            back_color,
        })
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub fn queue_mut(&mut self) -> RenderResult<&mut RenderQueuePass> {
        self.renderer.render_queue_at_mut(self.queue)
    }

    /// Submit a sprite. Sprites are ordered by `depth`, farthest drawn first
    /// when `is_transparent`.
    pub fn submit(&mut self, job: Job, depth: f32, is_transparent: bool) -> RenderResult<()> {
        self.queue_mut()?.add_job(job, depth, is_transparent);
        Ok(())
    }

    pub fn run(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        self.renderer.run(device)
    }

    pub fn reset(&mut self) {
        self.renderer.reset();
    }

    pub fn back_color(&self) -> Option<Arc<RenderTarget>> {
        slot_get(&self.back_color)
    }
}
