//! Lit, shadowed 3D pipeline with a blurred outline effect

use crate::backend::*;
use crate::bindable::*;
use crate::config::{KernelType, RendererConfig};
use crate::error::{RenderError, RenderResult};
use crate::pipeline::passes::*;
use crate::render_graph::*;
use crate::surface::{DepthStencil, RenderSurface, RenderTarget};
use std::sync::Arc;

/// Global consumer receiving the final color surface.
pub const BACK_COLOR_BUFFER: &str = "backColorbuffer";
/// Global producer of the main depth surface.
pub const BACK_DEPTH_BUFFER: &str = "backDepthBuffer";

/// Queue stages jobs can be submitted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage3d {
    Shadow,
    Lambertian,
    BlurOutlineMask,
    BlurOutlineDraw,
    Wireframe,
    Transparent,
}

impl Stage3d {
    pub const ALL: [Stage3d; 6] = [
        Stage3d::Shadow,
        Stage3d::Lambertian,
        Stage3d::BlurOutlineMask,
        Stage3d::BlurOutlineDraw,
        Stage3d::Wireframe,
        Stage3d::Transparent,
    ];

    /// Name of the pass implementing this stage.
    pub fn pass_name(&self) -> &'static str {
        match self {
            Stage3d::Shadow => "shadowMap",
            Stage3d::Lambertian => "lambertian",
            Stage3d::BlurOutlineMask => "blurOutlineMask",
            Stage3d::BlurOutlineDraw => "blurOutlineDraw",
            Stage3d::Wireframe => "wireframe",
            Stage3d::Transparent => "transparent",
        }
    }
}

/// Main color and depth surfaces plus the final presentation target
struct BackBuffers {
    color: Slot<RenderTarget>,
    depth: Arc<DepthStencil>,
    /// Swap chain stand-in, only used when rendering offscreen.
    present: Option<Arc<RenderTarget>>,
}

/// Assembled 3D renderer
pub struct Renderer3d {
    renderer: Renderer,
    back: BackBuffers,
    blur_kernel: Arc<ConstantBuffer>,
    kernel_type: KernelType,
    blur_radius: u32,
    blur_sigma: f32,
    stages: Vec<(Stage3d, PassIndex)>,
    fullscreen: Option<Arc<RasterizerState>>,
}

impl Renderer3d {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        cache: &BindableCache,
        config: &RendererConfig,
    ) -> RenderResult<Self> {
        let mut renderer = Renderer::new();
        let capacity = config.job_capacity;

        // Back buffers, exposed to the clear passes through the global scope
        let color = Arc::new(
            RenderTarget::new(
                device,
                if config.offscreen { "offscreenColor" } else { "backColor" },
                config.width,
                config.height,
                config.color_format,
            )?
            .with_clear_color(config.clear_color),
        );
        let depth = Arc::new(
            DepthStencil::new(
                device,
                "backDepth",
                config.width,
                config.height,
                config.depth_format,
            )?
            .with_clear_depth(config.clear_depth),
        );
        let color_slot = filled_slot(color);
        renderer.add_global_producer(Box::new(SurfaceProducer::new(
            BACK_COLOR_BUFFER,
            Arc::clone(&color_slot),
        )?))?;
        renderer.add_global_consumer(Box::new(SlotConsumer::new(
            BACK_COLOR_BUFFER,
            Arc::clone(&color_slot),
        )?))?;
        renderer.add_global_producer(Box::new(SurfaceProducer::new(
            BACK_DEPTH_BUFFER,
            filled_slot(Arc::clone(&depth)),
        )?))?;

        let present = if config.offscreen {
            Some(Arc::new(RenderTarget::new(
                device,
                "present",
                config.width,
                config.height,
                config.color_format,
            )?))
        } else {
            None
        };

        // Blur parameters shared by both blur passes
        let kernel = match config.kernel_type {
            KernelType::Gauss => BlurKernel::gauss(config.blur_radius, config.blur_sigma)?,
            KernelType::Box => BlurKernel::box_filter(config.blur_radius)?,
        };
        let blur_kernel = Arc::new(ConstantBuffer::new(
            device,
            BLUR_KERNEL,
            ShaderStages::PIXEL,
            0,
            &kernel,
        )?);
        let blur_direction = Arc::new(ConstantBuffer::new(
            device,
            BLUR_DIRECTION,
            ShaderStages::PIXEL,
            1,
            &BlurDirection::new(true),
        )?);
        renderer.add_global_producer(Box::new(Linker::with_resource(
            BLUR_KERNEL,
            Arc::clone(&blur_kernel),
        )?))?;
        renderer.add_global_producer(Box::new(Linker::with_resource(
            BLUR_DIRECTION,
            blur_direction,
        )?))?;

        let mut stages = Vec::with_capacity(Stage3d::ALL.len());

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

        let shadow = OffscreenQueuePass::shadow_map(
            device,
            cache,
            Stage3d::Shadow.pass_name(),
            config.shadow_map_resolution,
            capacity,
        )?;
        stages.push((Stage3d::Shadow, renderer.add_pass(shadow)?));

        let mut lambertian =
            lambertian_pass(device, cache, Stage3d::Lambertian.pass_name(), capacity)?;
        let base = lambertian.base_mut();
        base.setup_consumer_target(RENDER_TARGET, "clearRt", CLEAR_BUFFER)?;
        base.setup_consumer_target(DEPTH_STENCIL, "clearDs", CLEAR_BUFFER)?;
        base.setup_consumer_target(SHADOW_MAP, Stage3d::Shadow.pass_name(), SHADOW_MAP)?;
        stages.push((Stage3d::Lambertian, renderer.add_pass(lambertian)?));

        let mut mask =
            blur_outline_mask_pass(device, cache, Stage3d::BlurOutlineMask.pass_name(), capacity)?;
        mask.base_mut().setup_consumer_target(
            DEPTH_STENCIL,
            Stage3d::Lambertian.pass_name(),
            DEPTH_STENCIL,
        )?;
        stages.push((Stage3d::BlurOutlineMask, renderer.add_pass(mask)?));

        let outline = OffscreenQueuePass::blur_outline_draw(
            device,
            cache,
            Stage3d::BlurOutlineDraw.pass_name(),
            config.blur_target_size(),
            config.color_format,
            capacity,
        )?;
        stages.push((Stage3d::BlurOutlineDraw, renderer.add_pass(outline)?));

        let mut horizontal = HorizontalBlurPass::new(
            device,
            cache,
            "horizontalBlur",
            config.blur_target_size(),
            config.color_format,
        )?;
        let base = horizontal.base_mut();
        base.setup_consumer_target(
            BLUR_IN,
            Stage3d::BlurOutlineDraw.pass_name(),
            BLUR_OUTLINE_OUT,
        )?;
        base.setup_consumer_target(BLUR_KERNEL, GLOBAL_SCOPE, BLUR_KERNEL)?;
        base.setup_consumer_target(BLUR_DIRECTION, GLOBAL_SCOPE, BLUR_DIRECTION)?;
        renderer.add_pass(horizontal)?;

        let mut vertical = VerticalBlurPass::new(device, cache, "verticalBlur")?;
        let base = vertical.base_mut();
        base.setup_consumer_target(RENDER_TARGET, Stage3d::Lambertian.pass_name(), RENDER_TARGET)?;
        base.setup_consumer_target(
            DEPTH_STENCIL,
            Stage3d::BlurOutlineMask.pass_name(),
            DEPTH_STENCIL,
        )?;
        base.setup_consumer_target(BLUR_IN, "horizontalBlur", BLUR_OUTLINE_OUT)?;
        base.setup_consumer_target(BLUR_KERNEL, GLOBAL_SCOPE, BLUR_KERNEL)?;
        base.setup_consumer_target(BLUR_DIRECTION, GLOBAL_SCOPE, BLUR_DIRECTION)?;
        renderer.add_pass(vertical)?;

        let mut wireframe =
            wireframe_pass(device, cache, Stage3d::Wireframe.pass_name(), capacity)?;
        let base = wireframe.base_mut();
        base.setup_consumer_target(RENDER_TARGET, "verticalBlur", RENDER_TARGET)?;
        base.setup_consumer_target(DEPTH_STENCIL, "verticalBlur", DEPTH_STENCIL)?;
        stages.push((Stage3d::Wireframe, renderer.add_pass(wireframe)?));

        let mut transparent =
            transparent_pass(device, cache, Stage3d::Transparent.pass_name(), capacity)?;
        let base = transparent.base_mut();
        base.setup_consumer_target(RENDER_TARGET, Stage3d::Wireframe.pass_name(), RENDER_TARGET)?;
        base.setup_consumer_target(DEPTH_STENCIL, Stage3d::Wireframe.pass_name(), DEPTH_STENCIL)?;
        stages.push((Stage3d::Transparent, renderer.add_pass(transparent)?));

        renderer.setup_global_consumer_target(
            BACK_COLOR_BUFFER,
            Stage3d::Transparent.pass_name(),
            RENDER_TARGET,
        )?;
        renderer.finalize()?;

        let fullscreen = if present.is_some() {
            Some(cache.fetch::<RasterizerState>(
                device,
                &RasterizerParams::new(CullMode::None, FillMode::Solid),
            )?)
        } else {
            None
        };

        log::info!(
            "Renderer3d: assembled {} passes ({}x{}, offscreen: {})",
            renderer.pass_count(),
            config.width,
            config.height,
            config.offscreen
        );

        Ok(Self {
            renderer,
            back: BackBuffers {
                color: color_slot,
                depth,
                present,
            },
            blur_kernel,
            kernel_type: config.kernel_type,
            blur_radius: config.blur_radius,
            blur_sigma: config.blur_sigma,
            stages,
            fullscreen,
        })
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Render queue of `stage`.
    pub fn queue_mut(&mut self, stage: Stage3d) -> RenderResult<&mut RenderQueuePass> {
        let index = self
            .stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, index)| *index)
            .ok_or_else(|| RenderError::UnknownPass(stage.pass_name().to_string()))?;
        self.renderer.render_queue_at_mut(index)
    }

    /// Submit `job` to `stage` at `distance` from the camera.
    pub fn submit(
        &mut self,
        stage: Stage3d,
        job: Job,
        distance: f32,
        is_transparent: bool,
    ) -> RenderResult<()> {
        self.queue_mut(stage)?.add_job(job, distance, is_transparent);
        Ok(())
    }

    /// Run one frame. When rendering offscreen the final color surface is
    /// then drawn onto the presentation target.
    pub fn run(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        self.renderer.run(device)?;
        if let (Some(present), Some(color)) = (&self.back.present, slot_get(&self.back.color)) {
            present.bind_as_target(device);
            if let Some(rasterizer) = &self.fullscreen {
                rasterizer.bind(device);
            }
            color.bind(device);
            device.draw(3);
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.renderer.reset();
    }

    /// Switch the blur to gaussian weights.
    pub fn set_kernel_gauss(
        &mut self,
        device: &mut dyn GraphicsDevice,
        radius: u32,
        sigma: f32,
    ) -> RenderResult<()> {
        let kernel = BlurKernel::gauss(radius, sigma)?;
        self.blur_kernel.update(device, &kernel)?;
        self.kernel_type = KernelType::Gauss;
        self.blur_radius = radius;
        self.blur_sigma = sigma;
        Ok(())
    }

    /// Switch the blur to equal weights.
    pub fn set_kernel_box(
        &mut self,
        device: &mut dyn GraphicsDevice,
        radius: u32,
    ) -> RenderResult<()> {
        let kernel = BlurKernel::box_filter(radius)?;
        self.blur_kernel.update(device, &kernel)?;
        self.kernel_type = KernelType::Box;
        self.blur_radius = radius;
        Ok(())
    }

    pub fn kernel(&self) -> (KernelType, u32, f32) {
        (self.kernel_type, self.blur_radius, self.blur_sigma)
    }

    pub fn blur_kernel_buffer(&self) -> &Arc<ConstantBuffer> {
        &self.blur_kernel
    }

    /// Final color surface, after every pass has written to it.
    pub fn back_color(&self) -> Option<Arc<RenderTarget>> {
        slot_get(&self.back.color)
    }

    pub fn back_depth(&self) -> &Arc<DepthStencil> {
        &self.back.depth
    }

    pub fn is_offscreen(&self) -> bool {
        self.back.present.is_some()
    }
}
