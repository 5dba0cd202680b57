//! Render queue passes that draw scene geometry

use crate::backend::*;
use crate::bindable::*;
use crate::error::RenderResult;
use crate::render_graph::*;
use crate::surface::{DepthStencil, RenderSurface, RenderTarget};
use std::any::Any;
use std::sync::Arc;

/// Consumer/producer name of the threaded color surface.
pub const RENDER_TARGET: &str = "renderTarget";
/// Consumer/producer name of the threaded depth surface.
pub const DEPTH_STENCIL: &str = "depthStencil";
/// Linker exposing the shadow map to lit passes.
pub const SHADOW_MAP: &str = "shadowMap";
/// Linker exposing the reduced-resolution outline target.
pub const BLUR_OUTLINE_OUT: &str = "blurOutlineOut";

/// Pixel shader slot the shadow map is sampled from.
pub const SHADOW_MAP_SLOT: u32 = 3;

/// Consume both surfaces and hand them on under the same names.
pub(crate) fn thread_surfaces(base: &mut PassBase) -> RenderResult<()> {
    base.consume_render_target(RENDER_TARGET)?;
    base.consume_depth_stencil(DEPTH_STENCIL)?;
    base.produce_render_target(RENDER_TARGET)?;
    base.produce_depth_stencil(DEPTH_STENCIL)
}

/// Lit opaque geometry, sampling the shadow map.
pub fn lambertian_pass(
    device: &mut dyn GraphicsDevice,
    cache: &BindableCache,
    name: &str,
    job_capacity: usize,
) -> RenderResult<RenderQueuePass> {
    let mut pass = RenderQueuePass::with_capacity(name, job_capacity)?;
    let base = pass.base_mut();
    thread_surfaces(base)?;
    base.add_binder::<RenderTarget>(SHADOW_MAP)?;
    base.add_bindable(cache.fetch::<SamplerState>(
        device,
        &SamplerParams::new(FilterMode::Anisotropic, AddressMode::Wrap, 0),
    )?);
    base.add_bindable(cache.fetch::<SamplerState>(
        device,
        &SamplerParams::new(FilterMode::Bilinear, AddressMode::Border, SHADOW_MAP_SLOT),
    )?);
    base.add_bindable(cache.fetch::<RasterizerState>(device, &RasterizerParams::default())?);
    base.add_bindable(cache.fetch::<DepthStencilState>(device, &DepthStencilMode::Default)?);
    Ok(pass)
}

/// Writes the stencil mask of outlined objects. Depth only.
pub fn blur_outline_mask_pass(
    device: &mut dyn GraphicsDevice,
    cache: &BindableCache,
    name: &str,
    job_capacity: usize,
) -> RenderResult<RenderQueuePass> {
    let mut pass = RenderQueuePass::with_capacity(name, job_capacity)?;
    let base = pass.base_mut();
    base.consume_depth_stencil(DEPTH_STENCIL)?;
    base.produce_depth_stencil(DEPTH_STENCIL)?;
    base.add_bindable(cache.fetch::<DepthStencilState>(device, &DepthStencilMode::StencilWrite)?);
    base.add_bindable(cache.fetch::<RasterizerState>(device, &RasterizerParams::default())?);
    Ok(pass)
}

/// A render queue drawing into surfaces it owns, cleared at the start of
/// every run. The color surface is exported as a shareable bindable so later
/// passes can sample it.
pub struct OffscreenQueuePass {
    queue: RenderQueuePass,
    target: Arc<RenderTarget>,
    depth: Option<Arc<DepthStencil>>,
}

impl OffscreenQueuePass {
    /// Shadow casters rendered into a square shadow map, exported as
    /// [`SHADOW_MAP`].
    pub fn shadow_map(
        device: &mut dyn GraphicsDevice,
        cache: &BindableCache,
        name: &str,
        resolution: u32,
        job_capacity: usize,
    ) -> RenderResult<Self> {
        let target = RenderTarget::new(
            device,
            "shadowMap",
            resolution,
            resolution,
            TextureFormat::R32Float,
        )?
        .with_clear_color([1.0; 4])
        .with_texture_slot(SHADOW_MAP_SLOT);
        let depth = DepthStencil::new(
            device,
            "shadowDepth",
            resolution,
            resolution,
            TextureFormat::Depth32Float,
        )?;
        let mut pass = Self::new(name, target, Some(depth), SHADOW_MAP, job_capacity)?;

        let base = pass.queue.base_mut();
        base.add_bindable(cache.fetch::<RasterizerState>(
            device,
            &RasterizerParams::new(CullMode::Front, FillMode::Solid),
        )?);
        base.add_bindable(cache.fetch::<DepthStencilState>(device, &DepthStencilMode::Default)?);
        base.add_bindable(
            cache.fetch::<BlendState>(device, &BlendParams::new(BlendMode::NoBlend, 0))?,
        );
        Ok(pass)
    }

    /// Outlined objects drawn flat into a reduced-resolution target,
    /// exported as [`BLUR_OUTLINE_OUT`] for the blur passes.
    pub fn blur_outline_draw(
        device: &mut dyn GraphicsDevice,
        cache: &BindableCache,
        name: &str,
        size: (u32, u32),
        format: TextureFormat,
        job_capacity: usize,
    ) -> RenderResult<Self> {
        let target = RenderTarget::new(device, "blurOutlineDraw", size.0, size.1, format)?
            .with_clear_color([0.0; 4]);
        let mut pass = Self::new(name, target, None, BLUR_OUTLINE_OUT, job_capacity)?;

        let base = pass.queue.base_mut();
        base.add_bindable(cache.fetch::<DepthStencilState>(device, &DepthStencilMode::DepthOff)?);
        base.add_bindable(cache.fetch::<RasterizerState>(device, &RasterizerParams::default())?);
        Ok(pass)
    }

    fn new(
        name: &str,
        target: RenderTarget,
        depth: Option<DepthStencil>,
        linker: &str,
        job_capacity: usize,
    ) -> RenderResult<Self> {
        let mut queue = RenderQueuePass::with_capacity(name, job_capacity)?;
        let target = Arc::new(target);
        let depth = depth.map(Arc::new);

        let base = queue.base_mut();
        base.set_render_target(Arc::clone(&target));
        if let Some(depth) = &depth {
            base.set_depth_stencil(Arc::clone(depth));
        }
        base.add_linker(linker, Arc::clone(&target))?;
        Ok(Self {
            queue,
            target,
            depth,
        })
    }

    pub fn target(&self) -> &Arc<RenderTarget> {
        &self.target
    }
}

impl Pass for OffscreenQueuePass {
    fn base(&self) -> &PassBase {
        self.queue.base()
    }

    fn base_mut(&mut self) -> &mut PassBase {
        self.queue.base_mut()
    }

    fn run(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        self.target.clear(device);
        if let Some(depth) = &self.depth {
            depth.clear(device);
        }
        self.queue.run(device)
    }

    fn reset(&mut self) {
        self.queue.reset();
    }

    fn as_render_queue_mut(&mut self) -> Option<&mut RenderQueuePass> {
        Some(&mut self.queue)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Wireframe overlay.
pub fn wireframe_pass(
    device: &mut dyn GraphicsDevice,
    cache: &BindableCache,
    name: &str,
    job_capacity: usize,
) -> RenderResult<RenderQueuePass> {
    let mut pass = RenderQueuePass::with_capacity(name, job_capacity)?;
    let base = pass.base_mut();
    thread_surfaces(base)?;
    base.add_bindable(cache.fetch::<RasterizerState>(
        device,
        &RasterizerParams::new(CullMode::None, FillMode::Wireframe),
    )?);
    base.add_bindable(cache.fetch::<DepthStencilState>(device, &DepthStencilMode::DepthReadOnly)?);
    Ok(pass)
}

/// Alpha-blended geometry, drawn after everything opaque.
pub fn transparent_pass(
    device: &mut dyn GraphicsDevice,
    cache: &BindableCache,
    name: &str,
    job_capacity: usize,
) -> RenderResult<RenderQueuePass> {
    let mut pass = RenderQueuePass::with_capacity(name, job_capacity)?;
    let base = pass.base_mut();
    thread_surfaces(base)?;
    base.add_bindable(cache.fetch::<BlendState>(device, &BlendParams::new(BlendMode::Alpha, 0))?);
    base.add_bindable(cache.fetch::<DepthStencilState>(device, &DepthStencilMode::DepthReadOnly)?);
    base.add_bindable(cache.fetch::<RasterizerState>(
        device,
        &RasterizerParams::new(CullMode::None, FillMode::Solid),
    )?);
    Ok(pass)
}

/// Screen-space 2D sprites.
pub fn sprite_pass(
    device: &mut dyn GraphicsDevice,
    cache: &BindableCache,
    name: &str,
    job_capacity: usize,
) -> RenderResult<RenderQueuePass> {
    let mut pass = RenderQueuePass::with_capacity(name, job_capacity)?;
    let base = pass.base_mut();
    thread_surfaces(base)?;
    base.add_bindable(cache.fetch::<BlendState>(device, &BlendParams::new(BlendMode::Alpha, 0))?);
    base.add_bindable(cache.fetch::<DepthStencilState>(device, &DepthStencilMode::DepthOff)?);
    base.add_bindable(cache.fetch::<RasterizerState>(
        device,
        &RasterizerParams::new(CullMode::None, FillMode::Solid),
    )?);
    base.add_bindable(cache.fetch::<SamplerState>(
        device,
        &SamplerParams::new(FilterMode::Point, AddressMode::Clamp, 0),
    )?);
    Ok(pass)
}
