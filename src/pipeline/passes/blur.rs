//! Separable blur passes
//!
//! Both passes read the kernel and the direction flag from global constant
//! buffers. The horizontal pass blurs into its own reduced-resolution target,
//! the vertical pass blends the result over the threaded color surface.

use crate::backend::*;
use crate::bindable::*;
use crate::error::{RenderError, RenderResult};
use crate::pipeline::passes::geometry::{thread_surfaces, BLUR_OUTLINE_OUT};
use crate::render_graph::*;
use crate::surface::{RenderSurface, RenderTarget};
use std::any::Any;
use std::sync::Arc;

/// Binder reading the texture to blur.
pub const BLUR_IN: &str = "blurIn";
/// Global constant buffer holding the kernel.
pub const BLUR_KERNEL: &str = "blurKernel";
/// Global constant buffer holding the direction flag.
pub const BLUR_DIRECTION: &str = "blurDirection";

/// Vertices of the fullscreen triangle.
const FULLSCREEN_VERTICES: u32 = 3;

/// Bindables, binders and the direction consumer common to both passes.
fn setup_fullscreen(
    device: &mut dyn GraphicsDevice,
    cache: &BindableCache,
    base: &mut PassBase,
) -> RenderResult<Slot<ConstantBuffer>> {
    base.add_bindable(cache.fetch::<RasterizerState>(
        device,
        &RasterizerParams::new(CullMode::None, FillMode::Solid),
    )?);
    base.add_bindable(cache.fetch::<SamplerState>(
        device,
        &SamplerParams::new(FilterMode::Trilinear, AddressMode::Clamp, 0),
    )?);
    base.add_binder::<ConstantBuffer>(BLUR_KERNEL)?;
    base.add_binder::<RenderTarget>(BLUR_IN)?;

    let direction: Slot<ConstantBuffer> = empty_slot();
    base.add_consumer(Box::new(SlotConsumer::new(
        BLUR_DIRECTION,
        Arc::clone(&direction),
    )?))?;
    Ok(direction)
}

/// Write the direction flag, then bind it.
fn bind_direction(
    base: &PassBase,
    direction: &Slot<ConstantBuffer>,
    device: &mut dyn GraphicsDevice,
    horizontal: bool,
) -> RenderResult<()> {
    let buffer = slot_get(direction).ok_or_else(|| RenderError::LinkageUnresolved {
        pass: base.name().to_string(),
        consumer: BLUR_DIRECTION.to_string(),
    })?;
    buffer.update(device, &BlurDirection::new(horizontal))?;
    buffer.bind(device);
    Ok(())
}

/// Horizontal half of the blur, rendered at reduced resolution.
pub struct HorizontalBlurPass {
    base: PassBase,
    direction: Slot<ConstantBuffer>,
    target: Arc<RenderTarget>,
}

impl HorizontalBlurPass {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        cache: &BindableCache,
        name: &str,
        size: (u32, u32),
        format: TextureFormat,
    ) -> RenderResult<Self> {
        let mut base = PassBase::new(name)?;
        let direction = setup_fullscreen(device, cache, &mut base)?;

        let target = Arc::new(
            RenderTarget::new(device, "horizontalBlur", size.0, size.1, format)?
                .with_clear_color([0.0; 4]),
        );
        base.set_render_target(Arc::clone(&target));
        base.add_linker(BLUR_OUTLINE_OUT, Arc::clone(&target))?;

        Ok(Self {
            base,
            direction,
            target,
        })
    }
}

impl Pass for HorizontalBlurPass {
    fn base(&self) -> &PassBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PassBase {
        &mut self.base
    }

    fn run(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        self.target.clear(device);
        bind_direction(&self.base, &self.direction, device, true)?;
        self.base.bind(device)?;
        device.draw(FULLSCREEN_VERTICES);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Vertical half of the blur, blended over the outlined objects' stencil
/// mask onto the main color surface.
pub struct VerticalBlurPass {
    base: PassBase,
    direction: Slot<ConstantBuffer>,
}

impl VerticalBlurPass {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        cache: &BindableCache,
        name: &str,
    ) -> RenderResult<Self> {
        let mut base = PassBase::new(name)?;
        let direction = setup_fullscreen(device, cache, &mut base)?;
        thread_surfaces(&mut base)?;
        let blend = BlendParams::new(BlendMode::Alpha, 0);
        base.add_bindable(cache.fetch::<BlendState>(device, &blend)?);
        base.add_bindable(cache.fetch::<DepthStencilState>(
            device,
            &DepthStencilMode::StencilMask,
        )?);
        Ok(Self { base, direction })
    }
}

impl Pass for VerticalBlurPass {
    fn base(&self) -> &PassBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PassBase {
        &mut self.base
    }

    fn run(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        bind_direction(&self.base, &self.direction, device, false)?;
        self.base.bind(device)?;
        device.draw(FULLSCREEN_VERTICES);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
