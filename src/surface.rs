//! Render surfaces: color and depth targets a pass draws into

use crate::backend::*;
use crate::bindable::Bindable;
use crate::render_graph::{ResourceTag, Tagged};

/// A color or depth target.
pub trait RenderSurface: Send + Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Bind this surface as the only output.
    fn bind_as_target(&self, device: &mut dyn GraphicsDevice);

    /// Clear to the surface's clear value.
    fn clear(&self, device: &mut dyn GraphicsDevice);
}

/// Color render target. Can also be sampled by later passes.
#[derive(Debug)]
pub struct RenderTarget {
    texture: TextureHandle,
    view: TextureViewHandle,
    width: u32,
    height: u32,
    format: TextureFormat,
    clear_color: [f32; 4],
    texture_slot: u32,
}

impl RenderTarget {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> BackendResult<Self> {
        if format.is_depth() {
            return Err(BackendError::TextureCreationFailed(format!(
                "{label}: {format:?} is not a color format"
            )));
        }
        let texture = device.create_texture(
            &TextureDescriptor::new_2d(
                width.max(1),
                height.max(1),
                format,
                TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
            )
            .with_label(label),
        )?;
        let view = device.create_texture_view(texture)?;
        Ok(Self {
            texture,
            view,
            width: width.max(1),
            height: height.max(1),
            format,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            texture_slot: 0,
        })
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Pixel shader slot used when bound as an input texture.
    pub fn with_texture_slot(mut self, slot: u32) -> Self {
        self.texture_slot = slot;
        self
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn view(&self) -> TextureViewHandle {
        self.view
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Bind as color output with an optional depth attachment.
    pub fn bind_with_depth(&self, device: &mut dyn GraphicsDevice, depth: Option<&DepthStencil>) {
        device.set_render_targets(Some(self.view), depth.map(|d| d.view()));
    }
}

impl RenderSurface for RenderTarget {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn bind_as_target(&self, device: &mut dyn GraphicsDevice) {
        self.bind_with_depth(device, None);
    }

    fn clear(&self, device: &mut dyn GraphicsDevice) {
        device.clear_color(self.view, self.clear_color);
    }
}

impl Bindable for RenderTarget {
    fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.set_texture(self.texture_slot, self.view);
    }
}

impl Tagged for RenderTarget {
    const TAG: ResourceTag = ResourceTag::new("RenderTarget");
}

/// Depth/stencil target
#[derive(Debug)]
pub struct DepthStencil {
    texture: TextureHandle,
    view: TextureViewHandle,
    width: u32,
    height: u32,
    clear_depth: f32,
    clear_stencil: u8,
}

impl DepthStencil {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> BackendResult<Self> {
        if !format.is_depth() {
            return Err(BackendError::TextureCreationFailed(format!(
                "{label}: {format:?} is not a depth format"
            )));
        }
        let texture = device.create_texture(
            &TextureDescriptor::new_2d(
                width.max(1),
                height.max(1),
                format,
                TextureUsage::DEPTH_ATTACHMENT,
            )
            .with_label(label),
        )?;
        let view = device.create_texture_view(texture)?;
        Ok(Self {
            texture,
            view,
            width: width.max(1),
            height: height.max(1),
            clear_depth: 1.0,
            clear_stencil: 0,
        })
    }

    pub fn with_clear_depth(mut self, depth: f32) -> Self {
        self.clear_depth = depth;
        self
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn view(&self) -> TextureViewHandle {
        self.view
    }
}

impl RenderSurface for DepthStencil {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn bind_as_target(&self, device: &mut dyn GraphicsDevice) {
        device.set_render_targets(None, Some(self.view));
    }

    fn clear(&self, device: &mut dyn GraphicsDevice) {
        device.clear_depth(self.view, self.clear_depth, self.clear_stencil);
    }
}

impl Tagged for DepthStencil {
    const TAG: ResourceTag = ResourceTag::new("DepthStencil");
}
