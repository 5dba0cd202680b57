//! Renderer configuration

use crate::backend::TextureFormat;

/// Blur kernel shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelType {
    #[default]
    Gauss,
    Box,
}

/// Configuration for assembling a renderer
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Back buffer width
    pub width: u32,
    /// Back buffer height
    pub height: u32,
    pub color_format: TextureFormat,
    pub depth_format: TextureFormat,
    pub clear_color: [f32; 4],
    pub clear_depth: f32,
    /// Render into offscreen surfaces instead of the back buffer
    pub offscreen: bool,
    /// Offscreen blur targets are `width / factor` by `height / factor`
    pub blur_reduction_factor: u32,
    pub blur_radius: u32,
    pub blur_sigma: f32,
    pub kernel_type: KernelType,
    /// Initial job capacity of every render queue
    pub job_capacity: usize,
    /// Shadow map edge length in texels
    pub shadow_map_resolution: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            color_format: TextureFormat::Bgra8Unorm,
            depth_format: TextureFormat::Depth24PlusStencil8,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            clear_depth: 1.0,
            offscreen: true,
            blur_reduction_factor: 2,
            blur_radius: 4,
            blur_sigma: 2.6,
            kernel_type: KernelType::Gauss,
            job_capacity: 64,
            shadow_map_resolution: 1024,
        }
    }
}

impl RendererConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_formats(mut self, color: TextureFormat, depth: TextureFormat) -> Self {
        self.color_format = color;
        self.depth_format = depth;
        self
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_clear_depth(mut self, depth: f32) -> Self {
        self.clear_depth = depth;
        self
    }

    pub fn with_offscreen(mut self, offscreen: bool) -> Self {
        self.offscreen = offscreen;
        self
    }

    pub fn with_blur(mut self, kernel_type: KernelType, radius: u32, sigma: f32) -> Self {
        self.kernel_type = kernel_type;
        self.blur_radius = radius;
        self.blur_sigma = sigma;
        self
    }

    pub fn with_blur_reduction_factor(mut self, factor: u32) -> Self {
        self.blur_reduction_factor = factor;
        self
    }

    pub fn with_job_capacity(mut self, capacity: usize) -> Self {
        self.job_capacity = capacity;
        self
    }

    /// Size of the reduced-resolution blur targets.
    pub fn blur_target_size(&self) -> (u32, u32) {
        let factor = self.blur_reduction_factor.max(1);
        ((self.width / factor).max(1), (self.height / factor).max(1))
    }
}
