//! Common types shared between the device layer and the pass graph

use bitflags::bitflags;

/// Texture format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Rgba16Float,
    R32Float,
    Depth32Float,
    Depth24PlusStencil8,
}

impl TextureFormat {
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::Depth32Float | TextureFormat::Depth24PlusStencil8
        )
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm
            | TextureFormat::R32Float
            | TextureFormat::Depth32Float
            | TextureFormat::Depth24PlusStencil8 => 4,
            TextureFormat::Rgba16Float => 8,
        }
    }
}

bitflags! {
    /// Usage flags for textures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be sampled in a shader.
        const TEXTURE_BINDING = 1 << 0;
        /// Texture can be used as a color render attachment.
        const RENDER_ATTACHMENT = 1 << 1;
        /// Texture can be used as a depth/stencil attachment.
        const DEPTH_ATTACHMENT = 1 << 2;
        /// Texture can be copied from (diagnostic dumps).
        const COPY_SRC = 1 << 3;
    }
}

bitflags! {
    /// Shader stages a constant buffer is visible to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStages: u32 {
        const VERTEX = 1 << 0;
        const PIXEL = 1 << 1;
        const COMPUTE = 1 << 2;
        const VERTEX_PIXEL = Self::VERTEX.bits() | Self::PIXEL.bits();
    }
}

/// Texture descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    /// Describe a 2D texture.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            label: None,
            width,
            height,
            format,
            usage,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Constant buffer descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct BufferDescriptor {
    pub label: Option<String>,
    pub size: u64,
    pub stages: ShaderStages,
}

/// Face culling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Polygon fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillMode {
    Solid,
    Wireframe,
}

/// Output merger blending presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    NoBlend,
    Alpha,
    Additive,
    Multiplicative,
}

/// Depth/stencil presets used by the stock passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthStencilMode {
    /// Depth test and write on, stencil off.
    Default,
    /// Depth test on, depth write off.
    DepthReadOnly,
    /// Depth test and write off.
    DepthOff,
    /// Greater-equal comparison for reversed-z geometry.
    DepthReversed,
    /// Stencil write used to mask outlined geometry.
    StencilWrite,
    /// Stencil test against a previously written mask.
    StencilMask,
}

/// Filter mode for samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Point,
    Bilinear,
    Trilinear,
    Anisotropic,
}

/// Address mode for samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    Wrap,
    Mirror,
    Clamp,
    Border,
}

/// Sampler descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerDescriptor {
    pub label: Option<String>,
    pub filter: FilterMode,
    pub address: AddressMode,
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            filter: FilterMode::Bilinear,
            address: AddressMode::Clamp,
        }
    }
}

/// Immutable fixed-function state object descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateDescriptor {
    Rasterizer { cull: CullMode, fill: FillMode },
    Blend { mode: BlendMode, target_slot: u32 },
    DepthStencil { mode: DepthStencilMode },
}
