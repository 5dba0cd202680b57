//! Core device abstraction
//!
//! The pass graph never talks to a GPU API directly. Every bindable and
//! surface wraps handles created through [`GraphicsDevice`], and every
//! per-frame command goes through it as well.

use crate::backend::types::*;
use thiserror::Error;

/// Device error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Failed to create sampler: {0}")]
    SamplerCreationFailed(String),
    #[error("Failed to create state object: {0}")]
    StateCreationFailed(String),
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Device lost")]
    DeviceLost,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// Handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

/// Handle to a texture view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureViewHandle(pub(crate) u64);

/// Handle to a sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerHandle(pub(crate) u64);

/// Handle to an immutable rasterizer/blend/depth-stencil state object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHandle(pub(crate) u64);

/// Graphics device collaborator
///
/// Creation methods may fail with a device-level error; the pass graph treats
/// such failures as fatal and never retries them.
pub trait GraphicsDevice {
    /// Get the device name for diagnostics
    fn name(&self) -> &str;

    // Resource creation

    /// Create a texture
    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle>;

    /// Create a view over a whole texture
    fn create_texture_view(&mut self, texture: TextureHandle) -> BackendResult<TextureViewHandle>;

    /// Create a constant buffer with initial contents
    fn create_buffer_init(
        &mut self,
        desc: &BufferDescriptor,
        data: &[u8],
    ) -> BackendResult<BufferHandle>;

    /// Write data to a buffer
    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]);

    /// Create a sampler
    fn create_sampler(&mut self, desc: &SamplerDescriptor) -> BackendResult<SamplerHandle>;

    /// Create a fixed-function state object
    fn create_state(&mut self, desc: &StateDescriptor) -> BackendResult<StateHandle>;

    // Command recording

    /// Bind color and/or depth targets for subsequent draws
    fn set_render_targets(
        &mut self,
        color: Option<TextureViewHandle>,
        depth: Option<TextureViewHandle>,
    );

    /// Clear a color target
    fn clear_color(&mut self, view: TextureViewHandle, color: [f32; 4]);

    /// Clear a depth target
    fn clear_depth(&mut self, view: TextureViewHandle, depth: f32, stencil: u8);

    /// Bind a fixed-function state object
    fn set_state(&mut self, state: StateHandle);

    /// Bind a sampler to a pixel shader slot
    fn set_sampler(&mut self, slot: u32, sampler: SamplerHandle);

    /// Bind a texture view as shader input
    fn set_texture(&mut self, slot: u32, view: TextureViewHandle);

    /// Bind a constant buffer
    fn set_constant_buffer(&mut self, stages: ShaderStages, slot: u32, buffer: BufferHandle);

    /// Draw non-indexed primitives
    fn draw(&mut self, vertex_count: u32);

    /// Draw indexed primitives
    fn draw_indexed(&mut self, index_count: u32);
}
