//! Bindables: immutable GPU state objects a pass or job binds before drawing
//!
//! Most bindables are deduplicated through [`BindableCache`]; constant
//! buffers and render targets are owned directly by whoever creates them.

pub mod cache;
pub mod constant_buffer;
pub mod state;

pub use cache::*;
pub use constant_buffer::*;
pub use state::*;

use crate::backend::GraphicsDevice;
use std::any::Any;

/// A GPU state object that can be bound to the pipeline.
pub trait Bindable: Any + Send + Sync {
    /// Bind to the device for subsequent draws.
    fn bind(&self, device: &mut dyn GraphicsDevice);
}
