//! Pass Graph - name-wired render passes for real-time renderers
//!
//! Passes declare named imports (consumers) and exports (producers). A
//! [`Renderer`] resolves the names once while it is assembled, then runs its
//! passes in insertion order every frame.
//!
//! # Features
//! - Producer/consumer wiring with type-checked links and exclusive surfaces
//! - Render queues sorting opaque jobs front to back, transparent back to front
//! - Content-addressed cache deduplicating immutable GPU state objects
//! - Device abstraction with an in-memory recording implementation
//! - Example 3D and 2D pipelines

pub mod backend;
pub mod bindable;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod render_graph;
pub mod surface;

pub use backend::{BackendError, BackendResult, GraphicsDevice, RecordingDevice};
pub use bindable::{Bindable, BindableCache, Cacheable};
pub use config::{KernelType, RendererConfig};
pub use error::{ErrorKind, RenderError, RenderResult};
pub use render_graph::{
    Consumer, Job, Pass, PassBase, PassIndex, Producer, RenderQueuePass, Renderer,
};
pub use surface::{DepthStencil, RenderSurface, RenderTarget};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
