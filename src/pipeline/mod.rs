//! Example pipelines
//!
//! Two fully wired configurations of the pass graph:
//! 1. [`Renderer3d`] - clear, shadow map, lit geometry, stencil-masked
//!    separable blur outline, wireframe and transparent geometry
//! 2. [`Renderer2d`] - clear, then a single sprite queue
//!
//! Both link the final color surface back into the global
//! `backColorbuffer` consumer.

pub mod passes;
pub mod renderer_2d;
pub mod renderer_3d;

pub use renderer_2d::{Renderer2d, PASS_2D};
pub use renderer_3d::{Renderer3d, Stage3d, BACK_COLOR_BUFFER, BACK_DEPTH_BUFFER};
