//! Pass Graph System
//!
//! Passes declare what they import (consumers) and export (producers) by
//! name. The [`Renderer`] resolves those names once during assembly into
//! shared references, then runs the passes in insertion order every frame.

pub mod consumer;
pub mod naming;
pub mod pass;
pub mod producer;
pub mod queue;
pub mod renderer;
pub mod resource;

pub use consumer::*;
pub use naming::*;
pub use pass::*;
pub use producer::*;
pub use queue::*;
pub use renderer::*;
pub use resource::*;
