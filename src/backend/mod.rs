//! Device abstraction layer
//!
//! Provides the device trait the pass graph records into, plus an in-memory
//! recording implementation.

pub mod recording;
pub mod traits;
pub mod types;

pub use recording::*;
pub use traits::*;
pub use types::*;
