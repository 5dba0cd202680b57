//! Stock passes the example pipelines are assembled from

mod blur;
mod clear;
mod geometry;

pub use blur::{HorizontalBlurPass, VerticalBlurPass, BLUR_DIRECTION, BLUR_IN, BLUR_KERNEL};
pub use clear::{ClearPass, CLEAR_BUFFER};
pub use geometry::{
    blur_outline_mask_pass, lambertian_pass, sprite_pass, transparent_pass, wireframe_pass,
    OffscreenQueuePass, BLUR_OUTLINE_OUT, DEPTH_STENCIL, RENDER_TARGET, SHADOW_MAP,
    SHADOW_MAP_SLOT,
};
