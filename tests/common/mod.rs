//! Shared helpers for the integration tests

#![allow(dead_code)]

use pass_graph::backend::*;
use pass_graph::render_graph::*;
use pass_graph::{DepthStencil, RenderResult, RenderTarget};
use std::any::Any;
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn color_target(device: &mut RecordingDevice, label: &str) -> Arc<RenderTarget> {
    Arc::new(RenderTarget::new(device, label, 8, 8, TextureFormat::Rgba8Unorm).unwrap())
}

pub fn depth_target(device: &mut RecordingDevice, label: &str) -> Arc<DepthStencil> {
    Arc::new(DepthStencil::new(device, label, 8, 8, TextureFormat::Depth24PlusStencil8).unwrap())
}

/// Job drawing `index_count` indices with no extra state, so draws can be
/// identified by their count.
pub fn job(index_count: u32) -> Job {
    Job::new(
        Arc::new(IndexedDrawable::new(index_count)),
        Arc::new(BindableEffect::new()),
    )
}

/// Pass that binds its surfaces and issues one non-indexed draw carrying
/// `marker`, so execution order shows up in the recorded commands.
pub struct MarkerPass {
    base: PassBase,
    marker: u32,
}

impl MarkerPass {
    /// Pass owning a color and a depth surface, exporting both.
    pub fn source(device: &mut RecordingDevice, name: &str, marker: u32) -> Self {
        let mut base = PassBase::new(name).unwrap();
        base.set_render_target(color_target(device, name));
        base.set_depth_stencil(depth_target(device, name));
        base.produce_render_target("renderTarget").unwrap();
        base.produce_depth_stencil("depthStencil").unwrap();
        Self { base, marker }
    }

    /// Pass consuming both surfaces from `from` and handing them on.
    pub fn threading(name: &str, from: &str, marker: u32) -> Self {
        let mut base = PassBase::new(name).unwrap();
        base.consume_render_target("renderTarget").unwrap();
        base.consume_depth_stencil("depthStencil").unwrap();
        base.produce_render_target("renderTarget").unwrap();
        base.produce_depth_stencil("depthStencil").unwrap();
        base.setup_consumer_target("renderTarget", from, "renderTarget")
            .unwrap();
        base.setup_consumer_target("depthStencil", from, "depthStencil")
            .unwrap();
        Self { base, marker }
    }

    /// Pass with no consumers and no surfaces of its own.
    pub fn bare(name: &str, marker: u32) -> Self {
        Self {
            base: PassBase::new(name).unwrap(),
            marker,
        }
    }
}

impl Pass for MarkerPass {
    fn base(&self) -> &PassBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PassBase {
        &mut self.base
    }

    fn run(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        self.base.bind(device)?;
        device.draw(self.marker);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Markers of every non-indexed draw, in submission order.
pub fn markers(device: &RecordingDevice) -> Vec<u32> {
    device
        .commands()
        .iter()
        .filter_map(|c| match c {
            DeviceCommand::Draw { vertex_count } => Some(*vertex_count),
            _ => None,
        })
        .collect()
}
