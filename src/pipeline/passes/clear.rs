//! Surface clear pass

use crate::backend::GraphicsDevice;
use crate::error::{RenderError, RenderResult};
use crate::render_graph::*;
use crate::surface::RenderSurface;
use std::any::Any;
use std::sync::Arc;

/// Name of the consumer and producer of a [`ClearPass`].
pub const CLEAR_BUFFER: &str = "buffer";

/// Takes a surface, clears it and hands it on under the same name.
///
/// Binds nothing but the surface it clears, so it owns no color or depth
/// target of its own.
pub struct ClearPass<S: RenderSurface + Tagged> {
    base: PassBase,
    surface: Slot<S>,
}

impl<S: RenderSurface + Tagged> ClearPass<S> {
    pub fn new(name: impl Into<String>) -> RenderResult<Self> {
        let mut base = PassBase::new(name)?;
        base.set_binds_surfaces_dynamically(true);

        let surface: Slot<S> = empty_slot();
        base.add_consumer(Box::new(SlotConsumer::new(
            CLEAR_BUFFER,
            Arc::clone(&surface),
        )?))?;
        base.add_producer(Box::new(SurfaceProducer::new(
            CLEAR_BUFFER,
            Arc::clone(&surface),
        )?))?;

        Ok(Self { base, surface })
    }

    /// Surface linked into this pass, if any.
    pub fn surface(&self) -> Option<Arc<S>> {
        slot_get(&self.surface)
    }
}

impl<S: RenderSurface + Tagged> Pass for ClearPass<S> {
    fn base(&self) -> &PassBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PassBase {
        &mut self.base
    }

    fn run(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        let surface = self
            .surface()
            .ok_or_else(|| RenderError::LinkageUnresolved {
                pass: self.base.name().to_string(),
                consumer: CLEAR_BUFFER.to_string(),
            })?;
        surface.clear(device);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::*;
    use crate::surface::{DepthStencil, RenderTarget};

    #[test]
    fn test_validates_without_owned_surface() {
        let mut pass = ClearPass::<RenderTarget>::new("clearRt").unwrap();
        // unlinked consumer is still reported
        assert!(matches!(
            pass.validate(),
            Err(RenderError::LinkageUnresolved { .. })
        ));

        let mut device = RecordingDevice::new();
        let rt = RenderTarget::new(&mut device, "back", 4, 4, TextureFormat::Rgba8Unorm).unwrap();
        let mut producer = SurfaceProducer::new("back", filled_slot(Arc::new(rt))).unwrap();
        for consumer in pass.base_mut().consumers_mut() {
            consumer.link("clearRt", &mut producer).unwrap();
        }
        assert!(pass.validate().is_ok());
    }

    #[test]
    fn test_clears_linked_surface() {
        let mut device = RecordingDevice::new();
        let ds = Arc::new(
            DepthStencil::new(&mut device, "ds", 4, 4, TextureFormat::Depth32Float).unwrap(),
        );
        let mut pass = ClearPass::<DepthStencil>::new("clearDs").unwrap();
        *pass.surface.write() = Some(Arc::clone(&ds));
        device.take_commands();

        pass.run(&mut device).unwrap();
        assert_eq!(
            device.commands(),
            &[DeviceCommand::ClearDepth {
                view: ds.view(),
                depth: 1.0,
                stencil: 0
            }]
        );
    }
}
