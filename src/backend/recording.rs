//! Recording device for testing and development.
//!
//! This device doesn't perform any GPU work. It hands out fresh handles for
//! every creation call and records every command it receives, so the order
//! in which passes bind and draw can be inspected afterwards.

use crate::backend::traits::*;
use crate::backend::types::*;

/// A single command received by the [`RecordingDevice`]
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CreateTexture {
        handle: TextureHandle,
        label: Option<String>,
    },
    CreateTextureView {
        texture: TextureHandle,
        view: TextureViewHandle,
    },
    CreateBuffer {
        handle: BufferHandle,
        size: u64,
    },
    WriteBuffer {
        buffer: BufferHandle,
        offset: u64,
        data: Vec<u8>,
    },
    CreateSampler {
        handle: SamplerHandle,
        filter: FilterMode,
        address: AddressMode,
    },
    CreateState {
        handle: StateHandle,
        desc: StateDescriptor,
    },
    SetRenderTargets {
        color: Option<TextureViewHandle>,
        depth: Option<TextureViewHandle>,
    },
    ClearColor {
        view: TextureViewHandle,
        color: [f32; 4],
    },
    ClearDepth {
        view: TextureViewHandle,
        depth: f32,
        stencil: u8,
    },
    SetState(StateHandle),
    SetSampler {
        slot: u32,
        sampler: SamplerHandle,
    },
    SetTexture {
        slot: u32,
        view: TextureViewHandle,
    },
    SetConstantBuffer {
        stages: ShaderStages,
        slot: u32,
        buffer: BufferHandle,
    },
    Draw {
        vertex_count: u32,
    },
    DrawIndexed {
        index_count: u32,
    },
}

impl DeviceCommand {
    /// Whether this command creates a device object.
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            DeviceCommand::CreateTexture { .. }
                | DeviceCommand::CreateTextureView { .. }
                | DeviceCommand::CreateBuffer { .. }
                | DeviceCommand::CreateSampler { .. }
                | DeviceCommand::CreateState { .. }
        )
    }
}

/// In-memory graphics device that records every command.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_id: u64,
    commands: Vec<DeviceCommand>,
    /// Creation calls to let through before failing, and the failure.
    pending_failure: Option<(usize, BackendError)>,
}

impl RecordingDevice {
    /// Create a new recording device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next creation call fail with `err`.
    pub fn fail_next_creation(&mut self, err: BackendError) {
        self.fail_creation_after(0, err);
    }

    /// Let `successes` creation calls through, then fail the next one.
    pub fn fail_creation_after(&mut self, successes: usize, err: BackendError) {
        self.pending_failure = Some((successes, err));
    }

    /// All commands recorded so far.
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Recorded commands issued after setup, i.e. without creation calls.
    pub fn frame_commands(&self) -> Vec<&DeviceCommand> {
        self.commands.iter().filter(|c| !c.is_creation()).collect()
    }

    /// Index counts of every indexed draw, in submission order.
    pub fn draw_calls(&self) -> Vec<u32> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::DrawIndexed { index_count } => Some(*index_count),
                _ => None,
            })
            .collect()
    }

    /// Number of objects created through this device.
    pub fn created_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_creation()).count()
    }

    fn allocate(&mut self) -> BackendResult<u64> {
        match self.pending_failure.take() {
            Some((0, err)) => {
                log::trace!("RecordingDevice: injected creation failure: {}", err);
                return Err(err);
            }
            Some((remaining, err)) => self.pending_failure = Some((remaining - 1, err)),
            None => {}
        }
        self.next_id += 1;
        Ok(self.next_id)
    }
}

impl GraphicsDevice for RecordingDevice {
    fn name(&self) -> &str {
        "Recording Device"
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle> {
        let handle = TextureHandle(self.allocate()?);
        log::trace!(
            "RecordingDevice: creating texture {:?} ({}x{} {:?})",
            desc.label,
            desc.width,
            desc.height,
            desc.format
        );
        self.commands.push(DeviceCommand::CreateTexture {
            handle,
            label: desc.label.clone(),
        });
        Ok(handle)
    }

    fn create_texture_view(&mut self, texture: TextureHandle) -> BackendResult<TextureViewHandle> {
        let view = TextureViewHandle(self.allocate()?);
        self.commands
            .push(DeviceCommand::CreateTextureView { texture, view });
        Ok(view)
    }

    fn create_buffer_init(
        &mut self,
        desc: &BufferDescriptor,
        data: &[u8],
    ) -> BackendResult<BufferHandle> {
        if data.len() as u64 > desc.size {
            return Err(BackendError::BufferCreationFailed(format!(
                "initial data ({} bytes) exceeds buffer size {}",
                data.len(),
                desc.size
            )));
        }
        let handle = BufferHandle(self.allocate()?);
        log::trace!(
            "RecordingDevice: creating buffer {:?} (size: {})",
            desc.label,
            desc.size
        );
        self.commands.push(DeviceCommand::CreateBuffer {
            handle,
            size: desc.size,
        });
        Ok(handle)
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        self.commands.push(DeviceCommand::WriteBuffer {
            buffer,
            offset,
            data: data.to_vec(),
        });
    }

    fn create_sampler(&mut self, desc: &SamplerDescriptor) -> BackendResult<SamplerHandle> {
        let handle = SamplerHandle(self.allocate()?);
        log::trace!("RecordingDevice: creating sampler {:?}", desc.label);
        self.commands.push(DeviceCommand::CreateSampler {
            handle,
            filter: desc.filter,
            address: desc.address,
        });
        Ok(handle)
    }

    fn create_state(&mut self, desc: &StateDescriptor) -> BackendResult<StateHandle> {
        let handle = StateHandle(self.allocate()?);
        log::trace!("RecordingDevice: creating state {:?}", desc);
        self.commands
            .push(DeviceCommand::CreateState { handle, desc: *desc });
        Ok(handle)
    }

    fn set_render_targets(
        &mut self,
        color: Option<TextureViewHandle>,
        depth: Option<TextureViewHandle>,
    ) {
        self.commands
            .push(DeviceCommand::SetRenderTargets { color, depth });
    }

    fn clear_color(&mut self, view: TextureViewHandle, color: [f32; 4]) {
        self.commands.push(DeviceCommand::ClearColor { view, color });
    }

    fn clear_depth(&mut self, view: TextureViewHandle, depth: f32, stencil: u8) {
        self.commands.push(DeviceCommand::ClearDepth {
            view,
            depth,
            stencil,
        });
    }

    fn set_state(&mut self, state: StateHandle) {
        self.commands.push(DeviceCommand::SetState(state));
    }

    fn set_sampler(&mut self, slot: u32, sampler: SamplerHandle) {
        self.commands.push(DeviceCommand::SetSampler { slot, sampler });
    }

    fn set_texture(&mut self, slot: u32, view: TextureViewHandle) {
        self.commands.push(DeviceCommand::SetTexture { slot, view });
    }

    fn set_constant_buffer(&mut self, stages: ShaderStages, slot: u32, buffer: BufferHandle) {
        self.commands.push(DeviceCommand::SetConstantBuffer {
            stages,
            slot,
            buffer,
        });
    }

    fn draw(&mut self, vertex_count: u32) {
        self.commands.push(DeviceCommand::Draw { vertex_count });
    }

    fn draw_indexed(&mut self, index_count: u32) {
        log::trace!("RecordingDevice: draw_indexed({})", index_count);
        self.commands.push(DeviceCommand::DrawIndexed { index_count });
    }
}
