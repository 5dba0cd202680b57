//! Fixed-function state objects and samplers

use crate::backend::*;
use crate::bindable::{Bindable, Cacheable};

/// Rasterizer construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterizerParams {
    pub cull: CullMode,
    pub fill: FillMode,
}

impl RasterizerParams {
    pub fn new(cull: CullMode, fill: FillMode) -> Self {
        Self { cull, fill }
    }
}

impl Default for RasterizerParams {
    fn default() -> Self {
        Self::new(CullMode::Back, FillMode::Solid)
    }
}

/// Rasterizer state
#[derive(Debug)]
pub struct RasterizerState {
    params: RasterizerParams,
    handle: StateHandle,
}

impl RasterizerState {
    pub fn params(&self) -> RasterizerParams {
        self.params
    }

    pub fn handle(&self) -> StateHandle {
        self.handle
    }
}

impl Bindable for RasterizerState {
    fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.set_state(self.handle);
    }
}

impl Cacheable for RasterizerState {
    type Params = RasterizerParams;

    fn content_key(params: &RasterizerParams) -> String {
        let cull = match params.cull {
            CullMode::None => "N",
            CullMode::Front => "F",
            CullMode::Back => "B",
        };
        let fill = match params.fill {
            FillMode::Solid => "S",
            FillMode::Wireframe => "W",
        };
        format!("{cull}{fill}")
    }

    fn create(device: &mut dyn GraphicsDevice, params: &RasterizerParams) -> BackendResult<Self> {
        let handle = device.create_state(&StateDescriptor::Rasterizer {
            cull: params.cull,
            fill: params.fill,
        })?;
        Ok(Self {
            params: *params,
            handle,
        })
    }
}

/// Blend construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendParams {
    pub mode: BlendMode,
    /// Render target slot the blend description applies to.
    pub target_slot: u32,
}

impl BlendParams {
    pub fn new(mode: BlendMode, target_slot: u32) -> Self {
        Self { mode, target_slot }
    }
}

/// Output merger blend state
#[derive(Debug)]
pub struct BlendState {
    params: BlendParams,
    handle: StateHandle,
}

impl BlendState {
    pub fn params(&self) -> BlendParams {
        self.params
    }

    pub fn is_blending(&self) -> bool {
        self.params.mode != BlendMode::NoBlend
    }
}

impl Bindable for BlendState {
    fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.set_state(self.handle);
    }
}

impl Cacheable for BlendState {
    type Params = BlendParams;

    fn content_key(params: &BlendParams) -> String {
        format!("{:?}@{}", params.mode, params.target_slot)
    }

    fn create(device: &mut dyn GraphicsDevice, params: &BlendParams) -> BackendResult<Self> {
        let handle = device.create_state(&StateDescriptor::Blend {
            mode: params.mode,
            target_slot: params.target_slot,
        })?;
        Ok(Self {
            params: *params,
            handle,
        })
    }
}

/// Depth/stencil state
#[derive(Debug)]
pub struct DepthStencilState {
    mode: DepthStencilMode,
    handle: StateHandle,
}

impl DepthStencilState {
    pub fn mode(&self) -> DepthStencilMode {
        self.mode
    }
}

impl Bindable for DepthStencilState {
    fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.set_state(self.handle);
    }
}

impl Cacheable for DepthStencilState {
    type Params = DepthStencilMode;

    fn content_key(mode: &DepthStencilMode) -> String {
        format!("{:?}", mode)
    }

    fn create(device: &mut dyn GraphicsDevice, mode: &DepthStencilMode) -> BackendResult<Self> {
        let handle = device.create_state(&StateDescriptor::DepthStencil { mode: *mode })?;
        Ok(Self {
            mode: *mode,
            handle,
        })
    }
}

/// Sampler construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerParams {
    pub filter: FilterMode,
    pub address: AddressMode,
    pub slot: u32,
}

impl SamplerParams {
    pub fn new(filter: FilterMode, address: AddressMode, slot: u32) -> Self {
        Self {
            filter,
            address,
            slot,
        }
    }
}

/// Texture sampler bound to a pixel shader slot
#[derive(Debug)]
pub struct SamplerState {
    params: SamplerParams,
    handle: SamplerHandle,
}

impl SamplerState {
    pub fn params(&self) -> SamplerParams {
        self.params
    }
}

impl Bindable for SamplerState {
    fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.set_sampler(self.params.slot, self.handle);
    }
}

impl Cacheable for SamplerState {
    type Params = SamplerParams;

    fn content_key(params: &SamplerParams) -> String {
        format!("{:?}#{:?}@{}", params.filter, params.address, params.slot)
    }

    fn create(device: &mut dyn GraphicsDevice, params: &SamplerParams) -> BackendResult<Self> {
        let handle = device.create_sampler(&SamplerDescriptor {
            label: Some(format!("sampler@{}", params.slot)),
            filter: params.filter,
            address: params.address,
        })?;
        Ok(Self {
            params: *params,
            handle,
        })
    }
}
