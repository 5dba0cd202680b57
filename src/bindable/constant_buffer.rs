//! Shader constant buffers

use crate::backend::*;
use crate::bindable::Bindable;
use crate::error::{RenderError, RenderResult};
use crate::render_graph::{ResourceTag, Tagged};
use bytemuck::{Pod, Zeroable};

/// A constant buffer bound to a fixed slot of one or more shader stages.
///
/// Contents are written through the device; the buffer object itself is
/// immutable and may be linked into any number of passes.
#[derive(Debug)]
pub struct ConstantBuffer {
    buffer: BufferHandle,
    stages: ShaderStages,
    slot: u32,
    size: u64,
}

impl ConstantBuffer {
    /// Create a buffer initialised with `data`.
    pub fn new<T: Pod>(
        device: &mut dyn GraphicsDevice,
        label: &str,
        stages: ShaderStages,
        slot: u32,
        data: &T,
    ) -> BackendResult<Self> {
        let bytes = bytemuck::bytes_of(data);
        let size = bytes.len() as u64;
        let buffer = device.create_buffer_init(
            &BufferDescriptor {
                label: Some(label.to_string()),
                size,
                stages,
            },
            bytes,
        )?;
        Ok(Self {
            buffer,
            stages,
            slot,
            size,
        })
    }

    /// Replace the contents.
    pub fn update<T: Pod>(&self, device: &mut dyn GraphicsDevice, data: &T) -> RenderResult<()> {
        let bytes = bytemuck::bytes_of(data);
        if bytes.len() as u64 != self.size {
            return Err(RenderError::InvalidParameter(format!(
                "constant buffer update of {} bytes, buffer holds {}",
                bytes.len(),
                self.size
            )));
        }
        device.write_buffer(self.buffer, 0, bytes);
        Ok(())
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Bindable for ConstantBuffer {
    fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.set_constant_buffer(self.stages, self.slot, self.buffer);
    }
}

impl Tagged for ConstantBuffer {
    const TAG: ResourceTag = ResourceTag::new("ConstantBuffer");
}

/// Largest supported blur radius.
pub const MAX_BLUR_RADIUS: u32 = 13;
/// Largest supported gaussian sigma.
pub const MAX_BLUR_SIGMA: f32 = 7.0;
/// Taps needed for [`MAX_BLUR_RADIUS`].
pub const MAX_BLUR_TAPS: usize = (MAX_BLUR_RADIUS * 2 + 1) as usize;

/// Separable blur kernel, laid out with one coefficient per 16-byte row.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct BlurKernel {
    pub taps: u32,
    pub _padding: [u32; 3],
    pub coefficients: [[f32; 4]; MAX_BLUR_TAPS],
}

impl BlurKernel {
    /// Normalised gaussian weights over `2 * radius + 1` taps.
    pub fn gauss(radius: u32, sigma: f32) -> RenderResult<Self> {
        validate_radius(radius)?;
        if !(sigma > 0.0 && sigma <= MAX_BLUR_SIGMA) {
            return Err(RenderError::InvalidParameter(format!(
                "blur sigma {sigma} outside (0, {MAX_BLUR_SIGMA}]"
            )));
        }

        let taps = radius * 2 + 1;
        let mut kernel = Self::zeroed();
        kernel.taps = taps;
        let mut sum = 0.0;
        for i in 0..taps {
            let x = i as f32 - radius as f32;
            let g = gauss(x, sigma);
            sum += g;
            kernel.coefficients[i as usize][0] = g;
        }
        for coefficient in &mut kernel.coefficients[..taps as usize] {
            coefficient[0] /= sum;
        }
        Ok(kernel)
    }

    /// Equal weights over `2 * radius + 1` taps.
    pub fn box_filter(radius: u32) -> RenderResult<Self> {
        validate_radius(radius)?;
        let taps = radius * 2 + 1;
        let mut kernel = Self::zeroed();
        kernel.taps = taps;
        let weight = 1.0 / taps as f32;
        for coefficient in &mut kernel.coefficients[..taps as usize] {
            coefficient[0] = weight;
        }
        Ok(kernel)
    }

    /// Active weights.
    pub fn weights(&self) -> impl Iterator<Item = f32> + '_ {
        self.coefficients[..self.taps as usize].iter().map(|c| c[0])
    }
}

fn validate_radius(radius: u32) -> RenderResult<()> {
    if radius > MAX_BLUR_RADIUS {
        return Err(RenderError::InvalidParameter(format!(
            "blur radius {radius} exceeds {MAX_BLUR_RADIUS}"
        )));
    }
    Ok(())
}

fn gauss(x: f32, sigma: f32) -> f32 {
    let ss = sigma * sigma;
    (1.0 / (2.0 * std::f32::consts::PI * ss).sqrt()) * (-(x * x) / (2.0 * ss)).exp()
}

/// Blur pass direction flag.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct BlurDirection {
    pub horizontal: u32,
    pub _padding: [u32; 3],
}

impl BlurDirection {
    pub fn new(horizontal: bool) -> Self {
        Self {
            horizontal: horizontal as u32,
            _padding: [0; 3],
        }
    }
}
