//! Frame Demo
//!
//! Assembles the 3D or 2D pipeline on the recording device, drives a small
//! orbiting scene for a number of frames and logs what each frame recorded.
//!
//! ```text
//! cargo run --example frame_demo -- --mode 3d --frames 4 --blur box --blur-radius 6
//! ```

use clap::Parser;
use glam::Vec3;
use pass_graph::backend::*;
use pass_graph::bindable::*;
use pass_graph::pipeline::*;
use pass_graph::render_graph::*;
use pass_graph::{KernelType, RenderResult, RendererConfig};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum Mode {
    /// Shadowed, outlined 3D scene.
    #[default]
    #[value(name = "3d")]
    ThreeD,
    /// Depth-sorted sprites.
    #[value(name = "2d")]
    TwoD,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum BlurKind {
    #[default]
    Gauss,
    Box,
}

impl From<BlurKind> for KernelType {
    fn from(kind: BlurKind) -> Self {
        match kind {
            BlurKind::Gauss => KernelType::Gauss,
            BlurKind::Box => KernelType::Box,
        }
    }
}

/// Pass graph frame demo.
#[derive(Parser, Debug)]
#[command(name = "frame_demo", about = "Runs the stock pipelines on a recording device", version)]
struct Args {
    /// Pipeline to assemble.
    #[arg(long, default_value = "3d", value_enum)]
    mode: Mode,

    /// Number of frames to render.
    #[arg(long, default_value = "3")]
    frames: u32,

    /// Blur kernel of the outline effect.
    #[arg(long, default_value = "gauss", value_enum)]
    blur: BlurKind,

    /// Blur radius in taps on each side.
    #[arg(long, default_value = "4")]
    blur_radius: u32,

    /// Gaussian sigma. Ignored for box blur.
    #[arg(long, default_value = "2.6")]
    blur_sigma: f32,

    /// Render straight to the back buffer instead of presenting an offscreen
    /// copy.
    #[arg(long)]
    no_offscreen: bool,
}

/// Scene object: a position and the job drawing it.
struct Object {
    position: Vec3,
    job: Job,
    transparent: bool,
}

fn scene(device: &mut dyn GraphicsDevice, cache: &BindableCache) -> RenderResult<Vec<Object>> {
    let opaque = cache.fetch::<BlendState>(device, &BlendParams::new(BlendMode::NoBlend, 0))?;
    let alpha = cache.fetch::<BlendState>(device, &BlendParams::new(BlendMode::Alpha, 0))?;

    let mut objects = Vec::new();
    for (i, position) in [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(3.0, 0.0, -2.0),
        Vec3::new(-4.0, 1.0, 1.0),
        Vec3::new(1.0, 2.0, 5.0),
    ]
    .into_iter()
    .enumerate()
    {
        let transparent = i % 2 == 1;
        let blend: Arc<dyn Bindable> = if transparent {
            alpha.clone()
        } else {
            opaque.clone()
        };
        objects.push(Object {
            position,
            job: Job::new(
                Arc::new(IndexedDrawable::new(36 * (i as u32 + 1))),
                Arc::new(BindableEffect::new().with_bindable(blend)),
            ),
            transparent,
        });
    }
    Ok(objects)
}

fn camera_at(frame: u32) -> Vec3 {
    let angle = frame as f32 * 0.4;
    Vec3::new(angle.cos() * 10.0, 3.0, angle.sin() * 10.0)
}

fn run_3d(args: &Args, config: &RendererConfig) -> RenderResult<()> {
    let mut device = RecordingDevice::new();
    let cache = BindableCache::new();
    let mut renderer = Renderer3d::new(&mut device, &cache, config)?;
    let objects = scene(&mut device, &cache)?;
    log::info!(
        "Assembled {} passes, {} device objects, {} cached bindables",
        renderer.renderer().pass_count(),
        device.created_count(),
        cache.instance_count()
    );
    device.take_commands();

    for frame in 0..args.frames {
        let camera = camera_at(frame);
        for object in &objects {
            let stages: &[Stage3d] = if object.transparent {
                &[Stage3d::Shadow, Stage3d::Transparent]
            } else {
                &[Stage3d::Shadow, Stage3d::Lambertian, Stage3d::Wireframe]
            };
            for stage in stages {
                renderer.queue_mut(*stage)?.add_job_at(
                    object.job.clone(),
                    camera,
                    object.position,
                    object.transparent && *stage == Stage3d::Transparent,
                );
            }
        }
        // Outline the first object
        if let Some(first) = objects.first() {
            for stage in [Stage3d::BlurOutlineMask, Stage3d::BlurOutlineDraw] {
                renderer
                    .queue_mut(stage)?
                    .add_job_at(first.job.clone(), camera, first.position, false);
            }
        }

        // Alternate kernels to show the shared buffer being rewritten
        if frame % 2 == 1 {
            match args.blur {
                BlurKind::Gauss => renderer.set_kernel_box(&mut device, args.blur_radius)?,
                BlurKind::Box => {
                    renderer.set_kernel_gauss(&mut device, args.blur_radius, args.blur_sigma)?
                }
            }
        }

        renderer.run(&mut device)?;
        renderer.reset();
        report(frame, &mut device);
    }
    Ok(())
}

fn run_2d(args: &Args, config: &RendererConfig) -> RenderResult<()> {
    let mut device = RecordingDevice::new();
    let cache = BindableCache::new();
    let mut renderer = Renderer2d::new(&mut device, &cache, config)?;
    let objects = scene(&mut device, &cache)?;
    device.take_commands();

    for frame in 0..args.frames {
        for object in &objects {
            // Sprites are layered by their z coordinate, offset per frame
            let depth = object.position.z + frame as f32;
            renderer.submit(object.job.clone(), depth, object.transparent)?;
        }
        renderer.run(&mut device)?;
        renderer.reset();
        report(frame, &mut device);
    }
    Ok(())
}

fn report(frame: u32, device: &mut RecordingDevice) {
    let draws = device.draw_calls();
    let commands = device.take_commands();
    log::info!(
        "Frame {}: {} commands, indexed draws {:?}",
        frame,
        commands.len(),
        draws
    );
}

fn main() -> RenderResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("Pass graph version: {}", pass_graph::VERSION);

    let config = RendererConfig::default()
        .with_offscreen(!args.no_offscreen)
        .with_blur(args.blur.into(), args.blur_radius, args.blur_sigma);

    match args.mode {
        Mode::ThreeD => run_3d(&args, &config),
        Mode::TwoD => run_2d(&args, &config),
    }
}
