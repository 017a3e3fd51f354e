use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use lumen_core::{presets, SceneDescription, TextureCache, PRESET_NAMES};
use lumen_renderer::RenderSession;

mod cli;

use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::from(args.log_level))
        .format_timestamp_millis()
        .init();

    if args.list_presets {
        for name in PRESET_NAMES {
            println!("{name}");
        }
        return Ok(());
    }

    let (desc, mut textures) = load_scene(&args)?;
    let desc = apply_overrides(desc, &args);

    let build_start = Instant::now();
    let mut session = RenderSession::from_description(&desc, &mut textures, args.seed)
        .with_context(|| format!("Failed to build scene '{}'", desc.name))?;
    info!("Scene ready in {:.2?}", build_start.elapsed());

    if let Some(path) = &args.dump_bvh {
        let flat = session.scene().bvh().flatten();
        std::fs::write(path, flat.as_bytes())
            .with_context(|| format!("Failed to write BVH to {}", path.display()))?;
        info!("Wrote {} BVH nodes to {}", flat.len(), path.display());
    }

    let camera = session.camera();
    info!(
        "Rendering '{}' at {}x{}, {} frames of {} spp (max depth {})",
        desc.name,
        camera.image_width(),
        camera.image_height(),
        args.frames,
        session.settings().samples_per_frame,
        session.settings().max_depth
    );

    let render_start = Instant::now();
    for frame in 1..=args.frames {
        let stats = session.render_frame();
        if frame.is_power_of_two() || frame == args.frames {
            info!(
                "Frame {}/{} ({:.1} ms)",
                stats.iteration,
                args.frames,
                stats.elapsed.as_secs_f64() * 1000.0
            );
        }
    }
    let render_time = render_start.elapsed();
    info!(
        "Rendered {} frames in {:.2?} ({:.1} ms/frame)",
        args.frames,
        render_time,
        render_time.as_secs_f64() * 1000.0 / args.frames.max(1) as f64
    );

    save_image(&session, &args.output)?;
    info!("Saved {}", args.output.display());

    Ok(())
}

/// The scene named on the command line, plus a texture cache rooted next
/// to the scene file.
fn load_scene(args: &Args) -> Result<(SceneDescription, TextureCache)> {
    match &args.scene {
        Some(path) => {
            let desc = SceneDescription::load(path)
                .with_context(|| format!("Failed to load scene {}", path.display()))?;
            let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
            Ok((desc, TextureCache::with_base_dir(base_dir)))
        }
        None => {
            let desc = presets::preset(&args.preset).with_context(|| {
                format!("Available presets: {}", PRESET_NAMES.join(", "))
            })?;
            Ok((desc, TextureCache::new()))
        }
    }
}

fn apply_overrides(mut desc: SceneDescription, args: &Args) -> SceneDescription {
    if let Some(width) = args.width {
        desc.camera.image_width = width;
    }
    if let Some(samples) = args.samples {
        desc.settings.samples_per_frame = samples;
    }
    if let Some(max_depth) = args.max_depth {
        desc.settings.max_depth = max_depth;
    }
    desc
}

fn save_image(session: &RenderSession, path: &Path) -> Result<()> {
    let camera = session.camera();
    let (width, height) = (camera.image_width(), camera.image_height());

    let Some(img) = image::RgbaImage::from_raw(width, height, session.frame_rgba()) else {
        bail!("Frame buffer does not match {width}x{height}");
    };

    // Formats without alpha (JPEG, PPM) get RGB.
    let rgb = image::DynamicImage::ImageRgba8(img).into_rgb8();
    rgb.save(path)
        .with_context(|| format!("Failed to save image to {}", path.display()))?;
    Ok(())
}
