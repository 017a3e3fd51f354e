//! Progressive render of a scene built directly from primitives.
//!
//! Accumulates frames of a small lit room and saves the result as PPM.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use lumen_core::{Background, CameraSettings, RenderSettings};
use lumen_renderer::{ImageBuffer, Material, Primitive, Quad, RenderSession, Scene, Sphere, Vec3};

const FRAMES: u32 = 128;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Lumen - Simple Progressive Example");
    println!("==================================");

    let start = std::time::Instant::now();
    let scene = Scene::new(build_room(), Background::black())?;
    println!(
        "Scene built in {:?} ({} primitives, BVH depth {})",
        start.elapsed(),
        scene.primitives().len(),
        scene.bvh().depth()
    );

    let camera = CameraSettings::default()
        .with_resolution(320, 1.0)
        .with_position(Vec3::new(0.0, 1.0, 3.4), Vec3::new(0.0, 1.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 3.4);
    let settings = RenderSettings {
        samples_per_frame: 4,
        max_depth: 12,
        ..Default::default()
    };

    let mut session = RenderSession::new(scene, camera, settings, 1);
    println!("Rendering {} frames...", FRAMES);
    let render_time = session.render_frames(FRAMES);
    println!("Rendered in {:?}", render_time);

    let filename = "output.ppm";
    save_ppm(session.image(), filename)?;
    println!("Saved to {}", filename);
    Ok(())
}

fn build_room() -> Vec<Primitive> {
    let white = Arc::new(Material::lambertian(Vec3::splat(0.73)));
    let red = Arc::new(Material::lambertian(Vec3::new(0.65, 0.05, 0.05)));
    let green = Arc::new(Material::lambertian(Vec3::new(0.12, 0.45, 0.15)));
    let light = Arc::new(Material::diffuse_light(Vec3::splat(12.0)));
    let glass = Arc::new(Material::dielectric(1.5));
    let steel = Arc::new(Material::metal(Vec3::new(0.8, 0.85, 0.9), 0.05));

    vec![
        // Floor, ceiling, back wall
        Quad::new(Vec3::new(-1.0, 0.0, 1.0), Vec3::X * 2.0, Vec3::NEG_Z * 2.0, white.clone()).into(),
        Quad::new(Vec3::new(-1.0, 2.0, -1.0), Vec3::X * 2.0, Vec3::Z * 2.0, white.clone()).into(),
        Quad::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::X * 2.0, Vec3::Y * 2.0, white).into(),
        // Side walls
        Quad::new(Vec3::new(-1.0, 0.0, 1.0), Vec3::NEG_Z * 2.0, Vec3::Y * 2.0, red).into(),
        Quad::new(Vec3::new(1.0, 0.0, -1.0), Vec3::Z * 2.0, Vec3::Y * 2.0, green).into(),
        // Ceiling light, facing down
        Quad::new(Vec3::new(-0.3, 1.999, -0.3), Vec3::X * 0.6, Vec3::Z * 0.6, light).into(),
        Sphere::new(Vec3::new(-0.4, 0.35, -0.2), 0.35, glass).into(),
        Sphere::new(Vec3::new(0.45, 0.3, 0.25), 0.3, steel).into(),
    ]
}

fn save_ppm(image: &ImageBuffer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for rgba in image.to_rgba8().chunks_exact(4) {
        writeln!(writer, "{} {} {}", rgba[0], rgba[1], rgba[2])?;
    }

    Ok(())
}
