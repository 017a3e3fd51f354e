//! Named example scenes.
//!
//! Each preset is an ordinary [`SceneDescription`]; nothing in the renderer
//! knows about them. Random sphere fields are generated from a fixed seed,
//! so a preset always produces the same object list.

use lumen_math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::scene::{box_quads, MaterialDesc, ObjectDesc, SceneDescription, SceneError, SceneResult};
use crate::settings::{Background, CameraSettings, RenderSettings};

/// Seed for the random sphere fields.
const FIELD_SEED: u64 = 0x5eed_1e55;

/// All preset names accepted by [`preset`].
pub const PRESET_NAMES: &[&str] = &[
    "ground",
    "glass",
    "three-spheres",
    "book-cover",
    "bouncing-spheres",
    "checkered-spheres",
    "checkered-ground",
    "defocus",
    "cornell-box",
    "simple-light",
];

/// Build a preset scene by name.
pub fn preset(name: &str) -> SceneResult<SceneDescription> {
    let scene = match name {
        "ground" => ground(),
        "glass" => glass(),
        "three-spheres" => three_spheres(),
        "book-cover" => book_cover(),
        "bouncing-spheres" => bouncing_spheres(),
        "checkered-spheres" => checkered_spheres(),
        "checkered-ground" => checkered_ground(),
        "defocus" => defocus(),
        "cornell-box" => cornell_box(),
        "simple-light" => simple_light(),
        _ => return Err(SceneError::UnknownPreset(name.to_string())),
    };

    log::debug!(
        "Built preset '{}' with {} objects",
        name,
        scene.object_count()
    );
    Ok(scene)
}

/// One huge diffuse sphere seen from straight above.
fn ground() -> SceneDescription {
    let camera = CameraSettings::default()
        .with_position(Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO, Vec3::NEG_Z)
        .with_lens(40.0, 0.0, 2.0);

    let mut scene = SceneDescription::new("ground", camera);
    scene.add_material("ground", MaterialDesc::lambertian(Vec3::splat(0.5)));
    scene.add_object(ObjectDesc::sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, "ground"));
    scene
}

/// A lone glass ball in front of the sky gradient.
fn glass() -> SceneDescription {
    let camera = CameraSettings::default()
        .with_position(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y)
        .with_lens(40.0, 0.0, 4.0);

    let mut scene = SceneDescription::new("glass", camera);
    scene.add_material("glass", MaterialDesc::dielectric(1.5));
    scene.add_object(ObjectDesc::sphere(Vec3::ZERO, 1.0, "glass"));
    scene
}

fn cover_camera() -> CameraSettings {
    CameraSettings::default()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0)
}

/// Ground plus the glass, diffuse and metal feature spheres.
fn add_feature_spheres(scene: &mut SceneDescription) {
    scene.add_material("glass", MaterialDesc::dielectric(1.5));
    scene.add_material("brown", MaterialDesc::lambertian(Vec3::new(0.4, 0.2, 0.1)));
    scene.add_material("bronze", MaterialDesc::metal(Vec3::new(0.7, 0.6, 0.5), 0.0));

    scene.add_object(ObjectDesc::sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, "glass"));
    scene.add_object(ObjectDesc::sphere(Vec3::new(-4.0, 1.0, 0.0), 1.0, "brown"));
    scene.add_object(ObjectDesc::sphere(Vec3::new(4.0, 1.0, 0.0), 1.0, "bronze"));
}

fn three_spheres() -> SceneDescription {
    let mut scene = SceneDescription::new("three-spheres", cover_camera());
    scene.add_material("ground", MaterialDesc::lambertian(Vec3::splat(0.5)));
    scene.add_object(ObjectDesc::sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, "ground"));
    add_feature_spheres(&mut scene);
    scene
}

/// Scatter small spheres over a 14x14 grid, keeping clear of the metal
/// feature sphere. Diffuse spheres bounce upwards over the shutter
/// interval when `moving` is set.
fn add_sphere_field(scene: &mut SceneDescription, moving: bool) {
    let mut rng = StdRng::seed_from_u64(FIELD_SEED);
    let keep_clear = Vec3::new(4.0, 0.2, 0.0);

    for a in -7..7 {
        for b in -7..7 {
            let choose_mat: f32 = rng.gen();
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            if (center - keep_clear).length() <= 0.9 {
                continue;
            }

            let name = format!("small_{}_{}", a + 7, b + 7);
            if choose_mat < 0.8 {
                let albedo = Vec3::new(
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                );
                scene.add_material(name.clone(), MaterialDesc::lambertian(albedo));
                if moving {
                    let center2 = center + Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
                    scene.add_object(ObjectDesc::moving_sphere(center, center2, 0.2, name));
                } else {
                    scene.add_object(ObjectDesc::sphere(center, 0.2, name));
                }
            } else if choose_mat < 0.95 {
                let albedo = Vec3::new(
                    rng.gen_range(0.5..1.0),
                    rng.gen_range(0.5..1.0),
                    rng.gen_range(0.5..1.0),
                );
                let fuzz = rng.gen_range(0.0..0.5);
                scene.add_material(name.clone(), MaterialDesc::metal(albedo, fuzz));
                scene.add_object(ObjectDesc::sphere(center, 0.2, name));
            } else {
                scene.add_object(ObjectDesc::sphere(center, 0.2, "glass"));
            }
        }
    }
}

fn book_cover() -> SceneDescription {
    let mut scene = three_spheres();
    scene.name = "book-cover".into();
    add_sphere_field(&mut scene, false);
    scene
}

fn bouncing_spheres() -> SceneDescription {
    let mut scene = SceneDescription::new("bouncing-spheres", cover_camera());
    scene.add_material(
        "ground",
        MaterialDesc::checker(0.32, Vec3::new(0.2, 0.3, 0.1), Vec3::splat(0.9)),
    );
    scene.add_object(ObjectDesc::sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, "ground"));
    add_feature_spheres(&mut scene);
    add_sphere_field(&mut scene, true);
    scene
}

fn checkered_spheres() -> SceneDescription {
    let camera = cover_camera().with_lens(20.0, 0.0, 10.0);
    let mut scene = SceneDescription::new("checkered-spheres", camera);
    scene.add_material(
        "checker",
        MaterialDesc::checker(0.32, Vec3::new(0.2, 0.3, 0.1), Vec3::splat(0.9)),
    );
    scene.add_object(ObjectDesc::sphere(Vec3::new(0.0, -10.0, 0.0), 10.0, "checker"));
    scene.add_object(ObjectDesc::sphere(Vec3::new(0.0, 10.0, 0.0), 10.0, "checker"));
    scene
}

fn checkered_ground() -> SceneDescription {
    let mut scene = SceneDescription::new("checkered-ground", cover_camera());
    scene.add_material(
        "ground",
        MaterialDesc::checker(0.32, Vec3::new(0.2, 0.3, 0.1), Vec3::splat(0.9)),
    );
    scene.add_object(ObjectDesc::sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, "ground"));
    add_feature_spheres(&mut scene);
    scene
}

/// Close-up of three spheres with a wide aperture.
fn defocus() -> SceneDescription {
    let camera = CameraSettings::default()
        .with_position(Vec3::new(-2.0, 2.0, 1.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_lens(20.0, 10.0, 3.4);

    let mut scene = SceneDescription::new("defocus", camera);
    scene.add_material("ground", MaterialDesc::lambertian(Vec3::new(0.8, 0.8, 0.0)));
    scene.add_material("center", MaterialDesc::lambertian(Vec3::new(0.1, 0.2, 0.5)));
    scene.add_material("glass", MaterialDesc::dielectric(1.5));
    scene.add_material("bubble", MaterialDesc::dielectric(1.0 / 1.5));
    scene.add_material("gold", MaterialDesc::metal(Vec3::new(0.8, 0.6, 0.2), 1.0));

    scene.add_object(ObjectDesc::sphere(Vec3::new(0.0, -100.5, -1.0), 100.0, "ground"));
    scene.add_object(ObjectDesc::sphere(Vec3::new(0.0, 0.0, -1.2), 0.5, "center"));
    scene.add_object(ObjectDesc::sphere(Vec3::new(-1.0, 0.0, -1.0), 0.5, "glass"));
    scene.add_object(ObjectDesc::sphere(Vec3::new(-1.0, 0.0, -1.0), 0.4, "bubble"));
    scene.add_object(ObjectDesc::sphere(Vec3::new(1.0, 0.0, -1.0), 0.5, "gold"));
    scene
}

fn cornell_box() -> SceneDescription {
    let camera = CameraSettings::default()
        .with_position(
            Vec3::new(278.0, 278.0, -800.0),
            Vec3::new(278.0, 278.0, 0.0),
            Vec3::Y,
        )
        .with_lens(40.0, 0.0, 10.0)
        .with_resolution(300, 1.0);

    let settings = RenderSettings {
        max_depth: 20,
        ..RenderSettings::default()
    };

    let mut scene = SceneDescription::new("cornell-box", camera)
        .with_background(Background::black())
        .with_settings(settings);

    scene.add_material("red", MaterialDesc::lambertian(Vec3::new(0.65, 0.05, 0.05)));
    scene.add_material("white", MaterialDesc::lambertian(Vec3::splat(0.73)));
    scene.add_material("green", MaterialDesc::lambertian(Vec3::new(0.12, 0.45, 0.15)));
    scene.add_material("light", MaterialDesc::light(Vec3::splat(15.0)));

    let side = 555.0;
    scene.add_object(ObjectDesc::quad(
        Vec3::new(side, 0.0, 0.0),
        Vec3::new(0.0, side, 0.0),
        Vec3::new(0.0, 0.0, side),
        "green",
    ));
    scene.add_object(ObjectDesc::quad(
        Vec3::ZERO,
        Vec3::new(0.0, side, 0.0),
        Vec3::new(0.0, 0.0, side),
        "red",
    ));
    scene.add_object(ObjectDesc::quad(
        Vec3::new(343.0, 554.0, 332.0),
        Vec3::new(-130.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -105.0),
        "light",
    ));
    scene.add_object(ObjectDesc::quad(
        Vec3::ZERO,
        Vec3::new(side, 0.0, 0.0),
        Vec3::new(0.0, 0.0, side),
        "white",
    ));
    scene.add_object(ObjectDesc::quad(
        Vec3::splat(side),
        Vec3::new(-side, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -side),
        "white",
    ));
    scene.add_object(ObjectDesc::quad(
        Vec3::new(0.0, 0.0, side),
        Vec3::new(side, 0.0, 0.0),
        Vec3::new(0.0, side, 0.0),
        "white",
    ));

    for quad in box_quads(Vec3::new(130.0, 0.0, 65.0), Vec3::new(295.0, 165.0, 230.0), "white") {
        scene.add_object(quad);
    }
    for quad in box_quads(Vec3::new(265.0, 0.0, 295.0), Vec3::new(430.0, 330.0, 460.0), "white") {
        scene.add_object(quad);
    }

    scene
}

fn simple_light() -> SceneDescription {
    let camera = CameraSettings::default()
        .with_position(Vec3::new(26.0, 3.0, 6.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y)
        .with_lens(20.0, 0.0, 10.0);

    let mut scene =
        SceneDescription::new("simple-light", camera).with_background(Background::black());

    scene.add_material(
        "ground",
        MaterialDesc::checker(0.32, Vec3::new(0.2, 0.3, 0.1), Vec3::splat(0.9)),
    );
    scene.add_material("matte", MaterialDesc::lambertian(Vec3::new(0.7, 0.3, 0.3)));
    scene.add_material("light", MaterialDesc::light(Vec3::splat(4.0)));

    scene.add_object(ObjectDesc::sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, "ground"));
    scene.add_object(ObjectDesc::sphere(Vec3::new(0.0, 2.0, 0.0), 2.0, "matte"));
    scene.add_object(ObjectDesc::quad(
        Vec3::new(3.0, 1.0, -2.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 2.0, 0.0),
        "light",
    ));
    scene.add_object(ObjectDesc::sphere(Vec3::new(0.0, 7.0, 0.0), 2.0, "light"));
    scene
}
