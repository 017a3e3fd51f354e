//! Core path tracing integrator.
//!
//! Paths are traced with an explicit loop rather than recursion: each
//! bounce multiplies a running attenuation (throughput) and adds any light
//! the surface emits, weighted by that throughput.

use crate::{Camera, Color, Scene};
use lumen_core::{Background, RenderSettings};
use lumen_math::{Interval, Ray};
use rand::RngCore;

/// Radiance arriving along `ray`, following at most `settings.max_depth`
/// surface interactions.
///
/// Escaping the scene adds the background and ends the path; an absorbed
/// ray ends it with what has been gathered so far. A path that runs out of
/// bounces also returns only what it has gathered, without background.
pub fn ray_color(
    ray: &Ray,
    scene: &Scene,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> Color {
    let ray_t = Interval::new(settings.t_min, f32::INFINITY);
    let mut radiance = Color::ZERO;
    let mut attenuation = Color::ONE;
    let mut current = *ray;

    for _ in 0..settings.max_depth {
        let Some((_, rec)) = scene.closest_hit(&current, ray_t) else {
            return radiance + attenuation * background_color(scene.background(), &current);
        };

        radiance += attenuation * rec.material.emitted(rec.u, rec.v, rec.p);

        match rec.material.scatter(&current, &rec, rng) {
            Some(result) => {
                attenuation *= result.attenuation;
                current = result.scattered;
            }
            None => return radiance,
        }
    }

    radiance
}

/// Color of the environment seen along `ray`.
pub fn background_color(background: &Background, ray: &Ray) -> Color {
    match *background {
        Background::Gradient { bottom, top } => {
            let unit_direction = ray.direction().normalize_or_zero();
            let a = 0.5 * (unit_direction.y + 1.0);
            bottom.lerp(top, a)
        }
        Background::Solid { color } => color,
    }
}

/// Gamma 2 transfer; non-positive and NaN inputs map to 0.
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Per-channel [`linear_to_gamma`].
#[inline]
pub fn color_to_gamma(color: Color) -> Color {
    Color::new(
        linear_to_gamma(color.x),
        linear_to_gamma(color.y),
        linear_to_gamma(color.z),
    )
}

/// Quantize a gamma-space color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let quantize = |c: f32| (255.0 * c.clamp(0.0, 1.0)).round() as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z), 255]
}

/// Average of `settings.samples_per_frame` camera samples through pixel
/// (x, y), in linear space.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = settings.samples_per_frame.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, scene, settings, rng);
    }

    pixel_color / samples as f32
}
