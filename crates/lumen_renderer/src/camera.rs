//! Camera for ray generation.

use crate::random::{gen_f32, random_in_unit_disk, sample_square};
use lumen_core::CameraSettings;
use lumen_math::{Ray, Vec3};
use rand::RngCore;

/// Thin-lens camera with its frame and viewport precomputed.
///
/// Pixel (0, 0) is the top-left corner of the image; rows grow downwards.
#[derive(Clone, Debug)]
pub struct Camera {
    settings: CameraSettings,
    image_height: u32,

    // Cached values
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    pub fn new(settings: CameraSettings) -> Self {
        let image_width = settings.image_width.max(1);
        let image_height = settings.image_height();
        let center = settings.look_from;

        // Viewport dimensions
        let theta = settings.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * settings.focus_dist;
        let viewport_width = viewport_height * (image_width as f32 / image_height as f32);

        // Orthonormal frame
        let w = (settings.look_from - settings.look_at).normalize_or_zero();
        let u = Self::right_vector(settings.vup, w);
        let v = w.cross(u);

        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / image_width as f32;
        let pixel_delta_v = viewport_v / image_height as f32;

        let viewport_upper_left =
            center - settings.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = settings.focus_dist * (settings.defocus_angle / 2.0).to_radians().tan();

        Self {
            settings,
            image_height,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            w,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        }
    }

    /// `vup x w`, or a substitute when `vup` is parallel to the view axis.
    fn right_vector(vup: Vec3, w: Vec3) -> Vec3 {
        let right = vup.cross(w);
        if right.length_squared() > 1e-12 {
            return right.normalize();
        }

        let fallback = if w.y.abs() < 0.999 { Vec3::Y } else { Vec3::Z };
        log::warn!(
            "Camera up vector {} is parallel to the view direction, using {} instead",
            vup,
            fallback
        );
        fallback.cross(w).normalize_or_zero()
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn image_width(&self) -> u32 {
        self.settings.image_width.max(1)
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Camera basis (right, up, backwards).
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    /// Random ray through pixel (i, j) at a random shutter time.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.settings.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        let ray_direction = pixel_sample - ray_origin;
        let ray_time = gen_f32(rng);

        Ray::new(ray_origin, ray_direction, ray_time)
    }

    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}
