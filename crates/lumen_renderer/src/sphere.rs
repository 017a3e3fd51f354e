//! Sphere primitive, optionally moving linearly over the shutter interval.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;
use lumen_math::{Aabb, Interval, Ray, Vec3};

/// A sphere whose center travels from `center1` (time 0) to `center2`
/// (time 1). Stationary spheres have both centers equal.
#[derive(Clone, Debug)]
pub struct Sphere {
    center1: Vec3,
    center2: Vec3,
    radius: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Stationary sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        Self::moving(center, center, radius, material)
    }

    /// Sphere moving from `center1` at time 0 to `center2` at time 1.
    pub fn moving(center1: Vec3, center2: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);
        let box2 = Aabb::from_points(center2 - rvec, center2 + rvec);

        Self {
            center1,
            center2,
            radius,
            material,
            bbox: Aabb::surrounding(&box1, &box2),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_moving(&self) -> bool {
        self.center1 != self.center2
    }

    /// Center at shutter time `time`.
    #[inline]
    pub fn center(&self, time: f32) -> Vec3 {
        self.center1 + (self.center2 - self.center1) * time
    }

    /// UV of a point on the unit sphere centered at the origin.
    ///
    /// `u` runs around the Y axis starting at -X, `v` from the bottom pole
    /// (0) to the top pole (1).
    fn sphere_uv(p: Vec3) -> (f32, f32) {
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;
        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let center = self.center(ray.time());
        let oc = center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        if self.radius == 0.0 {
            return None;
        }

        let outward_normal = (ray.at(root) - center) / self.radius;
        Some(HitRecord::new(
            ray,
            root,
            outward_normal,
            Self::sphere_uv(outward_normal),
            &self.material,
        ))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn centroid(&self) -> Vec3 {
        (self.center1 + self.center2) * 0.5
    }
}
