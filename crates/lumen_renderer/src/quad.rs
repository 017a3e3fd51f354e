//! Planar parallelogram primitive.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;
use lumen_math::{Aabb, Interval, Ray, Vec3};

/// Parallelogram with corner `q` and edges `u` and `v`.
///
/// Points are `q + a*u + b*v` for `a, b` in [0, 1]. The front face is the
/// side `u x v` points towards.
#[derive(Clone, Debug)]
pub struct Quad {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    /// `n / (n . n)` with `n = u x v`; maps plane offsets to (a, b)
    w: Vec3,
    normal: Vec3,
    /// Plane constant: `normal . p = d` for every point on the plane
    d: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Quad {
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: Arc<Material>) -> Self {
        let n = u.cross(v);
        let n_len_sq = n.length_squared();
        // Degenerate edges leave w zero; such a quad is never hit.
        let (normal, w) = if n_len_sq > 0.0 {
            (n / n_len_sq.sqrt(), n / n_len_sq)
        } else {
            (Vec3::ZERO, Vec3::ZERO)
        };

        let diagonal1 = Aabb::from_points(q, q + u + v);
        let diagonal2 = Aabb::from_points(q + u, q + v);

        Self {
            q,
            u,
            v,
            w,
            normal,
            d: normal.dot(q),
            material,
            bbox: Aabb::surrounding(&diagonal1, &diagonal2),
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn area(&self) -> f32 {
        self.u.cross(self.v).length()
    }

    /// Whether planar coordinates (a, b) fall inside the parallelogram.
    #[inline]
    fn is_interior(a: f32, b: f32) -> bool {
        let unit = Interval::new(0.0, 1.0);
        unit.contains(a) && unit.contains(b)
    }
}

impl Hittable for Quad {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let denom = self.normal.dot(ray.direction());

        // Parallel to the plane (or a degenerate quad)
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }

        let planar_hit = ray.at(t) - self.q;
        let alpha = self.w.dot(planar_hit.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hit));
        if !Self::is_interior(alpha, beta) {
            return None;
        }

        Some(HitRecord::new(
            ray,
            t,
            self.normal,
            (alpha, beta),
            &self.material,
        ))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn centroid(&self) -> Vec3 {
        self.q + 0.5 * (self.u + self.v)
    }
}
