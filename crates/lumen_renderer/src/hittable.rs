//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, Quad, Sphere};
use lumen_math::{Aabb, Interval, Ray, Vec3};

/// Record of a ray-object intersection.
#[derive(Clone, Debug)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal, always facing against the incoming ray
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
    /// Surface coordinates
    pub u: f32,
    pub v: f32,
    /// Ray parameter of the intersection
    pub t: f32,
    /// Whether the ray arrived from the outside of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record from the raw hit, orienting the normal against `ray`.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        (u, v): (f32, f32),
        material: &'a Material,
    ) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            u,
            v,
            t,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// `outward_normal` must be unit length.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` strictly inside `ray_t`, if any.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>>;

    /// Axis-aligned box enclosing the object over the whole shutter interval.
    fn bounding_box(&self) -> Aabb;

    /// Point the BVH sorts this object by.
    fn centroid(&self) -> Vec3 {
        self.bounding_box().centroid()
    }
}

/// The closed set of shapes a scene can hold.
#[derive(Clone, Debug)]
pub enum Primitive {
    Sphere(Sphere),
    Quad(Quad),
}

impl Hittable for Primitive {
    #[inline]
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        match self {
            Primitive::Sphere(sphere) => sphere.hit(ray, ray_t),
            Primitive::Quad(quad) => quad.hit(ray, ray_t),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(sphere) => sphere.bounding_box(),
            Primitive::Quad(quad) => quad.bounding_box(),
        }
    }

    fn centroid(&self) -> Vec3 {
        match self {
            Primitive::Sphere(sphere) => sphere.centroid(),
            Primitive::Quad(quad) => quad.centroid(),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}

impl From<Quad> for Primitive {
    fn from(quad: Quad) -> Self {
        Primitive::Quad(quad)
    }
}

/// Closest hit over a slice of objects by testing every one of them.
///
/// Returns the index of the object hit alongside the record. This is the
/// reference the BVH traversal must agree with.
pub fn closest_hit_linear<'a, H: Hittable>(
    objects: &'a [H],
    ray: &Ray,
    ray_t: Interval,
) -> Option<(usize, HitRecord<'a>)> {
    let mut closest = None;
    let mut search = ray_t;

    for (index, object) in objects.iter().enumerate() {
        if let Some(rec) = object.hit(ray, search) {
            search = search.with_max(rec.t);
            closest = Some((index, rec));
        }
    }

    closest
}
