//! Render-ready scene: resolved primitives plus their BVH.

use std::collections::HashMap;
use std::sync::Arc;

use lumen_core::{Background, ObjectDesc, SceneDescription, SceneError, TextureCache};
use lumen_math::{Interval, Ray};
use thiserror::Error;

use crate::bvh::{Bvh, BvhError};
use crate::hittable::{closest_hit_linear, HitRecord, Primitive};
use crate::{Material, Quad, Sphere};

/// Errors that can occur while turning a description into a [`Scene`].
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Bvh(#[from] BvhError),
}

pub type BuildResult<T> = Result<T, BuildError>;

pub struct Scene {
    primitives: Vec<Primitive>,
    bvh: Bvh,
    background: Background,
}

impl Scene {
    /// Build the BVH over `primitives`.
    pub fn new(primitives: Vec<Primitive>, background: Background) -> Result<Self, BvhError> {
        let bvh = Bvh::build(&primitives)?;
        Ok(Self {
            primitives,
            bvh,
            background,
        })
    }

    /// Resolve materials and textures, create the primitives in input
    /// order and build their BVH.
    ///
    /// Objects that name the same material share one instance.
    pub fn from_description(
        desc: &SceneDescription,
        textures: &mut TextureCache,
    ) -> BuildResult<Self> {
        desc.validate()?;

        let mut materials: HashMap<&str, Arc<Material>> = HashMap::with_capacity(desc.materials.len());
        for (name, material) in &desc.materials {
            let material = Material::from_desc(material, textures).map_err(SceneError::from)?;
            materials.insert(name.as_str(), Arc::new(material));
        }

        let mut primitives = Vec::with_capacity(desc.objects.len());
        for (index, object) in desc.objects.iter().enumerate() {
            let material = materials
                .get(object.material())
                .cloned()
                .ok_or_else(|| SceneError::UnknownMaterial {
                    index,
                    name: object.material().to_string(),
                })?;

            let primitive: Primitive = match *object {
                ObjectDesc::Sphere { center, radius, .. } => Sphere::new(center, radius, material).into(),
                ObjectDesc::MovingSphere {
                    center1,
                    center2,
                    radius,
                    ..
                } => Sphere::moving(center1, center2, radius, material).into(),
                ObjectDesc::Quad { q, u, v, .. } => Quad::new(q, u, v, material).into(),
            };
            primitives.push(primitive);
        }

        let scene = Self::new(primitives, desc.background)?;
        log::info!(
            "Built scene '{}': {} primitives, {} materials, {} BVH nodes (depth {})",
            desc.name,
            scene.primitives.len(),
            materials.len(),
            scene.bvh.len(),
            scene.bvh.depth()
        );
        Ok(scene)
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    /// Closest hit through the BVH, with the index of the primitive hit.
    #[inline]
    pub fn closest_hit(&self, ray: &Ray, ray_t: Interval) -> Option<(usize, HitRecord<'_>)> {
        self.bvh.closest_hit(&self.primitives, ray, ray_t)
    }

    /// Closest hit by testing every primitive.
    pub fn closest_hit_linear(&self, ray: &Ray, ray_t: Interval) -> Option<(usize, HitRecord<'_>)> {
        closest_hit_linear(&self.primitives, ray, ray_t)
    }
}
