//! Surface scattering models.

use crate::hittable::HitRecord;
use crate::random::{gen_f32, random_unit_vector};
use crate::Texture;
use lumen_core::{MaterialDesc, TextureCache, TextureError};
use lumen_math::{Ray, Vec3};
use rand::RngCore;

/// Color type alias (linear RGB)
pub type Color = Vec3;

/// Result of scattering a ray off a surface.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Per-channel fraction of the scattered light that survives
    pub attenuation: Color,
    pub scattered: Ray,
}

/// How light interacts with a surface.
#[derive(Clone, Debug)]
pub enum Material {
    /// Ideal diffuse reflector
    Lambertian { albedo: Texture },
    /// Mirror with a perturbed reflection; `fuzz` is kept in [0, 1]
    Metal { albedo: Color, fuzz: f32 },
    /// Clear refractive material such as glass or water
    Dielectric { refraction_index: f32 },
    /// Emitter that absorbs everything it is hit by
    DiffuseLight { emit: Texture },
}

impl Material {
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian {
            albedo: albedo.into(),
        }
    }

    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn dielectric(refraction_index: f32) -> Self {
        Material::Dielectric { refraction_index }
    }

    pub fn diffuse_light(emit: Color) -> Self {
        Material::DiffuseLight { emit: emit.into() }
    }

    /// Resolve a registry entry, loading any image texture it names.
    pub fn from_desc(desc: &MaterialDesc, cache: &mut TextureCache) -> Result<Self, TextureError> {
        Ok(match desc {
            MaterialDesc::Lambertian { texture } => Material::Lambertian {
                albedo: Texture::from_desc(texture, cache)?,
            },
            MaterialDesc::Metal { albedo, fuzz } => Material::metal(*albedo, *fuzz),
            MaterialDesc::Dielectric { refraction_index } => Material::dielectric(*refraction_index),
            MaterialDesc::DiffuseLight { texture } => Material::DiffuseLight {
                emit: Texture::from_desc(texture, cache)?,
            },
        })
    }

    /// Scatter an incoming ray, or `None` if it is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match self {
            Material::Lambertian { albedo } => {
                let mut direction = rec.normal + random_unit_vector(rng);

                // Catch degenerate scatter direction
                if direction.length_squared() < 1e-8 {
                    direction = rec.normal;
                }

                Some(ScatterResult {
                    attenuation: albedo.value(rec.u, rec.v, rec.p),
                    scattered: Ray::new(rec.p, direction, ray_in.time()),
                })
            }

            Material::Metal { albedo, fuzz } => {
                let reflected = reflect(ray_in.direction().normalize(), rec.normal);
                let direction = reflected + *fuzz * random_unit_vector(rng);

                // Fuzz pushed the ray below the surface: absorb it.
                if direction.dot(rec.normal) <= 0.0 {
                    return None;
                }

                Some(ScatterResult {
                    attenuation: *albedo,
                    scattered: Ray::new(rec.p, direction, ray_in.time()),
                })
            }

            Material::Dielectric { refraction_index } => {
                let ri = if rec.front_face {
                    1.0 / refraction_index
                } else {
                    *refraction_index
                };

                let unit_direction = ray_in.direction().normalize();
                let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

                let direction = if cannot_refract(ri, sin_theta)
                    || reflectance(cos_theta, ri) > gen_f32(rng)
                {
                    reflect(unit_direction, rec.normal)
                } else {
                    refract(unit_direction, rec.normal, ri)
                };

                Some(ScatterResult {
                    attenuation: Color::ONE,
                    scattered: Ray::new(rec.p, direction, ray_in.time()),
                })
            }

            Material::DiffuseLight { .. } => None,
        }
    }

    /// Light emitted at a surface point; black for non-emitters.
    pub fn emitted(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Material::DiffuseLight { emit } => emit.value(u, v, p),
            _ => Color::ZERO,
        }
    }
}

/// Mirror `v` about the normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract unit vector `uv` through a surface with normal `n`.
///
/// `etai_over_etat` is the ratio of refractive indices across the surface.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Schlick's approximation of Fresnel reflectance.
#[inline]
pub fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
    let r0 = (1.0 - refraction_ratio) / (1.0 + refraction_ratio);
    let r0 = r0 * r0;
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Total internal reflection check.
#[inline]
pub fn cannot_refract(refraction_ratio: f32, sin_theta: f32) -> bool {
    refraction_ratio * sin_theta > 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{FrameSeeds, PixelRng};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record<'a>(material: &'a Material, normal: Vec3, front_face: bool) -> HitRecord<'a> {
        HitRecord {
            p: Vec3::ZERO,
            normal,
            material,
            u: 0.5,
            v: 0.5,
            t: 1.0,
            front_face,
        }
    }

    #[test]
    fn test_reflectance_limits() {
        for ri in [1.0f32 / 1.5, 1.33, 1.5, 2.4] {
            let r0 = ((1.0 - ri) / (1.0 + ri)).powi(2);
            assert!((reflectance(1.0, ri) - r0).abs() < 1e-7, "normal incidence, ri {ri}");
            assert!((reflectance(0.0, ri) - 1.0).abs() < 1e-6, "grazing, ri {ri}");
            assert!(reflectance(0.5, ri) > r0 && reflectance(0.5, ri) < 1.0);
        }
    }

    #[test]
    fn test_total_internal_reflection() {
        let glass = Material::dielectric(1.5);
        // Leaving glass at 60 degrees from the normal: 1.5 * sin(60) > 1.
        let normal = Vec3::Y;
        let angle = 60f32.to_radians();
        let incoming = Vec3::new(angle.sin(), -angle.cos(), 0.0);
        let rec = record(&glass, normal, false);
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), incoming, 0.25);

        let mut rng = StdRng::seed_from_u64(3);
        let expected = reflect(incoming.normalize(), normal);
        for _ in 0..64 {
            let result = glass.scatter(&ray, &rec, &mut rng).expect("glass never absorbs");
            assert!((result.scattered.direction() - expected).length() < 1e-5);
            assert_eq!(result.attenuation, Color::ONE);
            assert_eq!(result.scattered.time(), 0.25);
        }
    }

    #[test]
    fn test_dielectric_refracts_head_on() {
        let glass = Material::dielectric(1.5);
        let rec = record(&glass, Vec3::Y, true);
        let ray = Ray::new_simple(Vec3::Y, Vec3::NEG_Y);

        let mut rng = StdRng::seed_from_u64(11);
        let refracted = (0..200)
            .filter_map(|_| glass.scatter(&ray, &rec, &mut rng))
            .filter(|s| s.scattered.direction().y < 0.0)
            .count();
        // Reflectance at normal incidence is 4%.
        assert!(refracted > 170, "refracted {refracted}/200");
    }

    #[test]
    fn test_lambertian_scatters_above_surface() {
        let diffuse = Material::lambertian(Vec3::new(0.8, 0.3, 0.3));
        let rec = record(&diffuse, Vec3::Z, true);
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z);
        let mut rng = PixelRng::new(8, 8, FrameSeeds::new(100.0, 500.0));

        for _ in 0..256 {
            let s = diffuse.scatter(&ray, &rec, &mut rng).expect("diffuse always scatters");
            assert!(s.scattered.direction().dot(Vec3::Z) >= 0.0);
            assert!(s.scattered.direction().length_squared() > 0.0);
            assert_eq!(s.attenuation, Vec3::new(0.8, 0.3, 0.3));
        }
    }

    #[test]
    fn test_metal_mirror_and_fuzz_clamp() {
        let mirror = Material::metal(Vec3::splat(0.9), 0.0);
        let rec = record(&mirror, Vec3::Y, true);
        let incoming = Vec3::new(1.0, -1.0, 0.0);
        let ray = Ray::new_simple(Vec3::new(-1.0, 1.0, 0.0), incoming);

        let mut rng = StdRng::seed_from_u64(5);
        let s = mirror.scatter(&ray, &rec, &mut rng).expect("mirror reflects");
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((s.scattered.direction() - expected).length() < 1e-5);

        match Material::metal(Vec3::ONE, 3.0) {
            Material::Metal { fuzz, .. } => assert_eq!(fuzz, 1.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_fuzzy_metal_absorbs_below_surface() {
        let brushed = Material::metal(Vec3::splat(0.8), 1.0);
        let rec = record(&brushed, Vec3::Y, true);
        // Nearly grazing: the mirror direction sits just above the surface.
        let ray = Ray::new_simple(Vec3::new(-1.0, 0.01, 0.0), Vec3::new(1.0, -0.01, 0.0));
        let mut rng = StdRng::seed_from_u64(17);

        let mut absorbed = 0;
        for _ in 0..256 {
            match brushed.scatter(&ray, &rec, &mut rng) {
                Some(s) => assert!(s.scattered.direction().dot(rec.normal) > 0.0),
                None => absorbed += 1,
            }
        }
        assert!(absorbed > 64 && absorbed < 192, "absorbed {absorbed}/256");
    }

    #[test]
    fn test_light_emits_and_absorbs() {
        let light = Material::diffuse_light(Vec3::splat(4.0));
        let rec = record(&light, Vec3::Y, true);
        let ray = Ray::new_simple(Vec3::Y, Vec3::NEG_Y);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(light.scatter(&ray, &rec, &mut rng).is_none());
        assert_eq!(light.emitted(0.0, 0.0, Vec3::ZERO), Vec3::splat(4.0));
        assert_eq!(Material::lambertian(Vec3::ONE).emitted(0.0, 0.0, Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_from_desc_clamps_and_loads() {
        let mut cache = TextureCache::new();
        let metal = Material::from_desc(&MaterialDesc::metal(Vec3::ONE, -1.0), &mut cache).unwrap();
        assert!(matches!(metal, Material::Metal { fuzz, .. } if fuzz == 0.0));

        let checker = Material::from_desc(
            &MaterialDesc::checker(0.5, Vec3::ONE, Vec3::ZERO),
            &mut cache,
        )
        .unwrap();
        assert!(matches!(checker, Material::Lambertian { albedo: Texture::Checker { .. } }));
    }
}
