use crate::Vec3;

/// A ray with origin, direction and time.
///
/// The direction is not required to be unit length. `time` lies in [0, 1]
/// and selects where along its path a moving primitive is sampled.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub time: f32,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3, time: f32) -> Self {
        Self {
            origin,
            direction,
            time,
        }
    }

    /// Create a ray at time 0.
    #[inline]
    pub fn new_simple(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin, direction, 0.0)
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Point along the ray at parameter t: origin + t * direction.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::NEG_Z, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), 0.0);

        assert_eq!(ray.at(0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ray.at(0.5), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(1.0, -2.0, 0.0));
    }

    #[test]
    fn test_ray_keeps_unnormalized_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0), 0.25);

        assert_eq!(ray.direction().length(), 4.0);
        assert_eq!(ray.time(), 0.25);
    }

    #[test]
    fn test_new_simple_is_time_zero() {
        let ray = Ray::new_simple(Vec3::ONE, Vec3::Y);
        assert_eq!(ray.time, 0.0);
        assert_eq!(ray.origin(), Vec3::ONE);
    }
}
