use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::utils::Xorshift32;

/// Hit threshold scale on top of the asteroid radius.
pub const ASTEROID_HIT_MARGIN: f32 = 1.2;
/// Per-axis spin magnitude cap, radians per frame.
pub const ASTEROID_MAX_SPIN: f32 = 0.01;

/// A stationary tumbling rock. Never translates, never breaks; laser hits
/// consume the laser and leave the asteroid untouched.
pub struct Asteroid {
    pub position: Vec3,
    pub rotation: Vec3,
    spin: Vec3,
    radius: f32,
}

impl Asteroid {
    pub fn new(position: Vec3, radius: f32, rng: &mut Xorshift32) -> Self {
        let tau = std::f32::consts::TAU;
        Self {
            position,
            rotation: Vec3::new(
                rng.range(0.0, tau),
                rng.range(0.0, tau),
                rng.range(0.0, tau),
            ),
            spin: Vec3::new(
                rng.range(-ASTEROID_MAX_SPIN, ASTEROID_MAX_SPIN),
                rng.range(-ASTEROID_MAX_SPIN, ASTEROID_MAX_SPIN),
                rng.range(-ASTEROID_MAX_SPIN, ASTEROID_MAX_SPIN),
            ),
            radius,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Tumble in place.
    pub fn update(&mut self) {
        self.rotation += self.spin;
    }

    /// Whether a point is close enough to count as contact.
    pub fn hit_by(&self, point: Vec3) -> bool {
        self.position.distance(point) < self.radius * ASTEROID_HIT_MARGIN
    }

    pub fn transform(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        // the unit rock mesh is scaled up to this asteroid's radius
        Mat4::from_scale_rotation_translation(Vec3::splat(self.radius), rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_accumulates_without_translating() {
        let mut rng = Xorshift32::new(7);
        let mut asteroid = Asteroid::new(Vec3::new(3.0, -4.0, -60.0), 2.0, &mut rng);
        let start_pos = asteroid.position;
        let start_rot = asteroid.rotation;
        for _ in 0..10 {
            asteroid.update();
        }
        assert_eq!(asteroid.position, start_pos);
        assert_ne!(asteroid.rotation, start_rot);
    }

    #[test]
    fn spin_stays_within_the_cap() {
        let mut rng = Xorshift32::new(99);
        for _ in 0..50 {
            let asteroid = Asteroid::new(Vec3::ZERO, 1.0, &mut rng);
            assert!(asteroid.spin.x.abs() <= ASTEROID_MAX_SPIN);
            assert!(asteroid.spin.y.abs() <= ASTEROID_MAX_SPIN);
            assert!(asteroid.spin.z.abs() <= ASTEROID_MAX_SPIN);
        }
    }

    #[test]
    fn hit_threshold_scales_with_radius() {
        let mut rng = Xorshift32::new(1);
        let asteroid = Asteroid::new(Vec3::ZERO, 2.0, &mut rng);
        assert!(asteroid.hit_by(Vec3::new(2.3, 0.0, 0.0)));
        assert!(!asteroid.hit_by(Vec3::new(2.4, 0.0, 0.0)));
    }
}
