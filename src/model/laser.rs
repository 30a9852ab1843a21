use glam::{Mat4, Quat, Vec3};

/// Distance a laser covers per frame.
pub const LASER_SPEED: f32 = 2.0;
/// Total distance a laser may travel before it is removed.
pub const LASER_RANGE: f32 = 1000.0;

/// A single laser bolt. Owned exclusively by the ship that fired it;
/// removal from the owning collection drops the bolt, so a removed laser
/// cannot be referenced afterwards.
pub struct Laser {
    pub position: Vec3,
    direction: Vec3,
    traveled: f32,
}

impl Laser {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction: direction.normalize(),
            traveled: 0.0,
        }
    }

    /// Advance the bolt one frame. Returns true once it has covered its
    /// full range; the caller removes it (the bolt never removes itself).
    pub fn update(&mut self) -> bool {
        self.position += self.direction * LASER_SPEED;
        self.traveled += LASER_SPEED;
        self.traveled >= LASER_RANGE
    }

    /// Travel direction, fixed at creation.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn traveled(&self) -> f32 {
        self.traveled
    }

    /// Model transform: the beam mesh runs along +Y and is swung onto the
    /// travel direction.
    pub fn transform(&self) -> Mat4 {
        let rotation = Quat::from_rotation_arc(Vec3::Y, self.direction);
        Mat4::from_rotation_translation(rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_accumulates_by_speed() {
        let mut laser = Laser::new(Vec3::ZERO, Vec3::NEG_Z);
        assert_eq!(laser.traveled(), 0.0);
        laser.update();
        assert_eq!(laser.traveled(), LASER_SPEED);
        laser.update();
        assert_eq!(laser.traveled(), 2.0 * LASER_SPEED);
        assert_eq!(laser.position, Vec3::new(0.0, 0.0, -2.0 * LASER_SPEED));
    }

    #[test]
    fn expires_on_the_update_that_reaches_max_range() {
        let mut laser = Laser::new(Vec3::ZERO, Vec3::NEG_Z);
        // speed 2, range 1000: the 500th update reaches the limit
        for _ in 0..499 {
            assert!(!laser.update());
        }
        assert!(laser.update());
    }

    #[test]
    fn direction_is_normalized() {
        let laser = Laser::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -8.0));
        assert!((laser.direction().length() - 1.0).abs() < 1e-6);
    }
}
