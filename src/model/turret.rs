use glam::{Mat4, Quat, Vec3};

pub const TURRET_START_HEALTH: i32 = 100;
/// Collision radius around the turret center.
pub const TURRET_HIT_RADIUS: f32 = 2.0;
/// Max yaw change per frame while tracking.
pub const TURRET_TURN_STEP: f32 = 0.01;

/// A stationary gun emplacement that swivels to face the ship until it is
/// destroyed. `destroyed` is a one-way latch: a dead turret stops tracking,
/// stops registering hits and never comes back.
pub struct Turret {
    pub position: Vec3,
    pub yaw: f32,
    health: i32,
    destroyed: bool,
}

impl Turret {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            health: TURRET_START_HEALTH,
            destroyed: false,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Swivel toward the target, projected onto the horizontal plane, by at
    /// most `TURRET_TURN_STEP` along the signed shortest arc.
    pub fn update(&mut self, target: Vec3) {
        if self.destroyed {
            return;
        }

        let to_target = target - self.position;
        let desired = to_target.x.atan2(to_target.z);
        let diff = desired - self.yaw;
        // wrap into (-pi, pi] so the turret takes the short way around
        let shortest = diff.sin().atan2(diff.cos());
        self.yaw += shortest.signum() * shortest.abs().min(TURRET_TURN_STEP);
    }

    /// Apply damage. Returns true only on the transition into the destroyed
    /// state; repeated damage afterwards has no observable effect.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.health -= amount;
        if self.health <= 0 && !self.destroyed {
            self.destroyed = true;
            return true;
        }
        false
    }

    /// Whether a point registers as a hit. Always false once destroyed.
    pub fn hit_by(&self, point: Vec3) -> bool {
        if self.destroyed {
            return false;
        }
        self.position.distance(point) < TURRET_HIT_RADIUS
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(Quat::from_rotation_y(self.yaw), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_standard_hits_destroy() {
        let mut turret = Turret::new(Vec3::ZERO);
        assert!(!turret.take_damage(34));
        assert!(!turret.take_damage(34));
        assert!(!turret.is_destroyed());
        // transition is reported exactly once
        assert!(turret.take_damage(34));
        assert!(turret.is_destroyed());
        assert!(!turret.take_damage(34));
        assert!(turret.is_destroyed());
    }

    #[test]
    fn hit_radius_is_fixed() {
        let turret = Turret::new(Vec3::ZERO);
        assert!(turret.hit_by(Vec3::new(1.9, 0.0, 0.0)));
        assert!(!turret.hit_by(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn destroyed_turret_registers_no_hits() {
        let mut turret = Turret::new(Vec3::ZERO);
        turret.take_damage(TURRET_START_HEALTH);
        assert!(turret.is_destroyed());
        assert!(!turret.hit_by(Vec3::ZERO));
    }

    #[test]
    fn tracks_by_bounded_steps_along_the_short_arc() {
        let mut turret = Turret::new(Vec3::ZERO);
        // target off to +X: desired yaw is pi/2, far beyond one step
        turret.update(Vec3::new(10.0, 0.0, 0.0));
        assert!((turret.yaw - TURRET_TURN_STEP).abs() < 1e-6);

        // target slightly to -X of straight ahead: small negative correction
        let mut fine = Turret::new(Vec3::ZERO);
        fine.yaw = 0.005;
        fine.update(Vec3::new(0.0, 0.0, 10.0));
        assert!((fine.yaw - 0.0).abs() < 1e-6);
    }

    #[test]
    fn tracking_ignores_height_offset() {
        let mut turret = Turret::new(Vec3::ZERO);
        let mut level = Turret::new(Vec3::ZERO);
        for _ in 0..10 {
            turret.update(Vec3::new(5.0, 40.0, 5.0));
            level.update(Vec3::new(5.0, 0.0, 5.0));
        }
        assert!((turret.yaw - level.yaw).abs() < 1e-6);
    }

    #[test]
    fn destroyed_turret_stops_tracking() {
        let mut turret = Turret::new(Vec3::ZERO);
        turret.take_damage(TURRET_START_HEALTH);
        let yaw = turret.yaw;
        turret.update(Vec3::new(10.0, 0.0, 10.0));
        assert_eq!(turret.yaw, yaw);
    }
}
