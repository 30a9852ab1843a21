use glam::{Mat4, Quat, Vec3};

use crate::controller::MovementIntent;
use crate::model::Laser;

/// Yaw/roll applied per frame while the matching intent is held.
pub const ROTATION_STEP: f32 = 0.05;
/// Cruise speed cap.
pub const MAX_VELOCITY: f32 = 0.5;
/// Speed cap while boosting.
pub const BOOST_VELOCITY: f32 = 1.0;
/// Velocity gained per frame of held thrust.
pub const ACCELERATION: f32 = 0.01;
/// Fraction of velocity shed per coasting frame.
pub const DECELERATION: f32 = 0.005;
/// Minimum wall-clock gap between laser volleys, in milliseconds.
pub const SHOT_COOLDOWN_MS: f64 = 250.0;

/// Laser mount points in ship space, one per wing.
pub const CANNON_MOUNTS: [Vec3; 2] = [
    Vec3::new(2.5, 0.2, 0.0),
    Vec3::new(-2.5, 0.2, 0.0),
];

/// Axis-aligned box the ship is clamped into after every update.
pub const FLIGHT_BOUNDS: Boundaries = Boundaries {
    x: [-100.0, 100.0],
    y: [-50.0, 50.0],
    z: [-1000.0, 1000.0],
};

#[derive(Debug, Clone, Copy)]
pub struct Boundaries {
    pub x: [f32; 2],
    pub y: [f32; 2],
    pub z: [f32; 2],
}

/// Things that happened during one ship update, for the caller to react to
/// (audio cues live outside the model).
#[derive(Debug, Default, Clone, Copy)]
pub struct ShipEvents {
    pub fired: bool,
}

/// The player ship. Reads movement intents, never mutates them.
pub struct Ship {
    pub position: Vec3,
    pub yaw: f32,
    pub roll: f32,
    pub velocity: f32,
    pub lasers: Vec<Laser>,
    last_shot_ms: f64,
}

impl Ship {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            // The hull model faces +Z, so the ship starts turned around.
            yaw: std::f32::consts::PI,
            roll: 0.0,
            velocity: 0.0,
            lasers: Vec::new(),
            last_shot_ms: f64::NEG_INFINITY,
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_z(self.roll)
    }

    /// Current travel direction of the nose.
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position)
    }

    /// One frame of flight: integrate velocity, steer, fire, advance owned
    /// lasers, then clamp back into the flight bounds.
    pub fn update(&mut self, intent: &MovementIntent, now_ms: f64) -> ShipEvents {
        let mut events = ShipEvents::default();

        let max_velocity = if intent.boost { BOOST_VELOCITY } else { MAX_VELOCITY };
        if intent.forward {
            self.velocity = (self.velocity + ACCELERATION).min(max_velocity);
        } else if intent.backward {
            self.velocity = (self.velocity - ACCELERATION).max(-max_velocity);
        } else {
            // geometric decay toward zero, never exactly reaching it
            self.velocity *= 1.0 - DECELERATION;
        }

        self.position += self.forward() * self.velocity;

        if intent.yaw_left {
            self.yaw += ROTATION_STEP;
        }
        if intent.yaw_right {
            self.yaw -= ROTATION_STEP;
        }
        if intent.roll_left {
            self.roll += ROTATION_STEP;
        }
        if intent.roll_right {
            self.roll -= ROTATION_STEP;
        }

        if intent.up {
            self.position.y += MAX_VELOCITY;
        }
        if intent.down {
            self.position.y -= MAX_VELOCITY;
        }

        if intent.shooting {
            events.fired = self.shoot(now_ms);
        }

        // expired bolts are moved out of the collection and dropped here
        self.lasers.retain_mut(|laser| !laser.update());

        self.clamp_position();
        events
    }

    /// Fire one bolt per cannon mount, gated by the shot cooldown.
    /// Returns whether a volley actually left the cannons.
    pub fn shoot(&mut self, now_ms: f64) -> bool {
        if now_ms - self.last_shot_ms < SHOT_COOLDOWN_MS {
            return false;
        }

        let direction = self.forward();
        let transform = self.transform();
        for mount in CANNON_MOUNTS {
            let muzzle = transform.transform_point3(mount);
            self.lasers.push(Laser::new(muzzle, direction));
        }
        self.last_shot_ms = now_ms;
        true
    }

    fn clamp_position(&mut self) {
        self.position.x = self.position.x.clamp(FLIGHT_BOUNDS.x[0], FLIGHT_BOUNDS.x[1]);
        self.position.y = self.position.y.clamp(FLIGHT_BOUNDS.y[0], FLIGHT_BOUNDS.y[1]);
        self.position.z = self.position.z.clamp(FLIGHT_BOUNDS.z[0], FLIGHT_BOUNDS.z[1]);
    }
}

impl Default for Ship {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(set: impl Fn(&mut MovementIntent)) -> MovementIntent {
        let mut intent = MovementIntent::default();
        set(&mut intent);
        intent
    }

    #[test]
    fn thrust_accelerates_up_to_cruise_cap() {
        let mut ship = Ship::new();
        let intent = held(|i| i.forward = true);
        ship.update(&intent, 0.0);
        assert!((ship.velocity - ACCELERATION).abs() < 1e-6);
        for _ in 0..200 {
            ship.update(&intent, 0.0);
        }
        assert!((ship.velocity - MAX_VELOCITY).abs() < 1e-6);
    }

    #[test]
    fn boost_raises_the_cap() {
        let mut ship = Ship::new();
        let intent = held(|i| {
            i.forward = true;
            i.boost = true;
        });
        for _ in 0..200 {
            ship.update(&intent, 0.0);
        }
        assert!((ship.velocity - BOOST_VELOCITY).abs() < 1e-6);
    }

    #[test]
    fn coasting_decays_geometrically() {
        let mut ship = Ship::new();
        ship.velocity = MAX_VELOCITY;
        ship.update(&MovementIntent::default(), 0.0);
        assert!((ship.velocity - MAX_VELOCITY * (1.0 - DECELERATION)).abs() < 1e-6);
        // decays but never reaches zero
        for _ in 0..1000 {
            ship.update(&MovementIntent::default(), 0.0);
        }
        assert!(ship.velocity > 0.0);
    }

    #[test]
    fn yaw_and_roll_step_per_frame() {
        let mut ship = Ship::new();
        let start_yaw = ship.yaw;
        ship.update(&held(|i| i.yaw_left = true), 0.0);
        assert!((ship.yaw - (start_yaw + ROTATION_STEP)).abs() < 1e-6);
        ship.update(&held(|i| i.roll_right = true), 0.0);
        assert!((ship.roll + ROTATION_STEP).abs() < 1e-6);
    }

    #[test]
    fn position_is_clamped_into_the_flight_bounds() {
        let mut ship = Ship::new();
        ship.position = Vec3::new(500.0, -500.0, 5000.0);
        ship.update(&MovementIntent::default(), 0.0);
        assert_eq!(ship.position.x, FLIGHT_BOUNDS.x[1]);
        assert_eq!(ship.position.y, FLIGHT_BOUNDS.y[0]);
        assert_eq!(ship.position.z, FLIGHT_BOUNDS.z[1]);

        // climbing is cut off at the ceiling
        let up = held(|i| i.up = true);
        for _ in 0..300 {
            ship.update(&up, 0.0);
            assert!(ship.position.y <= FLIGHT_BOUNDS.y[1]);
        }
    }

    #[test]
    fn volley_spawns_one_bolt_per_cannon() {
        let mut ship = Ship::new();
        assert!(ship.shoot(0.0));
        assert_eq!(ship.lasers.len(), CANNON_MOUNTS.len());
        let dir = ship.forward();
        for laser in &ship.lasers {
            assert!((laser.direction() - dir).length() < 1e-6);
        }
    }

    #[test]
    fn cooldown_gates_repeat_volleys() {
        let mut ship = Ship::new();
        assert!(ship.shoot(1000.0));
        assert!(!ship.shoot(1100.0));
        assert_eq!(ship.lasers.len(), 2);
        assert!(ship.shoot(1250.0));
        assert_eq!(ship.lasers.len(), 4);
    }

    #[test]
    fn held_trigger_fires_once_per_cooldown_window() {
        let mut ship = Ship::new();
        let intent = held(|i| i.shooting = true);
        let first = ship.update(&intent, 0.0);
        assert!(first.fired);
        let second = ship.update(&intent, 16.0);
        assert!(!second.fired);
        assert_eq!(ship.lasers.len(), 2);
        let third = ship.update(&intent, 260.0);
        assert!(third.fired);
        assert_eq!(ship.lasers.len(), 4);
    }

    #[test]
    fn expired_lasers_are_pruned_during_update() {
        let mut ship = Ship::new();
        ship.shoot(0.0);
        for _ in 0..500 {
            ship.update(&MovementIntent::default(), 0.0);
        }
        assert!(ship.lasers.is_empty());
    }
}
