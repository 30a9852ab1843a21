use glam::Vec3;

use crate::model::{Asteroid, Ship, Turret};
use crate::utils::Xorshift32;

/// Health removed from a turret per laser hit.
pub const LASER_DAMAGE: i32 = 34;
/// Score awarded for each turret kill.
pub const TURRET_KILL_SCORE: u32 = 100;
/// Asteroids spawned at game start.
pub const ASTEROID_COUNT: usize = 15;

/// Fixed turret emplacements.
const TURRET_POSITIONS: [Vec3; 5] = [
    Vec3::new(-20.0, -10.0, -50.0),
    Vec3::new(20.0, -10.0, -50.0),
    Vec3::new(0.0, -10.0, -80.0),
    Vec3::new(-30.0, -10.0, -100.0),
    Vec3::new(30.0, -10.0, -100.0),
];

/// Outcome of one collision pass, for the caller to log and cue on.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollisionEvents {
    pub turrets_destroyed: u32,
    pub ship_struck: bool,
}

/// Everything the game simulates: the ship (with its lasers), the turret
/// field, the asteroid field and the score.
pub struct Scene {
    pub ship: Ship,
    pub turrets: Vec<Turret>,
    pub asteroids: Vec<Asteroid>,
    pub score: u32,
}

impl Scene {
    pub fn new(seed: u32) -> Self {
        let mut rng = Xorshift32::new(seed);

        let turrets = TURRET_POSITIONS.iter().map(|&p| Turret::new(p)).collect();

        let asteroids = (0..ASTEROID_COUNT)
            .map(|_| {
                let position = Vec3::new(
                    rng.range(-50.0, 50.0),
                    rng.range(-20.0, 20.0),
                    rng.range(-200.0, 0.0),
                );
                let radius = rng.range(1.0, 3.0);
                Asteroid::new(position, radius, &mut rng)
            })
            .collect();

        Self {
            ship: Ship::new(),
            turrets,
            asteroids,
            score: 0,
        }
    }

    pub fn update_turrets(&mut self) {
        let target = self.ship.position;
        for turret in &mut self.turrets {
            turret.update(target);
        }
    }

    pub fn update_asteroids(&mut self) {
        for asteroid in &mut self.asteroids {
            asteroid.update();
        }
    }

    /// Brute-force collision pass. Each live laser is tested against every
    /// turret first, then every asteroid, in collection order; the first hit
    /// consumes the laser. Entity counts stay in the tens, so no spatial
    /// index is warranted. Finally the ship is tested against the asteroid
    /// field, which is detected but has no gameplay consequence.
    pub fn resolve_collisions(&mut self) -> CollisionEvents {
        let mut events = CollisionEvents::default();

        // lasers are moved out of the ship; survivors are moved back,
        // consumed ones are dropped right here
        let lasers = std::mem::take(&mut self.ship.lasers);
        let mut survivors = Vec::with_capacity(lasers.len());

        'bolts: for laser in lasers {
            for turret in &mut self.turrets {
                if turret.hit_by(laser.position) {
                    if turret.take_damage(LASER_DAMAGE) {
                        self.score += TURRET_KILL_SCORE;
                        events.turrets_destroyed += 1;
                    }
                    continue 'bolts;
                }
            }
            for asteroid in &self.asteroids {
                if asteroid.hit_by(laser.position) {
                    continue 'bolts;
                }
            }
            survivors.push(laser);
        }
        self.ship.lasers = survivors;

        events.ship_struck = self
            .asteroids
            .iter()
            .any(|asteroid| asteroid.hit_by(self.ship.position));

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Laser, TURRET_START_HEALTH};

    fn empty_scene() -> Scene {
        Scene {
            ship: Ship::new(),
            turrets: Vec::new(),
            asteroids: Vec::new(),
            score: 0,
        }
    }

    fn laser_at(scene: &mut Scene, position: Vec3) {
        scene.ship.lasers.push(Laser::new(position, Vec3::NEG_Z));
    }

    #[test]
    fn startup_population() {
        let scene = Scene::new(0xC0FFEE);
        assert_eq!(scene.turrets.len(), TURRET_POSITIONS.len());
        assert_eq!(scene.asteroids.len(), ASTEROID_COUNT);
        assert_eq!(scene.score, 0);
        for asteroid in &scene.asteroids {
            assert!(asteroid.radius() >= 1.0 && asteroid.radius() <= 3.0);
            assert!(asteroid.position.z <= 0.0);
        }
    }

    #[test]
    fn turret_hit_consumes_laser_and_damages() {
        let mut scene = empty_scene();
        scene.turrets.push(Turret::new(Vec3::new(0.0, 0.0, -50.0)));
        laser_at(&mut scene, Vec3::new(0.0, 0.0, -49.0));

        let events = scene.resolve_collisions();
        assert!(scene.ship.lasers.is_empty());
        assert_eq!(scene.turrets[0].health(), TURRET_START_HEALTH - LASER_DAMAGE);
        assert_eq!(scene.score, 0);
        assert_eq!(events.turrets_destroyed, 0);
    }

    #[test]
    fn third_hit_scores_exactly_once() {
        let mut scene = empty_scene();
        scene.turrets.push(Turret::new(Vec3::new(0.0, 0.0, -50.0)));

        for round in 0..3 {
            laser_at(&mut scene, Vec3::new(0.0, 0.0, -49.0));
            let events = scene.resolve_collisions();
            if round < 2 {
                assert!(!scene.turrets[0].is_destroyed());
                assert_eq!(events.turrets_destroyed, 0);
            } else {
                assert!(scene.turrets[0].is_destroyed());
                assert_eq!(events.turrets_destroyed, 1);
            }
        }
        assert_eq!(scene.score, TURRET_KILL_SCORE);

        // a destroyed turret no longer stops lasers or earns score
        laser_at(&mut scene, Vec3::new(0.0, 0.0, -49.0));
        scene.resolve_collisions();
        assert_eq!(scene.score, TURRET_KILL_SCORE);
        assert_eq!(scene.ship.lasers.len(), 1);
    }

    #[test]
    fn turret_wins_ties_over_asteroid() {
        let mut scene = empty_scene();
        let spot = Vec3::new(0.0, 0.0, -30.0);
        scene.turrets.push(Turret::new(spot));
        let mut rng = Xorshift32::new(5);
        scene.asteroids.push(Asteroid::new(spot, 2.0, &mut rng));
        laser_at(&mut scene, spot + Vec3::new(1.0, 0.0, 0.0));

        scene.resolve_collisions();
        assert!(scene.ship.lasers.is_empty());
        assert_eq!(scene.turrets[0].health(), TURRET_START_HEALTH - LASER_DAMAGE);
        assert_eq!(scene.asteroids.len(), 1);
    }

    #[test]
    fn asteroid_hit_removes_only_the_laser() {
        let mut scene = empty_scene();
        let mut rng = Xorshift32::new(5);
        scene
            .asteroids
            .push(Asteroid::new(Vec3::new(0.0, 0.0, -30.0), 2.0, &mut rng));
        laser_at(&mut scene, Vec3::new(0.0, 0.0, -29.0));
        laser_at(&mut scene, Vec3::new(0.0, 0.0, -300.0));

        scene.resolve_collisions();
        assert_eq!(scene.ship.lasers.len(), 1);
        assert_eq!(scene.asteroids.len(), 1);
        assert_eq!(scene.score, 0);
    }

    #[test]
    fn ship_contact_is_detected_but_inert() {
        let mut scene = empty_scene();
        let mut rng = Xorshift32::new(5);
        scene
            .asteroids
            .push(Asteroid::new(Vec3::new(0.5, 0.0, 0.0), 2.0, &mut rng));

        let events = scene.resolve_collisions();
        assert!(events.ship_struck);
        assert_eq!(scene.asteroids.len(), 1);
        assert_eq!(scene.score, 0);
        // the next pass detects it again; nothing has latched
        assert!(scene.resolve_collisions().ship_struck);
    }

    #[test]
    fn volley_to_kill_end_to_end() {
        let mut scene = empty_scene();
        scene.turrets.push(Turret::new(Vec3::new(0.0, 0.0, -50.0)));

        // three successive hits at distance 1 from the turret
        for _ in 0..3 {
            laser_at(&mut scene, Vec3::new(0.0, 0.0, -51.0));
            scene.resolve_collisions();
        }
        assert!(scene.turrets[0].is_destroyed());
        assert_eq!(scene.score, TURRET_KILL_SCORE);
    }
}
