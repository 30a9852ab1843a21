// MODEL: entities and game state
pub mod asteroid;
pub mod camera;
pub mod laser;
pub mod scene;
pub mod ship;
pub mod turret;

pub use asteroid::{Asteroid, ASTEROID_HIT_MARGIN};
pub use camera::Camera;
pub use laser::{Laser, LASER_RANGE, LASER_SPEED};
pub use scene::{CollisionEvents, Scene, ASTEROID_COUNT, LASER_DAMAGE, TURRET_KILL_SCORE};
pub use ship::{Ship, ShipEvents, CANNON_MOUNTS, SHOT_COOLDOWN_MS};
pub use turret::{Turret, TURRET_HIT_RADIUS, TURRET_START_HEALTH};
