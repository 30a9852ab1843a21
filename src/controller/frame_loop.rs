use crate::audio::{SoundCue, SoundHandle, SoundManager};
use crate::controller::{InputProcessor, InputState};
use crate::model::{Camera, Scene};

/// Main game loop state and update logic, shared by the native and wasm
/// drivers. Holds everything per-frame work touches except the GPU.
pub struct FrameLoopContext {
    pub camera: Camera,
    pub scene: Scene,
    pub sound: SoundManager,
    processor: InputProcessor,
    engine_cue: Option<SoundHandle>,
    boost_was_held: bool,

    // frame accounting for the HUD
    pub fps: f32,
    frame_count: u32,
    fps_timer: f32,
}

impl FrameLoopContext {
    pub fn new(seed: u32, width: u32, height: u32) -> Self {
        Self {
            camera: Camera::new(width, height),
            scene: Scene::new(seed),
            sound: SoundManager::new(),
            processor: InputProcessor::default(),
            engine_cue: None,
            boost_was_held: false,
            fps: 0.0,
            frame_count: 0,
            fps_timer: 0.0,
        }
    }

    /// One simulation frame, in fixed order: ship, camera chase, turret
    /// tracking, asteroid tumble, collisions, then audio cues. Rendering
    /// happens afterwards in the platform driver.
    pub fn advance(&mut self, input: &InputState, now_ms: f64, dt: f32) {
        let intent = self.processor.intents(input);

        let ship_events = self.scene.ship.update(&intent, now_ms);

        self.camera
            .follow(self.scene.ship.position, self.scene.ship.orientation());

        self.scene.update_turrets();
        self.scene.update_asteroids();

        let collisions = self.scene.resolve_collisions();
        if collisions.turrets_destroyed > 0 {
            tracing::info!(score = self.scene.score, "turret destroyed");
        }
        if collisions.ship_struck {
            // detected but inert: no damage, no game over
            tracing::info!("ship scraped an asteroid");
        }

        if ship_events.fired {
            self.sound.play(SoundCue::Laser);
        }
        if intent.forward {
            if self.engine_cue.is_none() {
                self.engine_cue = self.sound.play_looping(SoundCue::Engine);
            }
        } else if let Some(handle) = self.engine_cue.take() {
            self.sound.stop(handle);
        }
        if intent.boost && !self.boost_was_held {
            self.sound.play(SoundCue::Boost);
        }
        self.boost_was_held = intent.boost;

        self.frame_count += 1;
        self.fps_timer += dt;
        if self.fps_timer >= 1.0 {
            self.fps = self.frame_count as f32 / self.fps_timer;
            self.frame_count = 0;
            self.fps_timer = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_runs_the_whole_pass() {
        let mut ctx = FrameLoopContext::new(77, 800, 600);
        let input = InputState::new();
        for frame in 0..120 {
            ctx.advance(&input, frame as f64 * 16.0, 0.016);
        }
        assert_eq!(ctx.scene.score, 0);
        assert!(ctx.scene.ship.lasers.is_empty());
    }

    #[test]
    fn held_trigger_spawns_volleys_through_the_loop() {
        let mut ctx = FrameLoopContext::new(77, 800, 600);
        // empty space so nothing eats the fresh bolts
        ctx.scene.turrets.clear();
        ctx.scene.asteroids.clear();
        let mut input = InputState::new();
        input.key_down("f");

        ctx.advance(&input, 0.0, 0.016);
        assert_eq!(ctx.scene.ship.lasers.len(), 2);
        // cooldown holds through the next frame
        ctx.advance(&input, 16.0, 0.016);
        assert_eq!(ctx.scene.ship.lasers.len(), 2);
        ctx.advance(&input, 300.0, 0.016);
        assert_eq!(ctx.scene.ship.lasers.len(), 4);
    }

    #[test]
    fn thrust_moves_the_ship_and_the_chase_camera() {
        let mut ctx = FrameLoopContext::new(77, 800, 600);
        let mut input = InputState::new();
        input.key_down("w");

        let start_eye = ctx.camera.eye;
        for frame in 0..60 {
            ctx.advance(&input, frame as f64 * 16.0, 0.016);
        }
        assert!(ctx.scene.ship.velocity > 0.0);
        assert_ne!(ctx.scene.ship.position.z, 0.0);
        assert_ne!(ctx.camera.eye, start_eye);
        assert_eq!(ctx.camera.target, ctx.scene.ship.position);
    }
}
