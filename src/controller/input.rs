/// Platform-agnostic input handling system
use std::collections::HashSet;

/// Held-key state, level-triggered: keydown sets, keyup clears. Keys are
/// normalized to lowercase at the boundary so "W" and "w" are one key.
pub struct InputState {
    pressed_keys: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
        }
    }

    pub fn key_down(&mut self, key: &str) {
        self.pressed_keys.insert(key.to_lowercase());
    }

    pub fn key_up(&mut self, key: &str) {
        self.pressed_keys.remove(&key.to_lowercase());
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    /// Drop all held keys (focus loss, tab hidden) so nothing sticks.
    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// What the pilot is asking for this frame. Produced by the input layer,
/// read (never mutated) by the ship update.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MovementIntent {
    pub forward: bool,
    pub backward: bool,
    pub yaw_left: bool,
    pub yaw_right: bool,
    pub up: bool,
    pub down: bool,
    pub roll_left: bool,
    pub roll_right: bool,
    pub boost: bool,
    pub shooting: bool,
}

/// Key mapping configuration
#[derive(Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub yaw_left: String,
    pub yaw_right: String,
    pub up: String,
    pub down: String,
    pub roll_left: String,
    pub roll_right: String,
    pub boost: String,
    pub shoot: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            yaw_left: "a".to_string(),
            yaw_right: "d".to_string(),
            up: " ".to_string(),
            down: "shift".to_string(),
            roll_left: "q".to_string(),
            roll_right: "e".to_string(),
            boost: "b".to_string(),
            shoot: "f".to_string(),
        }
    }
}

/// Turns held keys into movement intents through the active bindings.
#[derive(Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn intents(&self, input: &InputState) -> MovementIntent {
        MovementIntent {
            forward: input.is_key_pressed(&self.bindings.forward),
            backward: input.is_key_pressed(&self.bindings.backward),
            yaw_left: input.is_key_pressed(&self.bindings.yaw_left),
            yaw_right: input.is_key_pressed(&self.bindings.yaw_right),
            up: input.is_key_pressed(&self.bindings.up),
            down: input.is_key_pressed(&self.bindings.down),
            roll_left: input.is_key_pressed(&self.bindings.roll_left),
            roll_right: input.is_key_pressed(&self.bindings.roll_right),
            boost: input.is_key_pressed(&self.bindings.boost),
            shooting: input.is_key_pressed(&self.bindings.shoot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_map_to_intents() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        input.key_down("w");
        input.key_down("Q");
        input.key_down("f");

        let intent = processor.intents(&input);
        assert!(intent.forward);
        assert!(intent.roll_left);
        assert!(intent.shooting);
        assert!(!intent.backward);
        assert!(!intent.boost);
    }

    #[test]
    fn keyup_is_level_triggered() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        input.key_down("b");
        assert!(processor.intents(&input).boost);
        input.key_up("B");
        assert!(!processor.intents(&input).boost);
    }

    #[test]
    fn shift_and_space_reach_vertical_intents() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        input.key_down(" ");
        input.key_down("Shift");
        let intent = processor.intents(&input);
        assert!(intent.up);
        assert!(intent.down);
    }

    #[test]
    fn clear_keys_releases_everything() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        input.key_down("w");
        input.key_down("f");
        input.clear_keys();
        assert_eq!(processor.intents(&input), MovementIntent::default());
    }
}
