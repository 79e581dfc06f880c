//! Keyboard snapshot and edge detection

use serde::{Deserialize, Serialize};

use crate::sim::TickInput;

/// Logical game keys. Used both for "held" and "just pressed" sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub pause: bool,
    pub confirm: bool,
    /// Debug: jump to the next stage
    pub skip_level: bool,
}

impl Keys {
    /// Keys set in `self` but not in `previous`
    pub fn newly_pressed(&self, previous: &Keys) -> Keys {
        Keys {
            up: self.up && !previous.up,
            down: self.down && !previous.down,
            left: self.left && !previous.left,
            right: self.right && !previous.right,
            fire: self.fire && !previous.fire,
            pause: self.pause && !previous.pause,
            confirm: self.confirm && !previous.confirm,
            skip_level: self.skip_level && !previous.skip_level,
        }
    }

    pub fn any(&self) -> bool {
        *self != Keys::default()
    }
}

/// Remembers last frame's held keys to produce press edges
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    previous: Keys,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build this frame's tick input from the currently held keys
    pub fn frame(&mut self, held: Keys) -> TickInput {
        let pressed = held.newly_pressed(&self.previous);
        self.previous = held;
        TickInput { held, pressed }
    }

    /// Forget held state (e.g. after focus loss) so the next frame re-triggers edges
    pub fn reset(&mut self) {
        self.previous = Keys::default();
    }
}
