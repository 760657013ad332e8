//! Keyboard sampling into per-frame input intents.
//!
//! Intents are level-triggered booleans sampled once per frame; there is no
//! edge detection here because the fire cooldown in the game state already
//! turns a held key into discrete shots.

use crate::vehicle::VehicleInputs;
use macroquad::prelude::*;

pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Samples the current key state. Supports both WASD and arrow keys.
    pub fn sample(&self) -> VehicleInputs {
        VehicleInputs {
            accelerate: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
            brake: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
            turn_left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
            turn_right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
            fire: is_key_down(KeyCode::Space),
        }
    }

    /// True when the user asked to quit.
    pub fn quit_requested(&self) -> bool {
        is_key_pressed(KeyCode::Escape)
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
