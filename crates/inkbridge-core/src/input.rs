//! Keyboard input state.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

impl KeyEvent {
    /// The key name carried by the event.
    pub fn key(&self) -> &str {
        match self {
            KeyEvent::Pressed(key) | KeyEvent::Released(key) => key,
        }
    }

    /// Whether this is a key-up event.
    pub fn is_release(&self) -> bool {
        matches!(self, KeyEvent::Released(_))
    }
}

/// Tracks which keys are held down.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pressed_keys: HashSet<String>,
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a keyboard event.
    pub fn handle_key_event(&mut self, event: &KeyEvent) {
        match event {
            KeyEvent::Pressed(key) => {
                self.pressed_keys.insert(key.clone());
            }
            KeyEvent::Released(key) => {
                self.pressed_keys.remove(key);
            }
        }
    }

    /// Check if a key is held down.
    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    /// Forget all held keys (e.g. when focus is lost).
    pub fn clear(&mut self) {
        self.pressed_keys.clear();
    }
}
