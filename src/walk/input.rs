//! Keyboard movement state
//!
//! Key events flip four independent flags that the frame tick reads once per
//! frame. Codes are resolved through [`KeyBindings`]; anything unbound is
//! ignored.

use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

/// One of the four movement directions a key can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveAction {
    Forward,
    Backward,
    Left,
    Right,
}

/// Physical key assigned to each movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            backward: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
        }
    }
}

impl KeyBindings {
    /// Movement action bound to `code`, if any
    pub fn action_for(&self, code: KeyCode) -> Option<MoveAction> {
        if code == self.forward {
            Some(MoveAction::Forward)
        } else if code == self.backward {
            Some(MoveAction::Backward)
        } else if code == self.left {
            Some(MoveAction::Left)
        } else if code == self.right {
            Some(MoveAction::Right)
        } else {
            None
        }
    }
}

/// Held state of the four movement keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    pub fn set(&mut self, action: MoveAction, pressed: bool) {
        match action {
            MoveAction::Forward => self.forward = pressed,
            MoveAction::Backward => self.backward = pressed,
            MoveAction::Left => self.left = pressed,
            MoveAction::Right => self.right = pressed,
        }
    }

    /// Forward or backward held
    pub fn longitudinal(&self) -> bool {
        self.forward || self.backward
    }

    /// Left or right held
    pub fn lateral(&self) -> bool {
        self.left || self.right
    }

    pub fn any_held(&self) -> bool {
        self.longitudinal() || self.lateral()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Turns key events into [`InputState`] updates
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    bindings: KeyBindings,
    state: InputState,
}

impl InputTracker {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            state: InputState::default(),
        }
    }

    /// Records a key press or release. Returns `true` if the key is bound.
    pub fn on_key_change(&mut self, code: KeyCode, pressed: bool) -> bool {
        match self.bindings.action_for(code) {
            Some(action) => {
                self.state.set(action, pressed);
                true
            }
            None => false,
        }
    }

    /// Releases every key, e.g. when the window loses focus mid-press
    pub fn clear(&mut self) {
        self.state.clear();
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_wasd() {
        let mut tracker = InputTracker::default();

        assert!(tracker.on_key_change(KeyCode::KeyW, true));
        assert!(tracker.on_key_change(KeyCode::KeyD, true));
        assert_eq!(
            *tracker.state(),
            InputState {
                forward: true,
                backward: false,
                left: false,
                right: true,
            }
        );

        tracker.on_key_change(KeyCode::KeyW, false);
        assert!(!tracker.state().forward);
        assert!(tracker.state().right);
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        let mut tracker = InputTracker::default();
        tracker.on_key_change(KeyCode::KeyS, true);
        let before = *tracker.state();

        for code in [KeyCode::KeyQ, KeyCode::Space, KeyCode::ArrowUp, KeyCode::ShiftLeft] {
            assert!(!tracker.on_key_change(code, true));
            assert!(!tracker.on_key_change(code, false));
        }
        assert_eq!(*tracker.state(), before);
    }

    #[test]
    fn test_custom_bindings() {
        let mut tracker = InputTracker::new(KeyBindings {
            forward: KeyCode::ArrowUp,
            backward: KeyCode::ArrowDown,
            left: KeyCode::ArrowLeft,
            right: KeyCode::ArrowRight,
        });

        assert!(!tracker.on_key_change(KeyCode::KeyW, true));
        assert!(tracker.on_key_change(KeyCode::ArrowLeft, true));
        assert!(tracker.state().left);
        assert!(!tracker.state().forward);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut tracker = InputTracker::default();
        for code in [KeyCode::KeyW, KeyCode::KeyA, KeyCode::KeyS, KeyCode::KeyD] {
            tracker.on_key_change(code, true);
        }
        assert!(tracker.state().any_held());

        tracker.clear();
        assert!(!tracker.state().any_held());
    }
}
