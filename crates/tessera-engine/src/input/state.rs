use std::collections::HashSet;

use super::types::{
    InputEvent, Key, KeyState, MouseButton, MouseButtonState, PointerButtonEvent,
    PointerMoveEvent,
};
use super::Modifiers;

/// Current input state for the window.
///
/// Tracks what the platform does not report with each event: the pointer
/// position for button presses and which keys are already held.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,

    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,

    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds `ev` into the state.
    ///
    /// Returns false for a key press of a key that is already held, which
    /// callers treat like an auto-repeat.
    pub fn apply_event(&mut self, ev: &InputEvent) -> bool {
        match ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases are not delivered while unfocused.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key {
                key,
                state,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;
                match state {
                    KeyState::Pressed => return self.keys_down.insert(*key),
                    KeyState::Released => {
                        self.keys_down.remove(key);
                    }
                }
            }

            InputEvent::PointerButton(PointerButtonEvent {
                button,
                state,
                x,
                y,
                modifiers,
            }) => {
                self.pointer_pos = Some((*x, *y));
                self.modifiers = *modifiers;
                match state {
                    MouseButtonState::Pressed => {
                        self.buttons_down.insert(*button);
                    }
                    MouseButtonState::Released => {
                        self.buttons_down.remove(button);
                    }
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key {
            key,
            state,
            modifiers: Modifiers::default(),
            code: 0,
            repeat: false,
        }
    }

    #[test]
    fn held_key_press_is_not_fresh() {
        let mut s = InputState::default();
        assert!(s.apply_event(&key(Key::ArrowLeft, KeyState::Pressed)));
        assert!(!s.apply_event(&key(Key::ArrowLeft, KeyState::Pressed)));
        assert!(s.keys_down.contains(&Key::ArrowLeft));

        s.apply_event(&key(Key::ArrowLeft, KeyState::Released));
        assert!(!s.keys_down.contains(&Key::ArrowLeft));
        assert!(s.apply_event(&key(Key::ArrowLeft, KeyState::Pressed)));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::Space, KeyState::Pressed));
        s.apply_event(&InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state: MouseButtonState::Pressed,
            x: 1.0,
            y: 2.0,
            modifiers: Modifiers::default(),
        }));

        s.apply_event(&InputEvent::Focused(false));
        assert!(s.keys_down.is_empty());
        assert!(s.buttons_down.is_empty());
        assert_eq!(s.pointer_pos, Some((1.0, 2.0)));
    }

    #[test]
    fn pointer_tracking() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::PointerMoved(PointerMoveEvent { x: 3.0, y: 4.0 }));
        assert_eq!(s.pointer_pos, Some((3.0, 4.0)));
        s.apply_event(&InputEvent::PointerLeft);
        assert_eq!(s.pointer_pos, None);
    }
}
