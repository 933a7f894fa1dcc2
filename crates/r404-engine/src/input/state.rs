use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use super::types::{InputEvent, Key, KeyState};

/// Input state shared between the runtime (writer) and the module (reader).
pub type SharedInput = Rc<RefCell<InputState>>;

/// Current input state for the hosting window.
///
/// Holds "is down" information, the pointer position and relative mouse motion
/// accumulated since the module last consumed it.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,

    mouse_delta: (f32, f32),
}

impl InputState {
    pub fn shared() -> SharedInput {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // On focus loss, clear "down" sets so no key stays stuck.
                    self.keys_down.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => {
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { key, state } => match state {
                KeyState::Pressed => {
                    self.keys_down.insert(*key);
                }
                KeyState::Released => {
                    self.keys_down.remove(key);
                }
            },

            InputEvent::PointerButton(pb) => {
                self.pointer_pos = Some((pb.x, pb.y));
            }

            InputEvent::MouseMotion { dx, dy } => {
                self.mouse_delta.0 += dx;
                self.mouse_delta.1 += dy;
            }
        }
    }

    /// `Key::Shift` is down while either shift key is held.
    pub fn key_down(&self, key: Key) -> bool {
        match key {
            Key::Shift => {
                self.keys_down.contains(&Key::ShiftLeft) || self.keys_down.contains(&Key::ShiftRight)
            }
            _ => self.keys_down.contains(&key),
        }
    }

    /// Returns the motion accumulated since the previous call and resets it.
    pub fn take_mouse_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.mouse_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerButtonEvent;

    fn key(key: Key, state: KeyState) -> InputEvent { InputEvent::Key { key, state } }

    #[test]
    fn key_press_and_release() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::W, KeyState::Pressed));
        assert!(s.key_down(Key::W));
        s.apply_event(&key(Key::W, KeyState::Released));
        assert!(!s.key_down(Key::W));
    }

    #[test]
    fn focus_loss_clears_held_input() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::A, KeyState::Pressed));
        s.apply_event(&InputEvent::PointerButton(PointerButtonEvent::click(3.0, 4.0)));
        s.apply_event(&InputEvent::Focused(false));
        assert!(s.keys_down.is_empty());
    }

    #[test]
    fn shift_stays_down_until_both_sides_are_released() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::ShiftLeft, KeyState::Pressed));
        s.apply_event(&key(Key::ShiftRight, KeyState::Pressed));
        s.apply_event(&key(Key::ShiftLeft, KeyState::Released));
        assert!(s.key_down(Key::Shift));

        s.apply_event(&key(Key::ShiftRight, KeyState::Released));
        assert!(!s.key_down(Key::Shift));
    }

    #[test]
    fn mouse_motion_accumulates_until_taken() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::MouseMotion { dx: 2.0, dy: -1.0 });
        s.apply_event(&InputEvent::MouseMotion { dx: 3.0, dy: 4.0 });
        assert_eq!(s.take_mouse_delta(), (5.0, 3.0));
        assert_eq!(s.take_mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn button_event_updates_pointer_position() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::PointerButton(PointerButtonEvent::click(10.0, 20.0)));
        assert_eq!(s.pointer_pos, Some((10.0, 20.0)));
        s.apply_event(&InputEvent::PointerLeft);
        assert_eq!(s.pointer_pos, None);
    }
}
