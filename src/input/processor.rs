//! Converts raw platform events into scene commands.
//!
//! The `InputProcessor` owns the transient gesture state (last cursor
//! position, drag detection, modifier keys). It sits between raw window
//! events and [`SceneContext::execute`](crate::engine::SceneContext::execute).

use glam::Vec2;

use super::event::{InputEvent, MouseButton};
use super::keyboard::KeyAction;
use crate::engine::command::SceneCommand;
use crate::options::KeybindingOptions;

/// Cursor travel (logical pixels) after which a press becomes a drag
/// rather than a click.
const DRAG_THRESHOLD: f32 = 3.0;

/// Button currently driving a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Rotate,
    Pan,
}

/// Converts raw window events into [`SceneCommand`]s.
///
/// Left drag orbits the camera, shift + left drag or right drag pans, the
/// wheel zooms. A left press released without travelling past the drag
/// threshold produces [`SceneCommand::Click`].
///
/// ```ignore
/// if let Some(cmd) = processor.handle_event(event) {
///     ctx.execute(cmd);
/// }
/// ```
pub struct InputProcessor {
    /// Last cursor position in logical pixels.
    last_pos: Option<Vec2>,
    /// Active gesture and the distance travelled since the press.
    gesture: Option<(Gesture, f32)>,
    /// Whether the shift modifier is currently held.
    shift_pressed: bool,
}

impl InputProcessor {
    /// Create a processor with no buttons held.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_pos: None,
            gesture: None,
            shift_pressed: false,
        }
    }

    /// Last cursor position in logical pixels, if any was seen.
    #[must_use]
    pub fn mouse_pos(&self) -> Option<Vec2> {
        self.last_pos
    }

    /// Whether a mouse button is held.
    #[must_use]
    pub fn mouse_pressed(&self) -> bool {
        self.gesture.is_some()
    }

    /// Whether the shift modifier is held.
    #[must_use]
    pub fn shift_pressed(&self) -> bool {
        self.shift_pressed
    }

    /// Drop any in-progress gesture, e.g. when the window loses focus.
    pub fn release_mouse_state(&mut self) {
        self.gesture = None;
    }

    /// Look up a key press and return the corresponding command, if bound.
    #[must_use]
    pub fn handle_key_press(
        &self,
        key: &str,
        bindings: &KeybindingOptions,
    ) -> Option<SceneCommand> {
        bindings.lookup(key).map(|action| match action {
            KeyAction::DismissOverlay => SceneCommand::DismissOverlay,
            KeyAction::ResetCamera => SceneCommand::ResetCamera,
            KeyAction::SavePreset => SceneCommand::SavePreset,
        })
    }

    /// Process a raw input event and return zero or one commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<SceneCommand> {
        match event {
            InputEvent::CursorMoved { x, y } => self.handle_cursor_moved(x, y),
            InputEvent::MouseButton { button, pressed } => {
                self.handle_mouse_button(button, pressed)
            }
            InputEvent::Scroll { delta } => Some(SceneCommand::Zoom { delta }),
            InputEvent::ModifiersChanged { shift } => {
                self.shift_pressed = shift;
                None
            }
        }
    }

    fn handle_cursor_moved(&mut self, x: f32, y: f32) -> Option<SceneCommand> {
        let pos = Vec2::new(x, y);
        let delta = self.last_pos.map_or(Vec2::ZERO, |last| pos - last);
        self.last_pos = Some(pos);

        let (gesture, travelled) = self.gesture.as_mut()?;
        *travelled += delta.length();
        if delta == Vec2::ZERO {
            return None;
        }
        match gesture {
            Gesture::Rotate => Some(SceneCommand::RotateCamera { delta }),
            Gesture::Pan => Some(SceneCommand::PanCamera { delta }),
        }
    }

    fn handle_mouse_button(
        &mut self,
        button: MouseButton,
        pressed: bool,
    ) -> Option<SceneCommand> {
        if pressed {
            self.gesture = match button {
                MouseButton::Left if self.shift_pressed => Some((Gesture::Pan, 0.0)),
                MouseButton::Left => Some((Gesture::Rotate, 0.0)),
                MouseButton::Right => Some((Gesture::Pan, 0.0)),
                MouseButton::Middle => None,
            };
            return None;
        }

        let released = self.gesture.take();
        match (button, released) {
            (MouseButton::Left, Some((_, travelled))) if travelled < DRAG_THRESHOLD => {
                Some(SceneCommand::Click)
            }
            _ => None,
        }
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::CursorMoved { x, y }
    }

    fn left(pressed: bool) -> InputEvent {
        InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed,
        }
    }

    #[test]
    fn motion_without_button_is_not_a_command() {
        let mut p = InputProcessor::new();
        assert_eq!(p.handle_event(moved(10.0, 10.0)), None);
        assert_eq!(p.handle_event(moved(20.0, 10.0)), None);
        assert_eq!(p.mouse_pos(), Some(Vec2::new(20.0, 10.0)));
    }

    #[test]
    fn left_drag_rotates_and_suppresses_click() {
        let mut p = InputProcessor::new();
        let _ = p.handle_event(moved(10.0, 10.0));
        assert_eq!(p.handle_event(left(true)), None);
        assert_eq!(
            p.handle_event(moved(30.0, 10.0)),
            Some(SceneCommand::RotateCamera {
                delta: Vec2::new(20.0, 0.0)
            })
        );
        assert_eq!(p.handle_event(left(false)), None);
        assert!(!p.mouse_pressed());
    }

    #[test]
    fn shift_or_right_drag_pans() {
        let mut p = InputProcessor::new();
        let _ = p.handle_event(moved(0.0, 0.0));
        let _ = p.handle_event(InputEvent::ModifiersChanged { shift: true });
        let _ = p.handle_event(left(true));
        assert!(matches!(
            p.handle_event(moved(5.0, 5.0)),
            Some(SceneCommand::PanCamera { .. })
        ));
        let _ = p.handle_event(left(false));
        let _ = p.handle_event(InputEvent::ModifiersChanged { shift: false });

        let _ = p.handle_event(InputEvent::MouseButton {
            button: MouseButton::Right,
            pressed: true,
        });
        assert!(matches!(
            p.handle_event(moved(9.0, 5.0)),
            Some(SceneCommand::PanCamera { .. })
        ));
    }

    #[test]
    fn press_release_in_place_is_a_click() {
        let mut p = InputProcessor::new();
        let _ = p.handle_event(moved(100.0, 100.0));
        let _ = p.handle_event(left(true));
        let _ = p.handle_event(moved(101.0, 100.0));
        assert_eq!(p.handle_event(left(false)), Some(SceneCommand::Click));
    }

    #[test]
    fn scroll_zooms() {
        let mut p = InputProcessor::new();
        assert_eq!(
            p.handle_event(InputEvent::Scroll { delta: 1.5 }),
            Some(SceneCommand::Zoom { delta: 1.5 })
        );
    }

    #[test]
    fn key_lookup_uses_bindings() {
        let p = InputProcessor::new();
        let bindings = KeybindingOptions::default();
        assert_eq!(
            p.handle_key_press("Escape", &bindings),
            Some(SceneCommand::DismissOverlay)
        );
        assert_eq!(
            p.handle_key_press("KeyR", &bindings),
            Some(SceneCommand::ResetCamera)
        );
        assert_eq!(p.handle_key_press("KeyZ", &bindings), None);
    }
}
