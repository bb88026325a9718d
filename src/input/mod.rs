//! Input handling: event types, pointer mapping, and the processor that
//! converts raw window events into scene commands.

/// Platform-agnostic input events.
pub mod event;
/// Bindable key actions.
pub mod keyboard;
/// Pointer position in normalized device coordinates.
pub mod pointer;
/// Converts raw events into scene commands.
pub mod processor;

pub use event::{InputEvent, MouseButton};
pub use keyboard::KeyAction;
pub use pointer::{to_ndc, PointerState};
pub use processor::InputProcessor;
