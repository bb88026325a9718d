//! Event dispatch and command execution.

use super::backend::RenderBackend;
use super::command::SceneCommand;
use super::SceneContext;
use crate::input::InputEvent;

impl<B: RenderBackend> SceneContext<B> {
    /// Process a platform-agnostic input event.
    ///
    /// Pointer moves update the normalized pointer position against the
    /// current viewport; gestures become [`SceneCommand`]s and run
    /// immediately.
    ///
    /// ```ignore
    /// ctx.handle_input(InputEvent::CursorMoved { x, y });
    /// ctx.handle_input(InputEvent::Scroll { delta: 1.0 });
    /// ```
    pub fn handle_input(&mut self, event: InputEvent) {
        if let InputEvent::CursorMoved { x, y } = event {
            let _ = self.pointer.on_move(
                x,
                y,
                self.viewport.width(),
                self.viewport.height(),
            );
        }
        if let Some(command) = self.processor.handle_event(event) {
            self.execute(command);
        }
    }

    /// Process a key press given as a `winit::keyboard::KeyCode` debug
    /// string (`"Escape"`, `"KeyR"`). Returns `true` if the key is bound.
    pub fn handle_key_press(&mut self, key: &str) -> bool {
        match self
            .processor
            .handle_key_press(key, &self.options.keybindings)
        {
            Some(command) => {
                self.execute(command);
                true
            }
            None => false,
        }
    }

    /// Drop any in-progress drag, e.g. when the window loses focus.
    pub fn release_mouse_state(&mut self) {
        self.processor.release_mouse_state();
    }

    /// Run one command.
    pub fn execute(&mut self, command: SceneCommand) {
        match command {
            SceneCommand::RotateCamera { delta } => self.controller.rotate(delta),
            SceneCommand::PanCamera { delta } => self.controller.pan(delta),
            SceneCommand::Zoom { delta } => self.controller.zoom(delta),
            SceneCommand::ResetCamera => self.controller.reset(),
            SceneCommand::Click => self.inspect_hovered(),
            SceneCommand::DismissOverlay => {
                if self.overlay.dismiss() {
                    log::info!("overlay dismissed");
                }
            }
            SceneCommand::SavePreset => match self.options.save(&self.preset_path) {
                Ok(()) => log::info!("saved options to {}", self.preset_path.display()),
                Err(e) => log::error!("failed to save options: {e}"),
            },
        }
    }

    fn inspect_hovered(&mut self) {
        if !self.options.interaction.click_to_inspect {
            return;
        }
        let Some(body) = self.interaction.current_intersecting_object() else {
            return;
        };
        if self.overlay.show(body) {
            if let Some(body) = self.scene.body(body) {
                log::info!("showing {}: {}", body.name, body.description);
            }
        }
    }
}
