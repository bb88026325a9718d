//! Standalone window backed by winit.
//!
//! ```no_run
//! # use orrery::Viewer;
//! Viewer::builder()
//!     .with_title("Solar System")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use web_time::Instant;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::{
    engine::{FrameScheduler, SceneContext},
    error::OrreryError,
    gpu::{RenderContext, SceneRenderer},
    input::{InputEvent, MouseButton},
    options::Options,
    viewport::Viewport,
};

/// Pixels of trackpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f64 = 50.0;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options: None,
            title: "Orrery".into(),
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A window showing the solar system scene.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Viewer`] if the event loop cannot start, or
    /// the first error that stopped scene setup.
    pub fn run(self) -> Result<(), OrreryError> {
        let event_loop =
            EventLoop::new().map_err(|e| OrreryError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            context: None,
            options: Some(self.options),
            title: self.title,
            startup_error: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| OrreryError::Viewer(e.to_string()))?;
        app.startup_error.map_or(Ok(()), Err)
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Requests the next frame through the window's redraw queue.
struct WindowScheduler<'a>(&'a Window);

impl FrameScheduler for WindowScheduler<'_> {
    fn schedule_next_frame(&mut self) {
        self.0.request_redraw();
    }
}

struct ViewerApp {
    window: Option<Arc<Window>>,
    context: Option<SceneContext<SceneRenderer>>,
    options: Option<Options>,
    title: String,
    startup_error: Option<OrreryError>,
}

/// Logical size and device pixel ratio of `window`.
fn logical_size(window: &Window) -> (f32, f32, f64) {
    let scale = window.scale_factor();
    let size = window.inner_size().to_logical::<f64>(scale);
    (size.width as f32, size.height as f32, scale)
}

impl ViewerApp {
    fn init(&mut self, window: &Arc<Window>) -> Result<SceneContext<SceneRenderer>, OrreryError> {
        let inner = window.inner_size();
        let render_context = pollster::block_on(RenderContext::new(
            Arc::clone(window),
            (inner.width.max(1), inner.height.max(1)),
        ))?;
        let renderer = SceneRenderer::new(render_context)?;

        let options = self.options.take().unwrap_or_default();
        let (width, height, scale) = logical_size(window);
        let viewport = Viewport::new(width, height, scale, options.display.max_pixel_ratio);
        SceneContext::new(renderer, options, viewport, Instant::now())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: OrreryError) {
        log::error!("failed to start scene: {error}");
        self.startup_error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let size = mon.size().to_logical::<f64>(mon.scale_factor());
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    size.width * 0.75,
                    size.height * 0.75,
                ))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, OrreryError::Viewer(e.to_string()));
                return;
            }
        };

        match self.init(&window) {
            Ok(context) => {
                window.request_redraw();
                self.window = Some(window);
                self.context = Some(context);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        let (Some(window), Some(context)) = (&self.window, &mut self.context) else {
            return;
        };

        match event {
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                let (width, height, scale) = logical_size(window);
                context.resize(width, height, scale);
            }

            WindowEvent::RedrawRequested => {
                let _ = context.frame(Instant::now(), &mut WindowScheduler(window));
            }

            WindowEvent::MouseInput { button, state, .. } => {
                context.handle_input(InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(window.scale_factor());
                context.handle_input(InputEvent::CursorMoved {
                    x: logical.x as f32,
                    y: logical.y as f32,
                });
            }

            WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                context.release_mouse_state();
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
                };
                context.handle_input(InputEvent::Scroll { delta: lines });
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                context.handle_input(InputEvent::ModifiersChanged {
                    shift: modifiers.state().shift_key(),
                });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    let _ = context.handle_key_press(&format!("{code:?}"));
                }
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(context) = &mut self.context {
            let _ = context.poll_assets(Instant::now());
        }
    }
}
