use crate::camera::Camera;
use crate::error::FrameError;
use crate::interaction::InteractionState;
use crate::options::DisplayOptions;
use crate::scene::Scene;
use crate::viewport::Resolution;

/// Per-frame values handed to the backend alongside the scene.
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo<'a> {
    /// Clock reading for this frame, in seconds.
    pub elapsed_secs: f64,
    /// Number of frames started before this one.
    pub frame_index: u64,
    /// Hover state computed this frame.
    pub interaction: InteractionState,
    /// Background and lighting parameters.
    pub display: &'a DisplayOptions,
}

/// Something that can draw a [`Scene`] through a [`Camera`].
///
/// The wgpu renderer implements this; tests substitute a recorder.
pub trait RenderBackend {
    /// Resize the render target.
    fn set_resolution(&mut self, resolution: Resolution);

    /// Re-create the presentation surface at its current size after it was
    /// lost or went out of date.
    fn reconfigure(&mut self);

    /// Draw one frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError`] if the frame could not be produced. The
    /// caller skips the frame and keeps the loop running.
    fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        frame: &FrameInfo<'_>,
    ) -> Result<(), FrameError>;
}

/// The host's "render again at the next display refresh" primitive.
pub trait FrameScheduler {
    /// Arrange for the next frame to run.
    fn schedule_next_frame(&mut self);
}
