//! The scene context and the per-frame driver.
//!
//! [`SceneContext`] owns every piece of mutable state: the scene graph,
//! the orbit controller and its camera, the render backend, the clock,
//! pointer and hover state, the viewport and the asset coordinator. Hosts
//! hold one context and pass events and frame ticks into it; nothing is
//! global.

mod backend;
/// The scene's interactive command vocabulary.
pub mod command;
mod frame;
mod input;

use std::path::PathBuf;

use web_time::Instant;

pub use self::backend::{FrameInfo, FrameScheduler, RenderBackend};
pub use self::command::SceneCommand;
pub use self::frame::FrameReport;
use crate::assets::{AssetCoordinator, AssetError, LoadId, LoadedAsset, PollReport, Settle};
use crate::camera::{Camera, OrbitController, Ray};
use crate::error::OrreryError;
use crate::input::{InputProcessor, PointerState};
use crate::interaction::{HitTester, InfoOverlay, InteractionState};
use crate::options::Options;
use crate::scene::catalog::{self, SolarSystem};
use crate::scene::{CelestialBody, Scene};
use crate::util::clock::Clock;
use crate::util::frame_timing::FrameTiming;
use crate::viewport::Viewport;

/// Where [`SceneCommand::SavePreset`] writes by default.
const DEFAULT_PRESET_PATH: &str = "presets/last.toml";

/// Everything the running scene owns, passed explicitly to the frame
/// driver and to every event handler.
pub struct SceneContext<B: RenderBackend> {
    scene: Scene,
    system: SolarSystem,
    controller: OrbitController,
    backend: B,
    clock: Clock,
    pointer: PointerState,
    processor: InputProcessor,
    interaction: InteractionState,
    hit_tester: HitTester,
    overlay: InfoOverlay,
    viewport: Viewport,
    assets: AssetCoordinator,
    options: Options,
    frame_timing: FrameTiming,
    frame_count: u64,
    fault_count: u64,
    last_ray: Option<Ray>,
    preset_path: PathBuf,
}

impl<B: RenderBackend> SceneContext<B> {
    /// Build the solar system, start the loader thread, register every
    /// asset load and size the backend to `viewport`.
    ///
    /// # Errors
    ///
    /// Fails if the scene cannot be assembled, the loader thread cannot be
    /// spawned, or a load registration is rejected.
    pub fn new(
        backend: B,
        options: Options,
        viewport: Viewport,
        now: Instant,
    ) -> Result<Self, OrreryError> {
        let assets =
            AssetCoordinator::new(&options.loading).map_err(OrreryError::ThreadSpawn)?;
        Self::with_assets(backend, options, viewport, assets, now)
    }

    /// Like [`new`](Self::new) but with a caller-supplied coordinator,
    /// e.g. a [detached](AssetCoordinator::detached) one fed by hand.
    ///
    /// # Errors
    ///
    /// Fails if the scene cannot be assembled or a load registration is
    /// rejected.
    pub fn with_assets(
        mut backend: B,
        options: Options,
        viewport: Viewport,
        mut assets: AssetCoordinator,
        now: Instant,
    ) -> Result<Self, OrreryError> {
        let mut scene = Scene::new();
        let system = catalog::build(&mut scene, &options)?;
        let _ = assets.register_all(&system.requests, now)?;
        let _ = assets.seal(now);
        log::info!(
            "scene built: {} bodies, {} loads pending",
            scene.bodies().len(),
            system.requests.len()
        );

        let hit_tester = HitTester::from_names(&scene, &options.interaction.hit_test_bodies);
        let controller = OrbitController::new(&options.camera, viewport.aspect());
        backend.set_resolution(viewport.resolution());

        Ok(Self {
            scene,
            system,
            controller,
            backend,
            clock: Clock::starting_at(now),
            pointer: PointerState::new(),
            processor: InputProcessor::new(),
            interaction: InteractionState::NoHover,
            hit_tester,
            overlay: InfoOverlay::Hidden,
            viewport,
            assets,
            options,
            frame_timing: FrameTiming::default(),
            frame_count: 0,
            fault_count: 0,
            last_ray: None,
            preset_path: PathBuf::from(DEFAULT_PRESET_PATH),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The scene graph.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Handles to the catalog bodies.
    #[must_use]
    pub fn system(&self) -> &SolarSystem {
        &self.system
    }

    /// The camera as of the last controller update.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.controller.camera
    }

    /// The orbit controller.
    #[must_use]
    pub fn controller(&self) -> &OrbitController {
        &self.controller
    }

    /// The render backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the render backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Pointer position in normalized device coordinates.
    #[must_use]
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Hover state from the most recent frame.
    #[must_use]
    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }

    /// The hovered body, if any.
    #[must_use]
    pub fn hovered_body(&self) -> Option<&CelestialBody> {
        self.interaction
            .current_intersecting_object()
            .and_then(|id| self.scene.body(id))
    }

    /// Information overlay state.
    #[must_use]
    pub fn overlay(&self) -> InfoOverlay {
        self.overlay
    }

    /// The body whose information panel is showing.
    #[must_use]
    pub fn overlay_body(&self) -> Option<&CelestialBody> {
        self.overlay.body().and_then(|id| self.scene.body(id))
    }

    /// Current viewport geometry.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The asset coordinator.
    #[must_use]
    pub fn assets(&self) -> &AssetCoordinator {
        &self.assets
    }

    /// Mutable access to the asset coordinator.
    pub fn assets_mut(&mut self) -> &mut AssetCoordinator {
        &mut self.assets
    }

    /// Whether the loading indicator should be drawn.
    #[must_use]
    pub fn loading_indicator_visible(&self) -> bool {
        self.assets.indicator().is_visible()
    }

    /// Active options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Ray built during the most recent frame.
    #[must_use]
    pub fn last_ray(&self) -> Option<Ray> {
        self.last_ray
    }

    /// Frames started so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames skipped because the backend failed.
    #[must_use]
    pub fn fault_count(&self) -> u64 {
        self.fault_count
    }

    /// Clock reading taken by the most recent frame.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.clock.last_secs()
    }

    /// Change where [`SceneCommand::SavePreset`] writes.
    pub fn set_preset_path(&mut self, path: impl Into<PathBuf>) {
        self.preset_path = path.into();
    }

    // ── Asset completions ────────────────────────────────────────────

    /// Apply load results that arrived since the last call. Hosts call
    /// this between frames.
    pub fn poll_assets(&mut self, now: Instant) -> PollReport {
        self.assets.poll(&mut self.scene, now)
    }

    /// Apply a load result by hand (detached coordinators).
    pub fn settle_load(
        &mut self,
        id: LoadId,
        result: Result<LoadedAsset, AssetError>,
        now: Instant,
    ) -> Settle {
        self.assets.settle(&mut self.scene, id, result, now)
    }

    // ── Viewport ─────────────────────────────────────────────────────

    /// React to a window resize given in logical pixels. Zero or invalid
    /// sizes are ignored.
    ///
    /// The pointer's normalized coordinates are not recomputed; they
    /// update on the next pointer move.
    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f64) {
        if let Some(resolution) = self.viewport.resize(width, height, device_pixel_ratio) {
            self.controller.camera.set_aspect(self.viewport.aspect());
            self.backend.set_resolution(resolution);
        }
    }

    // ── Options ──────────────────────────────────────────────────────

    /// Apply one `section.field` edit and push it into the live state.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::OptionsParse`] for an unknown field or a
    /// value of the wrong type.
    pub fn set_option(
        &mut self,
        section: &str,
        field: &str,
        value: serde_json::Value,
    ) -> Result<(), OrreryError> {
        self.options.set_field(section, field, value)?;
        self.apply_options();
        Ok(())
    }

    /// Replace every option and push the changes into the live state.
    pub fn set_options(&mut self, options: Options) {
        self.options = options;
        self.apply_options();
    }

    fn apply_options(&mut self) {
        self.controller.apply_options(&self.options.camera);
        let before = self.viewport.resolution();
        let after = self
            .viewport
            .set_max_pixel_ratio(self.options.display.max_pixel_ratio);
        if after != before {
            self.backend.set_resolution(after);
        }
        self.hit_tester =
            HitTester::from_names(&self.scene, &self.options.interaction.hit_test_bodies);
    }
}

#[cfg(test)]
mod tests;
