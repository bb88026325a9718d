//! The render loop body: one call per display refresh.

use web_time::Instant;

use super::backend::{FrameInfo, FrameScheduler, RenderBackend};
use super::SceneContext;
use crate::camera::Ray;
use crate::interaction::InteractionState;

/// After the first fault, only every this-many-th fault is logged.
const FAULT_LOG_INTERVAL: u64 = 120;

/// What one [`SceneContext::frame`] call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Clock reading for the frame, in seconds.
    pub elapsed_secs: f64,
    /// Hover state after this frame's hit test.
    pub interaction: InteractionState,
    /// The hover state differs from the previous frame's.
    pub hover_changed: bool,
    /// The backend produced the frame. `false` means it was skipped.
    pub rendered: bool,
}

impl<B: RenderBackend> SceneContext<B> {
    /// Run one frame.
    ///
    /// In order: sample the clock, advance the orbit controller's damping,
    /// rebuild the pointer ray and re-evaluate hover, render once, and
    /// schedule the next frame. A render failure skips that frame's image
    /// only; the next frame is scheduled regardless.
    pub fn frame(&mut self, now: Instant, scheduler: &mut impl FrameScheduler) -> FrameReport {
        let frame_index = self.frame_count;
        self.frame_count += 1;

        let elapsed_secs = self.clock.sample_at(now);

        let _ = self.controller.update();

        let ray = Ray::from_ndc(self.pointer.ndc(), &self.controller.camera);
        let hit = self
            .hit_tester
            .cast(&self.scene, &ray)
            .map(|(body, _)| body);
        let hover_changed = self.interaction.update(hit);
        self.last_ray = Some(ray);
        if hover_changed && self.options.debug.show_hover_log {
            match self.hovered_body() {
                Some(body) => log::debug!("hovering {}", body.name),
                None => log::debug!("hover cleared"),
            }
        }

        let rendered = self.render_once(elapsed_secs, frame_index);

        scheduler.schedule_next_frame();

        let _ = self.frame_timing.tick(now);
        if self.options.debug.log_fps && self.frame_timing.should_report(now) {
            log::debug!("{:.1} fps", self.frame_timing.fps());
        }

        FrameReport {
            elapsed_secs,
            interaction: self.interaction,
            hover_changed,
            rendered,
        }
    }

    fn render_once(&mut self, elapsed_secs: f64, frame_index: u64) -> bool {
        let info = FrameInfo {
            elapsed_secs,
            frame_index,
            interaction: self.interaction,
            display: &self.options.display,
        };
        match self
            .backend
            .render(&self.scene, &self.controller.camera, &info)
        {
            Ok(()) => {
                self.scene.mark_rendered();
                true
            }
            Err(err) => {
                self.fault_count += 1;
                if self.fault_count == 1 || self.fault_count % FAULT_LOG_INTERVAL == 0 {
                    log::warn!(
                        "frame {frame_index} skipped: {err} ({} faults so far)",
                        self.fault_count
                    );
                }
                if err.needs_reconfigure() {
                    self.backend.reconfigure();
                }
                false
            }
        }
    }
}
