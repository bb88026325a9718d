use glam::Vec2;
use web_time::{Duration, Instant};

use super::backend::testing::{CountingScheduler, RecordingBackend};
use super::*;
use crate::assets::{LoadState, LoadingIndicator};
use crate::error::FrameError;
use crate::input::{InputEvent, MouseButton};
use crate::viewport::Resolution;

fn options_with_targets(names: &[&str]) -> Options {
    let mut options = Options::default();
    options.layout.seed = Some(7);
    options.interaction.hit_test_bodies = names.iter().map(|n| (*n).to_owned()).collect();
    options
}

fn context(options: Options, width: f32, height: f32, t0: Instant) -> SceneContext<RecordingBackend> {
    let assets = AssetCoordinator::detached(&options.loading);
    let viewport = Viewport::new(width, height, 1.0, options.display.max_pixel_ratio);
    SceneContext::with_assets(RecordingBackend::default(), options, viewport, assets, t0).unwrap()
}

fn click(ctx: &mut SceneContext<RecordingBackend>) {
    for pressed in [true, false] {
        ctx.handle_input(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed,
        });
    }
}

#[test]
fn construction_sizes_backend_and_registers_loads() {
    let t0 = Instant::now();
    let ctx = context(Options::default(), 1280.0, 720.0, t0);
    assert_eq!(
        ctx.backend().resolutions,
        vec![Resolution {
            width: 1280,
            height: 720
        }]
    );
    assert_eq!(ctx.assets().barrier().registered(), ctx.system().requests.len());
    assert!(ctx.loading_indicator_visible());
    assert_eq!(ctx.interaction(), InteractionState::NoHover);
    assert!((ctx.camera().aspect - 1280.0 / 720.0).abs() < 1e-6);
}

#[test]
fn every_frame_renders_once_and_reschedules() {
    let t0 = Instant::now();
    let mut ctx = context(Options::default(), 800.0, 600.0, t0);
    let mut scheduler = CountingScheduler::default();

    let mut last = -1.0;
    for i in 1..=5u64 {
        let report = ctx.frame(t0 + Duration::from_millis(16 * i), &mut scheduler);
        assert!(report.rendered);
        assert!(report.elapsed_secs >= last);
        last = report.elapsed_secs;
    }
    assert_eq!(scheduler.scheduled, 5);
    assert_eq!(ctx.frame_count(), 5);
    let indices: Vec<u64> = ctx.backend().renders.iter().map(|r| r.frame_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    assert!((ctx.elapsed_secs() - 0.08).abs() < 1e-9);
}

#[test]
fn clock_never_runs_backwards_across_frames() {
    let t0 = Instant::now();
    let mut ctx = context(Options::default(), 800.0, 600.0, t0);
    let mut scheduler = CountingScheduler::default();
    let a = ctx.frame(t0 + Duration::from_millis(50), &mut scheduler);
    let b = ctx.frame(t0 + Duration::from_millis(20), &mut scheduler);
    assert!(b.elapsed_secs >= a.elapsed_secs);
}

#[test]
fn hover_is_level_triggered() {
    let t0 = Instant::now();
    let mut ctx = context(options_with_targets(&["sun"]), 800.0, 600.0, t0);
    let mut scheduler = CountingScheduler::default();
    let sun = ctx.system().sun;

    ctx.handle_input(InputEvent::CursorMoved { x: 400.0, y: 300.0 });
    let k = ctx.frame(t0 + Duration::from_millis(16), &mut scheduler);
    assert_eq!(k.interaction, InteractionState::Hovering(sun));
    assert!(k.hover_changed);
    assert_eq!(ctx.hovered_body().map(|b| b.name.as_str()), Some("sun"));

    ctx.handle_input(InputEvent::CursorMoved { x: 0.0, y: 0.0 });
    let k1 = ctx.frame(t0 + Duration::from_millis(32), &mut scheduler);
    assert_eq!(k1.interaction, InteractionState::NoHover);
    assert!(k1.hover_changed);

    let renders = &ctx.backend().renders;
    assert_eq!(renders[0].interaction, InteractionState::Hovering(sun));
    assert_eq!(renders[1].interaction, InteractionState::NoHover);
}

#[test]
fn only_candidates_are_hit_tested() {
    let t0 = Instant::now();
    let mut ctx = context(options_with_targets(&["earth"]), 800.0, 600.0, t0);
    let mut scheduler = CountingScheduler::default();
    ctx.handle_input(InputEvent::CursorMoved { x: 400.0, y: 300.0 });
    let report = ctx.frame(t0, &mut scheduler);
    assert_ne!(
        report.interaction,
        InteractionState::Hovering(ctx.system().sun)
    );
}

#[test]
fn resize_updates_aspect_and_resolution() {
    let t0 = Instant::now();
    let mut ctx = context(Options::default(), 800.0, 600.0, t0);
    ctx.resize(1920.0, 1080.0, 3.0);
    assert!((ctx.camera().aspect - 1920.0 / 1080.0).abs() < 1e-6);
    assert_eq!(
        ctx.backend().resolutions.last(),
        Some(&Resolution {
            width: 3840,
            height: 2160
        })
    );

    ctx.resize(1024.0, 512.0, 1.0);
    assert!((ctx.camera().aspect - 2.0).abs() < 1e-6);
    assert_eq!(
        ctx.backend().resolutions.last(),
        Some(&Resolution {
            width: 1024,
            height: 512
        })
    );
}

#[test]
fn zero_sized_resize_is_ignored() {
    let t0 = Instant::now();
    let mut ctx = context(Options::default(), 800.0, 600.0, t0);
    let calls = ctx.backend().resolutions.len();
    ctx.resize(0.0, 0.0, 1.0);
    assert_eq!(ctx.backend().resolutions.len(), calls);
    assert!((ctx.camera().aspect - 800.0 / 600.0).abs() < 1e-6);

    let mut scheduler = CountingScheduler::default();
    assert!(ctx.frame(t0, &mut scheduler).rendered);
}

#[test]
fn pointer_coordinates_stay_stale_after_resize() {
    let t0 = Instant::now();
    let mut ctx = context(Options::default(), 1920.0, 1080.0, t0);
    let mut scheduler = CountingScheduler::default();

    ctx.handle_input(InputEvent::CursorMoved { x: 960.0, y: 540.0 });
    assert!(ctx.pointer().ndc().length() < 1e-6);

    ctx.resize(800.0, 600.0, 1.0);
    assert!((ctx.camera().aspect - 800.0 / 600.0).abs() < 1e-6);
    assert!(ctx.pointer().ndc().length() < 1e-6);

    let _ = ctx.frame(t0 + Duration::from_millis(16), &mut scheduler);
    let call = ctx.backend().renders.last().unwrap();
    assert!((call.aspect - 800.0 / 600.0).abs() < 1e-6);

    ctx.handle_input(InputEvent::CursorMoved { x: 800.0, y: 0.0 });
    assert!((ctx.pointer().ndc() - Vec2::new(1.0, 1.0)).length() < 1e-6);
}

#[test]
fn frame_faults_skip_the_render_but_not_the_loop() {
    let t0 = Instant::now();
    let mut ctx = context(Options::default(), 800.0, 600.0, t0);
    let mut scheduler = CountingScheduler::default();
    ctx.backend_mut().failures.push_back(FrameError::SurfaceLost);
    ctx.backend_mut()
        .failures
        .push_back(FrameError::Backend("device hiccup".into()));
    let sizes_before = ctx.backend().resolutions.len();

    let first = ctx.frame(t0, &mut scheduler);
    assert!(!first.rendered);
    assert_eq!(ctx.backend().reconfigures, 1);
    assert_eq!(ctx.backend().resolutions.len(), sizes_before);

    let second = ctx.frame(t0 + Duration::from_millis(16), &mut scheduler);
    assert!(!second.rendered);
    assert_eq!(ctx.backend().reconfigures, 1);
    assert_eq!(ctx.backend().resolutions.len(), sizes_before);

    let third = ctx.frame(t0 + Duration::from_millis(32), &mut scheduler);
    assert!(third.rendered);
    assert_eq!(ctx.fault_count(), 2);
    assert_eq!(scheduler.scheduled, 3);
    assert_eq!(ctx.backend().renders.len(), 1);
}

#[test]
fn click_on_hovered_body_shows_overlay_until_dismissed() {
    let t0 = Instant::now();
    let mut ctx = context(options_with_targets(&["sun"]), 800.0, 600.0, t0);
    let mut scheduler = CountingScheduler::default();

    ctx.handle_input(InputEvent::CursorMoved { x: 400.0, y: 300.0 });
    let _ = ctx.frame(t0, &mut scheduler);
    click(&mut ctx);
    assert_eq!(ctx.overlay(), InfoOverlay::Showing(ctx.system().sun));
    assert_eq!(ctx.overlay_body().map(|b| b.name.as_str()), Some("sun"));

    ctx.handle_input(InputEvent::CursorMoved { x: 0.0, y: 0.0 });
    let _ = ctx.frame(t0 + Duration::from_millis(16), &mut scheduler);
    click(&mut ctx);
    assert!(ctx.overlay().is_visible());

    assert!(ctx.handle_key_press("Escape"));
    assert_eq!(ctx.overlay(), InfoOverlay::Hidden);
    assert!(!ctx.handle_key_press("F13"));
}

#[test]
fn click_to_inspect_can_be_disabled() {
    let t0 = Instant::now();
    let mut options = options_with_targets(&["sun"]);
    options.interaction.click_to_inspect = false;
    let mut ctx = context(options, 800.0, 600.0, t0);
    let mut scheduler = CountingScheduler::default();
    ctx.handle_input(InputEvent::CursorMoved { x: 400.0, y: 300.0 });
    let _ = ctx.frame(t0, &mut scheduler);
    click(&mut ctx);
    assert_eq!(ctx.overlay(), InfoOverlay::Hidden);
}

#[test]
fn scroll_zooms_and_reset_restores_distance() {
    let t0 = Instant::now();
    let mut ctx = context(Options::default(), 800.0, 600.0, t0);
    let mut scheduler = CountingScheduler::default();
    let start = ctx.controller().distance();

    ctx.handle_input(InputEvent::Scroll { delta: -5.0 });
    for i in 0..200 {
        let _ = ctx.frame(t0 + Duration::from_millis(16 * i), &mut scheduler);
    }
    assert!(ctx.controller().distance() > start);

    assert!(ctx.handle_key_press("KeyR"));
    assert!((ctx.controller().distance() - start).abs() < 1e-4);
}

#[test]
fn timed_out_loads_get_placeholders_and_complete_the_barrier() {
    let t0 = Instant::now();
    let mut ctx = context(Options::default(), 800.0, 600.0, t0);
    let registered = ctx.assets().barrier().registered();

    let report = ctx.poll_assets(t0 + Duration::from_secs(1));
    assert_eq!(report.failed, 0);
    assert!(!ctx.assets().all_loaded());

    let timeout = ctx.options().loading.load_timeout();
    let fired_at = t0 + timeout + Duration::from_millis(1);
    let report = ctx.poll_assets(fired_at);
    assert_eq!(report.failed, registered);
    assert!(report.all_loaded);
    assert!(ctx.assets().all_loaded());
    assert!(matches!(
        ctx.assets().indicator(),
        LoadingIndicator::Settling { .. }
    ));
    assert!(ctx.scene().environment().texture.is_some());

    let report = ctx.poll_assets(fired_at + ctx.options().loading.settle_delay());
    assert!(report.indicator_hidden);
    assert!(!ctx.loading_indicator_visible());
}

#[test]
fn settled_loads_are_terminal() {
    let t0 = Instant::now();
    let mut ctx = context(Options::default(), 800.0, 600.0, t0);
    let id = LoadId(0);
    let settle = ctx.settle_load(id, Err(AssetError::LoaderDisconnected), t0);
    assert_eq!(settle, Settle::Accepted { all_loaded: false });
    assert!(matches!(
        ctx.assets().barrier().state(id),
        Some(LoadState::Failed(_))
    ));
    let again = ctx.settle_load(id, Err(AssetError::LoaderDisconnected), t0);
    assert_eq!(again, Settle::Ignored);
}

#[test]
fn option_edits_reach_live_state() {
    let t0 = Instant::now();
    let mut ctx = context(Options::default(), 800.0, 600.0, t0);
    ctx.resize(800.0, 600.0, 2.0);

    ctx.set_option("camera", "fovy", serde_json::json!(60.0)).unwrap();
    assert!((ctx.camera().fovy - 60.0).abs() < 1e-6);

    ctx.set_option("display", "max_pixel_ratio", serde_json::json!(1.0))
        .unwrap();
    assert_eq!(
        ctx.backend().resolutions.last(),
        Some(&Resolution {
            width: 800,
            height: 600
        })
    );

    assert!(ctx.set_option("camera", "nope", serde_json::json!(1)).is_err());
}

#[test]
fn save_preset_writes_options() {
    let t0 = Instant::now();
    let mut ctx = context(Options::default(), 800.0, 600.0, t0);
    let path = std::env::temp_dir()
        .join(format!("orrery-preset-{}", std::process::id()))
        .join("last.toml");
    ctx.set_preset_path(&path);
    assert!(ctx.handle_key_press("KeyP"));
    let loaded = Options::load(&path).unwrap();
    assert_eq!(loaded.camera, ctx.options().camera);
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
