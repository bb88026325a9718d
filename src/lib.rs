// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Interactive real-time 3D solar system scene built on wgpu.
//!
//! Orrery lays out the sun and planets procedurally, streams their textures
//! and an equirectangular environment map in the background, and drives a
//! render loop with orbit-camera controls and pointer hover detection.
//!
//! # Key entry points
//!
//! - [`engine::SceneContext`] - owns the scene, camera, clock and backend
//!   and runs one frame per [`frame`](engine::SceneContext::frame) call
//! - [`scene::catalog`] - builds the solar system into a [`scene::Scene`]
//! - [`assets::AssetCoordinator`] - load registration, completion barrier
//!   and loading indicator
//! - [`options::Options`] - runtime configuration (camera, display, layout,
//!   loading, interaction)
//!
//! # Architecture
//!
//! Asset decoding runs on a background loader thread; decoded results are
//! attached to the scene on the host thread between frames. Each frame
//! samples the clock, updates the camera controller, hit-tests the pointer
//! ray against candidate bodies, renders through a
//! [`engine::RenderBackend`], and schedules the next frame. A failed frame
//! is logged and skipped without stopping the loop.

pub mod assets;
pub mod camera;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod interaction;
pub mod options;
pub mod scene;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;
pub mod viewport;

pub use engine::{SceneCommand, SceneContext};
pub use error::{FrameError, OrreryError};
pub use input::{InputEvent, MouseButton};
pub use options::Options;
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
