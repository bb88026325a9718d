//! Crate-level error types.

use std::fmt;

use crate::assets::AssetError;
use crate::gpu::render_context::RenderContextError;
use crate::scene::SceneError;

/// Errors produced by the orrery crate.
#[derive(Debug)]
pub enum OrreryError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Asset registration or decoding failure.
    Asset(AssetError),
    /// Scene-graph construction failure.
    Scene(SceneError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Shader composition failure.
    Shader(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for OrreryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Asset(e) => write!(f, "asset error: {e}"),
            Self::Scene(e) => write!(f, "scene error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for OrreryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Asset(e) => Some(e),
            Self::Scene(e) => Some(e),
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for OrreryError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<AssetError> for OrreryError {
    fn from(e: AssetError) -> Self {
        Self::Asset(e)
    }
}

impl From<SceneError> for OrreryError {
    fn from(e: SceneError) -> Self {
        Self::Scene(e)
    }
}

impl From<std::io::Error> for OrreryError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// A fault raised while producing one frame.
///
/// Frame faults are isolated: the render loop logs them, skips the render
/// for that frame, and keeps scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The presentation surface was lost and must be reconfigured.
    SurfaceLost,
    /// The presentation surface no longer matches the window.
    SurfaceOutdated,
    /// Any other backend failure.
    Backend(String),
}

impl FrameError {
    /// Whether the surface should be reconfigured before the next frame.
    #[must_use]
    pub fn needs_reconfigure(&self) -> bool {
        matches!(self, Self::SurfaceLost | Self::SurfaceOutdated)
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceLost => write!(f, "surface lost"),
            Self::SurfaceOutdated => write!(f, "surface outdated"),
            Self::Backend(msg) => write!(f, "backend failure: {msg}"),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<wgpu::SurfaceError> for FrameError {
    fn from(e: wgpu::SurfaceError) -> Self {
        match e {
            wgpu::SurfaceError::Lost => Self::SurfaceLost,
            wgpu::SurfaceError::Outdated => Self::SurfaceOutdated,
            other => Self::Backend(other.to_string()),
        }
    }
}
