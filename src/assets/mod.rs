//! Asset Loading Coordinator.
//!
//! Textures, the HDR environment map and models are decoded on a
//! background thread and attached to the scene on the main thread. Each
//! load moves through `Pending → Loaded | Failed`; a counting barrier fires
//! "all assets loaded" exactly once, after which the loading indicator
//! lingers for a settle delay. Failed or timed-out loads attach placeholder
//! content so one bad file cannot stall the scene.

mod barrier;
mod coordinator;
mod data;
pub mod decode;
mod indicator;
mod loader;
mod request;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub use barrier::{LoadId, LoadState, LoadingBarrier, Settle};
pub use coordinator::{AssetCoordinator, PollReport};
pub use data::{compute_normals, ModelData, ModelMesh, TextureData, TexturePixels};
pub use indicator::LoadingIndicator;
pub use loader::{AssetLoader, LoadJob, LoadOutcome};
pub use request::{AssetKind, AttachTarget, LoadRequest, LoadedAsset, ModelFormat};

/// Asset registration, decoding and attachment failures.
#[derive(Debug)]
pub enum AssetError {
    /// The file could not be read.
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file was read but its contents could not be decoded.
    Decode {
        /// File that failed.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },
    /// No decoder handles this file type.
    UnsupportedFormat(PathBuf),
    /// The load was still pending after the configured timeout.
    Timeout {
        /// File that stalled.
        path: PathBuf,
        /// Configured timeout.
        after: Duration,
    },
    /// The loader thread is gone.
    LoaderDisconnected,
    /// Another load already attaches to this target.
    DuplicateTarget(AttachTarget),
    /// Registration after the barrier was sealed or fired.
    Sealed,
    /// The decoded asset does not fit the target (e.g. a model into a
    /// texture slot).
    KindMismatch(AttachTarget),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
            Self::Decode { path, message } => {
                write!(f, "cannot decode {}: {message}", path.display())
            }
            Self::UnsupportedFormat(path) => {
                write!(f, "unsupported format: {}", path.display())
            }
            Self::Timeout { path, after } => write!(
                f,
                "{} still loading after {} ms",
                path.display(),
                after.as_millis()
            ),
            Self::LoaderDisconnected => write!(f, "asset loader disconnected"),
            Self::DuplicateTarget(t) => {
                write!(f, "{t:?} is already claimed by another load")
            }
            Self::Sealed => write!(f, "load registration is closed"),
            Self::KindMismatch(t) => {
                write!(f, "asset kind does not fit target {t:?}")
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
