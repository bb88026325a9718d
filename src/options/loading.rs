use std::path::PathBuf;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Loading", inline)]
#[serde(default)]
/// Asset loading parameters.
pub struct LoadingOptions {
    /// Grace period between "all assets loaded" and hiding the indicator.
    #[schemars(title = "Settle Delay (ms)", range(min = 0, max = 5000))]
    pub settle_delay_ms: u64,
    /// A load still pending after this long fails with a timeout.
    #[schemars(skip)]
    pub load_timeout_ms: u64,
    /// Directory that relative asset paths resolve against.
    #[schemars(skip)]
    pub asset_root: PathBuf,
    /// Extra model files added to the scene root (glTF/GLB or OBJ).
    #[schemars(skip)]
    pub models: Vec<String>,
}

impl Default for LoadingOptions {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1000,
            load_timeout_ms: 30_000,
            asset_root: PathBuf::from("assets"),
            models: vec!["Models/saturn.glb".into()],
        }
    }
}

impl LoadingOptions {
    /// The settle delay as a [`Duration`].
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// The load timeout as a [`Duration`].
    #[must_use]
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// Resolve an asset path against [`asset_root`](Self::asset_root).
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.asset_root.join(path)
    }
}
