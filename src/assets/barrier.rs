//! Per-load state machine and the counting barrier behind the
//! "all assets loaded" signal.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use web_time::{Duration, Instant};

use super::request::AttachTarget;
use super::AssetError;

/// Handle to one registered load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadId(pub(crate) u32);

/// Lifecycle of one load. `Loaded` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Submitted, no result yet.
    Pending,
    /// Decoded and attached.
    Loaded,
    /// Failed or timed out; placeholder content was attached.
    Failed(String),
}

impl LoadState {
    /// Whether the state can no longer change.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Result of reporting a load's outcome to the barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// The load moved to a terminal state.
    Accepted {
        /// `true` for the one settle that completed the whole set.
        all_loaded: bool,
    },
    /// The load was already terminal (late result after a timeout) or the
    /// id is unknown; nothing changed.
    Ignored,
}

#[derive(Debug)]
struct Entry {
    path: PathBuf,
    targets: Vec<AttachTarget>,
    state: LoadState,
    registered_at: Instant,
}

/// Counts registered loads down to zero and fires once.
///
/// Completion fires when every registered load is terminal and at least one
/// was registered, or at [`seal`](Self::seal) when none were. Each attach
/// target may be claimed by only one load.
#[derive(Debug, Default)]
pub struct LoadingBarrier {
    entries: Vec<Entry>,
    claimed: FxHashSet<AttachTarget>,
    settled: usize,
    failed: usize,
    sealed: bool,
    fired: bool,
}

impl LoadingBarrier {
    /// An empty, unsealed barrier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending load that will attach to `targets`.
    ///
    /// # Errors
    ///
    /// [`AssetError::Sealed`] after [`seal`](Self::seal) or after completion
    /// fired; [`AssetError::DuplicateTarget`] if any target is already
    /// claimed (by this or an earlier load).
    pub fn register(
        &mut self,
        path: &Path,
        targets: &[AttachTarget],
        now: Instant,
    ) -> Result<LoadId, AssetError> {
        if self.sealed || self.fired {
            return Err(AssetError::Sealed);
        }
        let mut seen = FxHashSet::default();
        for target in targets {
            if self.claimed.contains(target) || !seen.insert(*target) {
                return Err(AssetError::DuplicateTarget(*target));
            }
        }
        self.claimed.extend(seen);
        let id = LoadId(self.entries.len() as u32);
        self.entries.push(Entry {
            path: path.to_path_buf(),
            targets: targets.to_vec(),
            state: LoadState::Pending,
            registered_at: now,
        });
        Ok(id)
    }

    /// Close registration. Returns `true` if this fires completion, which
    /// happens when nothing was registered or everything already settled
    /// without firing.
    pub fn seal(&mut self) -> bool {
        self.sealed = true;
        self.try_fire()
    }

    /// Move a pending load to `Loaded` (`Ok`) or `Failed` (`Err`).
    pub fn settle(&mut self, id: LoadId, result: Result<(), String>) -> Settle {
        let Some(entry) = self.entries.get_mut(id.0 as usize) else {
            return Settle::Ignored;
        };
        if entry.state.is_terminal() {
            return Settle::Ignored;
        }
        entry.state = match result {
            Ok(()) => LoadState::Loaded,
            Err(reason) => {
                self.failed += 1;
                LoadState::Failed(reason)
            }
        };
        self.settled += 1;
        Settle::Accepted {
            all_loaded: self.try_fire(),
        }
    }

    fn try_fire(&mut self) -> bool {
        let ready = if self.entries.is_empty() {
            self.sealed
        } else {
            self.settled == self.entries.len()
        };
        if ready && !self.fired {
            self.fired = true;
            return true;
        }
        false
    }

    /// Pending loads registered at least `timeout` before `now`.
    #[must_use]
    pub fn overdue(&self, now: Instant, timeout: Duration) -> Vec<LoadId> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.state == LoadState::Pending
                    && now.saturating_duration_since(e.registered_at) >= timeout
            })
            .map(|(i, _)| LoadId(i as u32))
            .collect()
    }

    /// Current state of a load.
    #[must_use]
    pub fn state(&self, id: LoadId) -> Option<&LoadState> {
        self.entries.get(id.0 as usize).map(|e| &e.state)
    }

    /// Path a load was registered with.
    #[must_use]
    pub fn path(&self, id: LoadId) -> Option<&Path> {
        self.entries.get(id.0 as usize).map(|e| e.path.as_path())
    }

    /// Targets a load was registered with.
    #[must_use]
    pub fn targets(&self, id: LoadId) -> &[AttachTarget] {
        self.entries
            .get(id.0 as usize)
            .map_or(&[], |e| e.targets.as_slice())
    }

    /// Number of registered loads.
    #[must_use]
    pub fn registered(&self) -> usize {
        self.entries.len()
    }

    /// Number of loads in a terminal state.
    #[must_use]
    pub fn settled(&self) -> usize {
        self.settled
    }

    /// Number of loads that ended in `Failed`.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Whether completion has fired.
    #[must_use]
    pub fn all_loaded(&self) -> bool {
        self.fired
    }

    /// Whether registration is closed.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}
