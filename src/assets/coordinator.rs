use std::path::PathBuf;

use web_time::{Duration, Instant};

use super::barrier::{LoadId, LoadState, LoadingBarrier, Settle};
use super::indicator::LoadingIndicator;
use super::loader::{AssetLoader, LoadJob, LoadOutcome};
use super::request::{LoadRequest, LoadedAsset};
use super::AssetError;
use crate::options::LoadingOptions;
use crate::scene::Scene;

/// What one [`AssetCoordinator::poll`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Loads attached with real content.
    pub loaded: usize,
    /// Loads that failed (including timeouts) and got placeholders.
    pub failed: usize,
    /// The "all assets loaded" event fired during this poll.
    pub all_loaded: bool,
    /// The loading indicator was hidden during this poll.
    pub indicator_hidden: bool,
}

/// Registers loads, routes decoded results into the scene, and drives the
/// barrier and loading indicator.
///
/// All scene mutation happens in [`poll`](Self::poll) /
/// [`settle`](Self::settle), on the caller's thread.
pub struct AssetCoordinator {
    loader: Option<AssetLoader>,
    barrier: LoadingBarrier,
    indicator: LoadingIndicator,
    /// Submission failures waiting to be settled at the next poll.
    deferred: Vec<(LoadId, AssetError)>,
    asset_root: PathBuf,
    settle_delay: Duration,
    load_timeout: Duration,
}

impl AssetCoordinator {
    /// A coordinator with no loader thread. Results must be fed in through
    /// [`settle`](Self::settle).
    #[must_use]
    pub fn detached(options: &LoadingOptions) -> Self {
        Self {
            loader: None,
            barrier: LoadingBarrier::new(),
            indicator: LoadingIndicator::default(),
            deferred: Vec::new(),
            asset_root: options.asset_root.clone(),
            settle_delay: options.settle_delay(),
            load_timeout: options.load_timeout(),
        }
    }

    /// A coordinator backed by a background loader thread.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the loader thread fails to spawn.
    pub fn new(options: &LoadingOptions) -> Result<Self, std::io::Error> {
        let mut coordinator = Self::detached(options);
        coordinator.loader = Some(AssetLoader::new()?);
        Ok(coordinator)
    }

    /// Register one load and hand it to the loader.
    ///
    /// # Errors
    ///
    /// Fails if registration is closed or a target is already claimed.
    pub fn register(
        &mut self,
        request: &LoadRequest,
        now: Instant,
    ) -> Result<LoadId, AssetError> {
        let path = self.asset_root.join(&request.path);
        let id = self.barrier.register(&path, &request.targets, now)?;
        log::debug!("registered load {} -> {:?}", path.display(), request.targets);
        if let Some(loader) = &self.loader {
            let job = LoadJob {
                id,
                path,
                kind: request.kind,
            };
            if let Err(e) = loader.submit(job) {
                self.deferred.push((id, e));
            }
        }
        Ok(id)
    }

    /// Register every request; stops at the first rejection.
    pub fn register_all(
        &mut self,
        requests: &[LoadRequest],
        now: Instant,
    ) -> Result<Vec<LoadId>, AssetError> {
        requests.iter().map(|r| self.register(r, now)).collect()
    }

    /// Close registration. With nothing registered this fires completion
    /// immediately.
    pub fn seal(&mut self, now: Instant) -> bool {
        let fired = self.barrier.seal();
        if fired {
            self.on_all_loaded(now);
        }
        fired
    }

    /// Drain finished loads, time out stale ones, and advance the loading
    /// indicator. Call once per frame before rendering.
    pub fn poll(&mut self, scene: &mut Scene, now: Instant) -> PollReport {
        let mut report = PollReport::default();

        let mut outcomes: Vec<LoadOutcome> = self
            .deferred
            .drain(..)
            .map(|(id, e)| LoadOutcome { id, result: Err(e) })
            .collect();
        let mut disconnected = false;
        if let Some(loader) = &self.loader {
            loop {
                match loader.try_recv() {
                    Ok(Some(outcome)) => outcomes.push(outcome),
                    Ok(None) => break,
                    Err(_) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }
        if disconnected {
            log::warn!("asset loader thread exited; failing pending loads");
            self.loader = None;
            let pending = self.barrier.overdue(now, Duration::ZERO);
            outcomes.extend(pending.into_iter().map(|id| LoadOutcome {
                id,
                result: Err(AssetError::LoaderDisconnected),
            }));
        } else {
            outcomes.extend(self.timed_out(now));
        }

        for outcome in outcomes {
            let id = outcome.id;
            match self.settle(scene, id, outcome.result, now) {
                Settle::Accepted { all_loaded } => {
                    if self.barrier.state(id) == Some(&LoadState::Loaded) {
                        report.loaded += 1;
                    } else {
                        report.failed += 1;
                    }
                    report.all_loaded |= all_loaded;
                }
                Settle::Ignored => {}
            }
        }

        report.indicator_hidden = self.indicator.update(now);
        if report.indicator_hidden {
            log::info!("loading indicator hidden");
        }
        report
    }

    /// Apply one load result to the scene and settle it in the barrier.
    ///
    /// A failed result (or one whose attachment fails) attaches placeholder
    /// content to every target of the load and still counts toward
    /// completion. Results for loads that are already terminal are dropped.
    pub fn settle(
        &mut self,
        scene: &mut Scene,
        id: LoadId,
        result: Result<LoadedAsset, AssetError>,
        now: Instant,
    ) -> Settle {
        match self.barrier.state(id) {
            Some(state) if !state.is_terminal() => {}
            _ => {
                log::debug!("ignoring late result for load {id:?}");
                return Settle::Ignored;
            }
        }
        let targets = self.barrier.targets(id).to_vec();
        let path = self
            .barrier
            .path(id)
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let attached = result.map_err(|e| e.to_string()).and_then(|asset| {
            targets
                .iter()
                .try_for_each(|t| t.apply(scene, &asset))
                .map_err(|e| e.to_string())
        });
        if let Err(reason) = &attached {
            log::warn!("load {path} failed: {reason}; using placeholder");
            for target in &targets {
                if let Err(e) = target.apply(scene, &target.placeholder()) {
                    log::warn!("placeholder for {target:?} rejected: {e}");
                }
            }
        } else {
            log::debug!("loaded {path}");
        }

        let settle = self.barrier.settle(id, attached);
        if settle == (Settle::Accepted { all_loaded: true }) {
            self.on_all_loaded(now);
        }
        settle
    }

    fn timed_out(&self, now: Instant) -> Vec<LoadOutcome> {
        self.barrier
            .overdue(now, self.load_timeout)
            .into_iter()
            .map(|id| LoadOutcome {
                id,
                result: Err(AssetError::Timeout {
                    path: self.barrier.path(id).map(PathBuf::from).unwrap_or_default(),
                    after: self.load_timeout,
                }),
            })
            .collect()
    }

    fn on_all_loaded(&mut self, now: Instant) {
        log::info!(
            "all assets loaded ({} of {} failed)",
            self.barrier.failed(),
            self.barrier.registered()
        );
        self.indicator.begin_settle(now, self.settle_delay);
    }

    /// The barrier tracking every registered load.
    #[must_use]
    pub fn barrier(&self) -> &LoadingBarrier {
        &self.barrier
    }

    /// The loading indicator state.
    #[must_use]
    pub fn indicator(&self) -> LoadingIndicator {
        self.indicator
    }

    /// Whether the "all assets loaded" event has fired.
    #[must_use]
    pub fn all_loaded(&self) -> bool {
        self.barrier.all_loaded()
    }
}
