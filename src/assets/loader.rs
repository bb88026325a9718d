//! Background thread that reads and decodes asset files.
//!
//! The main thread submits jobs without blocking and drains finished
//! outcomes once per frame. Decoding never touches the scene; attachment
//! happens on the main thread when an outcome is drained.

use std::path::PathBuf;
use std::sync::mpsc;

use super::barrier::LoadId;
use super::decode::decode;
use super::request::{AssetKind, LoadedAsset};
use super::AssetError;

/// One file to decode.
#[derive(Debug, Clone)]
pub struct LoadJob {
    /// Barrier slot the result settles.
    pub id: LoadId,
    /// Resolved file path.
    pub path: PathBuf,
    /// Decoder selection.
    pub kind: AssetKind,
}

/// Result of one job.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Barrier slot the result settles.
    pub id: LoadId,
    /// Decoded asset or the reason it failed.
    pub result: Result<LoadedAsset, AssetError>,
}

enum LoaderRequest {
    Load(LoadJob),
    Shutdown,
}

/// Handle to the `asset-loader` thread.
pub struct AssetLoader {
    request_tx: mpsc::Sender<LoaderRequest>,
    result_rx: mpsc::Receiver<LoadOutcome>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl AssetLoader {
    /// Spawn the loader thread.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the thread fails to spawn.
    pub fn new() -> Result<Self, std::io::Error> {
        let (request_tx, request_rx) = mpsc::channel::<LoaderRequest>();
        let (result_tx, result_rx) = mpsc::channel::<LoadOutcome>();

        let thread = std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || Self::thread_loop(&request_rx, &result_tx))?;

        Ok(Self {
            request_tx,
            result_rx,
            thread: Some(thread),
        })
    }

    /// Queue a job (non-blocking send).
    pub fn submit(&self, job: LoadJob) -> Result<(), AssetError> {
        self.request_tx
            .send(LoaderRequest::Load(job))
            .map_err(|_| AssetError::LoaderDisconnected)
    }

    /// Non-blocking check for a finished job.
    ///
    /// Returns [`AssetError::LoaderDisconnected`] once the thread is gone
    /// and every outcome it sent has been received.
    pub fn try_recv(&self) -> Result<Option<LoadOutcome>, AssetError> {
        match self.result_rx.try_recv() {
            Ok(outcome) => Ok(Some(outcome)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(AssetError::LoaderDisconnected)
            }
        }
    }

    /// Shut down the loader thread and wait for it to finish.
    pub fn shutdown(&mut self) {
        let _ = self.request_tx.send(LoaderRequest::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    fn thread_loop(
        request_rx: &mpsc::Receiver<LoaderRequest>,
        result_tx: &mpsc::Sender<LoadOutcome>,
    ) {
        while let Ok(request) = request_rx.recv() {
            let job = match request {
                LoaderRequest::Shutdown => break,
                LoaderRequest::Load(job) => job,
            };
            log::debug!("decoding {}", job.path.display());
            let result = decode(&job.path, job.kind);
            if result_tx.send(LoadOutcome { id: job.id, result }).is_err() {
                break;
            }
        }
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn wait_for(loader: &AssetLoader) -> LoadOutcome {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(outcome) = loader.try_recv().unwrap() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "loader timed out");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn missing_file_reports_failure() {
        let loader = AssetLoader::new().unwrap();
        loader
            .submit(LoadJob {
                id: LoadId(7),
                path: PathBuf::from("/nonexistent/orrery/sun.jpg"),
                kind: AssetKind::Texture { srgb: true },
            })
            .unwrap();
        let outcome = wait_for(&loader);
        assert_eq!(outcome.id, LoadId(7));
        assert!(outcome.result.is_err());
    }

    #[test]
    fn decodes_real_file() {
        let dir = std::env::temp_dir()
            .join(format!("orrery-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dot.png");
        image::RgbaImage::from_pixel(1, 1, image::Rgba([9, 9, 9, 255]))
            .save(&path)
            .unwrap();

        let loader = AssetLoader::new().unwrap();
        loader
            .submit(LoadJob {
                id: LoadId(0),
                path,
                kind: AssetKind::Texture { srgb: true },
            })
            .unwrap();
        let outcome = wait_for(&loader);
        assert!(matches!(outcome.result, Ok(LoadedAsset::Texture(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_queue_is_not_an_error() {
        let loader = AssetLoader::new().unwrap();
        assert!(loader.try_recv().unwrap().is_none());
    }
}
