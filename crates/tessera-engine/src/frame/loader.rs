use std::path::PathBuf;
use std::thread;

use crossbeam_channel::{Receiver, TryRecvError};

use crate::render::{AtlasImage, AtlasLoadError};

pub type AtlasResult = Result<AtlasImage, AtlasLoadError>;

/// Result of checking on the background load.
#[derive(Debug)]
pub enum LoadPoll {
    Pending,
    Ready(AtlasResult),
}

/// One-shot background decode of the atlas image.
///
/// The worker sends exactly one result; the frame driver polls without
/// blocking.
pub struct AtlasLoader {
    rx: Receiver<AtlasResult>,
}

impl AtlasLoader {
    /// Reads and decodes `path` on a worker thread.
    pub fn spawn(path: PathBuf) -> Self {
        Self::spawn_with(move || AtlasImage::load(&path))
    }

    /// Runs an arbitrary producer on a worker thread.
    pub fn spawn_with<F>(load: F) -> Self
    where
        F: FnOnce() -> AtlasResult + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(1);

        let spawned = thread::Builder::new()
            .name("tessera-atlas-loader".into())
            .spawn(move || {
                let _ = tx.send(load());
            });

        if let Err(e) = spawned {
            // Without a worker the receiver reports a disconnect on first poll.
            log::warn!("failed to start atlas loader thread: {e}");
        }

        Self { rx }
    }

    /// A loader that has already finished with `result`.
    pub fn ready(result: AtlasResult) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let _ = tx.send(result);
        Self { rx }
    }

    pub fn poll(&self) -> LoadPoll {
        match self.rx.try_recv() {
            Ok(result) => LoadPoll::Ready(result),
            Err(TryRecvError::Empty) => LoadPoll::Pending,
            Err(TryRecvError::Disconnected) => LoadPoll::Ready(Err(AtlasLoadError::Abandoned)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait(loader: &AtlasLoader) -> AtlasResult {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let LoadPoll::Ready(r) = loader.poll() {
                return r;
            }
            assert!(Instant::now() < deadline, "loader never finished");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn ready_loader_reports_immediately() {
        let loader = AtlasLoader::ready(Ok(AtlasImage::solid([1, 2, 3, 4])));
        match loader.poll() {
            LoadPoll::Ready(Ok(img)) => assert_eq!(img.pixels, vec![1, 2, 3, 4]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn worker_result_arrives() {
        let loader = AtlasLoader::spawn_with(|| Ok(AtlasImage::solid([9, 9, 9, 255])));
        assert_eq!(wait(&loader).unwrap().width, 1);
    }

    #[test]
    fn pending_until_worker_sends() {
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
        let loader = AtlasLoader::spawn_with(move || {
            let _ = gate_rx.recv();
            Ok(AtlasImage::solid([0, 0, 0, 255]))
        });

        assert!(matches!(loader.poll(), LoadPoll::Pending));
        gate_tx.send(()).unwrap();
        assert!(wait(&loader).is_ok());
    }

    #[test]
    fn missing_file_is_reported() {
        let loader = AtlasLoader::spawn(PathBuf::from("no/such/atlas.png"));
        assert!(matches!(wait(&loader), Err(AtlasLoadError::Io { .. })));
    }

    #[test]
    fn panicking_worker_counts_as_abandoned() {
        let loader = AtlasLoader::spawn_with(|| panic!("decoder blew up"));
        assert_eq!(wait(&loader).unwrap_err(), AtlasLoadError::Abandoned);
    }
}
