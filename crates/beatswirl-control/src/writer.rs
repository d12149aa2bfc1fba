//! Background preset writer
//!
//! Moves preset file I/O off the frame loop. Snapshots are written in the
//! order they were submitted; when several are queued only the newest is
//! written, so a completed write never holds older state than a later
//! submission.

use crate::error::{ControlError, Result};
use crate::persistence::PresetPersistence;
use beatswirl_core::PresetStore;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread::JoinHandle;
use tracing::{debug, error};

/// Writes preset stores on a dedicated thread
pub struct PresetWriter {
    requests: Option<Sender<PresetStore>>,
    results: Receiver<Result<()>>,
    worker: Option<JoinHandle<()>>,
}

impl PresetWriter {
    /// Start the writer thread
    pub fn spawn() -> Result<Self> {
        let (request_tx, request_rx) = unbounded::<PresetStore>();
        let (result_tx, result_rx) = unbounded();

        let worker = std::thread::Builder::new()
            .name("preset-writer".to_string())
            .spawn(move || {
                while let Ok(mut store) = request_rx.recv() {
                    // Coalesce: only the newest queued snapshot matters
                    while let Ok(newer) = request_rx.try_recv() {
                        store = newer;
                    }
                    let result = store.save().map_err(ControlError::from);
                    if let Err(e) = &result {
                        error!("Background preset save failed: {}", e);
                    }
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
                debug!("Preset writer stopped");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            results: result_rx,
            worker: Some(worker),
        })
    }

    /// Queue a snapshot for writing
    pub fn submit(&self, store: PresetStore) -> Result<()> {
        self.requests
            .as_ref()
            .ok_or(ControlError::WriterDisconnected)?
            .send(store)
            .map_err(|_| ControlError::WriterDisconnected)
    }

    /// Completed write results, without blocking
    pub fn drain(&self) -> Vec<Result<()>> {
        self.results.try_iter().collect()
    }

    /// Stop accepting work, wait for pending writes, and return their results
    pub fn shutdown(&mut self) -> Vec<Result<()>> {
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Preset writer thread panicked");
            }
        }
        self.drain()
    }
}

impl PresetPersistence for PresetWriter {
    fn persist(&mut self, store: &PresetStore) -> Result<()> {
        self.submit(store.clone())
    }

    fn poll(&mut self) -> Vec<Result<()>> {
        self.drain()
    }
}

impl Drop for PresetWriter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
