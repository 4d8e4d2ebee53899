//! Serialize-on-write persistence.
//!
//! Snapshots are serialized on the caller's thread, at mutation time, and
//! handed to a single writer thread. Callers never wait for the write and
//! never see its outcome; failures go to the log and an optional callback.

use crate::storage::{self, KeyValueStorage, StorageError};
use log::{debug, error, warn};
use serde::Serialize;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

/// Invoked with the storage key and the error for every failed write.
pub type ErrorCallback = Arc<dyn Fn(&str, &StorageError) + Send + Sync>;

enum Job {
    Write { key: String, value: String },
    Flush(Sender<()>),
}

enum Mode {
    Background {
        tx: Sender<Job>,
        worker: JoinHandle<()>,
    },
    // Used when the writer thread cannot be started.
    Inline {
        storage: Arc<dyn KeyValueStorage>,
        on_error: Option<ErrorCallback>,
    },
}

pub struct Persister {
    mode: Option<Mode>,
    on_error: Option<ErrorCallback>,
}

impl Persister {
    pub fn spawn(storage: Arc<dyn KeyValueStorage>, on_error: Option<ErrorCallback>) -> Self {
        let (tx, rx) = mpsc::channel();
        let worker_storage = Arc::clone(&storage);
        let worker_on_error = on_error.clone();
        let spawned = std::thread::Builder::new()
            .name("getit-persist".to_string())
            .spawn(move || run_writer(rx, worker_storage, worker_on_error));
        let mode = match spawned {
            Ok(worker) => Mode::Background { tx, worker },
            Err(e) => {
                error!("event=persist_spawn module=persist status=error fallback=inline err={e}");
                Mode::Inline {
                    storage,
                    on_error: on_error.clone(),
                }
            }
        };
        Persister {
            mode: Some(mode),
            on_error,
        }
    }

    /// Serializes `state` now and queues it for writing under `key`.
    pub fn save<T: Serialize>(&self, key: &str, state: &T) {
        let value = match storage::to_json(state) {
            Ok(value) => value,
            Err(err) => {
                report(self.on_error.as_ref(), key, &err);
                return;
            }
        };
        match &self.mode {
            Some(Mode::Background { tx, .. }) => {
                let job = Job::Write {
                    key: key.to_string(),
                    value,
                };
                if tx.send(job).is_err() {
                    let err = StorageError::Unavailable("writer thread has stopped".to_string());
                    report(self.on_error.as_ref(), key, &err);
                }
            }
            Some(Mode::Inline { storage, on_error }) => {
                write(storage.as_ref(), on_error.as_ref(), key, &value);
            }
            None => {}
        }
    }

    /// Blocks until every write queued before this call has been attempted.
    pub fn flush(&self) {
        if let Some(Mode::Background { tx, .. }) = &self.mode {
            let (done_tx, done_rx) = mpsc::channel();
            if tx.send(Job::Flush(done_tx)).is_ok() {
                let _ = done_rx.recv();
            }
        }
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        if let Some(Mode::Background { tx, worker }) = self.mode.take() {
            drop(tx);
            if worker.join().is_err() {
                error!("event=persist_shutdown module=persist status=error reason=writer_panicked");
            }
        }
    }
}

fn run_writer(rx: Receiver<Job>, storage: Arc<dyn KeyValueStorage>, on_error: Option<ErrorCallback>) {
    while let Ok(first) = rx.recv() {
        let mut batch = vec![first];
        batch.extend(rx.try_iter());
        for (idx, job) in batch.iter().enumerate() {
            match job {
                Job::Write { key, value } => {
                    // A later write to the same key before the next flush supersedes this one.
                    let superseded = batch[idx + 1..]
                        .iter()
                        .take_while(|j| matches!(j, Job::Write { .. }))
                        .any(|j| matches!(j, Job::Write { key: k, .. } if k == key));
                    if superseded {
                        debug!("event=persist_write module=persist status=skipped key={key}");
                        continue;
                    }
                    write(storage.as_ref(), on_error.as_ref(), key, value);
                }
                Job::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
    }
}

fn write(storage: &dyn KeyValueStorage, on_error: Option<&ErrorCallback>, key: &str, value: &str) {
    match storage.set_item(key, value) {
        Ok(()) => debug!(
            "event=persist_write module=persist status=ok key={key} bytes={}",
            value.len()
        ),
        Err(err) => report(on_error, key, &err),
    }
}

fn report(on_error: Option<&ErrorCallback>, key: &str, err: &StorageError) {
    warn!("event=persist_write module=persist status=error key={key} err={err}");
    if let Some(callback) = on_error {
        callback(key, err);
    }
}
