use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::error;

use crate::io::record::serialize;
use crate::io::storage::StorageBackend;
use crate::model::AppState;

/// Default quiet window before a pending snapshot is written out.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

enum Msg {
    Snapshot(AppState),
    Flush(Sender<()>),
    Shutdown,
}

/// The single process-wide persistence writer.
///
/// Snapshots are coalesced with a trailing debounce: each new snapshot
/// replaces the pending one and restarts the timer, so a burst of edits
/// produces one write. Only the latest snapshot is ever serialized. Writes
/// are fire-and-forget best-effort — failures are logged, never surfaced to
/// the dispatching side. Dropping the writer flushes the pending snapshot
/// and joins the thread.
pub struct DebouncedWriter {
    tx: Sender<Msg>,
    handle: Option<JoinHandle<()>>,
}

/// Cheap cloneable handle for feeding snapshots in from a store subscriber.
#[derive(Clone)]
pub struct WriterHandle {
    tx: Sender<Msg>,
}

impl WriterHandle {
    /// Replace the pending snapshot and restart the debounce window.
    pub fn submit(&self, snapshot: AppState) {
        // a closed channel means the writer is already shut down
        let _ = self.tx.send(Msg::Snapshot(snapshot));
    }
}

impl DebouncedWriter {
    pub fn spawn(backend: Arc<dyn StorageBackend>, window: Duration) -> DebouncedWriter {
        let (tx, rx) = mpsc::channel::<Msg>();
        let handle = thread::Builder::new()
            .name("docket-writer".to_string())
            .spawn(move || {
                let mut pending: Option<AppState> = None;
                let mut deadline: Option<Instant> = None;
                loop {
                    let msg = match deadline {
                        Some(due) => {
                            let now = Instant::now();
                            if now >= due {
                                write_out(backend.as_ref(), pending.take());
                                deadline = None;
                                continue;
                            }
                            match rx.recv_timeout(due - now) {
                                Ok(msg) => msg,
                                Err(RecvTimeoutError::Timeout) => {
                                    write_out(backend.as_ref(), pending.take());
                                    deadline = None;
                                    continue;
                                }
                                Err(RecvTimeoutError::Disconnected) => break,
                            }
                        }
                        None => match rx.recv() {
                            Ok(msg) => msg,
                            Err(_) => break,
                        },
                    };
                    match msg {
                        Msg::Snapshot(snapshot) => {
                            pending = Some(snapshot);
                            deadline = Some(Instant::now() + window);
                        }
                        Msg::Flush(ack) => {
                            write_out(backend.as_ref(), pending.take());
                            deadline = None;
                            let _ = ack.send(());
                        }
                        Msg::Shutdown => break,
                    }
                }
                // whatever was still pending goes out on the way down
                write_out(backend.as_ref(), pending.take());
            });
        match handle {
            Ok(handle) => DebouncedWriter {
                tx,
                handle: Some(handle),
            },
            Err(e) => {
                error!(error = %e, "could not spawn persistence writer; writes disabled");
                DebouncedWriter { tx, handle: None }
            }
        }
    }

    pub fn handle(&self) -> WriterHandle {
        WriterHandle {
            tx: self.tx.clone(),
        }
    }

    /// Write the pending snapshot now, if any, and wait for it.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.tx.send(Msg::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv_timeout(Duration::from_secs(5));
        }
    }
}

impl Drop for DebouncedWriter {
    fn drop(&mut self) {
        let _ = self.tx.send(Msg::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn write_out(backend: &dyn StorageBackend, pending: Option<AppState>) {
    let Some(snapshot) = pending else { return };
    let record = serialize(&snapshot);
    let payload = match serde_json::to_string(&record) {
        Ok(payload) => payload,
        Err(e) => {
            error!(error = %e, "could not serialize state for persistence");
            return;
        }
    };
    if let Err(e) = backend.save(&payload) {
        error!(error = %e, "persistence write failed");
    }
}
