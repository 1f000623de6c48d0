use std::sync::Arc;
use std::time::Duration;

use crate::io::rehydrate::load_initial_state;
use crate::io::storage::StorageBackend;
use crate::io::writer::{DebouncedWriter, DEFAULT_DEBOUNCE};
use crate::store::Store;

/// Configuration for assembling an application core: where state lives and
/// how eagerly it is written back.
pub struct AppConfig {
    pub backend: Arc<dyn StorageBackend>,
    pub debounce_window: Duration,
}

impl AppConfig {
    pub fn new(backend: Arc<dyn StorageBackend>) -> AppConfig {
        AppConfig {
            backend,
            debounce_window: DEFAULT_DEBOUNCE,
        }
    }

    pub fn debounce_window(mut self, window: Duration) -> AppConfig {
        self.debounce_window = window;
        self
    }
}

/// The assembled core: store plus debounced persistence, wired explicitly.
///
/// Construction is the only side effect — there is no global instance and
/// nothing happens at module load. `App::init` loads the persisted state
/// (migrating and rehydrating it, or starting from defaults), builds the
/// store, and subscribes the persistence writer so every accepted dispatch
/// schedules a coalesced write of the latest snapshot.
pub struct App {
    store: Store,
    writer: DebouncedWriter,
}

impl App {
    pub fn init(config: AppConfig) -> App {
        let initial = load_initial_state(config.backend.as_ref());
        let store = Store::new(initial);

        let writer = DebouncedWriter::spawn(config.backend, config.debounce_window);
        let handle = writer.handle();
        // listener lives for the life of the store
        let _subscription = store.subscribe(move |state, _action| handle.submit(state.clone()));

        App { store, writer }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Force the pending write out now (e.g. before process exit).
    pub fn flush(&self) {
        self.writer.flush();
    }

    /// Flush and stop the persistence writer. Dropping the app does the
    /// same; this form just makes teardown explicit.
    pub fn shutdown(self) {
        self.writer.flush();
        // Drop joins the writer thread
    }
}
