//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::Environment;
use crate::store::Store;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and hands out the entity
/// store, which is created at startup and closed at shutdown.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn Store>,
    environment: Environment,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, environment: Environment) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, environment }),
        }
    }

    /// Get a reference to the entity store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// The deployment environment.
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.inner.environment
    }
}
