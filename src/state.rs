use std::sync::Arc;

use axum::extract::FromRef;

use crate::sanitizer::Sanitizer;
use crate::store::DynPostStore;

#[derive(Clone)]
pub struct AppState {
    pub store: DynPostStore,
    pub sanitizer: Arc<Sanitizer>,
}

impl AppState {
    pub fn new(store: DynPostStore, sanitizer: Sanitizer) -> Self {
        Self {
            store,
            sanitizer: Arc::new(sanitizer),
        }
    }
}

impl FromRef<AppState> for DynPostStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<Sanitizer> {
    fn from_ref(state: &AppState) -> Self {
        state.sanitizer.clone()
    }
}
