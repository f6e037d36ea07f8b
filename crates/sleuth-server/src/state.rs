use std::sync::Arc;

use sleuth::backend::ChatBackend;

/// Shared application state, constructed once in `main` and handed to
/// every route. No implicit globals.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ChatBackend>,
}

impl AppState {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }
}
