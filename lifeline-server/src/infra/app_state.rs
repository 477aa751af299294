use std::{fmt, sync::Arc};

use lifeline_core::DispatchService;

use crate::infra::config::Config;

/// Shared per-request state. The dispatch service (and through it the store
/// handle) is constructed once at startup and injected here; there is no
/// process-wide singleton to reach for.
#[derive(Clone)]
pub struct AppState {
    pub dispatch: Arc<DispatchService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(dispatch: Arc<DispatchService>, config: Arc<Config>) -> Self {
        Self { dispatch, config }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
