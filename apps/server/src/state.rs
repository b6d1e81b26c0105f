use std::sync::Arc;

use checkup::Engine;

use crate::config::Auth;

/// Shared state handed to every route
pub struct AppState {
    pub engine: Arc<Engine>,
    pub cron_secret: Option<String>,
    pub worker_secret: Option<String>,
}

impl AppState {
    pub fn new(engine: Arc<Engine>, auth: &Auth) -> Self {
        Self {
            engine,
            cron_secret: auth.cron_secret.clone(),
            worker_secret: auth.worker_secret.clone(),
        }
    }
}
