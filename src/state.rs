use serde::Serialize;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::practice::catalog::Catalog;
use crate::practice::session::{Effect, SessionSnapshot};
use crate::practice::PickerOption;
use crate::store::SessionStore;

pub struct PracticeState {
    pub config: ServerConfig,
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<SessionStore>,
}

impl PracticeState {
    /// Scan the content root once and build an empty session store over it.
    pub fn new(config: ServerConfig) -> Self {
        let catalog = Arc::new(Catalog::scan(&config.content_root));
        Self::with_catalog(config, catalog)
    }

    pub fn with_catalog(config: ServerConfig, catalog: Arc<Catalog>) -> Self {
        let sessions = Arc::new(SessionStore::new(catalog.clone(), config.end_detection()));
        Self {
            config,
            catalog,
            sessions,
        }
    }
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub clips: usize,
    pub sessions: usize,
}

#[derive(Serialize)]
pub struct PickerDefaults {
    pub format: String,
    pub topics: Vec<String>,
    pub options: Vec<String>,
}

#[derive(Serialize)]
pub struct PracticeOptions {
    pub formats: Vec<PickerOption>,
    pub topics: Vec<PickerOption>,
    pub options: Vec<PickerOption>,
    pub defaults: PickerDefaults,
}

#[derive(Serialize)]
pub struct ContactForm {
    pub url: Option<String>,
}

#[derive(Serialize)]
pub struct SessionCreated {
    pub id: String,
    pub snapshot: SessionSnapshot,
}

#[derive(Serialize)]
pub struct EventResponse {
    pub effects: Vec<Effect>,
    pub snapshot: SessionSnapshot,
}
