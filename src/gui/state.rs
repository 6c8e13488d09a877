use std::sync::Arc;

use crate::{Dataset, DetectionClient, Settings};

/// Resources shared by every screen for the lifetime of the window.
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
    pub client: DetectionClient,
    pub dataset: Arc<Dataset>,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        Ok(Self {
            settings,
            client: DetectionClient::new()?,
            dataset: Arc::new(Dataset::builtin()?),
        })
    }
}
