use crate::config::Config;
use crate::registry::{CacheTarget, RegistryCatalog};
use std::sync::Arc;

/// Read-only snapshot handed to every admission request. Built once at startup.
#[derive(Debug, Clone)]
pub struct WebhookState {
    pub(crate) catalog: RegistryCatalog,
    pub(crate) target: CacheTarget,
}

impl WebhookState {
    pub fn new(catalog: RegistryCatalog, target: CacheTarget) -> Arc<Self> {
        Arc::new(WebhookState { catalog, target })
    }

    pub fn from_config(config: &Config) -> Arc<Self> {
        Self::new(config.registry_catalog(), config.cache_target())
    }
}
