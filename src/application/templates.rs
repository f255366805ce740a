//! # Template Registry
//!
//! Process-wide list of app templates known to the backend. Refreshed periodically from
//! `webappify/list`; between refreshes (and after a failed one) the last good list stays in use.

use crate::infrastructure::rpc::webappify::{WebappifyApi, parse_templates};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: Arc<RwLock<Vec<String>>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_templates(templates: Vec<String>) -> Self {
        Self {
            templates: Arc::new(RwLock::new(templates)),
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn first(&self) -> Option<String> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .first()
            .cloned()
    }

    pub fn replace(&self, templates: Vec<String>) {
        *self
            .templates
            .write()
            .unwrap_or_else(PoisonError::into_inner) = templates;
    }

    /// First template, in list order, starting with `candidate` (case-insensitive).
    pub fn find_prefix(&self, candidate: &str) -> Option<String> {
        let needle = candidate.to_lowercase();
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|template| template.to_lowercase().starts_with(&needle))
            .cloned()
    }
}

/// Fetches the template list once. Returns whether the registry was updated.
pub async fn refresh_once(api: &WebappifyApi, registry: &TemplateRegistry) -> bool {
    let mut updated = false;
    api.list_with(|success, result| {
        if !success {
            tracing::warn!("Template refresh failed: {}", result);
            return;
        }
        match parse_templates(result) {
            Ok(templates) => {
                tracing::info!("Loaded {} templates", templates.len());
                registry.replace(templates);
                updated = true;
            }
            Err(e) => tracing::warn!("Template refresh failed: {}", e),
        }
    })
    .await;
    updated
}

/// Refreshes after `initial_delay`, then every `interval`.
pub fn spawn_refresh(
    api: WebappifyApi,
    registry: TemplateRegistry,
    initial_delay: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(initial_delay).await;
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            refresh_once(&api, &registry).await;
        }
    })
}
