use async_trait::async_trait;
use eventues_catalog::EventCatalog;
use eventues_core::{CatalogRepository, CoreError, CoreResult};
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, StatusCode, Url,
};
use std::time::Duration;
use tracing::{error, info};

use crate::app_config::BackendConfig;

/// HTTP-based catalog repository talking to the organizer backend
pub struct HttpCatalogRepository {
    base_url: Url,
    client: Client,
}

impl HttpCatalogRepository {
    pub fn new(config: &BackendConfig) -> CoreResult<Self> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|e| {
            CoreError::ValidationError(format!("invalid backend base_url {:?}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CoreError::ValidationError(format!(
                "backend base_url {:?} cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CoreError::TransportError(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, event_id: &str, action: &str) -> CoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CoreError::ValidationError("backend base_url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["organizer_detail", event_id, action]);
        Ok(url)
    }

    pub(crate) fn catalog_url(&self, event_id: &str) -> CoreResult<Url> {
        self.endpoint(event_id, "get_categories")
    }

    pub(crate) fn submit_url(&self, event_id: &str) -> CoreResult<Url> {
        self.endpoint(event_id, "categories")
    }

    pub(crate) async fn backend_error(response: reqwest::Response) -> CoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let message = backend_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "unexpected response".to_string());

        error!(status = %status, message = %message, "Catalog request rejected by backend");
        CoreError::BackendError { status: status.as_u16(), message }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"detail": ..}`, `{"error": ..}`, `{"message": ..}` and the
/// `{"Code": .., "Message": ..}` bodies of the backend's built-in errors,
/// falling back to short plain-text bodies.
fn backend_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        return ["detail", "error", "message", "Message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string);
    }

    (body.len() <= 200).then(|| body.to_string())
}

#[async_trait]
impl CatalogRepository for HttpCatalogRepository {
    async fn fetch_catalog(&self, event_id: &str) -> CoreResult<EventCatalog> {
        let url = self.catalog_url(event_id)?;

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %url, "Failed to fetch catalog");
                CoreError::TransportError(e.to_string())
            })?;

        if response.status() != StatusCode::OK {
            return Err(Self::backend_error(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| CoreError::TransportError(e.to_string()))?;
        let catalog: EventCatalog = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, event_id = %event_id, "Catalog response could not be decoded");
            CoreError::DecodeError(e.to_string())
        })?;

        info!(
            "Fetched catalog for event {} ({} categories, {} price configurations)",
            event_id,
            catalog.categories.len(),
            catalog.price_configurations.len()
        );
        Ok(catalog)
    }

    async fn submit_catalog(&self, event_id: &str, catalog: &EventCatalog) -> CoreResult<()> {
        let url = self.submit_url(event_id)?;

        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(catalog)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %url, "Failed to submit catalog");
                CoreError::TransportError(e.to_string())
            })?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                info!("Submitted catalog for event {}", event_id);
                Ok(())
            }
            _ => Err(Self::backend_error(response).await),
        }
    }
}
