use async_trait::async_trait;
use eventues_catalog::EventCatalog;

use crate::CoreResult;

/// Backend access for an event's ticket catalog.
///
/// There is no partial update: a save always replaces the whole catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Fetch categories and price configurations of an event
    async fn fetch_catalog(&self, event_id: &str) -> CoreResult<EventCatalog>;

    /// Replace the event's catalog with `catalog`
    async fn submit_catalog(&self, event_id: &str, catalog: &EventCatalog) -> CoreResult<()>;
}
