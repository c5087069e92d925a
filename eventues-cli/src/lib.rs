pub mod render;

use anyhow::Context;
use chrono::{DateTime, Utc};
use eventues_catalog::EventCatalog;
use eventues_core::CatalogRepository;
use eventues_editor::{validate_catalog, EditingSession};
use std::path::Path;

/// Price table of an event as seen at `at`
pub async fn show_prices(
    repository: &dyn CatalogRepository,
    event_id: &str,
    at: DateTime<Utc>,
) -> anyhow::Result<String> {
    let session = EditingSession::load(event_id, repository).await?;
    let catalog = session.catalog();
    Ok(render::price_table(catalog, &catalog.price_table(at)))
}

/// Fetch and check an event's catalog. `Ok(None)` when it has no issues.
pub async fn check_catalog(
    repository: &dyn CatalogRepository,
    event_id: &str,
) -> anyhow::Result<Option<String>> {
    let session = EditingSession::load(event_id, repository).await?;
    match validate_catalog(session.catalog()) {
        Ok(()) => Ok(None),
        Err(errors) => Ok(Some(render::validation_report(&errors))),
    }
}

pub async fn export_catalog(
    repository: &dyn CatalogRepository,
    event_id: &str,
    output: &Path,
) -> anyhow::Result<()> {
    let catalog = repository.fetch_catalog(event_id).await?;
    let json = serde_json::to_string_pretty(&catalog)?;
    tokio::fs::write(output, json)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    tracing::info!("Exported catalog for event {} to {}", event_id, output.display());
    Ok(())
}

/// Read a catalog from `input`, validate it and submit it as a whole
pub async fn submit_catalog(
    repository: &dyn CatalogRepository,
    event_id: &str,
    input: &Path,
) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let catalog: EventCatalog = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid catalog", input.display()))?;

    let mut session = EditingSession::from_catalog(event_id, catalog);
    session.save(repository).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use eventues_catalog::{Category, PriceConfiguration, Scope};
    use eventues_core::{CoreError, CoreResult};
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryRepository {
        stored: Mutex<Option<EventCatalog>>,
    }

    #[async_trait]
    impl CatalogRepository for MemoryRepository {
        async fn fetch_catalog(&self, event_id: &str) -> CoreResult<EventCatalog> {
            self.stored
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| CoreError::BackendError { status: 404, message: format!("no event {}", event_id) })
        }

        async fn submit_catalog(&self, _event_id: &str, catalog: &EventCatalog) -> CoreResult<()> {
            *self.stored.lock().unwrap() = Some(catalog.clone());
            Ok(())
        }
    }

    fn priced_catalog() -> EventCatalog {
        let mut pista = Category::new("Pista", None);
        pista.add_subcategory("Inteira", None);
        EventCatalog {
            price_configurations: vec![PriceConfiguration::standard(Decimal::new(50, 0), Scope::Global)],
            categories: vec![pista],
        }
    }

    fn scratch_file(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("eventues-{}-{}.json", name, uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_show_prices_renders_table() {
        let repo = MemoryRepository { stored: Mutex::new(Some(priced_catalog())) };
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        let table = show_prices(&repo, "evt", at).await.unwrap();
        assert!(table.contains("Inteira"));
        assert!(table.contains("R$ 50,00"));
    }

    #[tokio::test]
    async fn test_check_catalog_reports_issues() {
        let mut catalog = priced_catalog();
        catalog.categories.push(Category::new("Empty", None));
        let repo = MemoryRepository { stored: Mutex::new(Some(catalog)) };

        let report = check_catalog(&repo, "evt").await.unwrap().expect("issues expected");
        assert_eq!(report.lines().count(), 1);
        assert!(report.contains("Empty"));

        let clean = MemoryRepository { stored: Mutex::new(Some(priced_catalog())) };
        assert!(check_catalog(&clean, "evt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_export_then_submit() {
        let original = priced_catalog();
        let source = MemoryRepository { stored: Mutex::new(Some(original.clone())) };
        let path = scratch_file("export");

        export_catalog(&source, "evt", &path).await.unwrap();

        let target = MemoryRepository::default();
        submit_catalog(&target, "evt", &path).await.unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(target.stored.lock().unwrap().clone(), Some(original));
    }

    #[tokio::test]
    async fn test_submit_refuses_invalid_file() {
        let mut catalog = priced_catalog();
        catalog.price_configurations[0] = PriceConfiguration::standard(Decimal::ZERO, Scope::Global);
        let path = scratch_file("invalid");
        std::fs::write(&path, serde_json::to_string(&catalog).unwrap()).unwrap();

        let target = MemoryRepository::default();
        let result = submit_catalog(&target, "evt", &path).await;
        let _ = std::fs::remove_file(&path);

        assert!(result.is_err());
        assert!(target.stored.lock().unwrap().is_none());
    }
}
