use eventues_catalog::{Category, EventCatalog, PriceConfiguration, PricingKind, Scope, Subcategory};
use eventues_core::{CatalogRepository, CoreError};
use uuid::Uuid;

use crate::validation::{validate_catalog, ValidationErrors};

/// An organizer's in-progress edit of one event's ticket catalog.
///
/// All changes go through the methods below and stay in memory until
/// [`EditingSession::save`] submits the whole catalog at once.
pub struct EditingSession {
    event_id: String,
    catalog: EventCatalog,
    dirty: bool,
}

impl EditingSession {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self::from_catalog(event_id, EventCatalog::new())
    }

    pub fn from_catalog(event_id: impl Into<String>, catalog: EventCatalog) -> Self {
        Self {
            event_id: event_id.into(),
            catalog,
            dirty: false,
        }
    }

    /// Start a session from the backend's current catalog
    pub async fn load(
        event_id: impl Into<String>,
        repository: &dyn CatalogRepository,
    ) -> Result<Self, SessionError> {
        let event_id = event_id.into();
        let catalog = repository.fetch_catalog(&event_id).await?;
        tracing::info!(
            "Loaded catalog for event {}: {} categories, {} price configurations",
            event_id,
            catalog.categories.len(),
            catalog.price_configurations.len()
        );
        Ok(Self::from_catalog(event_id, catalog))
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    pub fn add_category(&mut self, name: impl Into<String>, description: Option<String>) -> Uuid {
        let category = Category::new(name, description);
        let id = category.id;
        self.catalog.categories.push(category);
        self.dirty = true;
        id
    }

    pub fn update_category(
        &mut self,
        category_id: &Uuid,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<(), SessionError> {
        let category = self.category_mut(category_id)?;
        category.name = name.into();
        category.description = description;
        self.dirty = true;
        Ok(())
    }

    /// Delete a category with its subcategories.
    ///
    /// The category id and every removed subcategory id are pruned from the
    /// price configurations, which are kept even if their targets run empty.
    pub fn delete_category(&mut self, category_id: &Uuid) -> Result<Category, SessionError> {
        let index = self
            .catalog
            .categories
            .iter()
            .position(|c| c.id == *category_id)
            .ok_or(SessionError::CategoryNotFound(*category_id))?;

        let removed = self.catalog.categories.remove(index);
        for config in &mut self.catalog.price_configurations {
            config.scope.prune(&removed.id);
            for subcategory_id in removed.subcategory_ids() {
                config.scope.prune(&subcategory_id);
            }
        }

        tracing::debug!(
            "Deleted category {} and {} subcategories",
            removed.id,
            removed.subcategories.len()
        );
        self.dirty = true;
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Subcategories
    // ------------------------------------------------------------------

    pub fn add_subcategory(
        &mut self,
        category_id: &Uuid,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Uuid, SessionError> {
        let id = self.category_mut(category_id)?.add_subcategory(name, description);
        self.dirty = true;
        Ok(id)
    }

    pub fn update_subcategory(
        &mut self,
        subcategory_id: &Uuid,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<(), SessionError> {
        let subcategory = self
            .catalog
            .categories
            .iter_mut()
            .flat_map(|c| c.subcategories.iter_mut())
            .find(|s| s.id == *subcategory_id)
            .ok_or(SessionError::SubcategoryNotFound(*subcategory_id))?;

        subcategory.name = name.into();
        subcategory.description = description;
        self.dirty = true;
        Ok(())
    }

    pub fn delete_subcategory(&mut self, subcategory_id: &Uuid) -> Result<Subcategory, SessionError> {
        let removed = self
            .catalog
            .categories
            .iter_mut()
            .find_map(|category| {
                let index = category.subcategories.iter().position(|s| s.id == *subcategory_id)?;
                Some(category.subcategories.remove(index))
            })
            .ok_or(SessionError::SubcategoryNotFound(*subcategory_id))?;

        for config in &mut self.catalog.price_configurations {
            config.scope.prune(&removed.id);
        }
        self.dirty = true;
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Price configurations
    // ------------------------------------------------------------------

    pub fn add_price_configuration(
        &mut self,
        pricing: PricingKind,
        scope: Scope,
    ) -> Result<Uuid, SessionError> {
        self.check_targets(&scope)?;
        let config = PriceConfiguration::new(pricing, scope);
        let id = config.id;
        self.catalog.price_configurations.push(config);
        self.dirty = true;
        Ok(id)
    }

    /// Replace pricing and scope, keeping the id and list position
    pub fn update_price_configuration(
        &mut self,
        configuration_id: &Uuid,
        pricing: PricingKind,
        scope: Scope,
    ) -> Result<(), SessionError> {
        self.check_targets(&scope)?;
        let config = self.price_configuration_mut(configuration_id)?;
        config.pricing = pricing;
        config.scope = scope;
        self.dirty = true;
        Ok(())
    }

    pub fn delete_price_configuration(
        &mut self,
        configuration_id: &Uuid,
    ) -> Result<PriceConfiguration, SessionError> {
        let index = self.price_configuration_index(configuration_id)?;
        self.dirty = true;
        Ok(self.catalog.price_configurations.remove(index))
    }

    /// Move a configuration to `index` (clamped to the end of the list).
    ///
    /// List order breaks ties between configurations of the same kind and
    /// scope level, so this is how an organizer picks which one wins.
    pub fn move_price_configuration(
        &mut self,
        configuration_id: &Uuid,
        index: usize,
    ) -> Result<(), SessionError> {
        let from = self.price_configuration_index(configuration_id)?;
        let config = self.catalog.price_configurations.remove(from);
        let to = index.min(self.catalog.price_configurations.len());
        self.catalog.price_configurations.insert(to, config);
        self.dirty = from != to || self.dirty;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Validate the whole catalog and, only if it is clean, submit it.
    pub async fn save(&mut self, repository: &dyn CatalogRepository) -> Result<(), SessionError> {
        if let Err(errors) = validate_catalog(&self.catalog) {
            tracing::warn!(
                "Catalog for event {} not submitted: {} validation issue(s)",
                self.event_id,
                errors.issues().len()
            );
            return Err(errors.into());
        }

        repository.submit_catalog(&self.event_id, &self.catalog).await?;
        tracing::info!("Catalog for event {} saved", self.event_id);
        self.dirty = false;
        Ok(())
    }

    fn check_targets(&self, scope: &Scope) -> Result<(), SessionError> {
        let unknown = match scope {
            Scope::Global => None,
            Scope::Category(ids) => ids.iter().find(|id| self.catalog.find_category(id).is_none()),
            Scope::Subcategory(ids) => ids.iter().find(|id| self.catalog.find_subcategory(id).is_none()),
        };
        match unknown {
            Some(id) => Err(SessionError::UnknownTarget(*id)),
            None => Ok(()),
        }
    }

    fn category_mut(&mut self, category_id: &Uuid) -> Result<&mut Category, SessionError> {
        self.catalog
            .categories
            .iter_mut()
            .find(|c| c.id == *category_id)
            .ok_or(SessionError::CategoryNotFound(*category_id))
    }

    fn price_configuration_index(&self, configuration_id: &Uuid) -> Result<usize, SessionError> {
        self.catalog
            .price_configurations
            .iter()
            .position(|c| c.id == *configuration_id)
            .ok_or(SessionError::PriceConfigurationNotFound(*configuration_id))
    }

    fn price_configuration_mut(
        &mut self,
        configuration_id: &Uuid,
    ) -> Result<&mut PriceConfiguration, SessionError> {
        let index = self.price_configuration_index(configuration_id)?;
        Ok(&mut self.catalog.price_configurations[index])
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    #[error("Subcategory not found: {0}")]
    SubcategoryNotFound(Uuid),

    #[error("Price configuration not found: {0}")]
    PriceConfigurationNotFound(Uuid),

    #[error("Price configuration targets an unknown category or subcategory: {0}")]
    UnknownTarget(Uuid),

    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Backend(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use eventues_catalog::Batch;
    use eventues_core::CoreResult;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryRepository {
        stored: Mutex<Option<EventCatalog>>,
    }

    #[async_trait]
    impl CatalogRepository for MemoryRepository {
        async fn fetch_catalog(&self, _event_id: &str) -> CoreResult<EventCatalog> {
            Ok(self.stored.lock().unwrap().clone().unwrap_or_default())
        }

        async fn submit_catalog(&self, _event_id: &str, catalog: &EventCatalog) -> CoreResult<()> {
            *self.stored.lock().unwrap() = Some(catalog.clone());
            Ok(())
        }
    }

    fn price(units: i64) -> PricingKind {
        PricingKind::Standard { price: Decimal::new(units, 0) }
    }

    #[test]
    fn test_delete_category_cascades_into_configurations() {
        let mut session = EditingSession::new("evt-1");
        let pista = session.add_category("Pista", None);
        let inteira = session.add_subcategory(&pista, "Inteira", None).unwrap();
        let meia = session.add_subcategory(&pista, "Meia", None).unwrap();
        let camarote = session.add_category("Camarote", None);
        let vip = session.add_subcategory(&camarote, "VIP", None).unwrap();

        let by_category = session
            .add_price_configuration(price(40), Scope::categories([pista, camarote]))
            .unwrap();
        let by_subcategory = session
            .add_price_configuration(price(20), Scope::subcategories([inteira, meia, vip]))
            .unwrap();
        let only_pista = session
            .add_price_configuration(price(10), Scope::categories([pista]))
            .unwrap();

        let removed = session.delete_category(&pista).unwrap();
        assert_eq!(removed.subcategories.len(), 2);

        let catalog = session.catalog();
        assert_eq!(catalog.categories.len(), 1);
        assert!(catalog.find_subcategory(&inteira).is_none());
        assert_eq!(catalog.price_configurations.len(), 3);
        assert_eq!(catalog.find_price_configuration(&by_category).unwrap().scope.targets(), &[camarote]);
        assert_eq!(catalog.find_price_configuration(&by_subcategory).unwrap().scope.targets(), &[vip]);
        assert!(catalog.find_price_configuration(&only_pista).unwrap().scope.targets().is_empty());
    }

    #[test]
    fn test_delete_subcategory_prunes_its_id() {
        let mut session = EditingSession::new("evt-1");
        let pista = session.add_category("Pista", None);
        let inteira = session.add_subcategory(&pista, "Inteira", None).unwrap();
        let meia = session.add_subcategory(&pista, "Meia", None).unwrap();
        let config = session
            .add_price_configuration(price(20), Scope::subcategories([inteira, meia]))
            .unwrap();

        session.delete_subcategory(&meia).unwrap();

        let catalog = session.catalog();
        assert_eq!(catalog.find_price_configuration(&config).unwrap().scope.targets(), &[inteira]);
        assert!(matches!(
            session.delete_subcategory(&meia),
            Err(SessionError::SubcategoryNotFound(id)) if id == meia
        ));
    }

    #[test]
    fn test_updates_keep_identity() {
        let mut session = EditingSession::new("evt-1");
        let pista = session.add_category("Pista", None);
        let inteira = session.add_subcategory(&pista, "Inteira", None).unwrap();
        let config = session.add_price_configuration(price(20), Scope::Global).unwrap();

        session.update_category(&pista, "Pista Premium", Some("Frente do palco".to_string())).unwrap();
        session.update_subcategory(&inteira, "Inteira Premium", None).unwrap();
        session
            .update_price_configuration(&config, price(35), Scope::subcategories([inteira]))
            .unwrap();

        let catalog = session.catalog();
        let (category, subcategory) = catalog.find_subcategory(&inteira).unwrap();
        assert_eq!(category.name, "Pista Premium");
        assert_eq!(subcategory.name, "Inteira Premium");
        assert_eq!(subcategory.category_id, pista);

        let updated = catalog.find_price_configuration(&config).unwrap();
        assert_eq!(updated.standard_price(), Some(Decimal::new(35, 0)));
        assert_eq!(updated.name(), "Padrão - Subcategoria - R$35.00");
    }

    #[test]
    fn test_unknown_ids_are_reported() {
        let mut session = EditingSession::new("evt-1");
        let ghost = Uuid::new_v4();

        assert!(matches!(session.update_category(&ghost, "x", None), Err(SessionError::CategoryNotFound(_))));
        assert!(matches!(session.add_subcategory(&ghost, "x", None), Err(SessionError::CategoryNotFound(_))));
        assert!(matches!(
            session.delete_price_configuration(&ghost),
            Err(SessionError::PriceConfigurationNotFound(_))
        ));
        assert!(matches!(
            session.add_price_configuration(price(10), Scope::categories([ghost])),
            Err(SessionError::UnknownTarget(id)) if id == ghost
        ));
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn test_move_price_configuration() {
        let mut session = EditingSession::new("evt-1");
        let a = session.add_price_configuration(price(1), Scope::Global).unwrap();
        let b = session.add_price_configuration(price(2), Scope::Global).unwrap();
        let c = session.add_price_configuration(price(3), Scope::Global).unwrap();

        session.move_price_configuration(&c, 0).unwrap();
        session.move_price_configuration(&a, 99).unwrap();

        let order: Vec<Uuid> = session.catalog().price_configurations.iter().map(|p| p.id).collect();
        assert_eq!(order, vec![c, b, a]);
    }

    #[tokio::test]
    async fn test_save_withholds_invalid_catalog() {
        let repository = MemoryRepository::default();
        let mut session = EditingSession::new("evt-1");
        session.add_category("Sem subcategorias", None);
        session
            .add_price_configuration(PricingKind::Batch { batches: Vec::<Batch>::new() }, Scope::Global)
            .unwrap();

        let errors = match session.save(&repository).await {
            Err(SessionError::Invalid(errors)) => errors,
            other => panic!("expected validation errors, got {other:?}"),
        };
        assert_eq!(errors.issues().len(), 2);
        assert!(repository.stored.lock().unwrap().is_none());
        assert!(session.has_unsaved_changes());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let repository = MemoryRepository::default();
        let mut session = EditingSession::new("evt-1");
        let pista = session.add_category("Pista", None);
        session.add_subcategory(&pista, "Inteira", None).unwrap();
        session.add_price_configuration(price(50), Scope::Global).unwrap();
        assert!(session.has_unsaved_changes());

        session.save(&repository).await.unwrap();
        assert!(!session.has_unsaved_changes());

        let reloaded = EditingSession::load("evt-1", &repository).await.unwrap();
        assert_eq!(reloaded.catalog(), session.catalog());
        assert_eq!(reloaded.event_id(), "evt-1");
    }
}
