use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::{Category, Subcategory};
use crate::pricing::PriceConfiguration;
use crate::resolution::{PricingEngine, ResolvedPrice};
use crate::wire::CatalogRecord;

/// Ticket categories and price configurations of one event.
///
/// This is the unit fetched from and submitted to the backend. On the wire
/// it uses the flat snake_case layout described in [`crate::wire`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogRecord", into = "CatalogRecord")]
pub struct EventCatalog {
    pub categories: Vec<Category>,
    /// Stored order is authoritative for tie-breaks during resolution
    pub price_configurations: Vec<PriceConfiguration>,
}

/// One line of the price table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRow {
    pub category_id: Uuid,
    pub category_name: String,
    pub subcategory_id: Uuid,
    pub subcategory_name: String,
    pub resolved: Option<ResolvedPrice>,
}

impl EventCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_category(&self, category_id: &Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == *category_id)
    }

    /// Locate a subcategory together with its owning category
    pub fn find_subcategory(&self, subcategory_id: &Uuid) -> Option<(&Category, &Subcategory)> {
        self.categories.iter().find_map(|category| {
            category
                .find_subcategory(subcategory_id)
                .map(|subcategory| (category, subcategory))
        })
    }

    pub fn find_price_configuration(&self, configuration_id: &Uuid) -> Option<&PriceConfiguration> {
        self.price_configurations.iter().find(|c| c.id == *configuration_id)
    }

    pub fn engine(&self) -> PricingEngine<'_> {
        PricingEngine::new(&self.price_configurations)
    }

    /// Effective price for a subcategory of this catalog
    pub fn effective_price(&self, subcategory_id: &Uuid, now: DateTime<Utc>) -> Option<ResolvedPrice> {
        let (category, subcategory) = self.find_subcategory(subcategory_id)?;
        self.engine().resolve(subcategory, category, now)
    }

    /// Resolve every subcategory, in category then subcategory order
    pub fn price_table(&self, now: DateTime<Utc>) -> Vec<PriceRow> {
        let engine = self.engine();
        let engine = &engine;
        self.categories
            .iter()
            .flat_map(move |category| {
                category.subcategories.iter().map(move |subcategory| PriceRow {
                    category_id: category.id,
                    category_name: category.name.clone(),
                    subcategory_id: subcategory.id,
                    subcategory_name: subcategory.name.clone(),
                    resolved: engine.resolve(subcategory, category, now),
                })
            })
            .collect()
    }
}
