use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::category::{Category, Subcategory};
use crate::pricing::{PriceConfiguration, ScopeLevel};

/// An effective price together with the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPrice {
    pub price: Decimal,
    pub configuration_id: Uuid,
    /// Set when the price came from an active batch
    pub batch_id: Option<Uuid>,
    pub level: ScopeLevel,
}

/// Effective price resolution over a snapshot of price configurations.
///
/// Active batches win over any standard price. Within each kind the most
/// specific scope wins, and within one scope level the first configuration in
/// list order wins.
pub struct PricingEngine<'a> {
    configurations: &'a [PriceConfiguration],
}

impl<'a> PricingEngine<'a> {
    pub fn new(configurations: &'a [PriceConfiguration]) -> Self {
        Self { configurations }
    }

    pub fn resolve(
        &self,
        subcategory: &Subcategory,
        category: &Category,
        now: DateTime<Utc>,
    ) -> Option<ResolvedPrice> {
        self.resolve_batch(subcategory.id, category.id, now)
            .or_else(|| self.resolve_standard(subcategory.id, category.id))
    }

    fn resolve_batch(
        &self,
        subcategory_id: Uuid,
        category_id: Uuid,
        now: DateTime<Utc>,
    ) -> Option<ResolvedPrice> {
        for level in ScopeLevel::MOST_SPECIFIC_FIRST {
            for config in self.at_level(level, subcategory_id, category_id) {
                if let Some(batch) = config.active_batch(now) {
                    return Some(ResolvedPrice {
                        price: batch.price,
                        configuration_id: config.id,
                        batch_id: Some(batch.id),
                        level,
                    });
                }
            }
        }
        None
    }

    fn resolve_standard(&self, subcategory_id: Uuid, category_id: Uuid) -> Option<ResolvedPrice> {
        for level in ScopeLevel::MOST_SPECIFIC_FIRST {
            let found = self
                .at_level(level, subcategory_id, category_id)
                .find_map(|config| config.standard_price().map(|price| (config.id, price)));

            if let Some((configuration_id, price)) = found {
                return Some(ResolvedPrice {
                    price,
                    configuration_id,
                    batch_id: None,
                    level,
                });
            }
        }
        None
    }

    fn at_level(
        &self,
        level: ScopeLevel,
        subcategory_id: Uuid,
        category_id: Uuid,
    ) -> impl Iterator<Item = &'a PriceConfiguration> + 'a {
        let configurations = self.configurations;
        configurations
            .iter()
            .filter(move |c| c.scope.applies_at(level, subcategory_id, category_id))
    }
}

/// Effective price of `subcategory` at `now`, or `None` when no rule applies
pub fn resolve_effective_price(
    subcategory: &Subcategory,
    category: &Category,
    configurations: &[PriceConfiguration],
    now: DateTime<Utc>,
) -> Option<Decimal> {
    PricingEngine::new(configurations)
        .resolve(subcategory, category, now)
        .map(|resolved| resolved.price)
}
