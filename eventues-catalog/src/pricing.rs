use chrono::{DateTime, Utc};
use eventues_shared::format_two_places;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Specificity of a price configuration's scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeLevel {
    Subcategory,
    Category,
    Global,
}

impl ScopeLevel {
    /// Resolution order within a pricing kind
    pub const MOST_SPECIFIC_FIRST: [ScopeLevel; 3] =
        [ScopeLevel::Subcategory, ScopeLevel::Category, ScopeLevel::Global];

    pub fn label(&self) -> &'static str {
        match self {
            ScopeLevel::Subcategory => "Subcategoria",
            ScopeLevel::Category => "Categoria",
            ScopeLevel::Global => "Global",
        }
    }
}

/// What a price configuration applies to.
///
/// Target lists keep insertion order and never hold duplicates. An empty
/// target list matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Global,
    Category(Vec<Uuid>),
    Subcategory(Vec<Uuid>),
}

impl Scope {
    pub fn categories(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Scope::Category(dedup(ids))
    }

    pub fn subcategories(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Scope::Subcategory(dedup(ids))
    }

    pub fn level(&self) -> ScopeLevel {
        match self {
            Scope::Global => ScopeLevel::Global,
            Scope::Category(_) => ScopeLevel::Category,
            Scope::Subcategory(_) => ScopeLevel::Subcategory,
        }
    }

    /// Target ids, empty for global scope
    pub fn targets(&self) -> &[Uuid] {
        match self {
            Scope::Global => &[],
            Scope::Category(ids) | Scope::Subcategory(ids) => ids,
        }
    }

    /// Whether this scope, at exactly `level`, covers the given subcategory
    pub fn applies_at(&self, level: ScopeLevel, subcategory_id: Uuid, category_id: Uuid) -> bool {
        match (self, level) {
            (Scope::Subcategory(ids), ScopeLevel::Subcategory) => ids.contains(&subcategory_id),
            (Scope::Category(ids), ScopeLevel::Category) => ids.contains(&category_id),
            (Scope::Global, ScopeLevel::Global) => true,
            _ => false,
        }
    }

    /// Drop `id` from the targets. Returns true if anything was removed.
    pub fn prune(&mut self, id: &Uuid) -> bool {
        match self {
            Scope::Global => false,
            Scope::Category(ids) | Scope::Subcategory(ids) => {
                let before = ids.len();
                ids.retain(|target| target != id);
                ids.len() != before
            }
        }
    }
}

fn dedup(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Activation window of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchWindow {
    /// Active while `starts_at <= now <= ends_at`
    Temporal {
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },
    /// Sales-count bounded. Never active until a sales counter exists.
    Quantity {
        start_quantity: Option<u32>,
        end_quantity: Option<u32>,
    },
}

impl BatchWindow {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self {
            BatchWindow::Temporal { starts_at, ends_at } => *starts_at <= now && now <= *ends_at,
            BatchWindow::Quantity { .. } => false,
        }
    }
}

/// One priced tier ("lote") of a batch configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub window: BatchWindow,
}

impl Batch {
    pub fn temporal(
        name: impl Into<String>,
        price: Decimal,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            window: BatchWindow::Temporal { starts_at, ends_at },
        }
    }

    pub fn quantity(
        name: impl Into<String>,
        price: Decimal,
        start_quantity: Option<u32>,
        end_quantity: Option<u32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            window: BatchWindow::Quantity { start_quantity, end_quantity },
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.window.is_active(now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingKind {
    Standard { price: Decimal },
    Batch { batches: Vec<Batch> },
}

impl PricingKind {
    pub fn label(&self) -> &'static str {
        match self {
            PricingKind::Standard { .. } => "Padrão",
            PricingKind::Batch { .. } => "Lote",
        }
    }
}

/// A pricing rule for a scope of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceConfiguration {
    pub id: Uuid,
    pub pricing: PricingKind,
    pub scope: Scope,
}

impl PriceConfiguration {
    pub fn new(pricing: PricingKind, scope: Scope) -> Self {
        Self {
            id: Uuid::new_v4(),
            pricing,
            scope,
        }
    }

    pub fn standard(price: Decimal, scope: Scope) -> Self {
        Self::new(PricingKind::Standard { price }, scope)
    }

    pub fn batches(batches: Vec<Batch>, scope: Scope) -> Self {
        Self::new(PricingKind::Batch { batches }, scope)
    }

    /// Display name, derived from kind, scope and price.
    ///
    /// `Padrão - Categoria - R$40.00`, or `Lote - Global` for batches.
    pub fn name(&self) -> String {
        let scope = self.scope.level().label();
        match &self.pricing {
            PricingKind::Standard { price } => format!(
                "{} - {} - R${}",
                self.pricing.label(),
                scope,
                format_two_places(*price)
            ),
            PricingKind::Batch { .. } => format!("{} - {}", self.pricing.label(), scope),
        }
    }

    /// First batch in list order that is active at `now`
    pub fn active_batch(&self, now: DateTime<Utc>) -> Option<&Batch> {
        match &self.pricing {
            PricingKind::Batch { batches } => batches.iter().find(|b| b.is_active(now)),
            PricingKind::Standard { .. } => None,
        }
    }

    pub fn standard_price(&self) -> Option<Decimal> {
        match &self.pricing {
            PricingKind::Standard { price } => Some(*price),
            PricingKind::Batch { .. } => None,
        }
    }
}
