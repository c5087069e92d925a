//! Backend JSON layout of the catalog.
//!
//! The backend stores price configurations as one flat object whose
//! `categories`, `subcategories`, `price` and `batch_configs` fields are only
//! meaningful for some `type`/`applies_to` combinations. Records here mirror
//! that layout and convert to and from the typed model. Only the fields that
//! matter for a configuration's kind and scope are written out.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, SecondsFormat, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::EventCatalog;
use crate::category::{Category, Subcategory};
use crate::pricing::{Batch, BatchWindow, PriceConfiguration, PricingKind, Scope, ScopeLevel};

/// Offset applied to dates sent without one (Brasília time, no DST)
pub const BACKEND_UTC_OFFSET_HOURS: i32 = -3;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WireError {
    #[error("Standard price configuration {configuration} has no price")]
    MissingPrice { configuration: Uuid },

    #[error("Temporal batch {batch} is missing its start or end date")]
    MissingBatchDates { batch: Uuid },

    #[error("Batch {batch} has an unreadable date: {value}")]
    InvalidDate { batch: Uuid, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRecord {
    #[serde(default)]
    pub categories: Option<Vec<CategoryRecord>>,
    #[serde(default)]
    pub price_configurations: Option<Vec<PriceConfigurationRecord>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub subcategories: Vec<SubcategoryRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubcategoryRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingKindTag {
    Standard,
    Batch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchKindTag {
    Temporal,
    Quantity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfigurationRecord {
    pub id: Uuid,
    /// Derived on our side; whatever the backend sends is ignored
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PricingKindTag,
    pub applies_to: ScopeLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategories: Option<Vec<Uuid>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_configs: Option<Vec<BatchRecord>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecord {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BatchKindTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_quantity: Option<u32>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

fn backend_offset() -> FixedOffset {
    FixedOffset::east_opt(BACKEND_UTC_OFFSET_HOURS * 3600).unwrap_or_else(|| Utc.fix())
}

/// Parse a backend date.
///
/// Accepts RFC 3339, or the naive `YYYY-MM-DDTHH:MM[:SS]` a browser
/// `datetime-local` input produces, read as Brasília time. A bare date is
/// midnight UTC.
pub fn parse_backend_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return backend_offset()
                .from_local_datetime(&naive)
                .single()
                .map(|local| local.with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// RFC 3339 in the backend offset, e.g. `2025-06-01T10:00:00-03:00`.
/// Sub-second precision is kept so batch bounds survive a save unchanged.
pub fn format_backend_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&backend_offset())
        .to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

impl From<Category> for CategoryRecord {
    fn from(category: Category) -> Self {
        let category_id = category.id;
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            subcategories: category
                .subcategories
                .into_iter()
                .map(|subcategory| SubcategoryRecord {
                    id: subcategory.id,
                    name: subcategory.name,
                    description: subcategory.description,
                    category_id: Some(category_id),
                })
                .collect(),
        }
    }
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        let category_id = record.id;
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            // the owning category is authoritative over the back-reference
            subcategories: record
                .subcategories
                .into_iter()
                .map(|sub| Subcategory {
                    id: sub.id,
                    name: sub.name,
                    description: sub.description,
                    category_id,
                })
                .collect(),
        }
    }
}

impl From<Batch> for BatchRecord {
    fn from(batch: Batch) -> Self {
        let mut record = BatchRecord {
            id: batch.id,
            name: batch.name,
            kind: BatchKindTag::Temporal,
            start_date: None,
            end_date: None,
            start_quantity: None,
            end_quantity: None,
            price: batch.price,
        };

        match batch.window {
            BatchWindow::Temporal { starts_at, ends_at } => {
                record.start_date = Some(format_backend_date(starts_at));
                record.end_date = Some(format_backend_date(ends_at));
            }
            BatchWindow::Quantity { start_quantity, end_quantity } => {
                record.kind = BatchKindTag::Quantity;
                record.start_quantity = start_quantity;
                record.end_quantity = end_quantity;
            }
        }
        record
    }
}

impl TryFrom<BatchRecord> for Batch {
    type Error = WireError;

    fn try_from(record: BatchRecord) -> Result<Self, Self::Error> {
        let window = match record.kind {
            BatchKindTag::Temporal => {
                let parse = |raw: Option<&String>| -> Result<DateTime<Utc>, WireError> {
                    let raw = raw
                        .filter(|s| !s.trim().is_empty())
                        .ok_or(WireError::MissingBatchDates { batch: record.id })?;
                    parse_backend_date(raw).ok_or_else(|| WireError::InvalidDate {
                        batch: record.id,
                        value: raw.clone(),
                    })
                };
                BatchWindow::Temporal {
                    starts_at: parse(record.start_date.as_ref())?,
                    ends_at: parse(record.end_date.as_ref())?,
                }
            }
            BatchKindTag::Quantity => BatchWindow::Quantity {
                start_quantity: record.start_quantity,
                end_quantity: record.end_quantity,
            },
        };

        Ok(Batch {
            id: record.id,
            name: record.name,
            price: record.price,
            window,
        })
    }
}

impl From<PriceConfiguration> for PriceConfigurationRecord {
    fn from(config: PriceConfiguration) -> Self {
        let name = config.name();
        let applies_to = config.scope.level();

        let (categories, subcategories) = match config.scope {
            Scope::Global => (None, None),
            Scope::Category(ids) => (Some(ids), None),
            Scope::Subcategory(ids) => (None, Some(ids)),
        };

        let (kind, price, batch_configs) = match config.pricing {
            PricingKind::Standard { price } => (PricingKindTag::Standard, Some(price), None),
            PricingKind::Batch { batches } => (
                PricingKindTag::Batch,
                None,
                Some(batches.into_iter().map(BatchRecord::from).collect()),
            ),
        };

        Self {
            id: config.id,
            name,
            kind,
            applies_to,
            categories,
            subcategories,
            price,
            batch_configs,
        }
    }
}

impl TryFrom<PriceConfigurationRecord> for PriceConfiguration {
    type Error = WireError;

    fn try_from(record: PriceConfigurationRecord) -> Result<Self, Self::Error> {
        let scope = match record.applies_to {
            ScopeLevel::Global => Scope::Global,
            ScopeLevel::Category => Scope::categories(record.categories.unwrap_or_default()),
            ScopeLevel::Subcategory => Scope::subcategories(record.subcategories.unwrap_or_default()),
        };

        let pricing = match record.kind {
            PricingKindTag::Standard => PricingKind::Standard {
                price: record
                    .price
                    .ok_or(WireError::MissingPrice { configuration: record.id })?,
            },
            PricingKindTag::Batch => PricingKind::Batch {
                batches: record
                    .batch_configs
                    .unwrap_or_default()
                    .into_iter()
                    .map(Batch::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            },
        };

        Ok(PriceConfiguration {
            id: record.id,
            pricing,
            scope,
        })
    }
}

impl From<EventCatalog> for CatalogRecord {
    fn from(catalog: EventCatalog) -> Self {
        Self {
            categories: Some(catalog.categories.into_iter().map(CategoryRecord::from).collect()),
            price_configurations: Some(
                catalog
                    .price_configurations
                    .into_iter()
                    .map(PriceConfigurationRecord::from)
                    .collect(),
            ),
        }
    }
}

impl TryFrom<CatalogRecord> for EventCatalog {
    type Error = WireError;

    fn try_from(record: CatalogRecord) -> Result<Self, Self::Error> {
        Ok(EventCatalog {
            categories: record
                .categories
                .unwrap_or_default()
                .into_iter()
                .map(Category::from)
                .collect(),
            price_configurations: record
                .price_configurations
                .unwrap_or_default()
                .into_iter()
                .map(PriceConfiguration::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}
