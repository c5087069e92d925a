use eventues_catalog::{BatchWindow, EventCatalog, PricingKind};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A problem that blocks submitting the catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("Category \"{name}\" must have at least one subcategory")]
    CategoryWithoutSubcategories { category: Uuid, name: String },

    #[error("Price configuration \"{name}\" must have a positive price")]
    NonPositiveStandardPrice { configuration: Uuid, name: String },

    #[error("Price configuration \"{name}\" must have at least one batch")]
    EmptyBatchList { configuration: Uuid, name: String },

    #[error("Every batch in \"{name}\" must have a name")]
    UnnamedBatch { configuration: Uuid, batch: Uuid, name: String },

    #[error("Every batch in \"{name}\" must have a positive price")]
    NonPositiveBatchPrice { configuration: Uuid, batch: Uuid, name: String },

    #[error("Batch \"{batch_name}\" must start before it ends")]
    InvalidBatchWindow { configuration: Uuid, batch: Uuid, batch_name: String },
}

/// Every issue found in one validation pass
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("catalog has {} validation issue(s): {}", .0.len(), join_issues(.0))]
pub struct ValidationErrors(pub Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("; ")
}

/// Check the catalog before it goes to the backend.
///
/// Runs every rule rather than stopping at the first failure so the
/// organizer sees the whole list at once.
pub fn validate_catalog(catalog: &EventCatalog) -> Result<(), ValidationErrors> {
    let mut issues = Vec::new();

    for category in &catalog.categories {
        if category.subcategories.is_empty() {
            issues.push(ValidationIssue::CategoryWithoutSubcategories {
                category: category.id,
                name: category.name.clone(),
            });
        }
    }

    for config in &catalog.price_configurations {
        let name = config.name();
        match &config.pricing {
            PricingKind::Standard { price } => {
                if *price <= Decimal::ZERO {
                    issues.push(ValidationIssue::NonPositiveStandardPrice {
                        configuration: config.id,
                        name,
                    });
                }
            }
            PricingKind::Batch { batches } => {
                if batches.is_empty() {
                    issues.push(ValidationIssue::EmptyBatchList {
                        configuration: config.id,
                        name: name.clone(),
                    });
                }

                for batch in batches {
                    if batch.name.trim().is_empty() {
                        issues.push(ValidationIssue::UnnamedBatch {
                            configuration: config.id,
                            batch: batch.id,
                            name: name.clone(),
                        });
                    }
                    if batch.price <= Decimal::ZERO {
                        issues.push(ValidationIssue::NonPositiveBatchPrice {
                            configuration: config.id,
                            batch: batch.id,
                            name: name.clone(),
                        });
                    }
                    if let BatchWindow::Temporal { starts_at, ends_at } = &batch.window {
                        if starts_at >= ends_at {
                            issues.push(ValidationIssue::InvalidBatchWindow {
                                configuration: config.id,
                                batch: batch.id,
                                batch_name: batch.name.clone(),
                            });
                        }
                    }
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use eventues_catalog::{Batch, Category, PriceConfiguration, Scope};

    fn valid_catalog() -> EventCatalog {
        let mut category = Category::new("Pista", None);
        category.add_subcategory("Inteira", None);
        EventCatalog {
            price_configurations: vec![PriceConfiguration::standard(Decimal::new(50, 0), Scope::Global)],
            categories: vec![category],
        }
    }

    #[test]
    fn test_valid_catalog_passes() {
        assert_eq!(validate_catalog(&valid_catalog()), Ok(()));
        assert_eq!(validate_catalog(&EventCatalog::new()), Ok(()));
    }

    #[test]
    fn test_category_needs_subcategory() {
        let mut catalog = valid_catalog();
        let empty = Category::new("Camarote", None);
        let empty_id = empty.id;
        catalog.categories.push(empty);

        let errors = validate_catalog(&catalog).unwrap_err();
        assert_eq!(
            errors.issues(),
            &[ValidationIssue::CategoryWithoutSubcategories { category: empty_id, name: "Camarote".to_string() }]
        );
        assert_eq!(
            errors.to_string(),
            "catalog has 1 validation issue(s): Category \"Camarote\" must have at least one subcategory"
        );
    }

    #[test]
    fn test_collects_every_pricing_issue() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        let mut catalog = valid_catalog();
        catalog.price_configurations = vec![
            PriceConfiguration::standard(Decimal::ZERO, Scope::Global),
            PriceConfiguration::batches(Vec::new(), Scope::Global),
            PriceConfiguration::batches(
                vec![
                    Batch::temporal("  ", Decimal::new(10, 0), start, start + Duration::days(1)),
                    Batch::temporal("Virada", Decimal::new(-1, 0), start, start),
                ],
                Scope::Global,
            ),
        ];

        let errors = validate_catalog(&catalog).unwrap_err();
        let kinds: Vec<&str> = errors
            .issues()
            .iter()
            .map(|issue| match issue {
                ValidationIssue::CategoryWithoutSubcategories { .. } => "category",
                ValidationIssue::NonPositiveStandardPrice { .. } => "standard-price",
                ValidationIssue::EmptyBatchList { .. } => "empty-batches",
                ValidationIssue::UnnamedBatch { .. } => "unnamed",
                ValidationIssue::NonPositiveBatchPrice { .. } => "batch-price",
                ValidationIssue::InvalidBatchWindow { .. } => "window",
            })
            .collect();

        assert_eq!(kinds, vec!["standard-price", "empty-batches", "unnamed", "batch-price", "window"]);
    }

    #[test]
    fn test_quantity_batches_have_no_window_check() {
        let mut catalog = valid_catalog();
        catalog.price_configurations = vec![PriceConfiguration::batches(
            vec![Batch::quantity("Primeiros 100", Decimal::new(25, 0), Some(100), Some(0))],
            Scope::Global,
        )];
        assert_eq!(validate_catalog(&catalog), Ok(()));
    }
}
