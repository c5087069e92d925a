pub mod category;
pub mod pricing;
pub mod resolution;
pub mod catalog;
pub mod wire;

pub use category::{Category, Subcategory};
pub use pricing::{Batch, BatchWindow, PriceConfiguration, PricingKind, Scope, ScopeLevel};
pub use resolution::{resolve_effective_price, PricingEngine, ResolvedPrice};
pub use catalog::{EventCatalog, PriceRow};
pub use wire::{CatalogRecord, WireError};
