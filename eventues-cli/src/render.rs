use eventues_catalog::{EventCatalog, PriceRow, PricingKind, ResolvedPrice};
use eventues_editor::ValidationErrors;
use eventues_shared::PriceLabel;

const HEADERS: [&str; 4] = ["Category", "Subcategory", "Price", "Source"];

/// Where a resolved price came from, e.g. `Lote 1 (Lote - Categoria)`
pub fn price_source(catalog: &EventCatalog, resolved: &ResolvedPrice) -> String {
    let Some(configuration) = catalog.find_price_configuration(&resolved.configuration_id) else {
        return format!("unknown configuration {}", resolved.configuration_id);
    };

    let batch_name = match (&configuration.pricing, resolved.batch_id) {
        (PricingKind::Batch { batches }, Some(batch_id)) => {
            batches.iter().find(|b| b.id == batch_id).map(|b| b.name.as_str())
        }
        _ => None,
    };

    match batch_name {
        Some(name) => format!("{} ({})", name, configuration.name()),
        None => configuration.name(),
    }
}

/// Plain-text price table, one line per subcategory
pub fn price_table(catalog: &EventCatalog, rows: &[PriceRow]) -> String {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            [
                row.category_name.clone(),
                row.subcategory_name.clone(),
                PriceLabel(row.resolved.as_ref().map(|r| r.price)).to_string(),
                row.resolved
                    .as_ref()
                    .map(|r| price_source(catalog, r))
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(str::to_string), &widths);
    push_line(&mut out, &widths.map(|w| "-".repeat(w)), &widths);
    for line in &cells {
        push_line(&mut out, line, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

pub fn validation_report(errors: &ValidationErrors) -> String {
    errors
        .issues()
        .iter()
        .map(|issue| format!("- {}\n", issue))
        .collect()
}
