use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use crate::classify::filter::record_distance;
use crate::domain::ResultSet;

const HEADERS: [&str; 8] = [
    "Business Name",
    "Category",
    "Address",
    "Address Type",
    "Rating",
    "Reviews",
    "Source",
    "Distance",
];

/// Tabular listing of a result set
pub fn build_table(results: &ResultSet) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        HEADERS
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    let origin = results.origin();
    for record in results {
        let rating = record
            .rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "-".to_string());
        let reviews = record
            .review_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        let distance = record_distance(record, origin.as_ref())
            .map(format_distance)
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(&record.name),
            Cell::new(&record.category),
            Cell::new(&record.address),
            Cell::new(record.address_type.as_str()),
            Cell::new(rating).set_alignment(CellAlignment::Right),
            Cell::new(reviews).set_alignment(CellAlignment::Right),
            Cell::new(record.source.as_str()),
            Cell::new(distance).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// "Results by Category" lines, e.g. `- Coffee Shop: 3 businesses`
pub fn category_summary(results: &ResultSet) -> Vec<String> {
    results
        .category_counts()
        .into_iter()
        .map(|(category, count)| {
            let noun = if count == 1 { "business" } else { "businesses" };
            format!("- {}: {} {}", category, count, noun)
        })
        .collect()
}

fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}
