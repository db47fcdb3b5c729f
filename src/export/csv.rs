use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::domain::{AddressType, BusinessRecord, Coordinates, ProviderKind};
use crate::error::SearchError;

/// One CSV row; every record field is represented
#[derive(Debug, Serialize, Deserialize)]
struct ExportRow {
    #[serde(rename = "Business Name")]
    name: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Address Type")]
    address_type: String,
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Search Term")]
    search_term: String,
    /// JSON array, so titles containing any delimiter survive
    #[serde(rename = "Provider Categories")]
    provider_categories: String,
    #[serde(rename = "Phone")]
    phone: String,
    #[serde(rename = "Website")]
    website: String,
    #[serde(rename = "Rating")]
    rating: Option<f64>,
    #[serde(rename = "Review Count")]
    review_count: Option<u32>,
    #[serde(rename = "Price")]
    price: String,
    #[serde(rename = "Distance (m)")]
    distance_m: Option<f64>,
    #[serde(rename = "Metadata")]
    metadata: String,
}

impl ExportRow {
    fn from_record(record: &BusinessRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            name: record.name.clone(),
            address: record.address.clone(),
            latitude: record.coordinates.lat(),
            longitude: record.coordinates.lon(),
            category: record.category.clone(),
            address_type: record.address_type.as_str().to_string(),
            source: record.source.as_str().to_string(),
            search_term: record.search_term.clone(),
            provider_categories: serde_json::to_string(&record.provider_categories)?,
            phone: record.phone.clone(),
            website: record.website.clone(),
            rating: record.rating,
            review_count: record.review_count,
            price: record.price.clone(),
            distance_m: record.distance_m,
            metadata: serde_json::to_string(&record.metadata)?,
        })
    }

    fn into_record(self) -> Result<BusinessRecord> {
        let coordinates = Coordinates::new(self.latitude, self.longitude).ok_or_else(|| {
            anyhow!("invalid coordinates ({}, {}) for {}", self.latitude, self.longitude, self.name)
        })?;
        let source = ProviderKind::from_label(&self.source)
            .ok_or_else(|| anyhow!("unknown source provider: {}", self.source))?;
        let address_type = AddressType::from_label(&self.address_type)
            .ok_or_else(|| anyhow!("unknown address type: {}", self.address_type))?;
        let metadata: Map<String, Value> = if self.metadata.trim().is_empty() {
            Map::new()
        } else {
            serde_json::from_str(&self.metadata).context("Failed to parse metadata column")?
        };
        let provider_categories: Vec<String> = if self.provider_categories.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&self.provider_categories)
                .context("Failed to parse provider categories column")?
        };

        Ok(BusinessRecord {
            name: self.name,
            coordinates,
            address: self.address,
            category: self.category,
            address_type,
            source,
            search_term: self.search_term,
            provider_categories,
            phone: self.phone,
            website: self.website,
            rating: self.rating,
            review_count: self.review_count,
            price: self.price,
            distance_m: self.distance_m,
            metadata,
        })
    }
}

/// Write records as CSV with a header row
pub fn write_csv(path: &Path, records: &[BusinessRecord]) -> Result<(), SearchError> {
    let file = File::create(path).map_err(|e| SearchError::export(path, e))?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    if records.is_empty() {
        // serde only emits headers alongside the first row
        writer
            .write_record(HEADERS)
            .map_err(|e| SearchError::export(path, e))?;
    }

    for record in records {
        let row = ExportRow::from_record(record).map_err(|e| SearchError::export(path, e))?;
        writer
            .serialize(row)
            .map_err(|e| SearchError::export(path, e))?;
    }

    writer.flush().map_err(|e| SearchError::export(path, e))?;
    Ok(())
}

/// Read records back from a CSV written by [`write_csv`]
pub fn read_csv(path: &Path) -> Result<Vec<BusinessRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<ExportRow>().enumerate() {
        let row = row.with_context(|| format!("Failed to read CSV row {}", i + 1))?;
        records.push(row.into_record().with_context(|| format!("Invalid CSV row {}", i + 1))?);
    }
    Ok(records)
}

const HEADERS: [&str; 16] = [
    "Business Name",
    "Address",
    "Latitude",
    "Longitude",
    "Category",
    "Address Type",
    "Source",
    "Search Term",
    "Provider Categories",
    "Phone",
    "Website",
    "Rating",
    "Review Count",
    "Price",
    "Distance (m)",
    "Metadata",
];
