use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::classify::{category_label, classify_address};
use crate::geometry::haversine_m;

/// External search API a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum ProviderKind {
    #[serde(rename = "HERE", alias = "here")]
    Here,
    #[serde(rename = "Yelp", alias = "yelp")]
    Yelp,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Here, ProviderKind::Yelp];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Here => "HERE",
            ProviderKind::Yelp => "Yelp",
        }
    }

    /// Parse the display name written into exports
    pub fn from_label(label: &str) -> Option<ProviderKind> {
        match label.trim().to_ascii_lowercase().as_str() {
            "here" => Some(ProviderKind::Here),
            "yelp" => Some(ProviderKind::Yelp),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address classification derived from address text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum AddressType {
    #[serde(alias = "commercial")]
    Commercial,
    #[serde(alias = "residential")]
    Residential,
}

impl AddressType {
    /// Marker color used on the map
    pub fn color(&self) -> &'static str {
        match self {
            AddressType::Commercial => "#FFD700",
            AddressType::Residential => "#90EE90",
        }
    }

    pub fn from_label(label: &str) -> Option<AddressType> {
        match label.trim().to_ascii_lowercase().as_str() {
            "commercial" => Some(AddressType::Commercial),
            "residential" => Some(AddressType::Residential),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Commercial => "Commercial",
            AddressType::Residential => "Residential",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A renderable WGS84 position
///
/// Providers report `0,0` when they have no position for an item, so that
/// pair is rejected along with NaN/Inf and out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    lat: f64,
    lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        if lat == 0.0 && lon == 0.0 {
            return None;
        }
        Some(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Great-circle distance in meters
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        haversine_m((self.lat, self.lon), (other.lat, other.lon))
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

/// Provider output before classification
///
/// Each provider client fills one of these per response item and hands it
/// to [`BusinessRecord::new`], which labels it.
#[derive(Debug, Clone, Default)]
pub struct BusinessDraft {
    pub name: String,
    pub address: String,
    pub search_term: String,
    pub provider_categories: Vec<String>,
    pub phone: String,
    pub website: String,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub price: String,
    pub distance_m: Option<f64>,
    pub metadata: Map<String, Value>,
}

/// A single normalized business result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub name: String,
    pub coordinates: Coordinates,
    pub address: String,
    pub category: String,
    pub address_type: AddressType,
    pub source: ProviderKind,
    pub search_term: String,
    pub provider_categories: Vec<String>,
    pub phone: String,
    pub website: String,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub price: String,
    pub distance_m: Option<f64>,
    pub metadata: Map<String, Value>,
}

impl BusinessRecord {
    /// Build a classified record from a provider draft
    pub fn new(draft: BusinessDraft, coordinates: Coordinates, source: ProviderKind) -> Self {
        let category = category_label(&draft.provider_categories, &draft.name, &draft.search_term);
        let address_type = classify_address(&draft.address);

        Self {
            name: draft.name,
            coordinates,
            address: draft.address,
            category,
            address_type,
            source,
            search_term: draft.search_term,
            provider_categories: draft.provider_categories,
            phone: draft.phone,
            website: draft.website,
            rating: draft.rating,
            review_count: draft.review_count,
            price: draft.price,
            distance_m: draft.distance_m,
            metadata: draft.metadata,
        }
    }

    /// Marker tooltip text
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_reject_unrenderable() {
        assert!(Coordinates::new(37.7749, -122.4194).is_some());
        assert!(Coordinates::new(0.0, 0.0).is_none());
        assert!(Coordinates::new(f64::NAN, 10.0).is_none());
        assert!(Coordinates::new(91.0, 10.0).is_none());
        assert!(Coordinates::new(10.0, -181.0).is_none());
        // Equator or prime meridian alone is fine
        assert!(Coordinates::new(0.0, 32.5).is_some());
    }

    #[test]
    fn test_provider_labels() {
        assert_eq!(ProviderKind::Here.to_string(), "HERE");
        assert_eq!(ProviderKind::from_label("Yelp"), Some(ProviderKind::Yelp));
        assert_eq!(ProviderKind::from_label(" here "), Some(ProviderKind::Here));
        assert_eq!(ProviderKind::from_label("google"), None);
    }

    #[test]
    fn test_new_record_is_classified() {
        let draft = BusinessDraft {
            name: "Blue Bottle".to_string(),
            address: "66 Mint St Suite 100, San Francisco, CA".to_string(),
            search_term: "coffee shop".to_string(),
            provider_categories: vec!["Coffee & Tea".to_string()],
            ..Default::default()
        };
        let coords = Coordinates::new(37.7825, -122.4075).unwrap();
        let record = BusinessRecord::new(draft, coords, ProviderKind::Yelp);

        assert_eq!(record.category, "Coffee & Tea");
        assert_eq!(record.address_type, AddressType::Commercial);
        assert_eq!(record.source, ProviderKind::Yelp);
        assert_eq!(record.label(), "Blue Bottle (Coffee & Tea)");
    }
}
