use serde::Deserialize;
use serde_json::{Map, Value};

use super::{ProviderResults, SearchProvider, build_client, fetch_json};
use crate::config::YelpConfig;
use crate::domain::query::MAX_RADIUS_M;
use crate::domain::{BusinessDraft, BusinessRecord, Coordinates, ProviderKind, SearchArea, SearchQuery};
use crate::error::SearchError;

/// Yelp Fusion caps `limit` at 50
const MAX_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<Map<String, Value>>,
    #[serde(default)]
    region: Option<Region>,
}

#[derive(Debug, Deserialize)]
struct Region {
    #[serde(default)]
    center: LatLon,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LatLon {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YelpBusiness {
    name: String,
    location: Option<Location>,
    coordinates: Option<LatLon>,
    categories: Vec<Category>,
    phone: Option<String>,
    url: Option<String>,
    rating: Option<f64>,
    review_count: Option<u32>,
    price: Option<String>,
    distance: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Location {
    display_address: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Category {
    #[serde(default)]
    title: String,
}

/// Client for the Yelp Fusion business search
pub struct YelpClient {
    api_key: String,
    config: YelpConfig,
    client: reqwest::blocking::Client,
}

impl YelpClient {
    pub fn new(api_key: String, config: YelpConfig) -> Result<Self, SearchError> {
        let client = build_client(ProviderKind::Yelp, config.timeout_secs)?;
        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    fn search_term(
        &self,
        term: &str,
        area: &SearchArea,
        radius_m: u32,
        limit: u32,
    ) -> Result<SearchResponse, SearchError> {
        let url = format!("{}/businesses/search", self.config.base_url.trim_end_matches('/'));
        let mut params: Vec<(&str, String)> = vec![
            ("term", term.to_string()),
            ("radius", radius_m.min(MAX_RADIUS_M).to_string()),
            ("limit", limit.to_string()),
        ];
        match area {
            SearchArea::Place(place) => params.push(("location", place.clone())),
            SearchArea::Point(coords) => {
                params.push(("latitude", coords.lat().to_string()));
                params.push(("longitude", coords.lon().to_string()));
            }
        }
        tracing::debug!(term, area = %area.describe(), radius_m, "searching Yelp");

        let request = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&params);
        fetch_json(ProviderKind::Yelp, request)
    }
}

impl SearchProvider for YelpClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Yelp
    }

    fn search(&self, query: &SearchQuery) -> Result<ProviderResults, SearchError> {
        let limit = query.limit().unwrap_or(self.config.limit).clamp(1, MAX_LIMIT);

        let mut records = Vec::new();
        let mut center = query.origin();
        for term in query.terms() {
            let response = self.search_term(term, query.area(), query.radius_m(), limit)?;
            if center.is_none() {
                center = response
                    .region
                    .as_ref()
                    .and_then(|r| Coordinates::new(r.center.latitude?, r.center.longitude?));
            }
            records.extend(parse_businesses(response.businesses, term));
        }

        Ok(ProviderResults { records, center })
    }
}

/// Convert Yelp businesses into records, dropping those without coordinates
fn parse_businesses(businesses: Vec<Map<String, Value>>, term: &str) -> Vec<BusinessRecord> {
    let mut records = Vec::with_capacity(businesses.len());
    let mut dropped = 0;

    for raw in businesses {
        let business: YelpBusiness = match serde_json::from_value(Value::Object(raw.clone())) {
            Ok(business) => business,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable Yelp business");
                dropped += 1;
                continue;
            }
        };

        let Some(coordinates) = business
            .coordinates
            .as_ref()
            .and_then(|c| Coordinates::new(c.latitude?, c.longitude?))
        else {
            dropped += 1;
            continue;
        };

        let draft = BusinessDraft {
            name: business.name,
            address: business
                .location
                .map(|l| l.display_address.join(" "))
                .unwrap_or_default(),
            search_term: term.to_string(),
            provider_categories: business
                .categories
                .into_iter()
                .map(|c| c.title)
                .filter(|t| !t.is_empty())
                .collect(),
            phone: business.phone.unwrap_or_default(),
            website: business.url.unwrap_or_default(),
            rating: business.rating,
            review_count: business.review_count,
            price: business.price.unwrap_or_default(),
            distance_m: business.distance,
            metadata: raw,
        };
        records.push(BusinessRecord::new(draft, coordinates, ProviderKind::Yelp));
    }

    if dropped > 0 {
        tracing::warn!(dropped, term, "Yelp businesses without coordinates were skipped");
    }
    records
}
