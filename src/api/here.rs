use serde::Deserialize;
use serde_json::{Map, Value};

use super::{ProviderResults, SearchProvider, build_client, fetch_json};
use crate::config::HereConfig;
use crate::domain::{BusinessDraft, BusinessRecord, Coordinates, ProviderKind, SearchArea, SearchQuery};
use crate::error::SearchError;

/// HERE Discover caps `limit` at 100
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    items: Vec<GeocodeItem>,
}

#[derive(Debug, Deserialize)]
struct GeocodeItem {
    position: Position,
}

#[derive(Debug, Deserialize)]
struct Position {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    items: Vec<Map<String, Value>>,
}

/// The parts of a Discover item we read; the full item is kept as metadata
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DiscoverItem {
    title: String,
    address: Option<AddressLabel>,
    position: Option<Position>,
    categories: Vec<Category>,
    contacts: Vec<Contact>,
    distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AddressLabel {
    #[serde(default)]
    label: String,
}

#[derive(Debug, Deserialize)]
struct Category {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Contact {
    phone: Vec<ContactValue>,
    www: Vec<ContactValue>,
}

#[derive(Debug, Deserialize)]
struct ContactValue {
    #[serde(default)]
    value: String,
}

/// Client for the HERE Geocode and Discover APIs
pub struct HereClient {
    api_key: String,
    config: HereConfig,
    client: reqwest::blocking::Client,
}

impl HereClient {
    pub fn new(api_key: String, config: HereConfig) -> Result<Self, SearchError> {
        let client = build_client(ProviderKind::Here, config.timeout_secs)?;
        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    /// Geocode a place name to coordinates using the first match
    pub fn geocode(&self, place: &str) -> Result<Coordinates, SearchError> {
        tracing::debug!(place, "geocoding with HERE");
        let request = self
            .client
            .get(&self.config.geocode_url)
            .query(&[("q", place), ("apiKey", self.api_key.as_str())]);
        let response: GeocodeResponse = fetch_json(ProviderKind::Here, request)?;

        let item = response.items.into_iter().next().ok_or_else(|| {
            SearchError::request(ProviderKind::Here, format!("could not geocode location: {}", place))
        })?;

        Coordinates::new(item.position.lat, item.position.lng).ok_or_else(|| {
            SearchError::parse(
                ProviderKind::Here,
                format!("geocode returned an invalid position for {}", place),
            )
        })
    }

    fn discover(
        &self,
        term: &str,
        center: Coordinates,
        radius_m: u32,
        limit: u32,
    ) -> Result<Vec<BusinessRecord>, SearchError> {
        let url = format!("{}/discover", self.config.base_url.trim_end_matches('/'));
        let area = format!("circle:{},{};r={}", center.lat(), center.lon(), radius_m);
        let limit = limit.to_string();
        tracing::debug!(term, %center, radius_m, "searching HERE Discover");

        let request = self.client.get(url).query(&[
            ("apiKey", self.api_key.as_str()),
            ("q", term),
            ("in", area.as_str()),
            ("limit", limit.as_str()),
        ]);
        let response: DiscoverResponse = fetch_json(ProviderKind::Here, request)?;
        Ok(parse_discover_items(response.items, term))
    }
}

impl SearchProvider for HereClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Here
    }

    fn search(&self, query: &SearchQuery) -> Result<ProviderResults, SearchError> {
        let center = match query.area() {
            SearchArea::Point(coords) => *coords,
            SearchArea::Place(place) => self.geocode(place)?,
        };
        let limit = query.limit().unwrap_or(self.config.limit).clamp(1, MAX_LIMIT);

        let mut records = Vec::new();
        for term in query.terms() {
            records.extend(self.discover(term, center, query.radius_m(), limit)?);
        }

        Ok(ProviderResults {
            records,
            center: Some(center),
        })
    }
}

/// Convert Discover items into records, dropping items without a position
fn parse_discover_items(items: Vec<Map<String, Value>>, term: &str) -> Vec<BusinessRecord> {
    let mut records = Vec::with_capacity(items.len());
    let mut dropped = 0;

    for raw in items {
        let item: DiscoverItem = match serde_json::from_value(Value::Object(raw.clone())) {
            Ok(item) => item,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable HERE item");
                dropped += 1;
                continue;
            }
        };

        let Some(coordinates) = item
            .position
            .as_ref()
            .and_then(|p| Coordinates::new(p.lat, p.lng))
        else {
            dropped += 1;
            continue;
        };

        let contact = item.contacts.first();
        let phone = contact
            .and_then(|c| c.phone.first())
            .map(|v| v.value.clone())
            .unwrap_or_default();
        let website = contact
            .and_then(|c| c.www.first())
            .map(|v| v.value.clone())
            .unwrap_or_default();

        let draft = BusinessDraft {
            name: item.title,
            address: item.address.map(|a| a.label).unwrap_or_default(),
            search_term: term.to_string(),
            provider_categories: item
                .categories
                .into_iter()
                .map(|c| c.name)
                .filter(|n| !n.is_empty())
                .collect(),
            phone,
            website,
            rating: None,
            review_count: None,
            price: String::new(),
            distance_m: item.distance,
            metadata: raw,
        };
        records.push(BusinessRecord::new(draft, coordinates, ProviderKind::Here));
    }

    if dropped > 0 {
        tracing::warn!(dropped, term, "HERE items without a usable position were skipped");
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const DISCOVER_BODY: &str = r#"{
        "items": [
            {
                "title": "Sightglass Coffee",
                "id": "here:pds:place:840abc",
                "address": {"label": "270 7th St, San Francisco, CA 94103, United States"},
                "position": {"lat": 37.77701, "lng": -122.40848},
                "distance": 1043,
                "categories": [{"id": "100-1100-0010", "name": "Coffee Shop", "primary": true}],
                "contacts": [{"phone": [{"value": "+14158611313"}], "www": [{"value": "https://sightglass.com"}]}]
            },
            {
                "title": "No Position Cafe",
                "address": {"label": "1 Nowhere"}
            },
            {
                "title": "Ritual Coffee Roasters",
                "address": {"label": "1026 Valencia St, San Francisco, CA 94110, United States"},
                "position": {"lat": 37.75650, "lng": -122.42100}
            }
        ]
    }"#;

    fn client_for(server: &mockito::ServerGuard) -> HereClient {
        let config = HereConfig {
            api_key: None,
            base_url: server.url(),
            geocode_url: format!("{}/geocode", server.url()),
            timeout_secs: 5,
            limit: 20,
        };
        HereClient::new("test-key".to_string(), config).unwrap()
    }

    #[test]
    fn test_parse_discover_items() {
        let response: DiscoverResponse = serde_json::from_str(DISCOVER_BODY).unwrap();
        let records = parse_discover_items(response.items, "coffee shop");

        assert_eq!(records.len(), 2);
        let first = &records[0];
        assert_eq!(first.name, "Sightglass Coffee");
        assert_eq!(first.category, "Coffee Shop");
        assert_eq!(first.phone, "+14158611313");
        assert_eq!(first.website, "https://sightglass.com");
        assert_eq!(first.distance_m, Some(1043.0));
        assert_eq!(first.source, ProviderKind::Here);
        assert_eq!(
            first.metadata.get("id").and_then(Value::as_str),
            Some("here:pds:place:840abc")
        );

        // No provider category: keyword match on the name
        assert_eq!(records[1].category, "Coffee Shop");
        assert!(records[1].phone.is_empty());
    }

    #[test]
    fn test_search_geocodes_place_then_discovers() {
        let mut server = mockito::Server::new();
        let geocode = server
            .mock("GET", "/geocode")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "San Francisco, CA".into()),
                Matcher::UrlEncoded("apiKey".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items":[{"position":{"lat":37.7749,"lng":-122.4194}}]}"#)
            .create();
        let discover = server
            .mock("GET", "/discover")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "coffee shop".into()),
                Matcher::UrlEncoded("in".into(), "circle:37.7749,-122.4194;r=8045".into()),
                Matcher::UrlEncoded("limit".into(), "20".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(DISCOVER_BODY)
            .create();

        let client = client_for(&server);
        let query = SearchQuery::new(
            ["coffee shop"],
            SearchArea::Place("San Francisco, CA".to_string()),
            8045,
        )
        .unwrap();
        let results = client.search(&query).unwrap();

        geocode.assert();
        discover.assert();
        assert_eq!(results.records.len(), 2);
        assert_eq!(results.center, Coordinates::new(37.7749, -122.4194));
    }

    #[test]
    fn test_unknown_place_is_request_error() {
        let mut server = mockito::Server::new();
        let _geocode = server
            .mock("GET", "/geocode")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"items":[]}"#)
            .create();

        let client = client_for(&server);
        let query =
            SearchQuery::new(["bakery"], SearchArea::Place("Atlantis".to_string()), 1000).unwrap();
        let err = client.search(&query).unwrap_err();

        assert!(matches!(err, SearchError::ProviderRequest { provider: ProviderKind::Here, .. }));
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn test_error_status_and_bad_json() {
        let mut server = mockito::Server::new();
        let _unauthorized = server
            .mock("GET", "/discover")
            .match_query(Matcher::UrlEncoded("q".into(), "bakery".into()))
            .with_status(401)
            .create();
        let _garbage = server
            .mock("GET", "/discover")
            .match_query(Matcher::UrlEncoded("q".into(), "bar".into()))
            .with_status(200)
            .with_body("<html>not json</html>")
            .create();

        let client = client_for(&server);
        let sf = Coordinates::new(37.7749, -122.4194).unwrap();

        let query = SearchQuery::new(["bakery"], SearchArea::Point(sf), 1000).unwrap();
        let err = client.search(&query).unwrap_err();
        assert!(matches!(err, SearchError::ProviderRequest { .. }));
        assert!(err.to_string().contains("401"));

        let query = SearchQuery::new(["bar"], SearchArea::Point(sf), 1000).unwrap();
        let err = client.search(&query).unwrap_err();
        assert!(matches!(err, SearchError::Parse { .. }));
    }
}
