use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::domain::{AddressType, BusinessRecord, Coordinates, ResultSet};

/// Two-letter state code at the start of an address segment, e.g. `CA 94103`
static STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{2})\b").expect("state pattern is valid"));

/// Street-type words that end the street part of a `street city` run
const STREET_SUFFIXES: &[&str] = &[
    "st", "street", "ave", "avenue", "blvd", "boulevard", "rd", "road", "dr", "drive", "ln",
    "lane", "way", "pl", "place", "ct", "court", "hwy", "highway", "pkwy", "parkway", "ter",
    "cir", "sq", "bldg", "ste", "suite", "fl", "floor", "unit",
];

/// User-selected filters; every unset field lets all records through
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Category labels or search terms to keep (case-insensitive)
    pub categories: Vec<String>,
    /// Distance bound in meters from the result set's origin
    pub max_distance_m: Option<f64>,
    pub address_type: Option<AddressType>,
    /// `City, ST` values to keep
    pub localities: Vec<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.max_distance_m.is_none()
            && self.address_type.is_none()
            && self.localities.is_empty()
    }
}

/// Extract the `City, ST` fragment of an address.
///
/// Uses the last comma-separated segment that starts with a state code and
/// takes the city from the segment before it. Addresses joined without a
/// comma after the street (`270 7th St San Francisco, CA`) lose everything
/// up to the last house number or street-type word.
pub fn extract_locality(address: &str) -> Option<String> {
    let segments: Vec<&str> = address.split(',').map(str::trim).collect();
    (1..segments.len()).rev().find_map(|i| {
        let state = STATE_RE.captures(segments[i])?.get(1)?.as_str();
        let city = city_from_segment(segments[i - 1])?;
        Some(format!("{}, {}", city, state))
    })
}

fn city_from_segment(segment: &str) -> Option<String> {
    let tokens: Vec<&str> = segment.split_whitespace().collect();
    // A leading suffix-like word is part of the name (`St Paul`)
    let start = tokens
        .iter()
        .enumerate()
        .rposition(|(i, token)| {
            token.chars().any(|c| c.is_ascii_digit())
                || token.starts_with('#')
                || (i > 0 && is_street_suffix(token))
        })
        .map_or(0, |i| i + 1);

    let city = tokens[start..].join(" ");
    city.starts_with(char::is_alphabetic).then_some(city)
}

fn is_street_suffix(token: &str) -> bool {
    let word = token.trim_end_matches('.').to_lowercase();
    STREET_SUFFIXES.contains(&word.as_str())
}

/// Locality of a record, preferring the structured address the provider
/// returned over parsing the display address
pub fn record_locality(record: &BusinessRecord) -> Option<String> {
    structured_locality(record).or_else(|| extract_locality(&record.address))
}

fn structured_locality(record: &BusinessRecord) -> Option<String> {
    // Yelp: location.{city,state}; HERE: address.{city,stateCode}
    let (section, state_key) = match record.metadata.get("location") {
        Some(Value::Object(_)) => ("location", "state"),
        _ => ("address", "stateCode"),
    };
    let section = record.metadata.get(section)?.as_object()?;
    let city = section.get("city")?.as_str()?.trim();
    let state = section.get(state_key)?.as_str()?.trim();
    if city.is_empty() || state.len() != 2 {
        return None;
    }
    Some(format!("{}, {}", city, state.to_uppercase()))
}

/// Distance from `origin` when known, otherwise what the provider reported
pub fn record_distance(record: &BusinessRecord, origin: Option<&Coordinates>) -> Option<f64> {
    origin
        .map(|o| o.distance_to(&record.coordinates))
        .or(record.distance_m)
}

/// Keep the records matching every criterion, preserving input order.
///
/// When a distance bound is set, records whose distance cannot be
/// determined are dropped.
pub fn filter_results(results: &ResultSet, criteria: &FilterCriteria) -> ResultSet {
    let origin = results.origin();
    let kept: Vec<BusinessRecord> = results
        .iter()
        .filter(|record| matches(record, criteria, origin.as_ref()))
        .cloned()
        .collect();
    results.replace_records(kept)
}

fn matches(record: &BusinessRecord, criteria: &FilterCriteria, origin: Option<&Coordinates>) -> bool {
    if !criteria.categories.is_empty()
        && !criteria.categories.iter().any(|c| {
            let c = c.trim();
            c.eq_ignore_ascii_case(&record.category) || c.eq_ignore_ascii_case(&record.search_term)
        })
    {
        return false;
    }

    if let Some(address_type) = criteria.address_type
        && record.address_type != address_type
    {
        return false;
    }

    if let Some(max) = criteria.max_distance_m {
        match record_distance(record, origin) {
            Some(d) if d <= max => {}
            _ => return false,
        }
    }

    if !criteria.localities.is_empty() {
        let Some(locality) = record_locality(record) else {
            return false;
        };
        if !criteria
            .localities
            .iter()
            .any(|l| l.trim().eq_ignore_ascii_case(&locality))
        {
            return false;
        }
    }

    true
}
