use crate::domain::Coordinates;
use crate::error::SearchError;

/// Primary term plus up to four additional terms
pub const MAX_TERMS: usize = 5;
/// Largest radius both providers accept
pub const MAX_RADIUS_M: u32 = 40_000;
pub const METERS_PER_MILE: u32 = 1609;

/// Where to search: a free-text place or explicit coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum SearchArea {
    Place(String),
    Point(Coordinates),
}

impl SearchArea {
    pub fn describe(&self) -> String {
        match self {
            SearchArea::Place(place) => place.clone(),
            SearchArea::Point(coords) => coords.to_string(),
        }
    }
}

/// A validated business search
#[derive(Debug, Clone)]
pub struct SearchQuery {
    terms: Vec<String>,
    area: SearchArea,
    radius_m: u32,
    limit: Option<u32>,
}

impl SearchQuery {
    /// Build a query from raw user input.
    ///
    /// Blank terms are dropped; duplicates (case-insensitive) keep their
    /// first position.
    pub fn new(
        terms: impl IntoIterator<Item = impl AsRef<str>>,
        area: SearchArea,
        radius_m: u32,
    ) -> Result<Self, SearchError> {
        let mut cleaned: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim();
            if term.is_empty() {
                continue;
            }
            if cleaned.iter().any(|t| t.eq_ignore_ascii_case(term)) {
                continue;
            }
            cleaned.push(term.to_string());
        }

        if cleaned.is_empty() {
            return Err(SearchError::config("a primary business category is required"));
        }
        if cleaned.len() > MAX_TERMS {
            return Err(SearchError::config(format!(
                "at most {} search categories are supported, got {}",
                MAX_TERMS,
                cleaned.len()
            )));
        }
        if let SearchArea::Place(place) = &area
            && place.trim().is_empty()
        {
            return Err(SearchError::config("a search location is required"));
        }
        if radius_m == 0 || radius_m > MAX_RADIUS_M {
            return Err(SearchError::config(format!(
                "radius must be between 1 and {} meters, got {}",
                MAX_RADIUS_M, radius_m
            )));
        }

        let area = match area {
            SearchArea::Place(place) => SearchArea::Place(place.trim().to_string()),
            point => point,
        };

        Ok(Self {
            terms: cleaned,
            area,
            radius_m,
            limit: None,
        })
    }

    /// Cap the results requested per provider and term
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit.max(1));
        self
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn primary_term(&self) -> &str {
        &self.terms[0]
    }

    pub fn area(&self) -> &SearchArea {
        &self.area
    }

    pub fn radius_m(&self) -> u32 {
        self.radius_m
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Search center when the user gave coordinates
    pub fn origin(&self) -> Option<Coordinates> {
        match self.area {
            SearchArea::Point(coords) => Some(coords),
            SearchArea::Place(_) => None,
        }
    }
}

pub fn miles_to_meters(miles: u32) -> u32 {
    miles * METERS_PER_MILE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(s: &str) -> SearchArea {
        SearchArea::Place(s.to_string())
    }

    #[test]
    fn test_terms_are_cleaned() {
        let query = SearchQuery::new(
            ["Coffee Shop", "  ", "bakery", "coffee shop"],
            place(" Detroit, MI "),
            8045,
        )
        .unwrap();

        assert_eq!(query.terms(), ["Coffee Shop", "bakery"]);
        assert_eq!(query.primary_term(), "Coffee Shop");
        assert_eq!(query.area(), &place("Detroit, MI"));
        assert_eq!(query.limit(), None);
        assert_eq!(query.with_limit(0).limit(), Some(1));
    }

    #[test]
    fn test_rejects_invalid_input() {
        let no_terms: [&str; 1] = [""];
        assert!(SearchQuery::new(no_terms, place("Detroit, MI"), 1000).is_err());
        assert!(SearchQuery::new(["law firm"], place("  "), 1000).is_err());
        assert!(SearchQuery::new(["law firm"], place("Detroit"), 0).is_err());
        assert!(SearchQuery::new(["law firm"], place("Detroit"), MAX_RADIUS_M + 1).is_err());
        assert!(SearchQuery::new(["a", "b", "c", "d", "e", "f"], place("Detroit"), 1000).is_err());
    }

    #[test]
    fn test_origin_only_for_points() {
        let sf = Coordinates::new(37.7749, -122.4194).unwrap();
        let query = SearchQuery::new(["coffee"], SearchArea::Point(sf), 1000).unwrap();
        assert_eq!(query.origin(), Some(sf));

        let query = SearchQuery::new(["coffee"], place("San Francisco"), 1000).unwrap();
        assert_eq!(query.origin(), None);
    }

    #[test]
    fn test_miles_to_meters() {
        assert_eq!(miles_to_meters(5), 8045);
        assert_eq!(miles_to_meters(25), 40225);
    }
}
