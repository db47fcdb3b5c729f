use crate::domain::{BusinessRecord, Coordinates, ProviderKind};
use crate::error::SearchError;

/// Recoverable provider failure surfaced to the user
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderWarning {
    pub provider: ProviderKind,
    pub message: String,
}

impl ProviderWarning {
    pub fn from_error(provider: ProviderKind, error: &SearchError) -> Self {
        Self {
            provider,
            message: error.to_string(),
        }
    }
}

/// Ordered records for one query, plus the warnings raised building them
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<BusinessRecord>,
    warnings: Vec<ProviderWarning>,
    origin: Option<Coordinates>,
}

impl ResultSet {
    pub fn new(records: Vec<BusinessRecord>) -> Self {
        Self {
            records,
            warnings: Vec::new(),
            origin: None,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<ProviderWarning>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_origin(mut self, origin: Option<Coordinates>) -> Self {
        self.origin = origin;
        self
    }

    pub fn records(&self) -> &[BusinessRecord] {
        &self.records
    }

    pub fn warnings(&self) -> &[ProviderWarning] {
        &self.warnings
    }

    /// Search center, either given by the user or resolved by a provider
    pub fn origin(&self) -> Option<Coordinates> {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BusinessRecord> {
        self.records.iter()
    }

    /// Replace the records, keeping warnings and origin
    pub fn replace_records(&self, records: Vec<BusinessRecord>) -> Self {
        Self {
            records,
            warnings: self.warnings.clone(),
            origin: self.origin,
        }
    }

    /// Record counts per category label, in first-seen order
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for record in &self.records {
            match counts.iter_mut().find(|(label, _)| *label == record.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((record.category.clone(), 1)),
            }
        }
        counts
    }

    /// Drop records that repeat an earlier record's business.
    ///
    /// Two records are the same business when their names match after
    /// normalization and they lie within `max_distance_m` of each other.
    /// The first occurrence wins.
    pub fn dedup_nearby(&self, max_distance_m: f64) -> Self {
        let mut kept: Vec<BusinessRecord> = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let key = normalize_name(&record.name);
            let duplicate = kept.iter().any(|k| {
                normalize_name(&k.name) == key
                    && k.coordinates.distance_to(&record.coordinates) <= max_distance_m
            });
            if !duplicate {
                kept.push(record.clone());
            }
        }
        self.replace_records(kept)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a BusinessRecord;
    type IntoIter = std::slice::Iter<'a, BusinessRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
