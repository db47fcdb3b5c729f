use crate::domain::AddressType;

/// Substrings that mark an address as commercial premises
const COMMERCIAL_INDICATORS: &[&str] = &[
    "suite",
    "ste",
    "unit",
    "floor",
    "fl",
    "#",
    "plaza",
    "mall",
    "building",
    "bldg",
    "office",
    "commercial",
    "industrial",
    "shopping center",
    "retail",
    "store",
    "shop",
];

/// Classify an address as commercial or residential.
///
/// Matching is a case-insensitive substring test, so short indicators like
/// `fl` also fire inside longer words.
pub fn classify_address(address: &str) -> AddressType {
    let lower = address.to_lowercase();
    if COMMERCIAL_INDICATORS
        .iter()
        .any(|indicator| lower.contains(indicator))
    {
        AddressType::Commercial
    } else {
        AddressType::Residential
    }
}
