/// Keyword lookup used when a provider supplies no category.
/// Earlier rows take priority over later ones.
const KEYWORD_TABLE: &[(&str, &[&str])] = &[
    (
        "Coffee Shop",
        &["coffee", "cafe", "café", "espresso", "roastery", "roasters"],
    ),
    ("Bakery", &["bakery", "bakeries", "patisserie", "bakehouse"]),
    (
        "Restaurant",
        &[
            "restaurant",
            "restaurants",
            "diner",
            "bistro",
            "grill",
            "eatery",
            "pizza",
            "pizzeria",
            "sushi",
            "taqueria",
        ],
    ),
    ("Bar", &["bar", "pub", "tavern", "brewery", "taproom", "saloon"]),
    (
        "Law Firm",
        &["law", "lawyer", "lawyers", "attorney", "attorneys", "legal", "paralegal"],
    ),
    ("Marketing Agency", &["marketing", "advertising", "branding"]),
    (
        "Auto Repair",
        &["auto", "automotive", "mechanic", "garage", "tire", "tires"],
    ),
    ("Hotel", &["hotel", "motel", "inn", "lodge", "hostel"]),
    ("Grocery", &["grocery", "supermarket", "deli"]),
    ("Fitness", &["gym", "fitness", "yoga", "pilates", "crossfit"]),
    ("Salon", &["salon", "barber", "barbershop", "spa"]),
    (
        "Medical",
        &["clinic", "dental", "dentist", "doctor", "medical", "pharmacy", "hospital"],
    ),
    ("Retail", &["store", "shop", "boutique", "outlet"]),
];

const UNCATEGORIZED: &str = "Uncategorized";

/// Pick a category label for a business.
///
/// Order of precedence:
/// 1. First non-blank provider category
/// 2. Keyword match on the business name
/// 3. Keyword match on the search term
/// 4. The search term itself
pub fn category_label(provider_categories: &[String], name: &str, search_term: &str) -> String {
    if let Some(category) = provider_categories
        .iter()
        .map(|c| c.trim())
        .find(|c| !c.is_empty())
    {
        return category.to_string();
    }

    if let Some(label) = keyword_match(name).or_else(|| keyword_match(search_term)) {
        return label.to_string();
    }

    let term = search_term.trim();
    if term.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        term.to_string()
    }
}

/// Match whole words of `text` against the keyword table
fn keyword_match(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }

    KEYWORD_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| words.contains(k)))
        .map(|(label, _)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_category_wins() {
        let categories = vec!["  ".to_string(), "Espresso Bar".to_string()];
        assert_eq!(
            category_label(&categories, "Joe's Pizza", "pizza"),
            "Espresso Bar"
        );
    }

    #[test]
    fn test_keyword_match_on_name_then_term() {
        assert_eq!(category_label(&[], "Tartine Bakery", "coffee shop"), "Bakery");
        assert_eq!(category_label(&[], "Sightglass", "coffee shop"), "Coffee Shop");
        assert_eq!(category_label(&[], "Café Reveille", ""), "Coffee Shop");
    }

    #[test]
    fn test_whole_words_only() {
        // "barber" must not be read as "bar"
        assert_eq!(category_label(&[], "Fade Barbershop", ""), "Salon");
        assert_eq!(category_label(&[], "Barnaby & Co", "accountants"), "accountants");
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(category_label(&[], "Acme", "Paralegal"), "Law Firm");
        assert_eq!(category_label(&[], "Acme", "Accountant"), "Accountant");
        assert_eq!(category_label(&[], "Acme", "  "), "Uncategorized");
    }

    #[test]
    fn test_deterministic() {
        let first = category_label(&[], "Detroit Auto Works", "mechanic");
        let second = category_label(&[], "Detroit Auto Works", "mechanic");
        assert_eq!(first, second);
        assert_eq!(first, "Auto Repair");
    }
}
