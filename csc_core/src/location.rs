//! Building-code lookup used when normalizing room strings.

use std::collections::HashMap;

/// Concordia SGW campus building codes and their street addresses.
static CONCORDIA_BUILDINGS: [(&str, &str); 9] = [
    ("H", "1455 de Maisonneuve Boulevard West"),
    ("LS", "1535 de Maisonneuve Boulevard West"),
    ("MB", "1450 Guy Street"),
    ("EV", "1515 Sainte-Catherine Street West"),
    ("FB", "1250 Guy Street"),
    ("GN", "1190 Guy Street"),
    ("GM", "1616 Sainte-Catherine Street West"),
    ("LB", "1400 De Maisonneuve Boulevard West"),
    ("VA", "1395 René-Lévesque Boulevard West"),
];

/// Immutable building-code to street-address table.
///
/// The table is injected into [`crate::normalize::parse_room`] instead of
/// living in a global, so tests can substitute their own codes.
#[derive(Debug, Clone)]
pub struct LocationTable {
    addresses: HashMap<String, String>,
}

impl LocationTable {
    /// Build a table from explicit code/address pairs.
    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let addresses = entries
            .into_iter()
            .map(|(code, address)| (code.into(), address.into()))
            .collect();
        Self { addresses }
    }

    /// Look up the full address for a building code.
    pub fn resolve(&self, code: &str) -> Option<&str> {
        self.addresses.get(code).map(String::as_str)
    }
}

impl Default for LocationTable {
    fn default() -> Self {
        Self::with_entries(CONCORDIA_BUILDINGS)
    }
}

#[cfg(test)]
mod tests {
    use crate::location::LocationTable;

    #[test]
    fn test_default_resolves_known_code() {
        let table = LocationTable::default();
        assert_eq!(
            table.resolve("H"),
            Some("1455 de Maisonneuve Boulevard West")
        );
        assert_eq!(table.resolve("ZZ"), None);
    }

    #[test]
    fn test_with_entries_overrides_default() {
        let table = LocationTable::with_entries([("XX", "1 Test Street")]);
        assert_eq!(table.resolve("XX"), Some("1 Test Street"));
        assert_eq!(table.resolve("H"), None);
    }
}
