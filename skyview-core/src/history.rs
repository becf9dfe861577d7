use serde::{Deserialize, Serialize};

pub const MAX_RECENT_SEARCHES: usize = 5;

/// Most-recent-first list of `"Name, CountryCode"` entries, distinct and capped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RecentSearches {
    entries: Vec<String>,
}

impl RecentSearches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `name` unless it is already present. Returns whether the list changed.
    pub fn record(&mut self, name: &str) -> bool {
        if self.entries.iter().any(|e| e == name) {
            return false;
        }

        self.entries.insert(0, name.to_string());
        self.entries.truncate(MAX_RECENT_SEARCHES);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalises a stored list: keeps the first occurrence of each entry, at most five.
impl From<Vec<String>> for RecentSearches {
    fn from(stored: Vec<String>) -> Self {
        let mut entries: Vec<String> = Vec::with_capacity(MAX_RECENT_SEARCHES);
        for entry in stored {
            if entries.len() == MAX_RECENT_SEARCHES {
                break;
            }
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        Self { entries }
    }
}

impl From<RecentSearches> for Vec<String> {
    fn from(history: RecentSearches) -> Self {
        history.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_prepends_new_entries() {
        let mut history = RecentSearches::new();
        assert!(history.record("Paris, FR"));
        assert!(history.record("Oslo, NO"));

        assert_eq!(history.entries(), ["Oslo, NO", "Paris, FR"]);
    }

    #[test]
    fn record_ignores_duplicates_without_reordering() {
        let mut history = RecentSearches::new();
        history.record("Paris, FR");
        history.record("Oslo, NO");

        assert!(!history.record("Paris, FR"));
        assert_eq!(history.entries(), ["Oslo, NO", "Paris, FR"]);
    }

    #[test]
    fn oldest_entry_is_evicted() {
        let mut history = RecentSearches::new();
        for city in ["A", "B", "C", "D", "E", "F"] {
            history.record(city);
        }

        assert_eq!(history.len(), MAX_RECENT_SEARCHES);
        assert_eq!(history.entries(), ["F", "E", "D", "C", "B"]);
    }

    #[test]
    fn never_exceeds_cap_or_duplicates() {
        let mut history = RecentSearches::new();
        let names = ["A", "B", "A", "C", "D", "B", "E", "F", "G", "A", "G"];
        for name in names {
            history.record(name);

            assert!(history.len() <= MAX_RECENT_SEARCHES);
            let mut sorted = history.entries().to_vec();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), history.len());
        }
    }

    #[test]
    fn clear_empties_the_list() {
        let mut history = RecentSearches::new();
        history.record("Paris, FR");
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.get(0), None);
    }

    #[test]
    fn stored_json_is_normalised() {
        let history: RecentSearches =
            serde_json::from_str(r#"["A","B","A","C","D","E","F"]"#).unwrap();

        assert_eq!(history.entries(), ["A", "B", "C", "D", "E"]);
        assert_eq!(serde_json::to_string(&history).unwrap(), r#"["A","B","C","D","E"]"#);
    }
}
