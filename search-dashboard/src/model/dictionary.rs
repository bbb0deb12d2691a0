//! Synonym dictionary entries

use serde::{Deserialize, Serialize};

/// A keyword with its definition and synonyms.
///
/// Synonyms are unique and keep their first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEntry")]
pub struct DictionaryEntry {
    pub keyword: String,
    pub definition: String,
    pub synonyms: Vec<String>,
}

#[derive(Deserialize)]
struct RawEntry {
    keyword: String,
    #[serde(default)]
    definition: String,
    #[serde(default)]
    synonyms: Vec<String>,
}

impl From<RawEntry> for DictionaryEntry {
    fn from(raw: RawEntry) -> Self {
        DictionaryEntry::new(raw.keyword, raw.definition, raw.synonyms)
    }
}

impl DictionaryEntry {
    pub fn new<I, S>(keyword: impl Into<String>, definition: impl Into<String>, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for synonym in synonyms {
            let synonym = synonym.into().trim().to_string();
            if !synonym.is_empty() && !unique.contains(&synonym) {
                unique.push(synonym);
            }
        }

        Self {
            keyword: keyword.into().trim().to_string(),
            definition: definition.into(),
            synonyms: unique,
        }
    }

    /// Keyword equality under Unicode lower-casing, the normalisation
    /// applied to the primary token of a phrase
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keyword.to_lowercase() == keyword.to_lowercase()
    }

    /// Case-insensitive substring match on keyword, definition or any synonym
    pub fn matches(&self, query_lower: &str) -> bool {
        self.keyword.to_lowercase().contains(query_lower)
            || self.definition.to_lowercase().contains(query_lower)
            || self
                .synonyms
                .iter()
                .any(|s| s.to_lowercase().contains(query_lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonyms_deduplicated_in_order() {
        let entry = DictionaryEntry::new("cat", "feline", ["kitty", "tomcat", "kitty", " ", "puss"]);
        assert_eq!(entry.synonyms, vec!["kitty", "tomcat", "puss"]);
    }

    #[test]
    fn test_deserialize_normalizes() {
        let entry: DictionaryEntry = serde_json::from_value(serde_json::json!({
            "keyword": " cat ",
            "definition": "feline",
            "synonyms": ["kitty", "kitty"]
        }))
        .unwrap();
        assert_eq!(entry.keyword, "cat");
        assert_eq!(entry.synonyms, vec!["kitty"]);
    }

    #[test]
    fn test_matches() {
        let entry = DictionaryEntry::new("Cat", "A small Feline", ["Kitty"]);
        assert!(entry.matches("cat"));
        assert!(entry.matches("feline"));
        assert!(entry.matches("kit"));
        assert!(!entry.matches("dog"));
    }

    #[test]
    fn test_has_keyword_folds_unicode_case() {
        let entry = DictionaryEntry::new("Éclair", "Choux pastry", ["choux"]);
        assert!(entry.has_keyword("éclair"));
        assert!(entry.has_keyword("ÉCLAIR"));
        assert!(!entry.has_keyword("eclair"));
    }
}
