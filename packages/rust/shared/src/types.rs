//! Core domain types for the SheetFAQ question/answer table.

use std::collections::BTreeMap;

/// Normalize text for table keys and incoming queries: trim surrounding
/// whitespace and lowercase.
///
/// Table keys and queries MUST go through this same function. If they ever
/// diverge, exact and keyword matching silently degrade.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// The in-memory question-to-answer table.
///
/// Keys are normalized on insert and inserting an existing key overwrites
/// the previous answer, so later-loaded sources win on collision. The table
/// is built once at startup and only read afterwards; iteration order is
/// deterministic (sorted by key).
#[derive(Debug, Clone, Default)]
pub struct QaTable {
    entries: BTreeMap<String, String>,
}

impl QaTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a question/answer pair. The question is normalized and the
    /// answer trimmed. Returns the previous answer if the normalized
    /// question was already present.
    pub fn insert(&mut self, question: &str, answer: &str) -> Option<String> {
        self.entries
            .insert(normalize(question), answer.trim().to_string())
    }

    /// Look up an answer by an already-normalized key.
    pub fn get(&self, normalized_question: &str) -> Option<&str> {
        self.entries.get(normalized_question).map(String::as_str)
    }

    /// Iterate over (question, answer) pairs in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no source contributed any rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Hello World  "), "hello world");
        assert_eq!(normalize("hello"), "hello");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn insert_normalizes_key_and_trims_answer() {
        let mut table = QaTable::new();
        table.insert("  What Is Your Name? ", "  Bot  ");
        assert_eq!(table.get("what is your name?"), Some("Bot"));
        assert_eq!(table.get("What Is Your Name?"), None);
    }

    #[test]
    fn insert_overwrites_on_collision() {
        let mut table = QaTable::new();
        assert!(table.insert("How to login", "old answer").is_none());
        let previous = table.insert("HOW TO LOGIN", "new answer");
        assert_eq!(previous.as_deref(), Some("old answer"));
        assert_eq!(table.get("how to login"), Some("new answer"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn entries_iterate_in_key_order() {
        let mut table = QaTable::new();
        table.insert("zebra", "z");
        table.insert("apple", "a");
        let keys: Vec<&str> = table.entries().map(|(q, _)| q).collect();
        assert_eq!(keys, vec!["apple", "zebra"]);
    }
}
