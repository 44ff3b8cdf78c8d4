//! Definition model
//!
//! A [`Definition`] is what a single lookup produces: entries (one per
//! headword interpretation), each holding senses, each holding plain-text
//! definitions. Order is exactly what the provider returned.

use serde::{Deserialize, Serialize};

/// Result of one lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    entries: Vec<Entry>,
}

impl Definition {
    /// Create a definition from provider-ordered entries
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// A definition with no entries (backend found nothing)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entries in provider order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// `true` when the backend found nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All definition strings, entry by entry and sense by sense
    pub fn definitions(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .flat_map(Entry::senses)
            .flat_map(Sense::definitions)
            .map(String::as_str)
    }
}

impl FromIterator<Entry> for Definition {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// One headword interpretation, e.g. one part of speech
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    senses: Vec<Sense>,
}

impl Entry {
    pub fn new(senses: Vec<Sense>) -> Self {
        Self { senses }
    }

    pub fn senses(&self) -> &[Sense] {
        &self.senses
    }
}

impl FromIterator<Sense> for Entry {
    fn from_iter<I: IntoIterator<Item = Sense>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// One meaning within an entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    definitions: Vec<String>,
}

impl Sense {
    pub fn new(definitions: Vec<String>) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &[String] {
        &self.definitions
    }
}

impl<S: Into<String>> FromIterator<S> for Sense {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_definition() {
        let def = Definition::empty();
        assert!(def.is_empty());
        assert_eq!(def.definitions().count(), 0);
    }

    #[test]
    fn test_flatten_keeps_order_and_duplicates() {
        let def = Definition::new(vec![
            Entry::new(vec![
                Sense::from_iter(["a greeting", "a greeting"]),
                Sense::from_iter(["an exclamation"]),
            ]),
            Entry::new(vec![Sense::from_iter(["to say hello"])]),
        ]);

        let flat: Vec<&str> = def.definitions().collect();
        assert_eq!(
            flat,
            vec!["a greeting", "a greeting", "an exclamation", "to say hello"]
        );
    }

    #[test]
    fn test_entries_with_no_senses_are_kept() {
        let def: Definition = [Entry::default(), Entry::new(vec![Sense::default()])]
            .into_iter()
            .collect();

        assert_eq!(def.entries().len(), 2);
        assert!(!def.is_empty());
        assert_eq!(def.definitions().count(), 0);
    }
}
