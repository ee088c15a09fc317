//! Resolved text lookup capability passed into windows at construction.

use std::{collections::HashMap, rc::Rc};

/// Resolves a UI text key to display text.
pub trait TextLookup {
    /// Returns the text for `key`, or the key itself when it is unknown.
    fn text(&self, key: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
/// Lookup that echoes every key.
pub struct NoopTextLookup;

impl TextLookup for NoopTextLookup {
    fn text(&self, key: &str) -> String {
        key.to_string()
    }
}

#[derive(Debug, Clone, Default)]
/// Immutable in-memory text table.
pub struct MemoryTextLookup {
    entries: Rc<HashMap<String, String>>,
}

impl MemoryTextLookup {
    /// Builds a table from `(key, text)` pairs.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Rc::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl TextLookup for MemoryTextLookup {
    fn text(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_lookup_falls_back_to_key() {
        let text = MemoryTextLookup::from_entries([("list_empty", "No objects")]);
        assert_eq!(text.text("list_empty"), "No objects");
        assert_eq!(text.text("layer_all"), "layer_all");
        assert_eq!(NoopTextLookup.text("x"), "x");
    }
}
