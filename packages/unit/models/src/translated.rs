//! Translated attribute bags and their resolution to a single string.
//!
//! Unit names, addresses and observation values arrive as language-keyed
//! maps that are rarely complete. Resolution never fails: a missing
//! translation resolves to `None` (or `""`), it is never guessed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Language;

/// A language-keyed attribute bag, e.g. `{"fi": "Kumpulan tekojää", "sv": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translated(BTreeMap<String, String>);

impl Translated {
    /// Creates an empty bag.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the raw value stored for `lang`, if any.
    #[must_use]
    pub fn get(&self, lang: &str) -> Option<&str> {
        self.0.get(lang).map(String::as_str)
    }

    /// Returns `true` if no language has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(language code, value)` pairs in language-code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Translated {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Resolves `bag` to the value for exactly `lang`.
///
/// Returns `None` when the bag is absent, the language is missing, or the
/// stored value is empty.
#[must_use]
pub fn resolve_attr<'a>(bag: Option<&'a Translated>, lang: &str) -> Option<&'a str> {
    bag?.get(lang).filter(|value| !value.is_empty())
}

/// Like [`resolve_attr`], with `""` as the fallback.
#[must_use]
pub fn resolve_attr_or_default<'a>(bag: Option<&'a Translated>, lang: &str) -> &'a str {
    resolve_attr(bag, lang).unwrap_or_default()
}

/// Resolves `bag` for display: `lang` first, then every supported
/// [`Language`] in declaration order.
///
/// Only values that actually exist in the bag are returned.
#[must_use]
pub fn resolve_attr_with_fallback<'a>(bag: Option<&'a Translated>, lang: &str) -> Option<&'a str> {
    resolve_attr(bag, lang).or_else(|| {
        Language::all()
            .iter()
            .find_map(|fallback| resolve_attr(bag, fallback.as_ref()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(pairs: &[(&str, &str)]) -> Translated {
        pairs.iter().copied().collect()
    }

    #[test]
    fn resolves_requested_language() {
        let name = bag(&[("fi", "Nimi"), ("sv", "Namn")]);
        assert_eq!(resolve_attr(Some(&name), "sv"), Some("Namn"));
    }

    #[test]
    fn missing_language_falls_back_to_empty() {
        let name = bag(&[("fi", "Nimi")]);
        assert_eq!(resolve_attr(Some(&name), "sv"), None);
        assert_eq!(resolve_attr_or_default(Some(&name), "sv"), "");
    }

    #[test]
    fn absent_bag_resolves_to_none() {
        assert_eq!(resolve_attr(None, "fi"), None);
        assert_eq!(resolve_attr_or_default(None, "fi"), "");
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let name = bag(&[("fi", ""), ("sv", "Namn")]);
        assert_eq!(resolve_attr(Some(&name), "fi"), None);
        assert_eq!(resolve_attr_with_fallback(Some(&name), "fi"), Some("Namn"));
    }

    #[test]
    fn display_fallback_prefers_supported_language_order() {
        let name = bag(&[("en", "Name"), ("sv", "Namn")]);
        assert_eq!(resolve_attr_with_fallback(Some(&name), "fi"), Some("Namn"));
        assert_eq!(resolve_attr_with_fallback(Some(&name), "en"), Some("Name"));
    }

    #[test]
    fn display_fallback_does_not_use_unsupported_languages() {
        let name = bag(&[("de", "Name")]);
        assert_eq!(resolve_attr_with_fallback(Some(&name), "fi"), None);
    }

    #[test]
    fn deserializes_from_plain_object() {
        let name: Translated = serde_json::from_value(serde_json::json!({
            "fi": "Nimi",
            "en": "Name"
        }))
        .unwrap();
        assert_eq!(name.get("en"), Some("Name"));
        assert_eq!(name.iter().count(), 2);
    }
}
