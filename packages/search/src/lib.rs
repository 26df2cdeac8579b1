#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Search suggestions over a repository snapshot.
//!
//! A query phrase is projected into two independent lists: units whose
//! name matches in the active language, and free-text addresses supplied
//! by a geocoder. Both lists are ranked the same way.

use std::sync::LazyLock;

use outdoor_map_repository::Snapshot;
use outdoor_map_unit_models::{Language, Location, Unit, resolve_attr};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Collapses runs of whitespace into a single space.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalizes a search phrase.
///
/// The pipeline:
/// 1. Trim
/// 2. Collapse whitespace
/// 3. Lowercase
///
/// Returns `None` when nothing is left to search for.
#[must_use]
pub fn normalize_query(raw: &str) -> Option<String> {
    let normalized = normalize_text(raw);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

fn normalize_text(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw.trim(), " ").to_lowercase()
}

/// A free-text address returned by the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressSuggestion {
    /// Display label, e.g. `"Mannerheimintie 5, Helsinki"`.
    pub label: String,
    /// Where the address is, if the geocoder knows.
    #[serde(default)]
    pub location: Option<Location>,
}

/// What to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionQuery {
    /// Raw phrase as typed.
    pub phrase: String,
    /// Language unit names are matched in.
    pub language: Language,
    /// Maximum number of unit suggestions.
    pub unit_limit: Option<usize>,
    /// Maximum number of address suggestions.
    pub address_limit: Option<usize>,
}

impl SuggestionQuery {
    /// Creates an unlimited query for `phrase` in `language`.
    #[must_use]
    pub fn new(phrase: impl Into<String>, language: Language) -> Self {
        Self {
            phrase: phrase.into(),
            language,
            unit_limit: None,
            address_limit: None,
        }
    }

    /// Caps the number of unit suggestions.
    #[must_use]
    pub const fn with_unit_limit(mut self, limit: usize) -> Self {
        self.unit_limit = Some(limit);
        self
    }

    /// Caps the number of address suggestions.
    #[must_use]
    pub const fn with_address_limit(mut self, limit: usize) -> Self {
        self.address_limit = Some(limit);
        self
    }
}

/// How well a candidate matches. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchRank {
    /// The whole text equals the phrase.
    Exact,
    /// The text starts with the phrase.
    Prefix,
    /// A later word starts with the phrase.
    WordPrefix,
    /// The phrase occurs somewhere else in the text.
    Substring,
}

/// Ranks `text` against an already normalized `phrase`.
///
/// Returns `None` if `text` does not contain `phrase`.
#[must_use]
pub fn match_rank(text: &str, phrase: &str) -> Option<MatchRank> {
    let text = normalize_text(text);
    if text == phrase {
        return Some(MatchRank::Exact);
    }
    if text.starts_with(phrase) {
        return Some(MatchRank::Prefix);
    }

    let mut found = false;
    for (index, _) in text.match_indices(phrase) {
        found = true;
        let starts_word = text[..index]
            .chars()
            .next_back()
            .is_some_and(|c| !c.is_alphanumeric());
        if starts_word {
            return Some(MatchRank::WordPrefix);
        }
    }

    found.then_some(MatchRank::Substring)
}

/// The two suggestion lists for one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions<'a> {
    /// Matching units, best first.
    pub units: Vec<&'a Unit>,
    /// Matching addresses, best first.
    pub addresses: Vec<&'a AddressSuggestion>,
}

impl Suggestions<'_> {
    /// Returns `true` if neither list has anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty() && self.addresses.is_empty()
    }
}

/// Projects `query` over the units of `snapshot` and `addresses`.
///
/// Units are matched against their name in the query language only; a
/// unit without a name in that language never matches. Ties keep the
/// snapshot's `all_ids` order and the geocoder's order respectively.
#[must_use]
pub fn project<'a>(
    snapshot: &'a Snapshot,
    query: &SuggestionQuery,
    addresses: &'a [AddressSuggestion],
) -> Suggestions<'a> {
    let Some(phrase) = normalize_query(&query.phrase) else {
        return Suggestions::default();
    };
    let lang = query.language.as_ref();

    let units = rank(
        snapshot.units(snapshot.all_ids()),
        |unit| resolve_attr(Some(&unit.name), lang),
        &phrase,
        query.unit_limit,
    );
    let addresses = rank(
        addresses.iter(),
        |address| Some(address.label.as_str()),
        &phrase,
        query.address_limit,
    );

    log::debug!(
        "Search '{phrase}' ({lang}): {} units, {} addresses",
        units.len(),
        addresses.len()
    );

    Suggestions { units, addresses }
}

fn rank<'a, T: 'a>(
    candidates: impl IntoIterator<Item = &'a T>,
    text: impl Fn(&T) -> Option<&str>,
    phrase: &str,
    limit: Option<usize>,
) -> Vec<&'a T> {
    let mut matched: Vec<(MatchRank, &'a T)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            text(candidate)
                .and_then(|t| match_rank(t, phrase))
                .map(|rank| (rank, candidate))
        })
        .collect();

    // Stable: equal ranks keep source order.
    matched.sort_by_key(|(rank, _)| *rank);

    matched
        .into_iter()
        .map(|(_, candidate)| candidate)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

#[cfg(test)]
mod tests {
    use outdoor_map_repository::NormalizedBatch;
    use serde_json::json;

    use super::*;

    fn snapshot() -> Snapshot {
        let batch = NormalizedBatch::from_json(&json!({
            "entities": {"unit": {
                "1": {"id": 1, "name": {"fi": "Kallion tekojää"}},
                "2": {"id": 2, "name": {"fi": "Jäähalli"}},
                "3": {"id": 3, "name": {"fi": "Pirkkolan jää-areena", "sv": "Britas isarena"}},
                "4": {"id": 4, "name": {"fi": "Jää"}},
                "5": {"id": 5, "name": {"sv": "Isbanan"}}
            }},
            "result": [1, 2, 3, 4, 5]
        }))
        .unwrap();
        Snapshot::new().on_fetch_complete(&batch)
    }

    fn unit_ids(suggestions: &Suggestions<'_>) -> Vec<u64> {
        suggestions.units.iter().map(|u| u.id.0).collect()
    }

    #[test]
    fn normalizes_queries() {
        assert_eq!(normalize_query("  Jää   Halli "), Some("jää halli".to_string()));
        assert_eq!(normalize_query("TEKOJÄÄ"), Some("tekojää".to_string()));
        assert_eq!(normalize_query(""), None);
        assert_eq!(normalize_query(" \t\n "), None);
    }

    #[test]
    fn ranks_matches() {
        assert_eq!(match_rank("Jää", "jää"), Some(MatchRank::Exact));
        assert_eq!(match_rank("Jäähalli", "jää"), Some(MatchRank::Prefix));
        assert_eq!(match_rank("Pirkkolan jää-areena", "jää"), Some(MatchRank::WordPrefix));
        assert_eq!(match_rank("Kallion tekojää", "jää"), Some(MatchRank::Substring));
        assert_eq!(match_rank("Uimaranta", "jää"), None);
    }

    #[test]
    fn word_prefix_found_after_earlier_substring() {
        assert_eq!(match_rank("tekojää jää", "jää"), Some(MatchRank::WordPrefix));
    }

    #[test]
    fn empty_query_yields_nothing() {
        let snapshot = snapshot();
        let addresses = vec![AddressSuggestion {
            label: "Jääkärinkatu 1".to_string(),
            location: None,
        }];

        for phrase in ["", "   "] {
            let suggestions =
                project(&snapshot, &SuggestionQuery::new(phrase, Language::Fi), &addresses);
            assert!(suggestions.is_empty());
        }
    }

    #[test]
    fn units_ranked_then_in_source_order() {
        let snapshot = snapshot();
        let suggestions = project(&snapshot, &SuggestionQuery::new("JÄÄ", Language::Fi), &[]);

        assert_eq!(unit_ids(&suggestions), vec![4, 2, 3, 1]);
    }

    #[test]
    fn units_without_name_in_language_never_match() {
        let snapshot = snapshot();

        let fi = project(&snapshot, &SuggestionQuery::new("isbanan", Language::Fi), &[]);
        assert!(fi.units.is_empty());

        let sv = project(&snapshot, &SuggestionQuery::new("is", Language::Sv), &[]);
        assert_eq!(unit_ids(&sv), vec![5, 3]);
    }

    #[test]
    fn addresses_ranked_independently() {
        let snapshot = snapshot();
        let addresses = vec![
            AddressSuggestion {
                label: "Keskuskatu 3, Helsinki".to_string(),
                location: None,
            },
            AddressSuggestion {
                label: "Helsingintie 2, Vantaa".to_string(),
                location: Some(Location::new(25.0, 60.3)),
            },
        ];

        let suggestions = project(
            &snapshot,
            &SuggestionQuery::new("helsin", Language::Fi),
            &addresses,
        );

        assert!(suggestions.units.is_empty());
        assert_eq!(
            suggestions
                .addresses
                .iter()
                .map(|a| a.label.as_str())
                .collect::<Vec<_>>(),
            vec!["Helsingintie 2, Vantaa", "Keskuskatu 3, Helsinki"]
        );
    }

    #[test]
    fn limits_apply_per_list() {
        let snapshot = snapshot();
        let addresses = vec![
            AddressSuggestion {
                label: "Jäähallintie 1".to_string(),
                location: None,
            },
            AddressSuggestion {
                label: "Jääkärinkatu 2".to_string(),
                location: None,
            },
        ];

        let query = SuggestionQuery::new("jää", Language::Fi)
            .with_unit_limit(2)
            .with_address_limit(1);
        let suggestions = project(&snapshot, &query, &addresses);

        assert_eq!(unit_ids(&suggestions), vec![4, 2]);
        assert_eq!(suggestions.addresses.len(), 1);
        assert_eq!(suggestions.addresses[0].label, "Jäähallintie 1");
    }

    #[test]
    fn addresses_deserialize_without_location() {
        let address: AddressSuggestion =
            serde_json::from_value(json!({"label": "Kauppatori"})).unwrap();
        assert_eq!(address.location, None);
    }
}
