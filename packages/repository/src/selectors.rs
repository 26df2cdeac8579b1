//! Read-only views over a [`Snapshot`].

use std::collections::HashSet;

use outdoor_map_unit_models::{Unit, UnitId};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::Snapshot;

/// Which derived index to read.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnitFilter {
    /// Every unit.
    #[default]
    All,
    /// Ice skating units.
    #[serde(rename = "iceskate")]
    #[strum(serialize = "iceskate")]
    IceSkate,
    /// Skiing units.
    Ski,
    /// Units that are open now.
    OpenNow,
}

impl UnitFilter {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::All, Self::IceSkate, Self::Ski, Self::OpenNow]
    }
}

/// Status narrowing applied on top of a sport filter.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatusFilter {
    /// No narrowing.
    #[default]
    All,
    /// Only units that are open now.
    OpenNow,
}

impl Snapshot {
    /// Looks up a unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.by_id().get(&id)
    }

    /// Resolves `ids` to units, in order. Unknown ids are skipped.
    #[must_use]
    pub fn units<'a>(&'a self, ids: &[UnitId]) -> Vec<&'a Unit> {
        ids.iter().filter_map(|id| self.unit(*id)).collect()
    }

    /// The index selected by `filter`.
    #[must_use]
    pub fn ids(&self, filter: UnitFilter) -> &[UnitId] {
        match filter {
            UnitFilter::All => self.all_ids(),
            UnitFilter::IceSkate => self.ice_skate_ids(),
            UnitFilter::Ski => self.ski_ids(),
            UnitFilter::OpenNow => self.open_now_ids(),
        }
    }

    /// Ids of units shown on the map for `sport`, narrowed by `status`.
    ///
    /// Keeps the order of the sport index.
    #[must_use]
    pub fn visible_ids(&self, sport: UnitFilter, status: StatusFilter) -> Vec<UnitId> {
        let ids = self.ids(sport);
        match status {
            StatusFilter::All => ids.to_vec(),
            StatusFilter::OpenNow => {
                let open: HashSet<UnitId> = self.open_now_ids().iter().copied().collect();
                ids.iter().copied().filter(|id| open.contains(id)).collect()
            }
        }
    }

    /// Units shown on the map for `sport`, narrowed by `status`.
    #[must_use]
    pub fn visible_units(&self, sport: UnitFilter, status: StatusFilter) -> Vec<&Unit> {
        self.units(&self.visible_ids(sport, status))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use serde_json::json;

    use super::*;
    use crate::NormalizedBatch;

    fn loaded() -> Snapshot {
        let batch = NormalizedBatch::from_json(&json!({
            "entities": {"unit": {
                "1": {
                    "id": 1,
                    "services": [695],
                    "observations": [
                        {"property": "ice_condition", "time": "2024-01-02T08:00:00Z", "quality": "good"}
                    ]
                },
                "2": {"id": 2, "services": [695]},
                "3": {
                    "id": 3,
                    "services": [191],
                    "observations": [
                        {"property": "ski_trail_condition", "time": "2024-01-02T08:00:00Z", "quality": "satisfactory"}
                    ]
                }
            }},
            "result": [2, 3, 1]
        }))
        .unwrap();
        Snapshot::new().on_fetch_complete(&batch)
    }

    fn raw(ids: &[UnitId]) -> Vec<u64> {
        ids.iter().map(|id| id.0).collect()
    }

    #[test]
    fn filter_parses_route_names() {
        assert_eq!(UnitFilter::from_str("iceskate").unwrap(), UnitFilter::IceSkate);
        assert_eq!(UnitFilter::from_str("open_now").unwrap(), UnitFilter::OpenNow);
        assert_eq!(UnitFilter::IceSkate.to_string(), "iceskate");
        assert!(UnitFilter::from_str("sauna").is_err());
        assert_eq!(StatusFilter::from_str("open_now").unwrap(), StatusFilter::OpenNow);
    }

    #[test]
    fn parse_errors_are_boxable() {
        let err: Box<dyn std::error::Error + Send + Sync> =
            UnitFilter::from_str("sauna").unwrap_err().into();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn ids_selects_matching_index() {
        let snapshot = loaded();
        for filter in UnitFilter::all() {
            let ids = snapshot.ids(*filter);
            match filter {
                UnitFilter::All => assert_eq!(raw(ids), vec![2, 3, 1]),
                UnitFilter::IceSkate => assert_eq!(raw(ids), vec![2, 1]),
                UnitFilter::Ski => assert_eq!(raw(ids), vec![3]),
                UnitFilter::OpenNow => assert_eq!(raw(ids), vec![3, 1]),
            }
        }
    }

    #[test]
    fn units_skips_unknown_ids() {
        let snapshot = loaded();
        let units = snapshot.units(&[UnitId(3), UnitId(42), UnitId(1)]);
        assert_eq!(units.iter().map(|u| u.id.0).collect::<Vec<_>>(), vec![3, 1]);
        assert!(snapshot.unit(UnitId(42)).is_none());
    }

    #[test]
    fn visible_units_intersects_open_now() {
        let snapshot = loaded();

        assert_eq!(
            snapshot.visible_ids(UnitFilter::IceSkate, StatusFilter::All),
            vec![UnitId(2), UnitId(1)]
        );
        assert_eq!(
            snapshot.visible_ids(UnitFilter::IceSkate, StatusFilter::OpenNow),
            vec![UnitId(1)]
        );
        assert_eq!(
            snapshot
                .visible_units(UnitFilter::All, StatusFilter::OpenNow)
                .iter()
                .map(|u| u.id.0)
                .collect::<Vec<_>>(),
            vec![3, 1]
        );
    }

    #[test]
    fn empty_snapshot_shows_nothing() {
        let snapshot = Snapshot::new();
        assert!(
            snapshot
                .visible_units(UnitFilter::All, StatusFilter::All)
                .is_empty()
        );
    }
}
