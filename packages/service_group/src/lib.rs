#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Static partition of service types into activity groups.
//!
//! Each group is defined in a TOML file under `groups/` and embedded at
//! compile time. A unit belongs to a group when any of its service ids is
//! in the group's set. Membership checks are hash-set lookups.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use outdoor_map_unit_models::{ServiceId, Unit};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Activity groups units are classified into.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceGroupId {
    /// Ice rinks and skating routes
    IceSkating,
    /// Ski tracks
    Skiing,
    /// Beaches and swimming spots
    Swimming,
}

impl ServiceGroupId {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::IceSkating, Self::Skiing, Self::Swimming]
    }
}

/// A service group as written in its TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceGroupDefinition {
    /// Group identifier.
    pub id: ServiceGroupId,
    /// Human-readable name.
    pub name: String,
    /// Service type ids in this group.
    pub services: Vec<ServiceId>,
}

/// Errors from building a service group index.
#[derive(Debug, thiserror::Error)]
pub enum ServiceGroupError {
    /// A group TOML file could not be parsed.
    #[error("Failed to parse service group '{name}': {source}")]
    Parse {
        /// File stem of the offending definition.
        name: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// The same group id was defined twice.
    #[error("Duplicate service group: {id}")]
    Duplicate {
        /// The repeated group id.
        id: ServiceGroupId,
    },
}

// ── Compile-time embedded TOML files ────────────────────────────────

const GROUP_TOMLS: &[(&str, &str)] = &[
    ("ice_skating", include_str!("../groups/ice_skating.toml")),
    ("skiing", include_str!("../groups/skiing.toml")),
    ("swimming", include_str!("../groups/swimming.toml")),
];

static BUILTIN: LazyLock<ServiceGroups> = LazyLock::new(|| {
    ServiceGroups::from_definitions(all_groups())
        .unwrap_or_else(|e| panic!("Invalid embedded service groups: {e}"))
});

/// Parses a [`ServiceGroupDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns [`ServiceGroupError::Parse`] if the TOML is malformed or missing
/// required fields.
pub fn parse_group_toml(name: &str, toml_str: &str) -> Result<ServiceGroupDefinition, ServiceGroupError> {
    toml::de::from_str(toml_str).map_err(|source| ServiceGroupError::Parse {
        name: name.to_string(),
        source,
    })
}

/// Returns every embedded group definition.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_groups() -> Vec<ServiceGroupDefinition> {
    GROUP_TOMLS
        .iter()
        .map(|(name, toml_str)| parse_group_toml(name, toml_str).unwrap_or_else(|e| panic!("{e}")))
        .collect()
}

/// A named set of service type ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceGroup {
    /// Group identifier.
    pub id: ServiceGroupId,
    /// Human-readable name.
    pub name: String,
    services: HashSet<ServiceId>,
}

impl ServiceGroup {
    /// Returns `true` if `service` is in this group.
    #[must_use]
    pub fn contains(&self, service: ServiceId) -> bool {
        self.services.contains(&service)
    }

    /// Returns `true` if any of `unit`'s services is in this group.
    #[must_use]
    pub fn matches(&self, unit: &Unit) -> bool {
        unit.services.iter().any(|service| self.contains(*service))
    }

    /// Service ids in ascending order.
    #[must_use]
    pub fn service_ids(&self) -> Vec<ServiceId> {
        let mut ids: Vec<ServiceId> = self.services.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// Membership index over all service groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceGroups {
    groups: BTreeMap<ServiceGroupId, ServiceGroup>,
}

impl ServiceGroups {
    /// The index built from the embedded `groups/*.toml` files.
    ///
    /// Parsed once, on first use.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Builds an index from explicit definitions.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceGroupError::Duplicate`] if two definitions share an id.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = ServiceGroupDefinition>,
    ) -> Result<Self, ServiceGroupError> {
        let mut groups = BTreeMap::new();

        for def in definitions {
            let group = ServiceGroup {
                id: def.id,
                name: def.name,
                services: def.services.into_iter().collect(),
            };
            if groups.insert(def.id, group).is_some() {
                return Err(ServiceGroupError::Duplicate { id: def.id });
            }
        }

        log::debug!("Built service group index with {} groups", groups.len());

        Ok(Self { groups })
    }

    /// Returns the group with the given id, if defined.
    #[must_use]
    pub fn get(&self, id: ServiceGroupId) -> Option<&ServiceGroup> {
        self.groups.get(&id)
    }

    /// Iterates groups in [`ServiceGroupId`] order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceGroup> {
        self.groups.values()
    }

    /// Returns `true` if any of `unit`'s services is in `group`.
    ///
    /// An undefined group has no members.
    #[must_use]
    pub fn belongs_to_group(&self, unit: &Unit, group: ServiceGroupId) -> bool {
        self.get(group).is_some_and(|g| g.matches(unit))
    }

    /// Returns every group `unit` belongs to.
    #[must_use]
    pub fn groups_of(&self, unit: &Unit) -> Vec<ServiceGroupId> {
        self.iter()
            .filter(|g| g.matches(unit))
            .map(|g| g.id)
            .collect()
    }
}

/// [`ServiceGroups::belongs_to_group`] against the built-in groups.
#[must_use]
pub fn belongs_to_group(unit: &Unit, group: ServiceGroupId) -> bool {
    ServiceGroups::builtin().belongs_to_group(unit, group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unit_with_services(services: serde_json::Value) -> Unit {
        serde_json::from_value(json!({"id": 1, "services": services})).unwrap()
    }

    #[test]
    fn loads_all_groups() {
        let groups = all_groups();
        assert_eq!(groups.len(), ServiceGroupId::all().len());
    }

    #[test]
    fn every_group_id_is_defined() {
        for id in ServiceGroupId::all() {
            let group = ServiceGroups::builtin().get(*id).unwrap();
            assert!(!group.name.is_empty(), "{id} has empty name");
            assert!(!group.service_ids().is_empty(), "{id} has no services");
        }
    }

    #[test]
    fn groups_are_disjoint() {
        let groups: Vec<&ServiceGroup> = ServiceGroups::builtin().iter().collect();
        for (i, a) in groups.iter().enumerate() {
            for b in &groups[i + 1..] {
                for service in a.service_ids() {
                    assert!(
                        !b.contains(service),
                        "service {service} is in both {} and {}",
                        a.id,
                        b.id
                    );
                }
            }
        }
    }

    #[test]
    fn membership_matches_linear_scan() {
        for def in all_groups() {
            for service in [191, 318, 406, 514, 695, 731, 1, 9999] {
                let unit = unit_with_services(json!([service]));
                let linear = def.services.iter().any(|s| s.0 == service);
                assert_eq!(belongs_to_group(&unit, def.id), linear, "{} / {service}", def.id);
            }
        }
    }

    #[test]
    fn unit_without_services_belongs_nowhere() {
        let unit = unit_with_services(json!([]));
        assert!(ServiceGroups::builtin().groups_of(&unit).is_empty());
    }

    #[test]
    fn object_form_services_are_matched() {
        let unit = unit_with_services(json!([{"id": 191}, {"id": 695}]));
        assert_eq!(
            ServiceGroups::builtin().groups_of(&unit),
            vec![ServiceGroupId::IceSkating, ServiceGroupId::Skiing]
        );
    }

    #[test]
    fn undefined_group_has_no_members() {
        let groups = ServiceGroups::from_definitions(vec![ServiceGroupDefinition {
            id: ServiceGroupId::Skiing,
            name: "Skiing".to_string(),
            services: vec![ServiceId(1)],
        }])
        .unwrap();
        let unit = unit_with_services(json!([1]));

        assert!(groups.belongs_to_group(&unit, ServiceGroupId::Skiing));
        assert!(!groups.belongs_to_group(&unit, ServiceGroupId::IceSkating));
    }

    #[test]
    fn rejects_duplicate_groups() {
        let def = ServiceGroupDefinition {
            id: ServiceGroupId::Swimming,
            name: "Swimming".to_string(),
            services: vec![],
        };
        let result = ServiceGroups::from_definitions(vec![def.clone(), def]);
        assert!(matches!(
            result,
            Err(ServiceGroupError::Duplicate {
                id: ServiceGroupId::Swimming
            })
        ));
    }

    #[test]
    fn reports_malformed_toml() {
        let result = parse_group_toml("broken", "id = \"skiing\"\nservices = 5");
        assert!(matches!(result, Err(ServiceGroupError::Parse { .. })));
    }
}
