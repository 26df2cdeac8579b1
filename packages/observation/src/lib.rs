#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Observation lookup and quality classification.
//!
//! A unit keeps its whole observation history. Only the most recent
//! observation of each kind matters for display, and the latest
//! *condition* observation decides the unit's [`QualityTier`].
//!
//! Every function here is total: a unit without observations classifies
//! as [`QualityTier::Unknown`] rather than failing.

pub mod quality;

use outdoor_map_unit_models::{Observation, QualityTier, Unit};

pub use quality::{enumerable_quality, quality_from_code};

/// Observation key for free-text maintenance notices.
pub const NOTICE_PROPERTY: &str = "notice";

/// Observation key for water temperatures entered by staff.
pub const WATER_TEMPERATURE_PROPERTY: &str = "swimming_water_temperature";

/// Observation key for water temperatures reported by a sensor.
pub const LIVE_WATER_TEMPERATURE_PROPERTY: &str = "live_swimming_water_temperature";

/// Properties containing this marker describe the unit's condition
/// (`ice_condition`, `ski_trail_condition`, ...).
const CONDITION_MARKER: &str = "condition";

/// Returns the most recent observation matching `predicate`.
///
/// When several matching observations share the latest timestamp, the
/// last one in the unit's observation list wins.
pub fn find_latest_observation_by<P>(unit: &Unit, mut predicate: P) -> Option<&Observation>
where
    P: FnMut(&Observation) -> bool,
{
    unit.observations
        .iter()
        .filter(|obs| predicate(*obs))
        .max_by_key(|obs| obs.time)
}

/// Returns the most recent observation whose property is exactly `key`.
#[must_use]
pub fn find_latest_observation<'a>(unit: &'a Unit, key: &str) -> Option<&'a Observation> {
    find_latest_observation_by(unit, |obs| obs.property == key)
}

/// Returns `true` if `property` names a condition reading.
#[must_use]
pub fn is_condition_property(property: &str) -> bool {
    property.contains(CONDITION_MARKER)
}

/// Returns the most recent condition observation of `unit`.
#[must_use]
pub fn condition_observation(unit: &Unit) -> Option<&Observation> {
    find_latest_observation_by(unit, |obs| is_condition_property(&obs.property))
}

/// Classifies `unit` by its latest condition observation.
///
/// Returns [`QualityTier::Unknown`] when there is no condition observation
/// or it carries no quality code.
#[must_use]
pub fn classify_quality(unit: &Unit) -> QualityTier {
    condition_observation(unit)
        .and_then(|obs| obs.quality.as_deref())
        .map_or(QualityTier::Unknown, quality_from_code)
}

/// Returns `true` if the unit's quality is satisfactory or better.
#[must_use]
pub fn is_open_now(unit: &Unit) -> bool {
    enumerable_quality(classify_quality(unit)) <= enumerable_quality(QualityTier::Satisfactory)
}

/// Returns the latest maintenance notice of `unit`.
#[must_use]
pub fn notice_observation(unit: &Unit) -> Option<&Observation> {
    find_latest_observation(unit, NOTICE_PROPERTY)
}

/// Where a water temperature reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureSource {
    /// Automatic sensor reading.
    Live,
    /// Entered manually by staff.
    Manual,
}

/// A water temperature reading with its origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterTemperature<'a> {
    /// Origin of the reading.
    pub source: TemperatureSource,
    /// The underlying observation.
    pub observation: &'a Observation,
}

/// Returns the water temperature to display for `unit`.
///
/// A live sensor reading always wins over a manual one, regardless of
/// which is newer.
#[must_use]
pub fn water_temperature(unit: &Unit) -> Option<WaterTemperature<'_>> {
    find_latest_observation(unit, LIVE_WATER_TEMPERATURE_PROPERTY)
        .map(|observation| WaterTemperature {
            source: TemperatureSource::Live,
            observation,
        })
        .or_else(|| {
            find_latest_observation(unit, WATER_TEMPERATURE_PROPERTY).map(|observation| {
                WaterTemperature {
                    source: TemperatureSource::Manual,
                    observation,
                }
            })
        })
}
