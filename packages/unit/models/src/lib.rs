#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Unit, observation and quality tier types for the outdoor map.
//!
//! A [`Unit`] is a publicly mapped service location (skating rink, ski
//! track, swimming spot). Units carry timestamped [`Observation`]s from
//! which the observation crate derives a [`QualityTier`]. Human-readable
//! attributes arrive as language-keyed [`Translated`] bags, resolved by
//! the functions in [`translated`].

pub mod translated;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use translated::{
    Translated, resolve_attr, resolve_attr_or_default, resolve_attr_with_fallback,
};

/// Language used when nothing else is configured.
pub const DEFAULT_LANGUAGE: Language = Language::Fi;

/// Connection section type holding opening-hour texts.
pub const OPENING_HOURS_SECTION: &str = "OPENING_HOURS";

/// Supported UI languages.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    /// Finnish
    Fi,
    /// Swedish
    Sv,
    /// English
    En,
}

impl Language {
    /// Returns all variants of this enum, in display fallback order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Fi, Self::Sv, Self::En]
    }
}

/// Stable identifier of a unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(pub u64);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UnitId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Identifier of a service type (e.g. "ice rink", "ski track").
///
/// Deserializes from either a bare number (`191`) or a service object
/// (`{"id": 191, ...}`); serializes as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ServiceId(pub u32);

impl<'de> Deserialize<'de> for ServiceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(u32),
            Object { id: u32 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Bare(id) | Repr::Object { id } => Ok(Self(id)),
        }
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `GeoJSON`-style point. Coordinates are `[longitude, latitude]` (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// `[longitude, latitude]`.
    pub coordinates: [f64; 2],
}

impl Location {
    /// Creates a point from longitude and latitude.
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            coordinates: [longitude, latitude],
        }
    }

    /// Longitude (WGS84).
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    /// Latitude (WGS84).
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    /// Returns `[latitude, longitude]`, the order map views expect.
    #[must_use]
    pub const fn lat_lng(&self) -> [f64; 2] {
        [self.coordinates[1], self.coordinates[0]]
    }
}

/// Ordinal classification of a unit's current condition.
///
/// Lower is better. [`QualityTier::Unknown`] is the worst tier and is used
/// whenever no usable observation exists.
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
pub enum QualityTier {
    /// Condition reported good
    Good = 1,
    /// Usable, but not at its best
    Satisfactory = 2,
    /// Reported unusable or closed
    Unusable = 3,
    /// No usable observation
    Unknown = 4,
}

impl QualityTier {
    /// Returns the ordinal rank of this tier (1 = best).
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Creates a tier from its ordinal rank.
    ///
    /// # Errors
    ///
    /// Returns an error if the rank is not in the range 1-4.
    pub const fn from_rank(rank: u8) -> Result<Self, InvalidRankError> {
        match rank {
            1 => Ok(Self::Good),
            2 => Ok(Self::Satisfactory),
            3 => Ok(Self::Unusable),
            4 => Ok(Self::Unknown),
            _ => Err(InvalidRankError { rank }),
        }
    }

    /// Returns all variants of this enum, best first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Good,
            Self::Satisfactory,
            Self::Unusable,
            Self::Unknown,
        ]
    }
}

/// Error returned when attempting to create a [`QualityTier`] from an
/// invalid rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRankError {
    /// The invalid rank that was provided.
    pub rank: u8,
}

impl std::fmt::Display for InvalidRankError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid quality rank {}: expected 1-4", self.rank)
    }
}

impl std::error::Error for InvalidRankError {}

/// A timestamped condition or sensor reading attached to a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// What is measured (e.g. `ice_condition`, `swimming_water_temperature`).
    pub property: String,
    /// When the observation was made.
    pub time: DateTime<Utc>,
    /// When the observation stops being valid, if the source says so.
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
    /// Machine-readable condition code (`good`, `satisfactory`, ...).
    #[serde(default)]
    pub quality: Option<String>,
    /// Human-readable value.
    #[serde(default)]
    pub value: Translated,
    /// Human-readable name of the reading.
    #[serde(default)]
    pub name: Translated,
    /// Whether the source marks this as the unit's primary observation.
    #[serde(default)]
    pub primary: bool,
}

/// Free-form unit attributes that only some service types have.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitExtensions {
    /// Track length in kilometres.
    #[serde(default, deserialize_with = "lenient_number")]
    pub length: Option<f64>,
    /// Lighting description.
    #[serde(default)]
    pub lighting: Option<Translated>,
    /// Skiing technique (classic, freestyle).
    #[serde(default)]
    pub skiing_technique: Option<Translated>,
}

/// A linked info section of a unit (opening hours, phone numbers, links).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Section kind, e.g. [`OPENING_HOURS_SECTION`].
    pub section_type: String,
    /// Section text.
    #[serde(default)]
    pub name: Translated,
}

/// A publicly mapped service location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Stable identifier.
    pub id: UnitId,
    /// Unit name.
    #[serde(default)]
    pub name: Translated,
    /// Street address.
    #[serde(default)]
    pub street_address: Option<Translated>,
    /// Postal code.
    #[serde(default)]
    pub address_zip: Option<String>,
    /// Municipality name (lowercase in source data).
    #[serde(default)]
    pub municipality: Option<String>,
    /// Geographic position.
    #[serde(default)]
    pub location: Option<Location>,
    /// Service types this unit provides.
    #[serde(default)]
    pub services: Vec<ServiceId>,
    /// Observation history, in source order.
    #[serde(default)]
    pub observations: Vec<Observation>,
    /// Service-specific attributes.
    #[serde(default)]
    pub extensions: Option<UnitExtensions>,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Further info link.
    #[serde(default)]
    pub www: Option<Translated>,
    /// Linked info sections.
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Unit {
    /// Creates a unit with only an id and a name; everything else empty.
    #[must_use]
    pub fn new(id: UnitId, name: Translated) -> Self {
        Self {
            id,
            name,
            street_address: None,
            address_zip: None,
            municipality: None,
            location: None,
            services: Vec::new(),
            observations: Vec::new(),
            extensions: None,
            phone: None,
            www: None,
            connections: Vec::new(),
        }
    }

    /// Opening-hour texts for `lang`, in source order.
    #[must_use]
    pub fn opening_hours(&self, lang: &str) -> Vec<&str> {
        self.connections
            .iter()
            .filter(|c| c.section_type == OPENING_HOURS_SECTION)
            .filter_map(|c| resolve_attr_with_fallback(Some(&c.name), lang))
            .collect()
    }
}

/// Accepts `2.5`, `"2.5"` and `null`.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    Ok(
        match Option::<Repr>::deserialize(deserializer)? {
            Some(Repr::Number(n)) => Some(n),
            Some(Repr::Text(s)) => s.trim().replace(',', ".").parse().ok(),
            None => None,
        },
    )
}
