//! Display projection of a single unit.

use outdoor_map_observation::{
    TemperatureSource, classify_quality, condition_observation, notice_observation,
    water_temperature,
};
use outdoor_map_service_group::{ServiceGroupId, ServiceGroups};
use outdoor_map_unit_models::{
    Observation, QualityTier, Unit, UnitId, resolve_attr_with_fallback,
};

/// A water temperature ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureText {
    /// Origin of the reading.
    pub source: TemperatureSource,
    /// `"<value> °C"` for sensor readings, the reading's name otherwise.
    pub text: String,
}

/// Everything the unit detail view shows, resolved for one language.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDetails<'a> {
    /// Unit id.
    pub id: UnitId,
    /// Unit name.
    pub name: Option<&'a str>,
    /// `"<street>, <zip> <Municipality>"`, skipping missing parts.
    pub address: Option<String>,
    /// `[latitude, longitude]`.
    pub position: Option<[f64; 2]>,
    /// Tier from the latest condition observation.
    pub quality: QualityTier,
    /// The latest condition observation.
    pub condition: Option<&'a Observation>,
    /// Human-readable condition, e.g. `"Hyvä"`.
    pub condition_text: Option<&'a str>,
    /// Latest maintenance notice.
    pub notice: Option<&'a str>,
    /// Water temperature, sensor reading preferred.
    pub temperature: Option<TemperatureText>,
    /// Track length in kilometres.
    pub length_km: Option<f64>,
    /// Lighting description, first letter uppercased.
    pub lighting: Option<String>,
    /// Skiing technique, first letter uppercased.
    pub skiing_technique: Option<String>,
    /// Contact phone number.
    pub phone: Option<&'a str>,
    /// Further info link.
    pub www: Option<&'a str>,
    /// Opening-hour texts.
    pub opening_hours: Vec<&'a str>,
    /// Service groups the unit belongs to.
    pub groups: Vec<ServiceGroupId>,
}

impl<'a> UnitDetails<'a> {
    /// Projects `unit` for display in `lang`.
    ///
    /// Attributes missing in `lang` fall back to the other supported
    /// languages.
    #[must_use]
    pub fn new(unit: &'a Unit, lang: &str) -> Self {
        let condition = condition_observation(unit);
        let extensions = unit.extensions.as_ref();

        Self {
            id: unit.id,
            name: resolve_attr_with_fallback(Some(&unit.name), lang),
            address: address_line(unit, lang),
            position: unit.location.map(|l| l.lat_lng()),
            quality: classify_quality(unit),
            condition,
            condition_text: condition
                .and_then(|obs| resolve_attr_with_fallback(Some(&obs.name), lang)),
            notice: notice_observation(unit)
                .and_then(|obs| resolve_attr_with_fallback(Some(&obs.value), lang)),
            temperature: water_temperature(unit).and_then(|reading| {
                let obs = reading.observation;
                let text = match reading.source {
                    TemperatureSource::Live => resolve_attr_with_fallback(Some(&obs.value), lang)
                        .map(|value| format!("{value} °C")),
                    TemperatureSource::Manual => {
                        resolve_attr_with_fallback(Some(&obs.name), lang).map(str::to_string)
                    }
                }?;
                Some(TemperatureText {
                    source: reading.source,
                    text,
                })
            }),
            length_km: extensions.and_then(|ext| ext.length),
            lighting: extensions
                .and_then(|ext| resolve_attr_with_fallback(ext.lighting.as_ref(), lang))
                .map(upper_first),
            skiing_technique: extensions
                .and_then(|ext| resolve_attr_with_fallback(ext.skiing_technique.as_ref(), lang))
                .map(upper_first),
            phone: unit.phone.as_deref().filter(|p| !p.is_empty()),
            www: resolve_attr_with_fallback(unit.www.as_ref(), lang),
            opening_hours: unit.opening_hours(lang),
            groups: ServiceGroups::builtin().groups_of(unit),
        }
    }

    /// Returns `true` if the info section has anything to show.
    #[must_use]
    pub fn has_info(&self) -> bool {
        self.length_km.is_some()
            || self.lighting.is_some()
            || self.skiing_technique.is_some()
            || self.phone.is_some()
            || self.www.is_some()
    }
}

fn address_line(unit: &Unit, lang: &str) -> Option<String> {
    let street = resolve_attr_with_fallback(unit.street_address.as_ref(), lang);
    let locality = [
        unit.address_zip.as_deref().map(str::to_string),
        unit.municipality.as_deref().map(capitalize_words),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    match (street, locality.is_empty()) {
        (None, true) => None,
        (Some(street), true) => Some(street.to_string()),
        (None, false) => Some(locality),
        (Some(street), false) => Some(format!("{street}, {locality}")),
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn capitalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(upper_first)
        .collect::<Vec<_>>()
        .join(" ")
}
