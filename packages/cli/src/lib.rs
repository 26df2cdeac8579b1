#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading and rendering helpers behind the `outdoor_map` binary.
//!
//! Batch files hold the normalized payload a unit fetch delivers. Loading
//! one drives a fresh [`Snapshot`] through a fetch start and a receive
//! event, exactly as a live client would.

use std::path::{Path, PathBuf};

use outdoor_map_observation::classify_quality;
use outdoor_map_repository::{MalformedBatchError, Snapshot, UnitDetails, UnitEvent};
use outdoor_map_search::AddressSuggestion;
use outdoor_map_service_group::ServiceGroups;
use outdoor_map_unit_models::{Unit, UnitId, resolve_attr_or_default};

/// Errors surfaced by the command line driver.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file is not valid JSON or not the expected shape.
    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A batch file is not a normalized unit payload.
    #[error(transparent)]
    Batch(#[from] MalformedBatchError),

    /// The requested unit is not in the batch.
    #[error("Unit {id} not found")]
    UnknownUnit { id: UnitId },
}

fn read_json(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs a fetch start and a receive of `payload` against an empty snapshot.
///
/// # Errors
///
/// Returns [`CliError::Batch`] if `payload` is not a normalized unit batch.
pub fn snapshot_from_payload(payload: serde_json::Value) -> Result<Snapshot, CliError> {
    let events = [
        UnitEvent::FetchStarted,
        UnitEvent::Received {
            sequence: None,
            payload,
        },
    ];

    let snapshot = events
        .iter()
        .try_fold(Snapshot::new(), |snapshot, event| snapshot.reduce(event))?;

    log::info!("Loaded {} units", snapshot.all_ids().len());

    Ok(snapshot)
}

/// Loads a batch file into a snapshot.
///
/// # Errors
///
/// * If the file cannot be read or is not JSON
/// * If the payload is not a normalized unit batch
pub fn load_snapshot(path: &Path) -> Result<Snapshot, CliError> {
    log::debug!("Reading unit batch from {}", path.display());
    snapshot_from_payload(read_json(path)?)
}

/// Loads a JSON array of geocoder address suggestions.
///
/// # Errors
///
/// * If the file cannot be read or is not JSON
/// * If it is not an array of `{ "label": ..., "location": ... }` objects
pub fn load_addresses(path: &Path) -> Result<Vec<AddressSuggestion>, CliError> {
    serde_json::from_value(read_json(path)?).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders index sizes of `snapshot`.
#[must_use]
pub fn format_summary(snapshot: &Snapshot) -> String {
    [
        format!("{:<12} {}", "all", snapshot.all_ids().len()),
        format!("{:<12} {}", "iceskate", snapshot.ice_skate_ids().len()),
        format!("{:<12} {}", "ski", snapshot.ski_ids().len()),
        format!("{:<12} {}", "open_now", snapshot.open_now_ids().len()),
        format!("{:<12} {}", "fetching", snapshot.is_fetching()),
    ]
    .join("\n")
}

/// Renders `units` as an `ID / QUALITY / NAME` table.
#[must_use]
pub fn format_unit_table(units: &[&Unit], lang: &str) -> String {
    let mut lines = vec![
        format!("{:<10} {:<14} NAME", "ID", "QUALITY"),
        "-".repeat(60),
    ];
    lines.extend(units.iter().map(|unit| {
        format!(
            "{:<10} {:<14} {}",
            unit.id.0,
            classify_quality(unit).as_ref(),
            resolve_attr_or_default(Some(&unit.name), lang)
        )
    }));
    lines.join("\n")
}

/// Renders the detail view of one unit.
#[must_use]
pub fn format_details(details: &UnitDetails<'_>) -> String {
    let mut lines = vec![format!("{} (#{})", details.name.unwrap_or("-"), details.id)];

    if let Some(address) = &details.address {
        lines.push(address.clone());
    }
    if let Some([lat, lng]) = details.position {
        lines.push(format!("Position: {lat:.5}, {lng:.5}"));
    }
    match details.condition_text {
        Some(text) => lines.push(format!("Quality: {} ({text})", details.quality)),
        None => lines.push(format!("Quality: {}", details.quality)),
    }
    if let Some(condition) = details.condition {
        lines.push(format!("Updated: {}", condition.time.format("%Y-%m-%d %H:%M")));
    }
    if let Some(temperature) = &details.temperature {
        lines.push(format!("Water temperature: {}", temperature.text));
    }
    if let Some(notice) = details.notice {
        lines.push(format!("Notice: {notice}"));
    }
    if let Some(length) = details.length_km {
        lines.push(format!("Length: {length} km"));
    }
    if let Some(lighting) = &details.lighting {
        lines.push(format!("Lighting: {lighting}"));
    }
    if let Some(technique) = &details.skiing_technique {
        lines.push(format!("Skiing technique: {technique}"));
    }
    if let Some(phone) = details.phone {
        lines.push(format!("Phone: {phone}"));
    }
    if let Some(www) = details.www {
        lines.push(format!("Further info: {www}"));
    }
    if !details.opening_hours.is_empty() {
        lines.push("Opening hours:".to_string());
        lines.extend(details.opening_hours.iter().map(|h| format!("  {h}")));
    }
    if !details.groups.is_empty() {
        let groups: Vec<&str> = details.groups.iter().map(AsRef::<str>::as_ref).collect();
        lines.push(format!("Groups: {}", groups.join(", ")));
    }

    lines.join("\n")
}

/// Renders the service group table.
#[must_use]
pub fn format_groups(groups: &ServiceGroups) -> String {
    let mut lines = vec![format!("{:<14} {:<14} SERVICES", "ID", "NAME"), "-".repeat(50)];
    lines.extend(groups.iter().map(|group| {
        let services: Vec<String> = group
            .service_ids()
            .iter()
            .map(ToString::to_string)
            .collect();
        format!(
            "{:<14} {:<14} {}",
            group.id.as_ref(),
            group.name,
            services.join(", ")
        )
    }));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use outdoor_map_repository::UnitFilter;
    use serde_json::json;

    use super::*;

    fn payload() -> serde_json::Value {
        json!({
            "entities": {"unit": {
                "1": {
                    "id": 1,
                    "name": {"fi": "Kallion tekojää"},
                    "services": [695],
                    "observations": [{
                        "property": "ice_condition",
                        "time": "2024-01-02T08:00:00Z",
                        "quality": "good",
                        "name": {"fi": "Hyvä"}
                    }]
                },
                "2": {"id": 2, "name": {"fi": "Paloheinä"}, "services": [191]}
            }},
            "result": [1, 2]
        })
    }

    #[test]
    fn payload_drives_start_and_receive() {
        let snapshot = snapshot_from_payload(payload()).unwrap();
        assert!(!snapshot.is_fetching());
        assert_eq!(snapshot.all_ids(), &[UnitId(1), UnitId(2)]);
        assert_eq!(snapshot.open_now_ids(), &[UnitId(1)]);
    }

    #[test]
    fn malformed_payload_is_a_batch_error() {
        let result = snapshot_from_payload(json!({"entities": {}}));
        assert!(matches!(
            result,
            Err(CliError::Batch(MalformedBatchError::MissingUnitTable))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_snapshot(Path::new("/nonexistent/units.json"));
        assert!(matches!(result, Err(CliError::Io { .. })));
    }

    #[test]
    fn summary_lists_every_index() {
        let summary = format_summary(&snapshot_from_payload(payload()).unwrap());
        let rows: Vec<Vec<&str>> = summary
            .lines()
            .map(|line| line.split_whitespace().collect())
            .collect();

        assert_eq!(
            rows,
            vec![
                vec!["all", "2"],
                vec!["iceskate", "1"],
                vec!["ski", "1"],
                vec!["open_now", "1"],
                vec!["fetching", "false"],
            ]
        );
    }

    #[test]
    fn unit_table_shows_quality_and_name() {
        let snapshot = snapshot_from_payload(payload()).unwrap();
        let table = format_unit_table(&snapshot.units(snapshot.ids(UnitFilter::All)), "fi");
        let rows: Vec<&str> = table.lines().skip(2).collect();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("good") && rows[0].ends_with("Kallion tekojää"));
        assert!(rows[1].contains("unknown") && rows[1].ends_with("Paloheinä"));
    }

    #[test]
    fn details_render_condition() {
        let snapshot = snapshot_from_payload(payload()).unwrap();
        let unit = snapshot.unit(UnitId(1)).unwrap();
        let text = format_details(&UnitDetails::new(unit, "fi"));

        assert!(text.starts_with("Kallion tekojää (#1)"));
        assert!(text.contains("Quality: good (Hyvä)"));
        assert!(text.contains("Updated: 2024-01-02 08:00"));
        assert!(text.contains("Groups: ice_skating"));
    }

    #[test]
    fn groups_table_has_builtin_groups() {
        let table = format_groups(ServiceGroups::builtin());
        assert!(table.contains("ice_skating"));
        assert!(table.contains("skiing"));
        assert!(table.contains("swimming"));
    }
}
