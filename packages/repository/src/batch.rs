//! Validated fetch batches.
//!
//! The normalization collaborator delivers payloads shaped as
//!
//! ```json
//! { "entities": { "unit": { "<id>": { "id": <id>, ... } } }, "result": [<id>, ...] }
//! ```
//!
//! [`NormalizedBatch::from_json`] checks that shape before anything reaches
//! a [`Snapshot`](crate::Snapshot), turning missing fields into a
//! [`MalformedBatchError`] instead of a partially built index.

use std::collections::{BTreeMap, HashSet};

use outdoor_map_unit_models::{Unit, UnitId};
use serde::Deserialize;
use serde_json::Value;

use crate::MalformedBatchError;

/// One generation of fetched units, in delivered order, ids unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    units: Vec<Unit>,
}

impl NormalizedBatch {
    /// A batch with no units.
    #[must_use]
    pub const fn empty() -> Self {
        Self { units: Vec::new() }
    }

    /// Creates a batch from units in delivered order.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedBatchError::DuplicateId`] if two units share an id.
    pub fn new(units: Vec<Unit>) -> Result<Self, MalformedBatchError> {
        let mut seen = HashSet::with_capacity(units.len());
        for unit in &units {
            if !seen.insert(unit.id) {
                return Err(MalformedBatchError::DuplicateId { id: unit.id });
            }
        }
        Ok(Self { units })
    }

    /// Validates a normalized payload.
    ///
    /// Units are ordered by `result` when present, otherwise by ascending
    /// id. When `result` is present it must list every unit exactly once.
    ///
    /// # Errors
    ///
    /// Returns a [`MalformedBatchError`] describing the first shape
    /// violation found.
    pub fn from_json(payload: &Value) -> Result<Self, MalformedBatchError> {
        let root = payload.as_object().ok_or(MalformedBatchError::NotAnObject)?;

        let table = root
            .get("entities")
            .and_then(Value::as_object)
            .ok_or(MalformedBatchError::MissingEntities)?
            .get("unit")
            .and_then(Value::as_object)
            .ok_or(MalformedBatchError::MissingUnitTable)?;

        let mut by_id = BTreeMap::new();
        for (key, entry) in table {
            let id: UnitId = key
                .parse()
                .map_err(|_| MalformedBatchError::InvalidKey { key: key.clone() })?;
            if !entry.is_object() {
                return Err(MalformedBatchError::NonObjectEntry { key: key.clone() });
            }
            let unit = Unit::deserialize(entry).map_err(|source| {
                MalformedBatchError::InvalidEntity {
                    key: key.clone(),
                    source,
                }
            })?;
            if unit.id != id {
                return Err(MalformedBatchError::KeyMismatch {
                    key: key.clone(),
                    id: unit.id,
                });
            }
            // "1" and "01" parse to the same id.
            if by_id.insert(id, unit).is_some() {
                return Err(MalformedBatchError::DuplicateId { id });
            }
        }

        let order: Vec<UnitId> = match root.get("result") {
            None | Some(Value::Null) => by_id.keys().copied().collect(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    parse_result_id(item)
                        .ok_or(MalformedBatchError::InvalidResultEntry { index })
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(MalformedBatchError::ResultNotAnArray),
        };

        let mut seen = HashSet::with_capacity(order.len());
        let mut units = Vec::with_capacity(order.len());
        for id in order {
            if !seen.insert(id) {
                return Err(MalformedBatchError::DuplicateId { id });
            }
            let unit = by_id
                .remove(&id)
                .ok_or(MalformedBatchError::DanglingResult { id })?;
            units.push(unit);
        }

        if let Some(id) = by_id.keys().next() {
            return Err(MalformedBatchError::UnlistedEntity { id: *id });
        }

        Ok(Self { units })
    }

    /// Units in delivered order.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Unit ids in delivered order.
    pub fn ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.iter().map(|unit| unit.id)
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if the batch has no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Accepts both `7` and `"7"`.
fn parse_result_id(value: &Value) -> Option<UnitId> {
    match value {
        Value::Number(n) => n.as_u64().map(UnitId),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
