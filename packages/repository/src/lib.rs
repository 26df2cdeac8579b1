#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalized unit repository with derived indices.
//!
//! The repository is a pure reducer: a [`Snapshot`] plus an event yields a
//! new [`Snapshot`]. Callers own the current snapshot and thread it
//! through. Each fetch completion rebuilds every index (`all`,
//! `ice_skate`, `ski`, `open_now`) from the delivered [`NormalizedBatch`]
//! alone, so all indices always reflect exactly one generation of data.

pub mod batch;
pub mod details;
pub mod selectors;
pub mod snapshot;

use outdoor_map_unit_models::UnitId;

pub use batch::NormalizedBatch;
pub use details::UnitDetails;
pub use selectors::{StatusFilter, UnitFilter};
pub use snapshot::{FetchSequence, Snapshot, UnitEvent, UnitIndices};

/// A fetch payload that does not have the normalized batch shape.
///
/// The snapshot the payload was meant for stays unchanged.
#[derive(Debug, thiserror::Error)]
pub enum MalformedBatchError {
    /// The payload is not a JSON object.
    #[error("Batch payload is not an object")]
    NotAnObject,

    /// `entities` is missing or not an object.
    #[error("Batch payload has no 'entities' object")]
    MissingEntities,

    /// `entities.unit` is missing or not an object.
    #[error("Batch payload has no 'entities.unit' object")]
    MissingUnitTable,

    /// An entry of `entities.unit` is not an object.
    #[error("Unit entry '{key}' is not an object")]
    NonObjectEntry {
        /// The entry's key.
        key: String,
    },

    /// A key of `entities.unit` is not a unit id.
    #[error("Unit key '{key}' is not a valid unit id")]
    InvalidKey {
        /// The offending key.
        key: String,
    },

    /// A unit entry failed schema validation.
    #[error("Unit '{key}' is invalid: {source}")]
    InvalidEntity {
        /// The entry's key.
        key: String,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A unit is stored under a key that differs from its own id.
    #[error("Unit stored under key '{key}' has id {id}")]
    KeyMismatch {
        /// The entry's key.
        key: String,
        /// The id inside the entry.
        id: UnitId,
    },

    /// `result` is present but not an array.
    #[error("Batch 'result' is not an array")]
    ResultNotAnArray,

    /// An element of `result` is not a unit id.
    #[error("Batch 'result' element {index} is not a unit id")]
    InvalidResultEntry {
        /// Position in `result`.
        index: usize,
    },

    /// The same unit id appears twice.
    #[error("Unit {id} appears more than once")]
    DuplicateId {
        /// The repeated id.
        id: UnitId,
    },

    /// `result` references a unit missing from `entities.unit`.
    #[error("Batch 'result' references unknown unit {id}")]
    DanglingResult {
        /// The unknown id.
        id: UnitId,
    },

    /// A unit in `entities.unit` is not listed in `result`.
    #[error("Unit {id} is not listed in batch 'result'")]
    UnlistedEntity {
        /// The unlisted id.
        id: UnitId,
    },
}
