//! Repository snapshots and the fetch event reducer.

use std::collections::BTreeMap;
use std::sync::Arc;

use outdoor_map_observation::is_open_now;
use outdoor_map_service_group::{ServiceGroupId, ServiceGroups};
use outdoor_map_unit_models::{Unit, UnitId};
use serde::{Deserialize, Serialize};

use crate::{MalformedBatchError, NormalizedBatch};

/// Monotonic tag of a fetch request.
///
/// Issued by [`Snapshot::on_fetch_start`]; completions tagged with an
/// older sequence than the last applied one are ignored.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FetchSequence(u64);

impl FetchSequence {
    /// Creates a sequence from its raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for FetchSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The unit table and every index derived from it.
///
/// Always built in full from a single [`NormalizedBatch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitIndices {
    by_id: BTreeMap<UnitId, Unit>,
    all: Vec<UnitId>,
    ice_skate: Vec<UnitId>,
    ski: Vec<UnitId>,
    open_now: Vec<UnitId>,
}

impl UnitIndices {
    /// Builds the table and all indices from `batch`.
    ///
    /// Index order follows the batch's delivered order.
    #[must_use]
    pub fn build(batch: &NormalizedBatch, groups: &ServiceGroups) -> Self {
        let mut indices = Self {
            by_id: BTreeMap::new(),
            all: Vec::with_capacity(batch.len()),
            ice_skate: Vec::new(),
            ski: Vec::new(),
            open_now: Vec::new(),
        };

        for unit in batch.units() {
            let id = unit.id;
            indices.all.push(id);
            if groups.belongs_to_group(unit, ServiceGroupId::IceSkating) {
                indices.ice_skate.push(id);
            }
            if groups.belongs_to_group(unit, ServiceGroupId::Skiing) {
                indices.ski.push(id);
            }
            if is_open_now(unit) {
                indices.open_now.push(id);
            }
            indices.by_id.insert(id, unit.clone());
        }

        indices
    }

    /// The normalized unit table.
    #[must_use]
    pub const fn by_id(&self) -> &BTreeMap<UnitId, Unit> {
        &self.by_id
    }

    /// Every unit id, in delivered order.
    #[must_use]
    pub fn all_ids(&self) -> &[UnitId] {
        &self.all
    }

    /// Ids of units with at least one ice skating service.
    #[must_use]
    pub fn ice_skate_ids(&self) -> &[UnitId] {
        &self.ice_skate
    }

    /// Ids of units with at least one skiing service.
    #[must_use]
    pub fn ski_ids(&self) -> &[UnitId] {
        &self.ski
    }

    /// Ids of units whose quality is satisfactory or better.
    #[must_use]
    pub fn open_now_ids(&self) -> &[UnitId] {
        &self.open_now
    }
}

/// One immutable, internally consistent generation of repository state.
///
/// Transitions return a new snapshot; the indices are shared between
/// snapshots until a completion replaces them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    is_fetching: bool,
    latest_fetch: FetchSequence,
    applied_fetch: Option<FetchSequence>,
    indices: Arc<UnitIndices>,
}

/// Events consumed by [`Snapshot::reduce`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitEvent {
    /// A unit fetch was issued.
    FetchStarted,
    /// A unit fetch delivered its normalized payload.
    Received {
        /// The fetch this payload answers; `None` means the latest one.
        #[serde(default)]
        sequence: Option<FetchSequence>,
        /// Normalized payload, validated before use.
        payload: serde_json::Value,
    },
}

impl Snapshot {
    /// An empty snapshot, not fetching.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a new fetch as in flight. Indices are untouched.
    ///
    /// The fetch is tagged with the next [`FetchSequence`], available via
    /// [`Snapshot::latest_fetch`].
    #[must_use]
    pub fn on_fetch_start(&self) -> Self {
        Self {
            is_fetching: true,
            latest_fetch: self.latest_fetch.next(),
            applied_fetch: self.applied_fetch,
            indices: Arc::clone(&self.indices),
        }
    }

    /// Applies `batch` as the answer to the latest fetch.
    ///
    /// Every index is rebuilt from `batch` alone; nothing from the previous
    /// generation survives.
    #[must_use]
    pub fn on_fetch_complete(&self, batch: &NormalizedBatch) -> Self {
        self.on_fetch_complete_with(self.latest_fetch, batch, ServiceGroups::builtin())
    }

    /// Applies `batch` as the answer to fetch `sequence`.
    ///
    /// See [`Snapshot::on_fetch_complete_with`].
    #[must_use]
    pub fn on_fetch_complete_for(&self, sequence: FetchSequence, batch: &NormalizedBatch) -> Self {
        self.on_fetch_complete_with(sequence, batch, ServiceGroups::builtin())
    }

    /// Applies `batch` as the answer to fetch `sequence`, classifying units
    /// with `groups`.
    ///
    /// A completion older than the last applied one is stale and returns
    /// the snapshot unchanged, as does one for a fetch that was never
    /// issued. A completion older than the latest issued fetch is applied,
    /// but the snapshot keeps fetching until the latest one arrives.
    #[must_use]
    pub fn on_fetch_complete_with(
        &self,
        sequence: FetchSequence,
        batch: &NormalizedBatch,
        groups: &ServiceGroups,
    ) -> Self {
        if self.is_stale(sequence) {
            log::debug!(
                "Ignoring stale unit fetch {sequence} (already applied {:?})",
                self.applied_fetch
            );
            return self.clone();
        }
        if sequence > self.latest_fetch {
            log::warn!(
                "Ignoring unit fetch {sequence}: latest issued fetch is {}",
                self.latest_fetch
            );
            return self.clone();
        }

        let indices = UnitIndices::build(batch, groups);
        log::debug!(
            "Applied unit fetch {sequence}: {} units, {} ice skating, {} skiing, {} open",
            indices.all.len(),
            indices.ice_skate.len(),
            indices.ski.len(),
            indices.open_now.len()
        );

        Self {
            is_fetching: sequence < self.latest_fetch,
            latest_fetch: self.latest_fetch,
            applied_fetch: Some(sequence),
            indices: Arc::new(indices),
        }
    }

    /// Applies `event`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedBatchError`] if a received payload does not have
    /// the normalized batch shape. The caller keeps its current snapshot.
    pub fn reduce(&self, event: &UnitEvent) -> Result<Self, MalformedBatchError> {
        match event {
            UnitEvent::FetchStarted => Ok(self.on_fetch_start()),
            UnitEvent::Received { sequence, payload } => {
                let batch = NormalizedBatch::from_json(payload).inspect_err(|e| {
                    log::warn!("Rejected unit fetch payload: {e}");
                })?;
                let sequence = sequence.unwrap_or(self.latest_fetch);
                Ok(self.on_fetch_complete_for(sequence, &batch))
            }
        }
    }

    /// Returns `true` if a completion for `sequence` would be ignored.
    #[must_use]
    pub fn is_stale(&self, sequence: FetchSequence) -> bool {
        self.applied_fetch.is_some_and(|applied| sequence < applied)
    }

    /// `true` between a fetch start and its matching completion.
    #[must_use]
    pub const fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    /// The most recently issued fetch.
    #[must_use]
    pub const fn latest_fetch(&self) -> FetchSequence {
        self.latest_fetch
    }

    /// The fetch whose batch the indices were built from.
    #[must_use]
    pub const fn applied_fetch(&self) -> Option<FetchSequence> {
        self.applied_fetch
    }

    /// The table and indices of this generation.
    #[must_use]
    pub fn indices(&self) -> &UnitIndices {
        &self.indices
    }

    /// The normalized unit table.
    #[must_use]
    pub fn by_id(&self) -> &BTreeMap<UnitId, Unit> {
        self.indices.by_id()
    }

    /// Every unit id, in delivered order.
    #[must_use]
    pub fn all_ids(&self) -> &[UnitId] {
        self.indices.all_ids()
    }

    /// Ids of ice skating units.
    #[must_use]
    pub fn ice_skate_ids(&self) -> &[UnitId] {
        self.indices.ice_skate_ids()
    }

    /// Ids of skiing units.
    #[must_use]
    pub fn ski_ids(&self) -> &[UnitId] {
        self.indices.ski_ids()
    }

    /// Ids of units that are open now.
    #[must_use]
    pub fn open_now_ids(&self) -> &[UnitId] {
        self.indices.open_now_ids()
    }
}
