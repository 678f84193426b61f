//! In-memory state stores.
//!
//! ## Expiry
//!
//! Reads never mutate the map: an expired gate is reported absent but stays
//! until swept. The store keeps a logical clock, the highest `timestamp_ms`
//! passed to any of its operations; the wall clock is never read.
//!
//! Background sweeps only remove gates expired at `clock - gc_interval_ms`.
//! They run on `put` once the clock is more than `gc_interval_ms` past the
//! previous sweep, and through [`InMemoryGateStore::sweep_stale`].
//! [`GateStore::purge_expired`] sweeps at exactly the clock it is given.

use crate::domain::GlobalModes;
use crate::error::PortError;
use crate::ports::outbound::{GateStore, GlobalModeStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{GateKey, GateState, ScopeLevel};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Default interval between sweeps of expired gates.
pub const DEFAULT_GC_INTERVAL_MS: u64 = 60_000;

struct GateTable {
    states: HashMap<GateKey, GateState>,
    /// Logical clock reading of the last sweep.
    last_gc: u64,
}

impl GateTable {
    /// Drop every state expired at `horizon_ms`.
    fn sweep(&mut self, horizon_ms: u64, clock_ms: u64) -> usize {
        let before = self.states.len();
        self.states.retain(|_, state| !state.is_expired(horizon_ms));
        self.last_gc = clock_ms;
        before - self.states.len()
    }
}

/// Gate store backed by a hash map.
pub struct InMemoryGateStore {
    table: RwLock<GateTable>,
    /// Highest envelope time observed.
    clock: AtomicU64,
    gc_interval_ms: u64,
}

impl InMemoryGateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_gc_interval(DEFAULT_GC_INTERVAL_MS)
    }

    #[must_use]
    pub fn with_gc_interval(gc_interval_ms: u64) -> Self {
        Self {
            table: RwLock::new(GateTable {
                states: HashMap::new(),
                last_gc: 0,
            }),
            clock: AtomicU64::new(0),
            gc_interval_ms,
        }
    }

    /// Highest `timestamp_ms` observed so far.
    #[must_use]
    pub fn clock(&self) -> u64 {
        self.clock.load(Ordering::Acquire)
    }

    /// Remove gates that expired at least one GC interval before the
    /// logical clock. Returns the number removed.
    pub fn sweep_stale(&self) -> usize {
        let mut table = self.table.write();
        let clock_ms = self.clock();
        let removed = table.sweep(self.horizon(clock_ms), clock_ms);
        if removed > 0 {
            debug!(removed, clock_ms, "Swept stale gate states");
        }
        removed
    }

    fn observe(&self, now_ms: u64) -> u64 {
        self.clock.fetch_max(now_ms, Ordering::AcqRel).max(now_ms)
    }

    fn horizon(&self, clock_ms: u64) -> u64 {
        clock_ms.saturating_sub(self.gc_interval_ms)
    }

    /// Physically stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryGateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GateStore for InMemoryGateStore {
    async fn get(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        nucleus: &str,
        now_ms: u64,
    ) -> Result<Option<GateState>, PortError> {
        self.observe(now_ms);
        let key = GateKey::new(scope_level, scope, nucleus);
        Ok(self
            .table
            .read()
            .states
            .get(&key)
            .filter(|state| !state.is_expired(now_ms))
            .cloned())
    }

    async fn put(&self, state: GateState) -> Result<(), PortError> {
        let mut table = self.table.write();

        let clock_ms = self.observe(state.timestamp_ms);
        if clock_ms.saturating_sub(table.last_gc) > self.gc_interval_ms {
            let removed = table.sweep(self.horizon(clock_ms), clock_ms);
            if removed > 0 {
                debug!(removed, clock_ms, "Swept expired gate states");
            }
        }

        table.states.insert(state.key(), state);
        Ok(())
    }

    async fn list_scope(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        now_ms: u64,
    ) -> Result<Vec<GateState>, PortError> {
        self.observe(now_ms);
        let mut states: Vec<GateState> = self
            .table
            .read()
            .states
            .values()
            .filter(|s| s.scope_level == scope_level && s.scope == scope && !s.is_expired(now_ms))
            .cloned()
            .collect();
        states.sort_by(|a, b| a.nucleus.cmp(&b.nucleus));
        Ok(states)
    }

    async fn purge_expired(&self, now_ms: u64) -> Result<usize, PortError> {
        let clock_ms = self.observe(now_ms);
        let removed = self.table.write().sweep(now_ms, clock_ms);
        debug!(removed, now_ms, "Purged expired gate states");
        Ok(removed)
    }
}

/// Mode store backed by a hash map. Unknown scopes have no active modes.
#[derive(Default)]
pub struct InMemoryGlobalModeStore {
    modes: RwLock<HashMap<(ScopeLevel, String), GlobalModes>>,
}

impl InMemoryGlobalModeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GlobalModeStore for InMemoryGlobalModeStore {
    async fn get_modes(&self, scope_level: ScopeLevel, scope: &str) -> Result<GlobalModes, PortError> {
        Ok(self
            .modes
            .read()
            .get(&(scope_level, scope.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn put_modes(
        &self,
        scope_level: ScopeLevel,
        scope: &str,
        modes: GlobalModes,
    ) -> Result<(), PortError> {
        self.modes.write().insert((scope_level, scope.to_string()), modes);
        Ok(())
    }
}
