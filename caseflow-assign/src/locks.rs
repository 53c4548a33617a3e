//! Per-key async locks serializing read-modify-write cycles.

use caseflow_core::{AssignmentId, ClientId, TenantId};
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of one async mutex per key, created on first use.
#[derive(Debug)]
pub struct KeyedLocks<K: Eq + Hash> {
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Wait for exclusive access to `key`. Released when the guard drops.
    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the shard lock is released before awaiting.
        let mutex = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    /// Drop entries nobody holds or waits on.
    pub fn prune(&self) {
        self.locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Locks used by the orchestrator: one per assignment for transitions, one
/// per (tenant, client) for creation.
#[derive(Debug, Default)]
pub struct AssignmentLocks {
    assignments: KeyedLocks<AssignmentId>,
    clients: KeyedLocks<(TenantId, ClientId)>,
}

impl AssignmentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock_assignment(&self, id: AssignmentId) -> OwnedMutexGuard<()> {
        self.assignments.lock(id).await
    }

    pub async fn lock_client(&self, tenant_id: TenantId, client_id: ClientId) -> OwnedMutexGuard<()> {
        self.clients.lock((tenant_id, client_id)).await
    }

    pub fn prune(&self) {
        self.assignments.prune();
        self.clients.prune();
    }

    /// Number of live lock entries.
    pub fn len(&self) -> usize {
        self.assignments.len() + self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
