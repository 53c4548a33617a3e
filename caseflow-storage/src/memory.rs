//! In-memory storage for tests and the development server.

use crate::{AssignmentStore, CaseworkerRegistry, ClientDirectory, ClientUpdate};
use async_trait::async_trait;
use caseflow_core::{
    Assignment, AssignmentId, AssignmentStatus, CaseOutcome, CaseflowError, CaseflowResult,
    Caseworker, CaseworkerId, Client, ClientId, EntityIdType, EntityType, StorageError, TenantId,
    Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Caseworkers and clients to preload into an [`InMemoryStorage`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub caseworkers: Vec<Caseworker>,
    #[serde(default)]
    pub clients: Vec<Client>,
}

/// In-memory implementation of all three storage traits.
///
/// Each map sits behind its own lock; every trait call takes the lock once, so
/// check-and-write sequences (uniqueness, counter updates) are atomic.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStorage {
    assignments: Arc<RwLock<HashMap<AssignmentId, Assignment>>>,
    caseworkers: Arc<RwLock<HashMap<CaseworkerId, Caseworker>>>,
    clients: Arc<RwLock<HashMap<ClientId, Client>>>,
    unavailable: Arc<AtomicBool>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StorageError> {
    lock.read().map_err(|_| StorageError::LockPoisoned)
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StorageError> {
    lock.write().map_err(|_| StorageError::LockPoisoned)
}

fn open_conflict<'a>(
    assignments: &'a HashMap<AssignmentId, Assignment>,
    candidate: &Assignment,
) -> Option<&'a Assignment> {
    if !candidate.status.is_open() {
        return None;
    }
    assignments.values().find(|other| {
        other.assignment_id != candidate.assignment_id
            && other.tenant_id == candidate.tenant_id
            && other.client_id == candidate.client_id
            && other.status.is_open()
    })
}

fn unique_violation(existing: &Assignment) -> CaseflowError {
    StorageError::UniqueViolation {
        entity_type: EntityType::Assignment,
        constraint: "one_open_assignment_per_client".to_string(),
        existing_id: existing.assignment_id.as_uuid(),
    }
    .into()
}

impl InMemoryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage preloaded with caseworkers and clients.
    pub fn with_seed(seed: SeedData) -> CaseflowResult<Self> {
        let storage = Self::new();
        for caseworker in seed.caseworkers {
            storage.insert_caseworker(caseworker)?;
        }
        for client in seed.clients {
            storage.insert_client(client)?;
        }
        Ok(storage)
    }

    /// Make every trait call fail with `StorageError::Unavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                reason: "in-memory storage switched off".to_string(),
            });
        }
        Ok(())
    }

    /// Insert or replace a caseworker record.
    pub fn insert_caseworker(&self, caseworker: Caseworker) -> CaseflowResult<()> {
        write(&self.caseworkers)?.insert(caseworker.caseworker_id, caseworker);
        Ok(())
    }

    /// Insert or replace a client record.
    pub fn insert_client(&self, client: Client) -> CaseflowResult<()> {
        write(&self.clients)?.insert(client.client_id, client);
        Ok(())
    }

    /// Drop a client from the directory, leaving its assignments behind.
    pub fn remove_client(&self, id: ClientId) -> CaseflowResult<Option<Client>> {
        Ok(write(&self.clients)?.remove(&id))
    }

    /// Snapshot of every stored assignment.
    pub fn all_assignments(&self) -> CaseflowResult<Vec<Assignment>> {
        let mut all: Vec<Assignment> = read(&self.assignments)?.values().cloned().collect();
        all.sort_by_key(|a| a.assignment_id);
        Ok(all)
    }

    /// Get count of stored assignments.
    pub fn assignment_count(&self) -> usize {
        read(&self.assignments).map(|m| m.len()).unwrap_or(0)
    }

    /// Clear all stored data.
    pub fn clear(&self) -> CaseflowResult<()> {
        write(&self.assignments)?.clear();
        write(&self.caseworkers)?.clear();
        write(&self.clients)?.clear();
        Ok(())
    }
}

#[async_trait]
impl AssignmentStore for InMemoryStorage {
    async fn assignment_insert(&self, a: &Assignment) -> CaseflowResult<()> {
        self.check_available()?;
        let mut assignments = write(&self.assignments)?;
        if assignments.contains_key(&a.assignment_id) {
            return Err(StorageError::InsertFailed {
                entity_type: EntityType::Assignment,
                reason: "already exists".to_string(),
            }
            .into());
        }
        if let Some(existing) = open_conflict(&assignments, a) {
            return Err(unique_violation(existing));
        }
        assignments.insert(a.assignment_id, a.clone());
        Ok(())
    }

    async fn assignment_get(&self, id: AssignmentId) -> CaseflowResult<Option<Assignment>> {
        self.check_available()?;
        Ok(read(&self.assignments)?.get(&id).cloned())
    }

    async fn assignment_update(&self, a: &Assignment) -> CaseflowResult<()> {
        self.check_available()?;
        let mut assignments = write(&self.assignments)?;
        if !assignments.contains_key(&a.assignment_id) {
            return Err(StorageError::NotFound {
                entity_type: EntityType::Assignment,
                id: a.assignment_id.as_uuid(),
            }
            .into());
        }
        if let Some(existing) = open_conflict(&assignments, a) {
            return Err(unique_violation(existing));
        }
        assignments.insert(a.assignment_id, a.clone());
        Ok(())
    }

    async fn assignment_find_open_for_client(
        &self,
        tenant_id: TenantId,
        client_id: ClientId,
    ) -> CaseflowResult<Option<Assignment>> {
        self.check_available()?;
        Ok(read(&self.assignments)?
            .values()
            .find(|a| a.tenant_id == tenant_id && a.client_id == client_id && a.status.is_open())
            .cloned())
    }

    async fn assignment_list_by_caseworker(
        &self,
        caseworker_id: CaseworkerId,
        statuses: &[AssignmentStatus],
    ) -> CaseflowResult<Vec<Assignment>> {
        self.check_available()?;
        let mut held: Vec<Assignment> = read(&self.assignments)?
            .values()
            .filter(|a| a.current_caseworker_id == caseworker_id)
            .filter(|a| statuses.is_empty() || statuses.contains(&a.status))
            .cloned()
            .collect();
        held.sort_by_key(|a| a.assignment_id);
        Ok(held)
    }

    async fn assignment_list_overdue(
        &self,
        now: Timestamp,
        limit: Option<usize>,
    ) -> CaseflowResult<Vec<Assignment>> {
        self.check_available()?;
        let mut overdue: Vec<Assignment> = read(&self.assignments)?
            .values()
            .filter(|a| a.is_escalation_candidate(now))
            .cloned()
            .collect();
        overdue.sort_by_key(|a| (a.acceptance_deadline, a.assignment_id));
        if let Some(limit) = limit {
            overdue.truncate(limit);
        }
        Ok(overdue)
    }
}

#[async_trait]
impl CaseworkerRegistry for InMemoryStorage {
    async fn caseworker_get(&self, id: CaseworkerId) -> CaseflowResult<Option<Caseworker>> {
        self.check_available()?;
        Ok(read(&self.caseworkers)?.get(&id).cloned())
    }

    async fn caseworker_list_selectable(&self, tenant_id: TenantId) -> CaseflowResult<Vec<Caseworker>> {
        self.check_available()?;
        let mut selectable: Vec<Caseworker> = read(&self.caseworkers)?
            .values()
            .filter(|c| c.tenant_id == tenant_id && c.is_selectable())
            .cloned()
            .collect();
        selectable.sort_by_key(|c| c.caseworker_id);
        Ok(selectable)
    }

    async fn caseworker_adjust_workload(&self, id: CaseworkerId, delta: i32) -> CaseflowResult<u32> {
        self.check_available()?;
        let mut caseworkers = write(&self.caseworkers)?;
        let caseworker = caseworkers.get_mut(&id).ok_or(StorageError::NotFound {
            entity_type: EntityType::Caseworker,
            id: id.as_uuid(),
        })?;
        caseworker.adjust_workload(delta);
        Ok(caseworker.current_workload)
    }

    async fn caseworker_record_completion(
        &self,
        id: CaseworkerId,
        outcome: CaseOutcome,
    ) -> CaseflowResult<Caseworker> {
        self.check_available()?;
        let mut caseworkers = write(&self.caseworkers)?;
        let caseworker = caseworkers.get_mut(&id).ok_or(StorageError::NotFound {
            entity_type: EntityType::Caseworker,
            id: id.as_uuid(),
        })?;
        caseworker.adjust_workload(-1);
        caseworker.record_completion(outcome);
        Ok(caseworker.clone())
    }
}

#[async_trait]
impl ClientDirectory for InMemoryStorage {
    async fn client_get(&self, id: ClientId) -> CaseflowResult<Option<Client>> {
        self.check_available()?;
        Ok(read(&self.clients)?.get(&id).cloned())
    }

    async fn client_update(&self, id: ClientId, update: ClientUpdate) -> CaseflowResult<()> {
        self.check_available()?;
        let mut clients = write(&self.clients)?;
        let client = clients.get_mut(&id).ok_or(StorageError::NotFound {
            entity_type: EntityType::Client,
            id: id.as_uuid(),
        })?;

        if let Some(assigned_to) = update.assigned_to {
            client.assigned_to = Some(assigned_to);
        }
        if let Some(onboarded_by) = update.onboarded_by {
            client.onboarded_by = Some(onboarded_by);
        }
        if let Some(onboarding_date) = update.onboarding_date {
            client.onboarding_date = Some(onboarding_date);
        }
        if let Some(case_type) = update.case_type {
            client.case_type = Some(case_type);
        }
        if let Some(case_status) = update.case_status {
            client.case_status = Some(case_status);
        }
        Ok(())
    }
}
