//! Caseflow Storage - Storage Traits and In-Memory Implementation
//!
//! Defines the persistence seams the assignment engine depends on: the
//! assignment store it owns, and the caseworker registry and client directory
//! it only updates through narrow side-effect operations.

mod memory;

pub use memory::{InMemoryStorage, SeedData};

use async_trait::async_trait;
use caseflow_core::{
    Assignment, AssignmentId, AssignmentStatus, CaseOutcome, CaseflowResult, Caseworker,
    CaseworkerId, Client, ClientId, TenantId, Timestamp,
};

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// Update payload for the client directory. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientUpdate {
    /// Current holder pointer
    pub assigned_to: Option<CaseworkerId>,
    /// Caseworker who first brought the client in
    pub onboarded_by: Option<CaseworkerId>,
    pub onboarding_date: Option<Timestamp>,
    pub case_type: Option<String>,
    /// Mirror of the assignment's case status
    pub case_status: Option<String>,
}

impl ClientUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// ============================================================================
// ASSIGNMENT STORE
// ============================================================================

/// Durable record of assignments and their history.
///
/// Implementations must reject any insert or update that would leave a
/// (tenant, client) pair with more than one open assignment, failing with
/// `StorageError::UniqueViolation`.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Insert a new assignment.
    async fn assignment_insert(&self, a: &Assignment) -> CaseflowResult<()>;

    /// Get an assignment by ID.
    async fn assignment_get(&self, id: AssignmentId) -> CaseflowResult<Option<Assignment>>;

    /// Replace a stored assignment with `a`.
    async fn assignment_update(&self, a: &Assignment) -> CaseflowResult<()>;

    /// The open assignment for a client, if any.
    async fn assignment_find_open_for_client(
        &self,
        tenant_id: TenantId,
        client_id: ClientId,
    ) -> CaseflowResult<Option<Assignment>>;

    /// Assignments currently held by a caseworker, oldest first.
    /// An empty `statuses` slice means every status.
    async fn assignment_list_by_caseworker(
        &self,
        caseworker_id: CaseworkerId,
        statuses: &[AssignmentStatus],
    ) -> CaseflowResult<Vec<Assignment>>;

    /// Pending, auto-reassignable assignments whose deadline is before `now`,
    /// earliest deadline first.
    async fn assignment_list_overdue(
        &self,
        now: Timestamp,
        limit: Option<usize>,
    ) -> CaseflowResult<Vec<Assignment>>;
}

// ============================================================================
// CASEWORKER REGISTRY
// ============================================================================

/// Caseworker records owned elsewhere. The engine reads them and adjusts
/// counters; counter updates are atomic in the implementation.
#[async_trait]
pub trait CaseworkerRegistry: Send + Sync {
    /// Get a caseworker by ID.
    async fn caseworker_get(&self, id: CaseworkerId) -> CaseflowResult<Option<Caseworker>>;

    /// Active caseworkers in a tenant that accept new clients.
    async fn caseworker_list_selectable(&self, tenant_id: TenantId) -> CaseflowResult<Vec<Caseworker>>;

    /// Add `delta` to the current workload, floored at zero. Returns the new value.
    async fn caseworker_adjust_workload(&self, id: CaseworkerId, delta: i32) -> CaseflowResult<u32>;

    /// Decrement workload and record a completed case in one step.
    async fn caseworker_record_completion(
        &self,
        id: CaseworkerId,
        outcome: CaseOutcome,
    ) -> CaseflowResult<Caseworker>;
}

// ============================================================================
// CLIENT DIRECTORY
// ============================================================================

/// Client records owned elsewhere; the engine only writes pointer fields.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    /// Get a directory entry by ID.
    async fn client_get(&self, id: ClientId) -> CaseflowResult<Option<Client>>;

    /// Apply pointer-field updates.
    async fn client_update(&self, id: ClientId, update: ClientUpdate) -> CaseflowResult<()>;
}
