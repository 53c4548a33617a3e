//! Caseflow Test Utilities
//!
//! Shared test infrastructure for the Caseflow workspace:
//! - Proptest generators for entity types
//! - A manually advanced clock and recording audit sinks
//! - Fixtures for common assignment scenarios
//! - Custom assertions for the error taxonomy

// Re-export in-memory storage from its source crate
pub use caseflow_storage::{InMemoryStorage, SeedData};

// Re-export core types for convenience
pub use caseflow_core::{
    Assignment, AssignmentConfig, AssignmentError, AssignmentEvent, AssignmentEventKind,
    AssignmentId, AssignmentStatus, AuditError, AuditSink, CaseOutcome, CasePriority,
    CaseflowError, CaseflowResult, Caseworker, CaseworkerId, Client, ClientId, Clock,
    DirectoryRole, EntityIdType, EntityType, StorageError, TenantId, Timestamp, ValidationError,
};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

// ============================================================================
// MANUAL CLOCK
// ============================================================================

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, ts: Timestamp) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = ts;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ============================================================================
// AUDIT SINKS
// ============================================================================

/// Audit sink that keeps every event for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingAuditSink {
    events: Arc<Mutex<Vec<AssignmentEvent>>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AssignmentEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn kinds(&self) -> Vec<AssignmentEventKind> {
        self.events().iter().map(|e| e.kind).collect()
    }

    pub fn events_for(&self, assignment_id: AssignmentId) -> Vec<AssignmentEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.assignment_id == assignment_id)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, event: AssignmentEvent) -> Result<(), AuditError> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
        Ok(())
    }
}

/// Audit sink whose every delivery fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingAuditSink;

#[async_trait]
impl AuditSink for FailingAuditSink {
    async fn record(&self, _event: AssignmentEvent) -> Result<(), AuditError> {
        Err(AuditError::DeliveryFailed {
            reason: "sink offline".to_string(),
        })
    }
}

/// Audit sink that never completes a delivery.
#[derive(Debug, Clone, Copy, Default)]
pub struct StalledAuditSink;

#[async_trait]
impl AuditSink for StalledAuditSink {
    async fn record(&self, _event: AssignmentEvent) -> Result<(), AuditError> {
        std::future::pending().await
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating Caseflow entity types.

    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    pub fn arb_assignment_id() -> impl Strategy<Value = AssignmentId> {
        arb_uuid().prop_map(AssignmentId::new)
    }

    pub fn arb_tenant_id() -> impl Strategy<Value = TenantId> {
        arb_uuid().prop_map(TenantId::new)
    }

    pub fn arb_client_id() -> impl Strategy<Value = ClientId> {
        arb_uuid().prop_map(ClientId::new)
    }

    pub fn arb_caseworker_id() -> impl Strategy<Value = CaseworkerId> {
        arb_uuid().prop_map(CaseworkerId::new)
    }

    /// Generate a Timestamp between 2020 and 2030, on a whole hour.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1_577_836_800i64..1_893_456_000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs - secs % 3600, 0).unwrap_or_else(Utc::now)
        })
    }

    pub fn arb_assignment_status() -> impl Strategy<Value = AssignmentStatus> {
        prop::sample::select(AssignmentStatus::ALL.to_vec())
    }

    pub fn arb_open_status() -> impl Strategy<Value = AssignmentStatus> {
        prop_oneof![
            Just(AssignmentStatus::Pending),
            Just(AssignmentStatus::Accepted),
            Just(AssignmentStatus::Active),
        ]
    }

    pub fn arb_case_priority() -> impl Strategy<Value = CasePriority> {
        prop_oneof![
            Just(CasePriority::Low),
            Just(CasePriority::Medium),
            Just(CasePriority::High),
            Just(CasePriority::Urgent),
        ]
    }

    pub fn arb_case_outcome() -> impl Strategy<Value = CaseOutcome> {
        prop_oneof![
            Just(CaseOutcome::Approved),
            Just(CaseOutcome::Rejected),
            Just(CaseOutcome::CaseClosed),
        ]
    }

    /// A case-type tag drawn from a small fixed vocabulary so overlaps are common.
    pub fn arb_case_type() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["housing", "benefits", "immigration", "family"])
            .prop_map(str::to_string)
    }

    /// A selectable caseworker in `tenant` with random workload and specialization.
    pub fn arb_caseworker(tenant_id: TenantId) -> impl Strategy<Value = Caseworker> {
        (
            "[a-z]{3,10}",
            0u32..20,
            prop::collection::vec(arb_case_type(), 0..3),
        )
            .prop_map(move |(name, workload, tags)| {
                let mut cw = Caseworker::new(tenant_id, &name).with_workload(workload);
                cw.specialization = tags;
                cw.specialization.dedup();
                cw
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// Monday 2024-03-04 10:00 UTC.
    pub fn monday_morning() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Friday 2024-03-01 17:00 UTC.
    pub fn friday_evening() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 17, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// An administrator id used as `assigned_by` in tests.
    pub fn admin_id() -> CaseworkerId {
        CaseworkerId::now_v7()
    }

    pub fn caseworker(tenant_id: TenantId, name: &str) -> Caseworker {
        Caseworker::new(tenant_id, name)
    }

    pub fn specialist(tenant_id: TenantId, name: &str, tags: &[&str]) -> Caseworker {
        Caseworker::new(tenant_id, name).with_specialization(tags)
    }

    pub fn client(tenant_id: TenantId, name: &str) -> Client {
        Client::new(tenant_id, name)
    }

    /// A pending assignment made at `now` with default configuration.
    pub fn pending_assignment(
        tenant_id: TenantId,
        client_id: ClientId,
        holder: CaseworkerId,
        now: Timestamp,
    ) -> Assignment {
        Assignment::new(
            tenant_id,
            client_id,
            holder,
            holder,
            now,
            &AssignmentConfig::default(),
        )
    }

    /// One tenant with two caseworkers and one unassigned client, preloaded
    /// into an in-memory storage.
    #[derive(Debug, Clone)]
    pub struct World {
        pub storage: InMemoryStorage,
        pub tenant_id: TenantId,
        pub alice: CaseworkerId,
        pub bob: CaseworkerId,
        pub client: ClientId,
        pub admin: CaseworkerId,
    }

    impl World {
        /// Alice specializes in housing; Bob in housing and benefits.
        pub fn new() -> Self {
            let tenant_id = TenantId::now_v7();
            let alice = specialist(tenant_id, "alice", &["housing"]);
            let bob = specialist(tenant_id, "bob", &["housing", "benefits"]);
            let client = client(tenant_id, "carol");
            let world = Self {
                tenant_id,
                alice: alice.caseworker_id,
                bob: bob.caseworker_id,
                client: client.client_id,
                admin: admin_id(),
                storage: InMemoryStorage::new(),
            };
            world.add_caseworker(alice);
            world.add_caseworker(bob);
            world.add_client(client);
            world
        }

        pub fn add_caseworker(&self, caseworker: Caseworker) -> CaseworkerId {
            let id = caseworker.caseworker_id;
            if let Err(e) = self.storage.insert_caseworker(caseworker) {
                panic!("failed to seed caseworker: {e}");
            }
            id
        }

        pub fn add_client(&self, client: Client) -> ClientId {
            let id = client.client_id;
            if let Err(e) = self.storage.insert_client(client) {
                panic!("failed to seed client: {e}");
            }
            id
        }

        /// Add a fresh client to the tenant.
        pub fn new_client(&self, name: &str) -> ClientId {
            self.add_client(client(self.tenant_id, name))
        }
    }

    impl Default for World {
        fn default() -> Self {
            Self::new()
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for Caseflow-specific validation.

    use super::*;

    /// Assert that a CaseflowResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &CaseflowResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a CaseflowResult is Err.
    #[track_caller]
    pub fn assert_err<T: std::fmt::Debug>(result: &CaseflowResult<T>) {
        assert!(result.is_err(), "Expected Err, got Ok: {:?}", result);
    }

    /// Assert that a CaseflowResult is a Storage error.
    #[track_caller]
    pub fn assert_storage_error<T: std::fmt::Debug>(result: &CaseflowResult<T>) {
        match result {
            Err(CaseflowError::Storage(_)) => {}
            other => panic!("Expected Storage error, got: {:?}", other),
        }
    }

    /// Assert a NotFound error for `entity_type`, raised by either layer.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &CaseflowResult<T>, entity_type: EntityType) {
        match result {
            Err(CaseflowError::Assignment(AssignmentError::NotFound { entity_type: et, .. }))
            | Err(CaseflowError::Storage(StorageError::NotFound { entity_type: et, .. })) => {
                assert_eq!(*et, entity_type, "Wrong entity type in NotFound error");
            }
            other => panic!("Expected NotFound error for {:?}, got: {:?}", entity_type, other),
        }
    }

    #[track_caller]
    pub fn assert_conflict<T: std::fmt::Debug>(result: &CaseflowResult<T>) {
        match result {
            Err(CaseflowError::Assignment(AssignmentError::Conflict { .. })) => {}
            other => panic!("Expected Conflict error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_unauthorized<T: std::fmt::Debug>(result: &CaseflowResult<T>) {
        match result {
            Err(CaseflowError::Assignment(AssignmentError::Unauthorized { .. })) => {}
            other => panic!("Expected Unauthorized error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_invalid_transition<T: std::fmt::Debug>(result: &CaseflowResult<T>) {
        match result {
            Err(CaseflowError::Assignment(AssignmentError::InvalidStateTransition { .. })) => {}
            other => panic!("Expected InvalidStateTransition error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_no_available_caseworker<T: std::fmt::Debug>(result: &CaseflowResult<T>) {
        match result {
            Err(CaseflowError::Assignment(AssignmentError::NoAvailableCaseworker { .. })) => {}
            other => panic!("Expected NoAvailableCaseworker error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &CaseflowResult<T>) {
        match result {
            Err(CaseflowError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    /// Assert that a CaseflowResult is a Config error.
    #[track_caller]
    pub fn assert_config_error<T: std::fmt::Debug>(result: &CaseflowResult<T>) {
        match result {
            Err(CaseflowError::Config(_)) => {}
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    /// Assert the history is well formed: one entry per holder, the last one
    /// naming the current holder.
    #[track_caller]
    pub fn assert_history_consistent(assignment: &Assignment) {
        let last = assignment
            .current_entry()
            .unwrap_or_else(|| panic!("assignment {} has no history", assignment.assignment_id));
        assert_eq!(
            last.caseworker_id, assignment.current_caseworker_id,
            "last history entry does not name the current holder"
        );
        assert_eq!(last.assigned_date, assignment.assigned_date);
        for entry in &assignment.history[..assignment.history.len() - 1] {
            assert!(
                entry.reassigned_date.is_some(),
                "closed history entry for {} lacks a reassigned date",
                entry.caseworker_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caseflow_storage::{CaseworkerRegistry, ClientDirectory};

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(fixtures::monday_morning());
        let shared = clock.clone();
        clock.advance(Duration::hours(3));
        assert_eq!(shared.now(), fixtures::monday_morning() + Duration::hours(3));
        shared.set(fixtures::friday_evening());
        assert_eq!(clock.now(), fixtures::friday_evening());
    }

    #[tokio::test]
    async fn test_recording_sink_keeps_events() {
        let sink = RecordingAuditSink::new();
        let a = fixtures::pending_assignment(
            TenantId::now_v7(),
            ClientId::now_v7(),
            CaseworkerId::now_v7(),
            fixtures::monday_morning(),
        );
        sink.record(AssignmentEvent::new(AssignmentEventKind::Created, &a, fixtures::monday_morning()))
            .await
            .unwrap();
        assert_eq!(sink.count(), 1);
        assert_eq!(sink.kinds(), vec![AssignmentEventKind::Created]);
        assert_eq!(sink.events_for(a.assignment_id).len(), 1);
    }

    #[tokio::test]
    async fn test_failing_sink_fails() {
        let a = fixtures::pending_assignment(
            TenantId::now_v7(),
            ClientId::now_v7(),
            CaseworkerId::now_v7(),
            fixtures::monday_morning(),
        );
        let result = FailingAuditSink
            .record(AssignmentEvent::new(AssignmentEventKind::Created, &a, fixtures::monday_morning()))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_world_is_seeded() {
        let world = fixtures::World::new();
        assert!(world.storage.caseworker_get(world.alice).await.unwrap().is_some());
        assert!(world.storage.caseworker_get(world.bob).await.unwrap().is_some());
        assert!(world.storage.client_get(world.client).await.unwrap().is_some());
    }

    #[test]
    fn test_assert_history_consistent_on_fresh_assignment() {
        let a = fixtures::pending_assignment(
            TenantId::now_v7(),
            ClientId::now_v7(),
            CaseworkerId::now_v7(),
            fixtures::monday_morning(),
        );
        assertions::assert_history_consistent(&a);
    }

    #[test]
    fn test_assertion_config_error() {
        let config = AssignmentConfig {
            acceptance_window_hours: 0,
            ..AssignmentConfig::default()
        };
        assertions::assert_config_error(&config.validate());
    }

    #[test]
    fn test_assertion_err_on_not_found() {
        let result: CaseflowResult<()> = Err(CaseflowError::not_found(
            EntityType::Assignment,
            AssignmentId::now_v7().as_uuid(),
        ));
        assertions::assert_err(&result);
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_ids_are_distinct_types(
            a in generators::arb_assignment_id(),
            t in generators::arb_tenant_id(),
            c in generators::arb_client_id(),
            w in generators::arb_caseworker_id(),
        ) {
            let a2 = AssignmentId::new(a.as_uuid());
            proptest::prop_assert_eq!(a, a2);
            proptest::prop_assert_eq!(t.as_uuid(), TenantId::new(t.as_uuid()).as_uuid());
            proptest::prop_assert_eq!(c.to_string(), c.as_uuid().to_string());
            proptest::prop_assert_eq!(w.to_string(), w.as_uuid().to_string());
        }

        #[test]
        fn prop_open_statuses_are_open(status in generators::arb_open_status()) {
            proptest::prop_assert!(status.is_open());
            proptest::prop_assert!(!status.is_terminal());
        }

        #[test]
        fn prop_statuses_round_trip_db_str(status in generators::arb_assignment_status()) {
            proptest::prop_assert_eq!(AssignmentStatus::from_db_str(status.as_db_str()).ok(), Some(status));
        }

        #[test]
        fn prop_generated_pending_assignment_is_consistent(
            priority in generators::arb_case_priority(),
            at in generators::arb_timestamp(),
        ) {
            let mut a = fixtures::pending_assignment(
                TenantId::now_v7(),
                ClientId::now_v7(),
                CaseworkerId::now_v7(),
                at,
            );
            a.priority = priority;
            assertions::assert_history_consistent(&a);
            proptest::prop_assert!(a.acceptance_deadline > at);
        }
    }
}
