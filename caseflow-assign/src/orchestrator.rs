//! Assignment Orchestrator
//!
//! Every mutation of an assignment goes through here so history, workload
//! counters and the client directory stay in step. Transitions on one
//! assignment are serialized by its lock; creation is serialized per client.
//!
//! ```text
//! Pending ──accept──→ Accepted ──activate──→ Active ──complete──→ Completed
//!    │  ↑
//!    │  └─ reassign (any open state, or rescue from Reassigned)
//!    ├──escalation exhausted──→ Reassigned
//!    └── cancel (any open state) ──→ Cancelled
//! ```

use crate::audit::TracingAuditSink;
use crate::locks::AssignmentLocks;
use crate::selector::{CandidateSelector, LeastLoadedSelector};
use crate::types::{
    AssignClientRequest, AutoAssignRequest, BulkReassignFailure, BulkReassignRequest,
    BulkReassignResult, CancelRequest, CompleteRequest, EscalationOutcome, FlagReason,
    ReassignRequest,
};
use caseflow_core::{
    Assignment, AssignmentConfig, AssignmentError, AssignmentEvent, AssignmentEventKind,
    AssignmentId, AssignmentStatus, AuditSink, CaseflowError, CaseflowResult, Caseworker,
    CaseworkerId, Client, ClientId, Clock, EntityIdType, EntityType, HistoryEntry, StorageError,
    SystemClock, TenantId, Timestamp, ValidationError,
};
use caseflow_storage::{AssignmentStore, CaseworkerRegistry, ClientDirectory, ClientUpdate};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on one audit delivery.
pub const DEFAULT_AUDIT_TIMEOUT: Duration = Duration::from_secs(2);

const OPEN_STATUSES: [AssignmentStatus; 3] = [
    AssignmentStatus::Pending,
    AssignmentStatus::Accepted,
    AssignmentStatus::Active,
];

/// Core state-transition service for assignments.
pub struct AssignmentOrchestrator {
    store: Arc<dyn AssignmentStore>,
    registry: Arc<dyn CaseworkerRegistry>,
    directory: Arc<dyn ClientDirectory>,
    selector: Arc<dyn CandidateSelector>,
    clock: Arc<dyn Clock>,
    audit: Arc<dyn AuditSink>,
    audit_timeout: Duration,
    locks: AssignmentLocks,
    config: AssignmentConfig,
}

impl AssignmentOrchestrator {
    /// Build an orchestrator with the least-loaded selector, the system clock,
    /// the tracing audit sink and default configuration.
    pub fn new(
        store: Arc<dyn AssignmentStore>,
        registry: Arc<dyn CaseworkerRegistry>,
        directory: Arc<dyn ClientDirectory>,
    ) -> Self {
        Self {
            selector: Arc::new(LeastLoadedSelector::new(Arc::clone(&registry))),
            store,
            registry,
            directory,
            clock: Arc::new(SystemClock),
            audit: Arc::new(TracingAuditSink),
            audit_timeout: DEFAULT_AUDIT_TIMEOUT,
            locks: AssignmentLocks::new(),
            config: AssignmentConfig::default(),
        }
    }

    /// Build an orchestrator over one backend implementing every storage trait.
    pub fn from_storage<S>(storage: Arc<S>) -> Self
    where
        S: AssignmentStore + CaseworkerRegistry + ClientDirectory + 'static,
    {
        let store: Arc<dyn AssignmentStore> = storage.clone();
        let registry: Arc<dyn CaseworkerRegistry> = storage.clone();
        let directory: Arc<dyn ClientDirectory> = storage;
        Self::new(store, registry, directory)
    }

    pub fn with_selector(mut self, selector: Arc<dyn CandidateSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Bound how long a transition waits on the audit sink.
    pub fn with_audit_timeout(mut self, timeout: Duration) -> Self {
        self.audit_timeout = timeout;
        self
    }

    pub fn with_config(mut self, config: AssignmentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn AssignmentStore> {
        &self.store
    }

    pub fn locks(&self) -> &AssignmentLocks {
        &self.locks
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // ========================================================================
    // LOOKUPS
    // ========================================================================

    async fn load_assignment(&self, id: AssignmentId) -> CaseflowResult<Assignment> {
        self.store
            .assignment_get(id)
            .await?
            .ok_or_else(|| CaseflowError::not_found(EntityType::Assignment, id))
    }

    async fn load_caseworker(&self, id: CaseworkerId) -> CaseflowResult<Caseworker> {
        self.registry
            .caseworker_get(id)
            .await?
            .ok_or_else(|| CaseflowError::not_found(EntityType::Caseworker, id))
    }

    async fn load_client(&self, id: ClientId, tenant_id: TenantId) -> CaseflowResult<Client> {
        let client = self
            .directory
            .client_get(id)
            .await?
            .ok_or_else(|| CaseflowError::not_found(EntityType::Client, id))?;
        if !client.is_client() {
            return Err(ValidationError::NotAClient { id: id.as_uuid() }.into());
        }
        if client.tenant_id != tenant_id {
            return Err(ValidationError::TenantMismatch {
                entity_type: EntityType::Client,
                id: id.as_uuid(),
                tenant_id: tenant_id.as_uuid(),
            }
            .into());
        }
        Ok(client)
    }

    /// Load a caseworker who may take the assignment: active and in the tenant.
    async fn load_assignable(&self, id: CaseworkerId, tenant_id: TenantId) -> CaseflowResult<Caseworker> {
        let caseworker = self.load_caseworker(id).await?;
        if !caseworker.is_active {
            return Err(ValidationError::InactiveEntity {
                entity_type: EntityType::Caseworker,
                id: id.as_uuid(),
            }
            .into());
        }
        if caseworker.tenant_id != tenant_id {
            return Err(ValidationError::TenantMismatch {
                entity_type: EntityType::Caseworker,
                id: id.as_uuid(),
                tenant_id: tenant_id.as_uuid(),
            }
            .into());
        }
        Ok(caseworker)
    }

    async fn check_no_open_assignment(
        &self,
        tenant_id: TenantId,
        client_id: ClientId,
        except: Option<AssignmentId>,
    ) -> CaseflowResult<()> {
        if let Some(existing) = self
            .store
            .assignment_find_open_for_client(tenant_id, client_id)
            .await?
        {
            if Some(existing.assignment_id) != except {
                return Err(AssignmentError::Conflict {
                    client_id: client_id.as_uuid(),
                    existing_assignment_id: existing.assignment_id.as_uuid(),
                }
                .into());
            }
        }
        Ok(())
    }

    async fn emit(&self, event: AssignmentEvent) {
        let kind = event.kind;
        let assignment_id = event.assignment_id;
        // Callers may still hold assignment or client locks here.
        match tokio::time::timeout(self.audit_timeout, self.audit.record(event)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(
                    error = %e,
                    kind = %kind,
                    assignment_id = %assignment_id,
                    "Audit sink rejected event"
                );
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.audit_timeout.as_millis() as u64,
                    kind = %kind,
                    assignment_id = %assignment_id,
                    "Audit sink timed out; event dropped"
                );
            }
        }
    }

    // ========================================================================
    // CREATE
    // ========================================================================

    /// Assign a client to an explicitly chosen caseworker.
    ///
    /// # Errors
    /// - `NotFound` if the client or caseworker is missing
    /// - `Validation` if the caseworker is inactive or in another tenant, or
    ///   the directory entry is not a client
    /// - `Conflict` if the client already has an open assignment
    pub async fn assign_client(&self, req: AssignClientRequest) -> CaseflowResult<Assignment> {
        let _client_guard = self.locks.lock_client(req.tenant_id, req.client_id).await;

        self.load_client(req.client_id, req.tenant_id).await?;
        let caseworker = self.load_assignable(req.caseworker_id, req.tenant_id).await?;
        self.check_no_open_assignment(req.tenant_id, req.client_id, None)
            .await?;

        if caseworker.is_at_capacity() {
            tracing::warn!(
                caseworker_id = %caseworker.caseworker_id,
                current_workload = caseworker.current_workload,
                max_client_capacity = ?caseworker.max_client_capacity,
                "Assigning to caseworker at or above capacity"
            );
        }

        let now = self.clock.now();
        let assignment = Assignment::new(
            req.tenant_id,
            req.client_id,
            req.caseworker_id,
            req.assigned_by,
            now,
            &self.config,
        )
        .with_case_type(req.case_type.clone())
        .with_priority(req.priority.unwrap_or_default())
        .with_notes(req.notes);

        self.store
            .assignment_insert(&assignment)
            .await
            .map_err(|e| conflict_from_unique(e, req.client_id))?;
        self.registry
            .caseworker_adjust_workload(req.caseworker_id, 1)
            .await?;
        self.directory
            .client_update(
                req.client_id,
                ClientUpdate {
                    assigned_to: Some(req.caseworker_id),
                    onboarded_by: Some(req.caseworker_id),
                    onboarding_date: Some(now),
                    case_type: req.case_type,
                    case_status: None,
                },
            )
            .await?;

        tracing::info!(
            assignment_id = %assignment.assignment_id,
            client_id = %assignment.client_id,
            caseworker_id = %assignment.current_caseworker_id,
            acceptance_deadline = %assignment.acceptance_deadline,
            "Assignment created"
        );
        self.emit(
            AssignmentEvent::new(AssignmentEventKind::Created, &assignment, now).with_actor(req.assigned_by),
        )
        .await;

        Ok(assignment)
    }

    /// Assign a client to whoever the candidate selector picks.
    ///
    /// # Errors
    /// `NoAvailableCaseworker` when the selector finds nobody, plus everything
    /// [`Self::assign_client`] can return.
    pub async fn auto_assign_client(&self, req: AutoAssignRequest) -> CaseflowResult<Assignment> {
        let chosen = self
            .selector
            .select_caseworker(req.tenant_id, req.case_type.as_deref(), &[])
            .await?
            .ok_or_else(|| AssignmentError::NoAvailableCaseworker {
                tenant_id: req.tenant_id.as_uuid(),
                case_type: req.case_type.clone(),
            })?;
        self.assign_client(req.with_caseworker(chosen)).await
    }

    // ========================================================================
    // HOLDER TRANSITIONS
    // ========================================================================

    /// Pending → Accepted, by the current holder only.
    pub async fn accept_assignment(
        &self,
        assignment_id: AssignmentId,
        caller: CaseworkerId,
    ) -> CaseflowResult<Assignment> {
        let _guard = self.locks.lock_assignment(assignment_id).await;
        let mut assignment = self.load_assignment(assignment_id).await?;

        require_status(&assignment, AssignmentStatus::Pending, "accept")?;
        require_holder(&assignment, caller)?;

        let now = self.clock.now();
        assignment.status = AssignmentStatus::Accepted;
        assignment.accepted_date = Some(now);
        if let Some(entry) = assignment.current_entry_mut() {
            entry.accepted_date = Some(now);
        }
        assignment.updated_at = now;
        self.store.assignment_update(&assignment).await?;

        tracing::info!(
            assignment_id = %assignment_id,
            caseworker_id = %caller,
            "Assignment accepted"
        );
        self.emit(AssignmentEvent::new(AssignmentEventKind::Accepted, &assignment, now).with_actor(caller))
            .await;

        Ok(assignment)
    }

    /// Accepted → Active, by the current holder only.
    pub async fn activate_assignment(
        &self,
        assignment_id: AssignmentId,
        caller: CaseworkerId,
    ) -> CaseflowResult<Assignment> {
        let _guard = self.locks.lock_assignment(assignment_id).await;
        let mut assignment = self.load_assignment(assignment_id).await?;

        require_status(&assignment, AssignmentStatus::Accepted, "activate")?;
        require_holder(&assignment, caller)?;

        let now = self.clock.now();
        assignment.status = AssignmentStatus::Active;
        assignment.updated_at = now;
        self.store.assignment_update(&assignment).await?;

        tracing::info!(assignment_id = %assignment_id, caseworker_id = %caller, "Assignment activated");
        self.emit(AssignmentEvent::new(AssignmentEventKind::Activated, &assignment, now).with_actor(caller))
            .await;

        Ok(assignment)
    }

    // ========================================================================
    // REASSIGNMENT
    // ========================================================================

    /// Move an assignment to a new holder with a fresh acceptance window.
    ///
    /// Allowed from any open status, and from `Reassigned` to rescue an
    /// assignment escalation gave up on.
    pub async fn reassign_client(
        &self,
        assignment_id: AssignmentId,
        req: ReassignRequest,
    ) -> CaseflowResult<Assignment> {
        let _guard = self.locks.lock_assignment(assignment_id).await;
        let assignment = self.load_assignment(assignment_id).await?;
        self.reassign_locked(assignment, req).await
    }

    /// Administrator reassignment.
    pub async fn manual_reassignment(
        &self,
        assignment_id: AssignmentId,
        new_caseworker_id: CaseworkerId,
        reassigned_by: CaseworkerId,
        reason: &str,
    ) -> CaseflowResult<Assignment> {
        self.reassign_client(
            assignment_id,
            ReassignRequest::manual(new_caseworker_id, reassigned_by, reason),
        )
        .await
    }

    /// Body of a reassignment. The caller holds the assignment lock.
    async fn reassign_locked(
        &self,
        mut assignment: Assignment,
        req: ReassignRequest,
    ) -> CaseflowResult<Assignment> {
        let assignment_id = assignment.assignment_id;
        if matches!(
            assignment.status,
            AssignmentStatus::Completed | AssignmentStatus::Cancelled
        ) {
            return Err(CaseflowError::invalid_transition(
                assignment_id,
                assignment.status,
                "reassign",
            ));
        }
        if let Some(expected) = req.expected_holder {
            if !assignment.is_held_by(expected) || !assignment.status.is_open() {
                return Err(AssignmentError::HolderChanged {
                    assignment_id: assignment_id.as_uuid(),
                    expected: expected.as_uuid(),
                    actual: assignment.current_caseworker_id.as_uuid(),
                    status: assignment.status,
                }
                .into());
            }
        }
        let reason = req.reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "reason".to_string(),
            }
            .into());
        }
        if assignment.is_held_by(req.new_caseworker_id) {
            return Err(ValidationError::InvalidValue {
                field: "new_caseworker_id".to_string(),
                reason: "caseworker already holds this assignment".to_string(),
            }
            .into());
        }

        self.load_client(assignment.client_id, assignment.tenant_id)
            .await?;
        self.load_assignable(req.new_caseworker_id, assignment.tenant_id)
            .await?;

        let was_open = assignment.status.is_open();
        // Reopening competes with creation for the client's single open slot.
        let _client_guard = if was_open {
            None
        } else {
            Some(
                self.locks
                    .lock_client(assignment.tenant_id, assignment.client_id)
                    .await,
            )
        };
        if !was_open {
            self.check_no_open_assignment(
                assignment.tenant_id,
                assignment.client_id,
                Some(assignment_id),
            )
            .await?;
        }

        let now = self.clock.now();
        let previous = assignment.current_caseworker_id;
        if let Some(entry) = assignment.current_entry_mut() {
            entry.reassigned_date = Some(now);
        }
        assignment.current_caseworker_id = req.new_caseworker_id;
        assignment.status = AssignmentStatus::Pending;
        assignment.assigned_date = now;
        assignment.accepted_date = None;
        assignment.acceptance_deadline = self.config.deadline_for(now);
        assignment.is_auto_reassigned = req.is_auto_reassignment;
        assignment.auto_reassignment_attempts += 1;
        assignment.requires_attention = false;
        assignment
            .history
            .push(HistoryEntry::new(req.new_caseworker_id, now, req.reassigned_by).with_reason(reason));
        assignment.updated_at = now;

        self.store
            .assignment_update(&assignment)
            .await
            .map_err(|e| conflict_from_unique(e, assignment.client_id))?;
        if was_open {
            self.registry.caseworker_adjust_workload(previous, -1).await?;
        }
        self.registry
            .caseworker_adjust_workload(req.new_caseworker_id, 1)
            .await?;
        self.directory
            .client_update(
                assignment.client_id,
                ClientUpdate {
                    assigned_to: Some(req.new_caseworker_id),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(
            assignment_id = %assignment_id,
            from = %previous,
            to = %req.new_caseworker_id,
            auto = req.is_auto_reassignment,
            attempts = assignment.auto_reassignment_attempts,
            reason = %reason,
            "Assignment reassigned"
        );
        self.emit(
            AssignmentEvent::new(AssignmentEventKind::Reassigned, &assignment, now)
                .with_previous(previous)
                .with_actor(req.reassigned_by)
                .with_reason(reason),
        )
        .await;

        Ok(assignment)
    }

    /// Reassign every open assignment held by `old_caseworker_id`.
    ///
    /// Items are independent: a failure is recorded and the batch continues.
    /// Only the initial lookup can fail the whole call.
    pub async fn bulk_reassignment(&self, req: BulkReassignRequest) -> CaseflowResult<BulkReassignResult> {
        let held = self
            .store
            .assignment_list_by_caseworker(req.old_caseworker_id, &OPEN_STATUSES)
            .await?;

        let mut result = BulkReassignResult::default();
        for assignment in held {
            // The listing is unlocked; the holder is re-checked under each item's lock.
            let item = ReassignRequest::manual(req.new_caseworker_id, req.reassigned_by, &req.reason)
                .with_expected_holder(req.old_caseworker_id);
            match self.reassign_client(assignment.assignment_id, item).await {
                Ok(_) => result.reassigned_count += 1,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        assignment_id = %assignment.assignment_id,
                        "Bulk reassignment item failed"
                    );
                    result.failed_count += 1;
                    result.failures.push(BulkReassignFailure {
                        assignment_id: assignment.assignment_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            from = %req.old_caseworker_id,
            to = %req.new_caseworker_id,
            reassigned = result.reassigned_count,
            failed = result.failed_count,
            "Bulk reassignment finished"
        );
        Ok(result)
    }

    // ========================================================================
    // CLOSING TRANSITIONS
    // ========================================================================

    /// Close an open assignment with a final case status.
    pub async fn complete_assignment(
        &self,
        assignment_id: AssignmentId,
        req: CompleteRequest,
    ) -> CaseflowResult<Assignment> {
        let _guard = self.locks.lock_assignment(assignment_id).await;
        let mut assignment = self.load_assignment(assignment_id).await?;

        if !assignment.status.is_open() {
            return Err(CaseflowError::invalid_transition(
                assignment_id,
                assignment.status,
                "complete",
            ));
        }

        let now = self.clock.now();
        let case_status = req.final_status.as_case_status().to_string();
        assignment.status = AssignmentStatus::Completed;
        assignment.completed_date = Some(now);
        assignment.case_status = Some(case_status.clone());
        if let Some(notes) = req.notes.as_deref() {
            assignment.append_notes(notes);
        }
        assignment.updated_at = now;
        self.store.assignment_update(&assignment).await?;

        let holder = self
            .registry
            .caseworker_record_completion(assignment.current_caseworker_id, req.final_status)
            .await?;
        self.directory
            .client_update(
                assignment.client_id,
                ClientUpdate {
                    case_status: Some(case_status),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(
            assignment_id = %assignment_id,
            caseworker_id = %holder.caseworker_id,
            final_status = %req.final_status,
            case_success_rate = holder.case_success_rate,
            "Assignment completed"
        );
        self.emit(
            AssignmentEvent::new(AssignmentEventKind::Completed, &assignment, now)
                .with_reason(req.final_status.as_case_status()),
        )
        .await;

        Ok(assignment)
    }

    /// Administratively cancel an open assignment.
    pub async fn cancel_assignment(
        &self,
        assignment_id: AssignmentId,
        req: CancelRequest,
    ) -> CaseflowResult<Assignment> {
        let _guard = self.locks.lock_assignment(assignment_id).await;
        let mut assignment = self.load_assignment(assignment_id).await?;

        if !assignment.status.is_open() {
            return Err(CaseflowError::invalid_transition(
                assignment_id,
                assignment.status,
                "cancel",
            ));
        }

        let now = self.clock.now();
        assignment.status = AssignmentStatus::Cancelled;
        assignment.cancelled_date = Some(now);
        assignment.cancellation_reason = Some(req.reason.clone());
        assignment.updated_at = now;
        self.store.assignment_update(&assignment).await?;
        self.registry
            .caseworker_adjust_workload(assignment.current_caseworker_id, -1)
            .await?;

        tracing::info!(
            assignment_id = %assignment_id,
            cancelled_by = %req.cancelled_by,
            reason = %req.reason,
            "Assignment cancelled"
        );
        self.emit(
            AssignmentEvent::new(AssignmentEventKind::Cancelled, &assignment, now)
                .with_actor(req.cancelled_by)
                .with_reason(&req.reason),
        )
        .await;

        Ok(assignment)
    }

    // ========================================================================
    // ESCALATION
    // ========================================================================

    /// Escalate one overdue assignment.
    ///
    /// Re-reads the assignment under its lock, so an accept that won the race
    /// turns this into `Skipped`.
    pub async fn escalate_assignment(&self, assignment_id: AssignmentId) -> CaseflowResult<EscalationOutcome> {
        let _guard = self.locks.lock_assignment(assignment_id).await;
        let mut assignment = self.load_assignment(assignment_id).await?;

        let now = self.clock.now();
        if !assignment.is_escalation_candidate(now) {
            return Ok(EscalationOutcome::Skipped);
        }

        if assignment.attempts_exhausted() {
            tracing::warn!(
                assignment_id = %assignment_id,
                caseworker_id = %assignment.current_caseworker_id,
                attempts = assignment.auto_reassignment_attempts,
                "Escalation attempts exhausted, assignment needs attention"
            );
            self.park_for_attention(
                &mut assignment,
                now,
                AssignmentEventKind::Exhausted,
                &self.config.escalation_reason,
            )
            .await?;
            return Ok(EscalationOutcome::Flagged {
                reason: FlagReason::AttemptsExhausted,
            });
        }

        // Missing or foreign client records can never be reassigned.
        if let Err(e) = self
            .load_client(assignment.client_id, assignment.tenant_id)
            .await
        {
            if !(e.is_not_found() || matches!(e, CaseflowError::Validation(_))) {
                return Err(e);
            }
            tracing::warn!(
                assignment_id = %assignment_id,
                client_id = %assignment.client_id,
                error = %e,
                "Client record unavailable, assignment needs attention"
            );
            self.park_for_attention(
                &mut assignment,
                now,
                AssignmentEventKind::Flagged,
                "client record unavailable",
            )
            .await?;
            return Ok(EscalationOutcome::Flagged {
                reason: FlagReason::ClientUnavailable,
            });
        }

        let holder = assignment.current_caseworker_id;
        let candidate = self
            .selector
            .select_caseworker(assignment.tenant_id, assignment.case_type.as_deref(), &[holder])
            .await?;

        match candidate {
            None => {
                if !assignment.requires_attention {
                    assignment.requires_attention = true;
                    assignment.updated_at = now;
                    self.store.assignment_update(&assignment).await?;
                    self.emit(
                        AssignmentEvent::new(AssignmentEventKind::Flagged, &assignment, now)
                            .with_reason("no available caseworker"),
                    )
                    .await;
                }
                tracing::warn!(
                    assignment_id = %assignment_id,
                    caseworker_id = %holder,
                    "No replacement caseworker available, assignment needs attention"
                );
                Ok(EscalationOutcome::Flagged {
                    reason: FlagReason::NoCandidate,
                })
            }
            Some(replacement) => {
                let req = ReassignRequest {
                    new_caseworker_id: replacement,
                    reassigned_by: self.config.system_actor_id,
                    reason: self.config.escalation_reason.clone(),
                    is_auto_reassignment: true,
                    expected_holder: None,
                };
                self.reassign_locked(assignment, req).await?;
                Ok(EscalationOutcome::Reassigned {
                    from: holder,
                    to: replacement,
                })
            }
        }
    }

    /// Move an overdue assignment out of the sweep's reach: status
    /// `Reassigned`, flagged for attention, holder's workload slot released.
    async fn park_for_attention(
        &self,
        assignment: &mut Assignment,
        now: Timestamp,
        kind: AssignmentEventKind,
        reason: &str,
    ) -> CaseflowResult<()> {
        assignment.status = AssignmentStatus::Reassigned;
        assignment.requires_attention = true;
        assignment.updated_at = now;
        self.store.assignment_update(assignment).await?;
        self.registry
            .caseworker_adjust_workload(assignment.current_caseworker_id, -1)
            .await?;
        self.emit(AssignmentEvent::new(kind, assignment, now).with_reason(reason))
            .await;
        Ok(())
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub async fn get_assignment(&self, assignment_id: AssignmentId) -> CaseflowResult<Assignment> {
        self.load_assignment(assignment_id).await
    }

    /// Full holder history, oldest first.
    pub async fn history(&self, assignment_id: AssignmentId) -> CaseflowResult<Vec<HistoryEntry>> {
        Ok(self.load_assignment(assignment_id).await?.history)
    }

    /// Assignments held by a caseworker, optionally filtered by status.
    pub async fn list_by_caseworker(
        &self,
        caseworker_id: CaseworkerId,
        status: Option<AssignmentStatus>,
    ) -> CaseflowResult<Vec<Assignment>> {
        self.load_caseworker(caseworker_id).await?;
        let statuses: Vec<AssignmentStatus> = status.into_iter().collect();
        self.store
            .assignment_list_by_caseworker(caseworker_id, &statuses)
            .await
    }
}

fn require_status(
    assignment: &Assignment,
    expected: AssignmentStatus,
    operation: &str,
) -> CaseflowResult<()> {
    if assignment.status != expected {
        return Err(CaseflowError::invalid_transition(
            assignment.assignment_id,
            assignment.status,
            operation,
        ));
    }
    Ok(())
}

fn require_holder(assignment: &Assignment, caller: CaseworkerId) -> CaseflowResult<()> {
    if !assignment.is_held_by(caller) {
        return Err(AssignmentError::Unauthorized {
            caller: caller.as_uuid(),
            assignment_id: assignment.assignment_id.as_uuid(),
        }
        .into());
    }
    Ok(())
}

/// A store-level uniqueness violation is the same Conflict the orchestrator
/// reports from its own pre-check.
fn conflict_from_unique(err: CaseflowError, client_id: ClientId) -> CaseflowError {
    match err {
        CaseflowError::Storage(StorageError::UniqueViolation { existing_id, .. }) => {
            AssignmentError::Conflict {
                client_id: client_id.as_uuid(),
                existing_assignment_id: existing_id,
            }
            .into()
        }
        other => other,
    }
}
