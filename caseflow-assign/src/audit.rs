//! Audit sink that writes transition events to the tracing pipeline.

use async_trait::async_trait;
use caseflow_core::{AssignmentEvent, AuditError, AuditSink};

/// Emits one structured `tracing` event per transition under the
/// `caseflow::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AssignmentEvent) -> Result<(), AuditError> {
        tracing::info!(
            target: "caseflow::audit",
            event_id = %event.event_id,
            kind = %event.kind,
            assignment_id = %event.assignment_id,
            tenant_id = %event.tenant_id,
            client_id = %event.client_id,
            caseworker_id = %event.caseworker_id,
            previous_caseworker_id = ?event.previous_caseworker_id,
            actor_id = ?event.actor_id,
            reason = ?event.reason,
            occurred_at = %event.occurred_at,
            "Assignment transition"
        );
        Ok(())
    }
}
