//! Assignment transition events and the audit sink seam

use crate::{Assignment, AssignmentId, AuditError, CaseworkerId, ClientId, TenantId, Timestamp};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of transition being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AssignmentEventKind {
    Created,
    Accepted,
    Activated,
    Reassigned,
    Completed,
    Cancelled,
    /// Escalation found no replacement; status unchanged.
    Flagged,
    /// Escalation attempt budget exhausted; status moved to reassigned.
    Exhausted,
}

impl AssignmentEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentEventKind::Created => "created",
            AssignmentEventKind::Accepted => "accepted",
            AssignmentEventKind::Activated => "activated",
            AssignmentEventKind::Reassigned => "reassigned",
            AssignmentEventKind::Completed => "completed",
            AssignmentEventKind::Cancelled => "cancelled",
            AssignmentEventKind::Flagged => "flagged",
            AssignmentEventKind::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for AssignmentEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational record of one assignment transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssignmentEvent {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub event_id: Uuid,
    pub kind: AssignmentEventKind,
    pub assignment_id: AssignmentId,
    pub tenant_id: TenantId,
    pub client_id: ClientId,
    /// Holder after the transition.
    pub caseworker_id: CaseworkerId,
    pub previous_caseworker_id: Option<CaseworkerId>,
    pub actor_id: Option<CaseworkerId>,
    pub reason: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub occurred_at: Timestamp,
}

impl AssignmentEvent {
    pub fn new(kind: AssignmentEventKind, assignment: &Assignment, occurred_at: Timestamp) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            kind,
            assignment_id: assignment.assignment_id,
            tenant_id: assignment.tenant_id,
            client_id: assignment.client_id,
            caseworker_id: assignment.current_caseworker_id,
            previous_caseworker_id: None,
            actor_id: None,
            reason: None,
            occurred_at,
        }
    }

    pub fn with_previous(mut self, previous: CaseworkerId) -> Self {
        self.previous_caseworker_id = Some(previous);
        self
    }

    pub fn with_actor(mut self, actor: CaseworkerId) -> Self {
        self.actor_id = Some(actor);
        self
    }

    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }
}

/// Fire-and-forget receiver of transition events.
///
/// A failed delivery is logged by the caller and never fails the transition.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AssignmentEvent) -> Result<(), AuditError>;
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _event: AssignmentEvent) -> Result<(), AuditError> {
        Ok(())
    }
}
