//! Escalation sweep over overdue pending assignments.

use crate::orchestrator::AssignmentOrchestrator;
use crate::types::SweepReport;
use caseflow_core::{AssignmentError, CaseflowResult};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default cap on assignments escalated per sweep.
pub const DEFAULT_SWEEP_BATCH_SIZE: usize = 500;

/// Runs one escalation pass at a time over the overdue backlog.
pub struct EscalationSweeper {
    orchestrator: Arc<AssignmentOrchestrator>,
    running: Mutex<()>,
    batch_size: usize,
}

impl EscalationSweeper {
    pub fn new(orchestrator: Arc<AssignmentOrchestrator>) -> Self {
        Self {
            orchestrator,
            running: Mutex::new(()),
            batch_size: DEFAULT_SWEEP_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn orchestrator(&self) -> &Arc<AssignmentOrchestrator> {
        &self.orchestrator
    }

    /// Whether a sweep currently holds the run slot.
    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }

    /// Escalate every overdue pending assignment, earliest deadline first.
    ///
    /// A per-item failure is logged and counted; it never stops the sweep.
    ///
    /// # Errors
    /// - `SweepInProgress` if another sweep is already running
    /// - a storage error if the overdue scan itself fails
    pub async fn run_once(&self) -> CaseflowResult<SweepReport> {
        let _running = self
            .running
            .try_lock()
            .map_err(|_| AssignmentError::SweepInProgress)?;

        let now = self.orchestrator.now();
        let overdue = self
            .orchestrator
            .store()
            .assignment_list_overdue(now, Some(self.batch_size))
            .await?;

        let mut report = SweepReport {
            processed: overdue.len(),
            ..Default::default()
        };

        for assignment in overdue {
            match self
                .orchestrator
                .escalate_assignment(assignment.assignment_id)
                .await
            {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        assignment_id = %assignment.assignment_id,
                        "Failed to escalate assignment"
                    );
                    report.failed += 1;
                }
            }
        }

        self.orchestrator.locks().prune();

        if report.is_empty() {
            tracing::trace!("Escalation sweep found nothing overdue");
        } else {
            tracing::info!(
                processed = report.processed,
                reassigned = report.reassigned,
                flagged = report.flagged,
                skipped = report.skipped,
                failed = report.failed,
                "Escalation sweep complete"
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssignClientRequest;
    use caseflow_core::{AssignmentStatus, CaseflowError};
    use caseflow_storage::AssignmentStore;
    use caseflow_test_utils::fixtures::{self, World};
    use caseflow_test_utils::ManualClock;
    use chrono::Duration;

    fn setup() -> (World, ManualClock, EscalationSweeper) {
        let world = World::new();
        let clock = ManualClock::new(fixtures::monday_morning());
        let orchestrator = AssignmentOrchestrator::from_storage(Arc::new(world.storage.clone()))
            .with_clock(Arc::new(clock.clone()));
        (world, clock, EscalationSweeper::new(Arc::new(orchestrator)))
    }

    async fn assign(world: &World, sweeper: &EscalationSweeper, client: caseflow_core::ClientId) {
        sweeper
            .orchestrator()
            .assign_client(AssignClientRequest {
                client_id: client,
                tenant_id: world.tenant_id,
                caseworker_id: world.alice,
                assigned_by: world.admin,
                case_type: Some("housing".to_string()),
                priority: None,
                notes: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_sweep() {
        let (_world, _clock, sweeper) = setup();
        let report = sweeper.run_once().await.unwrap();
        assert!(report.is_empty());
        assert!(!sweeper.is_running());
    }

    #[tokio::test]
    async fn test_sweep_reassigns_overdue() {
        let (world, clock, sweeper) = setup();
        assign(&world, &sweeper, world.client).await;
        assign(&world, &sweeper, world.new_client("second")).await;
        clock.advance(Duration::hours(25));

        let report = sweeper.run_once().await.unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.reassigned, 2);

        for a in world.storage.all_assignments().unwrap() {
            assert_eq!(a.current_caseworker_id, world.bob);
            assert_eq!(a.status, AssignmentStatus::Pending);
        }

        // Fresh deadlines mean an immediate second sweep has nothing to do.
        assert!(sweeper.run_once().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_respects_batch_size() {
        let (world, clock, sweeper) = setup();
        let sweeper = sweeper.with_batch_size(1);
        assign(&world, &sweeper, world.client).await;
        assign(&world, &sweeper, world.new_client("second")).await;
        clock.advance(Duration::hours(25));

        assert_eq!(sweeper.run_once().await.unwrap().processed, 1);
        assert_eq!(sweeper.run_once().await.unwrap().processed, 1);
        assert!(sweeper.run_once().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_auto_reassignment_is_not_scanned() {
        let (world, clock, sweeper) = setup();
        assign(&world, &sweeper, world.client).await;
        let mut stored = world.storage.all_assignments().unwrap().remove(0);
        stored.auto_reassignment_enabled = false;
        world.storage.assignment_update(&stored).await.unwrap();
        clock.advance(Duration::hours(25));

        assert!(sweeper.run_once().await.unwrap().is_empty());
        let untouched = world.storage.all_assignments().unwrap().remove(0);
        assert_eq!(untouched.current_caseworker_id, world.alice);
    }

    #[tokio::test]
    async fn test_concurrent_sweep_is_rejected() {
        let (_world, _clock, sweeper) = setup();
        let _held = sweeper.running.try_lock().unwrap();
        assert!(sweeper.is_running());
        let result = sweeper.run_once().await;
        assert!(matches!(
            result,
            Err(CaseflowError::Assignment(AssignmentError::SweepInProgress))
        ));
    }

    #[tokio::test]
    async fn test_scan_failure_is_returned() {
        let (world, _clock, sweeper) = setup();
        world.storage.set_unavailable(true);
        let result = sweeper.run_once().await;
        assert!(matches!(result, Err(CaseflowError::Storage(_))));
        assert!(!sweeper.is_running());
    }

    #[tokio::test]
    async fn test_sweep_prunes_lock_table() {
        let (world, clock, sweeper) = setup();
        assign(&world, &sweeper, world.client).await;
        clock.advance(Duration::hours(25));
        sweeper.run_once().await.unwrap();
        assert!(sweeper.orchestrator().locks().is_empty());
    }
}
