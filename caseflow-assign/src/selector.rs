//! Candidate selection.
//!
//! Picks the least-loaded available caseworker in a tenant, preferring
//! specialists in the requested case type.

use async_trait::async_trait;
use caseflow_core::{CaseflowResult, Caseworker, CaseworkerId, TenantId};
use caseflow_storage::CaseworkerRegistry;
use std::sync::Arc;

/// Chooses a caseworker for a new or escalated assignment.
#[async_trait]
pub trait CandidateSelector: Send + Sync {
    /// Best available caseworker in `tenant_id`, or `None` if nobody qualifies.
    async fn select_caseworker(
        &self,
        tenant_id: TenantId,
        case_type: Option<&str>,
        exclude: &[CaseworkerId],
    ) -> CaseflowResult<Option<CaseworkerId>>;
}

/// Pick from an already-fetched population.
///
/// Candidates must be active and available. Specialists in `case_type` win
/// when there are any; otherwise the whole population is considered. Ties on
/// workload break on caseworker id.
pub fn pick_least_loaded<'a>(
    candidates: &'a [Caseworker],
    case_type: Option<&str>,
    exclude: &[CaseworkerId],
) -> Option<&'a Caseworker> {
    let eligible = || {
        candidates
            .iter()
            .filter(|c| c.is_selectable() && !exclude.contains(&c.caseworker_id))
    };
    let least = |c: &&Caseworker| (c.current_workload, c.caseworker_id);

    if let Some(case_type) = case_type {
        if let Some(best) = eligible().filter(|c| c.has_specialization(case_type)).min_by_key(least) {
            return Some(best);
        }
    }
    eligible().min_by_key(least)
}

/// Selector backed by a caseworker registry.
pub struct LeastLoadedSelector {
    registry: Arc<dyn CaseworkerRegistry>,
}

impl LeastLoadedSelector {
    pub fn new(registry: Arc<dyn CaseworkerRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl CandidateSelector for LeastLoadedSelector {
    async fn select_caseworker(
        &self,
        tenant_id: TenantId,
        case_type: Option<&str>,
        exclude: &[CaseworkerId],
    ) -> CaseflowResult<Option<CaseworkerId>> {
        let population = self.registry.caseworker_list_selectable(tenant_id).await?;
        let choice = pick_least_loaded(&population, case_type, exclude).map(|c| c.caseworker_id);
        tracing::debug!(
            tenant_id = %tenant_id,
            case_type = ?case_type,
            population = population.len(),
            selected = ?choice,
            "Candidate selection"
        );
        Ok(choice)
    }
}
