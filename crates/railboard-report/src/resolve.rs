//! Run resolution: turning the caller's run/plan selection into the
//! canonical ordered run list.
//!
//! The order produced here (plan entry order, or the single run) is the
//! order the final report uses, independent of fetch completion order.

use railboard_api::{endpoints, ApiClient};
use railboard_core::{ReportError, Run};
use std::collections::HashSet;
use tracing::info;

/// The caller's selection: exactly one of a run or a plan, the latter
/// optionally narrowed to a subset of its runs.
#[derive(Debug, Clone)]
pub enum ReportTarget {
    Run(u64),
    Plan { id: u64, subset: Option<Vec<u64>> },
}

/// Runs to process, in canonical order, plus the plan name when there is one.
#[derive(Debug, Clone)]
pub struct ResolvedRuns {
    pub plan_name: Option<String>,
    pub runs: Vec<Run>,
}

/// Validate the run/plan/subset combination before any fetch starts.
pub fn validate_target(
    run_id: Option<u64>,
    plan_id: Option<u64>,
    subset: Option<Vec<u64>>,
) -> Result<ReportTarget, ReportError> {
    match (run_id, plan_id) {
        (Some(_), Some(_)) => Err(ReportError::Config(
            "give either a run id or a plan id, not both".to_string(),
        )),
        (None, None) => Err(ReportError::Config(
            "either a run id or a plan id is required".to_string(),
        )),
        (Some(run), None) => {
            if subset.is_some() {
                Err(ReportError::Config(
                    "a run subset is only valid together with a plan".to_string(),
                ))
            } else {
                Ok(ReportTarget::Run(run))
            }
        }
        (None, Some(id)) => Ok(ReportTarget::Plan { id, subset }),
    }
}

/// Resolve the target into the concrete run list.
///
/// Every requested subset id must be a member of the plan; the error
/// enumerates the ids that are not.
pub async fn resolve_runs(
    client: &dyn ApiClient,
    target: &ReportTarget,
) -> anyhow::Result<ResolvedRuns> {
    match target {
        ReportTarget::Run(run_id) => {
            let run = endpoints::get_run(client, *run_id)
                .await
                .map_err(|e| ReportError::Api(e.to_string()))?;
            Ok(ResolvedRuns {
                plan_name: None,
                runs: vec![run],
            })
        }
        ReportTarget::Plan { id, subset } => {
            let plan = endpoints::get_plan(client, *id)
                .await
                .map_err(|e| ReportError::Api(e.to_string()))?;
            let mut runs: Vec<Run> = plan
                .entries
                .iter()
                .flat_map(|entry| entry.runs.iter().cloned())
                .collect();

            if let Some(subset) = subset {
                let members: HashSet<u64> = runs.iter().map(|run| run.id).collect();
                let mut missing: Vec<u64> = subset
                    .iter()
                    .copied()
                    .filter(|id| !members.contains(id))
                    .collect();
                if !missing.is_empty() {
                    missing.sort_unstable();
                    return Err(ReportError::Config(format!(
                        "run ids not in plan {}: {missing:?}",
                        plan.id
                    ))
                    .into());
                }
                let wanted: HashSet<u64> = subset.iter().copied().collect();
                runs.retain(|run| wanted.contains(&run.id));
            }

            info!("plan {} resolved to {} runs", plan.id, runs.len());
            Ok(ResolvedRuns {
                plan_name: Some(plan.name),
                runs,
            })
        }
    }
}
