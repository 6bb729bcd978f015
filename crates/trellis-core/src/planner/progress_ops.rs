//! Progress and export operations for the Planner.

use super::Planner;
use crate::{
    error::{PlannerError, Result},
    export::{self, ExportOptions},
    models::{ProgressSnapshot, UserProgressSummary},
    params::{ExportPlan, Id, ProgressHistory, UserProgress},
};

impl Planner {
    /// Recomputes and stores one phase's completion percentage.
    pub async fn recompute_phase_completion(&self, params: &Id) -> Result<u8> {
        let phase_id = params.id;
        self.with_db(move |db| db.recompute_phase_completion(phase_id)).await
    }

    /// Recomputes and stores a plan's completion percentage.
    pub async fn recompute_overall_completion(&self, params: &Id) -> Result<u8> {
        let plan_id = params.id;
        self.with_db(move |db| db.recompute_overall_completion(plan_id)).await
    }

    /// Records a progress snapshot for a status change made outside
    /// [`Planner::update_task`].
    pub async fn on_task_status_changed(
        &self,
        plan_id: u64,
        task_id: u64,
    ) -> Result<ProgressSnapshot> {
        self.with_db(move |db| db.on_task_status_changed(plan_id, task_id)).await
    }

    /// A plan's progress snapshots.
    pub async fn progress_history(
        &self,
        params: &ProgressHistory,
    ) -> Result<Vec<ProgressSnapshot>> {
        let (plan_id, newest_first, limit) = (params.plan_id, params.newest_first, params.limit);
        self.with_db(move |db| db.get_progress_history(plan_id, newest_first, limit)).await
    }

    /// Dashboard roll-up of a user's active plans.
    pub async fn user_progress_summary(
        &self,
        params: &UserProgress,
    ) -> Result<UserProgressSummary> {
        let user_id = params.user_id;
        self.with_db(move |db| db.get_user_progress_summary(user_id)).await
    }

    /// Renders a plan as CSV, JSON, or Markdown.
    pub async fn export_plan(&self, params: &ExportPlan) -> Result<String> {
        let options = ExportOptions::try_from(params)?;
        let plan_id = params.plan_id;

        let plan = self
            .with_db(move |db| db.get_plan(plan_id))
            .await?
            .ok_or(PlannerError::PlanNotFound { id: plan_id })?;
        export::render(&plan, &options)
    }
}
