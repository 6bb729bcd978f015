//! Plan operations for the Planner.

use super::Planner;
use crate::{
    error::{PlannerError, Result},
    models::{Plan, PlanSummary},
    params::{CreatePlan, Id, ListPlans, PlanByAnalysis, UpdatePlan},
};

impl Planner {
    /// Creates a plan for a user's analysis, seeding any template phases
    /// and tasks. Fails if the user already has a plan for that analysis.
    pub async fn create_plan(&self, params: &CreatePlan) -> Result<Plan> {
        params.validate()?;
        let params = params.clone();

        self.with_db(move |db| db.create_plan(&params)).await
    }

    /// Retrieves a plan by its ID.
    pub async fn get_plan(&self, params: &Id) -> Result<Option<Plan>> {
        let plan_id = params.id;
        self.with_db(move |db| db.get_plan(plan_id)).await
    }

    /// Retrieves a plan by ID, treating absence as an error.
    pub async fn show_plan(&self, params: &Id) -> Result<Plan> {
        let plan_id = params.id;
        self.get_plan(params)
            .await?
            .ok_or(PlannerError::PlanNotFound { id: plan_id })
    }

    /// Retrieves the plan a user created for an analysis, if any.
    pub async fn get_plan_by_analysis(&self, params: &PlanByAnalysis) -> Result<Option<Plan>> {
        let (user_id, analysis_id) = (params.user_id, params.analysis_id);
        self.with_db(move |db| db.get_plan_by_analysis(user_id, analysis_id)).await
    }

    /// Lists a user's plans, newest first.
    pub async fn list_plans(&self, params: &ListPlans) -> Result<Vec<PlanSummary>> {
        let status = params.validate()?;
        let user_id = params.user_id;

        self.with_db(move |db| db.list_plans(user_id, status)).await
    }

    /// Updates plan title, description, or status.
    pub async fn update_plan(&self, params: &UpdatePlan) -> Result<Plan> {
        let status = params.validate()?;
        let params = params.clone();

        self.with_db(move |db| {
            db.update_plan(
                params.id,
                params.title.as_deref(),
                params.description.as_deref(),
                status,
            )
        })
        .await
    }

    /// Permanently deletes a plan and everything it owns.
    pub async fn delete_plan(&self, params: &Id) -> Result<Plan> {
        let plan_id = params.id;
        self.with_db(move |db| db.delete_plan(plan_id)).await
    }
}
