//! Phase operations for the Planner.

use super::Planner;
use crate::{
    error::{PlannerError, Result},
    models::Phase,
    params::{CreatePhase, Id, require_text},
};

impl Planner {
    /// Adds a phase to a plan.
    pub async fn create_phase(&self, params: &CreatePhase) -> Result<Phase> {
        require_text("name", &params.name)?;
        let params = params.clone();

        self.with_db(move |db| db.create_phase(&params)).await
    }

    /// Retrieves a phase with its tasks.
    pub async fn show_phase(&self, params: &Id) -> Result<Phase> {
        let phase_id = params.id;
        self.with_db(move |db| db.get_phase(phase_id)).await?
            .ok_or(PlannerError::PhaseNotFound { id: phase_id })
    }

    /// Removes a phase together with its tasks and their edges.
    pub async fn delete_phase(&self, params: &Id) -> Result<Phase> {
        let phase_id = params.id;
        self.with_db(move |db| db.delete_phase(phase_id)).await
    }
}
