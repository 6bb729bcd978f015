//! Request types for updating models.

use super::TaskStatus;

/// Validated task update, produced from [`crate::params::UpdateTask`].
#[derive(Debug, Default, Clone)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_time: Option<String>,
    pub resources: Option<Vec<String>>,
    pub status: Option<TaskStatus>,
    /// Recorded as `completed_by` when the task transitions to completed
    pub acting_user_id: Option<u64>,
    /// One-time escape hatch for the prerequisite gate
    pub override_prerequisites: bool,
}

impl UpdateTaskRequest {
    /// A request that only changes the status.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Record the acting user.
    pub fn by(mut self, user_id: u64) -> Self {
        self.acting_user_id = Some(user_id);
        self
    }

    /// Allow completion despite incomplete prerequisites.
    pub fn overriding_prerequisites(mut self) -> Self {
        self.override_prerequisites = true;
        self
    }
}

impl TryFrom<crate::params::UpdateTask> for UpdateTaskRequest {
    type Error = crate::PlannerError;

    /// Convert an UpdateTask parameter into a validated request.
    ///
    /// # Errors
    ///
    /// * `PlannerError::InvalidInput` - When the status string is unknown or
    ///   the title is blank
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trellis_core::{models::{TaskStatus, UpdateTaskRequest}, params::UpdateTask};
    ///
    /// let params = UpdateTask {
    ///     id: 1,
    ///     user_id: Some(7),
    ///     status: Some("completed".to_string()),
    ///     ..Default::default()
    /// };
    ///
    /// let request: UpdateTaskRequest = params.try_into()?;
    /// assert_eq!(request.status, Some(TaskStatus::Completed));
    /// assert_eq!(request.acting_user_id, Some(7));
    /// # Result::<(), trellis_core::PlannerError>::Ok(())
    /// ```
    fn try_from(params: crate::params::UpdateTask) -> Result<Self, Self::Error> {
        let status = params.validate()?;

        Ok(Self {
            title: params.title,
            description: params.description,
            estimated_time: params.estimated_time,
            resources: params.resources,
            status,
            acting_user_id: params.user_id,
            override_prerequisites: params.override_prerequisites,
        })
    }
}
