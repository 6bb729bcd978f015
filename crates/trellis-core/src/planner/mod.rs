//! Async facade over the SQLite store.
//!
//! [`Planner`] is what the CLI and the MCP server talk to. It holds only the
//! database location and connection settings; every operation opens a
//! connection on tokio's blocking pool, runs one [`Database`] call, and
//! returns. Writers are serialized by SQLite itself (see [`crate::db`]), so a
//! `Planner` can be shared freely behind an `Arc`.
//!
//! ## Submodules
//!
//! - [`builder`]: [`PlannerBuilder`] for configuring database path and timeouts
//! - [`plan_ops`]: plan lifecycle
//! - [`phase_ops`]: phase creation and removal
//! - [`task_ops`]: task CRUD, status changes, and reordering
//! - [`dependency_ops`]: prerequisite edges and cycle pre-flight
//! - [`progress_ops`]: completion, history, dashboards, and export
//!
//! # Example
//!
//! ```rust,no_run
//! use trellis_core::{PlannerBuilder, params::{CreatePlan, CreateTask}};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = PlannerBuilder::new()
//!     .with_database_path(Some("/tmp/trellis.db"))
//!     .build()
//!     .await?;
//!
//! let plan = planner
//!     .create_plan(&CreatePlan {
//!         user_id: 1,
//!         analysis_id: 42,
//!         title: "Launch the beta".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::task;

use crate::{
    db::Database,
    error::{PlannerError, Result},
};

pub mod builder;
pub mod dependency_ops;
pub mod phase_ops;
pub mod plan_ops;
pub mod progress_ops;
pub mod task_ops;


pub use builder::PlannerBuilder;

/// Main planner interface for managing action plans.
#[derive(Debug, Clone)]
pub struct Planner {
    pub(crate) db_path: PathBuf,
    pub(crate) busy_timeout: Duration,
}

impl Planner {
    pub(crate) fn new(db_path: PathBuf, busy_timeout: Duration) -> Self {
        Self {
            db_path,
            busy_timeout,
        }
    }

    /// Location of the SQLite database file.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Runs `op` against a fresh connection on the blocking thread pool.
    async fn with_db<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();
        let busy_timeout = self.busy_timeout;

        task::spawn_blocking(move || {
            let mut db = Database::with_busy_timeout(&db_path, busy_timeout)?;
            op(&mut db)
        })
        .await
        .map_err(|e| PlannerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
