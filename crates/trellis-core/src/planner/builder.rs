//! Builder for creating and configuring Planner instances.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::task;

use super::Planner;
use crate::{
    db::{DEFAULT_BUSY_TIMEOUT, Database},
    error::{PlannerError, Result},
};

/// Builder for creating and configuring Planner instances.
#[derive(Debug, Clone)]
pub struct PlannerBuilder {
    database_path: Option<PathBuf>,
    busy_timeout: Duration,
}

impl PlannerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/trellis/trellis.db` or `~/.local/share/trellis/trellis.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets how long an operation waits for another writer to finish.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Builds the configured planner instance.
    ///
    /// Creates the parent directory and initializes the schema once.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::FileSystem` if the database directory cannot be
    /// created, `PlannerError::XdgDirectory` if no default location exists,
    /// and `PlannerError::Database` if schema initialization fails.
    pub async fn build(self) -> Result<Planner> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| PlannerError::FileSystem {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let init_path = db_path.clone();
        let busy_timeout = self.busy_timeout;
        task::spawn_blocking(move || {
            Database::with_busy_timeout(&init_path, busy_timeout).map(|_| ())
        })
        .await
        .map_err(|e| PlannerError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        log::debug!("Using database at {}", db_path.display());
        Ok(Planner::new(db_path, busy_timeout))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("trellis")
            .place_data_file("trellis.db")
            .map_err(|e| PlannerError::XdgDirectory(e.to_string()))
    }
}

impl Default for PlannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
