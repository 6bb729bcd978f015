//! Error types for the planner library.
//!
//! Every failure is surfaced as a [`PlannerError`]. Callers that need to map
//! errors onto a transport (HTTP status codes, MCP error codes) should use
//! [`PlannerError::kind`] rather than matching individual variants.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all planner operations.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Plan not found for the given ID
    #[error("Plan with ID {id} not found")]
    PlanNotFound { id: u64 },
    /// Phase not found for the given ID (or not part of the referenced plan)
    #[error("Phase with ID {id} not found")]
    PhaseNotFound { id: u64 },
    /// Task not found for the given ID
    #[error("Task with ID {id} not found")]
    TaskNotFound { id: u64 },
    /// Dependency edge not found for the given ID
    #[error("Dependency with ID {id} not found")]
    DependencyNotFound { id: u64 },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// A task cannot be its own prerequisite
    #[error("Task {task_id} cannot depend on itself")]
    SelfDependency { task_id: u64 },
    /// The proposed edge would close a cycle in the prerequisite graph
    #[error(
        "Adding task {prerequisite_id} as a prerequisite of task {dependent_id} would create a circular dependency"
    )]
    CircularDependency {
        prerequisite_id: u64,
        dependent_id: u64,
    },
    /// The same edge already exists
    #[error("Task {prerequisite_id} is already a prerequisite of task {dependent_id}")]
    DuplicateDependency {
        prerequisite_id: u64,
        dependent_id: u64,
    },
    /// Two referenced entities live in different plans
    #[error("Cross-plan reference: {reason}")]
    CrossPlanReference { reason: String },
    /// Completion was requested while prerequisites are still open
    #[error("Task {task_id} has incomplete prerequisites: {prerequisite_ids:?}")]
    IncompletePrerequisites {
        task_id: u64,
        prerequisite_ids: Vec<u64>,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// CSV export errors
    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Coarse classification of a [`PlannerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced plan, phase, task, or edge does not exist.
    NotFound,
    /// The request is well-formed but violates an invariant.
    Validation,
    /// Storage, filesystem, or runtime failure.
    Internal,
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> PlannerError {
        PlannerError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> PlannerError {
        PlannerError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl PlannerError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Classifies the error for transport-level mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PlanNotFound { .. }
            | Self::PhaseNotFound { .. }
            | Self::TaskNotFound { .. }
            | Self::DependencyNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidInput { .. }
            | Self::SelfDependency { .. }
            | Self::CircularDependency { .. }
            | Self::DuplicateDependency { .. }
            | Self::CrossPlanReference { .. }
            | Self::IncompletePrerequisites { .. } => ErrorKind::Validation,
            Self::Database { .. }
            | Self::FileSystem { .. }
            | Self::XdgDirectory(_)
            | Self::Serialization { .. }
            | Self::Csv { .. }
            | Self::Configuration { .. } => ErrorKind::Internal,
        }
    }

    /// Returns true for missing plan/phase/task/edge references.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Returns true for invariant violations.
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| PlannerError::database(message).with_source(e))
    }
}

/// Result type alias for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(PlannerError::TaskNotFound { id: 1 }.kind(), ErrorKind::NotFound);
        assert!(PlannerError::DependencyNotFound { id: 9 }.is_not_found());
        assert!(PlannerError::CircularDependency {
            prerequisite_id: 1,
            dependent_id: 2
        }
        .is_validation());
        assert!(PlannerError::invalid_input("title")
            .with_reason("must not be empty")
            .is_validation());
        assert_eq!(
            PlannerError::Configuration {
                message: "boom".into()
            }
            .kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_circular_dependency_message() {
        let err = PlannerError::CircularDependency {
            prerequisite_id: 3,
            dependent_id: 1,
        };
        assert!(err.to_string().contains("circular dependency"));
    }

    #[test]
    fn test_incomplete_prerequisites_message() {
        let err = PlannerError::IncompletePrerequisites {
            task_id: 2,
            prerequisite_ids: vec![1],
        };
        assert!(err.to_string().contains("incomplete prerequisites"));
    }
}
