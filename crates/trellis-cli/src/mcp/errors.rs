//! Error handling utilities for MCP server

use rmcp::ErrorData;
use trellis_core::{ErrorKind, PlannerError};

/// Converts a planner error into the MCP error matching its kind.
pub fn to_mcp_error(message: &str, error: &PlannerError) -> ErrorData {
    let text = format!("{message}: {error}");
    match error.kind() {
        ErrorKind::NotFound => ErrorData::resource_not_found(text, None),
        ErrorKind::Validation => ErrorData::invalid_params(text, None),
        ErrorKind::Internal => ErrorData::internal_error(text, None),
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::ErrorCode;

    use super::*;

    #[test]
    fn test_error_codes_follow_kind() {
        let not_found = to_mcp_error("Failed", &PlannerError::TaskNotFound { id: 3 });
        assert_eq!(not_found.code, ErrorCode::RESOURCE_NOT_FOUND);
        assert!(not_found.message.contains("Task with ID 3"));

        let cycle = to_mcp_error(
            "Failed",
            &PlannerError::CircularDependency {
                prerequisite_id: 1,
                dependent_id: 2,
            },
        );
        assert_eq!(cycle.code, ErrorCode::INVALID_PARAMS);

        let internal = to_mcp_error(
            "Failed",
            &PlannerError::Configuration {
                message: "boom".to_string(),
            },
        );
        assert_eq!(internal.code, ErrorCode::INTERNAL_ERROR);
    }
}
