//! Display formatting for models and operation results.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and operation outcomes get newtype wrappers so each context
//! formats consistently. All output is markdown.
//!
//! ```rust
//! use trellis_core::display::{OperationStatus, ProgressBar};
//!
//! assert_eq!(ProgressBar(50).to_string(), "▰▰▰▰▰▱▱▱▱▱ 50%");
//! assert!(OperationStatus::success("Reordered 2 tasks").to_string().starts_with("Success:"));
//! ```

pub mod collections;
pub mod format;
pub mod models;
pub mod results;

pub use collections::{Dependencies, PlanSummaries, ProgressHistory, Tasks};
pub use format::{LocalDateTime, OperationStatus, ProgressBar};
pub use results::{CreateResult, DeleteResult, UpdateResult};
