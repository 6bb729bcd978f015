//! Collection wrapper types for displaying groups of domain objects.
//!
//! Each wrapper handles the empty case with a fixed message and otherwise
//! defers to the element's own `Display`.

use std::{fmt, ops::Index};

use crate::models::{PlanSummary, ProgressSnapshot, Task, TaskDependency};

macro_rules! display_collection {
    ($(#[$meta:meta])* $name:ident, $item:ty, $empty:literal) => {
        $(#[$meta])*
        pub struct $name(pub Vec<$item>);

        impl $name {
            /// Check if the collection is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Number of items in the collection.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Iterate over the items.
            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.0.iter()
            }
        }

        impl Index<usize> for $name {
            type Output = $item;

            fn index(&self, index: usize) -> &Self::Output {
                &self.0[index]
            }
        }

        impl IntoIterator for $name {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<Self::Item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.0.is_empty() {
                    return writeln!(f, $empty);
                }
                for item in &self.0 {
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    };
}

display_collection!(
    /// Plan summaries, as returned by plan listings.
    PlanSummaries,
    PlanSummary,
    "No plans found."
);

display_collection!(
    /// Tasks of a plan or phase, in order.
    Tasks,
    Task,
    "No tasks found."
);

display_collection!(
    /// Dependency edges of a plan.
    Dependencies,
    TaskDependency,
    "No dependencies found."
);

display_collection!(
    /// A plan's progress history.
    ProgressHistory,
    ProgressSnapshot,
    "No progress recorded yet."
);

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::PlanStatus;

    fn summary(id: u64, title: &str) -> PlanSummary {
        PlanSummary {
            id,
            user_id: 1,
            analysis_id: id,
            title: title.to_string(),
            description: None,
            status: PlanStatus::Active,
            completion: 0,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
            total_phases: 2,
            total_tasks: 4,
            completed_tasks: 1,
        }
    }

    #[test]
    fn test_empty_collections() {
        assert_eq!(PlanSummaries(vec![]).to_string(), "No plans found.\n");
        assert_eq!(Tasks(vec![]).to_string(), "No tasks found.\n");
        assert_eq!(ProgressHistory(vec![]).to_string(), "No progress recorded yet.\n");
    }

    #[test]
    fn test_plan_summaries_display() {
        let summaries = PlanSummaries(vec![summary(1, "Launch"), summary(2, "Hiring")]);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].title, "Hiring");

        let output = summaries.to_string();
        assert!(output.contains("## Launch (ID: 1) (1/4)"));
        assert!(output.contains("## Hiring (ID: 2)"));
        assert!(!output.starts_with("# "));
    }
}
