//! Plan export as CSV, JSON, or Markdown.
//!
//! Exports work on a fully loaded [`Plan`]. Filtering removes tasks of the
//! excluded statuses from the phase/task tree and drops every dependency edge
//! that touches a removed task; phase and plan percentages are exported as
//! stored, not recomputed for the filtered view.

use std::{collections::HashSet, fmt, io, str::FromStr};

use csv::WriterBuilder;
use serde::Serialize;

use crate::{
    error::{PlannerError, Result},
    models::{Plan, Task, TaskStatus},
    params::ExportPlan,
};

/// Header row of the CSV export.
pub const CSV_HEADER: &str =
    "phase,phase_order,task_id,task,status,estimated_time,custom,completed_at,prerequisites";

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Markdown,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "markdown",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(PlannerError::invalid_input("format").with_reason(format!(
                "Invalid format: {s}. Must be 'csv', 'json', or 'markdown'"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub include_completed: bool,
    pub include_skipped: bool,
}

impl ExportOptions {
    /// Export everything in the given format.
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            include_completed: true,
            include_skipped: true,
        }
    }

    fn includes(&self, status: TaskStatus) -> bool {
        match status {
            TaskStatus::Completed => self.include_completed,
            TaskStatus::Skipped => self.include_skipped,
            TaskStatus::NotStarted | TaskStatus::InProgress => true,
        }
    }
}

impl TryFrom<&ExportPlan> for ExportOptions {
    type Error = PlannerError;

    fn try_from(params: &ExportPlan) -> Result<Self> {
        Ok(Self {
            format: params.format.parse()?,
            include_completed: params.include_completed,
            include_skipped: params.include_skipped,
        })
    }
}

/// Copy of `plan` without the tasks the options exclude, and without any
/// edge touching those tasks.
pub fn filter_plan(plan: &Plan, options: &ExportOptions) -> Plan {
    let mut filtered = plan.clone();
    for phase in &mut filtered.phases {
        phase.tasks.retain(|task| options.includes(task.status));
    }

    let kept: HashSet<u64> = filtered.tasks().map(|task| task.id).collect();
    filtered.dependencies.retain(|edge| {
        kept.contains(&edge.prerequisite_task_id) && kept.contains(&edge.dependent_task_id)
    });
    filtered
}

/// Renders the plan in the requested format after filtering.
pub fn render(plan: &Plan, options: &ExportOptions) -> Result<String> {
    let plan = filter_plan(plan, options);
    match options.format {
        ExportFormat::Csv => render_csv(&plan),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(&plan)?),
        ExportFormat::Markdown => Ok(MarkdownExport(&plan).to_string()),
    }
}

/// One CSV line; field order matches [`CSV_HEADER`].
#[derive(Serialize)]
struct CsvRow<'a> {
    phase: &'a str,
    phase_order: u32,
    task_id: u64,
    task: &'a str,
    status: &'static str,
    estimated_time: Option<&'a str>,
    custom: bool,
    completed_at: Option<String>,
    prerequisites: String,
}

fn render_csv(plan: &Plan) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER.split(','))?;

    for phase in &plan.phases {
        for task in &phase.tasks {
            let prerequisites = plan
                .prerequisites_of(task.id)
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(";");
            writer.serialize(CsvRow {
                phase: &phase.name,
                phase_order: phase.order,
                task_id: task.id,
                task: &task.title,
                status: task.status.as_str(),
                estimated_time: task.estimated_time.as_deref(),
                custom: task.is_custom,
                completed_at: task.completed_at.map(|at| at.to_string()),
                prerequisites,
            })?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    let csv = String::from_utf8(bytes)
        .map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))?;
    Ok(csv)
}

/// Markdown checklist view of a plan.
struct MarkdownExport<'a>(&'a Plan);

impl MarkdownExport<'_> {
    fn fmt_task(&self, f: &mut fmt::Formatter<'_>, task: &Task) -> fmt::Result {
        let plan = self.0;
        let mark = if task.status.is_completed() { "x" } else { " " };
        write!(f, "- [{mark}] {}", task.title)?;
        if task.status == TaskStatus::Skipped {
            write!(f, " _(skipped)_")?;
        }
        if let Some(estimate) = &task.estimated_time {
            write!(f, " ({estimate})")?;
        }
        let prerequisites = plan.prerequisites_of(task.id);
        if !prerequisites.is_empty() {
            let titles: Vec<&str> = prerequisites
                .iter()
                .filter_map(|id| plan.task(*id))
                .map(|t| t.title.as_str())
                .collect();
            write!(f, " [after: {}]", titles.join(", "))?;
        }
        writeln!(f)
    }
}

impl fmt::Display for MarkdownExport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.0;
        writeln!(f, "# {}", plan.title)?;
        writeln!(f)?;
        if let Some(description) = &plan.description {
            writeln!(f, "{description}")?;
            writeln!(f)?;
        }
        writeln!(f, "**Status:** {}  ", plan.status.as_str())?;
        writeln!(f, "**Overall completion:** {}%", plan.completion)?;

        for phase in &plan.phases {
            writeln!(f)?;
            writeln!(f, "## {} ({}%)", phase.name, phase.completion)?;
            writeln!(f)?;
            if phase.tasks.is_empty() {
                writeln!(f, "_No tasks_")?;
                continue;
            }
            for task in &phase.tasks {
                self.fmt_task(f, task)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::{Phase, PlanStatus, Task, TaskDependency};

    fn task(id: u64, title: &str, status: TaskStatus) -> Task {
        Task {
            id,
            phase_id: 1,
            plan_id: 1,
            title: title.to_string(),
            description: None,
            estimated_time: None,
            resources: Vec::new(),
            order: id as u32,
            is_custom: false,
            status,
            completed_at: None,
            completed_by: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn edge(id: u64, prerequisite: u64, dependent: u64) -> TaskDependency {
        TaskDependency {
            id,
            plan_id: 1,
            prerequisite_task_id: prerequisite,
            dependent_task_id: dependent,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn plan() -> Plan {
        Plan {
            id: 1,
            user_id: 1,
            analysis_id: 1,
            title: "Launch".to_string(),
            description: None,
            status: PlanStatus::Active,
            completion: 33,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
            phases: vec![Phase {
                id: 1,
                plan_id: 1,
                name: "Build, test".to_string(),
                order: 0,
                completion: 33,
                tasks: vec![
                    task(1, "Design", TaskStatus::Completed),
                    task(2, "Say \"hi\"", TaskStatus::InProgress),
                    task(3, "Polish", TaskStatus::Skipped),
                ],
            }],
            dependencies: vec![edge(1, 1, 2), edge(2, 2, 3)],
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert!("pdf".parse::<ExportFormat>().unwrap_err().is_validation());
    }

    #[test]
    fn test_exclude_completed_drops_tasks_and_edges() {
        let options = ExportOptions {
            include_completed: false,
            ..ExportOptions::new(ExportFormat::Json)
        };
        let filtered = filter_plan(&plan(), &options);
        let ids: Vec<u64> = filtered.tasks().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(filtered.dependencies, vec![edge(2, 2, 3)]);
    }

    #[test]
    fn test_exclude_skipped() {
        let options = ExportOptions {
            include_skipped: false,
            ..ExportOptions::new(ExportFormat::Csv)
        };
        let csv = render(&plan(), &options).unwrap();
        assert!(!csv.contains("Polish"));
        assert!(csv.contains("Design"));
    }

    #[test]
    fn test_csv_quotes_fields() {
        let csv = render(&plan(), &ExportOptions::new(ExportFormat::Csv)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("\"Build, test\",0,2,\"Say \"\"hi\"\"\",in_progress,"));
        assert!(lines[2].ends_with(",1"));
        assert!(lines[3].ends_with(",2"));
    }

    #[test]
    fn test_csv_reads_back_with_embedded_newlines() {
        let mut plan = plan();
        plan.phases[0].tasks[0].title = "Design\nreview".to_string();
        plan.phases[0].tasks[0].estimated_time = Some("2h".to_string());

        let csv = render(&plan, &ExportOptions::new(ExportFormat::Csv)).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>().join(","), CSV_HEADER);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][3], "Design\nreview");
        assert_eq!(&rows[0][5], "2h");
        assert_eq!(&rows[1][5], "");
        assert_eq!(&rows[1][7], "");
        assert_eq!(&rows[2][8], "2");
    }

    #[test]
    fn test_csv_empty_plan_has_header_only() {
        let mut plan = plan();
        plan.phases[0].tasks.clear();
        plan.dependencies.clear();
        let csv = render(&plan, &ExportOptions::new(ExportFormat::Csv)).unwrap();
        assert_eq!(csv.trim_end(), CSV_HEADER);
    }

    #[test]
    fn test_json_mirrors_model() {
        let json = render(&plan(), &ExportOptions::new(ExportFormat::Json)).unwrap();
        let back: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan());
    }

    #[test]
    fn test_markdown_checkboxes() {
        let md = render(&plan(), &ExportOptions::new(ExportFormat::Markdown)).unwrap();
        assert!(md.starts_with("# Launch"));
        assert!(md.contains("## Build, test (33%)"));
        assert!(md.contains("- [x] Design"));
        assert!(md.contains("- [ ] Say \"hi\" [after: Design]"));
        assert!(md.contains("- [ ] Polish _(skipped)_"));
    }
}
