//! # Tool Responses
//!
//! Markdown rendering for every tool result. Inputs are already masked;
//! nothing here sees a raw licence value.

use std::time::Duration;

use crate::application::auth::AuthFileReport;
use crate::application::session::Preview;
use crate::application::version::VersionReport;
use crate::application::workflow::{Workflow, WorkflowStep};
use crate::domain::capabilities::{Capabilities, CapabilityEntry, Task};
use crate::domain::error::MigrateError;
use crate::domain::request::MigrationRequest;
use crate::domain::types::{ExecutionResult, ExecutionStatus};
use crate::strings::messages::{EXECUTION_BLOCKED, NEXT_STEPS, TROUBLESHOOTING};

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn code_list<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| format!("`{i}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// What the command will do, in plain words.
pub fn explanation(request: &MigrationRequest) -> String {
    let mut parts = vec![format!(
        "Migrate from source database '{}' to target database '{}'",
        request.source_db_name, request.target_db_name
    )];

    match (request.source_db_type, request.target_db_type) {
        (Some(s), Some(t)) => parts.push(format!("Database types: {s} -> {t}")),
        (Some(s), None) => parts.push(format!("Source database type: {s}")),
        (None, Some(t)) => parts.push(format!("Target database type: {t}")),
        (None, None) => {}
    }
    if let Some(schema) = &request.source_schema_name {
        parts.push(format!("Source schema: {schema}"));
    }
    if let Some(schema) = &request.target_schema_name {
        parts.push(format!("Target schema: {schema}"));
    }

    if request.runs_all() {
        let all: Vec<_> = Task::CANONICAL.iter().map(|t| t.as_str()).collect();
        parts.push(format!("Tasks: all ({})", all.join(", ")));
    } else if request.tasks.is_empty() {
        parts.push("No specific tasks selected (defaults will apply)".to_string());
    } else {
        let tasks: Vec<_> = request.tasks.iter().map(|t| t.as_str()).collect();
        parts.push(format!("Tasks: {}", tasks.join(", ")));
    }

    if let Some(path) = &request.fasttransfer_dir_path {
        let mut info = format!("FastTransfer enabled (path: {path})");
        if let Some(p) = request.fasttransfer_p {
            info.push_str(&format!(", parallelism: {p}"));
        }
        parts.push(info);
    }

    let mut filters = Vec::new();
    if let Some(include) = &request.include_tables {
        filters.push(format!("include: {include}"));
    }
    if let Some(exclude) = &request.exclude_tables {
        filters.push(format!("exclude: {exclude}"));
    }
    if let Some(min) = request.min_rows {
        filters.push(format!("min rows: {min}"));
    }
    if let Some(max) = request.max_rows {
        filters.push(format!("max rows: {max}"));
    }
    if !filters.is_empty() {
        parts.push(format!("Table filters: {}", filters.join(", ")));
    }

    if let Some(run_id) = &request.resume {
        parts.push(format!("Resuming previous run: {run_id}"));
    }
    if request.force {
        parts.push("WARNING: Force flag is set, existing data may be overwritten".to_string());
    }
    if request.license.is_some() {
        parts.push("License key provided (masked in display)".to_string());
    }

    numbered(&parts)
}

pub fn preview(preview: &Preview) -> String {
    let mut out = vec![
        "# MigratorXpress Command Preview".to_string(),
        String::new(),
        "## What this command will do:".to_string(),
        explanation(&preview.request),
    ];

    if !preview.warnings.is_empty() {
        out.push(String::new());
        out.push("## Version Compatibility Warnings".to_string());
        out.extend(preview.warnings.iter().map(|w| format!("- {w}")));
    }

    let steps: Vec<String> = NEXT_STEPS.iter().map(|s| s.to_string()).collect();
    out.extend([
        String::new(),
        "## Command:".to_string(),
        "```bash".to_string(),
        preview.display.clone(),
        "```".to_string(),
        String::new(),
        "## To execute this command:".to_string(),
        numbered(&steps),
        String::new(),
        format!("**Handle**: `{}`", preview.handle),
    ]);
    out.join("\n")
}

pub fn execution(result: &ExecutionResult, timeout: Duration) -> String {
    let headline = match result.status {
        ExecutionStatus::Completed => "Completed",
        ExecutionStatus::Failed => "Failed",
        ExecutionStatus::TimedOut => "Timed Out",
    };
    let exit_code = result
        .exit_code
        .map_or_else(|| "none".to_string(), |c| c.to_string());
    let log = result
        .log_path
        .as_ref()
        .map_or_else(|| "(not written)".to_string(), |p| p.display().to_string());

    let mut out = vec![
        format!("# MigratorXpress {headline}"),
        String::new(),
        format!("**Status**: {}", result.status.as_str()),
        format!("**Return Code**: {exit_code}"),
        format!("**Duration**: {:.2}s", result.elapsed.as_secs_f64()),
        format!("**Log File**: {log}"),
    ];
    if let Some(err) = result.failure(timeout) {
        out.push(format!("**Error**: {err}"));
    }

    out.extend([
        String::new(),
        "## Output:".to_string(),
        "```".to_string(),
        if result.stdout.is_empty() {
            "(no output)".to_string()
        } else {
            result.stdout.clone()
        },
        "```".to_string(),
    ]);
    if !result.stderr.is_empty() {
        out.extend([
            String::new(),
            "## Error Output:".to_string(),
            "```".to_string(),
            result.stderr.clone(),
            "```".to_string(),
        ]);
    }
    if !result.is_success() {
        out.push(String::new());
        out.push("## Troubleshooting:".to_string());
        out.extend(TROUBLESHOOTING.iter().map(|t| format!("- {t}")));
    }
    out.join("\n")
}

pub fn error(err: &MigrateError) -> String {
    match err {
        MigrateError::ConfirmationRequired => EXECUTION_BLOCKED.to_string(),
        MigrateError::MissingParameter(_)
        | MigrateError::InvalidParameter { .. }
        | MigrateError::UnsupportedDatabase { .. } => format!(
            "# Validation Error\n\nThe provided parameters are invalid:\n\n- **{}**: {err}",
            err.kind()
        ),
        MigrateError::LaunchFailed { .. } => format!(
            "# Execution Failed\n\nThe command never ran.\n\n**{}**: {err}\n\n\
             Check that MIGRATORXPRESS_PATH points to an executable MigratorXpress binary.",
            err.kind()
        ),
        _ => format!("# Error\n\n**{}**: {err}", err.kind()),
    }
}

pub fn auth_ok(report: &AuthFileReport) -> String {
    let mut out = vec![
        "# Auth File Validation - OK".to_string(),
        String::new(),
        format!("**File**: {}", report.path.display()),
        "**Valid JSON**: Yes".to_string(),
        format!("**Entries**: {}", report.entry_count),
        format!("**Known auth_ids**: {}", code_list(&report.auth_ids)),
    ];
    if !report.confirmed.is_empty() {
        out.push(format!(
            "**Required auth_ids present**: {}",
            report.confirmed.join(", ")
        ));
    }
    out.join("\n")
}

pub fn auth_issue(file_path: &str, err: &MigrateError) -> String {
    let detail = match err {
        MigrateError::NotFound(_) => format!("- File not found or not a regular file: {file_path}"),
        MigrateError::MissingEntry(ids) => ids
            .iter()
            .map(|id| format!("- Missing auth_id: '{id}'"))
            .collect::<Vec<_>>()
            .join("\n"),
        other => format!("- {other}"),
    };
    format!(
        "# Auth File Validation - Issues Found\n\n**File**: {file_path}\n**Error**: {}\n\n{detail}",
        err.kind()
    )
}

fn entry_section(title: &str, entries: &[CapabilityEntry], bold: bool) -> Vec<String> {
    let mut out = vec![format!("## {title}"), String::new()];
    for entry in entries {
        if bold {
            out.push(format!("- **{}**: {}", entry.name, entry.description));
        } else {
            out.push(format!("- {} ({})", entry.description, entry.name));
        }
    }
    out.push(String::new());
    out
}

pub fn capabilities(caps: &Capabilities) -> String {
    let mut out = vec!["# MigratorXpress Capabilities".to_string(), String::new()];
    out.extend(entry_section("Source Databases", &caps.source_databases, false));
    out.extend(entry_section("Target Databases", &caps.target_databases, false));
    out.extend(entry_section("Migration Database", &caps.migration_databases, false));
    out.extend(entry_section("Available Tasks", &caps.tasks, true));
    out.extend(entry_section("Migration DB Modes", &caps.migration_db_modes, true));
    out.extend(entry_section("Load Modes", &caps.load_modes, true));
    out.extend(entry_section("FK Modes", &caps.fk_modes, true));
    out.join("\n")
}

fn step_section(label: &str, step: &WorkflowStep) -> Vec<String> {
    vec![
        format!("### {label}: {}", step.task),
        step.description.to_string(),
        String::new(),
        "```bash".to_string(),
        step.example.clone(),
        "```".to_string(),
        String::new(),
    ]
}

pub fn workflow(workflow: &Workflow) -> String {
    let mut out = vec![
        "# MigratorXpress Workflow Suggestion".to_string(),
        String::new(),
        format!("**Source**: {}", workflow.source),
        format!("**Target**: {}", workflow.target),
        format!(
            "**Include Constraints**: {}",
            yes_no(workflow.include_constraints)
        ),
        format!(
            "**Task Order**: {}",
            workflow
                .tasks()
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        ),
        String::new(),
        "## Steps:".to_string(),
        String::new(),
    ];
    for step in &workflow.steps {
        out.extend(step_section(&format!("Step {}", step.number), step));
    }
    out.extend(step_section("Alternative", &workflow.alternative));
    out.join("\n")
}

pub fn version(report: &VersionReport) -> String {
    let caps = report.capabilities;
    let mut out = vec![
        "# MigratorXpress Version Information".to_string(),
        String::new(),
        format!(
            "**Version**: {}",
            report
                .version
                .map_or_else(|| "Unknown".to_string(), |v| v.to_string())
        ),
        format!("**Detected**: {}", yes_no(report.detected)),
        format!("**Binary Path**: {}", report.binary_path.display()),
        format!("**Validated Range**: {}", report.validated_range),
        format!("**Known Versions**: {}", code_list(&report.known_versions)),
    ];
    if let Some(warning) = &report.warning {
        out.push(String::new());
        out.push(format!("**Warning**: {warning}"));
    }
    out.extend([
        String::new(),
        "## Supported Source Databases:".to_string(),
        code_list(&caps.source_databases),
        String::new(),
        "## Supported Target Databases:".to_string(),
        code_list(&caps.target_databases),
        String::new(),
        "## Migration Database Types:".to_string(),
        code_list(&caps.migration_db_types),
        String::new(),
        "## Available Tasks:".to_string(),
        code_list(&caps.tasks),
        String::new(),
        "## FK Modes:".to_string(),
        code_list(&caps.fk_modes),
        String::new(),
        "## Migration DB Modes:".to_string(),
        code_list(&caps.migration_db_modes),
        String::new(),
        "## Load Modes:".to_string(),
        code_list(&caps.load_modes),
        String::new(),
        "## Feature Flags:".to_string(),
        format!("- No Banner: {}", yes_no(caps.supports_no_banner)),
        format!("- Version Flag: {}", yes_no(caps.supports_version_flag)),
        format!("- FastTransfer: {}", yes_no(caps.supports_fasttransfer)),
        format!("- License: {}", yes_no(caps.supports_license)),
    ]);
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::builder::CommandBuilder;
    use crate::application::workflow::suggest_workflow;
    use crate::domain::capabilities::list_capabilities;
    use crate::domain::request::minimal_params;

    #[test]
    fn test_explanation_lists_tasks_and_warnings() {
        let mut params = minimal_params();
        params.task_list = Some(vec!["all".into()]);
        params.force = true;
        params.license = Some("SHOULD-NOT-APPEAR".into());
        let text = explanation(&params.validate().unwrap());
        assert!(text.starts_with("1. Migrate from source database 'mydb'"));
        assert!(text.contains("Tasks: all (translate, create, transfer, diff, copy_pk, copy_ak, copy_fk)"));
        assert!(text.contains("WARNING: Force flag"));
        assert!(!text.contains("SHOULD-NOT-APPEAR"));
    }

    #[test]
    fn test_execution_reports_timeout() {
        let result = ExecutionResult {
            status: ExecutionStatus::TimedOut,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            elapsed: Duration::from_secs(3),
            log_path: None,
            command: "MigratorXpress".into(),
        };
        let text = execution(&result, Duration::from_secs(3));
        assert!(text.starts_with("# MigratorXpress Timed Out"));
        assert!(text.contains("**Status**: TimedOut"));
        assert!(text.contains("timed out after 3 seconds"));
        assert!(text.contains("(no output)"));
        assert!(text.contains("## Troubleshooting:"));
    }

    #[test]
    fn test_error_rendering() {
        assert!(error(&MigrateError::ConfirmationRequired).contains("Execution Blocked"));
        let text = error(&MigrateError::MissingParameter("auth_file"));
        assert!(text.contains("# Validation Error"));
        assert!(text.contains("auth_file"));
    }

    #[test]
    fn test_capabilities_and_workflow_render() {
        let text = capabilities(&list_capabilities());
        assert!(text.contains("- Oracle (oracle)"));
        assert!(text.contains("- **copy_fk**: Copy foreign key constraints to target"));

        let wf = suggest_workflow(&CommandBuilder::new("MigratorXpress"), "oracle", "postgresql", true).unwrap();
        let text = workflow(&wf);
        assert!(text.contains(
            "**Task Order**: translate -> create -> transfer -> diff -> copy_pk -> copy_ak -> copy_fk"
        ));
        assert!(text.contains("### Step 7: copy_fk"));
        assert!(text.contains("### Alternative: all"));
    }
}
