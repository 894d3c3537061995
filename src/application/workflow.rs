//! # Workflow Advisor
//!
//! Suggests the canonical task sequence for a migration between two database
//! kinds, with a masked example command per step.

use serde::Serialize;

use crate::application::builder::CommandBuilder;
use crate::domain::capabilities::{SourceDatabase, Task, TargetDatabase};
use crate::domain::error::{MigrateError, MigrateResult};
use crate::domain::request::MigrationParams;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowStep {
    pub number: usize,
    pub task: Task,
    pub description: &'static str,
    pub example: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workflow {
    pub source: SourceDatabase,
    pub target: TargetDatabase,
    pub include_constraints: bool,
    pub steps: Vec<WorkflowStep>,
    /// Single-invocation alternative using the `all` shorthand.
    pub alternative: WorkflowStep,
}

impl Workflow {
    pub fn tasks(&self) -> Vec<Task> {
        self.steps.iter().map(|s| s.task).collect()
    }
}

fn step_description(task: Task) -> &'static str {
    match task {
        Task::Translate => "Translate source schema DDL to target-compatible DDL",
        Task::Create => "Create target tables from translated DDL",
        Task::Transfer => "Transfer data from source to target tables",
        Task::Diff => "Compare source and target row counts to verify transfer",
        Task::CopyPk => "Copy primary key constraints to target",
        Task::CopyAk => "Copy alternate key (unique) constraints to target",
        Task::CopyFk => "Copy foreign key constraints to target",
        Task::All => "Alternative: run all tasks in a single invocation",
    }
}

fn example_command(
    builder: &CommandBuilder,
    source: SourceDatabase,
    target: TargetDatabase,
    task: Task,
) -> MigrateResult<String> {
    let params = MigrationParams {
        auth_file: Some("auth.json".into()),
        source_db_type: Some(source.as_str().into()),
        source_db_auth_id: Some("source_db".into()),
        source_db_name: Some("mydb".into()),
        target_db_type: Some(target.as_str().into()),
        target_db_auth_id: Some("target_db".into()),
        target_db_name: Some("targetdb".into()),
        migration_db_auth_id: Some("migration_db".into()),
        task_list: Some(vec![task.as_str().into()]),
        ..Default::default()
    };
    Ok(builder.example(&params.validate()?).display().to_string())
}

/// Ordered steps from `source` to `target`.
///
/// With `include_constraints` the three constraint-copy steps (copy_pk,
/// copy_ak, copy_fk) follow the diff; without it the workflow ends at diff.
pub fn suggest_workflow(
    builder: &CommandBuilder,
    source: &str,
    target: &str,
    include_constraints: bool,
) -> MigrateResult<Workflow> {
    let source_kind = SourceDatabase::parse(source).ok_or_else(|| MigrateError::UnsupportedDatabase {
        role: "source",
        kind: source.to_string(),
        supported: SourceDatabase::supported_list(),
    })?;
    let target_kind = TargetDatabase::parse(target).ok_or_else(|| MigrateError::UnsupportedDatabase {
        role: "target",
        kind: target.to_string(),
        supported: TargetDatabase::supported_list(),
    })?;

    let mut steps = Vec::new();
    for task in Task::CANONICAL
        .into_iter()
        .filter(|t| include_constraints || !t.is_constraint_copy())
    {
        steps.push(WorkflowStep {
            number: steps.len() + 1,
            task,
            description: step_description(task),
            example: example_command(builder, source_kind, target_kind, task)?,
        });
    }

    let alternative = WorkflowStep {
        number: 0,
        task: Task::All,
        description: step_description(Task::All),
        example: example_command(builder, source_kind, target_kind, Task::All)?,
    };

    Ok(Workflow {
        source: source_kind,
        target: target_kind,
        include_constraints,
        steps,
        alternative,
    })
}
