//! # Messages
//!
//! Fixed user-facing text.

pub const SERVER_INSTRUCTIONS: &str = "MigratorXpress MCP server. \
Always call `preview_command` first and show the masked command to the user. \
Only after the user approves, call `execute_command` with the returned handle and `confirmation: true`. \
Use `validate_auth_file` to check credentials files, `list_capabilities` and `get_version` \
for supported databases, tasks and modes, and `suggest_workflow` for a step-by-step migration plan.";

pub const EXECUTION_BLOCKED: &str = "# Execution Blocked

You must set `confirmation: true` to execute a command.
This safety mechanism ensures commands are only executed with explicit approval.

Please review the command carefully and confirm by setting:
```json
{\"confirmation\": true}
```";

pub const TROUBLESHOOTING: &[&str] = &[
    "Check the auth file path and credential IDs",
    "Verify source and target database connectivity",
    "Check migration database connectivity",
    "Verify database names and schema names are correct",
    "Review the full log file for more information",
];

pub const NEXT_STEPS: &[&str] = &[
    "Review the command carefully",
    "Call `execute_command` with the handle below",
    "Set `confirmation: true` to proceed",
];
