//! # MCP Server
//!
//! Exposes the migration session as six MCP tools. Every tool answers with
//! Markdown; domain failures come back as tool results flagged `is_error`.

use std::path::Path;
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};

use crate::application::auth::validate_auth_file;
use crate::application::session::MigrationSession;
use crate::application::workflow::suggest_workflow;
use crate::domain::capabilities::list_capabilities;
use crate::domain::request::MigrationParams;
use crate::interface::params::{ExecuteParams, SuggestWorkflowParams, ValidateAuthParams};
use crate::strings::messages::SERVER_INSTRUCTIONS;
use crate::strings::responses;

fn text(body: String) -> Vec<Content> {
    vec![Content::text(body)]
}

#[derive(Clone)]
pub struct MigratorXpressServer {
    session: Arc<MigrationSession>,
    tool_router: ToolRouter<Self>,
}

impl MigratorXpressServer {
    pub fn new(session: Arc<MigrationSession>) -> Self {
        Self {
            session,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl MigratorXpressServer {
    #[tool(
        description = "Build and validate a MigratorXpress command without running it. Returns the command with the license masked, an explanation of what it will do, and a handle for execute_command."
    )]
    async fn preview_command(
        &self,
        Parameters(params): Parameters<MigrationParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.session.preview(params).await {
            Ok(preview) => Ok(CallToolResult::success(text(responses::preview(&preview)))),
            Err(e) => {
                tracing::warn!("Preview rejected: {}", e);
                Ok(CallToolResult::error(text(responses::error(&e))))
            }
        }
    }

    #[tool(
        description = "Execute a command previously built by preview_command. Requires the handle and confirmation: true. Each handle runs at most once."
    )]
    async fn execute_command(
        &self,
        Parameters(params): Parameters<ExecuteParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .session
            .execute(&params.handle, params.confirmation)
            .await
        {
            Ok(result) => {
                let body = responses::execution(&result, self.session.config().timeout);
                if result.is_success() {
                    Ok(CallToolResult::success(text(body)))
                } else {
                    Ok(CallToolResult::error(text(body)))
                }
            }
            Err(e) => Ok(CallToolResult::error(text(responses::error(&e)))),
        }
    }

    #[tool(
        description = "Check that a MigratorXpress auth file exists, is valid JSON, and contains the given auth ids."
    )]
    async fn validate_auth_file(
        &self,
        Parameters(params): Parameters<ValidateAuthParams>,
    ) -> Result<CallToolResult, McpError> {
        let ids = params.requested_ids();
        match validate_auth_file(Path::new(&params.file_path), &ids).await {
            Ok(report) => Ok(CallToolResult::success(text(responses::auth_ok(&report)))),
            Err(e) => Ok(CallToolResult::error(text(responses::auth_issue(
                &params.file_path,
                &e,
            )))),
        }
    }

    #[tool(
        description = "List the supported source, target and migration databases, tasks, migration-db modes, load modes and FK modes."
    )]
    async fn list_capabilities(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(text(responses::capabilities(
            &list_capabilities(),
        ))))
    }

    #[tool(
        description = "Suggest the ordered MigratorXpress tasks for migrating between two database types, with an example command per step."
    )]
    async fn suggest_workflow(
        &self,
        Parameters(params): Parameters<SuggestWorkflowParams>,
    ) -> Result<CallToolResult, McpError> {
        match suggest_workflow(
            self.session.builder(),
            &params.source_type,
            &params.target_type,
            params.include_constraints,
        ) {
            Ok(workflow) => Ok(CallToolResult::success(text(responses::workflow(&workflow)))),
            Err(e) => Ok(CallToolResult::error(text(responses::error(&e)))),
        }
    }

    #[tool(
        description = "Report the detected MigratorXpress version, the validated version range and the capabilities of that version."
    )]
    async fn get_version(&self) -> Result<CallToolResult, McpError> {
        let report = self.session.detector().report();
        Ok(CallToolResult::success(text(responses::version(&report))))
    }
}

#[tool_handler]
impl ServerHandler for MigratorXpressServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }
}
