//! # Interface Layer
//!
//! The MCP surface: tool parameter types and the stdio server.

pub mod params;
pub mod server;
