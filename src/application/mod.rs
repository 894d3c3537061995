//! # Application Layer
//!
//! Command construction, auth file checks, workflow advice, version
//! detection and the preview/execute session that ties them together.

pub mod auth;
pub mod builder;
pub mod handles;
pub mod session;
pub mod version;
pub mod workflow;
