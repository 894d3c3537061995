//! # Strings Module
//!
//! User-facing text: fixed messages and the Markdown rendering of tool results.

pub mod messages;
pub mod responses;
