//! # Infrastructure Layer
//!
//! Everything that talks to the operating system: spawning the
//! MigratorXpress binary and writing execution logs.

pub mod execution_log;
pub mod process;
pub mod runner;
