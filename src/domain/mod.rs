//! # Domain Layer
//!
//! Core definitions: the capability registry, the flag mapping, requests,
//! built commands and their outcomes. No I/O except configuration loading.

pub mod capabilities;
pub mod config;
pub mod error;
pub mod flags;
pub mod request;
pub mod types;
pub mod version;
