//! # Taskboard Shared Library
//!
//! This crate contains the data layer and authentication utilities shared by
//! the Taskboard API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, projects, tasks, comments)
//! - `auth`: Token issuance/validation, password hashing, authorization policy
//! - `db`: Connection pool and migration helpers

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
