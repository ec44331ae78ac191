//! # Todoapp Shared Library
//!
//! This crate contains the data model and authentication primitives used by
//! the Todoapp API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, roles, todos) and their queries
//! - `auth`: Password hashing, JWT, request auth context and authorization policy
//! - `db`: Connection pool and schema bootstrap

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Todoapp shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
