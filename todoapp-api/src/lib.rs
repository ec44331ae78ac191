//! # Todoapp API Server Library
//!
//! REST backend for the todo application: account registration and login,
//! per-user todo CRUD with ownership checks, and admin views.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers and route policies
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
