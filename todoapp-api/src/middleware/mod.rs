/// Middleware modules for the API server
///
/// - `security`: hardening headers on every response
/// - `authorize`: route-level role and permission policies

pub mod authorize;
pub mod security;
