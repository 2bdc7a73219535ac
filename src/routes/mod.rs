//! Router Module Index
//!
//! Routing is split by access level; authentication is applied per router in
//! `create_router` rather than per handler.

/// Routes reachable without credentials.
pub mod public;

/// Routes behind the `AuthUser` middleware.
pub mod authenticated;

/// Staff-only restore and audit routes.
pub mod admin;
