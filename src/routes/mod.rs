/// Router Module Index
///
/// Splits the console's routes by who may reach them. Unlike a per-router
/// middleware stack, access is decided once for the whole tree by the auth
/// gate (see `gate::classify`); these modules only group handlers.

/// Health check plus the session endpoints (login, logout).
pub mod public;

/// The `/api/admin/*` JSON API. Every handler also takes `AuthUser`.
pub mod authenticated;

/// Server-rendered login and dashboard pages.
pub mod pages;
