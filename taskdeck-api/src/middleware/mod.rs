/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Bearer token authentication

pub mod auth;
