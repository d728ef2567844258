/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, logout)
/// - `tasks`: Task management endpoints

use serde::{Deserialize, Serialize};

pub mod auth;
pub mod health;
pub mod tasks;

/// Simple acknowledgement response
///
/// Used by endpoints that confirm an action instead of returning a
/// resource (`registered`, `logged out`, `task deleted`).
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}

impl MessageResponse {
    /// Creates a response from a static message
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
