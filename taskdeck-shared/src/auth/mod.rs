/// Authentication primitives
///
/// This module provides the secure building blocks for the Taskdeck auth
/// boundary:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: signed bearer token issuance and validation
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Bearer Tokens**: HS256 signing with a fixed one hour lifetime
/// - **Constant-time Comparison**: verification uses constant-time operations
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::auth::password::{hash_password, verify_password};
/// use taskdeck_shared::auth::jwt::TokenService;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// // Bearer token issuance
/// let tokens = TokenService::new("a-secret-of-at-least-32-bytes!!!");
/// let user_id = Uuid::new_v4();
/// let token = tokens.issue(user_id)?;
/// assert_eq!(tokens.verify(&token)?, user_id);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
