/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength checks
/// - [`jwt`]: JWT access/refresh token generation and validation
/// - [`middleware`]: Bearer token extraction and the per-request `AuthContext`
/// - [`authorization`]: Role/permission checks and the todo ownership policy
///
/// # Example
///
/// ```no_run
/// use todoapp_shared::auth::password::{hash_password, verify_password};
/// use todoapp_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use todoapp_shared::models::role::RoleName;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password1")?;
/// assert!(verify_password("user_password1", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), RoleName::User, TokenType::Access);
/// let token = create_token(&claims, "secret-key")?;
/// let validated = validate_token(&token, "secret-key")?;
/// assert_eq!(validated.role, RoleName::User);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
