use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::model::AdminUser;
use crate::shared::validation::USERNAME_REGEX;

/// Request DTO for bootstrapping the first admin account
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAdminRequestDto {
    #[validate(
        length(min = 3, max = 50, message = "Username must be 3-50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may contain letters, digits and underscores and must not start with a digit"
        )
    )]
    #[schema(example = "admin")]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "admin@infrastructure-reporter.local")]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Request DTO for admin login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response DTO for a successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    /// HS256 access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: AdminUserDto,
}

/// Admin account as exposed over the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminUserDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<AdminUser> for AdminUserDto {
    fn from(u: AdminUser) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            is_admin: u.is_admin,
            created_at: u.created_at,
            last_login: u.last_login,
        }
    }
}

/// Response DTO for logout
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponseDto {
    pub logged_out: bool,
}
