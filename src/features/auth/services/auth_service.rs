use chrono::Utc;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    AdminUserDto, CreateAdminRequestDto, LoginRequestDto, LoginResponseDto,
};
use crate::features::auth::model::{AuthenticatedUser, NewAdminUser};
use crate::features::auth::repositories::AdminUserRepository;
use crate::features::auth::services::password::{hash_password, verify_password};
use crate::features::auth::services::token_service::TokenService;
use crate::shared::constants::TOKEN_TYPE_BEARER;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Service for admin accounts and login
pub struct AuthService {
    repo: Arc<dyn AdminUserRepository>,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AdminUserRepository>, token_service: Arc<TokenService>) -> Self {
        Self {
            repo,
            token_service,
        }
    }

    /// Create the first admin account. Refused once any account exists.
    pub async fn create_admin(&self, dto: CreateAdminRequestDto) -> Result<AdminUserDto> {
        if self.repo.count().await? > 0 {
            return Err(AppError::Conflict("Admin user already exists".to_string()));
        }

        let password = dto.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;

        let user = self
            .repo
            .insert(&NewAdminUser {
                username: dto.username,
                email: dto.email,
                password_hash,
                is_admin: true,
            })
            .await?;

        tracing::info!("Admin account '{}' created", user.username);
        Ok(user.into())
    }

    /// Check credentials, record the login and issue an access token
    pub async fn login(&self, dto: LoginRequestDto) -> Result<LoginResponseDto> {
        let mut user = self
            .repo
            .find_by_username(&dto.username)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let password = dto.password;
        let stored_hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))?;

        if !valid {
            tracing::debug!("Failed login for '{}'", user.username);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let now = Utc::now();
        self.repo.record_login(user.id, now).await?;
        user.last_login = Some(now);

        let token = self.token_service.issue_token(&user)?;
        tracing::info!("Admin '{}' logged in", user.username);

        Ok(LoginResponseDto {
            access_token: token.access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: token.expires_in,
            user: user.into(),
        })
    }

    /// Account behind the current session
    pub async fn get_current_user(&self, user: AuthenticatedUser) -> Result<AdminUserDto> {
        self.repo
            .find_by_id(user.user_id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))
    }
}
