use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    AdminUserDto, CreateAdminRequestDto, LoginRequestDto, LoginResponseDto, LogoutResponseDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use validator::Validate;

/// Create the initial admin account
///
/// Only allowed while no account exists.
#[utoipa::path(
    post,
    path = "/api/auth/create-admin",
    request_body = CreateAdminRequestDto,
    responses(
        (status = 201, description = "Admin account created", body = ApiResponse<AdminUserDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Admin user already exists")
    ),
    tag = "auth"
)]
pub async fn create_admin(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<CreateAdminRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<AdminUserDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.create_admin(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(user),
            Some("Admin user created successfully".to_string()),
            None,
        )),
    ))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid username or password")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<LoginResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service.login(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(response),
        Some("Login successful".to_string()),
        None,
    )))
}

/// Logout
///
/// Tokens are stateless; clients discard theirs after this call.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout acknowledged", body = ApiResponse<LogoutResponseDto>)
    ),
    tag = "auth"
)]
pub async fn logout(user: Option<AuthenticatedUser>) -> Json<ApiResponse<LogoutResponseDto>> {
    if let Some(user) = user {
        tracing::info!("Admin '{}' logged out", user.username);
    }

    Json(ApiResponse::success(
        Some(LogoutResponseDto { logged_out: true }),
        Some("Logout successful".to_string()),
        None,
    ))
}

/// Get the admin behind the current token
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current admin retrieved successfully", body = ApiResponse<AdminUserDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<AdminUserDto>>> {
    let user_data = service.get_current_user(user).await?;
    Ok(Json(ApiResponse::success(Some(user_data), None, None)))
}
