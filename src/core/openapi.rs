use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers, model as auth_model};
use crate::features::issues::{
    dtos as issues_dtos, handlers as issues_handlers, models as issues_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Issues (public)
        issues_handlers::create_issue,
        issues_handlers::list_issues,
        issues_handlers::get_issue,
        issues_handlers::get_issue_photo,
        issues_handlers::export_issues_csv,
        issues_handlers::get_issue_stats,
        issues_handlers::list_categories,
        issues_handlers::list_severities,
        issues_handlers::list_statuses,
        // Issues (admin)
        issues_handlers::update_issue,
        issues_handlers::delete_issue,
        // Auth
        auth_handlers::create_admin,
        auth_handlers::login,
        auth_handlers::logout,
        auth_handlers::get_me,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Issues
            issues_models::IssueCategory,
            issues_models::IssueSeverity,
            issues_models::IssueStatus,
            issues_dtos::IssueResponseDto,
            issues_dtos::CreateIssueDto,
            issues_dtos::UpdateIssueDto,
            issues_dtos::IssueStatsDto,
            ApiResponse<issues_dtos::IssueResponseDto>,
            ApiResponse<Vec<issues_dtos::IssueResponseDto>>,
            ApiResponse<issues_dtos::IssueStatsDto>,
            ApiResponse<Vec<issues_models::IssueCategory>>,
            ApiResponse<Vec<issues_models::IssueSeverity>>,
            ApiResponse<Vec<issues_models::IssueStatus>>,
            // Auth
            auth_model::AuthenticatedUser,
            auth_dtos::CreateAdminRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::LoginResponseDto,
            auth_dtos::AdminUserDto,
            auth_dtos::LogoutResponseDto,
            ApiResponse<auth_dtos::LoginResponseDto>,
            ApiResponse<auth_dtos::AdminUserDto>,
            ApiResponse<auth_dtos::LogoutResponseDto>,
        )
    ),
    tags(
        (name = "issues", description = "Infrastructure issue reports"),
        (name = "auth", description = "Admin accounts and sessions"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Civic Issue Reporter API",
        version = "0.1.0",
        description = "Report and triage infrastructure issues",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_issue_and_auth_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/issues",
            "/api/issues/{id}",
            "/api/issues/{id}/photo",
            "/api/issues/export/csv",
            "/api/issues/stats",
            "/api/auth/login",
            "/api/auth/create-admin",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {}",
                expected
            );
        }
    }

    #[test]
    fn test_swagger_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Town Works".to_string(),
            version: "2.0.0".to_string(),
            description: "Local deployment".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Town Works");
        assert_eq!(doc.info.version, "2.0.0");
        assert_eq!(doc.info.description.as_deref(), Some("Local deployment"));
    }
}
