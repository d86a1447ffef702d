use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::features::issues::handlers;
use crate::features::issues::services::IssueService;

/// Create routes for the issues feature
///
/// Reads and submissions are public. PUT and DELETE check for an admin
/// session through the `RequireAdmin` guard.
pub fn routes(service: Arc<IssueService>, max_body_size: usize) -> Router {
    Router::new()
        .route(
            "/api/issues",
            get(handlers::list_issues).post(handlers::create_issue),
        )
        .route("/api/issues/stats", get(handlers::get_issue_stats))
        .route("/api/issues/export/csv", get(handlers::export_issues_csv))
        .route("/api/issues/categories", get(handlers::list_categories))
        .route("/api/issues/severities", get(handlers::list_severities))
        .route("/api/issues/statuses", get(handlers::list_statuses))
        .route(
            "/api/issues/{id}",
            get(handlers::get_issue)
                .put(handlers::update_issue)
                .delete(handlers::delete_issue),
        )
        .route("/api/issues/{id}/photo", get(handlers::get_issue_photo))
        .layer(DefaultBodyLimit::max(max_body_size))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AuthConfig;
    use crate::core::middleware::session_middleware;
    use crate::features::auth::model::AdminUser;
    use crate::features::auth::TokenService;
    use crate::features::issues::dtos::{IssueResponseDto, IssueStatsDto};
    use crate::features::issues::models::{IssueCategory, IssueSeverity, IssueStatus, NewIssue};
    use crate::features::issues::repositories::memory::InMemoryIssueRepository;
    use crate::features::issues::repositories::IssueRepository;
    use crate::modules::storage::memory::InMemoryPhotoStorage;
    use crate::shared::test_helpers::{create_non_admin_user, with_admin_auth, with_session};
    use crate::shared::types::ApiResponse;
    use axum::http::{header, StatusCode};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;
    use std::time::Duration as StdDuration;

    const BODY_LIMIT: usize = 1024 * 1024;

    struct Harness {
        public: TestServer,
        admin: TestServer,
        service: Arc<IssueService>,
        repo: Arc<InMemoryIssueRepository>,
        storage: Arc<InMemoryPhotoStorage>,
    }

    fn harness() -> Harness {
        let repo = Arc::new(InMemoryIssueRepository::new());
        let storage = Arc::new(InMemoryPhotoStorage::new());
        let service = Arc::new(IssueService::new(repo.clone(), storage.clone()));

        Harness {
            public: TestServer::new(routes(service.clone(), BODY_LIMIT)).unwrap(),
            admin: TestServer::new(with_admin_auth(routes(service.clone(), BODY_LIMIT)))
                .unwrap(),
            service,
            repo,
            storage,
        }
    }

    fn pothole_form() -> MultipartForm {
        MultipartForm::new()
            .add_text("title", "Pothole")
            .add_text("description", "Deep pothole near the school gate")
            .add_text("category", "road")
            .add_text("severity", "high")
            .add_text("latitude", "-6.2")
            .add_text("longitude", "")
    }

    fn photo(name: &str) -> Part {
        Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
            .file_name(name)
            .mime_type("image/jpeg")
    }

    async fn seed(repo: &InMemoryIssueRepository, title: &str, status: IssueStatus, age_days: i64) {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        repo.insert(&NewIssue {
            title: title.to_string(),
            description: "seeded".to_string(),
            category: IssueCategory::Water,
            severity: IssueSeverity::Low,
            status,
            latitude: None,
            longitude: None,
            address: None,
            photo: None,
            reporter_name: None,
            reporter_email: None,
            reporter_phone: None,
            admin_notes: None,
            created_at: base - Duration::days(age_days),
            resolved_at: None,
        })
        .await
        .unwrap();
    }

    fn issue_of(response: &axum_test::TestResponse) -> IssueResponseDto {
        response
            .json::<ApiResponse<IssueResponseDto>>()
            .data
            .expect("issue in response")
    }

    #[tokio::test]
    async fn test_report_resolve_and_reopen() {
        let h = harness();

        let response = h.public.post("/api/issues").multipart(pothole_form()).await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let created = issue_of(&response);
        assert_eq!(created.status, IssueStatus::Reported);
        assert_eq!(created.latitude, Some(-6.2));
        assert_eq!(created.longitude, None);
        assert_eq!(created.resolved_at, None);

        let path = format!("/api/issues/{}", created.id);
        let response = h
            .admin
            .put(&path)
            .json(&json!({ "status": "resolved", "admin_notes": "Patched" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let resolved = issue_of(&response);
        assert_eq!(resolved.status, IssueStatus::Resolved);
        assert_eq!(resolved.admin_notes.as_deref(), Some("Patched"));
        let resolved_at = resolved.resolved_at.expect("resolved_at set");

        let response = h
            .admin
            .put(&path)
            .json(&json!({ "status": "reported" }))
            .await;
        let reopened = issue_of(&response);
        assert_eq!(reopened.status, IssueStatus::Reported);
        assert_eq!(reopened.resolved_at, Some(resolved_at));
        assert_eq!(reopened.admin_notes.as_deref(), Some("Patched"));

        let fetched = issue_of(&h.public.get(&path).await);
        assert_eq!(fetched.resolved_at, Some(resolved_at));
    }

    #[tokio::test]
    async fn test_every_submitted_field_is_returned_on_fetch() {
        let h = harness();
        let form = MultipartForm::new()
            .add_text("title", "Leaking hydrant")
            .add_text("description", "Water running down the curb since Monday")
            .add_text("category", "water")
            .add_text("severity", "critical")
            .add_text("latitude", "40.7505")
            .add_text("longitude", "-73.9934")
            .add_text("address", "456 Elm Street")
            .add_text("reporter_name", "Sarah Johnson")
            .add_text("reporter_email", "sarah.j@email.com")
            .add_text("reporter_phone", "(555) 123-4567")
            .add_part("photo", photo("hydrant leak.png"));

        let created = issue_of(&h.public.post("/api/issues").multipart(form).await);
        let fetched = issue_of(&h.public.get(&format!("/api/issues/{}", created.id)).await);

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.title, "Leaking hydrant");
        assert_eq!(fetched.description, "Water running down the curb since Monday");
        assert_eq!(fetched.category, IssueCategory::Water);
        assert_eq!(fetched.severity, IssueSeverity::Critical);
        assert_eq!(fetched.status, IssueStatus::Reported);
        assert_eq!(fetched.latitude, Some(40.7505));
        assert_eq!(fetched.longitude, Some(-73.9934));
        assert_eq!(fetched.address.as_deref(), Some("456 Elm Street"));
        assert_eq!(fetched.reporter_name.as_deref(), Some("Sarah Johnson"));
        assert_eq!(fetched.reporter_email.as_deref(), Some("sarah.j@email.com"));
        assert_eq!(fetched.reporter_phone.as_deref(), Some("(555) 123-4567"));
        assert_eq!(fetched.photo_original_name.as_deref(), Some("hydrant_leak.png"));
        assert_eq!(fetched.photo_filename, created.photo_filename);
        assert!(fetched
            .photo_filename
            .as_deref()
            .is_some_and(|name| name.ends_with(".png")));
        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(fetched.updated_at, created.updated_at);
        assert_eq!(fetched.admin_notes, None);
        assert_eq!(fetched.resolved_at, None);
    }

    #[tokio::test]
    async fn test_update_ignores_unknown_values_and_clears_notes() {
        let h = harness();
        let created = issue_of(&h.public.post("/api/issues").multipart(pothole_form()).await);
        let path = format!("/api/issues/{}", created.id);

        h.admin
            .put(&path)
            .json(&json!({ "admin_notes": "Crew scheduled" }))
            .await;

        let response = h
            .admin
            .put(&path)
            .json(&json!({ "status": "closed", "severity": "extreme", "admin_notes": null }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let updated = issue_of(&response);
        assert_eq!(updated.status, IssueStatus::Reported);
        assert_eq!(updated.severity, IssueSeverity::High);
        assert_eq!(updated.admin_notes, None);
    }

    #[tokio::test]
    async fn test_update_rejects_malformed_json() {
        let h = harness();
        let created = issue_of(&h.public.post("/api/issues").multipart(pothole_form()).await);

        let response = h
            .admin
            .put(&format!("/api/issues/{}", created.id))
            .text("{not json")
            .content_type("application/json")
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_with_invalid_category_persists_nothing() {
        let h = harness();
        let form = MultipartForm::new()
            .add_text("title", "Bridge crack")
            .add_text("description", "Crack along the deck")
            .add_text("category", "bridges")
            .add_text("severity", "high")
            .add_part("photo", photo("crack.jpg"));

        let response = h.public.post("/api/issues").multipart(form).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["success"], json!(false));
        assert!(body["errors"].is_array());
        assert!(h.repo.snapshot().is_empty());
        assert!(h.storage.names().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_missing_field_is_rejected() {
        let h = harness();
        let form = MultipartForm::new()
            .add_text("title", "No description")
            .add_text("category", "road")
            .add_text("severity", "low");

        let response = h.public.post("/api/issues").multipart(form).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(h.repo.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_photo_is_stored_and_served() {
        let h = harness();
        let form = pothole_form().add_part("photo", photo("Pothole 1.JPG"));

        let created = issue_of(&h.public.post("/api/issues").multipart(form).await);
        let stored = created.photo_filename.clone().expect("photo stored");
        assert!(stored.ends_with(".jpg"));
        assert_eq!(created.photo_original_name.as_deref(), Some("Pothole_1.JPG"));
        assert!(h.storage.contains(&stored));

        let response = h
            .public
            .get(&format!("/api/issues/{}/photo", created.id))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.header(header::CONTENT_TYPE), "image/jpeg");
        assert_eq!(response.as_bytes().to_vec(), vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[tokio::test]
    async fn test_disallowed_photo_is_ignored() {
        let h = harness();
        let form = pothole_form().add_part("photo", photo("notes.pdf"));

        let response = h.public.post("/api/issues").multipart(form).await;

        assert_eq!(response.status_code(), StatusCode::CREATED);
        let created = issue_of(&response);
        assert_eq!(created.photo_filename, None);
        assert!(h.storage.names().is_empty());

        let response = h
            .public
            .get(&format!("/api/issues/{}/photo", created.id))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_storage_failure_persists_nothing() {
        let h = harness();
        h.storage.fail_saves();
        let form = pothole_form().add_part("photo", photo("a.png"));

        let response = h.public.post("/api/issues").multipart(form).await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(h.repo.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_and_ignores_invalid_filters() {
        let h = harness();
        seed(&h.repo, "older", IssueStatus::Resolved, 5).await;
        seed(&h.repo, "newer", IssueStatus::Resolved, 1).await;
        seed(&h.repo, "open", IssueStatus::Reported, 3).await;

        let response = h.public.get("/api/issues").await;
        let body = response.json::<ApiResponse<Vec<IssueResponseDto>>>();
        let titles: Vec<String> = body.data.unwrap().into_iter().map(|i| i.title).collect();
        assert_eq!(titles, ["newer", "open", "older"]);
        assert_eq!(body.meta.map(|m| m.total), Some(3));

        let response = h
            .public
            .get("/api/issues")
            .add_query_param("category", "bridges")
            .add_query_param("status", "resolved")
            .await;
        let titles: Vec<String> = response
            .json::<ApiResponse<Vec<IssueResponseDto>>>()
            .data
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, ["newer", "older"]);
    }

    #[tokio::test]
    async fn test_get_missing_issue_is_not_found() {
        let h = harness();
        let response = h.public.get("/api/issues/999").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_mutations_require_admin() {
        let h = harness();
        let created = issue_of(&h.public.post("/api/issues").multipart(pothole_form()).await);
        let path = format!("/api/issues/{}", created.id);
        let clerk = TestServer::new(with_session(
            routes(h.service.clone(), BODY_LIMIT),
            create_non_admin_user(),
        ))
        .unwrap();

        let anonymous_put = h
            .public
            .put(&path)
            .json(&json!({ "status": "resolved" }))
            .await;
        assert_eq!(anonymous_put.status_code(), StatusCode::UNAUTHORIZED);

        let anonymous_delete = h.public.delete(&path).await;
        assert_eq!(anonymous_delete.status_code(), StatusCode::UNAUTHORIZED);

        let clerk_put = clerk.put(&path).json(&json!({ "status": "resolved" })).await;
        assert_eq!(clerk_put.status_code(), StatusCode::FORBIDDEN);

        let clerk_delete = clerk.delete(&path).await;
        assert_eq!(clerk_delete.status_code(), StatusCode::FORBIDDEN);

        let unchanged = h.repo.snapshot();
        assert_eq!(unchanged.len(), 1);
        assert_eq!(unchanged[0].status, IssueStatus::Reported);
    }

    #[tokio::test]
    async fn test_bearer_token_grants_admin_session() {
        let h = harness();
        let tokens = Arc::new(TokenService::new(&AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            token_ttl: StdDuration::from_secs(600),
            jwt_leeway: StdDuration::from_secs(0),
        }));
        let server = TestServer::new(routes(h.service.clone(), BODY_LIMIT).layer(
            axum::middleware::from_fn_with_state(tokens.clone(), session_middleware),
        ))
        .unwrap();

        let token = tokens
            .issue_token(&AdminUser {
                id: 1,
                username: "admin".to_string(),
                email: "admin@example.org".to_string(),
                password_hash: String::new(),
                is_admin: true,
                created_at: Utc::now(),
                last_login: None,
            })
            .unwrap()
            .access_token;

        let created = issue_of(&server.post("/api/issues").multipart(pothole_form()).await);
        let path = format!("/api/issues/{}", created.id);

        let rejected = server
            .put(&path)
            .authorization_bearer("forged.token.value")
            .json(&json!({ "status": "verified" }))
            .await;
        assert_eq!(rejected.status_code(), StatusCode::UNAUTHORIZED);

        let accepted = server
            .put(&path)
            .authorization_bearer(&token)
            .json(&json!({ "status": "verified" }))
            .await;
        assert_eq!(accepted.status_code(), StatusCode::OK);
        assert_eq!(issue_of(&accepted).status, IssueStatus::Verified);
    }

    #[tokio::test]
    async fn test_delete_returns_no_content() {
        let h = harness();
        let form = pothole_form().add_part("photo", photo("a.jpg"));
        let created = issue_of(&h.public.post("/api/issues").multipart(form).await);
        let path = format!("/api/issues/{}", created.id);

        let response = h.admin.delete(&path).await;
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
        assert!(response.text().is_empty());
        assert!(h.storage.names().is_empty());

        assert_eq!(h.public.get(&path).await.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(h.admin.delete(&path).await.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_csv_attachment() {
        let h = harness();
        seed(&h.repo, "first", IssueStatus::Reported, 2).await;
        seed(&h.repo, "second", IssueStatus::Verified, 1).await;

        let response = h.public.get("/api/issues/export/csv").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let disposition = response.header(header::CONTENT_DISPOSITION);
        let disposition = disposition.to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=issues_export_"));
        assert!(disposition.ends_with(".csv"));

        let text = response.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID,Title,Description,Category,Severity,Status"));
        assert!(lines[0].ends_with("Admin Notes,Resolved Date"));
        assert!(lines[1].contains(",second,"));
    }

    #[tokio::test]
    async fn test_stats_and_enum_lists() {
        let h = harness();
        seed(&h.repo, "a", IssueStatus::Reported, 1).await;
        seed(&h.repo, "b", IssueStatus::Resolved, 2).await;

        let stats = h
            .public
            .get("/api/issues/stats")
            .await
            .json::<ApiResponse<IssueStatsDto>>()
            .data
            .unwrap();
        assert_eq!(stats.total_issues, 2);
        assert_eq!(stats.status_counts["resolved"], 1);
        assert_eq!(stats.status_counts["verified"], 0);
        assert_eq!(stats.category_counts["water"], 2);

        let statuses = h
            .public
            .get("/api/issues/statuses")
            .await
            .json::<serde_json::Value>();
        assert_eq!(
            statuses["data"],
            json!(["reported", "verified", "in_progress", "resolved"])
        );

        let categories = h
            .public
            .get("/api/issues/categories")
            .await
            .json::<serde_json::Value>();
        assert_eq!(categories["data"], json!(["road", "water", "power", "other"]));

        let severities = h
            .public
            .get("/api/issues/severities")
            .await
            .json::<serde_json::Value>();
        assert_eq!(severities["data"], json!(["low", "medium", "high", "critical"]));
    }
}
