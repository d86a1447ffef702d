use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

use crate::features::issues::models::{
    Issue, IssueCategory, IssueFilter, IssuePatch, IssueSeverity, IssueStatus,
};

/// Response DTO for an issue
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueResponseDto {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub severity: IssueSeverity,
    pub status: IssueStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    /// Hashed storage name, served through `/api/issues/{id}/photo`
    pub photo_filename: Option<String>,
    pub photo_original_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub admin_notes: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<Issue> for IssueResponseDto {
    fn from(i: Issue) -> Self {
        Self {
            id: i.id,
            title: i.title,
            description: i.description,
            category: i.category,
            severity: i.severity,
            status: i.status,
            latitude: i.latitude,
            longitude: i.longitude,
            address: i.address,
            photo_filename: i.photo_filename,
            photo_original_name: i.photo_original_name,
            created_at: i.created_at,
            updated_at: i.updated_at,
            reporter_name: i.reporter_name,
            reporter_email: i.reporter_email,
            reporter_phone: i.reporter_phone,
            admin_notes: i.admin_notes,
            resolved_at: i.resolved_at,
        }
    }
}

/// Multipart form for reporting an issue.
/// Documentation only; the handler reads the fields off `Multipart` directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateIssueDto {
    #[schema(example = "Large pothole on Main Street")]
    pub title: String,
    pub description: String,
    /// road | water | power | other
    #[schema(example = "road")]
    pub category: String,
    /// low | medium | high | critical
    #[schema(example = "high")]
    pub severity: String,
    #[schema(example = "40.7589")]
    pub latitude: Option<String>,
    #[schema(example = "-73.9851")]
    pub longitude: Option<String>,
    pub address: Option<String>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    /// png, jpg, jpeg, gif or webp. Other files are ignored.
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub photo: Option<String>,
}

/// Raw submission fields as received, before validation
#[derive(Debug, Clone, Default)]
pub struct CreateIssueInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub severity: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub address: Option<String>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
}

impl CreateIssueInput {
    /// Store a text field by its form name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "category" => &mut self.category,
            "severity" => &mut self.severity,
            "latitude" => &mut self.latitude,
            "longitude" => &mut self.longitude,
            "address" => &mut self.address,
            "reporter_name" => &mut self.reporter_name,
            "reporter_email" => &mut self.reporter_email,
            "reporter_phone" => &mut self.reporter_phone,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// Query params for listing issues.
///
/// Values outside the allowed set are ignored for that dimension.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListIssuesQuery {
    /// road | water | power | other
    pub category: Option<String>,
    /// reported | verified | in_progress | resolved
    pub status: Option<String>,
    /// low | medium | high | critical
    pub severity: Option<String>,
}

impl From<ListIssuesQuery> for IssueFilter {
    fn from(q: ListIssuesQuery) -> Self {
        Self {
            category: q.category.and_then(|c| c.parse().ok()),
            status: q.status.and_then(|s| s.parse().ok()),
            severity: q.severity.and_then(|s| s.parse().ok()),
        }
    }
}

/// Admin edit of an issue.
///
/// Unknown status or severity values are dropped. Sending `admin_notes: null`
/// clears the notes; omitting the field leaves them unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateIssueDto {
    #[schema(example = "in_progress")]
    pub status: Option<String>,
    #[schema(example = "critical")]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub admin_notes: Option<Option<String>>,
}

impl From<UpdateIssueDto> for IssuePatch {
    fn from(dto: UpdateIssueDto) -> Self {
        Self {
            status: dto.status.and_then(|s| s.parse().ok()),
            severity: dto.severity.and_then(|s| s.parse().ok()),
            admin_notes: dto.admin_notes,
        }
    }
}

/// Present-but-null becomes `Some(None)`, absent stays `None` via `#[serde(default)]`
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Issue counts per dimension. Every allowed value appears, zero if unseen.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueStatsDto {
    pub total_issues: i64,
    pub status_counts: BTreeMap<String, i64>,
    pub category_counts: BTreeMap<String, i64>,
    pub severity_counts: BTreeMap<String, i64>,
}
