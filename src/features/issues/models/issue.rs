use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use utoipa::ToSchema;

/// Declares a string-backed enum matching a PostgreSQL enum type, with the
/// wire names shared by serde, sqlx, `Display` and `FromStr`.
macro_rules! issue_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $pg_type:literal, $label:literal {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type, ToSchema,
        )]
        #[sqlx(type_name = $pg_type, rename_all = "snake_case")]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every member, in declaration order
            pub const fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(format!("Invalid {}: {}", $label, other)),
                }
            }
        }
    };
}

issue_enum! {
    /// Kind of infrastructure the issue concerns
    IssueCategory, "issue_category", "category" {
        Road => "road",
        Water => "water",
        Power => "power",
        Other => "other",
    }
}

issue_enum! {
    /// How urgent the issue is
    IssueSeverity, "issue_severity", "severity" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

issue_enum! {
    /// Triage state. Any state may move to any other; `Reported` is initial.
    IssueStatus, "issue_status", "status" {
        Reported => "reported",
        Verified => "verified",
        InProgress => "in_progress",
        Resolved => "resolved",
    }
}

impl Default for IssueStatus {
    fn default() -> Self {
        IssueStatus::Reported
    }
}

/// Database model for an issue
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Issue {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub severity: IssueSeverity,
    pub status: IssueStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
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

/// Stored photo reference. Both names are persisted together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    /// Hashed name the bytes are stored under
    pub filename: String,
    /// Sanitized name supplied by the reporter
    pub original_name: String,
}

/// Row to insert. Lifecycle defaults are decided by the service.
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub severity: IssueSeverity,
    pub status: IssueStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub photo: Option<PhotoRef>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Admin edit of an issue after enum checks.
///
/// `admin_notes` distinguishes "not sent" (`None`) from "cleared" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssuePatch {
    pub status: Option<IssueStatus>,
    pub severity: Option<IssueSeverity>,
    pub admin_notes: Option<Option<String>>,
}

impl IssuePatch {
    /// Apply the patch in place.
    ///
    /// Setting status to `Resolved` stamps `resolved_at`; moving away from it
    /// leaves `resolved_at` untouched. `updated_at` is always refreshed.
    pub fn apply(self, issue: &mut Issue, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            issue.status = status;
            if status == IssueStatus::Resolved {
                issue.resolved_at = Some(now);
            }
        }

        if let Some(notes) = self.admin_notes {
            issue.admin_notes = notes;
        }

        if let Some(severity) = self.severity {
            issue.severity = severity;
        }

        issue.updated_at = now;
    }
}

/// Optional per-dimension list filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub category: Option<IssueCategory>,
    pub status: Option<IssueStatus>,
    pub severity: Option<IssueSeverity>,
}

impl IssueFilter {
    pub fn matches(&self, issue: &Issue) -> bool {
        self.category.map_or(true, |c| issue.category == c)
            && self.status.map_or(true, |s| issue.status == s)
            && self.severity.map_or(true, |s| issue.severity == s)
    }
}

/// Newest first, ties broken by ascending id
pub fn sort_newest_first(issues: &mut [Issue]) {
    issues.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}

/// One group of the per-dimension count query
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct IssueDimensionCount {
    pub category: IssueCategory,
    pub severity: IssueSeverity,
    pub status: IssueStatus,
    pub count: i64,
}
