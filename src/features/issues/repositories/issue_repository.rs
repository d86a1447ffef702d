use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::issues::models::{Issue, IssueDimensionCount, IssueFilter, NewIssue};

/// Persistence seam for issues
#[async_trait]
pub trait IssueRepository: Send + Sync {
    async fn insert(&self, data: &NewIssue) -> Result<Issue>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Issue>>;

    /// Issues matching `filter`, newest first with ties broken by id
    async fn list(&self, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// Write back status, severity, admin_notes, resolved_at and updated_at.
    /// `None` when the row no longer exists.
    async fn update(&self, issue: &Issue) -> Result<Option<Issue>>;

    /// Remove the row and return it, `None` when it did not exist
    async fn delete(&self, id: i64) -> Result<Option<Issue>>;

    /// Row counts grouped by (category, severity, status)
    async fn dimension_counts(&self) -> Result<Vec<IssueDimensionCount>>;

    async fn count(&self) -> Result<i64>;
}

const ISSUE_COLUMNS: &str = r#"
    id, title, description, category, severity, status,
    latitude, longitude, address,
    photo_filename, photo_original_name,
    created_at, updated_at,
    reporter_name, reporter_email, reporter_phone,
    admin_notes, resolved_at
"#;

/// PostgreSQL-backed issue repository
pub struct PgIssueRepository {
    pool: PgPool,
}

impl PgIssueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IssueRepository for PgIssueRepository {
    async fn insert(&self, data: &NewIssue) -> Result<Issue> {
        let photo_filename = data.photo.as_ref().map(|p| p.filename.as_str());
        let photo_original_name = data.photo.as_ref().map(|p| p.original_name.as_str());

        let sql = format!(
            r#"
            INSERT INTO issues (
                title, description, category, severity, status,
                latitude, longitude, address,
                photo_filename, photo_original_name,
                reporter_name, reporter_email, reporter_phone,
                admin_notes, resolved_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
            RETURNING {}
            "#,
            ISSUE_COLUMNS
        );

        let issue = sqlx::query_as::<_, Issue>(&sql)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.category)
            .bind(data.severity)
            .bind(data.status)
            .bind(data.latitude)
            .bind(data.longitude)
            .bind(&data.address)
            .bind(photo_filename)
            .bind(photo_original_name)
            .bind(&data.reporter_name)
            .bind(&data.reporter_email)
            .bind(&data.reporter_phone)
            .bind(&data.admin_notes)
            .bind(data.resolved_at)
            .bind(data.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert issue: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(issue)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Issue>> {
        let sql = format!("SELECT {} FROM issues WHERE id = $1", ISSUE_COLUMNS);

        sqlx::query_as::<_, Issue>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get issue {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn list(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM issues WHERE TRUE", ISSUE_COLUMNS));

        if let Some(category) = filter.category {
            query.push(" AND category = ").push_bind(category);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(severity) = filter.severity {
            query.push(" AND severity = ").push_bind(severity);
        }

        query.push(" ORDER BY created_at DESC, id ASC");

        query
            .build_query_as::<Issue>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list issues: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn update(&self, issue: &Issue) -> Result<Option<Issue>> {
        let sql = format!(
            r#"
            UPDATE issues
            SET status = $2, severity = $3, admin_notes = $4,
                resolved_at = $5, updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            ISSUE_COLUMNS
        );

        sqlx::query_as::<_, Issue>(&sql)
            .bind(issue.id)
            .bind(issue.status)
            .bind(issue.severity)
            .bind(&issue.admin_notes)
            .bind(issue.resolved_at)
            .bind(issue.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update issue {}: {:?}", issue.id, e);
                AppError::Database(e)
            })
    }

    async fn delete(&self, id: i64) -> Result<Option<Issue>> {
        let sql = format!("DELETE FROM issues WHERE id = $1 RETURNING {}", ISSUE_COLUMNS);

        sqlx::query_as::<_, Issue>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete issue {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn dimension_counts(&self) -> Result<Vec<IssueDimensionCount>> {
        sqlx::query_as::<_, IssueDimensionCount>(
            r#"
            SELECT category, severity, status, COUNT(*) AS count
            FROM issues
            GROUP BY category, severity, status
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count issues by dimension: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM issues")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count issues: {:?}", e);
                AppError::Database(e)
            })
    }
}
