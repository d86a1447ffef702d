use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::issues::dtos::{CreateIssueInput, IssueResponseDto, IssueStatsDto};
use crate::features::issues::models::{
    content_type_for, generate_photo_filename, is_allowed_photo, Issue, IssueCategory,
    IssueFilter, IssuePatch, IssueSeverity, IssueStatus, NewIssue, PhotoRef, PhotoUpload,
};
use crate::features::issues::repositories::IssueRepository;
use crate::features::issues::services::demo_data;
use crate::modules::storage::PhotoStorage;
use crate::shared::constants::{EXPORT_DATE_FORMAT, EXPORT_FILENAME_DATE_FORMAT, MAX_PHOTO_SIZE};
use crate::shared::validation::{file_extension, sanitize_filename};

/// Header row of the tabular export, in column order
pub const EXPORT_COLUMNS: [&str; 17] = [
    "ID",
    "Title",
    "Description",
    "Category",
    "Severity",
    "Status",
    "Latitude",
    "Longitude",
    "Address",
    "Photo",
    "Created Date",
    "Updated Date",
    "Reporter Name",
    "Reporter Email",
    "Reporter Phone",
    "Admin Notes",
    "Resolved Date",
];

/// Service for the issue lifecycle, reporting and export
pub struct IssueService {
    repo: Arc<dyn IssueRepository>,
    storage: Arc<dyn PhotoStorage>,
}

impl IssueService {
    pub fn new(repo: Arc<dyn IssueRepository>, storage: Arc<dyn PhotoStorage>) -> Self {
        Self { repo, storage }
    }

    /// Validate a submission, store its photo and insert the issue.
    ///
    /// The photo is written before the row so a stored issue never points at
    /// a missing file. Photos with a disallowed extension are dropped.
    pub async fn create(
        &self,
        input: CreateIssueInput,
        photo: Option<PhotoUpload>,
    ) -> Result<IssueResponseDto> {
        let title = required(input.title, "title")?;
        let description = required(input.description, "description")?;
        let category: IssueCategory = required(input.category, "category")?
            .parse()
            .map_err(AppError::Validation)?;
        let severity: IssueSeverity = required(input.severity, "severity")?
            .parse()
            .map_err(AppError::Validation)?;
        let latitude = parse_coordinate(input.latitude, "latitude")?;
        let longitude = parse_coordinate(input.longitude, "longitude")?;

        let now = Utc::now();
        let photo = match photo {
            Some(upload) => self.store_photo(upload, now).await?,
            None => None,
        };

        let new_issue = NewIssue {
            title,
            description,
            category,
            severity,
            status: IssueStatus::default(),
            latitude,
            longitude,
            address: input.address,
            photo: photo.clone(),
            reporter_name: input.reporter_name,
            reporter_email: input.reporter_email,
            reporter_phone: input.reporter_phone,
            admin_notes: None,
            created_at: now,
            resolved_at: None,
        };

        let issue = match self.repo.insert(&new_issue).await {
            Ok(issue) => issue,
            Err(e) => {
                if let Some(photo) = photo {
                    self.discard_photo(&photo.filename).await;
                }
                return Err(e);
            }
        };

        tracing::info!(
            "Issue {} reported: category={}, severity={}, photo={}",
            issue.id,
            issue.category,
            issue.severity,
            issue.photo_filename.is_some()
        );

        Ok(issue.into())
    }

    pub async fn get(&self, id: i64) -> Result<IssueResponseDto> {
        self.find(id).await.map(Into::into)
    }

    /// Issues matching the filter, newest first
    pub async fn list(&self, filter: IssueFilter) -> Result<Vec<IssueResponseDto>> {
        let issues = self.repo.list(&filter).await?;
        Ok(issues.into_iter().map(Into::into).collect())
    }

    /// Apply an admin patch. `resolved_at` is stamped on entering `resolved`
    /// and kept when the issue is reopened.
    pub async fn update(&self, id: i64, patch: IssuePatch) -> Result<IssueResponseDto> {
        let mut issue = self.find(id).await?;
        let previous_status = issue.status;

        patch.apply(&mut issue, Utc::now());

        let updated = self
            .repo
            .update(&issue)
            .await?
            .ok_or_else(|| not_found(id))?;

        if updated.status != previous_status {
            tracing::info!(
                "Issue {} status changed: {} -> {}",
                id,
                previous_status,
                updated.status
            );
        }

        Ok(updated.into())
    }

    /// Remove an issue, then its photo. Photo cleanup failures are logged only.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let issue = self.repo.delete(id).await?.ok_or_else(|| not_found(id))?;

        if let Some(filename) = issue.photo_filename.as_deref() {
            self.discard_photo(filename).await;
        }

        tracing::info!("Issue {} deleted", id);
        Ok(())
    }

    /// Stored photo bytes with their content type
    pub async fn load_photo(&self, id: i64) -> Result<(Vec<u8>, &'static str)> {
        let issue = self.find(id).await?;
        let filename = issue
            .photo_filename
            .ok_or_else(|| AppError::NotFound(format!("Issue {} has no photo", id)))?;

        let bytes = self
            .storage
            .load(&filename)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Photo for issue {} not found", id)))?;

        Ok((bytes, content_type_for(&filename)))
    }

    /// Totals per status, category and severity. Every allowed value is present.
    pub async fn stats(&self) -> Result<IssueStatsDto> {
        let groups = self.repo.dimension_counts().await?;

        let mut status_counts = zeroed(IssueStatus::all().iter().map(|s| s.as_str()));
        let mut category_counts = zeroed(IssueCategory::all().iter().map(|c| c.as_str()));
        let mut severity_counts = zeroed(IssueSeverity::all().iter().map(|s| s.as_str()));
        let mut total_issues = 0;

        for group in groups {
            total_issues += group.count;
            *status_counts.entry(group.status.to_string()).or_default() += group.count;
            *category_counts.entry(group.category.to_string()).or_default() += group.count;
            *severity_counts.entry(group.severity.to_string()).or_default() += group.count;
        }

        Ok(IssueStatsDto {
            total_issues,
            status_counts,
            category_counts,
            severity_counts,
        })
    }

    /// Every issue, newest first, as CSV with a header row
    pub async fn export_csv(&self) -> Result<Vec<u8>> {
        let issues = self.repo.list(&IssueFilter::default()).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(EXPORT_COLUMNS).map_err(csv_error)?;
        for issue in &issues {
            writer.write_record(export_row(issue)).map_err(csv_error)?;
        }

        let data = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("Failed to finish CSV export: {}", e)))?;

        tracing::debug!("Exported {} issues ({} bytes)", issues.len(), data.len());
        Ok(data)
    }

    /// Insert the demo issues when the table is empty. Returns how many were added.
    pub async fn seed_demo_data(&self) -> Result<usize> {
        let existing = self.repo.count().await?;
        if existing > 0 {
            tracing::info!("Skipping demo data: {} issues already present", existing);
            return Ok(0);
        }

        let issues = demo_data::demo_issues(Utc::now());
        for issue in &issues {
            self.repo.insert(issue).await?;
        }

        tracing::info!("Seeded {} demo issues", issues.len());
        Ok(issues.len())
    }

    async fn find(&self, id: i64) -> Result<Issue> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Returns `None` when the upload is not an accepted image.
    ///
    /// The extension check and the storage name use the name as uploaded;
    /// only the recorded original name is sanitized.
    async fn store_photo(
        &self,
        upload: PhotoUpload,
        now: DateTime<Utc>,
    ) -> Result<Option<PhotoRef>> {
        if !is_allowed_photo(&upload.file_name) {
            tracing::debug!("Ignoring photo with unsupported name '{}'", upload.file_name);
            return Ok(None);
        }

        if upload.data.len() > MAX_PHOTO_SIZE {
            return Err(AppError::BadRequest(format!(
                "Photo too large. Maximum size is {} MB",
                MAX_PHOTO_SIZE / 1024 / 1024
            )));
        }

        let original_name = recorded_photo_name(&upload.file_name);
        let filename = generate_photo_filename(&upload.file_name, now, Uuid::new_v4());
        self.storage
            .save(&filename, &upload.data, content_type_for(&filename))
            .await?;

        tracing::debug!(
            "Stored photo '{}' as '{}' on {} backend",
            original_name,
            filename,
            self.storage.backend()
        );

        Ok(Some(PhotoRef {
            filename,
            original_name,
        }))
    }

    async fn discard_photo(&self, filename: &str) {
        match self.storage.delete(filename).await {
            Ok(true) => tracing::debug!("Removed photo '{}'", filename),
            Ok(false) => tracing::debug!("Photo '{}' was already gone", filename),
            Err(e) => tracing::warn!("Failed to remove photo '{}': {}", filename, e),
        }
    }
}

/// Sanitized upload name, or `photo.<ext>` when sanitizing leaves no usable stem
fn recorded_photo_name(raw: &str) -> String {
    let sanitized = sanitize_filename(raw);
    let raw_ext = file_extension(raw);

    let usable = match sanitized.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && Some(ext.to_lowercase()) == raw_ext,
        None => false,
    };

    if usable {
        sanitized
    } else {
        format!("photo.{}", raw_ext.unwrap_or_default())
    }
}

/// Attachment name for an export produced at `at`
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("issues_export_{}.csv", at.format(EXPORT_FILENAME_DATE_FORMAT))
}

fn export_row(issue: &Issue) -> [String; 17] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    // Debug keeps the trailing ".0" on whole coordinates
    let coordinate = |value: Option<f64>| value.map(|v| format!("{:?}", v)).unwrap_or_default();
    let date = |value: Option<DateTime<Utc>>| {
        value
            .map(|d| d.format(EXPORT_DATE_FORMAT).to_string())
            .unwrap_or_default()
    };

    [
        issue.id.to_string(),
        issue.title.clone(),
        issue.description.clone(),
        issue.category.to_string(),
        issue.severity.to_string(),
        issue.status.to_string(),
        coordinate(issue.latitude),
        coordinate(issue.longitude),
        text(&issue.address),
        text(&issue.photo_original_name),
        date(Some(issue.created_at)),
        date(Some(issue.updated_at)),
        text(&issue.reporter_name),
        text(&issue.reporter_email),
        text(&issue.reporter_phone),
        text(&issue.admin_notes),
        date(issue.resolved_at),
    ]
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

/// Empty or missing means no coordinate
fn parse_coordinate(value: Option<String>, field: &str) -> Result<Option<f64>> {
    let raw = match value.as_deref().map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| AppError::Validation(format!("Invalid {}: {}", field, raw)))
}

fn zeroed<'a>(keys: impl Iterator<Item = &'a str>) -> BTreeMap<String, i64> {
    keys.map(|k| (k.to_string(), 0)).collect()
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Issue {} not found", id))
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal(format!("Failed to write CSV export: {}", e))
}
