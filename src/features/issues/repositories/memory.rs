//! In-memory issue repository used by service and HTTP tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::IssueRepository;
use crate::core::error::{AppError, Result};
use crate::features::issues::models::{
    sort_newest_first, Issue, IssueDimensionCount, IssueFilter, NewIssue,
};

#[derive(Default)]
pub(crate) struct InMemoryIssueRepository {
    rows: Mutex<Vec<Issue>>,
    next_id: Mutex<i64>,
    fail_inserts: AtomicBool,
}

impl InMemoryIssueRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail with an internal error
    pub(crate) fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    pub(crate) fn snapshot(&self) -> Vec<Issue> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueRepository for InMemoryIssueRepository {
    async fn insert(&self, data: &NewIssue) -> Result<Issue> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Internal("insert rejected".to_string()));
        }

        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };

        let (photo_filename, photo_original_name) = match &data.photo {
            Some(photo) => (
                Some(photo.filename.clone()),
                Some(photo.original_name.clone()),
            ),
            None => (None, None),
        };

        let issue = Issue {
            id,
            title: data.title.clone(),
            description: data.description.clone(),
            category: data.category,
            severity: data.severity,
            status: data.status,
            latitude: data.latitude,
            longitude: data.longitude,
            address: data.address.clone(),
            photo_filename,
            photo_original_name,
            created_at: data.created_at,
            updated_at: data.created_at,
            reporter_name: data.reporter_name.clone(),
            reporter_email: data.reporter_email.clone(),
            reporter_phone: data.reporter_phone.clone(),
            admin_notes: data.admin_notes.clone(),
            resolved_at: data.resolved_at,
        };

        self.rows.lock().unwrap().push(issue.clone());
        Ok(issue)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Issue>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn list(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let mut issues: Vec<Issue> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        sort_newest_first(&mut issues);
        Ok(issues)
    }

    async fn update(&self, issue: &Issue) -> Result<Option<Issue>> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|i| i.id == issue.id) {
            Some(row) => {
                row.status = issue.status;
                row.severity = issue.severity;
                row.admin_notes = issue.admin_notes.clone();
                row.resolved_at = issue.resolved_at;
                row.updated_at = issue.updated_at;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<Option<Issue>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .position(|i| i.id == id)
            .map(|index| rows.remove(index)))
    }

    async fn dimension_counts(&self) -> Result<Vec<IssueDimensionCount>> {
        let rows = self.rows.lock().unwrap();
        let mut counts: Vec<IssueDimensionCount> = Vec::new();
        for issue in rows.iter() {
            match counts.iter_mut().find(|c| {
                c.category == issue.category
                    && c.severity == issue.severity
                    && c.status == issue.status
            }) {
                Some(group) => group.count += 1,
                None => counts.push(IssueDimensionCount {
                    category: issue.category,
                    severity: issue.severity,
                    status: issue.status,
                    count: 1,
                }),
            }
        }
        Ok(counts)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }
}
