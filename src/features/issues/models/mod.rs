mod issue;
mod photo;

pub use issue::{
    sort_newest_first, Issue, IssueCategory, IssueDimensionCount, IssueFilter, IssuePatch,
    IssueSeverity, IssueStatus, NewIssue, PhotoRef,
};
pub use photo::{content_type_for, generate_photo_filename, is_allowed_photo, PhotoUpload};
