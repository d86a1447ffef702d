pub mod demo_data;
pub mod issue_service;

pub use issue_service::{export_filename, IssueService, EXPORT_COLUMNS};
