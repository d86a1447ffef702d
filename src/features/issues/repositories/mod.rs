pub mod issue_repository;

#[cfg(test)]
pub(crate) mod memory;

pub use issue_repository::{IssueRepository, PgIssueRepository};
