pub mod issue_handler;

pub use issue_handler::{
    __path_create_issue, __path_delete_issue, __path_export_issues_csv, __path_get_issue,
    __path_get_issue_photo, __path_get_issue_stats, __path_list_categories, __path_list_issues,
    __path_list_severities, __path_list_statuses, __path_update_issue, create_issue,
    delete_issue, export_issues_csv, get_issue, get_issue_photo, get_issue_stats,
    list_categories, list_issues, list_severities, list_statuses, update_issue,
};
