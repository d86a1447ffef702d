//! Sample issues for local development and demos

use chrono::{DateTime, Duration, Utc};

use crate::features::issues::models::{IssueCategory, IssueSeverity, IssueStatus, NewIssue};

struct DemoIssue {
    title: &'static str,
    description: &'static str,
    category: IssueCategory,
    severity: IssueSeverity,
    status: IssueStatus,
    latitude: f64,
    longitude: f64,
    address: &'static str,
    reporter_name: &'static str,
    reporter_email: &'static str,
    reporter_phone: Option<&'static str>,
    admin_notes: Option<&'static str>,
    /// How long before `now` the issue was reported
    age: Duration,
}

const DEMO_ISSUES: usize = 5;

fn demo_set() -> [DemoIssue; DEMO_ISSUES] {
    [
        DemoIssue {
            title: "Large pothole on Main Street",
            description: "There is a significant pothole near the intersection of Main Street \
                and Oak Avenue. It's about 2 feet wide and 6 inches deep, causing vehicles to \
                swerve dangerously. It fills with water when it rains and becomes hard to see.",
            category: IssueCategory::Road,
            severity: IssueSeverity::High,
            status: IssueStatus::Reported,
            latitude: 40.7589,
            longitude: -73.9851,
            address: "123 Main Street, New York, NY",
            reporter_name: "John Smith",
            reporter_email: "john.smith@email.com",
            reporter_phone: Some("(555) 123-4567"),
            admin_notes: None,
            age: Duration::days(3) + Duration::hours(5),
        },
        DemoIssue {
            title: "Broken water main flooding sidewalk",
            description: "A water main has burst underneath the sidewalk on Elm Street, causing \
                continuous flooding. Water is flowing into the street and creating hazardous \
                conditions for pedestrians and drivers.",
            category: IssueCategory::Water,
            severity: IssueSeverity::Critical,
            status: IssueStatus::Verified,
            latitude: 40.7505,
            longitude: -73.9934,
            address: "456 Elm Street, New York, NY",
            reporter_name: "Sarah Johnson",
            reporter_email: "sarah.j@email.com",
            reporter_phone: None,
            admin_notes: None,
            age: Duration::days(1) + Duration::hours(14),
        },
        DemoIssue {
            title: "Flickering streetlight creating safety concern",
            description: "The streetlight at the corner of Pine Street and 2nd Avenue has been \
                flickering for the past week. In the evening the intersection is poorly lit and \
                the light sometimes goes dark for several minutes.",
            category: IssueCategory::Power,
            severity: IssueSeverity::Medium,
            status: IssueStatus::InProgress,
            latitude: 40.7282,
            longitude: -73.9942,
            address: "Corner of Pine Street and 2nd Avenue, New York, NY",
            reporter_name: "Mike Davis",
            reporter_email: "mike.davis@email.com",
            reporter_phone: Some("(555) 987-6543"),
            admin_notes: None,
            age: Duration::days(9) + Duration::hours(2),
        },
        DemoIssue {
            title: "Damaged storm drain cover",
            description: "The storm drain cover on Oak Avenue is cracked and partially \
                collapsed. The metal grating is sharp and exposed, which is dangerous for \
                cyclists and pedestrians.",
            category: IssueCategory::Other,
            severity: IssueSeverity::Medium,
            status: IssueStatus::Reported,
            latitude: 40.7614,
            longitude: -73.9776,
            address: "789 Oak Avenue, New York, NY",
            reporter_name: "Lisa Chen",
            reporter_email: "lisa.chen@email.com",
            reporter_phone: None,
            admin_notes: None,
            age: Duration::days(17) + Duration::hours(9),
        },
        DemoIssue {
            title: "Resolved: Fixed broken traffic signal",
            description: "The traffic signal at Broadway and 42nd Street was showing red in all \
                directions, causing long delays. Normal traffic flow has been restored.",
            category: IssueCategory::Power,
            severity: IssueSeverity::High,
            status: IssueStatus::Resolved,
            latitude: 40.7580,
            longitude: -73.9855,
            address: "Broadway and 42nd Street, New York, NY",
            reporter_name: "Robert Wilson",
            reporter_email: "robert.w@email.com",
            reporter_phone: Some("(555) 456-7890"),
            admin_notes: Some(
                "Contacted ConEd and traffic signal was repaired within 4 hours. \
                 Issue resolved successfully.",
            ),
            age: Duration::days(26) + Duration::hours(20),
        },
    ]
}

/// Demo issues relative to `now`, spread over the past month.
/// The resolved one was closed two days before `now`.
pub fn demo_issues(now: DateTime<Utc>) -> Vec<NewIssue> {
    demo_set()
        .into_iter()
        .map(|demo| {
            let resolved_at =
                (demo.status == IssueStatus::Resolved).then(|| now - Duration::days(2));

            NewIssue {
                title: demo.title.to_string(),
                description: demo.description.to_string(),
                category: demo.category,
                severity: demo.severity,
                status: demo.status,
                latitude: Some(demo.latitude),
                longitude: Some(demo.longitude),
                address: Some(demo.address.to_string()),
                photo: None,
                reporter_name: Some(demo.reporter_name.to_string()),
                reporter_email: Some(demo.reporter_email.to_string()),
                reporter_phone: demo.reporter_phone.map(str::to_string),
                admin_notes: demo.admin_notes.map(str::to_string),
                created_at: now - demo.age,
                resolved_at,
            }
        })
        .collect()
}
