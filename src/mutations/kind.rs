//! Notification kinds and where each one is dismissed

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::error::ValidationError;
use crate::document_store::DocumentRef;

pub const PROPERTY_APPEALS_COLLECTION: &str = "property_appeals";
pub const USER_ISSUES_COLLECTION: &str = "user_issues";
pub const REPORTS_COLLECTION: &str = "reports";

pub const DISMISSED_BY_OWNER_FIELD: &str = "dismissedByOwner";
pub const DISMISSED_BY_REPORTER_FIELD: &str = "dismissedByReporter";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Appeal,
    Issue,
    Report,
}

/// The (collection, field) pair a dismissal writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissTarget {
    pub collection: &'static str,
    pub field: &'static str,
}

impl DismissTarget {
    pub fn document(&self, record_id: &str) -> DocumentRef {
        DocumentRef::new(self.collection, record_id)
    }
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 3] = [
        NotificationKind::Appeal,
        NotificationKind::Issue,
        NotificationKind::Report,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Appeal => "appeal",
            NotificationKind::Issue => "issue",
            NotificationKind::Report => "report",
        }
    }

    pub fn target(&self) -> DismissTarget {
        match self {
            NotificationKind::Appeal => DismissTarget {
                collection: PROPERTY_APPEALS_COLLECTION,
                field: DISMISSED_BY_OWNER_FIELD,
            },
            NotificationKind::Issue => DismissTarget {
                collection: USER_ISSUES_COLLECTION,
                field: DISMISSED_BY_OWNER_FIELD,
            },
            NotificationKind::Report => DismissTarget {
                collection: REPORTS_COLLECTION,
                field: DISMISSED_BY_REPORTER_FIELD,
            },
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = ValidationError;

    /// Exact, case-sensitive match. An empty string is a missing kind, not an unknown one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(ValidationError::MissingKind),
            "appeal" => Ok(NotificationKind::Appeal),
            "issue" => Ok(NotificationKind::Issue),
            "report" => Ok(NotificationKind::Report),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}
