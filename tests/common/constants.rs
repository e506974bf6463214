//! Shared constants for end-to-end tests
//!
//! Every TestServer is seeded with the documents listed here.

// ============================================================================
// Seeded Records
// ============================================================================

/// Document in `property_appeals`
pub const APPEAL_ID: &str = "appeal-1";

/// Document in `user_issues`
pub const ISSUE_ID: &str = "issue-1";

/// Document in `reports`
pub const REPORT_ID: &str = "rep123";

/// Document in `properties` with no `viewCount` yet
pub const PROPERTY_ID: &str = "propA";

/// Document in `properties` whose `viewCount` starts at 41
pub const VIEWED_PROPERTY_ID: &str = "propB";

pub const VIEWED_PROPERTY_INITIAL_COUNT: i64 = 41;

/// Id that exists in no collection
pub const MISSING_ID: &str = "no-such-record";

// ============================================================================
// Timeouts
// ============================================================================

/// Max time to wait for the test server to answer on `/`
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Per-request timeout for TestClient
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Delay between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
