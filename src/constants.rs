/// Rows returned by the by-product summary report
pub const BY_PRODUCT_LIMIT: usize = 20;

/// Product rows inside a worker/store detail bundle
pub const DETAIL_PRODUCT_LIMIT: usize = 10;

/// Latest submissions attached to a worker/store detail bundle
pub const RECENT_SUBMISSIONS_LIMIT: usize = 10;

/// Default page size for the submission listing
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Upper bound for a caller-supplied page size
pub const MAX_PAGE_SIZE: u64 = 200;

/// Default bound on a single report or export computation
pub const DEFAULT_REPORT_TIMEOUT_SECS: u64 = 15;

/// Default reporting offset from UTC (+05:30)
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// Request bodies above this size are rejected
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
