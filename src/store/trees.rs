pub const SUBMISSIONS: &str = "submissions";
pub const SUBMISSION_IDENTITY: &str = "submission_identity";
pub const SUBMISSIONS_BY_DATE: &str = "submissions_by_date";

// Catalog trees
pub const WORKERS: &str = "workers";
pub const STORES: &str = "stores";
pub const PRODUCTS: &str = "products";
pub const QUESTIONS: &str = "questions";

pub const ADMINS: &str = "admins";
pub const META: &str = "meta";
