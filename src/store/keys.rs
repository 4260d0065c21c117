pub fn submission_key(submission_id: &str) -> String {
    submission_id.to_string()
}

/// Natural identity of a submission: one worker, one store, one day.
pub fn submission_identity_key(worker_id: &str, store_id: &str, date: &str) -> String {
    format!("{}:{}:{}", worker_id, store_id, date)
}

pub fn submission_date_key(date: &str, submission_id: &str) -> String {
    format!("{}:{}", date, submission_id)
}

/// Inclusive lower bound of a date-index scan.
pub fn submission_date_lower(date: &str) -> String {
    format!("{}:", date)
}

/// Exclusive upper bound of a date-index scan that still covers `date` itself.
/// `;` sorts right after `:`, so every `date:<id>` key falls below it.
pub fn submission_date_upper(date: &str) -> String {
    format!("{};", date)
}

pub fn entity_key(entity_id: &str) -> String {
    entity_id.to_string()
}

pub fn admin_key(admin_id: &str) -> String {
    admin_id.to_string()
}

pub fn admin_username_index_key(username: &str) -> String {
    format!("username:{}", username.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_keys_fall_inside_their_bounds() {
        let key = submission_date_key("2024-01-02", "abc");
        assert!(submission_date_lower("2024-01-02") <= key);
        assert!(key < submission_date_upper("2024-01-02"));
        assert!(key > submission_date_upper("2024-01-01"));
        assert!(key < submission_date_lower("2024-01-03"));
    }

    #[test]
    fn username_index_is_normalized() {
        assert_eq!(admin_username_index_key(" Admin "), "username:admin");
    }
}
