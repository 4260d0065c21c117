use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::Transactional;

use crate::store::keys;
use crate::store::operations::catalog::QuestionType;
use crate::store::{Store, StoreError};

/// One sold product line. Name and price are captured when the submission is
/// made and never refreshed from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u64,
    pub unit_price: f64,
    pub line_total: f64,
}

impl SubmissionItem {
    pub fn new(product_id: &str, product_name: &str, quantity: u64, unit_price: f64) -> Self {
        Self {
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
            quantity,
            unit_price,
            line_total: quantity as f64 * unit_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAnswer {
    pub question_id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    /// Stored as text regardless of the question type; numbers are parsed on read.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub worker_id: String,
    pub worker_name: String,
    pub store_id: String,
    pub store_name: String,
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub notes: String,
    pub items: Vec<SubmissionItem>,
    pub answers: Vec<SubmissionAnswer>,
    pub total_quantity: u64,
    pub total_revenue: f64,
    pub created_at: DateTime<Utc>,
}

/// Identity and snapshot fields of a submission about to be created.
#[derive(Debug, Clone)]
pub struct SubmissionDraft {
    pub worker_id: String,
    pub worker_name: String,
    pub store_id: String,
    pub store_name: String,
    pub date: String,
    pub notes: String,
    pub items: Vec<SubmissionItem>,
    pub answers: Vec<SubmissionAnswer>,
}

impl Submission {
    /// Builds a submission with derived totals from its items.
    pub fn from_draft(id: String, draft: SubmissionDraft, created_at: DateTime<Utc>) -> Self {
        let total_quantity = draft.items.iter().map(|i| i.quantity).sum();
        let total_revenue = draft.items.iter().map(|i| i.line_total).sum();
        Self {
            id,
            worker_id: draft.worker_id,
            worker_name: draft.worker_name,
            store_id: draft.store_id,
            store_name: draft.store_name,
            date: draft.date,
            notes: draft.notes,
            items: draft.items,
            answers: draft.answers,
            total_quantity,
            total_revenue,
            created_at,
        }
    }

    pub fn identity_key(&self) -> String {
        keys::submission_identity_key(&self.worker_id, &self.store_id, &self.date)
    }
}

/// Normalized store-level query. Date bounds are inclusive and compared
/// lexically, which is exact for zero-padded `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub worker_id: Option<String>,
    pub store_id: Option<String>,
}

impl SubmissionQuery {
    pub fn matches(&self, submission: &Submission) -> bool {
        if let Some(from) = &self.date_from {
            if submission.date.as_str() < from.as_str() {
                return false;
            }
        }
        if let Some(to) = &self.date_to {
            if submission.date.as_str() > to.as_str() {
                return false;
            }
        }
        if let Some(worker_id) = &self.worker_id {
            if &submission.worker_id != worker_id {
                return false;
            }
        }
        if let Some(store_id) = &self.store_id {
            if &submission.store_id != store_id {
                return false;
            }
        }
        true
    }

    fn has_date_bound(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionSort {
    /// Date descending, then submission time descending.
    Newest,
    /// Worker name ascending, then date ascending (export layout).
    WorkerThenDate,
}

impl SubmissionSort {
    pub fn compare(self, a: &Submission, b: &Submission) -> Ordering {
        match self {
            SubmissionSort::Newest => b
                .date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id)),
            SubmissionSort::WorkerThenDate => a
                .worker_name
                .cmp(&b.worker_name)
                .then_with(|| a.date.cmp(&b.date))
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id)),
        }
    }
}

impl Store {
    /// Inserts a new submission. A second submission for the same
    /// (worker, store, date) fails with `Conflict` and leaves the first intact.
    pub fn create_submission(&self, submission: &Submission) -> Result<(), StoreError> {
        let identity_key = submission.identity_key();
        let primary_key = keys::submission_key(&submission.id);
        let date_key = keys::submission_date_key(&submission.date, &submission.id);
        let bytes = Self::serialize(submission)?;
        let id_bytes = submission.id.as_bytes().to_vec();

        (
            &self.submissions,
            &self.submission_identity,
            &self.submissions_by_date,
        )
            .transaction(|(tx_primary, tx_identity, tx_by_date)| {
                if tx_identity.get(identity_key.as_bytes())?.is_some() {
                    return sled::transaction::abort(StoreError::Conflict {
                        entity: "submission".to_string(),
                        key: identity_key.clone(),
                    });
                }
                tx_identity.insert(identity_key.as_bytes(), id_bytes.as_slice())?;
                tx_primary.insert(primary_key.as_bytes(), bytes.as_slice())?;
                tx_by_date.insert(date_key.as_bytes(), id_bytes.as_slice())?;
                Ok(())
            })
            .map_err(
                |error: sled::transaction::TransactionError<StoreError>| match error {
                    sled::transaction::TransactionError::Abort(store_error) => store_error,
                    sled::transaction::TransactionError::Storage(storage_error) => {
                        StoreError::Sled(storage_error)
                    }
                },
            )?;

        Ok(())
    }

    pub fn get_submission(&self, submission_id: &str) -> Result<Option<Submission>, StoreError> {
        let key = keys::submission_key(submission_id);
        match self.submissions.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn submission_exists(
        &self,
        worker_id: &str,
        store_id: &str,
        date: &str,
    ) -> Result<bool, StoreError> {
        let key = keys::submission_identity_key(worker_id, store_id, date);
        Ok(self.submission_identity.contains_key(key.as_bytes())?)
    }

    /// Removes a submission and its index entries. Returns `false` when the id is unknown.
    pub fn delete_submission(&self, submission_id: &str) -> Result<bool, StoreError> {
        let Some(submission) = self.get_submission(submission_id)? else {
            return Ok(false);
        };
        let primary_key = keys::submission_key(&submission.id);
        let identity_key = submission.identity_key();
        let date_key = keys::submission_date_key(&submission.date, &submission.id);

        (
            &self.submissions,
            &self.submission_identity,
            &self.submissions_by_date,
        )
            .transaction(|(tx_primary, tx_identity, tx_by_date)| {
                tx_primary.remove(primary_key.as_bytes())?;
                tx_identity.remove(identity_key.as_bytes())?;
                tx_by_date.remove(date_key.as_bytes())?;
                Ok(())
            })
            .map_err(
                |error: sled::transaction::TransactionError<()>| match error {
                    sled::transaction::TransactionError::Abort(()) => StoreError::Conflict {
                        entity: "submission".to_string(),
                        key: submission_id.to_string(),
                    },
                    sled::transaction::TransactionError::Storage(storage_error) => {
                        StoreError::Sled(storage_error)
                    }
                },
            )?;

        Ok(true)
    }

    pub fn count_submissions(&self, query: &SubmissionQuery) -> Result<usize, StoreError> {
        Ok(self.scan_submissions(query)?.len())
    }

    /// Matching submissions, ordered by `sort`, after skipping `skip` and
    /// truncating to `limit` when one is given.
    pub fn find_submissions(
        &self,
        query: &SubmissionQuery,
        sort: SubmissionSort,
        limit: Option<usize>,
        skip: usize,
    ) -> Result<Vec<Submission>, StoreError> {
        let mut matched = self.scan_submissions(query)?;
        matched.sort_by(|a, b| sort.compare(a, b));
        let take = limit.unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(skip).take(take).collect())
    }

    fn scan_submissions(&self, query: &SubmissionQuery) -> Result<Vec<Submission>, StoreError> {
        let mut out = Vec::new();

        if query.has_date_bound() {
            let lower = query
                .date_from
                .as_deref()
                .map(keys::submission_date_lower)
                .unwrap_or_default();
            let upper = query.date_to.as_deref().map(keys::submission_date_upper);
            let iter = match &upper {
                Some(upper) => self
                    .submissions_by_date
                    .range(lower.as_bytes()..upper.as_bytes()),
                None => self.submissions_by_date.range(lower.as_bytes()..),
            };
            for item in iter {
                let (_, id_raw) = item?;
                let submission_id = String::from_utf8_lossy(&id_raw).to_string();
                match self.get_submission(&submission_id)? {
                    Some(submission) if query.matches(&submission) => out.push(submission),
                    Some(_) => {}
                    None => {
                        tracing::warn!(submission_id, "Dangling entry in submissions_by_date index");
                    }
                }
            }
            return Ok(out);
        }

        for item in self.submissions.iter() {
            let (_, value) = item?;
            let submission: Submission = Self::deserialize(&value)?;
            if query.matches(&submission) {
                out.push(submission);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tempfile::tempdir;

    use super::*;

    fn sample(id: &str, worker: &str, store: &str, date: &str) -> Submission {
        let draft = SubmissionDraft {
            worker_id: worker.to_string(),
            worker_name: format!("name-{worker}"),
            store_id: store.to_string(),
            store_name: format!("name-{store}"),
            date: date.to_string(),
            notes: String::new(),
            items: vec![SubmissionItem::new("p1", "Rice", 5, 10.0)],
            answers: vec![],
        };
        Submission::from_draft(id.to_string(), draft, Utc::now())
    }

    fn open(name: &str) -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join(name).to_str().unwrap()).unwrap();
        (dir, store)
    }

    #[test]
    fn totals_are_derived_from_items() {
        let draft = SubmissionDraft {
            worker_id: "w1".to_string(),
            worker_name: "Asha".to_string(),
            store_id: "s1".to_string(),
            store_name: "Main".to_string(),
            date: "2024-01-01".to_string(),
            notes: String::new(),
            items: vec![
                SubmissionItem::new("p1", "Rice", 5, 10.0),
                SubmissionItem::new("p2", "Oil", 2, 2.5),
            ],
            answers: vec![],
        };
        let sub = Submission::from_draft("s".to_string(), draft, Utc::now());
        assert_eq!(sub.total_quantity, 7);
        assert_eq!(sub.total_revenue, 55.0);
        assert_eq!(sub.items[1].line_total, 5.0);
    }

    #[test]
    fn duplicate_identity_is_rejected_without_overwrite() {
        let (_dir, store) = open("subs-dup");
        let first = sample("a", "w1", "s1", "2024-01-01");
        store.create_submission(&first).unwrap();

        let mut second = sample("b", "w1", "s1", "2024-01-01");
        second.notes = "second".to_string();
        let err = store.create_submission(&second).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        assert!(store.get_submission("b").unwrap().is_none());
        assert_eq!(store.get_submission("a").unwrap().unwrap(), first);
        assert_eq!(store.count_submissions(&SubmissionQuery::default()).unwrap(), 1);
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let (_dir, store) = open("subs-range");
        for (id, date) in [("a", "2024-01-01"), ("b", "2024-01-02"), ("c", "2024-01-03")] {
            store.create_submission(&sample(id, "w1", "s1", date)).unwrap();
        }

        let query = SubmissionQuery {
            date_from: Some("2024-01-02".to_string()),
            date_to: Some("2024-01-03".to_string()),
            ..Default::default()
        };
        let found = store
            .find_submissions(&query, SubmissionSort::Newest, None, 0)
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);

        let open_ended = SubmissionQuery {
            date_to: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        assert_eq!(store.count_submissions(&open_ended).unwrap(), 1);
    }

    #[test]
    fn worker_and_store_filters_combine() {
        let (_dir, store) = open("subs-filter");
        store.create_submission(&sample("a", "w1", "s1", "2024-01-01")).unwrap();
        store.create_submission(&sample("b", "w1", "s2", "2024-01-01")).unwrap();
        store.create_submission(&sample("c", "w2", "s1", "2024-01-01")).unwrap();

        let query = SubmissionQuery {
            worker_id: Some("w1".to_string()),
            store_id: Some("s1".to_string()),
            ..Default::default()
        };
        let found = store
            .find_submissions(&query, SubmissionSort::Newest, None, 0)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a");
    }

    #[test]
    fn newest_sort_breaks_date_ties_by_submission_time() {
        let (_dir, store) = open("subs-sort");
        let mut older = sample("a", "w1", "s1", "2024-01-01");
        older.created_at = Utc::now() - Duration::hours(2);
        let newer = sample("b", "w2", "s1", "2024-01-01");
        store.create_submission(&older).unwrap();
        store.create_submission(&newer).unwrap();

        let found = store
            .find_submissions(&SubmissionQuery::default(), SubmissionSort::Newest, Some(1), 0)
            .unwrap();
        assert_eq!(found[0].id, "b");

        let skipped = store
            .find_submissions(&SubmissionQuery::default(), SubmissionSort::Newest, Some(10), 1)
            .unwrap();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].id, "a");
    }

    #[test]
    fn delete_frees_the_identity_slot() {
        let (_dir, store) = open("subs-delete");
        store.create_submission(&sample("a", "w1", "s1", "2024-01-01")).unwrap();
        assert!(store.submission_exists("w1", "s1", "2024-01-01").unwrap());

        assert!(store.delete_submission("a").unwrap());
        assert!(!store.delete_submission("a").unwrap());
        assert!(!store.submission_exists("w1", "s1", "2024-01-01").unwrap());

        let query = SubmissionQuery {
            date_from: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        assert_eq!(store.count_submissions(&query).unwrap(), 0);
        store.create_submission(&sample("b", "w1", "s1", "2024-01-01")).unwrap();
    }
}
