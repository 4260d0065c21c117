//! Report computations over one filtered snapshot of submissions.
//!
//! Every function here is pure: same slice in, same value out, independent
//! of the order of the slice.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::analytics::pipeline::{self, ItemRow, RefField, Totals};
use crate::analytics::types::{
    DailyPoint, DetailOverview, EntityRollup, Overview, ProductDetail, ProductRollup,
};
use crate::store::operations::submissions::{Submission, SubmissionSort};

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn overview(submissions: &[Submission]) -> Overview {
    let totals = pipeline::total(submissions);
    Overview {
        total_submissions: totals.count,
        total_quantity: totals.quantity,
        total_revenue: totals.revenue,
        unique_workers: pipeline::distinct_refs(submissions, RefField::Worker).len() as u64,
        unique_stores: pipeline::distinct_refs(submissions, RefField::Store).len() as u64,
    }
}

pub fn detail_overview(submissions: &[Submission]) -> DetailOverview {
    let totals = pipeline::total(submissions);
    DetailOverview {
        submissions: totals.count,
        total_quantity: totals.quantity,
        total_revenue: totals.revenue,
    }
}

/// One point per date present in the snapshot, ascending. Missing days are not synthesized.
pub fn daily(submissions: &[Submission]) -> Vec<DailyPoint> {
    daily_points(pipeline::group_submissions(submissions, |s| s.date.clone()))
}

pub fn by_worker(submissions: &[Submission]) -> Vec<EntityRollup> {
    entity_rollups(pipeline::group_submissions(submissions, |s| {
        (s.worker_id.clone(), s.worker_name.clone())
    }))
}

pub fn by_store(submissions: &[Submission]) -> Vec<EntityRollup> {
    entity_rollups(pipeline::group_submissions(submissions, |s| {
        (s.store_id.clone(), s.store_name.clone())
    }))
}

/// Items grouped by product name snapshot, top `limit` by quantity.
pub fn by_product(submissions: &[Submission], limit: usize) -> Vec<ProductRollup> {
    let groups = pipeline::group_items(pipeline::unwind_items(submissions), |row| {
        row.item.product_name.clone()
    });
    let mut rollups: Vec<ProductRollup> = groups
        .into_iter()
        .map(|(name, totals)| ProductRollup {
            name,
            total_quantity: totals.quantity,
            total_revenue: totals.revenue,
        })
        .collect();
    rollups.sort_by(|a, b| {
        b.total_quantity
            .cmp(&a.total_quantity)
            .then_with(|| a.name.cmp(&b.name))
    });
    rollups.truncate(limit);
    rollups
}

/// Most recent first: date descending, then submission time descending.
pub fn recent(submissions: &[Submission], limit: usize) -> Vec<Submission> {
    let mut sorted: Vec<&Submission> = submissions.iter().collect();
    sorted.sort_by(|a, b| SubmissionSort::Newest.compare(a, b));
    sorted.into_iter().take(limit).cloned().collect()
}

/// Rollups for a single product name, computed on unwound item rows.
pub fn product_detail(submissions: &[Submission], product_name: &str) -> ProductDetail {
    let rows: Vec<ItemRow<'_>> = pipeline::unwind_items(submissions)
        .filter(|row| row.item.product_name == product_name)
        .collect();

    let overall = pipeline::group_items(rows.iter().copied(), |_| ());
    let overall = overall.get(&()).copied().unwrap_or_default();

    let daily = daily_points(pipeline::group_items(rows.iter().copied(), |row| {
        row.submission.date.clone()
    }));
    let by_worker = entity_rollups(pipeline::group_items(rows.iter().copied(), |row| {
        (
            row.submission.worker_id.clone(),
            row.submission.worker_name.clone(),
        )
    }));
    let by_store = entity_rollups(pipeline::group_items(rows.iter().copied(), |row| {
        (
            row.submission.store_id.clone(),
            row.submission.store_name.clone(),
        )
    }));

    ProductDetail {
        product_name: product_name.to_string(),
        overview: DetailOverview {
            submissions: overall.count,
            total_quantity: overall.quantity,
            total_revenue: overall.revenue,
        },
        daily,
        by_worker,
        by_store,
    }
}

fn daily_points(groups: BTreeMap<String, Totals>) -> Vec<DailyPoint> {
    groups
        .into_iter()
        .map(|(date, totals)| DailyPoint {
            date,
            count: totals.count,
            total_quantity: totals.quantity,
            total_revenue: totals.revenue,
        })
        .collect()
}

/// Revenue descending; equal revenue falls back to name, then id.
fn entity_rollups(groups: BTreeMap<(String, String), Totals>) -> Vec<EntityRollup> {
    let mut rollups: Vec<EntityRollup> = groups
        .into_iter()
        .map(|((id, name), totals)| EntityRollup {
            id,
            name,
            submissions: totals.count,
            total_quantity: totals.quantity,
            total_revenue: totals.revenue,
        })
        .collect();
    rollups.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    rollups
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::store::operations::submissions::{SubmissionDraft, SubmissionItem};

    fn submission(
        id: &str,
        worker: (&str, &str),
        store: (&str, &str),
        date: &str,
        items: Vec<SubmissionItem>,
    ) -> Submission {
        let draft = SubmissionDraft {
            worker_id: worker.0.to_string(),
            worker_name: worker.1.to_string(),
            store_id: store.0.to_string(),
            store_name: store.1.to_string(),
            date: date.to_string(),
            notes: String::new(),
            items,
            answers: vec![],
        };
        Submission::from_draft(id.to_string(), draft, Utc::now())
    }

    fn fixture() -> Vec<Submission> {
        vec![
            submission(
                "a",
                ("w1", "Asha"),
                ("s1", "Main"),
                "2024-01-02",
                vec![
                    SubmissionItem::new("p1", "Rice", 5, 10.0),
                    SubmissionItem::new("p2", "Oil", 1, 80.0),
                ],
            ),
            submission(
                "b",
                ("w2", "Ravi"),
                ("s1", "Main"),
                "2024-01-01",
                vec![SubmissionItem::new("p1", "Rice", 3, 10.0)],
            ),
            submission(
                "c",
                ("w1", "Asha"),
                ("s2", "Depot"),
                "2024-01-02",
                vec![SubmissionItem::new("p3", "Salt", 8, 2.0)],
            ),
        ]
    }

    #[test]
    fn overview_counts_distinct_references_in_the_snapshot() {
        let o = overview(&fixture());
        assert_eq!(o.total_submissions, 3);
        assert_eq!(o.total_quantity, 17);
        assert_eq!(o.total_revenue, 176.0);
        assert_eq!(o.unique_workers, 2);
        assert_eq!(o.unique_stores, 2);
    }

    #[test]
    fn empty_snapshot_yields_zeroed_structures() {
        let o = overview(&[]);
        assert_eq!(
            o,
            Overview {
                total_submissions: 0,
                total_quantity: 0,
                total_revenue: 0.0,
                unique_workers: 0,
                unique_stores: 0,
            }
        );
        assert!(daily(&[]).is_empty());
        assert!(by_worker(&[]).is_empty());
        assert!(by_product(&[], 20).is_empty());
        assert_eq!(detail_overview(&[]), DetailOverview::default());
        let detail = product_detail(&[], "Rice");
        assert_eq!(detail.overview, DetailOverview::default());
    }

    #[test]
    fn daily_is_sorted_ascending_without_gaps_filled() {
        let points = daily(&fixture());
        let dates: Vec<&str> = points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(points[1].count, 2);
        assert_eq!(points[1].total_quantity, 14);
    }

    #[test]
    fn daily_and_worker_rollups_sum_to_overview() {
        let subs = fixture();
        let o = overview(&subs);
        let daily_qty: u64 = daily(&subs).iter().map(|p| p.total_quantity).sum();
        let daily_rev: f64 = daily(&subs).iter().map(|p| p.total_revenue).sum();
        let worker_qty: u64 = by_worker(&subs).iter().map(|r| r.total_quantity).sum();
        assert_eq!(daily_qty, o.total_quantity);
        assert_eq!(daily_rev, o.total_revenue);
        assert_eq!(worker_qty, o.total_quantity);
    }

    #[test]
    fn rollups_sort_by_revenue_with_name_tie_break() {
        let subs = vec![
            submission("a", ("w2", "Zed"), ("s1", "Main"), "2024-01-01", vec![SubmissionItem::new("p", "X", 1, 5.0)]),
            submission("b", ("w1", "Amy"), ("s1", "Main"), "2024-01-01", vec![SubmissionItem::new("p", "X", 1, 5.0)]),
            submission("c", ("w3", "Bob"), ("s1", "Main"), "2024-01-01", vec![SubmissionItem::new("p", "X", 1, 9.0)]),
        ];
        let names: Vec<String> = by_worker(&subs).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Bob", "Amy", "Zed"]);
    }

    #[test]
    fn by_product_groups_by_name_snapshot_and_limits() {
        let mut subs = fixture();
        // Same product id sold under a former name stays a separate row.
        subs.push(submission(
            "d",
            ("w2", "Ravi"),
            ("s2", "Depot"),
            "2024-01-03",
            vec![SubmissionItem::new("p1", "Rice (old)", 1, 10.0)],
        ));
        let rows = by_product(&subs, 20);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Rice", "Salt", "Oil", "Rice (old)"]);
        assert_eq!(rows[0].total_quantity, 8);
        assert_eq!(rows[0].total_revenue, 80.0);

        assert_eq!(by_product(&subs, 2).len(), 2);
    }

    #[test]
    fn recent_is_newest_first() {
        let mut subs = fixture();
        subs[0].created_at = Utc::now() - Duration::minutes(5);
        let ids: Vec<String> = recent(&subs, 2).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn product_detail_only_counts_matching_items() {
        let detail = product_detail(&fixture(), "Rice");
        assert_eq!(detail.overview.submissions, 2);
        assert_eq!(detail.overview.total_quantity, 8);
        assert_eq!(detail.overview.total_revenue, 80.0);
        assert_eq!(detail.daily.len(), 2);
        assert_eq!(detail.by_worker[0].name, "Asha");
        assert_eq!(detail.by_store.len(), 1);
    }

    #[test]
    fn product_detail_counts_a_submission_once_per_product_name() {
        let subs = vec![submission(
            "a",
            ("w1", "Asha"),
            ("s1", "Main"),
            "2024-01-02",
            vec![
                SubmissionItem::new("p1", "Rice", 2, 10.0),
                SubmissionItem::new("p9", "Rice", 1, 12.0),
            ],
        )];
        let detail = product_detail(&subs, "Rice");
        assert_eq!(detail.overview.submissions, 1);
        assert_eq!(detail.overview.total_quantity, 3);
        assert_eq!(detail.overview.total_revenue, 32.0);
        assert_eq!(detail.daily[0].count, 1);
        assert_eq!(detail.by_worker[0].submissions, 1);
        assert_eq!(detail.by_store[0].submissions, 1);
    }

    #[test]
    fn round1_rounds_half_away_from_zero() {
        assert_eq!(round1(5.0), 5.0);
        assert_eq!(round1(3.25), 3.3);
        assert_eq!(round1(10.0 / 3.0), 3.3);
    }
}
