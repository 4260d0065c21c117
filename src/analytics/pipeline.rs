//! Typed grouping primitives shared by every report.
//!
//! Groups are collected into `BTreeMap`s so iteration order is a pure
//! function of the keys, never of the order submissions were fetched in.

use std::collections::{BTreeMap, BTreeSet};

use crate::store::operations::submissions::{Submission, SubmissionAnswer, SubmissionItem};

/// Count/quantity/revenue accumulator for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub count: u64,
    pub quantity: u64,
    pub revenue: f64,
}

impl Totals {
    fn add(&mut self, quantity: u64, revenue: f64) {
        self.count += 1;
        self.quantity += quantity;
        self.revenue += revenue;
    }
}

/// Reference fields a submission can be counted distinct on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefField {
    Worker,
    Store,
}

/// One row per sold item, still attached to its submission.
#[derive(Debug, Clone, Copy)]
pub struct ItemRow<'a> {
    pub submission: &'a Submission,
    pub item: &'a SubmissionItem,
}

/// One row per survey answer, still attached to its submission.
#[derive(Debug, Clone, Copy)]
pub struct AnswerRow<'a> {
    pub submission: &'a Submission,
    pub answer: &'a SubmissionAnswer,
}

pub fn unwind_items(submissions: &[Submission]) -> impl Iterator<Item = ItemRow<'_>> {
    submissions.iter().flat_map(|submission| {
        submission
            .items
            .iter()
            .map(move |item| ItemRow { submission, item })
    })
}

pub fn unwind_answers(submissions: &[Submission]) -> impl Iterator<Item = AnswerRow<'_>> {
    submissions.iter().flat_map(|submission| {
        submission
            .answers
            .iter()
            .map(move |answer| AnswerRow { submission, answer })
    })
}

pub fn distinct_refs(submissions: &[Submission], field: RefField) -> BTreeSet<&str> {
    submissions
        .iter()
        .map(|s| match field {
            RefField::Worker => s.worker_id.as_str(),
            RefField::Store => s.store_id.as_str(),
        })
        .collect()
}

pub fn total(submissions: &[Submission]) -> Totals {
    let mut totals = Totals::default();
    for s in submissions {
        totals.add(s.total_quantity, s.total_revenue);
    }
    totals
}

/// Groups whole submissions, summing their derived totals.
pub fn group_submissions<K, F>(submissions: &[Submission], key: F) -> BTreeMap<K, Totals>
where
    K: Ord,
    F: Fn(&Submission) -> K,
{
    let mut groups: BTreeMap<K, Totals> = BTreeMap::new();
    for s in submissions {
        groups
            .entry(key(s))
            .or_default()
            .add(s.total_quantity, s.total_revenue);
    }
    groups
}

/// Groups unwound item rows, summing item quantities and line totals.
/// `count` is the number of distinct submissions in the group, so several
/// lines of one submission landing in the same group count once.
pub fn group_items<'a, I, K, F>(rows: I, key: F) -> BTreeMap<K, Totals>
where
    I: IntoIterator<Item = ItemRow<'a>>,
    K: Ord,
    F: Fn(&ItemRow<'a>) -> K,
{
    let mut groups: BTreeMap<K, (Totals, BTreeSet<&'a str>)> = BTreeMap::new();
    for row in rows {
        let (totals, seen) = groups.entry(key(&row)).or_default();
        totals.quantity += row.item.quantity;
        totals.revenue += row.item.line_total;
        seen.insert(row.submission.id.as_str());
    }
    groups
        .into_iter()
        .map(|(key, (mut totals, seen))| {
            totals.count = seen.len() as u64;
            (key, totals)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::store::operations::submissions::SubmissionDraft;

    fn submission(id: &str, worker: &str, date: &str, items: Vec<SubmissionItem>) -> Submission {
        let draft = SubmissionDraft {
            worker_id: worker.to_string(),
            worker_name: worker.to_uppercase(),
            store_id: "s1".to_string(),
            store_name: "Main".to_string(),
            date: date.to_string(),
            notes: String::new(),
            items,
            answers: vec![],
        };
        Submission::from_draft(id.to_string(), draft, Utc::now())
    }

    #[test]
    fn unwind_yields_one_row_per_item() {
        let subs = vec![
            submission(
                "a",
                "w1",
                "2024-01-01",
                vec![
                    SubmissionItem::new("p1", "Rice", 1, 1.0),
                    SubmissionItem::new("p2", "Oil", 2, 1.0),
                ],
            ),
            submission("b", "w2", "2024-01-01", vec![]),
        ];
        assert_eq!(unwind_items(&subs).count(), 2);
    }

    #[test]
    fn grouping_is_insertion_order_independent() {
        let a = submission("a", "w2", "2024-01-02", vec![SubmissionItem::new("p", "X", 1, 2.0)]);
        let b = submission("b", "w1", "2024-01-01", vec![SubmissionItem::new("p", "X", 3, 2.0)]);

        let forward = group_submissions(&[a.clone(), b.clone()], |s| s.date.clone());
        let backward = group_submissions(&[b, a], |s| s.date.clone());
        assert_eq!(forward, backward);
        assert_eq!(forward.keys().next().map(String::as_str), Some("2024-01-01"));
    }

    #[test]
    fn item_groups_count_each_submission_once() {
        let subs = vec![
            submission(
                "a",
                "w1",
                "2024-01-01",
                vec![
                    SubmissionItem::new("p1", "Rice", 1, 2.0),
                    SubmissionItem::new("p2", "Rice", 3, 2.0),
                ],
            ),
            submission("b", "w1", "2024-01-01", vec![SubmissionItem::new("p1", "Rice", 2, 2.0)]),
        ];
        let groups = group_items(unwind_items(&subs), |row| row.item.product_name.clone());
        let rice = groups["Rice"];
        assert_eq!(rice.count, 2);
        assert_eq!(rice.quantity, 6);
        assert_eq!(rice.revenue, 12.0);
    }

    #[test]
    fn distinct_counts_references() {
        let subs = vec![
            submission("a", "w1", "2024-01-01", vec![]),
            submission("b", "w1", "2024-01-02", vec![]),
            submission("c", "w2", "2024-01-02", vec![]),
        ];
        assert_eq!(distinct_refs(&subs, RefField::Worker).len(), 2);
        assert_eq!(distinct_refs(&subs, RefField::Store).len(), 1);
    }
}
