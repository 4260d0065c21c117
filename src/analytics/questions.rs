//! Per-question survey statistics.
//!
//! Numeric questions get sum/avg/min/max, a per-worker ranking and a daily
//! trend; text and multiple-choice questions get a frequency distribution.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::analytics::engine::round1;
use crate::analytics::pipeline::{self, AnswerRow};
use crate::analytics::types::{
    ChoiceStats, CountDailyPoint, NumericDailyPoint, NumericStats, OptionCount, QuestionStats,
    QuestionSummary, WorkerRank,
};
use crate::store::operations::catalog::QuestionType;
use crate::store::operations::submissions::Submission;

/// Parses a stored answer as a finite number. Anything else is not a number.
pub fn parse_numeric(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Question groups sorted by question text, optionally limited to one question id.
pub fn question_analytics(
    submissions: &[Submission],
    question_id: Option<&str>,
) -> Vec<QuestionSummary> {
    // Keyed text-first so map order is the response order.
    let mut groups: BTreeMap<(String, String, QuestionType), Vec<AnswerRow<'_>>> = BTreeMap::new();
    for row in pipeline::unwind_answers(submissions) {
        if question_id.is_some_and(|id| id != row.answer.question_id) {
            continue;
        }
        groups
            .entry((
                row.answer.question_text.clone(),
                row.answer.question_id.clone(),
                row.answer.question_type,
            ))
            .or_default()
            .push(row);
    }

    groups
        .into_iter()
        .map(|((question_text, question_id, question_type), rows)| {
            let stats = match question_type {
                QuestionType::Number => QuestionStats::Numeric(numeric_stats(&rows)),
                QuestionType::Text | QuestionType::MultipleChoice => {
                    QuestionStats::Choice(choice_stats(&rows))
                }
            };
            QuestionSummary {
                question_id,
                question_text,
                question_type,
                total_responses: rows.len() as u64,
                stats,
            }
        })
        .collect()
}

fn numeric_stats(rows: &[AnswerRow<'_>]) -> NumericStats {
    let valid: Vec<(&AnswerRow<'_>, f64)> = rows
        .iter()
        .filter_map(|row| parse_numeric(&row.answer.value).map(|v| (row, v)))
        .collect();

    let valid_count = valid.len() as u64;
    let sum: f64 = valid.iter().map(|(_, v)| v).sum();
    let (min, max) = if valid.is_empty() {
        (0.0, 0.0)
    } else {
        valid.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
            (lo.min(*v), hi.max(*v))
        })
    };
    let avg = if valid_count > 0 {
        round1(sum / valid_count as f64)
    } else {
        0.0
    };

    let mut per_worker: BTreeMap<&str, (f64, u64)> = BTreeMap::new();
    let mut per_day: BTreeMap<&str, (f64, u64)> = BTreeMap::new();
    for (row, value) in &valid {
        let w = per_worker
            .entry(row.submission.worker_name.as_str())
            .or_default();
        w.0 += value;
        w.1 += 1;
        let d = per_day.entry(row.submission.date.as_str()).or_default();
        d.0 += value;
        d.1 += 1;
    }

    // BTreeMap yields names ascending; the stable sort keeps that order among equal totals.
    let mut ordered: Vec<(&str, (f64, u64))> = per_worker.into_iter().collect();
    ordered.sort_by(|a, b| b.1 .0.partial_cmp(&a.1 .0).unwrap_or(Ordering::Equal));
    let ranking: Vec<WorkerRank> = ordered
        .into_iter()
        .enumerate()
        .map(|(idx, (name, (total, count)))| WorkerRank {
            rank: idx as u32 + 1,
            name: name.to_string(),
            total,
            count,
            avg: round1(total / count as f64),
        })
        .collect();

    let daily = per_day
        .into_iter()
        .map(|(date, (total, count))| NumericDailyPoint {
            date: date.to_string(),
            total,
            avg: round1(total / count as f64),
        })
        .collect();

    NumericStats {
        valid_count,
        sum,
        avg,
        max,
        min,
        top_worker: ranking.first().cloned(),
        ranking,
        daily,
    }
}

fn choice_stats(rows: &[AnswerRow<'_>]) -> ChoiceStats {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    let mut per_day: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rows {
        let answer = row.answer.value.trim();
        if answer.is_empty() {
            continue;
        }
        *counts.entry(answer).or_default() += 1;
        *per_day.entry(row.submission.date.as_str()).or_default() += 1;
    }

    let mut distribution: Vec<OptionCount> = counts
        .into_iter()
        .map(|(option, count)| OptionCount {
            option: option.to_string(),
            count,
        })
        .collect();
    // Stable: equal counts keep the ascending option order from the map.
    distribution.sort_by(|a, b| b.count.cmp(&a.count));

    ChoiceStats {
        distribution,
        daily: per_day
            .into_iter()
            .map(|(date, count)| CountDailyPoint {
                date: date.to_string(),
                count,
            })
            .collect(),
    }
}
