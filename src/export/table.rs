//! Flattens submissions into rows and columns.
//!
//! Product and question columns are sorted by name so the layout depends only
//! on which products and questions occur, never on submission order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::FixedOffset;

use crate::store::operations::submissions::Submission;

const SUBMITTED_AT_FORMAT: &str = "%d/%m/%y, %-I:%M %p";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    /// Text as written to CSV. Whole numbers print without a fraction.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Number(value) => value.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Cell::Number(value as f64)
    }
}

/// One named sheet: a header row, data rows and per-column display widths.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub widths: Vec<f64>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub submissions: Sheet,
    pub worker_summary: Sheet,
    pub product_summary: Sheet,
}

impl Workbook {
    pub fn sheets(&self) -> [&Sheet; 3] {
        [&self.submissions, &self.worker_summary, &self.product_summary]
    }
}

/// `submissions` is expected in export order (worker name, then date).
/// `offset` is the local offset used for the "Submitted At" column.
pub fn build_workbook(submissions: &[Submission], offset: FixedOffset) -> Workbook {
    Workbook {
        submissions: submissions_sheet(submissions, offset),
        worker_summary: worker_summary_sheet(submissions),
        product_summary: product_summary_sheet(submissions),
    }
}

fn submissions_sheet(submissions: &[Submission], offset: FixedOffset) -> Sheet {
    let products: BTreeSet<&str> = submissions
        .iter()
        .flat_map(|s| s.items.iter().map(|i| i.product_name.as_str()))
        .collect();
    let questions: BTreeSet<&str> = submissions
        .iter()
        .flat_map(|s| s.answers.iter().map(|a| a.question_text.as_str()))
        .collect();

    let mut headers: Vec<String> = ["Worker", "Store", "Date", "Submitted At"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut widths = vec![18.0, 18.0, 12.0, 18.0];
    for product in &products {
        headers.push(format!("{product} (Qty)"));
        headers.push(format!("{product} (Revenue)"));
        widths.extend([14.0, 16.0]);
    }
    for question in &questions {
        headers.push(question.to_string());
        widths.push((question.chars().count() + 4).max(16) as f64);
    }
    headers.extend(["Notes", "Total Qty", "Total Revenue"].map(String::from));
    widths.extend([25.0, 10.0, 16.0]);

    let rows = submissions
        .iter()
        .map(|submission| {
            let mut row: Vec<Cell> = vec![
                submission.worker_name.as_str().into(),
                submission.store_name.as_str().into(),
                submission.date.as_str().into(),
                submitted_at(submission, offset).into(),
            ];
            for product in &products {
                let (quantity, revenue) = submission
                    .items
                    .iter()
                    .filter(|i| i.product_name == *product)
                    .fold((0_u64, 0.0_f64), |(q, r), i| (q + i.quantity, r + i.line_total));
                row.push(quantity.into());
                row.push(revenue.into());
            }
            for question in &questions {
                let value = submission
                    .answers
                    .iter()
                    .find(|a| a.question_text == *question)
                    .map(|a| a.value.clone())
                    .unwrap_or_default();
                row.push(value.into());
            }
            row.push(submission.notes.as_str().into());
            row.push(submission.total_quantity.into());
            row.push(submission.total_revenue.into());
            row
        })
        .collect();

    Sheet {
        name: "Submissions".to_string(),
        headers,
        widths,
        rows,
    }
}

fn submitted_at(submission: &Submission, offset: FixedOffset) -> String {
    submission
        .created_at
        .with_timezone(&offset)
        .format(SUBMITTED_AT_FORMAT)
        .to_string()
        .to_lowercase()
}

fn worker_summary_sheet(submissions: &[Submission]) -> Sheet {
    let mut by_worker: BTreeMap<&str, (u64, u64, f64)> = BTreeMap::new();
    for submission in submissions {
        let entry = by_worker.entry(submission.worker_name.as_str()).or_default();
        entry.0 += 1;
        entry.1 += submission.total_quantity;
        entry.2 += submission.total_revenue;
    }
    let mut ordered: Vec<_> = by_worker.into_iter().collect();
    // Stable sort keeps names ascending among equal revenue.
    ordered.sort_by(|a, b| b.1 .2.partial_cmp(&a.1 .2).unwrap_or(Ordering::Equal));

    Sheet {
        name: "Worker Summary".to_string(),
        headers: ["Worker", "Submissions", "Total Qty", "Total Revenue"]
            .map(String::from)
            .to_vec(),
        widths: vec![20.0, 14.0, 12.0, 18.0],
        rows: ordered
            .into_iter()
            .map(|(name, (count, quantity, revenue))| {
                vec![
                    Cell::from(name),
                    Cell::from(count),
                    Cell::from(quantity),
                    Cell::from(revenue),
                ]
            })
            .collect(),
    }
}

fn product_summary_sheet(submissions: &[Submission]) -> Sheet {
    let mut by_product: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    for item in submissions.iter().flat_map(|s| s.items.iter()) {
        let entry = by_product.entry(item.product_name.as_str()).or_default();
        entry.0 += item.quantity;
        entry.1 += item.line_total;
    }
    let mut ordered: Vec<_> = by_product.into_iter().collect();
    ordered.sort_by(|a, b| b.1 .0.cmp(&a.1 .0));

    Sheet {
        name: "Product Summary".to_string(),
        headers: ["Product", "Total Qty", "Total Revenue"]
            .map(String::from)
            .to_vec(),
        widths: vec![25.0, 12.0, 18.0],
        rows: ordered
            .into_iter()
            .map(|(name, (quantity, revenue))| {
                vec![Cell::from(name), Cell::from(quantity), Cell::from(revenue)]
            })
            .collect(),
    }
}
