use serde::Serialize;

use crate::store::operations::catalog::QuestionType;
use crate::store::operations::submissions::Submission;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_submissions: u64,
    pub total_quantity: u64,
    pub total_revenue: f64,
    pub unique_workers: u64,
    pub unique_stores: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    pub date: String,
    pub count: u64,
    pub total_quantity: u64,
    pub total_revenue: f64,
}

/// Rollup for a worker or a store, keyed by id and the name snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRollup {
    pub id: String,
    pub name: String,
    pub submissions: u64,
    pub total_quantity: u64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRollup {
    pub name: String,
    pub total_quantity: u64,
    pub total_revenue: f64,
}

/// Totals block of the detail bundles. Zero-filled when nothing matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailOverview {
    pub submissions: u64,
    pub total_quantity: u64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDetail {
    pub overview: DetailOverview,
    pub daily: Vec<DailyPoint>,
    pub by_store: Vec<EntityRollup>,
    pub by_product: Vec<ProductRollup>,
    pub recent_submissions: Vec<Submission>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetail {
    pub overview: DetailOverview,
    pub daily: Vec<DailyPoint>,
    pub by_worker: Vec<EntityRollup>,
    pub by_product: Vec<ProductRollup>,
    pub recent_submissions: Vec<Submission>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product_name: String,
    pub overview: DetailOverview,
    pub daily: Vec<DailyPoint>,
    pub by_worker: Vec<EntityRollup>,
    pub by_store: Vec<EntityRollup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    pub question_id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub total_responses: u64,
    #[serde(flatten)]
    pub stats: QuestionStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QuestionStats {
    Numeric(NumericStats),
    Choice(ChoiceStats),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericStats {
    pub valid_count: u64,
    pub sum: f64,
    pub avg: f64,
    pub max: f64,
    pub min: f64,
    pub ranking: Vec<WorkerRank>,
    pub top_worker: Option<WorkerRank>,
    pub daily: Vec<NumericDailyPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRank {
    pub rank: u32,
    pub name: String,
    pub total: f64,
    pub count: u64,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericDailyPoint {
    pub date: String,
    pub total: f64,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceStats {
    pub distribution: Vec<OptionCount>,
    pub daily: Vec<CountDailyPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionCount {
    pub option: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountDailyPoint {
    pub date: String,
    pub count: u64,
}
