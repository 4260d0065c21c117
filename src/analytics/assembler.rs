//! Composes report responses from a single filtered snapshot.
//!
//! Every report loads the matching submissions once, then computes each view
//! of that snapshot on the blocking pool. Bundles fan the views out and join
//! them; any failing view fails the whole report, and the whole report is
//! bounded by the assembler's timeout.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinError;
use tokio::time::Instant;

use crate::analytics::engine;
use crate::analytics::questions;
use crate::analytics::types::{
    DailyPoint, EntityRollup, Overview, ProductDetail, ProductRollup, QuestionSummary,
    StoreDetail, WorkerDetail,
};
use crate::constants::{BY_PRODUCT_LIMIT, DETAIL_PRODUCT_LIMIT, RECENT_SUBMISSIONS_LIMIT};
use crate::store::operations::submissions::{Submission, SubmissionQuery, SubmissionSort};
use crate::store::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("report deadline exceeded")]
    TimedOut,
    #[error("aggregation task failed: {0}")]
    Task(#[from] JoinError),
}

/// The report contracts the assembler knows how to build.
///
/// Worker and store detail read their subject from `worker_id` / `store_id`
/// of the query they are built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    Overview,
    Daily,
    ByWorker,
    ByStore,
    ByProduct,
    WorkerDetail,
    StoreDetail,
    ProductDetail { product_name: String },
    Questions { question_id: Option<String> },
}

impl ReportKind {
    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::Overview => "overview",
            ReportKind::Daily => "daily",
            ReportKind::ByWorker => "by_worker",
            ReportKind::ByStore => "by_store",
            ReportKind::ByProduct => "by_product",
            ReportKind::WorkerDetail => "worker_detail",
            ReportKind::StoreDetail => "store_detail",
            ReportKind::ProductDetail { .. } => "product_detail",
            ReportKind::Questions { .. } => "questions",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReportResult {
    Overview(Overview),
    Daily(Vec<DailyPoint>),
    Rollups(Vec<EntityRollup>),
    Products(Vec<ProductRollup>),
    WorkerDetail(WorkerDetail),
    StoreDetail(StoreDetail),
    ProductDetail(ProductDetail),
    Questions(Vec<QuestionSummary>),
}

type Snapshot = Arc<Vec<Submission>>;

pub struct ReportAssembler {
    store: Arc<Store>,
    timeout: Duration,
}

impl ReportAssembler {
    pub fn new(store: Arc<Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn build(
        &self,
        query: SubmissionQuery,
        kind: ReportKind,
    ) -> Result<ReportResult, ReportError> {
        self.build_until(query, kind, Instant::now() + self.timeout)
            .await
    }

    /// Builds a report that must finish before `deadline`. Nothing partial is
    /// returned once the deadline passes.
    pub async fn build_until(
        &self,
        query: SubmissionQuery,
        kind: ReportKind,
        deadline: Instant,
    ) -> Result<ReportResult, ReportError> {
        let report = kind.name();
        match tokio::time::timeout_at(deadline, self.assemble(query, kind)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(report, "Report deadline exceeded");
                Err(ReportError::TimedOut)
            }
        }
    }

    /// Submissions for a tabular export, ordered by worker name then date.
    pub async fn export_snapshot(
        &self,
        query: SubmissionQuery,
    ) -> Result<Vec<Submission>, ReportError> {
        let deadline = Instant::now() + self.timeout;
        let load = self.snapshot(query, SubmissionSort::WorkerThenDate);
        match tokio::time::timeout_at(deadline, load).await {
            Ok(result) => {
                let snapshot = result?;
                Ok(Arc::try_unwrap(snapshot).unwrap_or_else(|shared| shared.as_ref().clone()))
            }
            Err(_) => {
                tracing::warn!(report = "export", "Report deadline exceeded");
                Err(ReportError::TimedOut)
            }
        }
    }

    async fn assemble(
        &self,
        query: SubmissionQuery,
        kind: ReportKind,
    ) -> Result<ReportResult, ReportError> {
        let snapshot = self.snapshot(query, SubmissionSort::Newest).await?;
        tracing::debug!(report = kind.name(), rows = snapshot.len(), "Snapshot loaded");

        let result = match kind {
            ReportKind::Overview => ReportResult::Overview(view(&snapshot, engine::overview).await?),
            ReportKind::Daily => ReportResult::Daily(view(&snapshot, engine::daily).await?),
            ReportKind::ByWorker => ReportResult::Rollups(view(&snapshot, engine::by_worker).await?),
            ReportKind::ByStore => ReportResult::Rollups(view(&snapshot, engine::by_store).await?),
            ReportKind::ByProduct => ReportResult::Products(
                view(&snapshot, |subs| engine::by_product(subs, BY_PRODUCT_LIMIT)).await?,
            ),
            ReportKind::WorkerDetail => {
                let (overview, daily, by_store, by_product, recent_submissions) = tokio::try_join!(
                    view(&snapshot, engine::detail_overview),
                    view(&snapshot, engine::daily),
                    view(&snapshot, engine::by_store),
                    view(&snapshot, |subs| engine::by_product(subs, DETAIL_PRODUCT_LIMIT)),
                    view(&snapshot, |subs| engine::recent(subs, RECENT_SUBMISSIONS_LIMIT)),
                )?;
                ReportResult::WorkerDetail(WorkerDetail {
                    overview,
                    daily,
                    by_store,
                    by_product,
                    recent_submissions,
                })
            }
            ReportKind::StoreDetail => {
                let (overview, daily, by_worker, by_product, recent_submissions) = tokio::try_join!(
                    view(&snapshot, engine::detail_overview),
                    view(&snapshot, engine::daily),
                    view(&snapshot, engine::by_worker),
                    view(&snapshot, |subs| engine::by_product(subs, DETAIL_PRODUCT_LIMIT)),
                    view(&snapshot, |subs| engine::recent(subs, RECENT_SUBMISSIONS_LIMIT)),
                )?;
                ReportResult::StoreDetail(StoreDetail {
                    overview,
                    daily,
                    by_worker,
                    by_product,
                    recent_submissions,
                })
            }
            ReportKind::ProductDetail { product_name } => ReportResult::ProductDetail(
                view(&snapshot, move |subs| engine::product_detail(subs, &product_name)).await?,
            ),
            ReportKind::Questions { question_id } => ReportResult::Questions(
                view(&snapshot, move |subs| {
                    questions::question_analytics(subs, question_id.as_deref())
                })
                .await?,
            ),
        };
        Ok(result)
    }

    async fn snapshot(
        &self,
        query: SubmissionQuery,
        sort: SubmissionSort,
    ) -> Result<Snapshot, ReportError> {
        let store = Arc::clone(&self.store);
        let rows =
            tokio::task::spawn_blocking(move || store.find_submissions(&query, sort, None, 0))
                .await??;
        Ok(Arc::new(rows))
    }
}

/// Computes one view of the snapshot on the blocking pool.
async fn view<T, F>(snapshot: &Snapshot, compute: F) -> Result<T, ReportError>
where
    T: Send + 'static,
    F: FnOnce(&[Submission]) -> T + Send + 'static,
{
    let snapshot = Arc::clone(snapshot);
    Ok(tokio::task::spawn_blocking(move || compute(snapshot.as_slice())).await?)
}
