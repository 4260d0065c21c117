use std::sync::Arc;
use std::time::Instant;

use crate::analytics::ReportAssembler;
use crate::config::Config;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    reports: Arc<ReportAssembler>,
    config: Arc<Config>,
    started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<Store>, config: &Config) -> Self {
        let reports = Arc::new(ReportAssembler::new(
            store.clone(),
            config.reports.timeout(),
        ));

        Self {
            store,
            reports,
            config: Arc::new(config.clone()),
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn reports(&self) -> &ReportAssembler {
        &self.reports
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
