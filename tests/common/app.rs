use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;

use sales_report_backend::config::{Config, PaginationConfig, ReportConfig, SeedAdminConfig};
use sales_report_backend::routes::auth::seed_admin;
use sales_report_backend::routes::build_router;
use sales_report_backend::state::AppState;
use sales_report_backend::store::Store;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-pass-123";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn store(&self) -> &Store {
        self.state.store()
    }
}

async fn spawn_with(reports: ReportConfig, pagination: PaginationConfig) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("sales-test.sled");

    // Built directly instead of through env vars so parallel tests do not race.
    let config = Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 5000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path: sled_path.to_string_lossy().to_string(),
        admin_jwt_secret: format!("integration-test-admin-secret-{}", uuid::Uuid::new_v4()),
        admin_jwt_expires_in_hours: 2,
        cors_origin: "http://localhost:5173".to_string(),
        seed_admin: SeedAdminConfig {
            username: ADMIN_USERNAME.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        },
        reports,
        pagination,
    };

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");
    seed_admin(&store, ADMIN_USERNAME, ADMIN_PASSWORD).expect("seed admin");

    let state = AppState::new(store, &config);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_server() -> TestApp {
    spawn_with(ReportConfig::default(), PaginationConfig::default()).await
}

pub async fn spawn_test_server_with_page_limits(default_size: u64, max_size: u64) -> TestApp {
    spawn_with(
        ReportConfig::default(),
        PaginationConfig {
            default_page_size: default_size,
            max_page_size: max_size,
        },
    )
    .await
}
