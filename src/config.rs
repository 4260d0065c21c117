use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::time::Duration;

use std::fmt;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use crate::constants::{
    DEFAULT_PAGE_SIZE, DEFAULT_REPORT_TIMEOUT_SECS, DEFAULT_UTC_OFFSET_MINUTES, MAX_PAGE_SIZE,
};

#[derive(Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub admin_jwt_secret: String,
    pub admin_jwt_expires_in_hours: u64,
    pub cors_origin: String,
    pub seed_admin: SeedAdminConfig,
    pub reports: ReportConfig,
    pub pagination: PaginationConfig,
}

/// Credentials of the admin account created on first start.
#[derive(Clone)]
pub struct SeedAdminConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub timeout_secs: u64,
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_REPORT_TIMEOUT_SECS,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl ReportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Offset used for "today" and for export timestamps. Out-of-range
    /// values fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| {
            tracing::warn!(
                minutes = self.utc_offset_minutes,
                "REPORT_UTC_OFFSET_MINUTES out of range, using UTC"
            );
            Utc.fix()
        })
    }

    /// Current calendar day in the reporting offset.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.utc_offset()).date_naive()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("enable_file_logs", &self.enable_file_logs)
            .field("log_dir", &self.log_dir)
            .field("sled_path", &self.sled_path)
            .field("admin_jwt_secret", &"***REDACTED***")
            .field("admin_jwt_expires_in_hours", &self.admin_jwt_expires_in_hours)
            .field("cors_origin", &self.cors_origin)
            .field("seed_admin", &self.seed_admin)
            .field("reports", &self.reports)
            .field("pagination", &self.pagination)
            .finish()
    }
}

impl fmt::Debug for SeedAdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedAdminConfig")
            .field("username", &self.username)
            .field("password", &"***REDACTED***")
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 5000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/sales.sled"),
            admin_jwt_secret: env_or(
                "ADMIN_JWT_SECRET",
                "change_me_to_another_random_64_chars_change_me_to_another",
            ),
            admin_jwt_expires_in_hours: env_or_parse("ADMIN_JWT_EXPIRES_IN_HOURS", 168_u64),
            cors_origin: env_or("CORS_ORIGIN", "*"),
            seed_admin: SeedAdminConfig {
                username: env_or("ADMIN_USERNAME", "admin"),
                password: env_or("ADMIN_PASSWORD", "admin123"),
            },
            reports: ReportConfig {
                timeout_secs: env_or_parse("REPORT_TIMEOUT_SECS", DEFAULT_REPORT_TIMEOUT_SECS),
                utc_offset_minutes: env_or_parse(
                    "REPORT_UTC_OFFSET_MINUTES",
                    DEFAULT_UTC_OFFSET_MINUTES,
                ),
            },
            pagination: PaginationConfig {
                default_page_size: env_or_parse("PAGE_SIZE_DEFAULT", DEFAULT_PAGE_SIZE),
                max_page_size: env_or_parse("PAGE_SIZE_MAX", MAX_PAGE_SIZE),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn managed_keys() -> &'static [&'static str] {
        &[
            "HOST",
            "PORT",
            "RUST_LOG",
            "ADMIN_PASSWORD",
            "REPORT_TIMEOUT_SECS",
            "REPORT_UTC_OFFSET_MINUTES",
            "PAGE_SIZE_MAX",
        ]
    }

    fn clear_keys(keys: &[&str]) {
        for key in keys {
            env::remove_var(key);
        }
    }

    #[test]
    fn loads_defaults_when_missing() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.reports.timeout_secs, 15);
        assert_eq!(cfg.reports.utc_offset().local_minus_utc(), 330 * 60);
        assert_eq!(cfg.pagination.max_page_size, 200);
    }

    #[test]
    fn parses_numeric_values() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "4000");
        env::set_var("REPORT_TIMEOUT_SECS", "3");
        env::set_var("REPORT_UTC_OFFSET_MINUTES", "-300");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.reports.timeout(), Duration::from_secs(3));
        assert_eq!(cfg.reports.utc_offset().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn invalid_values_fall_back() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "bad");
        env::set_var("PAGE_SIZE_MAX", "x");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.pagination.max_page_size, 200);
    }

    #[test]
    fn out_of_range_offset_is_utc() {
        let reports = ReportConfig {
            timeout_secs: 1,
            utc_offset_minutes: 100_000,
        };
        assert_eq!(reports.utc_offset().local_minus_utc(), 0);
    }

    #[test]
    fn debug_redacts_secrets() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());
        env::set_var("ADMIN_PASSWORD", "hunter2-secret");

        let rendered = format!("{:?}", Config::from_env());
        assert!(!rendered.contains("hunter2-secret"));
        assert!(rendered.contains("***REDACTED***"));
    }
}
