pub mod analytics;
pub mod auth;
pub mod config;
pub mod constants;
pub mod export;
pub mod extractors;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;
