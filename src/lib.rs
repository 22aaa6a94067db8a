// Library for tests to access modules

pub mod analytics;
pub mod clock;
pub mod config;
pub mod daily_cache;
pub mod date_window;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod readiness;
pub mod routes;
