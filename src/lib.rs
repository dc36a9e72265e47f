pub mod aggregate;
pub mod assemble;
pub mod attribute;
pub mod config;
pub mod error;
pub mod export;
pub mod game_feed;
pub mod http_cache;
pub mod http_client;
pub mod model;
pub mod pipeline;
pub mod shift_chart;
pub mod snapshot;
pub mod sweep;
pub mod telemetry;
