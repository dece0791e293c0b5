pub mod config;
pub mod interval;
pub mod models;

pub use config::Config;
pub use models::Candle;
