pub mod database;
pub mod environment;
pub mod logging;

pub use database::{init_db, DbPool};
pub use environment::{Config, ConfigError};
