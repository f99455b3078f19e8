pub mod agent;
pub mod config;

pub use agent::Shutdown;
pub use config::Config;
