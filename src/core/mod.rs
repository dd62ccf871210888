pub mod config;

pub use config::ValidatorConfig;
