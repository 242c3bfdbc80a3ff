pub mod calculator;
pub mod config;
pub mod types;

pub use calculator::{CalcError, Operation, calculate};
pub use config::{CalcConfig, ConfigError};
pub use types::*;
