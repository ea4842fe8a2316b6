pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::{build_router, Server};
pub use config::TomlConfig;
pub use core::{ConnectionWorkflow, WorkflowSettings};
pub use utils::error::{ConnectError, Result};
