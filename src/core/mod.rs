pub mod workflow;

pub use crate::domain::model::{ConnectionRequest, ConnectionStatus, CreateOutcome, Identity};
pub use crate::domain::ports::{AuthGate, ConfigProvider, ConnectionRequestStore, UserDirectory};
pub use crate::utils::error::Result;
pub use workflow::{ConnectionWorkflow, WorkflowSettings};
