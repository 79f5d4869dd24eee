mod actions;
mod engine;

pub use actions::{ActionParseError, DoAction, ShipmentForm};
pub use engine::{Actor, WorkflowEngine, WorkflowError};
