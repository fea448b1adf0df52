pub mod command;
pub mod config;
pub mod runner;
pub mod throttle;
pub mod tools;
pub mod workflow;

pub use command::CommandSpec;
pub use config::{ConfigStore, Value};
pub use runner::{CancelHandle, RunEvent, RunnerHandle, FINISHED_SENTINEL, INTERRUPTED_LINE};
pub use throttle::{LineThrottle, ProgressKind};
pub use workflow::{PreparedRun, WorkflowKind};
