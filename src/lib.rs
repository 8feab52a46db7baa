//! BugFinder: run a Python snippet in a fresh interpreter, capture what it
//! prints, and explain the failure if it raises one.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod execution;
pub mod explain;
pub mod logging;
pub mod printer;
pub mod process;
pub mod tui;
pub mod utils;

pub use error::{DispatchError, PipelineError};
pub use execution::{ExecutionReport, FailureInfo, Pipeline, SourceLine, Status};
pub use explain::FailureCategory;
