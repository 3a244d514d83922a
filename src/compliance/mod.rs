//! Synchronized exploration of a process model and its goal model.
//!
//! Every branch fires one enabled transition on its own copy of the process
//! marking and executes the mapped goal element, if any, on its own copy of
//! the goal marking. Product states already seen in the traversal are not
//! expanded again unless reached with more depth to spare, and branches stop
//! at the configured depth. Each maximal path ends either `Terminal`
//! (nothing enabled) or `Truncated`.

mod explorer;
mod result;

pub use explorer::{check_compliance, ComplianceExplorer};
pub use result::{
    ComplianceResult, ExecutionPath, ExplorationStats, PathEnd, TraceStep, Violation,
};
