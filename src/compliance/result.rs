use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::goal_model::{ElementId, ElementMark};
use crate::marking::Marking;
use crate::petri_net::TransitionId;

/// One fired transition and the goal element it was mapped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceStep {
    pub transition: TransitionId,
    pub mapped_element: Option<ElementId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathEnd {
    /// No transition is enabled in the final marking.
    Terminal,
    /// Exploration stopped at the depth limit.
    Truncated,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPath {
    pub trace: Vec<TraceStep>,
    pub end: PathEnd,
    pub final_goal_state: BTreeMap<ElementId, ElementMark>,
    pub final_process_state: Marking,
    /// Names (or ids) of qualities that are not `⊤` at the end of the path.
    pub unsatisfied_qualities: Vec<String>,
}

impl ExecutionPath {
    pub fn satisfies_all_qualities(&self) -> bool {
        self.unsatisfied_qualities.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.end == PathEnd::Truncated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub path_index: usize,
    pub description: String,
    pub unsatisfied_qualities: Vec<String>,
    pub trace: Vec<TraceStep>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorationStats {
    pub terminal_paths: usize,
    pub truncated_paths: usize,
    /// Distinct product states visited.
    pub explored_states: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    pub is_compliant: bool,
    pub execution_paths: Vec<ExecutionPath>,
    pub violations: Vec<Violation>,
    pub stats: ExplorationStats,
}

fn write_trace(f: &mut fmt::Formatter<'_>, trace: &[TraceStep]) -> fmt::Result {
    if trace.is_empty() {
        return writeln!(f, "    (no transitions)");
    }
    for step in trace {
        match &step.mapped_element {
            Some(element) => writeln!(f, "    {} -> {}", step.transition, element)?,
            None => writeln!(f, "    {} (unmapped)", step.transition)?,
        }
    }
    Ok(())
}

impl fmt::Display for ComplianceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_compliant {
            writeln!(f, "Compliance check passed")?;
        } else {
            writeln!(
                f,
                "Compliance check failed: {} violation(s)",
                self.violations.len()
            )?;
        }
        writeln!(
            f,
            "{} terminal path(s), {} truncated, {} states explored",
            self.stats.terminal_paths, self.stats.truncated_paths, self.stats.explored_states
        )?;
        writeln!(f)?;

        writeln!(f, "Execution paths")?;
        for (i, path) in self.execution_paths.iter().enumerate() {
            let end = match path.end {
                PathEnd::Terminal => "",
                PathEnd::Truncated => " [truncated]",
            };
            writeln!(f, "  Path {}{}: {}", i + 1, end, path.final_process_state.label())?;
            write_trace(f, &path.trace)?;
        }

        if !self.violations.is_empty() {
            writeln!(f)?;
            writeln!(f, "Violations")?;
            for violation in &self.violations {
                writeln!(f, "  {}", violation.description)?;
                write_trace(f, &violation.trace)?;
            }
        }
        Ok(())
    }
}
