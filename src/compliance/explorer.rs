use std::collections::HashMap;

use tracing::{debug, error, trace, warn};

use crate::config::{ExplorerConfig, TruncatedPaths};
use crate::goal_model::{GoalMarking, GoalModel, GoalModelState};
use crate::mapping::MappingTable;
use crate::marking::{Marking, MarkingKey};
use crate::petri_net::{enabled_transitions, fire, ProcessModel};

use super::result::{
    ComplianceResult, ExecutionPath, ExplorationStats, PathEnd, TraceStep, Violation,
};

/// Combined goal and process marking.
#[derive(Debug, PartialEq, Eq, Hash)]
struct ProductKey {
    goal: GoalMarking,
    process: MarkingKey,
}

struct TraceNode {
    step: TraceStep,
    parent: Option<usize>,
}

/// Trace steps shared between branches: every node points at the step
/// before it, so extending a trace is a single push.
#[derive(Default)]
struct TraceArena {
    nodes: Vec<TraceNode>,
}

impl TraceArena {
    fn push(&mut self, parent: Option<usize>, step: TraceStep) -> usize {
        self.nodes.push(TraceNode { step, parent });
        self.nodes.len() - 1
    }

    fn trace(&self, mut last: Option<usize>) -> Vec<TraceStep> {
        let mut steps = vec![];
        while let Some(x) = last {
            steps.push(self.nodes[x].step.clone());
            last = self.nodes[x].parent;
        }
        steps.reverse();
        steps
    }
}

struct PathRecord<'m> {
    last_step: Option<usize>,
    end: PathEnd,
    goal: GoalModelState<'m>,
    process: Marking,
}

/// A product state waiting to be explored.
struct Frame<'m> {
    goal: GoalModelState<'m>,
    process: Marking,
    last_step: Option<usize>,
    depth: usize,
}

#[derive(Default)]
struct Traversal<'m> {
    /// Largest remaining depth budget each product state was explored with.
    /// Terminal states are stored with `usize::MAX`.
    visited: HashMap<ProductKey, usize>,
    arena: TraceArena,
    paths: Vec<PathRecord<'m>>,
}

/// Explores every execution of a process model together with the goal model
/// it is mapped onto.
pub struct ComplianceExplorer<'a> {
    goal_model: &'a GoalModel,
    process_model: &'a ProcessModel,
    mapping: &'a MappingTable,
    config: ExplorerConfig,
}

impl<'a> ComplianceExplorer<'a> {
    pub fn new(
        goal_model: &'a GoalModel,
        process_model: &'a ProcessModel,
        mapping: &'a MappingTable,
    ) -> Self {
        ComplianceExplorer {
            goal_model,
            process_model,
            mapping,
            config: ExplorerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExplorerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn check(&self) -> ComplianceResult {
        for entry in self.mapping.dangling(self.goal_model) {
            warn!(transition = %entry.transition_id, element = %entry.goal_element_id,
                "mapping references unknown goal element");
        }

        let goal = GoalModelState::with_propagation(
            self.goal_model,
            self.config.refinement_propagation,
        );
        let process = self
            .process_model
            .initial_marking_with(self.config.initial_marking);
        debug!(
            max_depth = self.config.max_depth,
            initial = %process,
            "starting compliance exploration"
        );

        let mut traversal = Traversal::default();
        self.explore(
            &mut traversal,
            Frame {
                goal,
                process,
                last_step: None,
                depth: 0,
            },
        );
        let result = self.classify(traversal);

        debug!(
            compliant = result.is_compliant,
            paths = result.execution_paths.len(),
            violations = result.violations.len(),
            explored = result.stats.explored_states,
            "compliance exploration finished"
        );
        result
    }

    /// Depth first over product states with an explicit stack. Children are
    /// pushed in reverse so they are explored in declaration order.
    ///
    /// A product state is expanded again only when it is reached with more
    /// remaining depth than before, so a state cut off at the depth limit
    /// does not hide the paths a shorter route finds below it.
    fn explore(&self, traversal: &mut Traversal<'a>, root: Frame<'a>) {
        let mut stack = vec![root];
        while let Some(Frame {
            goal,
            process,
            last_step,
            depth,
        }) = stack.pop()
        {
            let key = ProductKey {
                goal: goal.marking().clone(),
                process: process.canonical_key(),
            };
            let remaining = self.config.max_depth.saturating_sub(depth);
            if traversal
                .visited
                .get(&key)
                .is_some_and(|&seen| seen >= remaining)
            {
                trace!(depth, marking = %process, "product state already explored");
                continue;
            }

            let enabled = enabled_transitions(self.process_model, &process);
            let end = if enabled.is_empty() {
                traversal.visited.insert(key, usize::MAX);
                Some(PathEnd::Terminal)
            } else {
                traversal.visited.insert(key, remaining);
                (remaining == 0).then_some(PathEnd::Truncated)
            };
            if let Some(end) = end {
                traversal.paths.push(PathRecord {
                    last_step,
                    end,
                    goal,
                    process,
                });
                continue;
            }

            let first_child = stack.len();
            for transition in enabled {
                let next_process = match fire(self.process_model, &process, &transition.id) {
                    Ok(marking) => marking,
                    Err(err) => {
                        error!(%err, "enabled transition failed to fire");
                        continue;
                    }
                };
                let mut next_goal = goal.clone();
                let mapped_element = self.mapping.lookup(&transition.id);
                if let Some(element_id) = mapped_element {
                    next_goal.execute_transition(element_id);
                }
                let step = traversal.arena.push(
                    last_step,
                    TraceStep {
                        transition: transition.id.clone(),
                        mapped_element: mapped_element.map(str::to_string),
                    },
                );
                stack.push(Frame {
                    goal: next_goal,
                    process: next_process,
                    last_step: Some(step),
                    depth: depth + 1,
                });
            }
            stack[first_child..].reverse();
        }
    }

    fn classify(&self, traversal: Traversal<'a>) -> ComplianceResult {
        let Traversal {
            visited,
            arena,
            paths,
        } = traversal;

        let mut stats = ExplorationStats {
            explored_states: visited.len(),
            ..Default::default()
        };
        let mut execution_paths = Vec::with_capacity(paths.len());
        let mut violations = vec![];

        for (path_index, record) in paths.into_iter().enumerate() {
            match record.end {
                PathEnd::Terminal => stats.terminal_paths += 1,
                PathEnd::Truncated => stats.truncated_paths += 1,
            }
            let unsatisfied_qualities: Vec<String> = record
                .goal
                .unsatisfied_qualities()
                .map(|q| q.display_name().to_string())
                .collect();
            let path = ExecutionPath {
                trace: arena.trace(record.last_step),
                end: record.end,
                final_goal_state: record.goal.marking().snapshot(self.goal_model),
                final_process_state: record.process,
                unsatisfied_qualities,
            };

            let counted = match path.end {
                PathEnd::Terminal => true,
                PathEnd::Truncated => self.config.truncated_paths == TruncatedPaths::Include,
            };
            if counted && !path.satisfies_all_qualities() {
                violations.push(Violation {
                    path_index,
                    description: format!(
                        "Path {} does not satisfy qualities: {}",
                        path_index + 1,
                        path.unsatisfied_qualities.join(", ")
                    ),
                    unsatisfied_qualities: path.unsatisfied_qualities.clone(),
                    trace: path.trace.clone(),
                });
            }
            execution_paths.push(path);
        }

        ComplianceResult {
            is_compliant: violations.is_empty(),
            execution_paths,
            violations,
            stats,
        }
    }
}

/// Runs a compliance check with `config`.
pub fn check_compliance(
    goal_model: &GoalModel,
    process_model: &ProcessModel,
    mapping: &MappingTable,
    config: ExplorerConfig,
) -> ComplianceResult {
    ComplianceExplorer::new(goal_model, process_model, mapping)
        .with_config(config)
        .check()
}
