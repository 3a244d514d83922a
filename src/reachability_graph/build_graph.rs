use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, error, trace};

use crate::error::GraphError;
use crate::marking::{Marking, MarkingKey};
use crate::petri_net::{enabled_transitions, fire, ProcessModel};

use super::graph::{Edge, ReachabilityGraph, State};

/// Builds the full reachability graph from the model's initial marking.
///
/// Does not terminate on unbounded nets; use
/// [`build_reachability_graph_bounded`] when the model is untrusted.
pub fn build_reachability_graph(model: &ProcessModel) -> ReachabilityGraph {
    explore(model, model.initial_marking(), None).0
}

pub fn build_reachability_graph_bounded(
    model: &ProcessModel,
    max_states: usize,
) -> Result<ReachabilityGraph, GraphError> {
    build_reachability_graph_from(model, model.initial_marking(), Some(max_states))
}

/// Builds the graph reachable from `initial`, failing once more than
/// `max_states` distinct markings have been found.
pub fn build_reachability_graph_from(
    model: &ProcessModel,
    initial: Marking,
    max_states: Option<usize>,
) -> Result<ReachabilityGraph, GraphError> {
    match explore(model, initial, max_states) {
        (graph, true) => Ok(graph),
        (_, false) => Err(GraphError::StateLimitExceeded {
            limit: max_states.unwrap_or_default(),
        }),
    }
}

/// Breadth first over markings, transitions in declaration order. Returns
/// the graph and whether it is complete.
fn explore(
    model: &ProcessModel,
    initial: Marking,
    max_states: Option<usize>,
) -> (ReachabilityGraph, bool) {
    let mut markings: Vec<Marking> = vec![];
    let mut state_ids: HashMap<MarkingKey, usize> = HashMap::new();
    let mut edges = vec![];
    let mut expanded = HashSet::new();
    let mut to_explore = VecDeque::new();

    debug!(initial = %initial, "building reachability graph");
    state_ids.insert(initial.canonical_key(), 0);
    markings.push(initial.clone());
    to_explore.push_back((0, initial));

    let mut complete = true;
    'explore: while let Some((state, marking)) = to_explore.pop_front() {
        if !expanded.insert(marking.canonical_key()) {
            continue;
        }
        trace!(state = %state_name(state), %marking, "expanding state");

        for transition in enabled_transitions(model, &marking) {
            let new_marking = match fire(model, &marking, &transition.id) {
                Ok(m) => m,
                Err(err) => {
                    error!(%err, "enabled transition failed to fire");
                    continue;
                }
            };

            // check if marking exists
            let key = new_marking.canonical_key();
            let target = match state_ids.get(&key) {
                Some(&x) => x,
                None => {
                    if max_states.is_some_and(|limit| markings.len() >= limit) {
                        complete = false;
                        break 'explore;
                    }
                    let x = markings.len();
                    state_ids.insert(key.clone(), x);
                    markings.push(new_marking.clone());
                    x
                }
            };

            let source_name = state_name(state);
            let target_name = state_name(target);
            edges.push(Edge {
                id: format!("{}_{}_{}", source_name, transition.id, target_name),
                source: source_name,
                target: target_name,
                transition_id: transition.id.clone(),
                label: transition.label().to_string(),
            });

            if !expanded.contains(&key) {
                to_explore.push_back((target, new_marking));
            }
        }
    }

    let states: Vec<State> = markings
        .into_iter()
        .enumerate()
        .map(|(x, marking)| State {
            id: state_name(x),
            label: marking.label(),
            is_initial: x == 0,
            is_terminal: enabled_transitions(model, &marking).is_empty(),
            marking,
        })
        .collect();

    debug!(
        states = states.len(),
        edges = edges.len(),
        complete,
        "reachability graph built"
    );
    (ReachabilityGraph { states, edges }, complete)
}

fn state_name(x: usize) -> String {
    format!("S{}", x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::petri_net::{Arc, Place, Transition};

    fn cycle() -> ProcessModel {
        ProcessModel::new(
            vec![Place::new("p0", 1), Place::new("p1", 0)],
            vec![Transition::new("go"), Transition::new("back")],
            vec![
                Arc::new("a0", "p0", "go"),
                Arc::new("a1", "go", "p1"),
                Arc::new("a2", "p1", "back"),
                Arc::new("a3", "back", "p0"),
            ],
        )
    }

    #[test]
    fn test_cycle_reuses_initial_state() {
        let graph = build_reachability_graph(&cycle());
        assert_eq!(graph.states.len(), 2);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[1].source, "S1");
        assert_eq!(graph.edges[1].target, "S0");
        assert_eq!(graph.edges[1].id, "S1_back_S0");
        assert_eq!(graph.terminal_states().count(), 0);
    }

    #[test]
    fn test_unbounded_net_hits_state_limit() {
        let model = ProcessModel::new(
            vec![Place::new("p", 0)],
            vec![Transition::new("gen")],
            vec![Arc::new("a", "gen", "p")],
        );
        assert_eq!(
            build_reachability_graph_bounded(&model, 5),
            Err(GraphError::StateLimitExceeded { limit: 5 })
        );
    }

    #[test]
    fn test_bounded_build_within_limit() {
        let graph = build_reachability_graph_bounded(&cycle(), 2).unwrap();
        assert_eq!(graph, build_reachability_graph(&cycle()));
    }

    #[test]
    fn test_edge_label_uses_transition_name() {
        let model = ProcessModel::new(
            vec![Place::new("p0", 1)],
            vec![Transition {
                id: "t0".to_string(),
                name: Some("Approve".to_string()),
            }],
            vec![Arc::new("a0", "p0", "t0")],
        );
        let graph = build_reachability_graph(&model);
        assert_eq!(graph.edges[0].label, "Approve");
        assert_eq!(graph.edges[0].transition_id, "t0");
        assert_eq!(graph.states[1].label, "∅");
    }
}
