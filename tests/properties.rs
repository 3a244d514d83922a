use std::collections::HashSet;

use proptest::collection::vec;
use proptest::prelude::*;

use pncompliance::compliance::{check_compliance, ComplianceExplorer, PathEnd};
use pncompliance::config::ExplorerConfig;
use pncompliance::goal_model::{Contribution, ContributionType, Element, ElementType, GoalModel};
use pncompliance::mapping::MappingTable;
use pncompliance::petri_net::{enabled_transitions, fire, Arc, Place, ProcessModel, Transition};
use pncompliance::reachability_graph::build_reachability_graph_bounded;
use pncompliance::Marking;

type Connections = Vec<(Vec<bool>, Vec<bool>)>;

fn net_strategy() -> impl Strategy<Value = ProcessModel> {
    (1usize..5)
        .prop_flat_map(|n| {
            (
                vec(0u32..3, n),
                vec((vec(any::<bool>(), n), vec(any::<bool>(), n)), 1..4),
            )
        })
        .prop_map(|(tokens, connections)| build_net(&tokens, &connections))
}

fn build_net(tokens: &[u32], connections: &Connections) -> ProcessModel {
    let places = tokens
        .iter()
        .enumerate()
        .map(|(x, &n)| Place::new(format!("p{x}"), n))
        .collect();
    let mut transitions = vec![];
    let mut arcs = vec![];
    for (t, (inputs, outputs)) in connections.iter().enumerate() {
        let id = format!("t{t}");
        for (p, _) in inputs.iter().enumerate().filter(|(_, on)| **on) {
            arcs.push(Arc::new(format!("a{}", arcs.len()), format!("p{p}"), id.clone()));
        }
        for (p, _) in outputs.iter().enumerate().filter(|(_, on)| **on) {
            arcs.push(Arc::new(format!("a{}", arcs.len()), id.clone(), format!("p{p}")));
        }
        transitions.push(Transition::new(id));
    }
    ProcessModel::new(places, transitions, arcs)
}

/// One task per transition, every other task makes the quality and the rest
/// break it.
fn goals_for(net: &ProcessModel) -> (GoalModel, MappingTable) {
    let mut elements = vec![Element::new("Q", ElementType::Quality)];
    let mut contributions = vec![];
    let mut mapping = MappingTable::default();
    for (x, t) in net.transitions().iter().enumerate() {
        let task = format!("task_{}", t.id);
        let kind = if x % 2 == 0 {
            ContributionType::Make
        } else {
            ContributionType::Break
        };
        contributions.push(Contribution::new(task.clone(), "Q", kind));
        elements.push(Element::new(task.clone(), ElementType::Task));
        mapping.push(t.id.clone(), task);
    }
    (GoalModel::new(elements, vec![], contributions), mapping)
}

/// Nets whose transitions only move tokens to places with a higher index,
/// so every execution is finite.
fn acyclic_net_strategy() -> impl Strategy<Value = ProcessModel> {
    (2usize..5)
        .prop_flat_map(|n| {
            (
                vec(0u32..2, n),
                vec((0..n - 1, vec(any::<bool>(), n)), 1..4),
            )
        })
        .prop_map(|(tokens, raw)| {
            let n = tokens.len();
            let connections: Connections = raw
                .into_iter()
                .map(|(from, outputs)| {
                    let inputs = (0..n).map(|p| p == from).collect();
                    let outputs = outputs
                        .into_iter()
                        .enumerate()
                        .map(|(p, on)| on && p > from)
                        .collect();
                    (inputs, outputs)
                })
                .collect();
            build_net(&tokens, &connections)
        })
}

/// One task per transition; the tasks flagged in `makers` make the quality.
fn makers_for(net: &ProcessModel, makers: &[bool]) -> (GoalModel, MappingTable) {
    let mut elements = vec![Element::new("Q", ElementType::Quality)];
    let mut contributions = vec![];
    let mut mapping = MappingTable::default();
    for (x, t) in net.transitions().iter().enumerate() {
        let task = format!("task_{}", t.id);
        if makers.get(x).copied().unwrap_or(false) {
            contributions.push(Contribution::new(task.clone(), "Q", ContributionType::Make));
        }
        elements.push(Element::new(task.clone(), ElementType::Task));
        mapping.push(t.id.clone(), task);
    }
    (GoalModel::new(elements, vec![], contributions), mapping)
}

proptest! {
    #[test]
    fn firing_moves_one_token_per_arc(net in net_strategy()) {
        let marking = net.initial_marking();
        for transition in enabled_transitions(&net, &marking) {
            let next = fire(&net, &marking, &transition.id).unwrap();
            let consumed = net.input_places(&transition.id).unwrap().len() as u64;
            let produced = net.output_places(&transition.id).unwrap().len() as u64;
            prop_assert_eq!(next.total_tokens() + consumed, marking.total_tokens() + produced);
            prop_assert_eq!(next.len(), marking.len());
        }
    }

    #[test]
    fn disabled_transitions_do_not_fire(net in net_strategy()) {
        let marking = net.initial_marking();
        let enabled: HashSet<_> = enabled_transitions(&net, &marking)
            .into_iter()
            .map(|t| t.id.clone())
            .collect();
        for transition in net.transitions() {
            prop_assert_eq!(
                fire(&net, &marking, &transition.id).is_ok(),
                enabled.contains(&transition.id)
            );
        }
    }

    #[test]
    fn canonical_key_ignores_insertion_order(counts in vec(0u32..5, 1..8)) {
        let pairs: Vec<_> = counts
            .iter()
            .enumerate()
            .map(|(x, &c)| (format!("place{x}"), c))
            .collect();
        let forward = Marking::from_counts(pairs.clone());
        let backward = Marking::from_counts(pairs.into_iter().rev());
        prop_assert_eq!(forward.canonical_key(), backward.canonical_key());
        // zero counts are part of the key
        prop_assert_eq!(forward.canonical_key().as_str().split(',').count(), counts.len());
    }

    #[test]
    fn reachability_graph_is_deterministic(net in net_strategy()) {
        let first = build_reachability_graph_bounded(&net, 64);
        let second = build_reachability_graph_bounded(&net, 64);
        prop_assert_eq!(first.is_ok(), second.is_ok());
        if let (Ok(first), Ok(second)) = (first, second) {
            prop_assert_eq!(&first, &second);

            let keys: HashSet<_> = first.states.iter().map(|s| s.marking.canonical_key()).collect();
            prop_assert_eq!(keys.len(), first.states.len());
            prop_assert_eq!(first.states.iter().filter(|s| s.is_initial).count(), 1);
            for state in &first.states {
                let has_outgoing = first.outgoing(&state.id).next().is_some();
                prop_assert_eq!(state.is_terminal, !has_outgoing);
            }
        }
    }

    #[test]
    fn explored_paths_respect_depth_and_verdict(net in net_strategy(), max_depth in 1usize..6) {
        let (goals, mapping) = goals_for(&net);
        let config = ExplorerConfig::default().with_max_depth(max_depth);
        let result = ComplianceExplorer::new(&goals, &net, &mapping)
            .with_config(config.clone())
            .check();

        prop_assert_eq!(result.is_compliant, result.violations.is_empty());
        prop_assert_eq!(
            result.stats.terminal_paths + result.stats.truncated_paths,
            result.execution_paths.len()
        );
        for path in &result.execution_paths {
            prop_assert!(path.trace.len() <= max_depth);
            let dead = enabled_transitions(&net, &path.final_process_state).is_empty();
            match path.end {
                PathEnd::Terminal => prop_assert!(dead),
                PathEnd::Truncated => {
                    prop_assert!(!dead);
                    prop_assert_eq!(path.trace.len(), max_depth);
                }
            }
            for step in &path.trace {
                prop_assert_eq!(step.mapped_element.clone(), Some(format!("task_{}", step.transition)));
            }
        }
        for violation in &result.violations {
            let path = &result.execution_paths[violation.path_index];
            prop_assert_eq!(path.end, PathEnd::Terminal);
            prop_assert!(!path.satisfies_all_qualities());
        }

        let again = ComplianceExplorer::new(&goals, &net, &mapping)
            .with_config(config)
            .check();
        prop_assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::to_value(&again).unwrap()
        );
    }

    #[test]
    fn extra_make_contribution_keeps_compliance(
        net in acyclic_net_strategy(),
        makers in vec(any::<bool>(), 3),
        extra in 0usize..3
    ) {
        let config = ExplorerConfig::default().with_max_depth(256);
        let (goals, mapping) = makers_for(&net, &makers);
        let before = check_compliance(&goals, &net, &mapping, config.clone());
        prop_assert_eq!(before.stats.truncated_paths, 0);

        let mut more = makers.clone();
        more[extra] = true;
        let (goals, mapping) = makers_for(&net, &more);
        let after = check_compliance(&goals, &net, &mapping, config);

        if before.is_compliant {
            prop_assert!(after.is_compliant);
        }
    }
}
