use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::marking::{Count, Marking};
use crate::petri_net::TransitionId;

pub type StateId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub id: StateId,
    pub marking: Marking,
    #[serde(default)]
    pub label: String,
    pub is_initial: bool,
    pub is_terminal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: StateId,
    pub target: StateId,
    pub transition_id: TransitionId,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_states: usize,
    pub total_edges: usize,
}

/// Labeled transition system of a process model: one state per reachable
/// marking, one edge per firing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachabilityGraph {
    pub states: Vec<State>,
    pub edges: Vec<Edge>,
}

/// Marked places only, so a missing place and an empty one compare equal.
type MarkingSupport = Vec<(String, Count)>;

fn support(marking: &Marking) -> MarkingSupport {
    marking
        .marked()
        .map(|(id, count)| (id.to_string(), count))
        .collect()
}

impl ReachabilityGraph {
    pub fn state(&self, id: &str) -> Option<&State> {
        self.states.iter().find(|s| s.id == id)
    }

    pub fn initial_state(&self) -> Option<&State> {
        self.states.iter().find(|s| s.is_initial)
    }

    pub fn terminal_states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.iter().filter(|s| s.is_terminal)
    }

    pub fn outgoing<'g>(&'g self, id: &'g str) -> impl Iterator<Item = &'g Edge> + 'g {
        self.edges.iter().filter(move |e| e.source == id)
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_states: self.states.len(),
            total_edges: self.edges.len(),
        }
    }

    /// Compares two graphs by marking content only, ignoring state ids.
    ///
    /// States match on marking and initial/terminal flags, edges on
    /// (source marking, transition, target marking). Edges pointing at
    /// unknown states make the graphs unequal.
    pub fn is_equivalent_to(&self, other: &ReachabilityGraph) -> bool {
        match (self.semantic_form(), other.semantic_form()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    #[allow(clippy::type_complexity)]
    fn semantic_form(
        &self,
    ) -> Option<(
        Vec<(MarkingSupport, bool, bool)>,
        Vec<(MarkingSupport, TransitionId, MarkingSupport)>,
    )> {
        let by_id: HashMap<&str, MarkingSupport> = self
            .states
            .iter()
            .map(|s| (s.id.as_str(), support(&s.marking)))
            .collect();

        let mut states: Vec<_> = self
            .states
            .iter()
            .map(|s| (support(&s.marking), s.is_initial, s.is_terminal))
            .collect();
        states.sort();

        let mut edges = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            let source = by_id.get(edge.source.as_str())?;
            let target = by_id.get(edge.target.as_str())?;
            edges.push((source.clone(), edge.transition_id.clone(), target.clone()));
        }
        edges.sort();
        Some((states, edges))
    }
}

impl fmt::Display for ReachabilityGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for state in &self.states {
            let mut flags = vec![];
            if state.is_initial {
                flags.push("initial");
            }
            if state.is_terminal {
                flags.push("terminal");
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!(" ({})", flags.join(", "))
            };
            writeln!(f, "StateId: {}{} | {}", state.id, flags, state.label)?;
            writeln!(f, "  {}", state.marking)?;
            for edge in self.outgoing(&state.id) {
                writeln!(f, "  {} -> {}", edge.label, edge.target)?;
            }
            writeln!(f)?;
        }
        let stats = self.stats();
        writeln!(f, "{} states, {} edges", stats.total_states, stats.total_edges)
    }
}
