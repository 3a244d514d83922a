//! Reachability graph (labeled transition system) of a process model on its
//! own. States are numbered `S0`, `S1`, ... in first-visit order.

pub mod build_graph;
pub mod graph;

pub use build_graph::{
    build_reachability_graph, build_reachability_graph_bounded, build_reachability_graph_from,
};
pub use graph::{Edge, GraphStats, ReachabilityGraph, State, StateId};
