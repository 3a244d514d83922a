//! Checks whether every execution of a process model, given as a Petri net,
//! satisfies the qualities of a goal model, given a mapping from transitions
//! to goal elements.
//!
//! ```
//! use pncompliance::compliance::ComplianceExplorer;
//! use pncompliance::goal_model::{Contribution, ContributionType, Element, ElementType, GoalModel};
//! use pncompliance::mapping::MappingTable;
//! use pncompliance::petri_net::{Arc, Place, ProcessModel, Transition};
//!
//! let net = ProcessModel::new(
//!     vec![Place::new("p0", 1), Place::new("p1", 0)],
//!     vec![Transition::new("t0")],
//!     vec![Arc::new("a0", "p0", "t0"), Arc::new("a1", "t0", "p1")],
//! );
//! let goals = GoalModel::new(
//!     vec![Element::new("T", ElementType::Task), Element::new("Q", ElementType::Quality)],
//!     vec![],
//!     vec![Contribution::new("T", "Q", ContributionType::Make)],
//! );
//! let mapping: MappingTable = [("t0", "T")].into_iter().collect();
//!
//! let result = ComplianceExplorer::new(&goals, &net, &mapping).check();
//! assert!(result.is_compliant);
//! ```

pub mod compliance;
pub mod config;
pub mod error;
pub mod goal_model;
pub mod loader;
pub mod mapping;
pub mod marking;
pub mod parser;
pub mod petri_net;
pub mod reachability_graph;

pub use compliance::{check_compliance, ComplianceExplorer, ComplianceResult};
pub use config::ExplorerConfig;
pub use marking::{Marking, MarkingKey};
pub use reachability_graph::{build_reachability_graph, ReachabilityGraph};
