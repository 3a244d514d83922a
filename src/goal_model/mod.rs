//! Goal models: goals and tasks refined into sub-elements, and qualities
//! influenced by tasks through contributions.

mod propagation;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use propagation::GoalModelState;

pub type ElementId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Goal,
    Task,
    Quality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefinementType {
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContributionType {
    #[serde(alias = "make")]
    Make,
    #[serde(alias = "break")]
    Break,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub element_type: ElementType,
}

impl Element {
    pub fn new(id: impl Into<ElementId>, element_type: ElementType) -> Self {
        Element {
            id: id.into(),
            name: None,
            element_type,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// `source` is the composite parent, `target` one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refinement {
    pub source: ElementId,
    pub target: ElementId,
    #[serde(rename = "type")]
    pub refinement_type: RefinementType,
}

impl Refinement {
    pub fn new(
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
        refinement_type: RefinementType,
    ) -> Self {
        Refinement {
            source: source.into(),
            target: target.into(),
            refinement_type,
        }
    }
}

/// A task (`source`) making or breaking a quality (`target`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub source: ElementId,
    pub target: ElementId,
    #[serde(rename = "type")]
    pub contribution_type: ContributionType,
}

impl Contribution {
    pub fn new(
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
        contribution_type: ContributionType,
    ) -> Self {
        Contribution {
            source: source.into(),
            target: target.into(),
            contribution_type,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GoalModelDef {
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    refinements: Vec<Refinement>,
    #[serde(default)]
    contributions: Vec<Contribution>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "GoalModelDef", into = "GoalModelDef")]
pub struct GoalModel {
    elements: Vec<Element>,
    refinements: Vec<Refinement>,
    contributions: Vec<Contribution>,
    element_index: HashMap<ElementId, usize>,
}

impl GoalModel {
    /// Duplicate element ids keep their first declaration.
    pub fn new(
        elements: Vec<Element>,
        refinements: Vec<Refinement>,
        contributions: Vec<Contribution>,
    ) -> Self {
        let mut element_index = HashMap::with_capacity(elements.len());
        let elements: Vec<Element> = elements
            .into_iter()
            .filter(|e| {
                if element_index.contains_key(&e.id) {
                    warn!(element = %e.id, "duplicate goal element id ignored");
                    return false;
                }
                element_index.insert(e.id.clone(), element_index.len());
                true
            })
            .collect();
        GoalModel {
            elements,
            refinements,
            contributions,
            element_index,
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn refinements(&self) -> &[Refinement] {
        &self.refinements
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.index_of(id).map(|x| &self.elements[x])
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.element_index.get(id).copied()
    }

    /// Elements that are not the source of any refinement.
    pub fn is_leaf(&self, id: &str) -> bool {
        !self.refinements.iter().any(|r| r.source == id)
    }

    pub fn qualities(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements
            .iter()
            .filter(|e| e.element_type == ElementType::Quality)
    }
}

impl From<GoalModelDef> for GoalModel {
    fn from(def: GoalModelDef) -> Self {
        GoalModel::new(def.elements, def.refinements, def.contributions)
    }
}

impl From<GoalModel> for GoalModelDef {
    fn from(model: GoalModel) -> Self {
        GoalModelDef {
            elements: model.elements,
            refinements: model.refinements,
            contributions: model.contributions,
        }
    }
}

/// Three-valued satisfaction status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "?")]
    Unknown,
    #[serde(rename = "⊤")]
    Satisfied,
    #[serde(rename = "⊥")]
    Denied,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Unknown => "?",
            Status::Satisfied => "⊤",
            Status::Denied => "⊥",
        })
    }
}

/// Marking of one element: goals and tasks carry `(status, pending)`,
/// qualities a single status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementMark {
    Intentional { status: Status, pending: Status },
    Quality(Status),
}

impl ElementMark {
    pub(crate) fn initial(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Goal | ElementType::Task => ElementMark::Intentional {
                status: Status::Unknown,
                pending: Status::Unknown,
            },
            ElementType::Quality => ElementMark::Quality(Status::Unknown),
        }
    }

    /// `(⊤, ⊥)` for goals and tasks, `⊤` for qualities.
    pub(crate) fn satisfied(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Goal | ElementType::Task => ElementMark::Intentional {
                status: Status::Satisfied,
                pending: Status::Denied,
            },
            ElementType::Quality => ElementMark::Quality(Status::Satisfied),
        }
    }

    pub fn status(&self) -> Status {
        match *self {
            ElementMark::Intentional { status, .. } => status,
            ElementMark::Quality(status) => status,
        }
    }
}

impl fmt::Display for ElementMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementMark::Intentional { status, pending } => write!(f, "({}, {})", status, pending),
            ElementMark::Quality(status) => write!(f, "{}", status),
        }
    }
}

/// Marks of every element, in the goal model's element order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GoalMarking {
    marks: Vec<ElementMark>,
}

impl GoalMarking {
    pub fn initial(model: &GoalModel) -> Self {
        GoalMarking {
            marks: model
                .elements
                .iter()
                .map(|e| ElementMark::initial(e.element_type))
                .collect(),
        }
    }

    pub fn get(&self, model: &GoalModel, id: &str) -> Option<ElementMark> {
        model.index_of(id).map(|x| self.marks[x])
    }

    pub(crate) fn mark(&self, x: usize) -> ElementMark {
        self.marks[x]
    }

    /// Returns true when the mark changed.
    pub(crate) fn set(&mut self, x: usize, mark: ElementMark) -> bool {
        let changed = self.marks[x] != mark;
        self.marks[x] = mark;
        changed
    }

    /// Element id to mark, for reporting.
    pub fn snapshot(&self, model: &GoalModel) -> BTreeMap<ElementId, ElementMark> {
        model
            .elements
            .iter()
            .zip(self.marks.iter())
            .map(|(e, m)| (e.id.clone(), *m))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_goal_model() {
        let model: GoalModel = serde_json::from_str(
            r#"{
                "elements": [
                    {"id": "G", "name": "Order handled", "type": "goal"},
                    {"id": "T", "type": "task"},
                    {"id": "Q", "name": "Fast", "type": "quality"}
                ],
                "refinements": [{"source": "G", "target": "T", "type": "and"}],
                "contributions": [{"source": "T", "target": "Q", "type": "Make"}]
            }"#,
        )
        .unwrap();
        assert_eq!(model.elements().len(), 3);
        assert!(!model.is_leaf("G"));
        assert!(model.is_leaf("T"));
        assert_eq!(model.element("Q").unwrap().display_name(), "Fast");
        assert_eq!(model.element("T").unwrap().display_name(), "T");
        assert_eq!(model.qualities().map(|q| q.id.as_str()).collect::<Vec<_>>(), ["Q"]);
        assert_eq!(
            model.contributions()[0].contribution_type,
            ContributionType::Make
        );
    }

    #[test]
    fn test_missing_collections_are_empty() {
        let model: GoalModel = serde_json::from_str(r#"{"elements": []}"#).unwrap();
        assert!(model.refinements().is_empty());
        assert!(model.contributions().is_empty());
    }

    #[test]
    fn test_unknown_element_type_rejected() {
        let parsed = serde_json::from_str::<GoalModel>(
            r#"{"elements": [{"id": "X", "type": "softgoal"}]}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_mark_serialization() {
        let task = ElementMark::satisfied(ElementType::Task);
        assert_eq!(
            serde_json::to_string(&task).unwrap(),
            r#"{"status":"⊤","pending":"⊥"}"#
        );
        let quality = ElementMark::initial(ElementType::Quality);
        assert_eq!(serde_json::to_string(&quality).unwrap(), r#""?""#);
        assert_eq!(task.to_string(), "(⊤, ⊥)");
    }
}
