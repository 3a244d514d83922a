use serde::{Deserialize, Serialize};

use crate::goal_model::{ElementId, GoalModel};
use crate::petri_net::TransitionId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    pub transition_id: TransitionId,
    pub goal_element_id: ElementId,
}

/// Ordered transition to goal element pairs. Neither total nor injective.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
}

impl MappingTable {
    pub fn new(entries: Vec<MappingEntry>) -> Self {
        MappingTable { entries }
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn push(&mut self, transition_id: impl Into<TransitionId>, goal_element_id: impl Into<ElementId>) {
        self.entries.push(MappingEntry {
            transition_id: transition_id.into(),
            goal_element_id: goal_element_id.into(),
        });
    }

    /// The goal element of the first entry for `transition_id`.
    pub fn lookup(&self, transition_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.transition_id == transition_id)
            .map(|e| e.goal_element_id.as_str())
    }

    /// Entries whose goal element does not exist in `model`.
    pub fn dangling<'a>(&'a self, model: &'a GoalModel) -> impl Iterator<Item = &'a MappingEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| model.element(&e.goal_element_id).is_none())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T, E> FromIterator<(T, E)> for MappingTable
where
    T: Into<TransitionId>,
    E: Into<ElementId>,
{
    fn from_iter<I: IntoIterator<Item = (T, E)>>(iter: I) -> Self {
        let mut table = MappingTable::default();
        for (t, e) in iter {
            table.push(t, e);
        }
        table
    }
}
