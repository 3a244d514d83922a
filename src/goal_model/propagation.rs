use tracing::trace;

use crate::config::RefinementPropagation;

use super::{
    ContributionType, Element, ElementMark, ElementType, GoalMarking, GoalModel, RefinementType,
    Status,
};

/// A goal marking bound to its goal model.
///
/// Cloning is cheap and gives an independent marking, which is how the
/// compliance explorer isolates branches.
#[derive(Debug, Clone)]
pub struct GoalModelState<'m> {
    model: &'m GoalModel,
    marking: GoalMarking,
    propagation: RefinementPropagation,
}

impl<'m> GoalModelState<'m> {
    /// Every element starts at `?`.
    pub fn new(model: &'m GoalModel) -> Self {
        Self::with_propagation(model, RefinementPropagation::default())
    }

    pub fn with_propagation(model: &'m GoalModel, propagation: RefinementPropagation) -> Self {
        GoalModelState {
            model,
            marking: GoalMarking::initial(model),
            propagation,
        }
    }

    pub fn model(&self) -> &'m GoalModel {
        self.model
    }

    pub fn marking(&self) -> &GoalMarking {
        &self.marking
    }

    pub fn mark(&self, element_id: &str) -> Option<ElementMark> {
        self.marking.get(self.model, element_id)
    }

    pub fn status(&self, element_id: &str) -> Option<Status> {
        self.mark(element_id).map(|m| m.status())
    }

    /// Completes a leaf task and propagates the effect.
    ///
    /// Returns false without touching the marking when the element is
    /// unknown, not a task, or not a leaf.
    pub fn execute_transition(&mut self, element_id: &str) -> bool {
        let Some(x) = self.model.index_of(element_id) else {
            return false;
        };
        let element = &self.model.elements[x];
        if element.element_type != ElementType::Task || !self.model.is_leaf(element_id) {
            trace!(element = element_id, "not a leaf task, goal marking unchanged");
            return false;
        }

        self.marking.set(x, ElementMark::satisfied(ElementType::Task));
        self.propagate_refinements(element_id);
        self.propagate_contributions(element_id);
        true
    }

    /// Re-evaluates the parents of `element_id`. In transitive mode every
    /// parent that becomes satisfied is re-evaluated in turn.
    pub fn propagate_refinements(&mut self, element_id: &str) {
        let mut pending = vec![element_id];
        while let Some(child) = pending.pop() {
            let satisfied = self.refine_parents(child);
            if self.propagation == RefinementPropagation::Transitive {
                pending.extend(satisfied);
            }
        }
    }

    /// One level of refinement propagation. Returns the parents whose mark
    /// changed.
    fn refine_parents(&mut self, child: &str) -> Vec<&'m str> {
        let model = self.model;
        let mut changed = vec![];
        for refinement in model.refinements.iter().filter(|r| r.target == child) {
            let parent = refinement.source.as_str();
            let Some(x) = model.index_of(parent) else {
                continue;
            };
            let satisfied = match refinement.refinement_type {
                RefinementType::And => model
                    .refinements
                    .iter()
                    .filter(|r| r.source == parent && r.refinement_type == RefinementType::And)
                    .all(|r| self.status(&r.target) == Some(Status::Satisfied)),
                RefinementType::Or => true,
            };
            if satisfied
                && self
                    .marking
                    .set(x, ElementMark::satisfied(model.elements[x].element_type))
            {
                trace!(parent, child, "refinement satisfied");
                changed.push(parent);
            }
        }
        changed
    }

    /// Applies every contribution sourced at `element_id`; later
    /// contributions overwrite earlier ones.
    pub fn propagate_contributions(&mut self, element_id: &str) {
        let model = self.model;
        for contribution in model.contributions.iter().filter(|c| c.source == element_id) {
            let Some(x) = model.index_of(&contribution.target) else {
                continue;
            };
            if model.elements[x].element_type != ElementType::Quality {
                continue;
            }
            let status = match contribution.contribution_type {
                ContributionType::Make => Status::Satisfied,
                ContributionType::Break => Status::Denied,
            };
            self.marking.set(x, ElementMark::Quality(status));
        }
    }

    /// True iff every quality is `⊤`; holds vacuously without qualities.
    pub fn are_all_qualities_satisfied(&self) -> bool {
        self.unsatisfied_qualities().next().is_none()
    }

    pub fn unsatisfied_qualities(&self) -> impl Iterator<Item = &'m Element> + '_ {
        let model = self.model;
        model
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.element_type == ElementType::Quality)
            .filter(|(x, _)| self.marking.mark(*x).status() != Status::Satisfied)
            .map(|(_, e)| e)
    }
}
