//! Process models and the firing rule.
//!
//! Arcs have unit weight. A transition is enabled when every input place
//! holds at least one token; firing moves one token off each input place and
//! onto each output place.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::InitialMarking;
use crate::error::{FireError, FireResult};
use crate::marking::{Count, Marking, PlaceSet};

pub type PlaceId = String;
pub type TransitionId = String;
pub type ArcId = String;

/// Place ids or names the [`InitialMarking::ConventionalStartPlaces`] shim
/// treats as start places.
pub const CONVENTIONAL_START_PLACES: [&str; 3] = ["source", "start", "p0"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: PlaceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub initial_tokens: Count,
}

impl Place {
    pub fn new(id: impl Into<PlaceId>, initial_tokens: Count) -> Self {
        Place {
            id: id.into(),
            name: None,
            initial_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: TransitionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Transition {
    pub fn new(id: impl Into<TransitionId>) -> Self {
        Transition {
            id: id.into(),
            name: None,
        }
    }

    /// The display name, falling back to the id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc {
    pub id: ArcId,
    pub source: String,
    pub target: String,
}

impl Arc {
    pub fn new(id: impl Into<ArcId>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Arc {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProcessModelDef {
    #[serde(default)]
    places: Vec<Place>,
    #[serde(default)]
    transitions: Vec<Transition>,
    #[serde(default)]
    arcs: Vec<Arc>,
}

/// An immutable Petri net with per-transition arc indexes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ProcessModelDef", into = "ProcessModelDef")]
pub struct ProcessModel {
    places: Vec<Place>,
    transitions: Vec<Transition>,
    arcs: Vec<Arc>,
    place_set: PlaceSet,
    transition_index: HashMap<TransitionId, usize>,
    input_places: Vec<Vec<PlaceId>>,
    output_places: Vec<Vec<PlaceId>>,
}

impl ProcessModel {
    /// Builds the model, keeping the first declaration of duplicate ids and
    /// dropping arcs that do not connect a place with a transition.
    pub fn new(places: Vec<Place>, transitions: Vec<Transition>, arcs: Vec<Arc>) -> Self {
        let mut seen = HashSet::new();
        let places: Vec<Place> = places
            .into_iter()
            .filter(|p| {
                let fresh = seen.insert(p.id.clone());
                if !fresh {
                    warn!(place = %p.id, "duplicate place id ignored");
                }
                fresh
            })
            .collect();

        let mut transition_index = HashMap::with_capacity(transitions.len());
        let transitions: Vec<Transition> = transitions
            .into_iter()
            .filter(|t| {
                if transition_index.contains_key(&t.id) {
                    warn!(transition = %t.id, "duplicate transition id ignored");
                    return false;
                }
                transition_index.insert(t.id.clone(), transition_index.len());
                true
            })
            .collect();

        let mut place_ids: Vec<PlaceId> = places.iter().map(|p| p.id.clone()).collect();
        place_ids.sort();
        let place_set: PlaceSet = place_ids.into();
        let is_place = |id: &str| place_set.binary_search_by(|p| p.as_str().cmp(id)).is_ok();

        for t in transitions.iter().filter(|t| is_place(&t.id)) {
            warn!(id = %t.id, "id names both a place and a transition");
        }

        let mut input_places = vec![vec![]; transitions.len()];
        let mut output_places = vec![vec![]; transitions.len()];
        let mut connections = HashSet::new();
        let mut kept_arcs = Vec::with_capacity(arcs.len());
        for arc in arcs {
            let as_input = transition_index
                .get(&arc.target)
                .filter(|_| is_place(&arc.source));
            let as_output = transition_index
                .get(&arc.source)
                .filter(|_| is_place(&arc.target));
            let (t, is_input) = match (as_input, as_output) {
                (Some(&t), None) => (t, true),
                (None, Some(&t)) => (t, false),
                (Some(_), Some(_)) => {
                    warn!(arc = %arc.id, source = %arc.source, target = %arc.target,
                        "arc direction is ambiguous, dropped");
                    continue;
                }
                (None, None) => {
                    warn!(arc = %arc.id, source = %arc.source, target = %arc.target,
                        "arc does not connect a place and a transition, dropped");
                    continue;
                }
            };
            if !connections.insert((arc.source.clone(), arc.target.clone())) {
                warn!(arc = %arc.id, "parallel arc dropped, arcs have unit weight");
                continue;
            }
            if is_input {
                input_places[t].push(arc.source.clone());
            } else {
                output_places[t].push(arc.target.clone());
            }
            kept_arcs.push(arc);
        }

        ProcessModel {
            places,
            transitions,
            arcs: kept_arcs,
            place_set,
            transition_index,
            input_places,
            output_places,
        }
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Transitions in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub fn transition(&self, id: &str) -> Option<&Transition> {
        self.transition_index.get(id).map(|&x| &self.transitions[x])
    }

    pub fn input_places(&self, transition_id: &str) -> Option<&[PlaceId]> {
        self.transition_index
            .get(transition_id)
            .map(|&x| self.input_places[x].as_slice())
    }

    pub fn output_places(&self, transition_id: &str) -> Option<&[PlaceId]> {
        self.transition_index
            .get(transition_id)
            .map(|&x| self.output_places[x].as_slice())
    }

    /// Every place with its declared `initial_tokens`.
    pub fn initial_marking(&self) -> Marking {
        let tokens: HashMap<&str, Count> = self
            .places
            .iter()
            .map(|p| (p.id.as_str(), p.initial_tokens))
            .collect();
        self.marking_with(|id| tokens.get(id).copied().unwrap_or(0))
    }

    pub fn initial_marking_with(&self, policy: InitialMarking) -> Marking {
        let marking = self.initial_marking();
        match policy {
            InitialMarking::ConventionalStartPlaces if marking.total_tokens() == 0 => {
                self.conventional_start_marking()
            }
            _ => marking,
        }
    }

    /// Compatibility shim for models exported without an initial marking:
    /// one token on every place whose id or name is a conventional start
    /// marker.
    fn conventional_start_marking(&self) -> Marking {
        let starts: HashSet<&str> = self
            .places
            .iter()
            .filter(|p| {
                CONVENTIONAL_START_PLACES.contains(&p.id.as_str())
                    || p.name
                        .as_deref()
                        .is_some_and(|n| CONVENTIONAL_START_PLACES.contains(&n))
            })
            .map(|p| p.id.as_str())
            .collect();
        self.marking_with(|id| Count::from(starts.contains(id)))
    }

    /// A marking over this model's places with counts from `count`.
    pub fn marking_with<F>(&self, count: F) -> Marking
    where
        F: Fn(&str) -> Count,
    {
        let counts = self.place_set.iter().map(|id| count(id.as_str())).collect();
        Marking::from_parts(self.place_set.clone(), counts)
    }
}

impl From<ProcessModelDef> for ProcessModel {
    fn from(def: ProcessModelDef) -> Self {
        ProcessModel::new(def.places, def.transitions, def.arcs)
    }
}

impl From<ProcessModel> for ProcessModelDef {
    fn from(model: ProcessModel) -> Self {
        ProcessModelDef {
            places: model.places,
            transitions: model.transitions,
            arcs: model.arcs,
        }
    }
}

/// True iff every input place of the transition holds a token. Transitions
/// without input arcs are always enabled, unknown ones never are.
pub fn is_enabled(model: &ProcessModel, marking: &Marking, transition_id: &str) -> bool {
    match model.input_places(transition_id) {
        Some(inputs) => inputs.iter().all(|p| marking.count(p) >= 1),
        None => false,
    }
}

/// Fires `transition_id` on a copy of `marking`.
pub fn fire(model: &ProcessModel, marking: &Marking, transition_id: &str) -> FireResult<Marking> {
    let inputs = model
        .input_places(transition_id)
        .ok_or_else(|| FireError::UnknownTransition(transition_id.to_string()))?;
    let outputs = model.output_places(transition_id).unwrap_or_default();

    let mut marking = marking.clone();
    // update input places
    for place in inputs {
        if marking.remove(place, 1).is_none() {
            return Err(FireError::NotEnabled(transition_id.to_string()));
        }
    }
    // update output places
    for place in outputs {
        marking.add(place, 1);
    }
    Ok(marking)
}

/// Enabled transitions in declaration order.
pub fn enabled_transitions<'m>(model: &'m ProcessModel, marking: &Marking) -> Vec<&'m Transition> {
    model
        .transitions
        .iter()
        .enumerate()
        .filter(|(x, _)| model.input_places[*x].iter().all(|p| marking.count(p) >= 1))
        .map(|(_, t)| t)
        .collect()
}
