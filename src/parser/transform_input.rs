use std::collections::HashSet;

use crate::error::{LoadError, LoadResult};
use crate::petri_net::{Arc, Place, ProcessModel, Transition};

use super::parse_input::{RawParserInput, RawParserPlace, RawParserTransition};

/// Builds a process model from parsed input, checking every arc against the
/// declared places.
pub fn transform(input: RawParserInput) -> LoadResult<ProcessModel> {
    let declared: HashSet<&str> = input.net.places.iter().map(|p| p.name.as_str()).collect();

    let mut arcs = vec![];
    for transition in &input.transitions {
        // input places
        for place in check_places(transition, &transition.input_places, &declared)? {
            let id = format!("a{}", arcs.len());
            arcs.push(Arc::new(id, place, transition.name.as_str()));
        }
        // output places
        for place in check_places(transition, &transition.output_places, &declared)? {
            let id = format!("a{}", arcs.len());
            arcs.push(Arc::new(id, transition.name.as_str(), place));
        }
    }

    let places = input
        .net
        .places
        .iter()
        .map(|p| Place::new(p.name.as_str(), p.weight))
        .collect();
    let transitions = input
        .transitions
        .into_iter()
        .map(|t| Transition {
            id: t.name,
            name: t.label,
        })
        .collect();

    Ok(ProcessModel::new(places, transitions, arcs))
}

fn check_places<'a>(
    transition: &RawParserTransition,
    places: &'a [RawParserPlace],
    declared: &HashSet<&str>,
) -> LoadResult<Vec<&'a str>> {
    let mut checked = Vec::with_capacity(places.len());
    for place in places {
        if !declared.contains(place.name.as_str()) {
            return Err(LoadError::UnknownPlace {
                transition: transition.name.clone(),
                place: place.name.clone(),
            });
        }
        if place.weight != 1 {
            return Err(LoadError::UnsupportedWeight {
                transition: transition.name.clone(),
                place: place.name.clone(),
                weight: place.weight,
            });
        }
        checked.push(place.name.as_str());
    }
    Ok(checked)
}
