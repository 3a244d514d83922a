use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::petri_net::PlaceId;

pub type Count = u32;

/// Sorted place ids shared by every marking of one model.
pub(crate) type PlaceSet = Arc<[PlaceId]>;

const KEY_SEPARATOR: &str = ",";

/// Token counts per place.
///
/// Places are kept sorted by id and zero counts stay in the marking, so the
/// marking is total over its place set. Cloning copies the counts only, the
/// place ids are shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "BTreeMap<PlaceId, Count>", into = "BTreeMap<PlaceId, Count>")]
pub struct Marking {
    places: PlaceSet,
    counts: Vec<Count>,
}

impl Marking {
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, Count)>,
        S: Into<PlaceId>,
    {
        let sorted: BTreeMap<PlaceId, Count> =
            counts.into_iter().map(|(id, c)| (id.into(), c)).collect();
        Marking::from(sorted)
    }

    pub(crate) fn from_parts(places: PlaceSet, counts: Vec<Count>) -> Self {
        debug_assert_eq!(places.len(), counts.len());
        Marking { places, counts }
    }

    fn position(&self, place_id: &str) -> Result<usize, usize> {
        self.places.binary_search_by(|p| p.as_str().cmp(place_id))
    }

    /// Tokens on `place_id`, 0 for places outside the marking.
    pub fn count(&self, place_id: &str) -> Count {
        match self.position(place_id) {
            Ok(x) => self.counts[x],
            Err(_) => 0,
        }
    }

    /// Adds tokens, creating the place entry if it is missing. Counts
    /// saturate at `Count::MAX`.
    pub fn add(&mut self, place_id: &str, amount: Count) -> Count {
        let x = match self.position(place_id) {
            Ok(x) => x,
            Err(x) => {
                let mut places = self.places.to_vec();
                places.insert(x, place_id.to_string());
                self.places = places.into();
                self.counts.insert(x, 0);
                x
            }
        };
        self.counts[x] = self.counts[x].saturating_add(amount);
        self.counts[x]
    }

    /// Removes tokens. Returns `None` and leaves the marking untouched when
    /// the place holds fewer than `amount`.
    pub fn remove(&mut self, place_id: &str, amount: Count) -> Option<Count> {
        let x = self.position(place_id).ok()?;
        let left = self.counts[x].checked_sub(amount)?;
        self.counts[x] = left;
        Some(left)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Count)> + '_ {
        self.places
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }

    /// Places holding at least one token.
    pub fn marked(&self) -> impl Iterator<Item = (&str, Count)> + '_ {
        self.iter().filter(|(_, count)| *count > 0)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn total_tokens(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// `id:count` for every place in id order, zero counts included.
    pub fn canonical_key(&self) -> MarkingKey {
        let key = self
            .iter()
            .map(|(id, count)| format!("{}:{}", id, count))
            .collect::<Vec<_>>()
            .join(KEY_SEPARATOR);
        MarkingKey(key)
    }

    /// Short human readable form, e.g. `p1, p3(2)` or `∅`.
    pub fn label(&self) -> String {
        let active = self
            .marked()
            .map(|(id, count)| {
                if count > 1 {
                    format!("{}({})", id, count)
                } else {
                    id.to_string()
                }
            })
            .collect::<Vec<_>>();
        if active.is_empty() {
            "∅".to_string()
        } else {
            active.join(", ")
        }
    }
}

impl From<BTreeMap<PlaceId, Count>> for Marking {
    fn from(sorted: BTreeMap<PlaceId, Count>) -> Self {
        let (places, counts): (Vec<_>, Vec<_>) = sorted.into_iter().unzip();
        Marking {
            places: places.into(),
            counts,
        }
    }
}

impl From<Marking> for BTreeMap<PlaceId, Count> {
    fn from(marking: Marking) -> Self {
        marking
            .iter()
            .map(|(id, count)| (id.to_string(), count))
            .collect()
    }
}

impl fmt::Display for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.canonical_key())
    }
}

/// Canonical, comparable rendering of a [`Marking`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkingKey(String);

impl MarkingKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_sorted_and_total() {
        let marking = Marking::from_counts([("p2", 0), ("p0", 1), ("p1", 3)]);
        assert_eq!(marking.canonical_key().as_str(), "p0:1,p1:3,p2:0");
    }

    #[test]
    fn test_zero_places_distinguish_keys() {
        let a = Marking::from_counts([("p0", 1)]);
        let b = Marking::from_counts([("p0", 1), ("p1", 0)]);
        assert_ne!(a.canonical_key(), b.canonical_key());
    }

    #[test]
    fn test_marking_update() {
        let mut marking = Marking::from_counts([("p2", 1)]);
        assert_eq!(marking.remove("p2", 1), Some(0));
        assert_eq!(marking.remove("p2", 1), None);
        assert_eq!(marking.count("p2"), 0);
        assert_eq!(marking.len(), 1);
    }

    #[test]
    fn test_add_creates_missing_place() {
        let mut marking = Marking::from_counts([("b", 1)]);
        assert_eq!(marking.add("a", 2), 2);
        assert_eq!(marking.canonical_key().as_str(), "a:2,b:1");
    }

    #[test]
    fn test_add_saturates() {
        let mut marking = Marking::from_counts([("p", Count::MAX - 1)]);
        assert_eq!(marking.add("p", 5), Count::MAX);
        assert_eq!(marking.count("p"), Count::MAX);
    }

    #[test]
    fn test_label() {
        assert_eq!(Marking::from_counts([("p0", 0)]).label(), "∅");
        assert_eq!(
            Marking::from_counts([("p0", 1), ("p1", 0), ("p2", 2)]).label(),
            "p0, p2(2)"
        );
    }

    #[test]
    fn test_serializes_as_map() {
        let marking = Marking::from_counts([("p1", 0), ("p0", 1)]);
        let json = serde_json::to_string(&marking).unwrap();
        assert_eq!(json, r#"{"p0":1,"p1":0}"#);
        let back: Marking = serde_json::from_str(&json).unwrap();
        assert_eq!(back, marking);
    }
}
