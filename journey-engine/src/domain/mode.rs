//! Travel modes and mode sets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A way of moving through the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraverseMode {
    Walk,
    Bicycle,
    Car,
    Bus,
    Tram,
    Subway,
    Rail,
    Ferry,
}

impl TraverseMode {
    /// All modes, in bit order.
    pub const ALL: [TraverseMode; 8] = [
        TraverseMode::Walk,
        TraverseMode::Bicycle,
        TraverseMode::Car,
        TraverseMode::Bus,
        TraverseMode::Tram,
        TraverseMode::Subway,
        TraverseMode::Rail,
        TraverseMode::Ferry,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Returns true for scheduled public transport modes.
    pub fn is_transit(self) -> bool {
        matches!(
            self,
            TraverseMode::Bus
                | TraverseMode::Tram
                | TraverseMode::Subway
                | TraverseMode::Rail
                | TraverseMode::Ferry
        )
    }

    /// Returns true for modes that move along streets.
    pub fn is_on_street(self) -> bool {
        !self.is_transit()
    }

    pub fn is_driving(self) -> bool {
        self == TraverseMode::Car
    }

    pub fn is_cycling(self) -> bool {
        self == TraverseMode::Bicycle
    }

    pub fn is_walking(self) -> bool {
        self == TraverseMode::Walk
    }
}

impl fmt::Display for TraverseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraverseMode::Walk => "WALK",
            TraverseMode::Bicycle => "BICYCLE",
            TraverseMode::Car => "CAR",
            TraverseMode::Bus => "BUS",
            TraverseMode::Tram => "TRAM",
            TraverseMode::Subway => "SUBWAY",
            TraverseMode::Rail => "RAIL",
            TraverseMode::Ferry => "FERRY",
        };
        f.write_str(name)
    }
}

/// A compact set of [`TraverseMode`]s.
///
/// Used both for the modes a request allows and for the modes a street edge
/// permits.
///
/// # Examples
///
/// ```
/// use journey_engine::domain::{TraverseMode, TraverseModeSet};
///
/// let modes = TraverseModeSet::of(&[TraverseMode::Walk, TraverseMode::Bus]);
/// assert!(modes.contains(TraverseMode::Bus));
/// assert!(modes.has_transit());
/// assert!(!modes.contains(TraverseMode::Car));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TraverseMode>", into = "Vec<TraverseMode>")]
pub struct TraverseModeSet(u16);

impl TraverseModeSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every mode.
    pub fn all() -> Self {
        Self::of(&TraverseMode::ALL)
    }

    /// Walking, cycling and driving.
    pub fn all_street() -> Self {
        Self::of(&[TraverseMode::Walk, TraverseMode::Bicycle, TraverseMode::Car])
    }

    /// Walking plus every transit mode.
    pub fn walk_and_transit() -> Self {
        let mut set = Self::transit();
        set.insert(TraverseMode::Walk);
        set
    }

    /// Every transit mode.
    pub fn transit() -> Self {
        TraverseMode::ALL
            .iter()
            .filter(|m| m.is_transit())
            .copied()
            .collect()
    }

    pub fn of(modes: &[TraverseMode]) -> Self {
        modes.iter().copied().collect()
    }

    pub fn insert(&mut self, mode: TraverseMode) {
        self.0 |= mode.bit();
    }

    pub fn remove(&mut self, mode: TraverseMode) {
        self.0 &= !mode.bit();
    }

    pub fn contains(&self, mode: TraverseMode) -> bool {
        self.0 & mode.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True if any transit mode is present.
    pub fn has_transit(&self) -> bool {
        self.iter().any(TraverseMode::is_transit)
    }

    /// True if any street mode is present.
    pub fn has_street(&self) -> bool {
        self.iter().any(TraverseMode::is_on_street)
    }

    /// Modes present in both sets.
    pub fn intersection(&self, other: TraverseModeSet) -> TraverseModeSet {
        TraverseModeSet(self.0 & other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = TraverseMode> + '_ {
        TraverseMode::ALL.iter().copied().filter(|m| self.contains(*m))
    }
}

impl FromIterator<TraverseMode> for TraverseModeSet {
    fn from_iter<I: IntoIterator<Item = TraverseMode>>(iter: I) -> Self {
        let mut set = TraverseModeSet::empty();
        for mode in iter {
            set.insert(mode);
        }
        set
    }
}

impl From<Vec<TraverseMode>> for TraverseModeSet {
    fn from(modes: Vec<TraverseMode>) -> Self {
        modes.into_iter().collect()
    }
}

impl From<TraverseModeSet> for Vec<TraverseMode> {
    fn from(set: TraverseModeSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for TraverseModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transit_classification() {
        assert!(TraverseMode::Bus.is_transit());
        assert!(TraverseMode::Ferry.is_transit());
        assert!(!TraverseMode::Walk.is_transit());
        assert!(TraverseMode::Car.is_driving());
        assert!(TraverseMode::Bicycle.is_cycling());
    }

    #[test]
    fn set_insert_remove() {
        let mut set = TraverseModeSet::empty();
        assert!(set.is_empty());

        set.insert(TraverseMode::Walk);
        set.insert(TraverseMode::Rail);
        assert!(set.contains(TraverseMode::Walk));
        assert!(set.has_transit());
        assert!(set.has_street());

        set.remove(TraverseMode::Rail);
        assert!(!set.has_transit());
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![TraverseMode::Walk]);
    }

    #[test]
    fn intersection_keeps_common_modes() {
        let a = TraverseModeSet::all_street();
        let b = TraverseModeSet::walk_and_transit();
        let common = a.intersection(b);
        assert_eq!(common.iter().collect::<Vec<_>>(), vec![TraverseMode::Walk]);
    }

    #[test]
    fn serde_as_list() {
        let set = TraverseModeSet::of(&[TraverseMode::Walk, TraverseMode::Bus]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["WALK","BUS"]"#);

        let back: TraverseModeSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
