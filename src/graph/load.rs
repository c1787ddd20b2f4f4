//! Physical quantity kinds, units, and semantic tags for ports.

use std::collections::BTreeSet;
use std::fmt;

/// Physical quantity kind carried by a port.
///
/// `Any` is a wildcard: it is compatible with every other load type when
/// bindings are resolved. Used for dimensionless signals such as on/off
/// states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadType {
    /// Wildcard, compatible with everything.
    Any,
    /// Electrical power or energy.
    Electricity,
    /// Thermal power or energy for heating.
    Heating,
    /// Thermal power or energy for cooling.
    Cooling,
    /// A temperature reading.
    Temperature,
    /// Water mass or volume flow.
    Water,
    /// A duration.
    Time,
}

impl LoadType {
    /// Returns `true` when a binding between the two load types is allowed.
    ///
    /// `Any` on either side matches everything; otherwise the types must be
    /// equal.
    pub fn compatible_with(self, other: LoadType) -> bool {
        self == LoadType::Any || other == LoadType::Any || self == other
    }
}

/// Unit of the value carried by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Wildcard, compatible with everything.
    Any,
    Watt,
    WattHour,
    Celsius,
    KgPerSec,
    Seconds,
    Percent,
}

impl Unit {
    /// Returns `true` when a binding between the two units is allowed.
    pub fn compatible_with(self, other: Unit) -> bool {
        self == Unit::Any || other == Unit::Any || self == other
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Any => "-",
            Unit::Watt => "W",
            Unit::WattHour => "Wh",
            Unit::Celsius => "°C",
            Unit::KgPerSec => "kg/s",
            Unit::Seconds => "s",
            Unit::Percent => "%",
        };
        write!(f, "{s}")
    }
}

/// Semantic category label attached to a dynamic port.
///
/// Tags group dynamic ports by the kind of component they connect to or the
/// kind of signal they carry, so that a dynamic component can address ports
/// without knowing the concrete wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    // component kinds
    HeatPump,
    Battery,
    PhotovoltaicSystem,
    Occupancy,
    Storage,
    // signal kinds
    ElectricityProduction,
    ElectricityConsumption,
    GridBalance,
    ThermalDemand,
}

/// An explicit set of [`Tag`]s.
///
/// Lookups in the dynamic port registry use *superset* matching: a registry
/// entry matches a request when the entry's tag set contains every requested
/// tag. An entry tagged `{HeatPump, ElectricityConsumption}` therefore
/// matches a request for `{ElectricityConsumption}`; the match is
/// deliberately broader than exact equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(BTreeSet<Tag>);

impl TagSet {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tag set from a slice of tags. Duplicates collapse.
    pub fn from_slice(tags: &[Tag]) -> Self {
        Self(tags.iter().copied().collect())
    }

    /// Adds a tag to the set.
    pub fn insert(&mut self, tag: Tag) {
        self.0.insert(tag);
    }

    /// Returns `true` when the set contains `tag`.
    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains(&tag)
    }

    /// Returns `true` when this set contains every tag in `other`.
    ///
    /// This is the matching relation used by all dynamic port lookups:
    /// `requested ⊆ declared`.
    pub fn is_superset_of(&self, other: &TagSet) -> bool {
        other.0.iter().all(|t| self.0.contains(t))
    }

    /// Number of tags in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[Tag]> for TagSet {
    fn from(tags: &[Tag]) -> Self {
        Self::from_slice(tags)
    }
}

impl<const N: usize> From<[Tag; N]> for TagSet {
    fn from(tags: [Tag; N]) -> Self {
        Self::from_slice(&tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_load_type_is_wildcard() {
        assert!(LoadType::Any.compatible_with(LoadType::Electricity));
        assert!(LoadType::Heating.compatible_with(LoadType::Any));
        assert!(LoadType::Heating.compatible_with(LoadType::Heating));
        assert!(!LoadType::Heating.compatible_with(LoadType::Electricity));
    }

    #[test]
    fn any_unit_is_wildcard() {
        assert!(Unit::Any.compatible_with(Unit::Watt));
        assert!(Unit::Celsius.compatible_with(Unit::Any));
        assert!(!Unit::Celsius.compatible_with(Unit::Watt));
    }

    #[test]
    fn superset_matching() {
        let declared = TagSet::from([Tag::HeatPump, Tag::ElectricityConsumption]);
        let requested = TagSet::from([Tag::ElectricityConsumption]);
        assert!(declared.is_superset_of(&requested));
        assert!(!requested.is_superset_of(&declared));
    }

    #[test]
    fn empty_request_matches_everything() {
        let declared = TagSet::from([Tag::Battery]);
        assert!(declared.is_superset_of(&TagSet::new()));
    }

    #[test]
    fn duplicates_collapse() {
        let set = TagSet::from_slice(&[Tag::Battery, Tag::Battery]);
        assert_eq!(set.len(), 1);
    }
}
