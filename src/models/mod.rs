pub mod draft;
pub mod listing;

pub use draft::PropertyDraft;
pub use listing::{
    BuildingDetails, CommonFields, PlotDetails, PropertyDetails, PropertyDocument, ValidatedListing,
};

use serde::{Deserialize, Serialize};

/// Closed vocabularies selected from a dropdown, stored by their display label
pub trait Labelled: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;

    /// Case-insensitive lookup by display label
    fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.label().eq_ignore_ascii_case(text))
    }
}

/// Kind of property being listed; decides which fields apply
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Flat,
    House,
    Villa,
    Plot,
    Commercial,
}

impl Labelled for PropertyType {
    const ALL: &'static [Self] = &[
        Self::Flat,
        Self::House,
        Self::Villa,
        Self::Plot,
        Self::Commercial,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Flat => "Flat",
            Self::House => "House",
            Self::Villa => "Villa",
            Self::Plot => "Plot",
            Self::Commercial => "Commercial",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Facing {
    East,
    West,
    North,
    South,
    NE,
    NW,
    SE,
    SW,
    Other,
}

impl Labelled for Facing {
    const ALL: &'static [Self] = &[
        Self::East,
        Self::West,
        Self::North,
        Self::South,
        Self::NE,
        Self::NW,
        Self::SE,
        Self::SW,
        Self::Other,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::East => "East",
            Self::West => "West",
            Self::North => "North",
            Self::South => "South",
            Self::NE => "NE",
            Self::NW => "NW",
            Self::SE => "SE",
            Self::SW => "SW",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Furnishing {
    Unfurnished,
    #[serde(rename = "Semi-Furnished")]
    SemiFurnished,
    Furnished,
}

impl Labelled for Furnishing {
    const ALL: &'static [Self] = &[Self::Unfurnished, Self::SemiFurnished, Self::Furnished];

    fn label(&self) -> &'static str {
        match self {
            Self::Unfurnished => "Unfurnished",
            Self::SemiFurnished => "Semi-Furnished",
            Self::Furnished => "Furnished",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Ownership {
    Freehold,
    Leasehold,
    #[serde(rename = "Co-operative Society")]
    CooperativeSociety,
    #[serde(rename = "Power of Attorney")]
    PowerOfAttorney,
}

impl Labelled for Ownership {
    const ALL: &'static [Self] = &[
        Self::Freehold,
        Self::Leasehold,
        Self::CooperativeSociety,
        Self::PowerOfAttorney,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Freehold => "Freehold",
            Self::Leasehold => "Leasehold",
            Self::CooperativeSociety => "Co-operative Society",
            Self::PowerOfAttorney => "Power of Attorney",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AvailabilityStatus {
    #[serde(rename = "Ready to Move")]
    ReadyToMove,
    #[serde(rename = "Under Construction")]
    UnderConstruction,
}

impl Labelled for AvailabilityStatus {
    const ALL: &'static [Self] = &[Self::ReadyToMove, Self::UnderConstruction];

    fn label(&self) -> &'static str {
        match self {
            Self::ReadyToMove => "Ready to Move",
            Self::UnderConstruction => "Under Construction",
        }
    }
}

/// Unit for plot length and breadth
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Feet,
    Meters,
}

impl LengthUnit {
    pub const FEET_PER_METER: f64 = 3.28084;
    pub const METERS_PER_FOOT: f64 = 0.3048;

    pub fn to_feet(&self, value: f64) -> f64 {
        match self {
            Self::Feet => value,
            Self::Meters => value * Self::FEET_PER_METER,
        }
    }

    pub fn from_feet(&self, feet: f64) -> f64 {
        match self {
            Self::Feet => feet,
            Self::Meters => feet * Self::METERS_PER_FOOT,
        }
    }
}

impl Labelled for LengthUnit {
    const ALL: &'static [Self] = &[Self::Feet, Self::Meters];

    fn label(&self) -> &'static str {
        match self {
            Self::Feet => "feet",
            Self::Meters => "meters",
        }
    }
}

/// Unit for total area; square feet is the canonical base
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AreaUnit {
    #[default]
    #[serde(rename = "Sq. Feet")]
    SqFeet,
    #[serde(rename = "Sq. Yards")]
    SqYards,
    #[serde(rename = "Sq. Meters")]
    SqMeters,
    Acres,
    Guntas,
}

impl AreaUnit {
    /// How many square feet one of this unit covers
    pub fn sq_ft_per_unit(&self) -> f64 {
        match self {
            Self::SqFeet => 1.0,
            Self::SqYards => 9.0,
            Self::SqMeters => 10.7639,
            Self::Acres => 43560.0,
            Self::Guntas => 1089.0,
        }
    }

    pub fn to_sq_ft(&self, value: f64) -> f64 {
        value * self.sq_ft_per_unit()
    }

    pub fn from_sq_ft(&self, sq_ft: f64) -> f64 {
        sq_ft / self.sq_ft_per_unit()
    }
}

impl Labelled for AreaUnit {
    const ALL: &'static [Self] = &[
        Self::SqFeet,
        Self::SqYards,
        Self::SqMeters,
        Self::Acres,
        Self::Guntas,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::SqFeet => "Sq. Feet",
            Self::SqYards => "Sq. Yards",
            Self::SqMeters => "Sq. Meters",
            Self::Acres => "Acres",
            Self::Guntas => "Guntas",
        }
    }
}

/// Map location stored as a single value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// An image picked for upload, held in memory until submission
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
