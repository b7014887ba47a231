use serde::{Deserialize, Serialize};

use super::PropertyType;

/// Raw form state as typed by the user
///
/// Every field is optional text at this layer. Typed values only exist
/// once the draft has passed validation and become a `ValidatedListing`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PropertyDraft {
    pub property_type: Option<String>,
    pub property_used_type: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub locality: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub price: Option<String>,
    pub area: Option<String>,
    pub area_unit: Option<String>,
    pub carpet_area: Option<String>,
    pub facing: Option<String>,
    pub ownership: Option<String>,
    pub availability_status: Option<String>,
    pub property_age: Option<String>,
    pub expected_possession_date: Option<String>,
    pub approvals: Option<String>,
    pub parking: Option<String>,
    pub amenities: Option<String>,
    pub facilities: Option<String>,
    pub neighborhood_boundaries: Option<String>,
    pub average_property_price: Option<String>,
    pub proximity_to_amenities: Option<String>,
    pub demographic_insights: Option<String>,
    pub is_public: Option<bool>,

    // Buildings
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub balconies: Option<String>,
    pub furnishing: Option<String>,
    pub uds: Option<String>,
    pub floor_number: Option<String>,
    pub total_floors: Option<String>,
    pub villa_type: Option<String>,
    pub private_garden_terrace_area: Option<String>,

    // Plots
    pub plot_area: Option<String>,
    pub length: Option<String>,
    pub breadth: Option<String>,
    pub length_unit: Option<String>,
    pub boundary_wall: Option<bool>,
    pub corner_plot: Option<bool>,
}

impl PropertyDraft {
    /// Drop values left over from a previously selected property type
    pub fn clear_fields_outside(&mut self, property_type: PropertyType) {
        use PropertyType::*;

        if !matches!(property_type, Flat | House | Villa) {
            self.bedrooms = None;
            self.bathrooms = None;
            self.balconies = None;
            self.uds = None;
        }
        if !matches!(property_type, Flat | House | Villa | Commercial) {
            self.furnishing = None;
        }
        if !matches!(property_type, Flat | Commercial) {
            self.floor_number = None;
            self.total_floors = None;
        }
        if property_type != Villa {
            self.villa_type = None;
            self.private_garden_terrace_area = None;
        }
        if property_type != Plot {
            self.plot_area = None;
            self.length = None;
            self.breadth = None;
            self.length_unit = None;
            self.boundary_wall = None;
            self.corner_plot = None;
        }
    }
}

/// Trimmed text, with blank input treated as absent
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
