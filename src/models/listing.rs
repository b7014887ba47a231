use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{
    AreaUnit, AvailabilityStatus, Facing, Furnishing, GeoPoint, Labelled, LengthUnit, Ownership,
    PropertyDraft, PropertyType,
};

/// Days a listing stays valid after creation
pub const VALIDITY_DAYS: i64 = 30;

/// Fields every listing carries regardless of its type
#[derive(Debug, Clone, PartialEq)]
pub struct CommonFields {
    /// Residential, commercial or similar; free text
    pub property_used_type: Option<String>,
    pub description: String,
    pub address: String,
    pub locality: String,
    pub city: String,
    pub geo: Option<GeoPoint>,
    pub price: String,
    pub area: String,
    pub area_unit: AreaUnit,
    pub carpet_area: Option<String>,
    pub facing: Option<Facing>,
    pub ownership: Option<Ownership>,
    pub availability_status: Option<AvailabilityStatus>,
    pub property_age: Option<String>,
    pub expected_possession_date: Option<NaiveDate>,
    pub approvals: Option<String>,
    pub parking: Option<String>,
    pub amenities: Option<String>,
    pub facilities: Option<String>,
    pub neighborhood_boundaries: Option<String>,
    pub average_property_price: Option<String>,
    pub proximity_to_amenities: Option<String>,
    pub demographic_insights: Option<String>,
    pub is_public: bool,
}

/// Room layout shared by flats, houses and villas
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingDetails {
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub balconies: Option<String>,
    pub furnishing: Option<Furnishing>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotDetails {
    pub plot_area: Option<String>,
    pub length: Option<String>,
    pub breadth: Option<String>,
    pub length_unit: LengthUnit,
    pub boundary_wall: Option<bool>,
    pub corner_plot: Option<bool>,
}

/// Type-specific part of a listing, one variant per property type
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyDetails {
    Flat {
        building: BuildingDetails,
        floor_number: u32,
        total_floors: Option<u32>,
        uds: Option<String>,
    },
    House {
        building: BuildingDetails,
        uds: String,
    },
    Villa {
        building: BuildingDetails,
        villa_type: Option<String>,
        uds: Option<String>,
        private_garden_terrace_area: Option<String>,
    },
    Plot(PlotDetails),
    Commercial {
        floor_number: Option<u32>,
        total_floors: Option<u32>,
        furnishing: Option<Furnishing>,
    },
}

impl PropertyDetails {
    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::Flat { .. } => PropertyType::Flat,
            Self::House { .. } => PropertyType::House,
            Self::Villa { .. } => PropertyType::Villa,
            Self::Plot(_) => PropertyType::Plot,
            Self::Commercial { .. } => PropertyType::Commercial,
        }
    }
}

/// A draft that passed every field and cross-field rule
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedListing {
    pub common: CommonFields,
    pub details: PropertyDetails,
}

impl ValidatedListing {
    pub fn property_type(&self) -> PropertyType {
        self.details.property_type()
    }

    /// Write the listing back into form shape; fields the type does not use stay `None`
    pub fn to_draft(&self) -> PropertyDraft {
        let c = &self.common;
        let mut draft = PropertyDraft {
            property_type: Some(self.property_type().label().to_string()),
            property_used_type: c.property_used_type.clone(),
            description: Some(c.description.clone()),
            address: Some(c.address.clone()),
            locality: Some(c.locality.clone()),
            city: Some(c.city.clone()),
            latitude: c.geo.map(|g| g.latitude.to_string()),
            longitude: c.geo.map(|g| g.longitude.to_string()),
            price: Some(c.price.clone()),
            area: Some(c.area.clone()),
            area_unit: Some(c.area_unit.label().to_string()),
            carpet_area: c.carpet_area.clone(),
            facing: c.facing.map(|f| f.label().to_string()),
            ownership: c.ownership.map(|o| o.label().to_string()),
            availability_status: c.availability_status.map(|a| a.label().to_string()),
            property_age: c.property_age.clone(),
            expected_possession_date: c
                .expected_possession_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            approvals: c.approvals.clone(),
            parking: c.parking.clone(),
            amenities: c.amenities.clone(),
            facilities: c.facilities.clone(),
            neighborhood_boundaries: c.neighborhood_boundaries.clone(),
            average_property_price: c.average_property_price.clone(),
            proximity_to_amenities: c.proximity_to_amenities.clone(),
            demographic_insights: c.demographic_insights.clone(),
            is_public: Some(c.is_public),
            ..Default::default()
        };

        let fill_building = |draft: &mut PropertyDraft, b: &BuildingDetails| {
            draft.bedrooms = b.bedrooms.map(|n| n.to_string());
            draft.bathrooms = b.bathrooms.map(|n| n.to_string());
            draft.balconies = b.balconies.clone();
            draft.furnishing = b.furnishing.map(|f| f.label().to_string());
        };

        match &self.details {
            PropertyDetails::Flat {
                building,
                floor_number,
                total_floors,
                uds,
            } => {
                fill_building(&mut draft, building);
                draft.floor_number = Some(floor_number.to_string());
                draft.total_floors = total_floors.map(|n| n.to_string());
                draft.uds = uds.clone();
            }
            PropertyDetails::House { building, uds } => {
                fill_building(&mut draft, building);
                draft.uds = Some(uds.clone());
            }
            PropertyDetails::Villa {
                building,
                villa_type,
                uds,
                private_garden_terrace_area,
            } => {
                fill_building(&mut draft, building);
                draft.villa_type = villa_type.clone();
                draft.uds = uds.clone();
                draft.private_garden_terrace_area = private_garden_terrace_area.clone();
            }
            PropertyDetails::Plot(plot) => {
                draft.plot_area = plot.plot_area.clone();
                draft.length = plot.length.clone();
                draft.breadth = plot.breadth.clone();
                draft.length_unit = Some(plot.length_unit.label().to_string());
                draft.boundary_wall = plot.boundary_wall;
                draft.corner_plot = plot.corner_plot;
            }
            PropertyDetails::Commercial {
                floor_number,
                total_floors,
                furnishing,
            } => {
                draft.floor_number = floor_number.map(|n| n.to_string());
                draft.total_floors = total_floors.map(|n| n.to_string());
                draft.furnishing = furnishing.map(|f| f.label().to_string());
            }
        }

        draft
    }
}

/// Flat document written to the record store
///
/// Absent values serialize as explicit `null`, never as missing keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyDocument {
    pub id: String,
    pub property_type: PropertyType,
    pub property_used_type: Option<String>,
    pub images: Vec<String>,
    pub contacted_leads: Vec<String>,
    pub shortlisted_leads: Vec<String>,
    pub description: String,
    pub address: String,
    pub locality: String,
    pub city: String,
    pub map_location: Option<GeoPoint>,
    pub price: String,
    pub area: String,
    pub area_unit: AreaUnit,
    pub carpet_area: Option<String>,
    pub facing: Option<Facing>,
    pub ownership: Option<Ownership>,
    pub availability_status: Option<AvailabilityStatus>,
    pub property_age: Option<String>,
    pub expected_possession_date: Option<NaiveDate>,
    pub approvals: Option<String>,
    pub parking: Option<String>,
    pub amenities: Option<String>,
    pub facilities: Option<String>,
    pub neighborhood_boundaries: Option<String>,
    pub average_property_price: Option<String>,
    pub proximity_to_amenities: Option<String>,
    pub demographic_insights: Option<String>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub balconies: Option<String>,
    pub furnishing: Option<Furnishing>,
    pub uds: Option<String>,
    pub floor_number: Option<u32>,
    pub total_floors: Option<u32>,
    pub villa_type: Option<String>,
    pub private_garden_terrace_area: Option<String>,
    pub plot_area: Option<String>,
    pub length: Option<String>,
    pub breadth: Option<String>,
    pub length_unit: Option<LengthUnit>,
    pub boundary_wall: Option<bool>,
    pub corner_plot: Option<bool>,
    pub is_public: bool,
    pub paid: bool,
    pub duplicate_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub validity_end: DateTime<Utc>,
}

impl PropertyDocument {
    /// Build the stored document; the validity window is fixed here and never recomputed
    pub fn assemble(
        listing: &ValidatedListing,
        id: String,
        images: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let c = listing.common.clone();
        let mut doc = Self {
            id,
            property_type: listing.property_type(),
            property_used_type: c.property_used_type,
            images,
            contacted_leads: Vec::new(),
            shortlisted_leads: Vec::new(),
            description: c.description,
            address: c.address,
            locality: c.locality,
            city: c.city,
            map_location: c.geo,
            price: c.price,
            area: c.area,
            area_unit: c.area_unit,
            carpet_area: c.carpet_area,
            facing: c.facing,
            ownership: c.ownership,
            availability_status: c.availability_status,
            property_age: c.property_age,
            expected_possession_date: c.expected_possession_date,
            approvals: c.approvals,
            parking: c.parking,
            amenities: c.amenities,
            facilities: c.facilities,
            neighborhood_boundaries: c.neighborhood_boundaries,
            average_property_price: c.average_property_price,
            proximity_to_amenities: c.proximity_to_amenities,
            demographic_insights: c.demographic_insights,
            bedrooms: None,
            bathrooms: None,
            balconies: None,
            furnishing: None,
            uds: None,
            floor_number: None,
            total_floors: None,
            villa_type: None,
            private_garden_terrace_area: None,
            plot_area: None,
            length: None,
            breadth: None,
            length_unit: None,
            boundary_wall: None,
            corner_plot: None,
            is_public: c.is_public,
            paid: false,
            duplicate_hash: None,
            created_at,
            updated_at: None,
            validity_end: created_at + Duration::days(VALIDITY_DAYS),
        };

        match &listing.details {
            PropertyDetails::Flat {
                building,
                floor_number,
                total_floors,
                uds,
            } => {
                doc.set_building(building);
                doc.floor_number = Some(*floor_number);
                doc.total_floors = *total_floors;
                doc.uds = uds.clone();
            }
            PropertyDetails::House { building, uds } => {
                doc.set_building(building);
                doc.uds = Some(uds.clone());
            }
            PropertyDetails::Villa {
                building,
                villa_type,
                uds,
                private_garden_terrace_area,
            } => {
                doc.set_building(building);
                doc.villa_type = villa_type.clone();
                doc.uds = uds.clone();
                doc.private_garden_terrace_area = private_garden_terrace_area.clone();
            }
            PropertyDetails::Plot(plot) => {
                doc.plot_area = plot.plot_area.clone();
                doc.length = plot.length.clone();
                doc.breadth = plot.breadth.clone();
                doc.length_unit = Some(plot.length_unit);
                doc.boundary_wall = plot.boundary_wall;
                doc.corner_plot = plot.corner_plot;
            }
            PropertyDetails::Commercial {
                floor_number,
                total_floors,
                furnishing,
            } => {
                doc.floor_number = *floor_number;
                doc.total_floors = *total_floors;
                doc.furnishing = *furnishing;
            }
        }

        doc
    }

    fn set_building(&mut self, building: &BuildingDetails) {
        self.bedrooms = building.bedrooms;
        self.bathrooms = building.bathrooms;
        self.balconies = building.balconies.clone();
        self.furnishing = building.furnishing;
    }
}
