use chrono::NaiveDate;
use tracing::debug;

use super::dimensions::parse_number;
use crate::error::{FieldErrors, ImageError};
use crate::models::draft::non_blank;
use crate::models::{
    BuildingDetails, CommonFields, GeoPoint, ImageFile, Labelled, PlotDetails, PropertyDetails,
    PropertyDraft, PropertyType, ValidatedListing,
};

pub const MAX_IMAGES: usize = 5;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

pub const DEFAULT_CITY: &str = "Hyderabad";

type FieldAccess = fn(&PropertyDraft) -> &Option<String>;

/// Fields that become mandatory once a given property type is selected
const TYPE_REQUIREMENTS: &[(PropertyType, &str, FieldAccess, &str)] = &[
    (PropertyType::House, "uds", uds, "UDS is required for houses."),
    (
        PropertyType::Flat,
        "floor_number",
        floor_number,
        "Floor number is required for flats.",
    ),
];

fn uds(draft: &PropertyDraft) -> &Option<String> {
    &draft.uds
}

fn floor_number(draft: &PropertyDraft) -> &Option<String> {
    &draft.floor_number
}

/// Every independent rule a single image breaks, given how many are already pending
pub fn image_violations(already_pending: usize, file: &ImageFile) -> Vec<ImageError> {
    let mut violations = Vec::new();
    if already_pending >= MAX_IMAGES {
        violations.push(ImageError::TooMany { max: MAX_IMAGES });
    }
    if file.size() > MAX_IMAGE_BYTES {
        violations.push(ImageError::TooLarge {
            name: file.name.clone(),
            size: file.size(),
        });
    }
    if !is_accepted_type(&file.content_type) {
        violations.push(ImageError::UnsupportedType {
            name: file.name.clone(),
            content_type: file.content_type.clone(),
        });
    }
    violations
}

fn is_accepted_type(content_type: &str) -> bool {
    let normalized = content_type.trim().to_ascii_lowercase();
    ACCEPTED_IMAGE_TYPES.contains(&normalized.as_str())
}

/// Count, size and type checks over the whole image list, each reported once
pub fn check_images(images: &[ImageFile], errors: &mut FieldErrors) {
    if images.len() > MAX_IMAGES {
        errors.add("images", ImageError::TooMany { max: MAX_IMAGES }.to_string());
    }
    if let Some(file) = images.iter().find(|f| f.size() > MAX_IMAGE_BYTES) {
        let err = ImageError::TooLarge {
            name: file.name.clone(),
            size: file.size(),
        };
        errors.add("images", err.to_string());
    }
    if let Some(file) = images.iter().find(|f| !is_accepted_type(&f.content_type)) {
        let err = ImageError::UnsupportedType {
            name: file.name.clone(),
            content_type: file.content_type.clone(),
        };
        errors.add("images", err.to_string());
    }
}

/// Field rules and type-conditional rules for a property listing
#[derive(Debug, Clone)]
pub struct ListingSchema {
    default_city: String,
}

impl Default for ListingSchema {
    fn default() -> Self {
        Self::new(DEFAULT_CITY)
    }
}

impl ListingSchema {
    pub fn new(default_city: impl Into<String>) -> Self {
        Self {
            default_city: default_city.into(),
        }
    }

    /// Validate a draft and its images into a typed listing
    pub fn validate(
        &self,
        draft: &PropertyDraft,
        images: &[ImageFile],
    ) -> Result<ValidatedListing, FieldErrors> {
        let mut errors = FieldErrors::new();
        let common = self.common_fields(draft, &mut errors);
        let property_type = Checker::new(&mut errors).choice::<PropertyType>(
            "property_type",
            &draft.property_type,
            "Please select a property type.",
        );
        check_images(images, &mut errors);

        let details = property_type.map(|t| details_for(t, draft, &mut errors));

        if !errors.is_empty() {
            debug!(fields = ?errors.fields().collect::<Vec<_>>(), "listing failed field rules");
            return Err(errors);
        }

        // Field rules passed; now the rules that depend on the property type
        let (Some(common), Some(Some(details))) = (common, details) else {
            return Err(errors);
        };
        let listing = ValidatedListing { common, details };
        check_type_requirements(draft, &listing, &mut errors);
        errors.into_result()?;

        Ok(listing)
    }

    /// Validated draft written back in form shape, with fields the type ignores cleared
    pub fn normalize(&self, draft: &PropertyDraft) -> Result<PropertyDraft, FieldErrors> {
        self.validate(draft, &[]).map(|listing| listing.to_draft())
    }

    fn common_fields(&self, draft: &PropertyDraft, errors: &mut FieldErrors) -> Option<CommonFields> {
        let mut c = Checker::new(errors);

        let description = c.text(
            "description",
            &draft.description,
            20,
            500,
            "Description must be at least 20 characters.",
            "Description must be at most 500 characters.",
        );
        let address = c.text(
            "address",
            &draft.address,
            10,
            200,
            "Address must be at least 10 characters.",
            "Address must be at most 200 characters.",
        );
        let locality = c.text(
            "locality",
            &draft.locality,
            3,
            100,
            "Locality must be at least 3 characters.",
            "Locality must be at most 100 characters.",
        );
        let price = c.price(&draft.price);
        let area = c.positive_number("area", &draft.area, "Area is required.", "Area must be a positive number.");
        let area_unit = c.choice_or_default("area_unit", &draft.area_unit);
        let latitude = c.coordinate("latitude", &draft.latitude, 90.0);
        let longitude = c.coordinate("longitude", &draft.longitude, 180.0);
        let facing = c.optional_choice("facing", &draft.facing);
        let ownership = c.optional_choice("ownership", &draft.ownership);
        let availability_status = c.optional_choice("availability_status", &draft.availability_status);
        let expected_possession_date = c.date("expected_possession_date", &draft.expected_possession_date);

        let geo = match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint { latitude, longitude }),
            _ => None,
        };

        Some(CommonFields {
            property_used_type: optional_text(&draft.property_used_type),
            description: description?,
            address: address?,
            locality: locality?,
            city: non_blank(&draft.city).unwrap_or(self.default_city.as_str()).to_string(),
            geo,
            price: price?,
            area: area?,
            area_unit: area_unit?,
            carpet_area: optional_text(&draft.carpet_area),
            facing: facing?,
            ownership: ownership?,
            availability_status: availability_status?,
            property_age: optional_text(&draft.property_age),
            expected_possession_date: expected_possession_date?,
            approvals: optional_text(&draft.approvals),
            parking: optional_text(&draft.parking),
            amenities: optional_text(&draft.amenities),
            facilities: optional_text(&draft.facilities),
            neighborhood_boundaries: optional_text(&draft.neighborhood_boundaries),
            average_property_price: optional_text(&draft.average_property_price),
            proximity_to_amenities: optional_text(&draft.proximity_to_amenities),
            demographic_insights: optional_text(&draft.demographic_insights),
            is_public: draft.is_public.unwrap_or(true),
        })
    }
}

/// Type-specific fields; anything the variant does not carry is dropped here
fn details_for(
    property_type: PropertyType,
    draft: &PropertyDraft,
    errors: &mut FieldErrors,
) -> Option<PropertyDetails> {
    let mut c = Checker::new(errors);

    let details = match property_type {
        PropertyType::Flat => {
            let building = c.building(draft);
            let floor_number = c.whole_number("floor_number", &draft.floor_number);
            let total_floors = c.whole_number("total_floors", &draft.total_floors);
            PropertyDetails::Flat {
                building: building?,
                // Presence is enforced with the type-conditional rules
                floor_number: floor_number?.unwrap_or_default(),
                total_floors: total_floors?,
                uds: optional_text(&draft.uds),
            }
        }
        PropertyType::House => {
            let building = c.building(draft);
            PropertyDetails::House {
                building: building?,
                uds: optional_text(&draft.uds).unwrap_or_default(),
            }
        }
        PropertyType::Villa => PropertyDetails::Villa {
            building: c.building(draft)?,
            villa_type: optional_text(&draft.villa_type),
            uds: optional_text(&draft.uds),
            private_garden_terrace_area: optional_text(&draft.private_garden_terrace_area),
        },
        PropertyType::Plot => {
            let length = c.optional_positive_number("length", &draft.length, "Length must be a positive number.");
            let breadth = c.optional_positive_number("breadth", &draft.breadth, "Breadth must be a positive number.");
            let length_unit = c.choice_or_default("length_unit", &draft.length_unit);
            PropertyDetails::Plot(PlotDetails {
                plot_area: optional_text(&draft.plot_area),
                length: length?,
                breadth: breadth?,
                length_unit: length_unit?,
                boundary_wall: draft.boundary_wall,
                corner_plot: draft.corner_plot,
            })
        }
        PropertyType::Commercial => {
            let floor_number = c.whole_number("floor_number", &draft.floor_number);
            let total_floors = c.whole_number("total_floors", &draft.total_floors);
            let furnishing = c.optional_choice("furnishing", &draft.furnishing);
            PropertyDetails::Commercial {
                floor_number: floor_number?,
                total_floors: total_floors?,
                furnishing: furnishing?,
            }
        }
    };

    Some(details)
}

fn check_type_requirements(draft: &PropertyDraft, listing: &ValidatedListing, errors: &mut FieldErrors) {
    let property_type = listing.property_type();
    for (ty, field, access, message) in TYPE_REQUIREMENTS {
        if *ty == property_type && non_blank(access(draft)).is_none() {
            errors.add(field, *message);
        }
    }

    let floors = match &listing.details {
        PropertyDetails::Flat {
            floor_number,
            total_floors: Some(total),
            ..
        } if non_blank(&draft.floor_number).is_some() => Some((*floor_number, *total)),
        PropertyDetails::Commercial {
            floor_number: Some(floor),
            total_floors: Some(total),
            ..
        } => Some((*floor, *total)),
        _ => None,
    };
    if let Some((floor, total)) = floors {
        if floor > total {
            errors.add("floor_number", "Floor number cannot exceed total floors.");
        }
    }
}

fn optional_text(value: &Option<String>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

/// Parses one field at a time, recording a message on failure
///
/// Each method returns `None` when the field failed, otherwise the parsed value.
struct Checker<'a> {
    errors: &'a mut FieldErrors,
}

impl<'a> Checker<'a> {
    fn new(errors: &'a mut FieldErrors) -> Self {
        Self { errors }
    }

    fn fail<T>(&mut self, field: &str, message: &str) -> Option<T> {
        self.errors.add(field, message);
        None
    }

    fn text(
        &mut self,
        field: &str,
        value: &Option<String>,
        min: usize,
        max: usize,
        too_short: &str,
        too_long: &str,
    ) -> Option<String> {
        let text = value.as_deref().map(str::trim).unwrap_or_default();
        let len = text.chars().count();
        if len < min {
            self.fail(field, too_short)
        } else if len > max {
            self.fail(field, too_long)
        } else {
            Some(text.to_string())
        }
    }

    fn price(&mut self, value: &Option<String>) -> Option<String> {
        let Some(text) = non_blank(value) else {
            return self.fail("price", "Price is required.");
        };
        match text.replace(',', "").parse::<u64>() {
            Ok(n) if n > 0 => Some(text.to_string()),
            _ => self.fail("price", "Price must be a positive whole number."),
        }
    }

    fn positive_number(
        &mut self,
        field: &str,
        value: &Option<String>,
        missing: &str,
        invalid: &str,
    ) -> Option<String> {
        match non_blank(value) {
            None => self.fail(field, missing),
            Some(text) => match parse_number(text) {
                Some(n) if n > 0.0 => Some(text.to_string()),
                _ => self.fail(field, invalid),
            },
        }
    }

    fn optional_positive_number(
        &mut self,
        field: &str,
        value: &Option<String>,
        invalid: &str,
    ) -> Option<Option<String>> {
        match non_blank(value) {
            None => Some(None),
            Some(_) => self.positive_number(field, value, invalid, invalid).map(Some),
        }
    }

    fn whole_number(&mut self, field: &str, value: &Option<String>) -> Option<Option<u32>> {
        match non_blank(value) {
            None => Some(None),
            Some(text) => match text.parse::<u32>() {
                Ok(n) => Some(Some(n)),
                Err(_) => self.fail(field, "Must be a whole number."),
            },
        }
    }

    fn coordinate(&mut self, field: &str, value: &Option<String>, limit: f64) -> Option<f64> {
        let text = non_blank(value)?;
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() && n.abs() <= limit => Some(n),
            Ok(_) => self.fail(field, &format!("Must be between -{limit} and {limit}.")),
            Err(_) => self.fail(field, "Expected a number."),
        }
    }

    fn date(&mut self, field: &str, value: &Option<String>) -> Option<Option<NaiveDate>> {
        match non_blank(value) {
            None => Some(None),
            Some(text) => match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                Ok(date) => Some(Some(date)),
                Err(_) => self.fail(field, "Expected a date as YYYY-MM-DD."),
            },
        }
    }

    fn choice<T: Labelled>(&mut self, field: &str, value: &Option<String>, missing: &str) -> Option<T> {
        match non_blank(value) {
            None => self.fail(field, missing),
            Some(text) => T::from_label(text).or_else(|| self.invalid_choice::<T, T>(field)),
        }
    }

    fn optional_choice<T: Labelled>(&mut self, field: &str, value: &Option<String>) -> Option<Option<T>> {
        match non_blank(value) {
            None => Some(None),
            Some(text) => T::from_label(text)
                .map(Some)
                .or_else(|| self.invalid_choice::<T, Option<T>>(field)),
        }
    }

    fn choice_or_default<T: Labelled + Default>(&mut self, field: &str, value: &Option<String>) -> Option<T> {
        self.optional_choice(field, value).map(Option::unwrap_or_default)
    }

    fn invalid_choice<T: Labelled, R>(&mut self, field: &str) -> Option<R> {
        let options: Vec<&str> = T::ALL.iter().map(|v| v.label()).collect();
        self.fail(field, &format!("Expected one of: {}.", options.join(", ")))
    }

    fn building(&mut self, draft: &PropertyDraft) -> Option<BuildingDetails> {
        let bedrooms = self.whole_number("bedrooms", &draft.bedrooms);
        let bathrooms = self.whole_number("bathrooms", &draft.bathrooms);
        let furnishing = self.optional_choice("furnishing", &draft.furnishing);
        Some(BuildingDetails {
            bedrooms: bedrooms?,
            bathrooms: bathrooms?,
            balconies: optional_text(&draft.balconies),
            furnishing: furnishing?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AreaUnit, Facing, LengthUnit};

    fn base_draft(property_type: &str) -> PropertyDraft {
        PropertyDraft {
            property_type: Some(property_type.to_string()),
            description: Some("Spacious corner unit with lots of light".to_string()),
            address: Some("Plot 42, Road No. 5, Madhapur".to_string()),
            locality: Some("Madhapur".to_string()),
            price: Some("50,00,000".to_string()),
            area: Some("1200".to_string()),
            facing: Some("East".to_string()),
            ..Default::default()
        }
    }

    fn image(name: &str, content_type: &str, size: usize) -> ImageFile {
        ImageFile::new(name, content_type, vec![0u8; size])
    }

    #[test]
    fn house_requires_uds() {
        let schema = ListingSchema::default();
        let mut draft = base_draft("House");

        let errors = schema.validate(&draft, &[]).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["uds"]);

        draft.uds = Some("60 sq yards".to_string());
        let listing = schema.validate(&draft, &[]).unwrap();
        assert!(matches!(listing.details, PropertyDetails::House { ref uds, .. } if uds == "60 sq yards"));
    }

    #[test]
    fn flat_requires_floor_number() {
        let schema = ListingSchema::default();
        let mut draft = base_draft("Flat");

        let errors = schema.validate(&draft, &[]).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["floor_number"]);

        draft.floor_number = Some("3".to_string());
        let listing = schema.validate(&draft, &[]).unwrap();
        assert!(matches!(listing.details, PropertyDetails::Flat { floor_number: 3, .. }));
    }

    #[test]
    fn other_types_need_neither_uds_nor_floor() {
        let schema = ListingSchema::default();
        for ty in ["Villa", "Plot", "Commercial"] {
            assert!(schema.validate(&base_draft(ty), &[]).is_ok(), "{ty} should validate");
        }
    }

    #[test]
    fn conditional_rules_wait_for_field_rules() {
        let mut draft = base_draft("House");
        draft.description = Some("too short".to_string());

        let errors = ListingSchema::default().validate(&draft, &[]).unwrap_err();
        assert!(errors.contains("description"));
        assert!(!errors.contains("uds"));
    }

    #[test]
    fn base_rules_report_every_field() {
        let draft = PropertyDraft {
            property_type: Some("Castle".to_string()),
            facing: Some("Up".to_string()),
            latitude: Some("abc".to_string()),
            ..Default::default()
        };

        let errors = ListingSchema::default().validate(&draft, &[]).unwrap_err();
        for field in ["description", "address", "locality", "price", "area", "property_type", "facing", "latitude"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        assert_eq!(errors.messages("price"), ["Price is required."]);
    }

    #[test]
    fn description_and_address_have_upper_bounds() {
        let mut draft = base_draft("Villa");
        draft.description = Some("x".repeat(501));
        draft.address = Some("y".repeat(201));

        let errors = ListingSchema::default().validate(&draft, &[]).unwrap_err();
        assert_eq!(errors.messages("description"), ["Description must be at most 500 characters."]);
        assert_eq!(errors.messages("address"), ["Address must be at most 200 characters."]);
    }

    #[test]
    fn geo_requires_both_coordinates() {
        let schema = ListingSchema::default();
        let mut draft = base_draft("Villa");
        draft.latitude = Some("17.4474".to_string());

        let listing = schema.validate(&draft, &[]).unwrap();
        assert_eq!(listing.common.geo, None);

        draft.longitude = Some("78.3762".to_string());
        let listing = schema.validate(&draft, &[]).unwrap();
        assert_eq!(
            listing.common.geo,
            Some(GeoPoint {
                latitude: 17.4474,
                longitude: 78.3762
            })
        );
    }

    #[test]
    fn stale_fields_from_another_type_are_dropped() {
        let mut draft = base_draft("Flat");
        draft.floor_number = Some("7".to_string());
        draft.length = Some("60".to_string());
        draft.breadth = Some("30".to_string());
        draft.boundary_wall = Some(true);
        draft.villa_type = Some("Duplex".to_string());

        let normalized = ListingSchema::default().normalize(&draft).unwrap();
        assert_eq!(normalized.length, None);
        assert_eq!(normalized.breadth, None);
        assert_eq!(normalized.boundary_wall, None);
        assert_eq!(normalized.villa_type, None);
        assert_eq!(normalized.floor_number.as_deref(), Some("7"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let schema = ListingSchema::default();
        let mut draft = base_draft("Plot");
        draft.length = Some(" 60 ".to_string());
        draft.breadth = Some("30".to_string());
        draft.area_unit = Some("sq. yards".to_string());
        draft.latitude = Some("17.4474".to_string());
        draft.longitude = Some("78.3762".to_string());
        draft.parking = Some("   ".to_string());
        draft.expected_possession_date = Some("2027-03-01".to_string());

        let once = schema.normalize(&draft).unwrap();
        let twice = schema.normalize(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.area_unit.as_deref(), Some("Sq. Yards"));
        assert_eq!(once.length.as_deref(), Some("60"));
        assert_eq!(once.parking, None);
        assert_eq!(once.city.as_deref(), Some(DEFAULT_CITY));
    }

    #[test]
    fn defaults_fill_units_visibility_and_city() {
        let listing = ListingSchema::new("Warangal").validate(&base_draft("Plot"), &[]).unwrap();

        assert_eq!(listing.common.area_unit, AreaUnit::SqFeet);
        assert_eq!(listing.common.city, "Warangal");
        assert_eq!(listing.common.facing, Some(Facing::East));
        assert!(listing.common.is_public);
        assert!(matches!(
            listing.details,
            PropertyDetails::Plot(PlotDetails { length_unit: LengthUnit::Feet, .. })
        ));
    }

    #[test]
    fn price_must_be_a_positive_integer() {
        let schema = ListingSchema::default();
        for bad in ["0", "12.5", "fifty"] {
            let mut draft = base_draft("Villa");
            draft.price = Some(bad.to_string());
            let errors = schema.validate(&draft, &[]).unwrap_err();
            assert!(errors.contains("price"), "{bad} should be rejected");
        }
    }

    #[test]
    fn grouped_area_is_accepted_like_the_dimension_engine_reads_it() {
        let mut draft = base_draft("Plot");
        draft.area = Some("1,800".to_string());
        let listing = ListingSchema::default().validate(&draft, &[]).unwrap();
        assert_eq!(listing.common.area, "1,800");
        assert_eq!(parse_number("1,800"), Some(1800.0));

        draft.area = Some("1,8x0".to_string());
        let errors = ListingSchema::default().validate(&draft, &[]).unwrap_err();
        assert_eq!(errors.messages("area"), ["Area must be a positive number."]);
    }

    #[test]
    fn usage_type_and_plot_area_are_carried() {
        let schema = ListingSchema::default();
        let mut draft = base_draft("Plot");
        draft.property_used_type = Some(" Residential ".to_string());
        draft.plot_area = Some("200".to_string());

        let listing = schema.validate(&draft, &[]).unwrap();
        assert_eq!(listing.common.property_used_type.as_deref(), Some("Residential"));
        assert!(matches!(
            listing.details,
            PropertyDetails::Plot(PlotDetails { ref plot_area, .. }) if plot_area.as_deref() == Some("200")
        ));

        draft.property_type = Some("Villa".to_string());
        let villa = schema.normalize(&draft).unwrap();
        assert_eq!(villa.plot_area, None);
        assert_eq!(villa.property_used_type.as_deref(), Some("Residential"));
    }

    #[test]
    fn floor_cannot_exceed_total_floors() {
        let mut draft = base_draft("Flat");
        draft.floor_number = Some("12".to_string());
        draft.total_floors = Some("10".to_string());

        let errors = ListingSchema::default().validate(&draft, &[]).unwrap_err();
        assert_eq!(errors.messages("floor_number"), ["Floor number cannot exceed total floors."]);
    }

    #[test]
    fn image_list_reports_each_rule_once() {
        let images: Vec<ImageFile> = (0..6)
            .map(|i| {
                let size = if i == 0 { MAX_IMAGE_BYTES + 1 } else { 10 };
                image(&format!("{i}.gif"), "image/gif", size)
            })
            .collect();

        let errors = ListingSchema::default()
            .validate(&base_draft("Villa"), &images)
            .unwrap_err();
        assert_eq!(
            errors.messages("images"),
            [
                "You can upload a maximum of 5 images.",
                "Max file size is 5MB.",
                "Only .jpg, .jpeg, .png and .webp formats are supported.",
            ]
        );
    }

    #[test]
    fn image_rules_are_independent() {
        let wrong_type = image_violations(0, &image("a.gif", "image/gif", 10));
        assert_eq!(wrong_type.len(), 1);
        assert!(matches!(wrong_type[0], ImageError::UnsupportedType { .. }));

        let too_big = image_violations(0, &image("a.png", "image/png", MAX_IMAGE_BYTES + 1));
        assert_eq!(too_big.len(), 1);
        assert!(matches!(too_big[0], ImageError::TooLarge { .. }));

        let sixth = image_violations(5, &image("f.webp", "image/webp", 10));
        assert_eq!(sixth, vec![ImageError::TooMany { max: 5 }]);

        assert!(image_violations(4, &image("ok.JPG", "IMAGE/JPEG", MAX_IMAGE_BYTES)).is_empty());
    }
}
