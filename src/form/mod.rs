pub mod dimensions;
pub mod price_words;
pub mod validation;

pub use dimensions::{DimensionEngine, Dimensions, EditSource};
pub use price_words::price_words;
pub use validation::ListingSchema;

use tracing::{debug, warn};

use crate::error::{FieldErrors, ImageError};
use crate::models::draft::non_blank;
use crate::models::{
    AreaUnit, ImageFile, Labelled, LengthUnit, PropertyDraft, PropertyType, ValidatedListing,
};

/// A validated listing and the images to upload with it
#[derive(Debug, Clone)]
pub struct Submission {
    pub listing: ValidatedListing,
    pub images: Vec<ImageFile>,
}

/// The add-property form while the user is filling it in
///
/// Length, breadth, area and both units live in the dimension engine and
/// are merged into the draft whenever a snapshot is taken.
#[derive(Debug, Clone, Default)]
pub struct PropertyForm {
    schema: ListingSchema,
    draft: PropertyDraft,
    dims: DimensionEngine,
    images: Vec<ImageFile>,
    price_words: String,
}

impl PropertyForm {
    pub fn new(schema: ListingSchema) -> Self {
        Self {
            schema,
            draft: PropertyDraft {
                is_public: Some(true),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Resume a form from a saved draft without re-deriving any field
    pub fn from_draft(schema: ListingSchema, draft: PropertyDraft) -> Self {
        let dims = Dimensions {
            length: draft.length.clone().unwrap_or_default(),
            breadth: draft.breadth.clone().unwrap_or_default(),
            length_unit: unit_or_default("length_unit", &draft.length_unit),
            area: draft.area.clone().unwrap_or_default(),
            area_unit: unit_or_default("area_unit", &draft.area_unit),
        };
        let price_words = price_words(draft.price.as_deref().unwrap_or_default());

        Self {
            schema,
            draft,
            dims: DimensionEngine::new(dims),
            images: Vec::new(),
            price_words,
        }
    }

    /// Select a property type, dropping values that only applied to the previous one
    pub fn set_property_type(&mut self, property_type: PropertyType) {
        self.draft.property_type = Some(property_type.label().to_string());
        self.draft.clear_fields_outside(property_type);

        if property_type != PropertyType::Plot {
            let current = self.dims.dimensions();
            self.dims = DimensionEngine::new(Dimensions {
                area: current.area.clone(),
                area_unit: current.area_unit,
                ..Default::default()
            });
        }
        debug!(property_type = property_type.label(), "property type selected");
    }

    /// Edit fields that take part in no derivation
    pub fn update(&mut self, edit: impl FnOnce(&mut PropertyDraft)) {
        edit(&mut self.draft);
    }

    pub fn set_price(&mut self, price: impl Into<String>) {
        let price = price.into();
        self.price_words = price_words(&price);
        self.draft.price = Some(price);
    }

    pub fn price_words(&self) -> &str {
        &self.price_words
    }

    pub fn set_length(&mut self, value: impl Into<String>) {
        self.dims.set_length(value);
    }

    pub fn set_breadth(&mut self, value: impl Into<String>) {
        self.dims.set_breadth(value);
    }

    pub fn set_length_unit(&mut self, unit: LengthUnit) {
        self.dims.set_length_unit(unit);
    }

    pub fn set_area(&mut self, value: impl Into<String>) {
        self.dims.set_area(value);
    }

    pub fn set_area_unit(&mut self, unit: AreaUnit) {
        self.dims.set_area_unit(unit);
    }

    pub fn dimensions(&self) -> &Dimensions {
        self.dims.dimensions()
    }

    /// Queue an image; a rejected file is never appended
    pub fn add_image(&mut self, file: ImageFile) -> Result<(), Vec<ImageError>> {
        let violations = validation::image_violations(self.images.len(), &file);
        if !violations.is_empty() {
            debug!(file = %file.name, ?violations, "image rejected");
            return Err(violations);
        }
        self.images.push(file);
        Ok(())
    }

    pub fn remove_image(&mut self, index: usize) -> Option<ImageFile> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    pub fn images(&self) -> &[ImageFile] {
        &self.images
    }

    /// Current draft with the dimension fields merged in
    pub fn snapshot(&self) -> PropertyDraft {
        let dims = self.dims.dimensions();
        let mut draft = self.draft.clone();
        draft.area = text_or_none(&dims.area);
        draft.area_unit = Some(dims.area_unit.label().to_string());

        let is_plot = non_blank(&draft.property_type)
            .and_then(PropertyType::from_label)
            .map_or(true, |t| t == PropertyType::Plot);
        if is_plot {
            draft.length = text_or_none(&dims.length);
            draft.breadth = text_or_none(&dims.breadth);
            draft.length_unit = Some(dims.length_unit.label().to_string());
        }
        draft
    }

    pub fn validate(&self) -> Result<ValidatedListing, FieldErrors> {
        self.schema.validate(&self.snapshot(), &self.images)
    }

    pub fn into_submission(self) -> Result<Submission, FieldErrors> {
        let listing = self.validate()?;
        Ok(Submission {
            listing,
            images: self.images,
        })
    }
}

fn text_or_none(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn unit_or_default<T: Labelled + Default>(field: &str, value: &Option<String>) -> T {
    match non_blank(value) {
        None => T::default(),
        Some(text) => T::from_label(text).unwrap_or_else(|| {
            warn!(field, value = text, "unknown unit in draft, using default");
            T::default()
        }),
    }
}
