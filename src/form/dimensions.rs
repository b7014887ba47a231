use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{AreaUnit, LengthUnit};

/// Smallest change worth writing back into a derived field
pub const TOLERANCE: f64 = 0.01;

/// Which side of the quadruple the user touched last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditSource {
    #[default]
    None,
    DimensionsEdited,
    AreaEdited,
}

/// Length, breadth and area as shown in the form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: String,
    pub breadth: String,
    pub length_unit: LengthUnit,
    pub area: String,
    pub area_unit: AreaUnit,
}

/// Unrounded feet or square feet behind a figure the engine wrote into a field
#[derive(Debug, Clone, PartialEq)]
struct Written {
    shown: String,
    canonical: f64,
}

/// Keeps length, breadth and area consistent while the user edits any of them
///
/// Every setter records the edit source and runs exactly one reconciliation
/// pass, which resets the source before returning. Writes made by the pass
/// go straight to the fields and never re-enter it.
///
/// Fields only ever show two decimals. The exact value behind each engine
/// write is kept, so later passes and unit switches work from it rather than
/// from the rounded text.
#[derive(Debug, Clone, Default)]
pub struct DimensionEngine {
    dims: Dimensions,
    pending: EditSource,
    length: Option<Written>,
    breadth: Option<Written>,
    area: Option<Written>,
}

impl DimensionEngine {
    pub fn new(dims: Dimensions) -> Self {
        Self {
            dims,
            ..Default::default()
        }
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    pub fn pending(&self) -> EditSource {
        self.pending
    }

    pub fn set_length(&mut self, value: impl Into<String>) {
        self.dims.length = value.into();
        self.edited(EditSource::DimensionsEdited);
    }

    pub fn set_breadth(&mut self, value: impl Into<String>) {
        self.dims.breadth = value.into();
        self.edited(EditSource::DimensionsEdited);
    }

    /// Switch the length unit, keeping the physical length and breadth
    pub fn set_length_unit(&mut self, unit: LengthUnit) {
        let from = self.dims.length_unit;
        if from != unit {
            let length_ft = canonical(&self.dims.length, &self.length, |v| from.to_feet(v));
            let breadth_ft = canonical(&self.dims.breadth, &self.breadth, |v| from.to_feet(v));
            show(&mut self.dims.length, &mut self.length, unit.from_feet(length_ft), length_ft);
            show(&mut self.dims.breadth, &mut self.breadth, unit.from_feet(breadth_ft), breadth_ft);
            self.dims.length_unit = unit;
        }
        self.edited(EditSource::DimensionsEdited);
    }

    pub fn set_area(&mut self, value: impl Into<String>) {
        self.dims.area = value.into();
        self.edited(EditSource::AreaEdited);
    }

    /// Switch the area unit, keeping the physical area
    pub fn set_area_unit(&mut self, unit: AreaUnit) {
        let from = self.dims.area_unit;
        if from != unit {
            let area_sq_ft = canonical(&self.dims.area, &self.area, |v| from.to_sq_ft(v));
            show(&mut self.dims.area, &mut self.area, unit.from_sq_ft(area_sq_ft), area_sq_ft);
            self.dims.area_unit = unit;
        }
        self.edited(EditSource::AreaEdited);
    }

    /// Run a pass for an edit source set outside the setters
    pub fn mark(&mut self, source: EditSource) {
        self.edited(source);
    }

    fn edited(&mut self, source: EditSource) {
        self.pending = source;
        self.reconcile();
    }

    /// One reconciliation pass; consumes the pending edit source
    pub fn reconcile(&mut self) {
        let source = std::mem::take(&mut self.pending);
        let unit = self.dims.length_unit;
        let area_unit = self.dims.area_unit;
        let length_ft = canonical(&self.dims.length, &self.length, |v| unit.to_feet(v));
        let breadth_ft = canonical(&self.dims.breadth, &self.breadth, |v| unit.to_feet(v));

        match source {
            EditSource::None => {}
            EditSource::DimensionsEdited => {
                let area_sq_ft = length_ft * breadth_ft;
                if area_sq_ft > 0.0 {
                    let area = area_unit.from_sq_ft(area_sq_ft);
                    write_if_changed(&mut self.dims.area, &mut self.area, area, area_sq_ft);
                }
            }
            EditSource::AreaEdited => {
                let area_sq_ft = canonical(&self.dims.area, &self.area, |v| area_unit.to_sq_ft(v));
                if area_sq_ft <= 0.0 {
                    return;
                }
                if length_ft > 0.0 {
                    let breadth_ft = area_sq_ft / length_ft;
                    let breadth = unit.from_feet(breadth_ft);
                    write_if_changed(&mut self.dims.breadth, &mut self.breadth, breadth, breadth_ft);
                } else if breadth_ft > 0.0 {
                    let length_ft = area_sq_ft / breadth_ft;
                    let length = unit.from_feet(length_ft);
                    write_if_changed(&mut self.dims.length, &mut self.length, length, length_ft);
                } else {
                    // Nothing to divide by; assume a square plot
                    let side_ft = area_sq_ft.sqrt();
                    let side = unit.from_feet(side_ft);
                    write_if_changed(&mut self.dims.length, &mut self.length, side, side_ft);
                    write_if_changed(&mut self.dims.breadth, &mut self.breadth, side, side_ft);
                }
            }
        }

        debug!(?source, dims = ?self.dims, "reconciled dimensions");
    }
}

/// Number typed into a form field; digit-group commas are ignored
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Positive number from form text; anything else counts as zero
pub fn parse_measure(text: &str) -> f64 {
    parse_number(text).filter(|n| *n > 0.0).unwrap_or(0.0)
}

pub fn format_measure(value: f64) -> String {
    format!("{value:.2}")
}

/// Canonical value of a field: the exact figure if the engine wrote the text, else the text itself
fn canonical(text: &str, written: &Option<Written>, to_canonical: impl Fn(f64) -> f64) -> f64 {
    match written {
        Some(w) if w.shown == text => w.canonical,
        _ => to_canonical(parse_measure(text)),
    }
}

fn record(field: &mut String, written: &mut Option<Written>, value: f64, canonical: f64) {
    *field = format_measure(value);
    *written = Some(Written {
        shown: field.clone(),
        canonical,
    });
}

fn write_if_changed(field: &mut String, written: &mut Option<Written>, value: f64, canonical: f64) {
    match parse_number(field) {
        Some(current) if (current - value).abs() <= TOLERANCE => {}
        _ => record(field, written, value, canonical),
    }
}

/// Re-express a field in a new unit; empty or invalid fields stay as they are
fn show(field: &mut String, written: &mut Option<Written>, value: f64, canonical: f64) {
    if canonical > 0.0 {
        record(field, written, value, canonical);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> DimensionEngine {
        DimensionEngine::default()
    }

    #[test]
    fn dimensions_derive_area_in_selected_unit() {
        let mut e = engine();
        e.set_length("60");
        e.set_breadth("30");
        assert_eq!(e.dimensions().area, "1800.00");

        e.set_area_unit(AreaUnit::SqYards);
        assert_eq!(e.dimensions().area, "200.00");
        assert_eq!(e.dimensions().breadth, "30");
        assert_eq!(e.pending(), EditSource::None);
    }

    #[test]
    fn editing_area_solves_breadth_from_length() {
        let mut e = engine();
        e.set_length("60");
        e.set_breadth("30");
        e.set_area_unit(AreaUnit::SqYards);

        e.set_area("180");
        assert_eq!(e.dimensions().breadth, "27.00");
        assert_eq!(e.dimensions().length, "60");
        assert_eq!(e.dimensions().area, "180");
    }

    #[test]
    fn area_without_dimensions_assumes_square() {
        let mut e = engine();
        e.set_area("900");
        assert_eq!(e.dimensions().length, "30.00");
        assert_eq!(e.dimensions().breadth, "30.00");
    }

    #[test]
    fn area_with_only_breadth_solves_length() {
        let mut e = engine();
        e.set_breadth("20");
        e.set_area("600");
        assert_eq!(e.dimensions().length, "30.00");
        assert_eq!(e.dimensions().breadth, "20");
    }

    #[test]
    fn switching_length_unit_preserves_physical_length() {
        let mut e = engine();
        e.set_length("60");
        e.set_length_unit(LengthUnit::Meters);
        assert_eq!(e.dimensions().length, "18.29");
        assert_eq!(e.dimensions().length_unit, LengthUnit::Meters);
    }

    #[test]
    fn area_unit_round_trip_keeps_the_plot() {
        let mut e = engine();
        e.set_length("60");
        e.set_breadth("30");

        e.set_area_unit(AreaUnit::Acres);
        assert_eq!(e.dimensions().area, "0.04");
        assert_eq!(e.dimensions().length, "60");
        assert_eq!(e.dimensions().breadth, "30");

        e.set_area_unit(AreaUnit::SqFeet);
        assert_eq!(e.dimensions().area, "1800.00");
        assert_eq!(e.dimensions().breadth, "30");
    }

    #[test]
    fn length_unit_round_trip_keeps_the_area() {
        let mut e = engine();
        e.set_length("60");
        e.set_breadth("30");

        e.set_length_unit(LengthUnit::Meters);
        assert_eq!(e.dimensions().length, "18.29");
        assert_eq!(e.dimensions().breadth, "9.14");
        assert_eq!(e.dimensions().area, "1800.00");

        e.set_length_unit(LengthUnit::Feet);
        assert_eq!(e.dimensions().length, "60.00");
        assert_eq!(e.dimensions().breadth, "30.00");
        assert_eq!(e.dimensions().area, "1800.00");
    }

    #[test]
    fn typed_text_replaces_the_exact_figure() {
        let mut e = engine();
        e.set_length("60");
        e.set_breadth("30");
        e.set_area_unit(AreaUnit::Acres);

        e.set_area("0.05");
        e.set_area_unit(AreaUnit::SqFeet);
        assert_eq!(e.dimensions().area, "2178.00");
        assert_eq!(e.dimensions().breadth, "36.30");
    }

    #[test]
    fn meter_dimensions_produce_square_feet() {
        let mut e = engine();
        e.set_length_unit(LengthUnit::Meters);
        e.set_length("10");
        e.set_breadth("10");
        // 100 m² is 1076.39 sq ft
        assert_eq!(e.dimensions().area, "1076.39");

        e.set_area_unit(AreaUnit::SqMeters);
        assert_eq!(e.dimensions().area, "100.00");
        assert_eq!(e.dimensions().breadth, "10");
    }

    #[test]
    fn repeated_passes_do_not_rewrite_fields() {
        let mut e = engine();
        e.set_length("60");
        e.set_breadth("30");
        e.set_area_unit(AreaUnit::SqYards);
        let settled = e.dimensions().clone();

        for _ in 0..5 {
            e.mark(EditSource::DimensionsEdited);
            e.mark(EditSource::AreaEdited);
        }
        assert_eq!(e.dimensions(), &settled);
    }

    #[test]
    fn values_within_tolerance_are_left_as_typed() {
        let mut e = DimensionEngine::new(Dimensions {
            length: "60".into(),
            breadth: "30".into(),
            area: "1800.004".into(),
            ..Default::default()
        });
        e.mark(EditSource::DimensionsEdited);
        assert_eq!(e.dimensions().area, "1800.004");
    }

    #[test]
    fn nothing_to_work_with_is_a_no_op() {
        let mut e = engine();
        e.set_length("");
        e.set_area("abc");
        assert_eq!(e.dimensions().length, "");
        assert_eq!(e.dimensions().breadth, "");
        assert_eq!(e.dimensions().area, "abc");
        assert_eq!(e.pending(), EditSource::None);
    }

    #[test]
    fn reconcile_without_an_edit_does_nothing() {
        let mut e = DimensionEngine::new(Dimensions {
            length: "10".into(),
            breadth: "10".into(),
            area: "5".into(),
            ..Default::default()
        });
        e.reconcile();
        assert_eq!(e.dimensions().area, "5");
    }
}
