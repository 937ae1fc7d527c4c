//! Per-version extraction rules for WMS capabilities.

use roxmltree::Node;

use crate::models::BoundingBox;
use crate::version::WmsVersion;
use crate::xml::{child_text, element_attribute, element_text, find_child_element};

/// Standardized rendering pixel size (0.28 mm) used to turn 1.1.1 scale hints
/// into scale denominators
const STANDARD_PIXEL_SIZE_M: f64 = 0.000_28;

/// Rule table for one WMS version
pub struct WmsDialect {
    /// Element listing a layer's coordinate systems
    pub crs_tag: &'static str,
    /// Attribute naming the CRS of a `BoundingBox`
    pub bbox_crs_attribute: &'static str,
    /// Geographic extent of a layer, keyed as `CRS:84`
    pub read_geographic_bbox: fn(Node<'_, '_>) -> Option<BoundingBox>,
    /// `(min, max)` scale denominators declared by a layer
    pub read_scale_denominators: fn(Node<'_, '_>) -> (Option<f64>, Option<f64>),
}

static WMS_1_1_1: WmsDialect = WmsDialect {
    crs_tag: "SRS",
    bbox_crs_attribute: "SRS",
    read_geographic_bbox: lat_lon_bounding_box,
    read_scale_denominators: scale_hint,
};

static WMS_1_3_0: WmsDialect = WmsDialect {
    crs_tag: "CRS",
    bbox_crs_attribute: "CRS",
    read_geographic_bbox: ex_geographic_bounding_box,
    read_scale_denominators: scale_denominator_elements,
};

impl WmsVersion {
    pub fn dialect(self) -> &'static WmsDialect {
        match self {
            WmsVersion::V1_1_1 => &WMS_1_1_1,
            WmsVersion::V1_3_0 => &WMS_1_3_0,
        }
    }
}

/// Read `minx/miny/maxx/maxy` attributes of a bounding box element
pub fn bbox_from_attributes(el: Node<'_, '_>) -> Option<BoundingBox> {
    let attr = |name: &str| element_attribute(el, name).map(|v| v.trim().to_string());
    Some([attr("minx")?, attr("miny")?, attr("maxx")?, attr("maxy")?])
}

fn lat_lon_bounding_box(layer: Node<'_, '_>) -> Option<BoundingBox> {
    find_child_element(layer, "LatLonBoundingBox").and_then(bbox_from_attributes)
}

fn ex_geographic_bounding_box(layer: Node<'_, '_>) -> Option<BoundingBox> {
    let el = find_child_element(layer, "EX_GeographicBoundingBox")?;
    let bound = |name: &str| {
        let value = child_text(el, name);
        (!value.is_empty()).then_some(value)
    };
    Some([
        bound("westBoundLongitude")?,
        bound("southBoundLatitude")?,
        bound("eastBoundLongitude")?,
        bound("northBoundLatitude")?,
    ])
}

fn scale_hint(layer: Node<'_, '_>) -> (Option<f64>, Option<f64>) {
    let Some(hint) = find_child_element(layer, "ScaleHint") else {
        return (None, None);
    };
    let read = |name: &str| {
        element_attribute(hint, name)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .map(|diagonal| diagonal / std::f64::consts::SQRT_2 / STANDARD_PIXEL_SIZE_M)
    };
    (read("min"), read("max"))
}

fn scale_denominator_elements(layer: Node<'_, '_>) -> (Option<f64>, Option<f64>) {
    let read = |name: &str| {
        find_child_element(layer, name).and_then(|el| element_text(el).parse::<f64>().ok())
    };
    (read("MinScaleDenominator"), read("MaxScaleDenominator"))
}
