use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{BoundingBox, CrsCode};

/// Scalar kind of a feature property, as declared by the feature type schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Integer,
    Float,
    Boolean,
    String,
}

/// A feature type as listed in the capabilities document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTypeSummary {
    pub name: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_: String,
    pub keywords: Vec<String>,
    pub default_crs: CrsCode,
    pub other_crs: Vec<CrsCode>,
    pub output_formats: Vec<String>,
    /// Geographic extent in `CRS:84` axis order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat_lon_bounding_box: Option<BoundingBox>,
}

/// A feature type with the properties declared by its schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTypeFull {
    pub name: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_: String,
    pub properties: BTreeMap<String, PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry_name: Option<String>,
    pub default_crs: CrsCode,
    pub other_crs: Vec<CrsCode>,
}

/// A typed property value read from a feature
///
/// Numbers that fail to parse become [`PropertyValue::NotANumber`].
/// GeoJSON values that are not scalars are kept as [`PropertyValue::Json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    NotANumber,
    Json(serde_json::Value),
}

impl PropertyValue {
    pub fn is_nan(&self) -> bool {
        matches!(self, PropertyValue::NotANumber)
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => PropertyValue::Boolean(b),
            serde_json::Value::String(s) => PropertyValue::String(s),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => PropertyValue::Integer(i),
                (None, Some(f)) => PropertyValue::Float(f),
                (None, None) => PropertyValue::Json(serde_json::Value::Number(n)),
            },
            other => PropertyValue::Json(other),
        }
    }
}

/// A feature's identifier and the properties kept from it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureWithProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub properties: BTreeMap<String, PropertyValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueValue {
    pub value: PropertyValue,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropDetails {
    /// Distinct values in first-seen order
    pub unique_values: Vec<UniqueValue>,
}

/// Per-property frequency tables of a feature collection
pub type PropsDetails = BTreeMap<String, PropDetails>;
