//! Feature property extraction from GetFeature responses.

use std::collections::BTreeMap;

use roxmltree::{Document, Node};
use serde_json::Value;

use crate::error::{OgcError, Result};
use crate::version::WfsVersion;
use crate::xml::{children_element, element_attribute, element_name, element_text, root_element};

use super::model::{
    FeatureTypeFull, FeatureWithProps, PropDetails, PropertyType, PropertyValue, PropsDetails,
    UniqueValue,
};

/// Read every feature of a GML GetFeature response.
///
/// Only properties declared by `feature_type` are kept; values are coerced
/// to their declared type and malformed numbers become `NotANumber`.
pub fn parse_feature_props(
    doc: &Document<'_>,
    feature_type: &FeatureTypeFull,
    version: WfsVersion,
) -> Vec<FeatureWithProps> {
    let dialect = version.dialect();

    (dialect.select_members)(root_element(doc))
        .into_iter()
        .map(|member| FeatureWithProps {
            id: element_attribute(member, dialect.id_attribute).map(str::to_string),
            properties: read_properties(member, feature_type),
        })
        .collect()
}

fn read_properties(member: Node<'_, '_>, feature_type: &FeatureTypeFull) -> BTreeMap<String, PropertyValue> {
    children_element(member)
        .filter_map(|el| {
            let name = element_name(el);
            let property_type = feature_type.properties.get(name)?;
            Some((name.to_string(), coerce(&element_text(el), *property_type)))
        })
        .collect()
}

/// Convert a property's text according to its declared type
pub fn coerce(text: &str, property_type: PropertyType) -> PropertyValue {
    match property_type {
        PropertyType::Integer => parse_integer(text),
        PropertyType::Float => parse_float(text),
        PropertyType::Boolean => PropertyValue::Boolean(text == "true"),
        PropertyType::String => PropertyValue::String(text.to_string()),
    }
}

/// Leading base-10 integer of `text`: `"12abc"` reads as 12, `"3.9"` as 3
fn parse_integer(text: &str) -> PropertyValue {
    let trimmed = text.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['+', '-']));
    let digits_len = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return PropertyValue::NotANumber;
    }

    let literal = &trimmed[..sign_len + digits_len];
    match literal.parse::<i64>() {
        Ok(value) => PropertyValue::Integer(value),
        // Out of i64 range: keep the magnitude
        Err(_) => literal
            .parse::<f64>()
            .map(PropertyValue::Float)
            .unwrap_or(PropertyValue::NotANumber),
    }
}

/// Longest decimal literal at the start of `text`: `"3.14m"` reads as 3.14
fn parse_float(text: &str) -> PropertyValue {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(trimmed.starts_with(['+', '-']));
    let unsigned = &trimmed[end..];
    if unsigned.starts_with("Infinity") {
        let infinity = if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        return PropertyValue::Float(infinity);
    }

    let integer_digits = digits(end);
    end += integer_digits;
    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = digits(end + 1);
        if integer_digits + fraction_digits > 0 {
            end += 1 + fraction_digits;
        }
    }
    if integer_digits + fraction_digits == 0 {
        return PropertyValue::NotANumber;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent_digits = digits(end + 1 + sign);
        if exponent_digits > 0 {
            end += 1 + sign + exponent_digits;
        }
    }

    match trimmed[..end].parse::<f64>() {
        Ok(value) if !value.is_nan() => PropertyValue::Float(value),
        _ => PropertyValue::NotANumber,
    }
}

/// Read the features of a GeoJSON FeatureCollection, keeping every property
pub fn parse_feature_props_geojson(collection: &Value) -> Result<Vec<FeatureWithProps>> {
    let features = collection
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| OgcError::SchemaMismatch {
            details: "GeoJSON object is not a FeatureCollection: no features array".to_string(),
        })?;

    Ok(features
        .iter()
        .map(|feature| FeatureWithProps {
            id: match feature.get("id") {
                Some(Value::String(id)) => Some(id.clone()),
                Some(Value::Number(id)) => Some(id.to_string()),
                _ => None,
            },
            properties: feature
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| {
                    props
                        .iter()
                        .map(|(name, value)| (name.clone(), PropertyValue::from(value.clone())))
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect())
}

/// Count the distinct values of every property across `features`.
///
/// Values are compared structurally; each table lists values in the order
/// they were first seen.
pub fn compute_feature_props_details(features: &[FeatureWithProps]) -> PropsDetails {
    let mut details = PropsDetails::new();

    for feature in features {
        for (name, value) in &feature.properties {
            let unique_values = &mut details
                .entry(name.clone())
                .or_insert_with(PropDetails::default)
                .unique_values;
            match unique_values.iter_mut().find(|unique| unique.value == *value) {
                Some(unique) => unique.count += 1,
                None => unique_values.push(UniqueValue {
                    value: value.clone(),
                    count: 1,
                }),
            }
        }
    }
    details
}
