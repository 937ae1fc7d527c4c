//! DescribeFeatureType schema reading.

use std::collections::BTreeMap;

use roxmltree::{Document, Node};

use crate::error::{OgcError, Result};
use crate::xml::{element_attribute, element_name, find_children_element, root_element, strip_namespace};

use super::model::{FeatureTypeFull, FeatureTypeSummary, PropertyType};

/// Map an XML Schema type name onto a scalar kind.
///
/// Unknown types are read as strings so their values are kept verbatim.
pub fn property_type_from_xsd(type_name: &str) -> PropertyType {
    match strip_namespace(type_name) {
        "integer" | "int" | "long" | "short" | "byte" | "nonNegativeInteger"
        | "nonPositiveInteger" | "positiveInteger" | "negativeInteger" | "unsignedLong"
        | "unsignedInt" | "unsignedShort" | "unsignedByte" => PropertyType::Integer,
        "decimal" | "double" | "float" => PropertyType::Float,
        "boolean" => PropertyType::Boolean,
        _ => PropertyType::String,
    }
}

fn is_geometry_type(type_name: &str) -> bool {
    type_name
        .split_once(':')
        .is_some_and(|(prefix, _)| prefix == "gml")
}

/// Type name of a schema element, from its `type` attribute or an inline
/// `simpleType/restriction@base`
fn declared_type<'a>(el: Node<'a, '_>) -> Option<&'a str> {
    element_attribute(el, "type").or_else(|| {
        el.descendants()
            .find(|n| n.is_element() && element_name(*n) == "restriction")
            .and_then(|restriction| element_attribute(restriction, "base"))
    })
}

/// Complex type describing `type_name`: the one referenced by the top-level
/// element of that name, else the first one in the schema
fn feature_complex_type<'a, 'i>(schema: Node<'a, 'i>, type_name: &str) -> Option<Node<'a, 'i>> {
    let complex_types = find_children_element(schema, "complexType");
    let local_name = strip_namespace(type_name);

    let referenced = find_children_element(schema, "element")
        .into_iter()
        .find(|el| element_attribute(*el, "name") == Some(local_name))
        .and_then(|el| element_attribute(el, "type"))
        .map(strip_namespace);

    referenced
        .and_then(|wanted| {
            complex_types
                .iter()
                .copied()
                .find(|ct| element_attribute(*ct, "name") == Some(wanted))
        })
        .or_else(|| complex_types.first().copied())
}

/// Read a DescribeFeatureType schema into the full description of `summary`.
///
/// Properties typed `gml:*` are geometries: the first one becomes the
/// geometry name and none of them are listed as properties.
pub fn read_feature_type_full(
    describe_doc: &Document<'_>,
    summary: &FeatureTypeSummary,
) -> Result<FeatureTypeFull> {
    let schema = root_element(describe_doc);
    let complex_type = feature_complex_type(schema, &summary.name).ok_or_else(|| {
        OgcError::malformed(format!("no complexType describing {}", summary.name))
    })?;

    let mut properties = BTreeMap::new();
    let mut geometry_name = None;

    for el in complex_type
        .descendants()
        .filter(|n| n.is_element() && element_name(*n) == "element")
    {
        let Some(name) = element_attribute(el, "name") else {
            continue;
        };
        let type_name = declared_type(el).unwrap_or("xsd:string");
        if is_geometry_type(type_name) {
            geometry_name.get_or_insert_with(|| name.to_string());
            continue;
        }
        properties.insert(name.to_string(), property_type_from_xsd(type_name));
    }

    Ok(FeatureTypeFull {
        name: summary.name.clone(),
        title: summary.title.clone(),
        abstract_: summary.abstract_.clone(),
        properties,
        geometry_name,
        default_crs: summary.default_crs.clone(),
        other_crs: summary.other_crs.clone(),
    })
}
