//! WMS GetCapabilities parsing.

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OgcError, Result};
use crate::models::{Address, Contact, HttpMethod, OperationUrls, Provider, ServiceInfo};
use crate::tree::Arena;
use crate::version::{WmsVersion, read_version};
use crate::xml::{
    child_text, children_element, children_text, element_attribute, element_name, element_text,
    find_child_element, find_children_element, find_path, parse_xml_string, root_element,
};

use super::dialect::{WmsDialect, bbox_from_attributes};
use super::inheritance::resolve_arena;
use super::model::{LayerAttribution, LayerNode, LayerStyle, MetadataUrl};

/// Everything an endpoint needs from one capabilities document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WmsCapabilities {
    /// Rule set the document was read with
    pub version: WmsVersion,
    /// `version` attribute exactly as the document declares it
    pub declared_version: String,
    pub info: ServiceInfo,
    pub layers: Vec<LayerNode>,
    pub urls: OperationUrls,
}

/// Parse a raw capabilities document. Any failure discards the whole document.
pub fn parse_capabilities(raw: &str) -> Result<WmsCapabilities> {
    let doc = parse_xml_string(raw)?;
    let declared_version = read_version(&doc)?;
    let version: WmsVersion = declared_version.parse()?;
    let capabilities = WmsCapabilities {
        version,
        declared_version,
        info: read_info_from_capabilities(&doc)?,
        layers: read_layers_from_capabilities(&doc)?,
        urls: read_operation_urls_from_capabilities(&doc)?,
    };
    debug!(
        version = %capabilities.declared_version,
        layers = capabilities.layers.len(),
        operations = capabilities.urls.len(),
        "parsed WMS capabilities"
    );
    Ok(capabilities)
}

/// Declared protocol version, e.g. `"1.3.0"`
pub fn read_version_from_capabilities(doc: &Document<'_>) -> Result<String> {
    read_version(doc)
}

fn capability_element<'a, 'i>(doc: &'a Document<'i>) -> Result<Node<'a, 'i>> {
    find_child_element(root_element(doc), "Capability")
        .ok_or_else(|| OgcError::malformed("missing <Capability> element"))
}

/// Read the layer tree with inherited attributes resolved
pub fn read_layers_from_capabilities(doc: &Document<'_>) -> Result<Vec<LayerNode>> {
    let dialect = WmsVersion::detect(doc)?.dialect();
    let capability = capability_element(doc)?;

    let mut arena = Arena::new();
    let mut stack: Vec<(Option<usize>, Node<'_, '_>)> = find_children_element(capability, "Layer")
        .into_iter()
        .rev()
        .map(|el| (None, el))
        .collect();

    while let Some((parent, el)) = stack.pop() {
        let idx = arena.push(parent, read_own_layer(el, dialect)?);
        stack.extend(
            find_children_element(el, "Layer")
                .into_iter()
                .rev()
                .map(|child| (Some(idx), child)),
        );
    }

    resolve_arena(&mut arena);
    Ok(arena.into_tree())
}

/// A layer's own declarations, ignoring its ancestors and children
fn read_own_layer(el: Node<'_, '_>, dialect: &WmsDialect) -> Result<LayerNode> {
    let name = Some(child_text(el, "Name")).filter(|name| !name.is_empty());

    let mut available_crs: Vec<String> = Vec::new();
    for crs in find_children_element(el, dialect.crs_tag)
        .into_iter()
        .flat_map(|crs_el| {
            element_text(crs_el)
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
    {
        if !available_crs.contains(&crs) {
            available_crs.push(crs);
        }
    }

    let mut bounding_boxes = std::collections::BTreeMap::new();
    if let Some(bbox) = (dialect.read_geographic_bbox)(el) {
        bounding_boxes.insert("CRS:84".to_string(), bbox);
    }
    for bbox_el in find_children_element(el, "BoundingBox") {
        let crs = element_attribute(bbox_el, dialect.bbox_crs_attribute).ok_or_else(|| {
            OgcError::malformed(format!(
                "BoundingBox without {} in layer {:?}",
                dialect.bbox_crs_attribute,
                name.as_deref().unwrap_or_default()
            ))
        })?;
        let bbox = bbox_from_attributes(bbox_el).ok_or_else(|| {
            OgcError::malformed(format!("incomplete BoundingBox for {crs}"))
        })?;
        bounding_boxes.insert(crs.trim().to_string(), bbox);
    }

    let (min_scale_denominator, max_scale_denominator) = (dialect.read_scale_denominators)(el);

    Ok(LayerNode {
        title: child_text(el, "Title"),
        abstract_: child_text(el, "Abstract"),
        keywords: keywords(el),
        attribution: find_child_element(el, "Attribution").map(read_attribution),
        available_crs,
        bounding_boxes,
        styles: find_children_element(el, "Style")
            .into_iter()
            .map(read_style)
            .collect(),
        min_scale_denominator,
        max_scale_denominator,
        queryable: flag(el, "queryable"),
        opaque: flag(el, "opaque"),
        metadata: find_children_element(el, "MetadataURL")
            .into_iter()
            .map(read_metadata_url)
            .collect(),
        name,
        children: Vec::new(),
    })
}

fn flag(el: Node<'_, '_>, name: &str) -> bool {
    matches!(element_attribute(el, name).map(str::trim), Some("1" | "true"))
}

fn keywords(el: Node<'_, '_>) -> Vec<String> {
    find_child_element(el, "KeywordList")
        .map(|list| children_text(list, "Keyword"))
        .unwrap_or_default()
}

fn online_resource(el: Node<'_, '_>) -> Option<String> {
    find_child_element(el, "OnlineResource")
        .and_then(|res| element_attribute(res, "xlink:href"))
        .map(str::to_string)
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn read_attribution(el: Node<'_, '_>) -> LayerAttribution {
    LayerAttribution {
        title: non_empty(child_text(el, "Title")),
        url: online_resource(el),
        logo_url: find_child_element(el, "LogoURL").and_then(online_resource),
    }
}

fn read_style(el: Node<'_, '_>) -> LayerStyle {
    LayerStyle {
        name: child_text(el, "Name"),
        title: child_text(el, "Title"),
        legend_url: find_child_element(el, "LegendURL").and_then(online_resource),
    }
}

fn read_metadata_url(el: Node<'_, '_>) -> MetadataUrl {
    MetadataUrl {
        type_: element_attribute(el, "type").unwrap_or_default().to_string(),
        format: child_text(el, "Format"),
        url: online_resource(el).unwrap_or_default(),
    }
}

/// Read service metadata
pub fn read_info_from_capabilities(doc: &Document<'_>) -> Result<ServiceInfo> {
    let root = root_element(doc);
    let service = find_child_element(root, "Service")
        .ok_or_else(|| OgcError::malformed("missing <Service> element"))?;
    let capability = capability_element(doc)?;

    let formats = |path: &[&str]| {
        find_path(capability, path)
            .map(|el| children_text(el, "Format"))
            .unwrap_or_default()
    };

    Ok(ServiceInfo {
        name: child_text(service, "Name"),
        title: child_text(service, "Title"),
        abstract_: child_text(service, "Abstract"),
        keywords: keywords(service),
        constraints: child_text(service, "AccessConstraints"),
        fees: child_text(service, "Fees"),
        output_formats: formats(&["Request", "GetMap"]),
        info_formats: formats(&["Request", "GetFeatureInfo"]),
        exception_formats: formats(&["Exception"]),
        provider: Provider {
            contact: find_child_element(service, "ContactInformation")
                .map(read_contact)
                .unwrap_or_default(),
        },
    })
}

fn read_contact(el: Node<'_, '_>) -> Contact {
    let primary = find_child_element(el, "ContactPersonPrimary");
    let from_primary = |name: &str| primary.map(|p| child_text(p, name)).unwrap_or_default();
    let address = find_child_element(el, "ContactAddress");
    let from_address = |name: &str| address.map(|a| child_text(a, name)).unwrap_or_default();

    Contact {
        name: from_primary("ContactPerson"),
        organization: from_primary("ContactOrganization"),
        position: child_text(el, "ContactPosition"),
        phone: child_text(el, "ContactVoiceTelephone"),
        fax: child_text(el, "ContactFacsimileTelephone"),
        address: Address {
            delivery_point: from_address("Address"),
            city: from_address("City"),
            administrative_area: from_address("StateOrProvince"),
            postal_code: from_address("PostCode"),
            country: from_address("Country"),
        },
        email: child_text(el, "ContactElectronicMailAddress"),
    }
}

/// Read the URL advertised for each operation and HTTP method
pub fn read_operation_urls_from_capabilities(doc: &Document<'_>) -> Result<OperationUrls> {
    let mut urls = OperationUrls::new();
    let Some(request) = find_child_element(capability_element(doc)?, "Request") else {
        return Ok(urls);
    };

    for operation in children_element(request) {
        let methods = urls.entry(element_name(operation).to_string()).or_default();
        for http in find_children_element(operation, "DCPType")
            .into_iter()
            .filter_map(|dcp| find_child_element(dcp, "HTTP"))
        {
            for method_el in children_element(http) {
                let (Some(method), Some(url)) = (
                    HttpMethod::from_element_name(element_name(method_el)),
                    online_resource(method_el),
                ) else {
                    continue;
                };
                methods.entry(method).or_insert(url);
            }
        }
    }
    Ok(urls)
}
