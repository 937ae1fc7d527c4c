//! WFS GetCapabilities parsing.

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OgcError, Result};
use crate::models::{OperationUrls, Provider, ServiceInfo};
use crate::version::{WfsVersion, read_version};
use crate::xml::{
    child_text, children_text, find_child_element, find_children_element, find_path,
    parse_xml_string, root_element,
};

use super::dialect::WfsDialect;
use super::model::FeatureTypeSummary;

/// Everything an endpoint needs from one WFS capabilities document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WfsCapabilities {
    /// Rule set the document was read with
    pub version: WfsVersion,
    /// `version` attribute exactly as the document declares it, e.g. `"2.0.2"`
    pub declared_version: String,
    pub info: ServiceInfo,
    pub feature_types: Vec<FeatureTypeSummary>,
    pub urls: OperationUrls,
}

/// Parse a raw capabilities document. Any failure discards the whole document.
pub fn parse_capabilities(raw: &str) -> Result<WfsCapabilities> {
    let doc = parse_xml_string(raw)?;
    let declared_version = read_version(&doc)?;
    let version: WfsVersion = declared_version.parse()?;
    let capabilities = WfsCapabilities {
        version,
        declared_version,
        info: read_info_from_capabilities(&doc)?,
        feature_types: read_feature_types_from_capabilities(&doc)?,
        urls: read_operation_urls_from_capabilities(&doc)?,
    };
    debug!(
        version = %capabilities.declared_version,
        feature_types = capabilities.feature_types.len(),
        operations = capabilities.urls.len(),
        "parsed WFS capabilities"
    );
    Ok(capabilities)
}

/// Declared protocol version, e.g. `"2.0.0"`
pub fn read_version_from_capabilities(doc: &Document<'_>) -> Result<String> {
    read_version(doc)
}

/// Read service metadata
pub fn read_info_from_capabilities(doc: &Document<'_>) -> Result<ServiceInfo> {
    let dialect = WfsVersion::detect(doc)?.dialect();
    let root = root_element(doc);
    let service = find_child_element(root, dialect.service_tag).ok_or_else(|| {
        OgcError::malformed(format!("missing <{}> element", dialect.service_tag))
    })?;

    Ok(ServiceInfo {
        name: child_text(service, dialect.service_name_tag),
        title: child_text(service, "Title"),
        abstract_: child_text(service, "Abstract"),
        keywords: (dialect.read_keywords)(service),
        constraints: child_text(service, "AccessConstraints"),
        fees: child_text(service, "Fees"),
        output_formats: (dialect.read_output_formats)(root),
        info_formats: Vec::new(),
        exception_formats: find_path(root, &["Capability", "Exception"])
            .map(|el| children_text(el, "Format"))
            .unwrap_or_default(),
        provider: Provider {
            contact: (dialect.read_contact)(root),
        },
    })
}

/// Read the advertised feature types in document order
pub fn read_feature_types_from_capabilities(doc: &Document<'_>) -> Result<Vec<FeatureTypeSummary>> {
    let dialect = WfsVersion::detect(doc)?.dialect();
    let Some(list) = find_child_element(root_element(doc), "FeatureTypeList") else {
        return Ok(Vec::new());
    };

    find_children_element(list, "FeatureType")
        .into_iter()
        .map(|el| read_feature_type(el, dialect))
        .collect()
}

fn read_feature_type(el: Node<'_, '_>, dialect: &WfsDialect) -> Result<FeatureTypeSummary> {
    let name = child_text(el, "Name");
    if name.is_empty() {
        return Err(OgcError::malformed("FeatureType without a <Name>"));
    }

    // Every default-CRS element is read; the first is the default, any others
    // join the explicit other-CRS list
    let mut crs = children_text(el, dialect.default_crs_tag).into_iter();
    let default_crs = crs.next().unwrap_or_default();
    let mut other_crs: Vec<String> = crs.collect();
    if let Some(tag) = dialect.other_crs_tag {
        other_crs.extend(children_text(el, tag));
    }

    Ok(FeatureTypeSummary {
        title: child_text(el, "Title"),
        abstract_: child_text(el, "Abstract"),
        keywords: (dialect.read_keywords)(el),
        default_crs,
        other_crs,
        output_formats: find_child_element(el, "OutputFormats")
            .map(|formats| children_text(formats, "Format"))
            .unwrap_or_default(),
        lat_lon_bounding_box: (dialect.read_geographic_bbox)(el),
        name,
    })
}

/// Read the URL advertised for each operation and HTTP method
pub fn read_operation_urls_from_capabilities(doc: &Document<'_>) -> Result<OperationUrls> {
    let dialect = WfsVersion::detect(doc)?.dialect();
    Ok((dialect.read_operation_urls)(root_element(doc)))
}
