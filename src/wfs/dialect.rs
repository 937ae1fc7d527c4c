//! Per-version extraction rules for WFS documents.

use roxmltree::Node;

use crate::models::{Address, BoundingBox, Contact, HttpMethod, OperationUrls};
use crate::version::WfsVersion;
use crate::wms::dialect::bbox_from_attributes;
use crate::xml::{
    child_text, children_element, children_text, element_attribute, element_name, element_text,
    find_child_element, find_children_element, find_path,
};

/// Rule table for one WFS version
pub struct WfsDialect {
    /// Element holding the service identification
    pub service_tag: &'static str,
    /// Child of the service element naming the service
    pub service_name_tag: &'static str,
    /// Feature type element holding its default CRS
    pub default_crs_tag: &'static str,
    /// Feature type element listing additional CRS, if the version has one
    pub other_crs_tag: Option<&'static str>,
    /// Attribute carrying a feature's identifier
    pub id_attribute: &'static str,
    /// Query parameter naming the requested feature types
    pub type_name_param: &'static str,
    pub read_keywords: fn(Node<'_, '_>) -> Vec<String>,
    /// Geographic extent of a feature type
    pub read_geographic_bbox: fn(Node<'_, '_>) -> Option<BoundingBox>,
    /// Operation URLs, read from the document root
    pub read_operation_urls: fn(Node<'_, '_>) -> OperationUrls,
    /// GetFeature output formats, read from the document root
    pub read_output_formats: fn(Node<'_, '_>) -> Vec<String>,
    /// Service contact, read from the document root
    pub read_contact: fn(Node<'_, '_>) -> Contact,
    /// Feature elements of a GetFeature response, read from the collection root
    pub select_members: for<'a, 'i> fn(Node<'a, 'i>) -> Vec<Node<'a, 'i>>,
}

static WFS_1_0_0: WfsDialect = WfsDialect {
    service_tag: "Service",
    service_name_tag: "Name",
    default_crs_tag: "SRS",
    other_crs_tag: None,
    id_attribute: "fid",
    type_name_param: "TYPENAME",
    read_keywords: comma_separated_keywords,
    read_geographic_bbox: lat_long_bounding_box,
    read_operation_urls: capability_request_urls,
    read_output_formats: result_format_names,
    read_contact: no_contact,
    select_members: feature_members,
};

static WFS_1_1_0: WfsDialect = WfsDialect {
    service_tag: "ServiceIdentification",
    service_name_tag: "ServiceType",
    default_crs_tag: "DefaultSRS",
    other_crs_tag: Some("OtherSRS"),
    id_attribute: "gml:id",
    type_name_param: "TYPENAME",
    read_keywords: keyword_elements,
    read_geographic_bbox: wgs84_bounding_box,
    read_operation_urls: operations_metadata_urls,
    read_output_formats: get_feature_parameter_values,
    read_contact: service_provider_contact,
    select_members: feature_members,
};

static WFS_2_0_0: WfsDialect = WfsDialect {
    service_tag: "ServiceIdentification",
    service_name_tag: "ServiceType",
    default_crs_tag: "DefaultCRS",
    other_crs_tag: Some("OtherCRS"),
    id_attribute: "gml:id",
    type_name_param: "TYPENAMES",
    read_keywords: keyword_elements,
    read_geographic_bbox: wgs84_bounding_box,
    read_operation_urls: operations_metadata_urls,
    read_output_formats: get_feature_parameter_values,
    read_contact: service_provider_contact,
    select_members: members,
};

impl WfsVersion {
    pub fn dialect(self) -> &'static WfsDialect {
        match self {
            WfsVersion::V1_0_0 => &WFS_1_0_0,
            WfsVersion::V1_1_0 => &WFS_1_1_0,
            WfsVersion::V2_0_0 => &WFS_2_0_0,
        }
    }
}

fn comma_separated_keywords(el: Node<'_, '_>) -> Vec<String> {
    find_children_element(el, "Keywords")
        .into_iter()
        .flat_map(|keywords| {
            element_text(keywords)
                .split(',')
                .map(str::trim)
                .filter(|kw| !kw.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn keyword_elements(el: Node<'_, '_>) -> Vec<String> {
    find_children_element(el, "Keywords")
        .into_iter()
        .flat_map(|keywords| children_text(keywords, "Keyword"))
        .collect()
}

fn lat_long_bounding_box(feature_type: Node<'_, '_>) -> Option<BoundingBox> {
    find_child_element(feature_type, "LatLongBoundingBox").and_then(bbox_from_attributes)
}

fn wgs84_bounding_box(feature_type: Node<'_, '_>) -> Option<BoundingBox> {
    let bbox = find_child_element(feature_type, "WGS84BoundingBox")?;
    let corner = |name: &str| {
        let text = child_text(bbox, name);
        let mut coords = text.split_whitespace().map(str::to_string);
        Some((coords.next()?, coords.next()?))
    };
    let (minx, miny) = corner("LowerCorner")?;
    let (maxx, maxy) = corner("UpperCorner")?;
    Some([minx, miny, maxx, maxy])
}

fn capability_request_urls(root: Node<'_, '_>) -> OperationUrls {
    let mut urls = OperationUrls::new();
    let Some(request) = find_path(root, &["Capability", "Request"]) else {
        return urls;
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
                    element_attribute(method_el, "onlineResource"),
                ) else {
                    continue;
                };
                methods.entry(method).or_insert_with(|| url.to_string());
            }
        }
    }
    urls
}

fn operations_metadata_urls(root: Node<'_, '_>) -> OperationUrls {
    let mut urls = OperationUrls::new();
    let Some(metadata) = find_child_element(root, "OperationsMetadata") else {
        return urls;
    };

    for operation in find_children_element(metadata, "Operation") {
        let Some(name) = element_attribute(operation, "name") else {
            continue;
        };
        let methods = urls.entry(name.to_string()).or_default();
        for http in find_children_element(operation, "DCP")
            .into_iter()
            .filter_map(|dcp| find_child_element(dcp, "HTTP"))
        {
            for method_el in children_element(http) {
                let (Some(method), Some(url)) = (
                    HttpMethod::from_element_name(element_name(method_el)),
                    element_attribute(method_el, "xlink:href"),
                ) else {
                    continue;
                };
                methods.entry(method).or_insert_with(|| url.to_string());
            }
        }
    }
    urls
}

fn result_format_names(root: Node<'_, '_>) -> Vec<String> {
    find_path(root, &["Capability", "Request", "GetFeature", "ResultFormat"])
        .map(|formats| {
            children_element(formats)
                .map(|el| element_name(el).to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn get_feature_parameter_values(root: Node<'_, '_>) -> Vec<String> {
    let Some(metadata) = find_child_element(root, "OperationsMetadata") else {
        return Vec::new();
    };
    let Some(get_feature) = find_children_element(metadata, "Operation")
        .into_iter()
        .find(|op| element_attribute(*op, "name") == Some("GetFeature"))
    else {
        return Vec::new();
    };

    find_children_element(get_feature, "Parameter")
        .into_iter()
        .filter(|param| element_attribute(*param, "name") == Some("outputFormat"))
        .flat_map(|param| {
            let mut values = children_text(param, "Value");
            if let Some(allowed) = find_child_element(param, "AllowedValues") {
                values.extend(children_text(allowed, "Value"));
            }
            values
        })
        .collect()
}

fn no_contact(_root: Node<'_, '_>) -> Contact {
    Contact::default()
}

fn service_provider_contact(root: Node<'_, '_>) -> Contact {
    let Some(provider) = find_child_element(root, "ServiceProvider") else {
        return Contact::default();
    };
    let contact = find_child_element(provider, "ServiceContact");
    let info = contact.and_then(|c| find_child_element(c, "ContactInfo"));
    let phone = info.and_then(|i| find_child_element(i, "Phone"));
    let address = info.and_then(|i| find_child_element(i, "Address"));

    let text = |el: Option<Node<'_, '_>>, name: &str| {
        el.map(|e| child_text(e, name)).unwrap_or_default()
    };

    Contact {
        name: text(contact, "IndividualName"),
        organization: child_text(provider, "ProviderName"),
        position: text(contact, "PositionName"),
        phone: text(phone, "Voice"),
        fax: text(phone, "Facsimile"),
        address: Address {
            delivery_point: text(address, "DeliveryPoint"),
            city: text(address, "City"),
            administrative_area: text(address, "AdministrativeArea"),
            postal_code: text(address, "PostalCode"),
            country: text(address, "Country"),
        },
        email: text(address, "ElectronicMailAddress"),
    }
}

/// `featureMembers` children, or the content of each `featureMember`
fn feature_members<'a, 'i>(collection: Node<'a, 'i>) -> Vec<Node<'a, 'i>> {
    match find_child_element(collection, "featureMembers") {
        Some(members) => children_element(members).collect(),
        None => first_child_of_each(collection, "featureMember"),
    }
}

fn members<'a, 'i>(collection: Node<'a, 'i>) -> Vec<Node<'a, 'i>> {
    first_child_of_each(collection, "member")
}

fn first_child_of_each<'a, 'i>(collection: Node<'a, 'i>, wrapper: &str) -> Vec<Node<'a, 'i>> {
    find_children_element(collection, wrapper)
        .into_iter()
        .filter_map(|member| children_element(member).next())
        .collect()
}
