use ogc_capabilities::models::HttpMethod;
use ogc_capabilities::tree::pre_order;
use ogc_capabilities::wms::capabilities::read_version_from_capabilities;
use ogc_capabilities::wms::parse_capabilities;
use ogc_capabilities::xml::parse_xml_string;
use ogc_capabilities::{LayerNode, OgcError, WmsVersion, resolve_layers};

use crate::common::test_helpers::{TestFixtures, round_scales};

fn find<'a>(layers: &'a [LayerNode], name: &str) -> &'a LayerNode {
    pre_order(layers)
        .find(|layer| layer.name.as_deref() == Some(name))
        .unwrap_or_else(|| panic!("no layer {name}"))
}

fn bbox(values: [&str; 4]) -> [String; 4] {
    values.map(str::to_string)
}

#[test]
fn test_read_version() {
    let fixtures = TestFixtures::new();
    let raw = fixtures.wms_1_3_0();
    let doc = parse_xml_string(&raw).unwrap();
    assert_eq!(read_version_from_capabilities(&doc).unwrap(), "1.3.0");

    let raw = fixtures.wms_1_1_1();
    let doc = parse_xml_string(&raw).unwrap();
    assert_eq!(read_version_from_capabilities(&doc).unwrap(), "1.1.1");
}

#[test]
fn test_root_layer() {
    let caps = parse_capabilities(&TestFixtures::new().wms_1_3_0()).unwrap();
    assert_eq!(caps.version, WmsVersion::V1_3_0);
    assert_eq!(caps.layers.len(), 1);

    let root = &caps.layers[0];
    assert_eq!(root.name.as_deref(), Some("GEOSERVICES_GEOLOGIE"));
    assert_eq!(
        root.title,
        "GéoServices : géologie, hydrogéologie et gravimétrie"
    );
    assert!(!root.queryable);
    assert!(!root.opaque);
    assert_eq!(
        root.available_crs,
        vec!["EPSG:4326", "CRS:84", "EPSG:3857", "EPSG:4171", "EPSG:2154"]
    );
    assert_eq!(root.keywords.len(), 7);
    assert_eq!(root.bounding_boxes.len(), 5);
    assert_eq!(
        root.bounding_boxes["CRS:84"],
        bbox(["-180", "-90", "180", "90"])
    );
    assert_eq!(
        root.bounding_boxes["EPSG:3857"],
        bbox(["-1e+15", "-1e+15", "1e+15", "1e+15"])
    );
    assert_eq!(
        root.attribution.as_ref().and_then(|a| a.title.as_deref()),
        Some("Brgm")
    );
    assert_eq!(
        root.attribution.as_ref().and_then(|a| a.logo_url.as_deref()),
        Some("http://mapsref.brgm.fr/legendes/brgm_logo.png")
    );
    assert_eq!(root.styles.len(), 1);
    assert!(root.styles[0].legend_url.is_some());

    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].name.as_deref(), Some("GEOLOGIE"));
    assert_eq!(root.children[0].title, "Cartes géologiques");
}

#[test]
fn test_children_preserve_document_order() {
    let caps = parse_capabilities(&TestFixtures::new().wms_1_3_0()).unwrap();
    let names: Vec<_> = pre_order(&caps.layers)
        .filter_map(|layer| layer.name.as_deref())
        .collect();

    assert_eq!(
        names,
        vec![
            "GEOSERVICES_GEOLOGIE",
            "GEOLOGIE",
            "SCAN_F_GEOL1M",
            "SCAN_F_GEOL250",
            "SCAN_D_GEOL50",
            "INHERIT_SCALE",
            "INHERIT_BBOX",
        ]
    );
}

#[test]
fn test_layer_own_and_inherited_attributes() {
    let caps = parse_capabilities(&TestFixtures::new().wms_1_3_0()).unwrap();
    let layer = find(&caps.layers, "SCAN_F_GEOL1M");

    assert!(!layer.queryable);
    assert_eq!(layer.keywords, vec!["Geologie", "INSPIRE:Geology", "Geology"]);
    assert_eq!(
        layer.attribution.as_ref().and_then(|a| a.title.as_deref()),
        Some("BRGM (modified attribution)")
    );
    assert_eq!(layer.min_scale_denominator, Some(200_000.0));
    assert_eq!(layer.max_scale_denominator, Some(10_000_000.0));
    // ancestors first, then own additions
    assert_eq!(
        layer.available_crs,
        vec![
            "EPSG:4326",
            "CRS:84",
            "EPSG:3857",
            "EPSG:4171",
            "EPSG:2154",
            "EPSG:32620",
            "EPSG:32621",
        ]
    );
    assert_eq!(layer.bounding_boxes.len(), 7);
    assert_eq!(
        layer.bounding_boxes["CRS:84"],
        bbox(["-5.86764", "41.1701", "11.0789", "51.1419"])
    );
    assert_eq!(
        layer.bounding_boxes["EPSG:4171"],
        bbox(["-180", "-90", "180", "90"])
    );
    assert_eq!(
        layer
            .styles
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>(),
        vec!["inspire_common:DEFAULT", "inspire_common:OTHER"]
    );
    assert_eq!(layer.metadata.len(), 1);
    assert_eq!(layer.metadata[0].type_, "TC211");
    assert!(layer.metadata[0].url.contains("id=BR_CAR_ADA"));

    let layer = find(&caps.layers, "SCAN_F_GEOL250");
    assert!(layer.queryable);
    assert!(layer.opaque);
    assert_eq!(
        layer.attribution.as_ref().and_then(|a| a.title.as_deref()),
        Some("Brgm")
    );
    assert_eq!(layer.styles.len(), 1);
    assert_eq!(layer.styles[0].name, "default");
    assert_eq!(layer.styles[0].legend_url, None);
}

#[test]
fn test_scale_denominators_are_inherited() {
    let caps = parse_capabilities(&TestFixtures::new().wms_1_3_0()).unwrap();
    let layer = find(&caps.layers, "INHERIT_SCALE");

    assert_eq!(layer.title, "Inherited scale denominators");
    assert_eq!(layer.abstract_, "");
    assert_eq!(layer.min_scale_denominator, Some(9000.0));
    assert_eq!(layer.max_scale_denominator, Some(251_000.0));
    assert!(layer.keywords.is_empty());
    assert!(!layer.queryable);
    assert_eq!(layer.available_crs.len(), 7);
}

#[test]
fn test_bounding_boxes_are_inherited() {
    let caps = parse_capabilities(&TestFixtures::new().wms_1_3_0()).unwrap();
    let layer = find(&caps.layers, "INHERIT_BBOX");

    assert_eq!(layer.title, "Inherited bounding boxes");
    assert_eq!(
        layer.bounding_boxes.keys().collect::<Vec<_>>(),
        vec!["CRS:84", "EPSG:2154", "EPSG:3857", "EPSG:4171", "EPSG:4326"]
    );
    assert_eq!(
        layer.bounding_boxes["EPSG:4326"],
        bbox(["-180", "-90", "180", "90"])
    );
    assert_eq!(layer.min_scale_denominator, None);
    assert_eq!(layer.max_scale_denominator, None);
}

#[test]
fn test_versions_produce_the_same_layer_tree() {
    let fixtures = TestFixtures::new();
    let old = parse_capabilities(&fixtures.wms_1_1_1()).unwrap();
    let new = parse_capabilities(&fixtures.wms_1_3_0()).unwrap();
    assert_eq!(old.version, WmsVersion::V1_1_1);

    let mut old_layers = old.layers.clone();
    let mut new_layers = new.layers.clone();
    round_scales(&mut old_layers);
    round_scales(&mut new_layers);
    assert_eq!(old_layers, new_layers);

    assert_eq!(old.urls, new.urls);

    let mut old_info = old.info.clone();
    old_info.exception_formats = new.info.exception_formats.clone();
    assert_eq!(old_info, new.info);
    assert_eq!(
        old.info.exception_formats,
        vec![
            "application/vnd.ogc.se_xml",
            "application/vnd.ogc.se_inimage",
            "application/vnd.ogc.se_blank",
        ]
    );
}

#[test]
fn test_resolving_twice_changes_nothing() {
    let caps = parse_capabilities(&TestFixtures::new().wms_1_3_0()).unwrap();
    let resolved = resolve_layers(caps.layers.clone());
    assert_eq!(resolved, caps.layers);
}

#[test]
fn test_service_info() {
    let caps = parse_capabilities(&TestFixtures::new().wms_1_3_0()).unwrap();
    let info = &caps.info;

    assert_eq!(info.name, "WMS");
    assert_eq!(
        info.title,
        "GéoServices : géologie, hydrogéologie et gravimétrie"
    );
    assert_eq!(info.keywords.len(), 7);
    assert_eq!(info.keywords[0], "Géologie");
    assert_eq!(info.fees, "no conditions apply");
    assert_eq!(info.constraints, "None");
    assert_eq!(info.output_formats.len(), 8);
    assert_eq!(info.output_formats[0], "image/png");
    assert_eq!(
        info.info_formats,
        vec!["text/plain", "application/vnd.ogc.gml"]
    );
    assert_eq!(info.exception_formats, vec!["XML", "INIMAGE", "BLANK"]);

    let contact = &info.provider.contact;
    assert_eq!(contact.name, "Support BRGM");
    assert_eq!(contact.organization, "BRGM");
    assert_eq!(contact.position, "pointOfContact");
    assert_eq!(contact.phone, "+33(0)2 38 64 34 34");
    assert_eq!(contact.fax, "+33(0)2 38 64 35 18");
    assert_eq!(contact.email, "contact-brgm@brgm.fr");
    assert_eq!(
        contact.address.delivery_point,
        "3, Avenue Claude Guillemin, BP36009"
    );
    assert_eq!(contact.address.city, "Orléans");
    assert_eq!(contact.address.administrative_area, "Centre");
    assert_eq!(contact.address.postal_code, "45060");
    assert_eq!(contact.address.country, "France");
}

#[test]
fn test_operation_urls() {
    let caps = parse_capabilities(&TestFixtures::new().wms_1_3_0()).unwrap();
    let base = "http://geoservices.brgm.fr/geologie?language=fre&";

    assert_eq!(
        caps.urls.keys().collect::<Vec<_>>(),
        vec![
            "DescribeLayer",
            "GetCapabilities",
            "GetFeatureInfo",
            "GetLegendGraphic",
            "GetMap",
            "GetStyles",
        ]
    );
    for methods in caps.urls.values() {
        assert_eq!(methods[&HttpMethod::Get], base);
        assert_eq!(methods[&HttpMethod::Post], base);
    }
}

#[test]
fn test_unsupported_version_is_malformed() {
    let raw = TestFixtures::new()
        .wms_1_3_0()
        .replacen("version=\"1.3.0\"", "version=\"1.0.0\"", 1);
    assert!(matches!(
        parse_capabilities(&raw),
        Err(OgcError::MalformedDocument { .. })
    ));
}

#[test]
fn test_truncated_document_is_an_xml_error() {
    let raw = TestFixtures::new().wms_1_3_0();
    let cut = (0..=raw.len() / 2)
        .rev()
        .find(|i| raw.is_char_boundary(*i))
        .unwrap();
    let truncated = &raw[..cut];
    assert!(matches!(
        parse_capabilities(truncated),
        Err(OgcError::Xml(_))
    ));
}

/// A 1.3.0 document whose layers are nested `depth` levels deep, each one
/// the only child of the previous, with CRS declared on the outermost only
fn nested_layers(depth: usize) -> String {
    let mut raw = String::from(
        r#"<WMS_Capabilities version="1.3.0"><Service><Name>WMS</Name></Service><Capability>"#,
    );
    for level in 0..depth {
        raw.push_str(&format!("<Layer><Name>level{level}</Name><Title>Level {level}</Title>"));
        if level == 0 {
            raw.push_str("<CRS>EPSG:4326</CRS>");
        }
    }
    raw.push_str(&"</Layer>".repeat(depth));
    raw.push_str("</Capability></WMS_Capabilities>");
    raw
}

#[test]
fn test_deeply_nested_layers_are_rejected() {
    for depth in [400, 20_000] {
        assert!(matches!(
            parse_capabilities(&nested_layers(depth)),
            Err(OgcError::MalformedDocument { .. })
        ));
    }
}

#[test]
fn test_nested_layers_within_the_limit() {
    let caps = parse_capabilities(&nested_layers(100)).unwrap();
    let layers: Vec<&LayerNode> = pre_order(&caps.layers).collect();

    assert_eq!(layers.len(), 100);
    let deepest = layers[99];
    assert_eq!(deepest.name.as_deref(), Some("level99"));
    assert!(deepest.children.is_empty());
    assert_eq!(deepest.available_crs, vec!["EPSG:4326"]);
}

#[test]
fn test_declared_version_is_kept() {
    let raw = TestFixtures::new()
        .wms_1_1_1()
        .replacen("version=\"1.1.1\"", "version=\"1.1.0\"", 1);
    let caps = parse_capabilities(&raw).unwrap();

    assert_eq!(caps.version, WmsVersion::V1_1_1);
    assert_eq!(caps.declared_version, "1.1.0");
    assert!(!caps.layers.is_empty());
}
