use ogc_capabilities::wfs::{UniqueValue, parse_capabilities, read_feature_type_full};
use ogc_capabilities::xml::parse_xml_string;
use ogc_capabilities::{
    FeatureTypeFull, OgcError, PropertyValue, WfsVersion, compute_feature_props_details,
    parse_feature_props, parse_feature_props_geojson,
};

use crate::common::test_helpers::TestFixtures;

fn states_type() -> FeatureTypeFull {
    let fixtures = TestFixtures::new();
    let caps = parse_capabilities(&fixtures.wfs_capabilities("2.0.0")).unwrap();
    let schema = fixtures.wfs_describe_states();
    let doc = parse_xml_string(&schema).unwrap();
    read_feature_type_full(&doc, &caps.feature_types[0]).unwrap()
}

#[test]
fn test_gml_2_0_0_members() {
    let raw = TestFixtures::new().wfs_get_feature_states("2.0.0");
    let doc = parse_xml_string(&raw).unwrap();
    let features = parse_feature_props(&doc, &states_type(), WfsVersion::V2_0_0);

    assert_eq!(features.len(), 3);
    assert_eq!(
        features.iter().map(|f| f.id.as_deref()).collect::<Vec<_>>(),
        vec![Some("states.1"), Some("states.2"), Some("states.3")]
    );

    let illinois = &features[0].properties;
    assert_eq!(
        illinois["STATE_NAME"],
        PropertyValue::String("Illinois".into())
    );
    assert_eq!(illinois["STATE_FIPS"], PropertyValue::String("17".into()));
    assert_eq!(illinois["LAND_KM"], PropertyValue::Float(143_986.61));
    assert_eq!(illinois["PERSONS"], PropertyValue::Integer(11_430_602));
    assert_eq!(illinois["COASTAL"], PropertyValue::Boolean(false));
    // Geometry and undeclared properties are not read
    assert!(!illinois.contains_key("the_geom"));
    assert!(!illinois.contains_key("UPDATED"));
    assert_eq!(illinois.len(), 8);

    let delaware = &features[2].properties;
    assert!(delaware["LAND_KM"].is_nan());
    assert_eq!(delaware["COASTAL"], PropertyValue::Boolean(true));
    assert!(!delaware.contains_key("EXTRA_FIELD"));
}

#[test]
fn test_gml_1_1_0_feature_members() {
    let raw = TestFixtures::new().wfs_get_feature_states("1.1.0");
    let doc = parse_xml_string(&raw).unwrap();
    let features = parse_feature_props(&doc, &states_type(), WfsVersion::V1_1_0);

    assert_eq!(features.len(), 2);
    assert_eq!(features[1].id.as_deref(), Some("states.2"));
    assert_eq!(
        features[1].properties["PERSONS"],
        PropertyValue::Integer(606_900)
    );
    assert_eq!(features[1].properties.len(), 4);
}

#[test]
fn test_members_are_selected_by_version() {
    let raw = TestFixtures::new().wfs_get_feature_states("2.0.0");
    let doc = parse_xml_string(&raw).unwrap();
    assert!(parse_feature_props(&doc, &states_type(), WfsVersion::V1_1_0).is_empty());
}

#[test]
fn test_geojson_features() {
    let collection = TestFixtures::new().wfs_get_feature_states_geojson();
    let features = parse_feature_props_geojson(&collection).unwrap();

    assert_eq!(features.len(), 3);
    assert_eq!(features[0].id.as_deref(), Some("states.1"));
    assert_eq!(
        features[0].properties["PERSONS"],
        PropertyValue::Integer(11_430_602)
    );
    assert_eq!(
        features[1].properties["LAND_KM"],
        PropertyValue::Float(159.055)
    );
    assert_eq!(
        features[2].properties["LAND_KM"],
        PropertyValue::Json(serde_json::Value::Null)
    );
}

#[test]
fn test_geojson_without_features_is_rejected() {
    let value = serde_json::json!({"type": "FeatureCollection", "totalFeatures": 0});
    assert!(matches!(
        parse_feature_props_geojson(&value),
        Err(OgcError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_props_details() {
    let collection = TestFixtures::new().wfs_get_feature_states_geojson();
    let features = parse_feature_props_geojson(&collection).unwrap();
    let details = compute_feature_props_details(&features);

    assert_eq!(details.len(), 5);
    assert_eq!(
        details["SUB_REGION"].unique_values,
        vec![
            UniqueValue {
                value: PropertyValue::String("E N Cen".into()),
                count: 1,
            },
            UniqueValue {
                value: PropertyValue::String("S Atl".into()),
                count: 2,
            },
        ]
    );
    assert_eq!(
        details["COASTAL"].unique_values,
        vec![
            UniqueValue {
                value: PropertyValue::Boolean(false),
                count: 1,
            },
            UniqueValue {
                value: PropertyValue::Boolean(true),
                count: 2,
            },
        ]
    );
    assert_eq!(details["STATE_NAME"].unique_values.len(), 3);
}

#[test]
fn test_props_details_from_gml_match_geojson() {
    let raw = TestFixtures::new().wfs_get_feature_states("2.0.0");
    let doc = parse_xml_string(&raw).unwrap();
    let gml = compute_feature_props_details(&parse_feature_props(
        &doc,
        &states_type(),
        WfsVersion::V2_0_0,
    ));

    let collection = TestFixtures::new().wfs_get_feature_states_geojson();
    let geojson =
        compute_feature_props_details(&parse_feature_props_geojson(&collection).unwrap());

    assert_eq!(gml["SUB_REGION"], geojson["SUB_REGION"]);
    assert_eq!(gml["COASTAL"], geojson["COASTAL"]);
    assert_eq!(gml["PERSONS"], geojson["PERSONS"]);
}
