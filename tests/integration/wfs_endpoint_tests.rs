use std::sync::Arc;

use tokio_test::{assert_pending, task};

use ogc_capabilities::models::HttpMethod;
use ogc_capabilities::{OgcError, PropertyType, WfsEndpoint};

use crate::common::mocks::{FixtureFetcher, PendingFetcher, context_with};
use crate::common::test_helpers::TestFixtures;

const GEOSERVER: &str = "http://example.com/geoserver/wfs";

fn geoserver_fetcher(version: &str) -> Arc<FixtureFetcher> {
    let fixtures = TestFixtures::new();
    Arc::new(
        FixtureFetcher::new()
            .route("REQUEST=DescribeFeatureType", fixtures.wfs_describe_states())
            .route("REQUEST=GetCapabilities", fixtures.wfs_capabilities(version)),
    )
}

#[tokio::test]
async fn test_feature_types() {
    let endpoint = WfsEndpoint::new(GEOSERVER, &context_with(geoserver_fetcher("2.0.0")));
    endpoint.is_ready().await.unwrap();

    assert_eq!(endpoint.get_version().as_deref(), Some("2.0.0"));
    assert_eq!(endpoint.get_service_info().unwrap().name, "WFS");

    let types = endpoint.get_feature_types().unwrap();
    assert_eq!(
        types.iter().map(|ft| ft.name.as_str()).collect::<Vec<_>>(),
        vec!["topp:states", "tiger:poi"]
    );

    let summary = endpoint.get_feature_type_summary("topp:states").unwrap().unwrap();
    assert_eq!(summary.title, "USA Population");
    // Unprefixed names match prefixed ones
    let by_local_name = endpoint.get_feature_type_summary("poi").unwrap().unwrap();
    assert_eq!(by_local_name.name, "tiger:poi");
    assert_eq!(endpoint.get_feature_type_summary("roads").unwrap(), None);
}

#[tokio::test]
async fn test_urls() {
    let endpoint = WfsEndpoint::new(GEOSERVER, &context_with(geoserver_fetcher("2.0.0")));
    endpoint.is_ready().await.unwrap();

    assert_eq!(
        endpoint.get_capabilities_url(),
        "http://example.com/geoserver/wfs?SERVICE=WFS&REQUEST=GetCapabilities"
    );
    assert_eq!(
        endpoint
            .get_operation_url("DescribeFeatureType", HttpMethod::Post)
            .as_deref(),
        Some(GEOSERVER)
    );
    assert_eq!(
        endpoint.describe_feature_type_url("topp:states").unwrap(),
        "http://example.com/geoserver/wfs?SERVICE=WFS&REQUEST=DescribeFeatureType&VERSION=2.0.0&TYPENAMES=topp%3Astates"
    );
}

#[tokio::test]
async fn test_describe_url_uses_version_parameter_names() {
    let endpoint = WfsEndpoint::new(GEOSERVER, &context_with(geoserver_fetcher("1.0.0")));
    endpoint.is_ready().await.unwrap();

    // The advertised URL already carries request=..., which is overwritten
    assert_eq!(
        endpoint.describe_feature_type_url("topp:states").unwrap(),
        "http://example.com/geoserver/wfs?SERVICE=WFS&REQUEST=DescribeFeatureType&VERSION=1.0.0&TYPENAME=topp%3Astates"
    );
}

#[tokio::test]
async fn test_declared_version_is_reported_and_sent() {
    let fixtures = TestFixtures::new();
    let capabilities = fixtures
        .wfs_capabilities("2.0.0")
        .replacen("version=\"2.0.0\"", "version=\"2.0.2\"", 1);
    let fetcher = Arc::new(FixtureFetcher::new().route("REQUEST=GetCapabilities", capabilities));
    let endpoint = WfsEndpoint::new(GEOSERVER, &context_with(fetcher));
    endpoint.is_ready().await.unwrap();

    assert_eq!(endpoint.get_version().as_deref(), Some("2.0.2"));
    assert_eq!(
        endpoint.describe_feature_type_url("topp:states").unwrap(),
        "http://example.com/geoserver/wfs?SERVICE=WFS&REQUEST=DescribeFeatureType&VERSION=2.0.2&TYPENAMES=topp%3Astates"
    );
}

#[tokio::test]
async fn test_feature_type_full_is_fetched_once() {
    let fetcher = geoserver_fetcher("2.0.0");
    let endpoint = WfsEndpoint::new(GEOSERVER, &context_with(fetcher.clone()));
    endpoint.is_ready().await.unwrap();

    let full = endpoint
        .get_feature_type_full("topp:states")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(full.name, "topp:states");
    assert_eq!(full.title, "USA Population");
    assert_eq!(full.geometry_name.as_deref(), Some("the_geom"));
    assert_eq!(full.default_crs, "urn:ogc:def:crs:EPSG::4326");
    assert_eq!(full.properties.len(), 9);
    assert_eq!(full.properties["STATE_NAME"], PropertyType::String);
    assert_eq!(full.properties["LAND_KM"], PropertyType::Float);
    assert_eq!(full.properties["PERSONS"], PropertyType::Integer);
    assert_eq!(full.properties["HOUSHOLD"], PropertyType::Integer);
    assert_eq!(full.properties["COASTAL"], PropertyType::Boolean);
    assert_eq!(full.properties["UPDATED"], PropertyType::String);
    assert!(!full.properties.contains_key("the_geom"));

    let again = endpoint.get_feature_type_full("states").await.unwrap().unwrap();
    assert_eq!(again, full);
    assert_eq!(fetcher.count_matching("REQUEST=DescribeFeatureType"), 1);
    assert_eq!(fetcher.count_matching("REQUEST=GetCapabilities"), 1);
}

#[tokio::test]
async fn test_unknown_feature_type_fetches_nothing() {
    let fetcher = geoserver_fetcher("2.0.0");
    let endpoint = WfsEndpoint::new(GEOSERVER, &context_with(fetcher.clone()));
    endpoint.is_ready().await.unwrap();

    assert_eq!(endpoint.get_feature_type_full("roads").await.unwrap(), None);
    assert_eq!(fetcher.count_matching("REQUEST=DescribeFeatureType"), 0);
}

#[tokio::test]
async fn test_describe_failure_is_reported() {
    let fetcher = Arc::new(
        FixtureFetcher::new()
            .route("REQUEST=GetCapabilities", TestFixtures::new().wfs_capabilities("1.1.0")),
    );
    let endpoint = WfsEndpoint::new(GEOSERVER, &context_with(fetcher));
    endpoint.is_ready().await.unwrap();

    let error = endpoint
        .get_feature_type_full("topp:states")
        .await
        .err()
        .unwrap();
    match error {
        OgcError::Endpoint(endpoint_error) => {
            assert!(endpoint_error.url.contains("REQUEST=DescribeFeatureType"));
            assert!(matches!(
                *endpoint_error.cause,
                OgcError::HttpStatus { status: 404, .. }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_accessors_before_ready() {
    let endpoint = WfsEndpoint::new(GEOSERVER, &context_with(Arc::new(PendingFetcher)));

    let mut ready = task::spawn(endpoint.is_ready());
    assert_pending!(ready.poll());
    assert!(format!("{endpoint:?}").contains("ready: false"));

    assert!(matches!(
        endpoint.get_feature_types(),
        Err(OgcError::NotReady { .. })
    ));
    assert!(matches!(
        endpoint.get_feature_type_summary("topp:states"),
        Err(OgcError::NotReady { .. })
    ));
    assert!(matches!(
        endpoint.get_feature_type_full("topp:states").await,
        Err(OgcError::NotReady { .. })
    ));
    assert_eq!(endpoint.get_service_info(), None);
    assert_eq!(endpoint.get_version(), None);
    assert_eq!(
        endpoint.get_capabilities_url(),
        "http://example.com/geoserver/wfs?SERVICE=WFS&REQUEST=GetCapabilities"
    );
}
