//! # ogc-capabilities Library
//!
//! Client-side parsing of OGC web service capabilities. WMS 1.1.1/1.3.0 and
//! WFS 1.0.0/1.1.0/2.0.x documents are read into one version-independent
//! model: a layer tree with inherited attributes or a list of feature types,
//! service metadata and operation URLs.
//!
//! Endpoints fetch their capabilities once, through a process-wide cache, and
//! expose the parsed model once [`WmsEndpoint::is_ready`] or
//! [`WfsEndpoint::is_ready`] resolves.

pub mod cache;
pub mod cli;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http_client;
pub mod models;
pub mod output;
pub mod tree;
pub mod url;
pub mod version;
pub mod wfs;
pub mod wms;
pub mod xml;

pub use cache::{CacheConfig, CacheKey, CapabilitiesCache};
pub use cli::{Cli, OutputFormat};
pub use config::{Config, ConfigManager};
pub use endpoint::{DocumentFetcher, EndpointContext};
pub use error::{EndpointError, OgcError, Result};
pub use http_client::{AsyncHttpClient, HttpClientConfig};
pub use models::{
    Address, BoundingBox, Contact, CrsCode, HttpMethod, OperationUrls, Provider, ServiceInfo,
    ServiceType,
};
pub use output::{Output, ServiceReport};
pub use url::set_query_params;
pub use version::{WfsVersion, WmsVersion, read_version};
pub use wfs::{
    FeatureTypeFull, FeatureTypeSummary, FeatureWithProps, PropertyType, PropertyValue,
    PropsDetails, WfsEndpoint, compute_feature_props_details, parse_feature_props,
    parse_feature_props_geojson,
};
pub use wms::{LayerNode, LayerSummary, WmsEndpoint, resolve_layers};
