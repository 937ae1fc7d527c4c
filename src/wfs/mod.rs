//! Web Feature Service support: capabilities, feature type schemas and
//! feature property parsing.

pub mod capabilities;
pub mod describe;
pub mod dialect;
pub mod endpoint;
pub mod featureprops;
pub mod model;

pub use capabilities::{WfsCapabilities, parse_capabilities};
pub use describe::read_feature_type_full;
pub use endpoint::WfsEndpoint;
pub use featureprops::{
    compute_feature_props_details, parse_feature_props, parse_feature_props_geojson,
};
pub use model::{
    FeatureTypeFull, FeatureTypeSummary, FeatureWithProps, PropDetails, PropertyType,
    PropertyValue, PropsDetails, UniqueValue,
};
