//! Web Map Service support: capabilities parsing, layer inheritance and the
//! endpoint facade.

pub mod capabilities;
pub mod dialect;
pub mod endpoint;
pub mod inheritance;
pub mod model;

pub use capabilities::{WmsCapabilities, parse_capabilities};
pub use endpoint::WmsEndpoint;
pub use inheritance::{inherit, resolve_layers};
pub use model::{LayerAttribution, LayerNode, LayerStyle, LayerSummary, MetadataUrl};
