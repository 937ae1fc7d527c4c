//! Version-independent model shared by the WMS and WFS parsers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OgcError;

/// Coordinate reference system code, e.g. `EPSG:4326` or `CRS:84`
pub type CrsCode = String;

/// `[minx, miny, maxx, maxy]`, kept as the source's decimal strings
pub type BoundingBox = [String; 4];

/// Operation name as declared by the service, e.g. `GetMap`
pub type OperationName = String;

/// Operation URLs per HTTP method
pub type OperationUrls = BTreeMap<OperationName, BTreeMap<HttpMethod, String>>;

/// The OGC service families this crate understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Wms,
    Wfs,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Wms => "WMS",
            ServiceType::Wfs => "WFS",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = OgcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WMS" => Ok(ServiceType::Wms),
            "WFS" => Ok(ServiceType::Wfs),
            other => Err(OgcError::Config(format!("unknown service type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Match the element names used in `DCPType/HTTP` blocks
    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "Get" => Some(HttpMethod::Get),
            "Post" => Some(HttpMethod::Post),
            _ => None,
        }
    }
}

/// Service-level metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_: String,
    pub keywords: Vec<String>,
    pub constraints: String,
    pub fees: String,
    pub output_formats: Vec<String>,
    pub info_formats: Vec<String>,
    pub exception_formats: Vec<String>,
    pub provider: Provider,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub contact: Contact,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub organization: String,
    pub position: String,
    pub phone: String,
    pub fax: String,
    pub address: Address,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub delivery_point: String,
    pub city: String,
    pub administrative_area: String,
    pub postal_code: String,
    pub country: String,
}
