//! Protocol version detection.
//!
//! A document's version is read once from its root element and mapped onto a
//! closed set of supported versions. Each version then hands out a static rule
//! table (see `wms::dialect` and `wfs::dialect`), so per-node extraction never
//! looks at the version string again.

use std::fmt;
use std::str::FromStr;

use roxmltree::Document;
use serde::{Deserialize, Serialize};

use crate::error::{OgcError, Result};
use crate::xml::{element_attribute, root_element};

/// Read the `version` attribute of the root element
pub fn read_version(doc: &Document<'_>) -> Result<String> {
    let root = root_element(doc);
    match element_attribute(root, "version").map(str::trim) {
        Some(version) if !version.is_empty() => Ok(version.to_string()),
        _ => Err(OgcError::malformed(format!(
            "root element <{}> has no version attribute",
            root.tag_name().name()
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WmsVersion {
    #[serde(rename = "1.1.1")]
    V1_1_1,
    #[serde(rename = "1.3.0")]
    V1_3_0,
}

impl WmsVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            WmsVersion::V1_1_1 => "1.1.1",
            WmsVersion::V1_3_0 => "1.3.0",
        }
    }

    /// Detect the version of a WMS capabilities document
    pub fn detect(doc: &Document<'_>) -> Result<Self> {
        read_version(doc)?.parse()
    }
}

impl FromStr for WmsVersion {
    type Err = OgcError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1.1.0" | "1.1.1" => Ok(WmsVersion::V1_1_1),
            "1.3.0" => Ok(WmsVersion::V1_3_0),
            other => Err(OgcError::malformed(format!(
                "unsupported WMS version: {other}"
            ))),
        }
    }
}

impl fmt::Display for WmsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WfsVersion {
    #[serde(rename = "1.0.0")]
    V1_0_0,
    #[serde(rename = "1.1.0")]
    V1_1_0,
    #[serde(rename = "2.0.0")]
    V2_0_0,
}

impl WfsVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            WfsVersion::V1_0_0 => "1.0.0",
            WfsVersion::V1_1_0 => "1.1.0",
            WfsVersion::V2_0_0 => "2.0.0",
        }
    }

    /// Detect the version of a WFS capabilities document
    pub fn detect(doc: &Document<'_>) -> Result<Self> {
        read_version(doc)?.parse()
    }
}

impl FromStr for WfsVersion {
    type Err = OgcError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1.0.0" => Ok(WfsVersion::V1_0_0),
            "1.1.0" => Ok(WfsVersion::V1_1_0),
            v if v.starts_with("2.0.") => Ok(WfsVersion::V2_0_0),
            other => Err(OgcError::malformed(format!(
                "unsupported WFS version: {other}"
            ))),
        }
    }
}

impl fmt::Display for WfsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
