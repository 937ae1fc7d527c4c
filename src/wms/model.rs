use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{BoundingBox, CrsCode};
use crate::tree::TreeNode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerAttribution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataUrl {
    #[serde(rename = "type")]
    pub type_: String,
    pub format: String,
    pub url: String,
}

/// A node of the WMS layer tree.
///
/// Nodes without a name are grouping nodes: they cannot be rendered but carry
/// attributes inherited by their descendants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_: String,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<LayerAttribution>,
    pub available_crs: Vec<CrsCode>,
    pub bounding_boxes: BTreeMap<CrsCode, BoundingBox>,
    pub styles: Vec<LayerStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_scale_denominator: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scale_denominator: Option<f64>,
    pub queryable: bool,
    pub opaque: bool,
    pub metadata: Vec<MetadataUrl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayerNode>,
}

impl LayerNode {
    /// True when the layer carries a non-empty name and can be requested
    pub fn is_renderable(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }

    /// Copy of this node's own fields, without children
    pub fn detached(&self) -> LayerNode {
        LayerNode {
            name: self.name.clone(),
            title: self.title.clone(),
            abstract_: self.abstract_.clone(),
            keywords: self.keywords.clone(),
            attribution: self.attribution.clone(),
            available_crs: self.available_crs.clone(),
            bounding_boxes: self.bounding_boxes.clone(),
            styles: self.styles.clone(),
            min_scale_denominator: self.min_scale_denominator,
            max_scale_denominator: self.max_scale_denominator,
            queryable: self.queryable,
            opaque: self.opaque,
            metadata: self.metadata.clone(),
            children: Vec::new(),
        }
    }

    /// Title/name/abstract of this node alone, without children
    pub fn summary(&self) -> LayerSummary {
        LayerSummary {
            name: self.name.clone(),
            title: self.title.clone(),
            abstract_: self.abstract_.clone(),
            children: Vec::new(),
        }
    }
}

impl TreeNode for LayerNode {
    fn children(&self) -> &[Self] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }
}

/// Summary projection of a layer tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayerSummary>,
}

impl TreeNode for LayerSummary {
    fn children(&self) -> &[Self] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }
}
