//! Report formatting for the `ogc-inspect` binary.

use std::io::IsTerminal;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::models::{OperationUrls, ServiceInfo, ServiceType};
use crate::tree::TreeNode;
use crate::wfs::{FeatureTypeFull, FeatureTypeSummary, PropertyType};
use crate::wms::{LayerNode, LayerSummary};

/// What was learned about one endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ServiceReport {
    pub service: ServiceType,
    pub version: String,
    pub capabilities_url: String,
    pub info: ServiceInfo,
    pub operations: OperationUrls,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<LayerSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_types: Option<Vec<FeatureTypeSummary>>,
}

/// Formats reports as an indented tree or as JSON
pub struct Output {
    format: OutputFormat,
    show_colors: bool,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            show_colors: std::io::stdout().is_terminal(),
        }
    }

    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_report(&self, report: &ServiceReport) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report),
            OutputFormat::Tree => Ok(self.format_report_tree(report)),
        }
    }

    pub fn format_layer(&self, layer: &LayerNode) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(layer),
            OutputFormat::Tree => Ok(self.format_layer_tree(layer)),
        }
    }

    pub fn format_feature_type(&self, feature_type: &FeatureTypeFull) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(feature_type),
            OutputFormat::Tree => Ok(self.format_feature_type_tree(feature_type)),
        }
    }

    fn format_report_tree(&self, report: &ServiceReport) -> String {
        let mut output = String::new();
        let info = &report.info;

        output.push_str(&format!(
            "{} {}  {}\n",
            self.colorize(report.service.as_str(), "1"),
            report.version,
            report.capabilities_url
        ));
        push_field(&mut output, "Title", &info.title);
        push_field(&mut output, "Abstract", &info.abstract_);
        push_field(&mut output, "Keywords", &info.keywords.join(", "));
        push_field(&mut output, "Fees", &info.fees);
        push_field(&mut output, "Access constraints", &info.constraints);

        let contact = &info.provider.contact;
        let who = [contact.name.as_str(), contact.organization.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        push_field(&mut output, "Contact", &who);
        push_field(&mut output, "Email", &contact.email);

        if !report.operations.is_empty() {
            output.push_str(&format!("{}\n", self.colorize("Operations:", "36")));
            for (operation, methods) in &report.operations {
                for (method, url) in methods {
                    let method = format!("{:?}", method).to_uppercase();
                    output.push_str(&format!("  {:<20} {:<5} {}\n", operation, method, url));
                }
            }
        }

        if let Some(layers) = &report.layers {
            output.push_str(&format!("{}\n", self.colorize("Layers:", "36")));
            for (depth, layer) in with_depth(layers) {
                let label = match layer.name.as_deref() {
                    Some(name) if !name.is_empty() => {
                        format!("{} - {}", self.colorize(name, "32"), layer.title)
                    }
                    _ => format!("({})", layer.title),
                };
                output.push_str(&format!("{}{}\n", "  ".repeat(depth + 1), label));
            }
        }

        if let Some(feature_types) = &report.feature_types {
            output.push_str(&format!("{}\n", self.colorize("Feature types:", "36")));
            for feature_type in feature_types {
                output.push_str(&format!(
                    "  {} - {} [{}]\n",
                    self.colorize(&feature_type.name, "32"),
                    feature_type.title,
                    feature_type.default_crs
                ));
            }
        }

        output
    }

    fn format_layer_tree(&self, layer: &LayerNode) -> String {
        let mut output = String::new();
        push_field(&mut output, "Name", layer.name.as_deref().unwrap_or_default());
        push_field(&mut output, "Title", &layer.title);
        push_field(&mut output, "Abstract", &layer.abstract_);
        push_field(&mut output, "Keywords", &layer.keywords.join(", "));
        output.push_str(&format!("Queryable: {}\nOpaque: {}\n", layer.queryable, layer.opaque));
        push_field(&mut output, "CRS", &layer.available_crs.join(" "));

        for (crs, [minx, miny, maxx, maxy]) in &layer.bounding_boxes {
            output.push_str(&format!(
                "BoundingBox {}: {} {} {} {}\n",
                crs, minx, miny, maxx, maxy
            ));
        }
        if let Some(min) = layer.min_scale_denominator {
            output.push_str(&format!("Min scale: 1:{}\n", min));
        }
        if let Some(max) = layer.max_scale_denominator {
            output.push_str(&format!("Max scale: 1:{}\n", max));
        }
        if let Some(attribution) = &layer.attribution {
            push_field(&mut output, "Attribution", attribution.title.as_deref().unwrap_or_default());
        }
        for style in &layer.styles {
            output.push_str(&format!("Style {}: {}\n", style.name, style.title));
        }
        for metadata in &layer.metadata {
            output.push_str(&format!(
                "Metadata ({}, {}): {}\n",
                metadata.type_, metadata.format, metadata.url
            ));
        }
        output
    }

    fn format_feature_type_tree(&self, feature_type: &FeatureTypeFull) -> String {
        let mut output = String::new();
        push_field(&mut output, "Name", &feature_type.name);
        push_field(&mut output, "Title", &feature_type.title);
        push_field(&mut output, "Abstract", &feature_type.abstract_);
        push_field(&mut output, "Default CRS", &feature_type.default_crs);
        push_field(&mut output, "Other CRS", &feature_type.other_crs.join(" "));
        push_field(
            &mut output,
            "Geometry",
            feature_type.geometry_name.as_deref().unwrap_or_default(),
        );
        output.push_str(&format!("{}\n", self.colorize("Properties:", "36")));
        for (name, property_type) in &feature_type.properties {
            output.push_str(&format!("  {:<24} {}\n", name, property_type_name(*property_type)));
        }
        output
    }
}

fn push_field(output: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        output.push_str(&format!("{}: {}\n", label, value));
    }
}

fn property_type_name(property_type: PropertyType) -> &'static str {
    match property_type {
        PropertyType::Integer => "integer",
        PropertyType::Float => "float",
        PropertyType::Boolean => "boolean",
        PropertyType::String => "string",
    }
}

/// Pre-order walk yielding each node with its depth
fn with_depth<T: TreeNode>(roots: &[T]) -> Vec<(usize, &T)> {
    let mut nodes = Vec::new();
    let mut stack: Vec<(usize, &T)> = roots.iter().rev().map(|node| (0, node)).collect();
    while let Some((depth, node)) = stack.pop() {
        nodes.push((depth, node));
        stack.extend(node.children().iter().rev().map(|child| (depth + 1, child)));
    }
    nodes
}
