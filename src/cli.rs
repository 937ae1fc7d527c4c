use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::ServiceType;

/// How the inspection report is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented human-readable tree
    #[default]
    Tree,
    /// Pretty-printed JSON
    Json,
}

/// Inspect the capabilities of an OGC web service
#[derive(Parser, Debug, Clone)]
#[command(name = "ogc-inspect")]
#[command(about = "Fetch and summarize the capabilities of a WMS or WFS endpoint")]
#[command(version)]
pub struct Cli {
    /// Service URL, with or without GetCapabilities parameters
    #[arg(help = "Base URL of the service")]
    pub url: String,

    /// Service family spoken by the endpoint
    #[arg(short = 's', long = "service", default_value = "wms")]
    pub service: ServiceType,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long = "json", conflicts_with = "format")]
    pub json: bool,

    /// Report format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Describe a single layer or feature type instead of the whole service
    #[arg(short = 'l', long = "layer")]
    pub layer: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Number of retry attempts for failed downloads
    #[arg(long = "retry-attempts")]
    pub retry_attempts: Option<u32>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Format requested on the command line, if any
    pub fn output_format(&self) -> Option<OutputFormat> {
        if self.json {
            Some(OutputFormat::Json)
        } else {
            self.format
        }
    }

    /// Default log filter for the `-v` count, used when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
