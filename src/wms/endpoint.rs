use std::fmt;

use crate::endpoint::{CapabilitiesLoad, EndpointContext, capabilities_request_url};
use crate::error::{EndpointError, OgcError, Result};
use crate::models::{HttpMethod, OperationUrls, ServiceInfo, ServiceType};
use crate::tree::{map_tree, pre_order};
use crate::url::set_query_params;

use super::capabilities::{WmsCapabilities, parse_capabilities};
use super::model::{LayerNode, LayerSummary};

/// A WMS endpoint advertising layers arranged in a tree.
///
/// Building the endpoint starts fetching its capabilities right away; call
/// [`WmsEndpoint::is_ready`] before reading the layers.
pub struct WmsEndpoint {
    capabilities_url: String,
    load: CapabilitiesLoad<WmsCapabilities>,
}

impl WmsEndpoint {
    /// `url` may carry any query parameters; `SERVICE` and `REQUEST` are
    /// overwritten. Must be called from within a Tokio runtime.
    pub fn new(url: &str, context: &EndpointContext) -> Self {
        let canonical = capabilities_request_url(url, ServiceType::Wms);
        let capabilities_url = canonical.as_deref().unwrap_or(url).to_string();
        let load =
            CapabilitiesLoad::start(context, ServiceType::Wms, canonical, url, parse_capabilities);

        Self {
            capabilities_url,
            load,
        }
    }

    /// Resolves once the capabilities are parsed; every call shares the same fetch
    pub async fn is_ready(&self) -> std::result::Result<&Self, EndpointError> {
        self.load.wait().await?;
        Ok(self)
    }

    fn capabilities(&self) -> Result<&WmsCapabilities> {
        self.load.get().ok_or_else(|| OgcError::NotReady {
            url: self.capabilities_url.clone(),
        })
    }

    pub fn get_service_info(&self) -> Option<ServiceInfo> {
        self.load.get().map(|caps| caps.info.clone())
    }

    /// Version the capabilities document declares, verbatim
    pub fn get_version(&self) -> Option<String> {
        self.load.get().map(|caps| caps.declared_version.clone())
    }

    /// Layer tree reduced to names, titles and abstracts
    pub fn get_layers(&self) -> Result<Vec<LayerSummary>> {
        Ok(map_tree(&self.capabilities()?.layers, LayerNode::summary))
    }

    /// Every layer in pre-order, structural ones included
    pub fn get_flattened_layers(&self) -> Result<Vec<LayerSummary>> {
        Ok(pre_order(&self.capabilities()?.layers)
            .map(LayerNode::summary)
            .collect())
    }

    /// Full layer information, children included. Names are case-sensitive.
    pub fn get_layer_by_name(&self, name: &str) -> Result<Option<LayerNode>> {
        let found = pre_order(&self.capabilities()?.layers)
            .find(|layer| layer.name.as_deref() == Some(name));
        Ok(found.and_then(|layer| {
            map_tree(std::slice::from_ref(layer), LayerNode::detached).pop()
        }))
    }

    /// Name of the only renderable layer, if there is exactly one
    pub fn get_single_layer_name(&self) -> Option<String> {
        let caps = self.load.get()?;
        let mut named = pre_order(&caps.layers).filter(|layer| layer.is_renderable());
        match (named.next(), named.next()) {
            (Some(layer), None) => layer.name.clone(),
            _ => None,
        }
    }

    /// Every advertised operation URL
    pub fn get_operation_urls(&self) -> Option<OperationUrls> {
        self.load.get().map(|caps| caps.urls.clone())
    }

    /// URL advertised by the service for an operation, e.g. `GetMap`
    pub fn get_operation_url(&self, operation: &str, method: HttpMethod) -> Option<String> {
        self.load
            .get()?
            .urls
            .get(operation)?
            .get(&method)
            .cloned()
    }

    /// Capabilities URL reported by the service, or the one derived from the
    /// constructor URL when the service reports none
    pub fn get_capabilities_url(&self) -> String {
        self.get_operation_url("GetCapabilities", HttpMethod::Get)
            .and_then(|base| {
                set_query_params(
                    &base,
                    &[("SERVICE", "WMS"), ("REQUEST", "GetCapabilities")],
                )
                .ok()
            })
            .unwrap_or_else(|| self.capabilities_url.clone())
    }
}

impl fmt::Debug for WmsEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WmsEndpoint")
            .field("capabilities_url", &self.capabilities_url)
            .field("ready", &self.load.get().is_some())
            .finish_non_exhaustive()
    }
}
