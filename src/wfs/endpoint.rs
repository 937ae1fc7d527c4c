use std::fmt;

use tracing::debug;

use crate::cache::DESCRIBE_FEATURETYPE;
use crate::endpoint::{CapabilitiesLoad, EndpointContext, capabilities_request_url};
use crate::error::{EndpointError, OgcError, Result};
use crate::models::{HttpMethod, OperationUrls, ServiceInfo, ServiceType};
use crate::url::set_query_params;
use crate::xml::{parse_xml_string, strip_namespace};

use super::capabilities::{WfsCapabilities, parse_capabilities};
use super::describe::read_feature_type_full;
use super::model::{FeatureTypeFull, FeatureTypeSummary};

/// A WFS endpoint advertising a flat list of feature types.
///
/// Same lifecycle as [`crate::wms::WmsEndpoint`]: the capabilities fetch
/// starts on construction and [`WfsEndpoint::is_ready`] awaits it.
pub struct WfsEndpoint {
    capabilities_url: String,
    context: EndpointContext,
    load: CapabilitiesLoad<WfsCapabilities>,
}

impl WfsEndpoint {
    /// Must be called from within a Tokio runtime
    pub fn new(url: &str, context: &EndpointContext) -> Self {
        let canonical = capabilities_request_url(url, ServiceType::Wfs);
        let capabilities_url = canonical.as_deref().unwrap_or(url).to_string();
        let load =
            CapabilitiesLoad::start(context, ServiceType::Wfs, canonical, url, parse_capabilities);

        Self {
            capabilities_url,
            context: context.clone(),
            load,
        }
    }

    pub async fn is_ready(&self) -> std::result::Result<&Self, EndpointError> {
        self.load.wait().await?;
        Ok(self)
    }

    fn capabilities(&self) -> Result<&WfsCapabilities> {
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

    pub fn get_feature_types(&self) -> Result<Vec<FeatureTypeSummary>> {
        Ok(self.capabilities()?.feature_types.clone())
    }

    fn find_feature_type(&self, name: &str) -> Result<Option<&FeatureTypeSummary>> {
        let types = &self.capabilities()?.feature_types;
        Ok(types
            .iter()
            .find(|ft| ft.name == name)
            .or_else(|| types.iter().find(|ft| strip_namespace(&ft.name) == name)))
    }

    /// Feature type by name; an unprefixed name also matches a prefixed one
    pub fn get_feature_type_summary(&self, name: &str) -> Result<Option<FeatureTypeSummary>> {
        Ok(self.find_feature_type(name)?.cloned())
    }

    /// Describe a feature type's properties, fetching its schema through the
    /// shared cache on first use
    pub async fn get_feature_type_full(&self, name: &str) -> Result<Option<FeatureTypeFull>> {
        let Some(summary) = self.find_feature_type(name)?.cloned() else {
            return Ok(None);
        };
        let url = self.describe_feature_type_url(&summary.name)?;
        debug!(feature_type = %summary.name, url = %url, "describing feature type");

        let fetcher = self.context.fetcher.clone();
        let full = self
            .context
            .cache
            .use_cache(
                || async {
                    let raw = fetcher.fetch_text(&url).await?;
                    let doc = parse_xml_string(&raw)?;
                    read_feature_type_full(&doc, &summary)
                },
                ServiceType::Wfs,
                DESCRIBE_FEATURETYPE,
                &url,
            )
            .await
            .map_err(|cause| EndpointError::new(url.clone(), cause))?;

        Ok(Some(full.as_ref().clone()))
    }

    /// DescribeFeatureType request for one feature type
    pub fn describe_feature_type_url(&self, type_name: &str) -> Result<String> {
        let caps = self.capabilities()?;
        let base = self
            .get_operation_url("DescribeFeatureType", HttpMethod::Get)
            .unwrap_or_else(|| self.capabilities_url.clone());

        set_query_params(
            &base,
            &[
                ("SERVICE", "WFS"),
                ("REQUEST", "DescribeFeatureType"),
                ("VERSION", caps.declared_version.as_str()),
                (caps.version.dialect().type_name_param, type_name),
            ],
        )
    }

    /// Every advertised operation URL
    pub fn get_operation_urls(&self) -> Option<OperationUrls> {
        self.load.get().map(|caps| caps.urls.clone())
    }

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
                    &[("SERVICE", "WFS"), ("REQUEST", "GetCapabilities")],
                )
                .ok()
            })
            .unwrap_or_else(|| self.capabilities_url.clone())
    }
}

impl fmt::Debug for WfsEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WfsEndpoint")
            .field("capabilities_url", &self.capabilities_url)
            .field("ready", &self.load.get().is_some())
            .finish_non_exhaustive()
    }
}
