use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ogc_capabilities::cli::Cli;
use ogc_capabilities::config::ConfigManager;
use ogc_capabilities::endpoint::EndpointContext;
use ogc_capabilities::models::ServiceType;
use ogc_capabilities::output::{Output, ServiceReport};
use ogc_capabilities::{WfsEndpoint, WmsEndpoint};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigManager::load_config(&cli)
        .await
        .context("failed to load configuration")?;
    let context = EndpointContext::with_http(
        ConfigManager::http_client_config(&config),
        &ConfigManager::cache_config(&config),
    )?;
    let output = Output::new(config.output.format);

    info!(url = %cli.url, service = %cli.service, "inspecting endpoint");
    let rendered = match cli.service {
        ServiceType::Wms => inspect_wms(&cli, &context, &output).await?,
        ServiceType::Wfs => inspect_wfs(&cli, &context, &output).await?,
    };
    println!("{}", rendered.trim_end());

    Ok(())
}

async fn inspect_wms(cli: &Cli, context: &EndpointContext, output: &Output) -> Result<String> {
    let endpoint = WmsEndpoint::new(&cli.url, context);
    endpoint.is_ready().await?;

    if let Some(name) = &cli.layer {
        let Some(layer) = endpoint.get_layer_by_name(name)? else {
            bail!("no layer named {name}");
        };
        return Ok(output.format_layer(&layer)?);
    }

    let report = ServiceReport {
        service: ServiceType::Wms,
        version: endpoint.get_version().unwrap_or_default(),
        capabilities_url: endpoint.get_capabilities_url(),
        info: endpoint.get_service_info().unwrap_or_default(),
        operations: endpoint.get_operation_urls().unwrap_or_default(),
        layers: Some(endpoint.get_layers()?),
        feature_types: None,
    };
    Ok(output.format_report(&report)?)
}

async fn inspect_wfs(cli: &Cli, context: &EndpointContext, output: &Output) -> Result<String> {
    let endpoint = WfsEndpoint::new(&cli.url, context);
    endpoint.is_ready().await?;

    if let Some(name) = &cli.layer {
        let Some(feature_type) = endpoint.get_feature_type_full(name).await? else {
            bail!("no feature type named {name}");
        };
        return Ok(output.format_feature_type(&feature_type)?);
    }

    let report = ServiceReport {
        service: ServiceType::Wfs,
        version: endpoint.get_version().unwrap_or_default(),
        capabilities_url: endpoint.get_capabilities_url(),
        info: endpoint.get_service_info().unwrap_or_default(),
        operations: endpoint.get_operation_urls().unwrap_or_default(),
        layers: None,
        feature_types: Some(endpoint.get_feature_types()?),
    };
    Ok(output.format_report(&report)?)
}
