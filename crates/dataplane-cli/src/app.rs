//! Wiring for the CLI: catalog → server → cloning in-process client.

use crate::Args;
use anyhow::{bail, Context, Result};
use dataplane_core::pbdataplane::{
    GetEnvoyBootstrapParamsRequest, GetSupportedDataplaneFeaturesRequest, NodeSpec,
};
use dataplane_core::{
    new_local_client, CallContext, Catalog, CatalogSnapshot, DataplaneServer,
    DataplaneServerConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Run one query and return the response as pretty JSON.
pub async fn run(args: &Args) -> Result<String> {
    let snapshot = match &args.catalog {
        Some(path) => CatalogSnapshot::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => CatalogSnapshot::default(),
    };
    let catalog = Arc::new(Catalog::from_snapshot(snapshot).await?);

    let config = DataplaneServerConfig::default().with_datacenter(&args.datacenter);
    let client = new_local_client(Arc::new(DataplaneServer::new(config, catalog)));
    let ctx = CallContext::new().with_timeout(Duration::from_millis(args.timeout_ms));

    if args.features {
        let resp = client
            .get_supported_dataplane_features(
                &ctx,
                Arc::new(GetSupportedDataplaneFeaturesRequest {}),
                &[],
            )
            .await?;
        return Ok(serde_json::to_string_pretty(&*resp)?);
    }

    let node_spec = match (&args.node_id, &args.node_name) {
        (Some(id), _) => NodeSpec::NodeId(id.clone()),
        (None, Some(name)) => NodeSpec::NodeName(name.clone()),
        (None, None) => bail!("--node-name or --node-id is required"),
    };
    let proxy_id = args.proxy_id.clone().context("--proxy-id is required")?;

    debug!("Requesting bootstrap params for {} on {:?}", proxy_id, node_spec);

    let request = GetEnvoyBootstrapParamsRequest {
        node_spec: Some(node_spec),
        proxy_id,
        namespace: args.namespace.clone(),
        partition: args.partition.clone(),
    };
    let resp = client
        .get_envoy_bootstrap_params(&ctx, Arc::new(request), &[])
        .await?;

    Ok(serde_json::to_string_pretty(&*resp)?)
}
