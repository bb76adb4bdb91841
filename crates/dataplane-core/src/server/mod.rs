//! Reference dataplane server.
//!
//! Answers feature-support and Envoy bootstrap queries from an in-memory
//! [`Catalog`]. The feature-support response is computed once and the same
//! `Arc` is returned to every caller, so clients reaching this server through
//! the in-process transport must go through the cloning client.

mod catalog;

pub use catalog::{Catalog, CatalogSnapshot, NodeRef, ProxySettings, ServiceRegistration};

use crate::config::DataplaneServerConfig;
use crate::context::CallContext;
use crate::pbdataplane::{
    DataplaneFeatureSupport, DataplaneFeatures, DataplaneService, GetEnvoyBootstrapParamsRequest,
    GetEnvoyBootstrapParamsResponse, GetSupportedDataplaneFeaturesRequest,
    GetSupportedDataplaneFeaturesResponse, NodeSpec, ServiceKind,
};
use crate::{DataplaneError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Dataplane service backed by a catalog.
#[derive(Debug)]
pub struct DataplaneServer {
    config: DataplaneServerConfig,
    catalog: Arc<Catalog>,
    features: Arc<GetSupportedDataplaneFeaturesResponse>,
}

impl DataplaneServer {
    pub fn new(config: DataplaneServerConfig, catalog: Arc<Catalog>) -> Self {
        let features = Arc::new(GetSupportedDataplaneFeaturesResponse {
            supported_dataplane_features: DataplaneFeatures::KNOWN
                .iter()
                .map(|&feature_name| DataplaneFeatureSupport {
                    feature_name,
                    supported: config.supports(feature_name),
                })
                .collect(),
        });

        Self {
            config,
            catalog,
            features,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &DataplaneServerConfig {
        &self.config
    }
}

#[async_trait]
impl DataplaneService for DataplaneServer {
    async fn get_supported_dataplane_features(
        &self,
        _ctx: &CallContext,
        _request: Arc<GetSupportedDataplaneFeaturesRequest>,
    ) -> Result<Arc<GetSupportedDataplaneFeaturesResponse>> {
        Ok(self.features.clone())
    }

    async fn get_envoy_bootstrap_params(
        &self,
        ctx: &CallContext,
        request: Arc<GetEnvoyBootstrapParamsRequest>,
    ) -> Result<Arc<GetEnvoyBootstrapParamsResponse>> {
        let node = match &request.node_spec {
            Some(NodeSpec::NodeId(id)) if !id.is_empty() => NodeRef::Id(id),
            Some(NodeSpec::NodeName(name)) if !name.is_empty() => NodeRef::Name(name),
            _ => {
                return Err(DataplaneError::invalid_argument(
                    "node_spec",
                    "a node ID or node name is required",
                ))
            }
        };
        if request.proxy_id.is_empty() {
            return Err(DataplaneError::invalid_argument("proxy_id", "must not be empty"));
        }

        ctx.check()?;

        let svc = self
            .catalog
            .lookup(node, &request.proxy_id, &request.namespace, &request.partition)
            .await
            .ok_or_else(|| DataplaneError::NotFound {
                message: format!("proxy {} on node {:?}", request.proxy_id, node),
            })?;

        if !svc.kind.is_proxy_or_gateway() {
            warn!(
                "Bootstrap params requested for {} which is not a proxy or gateway",
                svc.service_id
            );
            return Err(DataplaneError::FailedPrecondition {
                message: format!(
                    "service {} is not a proxy or gateway (kind {:?})",
                    svc.service_id, svc.kind
                ),
            });
        }

        let proxy = svc.proxy.unwrap_or_default();
        let service = if svc.kind == ServiceKind::ConnectProxy {
            proxy.destination_service_name
        } else {
            svc.service_name
        };

        debug!(
            "Resolved bootstrap params for {} on {} (service {})",
            svc.service_id, svc.node_name, service
        );

        Ok(Arc::new(GetEnvoyBootstrapParamsResponse {
            service_kind: svc.kind,
            identity: service.clone(),
            service,
            namespace: svc.namespace,
            partition: svc.partition,
            datacenter: self.config.datacenter.clone(),
            config: proxy.config,
            node_name: svc.node_name,
            access_logs: proxy.access_logs,
        }))
    }
}

impl Default for DataplaneServer {
    fn default() -> Self {
        Self::new(DataplaneServerConfig::default(), Arc::new(Catalog::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn server_with(registrations: Vec<ServiceRegistration>) -> DataplaneServer {
        let catalog = Arc::new(Catalog::new());
        for reg in registrations {
            catalog.register(reg).await.unwrap();
        }
        DataplaneServer::new(DataplaneServerConfig::default().with_datacenter("east"), catalog)
    }

    fn registration(kind: ServiceKind, proxy: Option<ProxySettings>) -> ServiceRegistration {
        ServiceRegistration {
            node_name: "node-1".into(),
            node_id: "node-1-id".into(),
            service_id: "svc-1".into(),
            service_name: "gateway-or-web".into(),
            kind,
            namespace: String::new(),
            partition: String::new(),
            proxy,
        }
    }

    fn request(node_spec: Option<NodeSpec>, proxy_id: &str) -> Arc<GetEnvoyBootstrapParamsRequest> {
        Arc::new(GetEnvoyBootstrapParamsRequest {
            node_spec,
            proxy_id: proxy_id.into(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_features_are_shared_across_calls() {
        let server = DataplaneServer::default();
        let ctx = CallContext::new();
        let req = Arc::new(GetSupportedDataplaneFeaturesRequest {});

        let first = server
            .get_supported_dataplane_features(&ctx, req.clone())
            .await
            .unwrap();
        let second = server.get_supported_dataplane_features(&ctx, req).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.supported_dataplane_features.len(), 3);
        assert!(first.is_supported(DataplaneFeatures::EnvoyBootstrapConfiguration));
    }

    #[tokio::test]
    async fn test_features_follow_config() {
        let config = DataplaneServerConfig {
            supported_features: vec![DataplaneFeatures::WatchServers],
            ..Default::default()
        };
        let server = DataplaneServer::new(config, Arc::new(Catalog::new()));
        let resp = server
            .get_supported_dataplane_features(
                &CallContext::new(),
                Arc::new(GetSupportedDataplaneFeaturesRequest {}),
            )
            .await
            .unwrap();

        assert!(resp.is_supported(DataplaneFeatures::WatchServers));
        assert!(!resp.is_supported(DataplaneFeatures::EdgeCertificateManagement));
    }

    #[tokio::test]
    async fn test_connect_proxy_bootstrap() {
        let mut config = serde_json::Map::new();
        config.insert("protocol".into(), serde_json::json!("grpc"));
        let server = server_with(vec![registration(
            ServiceKind::ConnectProxy,
            Some(ProxySettings {
                destination_service_name: "web".into(),
                config: config.clone(),
                access_logs: vec!["{\"path\":\"/dev/stdout\"}".into()],
            }),
        )])
        .await;

        let resp = server
            .get_envoy_bootstrap_params(
                &CallContext::new(),
                request(Some(NodeSpec::NodeName("node-1".into())), "svc-1"),
            )
            .await
            .unwrap();

        assert_eq!(resp.service_kind, ServiceKind::ConnectProxy);
        assert_eq!(resp.service, "web");
        assert_eq!(resp.identity, "web");
        assert_eq!(resp.datacenter, "east");
        assert_eq!(resp.namespace, "default");
        assert_eq!(resp.partition, "default");
        assert_eq!(resp.node_name, "node-1");
        assert_eq!(resp.config, config);
        assert_eq!(resp.access_logs.len(), 1);
    }

    #[tokio::test]
    async fn test_gateway_bootstrap_by_node_id() {
        let server = server_with(vec![registration(
            ServiceKind::MeshGateway,
            Some(ProxySettings::default()),
        )])
        .await;

        let resp = server
            .get_envoy_bootstrap_params(
                &CallContext::new(),
                request(Some(NodeSpec::NodeId("node-1-id".into())), "svc-1"),
            )
            .await
            .unwrap();

        assert_eq!(resp.service_kind, ServiceKind::MeshGateway);
        assert_eq!(resp.service, "gateway-or-web");
        assert_eq!(resp.identity, "gateway-or-web");
    }

    #[tokio::test]
    async fn test_typical_service_is_rejected() {
        let server = server_with(vec![registration(ServiceKind::Typical, None)]).await;

        let err = server
            .get_envoy_bootstrap_params(
                &CallContext::new(),
                request(Some(NodeSpec::NodeName("node-1".into())), "svc-1"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DataplaneError::FailedPrecondition { .. }));
    }

    #[tokio::test]
    async fn test_unknown_proxy_is_not_found() {
        let server = server_with(vec![]).await;

        let err = server
            .get_envoy_bootstrap_params(
                &CallContext::new(),
                request(Some(NodeSpec::NodeName("node-1".into())), "missing"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 5);
    }

    fn invalid_field(err: &DataplaneError) -> Option<&str> {
        match err {
            DataplaneError::InvalidArgument { field, .. } => Some(field),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_request_validation() {
        let server = server_with(vec![]).await;
        let ctx = CallContext::new();

        let err = server
            .get_envoy_bootstrap_params(&ctx, request(None, "svc-1"))
            .await
            .unwrap_err();
        assert_eq!(invalid_field(&err), Some("node_spec"));

        let empty_node = Some(NodeSpec::NodeName(String::new()));
        let err = server
            .get_envoy_bootstrap_params(&ctx, request(empty_node, "svc-1"))
            .await
            .unwrap_err();
        assert_eq!(invalid_field(&err), Some("node_spec"));

        let node = Some(NodeSpec::NodeName("node-1".into()));
        let err = server
            .get_envoy_bootstrap_params(&ctx, request(node, ""))
            .await
            .unwrap_err();
        assert_eq!(invalid_field(&err), Some("proxy_id"));
    }
}
