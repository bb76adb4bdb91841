//! Dataplane service contract.
//!
//! Message types exchanged between a dataplane (an Envoy sidecar manager)
//! and the control plane, the client/server traits, and the cloning client
//! used to isolate callers from an in-process server.

mod client;
mod cloning;

pub use client::{DataplaneService, DataplaneServiceClient};
pub use cloning::{clone_call, new_cloning_client, CloningDataplaneServiceClient};

use crate::message::DeepClone;
use serde::{Deserialize, Serialize};

/// Optional dataplane capabilities a server may advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum DataplaneFeatures {
    Unspecified = 0,
    WatchServers = 1,
    EdgeCertificateManagement = 2,
    EnvoyBootstrapConfiguration = 3,
}

impl DataplaneFeatures {
    /// Every feature a server can report on, in wire order.
    pub const KNOWN: [DataplaneFeatures; 3] = [
        DataplaneFeatures::WatchServers,
        DataplaneFeatures::EdgeCertificateManagement,
        DataplaneFeatures::EnvoyBootstrapConfiguration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataplaneFeatures::Unspecified => "DATAPLANE_FEATURES_UNSPECIFIED",
            DataplaneFeatures::WatchServers => "DATAPLANE_FEATURES_WATCH_SERVERS",
            DataplaneFeatures::EdgeCertificateManagement => {
                "DATAPLANE_FEATURES_EDGE_CERTIFICATE_MANAGEMENT"
            }
            DataplaneFeatures::EnvoyBootstrapConfiguration => {
                "DATAPLANE_FEATURES_ENVOY_BOOTSTRAP_CONFIGURATION"
            }
        }
    }
}

impl std::fmt::Display for DataplaneFeatures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of service a proxy fronts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    #[default]
    Unspecified,
    Typical,
    ConnectProxy,
    MeshGateway,
    TerminatingGateway,
    IngressGateway,
    ApiGateway,
}

impl ServiceKind {
    /// Connect proxies and gateways can be bootstrapped; typical services cannot.
    pub fn is_proxy_or_gateway(&self) -> bool {
        matches!(
            self,
            ServiceKind::ConnectProxy
                | ServiceKind::MeshGateway
                | ServiceKind::TerminatingGateway
                | ServiceKind::IngressGateway
                | ServiceKind::ApiGateway
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataplaneFeatureSupport {
    pub feature_name: DataplaneFeatures,
    pub supported: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSupportedDataplaneFeaturesRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSupportedDataplaneFeaturesResponse {
    pub supported_dataplane_features: Vec<DataplaneFeatureSupport>,
}

impl GetSupportedDataplaneFeaturesResponse {
    pub fn is_supported(&self, feature: DataplaneFeatures) -> bool {
        self.supported_dataplane_features
            .iter()
            .any(|f| f.feature_name == feature && f.supported)
    }
}

/// Identifies the node a proxy is registered on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSpec {
    NodeId(String),
    NodeName(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetEnvoyBootstrapParamsRequest {
    pub node_spec: Option<NodeSpec>,
    /// Service ID of the proxy on the node.
    pub proxy_id: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub partition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetEnvoyBootstrapParamsResponse {
    pub service_kind: ServiceKind,
    /// Destination service for connect proxies, the gateway's own name otherwise.
    pub service: String,
    pub namespace: String,
    pub partition: String,
    pub datacenter: String,
    /// Opaque proxy configuration.
    pub config: serde_json::Map<String, serde_json::Value>,
    pub node_name: String,
    pub access_logs: Vec<String>,
    pub identity: String,
}

// Field-by-field copies; scalar enums are `Copy`.

impl DeepClone for DataplaneFeatureSupport {
    fn deep_clone(&self) -> Self {
        *self
    }
}

impl DeepClone for GetSupportedDataplaneFeaturesRequest {
    fn deep_clone(&self) -> Self {
        Self {}
    }
}

impl DeepClone for GetSupportedDataplaneFeaturesResponse {
    fn deep_clone(&self) -> Self {
        Self {
            supported_dataplane_features: self.supported_dataplane_features.deep_clone(),
        }
    }
}

impl DeepClone for NodeSpec {
    fn deep_clone(&self) -> Self {
        match self {
            NodeSpec::NodeId(id) => NodeSpec::NodeId(id.deep_clone()),
            NodeSpec::NodeName(name) => NodeSpec::NodeName(name.deep_clone()),
        }
    }
}

impl DeepClone for GetEnvoyBootstrapParamsRequest {
    fn deep_clone(&self) -> Self {
        Self {
            node_spec: self.node_spec.deep_clone(),
            proxy_id: self.proxy_id.deep_clone(),
            namespace: self.namespace.deep_clone(),
            partition: self.partition.deep_clone(),
        }
    }
}

impl DeepClone for GetEnvoyBootstrapParamsResponse {
    fn deep_clone(&self) -> Self {
        Self {
            service_kind: self.service_kind,
            service: self.service.deep_clone(),
            namespace: self.namespace.deep_clone(),
            partition: self.partition.deep_clone(),
            datacenter: self.datacenter.deep_clone(),
            config: self.config.deep_clone(),
            node_name: self.node_name.deep_clone(),
            access_logs: self.access_logs.deep_clone(),
            identity: self.identity.deep_clone(),
        }
    }
}
