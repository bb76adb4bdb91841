//! Centralized configuration for the dataplane service.
//!
//! Compile-time defaults live on the unit config structs; the runtime values
//! the server and transport are built from (`DataplaneServerConfig`,
//! `TransportOptions`) start from those defaults.

use crate::pbdataplane::DataplaneFeatures;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server-level defaults.
pub struct ServerConfig;

impl ServerConfig {
    pub const DEFAULT_DATACENTER: &'static str = "dc1";
    pub const DEFAULT_NAMESPACE: &'static str = "default";
    pub const DEFAULT_PARTITION: &'static str = "default";
}

/// In-process transport defaults.
pub struct TransportConfig;

impl TransportConfig {
    /// Applied when the caller's context carries no deadline.
    pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Runtime configuration for [`crate::server::DataplaneServer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataplaneServerConfig {
    /// Datacenter reported in bootstrap params.
    pub datacenter: String,
    /// Features this server advertises as supported.
    pub supported_features: Vec<DataplaneFeatures>,
}

impl Default for DataplaneServerConfig {
    fn default() -> Self {
        Self {
            datacenter: ServerConfig::DEFAULT_DATACENTER.to_string(),
            supported_features: vec![
                DataplaneFeatures::WatchServers,
                DataplaneFeatures::EdgeCertificateManagement,
                DataplaneFeatures::EnvoyBootstrapConfiguration,
            ],
        }
    }
}

impl DataplaneServerConfig {
    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = datacenter.into();
        self
    }

    pub fn supports(&self, feature: DataplaneFeatures) -> bool {
        self.supported_features.contains(&feature)
    }
}

/// Runtime options for [`crate::inmem::InProcessClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    /// Timeout used when neither the context nor the call options set one.
    /// `None` lets such calls run unbounded.
    pub default_timeout: Option<Duration>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            default_timeout: Some(TransportConfig::DEFAULT_CALL_TIMEOUT),
        }
    }
}
