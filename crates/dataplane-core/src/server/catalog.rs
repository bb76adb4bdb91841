//! In-memory catalog of service registrations.
//!
//! Registrations are keyed by node, service ID, namespace and partition, the
//! same tuple a bootstrap request resolves. Snapshots can be loaded from a
//! JSON file of the form `{"services": [ ... ]}`.

use crate::config::ServerConfig;
use crate::pbdataplane::ServiceKind;
use crate::{DataplaneError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Proxy settings attached to a proxy or gateway registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Service a connect proxy fronts. Unused for gateways.
    pub destination_service_name: String,
    /// Opaque proxy configuration passed through to the dataplane.
    pub config: serde_json::Map<String, serde_json::Value>,
    /// Access log configuration, one JSON document per entry.
    pub access_logs: Vec<String>,
}

/// A service instance registered on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRegistration {
    pub node_name: String,
    #[serde(default)]
    pub node_id: String,
    pub service_id: String,
    pub service_name: String,
    #[serde(default)]
    pub kind: ServiceKind,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub partition: String,
    #[serde(default)]
    pub proxy: Option<ProxySettings>,
}

impl ServiceRegistration {
    fn validate(&self) -> Result<()> {
        if self.node_name.is_empty() {
            return Err(DataplaneError::invalid_argument("node_name", "must not be empty"));
        }
        if self.service_id.is_empty() {
            return Err(DataplaneError::invalid_argument("service_id", "must not be empty"));
        }
        if self.service_name.is_empty() {
            return Err(DataplaneError::invalid_argument(
                "service_name",
                "must not be empty",
            ));
        }
        if self.kind.is_proxy_or_gateway() {
            let proxy = self.proxy.as_ref().ok_or_else(|| {
                DataplaneError::invalid_argument(
                    "proxy",
                    "proxy and gateway kinds need proxy settings",
                )
            })?;
            if self.kind == ServiceKind::ConnectProxy && proxy.destination_service_name.is_empty() {
                return Err(DataplaneError::invalid_argument(
                    "proxy.destination_service_name",
                    "connect proxies need a destination service",
                ));
            }
        }
        Ok(())
    }

    /// Fill in default namespace and partition.
    fn normalized(mut self) -> Self {
        if self.namespace.is_empty() {
            self.namespace = ServerConfig::DEFAULT_NAMESPACE.to_string();
        }
        if self.partition.is_empty() {
            self.partition = ServerConfig::DEFAULT_PARTITION.to_string();
        }
        self
    }
}

/// Which node a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    Id(&'a str),
    Name(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ServiceKey {
    node_name: String,
    service_id: String,
    namespace: String,
    partition: String,
}

impl ServiceKey {
    fn of(reg: &ServiceRegistration) -> Self {
        Self {
            node_name: reg.node_name.clone(),
            service_id: reg.service_id.clone(),
            namespace: reg.namespace.clone(),
            partition: reg.partition.clone(),
        }
    }
}

/// Serialized form of a catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub services: Vec<ServiceRegistration>,
}

impl CatalogSnapshot {
    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| DataplaneError::io_with_path(e, path))?;
        let snapshot: CatalogSnapshot = serde_json::from_str(&contents)?;
        debug!(
            "Loaded catalog snapshot from {} ({} services)",
            path.display(),
            snapshot.services.len()
        );
        Ok(snapshot)
    }
}

/// Concurrent catalog of registrations.
#[derive(Debug, Default)]
pub struct Catalog {
    services: RwLock<HashMap<ServiceKey, ServiceRegistration>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a snapshot, validating every registration.
    pub async fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self> {
        let catalog = Self::new();
        for reg in snapshot.services {
            catalog.register(reg).await?;
        }
        info!("Catalog loaded with {} services", catalog.len().await);
        Ok(catalog)
    }

    /// Register or replace a service instance.
    pub async fn register(&self, registration: ServiceRegistration) -> Result<()> {
        registration.validate()?;
        let registration = registration.normalized();
        debug!(
            "Registering {} ({:?}) on node {}",
            registration.service_id, registration.kind, registration.node_name
        );
        self.services
            .write()
            .await
            .insert(ServiceKey::of(&registration), registration);
        Ok(())
    }

    /// Remove a service instance. Returns whether it was registered.
    pub async fn deregister(
        &self,
        node_name: &str,
        service_id: &str,
        namespace: &str,
        partition: &str,
    ) -> bool {
        let key = ServiceKey {
            node_name: node_name.to_string(),
            service_id: service_id.to_string(),
            namespace: or_default(namespace, ServerConfig::DEFAULT_NAMESPACE).to_string(),
            partition: or_default(partition, ServerConfig::DEFAULT_PARTITION).to_string(),
        };
        self.services.write().await.remove(&key).is_some()
    }

    /// Find a service instance on a node. Empty namespace / partition mean the default.
    pub async fn lookup(
        &self,
        node: NodeRef<'_>,
        service_id: &str,
        namespace: &str,
        partition: &str,
    ) -> Option<ServiceRegistration> {
        let namespace = or_default(namespace, ServerConfig::DEFAULT_NAMESPACE);
        let partition = or_default(partition, ServerConfig::DEFAULT_PARTITION);
        let services = self.services.read().await;

        match node {
            NodeRef::Name(node_name) => services
                .get(&ServiceKey {
                    node_name: node_name.to_string(),
                    service_id: service_id.to_string(),
                    namespace: namespace.to_string(),
                    partition: partition.to_string(),
                })
                .cloned(),
            NodeRef::Id(node_id) => services
                .values()
                .find(|reg| {
                    !reg.node_id.is_empty()
                        && reg.node_id == node_id
                        && reg.service_id == service_id
                        && reg.namespace == namespace
                        && reg.partition == partition
                })
                .cloned(),
        }
    }

    pub async fn len(&self) -> usize {
        self.services.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.services.read().await.is_empty()
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}
