//! Client and server traits for the dataplane service.

use super::{
    GetEnvoyBootstrapParamsRequest, GetEnvoyBootstrapParamsResponse,
    GetSupportedDataplaneFeaturesRequest, GetSupportedDataplaneFeaturesResponse,
};
use crate::context::{CallContext, CallOption};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Client side of the dataplane service.
///
/// Requests and responses travel as `Arc`s so an in-process transport can
/// hand them across without copying. Implementations that need isolation
/// wrap themselves with [`super::new_cloning_client`].
#[async_trait]
pub trait DataplaneServiceClient: Send + Sync {
    async fn get_supported_dataplane_features(
        &self,
        ctx: &CallContext,
        request: Arc<GetSupportedDataplaneFeaturesRequest>,
        opts: &[CallOption],
    ) -> Result<Arc<GetSupportedDataplaneFeaturesResponse>>;

    async fn get_envoy_bootstrap_params(
        &self,
        ctx: &CallContext,
        request: Arc<GetEnvoyBootstrapParamsRequest>,
        opts: &[CallOption],
    ) -> Result<Arc<GetEnvoyBootstrapParamsResponse>>;

    /// Whether this client already copies every message that passes through it.
    ///
    /// Only [`super::CloningDataplaneServiceClient`] returns true.
    fn is_cloning_client(&self) -> bool {
        false
    }
}

/// Server side of the dataplane service.
#[async_trait]
pub trait DataplaneService: Send + Sync {
    async fn get_supported_dataplane_features(
        &self,
        ctx: &CallContext,
        request: Arc<GetSupportedDataplaneFeaturesRequest>,
    ) -> Result<Arc<GetSupportedDataplaneFeaturesResponse>>;

    async fn get_envoy_bootstrap_params(
        &self,
        ctx: &CallContext,
        request: Arc<GetEnvoyBootstrapParamsRequest>,
    ) -> Result<Arc<GetEnvoyBootstrapParamsResponse>>;
}
