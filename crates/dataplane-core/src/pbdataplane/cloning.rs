//! Cloning client for in-process dataplane transports.
//!
//! A network transport serializes every message, so caller and server never
//! share memory. An in-process transport hands the same `Arc` to both sides.
//! [`CloningDataplaneServiceClient`] restores the network behaviour by deep
//! copying each request before it reaches the delegate and each response
//! before it reaches the caller.

use super::{
    DataplaneServiceClient, GetEnvoyBootstrapParamsRequest, GetEnvoyBootstrapParamsResponse,
    GetSupportedDataplaneFeaturesRequest, GetSupportedDataplaneFeaturesResponse,
};
use crate::context::{CallContext, CallOption};
use crate::message::Message;
use crate::Result;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Wraps another [`DataplaneServiceClient`] and copies every message passing through it.
///
/// Construct it with [`new_cloning_client`] so an already-cloning client is
/// not wrapped a second time.
pub struct CloningDataplaneServiceClient {
    client: Arc<dyn DataplaneServiceClient>,
}

/// Wrap `client` so requests and responses are deep-copied at the call boundary.
///
/// Returns `client` itself if it already clones.
pub fn new_cloning_client(
    client: Arc<dyn DataplaneServiceClient>,
) -> Arc<dyn DataplaneServiceClient> {
    if client.is_cloning_client() {
        debug!("Dataplane client already clones messages, not wrapping again");
        return client;
    }

    Arc::new(CloningDataplaneServiceClient { client })
}

/// Run one call with the request and response copied across the boundary.
///
/// The caller's `request` is copied and released before `call` runs. If
/// `call` fails its error is returned untouched and nothing is copied.
pub async fn clone_call<Req, Resp, F, Fut>(request: Arc<Req>, call: F) -> Result<Arc<Resp>>
where
    Req: Message,
    Resp: Message,
    F: FnOnce(Arc<Req>) -> Fut,
    Fut: Future<Output = Result<Arc<Resp>>>,
{
    let cloned = Arc::new(request.deep_clone());
    drop(request);

    let response = call(cloned).await?;

    Ok(Arc::new(response.deep_clone()))
}

#[async_trait]
impl DataplaneServiceClient for CloningDataplaneServiceClient {
    async fn get_supported_dataplane_features(
        &self,
        ctx: &CallContext,
        request: Arc<GetSupportedDataplaneFeaturesRequest>,
        opts: &[CallOption],
    ) -> Result<Arc<GetSupportedDataplaneFeaturesResponse>> {
        clone_call(request, move |request| {
            self.client
                .get_supported_dataplane_features(ctx, request, opts)
        })
        .await
    }

    async fn get_envoy_bootstrap_params(
        &self,
        ctx: &CallContext,
        request: Arc<GetEnvoyBootstrapParamsRequest>,
        opts: &[CallOption],
    ) -> Result<Arc<GetEnvoyBootstrapParamsResponse>> {
        clone_call(request, move |request| {
            self.client.get_envoy_bootstrap_params(ctx, request, opts)
        })
        .await
    }

    fn is_cloning_client(&self) -> bool {
        true
    }
}

// Fails to compile if the wrapper stops covering the whole client contract.
fn assert_implements_client<T: DataplaneServiceClient + 'static>() {}
const _: fn() = assert_implements_client::<CloningDataplaneServiceClient>;
