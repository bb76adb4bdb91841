//! In-process transport for the dataplane service.
//!
//! Dispatches client calls straight into a [`DataplaneService`] living in the
//! same process. Nothing is serialized: the server handler receives the
//! caller's `Arc` and the caller receives the handler's `Arc`. Use
//! [`new_local_client`] to get a client that restores value isolation.
//!
//! # Call handling
//!
//! - A context that is already cancelled or past its deadline fails fast.
//! - `CallOption::Header` entries are added to the server-side context metadata.
//! - `CallOption::Timeout` tightens the deadline; without any deadline the
//!   configured default timeout applies.
//! - The handler is raced against cancellation and the effective deadline.

use crate::config::TransportOptions;
use crate::context::{CallContext, CallOption};
use crate::pbdataplane::{
    new_cloning_client, DataplaneService, DataplaneServiceClient, GetEnvoyBootstrapParamsRequest,
    GetEnvoyBootstrapParamsResponse, GetSupportedDataplaneFeaturesRequest,
    GetSupportedDataplaneFeaturesResponse,
};
use crate::{DataplaneError, Result};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, trace};

/// Client that calls a local [`DataplaneService`] directly.
pub struct InProcessClient<S: ?Sized> {
    service: Arc<S>,
    options: TransportOptions,
}

impl<S: DataplaneService + ?Sized> InProcessClient<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self::with_options(service, TransportOptions::default())
    }

    pub fn with_options(service: Arc<S>, options: TransportOptions) -> Self {
        Self { service, options }
    }

    /// Build the context the server handler sees for this call.
    fn server_context(&self, ctx: &CallContext, opts: &[CallOption]) -> CallContext {
        let mut server_ctx = ctx.clone();
        for opt in opts {
            match opt {
                CallOption::Header(key, value) => {
                    server_ctx = server_ctx.with_metadata(key.clone(), value.clone());
                }
                CallOption::Timeout(timeout) => {
                    server_ctx = server_ctx.with_timeout(*timeout);
                }
                // The local server is always ready.
                CallOption::WaitForReady(_) => {}
            }
        }

        if server_ctx.deadline().is_none() {
            if let Some(timeout) = self.options.default_timeout {
                server_ctx = server_ctx.with_timeout(timeout);
            }
        }
        server_ctx
    }

    async fn dispatch<T, F, Fut>(
        &self,
        method: &'static str,
        ctx: &CallContext,
        opts: &[CallOption],
        handler: F,
    ) -> Result<Arc<T>>
    where
        F: FnOnce(CallContext) -> Fut,
        Fut: Future<Output = Result<Arc<T>>>,
    {
        ctx.check()?;

        let server_ctx = self.server_context(ctx, opts);
        trace!(method, remaining = ?server_ctx.remaining(), "Dispatching in-process call");

        let call = handler(server_ctx.clone());
        let bounded = async {
            match server_ctx.deadline() {
                Some(deadline) => match tokio::time::timeout_at(deadline, call).await {
                    Ok(result) => result,
                    Err(_) => Err(DataplaneError::DeadlineExceeded),
                },
                None => call.await,
            }
        };

        let result = tokio::select! {
            biased;
            _ = server_ctx.cancelled() => Err(DataplaneError::Cancelled),
            result = bounded => result,
        };

        if let Err(e) = &result {
            debug!("In-process call {} failed: {}", method, e);
        }
        result
    }
}

#[async_trait]
impl<S: DataplaneService + ?Sized + 'static> DataplaneServiceClient for InProcessClient<S> {
    async fn get_supported_dataplane_features(
        &self,
        ctx: &CallContext,
        request: Arc<GetSupportedDataplaneFeaturesRequest>,
        opts: &[CallOption],
    ) -> Result<Arc<GetSupportedDataplaneFeaturesResponse>> {
        let service = &self.service;
        self.dispatch("GetSupportedDataplaneFeatures", ctx, opts, move |server_ctx| async move {
            service
                .get_supported_dataplane_features(&server_ctx, request)
                .await
        })
        .await
    }

    async fn get_envoy_bootstrap_params(
        &self,
        ctx: &CallContext,
        request: Arc<GetEnvoyBootstrapParamsRequest>,
        opts: &[CallOption],
    ) -> Result<Arc<GetEnvoyBootstrapParamsResponse>> {
        let service = &self.service;
        self.dispatch("GetEnvoyBootstrapParams", ctx, opts, move |server_ctx| async move {
            service.get_envoy_bootstrap_params(&server_ctx, request).await
        })
        .await
    }
}

/// Client for a local service, wrapped so callers and the service never share messages.
pub fn new_local_client<S>(service: Arc<S>) -> Arc<dyn DataplaneServiceClient>
where
    S: DataplaneService + ?Sized + 'static,
{
    new_cloning_client(Arc::new(InProcessClient::new(service)))
}
