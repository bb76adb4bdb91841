//! Dataplane Core - in-process dataplane RPC with boundary cloning.
//!
//! A dataplane talks to its control plane through the dataplane service
//! (feature discovery and Envoy bootstrap parameters). When both live in the
//! same process the call skips serialization entirely, which means caller and
//! server would otherwise share message memory. This crate provides the
//! service contract, an in-process transport, a reference server, and the
//! cloning client that keeps the two sides isolated.
//!
//! # Example
//!
//! ```rust,ignore
//! use dataplane_core::{new_local_client, CallContext, DataplaneServer};
//! use dataplane_core::pbdataplane::GetSupportedDataplaneFeaturesRequest;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> dataplane_core::Result<()> {
//!     let client = new_local_client(Arc::new(DataplaneServer::default()));
//!
//!     let features = client
//!         .get_supported_dataplane_features(
//!             &CallContext::new(),
//!             Arc::new(GetSupportedDataplaneFeaturesRequest {}),
//!             &[],
//!         )
//!         .await?;
//!     println!("{} features", features.supported_dataplane_features.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod context;
pub mod error;
pub mod inmem;
pub mod message;
pub mod pbdataplane;
pub mod server;

// Re-export commonly used types
pub use cancel::{CancellationToken, CancelledError};
pub use config::{DataplaneServerConfig, TransportOptions};
pub use context::{CallContext, CallOption};
pub use error::{DataplaneError, Result};
pub use inmem::{new_local_client, InProcessClient};
pub use message::{DeepClone, Message};
pub use pbdataplane::{
    new_cloning_client, CloningDataplaneServiceClient, DataplaneService, DataplaneServiceClient,
};
pub use server::{Catalog, CatalogSnapshot, DataplaneServer, ServiceRegistration};
