//! # TurboMCP Authority - Authority Resolution and Instance Discovery
//!
//! Turns the authority URI an application is configured with into a validated,
//! canonical authority and the set of host aliases that identify the same
//! identity provider. Token requests use the preferred network alias; token
//! cache keys use the preferred cache alias.
//!
//! ## Key Features
//!
//! - **Authority classification** - AAD, B2C, ADFS, dSTS and generic OIDC issuers
//! - **Canonicalization** - one stable `https://{host}/{tenant}/` form per authority
//! - **Instance discovery** - user metadata, shared cache, known clouds, network
//! - **Authority validation** - `invalid_instance` rejections surface as errors
//! - **Graceful degradation** - any other discovery failure falls back to the
//!   configured host
//!
//! ## Architecture
//!
//! - [`authority`] - `AuthorityInfo`, `AuthorityType`, endpoint construction
//! - [`discovery`] - metadata providers and `InstanceDiscoveryManager`
//! - [`manager`] - `AuthorityManager`, the per-authority façade
//! - [`config`] - serializable settings and the discovery HTTP settings
//! - [`http_client`] - HTTP transport seam for network discovery
//! - [`context`] - correlation id and cancellation for one request
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use turbomcp_authority::{AuthorityConfig, RequestContext};
//! use turbomcp_authority::discovery::NetworkCacheMetadataProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // One cache per process, shared by every authority
//! let cache = NetworkCacheMetadataProvider::new();
//!
//! let manager = AuthorityConfig::new("https://login.windows.net/contoso.onmicrosoft.com")
//!     .build(cache)?;
//!
//! let ctx = RequestContext::new();
//! manager.run_instance_discovery_and_validation(&ctx).await?;
//!
//! let endpoints = manager.endpoints(&ctx).await?;
//! println!("token endpoint: {}", endpoints.token_endpoint);
//! # Ok(())
//! # }
//! ```

pub mod authority;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod http_client;
pub mod manager;

#[doc(inline)]
pub use authority::{
    AadAuthorityAudience, AuthorityEndpoints, AuthorityInfo, AuthorityType, AzureCloudInstance,
    DEFAULT_AUTHORITY, canonicalize_authority_uri,
};

#[doc(inline)]
pub use config::{AuthorityConfig, DiscoveryClientConfig};

#[doc(inline)]
pub use context::RequestContext;

#[doc(inline)]
pub use discovery::{
    InstanceDiscoveryManager, InstanceDiscoveryMetadataEntry, NetworkCacheMetadataProvider,
};

#[doc(inline)]
pub use error::{AuthorityError, Result};

#[doc(inline)]
pub use manager::AuthorityManager;
