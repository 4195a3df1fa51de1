//! # Instance Discovery
//!
//! Maps an authority host to the set of hostnames that are equivalent to it
//! (its aliases), the host requests should go to (`preferred_network`) and the
//! host token-cache keys should use (`preferred_cache`).
//!
//! ## Providers
//!
//! | Provider | Source | Fails? |
//! |---|---|---|
//! | [`UserMetadataProvider`] | JSON document supplied by the application | yes, for uncovered hosts |
//! | [`NetworkCacheMetadataProvider`] | results of earlier network calls, shared process-wide | no |
//! | [`KnownMetadataProvider`] | static table of public and sovereign clouds | no |
//! | [`NetworkMetadataProvider`] | `GET /common/discovery/instance` | `invalid_instance`, cancellation |
//!
//! [`InstanceDiscoveryManager`] consults them in order; see its module docs for
//! the exact rules.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use turbomcp_authority::{AuthorityInfo, RequestContext};
//! use turbomcp_authority::discovery::InstanceDiscoveryManager;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = InstanceDiscoveryManager::builder().build()?;
//! let authority = AuthorityInfo::from_authority_uri("https://login.microsoftonline.com/common", true)?;
//!
//! let entry = manager
//!     .get_metadata_entry(&authority, &[], &RequestContext::new())
//!     .await?;
//! println!("send requests to {}", entry.preferred_network());
//! # Ok(())
//! # }
//! ```

mod cache;
mod known;
mod manager;
mod network;
mod provider;
mod types;
mod user;

pub use cache::NetworkCacheMetadataProvider;
pub use known::KnownMetadataProvider;
pub use manager::{InstanceDiscoveryManager, InstanceDiscoveryManagerBuilder};
pub use network::{
    CLIENT_REQUEST_ID_HEADER, DEFAULT_DISCOVERY_HOST, DISCOVERY_API_VERSION,
    NetworkDiscoveryError, NetworkMetadataProvider,
};
pub use provider::{MetadataProvider, NetworkMetadataSource};
pub use types::{
    INVALID_INSTANCE_ERROR, InstanceDiscoveryErrorResponse, InstanceDiscoveryMetadataEntry,
    InstanceDiscoveryResponse,
};
pub use user::UserMetadataProvider;
