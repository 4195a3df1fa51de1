//! Metadata provider contracts

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::network::NetworkDiscoveryError;
use super::types::{InstanceDiscoveryMetadataEntry, InstanceDiscoveryResponse};
use crate::authority::AuthorityInfo;
use crate::context::RequestContext;
use crate::error::Result;

/// Local source of instance metadata (user document, cache, static table)
///
/// Lookups are synchronous and never touch the network. `Ok(None)` means "no
/// answer" and lets the next provider try; an `Err` aborts the whole chain.
pub trait MetadataProvider: Send + Sync + fmt::Debug {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Look up the entry for `host`
    ///
    /// `known_environment_aliases` are other hosts the caller already associates
    /// with this authority; providers may ignore them.
    ///
    /// # Errors
    ///
    /// Returns an error only when the provider asserts the lookup must fail.
    fn try_get_entry(
        &self,
        host: &str,
        known_environment_aliases: &[String],
    ) -> Result<Option<Arc<InstanceDiscoveryMetadataEntry>>>;
}

/// Live instance discovery source
///
/// The only provider that suspends, and the only one that can report
/// [`NetworkDiscoveryError::InvalidInstance`].
#[async_trait]
pub trait NetworkMetadataSource: Send + Sync + fmt::Debug {
    /// Ask the discovery endpoint about `authority`
    ///
    /// # Errors
    ///
    /// Returns [`NetworkDiscoveryError`] on any failure; the caller decides
    /// which failures are fatal.
    async fn fetch_metadata(
        &self,
        authority: &AuthorityInfo,
        ctx: &RequestContext,
    ) -> std::result::Result<InstanceDiscoveryResponse, NetworkDiscoveryError>;
}
