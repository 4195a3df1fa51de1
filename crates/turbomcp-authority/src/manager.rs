//! Authority Manager
//!
//! Per-authority façade over instance discovery. It validates AAD authorities
//! once and remembers the resolved alias set for the lifetime of the manager.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::authority::{AuthorityEndpoints, AuthorityInfo};
use crate::context::RequestContext;
use crate::discovery::{InstanceDiscoveryManager, InstanceDiscoveryMetadataEntry};
use crate::error::Result;

/// Resolves and remembers the metadata of one authority
#[derive(Debug)]
pub struct AuthorityManager {
    authority: AuthorityInfo,
    discovery: Arc<InstanceDiscoveryManager>,
    resolved: OnceCell<Arc<InstanceDiscoveryMetadataEntry>>,
}

impl AuthorityManager {
    /// Create a manager for `authority`
    #[must_use]
    pub fn new(authority: AuthorityInfo, discovery: Arc<InstanceDiscoveryManager>) -> Self {
        Self {
            authority,
            discovery,
            resolved: OnceCell::new(),
        }
    }

    /// The managed authority
    #[must_use]
    pub fn authority(&self) -> &AuthorityInfo {
        &self.authority
    }

    /// The discovery manager used for resolution
    #[must_use]
    pub fn discovery(&self) -> &Arc<InstanceDiscoveryManager> {
        &self.discovery
    }

    /// Validate the authority and discover its aliases
    ///
    /// Only AAD authorities are validated; every other type returns
    /// immediately without network activity.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthorityError::InvalidInstance`] when the authority is
    /// rejected by instance discovery, and the other errors of
    /// [`Self::metadata_entry`].
    pub async fn run_instance_discovery_and_validation(&self, ctx: &RequestContext) -> Result<()> {
        if !self.authority.authority_type().supports_instance_discovery() {
            debug!(
                correlation_id = %ctx.correlation_id,
                "No instance validation for {:?} authority {}",
                self.authority.authority_type(),
                self.authority
            );
            return Ok(());
        }

        self.metadata_entry(ctx).await.map(|_| ())
    }

    /// Resolved metadata entry, running discovery on first use
    ///
    /// Failed resolutions are not remembered; the next call tries again.
    ///
    /// # Errors
    ///
    /// Returns the errors of
    /// [`InstanceDiscoveryManager::get_metadata_entry`].
    pub async fn metadata_entry(
        &self,
        ctx: &RequestContext,
    ) -> Result<Arc<InstanceDiscoveryMetadataEntry>> {
        self.metadata_entry_with_aliases(&[], ctx).await
    }

    /// Resolved metadata entry, consulting the known clouds before the network
    ///
    /// `known_environment_aliases` are hosts the caller already holds tokens
    /// for. When they are non-empty and all belong to the known cloud of the
    /// authority host, that cloud's entry is used without a discovery call.
    ///
    /// # Errors
    ///
    /// Returns the errors of
    /// [`InstanceDiscoveryManager::get_metadata_entry`].
    pub async fn metadata_entry_with_aliases(
        &self,
        known_environment_aliases: &[String],
        ctx: &RequestContext,
    ) -> Result<Arc<InstanceDiscoveryMetadataEntry>> {
        self.resolved
            .get_or_try_init(|| {
                self.discovery
                    .get_metadata_entry(&self.authority, known_environment_aliases, ctx)
            })
            .await
            .map(Arc::clone)
    }

    /// Metadata entry without forcing a network call
    ///
    /// Returns the resolved entry if discovery already ran.
    ///
    /// # Errors
    ///
    /// Returns the errors of
    /// [`InstanceDiscoveryManager::get_metadata_entry_try_avoid_network`].
    pub fn metadata_entry_try_avoid_network(
        &self,
        known_environment_aliases: &[String],
        ctx: &RequestContext,
    ) -> Result<Arc<InstanceDiscoveryMetadataEntry>> {
        if let Some(entry) = self.resolved.get() {
            return Ok(Arc::clone(entry));
        }
        self.discovery.get_metadata_entry_try_avoid_network(
            &self.authority,
            known_environment_aliases,
            ctx,
        )
    }

    /// Aliases of the authority host, once resolved
    #[must_use]
    pub fn environment_aliases(&self) -> Option<&[String]> {
        self.resolved.get().map(|entry| entry.aliases())
    }

    /// Host requests should be sent to, once resolved
    #[must_use]
    pub fn preferred_network_host(&self) -> Option<&str> {
        self.resolved.get().map(|entry| entry.preferred_network())
    }

    /// OAuth 2.0 endpoints on the preferred network host
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::metadata_entry`], and
    /// [`crate::AuthorityError::UnsupportedEndpoints`] for generic authorities.
    pub async fn endpoints(&self, ctx: &RequestContext) -> Result<AuthorityEndpoints> {
        let entry = self.metadata_entry(ctx).await?;
        AuthorityEndpoints::for_authority(&self.authority, Some(entry.preferred_network()))
    }
}
