//! # Instance Discovery Manager
//!
//! Resolves the alias set of an authority host by consulting metadata sources
//! in a fixed order. The first source that answers wins; answers are never
//! merged.
//!
//! ## Resolution order
//!
//! 1. Authorities that are not validated, or are not AAD, skip discovery and
//!    resolve to a single-host entry.
//! 2. User-supplied metadata, when configured. A host it does not cover is an
//!    error.
//! 3. The shared network cache.
//! 4. The static table of known clouds, when the caller passed alias hints.
//! 5. Live network discovery. Results are cached under every alias.
//!    `invalid_instance` and cancellation are returned to the caller; any other
//!    failure falls back to the static table and then to a single-host entry.
//!
//! [`InstanceDiscoveryManager::get_metadata_entry_try_avoid_network`] runs the
//! same chain without step 5.

use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use super::cache::NetworkCacheMetadataProvider;
use super::known::KnownMetadataProvider;
use super::network::{NetworkDiscoveryError, NetworkMetadataProvider};
use super::provider::{MetadataProvider, NetworkMetadataSource};
use super::types::{InstanceDiscoveryMetadataEntry, InstanceDiscoveryResponse};
use super::user::UserMetadataProvider;
use crate::authority::AuthorityInfo;
use crate::config::DiscoveryClientConfig;
use crate::context::RequestContext;
use crate::error::{AuthorityError, Result};
use crate::http_client::ReqwestDiscoveryClient;

type Entry = Arc<InstanceDiscoveryMetadataEntry>;

/// Orchestrates the metadata providers
#[derive(Debug, Clone)]
pub struct InstanceDiscoveryManager {
    user: Option<Arc<dyn MetadataProvider>>,
    cache: NetworkCacheMetadataProvider,
    known: Arc<dyn MetadataProvider>,
    network: Arc<dyn NetworkMetadataSource>,
}

impl InstanceDiscoveryManager {
    /// Manager with default providers around the given network source
    pub fn new(network: Arc<dyn NetworkMetadataSource>) -> Self {
        Self {
            user: None,
            cache: NetworkCacheMetadataProvider::new(),
            known: Arc::new(KnownMetadataProvider::new()),
            network,
        }
    }

    /// Start building a manager
    #[must_use]
    pub fn builder() -> InstanceDiscoveryManagerBuilder {
        InstanceDiscoveryManagerBuilder::default()
    }

    /// Shared network cache
    #[must_use]
    pub fn cache(&self) -> &NetworkCacheMetadataProvider {
        &self.cache
    }

    /// Whether a user metadata document is configured
    #[must_use]
    pub fn has_user_metadata(&self) -> bool {
        self.user.is_some()
    }

    /// Resolve the metadata entry for `authority`, calling the network if needed
    ///
    /// `known_environment_aliases` are hosts the caller already associates with
    /// this authority.
    ///
    /// # Errors
    ///
    /// - [`AuthorityError::InvalidUserInstanceMetadata`] if user metadata is
    ///   configured and does not cover the host
    /// - [`AuthorityError::InvalidInstance`] if the discovery endpoint rejects
    ///   the authority
    /// - [`AuthorityError::Cancelled`] if `ctx` was cancelled before discovery
    ///   completed
    pub async fn get_metadata_entry(
        &self,
        authority: &AuthorityInfo,
        known_environment_aliases: &[String],
        ctx: &RequestContext,
    ) -> Result<Entry> {
        if let Some(entry) = Self::skip_discovery(authority, ctx) {
            return Ok(entry);
        }

        let host = authority.host();
        if let Some(entry) = self.try_local(host, ctx)? {
            return Ok(entry);
        }

        if !known_environment_aliases.is_empty()
            && let Some(entry) =
                self.try_provider(self.known.as_ref(), host, known_environment_aliases, ctx)?
        {
            return Ok(entry);
        }

        if ctx.is_cancelled() {
            return Err(AuthorityError::Cancelled(host.to_string()));
        }

        match self.network.fetch_metadata(authority, ctx).await {
            Ok(response) => Ok(self.cache_response(host, response, ctx)),
            Err(NetworkDiscoveryError::InvalidInstance { description }) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    "Authority {} failed instance validation: {}",
                    host,
                    description
                );
                Err(AuthorityError::InvalidInstance {
                    host: host.to_string(),
                    description,
                })
            }
            Err(NetworkDiscoveryError::Cancelled) => {
                info!(
                    correlation_id = %ctx.correlation_id,
                    "Instance discovery for {} was cancelled",
                    host
                );
                Err(AuthorityError::Cancelled(host.to_string()))
            }
            Err(e) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    "Instance discovery for {} failed, continuing without it: {}",
                    host,
                    e
                );
                if let Some(entry) = self.try_provider(self.known.as_ref(), host, &[], ctx)? {
                    return Ok(entry);
                }
                Ok(Self::self_entry(host, ctx))
            }
        }
    }

    /// Resolve the metadata entry for `authority` without calling the network
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::InvalidUserInstanceMetadata`] if user metadata
    /// is configured and does not cover the host.
    pub fn get_metadata_entry_try_avoid_network(
        &self,
        authority: &AuthorityInfo,
        known_environment_aliases: &[String],
        ctx: &RequestContext,
    ) -> Result<Entry> {
        if let Some(entry) = Self::skip_discovery(authority, ctx) {
            return Ok(entry);
        }

        let host = authority.host();
        if let Some(entry) = self.try_local(host, ctx)? {
            return Ok(entry);
        }
        if let Some(entry) =
            self.try_provider(self.known.as_ref(), host, known_environment_aliases, ctx)?
        {
            return Ok(entry);
        }
        Ok(Self::self_entry(host, ctx))
    }

    fn skip_discovery(authority: &AuthorityInfo, ctx: &RequestContext) -> Option<Entry> {
        if authority.validate_authority()
            && authority.authority_type().supports_instance_discovery()
        {
            return None;
        }
        debug!(
            correlation_id = %ctx.correlation_id,
            "Skipping instance discovery for {} ({:?}, validate_authority={})",
            authority.host(),
            authority.authority_type(),
            authority.validate_authority()
        );
        Some(Arc::new(InstanceDiscoveryMetadataEntry::for_single_host(
            authority.host(),
        )))
    }

    /// User metadata, then the network cache
    fn try_local(&self, host: &str, ctx: &RequestContext) -> Result<Option<Entry>> {
        if let Some(user) = &self.user {
            return self.try_provider(user.as_ref(), host, &[], ctx);
        }
        self.try_provider(&self.cache, host, &[], ctx)
    }

    fn try_provider(
        &self,
        provider: &dyn MetadataProvider,
        host: &str,
        known_environment_aliases: &[String],
        ctx: &RequestContext,
    ) -> Result<Option<Entry>> {
        let entry = provider.try_get_entry(host, known_environment_aliases)?;
        if let Some(entry) = &entry {
            debug!(
                correlation_id = %ctx.correlation_id,
                "Instance metadata for {} from {} provider (preferred network: {})",
                host,
                provider.name(),
                entry.preferred_network()
            );
        }
        Ok(entry)
    }

    fn cache_response(
        &self,
        host: &str,
        response: InstanceDiscoveryResponse,
        ctx: &RequestContext,
    ) -> Entry {
        let mut found = None;
        for entry in response.metadata {
            let entry = Arc::new(entry);
            self.cache.insert_for_aliases(&entry);
            if found.is_none() && entry.contains_alias(host) {
                found = Some(entry);
            }
        }

        match found {
            Some(entry) => {
                debug!(
                    correlation_id = %ctx.correlation_id,
                    "Instance discovery resolved {} to {}",
                    host,
                    entry.preferred_network()
                );
                entry
            }
            None => {
                let entry = Self::self_entry(host, ctx);
                self.cache.insert(host, Arc::clone(&entry));
                entry
            }
        }
    }

    fn self_entry(host: &str, ctx: &RequestContext) -> Entry {
        debug!(
            correlation_id = %ctx.correlation_id,
            "Using {} as its own only alias",
            host
        );
        Arc::new(InstanceDiscoveryMetadataEntry::for_single_host(host))
    }
}

/// Builder for [`InstanceDiscoveryManager`]
#[derive(Debug, Default)]
pub struct InstanceDiscoveryManagerBuilder {
    user: Option<Arc<dyn MetadataProvider>>,
    cache: Option<NetworkCacheMetadataProvider>,
    known: Option<Arc<dyn MetadataProvider>>,
    network: Option<Arc<dyn NetworkMetadataSource>>,
    discovery_endpoint: Option<Url>,
    http: DiscoveryClientConfig,
}

impl InstanceDiscoveryManagerBuilder {
    /// Use a caller-supplied metadata document instead of discovery
    #[must_use]
    pub fn user_metadata(mut self, provider: UserMetadataProvider) -> Self {
        self.user = Some(Arc::new(provider));
        self
    }

    /// Use a custom provider in the user metadata position
    #[must_use]
    pub fn user_provider(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.user = Some(provider);
        self
    }

    /// Share an existing network cache
    #[must_use]
    pub fn cache(mut self, cache: NetworkCacheMetadataProvider) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the static cloud table
    #[must_use]
    pub fn known_provider(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.known = Some(provider);
        self
    }

    /// Replace the live discovery source
    #[must_use]
    pub fn network(mut self, network: Arc<dyn NetworkMetadataSource>) -> Self {
        self.network = Some(network);
        self
    }

    /// Send discovery requests to a fixed endpoint
    ///
    /// Ignored when a custom network source is set.
    #[must_use]
    pub fn discovery_endpoint(mut self, endpoint: Url) -> Self {
        self.discovery_endpoint = Some(endpoint);
        self
    }

    /// HTTP settings for the default network source
    #[must_use]
    pub fn http_config(mut self, config: DiscoveryClientConfig) -> Self {
        self.http = config;
        self
    }

    /// Build the manager
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::HttpClient`] if the default HTTP client cannot
    /// be created.
    pub fn build(self) -> Result<InstanceDiscoveryManager> {
        let network = match self.network {
            Some(network) => network,
            None => {
                let client = ReqwestDiscoveryClient::new(&self.http)
                    .map_err(|e| AuthorityError::HttpClient(e.to_string()))?;
                let mut provider = NetworkMetadataProvider::new(Arc::new(client));
                if let Some(endpoint) = self.discovery_endpoint {
                    provider = provider.with_discovery_endpoint(endpoint);
                }
                Arc::new(provider)
            }
        };

        Ok(InstanceDiscoveryManager {
            user: self.user,
            cache: self.cache.unwrap_or_default(),
            known: self
                .known
                .unwrap_or_else(|| Arc::new(KnownMetadataProvider::new())),
            network,
        })
    }
}
