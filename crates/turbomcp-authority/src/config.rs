//! Authority Configuration Types
//!
//! Serializable application settings for an authority, and the HTTP settings
//! of the discovery client.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::authority::{AuthorityInfo, DEFAULT_AUTHORITY};
use crate::discovery::{
    InstanceDiscoveryManager, NetworkCacheMetadataProvider, UserMetadataProvider,
};
use crate::error::{AuthorityError, Result};
use crate::manager::AuthorityManager;

/// Authority settings of a client application
///
/// ```rust
/// use turbomcp_authority::AuthorityConfig;
///
/// let config: AuthorityConfig = serde_json::from_str(
///     r#"{"authority": "https://login.microsoftonline.com/contoso.onmicrosoft.com"}"#,
/// ).unwrap();
/// assert!(config.validate_authority);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityConfig {
    /// Authority URI
    #[serde(default = "default_authority")]
    pub authority: String,

    /// Validate the authority with instance discovery
    #[serde(default = "default_validate_authority")]
    pub validate_authority: bool,

    /// Treat an unrecognized authority as a generic OIDC issuer instead of AAD
    #[serde(default)]
    pub generic_authority: bool,

    /// Replacement for the instance discovery endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_discovery_endpoint: Option<String>,

    /// Instance metadata document used instead of network discovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_discovery_metadata: Option<String>,

    /// HTTP settings of the discovery client
    #[serde(skip)]
    pub http: DiscoveryClientConfig,
}

fn default_authority() -> String {
    DEFAULT_AUTHORITY.to_string()
}

fn default_validate_authority() -> bool {
    true
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            authority: default_authority(),
            validate_authority: default_validate_authority(),
            generic_authority: false,
            instance_discovery_endpoint: None,
            instance_discovery_metadata: None,
            http: DiscoveryClientConfig::default(),
        }
    }
}

impl AuthorityConfig {
    /// Config for `authority` with every other setting at its default
    #[must_use]
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            ..Self::default()
        }
    }

    /// Parse the configured authority
    ///
    /// # Errors
    ///
    /// Returns the construction error of [`AuthorityInfo`].
    pub fn authority_info(&self) -> Result<AuthorityInfo> {
        if self.generic_authority {
            AuthorityInfo::from_generic_authority(&self.authority, self.validate_authority)
        } else {
            AuthorityInfo::from_authority_uri(&self.authority, self.validate_authority)
        }
    }

    /// Validate the settings and create an [`AuthorityManager`]
    ///
    /// Everything is checked before any network activity. `cache` is usually
    /// shared by every manager in the process.
    ///
    /// # Errors
    ///
    /// - authority construction errors (`InvalidUri`, `InsecureAuthority`, ...)
    /// - [`AuthorityError::InvalidUri`] for a malformed discovery endpoint
    /// - [`AuthorityError::InvalidUserInstanceMetadata`] for an unusable
    ///   metadata document
    /// - [`AuthorityError::HttpClient`] if the HTTP client cannot be created
    pub fn build(&self, cache: NetworkCacheMetadataProvider) -> Result<AuthorityManager> {
        let authority = self.authority_info()?;

        let mut builder = InstanceDiscoveryManager::builder()
            .cache(cache)
            .http_config(self.http.clone());

        if let Some(endpoint) = &self.instance_discovery_endpoint {
            let endpoint = Url::parse(endpoint)
                .map_err(|e| AuthorityError::InvalidUri(format!("{endpoint}: {e}")))?;
            builder = builder.discovery_endpoint(endpoint);
        }

        if let Some(document) = &self.instance_discovery_metadata {
            builder = builder.user_metadata(UserMetadataProvider::from_json(document)?);
        }

        Ok(AuthorityManager::new(authority, Arc::new(builder.build()?)))
    }
}

/// HTTP settings of the discovery client
#[derive(Debug, Clone)]
pub struct DiscoveryClientConfig {
    /// Request timeout (default: 10 seconds)
    pub request_timeout: Duration,

    /// Maximum response size in bytes (default: 64KB)
    pub max_response_size: usize,

    /// User agent sent with discovery requests
    pub user_agent: String,
}

impl Default for DiscoveryClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_response_size: 64 * 1024,
            user_agent: format!("turbomcp-authority/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
