//! # Instance Discovery Types
//!
//! Wire and value types shared by every metadata provider.

use serde::{Deserialize, Serialize};

/// `error` value returned when the authority is not a trusted identity endpoint
pub const INVALID_INSTANCE_ERROR: &str = "invalid_instance";

/// Hostnames considered equivalent to one authority host
///
/// `aliases` always contains `preferred_network` and `preferred_cache`. Hosts
/// are stored lower-cased. Values are immutable and shared behind `Arc` once
/// cached.
///
/// ## Example
///
/// ```json
/// {
///   "preferred_network": "login.microsoftonline.com",
///   "preferred_cache": "login.windows.net",
///   "aliases": ["login.microsoftonline.com", "login.windows.net", "login.microsoft.com", "sts.windows.net"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MetadataEntryDocument")]
pub struct InstanceDiscoveryMetadataEntry {
    preferred_network: String,
    preferred_cache: String,
    aliases: Vec<String>,
}

impl InstanceDiscoveryMetadataEntry {
    /// Create an entry, normalizing host case and alias membership
    pub fn new<I, S>(
        preferred_network: impl Into<String>,
        preferred_cache: impl Into<String>,
        aliases: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let preferred_network = preferred_network.into().trim().to_lowercase();
        let preferred_cache = match preferred_cache.into().trim().to_lowercase() {
            cache if cache.is_empty() => preferred_network.clone(),
            cache => cache,
        };

        let mut normalized: Vec<String> = Vec::new();
        let candidates = aliases
            .into_iter()
            .map(|alias| alias.into().trim().to_lowercase())
            .chain([preferred_network.clone(), preferred_cache.clone()]);
        for alias in candidates {
            if !alias.is_empty() && !normalized.contains(&alias) {
                normalized.push(alias);
            }
        }

        Self {
            preferred_network,
            preferred_cache,
            aliases: normalized,
        }
    }

    /// Self-referential entry: the host is its own only alias
    pub fn for_single_host(host: &str) -> Self {
        Self::new(host, host, [host])
    }

    /// Host for token, authorize and device-code requests
    #[must_use]
    pub fn preferred_network(&self) -> &str {
        &self.preferred_network
    }

    /// Host used as the token-cache partition key
    #[must_use]
    pub fn preferred_cache(&self) -> &str {
        &self.preferred_cache
    }

    /// All equivalent hosts
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Whether `host` is one of the aliases
    #[must_use]
    pub fn contains_alias(&self, host: &str) -> bool {
        self.aliases
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(host))
    }
}

/// Raw wire shape of a metadata entry, before normalization
#[derive(Debug, Clone, Deserialize)]
struct MetadataEntryDocument {
    #[serde(default)]
    preferred_network: String,
    #[serde(default)]
    preferred_cache: String,
    #[serde(default)]
    aliases: Vec<String>,
}

impl TryFrom<MetadataEntryDocument> for InstanceDiscoveryMetadataEntry {
    type Error = String;

    fn try_from(document: MetadataEntryDocument) -> Result<Self, Self::Error> {
        let preferred_network = if document.preferred_network.trim().is_empty() {
            document
                .aliases
                .iter()
                .find(|alias| !alias.trim().is_empty())
                .cloned()
                .ok_or_else(|| {
                    "metadata entry has neither preferred_network nor aliases".to_string()
                })?
        } else {
            document.preferred_network
        };

        Ok(Self::new(
            preferred_network,
            document.preferred_cache,
            document.aliases,
        ))
    }
}

/// Instance discovery document
///
/// Returned by `GET /common/discovery/instance` and also accepted as the
/// user-supplied metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDiscoveryResponse {
    /// OpenID configuration endpoint of the tenant being discovered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_discovery_endpoint: Option<String>,

    /// Alias groups known to the discovery endpoint
    #[serde(default)]
    pub metadata: Vec<InstanceDiscoveryMetadataEntry>,
}

impl InstanceDiscoveryResponse {
    /// Entry whose aliases include `host`
    #[must_use]
    pub fn find_entry(&self, host: &str) -> Option<&InstanceDiscoveryMetadataEntry> {
        self.metadata.iter().find(|entry| entry.contains_alias(host))
    }
}

/// OAuth 2.0 error body of a failed discovery call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDiscoveryErrorResponse {
    /// Error code, e.g. `invalid_instance`
    pub error: String,

    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    /// Numeric server error codes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_codes: Option<Vec<i64>>,

    /// Server-side correlation id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl InstanceDiscoveryErrorResponse {
    /// Whether the server classified the authority as `invalid_instance`
    #[must_use]
    pub fn is_invalid_instance(&self) -> bool {
        self.error == INVALID_INSTANCE_ERROR
    }
}
