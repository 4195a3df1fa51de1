//! # Network Instance Discovery
//!
//! Live `GET /common/discovery/instance` call.
//!
//! The request goes to the authority's own host when that host is a known
//! cloud, and to the public-cloud discovery host otherwise, so an unfamiliar
//! host is always checked against a trusted endpoint. An explicit discovery
//! endpoint overrides both.

use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::provider::NetworkMetadataSource;
use super::types::{InstanceDiscoveryErrorResponse, InstanceDiscoveryResponse};
use crate::authority::{AuthorityEndpoints, AuthorityInfo};
use crate::context::RequestContext;
use crate::http_client::{DiscoveryHttpClient, HttpClientError};

/// Discovery host used for authorities outside the known clouds
pub const DEFAULT_DISCOVERY_HOST: &str = "login.microsoftonline.com";

/// Discovery API version
pub const DISCOVERY_API_VERSION: &str = "1.1";

/// Header carrying the correlation id
pub const CLIENT_REQUEST_ID_HEADER: &str = "client-request-id";

/// Network discovery failures
///
/// Only `InvalidInstance` and `Cancelled` are fatal to the caller; the rest
/// are recovered by the discovery manager.
#[derive(Debug, Error)]
pub enum NetworkDiscoveryError {
    /// The discovery endpoint says the authority is not a real identity endpoint
    #[error("invalid_instance: {description}")]
    InvalidInstance {
        /// Server-provided description
        description: String,
    },

    /// The caller cancelled the request
    #[error("Instance discovery request was cancelled")]
    Cancelled,

    /// Transport failure
    #[error("Instance discovery transport failure: {0}")]
    Http(#[from] HttpClientError),

    /// Non-success status other than `invalid_instance`
    #[error("Instance discovery returned HTTP {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status
        status: u16,
        /// Response body, lossily decoded
        body: String,
    },

    /// Body could not be parsed
    #[error("Invalid instance discovery response: {0}")]
    InvalidJson(String),

    /// The authority has no authorization endpoint to validate
    #[error("Cannot build discovery request: {0}")]
    InvalidRequest(String),
}

/// Live instance discovery over HTTP
#[derive(Debug, Clone)]
pub struct NetworkMetadataProvider {
    http_client: Arc<dyn DiscoveryHttpClient>,
    discovery_endpoint: Option<Url>,
}

impl NetworkMetadataProvider {
    /// Create a provider using the default discovery hosts
    pub fn new(http_client: Arc<dyn DiscoveryHttpClient>) -> Self {
        Self {
            http_client,
            discovery_endpoint: None,
        }
    }

    /// Send every discovery request to `endpoint` instead
    #[must_use]
    pub fn with_discovery_endpoint(mut self, endpoint: Url) -> Self {
        self.discovery_endpoint = Some(endpoint);
        self
    }

    /// Build the discovery URL for `authority`
    ///
    /// `{discovery_host}/common/discovery/instance?api-version=1.1&authorization_endpoint=...`
    ///
    /// # Errors
    ///
    /// Returns [`NetworkDiscoveryError::InvalidRequest`] if the authority has no
    /// locally derivable authorization endpoint.
    pub fn build_discovery_url(
        &self,
        authority: &AuthorityInfo,
    ) -> Result<Url, NetworkDiscoveryError> {
        let authorization_endpoint = AuthorityEndpoints::for_authority(authority, None)
            .map_err(|e| NetworkDiscoveryError::InvalidRequest(e.to_string()))?
            .authorization_endpoint;

        let mut url = match &self.discovery_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => {
                let host = if authority.is_known_to_developer() {
                    authority.host()
                } else {
                    DEFAULT_DISCOVERY_HOST
                };
                Url::parse(&format!("https://{host}/common/discovery/instance"))
                    .map_err(|e| NetworkDiscoveryError::InvalidRequest(e.to_string()))?
            }
        };

        url.query_pairs_mut()
            .append_pair("api-version", DISCOVERY_API_VERSION)
            .append_pair("authorization_endpoint", &authorization_endpoint);
        Ok(url)
    }

    fn parse_response(
        status: StatusCode,
        body: &[u8],
    ) -> Result<InstanceDiscoveryResponse, NetworkDiscoveryError> {
        if status.is_success() {
            return serde_json::from_slice(body)
                .map_err(|e| NetworkDiscoveryError::InvalidJson(e.to_string()));
        }

        if status == StatusCode::BAD_REQUEST
            && let Ok(error) = serde_json::from_slice::<InstanceDiscoveryErrorResponse>(body)
            && error.is_invalid_instance()
        {
            return Err(NetworkDiscoveryError::InvalidInstance {
                description: error.error_description.unwrap_or(error.error),
            });
        }

        Err(NetworkDiscoveryError::UnexpectedStatus {
            status: status.as_u16(),
            body: String::from_utf8_lossy(body).into_owned(),
        })
    }
}

#[async_trait]
impl NetworkMetadataSource for NetworkMetadataProvider {
    async fn fetch_metadata(
        &self,
        authority: &AuthorityInfo,
        ctx: &RequestContext,
    ) -> Result<InstanceDiscoveryResponse, NetworkDiscoveryError> {
        let url = self.build_discovery_url(authority)?;
        debug!(
            correlation_id = %ctx.correlation_id,
            "Running instance discovery: {}",
            url
        );

        let headers = [(CLIENT_REQUEST_ID_HEADER, ctx.correlation_id.to_string())];
        let response = tokio::select! {
            biased;
            () = ctx.cancellation_token.cancelled() => {
                return Err(NetworkDiscoveryError::Cancelled);
            }
            response = self.http_client.get(&url, &headers) => response?,
        };

        let result = Self::parse_response(response.status, &response.body);
        if let Err(NetworkDiscoveryError::InvalidInstance { description }) = &result {
            warn!(
                correlation_id = %ctx.correlation_id,
                "Instance discovery rejected {}: {}",
                authority.host(),
                description
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiscoveryClientConfig;
    use crate::http_client::ReqwestDiscoveryClient;

    fn provider() -> NetworkMetadataProvider {
        let client = ReqwestDiscoveryClient::new(&DiscoveryClientConfig::default()).unwrap();
        NetworkMetadataProvider::new(Arc::new(client))
    }

    #[test]
    fn test_known_host_discovers_on_itself() {
        let authority =
            AuthorityInfo::from_authority_uri("https://login.microsoftonline.us/contoso.com", true)
                .unwrap();
        let url = provider().build_discovery_url(&authority).unwrap();

        assert_eq!(url.host_str(), Some("login.microsoftonline.us"));
        assert_eq!(url.path(), "/common/discovery/instance");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            query,
            vec![
                ("api-version".to_string(), "1.1".to_string()),
                (
                    "authorization_endpoint".to_string(),
                    "https://login.microsoftonline.us/contoso.com/oauth2/v2.0/authorize"
                        .to_string()
                ),
            ]
        );
        assert!(url.as_str().contains("authorization_endpoint=https%3A%2F%2F"));
    }

    #[test]
    fn test_unknown_host_discovers_on_default_host() {
        let authority =
            AuthorityInfo::from_authority_uri("https://login.contoso.net/tenant", true).unwrap();
        let url = provider().build_discovery_url(&authority).unwrap();
        assert_eq!(url.host_str(), Some(DEFAULT_DISCOVERY_HOST));
    }

    #[test]
    fn test_discovery_endpoint_override() {
        let authority =
            AuthorityInfo::from_authority_uri("https://login.microsoftonline.com/common", true)
                .unwrap();
        let provider = provider().with_discovery_endpoint(
            Url::parse("https://discovery.contoso.com/instance").unwrap(),
        );
        let url = provider.build_discovery_url(&authority).unwrap();
        assert_eq!(url.host_str(), Some("discovery.contoso.com"));
        assert_eq!(url.path(), "/instance");
    }

    #[test]
    fn test_response_classification() {
        let ok = br#"{"metadata": [{"preferred_network": "a.com", "preferred_cache": "a.com", "aliases": ["a.com"]}]}"#;
        assert!(NetworkMetadataProvider::parse_response(StatusCode::OK, ok).is_ok());

        let invalid = br#"{"error": "invalid_instance", "error_description": "AADSTS50049"}"#;
        assert!(matches!(
            NetworkMetadataProvider::parse_response(StatusCode::BAD_REQUEST, invalid),
            Err(NetworkDiscoveryError::InvalidInstance { description }) if description == "AADSTS50049"
        ));

        let other = br#"{"error": "invalid_request"}"#;
        assert!(matches!(
            NetworkMetadataProvider::parse_response(StatusCode::BAD_REQUEST, other),
            Err(NetworkDiscoveryError::UnexpectedStatus { status: 400, .. })
        ));

        assert!(matches!(
            NetworkMetadataProvider::parse_response(StatusCode::INTERNAL_SERVER_ERROR, b""),
            Err(NetworkDiscoveryError::UnexpectedStatus { status: 500, .. })
        ));

        assert!(matches!(
            NetworkMetadataProvider::parse_response(StatusCode::OK, b"<html>"),
            Err(NetworkDiscoveryError::InvalidJson(_))
        ));
    }
}
