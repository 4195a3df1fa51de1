//! Authority Errors
//!
//! Error taxonomy for authority construction and instance discovery.
//!
//! Construction errors (`InvalidUri`, `InsecureAuthority`, the path errors) are
//! raised synchronously while an authority is configured. Discovery errors that
//! reach the caller are limited to `InvalidUserInstanceMetadata`,
//! `InvalidInstance` and `Cancelled`; every other network failure is recovered
//! inside [`crate::discovery::InstanceDiscoveryManager`].

use thiserror::Error;

use crate::authority::AuthorityType;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AuthorityError>;

/// Authority resolution errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorityError {
    /// The authority is empty, relative or not a well-formed URI
    #[error(
        "The authority (including the tenant ID) must be in a well-formed URI format: {0}"
    )]
    InvalidUri(String),

    /// The authority does not use the https scheme
    #[error("The authority must use HTTPS scheme: {0}")]
    InsecureAuthority(String),

    /// The authority has no path segment
    #[error(
        "The authority URI should have at least one segment in the path (i.e. https://<host>/<path>/...): {0}"
    )]
    InvalidAuthorityPath(String),

    /// A B2C authority with fewer than three path segments
    #[error(
        "The B2C authority URI should have at least 3 segments in the path (i.e. https://<host>/tfp/<tenant>/<policy>/...): {0}"
    )]
    B2cAuthorityUriInvalidPath(String),

    /// A dSTS authority with fewer than two path segments
    #[error(
        "The DSTS authority URI should have at least 2 segments in the path (i.e. https://<host>/dstsv2/<tenant>/...): {0}"
    )]
    DstsAuthorityUriInvalidPath(String),

    /// `AzureAdMyOrg` audience used without a tenant
    #[error("AzureAdMyOrg audience requires a tenant to be specified")]
    AzureAdMyOrgRequiresTenant,

    /// The user-supplied instance metadata is malformed or does not cover a host
    #[error("The json containing instance metadata could not be used: {0}")]
    InvalidUserInstanceMetadata(String),

    /// Instance discovery returned `invalid_instance`: the host is not a trusted authority
    #[error("Authority validation failed for {host}: {description}")]
    InvalidInstance {
        /// Host that failed validation
        host: String,
        /// Server-provided error description
        description: String,
    },

    /// The caller cancelled the discovery request
    #[error("Instance discovery for {0} was cancelled")]
    Cancelled(String),

    /// Endpoints for this authority type cannot be derived locally
    #[error("Endpoints for {0:?} authorities must be read from the OpenID configuration document")]
    UnsupportedEndpoints(AuthorityType),

    /// The discovery HTTP client could not be created
    #[error("Failed to create discovery HTTP client: {0}")]
    HttpClient(String),
}

impl AuthorityError {
    /// Stable machine-readable error code
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUri(_) => "invalid_authority_uri",
            Self::InsecureAuthority(_) => "authority_uri_insecure",
            Self::InvalidAuthorityPath(_) => "authority_uri_invalid_path",
            Self::B2cAuthorityUriInvalidPath(_) => "b2c_authority_uri_invalid_path",
            Self::DstsAuthorityUriInvalidPath(_) => "dsts_authority_uri_invalid_path",
            Self::AzureAdMyOrgRequiresTenant => "azure_ad_my_org_requires_tenant",
            Self::InvalidUserInstanceMetadata(_) => "invalid-custom-instance-metadata",
            Self::InvalidInstance { .. } => "invalid_instance",
            Self::Cancelled(_) => "operation_cancelled",
            Self::UnsupportedEndpoints(_) => "unsupported_authority_endpoints",
            Self::HttpClient(_) => "http_client_error",
        }
    }

    /// Whether this error was raised while parsing the authority URI
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidUri(_)
                | Self::InsecureAuthority(_)
                | Self::InvalidAuthorityPath(_)
                | Self::B2cAuthorityUriInvalidPath(_)
                | Self::DstsAuthorityUriInvalidPath(_)
                | Self::AzureAdMyOrgRequiresTenant
                | Self::InvalidUserInstanceMetadata(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AuthorityError::InvalidInstance {
            host: "example.com".to_string(),
            description: "not trusted".to_string(),
        };
        assert_eq!(err.error_code(), "invalid_instance");
        assert!(!err.is_configuration_error());

        let err = AuthorityError::InvalidUserInstanceMetadata("empty".to_string());
        assert_eq!(err.error_code(), "invalid-custom-instance-metadata");
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_error_display() {
        let err = AuthorityError::B2cAuthorityUriInvalidPath("https://x/tfp/a/".to_string());
        assert!(err.to_string().contains("at least 3 segments"));

        let err = AuthorityError::Cancelled("login.microsoftonline.com".to_string());
        assert!(err.to_string().contains("cancelled"));
    }
}
