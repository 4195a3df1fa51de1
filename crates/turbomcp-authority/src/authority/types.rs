//! Authority classification types

use serde::{Deserialize, Serialize};

use crate::error::{AuthorityError, Result};

/// Tenant segment addressing both work/school and personal accounts
pub const COMMON_TENANT: &str = "common";
/// Tenant segment addressing any work/school account
pub const ORGANIZATIONS_TENANT: &str = "organizations";
/// Tenant segment addressing personal accounts only
pub const CONSUMERS_TENANT: &str = "consumers";

/// Meta-tenants: path segments that do not identify one specific tenant
pub const META_TENANTS: [&str; 3] = [COMMON_TENANT, ORGANIZATIONS_TENANT, CONSUMERS_TENANT];

/// First path segment of a B2C policy authority
pub const B2C_PREFIX: &str = "tfp";
/// First path segment of an ADFS authority
pub const ADFS_PREFIX: &str = "adfs";
/// First path segment of a dSTS authority
pub const DSTS_PREFIX: &str = "dstsv2";

/// Host suffixes served by B2C custom login domains
pub(crate) const B2C_HOST_SUFFIXES: [&str; 4] = [
    ".b2clogin.com",
    ".b2clogin.cn",
    ".b2clogin.us",
    ".b2clogin.de",
];

/// Kind of identity endpoint an authority points at
///
/// Determined once from the shape of the authority URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorityType {
    /// Entra ID (Azure AD) tenant or multi-tenant directory
    Aad,
    /// Active Directory Federation Services
    Adfs,
    /// Policy-based consumer directory
    B2C,
    /// Distributed security token service
    Dsts,
    /// Any OpenID Connect compliant issuer
    Generic,
}

impl AuthorityType {
    /// Whether instance discovery applies to this kind of authority
    #[must_use]
    pub fn supports_instance_discovery(self) -> bool {
        match self {
            Self::Aad => true,
            Self::Adfs | Self::B2C | Self::Dsts | Self::Generic => false,
        }
    }

    /// Number of path segments kept in the canonical authority
    #[must_use]
    pub(crate) fn canonical_segment_count(self) -> usize {
        match self {
            Self::B2C => 3,
            Self::Dsts => 2,
            Self::Aad | Self::Adfs => 1,
            Self::Generic => 0,
        }
    }
}

/// Public and sovereign cloud login instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AzureCloudInstance {
    /// Public cloud
    AzurePublic,
    /// China (21Vianet)
    AzureChina,
    /// Germany
    AzureGermany,
    /// US Government
    AzureUsGovernment,
}

impl AzureCloudInstance {
    /// Base login URL of the cloud, without trailing slash
    #[must_use]
    pub fn cloud_url(self) -> &'static str {
        match self {
            Self::AzurePublic => "https://login.microsoftonline.com",
            Self::AzureChina => "https://login.chinacloudapi.cn",
            Self::AzureGermany => "https://login.microsoftonline.de",
            Self::AzureUsGovernment => "https://login.microsoftonline.us",
        }
    }
}

/// Which accounts an AAD authority signs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AadAuthorityAudience {
    /// A single tenant, which must be supplied
    AzureAdMyOrg,
    /// Any work or school account
    AzureAdMultipleOrgs,
    /// Work, school and personal accounts
    AzureAdAndPersonalMicrosoftAccount,
    /// Personal accounts only
    PersonalMicrosoftAccount,
}

impl AadAuthorityAudience {
    /// Tenant path segment for this audience
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::AzureAdMyOrgRequiresTenant`] when the audience is
    /// `AzureAdMyOrg` and `tenant` is missing or blank.
    pub fn tenant_segment(self, tenant: Option<&str>) -> Result<String> {
        match self {
            Self::AzureAdAndPersonalMicrosoftAccount => Ok(COMMON_TENANT.to_string()),
            Self::AzureAdMultipleOrgs => Ok(ORGANIZATIONS_TENANT.to_string()),
            Self::PersonalMicrosoftAccount => Ok(CONSUMERS_TENANT.to_string()),
            Self::AzureAdMyOrg => match tenant.map(str::trim) {
                Some(tenant) if !tenant.is_empty() => Ok(tenant.to_string()),
                _ => Err(AuthorityError::AzureAdMyOrgRequiresTenant),
            },
        }
    }
}

/// Whether a tenant path segment is one of the meta-tenants
#[must_use]
pub fn is_meta_tenant(segment: &str) -> bool {
    META_TENANTS
        .iter()
        .any(|meta| meta.eq_ignore_ascii_case(segment))
}
