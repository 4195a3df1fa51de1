//! # Authorities
//!
//! Classification and canonicalization of authority URIs.
//!
//! - [`AuthorityInfo`]: immutable, canonical view of a configured authority
//! - [`AuthorityType`]: closed set of authority kinds (AAD, ADFS, B2C, dSTS, generic OIDC)
//! - [`AuthorityEndpoints`]: OAuth 2.0 endpoints derived from an authority and a host alias

mod endpoints;
mod info;
mod types;

pub use endpoints::AuthorityEndpoints;
pub use info::{AuthorityInfo, DEFAULT_AUTHORITY, canonicalize_authority_uri};
pub use types::{
    ADFS_PREFIX, AadAuthorityAudience, AuthorityType, AzureCloudInstance, B2C_PREFIX,
    COMMON_TENANT, CONSUMERS_TENANT, DSTS_PREFIX, META_TENANTS, ORGANIZATIONS_TENANT,
    is_meta_tenant,
};
