//! Authority parsing properties

use proptest::prelude::*;
use turbomcp_authority::{AuthorityError, AuthorityInfo, AuthorityType, canonicalize_authority_uri};

fn authority_uri() -> impl Strategy<Value = String> {
    (
        "[a-zA-Z][a-zA-Z0-9]{0,10}\\.[a-z]{2,6}",
        prop::collection::vec("[a-zA-Z0-9_.-]{1,12}", 0..5),
        any::<bool>(),
        prop::option::of("[a-z]{1,6}=[a-z0-9]{1,6}"),
    )
        .prop_map(|(host, segments, trailing_slash, query)| {
            let mut uri = format!("https://{host}");
            for segment in &segments {
                uri.push('/');
                uri.push_str(segment);
            }
            if trailing_slash {
                uri.push('/');
            }
            if let Some(query) = query {
                uri.push('?');
                uri.push_str(&query);
            }
            uri
        })
}

proptest! {
    #[test]
    fn canonicalization_is_idempotent(uri in authority_uri()) {
        let once = canonicalize_authority_uri(&uri).unwrap();
        let twice = canonicalize_authority_uri(&once).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.ends_with('/'));
        prop_assert!(!once.contains('?'));
        prop_assert_eq!(once.to_lowercase(), once.clone());
    }

    #[test]
    fn canonical_authority_reparses_to_itself(uri in authority_uri(), validate in any::<bool>()) {
        if let Ok(info) = AuthorityInfo::from_authority_uri(&uri, validate) {
            let reparsed = AuthorityInfo::from_authority_uri(info.canonical_authority(), validate)
                .unwrap();
            prop_assert_eq!(reparsed.canonical_authority(), info.canonical_authority());
            prop_assert_eq!(reparsed.authority_type(), info.authority_type());
        }
    }

    #[test]
    fn generic_authorities_keep_only_the_host(uri in authority_uri()) {
        if let Ok(info) = AuthorityInfo::from_generic_authority(&uri, true)
            && info.authority_type() == AuthorityType::Generic
        {
            prop_assert_eq!(info.canonical_authority(), format!("https://{}/", info.host()));
            prop_assert!(info.path_segments().is_empty());
        }
    }
}

#[test]
fn test_rejected_authorities() {
    let cases: &[(&str, &str)] = &[
        ("", "invalid_authority_uri"),
        ("login.microsoftonline.com/common", "invalid_authority_uri"),
        ("http://login.microsoftonline.com/common", "authority_uri_insecure"),
        ("https://login.microsoftonline.com", "authority_uri_invalid_path"),
        ("https://login.microsoftonline.com/tfp/tenant", "b2c_authority_uri_invalid_path"),
        ("https://contoso.b2clogin.com/tenant", "b2c_authority_uri_invalid_path"),
        ("https://dsts.core.windows.net/dstsv2", "dsts_authority_uri_invalid_path"),
    ];

    for (uri, code) in cases {
        let err: AuthorityError = AuthorityInfo::from_authority_uri(uri, true).unwrap_err();
        assert_eq!(err.error_code(), *code, "authority {uri:?}");
        assert!(err.is_configuration_error());
    }
}

#[test]
fn test_classification_table() {
    let cases = [
        (
            "https://login.microsoftonline.com/Contoso.OnMicrosoft.com/oauth2/v2.0/token",
            AuthorityType::Aad,
            "https://login.microsoftonline.com/contoso.onmicrosoft.com/",
        ),
        (
            "https://login.microsoftonline.com/72f988bf-86f1-41af-91ab-2d7cd011db47",
            AuthorityType::Aad,
            "https://login.microsoftonline.com/72f988bf-86f1-41af-91ab-2d7cd011db47/",
        ),
        (
            "https://fs.contoso.com/adfs/oauth2/token",
            AuthorityType::Adfs,
            "https://fs.contoso.com/adfs/",
        ),
        (
            "https://login.microsoftonline.com/tfp/contoso.onmicrosoft.com/B2C_1_SignIn/v2.0",
            AuthorityType::B2C,
            "https://login.microsoftonline.com/tfp/contoso.onmicrosoft.com/b2c_1_signin/",
        ),
        (
            "https://dsts.core.windows.net/dstsv2/common/oauth2",
            AuthorityType::Dsts,
            "https://dsts.core.windows.net/dstsv2/common/",
        ),
    ];

    for (uri, authority_type, canonical) in cases {
        let info = AuthorityInfo::from_authority_uri(uri, true).unwrap();
        assert_eq!(info.authority_type(), authority_type, "authority {uri}");
        assert_eq!(info.canonical_authority(), canonical, "authority {uri}");
    }
}
