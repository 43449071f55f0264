use crate::checks::credentials::sp_certs_sufficient;
use crate::checks::required::check_required;
use crate::model::contact::Contact;
use crate::model::settings::Saml2Settings;
use crate::result::SettingsErrorCode;

/// Validate the Service Provider side of the settings.
///
/// Every rule runs; codes come back in rule order and a code may repeat
/// once per offending contact.
pub fn validate_sp_settings(settings: &Saml2Settings) -> Vec<SettingsErrorCode> {
    let mut errors = Vec::new();
    let sp = settings.sp();

    if !check_required(&sp.entity_id) {
        errors.push(SettingsErrorCode::SpEntityIdNotFound);
    }

    if !check_required(&sp.assertion_consumer_service_url) {
        errors.push(SettingsErrorCode::SpAcsNotFound);
    }

    if sp.hsm.is_none()
        && settings.security().requires_sp_credentials()
        && !sp_certs_sufficient(settings)
    {
        errors.push(SettingsErrorCode::SpCertNotFoundAndRequired);
    }

    for contact in settings.contacts() {
        if contact.kind().is_none() {
            errors.push(SettingsErrorCode::ContactTypeInvalid);
        }
        if !has_identifying_data(contact) {
            errors.push(SettingsErrorCode::ContactNotEnoughData);
        }
    }

    if let Some(org) = settings.organization() {
        if !check_required(&org.display_name)
            || !check_required(&org.name)
            || !check_required(&org.url)
        {
            errors.push(SettingsErrorCode::OrganizationNotEnoughData);
        }
    }

    if sp.hsm.is_some() && sp.private_key.is_some() {
        errors.push(SettingsErrorCode::UseEitherHsmOrPrivateKey);
    }

    for code in &errors {
        tracing::error!(code = code.as_str(), "SP settings check failed");
    }
    errors
}

/// A contact needs at least one non-empty email, telephone, company or name.
fn has_identifying_data(contact: &Contact) -> bool {
    contact.email_addresses.iter().any(|e| check_required(e))
        || contact.telephone_numbers.iter().any(|t| check_required(t))
        || check_required(&contact.company)
        || check_required(&contact.given_name)
        || check_required(&contact.sur_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::contact::Organization;
    use crate::model::credentials::{Certificate, HsmRef, PrivateKey};
    use crate::model::settings::{SecurityFlags, ServiceProvider};
    use proptest::prelude::*;
    use url::Url;

    fn acs() -> Option<Url> {
        Url::parse("https://sp.example.org/acs").ok()
    }

    fn valid_sp() -> ServiceProvider {
        ServiceProvider {
            entity_id: "https://sp.example.org/metadata".to_string(),
            assertion_consumer_service_url: acs(),
            ..ServiceProvider::default()
        }
    }

    fn cert() -> Certificate {
        Certificate::from_der(vec![0x30, 0x00])
    }

    fn key() -> PrivateKey {
        PrivateKey::from_der("PRIVATE KEY", vec![0x30, 0x00])
    }

    #[test]
    fn minimal_sp_is_valid() {
        let settings = Saml2Settings::builder().service_provider(valid_sp()).build();
        assert!(validate_sp_settings(&settings).is_empty());
    }

    #[test]
    fn missing_entity_id_and_acs() {
        let settings = Saml2Settings::builder().build();
        assert_eq!(
            validate_sp_settings(&settings),
            vec![
                SettingsErrorCode::SpEntityIdNotFound,
                SettingsErrorCode::SpAcsNotFound
            ]
        );
    }

    #[test]
    fn signing_without_credentials_requires_cert() {
        for flags in [
            SecurityFlags { authn_requests_signed: true, ..SecurityFlags::default() },
            SecurityFlags { logout_request_signed: true, ..SecurityFlags::default() },
            SecurityFlags { logout_response_signed: true, ..SecurityFlags::default() },
            SecurityFlags { want_assertions_encrypted: true, ..SecurityFlags::default() },
            SecurityFlags { want_name_id_encrypted: true, ..SecurityFlags::default() },
        ] {
            let settings = Saml2Settings::builder()
                .service_provider(valid_sp())
                .security(flags)
                .build();
            assert_eq!(
                validate_sp_settings(&settings),
                vec![SettingsErrorCode::SpCertNotFoundAndRequired]
            );
        }
    }

    #[test]
    fn signing_with_cert_and_key_is_fine() {
        let settings = Saml2Settings::builder()
            .service_provider(ServiceProvider {
                x509cert: Some(cert()),
                private_key: Some(key()),
                ..valid_sp()
            })
            .security(SecurityFlags {
                authn_requests_signed: true,
                want_assertions_encrypted: true,
                ..SecurityFlags::default()
            })
            .build();
        assert!(validate_sp_settings(&settings).is_empty());
    }

    #[test]
    fn hsm_excuses_missing_key_material() {
        let settings = Saml2Settings::builder()
            .service_provider(ServiceProvider {
                hsm: Some(HsmRef::new("sp-signing")),
                ..valid_sp()
            })
            .security(SecurityFlags {
                authn_requests_signed: true,
                ..SecurityFlags::default()
            })
            .build();
        assert!(validate_sp_settings(&settings).is_empty());
    }

    #[test]
    fn want_signed_flags_do_not_require_sp_cert() {
        let settings = Saml2Settings::builder()
            .service_provider(valid_sp())
            .security(SecurityFlags {
                want_assertions_signed: true,
                want_messages_signed: true,
                sign_metadata: true,
                ..SecurityFlags::default()
            })
            .build();
        assert!(validate_sp_settings(&settings).is_empty());
    }

    #[test]
    fn hsm_and_private_key_conflict() {
        let settings = Saml2Settings::builder()
            .service_provider(ServiceProvider {
                hsm: Some(HsmRef::new("sp-signing")),
                private_key: Some(key()),
                ..valid_sp()
            })
            .build();
        assert_eq!(
            validate_sp_settings(&settings),
            vec![SettingsErrorCode::UseEitherHsmOrPrivateKey]
        );
    }

    #[test]
    fn contact_checks() {
        let bogus = Saml2Settings::builder()
            .service_provider(valid_sp())
            .contact(Contact::new("bogus").with_company("Example Inc."))
            .build();
        assert_eq!(
            validate_sp_settings(&bogus),
            vec![SettingsErrorCode::ContactTypeInvalid]
        );

        let empty = Saml2Settings::builder()
            .service_provider(valid_sp())
            .contact(Contact::new("technical").with_email("").with_telephone(""))
            .build();
        assert_eq!(
            validate_sp_settings(&empty),
            vec![SettingsErrorCode::ContactNotEnoughData]
        );

        let good = Saml2Settings::builder()
            .service_provider(valid_sp())
            .contact(Contact::new("technical").with_company("Example Inc."))
            .build();
        assert!(validate_sp_settings(&good).is_empty());
    }

    #[test]
    fn contact_codes_repeat_per_contact() {
        let settings = Saml2Settings::builder()
            .service_provider(valid_sp())
            .contact(Contact::new("bogus"))
            .contact(Contact::new("support").with_email("help@example.org"))
            .contact(Contact::new(""))
            .build();
        assert_eq!(
            validate_sp_settings(&settings),
            vec![
                SettingsErrorCode::ContactTypeInvalid,
                SettingsErrorCode::ContactNotEnoughData,
                SettingsErrorCode::ContactTypeInvalid,
                SettingsErrorCode::ContactNotEnoughData,
            ]
        );
    }

    #[test]
    fn any_single_identifying_field_is_enough() {
        let contacts = [
            Contact::new("other").with_email("a@example.org"),
            Contact::new("other").with_telephone("+1 555 0100"),
            Contact::new("other").with_name("Ada", ""),
            Contact::new("other").with_name("", "Lovelace"),
        ];
        for contact in contacts {
            let settings = Saml2Settings::builder()
                .service_provider(valid_sp())
                .contact(contact)
                .build();
            assert!(validate_sp_settings(&settings).is_empty());
        }
    }

    #[test]
    fn organization_needs_all_three_fields() {
        let partial = Saml2Settings::builder()
            .service_provider(valid_sp())
            .organization(Organization::new("Example", "", "https://example.org"))
            .build();
        assert_eq!(
            validate_sp_settings(&partial),
            vec![SettingsErrorCode::OrganizationNotEnoughData]
        );

        let complete = Saml2Settings::builder()
            .service_provider(valid_sp())
            .organization(Organization::new("Example", "Example Inc.", "https://example.org"))
            .build();
        assert!(validate_sp_settings(&complete).is_empty());
    }

    #[test]
    fn all_rules_run_in_order() {
        let settings = Saml2Settings::builder()
            .service_provider(ServiceProvider {
                hsm: Some(HsmRef::new("sp-signing")),
                private_key: Some(key()),
                ..ServiceProvider::default()
            })
            .contact(Contact::new("bogus"))
            .organization(Organization::default())
            .build();
        assert_eq!(
            validate_sp_settings(&settings),
            vec![
                SettingsErrorCode::SpEntityIdNotFound,
                SettingsErrorCode::SpAcsNotFound,
                SettingsErrorCode::ContactTypeInvalid,
                SettingsErrorCode::ContactNotEnoughData,
                SettingsErrorCode::OrganizationNotEnoughData,
                SettingsErrorCode::UseEitherHsmOrPrivateKey,
            ]
        );
    }

    fn arb_security() -> impl Strategy<Value = SecurityFlags> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(authn, logout_req, logout_resp, want_enc, want_nameid_enc)| SecurityFlags {
                authn_requests_signed: authn,
                logout_request_signed: logout_req,
                logout_response_signed: logout_resp,
                want_assertions_encrypted: want_enc,
                want_name_id_encrypted: want_nameid_enc,
                ..SecurityFlags::default()
            },
        )
    }

    fn arb_sp() -> impl Strategy<Value = ServiceProvider> {
        (
            "[a-z:/.]{0,12}",
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(entity_id, with_acs, with_cert, with_key, with_hsm)| ServiceProvider {
                entity_id,
                assertion_consumer_service_url: if with_acs { acs() } else { None },
                x509cert: with_cert.then(cert),
                private_key: with_key.then(key),
                hsm: with_hsm.then(|| HsmRef::new("hsm")),
                ..ServiceProvider::default()
            })
    }

    proptest! {
        #[test]
        fn empty_entity_id_always_reported(sp in arb_sp(), flags in arb_security()) {
            let settings = Saml2Settings::builder()
                .service_provider(ServiceProvider { entity_id: String::new(), ..sp })
                .security(flags)
                .build();
            prop_assert!(validate_sp_settings(&settings).contains(&SettingsErrorCode::SpEntityIdNotFound));
        }

        #[test]
        fn signed_authn_without_pair_reports_cert(sp in arb_sp(), flags in arb_security()) {
            let sp = ServiceProvider { hsm: None, ..sp };
            let pair = sp.x509cert.is_some() && sp.private_key.is_some();
            let settings = Saml2Settings::builder()
                .service_provider(sp)
                .security(SecurityFlags { authn_requests_signed: true, ..flags })
                .build();
            let errors = validate_sp_settings(&settings);
            prop_assert_eq!(errors.contains(&SettingsErrorCode::SpCertNotFoundAndRequired), !pair);
        }

        #[test]
        fn hsm_plus_key_always_conflicts(sp in arb_sp(), flags in arb_security()) {
            let settings = Saml2Settings::builder()
                .service_provider(ServiceProvider {
                    hsm: Some(HsmRef::new("hsm")),
                    private_key: Some(key()),
                    ..sp
                })
                .security(flags)
                .build();
            prop_assert!(validate_sp_settings(&settings).contains(&SettingsErrorCode::UseEitherHsmOrPrivateKey));
        }

        #[test]
        fn validation_is_idempotent(sp in arb_sp(), flags in arb_security()) {
            let settings = Saml2Settings::builder()
                .service_provider(sp)
                .security(flags)
                .contact(Contact::new("bogus"))
                .build();
            prop_assert_eq!(validate_sp_settings(&settings), validate_sp_settings(&settings));
        }
    }
}
