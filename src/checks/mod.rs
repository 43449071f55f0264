pub mod cert_health;
pub mod credentials;
pub mod idp;
pub mod metadata;
pub mod required;
pub mod schema;
pub mod sp;

use crate::model::settings::Saml2Settings;
use crate::result::{CheckCategory, CheckResult, MetadataIssue, SettingsErrorCode, Severity};
use crate::time::Clock;

pub use cert_health::certificate_report;

pub use idp::validate_idp_settings;
pub use metadata::{validate_metadata_document, validate_metadata_document_with};
pub use sp::validate_sp_settings;

/// SP errors followed by IdP errors. The IdP rules are skipped entirely when
/// `sp_only` is set.
pub fn validate_settings(settings: &Saml2Settings, sp_only: bool) -> Vec<SettingsErrorCode> {
    let mut errors = validate_sp_settings(settings);
    if !sp_only {
        errors.extend(validate_idp_settings(settings));
    }
    errors
}

/// Expand validator codes into report lines.
///
/// One failure per returned code, in validator order, so repeated contact
/// codes keep their per-contact position. Then a pass line for every
/// applicable code that did not fire, and the certificate health lines.
pub fn settings_report(
    settings: &Saml2Settings,
    sp_only: bool,
    clock: &dyn Clock,
) -> Vec<CheckResult> {
    let errors = validate_settings(settings, sp_only);

    let mut results: Vec<CheckResult> = errors
        .iter()
        .map(|code| {
            CheckResult::fail(
                code.as_str(),
                category_of(code),
                Severity::Error,
                code.message(),
                Some(code.suggestion()),
            )
        })
        .collect();

    let mut applicable: Vec<SettingsErrorCode> = SettingsErrorCode::SP.to_vec();
    if !sp_only {
        applicable.extend(SettingsErrorCode::IDP);
    }
    for code in applicable.iter().filter(|code| !errors.contains(code)) {
        results.push(CheckResult::pass(
            code.as_str(),
            category_of(code),
            Severity::Error,
            &format!("{}: ok", code.as_str()),
        ));
    }

    results.extend(certificate_report(settings, sp_only, clock.now()));
    results
}

fn category_of(code: &SettingsErrorCode) -> CheckCategory {
    if code.is_idp() {
        CheckCategory::IdentityProvider
    } else {
        CheckCategory::ServiceProvider
    }
}

/// Report lines for a metadata validation run.
pub fn metadata_report(issues: &[MetadataIssue]) -> Vec<CheckResult> {
    MetadataIssue::ALL
        .iter()
        .map(|issue| {
            if issues.contains(issue) {
                CheckResult::fail(
                    issue.as_str(),
                    CheckCategory::Metadata,
                    Severity::Error,
                    issue.message(),
                    None,
                )
            } else {
                CheckResult::pass(
                    issue.as_str(),
                    CheckCategory::Metadata,
                    Severity::Error,
                    &format!("{}: ok", issue.as_str()),
                )
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::contact::Contact;
    use crate::model::settings::ServiceProvider;
    use crate::time::{parse_date_time, FixedClock};
    use proptest::prelude::*;
    use url::Url;

    fn acs() -> Option<Url> {
        Url::parse("https://sp.example.org/acs").ok()
    }

    #[test]
    fn end_to_end_empty_entity_id() {
        let settings = Saml2Settings::builder()
            .service_provider(ServiceProvider {
                entity_id: String::new(),
                assertion_consumer_service_url: acs(),
                ..ServiceProvider::default()
            })
            .build();
        assert_eq!(
            validate_settings(&settings, false),
            vec![
                SettingsErrorCode::SpEntityIdNotFound,
                SettingsErrorCode::IdpEntityIdNotFound,
                SettingsErrorCode::IdpSsoUrlInvalid,
                SettingsErrorCode::IdpCertOrFingerprintNotFoundAndRequired,
            ]
        );
    }

    #[test]
    fn sp_only_skips_idp_rules() {
        let settings = Saml2Settings::builder().build();
        let errors = validate_settings(&settings, true);
        assert!(!errors.is_empty());
        assert!(errors.iter().all(|c| !c.is_idp()));
    }

    #[test]
    fn missing_idp_identity_reported_when_not_sp_only() {
        let settings = Saml2Settings::builder().build();
        let errors = validate_settings(&settings, false);
        assert!(errors.contains(&SettingsErrorCode::IdpEntityIdNotFound));
        assert!(errors.contains(&SettingsErrorCode::IdpSsoUrlInvalid));
    }

    #[test]
    fn check_settings_uses_record_mode() {
        let settings = Saml2Settings::builder()
            .service_provider(ServiceProvider {
                entity_id: "https://sp.example.org".to_string(),
                assertion_consumer_service_url: acs(),
                ..ServiceProvider::default()
            })
            .sp_validation_only(true)
            .build();
        assert!(settings.check_settings().is_empty());
        assert_eq!(validate_settings(&settings, false).len(), 3);
    }

    fn clock() -> FixedClock {
        FixedClock(parse_date_time("2030-01-01T00:00:00Z").unwrap())
    }

    #[test]
    fn report_has_one_line_per_applicable_code() {
        let settings = Saml2Settings::builder().build();
        let report = settings_report(&settings, true, &clock());
        assert_eq!(report.len(), SettingsErrorCode::SP.len());
        let failed: Vec<_> = report.iter().filter(|r| !r.passed).map(|r| r.code.as_str()).collect();
        assert_eq!(failed, vec!["sp_entityId_not_found", "sp_acs_not_found"]);
    }

    #[test]
    fn report_keeps_contact_codes_per_contact() {
        let settings = Saml2Settings::builder()
            .service_provider(ServiceProvider {
                entity_id: "https://sp.example.org".to_string(),
                assertion_consumer_service_url: acs(),
                ..ServiceProvider::default()
            })
            .contacts(vec![Contact::new("bogus"), Contact::new("bogus")])
            .build();
        let report = settings_report(&settings, true, &clock());
        let failed: Vec<_> = report.iter().filter(|r| !r.passed).map(|r| r.code.as_str()).collect();
        assert_eq!(
            failed,
            vec![
                "contact_type_invalid",
                "contact_not_enough_data",
                "contact_type_invalid",
                "contact_not_enough_data",
            ]
        );
        let expected: Vec<_> = validate_settings(&settings, true)
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(failed, expected);
    }

    #[test]
    fn report_includes_certificate_health() {
        let cert = crate::parsers::certificate::certificate_from_pem(include_bytes!(
            "../../tests/fixtures/sp.crt"
        ))
        .unwrap();
        let settings = Saml2Settings::builder()
            .service_provider(ServiceProvider {
                x509cert: Some(cert),
                ..ServiceProvider::default()
            })
            .build();
        let expired = FixedClock(parse_date_time("2127-01-01T00:00:00Z").unwrap());
        let report = settings_report(&settings, true, &expired);
        let line = report.iter().find(|r| r.code == "cert_expired").unwrap();
        assert!(!line.passed);
        assert_eq!(line.severity, Severity::Warning);
        let summary = crate::result::CheckSummary::from_results(&report);
        assert_eq!(summary.errors, validate_settings(&settings, true).len());
        assert_eq!(summary.warnings, 1);
    }

    #[test]
    fn metadata_report_marks_issues() {
        let report = metadata_report(&[MetadataIssue::Expired]);
        assert_eq!(report.len(), 4);
        let failed: Vec<_> = report.iter().filter(|r| !r.passed).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].code, "expired_xml");
    }

    proptest! {
        #[test]
        fn sp_only_never_reports_idp_codes(entity_id in ".{0,8}", with_acs in any::<bool>()) {
            let settings = Saml2Settings::builder()
                .service_provider(ServiceProvider {
                    entity_id,
                    assertion_consumer_service_url: if with_acs { acs() } else { None },
                    ..ServiceProvider::default()
                })
                .build();
            let errors = validate_settings(&settings, true);
            prop_assert!(errors.iter().all(|c| !c.is_idp()));
            prop_assert_eq!(errors.clone(), validate_settings(&settings, true));
        }
    }
}
