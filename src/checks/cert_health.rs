use chrono::{DateTime, Utc};

use crate::model::credentials::Certificate;
use crate::model::settings::Saml2Settings;
use crate::parsers::certificate;
use crate::result::{CheckCategory, CheckResult, Severity};

/// Days before `notAfter` at which a certificate is reported as expiring.
pub const EXPIRY_NOTICE_DAYS: i64 = 30;

/// Validity window and key size checks for every configured certificate.
///
/// These lines never carry `Severity::Error`: only the settings validators
/// decide whether a configuration is broken. IdP certificates are skipped
/// when `sp_only` is set. Certificates that cannot be decoded are skipped.
pub fn certificate_report(
    settings: &Saml2Settings,
    sp_only: bool,
    now: DateTime<Utc>,
) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let sp = settings.sp();
    let sp_certs = [("sp.x509cert", &sp.x509cert), ("sp.x509cert_new", &sp.x509cert_new)];
    for (label, cert) in sp_certs {
        if let Some(cert) = cert {
            check_certificate(label, cert, CheckCategory::ServiceProvider, now, &mut results);
        }
    }

    if !sp_only {
        let idp = settings.idp();
        if let Some(cert) = &idp.x509cert {
            check_certificate("idp.x509cert", cert, CheckCategory::IdentityProvider, now, &mut results);
        }
        for (i, cert) in idp.x509cert_multi.iter().enumerate() {
            let label = format!("idp.x509cert_multi[{}]", i);
            check_certificate(&label, cert, CheckCategory::IdentityProvider, now, &mut results);
        }
    }

    results
}

fn check_certificate(
    label: &str,
    cert: &Certificate,
    category: CheckCategory,
    now: DateTime<Utc>,
    results: &mut Vec<CheckResult>,
) {
    let info = match certificate::inspect(cert) {
        Ok(info) => info,
        Err(e) => {
            tracing::debug!(certificate = label, error = %e, "skipping certificate checks");
            return;
        }
    };

    // Expired
    if info.not_after < now {
        results.push(CheckResult::fail(
            "cert_expired",
            category,
            Severity::Warning,
            &format!(
                "Certificate {} has expired ({})",
                label,
                info.not_after.format("%Y-%m-%d")
            ),
            Some("Replace the expired certificate with a new one"),
        ));
    } else {
        results.push(CheckResult::pass(
            "cert_expired",
            category,
            Severity::Warning,
            &format!("Certificate {} is not expired", label),
        ));
    }

    // Expiring soon
    let days_until_expiry = (info.not_after - now).num_days();
    if info.not_after >= now && days_until_expiry <= EXPIRY_NOTICE_DAYS {
        results.push(CheckResult::fail(
            "cert_expiring_soon",
            category,
            Severity::Info,
            &format!(
                "Certificate {} expires in {} days ({})",
                label,
                days_until_expiry,
                info.not_after.format("%Y-%m-%d")
            ),
            Some("Plan certificate renewal and publish the new one as x509cert_new"),
        ));
    } else if days_until_expiry > EXPIRY_NOTICE_DAYS {
        results.push(CheckResult::pass(
            "cert_expiring_soon",
            category,
            Severity::Info,
            &format!("Certificate {} expires in {} days", label, days_until_expiry),
        ));
    }

    // Not yet valid
    if info.not_before > now {
        results.push(CheckResult::fail(
            "cert_not_yet_valid",
            category,
            Severity::Warning,
            &format!(
                "Certificate {} is not yet valid (valid from {})",
                label,
                info.not_before.format("%Y-%m-%d")
            ),
            Some("Check the certificate's notBefore date"),
        ));
    } else {
        results.push(CheckResult::pass(
            "cert_not_yet_valid",
            category,
            Severity::Warning,
            &format!("Certificate {} validity period has started", label),
        ));
    }

    // Key size
    let minimum = info.key_type.minimum_bits();
    if info.key_size_bits > 0 {
        if info.key_size_bits >= minimum {
            results.push(CheckResult::pass(
                "cert_key_size",
                category,
                Severity::Warning,
                &format!("Certificate {} key size is {} bits", label, info.key_size_bits),
            ));
        } else {
            results.push(CheckResult::fail(
                "cert_key_size",
                category,
                Severity::Warning,
                &format!(
                    "Certificate {} key size is {} bits (< {})",
                    label, info.key_size_bits, minimum
                ),
                Some("Use a certificate with a stronger key"),
            ));
        }
    }
}
