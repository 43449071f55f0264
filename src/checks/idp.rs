use crate::checks::credentials::idp_certs_sufficient;
use crate::checks::required::check_required;
use crate::model::settings::Saml2Settings;
use crate::result::SettingsErrorCode;

/// Validate the Identity Provider side of the settings.
pub fn validate_idp_settings(settings: &Saml2Settings) -> Vec<SettingsErrorCode> {
    let mut errors = Vec::new();
    let idp = settings.idp();
    let has_cert = idp_certs_sufficient(settings);

    if !check_required(&idp.entity_id) {
        errors.push(SettingsErrorCode::IdpEntityIdNotFound);
    }

    if !check_required(&idp.single_sign_on_service_url) {
        errors.push(SettingsErrorCode::IdpSsoUrlInvalid);
    }

    if !has_cert && !check_required(&idp.cert_fingerprint) {
        errors.push(SettingsErrorCode::IdpCertOrFingerprintNotFoundAndRequired);
    }

    // Encrypting the outgoing NameID needs the IdP's public key; a
    // fingerprint only verifies signatures.
    if !has_cert && settings.security().name_id_encrypted {
        errors.push(SettingsErrorCode::IdpCertNotFoundAndRequired);
    }

    for code in &errors {
        tracing::error!(code = code.as_str(), "IdP settings check failed");
    }
    errors
}
