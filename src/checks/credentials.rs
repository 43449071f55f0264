use crate::checks::required::check_required;
use crate::model::settings::Saml2Settings;

/// True when the SP holds both a certificate and a private key.
///
/// An HSM does not count here; callers decide whether an HSM excuses
/// missing key material.
pub fn sp_certs_sufficient(settings: &Saml2Settings) -> bool {
    let sp = settings.sp();
    sp.x509cert.is_some() && sp.private_key.is_some()
}

/// True when the SP can sign: a certificate/key pair or an HSM.
pub fn sp_can_sign(settings: &Saml2Settings) -> bool {
    settings.sp().hsm.is_some() || sp_certs_sufficient(settings)
}

/// True when an IdP certificate is configured, either the single one or a
/// non-empty multi-cert list.
pub fn idp_certs_sufficient(settings: &Saml2Settings) -> bool {
    let idp = settings.idp();
    idp.x509cert.is_some() || check_required(&idp.x509cert_multi)
}
