//! Settings file loading.
//!
//! A settings file is TOML with `[sp]`, `[idp]`, `[security]`, `[advanced]`,
//! `[organization]` tables and a `[[contacts]]` array. Every key is optional;
//! missing keys keep the record defaults so that the validators, not the
//! loader, decide what is missing. Certificates and keys are either inline
//! PEM or a path relative to the settings file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use url::Url;

use crate::model::constants::Binding;
use crate::model::contact::{Contact, Organization};
use crate::model::credentials::{Certificate, HsmRef, PrivateKey};
use crate::model::settings::{
    AdvancedSettings, IdentityProvider, Saml2Settings, SecurityFlags, ServiceProvider,
};
use crate::parsers::certificate;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    sp_validation_only: Option<bool>,
    strict: Option<bool>,
    debug: Option<bool>,
    sp: SpTable,
    idp: IdpTable,
    security: SecurityTable,
    advanced: AdvancedTable,
    contacts: Vec<ContactTable>,
    organization: Option<OrganizationTable>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SpTable {
    entity_id: Option<String>,
    assertion_consumer_service_url: Option<String>,
    assertion_consumer_service_binding: Option<Binding>,
    single_logout_service_url: Option<String>,
    single_logout_service_binding: Option<Binding>,
    name_id_format: Option<String>,
    x509cert: Option<String>,
    x509cert_new: Option<String>,
    private_key: Option<String>,
    hsm: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct IdpTable {
    entity_id: Option<String>,
    single_sign_on_service_url: Option<String>,
    single_sign_on_service_binding: Option<Binding>,
    single_logout_service_url: Option<String>,
    single_logout_service_response_url: Option<String>,
    single_logout_service_binding: Option<Binding>,
    x509cert: Option<String>,
    x509cert_multi: Vec<String>,
    cert_fingerprint: Option<String>,
    cert_fingerprint_algorithm: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SecurityTable {
    name_id_encrypted: Option<bool>,
    authn_requests_signed: Option<bool>,
    logout_request_signed: Option<bool>,
    logout_response_signed: Option<bool>,
    want_messages_signed: Option<bool>,
    want_assertions_signed: Option<bool>,
    want_assertions_encrypted: Option<bool>,
    want_name_id: Option<bool>,
    want_name_id_encrypted: Option<bool>,
    sign_metadata: Option<bool>,
    want_xml_validation: Option<bool>,
    reject_unsolicited_responses_with_in_response_to: Option<bool>,
    reject_deprecated_alg: Option<bool>,
    allow_repeat_attribute_name: Option<bool>,
    signature_algorithm: Option<String>,
    digest_algorithm: Option<String>,
    requested_authn_context: Option<Vec<String>>,
    requested_authn_context_comparison: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AdvancedTable {
    compress_request: Option<bool>,
    compress_response: Option<bool>,
    trim_name_ids: Option<bool>,
    trim_attribute_values: Option<bool>,
    unique_id_prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ContactTable {
    contact_type: String,
    company: String,
    given_name: String,
    sur_name: String,
    email_addresses: Vec<String>,
    telephone_numbers: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OrganizationTable {
    name: String,
    display_name: String,
    url: String,
    lang: Option<String>,
}

/// Load a settings record from a TOML file.
pub fn load(path: &Path) -> Result<Saml2Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    from_toml_str(&content, base_dir).with_context(|| format!("Invalid settings file {}", path.display()))
}

/// Build a settings record from TOML text. Relative credential paths are
/// resolved against `base_dir`.
pub fn from_toml_str(content: &str, base_dir: &Path) -> Result<Saml2Settings> {
    let file: SettingsFile = toml::from_str(content).context("TOML parse error")?;

    let sp = build_sp(file.sp, base_dir)?;
    let idp = build_idp(file.idp, base_dir)?;
    let security = build_security(file.security);

    let mut advanced = build_advanced(file.advanced);
    set(&mut advanced.strict, file.strict);
    set(&mut advanced.debug, file.debug);

    let contacts = file
        .contacts
        .into_iter()
        .map(|c| Contact {
            contact_type: c.contact_type,
            company: c.company,
            given_name: c.given_name,
            sur_name: c.sur_name,
            email_addresses: c.email_addresses,
            telephone_numbers: c.telephone_numbers,
        })
        .collect();

    let mut builder = Saml2Settings::builder()
        .service_provider(sp)
        .identity_provider(idp)
        .security(security)
        .advanced(advanced)
        .contacts(contacts)
        .sp_validation_only(file.sp_validation_only.unwrap_or(false));

    if let Some(org) = file.organization {
        let mut organization = Organization::new(org.name, org.display_name, org.url);
        set(&mut organization.lang, org.lang);
        builder = builder.organization(organization);
    }

    Ok(builder.build())
}

fn build_sp(table: SpTable, base_dir: &Path) -> Result<ServiceProvider> {
    let mut sp = ServiceProvider::default();
    set(&mut sp.entity_id, table.entity_id);
    sp.assertion_consumer_service_url =
        url_field("sp.assertion_consumer_service_url", table.assertion_consumer_service_url);
    set(&mut sp.assertion_consumer_service_binding, table.assertion_consumer_service_binding);
    sp.single_logout_service_url =
        url_field("sp.single_logout_service_url", table.single_logout_service_url);
    set(&mut sp.single_logout_service_binding, table.single_logout_service_binding);
    set(&mut sp.name_id_format, table.name_id_format);
    sp.x509cert = cert_field("sp.x509cert", table.x509cert, base_dir)?;
    sp.x509cert_new = cert_field("sp.x509cert_new", table.x509cert_new, base_dir)?;
    sp.private_key = key_field("sp.private_key", table.private_key, base_dir)?;
    sp.hsm = table.hsm.filter(|label| !label.is_empty()).map(HsmRef::new);
    Ok(sp)
}

fn build_idp(table: IdpTable, base_dir: &Path) -> Result<IdentityProvider> {
    let mut idp = IdentityProvider::default();
    set(&mut idp.entity_id, table.entity_id);
    idp.single_sign_on_service_url =
        url_field("idp.single_sign_on_service_url", table.single_sign_on_service_url);
    set(&mut idp.single_sign_on_service_binding, table.single_sign_on_service_binding);
    idp.single_logout_service_url =
        url_field("idp.single_logout_service_url", table.single_logout_service_url);
    idp.single_logout_service_response_url = url_field(
        "idp.single_logout_service_response_url",
        table.single_logout_service_response_url,
    );
    set(&mut idp.single_logout_service_binding, table.single_logout_service_binding);
    idp.x509cert = cert_field("idp.x509cert", table.x509cert, base_dir)?;
    for (i, value) in table.x509cert_multi.into_iter().enumerate() {
        let field = format!("idp.x509cert_multi[{}]", i);
        if let Some(cert) = cert_field(&field, Some(value), base_dir)? {
            idp.x509cert_multi.push(cert);
        }
    }
    idp.cert_fingerprint = table.cert_fingerprint;
    set(&mut idp.cert_fingerprint_algorithm, table.cert_fingerprint_algorithm);
    Ok(idp)
}

fn build_security(table: SecurityTable) -> SecurityFlags {
    let mut s = SecurityFlags::default();
    set(&mut s.name_id_encrypted, table.name_id_encrypted);
    set(&mut s.authn_requests_signed, table.authn_requests_signed);
    set(&mut s.logout_request_signed, table.logout_request_signed);
    set(&mut s.logout_response_signed, table.logout_response_signed);
    set(&mut s.want_messages_signed, table.want_messages_signed);
    set(&mut s.want_assertions_signed, table.want_assertions_signed);
    set(&mut s.want_assertions_encrypted, table.want_assertions_encrypted);
    set(&mut s.want_name_id, table.want_name_id);
    set(&mut s.want_name_id_encrypted, table.want_name_id_encrypted);
    set(&mut s.sign_metadata, table.sign_metadata);
    set(&mut s.want_xml_validation, table.want_xml_validation);
    set(
        &mut s.reject_unsolicited_responses_with_in_response_to,
        table.reject_unsolicited_responses_with_in_response_to,
    );
    set(&mut s.reject_deprecated_alg, table.reject_deprecated_alg);
    set(&mut s.allow_repeat_attribute_name, table.allow_repeat_attribute_name);
    set(&mut s.signature_algorithm, table.signature_algorithm);
    set(&mut s.digest_algorithm, table.digest_algorithm);
    set(&mut s.requested_authn_context, table.requested_authn_context);
    set(
        &mut s.requested_authn_context_comparison,
        table.requested_authn_context_comparison,
    );
    s
}

fn build_advanced(table: AdvancedTable) -> AdvancedSettings {
    let mut a = AdvancedSettings::default();
    set(&mut a.compress_request, table.compress_request);
    set(&mut a.compress_response, table.compress_response);
    set(&mut a.trim_name_ids, table.trim_name_ids);
    set(&mut a.trim_attribute_values, table.trim_attribute_values);
    a.unique_id_prefix = table.unique_id_prefix;
    a
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// An unparsable URL is logged and treated as absent, so the validators
/// report it under the field's own code.
fn url_field(field: &str, value: Option<String>) -> Option<Url> {
    let value = value.filter(|v| !v.is_empty())?;
    match Url::parse(&value) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(field, value = %value, error = %e, "ignoring invalid URL");
            None
        }
    }
}

fn pem_source(field: &str, value: &str, base_dir: &Path) -> Result<Vec<u8>> {
    if value.trim_start().starts_with("-----BEGIN") {
        return Ok(value.as_bytes().to_vec());
    }
    let path = base_dir.join(value);
    std::fs::read(&path).with_context(|| format!("Failed to read {} from {}", field, path.display()))
}

fn cert_field(field: &str, value: Option<String>, base_dir: &Path) -> Result<Option<Certificate>> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let pem = pem_source(field, &value, base_dir)?;
    let cert = certificate::certificate_from_pem(&pem)
        .with_context(|| format!("{} is not a valid X.509 certificate", field))?;

    if let Ok(info) = certificate::inspect(&cert) {
        tracing::debug!(field, subject = %info.subject, not_after = %info.not_after, "loaded certificate");
        if info.not_after < chrono::Utc::now() {
            tracing::warn!(field, not_after = %info.not_after, "certificate has expired");
        }
    }
    Ok(Some(cert))
}

fn key_field(field: &str, value: Option<String>, base_dir: &Path) -> Result<Option<PrivateKey>> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let pem = pem_source(field, &value, base_dir)?;
    let key = certificate::private_key_from_pem(&pem)
        .with_context(|| format!("{} is not a PEM private key", field))?;
    Ok(Some(key))
}
