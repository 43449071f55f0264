//! The SAML2 settings record.
//!
//! A [`Saml2Settings`] value is assembled once through [`SettingsBuilder`]
//! and is read-only afterwards. Validators borrow it immutably, so the same
//! record can be checked from several threads at once.

use url::Url;

use super::constants::{
    Binding, AUTHN_CONTEXT_COMPARISON_EXACT, FINGERPRINT_ALGORITHM_SHA1, NAMEID_UNSPECIFIED,
    RSA_SHA1, SHA1,
};
use super::contact::{Contact, Organization};
use super::credentials::{Certificate, HsmRef, PrivateKey};

/// Service Provider identity and credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceProvider {
    pub entity_id: String,
    pub assertion_consumer_service_url: Option<Url>,
    pub assertion_consumer_service_binding: Binding,
    pub single_logout_service_url: Option<Url>,
    pub single_logout_service_binding: Binding,
    pub name_id_format: String,
    pub x509cert: Option<Certificate>,
    /// Certificate published alongside `x509cert` during key rollover.
    pub x509cert_new: Option<Certificate>,
    pub private_key: Option<PrivateKey>,
    /// Signing capability that replaces an in-process private key.
    pub hsm: Option<HsmRef>,
}

impl Default for ServiceProvider {
    fn default() -> Self {
        Self {
            entity_id: String::new(),
            assertion_consumer_service_url: None,
            assertion_consumer_service_binding: Binding::HttpPost,
            single_logout_service_url: None,
            single_logout_service_binding: Binding::HttpRedirect,
            name_id_format: NAMEID_UNSPECIFIED.to_string(),
            x509cert: None,
            x509cert_new: None,
            private_key: None,
            hsm: None,
        }
    }
}

/// Identity Provider identity and trust anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityProvider {
    pub entity_id: String,
    pub single_sign_on_service_url: Option<Url>,
    pub single_sign_on_service_binding: Binding,
    pub single_logout_service_url: Option<Url>,
    pub single_logout_service_response_url: Option<Url>,
    pub single_logout_service_binding: Binding,
    pub x509cert: Option<Certificate>,
    /// Ordered certificates for multi-cert rotation.
    pub x509cert_multi: Vec<Certificate>,
    pub cert_fingerprint: Option<String>,
    pub cert_fingerprint_algorithm: String,
}

impl IdentityProvider {
    /// The URL logout responses are sent to. Falls back to the SLO URL.
    pub fn single_logout_service_response_url(&self) -> Option<&Url> {
        self.single_logout_service_response_url
            .as_ref()
            .or(self.single_logout_service_url.as_ref())
    }
}

impl Default for IdentityProvider {
    fn default() -> Self {
        Self {
            entity_id: String::new(),
            single_sign_on_service_url: None,
            single_sign_on_service_binding: Binding::HttpRedirect,
            single_logout_service_url: None,
            single_logout_service_response_url: None,
            single_logout_service_binding: Binding::HttpRedirect,
            x509cert: None,
            x509cert_multi: Vec::new(),
            cert_fingerprint: None,
            cert_fingerprint_algorithm: FINGERPRINT_ALGORITHM_SHA1.to_string(),
        }
    }
}

/// Signing, encryption and algorithm preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityFlags {
    /// Encrypt the NameID of outgoing logout requests.
    pub name_id_encrypted: bool,
    pub authn_requests_signed: bool,
    pub logout_request_signed: bool,
    pub logout_response_signed: bool,
    pub want_messages_signed: bool,
    pub want_assertions_signed: bool,
    pub want_assertions_encrypted: bool,
    pub want_name_id: bool,
    pub want_name_id_encrypted: bool,
    pub sign_metadata: bool,
    pub want_xml_validation: bool,
    pub reject_unsolicited_responses_with_in_response_to: bool,
    pub reject_deprecated_alg: bool,
    pub allow_repeat_attribute_name: bool,
    pub signature_algorithm: String,
    pub digest_algorithm: String,
    pub requested_authn_context: Vec<String>,
    pub requested_authn_context_comparison: String,
}

impl Default for SecurityFlags {
    fn default() -> Self {
        Self {
            name_id_encrypted: false,
            authn_requests_signed: false,
            logout_request_signed: false,
            logout_response_signed: false,
            want_messages_signed: false,
            want_assertions_signed: false,
            want_assertions_encrypted: false,
            want_name_id: true,
            want_name_id_encrypted: false,
            sign_metadata: false,
            want_xml_validation: true,
            reject_unsolicited_responses_with_in_response_to: false,
            reject_deprecated_alg: false,
            allow_repeat_attribute_name: false,
            signature_algorithm: RSA_SHA1.to_string(),
            digest_algorithm: SHA1.to_string(),
            requested_authn_context: Vec::new(),
            requested_authn_context_comparison: AUTHN_CONTEXT_COMPARISON_EXACT.to_string(),
        }
    }
}

impl SecurityFlags {
    /// True when any outgoing message must be signed or any incoming content
    /// must be decryptable, which means the SP needs key material.
    pub fn requires_sp_credentials(&self) -> bool {
        self.authn_requests_signed
            || self.logout_request_signed
            || self.logout_response_signed
            || self.want_assertions_encrypted
            || self.want_name_id_encrypted
    }
}

/// Message handling knobs that do not take part in validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancedSettings {
    pub strict: bool,
    pub debug: bool,
    pub compress_request: bool,
    pub compress_response: bool,
    pub trim_name_ids: bool,
    pub trim_attribute_values: bool,
    pub unique_id_prefix: Option<String>,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            strict: true,
            debug: false,
            compress_request: true,
            compress_response: true,
            trim_name_ids: false,
            trim_attribute_values: false,
            unique_id_prefix: None,
        }
    }
}

/// Immutable SP/IdP configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Saml2Settings {
    sp: ServiceProvider,
    idp: IdentityProvider,
    security: SecurityFlags,
    advanced: AdvancedSettings,
    contacts: Vec<Contact>,
    organization: Option<Organization>,
    sp_validation_only: bool,
}

impl Saml2Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    pub fn sp(&self) -> &ServiceProvider {
        &self.sp
    }

    pub fn idp(&self) -> &IdentityProvider {
        &self.idp
    }

    pub fn security(&self) -> &SecurityFlags {
        &self.security
    }

    pub fn advanced(&self) -> &AdvancedSettings {
        &self.advanced
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn organization(&self) -> Option<&Organization> {
        self.organization.as_ref()
    }

    /// When set, [`Saml2Settings::check_settings`] skips the IdP rules.
    pub fn sp_validation_only(&self) -> bool {
        self.sp_validation_only
    }

    /// Validate the record in the mode it was configured with.
    pub fn check_settings(&self) -> Vec<crate::result::SettingsErrorCode> {
        crate::checks::validate_settings(self, self.sp_validation_only)
    }
}

/// Assembles a [`Saml2Settings`] record. Nothing is defaulted or corrected
/// beyond the documented field defaults; invalid values are kept so that
/// validation can report them.
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    settings: Saml2Settings,
}

impl SettingsBuilder {
    pub fn service_provider(mut self, sp: ServiceProvider) -> Self {
        self.settings.sp = sp;
        self
    }

    pub fn identity_provider(mut self, idp: IdentityProvider) -> Self {
        self.settings.idp = idp;
        self
    }

    pub fn security(mut self, security: SecurityFlags) -> Self {
        self.settings.security = security;
        self
    }

    pub fn advanced(mut self, advanced: AdvancedSettings) -> Self {
        self.settings.advanced = advanced;
        self
    }

    pub fn contacts(mut self, contacts: Vec<Contact>) -> Self {
        self.settings.contacts = contacts;
        self
    }

    pub fn contact(mut self, contact: Contact) -> Self {
        self.settings.contacts.push(contact);
        self
    }

    pub fn organization(mut self, organization: Organization) -> Self {
        self.settings.organization = Some(organization);
        self
    }

    pub fn sp_validation_only(mut self, sp_only: bool) -> Self {
        self.settings.sp_validation_only = sp_only;
        self
    }

    pub fn build(self) -> Saml2Settings {
        self.settings
    }
}
