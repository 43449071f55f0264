//! SP metadata rendering and signing.
//!
//! Signing itself is delegated to a [`MetadataSigner`]. The outcome is
//! always reported back in [`SpMetadata::signing`]; an unsigned document is
//! never passed off as signed.

use chrono::{DateTime, Duration, Utc};
use quick_xml::escape::escape;

use crate::checks::credentials::sp_can_sign;
use crate::error::{MetadataError, MetadataResult, SigningError};
use crate::model::constants::{NS_DS, NS_MD, NS_SAMLP};
use crate::model::credentials::{Certificate, PrivateKey};
use crate::model::settings::Saml2Settings;
use crate::parsers::certificate::certificate_body;

/// Default `cacheDuration`: one week.
pub const DEFAULT_CACHE_DURATION_SECS: u64 = 604_800;
/// Default `validUntil` offset from generation time.
pub const DEFAULT_VALID_DAYS: i64 = 2;

/// Validity attributes written on the root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataOptions {
    pub valid_until: Option<DateTime<Utc>>,
    pub cache_duration_secs: Option<u64>,
}

impl MetadataOptions {
    /// Valid for two days from `now`, cacheable for a week.
    pub fn from_now(now: DateTime<Utc>) -> Self {
        Self {
            valid_until: Some(now + Duration::days(DEFAULT_VALID_DAYS)),
            cache_duration_secs: Some(DEFAULT_CACHE_DURATION_SECS),
        }
    }
}

/// XML-DSig collaborator that produces an enveloped signature.
pub trait MetadataSigner {
    fn sign(
        &self,
        xml: &str,
        key: &PrivateKey,
        cert: &Certificate,
        signature_algorithm: &str,
        digest_algorithm: &str,
    ) -> Result<String, SigningError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningOutcome {
    /// `sign_metadata` is off.
    NotRequested,
    Signed,
    /// Signing was requested but failed; the document is unsigned.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpMetadata {
    pub xml: String,
    pub signing: SigningOutcome,
}

impl SpMetadata {
    pub fn is_signed(&self) -> bool {
        self.signing == SigningOutcome::Signed
    }
}

/// Render SP metadata and sign it when the settings ask for it.
///
/// Missing key material is an error. HSM-held keys cannot sign metadata
/// yet and are reported as [`MetadataError::SigningUnsupported`]. Signer
/// failures, and a missing signer, come back as
/// [`SigningOutcome::Failed`] along with the unsigned document.
pub fn generate(
    settings: &Saml2Settings,
    options: &MetadataOptions,
    signer: Option<&dyn MetadataSigner>,
) -> MetadataResult<SpMetadata> {
    let xml = render(settings, options);
    let security = settings.security();

    if !security.sign_metadata {
        return Ok(SpMetadata {
            xml,
            signing: SigningOutcome::NotRequested,
        });
    }

    let sp = settings.sp();
    if !sp_can_sign(settings) {
        return Err(MetadataError::MissingSigningMaterial(
            "an SP certificate and private key",
        ));
    }
    let (Some(cert), Some(key)) = (sp.x509cert.as_ref(), sp.private_key.as_ref()) else {
        return Err(MetadataError::SigningUnsupported(
            "the SP signing key is held by an HSM".to_string(),
        ));
    };

    let Some(signer) = signer else {
        tracing::warn!("metadata signing requested but no signer is configured");
        return Ok(SpMetadata {
            xml,
            signing: SigningOutcome::Failed("no metadata signer configured".to_string()),
        });
    };

    match signer.sign(
        &xml,
        key,
        cert,
        &security.signature_algorithm,
        &security.digest_algorithm,
    ) {
        Ok(signed) => Ok(SpMetadata {
            xml: signed,
            signing: SigningOutcome::Signed,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "metadata signing failed, returning unsigned metadata");
            Ok(SpMetadata {
                xml,
                signing: SigningOutcome::Failed(e.to_string()),
            })
        }
    }
}

/// Render the unsigned SP metadata document.
pub fn render(settings: &Saml2Settings, options: &MetadataOptions) -> String {
    let sp = settings.sp();
    let security = settings.security();

    let mut root_attrs = String::new();
    if let Some(valid_until) = options.valid_until {
        root_attrs.push_str(&format!(
            r#" validUntil="{}""#,
            valid_until.format("%Y-%m-%dT%H:%M:%SZ")
        ));
    }
    if let Some(secs) = options.cache_duration_secs {
        root_attrs.push_str(&format!(r#" cacheDuration="PT{}S""#, secs));
    }

    let wants_encryption = security.want_assertions_encrypted || security.want_name_id_encrypted;
    let mut key_descriptors = String::new();
    for cert in [sp.x509cert.as_ref(), sp.x509cert_new.as_ref()].into_iter().flatten() {
        key_descriptors.push_str(&key_descriptor("signing", cert));
        if wants_encryption {
            key_descriptors.push_str(&key_descriptor("encryption", cert));
        }
    }

    let slo = sp
        .single_logout_service_url
        .as_ref()
        .map(|url| {
            format!(
                r#"
        <md:SingleLogoutService Binding="{}" Location="{}"/>"#,
                sp.single_logout_service_binding.uri(),
                escape(url.as_str())
            )
        })
        .unwrap_or_default();

    let acs_location = sp
        .assertion_consumer_service_url
        .as_ref()
        .map(|u| u.as_str())
        .unwrap_or_default();

    let organization = settings
        .organization()
        .map(|org| {
            let lang = escape(org.lang.as_str());
            format!(
                r#"
    <md:Organization>
        <md:OrganizationName xml:lang="{lang}">{}</md:OrganizationName>
        <md:OrganizationDisplayName xml:lang="{lang}">{}</md:OrganizationDisplayName>
        <md:OrganizationURL xml:lang="{lang}">{}</md:OrganizationURL>
    </md:Organization>"#,
                escape(org.name.as_str()),
                escape(org.display_name.as_str()),
                escape(org.url.as_str()),
            )
        })
        .unwrap_or_default();

    let mut contacts = String::new();
    for contact in settings.contacts() {
        contacts.push_str(&format!(
            r#"
    <md:ContactPerson contactType="{}">"#,
            escape(contact.contact_type.as_str())
        ));
        for (element, value) in [
            ("Company", &contact.company),
            ("GivenName", &contact.given_name),
            ("SurName", &contact.sur_name),
        ] {
            if !value.is_empty() {
                contacts.push_str(&text_element(element, value));
            }
        }
        for email in &contact.email_addresses {
            contacts.push_str(&text_element("EmailAddress", email));
        }
        for number in &contact.telephone_numbers {
            contacts.push_str(&text_element("TelephoneNumber", number));
        }
        contacts.push_str("\n    </md:ContactPerson>");
    }

    format!(
        r#"<?xml version="1.0"?>
<md:EntityDescriptor xmlns:md="{ns_md}"{root_attrs} entityID="{entity_id}">
    <md:SPSSODescriptor AuthnRequestsSigned="{authn_signed}" WantAssertionsSigned="{assertions_signed}" protocolSupportEnumeration="{ns_samlp}">{key_descriptors}{slo}
        <md:NameIDFormat>{name_id_format}</md:NameIDFormat>
        <md:AssertionConsumerService Binding="{acs_binding}" Location="{acs_location}" index="1"/>
    </md:SPSSODescriptor>{organization}{contacts}
</md:EntityDescriptor>
"#,
        ns_md = NS_MD,
        ns_samlp = NS_SAMLP,
        entity_id = escape(sp.entity_id.as_str()),
        authn_signed = security.authn_requests_signed,
        assertions_signed = security.want_assertions_signed,
        name_id_format = escape(sp.name_id_format.as_str()),
        acs_binding = sp.assertion_consumer_service_binding.uri(),
        acs_location = escape(acs_location),
    )
}

fn key_descriptor(usage: &str, cert: &Certificate) -> String {
    format!(
        r#"
        <md:KeyDescriptor use="{usage}">
            <ds:KeyInfo xmlns:ds="{ns_ds}">
                <ds:X509Data>
                    <ds:X509Certificate>{body}</ds:X509Certificate>
                </ds:X509Data>
            </ds:KeyInfo>
        </md:KeyDescriptor>"#,
        ns_ds = NS_DS,
        body = certificate_body(cert),
    )
}

fn text_element(name: &str, value: &str) -> String {
    format!("\n        <md:{name}>{}</md:{name}>", escape(value))
}
