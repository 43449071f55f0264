use serde::Serialize;

/// Stable error codes reported by the SP and IdP settings validators.
///
/// The string forms are part of the public contract: callers use them as
/// i18n keys and match on them in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SettingsErrorCode {
    #[serde(rename = "sp_entityId_not_found")]
    SpEntityIdNotFound,
    #[serde(rename = "sp_acs_not_found")]
    SpAcsNotFound,
    #[serde(rename = "sp_cert_not_found_and_required")]
    SpCertNotFoundAndRequired,
    #[serde(rename = "contact_type_invalid")]
    ContactTypeInvalid,
    #[serde(rename = "contact_not_enough_data")]
    ContactNotEnoughData,
    #[serde(rename = "organization_not_enough_data")]
    OrganizationNotEnoughData,
    #[serde(rename = "use_either_hsm_or_private_key")]
    UseEitherHsmOrPrivateKey,
    #[serde(rename = "idp_entityId_not_found")]
    IdpEntityIdNotFound,
    #[serde(rename = "idp_sso_url_invalid")]
    IdpSsoUrlInvalid,
    #[serde(rename = "idp_cert_or_fingerprint_not_found_and_required")]
    IdpCertOrFingerprintNotFoundAndRequired,
    #[serde(rename = "idp_cert_not_found_and_required")]
    IdpCertNotFoundAndRequired,
}

impl SettingsErrorCode {
    /// Codes produced by the SP validator, in check order.
    pub const SP: [SettingsErrorCode; 7] = [
        SettingsErrorCode::SpEntityIdNotFound,
        SettingsErrorCode::SpAcsNotFound,
        SettingsErrorCode::SpCertNotFoundAndRequired,
        SettingsErrorCode::ContactTypeInvalid,
        SettingsErrorCode::ContactNotEnoughData,
        SettingsErrorCode::OrganizationNotEnoughData,
        SettingsErrorCode::UseEitherHsmOrPrivateKey,
    ];

    /// Codes produced by the IdP validator, in check order.
    pub const IDP: [SettingsErrorCode; 4] = [
        SettingsErrorCode::IdpEntityIdNotFound,
        SettingsErrorCode::IdpSsoUrlInvalid,
        SettingsErrorCode::IdpCertOrFingerprintNotFoundAndRequired,
        SettingsErrorCode::IdpCertNotFoundAndRequired,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SettingsErrorCode::SpEntityIdNotFound => "sp_entityId_not_found",
            SettingsErrorCode::SpAcsNotFound => "sp_acs_not_found",
            SettingsErrorCode::SpCertNotFoundAndRequired => "sp_cert_not_found_and_required",
            SettingsErrorCode::ContactTypeInvalid => "contact_type_invalid",
            SettingsErrorCode::ContactNotEnoughData => "contact_not_enough_data",
            SettingsErrorCode::OrganizationNotEnoughData => "organization_not_enough_data",
            SettingsErrorCode::UseEitherHsmOrPrivateKey => "use_either_hsm_or_private_key",
            SettingsErrorCode::IdpEntityIdNotFound => "idp_entityId_not_found",
            SettingsErrorCode::IdpSsoUrlInvalid => "idp_sso_url_invalid",
            SettingsErrorCode::IdpCertOrFingerprintNotFoundAndRequired => {
                "idp_cert_or_fingerprint_not_found_and_required"
            }
            SettingsErrorCode::IdpCertNotFoundAndRequired => "idp_cert_not_found_and_required",
        }
    }

    pub fn is_idp(&self) -> bool {
        Self::IDP.contains(self)
    }

    /// Human-readable description, used by the terminal report.
    pub fn message(&self) -> &'static str {
        match self {
            SettingsErrorCode::SpEntityIdNotFound => "SP entityId is not set",
            SettingsErrorCode::SpAcsNotFound => "SP Assertion Consumer Service URL is not set",
            SettingsErrorCode::SpCertNotFoundAndRequired => {
                "SP certificate and private key are required by the signing/encryption flags"
            }
            SettingsErrorCode::ContactTypeInvalid => "Contact has an invalid contactType",
            SettingsErrorCode::ContactNotEnoughData => {
                "Contact has no email, telephone, company or name"
            }
            SettingsErrorCode::OrganizationNotEnoughData => {
                "Organization is missing its name, display name or URL"
            }
            SettingsErrorCode::UseEitherHsmOrPrivateKey => {
                "Both an HSM and an SP private key are configured"
            }
            SettingsErrorCode::IdpEntityIdNotFound => "IdP entityId is not set",
            SettingsErrorCode::IdpSsoUrlInvalid => "IdP Single Sign-On Service URL is not set",
            SettingsErrorCode::IdpCertOrFingerprintNotFoundAndRequired => {
                "Neither an IdP certificate nor a certificate fingerprint is configured"
            }
            SettingsErrorCode::IdpCertNotFoundAndRequired => {
                "NameID encryption requires the IdP certificate"
            }
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            SettingsErrorCode::SpEntityIdNotFound => "Set sp.entity_id to the SP's entity ID",
            SettingsErrorCode::SpAcsNotFound => {
                "Set sp.assertion_consumer_service_url to the SP endpoint receiving SAML responses"
            }
            SettingsErrorCode::SpCertNotFoundAndRequired => {
                "Configure sp.x509cert and sp.private_key, or an HSM, or turn off the signing/encryption flags"
            }
            SettingsErrorCode::ContactTypeInvalid => {
                "Use one of: technical, support, administrative, billing, other"
            }
            SettingsErrorCode::ContactNotEnoughData => {
                "Add at least an email address, telephone number, company or name"
            }
            SettingsErrorCode::OrganizationNotEnoughData => {
                "Set organization.name, organization.display_name and organization.url"
            }
            SettingsErrorCode::UseEitherHsmOrPrivateKey => {
                "Remove either sp.hsm or sp.private_key"
            }
            SettingsErrorCode::IdpEntityIdNotFound => "Set idp.entity_id to the IdP's entity ID",
            SettingsErrorCode::IdpSsoUrlInvalid => {
                "Set idp.single_sign_on_service_url to the IdP SSO endpoint"
            }
            SettingsErrorCode::IdpCertOrFingerprintNotFoundAndRequired => {
                "Configure idp.x509cert, idp.x509cert_multi or idp.cert_fingerprint"
            }
            SettingsErrorCode::IdpCertNotFoundAndRequired => {
                "Configure idp.x509cert or idp.x509cert_multi"
            }
        }
    }
}

impl std::fmt::Display for SettingsErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Findings of the metadata document validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetadataIssue {
    #[serde(rename = "invalid_xml_schema")]
    SchemaMismatch,
    #[serde(rename = "noEntityDescriptor_xml")]
    NoEntityDescriptor,
    #[serde(rename = "onlySPSSODescriptor_allowed_xml")]
    OnlyOneSpSsoDescriptorAllowed,
    #[serde(rename = "expired_xml")]
    Expired,
}

impl MetadataIssue {
    pub const ALL: [MetadataIssue; 4] = [
        MetadataIssue::SchemaMismatch,
        MetadataIssue::NoEntityDescriptor,
        MetadataIssue::OnlyOneSpSsoDescriptorAllowed,
        MetadataIssue::Expired,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            MetadataIssue::SchemaMismatch => "invalid_xml_schema",
            MetadataIssue::NoEntityDescriptor => "noEntityDescriptor_xml",
            MetadataIssue::OnlyOneSpSsoDescriptorAllowed => "onlySPSSODescriptor_allowed_xml",
            MetadataIssue::Expired => "expired_xml",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            MetadataIssue::SchemaMismatch => {
                "Invalid SAML Metadata. Not match the saml-schema-metadata-2.0.xsd"
            }
            MetadataIssue::NoEntityDescriptor => "Root element is not an EntityDescriptor",
            MetadataIssue::OnlyOneSpSsoDescriptorAllowed => {
                "Metadata must contain exactly one SPSSODescriptor"
            }
            MetadataIssue::Expired => "Metadata has expired (validUntil/cacheDuration)",
        }
    }
}

impl std::fmt::Display for MetadataIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
    ServiceProvider,
    IdentityProvider,
    Metadata,
}

impl std::fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckCategory::ServiceProvider => write!(f, "Service Provider"),
            CheckCategory::IdentityProvider => write!(f, "Identity Provider"),
            CheckCategory::Metadata => write!(f, "Metadata"),
        }
    }
}

/// One line of a report: a validator code that either fired or did not.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub code: String,
    pub category: CheckCategory,
    pub severity: Severity,
    pub passed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl CheckResult {
    pub fn pass(code: &str, category: CheckCategory, severity: Severity, message: &str) -> Self {
        Self {
            code: code.to_string(),
            category,
            severity,
            passed: true,
            message: message.to_string(),
            suggestion: None,
        }
    }

    pub fn fail(
        code: &str,
        category: CheckCategory,
        severity: Severity,
        message: &str,
        suggestion: Option<&str>,
    ) -> Self {
        Self {
            code: code.to_string(),
            category,
            severity,
            passed: false,
            message: message.to_string(),
            suggestion: suggestion.map(|s| s.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckSummary {
    pub total: usize,
    pub passed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl CheckSummary {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed: Vec<_> = results.iter().filter(|r| !r.passed).collect();
        let errors = failed
            .iter()
            .filter(|r| r.severity == Severity::Error)
            .count();
        let warnings = failed
            .iter()
            .filter(|r| r.severity == Severity::Warning)
            .count();
        let info = failed
            .iter()
            .filter(|r| r.severity == Severity::Info)
            .count();
        Self {
            total,
            passed,
            errors,
            warnings,
            info,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}
