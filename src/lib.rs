//! Validation for SAML2 Service Provider settings and SP metadata documents.
//!
//! [`validate_settings`] checks a [`Saml2Settings`] record and returns every
//! problem as a stable [`SettingsErrorCode`]. [`validate_metadata_document`]
//! checks a metadata XML document and returns [`MetadataIssue`]s. Neither
//! treats invalid configuration as an error; `Err` is reserved for input that
//! cannot be inspected at all.

pub mod checks;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parsers;
pub mod result;
pub mod sp_metadata;
pub mod time;

pub use checks::credentials::{idp_certs_sufficient, sp_certs_sufficient};
pub use checks::required::{check_required, Required};
pub use checks::schema::{MetadataSchema, SchemaId, SchemaValidator};
pub use checks::{
    validate_idp_settings, validate_metadata_document, validate_metadata_document_with,
    validate_settings, validate_sp_settings,
};
pub use error::{CertificateError, MetadataError, MetadataResult, SigningError};
pub use model::constants::Binding;
pub use model::contact::{Contact, ContactType, Organization};
pub use model::credentials::{Certificate, HsmRef, PrivateKey};
pub use model::settings::{
    AdvancedSettings, IdentityProvider, Saml2Settings, SecurityFlags, ServiceProvider,
    SettingsBuilder,
};
pub use result::{MetadataIssue, SettingsErrorCode};
pub use sp_metadata::{MetadataOptions, MetadataSigner, SigningOutcome, SpMetadata};
pub use time::{Clock, FixedClock, SystemClock};
