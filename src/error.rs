//! Fatal error types.
//!
//! Expected configuration problems are never errors: validators return them
//! as code lists. The types here cover input that cannot be inspected at all
//! and collaborators that fail.

use thiserror::Error;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Failures that abort metadata validation or generation.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The document is not well-formed XML.
    #[error("XML parse error at position {position}: {message}")]
    Parse {
        /// Byte offset reported by the parser.
        position: u64,
        /// Parser message.
        message: String,
    },

    /// The schema collaborator could not load or apply its schema.
    #[error("schema {schema} could not be loaded: {message}")]
    SchemaUnavailable {
        /// Schema identifier.
        schema: String,
        /// Underlying failure.
        message: String,
    },

    /// A `validUntil` or `cacheDuration` value could not be interpreted.
    #[error("invalid {attribute} value '{value}'")]
    InvalidTime {
        /// Attribute name.
        attribute: &'static str,
        /// Offending value.
        value: String,
    },

    /// Metadata signing was requested for key material that has no signing
    /// path yet (an HSM-backed key).
    #[error("metadata signing is not supported: {0}")]
    SigningUnsupported(String),

    /// Metadata signing was requested but no certificate/key pair exists.
    #[error("metadata signing requires {0}")]
    MissingSigningMaterial(&'static str),
}

impl From<quick_xml::Error> for MetadataError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Parse {
            position: 0,
            message: err.to_string(),
        }
    }
}

/// Failure reported by a [`crate::sp_metadata::MetadataSigner`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SigningError(pub String);

/// Failures while decoding PEM credential material.
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("PEM parse error: {0}")]
    Pem(#[from] pem::PemError),

    #[error("expected a PEM block tagged {expected}, found {found}")]
    UnexpectedTag {
        expected: &'static str,
        found: String,
    },

    #[error("X509 parse error: {0}")]
    X509(String),
}
