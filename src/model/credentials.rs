//! Opaque credential handles held by the settings record.
//!
//! Validation only ever asks whether a credential is present; decoding the
//! material is the job of `parsers::certificate`.

use std::fmt;

/// An X.509 certificate, kept as DER bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
}

impl Certificate {
    pub fn from_der(der: impl Into<Vec<u8>>) -> Self {
        Self { der: der.into() }
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("der_len", &self.der.len())
            .finish()
    }
}

/// A private key, kept as the DER payload of its PEM block.
///
/// `Debug` never prints the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    label: String,
    der: Vec<u8>,
}

impl PrivateKey {
    /// `label` is the PEM tag the key was read from, e.g. `RSA PRIVATE KEY`.
    pub fn from_der(label: impl Into<String>, der: impl Into<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            der: der.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Reference to a signing key held by a hardware security module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HsmRef(String);

impl HsmRef {
    pub fn new(key_label: impl Into<String>) -> Self {
        Self(key_label.into())
    }

    pub fn key_label(&self) -> &str {
        &self.0
    }
}
