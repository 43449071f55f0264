//! SAML 2.0 namespace, binding, NameID and algorithm identifiers.

use serde::{Deserialize, Serialize};

/// SAML 2.0 metadata namespace.
pub const NS_MD: &str = "urn:oasis:names:tc:SAML:2.0:metadata";

/// XML digital signature namespace.
pub const NS_DS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// SAML 2.0 protocol namespace, used for `protocolSupportEnumeration`.
pub const NS_SAMLP: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

pub const NAMEID_UNSPECIFIED: &str = "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified";

pub const RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";

pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";

/// Default comparison for requested authentication context.
pub const AUTHN_CONTEXT_COMPARISON_EXACT: &str = "exact";

/// Default fingerprint digest for IdP certificates.
pub const FINGERPRINT_ALGORITHM_SHA1: &str = "sha1";

/// SAML protocol bindings usable for SP and IdP endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Binding {
    /// HTTP POST binding.
    HttpPost,
    /// HTTP Redirect binding.
    HttpRedirect,
    /// HTTP Artifact binding.
    HttpArtifact,
    /// SOAP binding.
    Soap,
}

impl Binding {
    /// Returns the URI for this binding.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::HttpPost => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
            Self::HttpRedirect => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect",
            Self::HttpArtifact => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact",
            Self::Soap => "urn:oasis:names:tc:SAML:2.0:bindings:SOAP",
        }
    }

    /// Parses a binding from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" => Some(Self::HttpPost),
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" => Some(Self::HttpRedirect),
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact" => Some(Self::HttpArtifact),
            "urn:oasis:names:tc:SAML:2.0:bindings:SOAP" => Some(Self::Soap),
            _ => None,
        }
    }
}

impl std::fmt::Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.uri())
    }
}

impl TryFrom<String> for Binding {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_uri(&value).ok_or_else(|| format!("unknown SAML binding: {value}"))
    }
}

impl From<Binding> for String {
    fn from(binding: Binding) -> Self {
        binding.uri().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_uri_roundtrip() {
        for binding in [
            Binding::HttpPost,
            Binding::HttpRedirect,
            Binding::HttpArtifact,
            Binding::Soap,
        ] {
            assert_eq!(Binding::from_uri(binding.uri()), Some(binding));
        }
    }

    #[test]
    fn unknown_binding_rejected() {
        assert_eq!(Binding::from_uri("HTTP-POST"), None);
        assert!(Binding::try_from("urn:example:binding".to_string()).is_err());
    }
}
