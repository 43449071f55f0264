use crate::checks::schema::{MetadataSchema, SchemaId, SchemaValidator};
use crate::error::MetadataResult;
use crate::model::constants::NS_MD;
use crate::parsers::metadata_xml::parse_str;
use crate::result::MetadataIssue;
use crate::time::{expire_time, Clock, SystemClock};

const XML_DECLARATION: &str = r#"<?xml version="1.0"?>"#;

/// Validate a SAML 2.0 metadata document against the built-in schema rules
/// and the system clock.
pub fn validate_metadata_document(xml: &str) -> MetadataResult<Vec<MetadataIssue>> {
    validate_metadata_document_with(xml, &MetadataSchema, &SystemClock)
}

/// Validate a metadata document with explicit schema and clock collaborators.
///
/// A schema failure is reported alone. Otherwise the root must be an
/// `EntityDescriptor`, the document must hold exactly one `SPSSODescriptor`,
/// and the computed expiration must not be in the past. Documents that are
/// not well-formed XML are an `Err`, not an issue.
pub fn validate_metadata_document_with(
    xml: &str,
    schema: &dyn SchemaValidator,
    clock: &dyn Clock,
) -> MetadataResult<Vec<MetadataIssue>> {
    let xml = xml.replace(XML_DECLARATION, "");
    let doc = parse_str(&xml)?;
    let mut issues = Vec::new();

    if !schema.is_schema_valid(&doc, SchemaId::SamlMetadata20)? {
        issues.push(MetadataIssue::SchemaMismatch);
        return Ok(report(issues));
    }

    let root = doc.root();
    if root.local_name != "EntityDescriptor" {
        issues.push(MetadataIssue::NoEntityDescriptor);
    } else if root.count_descendants(NS_MD, "SPSSODescriptor") != 1 {
        issues.push(MetadataIssue::OnlyOneSpSsoDescriptorAllowed);
    } else {
        let now = clock.now();
        let expires = expire_time(
            root.attribute("cacheDuration"),
            root.attribute("validUntil"),
            now,
        )?;
        if expires.is_some_and(|at| now > at) {
            issues.push(MetadataIssue::Expired);
        }
    }

    // TODO: verify an enveloped ds:Signature once a signature verifier is available.
    Ok(report(issues))
}

fn report(issues: Vec<MetadataIssue>) -> Vec<MetadataIssue> {
    for issue in &issues {
        tracing::warn!(issue = issue.as_str(), "metadata validation failed");
    }
    issues
}
