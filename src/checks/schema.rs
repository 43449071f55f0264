//! Schema conformance for SAML 2.0 metadata documents.
//!
//! [`MetadataSchema`] enforces the structural subset of
//! `saml-schema-metadata-2.0.xsd` that decides whether a document can be
//! consumed at all. A full XSD engine can be plugged in through
//! [`SchemaValidator`].

use crate::error::MetadataResult;
use crate::model::constants::NS_MD;
use crate::model::contact::ContactType;
use crate::parsers::metadata_xml::{XmlDocument, XmlElement};
use crate::time::{parse_date_time, parse_duration};

const MAX_ENTITY_ID_LEN: usize = 1024;

const ROLE_DESCRIPTORS: &[&str] = &[
    "RoleDescriptor",
    "IDPSSODescriptor",
    "SPSSODescriptor",
    "AuthnAuthorityDescriptor",
    "AttributeAuthorityDescriptor",
    "PDPDescriptor",
];

const ENDPOINTS: &[&str] = &[
    "ArtifactResolutionService",
    "SingleLogoutService",
    "ManageNameIDService",
    "SingleSignOnService",
    "NameIDMappingService",
    "AssertionIDRequestService",
    "AssertionConsumerService",
    "AttributeService",
    "AuthnQueryService",
    "AuthzService",
];

const INDEXED: &[&str] = &[
    "ArtifactResolutionService",
    "AssertionConsumerService",
    "AttributeConsumingService",
];

/// Schemas a validator can be asked to check against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaId {
    SamlMetadata20,
}

impl SchemaId {
    pub fn file_name(&self) -> &'static str {
        match self {
            SchemaId::SamlMetadata20 => "saml-schema-metadata-2.0.xsd",
        }
    }
}

/// Decides whether a parsed document conforms to a schema.
///
/// `Ok(false)` is a conformance failure. `Err` means the check itself could
/// not run, for example because the schema could not be loaded.
pub trait SchemaValidator {
    fn is_schema_valid(&self, doc: &XmlDocument, schema: SchemaId) -> MetadataResult<bool>;
}

/// Built-in structural checks for SAML 2.0 metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataSchema;

impl SchemaValidator for MetadataSchema {
    fn is_schema_valid(&self, doc: &XmlDocument, schema: SchemaId) -> MetadataResult<bool> {
        let violations = self.violations(doc);
        for violation in &violations {
            tracing::debug!(schema = schema.file_name(), %violation, "schema violation");
        }
        Ok(violations.is_empty())
    }
}

impl MetadataSchema {
    /// Every structural violation found, described in plain words.
    pub fn violations(&self, doc: &XmlDocument) -> Vec<String> {
        let mut out = Vec::new();
        let root = doc.root();

        if root.is(NS_MD, "EntityDescriptor") {
            check_entity_descriptor(root, &mut out);
        } else if root.is(NS_MD, "EntitiesDescriptor") {
            check_entities_descriptor(root, &mut out);
        } else {
            out.push(format!(
                "root element <{}> is not a metadata EntityDescriptor or EntitiesDescriptor",
                root.local_name
            ));
            return out;
        }

        for el in std::iter::once(root).chain(root.descendants()) {
            if el.namespace.as_deref() == Some(NS_MD) {
                check_element(el, &mut out);
            }
        }
        out
    }
}

fn check_entities_descriptor(el: &XmlElement, out: &mut Vec<String>) {
    let mut members = 0;
    for child in &el.children {
        if child.is(NS_MD, "EntityDescriptor") {
            check_entity_descriptor(child, out);
            members += 1;
        } else if child.is(NS_MD, "EntitiesDescriptor") {
            check_entities_descriptor(child, out);
            members += 1;
        }
    }
    if members == 0 {
        out.push("EntitiesDescriptor contains no entities".to_string());
    }
}

fn check_entity_descriptor(el: &XmlElement, out: &mut Vec<String>) {
    match el.attribute("entityID") {
        None => out.push("EntityDescriptor is missing entityID".to_string()),
        Some("") => out.push("EntityDescriptor has an empty entityID".to_string()),
        Some(id) if id.chars().count() > MAX_ENTITY_ID_LEN => out.push(format!(
            "entityID is longer than {} characters",
            MAX_ENTITY_ID_LEN
        )),
        Some(_) => {}
    }

    let has_role = el.children.iter().any(|c| {
        c.namespace.as_deref() == Some(NS_MD)
            && (ROLE_DESCRIPTORS.contains(&c.local_name.as_str())
                || c.local_name == "AffiliationDescriptor")
    });
    if !has_role {
        out.push("EntityDescriptor has no role or affiliation descriptor".to_string());
    }
}

fn check_element(el: &XmlElement, out: &mut Vec<String>) {
    let name = el.local_name.as_str();

    if let Some(value) = el.attribute("validUntil") {
        if parse_date_time(value).is_none() {
            out.push(format!("{}/@validUntil '{}' is not an xs:dateTime", name, value));
        }
    }
    if let Some(value) = el.attribute("cacheDuration") {
        if parse_duration(value).is_none() {
            out.push(format!("{}/@cacheDuration '{}' is not an xs:duration", name, value));
        }
    }

    if ROLE_DESCRIPTORS.contains(&name) {
        if el.attribute("protocolSupportEnumeration").map_or(true, str::is_empty) {
            out.push(format!("{} is missing protocolSupportEnumeration", name));
        }
        let required_endpoint = match name {
            "SPSSODescriptor" => Some("AssertionConsumerService"),
            "IDPSSODescriptor" => Some("SingleSignOnService"),
            _ => None,
        };
        if let Some(endpoint) = required_endpoint {
            if el.children_named(NS_MD, endpoint).next().is_none() {
                out.push(format!("{} has no {}", name, endpoint));
            }
        }
    }

    if ENDPOINTS.contains(&name) {
        for attr in ["Binding", "Location"] {
            if el.attribute(attr).map_or(true, str::is_empty) {
                out.push(format!("{} is missing {}", name, attr));
            }
        }
    }

    if INDEXED.contains(&name) {
        match el.attribute("index") {
            None => out.push(format!("{} is missing index", name)),
            Some(index) if index.parse::<u16>().is_err() => {
                out.push(format!("{}/@index '{}' is not an unsignedShort", name, index))
            }
            Some(_) => {}
        }
    }

    if name == "KeyDescriptor" {
        if let Some(usage) = el.attribute("use") {
            if usage != "signing" && usage != "encryption" {
                out.push(format!("KeyDescriptor/@use '{}' is not signing or encryption", usage));
            }
        }
    }

    if name == "ContactPerson" {
        match el.attribute("contactType") {
            Some(kind) if ContactType::parse(kind).is_some() => {}
            Some(kind) => out.push(format!("ContactPerson/@contactType '{}' is not allowed", kind)),
            None => out.push("ContactPerson is missing contactType".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::metadata_xml::parse_str;

    fn sp_document(extra_attrs: &str, sp_body: &str) -> String {
        format!(
            r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://sp.example.org"{extra_attrs}>
  <md:SPSSODescriptor protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol">
    {sp_body}
  </md:SPSSODescriptor>
</md:EntityDescriptor>"#
        )
    }

    const ACS: &str = r#"<md:AssertionConsumerService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" Location="https://sp.example.org/acs" index="1"/>"#;

    fn violations(xml: &str) -> Vec<String> {
        MetadataSchema.violations(&parse_str(xml).unwrap())
    }

    #[test]
    fn minimal_sp_metadata_conforms() {
        let xml = sp_document(r#" validUntil="2030-01-01T00:00:00Z" cacheDuration="PT604800S""#, ACS);
        assert!(violations(&xml).is_empty(), "{:?}", violations(&xml));
        assert!(MetadataSchema
            .is_schema_valid(&parse_str(&xml).unwrap(), SchemaId::SamlMetadata20)
            .unwrap());
    }

    #[test]
    fn foreign_root_is_rejected() {
        let v = violations(r#"<root xmlns="urn:example"/>"#);
        assert_eq!(v.len(), 1);
        assert!(v[0].contains("root element"));
    }

    #[test]
    fn metadata_local_name_in_wrong_namespace_is_rejected() {
        let v = violations(r#"<EntityDescriptor entityID="x"/>"#);
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn entity_id_constraints() {
        let xml = sp_document("", ACS).replace(r#"entityID="https://sp.example.org""#, r#"entityID="""#);
        assert!(violations(&xml).iter().any(|v| v.contains("empty entityID")));

        let long = format!("https://sp.example.org/{}", "a".repeat(1100));
        let xml = sp_document("", ACS).replace("https://sp.example.org\"", &format!("{long}\""));
        assert!(violations(&xml).iter().any(|v| v.contains("longer than")));
    }

    #[test]
    fn bad_time_attributes_are_violations() {
        let xml = sp_document(r#" validUntil="next week""#, ACS);
        assert!(violations(&xml).iter().any(|v| v.contains("validUntil")));

        let xml = sp_document(r#" cacheDuration="7 days""#, ACS);
        assert!(violations(&xml).iter().any(|v| v.contains("cacheDuration")));
    }

    #[test]
    fn sp_descriptor_needs_an_acs() {
        let xml = sp_document("", "");
        assert!(violations(&xml).iter().any(|v| v.contains("AssertionConsumerService")));
    }

    #[test]
    fn endpoints_need_binding_location_and_index() {
        let body = r#"<md:AssertionConsumerService Location="https://sp.example.org/acs" index="-1"/>"#;
        let v = violations(&sp_document("", body));
        assert!(v.iter().any(|v| v.contains("missing Binding")));
        assert!(v.iter().any(|v| v.contains("unsignedShort")));
    }

    #[test]
    fn key_use_and_contact_type_are_enumerated() {
        let body = format!(r#"<md:KeyDescriptor use="both"/>{ACS}"#);
        let xml = sp_document("", &body).replace(
            "</md:EntityDescriptor>",
            r#"<md:ContactPerson contactType="sales"/></md:EntityDescriptor>"#,
        );
        let v = violations(&xml);
        assert!(v.iter().any(|v| v.contains("KeyDescriptor")));
        assert!(v.iter().any(|v| v.contains("contactType")));
    }

    #[test]
    fn entities_descriptor_wraps_entities() {
        let inner = sp_document("", ACS);
        let xml = format!(
            r#"<md:EntitiesDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata">{}</md:EntitiesDescriptor>"#,
            inner
        );
        assert!(violations(&xml).is_empty());

        let empty = r#"<md:EntitiesDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata"/>"#;
        assert!(!violations(empty).is_empty());
    }
}
