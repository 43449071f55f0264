pub mod certificate;
pub mod metadata_xml;
