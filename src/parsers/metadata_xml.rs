use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{MetadataError, MetadataResult};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Deepest element nesting accepted. Metadata documents stay far below this.
pub const MAX_DEPTH: usize = 512;

/// An element of a parsed metadata document, with its namespace resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub namespace: Option<String>,
    pub local_name: String,
    /// Attributes keyed by their qualified name as written.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(namespace)
    }

    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children
            .iter()
            .filter(move |c| c.is(namespace, local_name))
    }

    /// All elements below this one, in document order.
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        let mut pending: Vec<&XmlElement> = self.children.iter().rev().collect();
        while let Some(el) = pending.pop() {
            out.push(el);
            pending.extend(el.children.iter().rev());
        }
        out
    }

    pub fn count_descendants(&self, namespace: &str, local_name: &str) -> usize {
        self.descendants()
            .into_iter()
            .filter(|el| el.is(namespace, local_name))
            .count()
    }
}

/// A parsed document. Only the element tree is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    pub fn root(&self) -> &XmlElement {
        &self.root
    }
}

struct Frame {
    element: XmlElement,
    /// In-scope prefix bindings; later entries shadow earlier ones.
    scope: Vec<(String, String)>,
}

/// Parse well-formed XML into an [`XmlDocument`].
///
/// Unbalanced tags, unbound prefixes, stray text, a missing root, more than
/// one root element and nesting beyond [`MAX_DEPTH`] are all parse errors.
pub fn parse_str(xml: &str) -> MetadataResult<XmlDocument> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Err(e) => {
                return Err(MetadataError::Parse {
                    position: reader.error_position() as u64,
                    message: e.to_string(),
                })
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let position = reader.buffer_position() as u64;
                ensure_single_root(&root, &stack, position)?;
                ensure_depth(&stack, position)?;
                let frame = open_element(&e, stack.last(), position)?;
                stack.push(frame);
            }
            Ok(Event::Empty(e)) => {
                let position = reader.buffer_position() as u64;
                ensure_single_root(&root, &stack, position)?;
                ensure_depth(&stack, position)?;
                let frame = open_element(&e, stack.last(), position)?;
                close_element(frame.element, &mut stack, &mut root);
            }
            Ok(Event::End(_)) => match stack.pop() {
                Some(frame) => close_element(frame.element, &mut stack, &mut root),
                None => {
                    return Err(MetadataError::Parse {
                        position: reader.buffer_position() as u64,
                        message: "unexpected closing tag".to_string(),
                    })
                }
            },
            Ok(Event::Text(t)) => {
                if stack.is_empty() && !t.iter().all(|b| b.is_ascii_whitespace()) {
                    return Err(MetadataError::Parse {
                        position: reader.buffer_position() as u64,
                        message: "text outside the root element".to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    if let Some(frame) = stack.last() {
        return Err(MetadataError::Parse {
            position: reader.buffer_position() as u64,
            message: format!("unclosed element <{}>", frame.element.local_name),
        });
    }

    root.map(|root| XmlDocument { root })
        .ok_or(MetadataError::Parse {
            position: 0,
            message: "document has no root element".to_string(),
        })
}

fn ensure_single_root(
    root: &Option<XmlElement>,
    stack: &[Frame],
    position: u64,
) -> MetadataResult<()> {
    if root.is_some() && stack.is_empty() {
        return Err(MetadataError::Parse {
            position,
            message: "more than one root element".to_string(),
        });
    }
    Ok(())
}

fn ensure_depth(stack: &[Frame], position: u64) -> MetadataResult<()> {
    if stack.len() >= MAX_DEPTH {
        return Err(MetadataError::Parse {
            position,
            message: format!("element nesting deeper than {}", MAX_DEPTH),
        });
    }
    Ok(())
}

fn close_element(element: XmlElement, stack: &mut [Frame], root: &mut Option<XmlElement>) {
    match stack.last_mut() {
        Some(parent) => parent.element.children.push(element),
        None => *root = Some(element),
    }
}

fn open_element(
    e: &BytesStart<'_>,
    parent: Option<&Frame>,
    position: u64,
) -> MetadataResult<Frame> {
    let mut scope = parent.map(|p| p.scope.clone()).unwrap_or_default();
    let mut attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|err| MetadataError::Parse {
            position,
            message: err.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| MetadataError::Parse {
                position,
                message: err.to_string(),
            })?
            .to_string();

        if key == "xmlns" {
            scope.push((String::new(), value.clone()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.push((prefix.to_string(), value.clone()));
        }
        attributes.push((key, value));
    }

    let qname = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let (prefix, local_name) = match qname.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", qname.as_str()),
    };

    let namespace = if prefix == "xml" {
        Some(XML_NS.to_string())
    } else {
        match scope.iter().rev().find(|(p, _)| p == prefix) {
            Some((_, uri)) if uri.is_empty() => None,
            Some((_, uri)) => Some(uri.clone()),
            None if prefix.is_empty() => None,
            None => {
                return Err(MetadataError::Parse {
                    position,
                    message: format!("unbound namespace prefix '{}'", prefix),
                })
            }
        }
    };

    Ok(Frame {
        element: XmlElement {
            namespace,
            local_name: local_name.to_string(),
            attributes,
            children: Vec::new(),
        },
        scope,
    })
}
