//! Strukturprüfung des WSDL-Dokuments und Zugriff auf `definitions/types`.

use log::debug;

use crate::dom::{Document, NamespaceDecl, NodeId, XmlName};
use crate::error::{Error, Result};
use crate::WSDL_NS;

/// Prüft dass das Wurzelelement `wsdl:definitions` ist.
pub fn verify_wsdl(doc: &Document) -> Result<NodeId> {
    doc.root_element()
        .filter(|&root| doc.is_element(root, WSDL_NS, "definitions"))
        .ok_or(Error::InvalidWsdl)
}

/// Sucht `definitions/types` oder legt es an.
///
/// Neues `types` landet hinter dem letzten `wsdl:import`, sonst als erstes
/// Kind von `definitions`.
pub fn find_or_create_types(doc: &mut Document) -> Result<NodeId> {
    let definitions = doc.root_element().ok_or(Error::MissingTypes)?;

    if let Some(&types) = doc.child_elements(definitions, WSDL_NS, "types").first() {
        return Ok(types);
    }

    let types = create_types_element(doc, definitions);
    match doc.child_elements(definitions, WSDL_NS, "import").last() {
        Some(&import) => doc.insert_after(definitions, types, Some(import)),
        None => {
            let first = doc.children(definitions).first().copied();
            doc.insert_before(definitions, types, first);
        }
    }
    debug!("created missing wsdl:types element");
    Ok(types)
}

/// Verwendet den Prefix, unter dem der WSDL-Namespace schon gebunden ist;
/// sonst `wsdl:` mit eigener Deklaration.
fn create_types_element(doc: &mut Document, definitions: NodeId) -> NodeId {
    match doc.lookup_prefix(definitions, WSDL_NS) {
        Some(prefix) => doc.create_element(XmlName::new(prefix.as_deref(), "types", Some(WSDL_NS))),
        None => {
            let types = doc.create_element(XmlName::new(Some("wsdl"), "types", Some(WSDL_NS)));
            if let Some(element) = doc.element_mut(types) {
                element.namespaces.push(NamespaceDecl {
                    prefix: Some("wsdl".to_string()),
                    uri: WSDL_NS.to_string(),
                });
            }
            types
        }
    }
}
