//! Inline-Auflösung von `xsd:include`.
//!
//! Ein Include wird durch die Kind-Knoten des eingebundenen Schemas ersetzt.
//! Includes werden nicht dedupliziert; jedes Vorkommen lädt neu. Imports im
//! eingebundenen Inhalt werden nicht erneut gesucht.

use log::{debug, info};

use crate::dom::{NamespaceDecl, NodeId};
use crate::error::{Error, Result};
use crate::location::Location;
use crate::XSD_NS;

use super::{schema_root, MergeContext};

impl MergeContext<'_> {
    /// Ersetzt alle direkten `xsd:include` Kinder von `schema`.
    ///
    /// `location` ist der Ort des Dokuments, aus dem `schema` stammt.
    pub(super) fn resolve_includes(&mut self, location: &Location, schema: NodeId) -> Result<()> {
        let mut active = vec![location.clone()];
        self.expand_includes(location, schema, &mut active)
    }

    /// `active` enthält die gerade expandierten Dokumente (Zyklus-Schutz).
    fn expand_includes(
        &mut self,
        location: &Location,
        schema: NodeId,
        active: &mut Vec<Location>,
    ) -> Result<()> {
        for include in self.wsdl.child_elements(schema, XSD_NS, "include") {
            let raw = self
                .wsdl
                .attribute(include, "schemaLocation")
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::unresolvable(format!("xsd:include in '{location}' has no schemaLocation"))
                })?;
            let included = location.resolve(&raw)?;

            if active.contains(&included) {
                debug!("include cycle via {included}, dropping directive");
                self.wsdl.remove_child(schema, include);
                continue;
            }

            info!("  + include file: {included}");
            let included_doc = self.loader.load(&included)?;
            let root = schema_root(&included_doc, &included)?;
            let copy = self.wsdl.import_node(&included_doc, root);

            active.push(included.clone());
            self.expand_includes(&included, copy, active)?;
            active.pop();

            self.splice(schema, include, copy);
            self.summary.inlined_includes += 1;
        }
        Ok(())
    }

    /// Setzt die Kinder von `included` in Originalreihenfolge an die Stelle
    /// von `include` und entfernt die Direktive.
    fn splice(&mut self, schema: NodeId, include: NodeId, included: NodeId) {
        let in_scope = self.wsdl.in_scope_namespaces(schema);
        let mut missing: Vec<NamespaceDecl> = self
            .wsdl
            .in_scope_namespaces(included)
            .into_iter()
            .filter(|decl| !in_scope.contains(decl))
            .collect();
        // ohne eigene Default-Bindung darf das Ziel seinen Default nicht vererben
        let included_has_default = self
            .wsdl
            .in_scope_namespaces(included)
            .iter()
            .any(|d| d.prefix.is_none());
        if !included_has_default && in_scope.iter().any(|d| d.prefix.is_none()) {
            missing.push(NamespaceDecl { prefix: None, uri: String::new() });
        }

        // Snapshot: insert_after verändert die Kind-Liste von `included`
        let children = self.wsdl.children(included).to_vec();
        let mut anchor = include;
        for child in children {
            self.wsdl.insert_after(schema, child, Some(anchor));
            anchor = child;
            if let Some(element) = self.wsdl.element_mut(child) {
                for decl in &missing {
                    if !element.namespaces.iter().any(|d| d.prefix == decl.prefix) {
                        element.namespaces.push(decl.clone());
                    }
                }
            }
        }
        self.wsdl.remove_child(schema, include);
    }
}
