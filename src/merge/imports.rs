//! Rekursive Auflösung von `xsd:import`.
//!
//! Jedes importierte Schema wird genau einmal eingebettet. Der Dedup-Key ist
//! `namespace{location}` mit bereits kanonisierter Location, damit auch
//! zyklische Imports terminieren.

use log::{debug, info};

use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::location::Location;
use crate::XSD_NS;

use super::{collect_directives, schema_root, MergeContext, SchemaDirective};

impl MergeContext<'_> {
    /// Bettet alle per `imports` referenzierten Schemas ein.
    ///
    /// `referencing` ist der Ort des Dokuments, das die Imports enthält,
    /// `depth` ist 0 für Fragmente der WSDL selbst. Gibt `false` zurück wenn
    /// es keine Imports gab.
    pub(super) fn resolve_imports(
        &mut self,
        referencing: &Location,
        imports: &[SchemaDirective],
        depth: usize,
    ) -> Result<bool> {
        if imports.is_empty() {
            return Ok(false);
        }

        for import in imports {
            let location = import
                .schema_location
                .as_deref()
                .map(|raw| referencing.resolve(raw))
                .transpose()?;
            let namespace = import.namespace.as_deref().unwrap_or("");
            let key = dedup_key(namespace, location.as_ref());

            if self.registry.contains_key(&key) {
                debug!("skipping already merged schema {key}");
                continue;
            }

            let Some(location) = location else {
                return Err(Error::unresolvable(format!(
                    "import of namespace '{namespace}' in '{referencing}' has no schemaLocation"
                )));
            };

            info!("Importing namespace: {namespace}");
            info!("  from file: {location}");

            let schema_doc = self.loader.load(&location)?;
            let root = schema_root(&schema_doc, &location)?;

            let copy = self.wsdl.import_node(&schema_doc, root);
            rewrite_imports(self.wsdl, copy, depth);
            self.resolve_includes(&location, copy)?;
            self.registry.insert(key, copy);
            self.summary.imported_schemas += 1;

            // Rekursion über das Original, die Kopie hat ihre Imports schon verloren
            let nested = collect_directives(&schema_doc, root, "import");
            self.resolve_imports(&location, &nested, depth + 1)?;
        }

        Ok(true)
    }
}

/// `namespace{location}`, fehlende Teile als Leerstring.
fn dedup_key(namespace: &str, location: Option<&Location>) -> String {
    match location {
        Some(location) => format!("{namespace}{{{location}}}"),
        None => format!("{namespace}{{}}"),
    }
}

/// Tiefe 0: Imports der Kopie entfernen. Tiefe > 0: nur `schemaLocation` entfernen,
/// die Namespace-Deklaration bleibt stehen.
fn rewrite_imports(doc: &mut Document, schema: NodeId, depth: usize) {
    for import in doc.child_elements(schema, XSD_NS, "import") {
        if depth == 0 {
            doc.remove_child(schema, import);
        } else {
            doc.remove_attribute(import, "schemaLocation");
        }
    }
}
