//! Schema-Merge: führt eine WSDL und alle referenzierten XSDs zusammen.
//!
//! Ablauf:
//! 1. WSDL laden und prüfen (`wsdl:definitions`)
//! 2. `wsdl:types` suchen oder anlegen
//! 3. Für jedes `xsd:schema` in `types` die Imports rekursiv auflösen
//!    (siehe [`imports`]), Includes inline einsetzen (siehe [`includes`])
//! 4. Zusammengeführte Schemas in Entdeckungsreihenfolge an `types` anhängen
//!
//! Jeder Fehler bricht den gesamten Merge ab, die Zieldatei wird nur bei
//! Erfolg geschrieben.

mod imports;
mod includes;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::loader::Loader;
use crate::location::Location;
use crate::options::MergeOptions;
use crate::{serialize, wsdl, FastIndexMap, XSD_NS};

/// Statistik eines Merge-Vorgangs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Anzahl eingebetteter Schema-Dokumente (nach Deduplizierung).
    pub imported_schemas: usize,
    /// Anzahl ersetzter `xsd:include` Direktiven.
    pub inlined_includes: usize,
    /// Anzahl entfernter WSDL-Fragmente, die nur aus Imports bestanden.
    pub removed_fragments: usize,
}

/// Merged `source` (Pfad oder URI) und schreibt das Ergebnis nach `destination`.
pub fn merge(source: &str, destination: &Path) -> Result<MergeSummary> {
    merge_with_options(source, destination, &MergeOptions::default())
}

/// Wie [`merge`], mit expliziten Optionen.
pub fn merge_with_options(
    source: &str,
    destination: &Path,
    options: &MergeOptions,
) -> Result<MergeSummary> {
    let location = Location::from_input(source)?;
    let loader = Loader::new(options.clone());
    let (doc, summary) = merge_location(&location, &loader)?;

    info!("Saving merged WSDL");
    write_atomic(&doc, destination)?;
    Ok(summary)
}

/// Lädt die WSDL an `location` und gibt das zusammengeführte Dokument zurück.
pub fn merge_location(location: &Location, loader: &Loader) -> Result<(Document, MergeSummary)> {
    let mut doc = loader.load(location)?;
    let summary = merge_document(&mut doc, location, loader)?;
    Ok((doc, summary))
}

/// Führt ein bereits geladenes WSDL-Dokument in-place zusammen.
///
/// `location` ist der Ort des Dokuments, relative `schemaLocation`s werden
/// dagegen aufgelöst.
pub fn merge_document(
    wsdl: &mut Document,
    location: &Location,
    loader: &Loader,
) -> Result<MergeSummary> {
    wsdl::verify_wsdl(wsdl)?;
    let types = wsdl::find_or_create_types(wsdl)?;

    let mut ctx = MergeContext::new(wsdl, loader);
    ctx.process_types(location, types)?;
    Ok(ctx.summary)
}

/// Dedup-Registry: Key → zusammengeführtes `xsd:schema` im WSDL-Dokument.
///
/// Die Einfügereihenfolge bestimmt die Reihenfolge in `types`.
type SchemaRegistry = FastIndexMap<String, NodeId>;

/// `xsd:import`/`xsd:include` Attribute eines Schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SchemaDirective {
    namespace: Option<String>,
    schema_location: Option<String>,
}

/// Zustand eines Merge-Durchlaufs, wird durch die Rekursion gereicht.
struct MergeContext<'a> {
    wsdl: &'a mut Document,
    loader: &'a Loader,
    registry: SchemaRegistry,
    summary: MergeSummary,
}

impl<'a> MergeContext<'a> {
    fn new(wsdl: &'a mut Document, loader: &'a Loader) -> Self {
        Self {
            wsdl,
            loader,
            registry: SchemaRegistry::default(),
            summary: MergeSummary::default(),
        }
    }

    /// Verarbeitet alle `xsd:schema` Fragmente in `types` (Tiefe 0).
    fn process_types(&mut self, location: &Location, types: NodeId) -> Result<()> {
        let fragments = self.wsdl.child_elements(types, XSD_NS, "schema");
        let mut stubs = Vec::new();

        for fragment in fragments {
            let directives = collect_directives(self.wsdl, fragment, "import");
            if self.resolve_imports(location, &directives, 0)? {
                // Imports sind durch die eingebetteten Schemas erfüllt
                for import in self.wsdl.child_elements(fragment, XSD_NS, "import") {
                    self.wsdl.remove_child(fragment, import);
                }
                if !self.wsdl.has_element_children(fragment) {
                    stubs.push(fragment);
                }
            }
            self.resolve_includes(location, fragment)?;
        }

        for stub in stubs {
            self.wsdl.remove_child(types, stub);
            self.summary.removed_fragments += 1;
            debug!("removed import-only schema fragment from wsdl:types");
        }

        let merged: Vec<NodeId> = self.registry.values().copied().collect();
        for schema in merged {
            self.wsdl.append_child(types, schema);
            if self.wsdl.undeclare_inherited_default(schema) {
                debug!("undeclared inherited default namespace on merged schema");
            }
        }
        Ok(())
    }
}

/// Liest Namespace und `schemaLocation` der direkten `xsd:<local_name>` Kinder.
fn collect_directives(doc: &Document, schema: NodeId, local_name: &str) -> Vec<SchemaDirective> {
    doc.child_elements(schema, XSD_NS, local_name)
        .into_iter()
        .map(|node| SchemaDirective {
            namespace: doc.attribute(node, "namespace").map(str::to_string),
            schema_location: doc.attribute(node, "schemaLocation").map(str::to_string),
        })
        .collect()
}

/// Wurzelelement eines geladenen Schema-Dokuments, muss `xsd:schema` sein.
fn schema_root(doc: &Document, location: &Location) -> Result<NodeId> {
    doc.root_element()
        .filter(|&root| doc.is_element(root, XSD_NS, "schema"))
        .ok_or_else(|| Error::load(location, "root element must be xsd:schema"))
}

/// Schreibt zuerst `<destination>.tmp` und benennt bei Erfolg um.
///
/// Bei einem Fehler bleibt weder die tmp-Datei noch eine neue Zieldatei zurück.
pub fn write_atomic(doc: &Document, destination: &Path) -> Result<()> {
    let tmp = tmp_path(destination);
    let result = File::create(&tmp)
        .map_err(Error::from)
        .and_then(|file| serialize::write_document(doc, BufWriter::new(file)));
    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    std::fs::rename(&tmp, destination).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        Error::IoError(format!("cannot rename '{}': {e}", tmp.display()))
    })
}

fn tmp_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
