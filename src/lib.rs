//! wsdlmerge – führt eine WSDL und alle referenzierten XSD-Schemas zu einem
//! eigenständigen WSDL-Dokument zusammen.
//!
//! Alle per `xsd:import` erreichbaren Schemas werden genau einmal in
//! `wsdl:types` eingebettet, `xsd:include` wird inline ersetzt.
//!
//! # Beispiel
//!
//! ```no_run
//! use std::path::Path;
//!
//! let summary = wsdlmerge::merge("service.wsdl", Path::new("service_merged.wsdl")).unwrap();
//! println!("{} schemas embedded", summary.imported_schemas);
//! ```

pub mod dom;
pub mod error;
pub mod loader;
pub mod location;
pub mod merge;
pub mod options;
pub mod serialize;
pub mod wsdl;

pub use error::{Error, Result};

/// Namespace von WSDL 1.1.
pub const WSDL_NS: &str = "http://schemas.xmlsoap.org/wsdl/";

/// Namespace von XML Schema.
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// IndexMap mit ahash (deterministische Iteration + schnelles Hashing).
pub(crate) type FastIndexMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;

// Public API
pub use dom::Document;
pub use loader::Loader;
pub use location::Location;
pub use merge::{merge, merge_document, merge_location, merge_with_options, MergeSummary};
pub use options::MergeOptions;
pub use serialize::{to_xml_string, write_document};
