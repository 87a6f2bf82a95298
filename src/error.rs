//! Zentrale Fehlertypen für den WSDL-Merge.
//!
//! Jede Variante entspricht einer Fehlerklasse des Merge-Vorgangs. Ein Fehler
//! an beliebiger Rekursionstiefe bricht den gesamten Merge ab.

use core::fmt;

/// Alle Fehler, die beim Laden, Prüfen und Zusammenführen auftreten können.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Ein Dokument konnte nicht geladen werden (Datei fehlt, Netzwerkfehler,
    /// HTTP-Status, Größenlimit oder kein wohlgeformtes XML).
    Load {
        /// Pfad oder URI des Dokuments.
        location: String,
        /// Ursache in Textform.
        reason: String,
    },
    /// Das Wurzelelement ist kein `wsdl:definitions`.
    InvalidWsdl,
    /// `definitions/types` fehlt und kann nicht erzeugt werden.
    MissingTypes,
    /// Ein `xsd:import`/`xsd:include` hat keine verwendbare Location oder
    /// die aufgelöste Datei existiert nicht.
    UnresolvableImport(String),
    /// Das zusammengeführte Dokument konnte nicht geschrieben werden.
    IoError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { location, reason } => {
                write!(f, "cannot load '{location}': {reason}")
            }
            Self::InvalidWsdl => write!(f, "does not seem to be a WSDL file (missing wsdl:definitions root)"),
            Self::MissingTypes => write!(f, "definitions/types cannot be found nor created"),
            Self::UnresolvableImport(msg) => write!(f, "unresolvable schema reference: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Erstellt einen `Load` Fehler mit Location und Ursache.
    pub fn load(location: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::Load {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Erstellt einen `UnresolvableImport` Fehler.
    pub fn unresolvable(msg: impl Into<String>) -> Self {
        Self::UnresolvableImport(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_display_names_location_and_reason() {
        let e = Error::load("/tmp/a.xsd", "No such file or directory");
        let msg = e.to_string();
        assert!(msg.contains("/tmp/a.xsd"), "{msg}");
        assert!(msg.contains("No such file"), "{msg}");
    }

    #[test]
    fn invalid_wsdl_display() {
        let msg = Error::InvalidWsdl.to_string();
        assert!(msg.contains("WSDL"), "{msg}");
    }

    #[test]
    fn missing_types_display() {
        let msg = Error::MissingTypes.to_string();
        assert!(msg.contains("types"), "{msg}");
    }

    #[test]
    fn unresolvable_display() {
        let e = Error::unresolvable("import of 'urn:a' has no schemaLocation");
        let msg = e.to_string();
        assert!(msg.contains("unresolvable"), "{msg}");
        assert!(msg.contains("urn:a"), "{msg}");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e: Error = io.into();
        assert!(matches!(e, Error::IoError(ref m) if m.contains("denied")));
    }

    #[test]
    fn error_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&Error::InvalidWsdl);
    }
}
