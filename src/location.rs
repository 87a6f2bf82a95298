//! Auflösung von Schema-Referenzen (`schemaLocation`).
//!
//! Eine Referenz ist entweder ein absoluter URI (unverändert übernommen) oder
//! ein relativer Pfad, der gegen das referenzierende Dokument aufgelöst und
//! kanonisiert wird. Kanonisierung passiert vor der Bildung des Dedup-Keys,
//! damit unterschiedlich geschriebene Pfade auf dieselbe Datei als gleich gelten.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{Error, Result};

/// Ort eines Dokuments: lokale Datei (kanonisch) oder absoluter URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    File(PathBuf),
    Url(Url),
}

impl Location {
    /// Interpretiert die Eingabe des Benutzers (Pfad oder URI).
    ///
    /// Lokale Pfade müssen existieren und werden kanonisiert.
    pub fn from_input(input: &str) -> Result<Self> {
        if let Some(url) = parse_absolute_uri(input) {
            return Ok(Self::Url(url));
        }
        let path = Path::new(input);
        if !path.is_file() {
            return Err(Error::load(input, "file does not exist"));
        }
        canonical(path).map(Self::File)
    }

    /// Löst eine `schemaLocation` relativ zu diesem Dokument auf.
    ///
    /// - absoluter URI → unverändert
    /// - relativ zu einer Datei → Verzeichnis + Pfad, muss existieren, kanonisiert
    /// - relativ zu einem URI → RFC 3986 Join
    pub fn resolve(&self, reference: &str) -> Result<Self> {
        if let Some(url) = parse_absolute_uri(reference) {
            return Ok(Self::Url(url));
        }
        match self {
            Self::File(path) => {
                let dir = path.parent().unwrap_or_else(|| Path::new("."));
                let combined = dir.join(reference);
                // Verzeichnisse (auch `schemaLocation=""`) zählen nicht als Datei
                if !combined.is_file() {
                    return Err(Error::unresolvable(format!(
                        "could not load schema '{reference}' (resolved to '{}')",
                        combined.display()
                    )));
                }
                canonical(&combined).map(Self::File)
            }
            Self::Url(base) => base.join(reference).map(Self::Url).map_err(|e| {
                Error::unresolvable(format!("cannot resolve '{reference}' against '{base}': {e}"))
            }),
        }
    }

}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Prüft ob `s` ein wohlgeformter absoluter URI ist.
///
/// Einbuchstabige Schemes werden abgelehnt (`C:\schemas\a.xsd` ist ein
/// Windows-Pfad, kein URI), ebenso Leerzeichen.
pub fn parse_absolute_uri(s: &str) -> Option<Url> {
    if s.chars().any(char::is_whitespace) {
        return None;
    }
    let url = Url::parse(s).ok()?;
    (url.scheme().len() > 1).then_some(url)
}

/// Absoluter Pfad ohne `.`/`..` Segmente.
fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .map_err(|e| Error::unresolvable(format!("cannot resolve path '{}': {e}", path.display())))
}
