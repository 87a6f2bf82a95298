//! Optionen für einen Merge-Vorgang.

use std::time::Duration;

/// Maximale Größe eines geladenen Dokuments (16 MiB).
///
/// DoS-Schutz durch Eingabegrößenbeschränkung, gilt für WSDL und XSD.
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Standard-Timeout für entfernte Dokumente (Sekunden).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Optionen für Laden und Zusammenführen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    pub(crate) timeout: Option<Duration>,
    pub(crate) max_document_size: usize,
    pub(crate) user_agent: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            user_agent: concat!("wsdlmerge/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl MergeOptions {
    // --- Getter ---

    /// Timeout für HTTP-Abrufe (`None` = unbegrenzt).
    pub fn timeout(&self) -> Option<Duration> { self.timeout }
    /// Maximale Dokumentgröße in Bytes.
    pub fn max_document_size(&self) -> usize { self.max_document_size }
    /// User-Agent für HTTP-Abrufe.
    pub fn user_agent(&self) -> &str { &self.user_agent }

    // --- Builder ---

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self { self.timeout = timeout; self }

    pub fn with_max_document_size(mut self, size: usize) -> Self { self.max_document_size = size; self }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self { self.user_agent = agent.into(); self }

    // --- Mutable Setter ---

    /// Setzt den HTTP-Timeout.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) { self.timeout = timeout; }
    /// Setzt die maximale Dokumentgröße.
    pub fn set_max_document_size(&mut self, size: usize) { self.max_document_size = size; }
}
