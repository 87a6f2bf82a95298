//! Laden von WSDL- und XSD-Dokumenten aus Dateien oder über HTTP(S).

use std::borrow::Cow;
use std::cell::OnceCell;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::dom::Document;
use crate::error::{Error, Result};
use crate::location::Location;
use crate::options::MergeOptions;

/// Lädt Dokumente für einen Merge.
///
/// Der HTTP-Client wird erst beim ersten entfernten Dokument gebaut.
pub struct Loader {
    options: MergeOptions,
    client: OnceCell<reqwest::blocking::Client>,
}

impl Loader {
    pub fn new(options: MergeOptions) -> Self {
        Self { options, client: OnceCell::new() }
    }

    /// Liest und parsed das Dokument an `location`.
    pub fn load(&self, location: &Location) -> Result<Document> {
        let content = self.read(location)?;
        self.parse(location, &content)
    }

    /// Parsed bereits gelesenen Inhalt mit Größenprüfung.
    pub fn parse(&self, location: &Location, content: &str) -> Result<Document> {
        let max = self.options.max_document_size();
        if content.len() > max {
            return Err(Error::load(
                location,
                format!("document too large: {} bytes (max {max} bytes)", content.len()),
            ));
        }
        Document::parse(content).map_err(|e| Error::load(location, format!("XML: {e}")))
    }

    fn read(&self, location: &Location) -> Result<String> {
        let bytes = match location {
            Location::File(path) => std::fs::read(path).map_err(|e| Error::load(location, e))?,
            Location::Url(url) => match url.scheme() {
                "file" => {
                    let path = url
                        .to_file_path()
                        .map_err(|()| Error::load(location, "not a local file URI"))?;
                    std::fs::read(path).map_err(|e| Error::load(location, e))?
                }
                "http" | "https" => self.fetch(location, url.as_str())?,
                scheme => {
                    return Err(Error::load(location, format!("unsupported URI scheme '{scheme}'")));
                }
            },
        };
        decode(location, &bytes)
    }

    fn fetch(&self, location: &Location, url: &str) -> Result<Vec<u8>> {
        let client = self.client()?;
        let response = client
            .get(url)
            .send()
            .map_err(|e| Error::load(location, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::load(location, format!("HTTP {status}")));
        }

        response
            .bytes()
            .map(|body| body.to_vec())
            .map_err(|e| Error::load(location, format!("failed to read response body: {e}")))
    }

    fn client(&self) -> Result<&reqwest::blocking::Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let mut builder = reqwest::blocking::Client::builder().user_agent(self.options.user_agent());
        // reqwest::blocking hat einen eigenen Default-Timeout, None muss explizit gesetzt werden
        builder = builder.timeout(self.options.timeout());
        let client = builder
            .build()
            .map_err(|e| Error::load("<http client>", format!("failed to create HTTP client: {e}")))?;
        Ok(self.client.get_or_init(|| client))
    }
}

/// Dekodiert ein XML-Dokument nach BOM bzw. `encoding` der XML-Declaration.
///
/// Ohne beides gilt UTF-8. Ungültige Bytes sind ein `Load` Fehler.
fn decode(location: &Location, bytes: &[u8]) -> Result<String> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes).unwrap_or(UTF_8), bytes),
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
        .ok_or_else(|| Error::load(location, format!("invalid {} data", encoding.name())))
}

/// Liest `encoding="..."` aus der XML-Declaration (ASCII-kompatible Kodierungen).
///
/// UTF-16 ohne BOM kann so nicht deklariert sein, die Declaration wäre
/// sonst nicht als ASCII lesbar.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = bytes.strip_prefix(b"<?xml")?;
    let end = memchr::memmem::find(head, b"?>")?;
    let decl = &head[..end];
    let pos = memchr::memmem::find(decl, b"encoding")?;
    let rest = &decl[pos + b"encoding".len()..];
    let rest = rest.trim_ascii_start().strip_prefix(b"=")?.trim_ascii_start();
    let quote = *rest.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let label_len = memchr::memchr(quote, &rest[1..])?;
    let encoding = Encoding::for_label(&rest[1..1 + label_len])?;
    (encoding != UTF_16LE && encoding != UTF_16BE).then_some(encoding)
}
