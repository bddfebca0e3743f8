//! The catalogue of conversions the service offers.
//!
//! Each [`ConversionKind`] pins down everything a front-end needs to present
//! and run one conversion: the endpoint it posts to, which files it accepts,
//! what extension the result gets, and what to say when it fails without a
//! usable error body.

use crate::error::GENERIC_FAILURE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four conversions exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionKind {
    /// PDF → Word (`.docx`).
    PdfToWord,
    /// Word (`.doc` / `.docx`) → PDF.
    WordToPdf,
    /// PDF → plain text.
    #[serde(rename = "pdf-to-txt")]
    PdfToText,
    /// Strip password protection from a PDF.
    #[serde(rename = "unlock")]
    PdfUnlock,
}

impl ConversionKind {
    /// Every kind, in the order the catalogue presents them.
    pub const ALL: [ConversionKind; 4] = [
        ConversionKind::PdfToWord,
        ConversionKind::WordToPdf,
        ConversionKind::PdfToText,
        ConversionKind::PdfUnlock,
    ];

    /// Path of the endpoint, relative to the API base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            ConversionKind::PdfToWord => "/api/pdf-to-word",
            ConversionKind::WordToPdf => "/api/word-to-pdf",
            ConversionKind::PdfToText => "/api/pdf-to-txt",
            ConversionKind::PdfUnlock => "/api/pdf-unlock",
        }
    }

    /// Comma-separated extension allow-list, in file-picker `accept` syntax.
    pub fn accept(self) -> &'static str {
        match self {
            ConversionKind::WordToPdf => ".doc,.docx",
            _ => ".pdf",
        }
    }

    /// Extension appended to the download name, dot included.
    pub fn output_extension(self) -> &'static str {
        match self {
            ConversionKind::PdfToWord => ".docx",
            ConversionKind::WordToPdf | ConversionKind::PdfUnlock => ".pdf",
            ConversionKind::PdfToText => ".txt",
        }
    }

    /// MIME type the service answers with on success.
    pub fn output_mime_type(self) -> &'static str {
        match self {
            ConversionKind::PdfToWord => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ConversionKind::WordToPdf | ConversionKind::PdfUnlock => "application/pdf",
            ConversionKind::PdfToText => "text/plain",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ConversionKind::PdfToWord => "PDF to Word",
            ConversionKind::WordToPdf => "Word to PDF",
            ConversionKind::PdfToText => "PDF to Text",
            ConversionKind::PdfUnlock => "PDF Unlocker",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ConversionKind::PdfToWord => "Convert PDF documents to Word (.docx) format",
            ConversionKind::WordToPdf => "Convert Word documents (.docx, .doc) to PDF format",
            ConversionKind::PdfToText => "Extract text content from PDF files",
            ConversionKind::PdfUnlock => "Remove password protection from PDF files",
        }
    }

    /// Whether the endpoint takes an optional `password` field.
    pub fn accepts_password(self) -> bool {
        matches!(self, ConversionKind::PdfUnlock)
    }

    /// Message used when a failed response carries no usable `detail`.
    pub fn failure_message(self) -> &'static str {
        match self {
            ConversionKind::PdfUnlock => "Unlocking failed",
            _ => GENERIC_FAILURE,
        }
    }

    /// Stable kebab-case name, used as the CLI subcommand and the serde name.
    pub fn name(self) -> &'static str {
        match self {
            ConversionKind::PdfToWord => "pdf-to-word",
            ConversionKind::WordToPdf => "word-to-pdf",
            ConversionKind::PdfToText => "pdf-to-txt",
            ConversionKind::PdfUnlock => "unlock",
        }
    }
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Check a file name against a picker-style accept list (`.pdf,.docx`).
///
/// Matching is case-insensitive on the extension. Entries that are not
/// extensions (MIME patterns like `application/pdf`) are ignored; an empty
/// list accepts everything.
pub fn accepts_name(accept: &str, name: &str) -> bool {
    let exts: Vec<String> = accept
        .split(',')
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| e.starts_with('.'))
        .collect();
    if exts.is_empty() {
        return true;
    }
    let lower = name.to_ascii_lowercase();
    exts.iter().any(|ext| lower.len() > ext.len() && lower.ends_with(ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_service_routes() {
        assert_eq!(ConversionKind::PdfToWord.endpoint(), "/api/pdf-to-word");
        assert_eq!(ConversionKind::WordToPdf.endpoint(), "/api/word-to-pdf");
        assert_eq!(ConversionKind::PdfToText.endpoint(), "/api/pdf-to-txt");
        assert_eq!(ConversionKind::PdfUnlock.endpoint(), "/api/pdf-unlock");
    }

    #[test]
    fn only_unlock_takes_password() {
        let with_pw: Vec<_> = ConversionKind::ALL
            .iter()
            .filter(|k| k.accepts_password())
            .collect();
        assert_eq!(with_pw, vec![&ConversionKind::PdfUnlock]);
    }

    #[test]
    fn failure_messages() {
        assert_eq!(ConversionKind::PdfToText.failure_message(), "Conversion failed");
        assert_eq!(ConversionKind::PdfUnlock.failure_message(), "Unlocking failed");
    }

    #[test]
    fn accept_list_matching() {
        assert!(accepts_name(".pdf", "report.pdf"));
        assert!(accepts_name(".pdf", "REPORT.PDF"));
        assert!(!accepts_name(".pdf", "report.docx"));
        assert!(accepts_name(".doc,.docx", "letter.doc"));
        assert!(accepts_name(".doc,.docx", "letter.docx"));
        assert!(!accepts_name(".doc,.docx", "letter.pdf"));
        // bare extension is not a file name
        assert!(!accepts_name(".pdf", ".pdf"));
        assert!(accepts_name("", "anything.bin"));
        assert!(accepts_name("application/pdf", "anything.bin"));
    }

    #[test]
    fn serde_names_match_cli_names() {
        for kind in ConversionKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
            let back: ConversionKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn output_mime_types() {
        assert_eq!(ConversionKind::PdfToText.output_mime_type(), "text/plain");
        assert_eq!(ConversionKind::PdfUnlock.output_mime_type(), "application/pdf");
        assert_eq!(ConversionKind::WordToPdf.output_mime_type(), "application/pdf");
        assert!(ConversionKind::PdfToWord
            .output_mime_type()
            .ends_with("wordprocessingml.document"));
    }
}
