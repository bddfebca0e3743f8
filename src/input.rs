//! Input resolution: turn a user-chosen path into a [`SelectedFile`].
//!
//! The whole file is read into memory up front. The service takes the file as
//! a single multipart part, so there is nothing to gain from streaming it, and
//! holding the bytes lets a [`crate::converter::FileConverter`] resubmit the
//! same selection without touching the disk again.

use crate::error::DocConvError;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A file chosen for conversion.
#[derive(Clone)]
pub struct SelectedFile {
    /// Basename as shown to the user and sent as the multipart filename.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type guessed from the extension.
    pub mime_type: String,
    bytes: Vec<u8>,
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

impl SelectedFile {
    /// Build a selection from in-memory bytes.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            mime_type: mime_for_name(&name).to_string(),
            size: bytes.len() as u64,
            name,
            bytes,
        }
    }

    /// Read a local file into a selection.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DocConvError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| DocConvError::FileNotFound {
                path: path.to_path_buf(),
            })?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| classify_read_error(path.to_path_buf(), e))?;

        debug!("Selected {} ({} bytes)", path.display(), bytes.len());
        Ok(Self::from_bytes(name, bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in KiB, as shown next to the picker.
    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }
}

fn classify_read_error(path: PathBuf, e: std::io::Error) -> DocConvError {
    match e.kind() {
        std::io::ErrorKind::NotFound => DocConvError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => DocConvError::PermissionDenied { path },
        _ => DocConvError::ReadFailed { path, source: e },
    }
}

/// Guess a MIME type from a file name's extension.
pub fn mime_for_name(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_guessing() {
        assert_eq!(mime_for_name("a.pdf"), "application/pdf");
        assert_eq!(mime_for_name("A.PDF"), "application/pdf");
        assert_eq!(mime_for_name("letter.doc"), "application/msword");
        assert_eq!(
            mime_for_name("letter.docx"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(mime_for_name("notes.txt"), "text/plain");
        assert_eq!(mime_for_name("README"), "application/octet-stream");
    }

    #[test]
    fn from_bytes_records_size() {
        let f = SelectedFile::from_bytes("report.pdf", vec![0u8; 2048]);
        assert_eq!(f.size, 2048);
        assert_eq!(f.size_kb(), 2.0);
        assert_eq!(f.mime_type, "application/pdf");
        assert_eq!(f.bytes().len(), 2048);
    }

    #[test]
    fn debug_omits_bytes() {
        let f = SelectedFile::from_bytes("report.pdf", b"%PDF-1.7".to_vec());
        let dbg = format!("{f:?}");
        assert!(dbg.contains("report.pdf"));
        assert!(!dbg.contains("bytes"));
    }

    #[tokio::test]
    async fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"%PDF-1.4 test").unwrap();

        let f = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(f.name, "scan.pdf");
        assert_eq!(f.size, 13);
        assert_eq!(f.bytes(), b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SelectedFile::from_path(dir.path().join("nope.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocConvError::FileNotFound { .. }), "got: {err:?}");
    }
}
