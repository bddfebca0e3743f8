//! Materialise a conversion result as a file on disk.
//!
//! The returned payload is written to a temp file in the target directory and
//! then linked into place under its final name, so a half-written download is
//! never visible. Existing files are never overwritten: a taken name gets a
//! ` (1)`, ` (2)`, … suffix before the extension, the way a browser's download
//! shelf behaves.

use crate::error::DocConvError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Upper bound on ` (n)` suffixes tried before giving up.
const MAX_DUPLICATE_SUFFIX: usize = 999;

/// A payload that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Download {
    /// Where the file ended up (may carry a ` (n)` suffix).
    pub path: PathBuf,
    /// Bytes written.
    pub size: u64,
}

static RE_LAST_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[^/.]+$").unwrap());

/// Name of the download for `original` converted to `extension`.
///
/// Only the final extension is replaced: `archive.tar.pdf` → `archive.tar.txt`.
/// A name without an extension keeps its full text.
pub fn output_filename(original: &str, extension: &str) -> String {
    let base = RE_LAST_EXTENSION.replace(original, "");
    format!("{base}{extension}")
}

/// Write `bytes` into `dir` under `filename` (or a de-duplicated variant).
///
/// Creates `dir` if needed. `filename` is reduced to its final path component
/// so a name received from elsewhere cannot escape `dir`.
pub async fn save_download(
    bytes: Vec<u8>,
    dir: impl AsRef<Path>,
    filename: &str,
) -> Result<Download, DocConvError> {
    let dir = dir.as_ref().to_path_buf();
    let filename = Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| DocConvError::Internal(format!("Invalid download name '{filename}'")))?;

    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| DocConvError::OutputWriteFailed {
            path: dir.clone(),
            source: e,
        })?;

    // tempfile is blocking I/O
    let download = tokio::task::spawn_blocking(move || write_unique(&bytes, &dir, &filename))
        .await
        .map_err(|e| DocConvError::Internal(format!("Download task failed: {e}")))??;

    info!(
        "Saved {} ({} bytes)",
        download.path.display(),
        download.size
    );
    Ok(download)
}

fn write_unique(bytes: &[u8], dir: &Path, filename: &str) -> Result<Download, DocConvError> {
    let target = dir.join(filename);
    let write_err = |source| DocConvError::OutputWriteFailed {
        path: target.clone(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;

    for n in 0..=MAX_DUPLICATE_SUFFIX {
        let candidate = dir.join(numbered_name(filename, n));
        match tmp.persist_noclobber(&candidate) {
            Ok(_) => {
                return Ok(Download {
                    path: candidate,
                    size: bytes.len() as u64,
                })
            }
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!("{} exists, trying next name", candidate.display());
                tmp = e.file;
            }
            Err(e) => {
                return Err(DocConvError::OutputWriteFailed {
                    path: candidate,
                    source: e.error,
                })
            }
        }
    }

    Err(DocConvError::OutputWriteFailed {
        path: target.clone(),
        source: std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{MAX_DUPLICATE_SUFFIX} numbered copies already exist"),
        ),
    })
}

/// `report.txt`, `report (1).txt`, `report (2).txt`, …
fn numbered_name(filename: &str, n: usize) -> String {
    if n == 0 {
        return filename.to_string();
    }
    let path = Path::new(filename);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!(
            "{} ({n}).{}",
            stem.to_string_lossy(),
            ext.to_string_lossy()
        ),
        _ => format!("{filename} ({n})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_filename_replaces_last_extension() {
        assert_eq!(output_filename("report.pdf", ".txt"), "report.txt");
        assert_eq!(output_filename("letter.docx", ".pdf"), "letter.pdf");
        assert_eq!(output_filename("archive.tar.pdf", ".txt"), "archive.tar.txt");
        assert_eq!(output_filename("README", ".txt"), "README.txt");
        assert_eq!(output_filename("scan.pdf", ".pdf"), "scan.pdf");
    }

    #[test]
    fn numbered_names() {
        assert_eq!(numbered_name("report.txt", 0), "report.txt");
        assert_eq!(numbered_name("report.txt", 2), "report (2).txt");
        assert_eq!(numbered_name("README", 1), "README (1)");
    }

    #[tokio::test]
    async fn save_download_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let dl = save_download(b"hello".to_vec(), dir.path(), "report.txt")
            .await
            .unwrap();
        assert_eq!(dl.path, dir.path().join("report.txt"));
        assert_eq!(dl.size, 5);
        assert_eq!(std::fs::read(&dl.path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn save_download_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.txt"), b"old").unwrap();

        let dl = save_download(b"new".to_vec(), dir.path(), "report.txt")
            .await
            .unwrap();
        assert_eq!(dl.path, dir.path().join("report (1).txt"));
        assert_eq!(std::fs::read(dir.path().join("report.txt")).unwrap(), b"old");
        assert_eq!(std::fs::read(&dl.path).unwrap(), b"new");
    }

    #[tokio::test]
    async fn save_download_strips_directories_from_name() {
        let dir = tempfile::tempdir().unwrap();
        let dl = save_download(b"x".to_vec(), dir.path(), "../../etc/evil.txt")
            .await
            .unwrap();
        assert_eq!(dl.path, dir.path().join("evil.txt"));
    }

    #[tokio::test]
    async fn save_download_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out/nested");
        let dl = save_download(b"x".to_vec(), &nested, "a.pdf").await.unwrap();
        assert_eq!(dl.path, nested.join("a.pdf"));
    }

    #[tokio::test]
    async fn save_download_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        save_download(b"x".to_vec(), dir.path(), "a.pdf").await.unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
