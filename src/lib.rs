//! # docconv-client
//!
//! Client library and CLI for a document conversion service that turns PDFs
//! into Word or text, Word documents into PDF, and strips passwords from PDFs.
//!
//! The conversion itself happens on the service. This crate picks up a local
//! file, uploads it as multipart form data, and writes the returned payload
//! into the configured output directory under the right extension.
//!
//! ## Flow
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Select   read the file, check it against the accept list
//!  ├─ 2. Upload   multipart POST to /api/<conversion>
//!  ├─ 3. Errors   non-2xx → JSON `detail` or a generic message
//!  └─ 4. Save     atomic write of the payload as <basename><ext>
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docconv_client::{ApiClient, ConversionKind, FileConverter, SelectedFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Base URL from DOCCONV_API_URL, else http://localhost:8000
//!     let client = ApiClient::from_env()?;
//!     let mut form = FileConverter::for_endpoint(client.endpoint(ConversionKind::PdfToText));
//!     form.select_file(SelectedFile::from_path("report.pdf").await?)?;
//!     let download = form.submit().await?;
//!     println!("saved {}", download.path.display()); // ./report.txt
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docconv` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod converter;
pub mod download;
pub mod error;
pub mod input;
pub mod kind;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{error_message, ApiClient, Endpoint};
pub use config::{ClientConfig, ClientConfigBuilder, API_URL_ENV, DEFAULT_API_URL};
pub use converter::{ConversionStatus, Converter, ConverterSpec, FileConverter, FnConverter};
pub use download::{output_filename, save_download, Download};
pub use error::{DocConvError, GENERIC_FAILURE};
pub use input::SelectedFile;
pub use kind::ConversionKind;
pub use progress::{ConversionObserver, NoopObserver, ObserverHandle};
