//! The conversion form: per-conversion state plus the submit flow.
//!
//! A [`FileConverter`] owns one selected file, an optional password and the
//! status of its last submission. The actual conversion is injected as a
//! [`Converter`], normally an [`crate::client::Endpoint`], so the submit flow
//! can be exercised without a service.
//!
//! ```text
//! select_file ──▶ submit ──▶ Loading ──▶ converter ──▶ save_download ──▶ Succeeded
//!                   │                        │
//!                   └─ no file ──▶ Failed    └─ error ──▶ Failed
//! ```

use crate::download::{output_filename, save_download, Download};
use crate::error::DocConvError;
use crate::input::SelectedFile;
use crate::kind::{accepts_name, ConversionKind};
use crate::progress::ObserverHandle;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The conversion function a [`FileConverter`] calls on submit.
pub trait Converter: Send + Sync {
    /// Convert `file`, returning the result payload.
    ///
    /// `password` is `Some` only for converters whose form shows a password
    /// field and only when the field is non-empty.
    fn convert(
        &self,
        file: &SelectedFile,
        password: Option<&str>,
    ) -> impl Future<Output = Result<Vec<u8>, DocConvError>> + Send;
}

/// Adapter turning a closure into a [`Converter`].
///
/// The closure gets owned copies so its future can be `'static`.
pub struct FnConverter<F>(pub F);

impl<F, Fut> Converter for FnConverter<F>
where
    F: Fn(SelectedFile, Option<String>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<u8>, DocConvError>> + Send,
{
    fn convert(
        &self,
        file: &SelectedFile,
        password: Option<&str>,
    ) -> impl Future<Output = Result<Vec<u8>, DocConvError>> + Send {
        (self.0)(file.clone(), password.map(str::to_owned))
    }
}

/// Static description of a conversion form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterSpec {
    pub title: String,
    pub description: String,
    /// Picker allow-list, e.g. `.doc,.docx`.
    pub accept: String,
    /// Extension given to the download, dot included.
    pub output_extension: String,
    /// Whether the form has a password field.
    pub show_password: bool,
}

impl ConverterSpec {
    /// The form the catalogue shows for `kind`.
    pub fn for_kind(kind: ConversionKind) -> Self {
        Self {
            title: kind.title().to_string(),
            description: kind.description().to_string(),
            accept: kind.accept().to_string(),
            output_extension: kind.output_extension().to_string(),
            show_password: kind.accepts_password(),
        }
    }
}

/// Status of a converter's most recent submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversionStatus {
    /// Nothing submitted since the last selection.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The result was written to disk.
    Succeeded(Download),
    /// The submission failed with this message.
    Failed(String),
}

pub const LOADING_MESSAGE: &str = "Converting...";
pub const SUCCESS_MESSAGE: &str = "Conversion successful! File downloaded.";

/// One conversion form.
pub struct FileConverter<C> {
    spec: ConverterSpec,
    converter: C,
    output_dir: PathBuf,
    file: Option<SelectedFile>,
    password: String,
    status: ConversionStatus,
    observer: Option<ObserverHandle>,
}

impl<C: Converter> FileConverter<C> {
    pub fn new(spec: ConverterSpec, converter: C, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            spec,
            converter,
            output_dir: output_dir.into(),
            file: None,
            password: String::new(),
            status: ConversionStatus::Idle,
            observer: None,
        }
    }

    /// Write downloads into `dir` instead.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Attach an observer for status transitions.
    pub fn with_observer(mut self, observer: ObserverHandle) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn spec(&self) -> &ConverterSpec {
        &self.spec
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn status(&self) -> &ConversionStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, ConversionStatus::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ConversionStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.status, ConversionStatus::Succeeded(_))
    }

    /// Choose the file to convert, replacing any earlier choice.
    ///
    /// Clears the previous error or success. A file outside the accept list
    /// is refused and the current selection is kept.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), DocConvError> {
        if !accepts_name(&self.spec.accept, &file.name) {
            return Err(DocConvError::UnsupportedFile {
                name: file.name,
                accept: self.spec.accept.clone(),
            });
        }
        debug!("{}: selected {}", self.spec.title, file.name);
        self.file = Some(file);
        self.status = ConversionStatus::Idle;
        Ok(())
    }

    /// Set the password field. Ignored on submit unless the form shows one.
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Whether the convert control is enabled.
    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.is_loading()
    }

    /// Status text for the form, if any.
    pub fn status_message(&self) -> Option<&str> {
        match &self.status {
            ConversionStatus::Idle => None,
            ConversionStatus::Loading => Some(LOADING_MESSAGE),
            ConversionStatus::Succeeded(_) => Some(SUCCESS_MESSAGE),
            ConversionStatus::Failed(msg) => Some(msg),
        }
    }

    /// `Selected: report.pdf (12.34 KB)`
    pub fn selected_summary(&self) -> Option<String> {
        self.file
            .as_ref()
            .map(|f| format!("Selected: {} ({:.2} KB)", f.name, f.size_kb()))
    }

    /// Run the conversion for the selected file and download the result.
    ///
    /// Fails fast with [`DocConvError::NoFileSelected`] when nothing is
    /// selected; no request is made in that case. On any failure the status
    /// holds the error's message.
    pub async fn submit(&mut self) -> Result<Download, DocConvError> {
        let Some(file_name) = self.file.as_ref().map(|f| f.name.clone()) else {
            let err = DocConvError::NoFileSelected;
            self.fail(None, &err);
            return Err(err);
        };

        self.status = ConversionStatus::Loading;
        if let Some(ref obs) = self.observer {
            obs.on_start(&file_name);
        }

        match self.run().await {
            Ok(download) => {
                if let Some(ref obs) = self.observer {
                    obs.on_success(&file_name, &download.path, download.size);
                }
                self.status = ConversionStatus::Succeeded(download.clone());
                Ok(download)
            }
            Err(err) => {
                self.fail(Some(&file_name), &err);
                Err(err)
            }
        }
    }

    async fn run(&self) -> Result<Download, DocConvError> {
        let file = self.file.as_ref().ok_or(DocConvError::NoFileSelected)?;
        let password = if self.spec.show_password {
            Some(self.password.as_str()).filter(|p| !p.is_empty())
        } else {
            None
        };

        let bytes = self.converter.convert(file, password).await?;
        let filename = output_filename(&file.name, &self.spec.output_extension);
        save_download(bytes, &self.output_dir, &filename).await
    }

    fn fail(&mut self, file_name: Option<&str>, err: &DocConvError) {
        let message = err.user_message();
        if let Some(ref obs) = self.observer {
            obs.on_error(file_name, &message);
        }
        self.status = ConversionStatus::Failed(message);
    }
}

impl FileConverter<crate::client::Endpoint> {
    /// The catalogue form for the endpoint's kind, saving into the client's
    /// configured output directory.
    pub fn for_endpoint(endpoint: crate::client::Endpoint) -> Self {
        let output_dir = endpoint.client().config().output_dir.clone();
        Self::new(ConverterSpec::for_kind(endpoint.kind()), endpoint, output_dir)
    }
}
