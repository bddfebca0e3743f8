//! HTTP client for the conversion service.
//!
//! One method per conversion kind, all funnelling into [`ApiClient::convert`]:
//! build a multipart body, POST it, and hand back the raw response bytes.
//! Any non-success status is a failure whose message comes from the JSON
//! `detail` field when the service sent one.
//!
//! There is no timeout, retry or abort: a request that hangs
//! blocks its caller until the service answers or the connection drops.

use crate::config::ClientConfig;
use crate::converter::Converter;
use crate::error::DocConvError;
use crate::input::SelectedFile;
use crate::kind::ConversionKind;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Client for the four conversion endpoints.
///
/// Cheap to clone: the underlying `reqwest::Client` shares its connection
/// pool between clones.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a client for the service described by `config`.
    pub fn new(config: ClientConfig) -> Result<Self, DocConvError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DocConvError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Create a client from `DOCCONV_API_URL` (or the localhost default).
    pub fn from_env() -> Result<Self, DocConvError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn convert_pdf_to_word(&self, file: &SelectedFile) -> Result<Vec<u8>, DocConvError> {
        self.convert(ConversionKind::PdfToWord, file, None).await
    }

    pub async fn convert_word_to_pdf(&self, file: &SelectedFile) -> Result<Vec<u8>, DocConvError> {
        self.convert(ConversionKind::WordToPdf, file, None).await
    }

    pub async fn convert_pdf_to_txt(&self, file: &SelectedFile) -> Result<Vec<u8>, DocConvError> {
        self.convert(ConversionKind::PdfToText, file, None).await
    }

    /// Remove password protection. An empty password is treated as none.
    pub async fn unlock_pdf(
        &self,
        file: &SelectedFile,
        password: Option<&str>,
    ) -> Result<Vec<u8>, DocConvError> {
        self.convert(ConversionKind::PdfUnlock, file, password).await
    }

    /// POST `file` to the endpoint for `kind` and return the response body.
    ///
    /// `password` is only sent to endpoints that take one, and only when it
    /// is non-empty.
    ///
    /// # Errors
    /// - [`DocConvError::Request`] if no response was received
    /// - [`DocConvError::Api`] for any non-2xx status
    pub async fn convert(
        &self,
        kind: ConversionKind,
        file: &SelectedFile,
        password: Option<&str>,
    ) -> Result<Vec<u8>, DocConvError> {
        let url = self.config.url_for(kind.endpoint());
        let form = build_form(kind, file, password)?;

        info!("{}: uploading {} ({} bytes)", kind, file.name, file.size);
        let start = Instant::now();

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = error_message(&body, kind.failure_message());
            warn!("{}: HTTP {} for {}: {}", kind, status, file.name, message);
            return Err(DocConvError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if let Some(content_type) = unexpected_content_type(kind, response.headers()) {
            debug!(
                "{}: expected {}, service sent {}",
                kind,
                kind.output_mime_type(),
                content_type
            );
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_error(&url, e))?;

        info!(
            "{}: received {} bytes in {}ms",
            kind,
            bytes.len(),
            start.elapsed().as_millis()
        );
        Ok(bytes.to_vec())
    }

    /// Fetch the service banner from `GET /`.
    ///
    /// Useful as a reachability check before uploading anything.
    pub async fn ping(&self) -> Result<String, DocConvError> {
        let url = self.config.url_for("/");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| request_error(&url, e))?;

        if !status.is_success() {
            return Err(DocConvError::Api {
                status: status.as_u16(),
                message: error_message(&body, "Service unavailable"),
            });
        }

        let banner = serde_json::from_slice::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
            .unwrap_or_else(|| String::from_utf8_lossy(&body).trim().to_string());
        Ok(banner)
    }

    /// A [`Converter`] bound to one endpoint, for injection into a
    /// [`crate::converter::FileConverter`].
    pub fn endpoint(&self, kind: ConversionKind) -> Endpoint {
        Endpoint {
            client: self.clone(),
            kind,
        }
    }
}

/// An [`ApiClient`] fixed to a single [`ConversionKind`].
#[derive(Debug, Clone)]
pub struct Endpoint {
    client: ApiClient,
    kind: ConversionKind,
}

impl Endpoint {
    pub fn kind(&self) -> ConversionKind {
        self.kind
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

impl Converter for Endpoint {
    fn convert(
        &self,
        file: &SelectedFile,
        password: Option<&str>,
    ) -> impl Future<Output = Result<Vec<u8>, DocConvError>> + Send {
        self.client.convert(self.kind, file, password)
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn build_form(
    kind: ConversionKind,
    file: &SelectedFile,
    password: Option<&str>,
) -> Result<Form, DocConvError> {
    let part = Part::bytes(file.bytes().to_vec())
        .file_name(file.name.clone())
        .mime_str(&file.mime_type)
        .map_err(|e| DocConvError::Internal(format!("Invalid MIME type '{}': {e}", file.mime_type)))?;

    let mut form = Form::new().part("file", part);

    match password.filter(|p| !p.is_empty()) {
        Some(pw) if kind.accepts_password() => {
            form = form.text("password", pw.to_string());
        }
        Some(_) => debug!("{}: endpoint takes no password, ignoring it", kind),
        None => {}
    }

    Ok(form)
}

/// The response `Content-Type` when it names a different MIME type than the
/// kind produces. Parameters such as `charset` are ignored.
fn unexpected_content_type(kind: ConversionKind, headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let essence = value.split(';').next().unwrap_or_default().trim();
    if essence.eq_ignore_ascii_case(kind.output_mime_type()) {
        None
    } else {
        Some(value.to_string())
    }
}

fn request_error(url: &str, e: reqwest::Error) -> DocConvError {
    DocConvError::Request {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

/// Extract a user-facing message from a failed response body.
///
/// Uses the `detail` field of a JSON object body. A string detail is used as
/// is; a list of validation entries (`[{"msg": ...}, ...]`) is joined with
/// `"; "`; other values are rendered as JSON. An unparsable body, or a
/// missing, null or empty detail, yields `fallback`.
pub fn error_message(body: &[u8], fallback: &str) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(detail_text))
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn detail_text(detail: &Value) -> Option<String> {
    match detail {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(obj) => obj
                        .get("msg")
                        .and_then(Value::as_str)
                        .map(str::to_owned)
                        .or_else(|| Some(item.to_string())),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect();
            Some(parts.join("; "))
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn detail_string_is_used_verbatim() {
        let body = br#"{"detail": "File must be a PDF"}"#;
        assert_eq!(error_message(body, "Conversion failed"), "File must be a PDF");
    }

    #[test]
    fn unparsable_body_falls_back() {
        assert_eq!(
            error_message(b"<html>502 Bad Gateway</html>", "Conversion failed"),
            "Conversion failed"
        );
        assert_eq!(error_message(b"", "Unlocking failed"), "Unlocking failed");
    }

    #[test]
    fn missing_or_empty_detail_falls_back() {
        assert_eq!(error_message(br#"{"error": "x"}"#, "fallback"), "fallback");
        assert_eq!(error_message(br#"{"detail": null}"#, "fallback"), "fallback");
        assert_eq!(error_message(br#"{"detail": ""}"#, "fallback"), "fallback");
        assert_eq!(error_message(br#"{"detail": false}"#, "fallback"), "fallback");
    }

    #[test]
    fn zero_detail_falls_back() {
        assert_eq!(error_message(br#"{"detail": 0}"#, "fallback"), "fallback");
        assert_eq!(error_message(br#"{"detail": 0.0}"#, "fallback"), "fallback");
        assert_eq!(error_message(br#"{"detail": 42}"#, "fallback"), "42");
    }

    #[test]
    fn content_type_mismatch_is_reported() {
        let mut headers = HeaderMap::new();
        assert_eq!(unexpected_content_type(ConversionKind::PdfToText, &headers), None);

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        assert_eq!(unexpected_content_type(ConversionKind::PdfToText, &headers), None);
        assert_eq!(
            unexpected_content_type(ConversionKind::PdfUnlock, &headers).as_deref(),
            Some("text/plain; charset=utf-8")
        );
    }

    #[test]
    fn top_level_array_is_not_an_error_body() {
        assert_eq!(error_message(br#"["detail"]"#, "fallback"), "fallback");
    }

    #[test]
    fn validation_list_is_joined() {
        let body = br#"{"detail": [
            {"loc": ["body", "file"], "msg": "field required", "type": "value_error.missing"},
            {"loc": ["body", "password"], "msg": "str type expected"}
        ]}"#;
        assert_eq!(
            error_message(body, "fallback"),
            "field required; str type expected"
        );
    }

    #[test]
    fn client_uses_configured_base_url() {
        let config = ClientConfig::builder()
            .base_url("http://example.test:1234/")
            .build()
            .unwrap();
        let client = ApiClient::new(config).unwrap();
        assert_eq!(client.base_url(), "http://example.test:1234");
        assert_eq!(
            client.endpoint(ConversionKind::PdfUnlock).kind(),
            ConversionKind::PdfUnlock
        );
    }

    #[test]
    fn build_form_accepts_known_mime() {
        let file = SelectedFile::from_bytes("a.pdf", b"%PDF".to_vec());
        assert!(build_form(ConversionKind::PdfUnlock, &file, Some("pw")).is_ok());
    }
}
