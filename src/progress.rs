//! Observer trait for conversion status changes.
//!
//! A [`crate::converter::FileConverter`] holds `&mut self` for the whole of
//! [`submit`](crate::converter::FileConverter::submit), so nothing else can
//! read its status while a request is in flight. Inject an
//! [`Arc<dyn ConversionObserver>`] to hear about the loading → success /
//! failure transitions as they happen, e.g. to drive a spinner.
//!
//! # Example
//!
//! ```rust
//! use docconv_client::ConversionObserver;
//! use std::path::Path;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingObserver {
//!     done: AtomicUsize,
//! }
//!
//! impl ConversionObserver for CountingObserver {
//!     fn on_success(&self, file_name: &str, output: &Path, size: u64) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{file_name} -> {} ({size} bytes)", output.display());
//!     }
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

/// Receives status transitions from a converter.
///
/// Implementations must be `Send + Sync`: several converters may share one
/// observer and run concurrently. All methods default to no-ops.
pub trait ConversionObserver: Send + Sync {
    /// The request for `file_name` is about to be sent.
    fn on_start(&self, file_name: &str) {
        let _ = file_name;
    }

    /// The result was downloaded to `output`.
    fn on_success(&self, file_name: &str, output: &Path, size: u64) {
        let _ = (file_name, output, size);
    }

    /// The submission failed. `file_name` is `None` for the
    /// nothing-selected validation error.
    fn on_error(&self, file_name: Option<&str>, message: &str) {
        let _ = (file_name, message);
    }
}

/// An observer that ignores every event.
pub struct NoopObserver;

impl ConversionObserver for NoopObserver {}

/// Shared handle stored by converters.
pub type ObserverHandle = Arc<dyn ConversionObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl ConversionObserver for RecordingObserver {
        fn on_start(&self, file_name: &str) {
            self.events.lock().unwrap().push(format!("start {file_name}"));
        }

        fn on_error(&self, file_name: Option<&str>, message: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error {} {message}", file_name.unwrap_or("-")));
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let obs = NoopObserver;
        obs.on_start("a.pdf");
        obs.on_success("a.pdf", Path::new("a.txt"), 3);
        obs.on_error(None, "Please select a file");
    }

    #[test]
    fn defaults_only_fire_overridden_methods() {
        let obs = RecordingObserver::default();
        obs.on_start("a.pdf");
        obs.on_success("a.pdf", Path::new("a.txt"), 3);
        obs.on_error(Some("a.pdf"), "boom");
        assert_eq!(
            *obs.events.lock().unwrap(),
            vec!["start a.pdf".to_string(), "error a.pdf boom".to_string()]
        );
    }

    #[test]
    fn arc_dyn_observer_works() {
        let obs: ObserverHandle = Arc::new(NoopObserver);
        obs.on_start("x.pdf");
    }
}
