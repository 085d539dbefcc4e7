//! User-facing notifications around exports and geometry operations.
//!
//! Operations return typed errors; this module is where they are caught,
//! logged and turned into a toast. A [`LoadingGuard`] keeps the loading
//! indicator up for exactly as long as the operation runs, whatever the
//! outcome.

use crate::export::{ClipboardError, ExportAllReport, ExportError};
use crate::imaging::{ImagingError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// Where notifications go (status bar, console, test recorder).
pub trait Notifier {
    fn show_loading(&self, message: &str);
    fn hide_loading(&self);
    fn toast(&self, level: ToastLevel, message: &str);
}

/// Shows the loading indicator until dropped.
pub struct LoadingGuard<'a, N: Notifier + ?Sized> {
    notifier: &'a N,
}

impl<'a, N: Notifier + ?Sized> LoadingGuard<'a, N> {
    pub fn new(notifier: &'a N, message: &str) -> Self {
        notifier.show_loading(message);
        Self { notifier }
    }
}

impl<N: Notifier + ?Sized> Drop for LoadingGuard<'_, N> {
    fn drop(&mut self) {
        self.notifier.hide_loading();
    }
}

/// Toast text for a failed export. Clipboard failures get their own wording.
pub fn export_failure_message(what: &str, err: &ExportError) -> String {
    match err {
        ExportError::Clipboard(ClipboardError::Unavailable(_)) => {
            "Clipboard is not available in this environment".to_string()
        }
        ExportError::Clipboard(e) => {
            format!("Could not copy {what} to the clipboard ({e}). Check clipboard permissions.")
        }
        e => format!("Failed to export {what}: {e}"),
    }
}

/// Run one export behind a loading indicator and report the outcome.
pub fn run_export<N, T>(
    notifier: &N,
    what: &str,
    op: impl FnOnce() -> Result<T, ExportError>,
) -> Option<T>
where
    N: Notifier + ?Sized,
{
    let _loading = LoadingGuard::new(notifier, &format!("Exporting {what}..."));
    match op() {
        Ok(value) => {
            notifier.toast(ToastLevel::Success, &format!("{what} exported successfully"));
            Some(value)
        }
        Err(e) => {
            log::error!("{what} export failed: {e}");
            notifier.toast(ToastLevel::Error, &export_failure_message(what, &e));
            None
        }
    }
}

/// Report every sub-export of an `export_all` run.
///
/// Returns `true` when all formats succeeded.
pub fn report_export_all<N: Notifier + ?Sized>(notifier: &N, report: &ExportAllReport) -> bool {
    let failures = report.failures();
    for (format, e) in &failures {
        log::error!("{format} export failed: {e}");
    }

    if failures.is_empty() {
        notifier.toast(ToastLevel::Success, "All formats exported successfully");
        return true;
    }

    let failed: Vec<String> = failures.iter().map(|(f, _)| f.to_string()).collect();
    let total = report.outcomes().len();
    notifier.toast(
        ToastLevel::Error,
        &format!(
            "Exported {} of {total} formats; failed: {}",
            total - failures.len(),
            failed.join(", ")
        ),
    );
    false
}

/// Run a geometry operation behind a loading indicator.
///
/// Validation failures are shown verbatim; anything else is reported as a
/// processing failure.
pub fn run_geometry<N, T>(
    notifier: &N,
    what: &str,
    op: impl FnOnce() -> Result<T, ImagingError>,
) -> Option<T>
where
    N: Notifier + ?Sized,
{
    let _loading = LoadingGuard::new(notifier, &format!("Processing {what}..."));
    match op() {
        Ok(value) => Some(value),
        Err(ImagingError::Validation(e)) => {
            log::error!("{what} rejected: {e}");
            notifier.toast(ToastLevel::Error, &validation_message(&e));
            None
        }
        Err(e) => {
            log::error!("{what} failed: {e}");
            notifier.toast(ToastLevel::Error, &format!("Failed to process image: {e}"));
            None
        }
    }
}

fn validation_message(e: &ValidationError) -> String {
    match e {
        ValidationError::TooLarge { max, .. } => {
            format!("File size too large. Please use an image under {}MB.", max / (1024 * 1024))
        }
        e => e.to_string(),
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::export::ExportArtifact;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Event {
        Loading(String),
        Loaded,
        Toast(ToastLevel, String),
    }

    /// Notifier that remembers what it was told.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub events: RefCell<Vec<Event>>,
    }

    impl Notifier for RecordingNotifier {
        fn show_loading(&self, message: &str) {
            self.events.borrow_mut().push(Event::Loading(message.to_string()));
        }

        fn hide_loading(&self) {
            self.events.borrow_mut().push(Event::Loaded);
        }

        fn toast(&self, level: ToastLevel, message: &str) {
            self.events
                .borrow_mut()
                .push(Event::Toast(level, message.to_string()));
        }
    }

    impl RecordingNotifier {
        fn toasts(&self) -> Vec<(ToastLevel, String)> {
            self.events
                .borrow()
                .iter()
                .filter_map(|e| match e {
                    Event::Toast(level, msg) => Some((*level, msg.clone())),
                    _ => None,
                })
                .collect()
        }
    }

    fn artifact() -> ExportArtifact {
        ExportArtifact {
            bytes: vec![1],
            suggested_filename: "mockup-1.png".into(),
            mime_type: "image/png",
        }
    }

    #[test]
    fn success_toasts_and_hides_loading() {
        let notifier = RecordingNotifier::default();
        let out = run_export(&notifier, "PNG", || Ok(artifact()));

        assert!(out.is_some());
        let events = notifier.events.borrow();
        assert_eq!(events[0], Event::Loading("Exporting PNG...".into()));
        assert!(matches!(events[1], Event::Toast(ToastLevel::Success, _)));
        assert_eq!(events.last(), Some(&Event::Loaded));
    }

    #[test]
    fn failure_still_hides_loading() {
        let notifier = RecordingNotifier::default();
        let out: Option<ExportArtifact> = run_export(&notifier, "PDF", || {
            Err(ExportError::Encode("Document writer unavailable".into()))
        });

        assert!(out.is_none());
        assert!(notifier.events.borrow().contains(&Event::Loaded));
        let toasts = notifier.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].0, ToastLevel::Error);
        assert!(toasts[0].1.contains("Document writer unavailable"));
    }

    #[test]
    fn clipboard_failure_has_distinct_message() {
        let denied = ExportError::Clipboard(ClipboardError::Rejected("denied".into()));
        let encode = ExportError::Encode("boom".into());

        let clip = export_failure_message("image", &denied);
        assert!(clip.contains("clipboard permissions"));
        assert!(!export_failure_message("image", &encode).contains("clipboard"));
    }

    #[test]
    fn export_all_summary_names_failed_formats() {
        let notifier = RecordingNotifier::default();
        let report = ExportAllReport {
            raster: Ok(artifact()),
            vector: Ok(artifact()),
            document: Err(ExportError::Encode("no writer".into())),
        };

        assert!(!report_export_all(&notifier, &report));
        assert_eq!(
            notifier.toasts(),
            vec![(
                ToastLevel::Error,
                "Exported 2 of 3 formats; failed: PDF".to_string()
            )]
        );
    }

    #[test]
    fn geometry_validation_message_is_shown() {
        let notifier = RecordingNotifier::default();
        let out: Option<()> = run_geometry(&notifier, "upload", || {
            Err(ValidationError::TooLarge {
                size: 11 * 1024 * 1024,
                max: 10 * 1024 * 1024,
            }
            .into())
        });

        assert!(out.is_none());
        assert_eq!(
            notifier.toasts()[0].1,
            "File size too large. Please use an image under 10MB."
        );
        assert_eq!(notifier.events.borrow().last(), Some(&Event::Loaded));
    }
}
