//! Error reports for the terminal.
//!
//! Every [`QuillError`] becomes one or more [`miette::Report`]s. A parse
//! error is reported once per diagnostic, each carrying the parsed text as a
//! named source so the labels point into the path data or font shorthand
//! that failed. Diagnostics without their own help get the generic hint of
//! their error code.

use miette::{LabeledSpan, MietteDiagnostic, NamedSource, Report, Severity};

use quill::QuillError;
use quill_parser::error::{Diagnostic, Label};

/// Name shown above the source snippet of a diagnostic.
fn source_name(diag: &Diagnostic) -> &'static str {
    match diag.code() {
        Some(code) if code.is_path_code() => "path data",
        Some(_) => "font",
        None => "input",
    }
}

fn labeled_span(label: &Label) -> LabeledSpan {
    let span = label.span();
    let message = Some(label.message().to_string());
    let range = (span.start(), span.len());
    if label.is_primary() {
        LabeledSpan::new_primary_with_span(message, range)
    } else {
        LabeledSpan::new_with_span(message, range)
    }
}

/// One parser diagnostic over the text it was found in.
pub fn diagnostic_report(diag: &Diagnostic, src: &str) -> Report {
    let mut report = MietteDiagnostic::new(diag.message())
        .with_severity(if diag.severity().is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        })
        .with_labels(diag.labels().iter().map(labeled_span));
    if let Some(code) = diag.code() {
        report = report.with_code(code.to_string());
    }
    if let Some(help) = diag.help_or_hint() {
        report = report.with_help(help);
    }
    Report::new(report).with_source_code(NamedSource::new(source_name(diag), src.to_string()))
}

fn error_code(err: &QuillError) -> &'static str {
    match err {
        QuillError::Io(_) => "quill::io",
        QuillError::Parse { .. } => "quill::parse",
        QuillError::FontNotFound { .. } => "quill::font_not_found",
        QuillError::Font(_) => "quill::font",
        QuillError::Config(_) => "quill::config",
        QuillError::Scene(_) => "quill::scene",
    }
}

fn error_help(err: &QuillError) -> Option<&'static str> {
    match err {
        QuillError::FontNotFound { .. } => {
            Some("register the font's Cufón file under `fonts` in the scene")
        }
        QuillError::Font(_) => {
            Some("glyph fonts are Cufón JSON tables, optionally wrapped in `Cufon.registerFont(...)`")
        }
        QuillError::Scene(_) => {
            Some("parents must be groups defined earlier in the file; colors are CSS colors or `none`")
        }
        _ => None,
    }
}

/// Converts an error into the reports to print, in order.
///
/// [`QuillError::Parse`] yields one report per diagnostic; every other
/// variant yields exactly one.
pub fn to_reports(err: &QuillError) -> Vec<Report> {
    if let QuillError::Parse { err, src } = err {
        return err
            .diagnostics()
            .iter()
            .map(|diag| diagnostic_report(diag, src))
            .collect();
    }

    let mut report = MietteDiagnostic::new(err.to_string()).with_code(error_code(err));
    if let Some(help) = error_help(err) {
        report = report.with_help(help);
    }
    vec![Report::new(report)]
}
