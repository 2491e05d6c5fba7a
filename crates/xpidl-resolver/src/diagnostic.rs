//! Diagnostic infrastructure for error reporting
//!
//! Renders resolver errors and warnings with source code context and
//! supports a JSON form for build-system integration.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use xpidl_parser::{Location, ParseError, Span};

use crate::error::{ResolveError, Warning};

/// Error code for a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A diagnostic message with source code context
pub struct Diagnostic {
    /// The underlying codespan diagnostic
    inner: CsDiagnostic<usize>,
    /// Error code (e.g., "E1002")
    code: Option<ErrorCode>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create a note diagnostic
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, message)
    }

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code.clone());
        self.inner = self.inner.with_code(code.0);
        self
    }

    /// Add a primary label (main error location)
    pub fn with_primary_label(mut self, file_id: usize, span: Span, message: impl Into<String>) -> Self {
        let label = Label::primary(file_id, span.start..span.end).with_message(message);
        self.inner = self.inner.with_labels(vec![label]);
        self
    }

    /// Add a secondary label (related location)
    pub fn with_secondary_label(mut self, file_id: usize, span: Span, message: impl Into<String>) -> Self {
        let label = Label::secondary(file_id, span.start..span.end).with_message(message);
        let existing_labels = std::mem::take(&mut self.inner.labels);
        let mut new_labels = existing_labels;
        new_labels.push(label);
        self.inner.labels = new_labels;
        self
    }

    /// Add a note (additional context)
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    /// Add a help suggestion
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    /// Create diagnostic from a ResolveError. The file_id must identify the
    /// file the error's location points into.
    pub fn from_resolve_error(error: &ResolveError, file_id: usize) -> Self {
        let diag = Diagnostic::error(error.to_string()).with_code(error_code(error));
        match error_location(error) {
            Some(location) if !location.is_builtin() => {
                diag.with_primary_label(file_id, location.span, label_text(error))
            }
            _ => diag,
        }
    }

    /// Create diagnostic from a collected Warning
    pub fn from_warning(warning: &Warning, file_id: usize) -> Self {
        Diagnostic::warning(&warning.message)
            .with_code(ErrorCode("W1001"))
            .with_primary_label(file_id, warning.location.span, "declared here")
    }

    /// Emit the diagnostic to stderr with colors
    pub fn emit(&self, files: &SimpleFiles<String, String>) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        let config = codespan_reporting::term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)
    }

    /// Get the underlying codespan diagnostic (for testing/custom rendering)
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Convert to JSON representation for build-system integration
    pub fn to_json(&self, files: &SimpleFiles<String, String>) -> Result<String, serde_json::Error> {
        let json_diag = JsonDiagnostic::from_diagnostic(self, files);
        serde_json::to_string_pretty(&json_diag)
    }
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    /// Error code (e.g., "E1002")
    pub code: Option<String>,
    /// Severity level
    pub severity: String,
    /// Main error message
    pub message: String,
    /// Source locations with labels
    pub labels: Vec<JsonLabel>,
    /// Additional notes and help
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    /// File path
    pub file: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    /// End line (1-indexed)
    pub end_line: usize,
    /// End column (1-indexed)
    pub end_column: usize,
    /// Label message
    pub message: Option<String>,
    /// Label style (primary or secondary)
    pub style: String,
}

impl JsonDiagnostic {
    /// Convert a Diagnostic to JSON representation
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag.inner.labels.iter().filter_map(|label| {
            let file_id = label.file_id;
            let file_name = files.get(file_id).ok()?.name().to_string();

            let start = label.range.start;
            let end = label.range.end;

            let start_location = files.get(file_id).ok()?.location((), start).ok()?;
            let end_location = files.get(file_id).ok()?.location((), end).ok()?;

            Some(JsonLabel {
                file: file_name,
                start_line: start_location.line_number,
                start_column: start_location.column_number,
                end_line: end_location.line_number,
                end_column: end_location.column_number,
                message: Some(label.message.clone()),
                style: match label.style {
                    codespan_reporting::diagnostic::LabelStyle::Primary => "primary",
                    codespan_reporting::diagnostic::LabelStyle::Secondary => "secondary",
                }.to_string(),
            })
        }).collect();

        JsonDiagnostic {
            code: diag.code.as_ref().map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Get error code for a ResolveError
pub fn error_code(error: &ResolveError) -> ErrorCode {
    match error {
        ResolveError::Parse(_) => ErrorCode("E1001"),
        ResolveError::Name { .. } => ErrorCode("E1002"),
        ResolveError::Type { .. } => ErrorCode("E1003"),
        ResolveError::Constraint { .. } => ErrorCode("E1004"),
        ResolveError::FileNotFound { .. } => ErrorCode("E1005"),
        ResolveError::Io { .. } => ErrorCode("E1006"),
    }
}

/// The location an error points at, when it has one.
pub fn error_location(error: &ResolveError) -> Option<&Location> {
    match error {
        ResolveError::Parse(ParseError::Lex(lex)) => Some(lex.location()),
        ResolveError::Parse(ParseError::Directive(d)) => Some(&d.location),
        ResolveError::Parse(ParseError::Syntax { location, .. }) => Some(location),
        ResolveError::Parse(ParseError::UnexpectedEof { .. }) => None,
        ResolveError::Name { location, .. }
        | ResolveError::Type { location, .. }
        | ResolveError::Constraint { location, .. }
        | ResolveError::FileNotFound { location, .. } => Some(location),
        ResolveError::Io { .. } => None,
    }
}

fn label_text(error: &ResolveError) -> &'static str {
    match error {
        ResolveError::Parse(_) => "could not be parsed",
        ResolveError::Name { .. } => "name error",
        ResolveError::Type { .. } => "type error",
        ResolveError::Constraint { .. } => "constraint violated",
        ResolveError::FileNotFound { .. } => "included here",
        ResolveError::Io { .. } => "",
    }
}

/// Helper to create a SimpleFiles instance from source code
pub fn create_files(path: impl Into<PathBuf>, source: impl Into<String>) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(path.into().display().to_string(), source.into());
    files
}
