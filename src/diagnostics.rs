//! Unified, `miette`-based diagnostics for ModKit.
//!
//! A miss while resolving a path is not an error and never reaches this
//! module. Only hard failures do: a typed access whose value does not fit the
//! requested type, and configuration that cannot be loaded.
//!
//! # Error Construction Macros
//!
//! - `err_msg!(Config, "unreadable file {}", name)` for message-only errors.
//! - `err_ctx!(path, segment, "Int", "String")` for a type mismatch anchored at
//!   a path segment. The path text becomes the named source and the segment
//!   span becomes the primary label.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::path::Span;

pub type SourceArc = Arc<NamedSource<String>>;

/// Type-safe error classification, handy for test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    TypeMismatch,
    Config,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::TypeMismatch => "TypeMismatch",
            ErrorType::Config => "Config",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The path text the error refers to (if any).
    pub source: Option<SourceArc>,
    /// The offending segment (if any).
    pub span: Option<Span>,
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Every hard failure ModkitError can report.
#[derive(Debug, Error)]
pub enum ModkitError {
    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: String,
        actual: String,
        ctx: ErrorContext,
    },
    #[error("Config error: {message}")]
    Config {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl ModkitError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            ModkitError::TypeMismatch { ctx, .. } => ctx,
            ModkitError::Config { ctx, .. } => ctx,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            ModkitError::TypeMismatch { .. } => ErrorType::TypeMismatch,
            ModkitError::Config { .. } => ErrorType::Config,
        }
    }

    /// A mismatch not yet tied to a path. Conversions raise these; the
    /// accessor attaches the path afterwards with [`ModkitError::at`].
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        ModkitError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
            ctx: ErrorContext::none(),
        }
    }

    /// Anchors the error at `span` inside `path_text`, unless it already
    /// carries a location.
    pub fn at(mut self, path_text: &str, span: Span) -> Self {
        let ctx = self.ctx_mut();
        if ctx.source.is_none() {
            ctx.source = Some(to_error_source(path_text));
            ctx.span = Some(span);
        }
        self
    }

    /// Adds a help line, unless the error already has one.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        let ctx = self.ctx_mut();
        if ctx.help.is_none() {
            ctx.help = Some(help.into());
        }
        self
    }

    fn ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            ModkitError::TypeMismatch { ctx, .. } => ctx,
            ModkitError::Config { ctx, .. } => ctx,
        }
    }
}

impl Diagnostic for ModkitError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self {
            ModkitError::TypeMismatch { .. } => "modkit::type_mismatch",
            ModkitError::Config { .. } => "modkit::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.get_ctx();
        let span = ctx.span?;
        let text = match self {
            ModkitError::TypeMismatch { actual, .. } => format!("this attribute holds {}", actual),
            ModkitError::Config { message, .. } => message.clone(),
        };
        // Empty segments still get a visible caret.
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        Some(Box::new(
            vec![LabeledSpan::new(Some(text), span.start, len)].into_iter(),
        ))
    }
}

/// Wraps a path string as a named source for error contexts.
pub fn to_error_source<S: AsRef<str>>(source: S) -> SourceArc {
    Arc::new(NamedSource::new("path", source.as_ref().to_string()))
}

/// Constructs a `ModkitError::Config` with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    (Config, $msg:expr, $($arg:expr),+) => {
        $crate::ModkitError::Config {
            message: format!($msg, $($arg),+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
    (Config, $msg:expr) => {
        $crate::ModkitError::Config {
            message: format!("{}", $msg),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs a `ModkitError::TypeMismatch` anchored at a path segment.
///
/// `err_ctx!(path, segment, expected, actual)` or, with a help message,
/// `err_ctx!(path, segment, expected, actual, help)`.
#[macro_export]
macro_rules! err_ctx {
    ($path:expr, $segment:expr, $expected:expr, $actual:expr, $help:expr) => {
        $crate::ModkitError::TypeMismatch {
            expected: $expected.to_string(),
            actual: $actual.to_string(),
            ctx: $crate::ErrorContext::with_source_and_span(
                $crate::diagnostics::to_error_source($path.source()),
                $segment.span,
            )
            .with_help(format!("{}", $help)),
        }
    };
    ($path:expr, $segment:expr, $expected:expr, $actual:expr) => {
        $crate::ModkitError::TypeMismatch {
            expected: $expected.to_string(),
            actual: $actual.to_string(),
            ctx: $crate::ErrorContext::with_source_and_span(
                $crate::diagnostics::to_error_source($path.source()),
                $segment.span,
            ),
        }
    };
}

/// Prints a ModkitError with full miette diagnostics.
pub fn print_error(error: ModkitError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}
