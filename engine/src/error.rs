use crate::ast::Span;
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::fmt;
use std::sync::Arc;

pub type FactumResult<T> = Result<T, FactumError>;

/// Detailed, source-located error information shared by the
/// `Parse`/`Semantic`/`Runtime` variants of `FactumError`.
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub message: String,
    pub span: Span,
    pub source_id: String,
    pub source_text: Arc<str>,
}

/// Errors surfaced from the grammar boundary and the engine.
///
/// `MergeConflict` (in `matching`) never appears here: it is an internal
/// error type that `Engine::goal` catches and discards, matching this
/// domain's error-handling design rather than this enum's shape.
#[derive(Debug, Clone)]
pub enum FactumError {
    /// A sentence failed to parse against the loaded grammar.
    Parse(Box<ErrorDetails>),
    /// A sentence parsed but could not be turned into a well-formed `Rule`
    /// or `Fact` (e.g. an `rm` target that does not parse as a fact).
    Semantic(Box<ErrorDetails>),
    /// Substitution produced text that failed to re-parse.
    Runtime(Box<ErrorDetails>),
    /// A generic engine-level failure with no associated source span.
    Engine(String),
    /// Raised from `Engine::new` when the supplied grammar cannot be
    /// compiled at all. Fatal: there is no engine to recover into.
    GrammarMisconfig(String),
    /// A configured resource limit (§ `ResourceLimits`) was hit, raised at
    /// the boundary that would otherwise be breached.
    ResourceLimitExceeded(String),
}

impl FactumError {
    pub fn parse(message: impl Into<String>, span: Span, source_text: impl Into<Arc<str>>) -> Self {
        Self::Parse(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_id: "<tell>".to_string(),
            source_text: source_text.into(),
        }))
    }

    pub fn semantic(message: impl Into<String>, span: Span, source_text: impl Into<Arc<str>>) -> Self {
        Self::Semantic(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_id: "<tell>".to_string(),
            source_text: source_text.into(),
        }))
    }

    pub fn runtime(message: impl Into<String>, span: Span, source_text: impl Into<Arc<str>>) -> Self {
        Self::Runtime(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_id: "<substitution>".to_string(),
            source_text: source_text.into(),
        }))
    }

    pub fn grammar_misconfig(message: impl Into<String>) -> Self {
        Self::GrammarMisconfig(message.into())
    }

    pub fn resource_limit(message: impl Into<String>) -> Self {
        Self::ResourceLimitExceeded(message.into())
    }
}

impl fmt::Display for FactumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactumError::Parse(d) => format_with_ariadne(f, "Parse error", d),
            FactumError::Semantic(d) => format_with_ariadne(f, "Semantic error", d),
            FactumError::Runtime(d) => format_with_ariadne(f, "Runtime error", d),
            FactumError::Engine(msg) => write!(f, "Engine error: {msg}"),
            FactumError::GrammarMisconfig(msg) => write!(f, "Grammar misconfigured: {msg}"),
            FactumError::ResourceLimitExceeded(msg) => write!(f, "Resource limit exceeded: {msg}"),
        }
    }
}

fn format_with_ariadne(f: &mut fmt::Formatter<'_>, kind: &str, details: &ErrorDetails) -> fmt::Result {
    let mut output = Vec::new();
    let span = details.span.start..details.span.end.max(details.span.start + 1);
    let report = Report::build(ReportKind::Error, details.source_id.clone(), details.span.start)
        .with_message(format!("{kind}: {}", details.message))
        .with_label(
            Label::new((details.source_id.clone(), span))
                .with_message(&details.message)
                .with_color(Color::Red),
        )
        .finish();

    match report.write((details.source_id.clone(), Source::from(&*details.source_text)), &mut output) {
        Ok(()) => write!(f, "{}", String::from_utf8_lossy(&output)),
        Err(_) => write!(f, "{kind}: {}", details.message),
    }
}

impl std::error::Error for FactumError {}
