//! Source location tracking shared by the grammar backend and error reporting.

/// A byte-offset span plus the 1-based line/column of its start, as produced
/// by a PEG parse. Carried through `Segment`/`Path` construction so that
/// errors can point at the offending slice of the original `tell` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn from_pest_span(span: pest::Span) -> Self {
        let (line, col) = span.start_pos().line_col();
        Self {
            start: span.start(),
            end: span.end(),
            line,
            col,
        }
    }

    /// Recover a span from a `pest`/`pest_vm` parse failure, so the
    /// reported error points at the real offending position rather than the
    /// start of the input.
    pub fn from_pest_error<R>(error: &pest::error::Error<R>) -> Self {
        let (start, end) = match error.location {
            pest::error::InputLocation::Pos(p) => (p, p),
            pest::error::InputLocation::Span((s, e)) => (s, e),
        };
        let (line, col) = match error.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (l, c),
            pest::error::LineColLocation::Span((l, c), _) => (l, c),
        };
        Self { start, end, line, col }
    }

    /// Recover a span from raw byte offsets into `text`, for cases where a
    /// `ParseNode` (already flattened out of its originating `pest::Span`)
    /// is the only location information left.
    pub fn from_offsets(start: usize, end: usize, text: &str) -> Self {
        let mut line = 1;
        let mut col = 1;
        for ch in text[..start.min(text.len())].chars() {
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        Self { start, end, line, col }
    }

    /// A span with no useful location, used for segments synthesized by
    /// substitution rather than parsed directly from source text.
    pub fn synthetic() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 0,
            col: 0,
        }
    }
}
