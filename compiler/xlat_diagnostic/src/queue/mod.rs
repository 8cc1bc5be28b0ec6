//! Per-unit diagnostic collection.
//!
//! Diagnostics are positioned through the unit's [`LineIndex`], deduplicated
//! (the generator can reach the same bad node from both the header and the
//! implementation pass), capped by an error limit, and flushed in source
//! order.

use xlat_ir::{LineIndex, Span};

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop a diagnostic identical in code, span and message to one
    /// already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 20,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: true,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct QueuedDiagnostic {
    diagnostic: Diagnostic,
    line: u32,
    column: u32,
}

#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<QueuedDiagnostic>,
    error_count: usize,
    limit_reported: bool,
    lines: LineIndex,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Queue for a unit whose source is `source`.
    pub fn new(source: &str) -> Self {
        Self::with_config(source, DiagnosticConfig::default())
    }

    pub fn with_config(source: &str, config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            error_count: 0,
            limit_reported: false,
            lines: LineIndex::build(source),
            config,
        }
    }

    /// Add a diagnostic. Returns `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        if diag.is_error() && self.limit_reached() {
            if !self.limit_reported {
                self.limit_reported = true;
                let span = diag.primary_span().unwrap_or(Span::DUMMY);
                self.push(too_many_errors(self.config.error_limit, span));
            }
            return false;
        }
        if self.config.deduplicate && self.diagnostics.iter().any(|q| q.diagnostic == diag) {
            return false;
        }
        if diag.is_error() {
            self.error_count += 1;
        }
        self.push(diag);
        true
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        let (line, column) = diagnostic
            .primary_span()
            .map_or((1, 1), |span| self.lines.line_col(span.start));
        self.diagnostics.push(QueuedDiagnostic {
            diagnostic,
            line,
            column,
        });
    }

    /// Add an error and get proof it was recorded.
    ///
    /// Filtered errors still count: the limit and dedup filters only drop
    /// errors when an earlier one is already queued.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        self.add(diag);
        ErrorGuaranteed::new()
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 1-based (line, column) of a span in this queue's unit.
    pub fn position(&self, span: Span) -> (u32, u32) {
        self.lines.line_col(span.start)
    }

    /// Drain diagnostics in source order. Stable for equal positions.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|d| (d.line, d.column));
        self.error_count = 0;
        self.limit_reported = false;
        self.diagnostics.drain(..).map(|d| d.diagnostic).collect()
    }

    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().map(|d| &d.diagnostic)
    }
}

#[cold]
fn too_many_errors(limit: usize, span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!("aborting after {limit} errors in this unit"))
        .with_label(span, "error limit reached here")
}
