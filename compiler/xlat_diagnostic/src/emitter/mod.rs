//! Plain-text diagnostic rendering.
//!
//! ```text
//! com/example/Foo.java:12:5: error[E5002]: selector `fooWithId:` is synthesized twice
//!   note: both parameters erase to `Object`
//! ```

use std::fmt::Write as _;
use std::io::{self, Write};

use xlat_ir::LineIndex;

use crate::{Diagnostic, Severity};

/// Sink for rendered diagnostics.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic) -> io::Result<()>;

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) -> io::Result<()> {
        for diag in diagnostics {
            self.emit(diag)?;
        }
        Ok(())
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) -> io::Result<()>;
}

/// Render one diagnostic as `file:line:col: severity[code]: message`.
pub fn render(diagnostic: &Diagnostic, file_name: &str, lines: &LineIndex) -> String {
    let mut out = match diagnostic.primary_span() {
        Some(span) => {
            let (line, col) = lines.line_col(span.start);
            format!("{file_name}:{line}:{col}: {diagnostic}")
        }
        None => format!("{file_name}: {diagnostic}"),
    };
    for label in diagnostic.labels.iter().filter(|l| !l.is_primary) {
        let (line, col) = lines.line_col(label.span.start);
        let _ = write!(out, "\n  {file_name}:{line}:{col}: {}", label.message);
    }
    for note in &diagnostic.notes {
        out.push_str("\n  note: ");
        out.push_str(note);
    }
    out
}

/// Writes rendered diagnostics for one unit to any `Write`.
pub struct PlainEmitter<W: Write> {
    writer: W,
    file_name: String,
    lines: LineIndex,
}

impl<W: Write> PlainEmitter<W> {
    pub fn new(writer: W, file_name: impl Into<String>, source: &str) -> Self {
        PlainEmitter {
            writer,
            file_name: file_name.into(),
            lines: LineIndex::build(source),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticEmitter for PlainEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        writeln!(self.writer, "{}", render(diagnostic, &self.file_name, &self.lines))
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) -> io::Result<()> {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        match (error_count, warning_count) {
            (0, 0) => Ok(()),
            (0, w) => writeln!(self.writer, "{} {w} warning{}", Severity::Warning, plural(w)),
            (e, 0) => writeln!(self.writer, "{} {e} error{}", Severity::Error, plural(e)),
            (e, w) => writeln!(
                self.writer,
                "{} {e} error{}, {w} warning{}",
                Severity::Error,
                plural(e),
                plural(w)
            ),
        }
    }
}
