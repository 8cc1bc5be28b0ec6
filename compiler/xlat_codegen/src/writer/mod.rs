//! Output buffer shared by the generators.
//!
//! `SourceWriter` owns the text being built for one artifact (a header
//! segment, a class extension, an implementation block), its indentation,
//! the temporary-name counter, and the identifier mappings recorded while
//! writing. Mappings are byte ranges into this writer's own text; when one
//! writer is appended to another the ranges are shifted so they stay exact.

use xlat_ir::Span;

use crate::source_map::SourceMapping;

const INDENT: &str = "  ";

#[derive(Default)]
pub struct SourceWriter {
    output: String,
    indent: usize,
    temp_counter: u32,
    mappings: Vec<SourceMapping>,
    /// Last `#line` emitted, to skip redundant directives.
    last_line: Option<u32>,
}

impl SourceWriter {
    pub fn new() -> Self {
        SourceWriter {
            output: String::with_capacity(4096),
            ..SourceWriter::default()
        }
    }

    /// Generate a unique temporary variable name.
    pub fn fresh_temp(&mut self) -> String {
        let n = self.temp_counter;
        self.temp_counter += 1;
        format!("_tmp{n}")
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str(INDENT);
        }
    }

    pub fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    /// Write an identifier and record where it came from.
    pub fn write_mapped(&mut self, identifier: &str, source: Span) {
        let start = self.output.len();
        self.output.push_str(identifier);
        if !source.is_dummy() {
            self.mappings.push(SourceMapping {
                identifier: identifier.to_owned(),
                source,
                generated: start..self.output.len(),
            });
        }
    }

    /// Write a line with indentation.
    pub fn writeln(&mut self, s: &str) {
        if s.is_empty() {
            self.output.push('\n');
            return;
        }
        self.write_indent();
        self.output.push_str(s);
        self.output.push('\n');
    }

    /// Ensure the output ends with exactly one empty line, unless empty.
    pub fn blank_line(&mut self) {
        if self.output.is_empty() || self.output.ends_with("\n\n") {
            return;
        }
        if !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.output.push('\n');
    }

    /// `#line N "file"` on the first use of a file, `#line N` afterwards.
    /// Directives are unindented and only emitted when the line changes.
    pub fn line_directive(&mut self, line: u32, file: &str) {
        match self.last_line {
            Some(last) if last == line => {}
            Some(_) => {
                self.output.push_str("#line ");
                self.output.push_str(&line.to_string());
                self.output.push('\n');
            }
            None => {
                self.output.push_str("#line ");
                self.output.push_str(&line.to_string());
                self.output.push_str(" \"");
                self.output.push_str(file);
                self.output.push_str("\"\n");
            }
        }
        self.last_line = Some(line);
    }

    /// Move `other`'s text and mappings to the end of this writer.
    pub fn append(&mut self, other: SourceWriter) {
        let offset = self.output.len();
        self.output.push_str(&other.output);
        self.mappings
            .extend(other.mappings.into_iter().map(|m| m.shifted(offset)));
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    /// Take the text and the mappings recorded against it.
    pub fn finish(self) -> (String, Vec<SourceMapping>) {
        (self.output, self.mappings)
    }
}
