//! Source positions threaded through generated text.
//!
//! Generators record one [`SourceMapping`] per emitted identifier that has
//! a source position (method selectors, field names). Ranges are byte
//! offsets into the final artifact text. [`resolve`] turns them into
//! line/column pairs for tools that consume the table.

use std::ops::Range;

use xlat_ir::{LineIndex, Span};

/// One identifier occurrence: where it came from, where it landed.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SourceMapping {
    pub identifier: String,
    pub source: Span,
    pub generated: Range<usize>,
}

impl SourceMapping {
    #[must_use]
    pub(crate) fn shifted(mut self, offset: usize) -> Self {
        self.generated = self.generated.start + offset..self.generated.end + offset;
        self
    }
}

/// A mapping with both ends expressed as 1-based line and column.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineMapping {
    pub identifier: String,
    pub source_line: u32,
    pub source_column: u32,
    pub generated_line: u32,
    pub generated_column: u32,
}

/// Resolve byte ranges against the source and the generated text.
pub fn resolve(mappings: &[SourceMapping], source: &LineIndex, generated: &str) -> Vec<LineMapping> {
    let generated_lines = LineIndex::build(generated);
    mappings
        .iter()
        .map(|m| {
            let (source_line, source_column) = source.line_col(m.source.start);
            let offset = u32::try_from(m.generated.start).unwrap_or(u32::MAX);
            let (generated_line, generated_column) = generated_lines.line_col(offset);
            LineMapping {
                identifier: m.identifier.clone(),
                source_line,
                source_column,
                generated_line,
                generated_column,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests;
