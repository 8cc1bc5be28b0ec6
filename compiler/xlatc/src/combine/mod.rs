//! Combined output and the header mapping.

use std::collections::BTreeMap;
use std::fmt;

use xlat_codegen::{combined_files, order_types, GeneratedFile, GeneratedType, OrderNote, Options};
use xlat_ir::QualifiedName;

/// How translated types are placed into files.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum CombineMode {
    /// One header/implementation pair per unit.
    #[default]
    PerUnit,
    /// Every type in `{name}.h` / `{name}.m`.
    Combined { name: String },
}

/// Qualified type name → header that declares it.
///
/// Only exported types are listed; the rest are private to their `.m`.
/// Written as one `com.example.Foo=com/example/Foo.h` line per type, sorted
/// by type name, so downstream builds can find the header of any type.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HeaderMapping {
    entries: BTreeMap<String, String>,
}

/// A header mapping line that is not `name=path`.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("header mapping line {line}: expected `name=path`, found `{text}`")]
pub struct MappingError {
    pub line: usize,
    pub text: String,
}

impl HeaderMapping {
    pub fn new() -> Self {
        HeaderMapping::default()
    }

    /// Record `name`; the first header recorded for a name wins.
    pub fn insert(&mut self, name: &QualifiedName, header: impl Into<String>) {
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| header.into());
    }

    pub fn get(&self, name: &QualifiedName) -> Option<&str> {
        self.entries.get(&name.to_string()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by dotted type name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Read mapping lines. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, MappingError> {
        let mut mapping = HeaderMapping::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once('=') {
                Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
                    mapping
                        .entries
                        .entry(name.trim().to_owned())
                        .or_insert_with(|| path.trim().to_owned());
                }
                _ => {
                    return Err(MappingError {
                        line: i + 1,
                        text: raw.to_owned(),
                    })
                }
            }
        }
        Ok(mapping)
    }
}

impl fmt::Display for HeaderMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, header) in &self.entries {
            writeln!(f, "{name}={header}")?;
        }
        Ok(())
    }
}

/// Types of a whole batch in one file pair.
pub(crate) struct Combined {
    pub files: Vec<GeneratedFile>,
    pub notes: Vec<OrderNote>,
    pub mapping: HeaderMapping,
}

/// Order `types` across units and write them into `name.h` / `name.m`.
pub(crate) fn combine(
    name: &str,
    sources: &[&str],
    types: &[&GeneratedType],
    options: &Options,
) -> Combined {
    let deps: Vec<_> = types.iter().map(|t| t.deps()).collect();
    let ordering = order_types(&deps);
    for note in &ordering.notes {
        tracing::info!(%note, "combined output order");
    }
    let ordered: Vec<&GeneratedType> = ordering.order.iter().map(|&i| types[i]).collect();

    let header = format!("{name}.h");
    let mut mapping = HeaderMapping::new();
    for ty in ordered.iter().filter(|t| t.exported) {
        mapping.insert(&ty.name, header.as_str());
    }
    Combined {
        files: combined_files(&header, sources, &ordered, options),
        notes: ordering.notes,
        mapping,
    }
}

#[cfg(test)]
mod tests;
