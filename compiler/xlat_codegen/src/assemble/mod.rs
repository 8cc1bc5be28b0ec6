//! Placing generated types into `.h` / `.m` files.
//!
//! A unit normally yields one header and one implementation file named
//! after its source path. With separate headers every exported nested type
//! gets its own pair. A combined build (see `xlatc`) puts the types of many
//! units into a single pair.
//!
//! Segmented headers wrap each type in its own guard so that a client can
//! include just the types it needs:
//!
//! ```text
//! #define RESTRICT_UnitExample 1
//! #define INCLUDE_UnitExample_Inner 1
//! #include "unit/Example.h"
//! ```

use std::collections::BTreeSet;

use crate::source_map::SourceMapping;
use crate::{Artifact, GeneratedType, Options};

/// What a generated file holds.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FileKind {
    Header,
    Implementation,
}

/// One output file, ready for the writer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedFile {
    /// Path relative to the output root (`unit/Example.h`).
    pub path: String,
    pub kind: FileKind,
    pub text: String,
    /// Identifier mappings into `text`.
    pub mappings: Vec<SourceMapping>,
}

/// Text being assembled, with mappings kept exact across appends.
#[derive(Default)]
struct FileText {
    text: String,
    mappings: Vec<SourceMapping>,
}

impl FileText {
    fn line(&mut self, s: &str) {
        self.text.push_str(s);
        self.text.push('\n');
    }

    fn blank_line(&mut self) {
        if self.text.is_empty() || self.text.ends_with("\n\n") {
            return;
        }
        self.text.push('\n');
    }

    fn artifact(&mut self, artifact: &Artifact) {
        let offset = self.text.len();
        self.text.push_str(&artifact.text);
        self.mappings.extend(
            artifact
                .mappings
                .iter()
                .cloned()
                .map(|m| m.shifted(offset)),
        );
    }

    fn finish(self, path: String, kind: FileKind) -> GeneratedFile {
        GeneratedFile {
            path,
            kind,
            text: self.text,
            mappings: self.mappings,
        }
    }
}

/// Files for one unit, in header-then-implementation pairs.
///
/// `types` must already be in declaration order. Types that are not
/// exported always stay with the unit's main pair.
pub(crate) fn unit_files(
    stem: &str,
    source: &str,
    types: &[GeneratedType],
    options: &Options,
) -> Vec<GeneratedFile> {
    if types.is_empty() {
        return Vec::new();
    }
    let main_header = format!("{stem}.h");
    let mut groups: Vec<(String, Vec<&GeneratedType>)> = vec![(main_header.clone(), Vec::new())];
    for ty in types {
        let header = if ty.exported { &ty.header } else { &main_header };
        match groups.iter_mut().find(|(h, _)| h == header) {
            Some((_, group)) => group.push(ty),
            None => groups.push((header.clone(), vec![ty])),
        }
    }

    let mut files = Vec::with_capacity(groups.len() * 2);
    for (header, group) in groups {
        let guard = guard_name(&header, &group);
        files.extend(pair(&header, &guard, &[source], &group, options));
    }
    files
}

/// One header/implementation pair holding every type of a batch.
pub fn combined_files(
    header: &str,
    sources: &[&str],
    types: &[&GeneratedType],
    options: &Options,
) -> Vec<GeneratedFile> {
    let guard = guard_name(header, types);
    pair(header, &guard, sources, types, options).into()
}

/// Macro stem for a file: the first exported type whose header it is,
/// else the path flattened.
fn guard_name(header: &str, types: &[&GeneratedType]) -> String {
    if let Some(ty) = types.iter().find(|t| t.exported && t.header == header) {
        return ty.objc_name.clone();
    }
    let stem = header.strip_suffix(".h").unwrap_or(header);
    let mut out = String::with_capacity(stem.len());
    for segment in stem.split('/').filter(|s| !s.is_empty()) {
        out.push_str(&crate::mangle::capitalize(segment));
    }
    out
}

fn pair(
    header: &str,
    guard: &str,
    sources: &[&str],
    types: &[&GeneratedType],
    options: &Options,
) -> [GeneratedFile; 2] {
    let exported: Vec<&GeneratedType> = types.iter().copied().filter(|t| t.exported).collect();
    let header_file = if options.segmented_headers {
        segmented_header(guard, sources, &exported, options)
    } else {
        plain_header(guard, sources, &exported, options)
    };
    let implementation = implementation(header, sources, types, options);
    let stem = header.strip_suffix(".h").unwrap_or(header);
    [
        header_file.finish(header.to_owned(), FileKind::Header),
        implementation.finish(format!("{stem}.m"), FileKind::Implementation),
    ]
}

fn file_comment(out: &mut FileText, sources: &[&str]) {
    out.line("//");
    out.line("//  Generated by the J2ObjC translator.  DO NOT EDIT!");
    for source in sources {
        out.line(&format!("//  source: {source}"));
    }
    out.line("//");
    out.blank_line();
}

/// Objective-C names of the types declared in one file.
fn declared_here<'t>(types: &[&'t GeneratedType]) -> BTreeSet<&'t str> {
    types.iter().map(|t| t.objc_name.as_str()).collect()
}

// ── Headers ──

fn segmented_header(
    guard: &str,
    sources: &[&str],
    types: &[&GeneratedType],
    options: &Options,
) -> FileText {
    let mut out = FileText::default();
    file_comment(&mut out, sources);
    out.line("#include \"J2ObjC_header.h\"");
    out.blank_line();
    out.line(&format!("#pragma push_macro(\"INCLUDE_ALL_{guard}\")"));
    out.line(&format!("#ifdef RESTRICT_{guard}"));
    out.line(&format!("#define INCLUDE_ALL_{guard} 0"));
    out.line("#else");
    out.line(&format!("#define INCLUDE_ALL_{guard} 1"));
    out.line("#endif");
    out.line(&format!("#undef RESTRICT_{guard}"));

    // A restricted include of a subtype must pull in its local supertypes,
    // whose segments come earlier in the file.
    let local = declared_here(types);
    for ty in types.iter().rev() {
        for sup in ty.supertypes.iter().filter(|s| local.contains(s.objc_name.as_str())) {
            out.line(&format!("#ifdef INCLUDE_{}", ty.objc_name));
            out.line(&format!("#define INCLUDE_{} 1", sup.objc_name));
            out.line("#endif");
        }
    }
    out.blank_line();
    if options.nullability {
        out.line("NS_ASSUME_NONNULL_BEGIN");
        out.blank_line();
    }

    for ty in types {
        let name = &ty.objc_name;
        out.line(&format!(
            "#if !defined ({name}_) && (INCLUDE_ALL_{guard} || defined(INCLUDE_{name}))"
        ));
        out.line(&format!("#define {name}_"));
        out.blank_line();
        for sup in &ty.supertypes {
            if local.contains(sup.objc_name.as_str()) {
                continue;
            }
            if let Some(path) = &sup.header {
                out.line(&format!("#define RESTRICT_{} 1", sup.objc_name));
                out.line(&format!("#define INCLUDE_{} 1", sup.objc_name));
                out.line(&format!("#include \"{path}\""));
                out.blank_line();
            }
        }
        if !ty.forward.is_empty() {
            for line in &ty.forward {
                out.line(line);
            }
            out.blank_line();
        }
        out.artifact(&ty.declaration);
        out.blank_line();
        out.line("#endif");
        out.blank_line();
    }

    if options.nullability {
        out.line("NS_ASSUME_NONNULL_END");
        out.blank_line();
    }
    out.line(&format!("#pragma pop_macro(\"INCLUDE_ALL_{guard}\")"));
    out
}

fn plain_header(
    guard: &str,
    sources: &[&str],
    types: &[&GeneratedType],
    options: &Options,
) -> FileText {
    let mut out = FileText::default();
    file_comment(&mut out, sources);
    out.line(&format!("#ifndef {guard}_H"));
    out.line(&format!("#define {guard}_H"));
    out.blank_line();
    out.line("#include \"J2ObjC_header.h\"");

    let local = declared_here(types);
    let includes: BTreeSet<&str> = types
        .iter()
        .flat_map(|t| &t.supertypes)
        .filter(|s| !local.contains(s.objc_name.as_str()))
        .filter_map(|s| s.header.as_deref())
        .collect();
    for path in includes {
        out.line(&format!("#include \"{path}\""));
    }
    out.blank_line();

    let forward: BTreeSet<&str> = types
        .iter()
        .flat_map(|t| &t.forward)
        .map(String::as_str)
        .collect();
    if !forward.is_empty() {
        for line in forward {
            out.line(line);
        }
        out.blank_line();
    }
    if options.nullability {
        out.line("NS_ASSUME_NONNULL_BEGIN");
        out.blank_line();
    }
    for ty in types {
        out.artifact(&ty.declaration);
        out.blank_line();
    }
    if options.nullability {
        out.line("NS_ASSUME_NONNULL_END");
        out.blank_line();
    }
    out.line(&format!("#endif // {guard}_H"));
    out
}

// ── Implementation ──

fn implementation(
    header: &str,
    sources: &[&str],
    types: &[&GeneratedType],
    options: &Options,
) -> FileText {
    let mut out = FileText::default();
    file_comment(&mut out, sources);
    out.line("#include \"J2ObjC_source.h\"");
    out.line(&format!("#include \"{header}\""));

    let exported_includes: BTreeSet<&str> = types
        .iter()
        .filter(|t| t.exported)
        .flat_map(|t| &t.supertypes)
        .filter_map(|s| s.header.as_deref())
        .collect();
    let mut includes: BTreeSet<&str> = types
        .iter()
        .flat_map(|t| {
            t.body_includes
                .iter()
                .map(String::as_str)
                .chain(t.supertypes.iter().filter_map(|s| s.header.as_deref()))
        })
        .filter(|path| *path != header && !exported_includes.contains(path))
        .collect();
    // Headers of types in this pair are already covered by `header`.
    for ty in types {
        includes.remove(ty.header.as_str());
    }
    for path in includes {
        out.line(&format!("#include \"{path}\""));
    }
    out.blank_line();

    let label = header.strip_suffix(".h").unwrap_or(header);
    if options.is_arc() {
        out.line("#if !__has_feature(objc_arc)");
        out.line(&format!("#error \"{label} must be compiled with ARC (-fobjc-arc)\""));
    } else {
        out.line("#if __has_feature(objc_arc)");
        out.line(&format!(
            "#error \"{label} must not be compiled with ARC (-fobjc-arc)\""
        ));
    }
    out.line("#endif");
    out.blank_line();

    for ty in types.iter().filter(|t| !t.exported) {
        for line in &ty.forward {
            out.line(line);
        }
        out.blank_line();
        out.artifact(&ty.declaration);
        out.blank_line();
    }
    for ty in types {
        out.artifact(&ty.private_declaration);
        out.blank_line();
    }
    for ty in types {
        out.artifact(&ty.implementation);
        out.blank_line();
    }
    while out.text.ends_with("\n\n") {
        out.text.pop();
    }
    out
}

#[cfg(test)]
mod tests;
