//! Objective-C code generation for resolved compilation units.
//!
//! Translation of one unit runs in four steps per type:
//!
//! 1. **Plan**: selectors, function names, ivars and static state are fixed
//!    once (`plan`), so the header and the body cannot disagree.
//! 2. **Declare**: the `@interface` / `@protocol` text and what it needs
//!    from its file (`decl`).
//! 3. **Implement**: class extension, `@implementation` block, C functions
//!    and reflection metadata (`implementation`, `metadata`).
//! 4. **Assemble**: types are ordered and placed into `.h` / `.m` files
//!    (`order`, `assemble`).
//!
//! Batch-wide state (the [`NameTable`] and the [`TypeIndex`]) is built
//! once before any unit is translated and then shared read-only, so units
//! translate independently and in parallel. A unit either produces all of
//! its artifacts or none.

mod assemble;
mod context;
mod decl;
mod error;
mod implementation;
mod index;
mod literal;
mod lower;
mod mangle;
mod metadata;
mod options;
mod order;
mod plan;
mod signature;
mod source_map;
mod stack;
mod stmt;
mod writer;

use std::collections::BTreeSet;

use xlat_diagnostic::Diagnostic;
use xlat_ir::{CompilationUnit, QualifiedName};

pub use assemble::{combined_files, FileKind, GeneratedFile};
pub use error::TranslateError;
pub use index::{primitive_widens, Assignable, TypeIndex, TypeSummary};
pub use mangle::{camel_case_package, NameTable};
pub use options::{MemoryManagement, OptionError, Options};
pub use order::{order_types, OrderNote, Ordering, TypeDeps};
pub use signature::{build_selector, parse_selector, type_keyword};
pub use source_map::{resolve as resolve_mappings, LineMapping, SourceMapping};

use context::UnitContext;
use plan::TypePlan;
use writer::SourceWriter;

/// Generated text plus the identifier mappings recorded against it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Artifact {
    pub text: String,
    pub mappings: Vec<SourceMapping>,
}

impl From<SourceWriter> for Artifact {
    fn from(writer: SourceWriter) -> Self {
        let (text, mappings) = writer.finish();
        Artifact { text, mappings }
    }
}

/// A supertype whose declaration must precede a type's own.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Supertype {
    pub name: QualifiedName,
    pub objc_name: String,
    /// Header to include; `None` when the runtime prologue declares it.
    pub header: Option<String>,
}

/// Everything generated for one source type.
#[derive(Clone, Debug)]
pub struct GeneratedType {
    pub name: QualifiedName,
    pub objc_name: String,
    /// Include path of the header that declares the type.
    pub header: String,
    /// Declared in the public header. Local, anonymous and private types
    /// are declared at the top of the implementation file instead.
    pub exported: bool,
    pub declaration: Artifact,
    /// Class extension, file-local statics and prototypes.
    pub private_declaration: Artifact,
    pub implementation: Artifact,
    /// `@class` / `@protocol` lines the declaration needs.
    pub forward: Vec<String>,
    pub supertypes: Vec<Supertype>,
    /// Other types named by member declarations.
    pub references: Vec<QualifiedName>,
    /// Headers the implementation needs beyond its own.
    pub body_includes: BTreeSet<String>,
}

impl GeneratedType {
    /// Ordering input for [`order_types`].
    pub fn deps(&self) -> TypeDeps {
        TypeDeps {
            name: self.name.clone(),
            supertypes: self.supertypes.iter().map(|s| s.name.clone()).collect(),
            references: self.references.clone(),
        }
    }
}

/// The result of translating one unit.
#[derive(Clone, Debug)]
pub struct UnitOutput {
    /// Types in declaration order: supertypes declared in the unit come
    /// before their subtypes.
    pub types: Vec<GeneratedType>,
    pub files: Vec<GeneratedFile>,
    pub warnings: Vec<Diagnostic>,
}

/// Translate one unit.
///
/// `names` must have had every unit of the batch registered and `index`
/// must cover the whole batch. Any error discards the unit's output.
pub fn translate_unit(
    unit: &CompilationUnit,
    names: &NameTable,
    index: &TypeIndex,
    options: &Options,
) -> Result<UnitOutput, TranslateError> {
    let _span = tracing::debug_span!("translate_unit", unit = %unit.file_name).entered();
    let cx = UnitContext::new(unit, names, index, options);

    let mut types = Vec::new();
    for decl in unit.all_types() {
        types.push(translate_type(&cx, decl)?);
    }

    // Within a unit only supertypes constrain the order; nested types
    // otherwise follow their outer type.
    let deps: Vec<TypeDeps> = types
        .iter()
        .map(|t| TypeDeps {
            references: Vec::new(),
            ..t.deps()
        })
        .collect();
    let ordering = order_types(&deps);
    let mut slots: Vec<Option<GeneratedType>> = types.into_iter().map(Some).collect();
    let types: Vec<GeneratedType> = ordering
        .order
        .iter()
        .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
        .collect();

    let stem = index::output_stem(unit);
    let files = assemble::unit_files(&stem, &unit.file_name, &types, options);
    tracing::debug!(types = types.len(), files = files.len(), "unit translated");
    Ok(UnitOutput {
        types,
        files,
        warnings: cx.take_warnings(),
    })
}

fn translate_type(
    cx: &UnitContext<'_>,
    decl: &xlat_ir::TypeDecl,
) -> Result<GeneratedType, TranslateError> {
    mangle::validate_type_directives(decl)?;
    let plan = TypePlan::build(cx, decl)?;
    let declaration = decl::declare_type(cx, &plan)?;
    cx.take_referenced();
    let implementation = implementation::implement_type(cx, &plan)?;

    let supertypes = declaration
        .supertypes
        .iter()
        .map(|name| Supertype {
            objc_name: cx.names.full_name(name),
            header: cx.index.include_path(name),
            name: name.clone(),
        })
        .collect();
    let body_includes = cx
        .take_referenced()
        .iter()
        .filter_map(|name| cx.index.include_path(name))
        .collect();
    let header = cx
        .index
        .get(&decl.name)
        .map_or_else(|| format!("{}.h", index::output_stem(cx.unit)), |s| s.header.clone());

    Ok(GeneratedType {
        name: decl.name.clone(),
        objc_name: plan.name.clone(),
        header,
        exported: plan.in_header,
        declaration: declaration.out.into(),
        private_declaration: implementation.private.into(),
        implementation: implementation.body.into(),
        forward: declaration.forward,
        supertypes,
        references: declaration.references.into_iter().collect(),
        body_includes,
    })
}

#[cfg(test)]
mod tests;
