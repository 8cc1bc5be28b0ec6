//! Per-unit generation state shared by the header, body and metadata
//! generators.

use std::cell::RefCell;
use std::collections::BTreeSet;

use xlat_diagnostic::{Diagnostic, ErrorCode};
use xlat_ir::{CompilationUnit, LineIndex, QualifiedName, ResolvedType, Span, TypeDecl};

use crate::lower::TypeLowering;
use crate::{NameTable, Options, TypeIndex};

pub(crate) struct UnitContext<'a> {
    pub unit: &'a CompilationUnit,
    pub names: &'a NameTable,
    pub index: &'a TypeIndex,
    pub options: &'a Options,
    pub types: TypeLowering<'a>,
    lines: LineIndex,
    warnings: RefCell<Vec<Diagnostic>>,
    /// Types named by method bodies, for the implementation's includes.
    referenced: RefCell<BTreeSet<QualifiedName>>,
}

impl<'a> UnitContext<'a> {
    pub fn new(
        unit: &'a CompilationUnit,
        names: &'a NameTable,
        index: &'a TypeIndex,
        options: &'a Options,
    ) -> Self {
        UnitContext {
            unit,
            names,
            index,
            options,
            types: TypeLowering::new(names, options),
            lines: unit.line_index(),
            warnings: RefCell::new(Vec::new()),
            referenced: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn warn(&self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let message = message.into();
        tracing::warn!(code = %code, file = %self.unit.file_name, "{message}");
        self.warnings.borrow_mut().push(
            Diagnostic::warning(code)
                .with_message(message)
                .with_label(span, "here"),
        );
    }

    pub fn take_warnings(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.warnings.borrow_mut())
    }

    /// 1-based source line of a span.
    pub fn line(&self, span: Span) -> u32 {
        self.lines.line(span.start)
    }

    pub fn source_text(&self, span: Span) -> Option<&'a str> {
        if span.is_dummy() {
            return None;
        }
        span.slice(&self.unit.source)
    }

    pub fn find_decl(&self, name: &QualifiedName) -> Option<&'a TypeDecl> {
        self.unit.find_type(name)
    }

    /// Note a type used by generated code so its header gets included.
    pub fn reference(&self, ty: &ResolvedType) {
        match ty.erasure() {
            ResolvedType::Class(d) | ResolvedType::Interface(d) => {
                self.referenced.borrow_mut().insert(d.name);
            }
            ResolvedType::Array(a) => self.reference(&a.element),
            _ => {}
        }
    }

    pub fn reference_name(&self, name: &QualifiedName) {
        self.referenced.borrow_mut().insert(name.clone());
    }

    /// Types referenced since the last call.
    pub fn take_referenced(&self) -> BTreeSet<QualifiedName> {
        std::mem::take(&mut *self.referenced.borrow_mut())
    }
}
