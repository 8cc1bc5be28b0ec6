//! Type lowering: source types to Objective-C type spellings.
//!
//! Two spellings exist for every type. Body sites (locals, casts, function
//! bodies) use the erased runtime type. Declaration sites may additionally
//! carry the generics overlay and intersection bounds, which document the
//! type for callers but never change dispatch.

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use xlat_ir::{
    well_known, Annotation, ArrayType, MemoryHints, PrimitiveKind, ResolvedType, Span, TypeDecl,
};

use crate::mangle::capitalize;
use crate::{NameTable, Options, TranslateError};

/// How a stored reference participates in reference counting.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Ownership {
    Strong,
    /// Zeroing weak reference; never retained or released.
    Weak,
    /// Plain pointer with no ownership, used for `@Weak` locals.
    Unretained,
}

impl Ownership {
    /// Fields default to strong; only an explicit `@Weak` demotes them.
    pub fn of_field(ty: &ResolvedType, hints: MemoryHints) -> Self {
        if ty.is_reference() && hints.contains(MemoryHints::WEAK) {
            Ownership::Weak
        } else {
            Ownership::Strong
        }
    }

    /// The `this$0_` back-pointer of a nested type.
    pub fn of_outer(decl: &TypeDecl) -> Self {
        if decl.memory_hints().contains(MemoryHints::WEAK_OUTER) {
            Ownership::Weak
        } else {
            Ownership::Strong
        }
    }

    pub fn of_local(ty: &ResolvedType, annotations: &[Annotation]) -> Self {
        if ty.is_reference() && xlat_ir::find_annotation(annotations, well_known::WEAK).is_some() {
            Ownership::Unretained
        } else {
            Ownership::Strong
        }
    }

    pub fn is_strong(self) -> bool {
        self == Ownership::Strong
    }
}

/// `jint`, `jboolean`, ... and `void`.
pub fn primitive_type(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Boolean => "jboolean",
        PrimitiveKind::Byte => "jbyte",
        PrimitiveKind::Char => "jchar",
        PrimitiveKind::Short => "jshort",
        PrimitiveKind::Int => "jint",
        PrimitiveKind::Long => "jlong",
        PrimitiveKind::Float => "jfloat",
        PrimitiveKind::Double => "jdouble",
        PrimitiveKind::Void => "void",
    }
}

/// Capitalized primitive keyword used in runtime helper names (`Int` in
/// `IOSIntArray`, `JreURShiftAssignInt`).
pub fn primitive_title(kind: PrimitiveKind) -> String {
    capitalize(kind.keyword())
}

/// Runtime array class: a specialized class for one-dimensional primitive
/// arrays, `IOSObjectArray` for everything else.
pub fn array_class(array: &ArrayType) -> String {
    match array.element.as_primitive() {
        Some(kind) if array.dimensions == 1 => format!("IOS{}Array", primitive_title(kind)),
        _ => "IOSObjectArray".to_owned(),
    }
}

pub struct TypeLowering<'a> {
    names: &'a NameTable,
    options: &'a Options,
    cache: RefCell<FxHashMap<ResolvedType, String>>,
}

impl<'a> TypeLowering<'a> {
    pub fn new(names: &'a NameTable, options: &'a Options) -> Self {
        TypeLowering {
            names,
            options,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Erased runtime type as written in method bodies.
    pub fn objc_type(&self, ty: &ResolvedType) -> String {
        if let Some(hit) = self.cache.borrow().get(ty) {
            return hit.clone();
        }
        let lowered = match ty {
            ResolvedType::Primitive(kind) => primitive_type(*kind).to_owned(),
            ResolvedType::Class(d) if d.name.is_object() => "id".to_owned(),
            ResolvedType::Class(d) => format!("{} *", self.names.full_name(&d.name)),
            ResolvedType::Interface(d) => format!("id<{}>", self.names.full_name(&d.name)),
            ResolvedType::Array(a) => format!("{} *", array_class(a)),
            ResolvedType::TypeVariable(_) | ResolvedType::Wildcard(_) => {
                self.objc_type(&ty.erasure())
            }
            ResolvedType::Null => "id".to_owned(),
        };
        self.cache.borrow_mut().insert(ty.clone(), lowered.clone());
        lowered
    }

    /// Declaration-site spelling: the erased type plus, when enabled, the
    /// generics overlay; intersection bounds of type variables are kept.
    pub fn decl_type(&self, ty: &ResolvedType, span: Span) -> Result<String, TranslateError> {
        match ty {
            ResolvedType::Null | ResolvedType::Wildcard(_) => Err(TranslateError::internal(
                format!("type `{ty}` cannot appear at a declaration site"),
                span,
            )),
            ResolvedType::TypeVariable(v) if v.bounds.len() > 1 => {
                Ok(self.intersection(&v.bounds))
            }
            ResolvedType::Class(d) if self.options.generics && !d.args.is_empty() && !d.name.is_object() => {
                let args: Vec<String> = d
                    .args
                    .iter()
                    .map(|arg| self.generic_argument(arg))
                    .collect();
                Ok(format!("{}<{}> *", self.names.full_name(&d.name), args.join(", ")))
            }
            _ => Ok(self.objc_type(ty)),
        }
    }

    fn generic_argument(&self, ty: &ResolvedType) -> String {
        match ty {
            ResolvedType::TypeVariable(v) if v.bounds.len() > 1 => self.intersection(&v.bounds),
            _ => self.objc_type(&ty.erasure()),
        }
    }

    /// `Cls<I1> *` when a class bound leads, `id<I1, I2>` otherwise.
    fn intersection(&self, bounds: &[ResolvedType]) -> String {
        let (class, interfaces): (Vec<&ResolvedType>, Vec<&ResolvedType>) =
            bounds.iter().partition(|b| !b.erasure().is_interface());
        let protocols: Vec<String> = interfaces
            .iter()
            .filter_map(|b| b.erasure().declared().map(|d| self.names.full_name(&d.name)))
            .collect();
        match class.first().map(|c| c.erasure()) {
            Some(ResolvedType::Class(d)) if !d.name.is_object() => format!(
                "{}<{}> *",
                self.names.full_name(&d.name),
                protocols.join(", ")
            ),
            _ => format!("id<{}>", protocols.join(", ")),
        }
    }

    /// Storage qualifier prefix for an ivar or local, including the
    /// trailing space.
    pub fn storage_qualifier(&self, ownership: Ownership) -> &'static str {
        match (ownership, self.options.is_arc()) {
            (Ownership::Strong, _) | (Ownership::Unretained, false) => "",
            (Ownership::Weak, false) => "WEAK_ ",
            (Ownership::Weak, true) => "__weak ",
            (Ownership::Unretained, true) => "__unsafe_unretained ",
        }
    }

    /// A call's declared (erased) return type lowers to something more
    /// general than the type the call site expects.
    pub fn needs_narrowing_cast(&self, declared: &ResolvedType, resolved: &ResolvedType) -> bool {
        if !declared.is_reference() || !resolved.is_reference() || resolved.is_object() {
            return false;
        }
        self.objc_type(&declared.erasure()) != self.objc_type(&resolved.erasure())
    }

    /// Expression yielding the `IOSClass` of a type.
    pub fn class_expr(&self, ty: &ResolvedType) -> String {
        match ty {
            ResolvedType::Primitive(kind) => format!("[IOSClass {}Class]", kind.keyword()),
            ResolvedType::Class(d) | ResolvedType::Interface(d) => {
                format!("{}_class_()", self.names.full_name(&d.name))
            }
            ResolvedType::Array(a) => format!(
                "IOSClass_arrayType({}, {})",
                self.class_expr(&a.element),
                a.dimensions
            ),
            ResolvedType::TypeVariable(_) | ResolvedType::Wildcard(_) => {
                self.class_expr(&ty.erasure())
            }
            ResolvedType::Null => "NSObject_class_()".to_owned(),
        }
    }

    /// Reflection type descriptor: `I`, `LNSString;`, `[I`.
    pub fn descriptor(&self, ty: &ResolvedType) -> String {
        match ty {
            ResolvedType::Primitive(kind) => kind.descriptor().to_string(),
            ResolvedType::Class(d) | ResolvedType::Interface(d) => {
                format!("L{};", self.names.full_name(&d.name))
            }
            ResolvedType::Array(a) => {
                let mut out = "[".repeat(usize::from(a.dimensions));
                out.push_str(&self.descriptor(&a.element));
                out
            }
            ResolvedType::TypeVariable(_) | ResolvedType::Wildcard(_) => {
                self.descriptor(&ty.erasure())
            }
            ResolvedType::Null => "LNSObject;".to_owned(),
        }
    }

    /// Generic signature for reflection, `None` when the type is not generic.
    pub fn generic_signature(&self, ty: &ResolvedType) -> Option<String> {
        fn is_generic(ty: &ResolvedType) -> bool {
            match ty {
                ResolvedType::Class(d) | ResolvedType::Interface(d) => !d.args.is_empty(),
                ResolvedType::Array(a) => is_generic(&a.element),
                ResolvedType::TypeVariable(_) | ResolvedType::Wildcard(_) => true,
                ResolvedType::Primitive(_) | ResolvedType::Null => false,
            }
        }
        is_generic(ty).then(|| self.signature_of(ty))
    }

    fn signature_of(&self, ty: &ResolvedType) -> String {
        match ty {
            ResolvedType::Class(d) | ResolvedType::Interface(d) => {
                let mut out = format!("L{}", d.name.binary_name().replace('.', "/"));
                if !d.args.is_empty() {
                    out.push('<');
                    for arg in &d.args {
                        out.push_str(&self.signature_of(arg));
                    }
                    out.push('>');
                }
                out.push(';');
                out
            }
            ResolvedType::Array(a) => {
                let mut out = "[".repeat(usize::from(a.dimensions));
                out.push_str(&self.signature_of(&a.element));
                out
            }
            ResolvedType::TypeVariable(v) => format!("T{};", v.name),
            ResolvedType::Wildcard(w) => match (w.kind, &w.bound) {
                (xlat_ir::BoundKind::Extends, Some(b)) => format!("+{}", self.signature_of(b)),
                (xlat_ir::BoundKind::Super, Some(b)) => format!("-{}", self.signature_of(b)),
                _ => "*".to_owned(),
            },
            ResolvedType::Primitive(kind) => kind.descriptor().to_string(),
            ResolvedType::Null => "Ljava/lang/Object;".to_owned(),
        }
    }
}
