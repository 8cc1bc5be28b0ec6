//! Static field storage and its accessor macros.
//!
//! Non-private statics are exported: the header declares the accessor
//! functions and the storage, the implementation defines the storage.
//! Private statics get the same macros in the implementation file, with
//! `static` storage. Compile-time constant primitives have no storage at
//! all, only a `#define`.

use xlat_ir::{ExprKind, FieldDecl, Modifiers};

use crate::context::UnitContext;
use crate::literal;
use crate::mangle::{capitalize, encode_identifier};
use crate::plan::TypePlan;
use crate::stmt::declare;
use crate::writer::SourceWriter;
use crate::TranslateError;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum StaticKind {
    /// `#define Owner_NAME value`.
    Constant(String),
    Final,
    Mutable,
}

pub(crate) struct StaticField<'a> {
    pub field: &'a FieldDecl,
    /// Owning type's Objective-C name.
    pub owner: String,
    /// `Owner_name`.
    pub storage: String,
    /// Encoded field name as used in the macros.
    pub suffix: String,
    pub ty: String,
    pub kind: StaticKind,
}

impl<'a> StaticField<'a> {
    pub fn new(cx: &UnitContext<'_>, owner: &str, field: &'a FieldDecl) -> Result<Self, TranslateError> {
        let mut suffix = String::with_capacity(field.name.len());
        encode_identifier(&mut suffix, &field.name, false);
        let kind = match &field.constant {
            Some(value) if field.is_compile_time_constant() && field.ty.is_primitive() => {
                StaticKind::Constant(literal::constant(value))
            }
            _ if field.modifiers.contains(Modifiers::FINAL) => StaticKind::Final,
            _ => StaticKind::Mutable,
        };
        Ok(StaticField {
            field,
            owner: owner.to_owned(),
            storage: format!("{owner}_{suffix}"),
            suffix,
            ty: cx.types.decl_type(&field.ty, field.span)?,
            kind,
        })
    }

    pub fn is_private(&self) -> bool {
        self.field.modifiers.is_private()
    }

    fn is_object(&self) -> bool {
        self.field.ty.is_reference()
    }

    fn is_volatile(&self) -> bool {
        self.field.modifiers.contains(Modifiers::VOLATILE)
    }

    /// `J2OBJC_STATIC_FIELD_*` macro name.
    fn macro_name(&self) -> String {
        let base = match (&self.kind, self.is_object()) {
            (StaticKind::Constant(_), _) => return "J2OBJC_STATIC_FIELD_CONSTANT".to_owned(),
            (_, true) => "J2OBJC_STATIC_FIELD_OBJ",
            (_, false) => "J2OBJC_STATIC_FIELD_PRIMITIVE",
        };
        let suffix = match self.kind {
            StaticKind::Final => "_FINAL",
            _ if self.is_volatile() => "_VOLATILE",
            _ => "",
        };
        format!("{base}{suffix}")
    }

    /// Accessor declarations, storage declaration and field macro.
    ///
    /// `exported` selects the header form (`FOUNDATION_EXPORT` storage);
    /// otherwise the file-local storage is defined here with its initial
    /// value.
    pub fn write_accessors(&self, cx: &UnitContext<'_>, out: &mut SourceWriter, exported: bool) {
        let ty = &self.ty;
        let getter = declare(ty, &format!("{}_get_{}", self.owner, self.suffix));
        out.writeln(&format!("inline {getter}(void);"));
        if let StaticKind::Constant(value) = &self.kind {
            out.writeln(&format!("#define {} {value}", self.storage));
            out.writeln(&format!(
                "J2OBJC_STATIC_FIELD_CONSTANT({}, {}, {ty})",
                self.owner, self.suffix
            ));
            return;
        }
        if self.kind == StaticKind::Mutable {
            let setter = declare(ty, &format!("{}_set_{}", self.owner, self.suffix));
            out.writeln(&format!("inline {setter}({});", declare(ty, "value")));
            if !self.is_object() {
                let reference = declare(&format!("{ty} *"), &format!("{}_getRef_{}", self.owner, self.suffix));
                out.writeln(&format!("inline {reference}(void);"));
            }
        }
        if exported {
            out.writeln("/*! INTERNAL ONLY - Use accessor function from above. */");
            out.writeln(&format!("FOUNDATION_EXPORT {};", declare(ty, &self.storage)));
        } else {
            out.writeln(&format!("static {};", self.definition(cx)));
        }
        out.writeln(&format!("{}({}, {}, {ty})", self.macro_name(), self.owner, self.suffix));
    }

    /// `T Owner_name` plus the initial value when it is known statically.
    pub fn definition(&self, cx: &UnitContext<'_>) -> String {
        let declared = declare(&self.ty, &self.storage);
        let value = self.field.constant.as_ref().map(literal::constant).or_else(|| {
            let init = self.field.initializer?;
            match &cx.unit.arena.expr(init).kind {
                ExprKind::Literal(c) => Some(literal::constant(c)),
                _ => None,
            }
        });
        match value {
            Some(value) => format!("{declared} = {value}"),
            None => declared,
        }
    }

    /// Has storage in the implementation file.
    pub fn has_storage(&self) -> bool {
        !matches!(self.kind, StaticKind::Constant(_))
    }
}

/// A class-level accessor for a static field or enum constant, emitted
/// when static accessors or class properties are enabled.
pub(crate) struct Accessor {
    pub name: String,
    pub ty: String,
    /// `Owner_get_name`.
    pub getter: String,
    /// `Owner_set_name`, for mutable fields.
    pub setter: Option<String>,
}

impl Accessor {
    /// `setName:`.
    pub fn setter_selector(&self) -> String {
        format!("set{}:", capitalize(&self.name))
    }
}

pub(crate) fn accessors(cx: &UnitContext<'_>, plan: &TypePlan<'_>) -> Result<Vec<Accessor>, TranslateError> {
    let mut out = Vec::new();
    if !cx.options.emits_static_accessors() {
        return Ok(out);
    }
    let object = format!("{} *", plan.name);
    for constant in plan.decl.enum_constants() {
        let mut suffix = String::new();
        encode_identifier(&mut suffix, &constant.name, false);
        out.push(Accessor {
            name: cx.names.variable_name(&constant.name),
            ty: object.clone(),
            getter: format!("{}_get_{suffix}", plan.name),
            setter: None,
        });
    }
    for field in &plan.static_fields {
        let field = StaticField::new(cx, &plan.name, field)?;
        if field.is_private() {
            continue;
        }
        out.push(Accessor {
            name: cx.names.variable_name(&field.field.name),
            setter: (field.kind == StaticKind::Mutable)
                .then(|| format!("{}_set_{}", field.owner, field.suffix)),
            getter: format!("{}_get_{}", field.owner, field.suffix),
            ty: field.ty,
        });
    }
    Ok(out)
}
