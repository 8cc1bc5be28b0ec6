//! Per-type member planning.
//!
//! Selectors, function names, storage and ordering are decided once per
//! type and shared by the header, implementation and metadata generators,
//! so the three artifacts can never disagree about a member's name.

use xlat_ir::{
    ConstructorDecl, ExprKind, FieldDecl, MethodDecl, Modifiers, Nesting, ResolvedType, TypeDecl,
    TypeKind, Visibility,
};

use crate::context::UnitContext;
use crate::lower::Ownership;
use crate::signature::{
    self, constructor_params, constructor_selector, function_name, method_selector, CtorParam,
    MemberOrder,
};
use crate::{NameTable, TranslateError};

pub(crate) struct MethodPlan<'a> {
    pub decl: &'a MethodDecl,
    pub selector: String,
    /// C function implementing the method: statics and private instance
    /// methods.
    pub function: Option<String>,
    pub visibility: Visibility,
    order: MemberOrder,
}

impl<'a> MethodPlan<'a> {
    pub fn is_static(&self) -> bool {
        self.decl.is_static()
    }

    pub fn is_abstract(&self) -> bool {
        self.decl.modifiers.contains(Modifiers::ABSTRACT)
            || (self.decl.body.is_none() && self.decl.native_code.is_none())
    }

    /// An interface's default method as seen from an implementing class.
    pub fn inherited(names: &NameTable, decl: &'a MethodDecl, selector: String) -> Self {
        MethodPlan {
            decl,
            selector,
            function: None,
            visibility: Visibility::Public,
            order: MemberOrder::method(names, decl),
        }
    }
}

pub(crate) struct CtorPlan<'a> {
    /// `None` for the synthesized default constructor.
    pub decl: Option<&'a ConstructorDecl>,
    pub params: Vec<CtorParam>,
    pub selector: String,
    /// `Type_initWith..._`.
    pub function: String,
    pub visibility: Visibility,
    order: MemberOrder,
}

impl CtorPlan<'_> {
    /// Private and enum constructors exist only as file-local functions.
    pub fn is_function_only(&self, decl: &TypeDecl) -> bool {
        self.visibility == Visibility::Private || decl.kind == TypeKind::Enum
    }

    /// Suffix after the owner in `new_`/`create_`/`_init` function names.
    pub fn function_suffix(&self) -> String {
        self.selector.replace(':', "_")
    }
}

/// An instance variable, declared or synthesized.
pub(crate) struct IvarPlan<'a> {
    pub name: String,
    pub ty: ResolvedType,
    pub ownership: Ownership,
    pub visibility: Visibility,
    pub field: Option<&'a FieldDecl>,
}

impl IvarPlan<'_> {
    /// Released in `dealloc` and assigned through `JreStrongAssign`.
    pub fn is_strong_object(&self) -> bool {
        self.ty.is_reference() && self.ownership.is_strong()
    }
}

pub(crate) struct TypePlan<'a> {
    pub decl: &'a TypeDecl,
    /// Objective-C name.
    pub name: String,
    pub constructors: Vec<CtorPlan<'a>>,
    pub methods: Vec<MethodPlan<'a>>,
    pub ivars: Vec<IvarPlan<'a>>,
    pub static_fields: Vec<&'a FieldDecl>,
    pub needs_initialize: bool,
    /// Declared in the public header rather than the implementation file.
    pub in_header: bool,
}

impl<'a> TypePlan<'a> {
    pub fn build(cx: &UnitContext<'a>, decl: &'a TypeDecl) -> Result<Self, TranslateError> {
        signature::check_collisions(cx.names, decl)?;
        let name = cx.names.full_name(&decl.name);

        let mut methods = Vec::new();
        for method in decl.methods() {
            let selector = method_selector(cx.names, method)?;
            let is_private = method.modifiers.is_private() && !decl.kind.is_protocol();
            let is_default = decl.kind == TypeKind::Interface && method.body.is_some();
            let function = (method.is_static() || is_private || is_default)
                .then(|| function_name(cx.names, &decl.name, &selector));
            methods.push(MethodPlan {
                decl: method,
                selector,
                function,
                visibility: method.modifiers.visibility(),
                order: MemberOrder::method(cx.names, method),
            });
        }
        methods.sort_by(|a, b| a.order.cmp(&b.order));

        let mut constructors = Vec::new();
        if !decl.kind.is_protocol() {
            let declared: Vec<&ConstructorDecl> = decl.constructors().collect();
            if declared.is_empty() {
                constructors.push(Self::ctor(cx, decl, None, default_ctor_visibility(decl)));
            } else {
                for ctor in declared {
                    constructors.push(Self::ctor(cx, decl, Some(ctor), ctor.modifiers.visibility()));
                }
            }
        }
        constructors.sort_by(|a, b| a.order.cmp(&b.order));

        let mut ivars = Vec::new();
        if decl.has_outer_instance() {
            if let Some(outer) = decl.name.outer() {
                ivars.push(IvarPlan {
                    name: "this$0_".to_owned(),
                    ty: ResolvedType::class(outer),
                    ownership: Ownership::of_outer(decl),
                    visibility: Visibility::Public,
                    field: None,
                });
            }
        }
        for capture in &decl.captures {
            ivars.push(IvarPlan {
                name: format!("val${}_", capture.name),
                ty: capture.ty.clone(),
                ownership: Ownership::Strong,
                visibility: Visibility::Public,
                field: None,
            });
        }
        for field in decl.fields().filter(|f| !f.is_static()) {
            ivars.push(IvarPlan {
                name: cx.names.ivar_name(&field.name),
                ty: field.ty.clone(),
                ownership: Ownership::of_field(&field.ty, field.memory_hints()),
                visibility: field.modifiers.visibility(),
                field: Some(field),
            });
        }

        let static_fields: Vec<&FieldDecl> = decl.fields().filter(|f| f.is_static()).collect();
        let needs_initialize = decl.kind == TypeKind::Enum
            || decl.initializers().any(|i| i.is_static)
            || static_fields
                .iter()
                .any(|f| needs_runtime_init(cx, f));

        Ok(TypePlan {
            decl,
            name,
            constructors,
            methods,
            ivars,
            static_fields,
            needs_initialize,
            in_header: is_exported(cx, decl),
        })
    }

    fn ctor(
        cx: &UnitContext<'a>,
        decl: &'a TypeDecl,
        ctor: Option<&'a ConstructorDecl>,
        visibility: Visibility,
    ) -> CtorPlan<'a> {
        let params = constructor_params(cx.names, decl, ctor);
        let selector = constructor_selector(cx.names, decl, ctor);
        let function = function_name(cx.names, &decl.name, &selector);
        CtorPlan {
            decl: ctor,
            order: MemberOrder::constructor(cx.names, &params),
            params,
            selector,
            function,
            visibility,
        }
    }

    pub fn is_abstract(&self) -> bool {
        self.decl.modifiers.contains(Modifiers::ABSTRACT)
    }

    /// Objective-C name of the superclass (`NSObject` for roots).
    pub fn superclass_name(&self, cx: &UnitContext<'_>) -> String {
        match &self.decl.superclass {
            Some(sup) => cx.names.full_name(&sup.name),
            None => "NSObject".to_owned(),
        }
    }

    /// Declared static methods: class methods forwarding to functions.
    pub fn static_methods(&self) -> impl Iterator<Item = &MethodPlan<'a>> {
        self.methods.iter().filter(|m| m.is_static())
    }

    pub fn has_private_ivars(&self, cx: &UnitContext<'_>) -> bool {
        !cx.options.private_declarations_in_header
            && self.ivars.iter().any(|i| i.visibility == Visibility::Private)
    }

    /// Ivars declared in the `@interface` block (the rest go to the class
    /// extension).
    pub fn header_ivars(&self, cx: &UnitContext<'_>) -> impl Iterator<Item = &IvarPlan<'a>> {
        let all = cx.options.private_declarations_in_header;
        self.ivars
            .iter()
            .filter(move |i| all || i.visibility != Visibility::Private)
    }
}

/// The implicit constructor has the type's access, except that enum
/// constructors are always private.
fn default_ctor_visibility(decl: &TypeDecl) -> Visibility {
    match (decl.kind, decl.nesting) {
        (TypeKind::Enum, _) => Visibility::Private,
        (_, Nesting::Anonymous | Nesting::Local) => Visibility::PackagePrivate,
        _ => decl.modifiers.visibility(),
    }
}

/// Static fields whose initializer must run in `+initialize`.
pub(crate) fn needs_runtime_init(cx: &UnitContext<'_>, field: &FieldDecl) -> bool {
    if field.is_compile_time_constant() {
        return false;
    }
    match field.initializer {
        Some(id) => !matches!(cx.unit.arena.expr(id).kind, ExprKind::Literal(_)),
        None => false,
    }
}

/// Top-level and member types reachable from outside the unit are
/// declared in the header; local, anonymous and private types only in the
/// implementation.
pub(crate) fn is_exported(cx: &UnitContext<'_>, decl: &TypeDecl) -> bool {
    let mut current = Some(decl.name.clone());
    while let Some(name) = current {
        let Some(t) = cx.find_decl(&name) else {
            return true;
        };
        if matches!(t.nesting, Nesting::Local | Nesting::Anonymous) || t.modifiers.is_private() {
            return false;
        }
        current = name.outer();
    }
    true
}

#[cfg(test)]
mod tests;
