//! Method and constructor signatures shared by the header and the
//! implementation file.

use std::ops::Range;

use xlat_ir::{well_known, Annotation, ResolvedType, Span, TypeKind};

use crate::context::UnitContext;
use crate::plan::{CtorPlan, MethodPlan, TypePlan};
use crate::signature::{format_method, selector_parts};
use crate::stmt::declare;
use crate::writer::SourceWriter;
use crate::TranslateError;

/// A method declaration head: `- (jint)fooWithInt:(jint)i`, with the
/// first selector keyword remembered for the source map.
pub(crate) struct Head {
    pub text: String,
    name: Range<usize>,
}

impl Head {
    pub fn write(&self, out: &mut SourceWriter, source: Span) {
        out.write(&self.text[..self.name.start]);
        out.write_mapped(&self.text[self.name.clone()], source);
        out.write(&self.text[self.name.end..]);
    }
}

fn head(prefix: &str, selector: &str, params: Vec<(String, String)>) -> Head {
    let parts = selector_parts(selector, params);
    let text = format_method(prefix, selector, &parts);
    let keyword = parts.first().map_or(selector, |p| p.keyword);
    Head {
        name: prefix.len()..prefix.len() + keyword.len(),
        text,
    }
}

/// Declared type plus the nullability qualifier from `@Nullable` /
/// `@Nonnull` when nullability is enabled.
pub(crate) fn annotated_type(
    cx: &UnitContext<'_>,
    ty: &ResolvedType,
    annotations: &[Annotation],
    span: Span,
) -> Result<String, TranslateError> {
    let spelled = cx.types.decl_type(ty, span)?;
    if !cx.options.nullability || !ty.is_reference() {
        return Ok(spelled);
    }
    let qualifier = if xlat_ir::find_annotation(annotations, well_known::NULLABLE).is_some() {
        "_Nullable"
    } else if xlat_ir::find_annotation(annotations, well_known::NONNULL).is_some() {
        "_Nonnull"
    } else {
        return Ok(spelled);
    };
    Ok(format!("{spelled} {qualifier}"))
}

fn method_params(cx: &UnitContext<'_>, m: &MethodPlan<'_>) -> Result<Vec<(String, String)>, TranslateError> {
    m.decl
        .params
        .iter()
        .map(|p| {
            Ok((
                annotated_type(cx, &p.ty, &p.annotations, p.span)?,
                cx.names.param_name(&p.name),
            ))
        })
        .collect()
}

pub(crate) fn method_head(cx: &UnitContext<'_>, m: &MethodPlan<'_>) -> Result<Head, TranslateError> {
    let returns = annotated_type(cx, &m.decl.return_type, &m.decl.annotations, m.decl.span)?;
    let sign = if m.is_static() { '+' } else { '-' };
    let prefix = format!("{sign} ({returns})");
    Ok(head(&prefix, &m.selector, method_params(cx, m)?))
}

pub(crate) fn ctor_head(cx: &UnitContext<'_>, c: &CtorPlan<'_>, span: Span) -> Result<Head, TranslateError> {
    let mut params = Vec::with_capacity(c.params.len());
    for p in &c.params {
        params.push((cx.types.decl_type(&p.ty, span)?, p.name.clone()));
    }
    Ok(head("- (instancetype)", &c.selector, params))
}

/// `NS_SWIFT_NAME(init(_:_:))` for a constructor selector.
pub(crate) fn swift_ctor_name(c: &CtorPlan<'_>) -> String {
    let labels: String = c.params.iter().map(|_| "_:").collect();
    format!("NS_SWIFT_NAME(init({labels}))")
}

/// `ret name(params)`, `(void)` when there are none.
pub(crate) fn prototype(returns: &str, name: &str, params: &[(String, String)]) -> String {
    let params = if params.is_empty() {
        "void".to_owned()
    } else {
        params
            .iter()
            .map(|(ty, name)| declare(ty, name))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{}({params})", declare(returns, name))
}

/// The receiver parameter of functions implementing instance members.
fn self_param(plan: &TypePlan<'_>) -> (String, String) {
    let ty = if plan.decl.kind.is_protocol() {
        format!("id<{}>", plan.name)
    } else {
        format!("{} *", plan.name)
    };
    (ty, "self".to_owned())
}

/// `jint Foo_bar(Foo *self, jint x)` for a method with a function.
pub(crate) fn method_prototype(
    cx: &UnitContext<'_>,
    plan: &TypePlan<'_>,
    m: &MethodPlan<'_>,
) -> Result<Option<String>, TranslateError> {
    let Some(function) = &m.function else {
        return Ok(None);
    };
    let mut params = Vec::new();
    if !m.is_static() {
        params.push(self_param(plan));
    }
    params.extend(method_params(cx, m)?);
    let returns = cx.types.decl_type(&m.decl.return_type, m.decl.span)?;
    Ok(Some(prototype(&returns, function, &params)))
}

/// The three constructor functions: designated initializer, retained
/// allocation and autoreleased allocation.
pub(crate) struct CtorPrototypes {
    pub init: String,
    pub new: String,
    pub create: String,
}

pub(crate) fn ctor_prototypes(
    cx: &UnitContext<'_>,
    plan: &TypePlan<'_>,
    c: &CtorPlan<'_>,
) -> Result<CtorPrototypes, TranslateError> {
    let mut params = Vec::with_capacity(c.params.len());
    for p in &c.params {
        params.push((cx.types.decl_type(&p.ty, plan.decl.span)?, p.name.clone()));
    }
    let mut with_self = vec![self_param(plan)];
    with_self.extend(params.iter().cloned());
    let object = format!("{} *", plan.name);
    let suffix = c.function_suffix();
    Ok(CtorPrototypes {
        init: prototype("void", &c.function, &with_self),
        new: prototype(&object, &format!("new_{}_{suffix}", plan.name), &params),
        create: prototype(&object, &format!("create_{}_{suffix}", plan.name), &params),
    })
}

/// Allocating functions exist for concrete classes only.
pub(crate) fn has_allocators(plan: &TypePlan<'_>) -> bool {
    plan.decl.kind != TypeKind::Interface && plan.decl.kind != TypeKind::Annotation && !plan.is_abstract()
}

/// `/*! ... */` doc block, one source line per line.
pub(crate) fn doc_comment(out: &mut SourceWriter, doc: Option<&str>) {
    let Some(doc) = doc.map(str::trim).filter(|d| !d.is_empty()) else {
        return;
    };
    out.writeln("/*!");
    for line in doc.lines() {
        let line = line.trim();
        if line.is_empty() {
            out.writeln("");
        } else {
            out.writeln(&format!(" {line}"));
        }
    }
    out.writeln(" */");
}

/// Interfaces with static members get a companion class to hold them.
pub(crate) fn has_companion(plan: &TypePlan<'_>) -> bool {
    plan.methods.iter().any(MethodPlan::is_static) || !plan.static_fields.is_empty()
}
