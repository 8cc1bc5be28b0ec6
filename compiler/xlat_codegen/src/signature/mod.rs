//! Selector and function-name synthesis.
//!
//! Objective-C has no overloading by parameter type, so every parameter
//! contributes a `with<TypeKeyword>:` keyword to the selector:
//!
//! | Source | Selector |
//! |--------|----------|
//! | `foo()` | `foo` |
//! | `foo(int)` | `fooWithInt:` |
//! | `foo(int, Runnable)` | `fooWithInt:withJavaLangRunnable:` |
//! | `Foo(String)` | `initWithNSString:` |
//!
//! Static methods, private methods and constructors are also reachable as
//! C functions named `Type_selector` with colons replaced by underscores.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use xlat_ir::{
    well_known, ConstructorDecl, CtorRef, MethodDecl, MethodRef, Modifiers, QualifiedName,
    ResolvedType, Span, TypeDecl, TypeKind, Visibility,
};

use crate::mangle::capitalize;
use crate::{NameTable, TranslateError};

/// Methods of `java.lang.Object` with a Foundation counterpart.
const OBJECT_METHODS: &[(&str, usize, &str)] = &[
    ("clone", 0, "java_clone"),
    ("equals", 1, "isEqual:"),
    ("finalize", 0, "java_finalize"),
    ("getClass", 0, "java_getClass"),
    ("hashCode", 0, "hash"),
    ("toString", 0, "description"),
];

/// Prefixes that put a selector in a Cocoa method family.
const FAMILY_PREFIXES: &[&str] = &["alloc", "copy", "init", "mutableCopy", "new"];

/// The keyword a parameter type contributes: `Int`, `Id`, `NSString`,
/// `JavaLangRunnable`, `IntArray`, `NSObjectArray`, `NSStringArray2`.
pub fn type_keyword(names: &NameTable, ty: &ResolvedType) -> String {
    keyword(names, ty, false)
}

/// Only a non-array `Object` is spelled `Id`; array elements keep the
/// class name.
fn keyword(names: &NameTable, ty: &ResolvedType, element: bool) -> String {
    match ty {
        ResolvedType::Primitive(kind) => capitalize(kind.keyword()),
        ResolvedType::Class(d) if d.name.is_object() && !element => "Id".to_owned(),
        ResolvedType::Class(d) | ResolvedType::Interface(d) => names.full_name(&d.name),
        ResolvedType::Array(a) => {
            let mut out = keyword(names, &a.element, true);
            out.push_str("Array");
            if a.dimensions > 1 {
                out.push_str(&a.dimensions.to_string());
            }
            out
        }
        ResolvedType::TypeVariable(_) | ResolvedType::Wildcard(_) | ResolvedType::Null => {
            keyword(names, &ty.erasure(), element)
        }
    }
}

/// `base` followed by one keyword per parameter.
pub fn build_selector(names: &NameTable, base: &str, params: &[ResolvedType]) -> String {
    let mut out = base.to_owned();
    for (i, param) in params.iter().enumerate() {
        out.push_str(if i == 0 { "With" } else { "with" });
        out.push_str(&type_keyword(names, param));
        out.push(':');
    }
    out
}

/// Split a synthesized selector into its base name and parameter
/// keywords: `fooWithInt:withNSString:` gives `("foo", ["Int", "NSString"])`.
///
/// The base ends at the first `With` past its first character. `None` if
/// the selector is not in the shape [`build_selector`] writes.
pub fn parse_selector(selector: &str) -> Option<(&str, Vec<&str>)> {
    let Some(body) = selector.strip_suffix(':') else {
        return (!selector.is_empty() && !selector.contains(':')).then(|| (selector, Vec::new()));
    };
    let mut parts = body.split(':');
    let first = parts.next()?;
    let at = first.get(1..)?.find("With")? + 1;
    let mut keywords = vec![&first[at + "With".len()..]];
    for part in parts {
        keywords.push(part.strip_prefix("with")?);
    }
    if keywords.iter().any(|k| k.is_empty()) {
        return None;
    }
    Some((&first[..at], keywords))
}

/// Selector for a source method name and root parameter types, honoring
/// the `java.lang.Object` mappings.
pub fn selector_for(names: &NameTable, name: &str, params: &[ResolvedType]) -> String {
    if let Some(&(_, _, mapped)) = OBJECT_METHODS.iter().find(|(n, arity, _)| {
        *n == name && *arity == params.len() && (*arity == 0 || params[0].erasure().is_object())
    }) {
        return mapped.to_owned();
    }
    build_selector(names, &names.method_name(name), params)
}

/// Selector of a declared method: an explicit name, then the selector of
/// the root declaration it overrides, then the synthesized one.
pub fn method_selector(names: &NameTable, method: &MethodDecl) -> Result<String, TranslateError> {
    let explicit = xlat_ir::find_annotation(&method.annotations, well_known::OBJECTIVE_C_NAME)
        .and_then(|a| a.string_value());
    if let Some(selector) = explicit {
        validate_explicit_selector(selector, method.params.len(), method.span)?;
        return Ok(selector.to_owned());
    }
    match method.overrides.first() {
        Some(root) => Ok(root
            .selector
            .clone()
            .unwrap_or_else(|| selector_for(names, &method.name, &root.params))),
        None => Ok(selector_for(names, &method.name, &method.param_types())),
    }
}

/// Selector at a call site.
pub fn call_selector(names: &NameTable, method: &MethodRef) -> String {
    method
        .selector
        .clone()
        .unwrap_or_else(|| selector_for(names, &method.name, &method.params))
}

/// Explicit selectors are `name` or `(keyword:)+` with one keyword per
/// parameter.
pub fn validate_explicit_selector(
    selector: &str,
    param_count: usize,
    span: Span,
) -> Result<(), TranslateError> {
    let invalid = |reason: String| TranslateError::InvalidExplicitName {
        name: selector.to_owned(),
        reason,
        span,
    };
    let well_formed = if selector.contains(':') {
        selector
            .strip_suffix(':')
            .is_some_and(|body| body.split(':').all(is_word))
    } else {
        is_word(selector)
    };
    if !well_formed {
        return Err(invalid("not a valid selector".to_owned()));
    }
    let keywords = selector.matches(':').count();
    if keywords != param_count {
        return Err(invalid(format!(
            "selector has {keywords} keyword(s) but the method has {param_count} parameter(s)"
        )));
    }
    Ok(())
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Base selector of a constructor. Package-private top-level classes use a
/// distinct base so a subclass in another package cannot call them.
pub fn constructor_base(name: &QualifiedName, kind: TypeKind, modifiers: Modifiers) -> &'static str {
    if kind == TypeKind::Class
        && !name.is_nested()
        && !name.package().is_empty()
        && modifiers.visibility() == Visibility::PackagePrivate
    {
        "initPackagePrivate"
    } else {
        "init"
    }
}

/// A constructor parameter after synthesis.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CtorParam {
    pub name: String,
    pub ty: ResolvedType,
}

/// Full constructor parameter list: enclosing instance, captured locals,
/// declared parameters and, for enums, the constant's name and ordinal.
pub fn constructor_params(
    names: &NameTable,
    decl: &TypeDecl,
    ctor: Option<&ConstructorDecl>,
) -> Vec<CtorParam> {
    let mut params = Vec::new();
    if decl.has_outer_instance() {
        if let Some(outer) = decl.name.outer() {
            params.push(CtorParam {
                name: "outer$".to_owned(),
                ty: ResolvedType::class(outer),
            });
        }
    }
    for (i, capture) in decl.captures.iter().enumerate() {
        params.push(CtorParam {
            name: format!("capture${i}"),
            ty: capture.ty.clone(),
        });
    }
    if let Some(ctor) = ctor {
        params.extend(ctor.params.iter().map(|p| CtorParam {
            name: names.param_name(&p.name),
            ty: p.ty.clone(),
        }));
    }
    if decl.kind == TypeKind::Enum {
        params.push(CtorParam {
            name: "__name".to_owned(),
            ty: ResolvedType::string(),
        });
        params.push(CtorParam {
            name: "__ordinal".to_owned(),
            ty: ResolvedType::INT,
        });
    }
    params
}

/// Selector of a declared constructor (`None` for the synthesized default).
pub fn constructor_selector(
    names: &NameTable,
    decl: &TypeDecl,
    ctor: Option<&ConstructorDecl>,
) -> String {
    let types: Vec<ResolvedType> = constructor_params(names, decl, ctor)
        .into_iter()
        .map(|p| p.ty)
        .collect();
    build_selector(
        names,
        constructor_base(&decl.name, decl.kind, decl.modifiers),
        &types,
    )
}

/// Selector of a constructor at a call site.
pub fn ctor_ref_selector(names: &NameTable, ctor: &CtorRef) -> String {
    let mut types = ctor.all_params();
    if ctor.declaring.kind == TypeKind::Enum {
        types.push(ResolvedType::string());
        types.push(ResolvedType::INT);
    }
    build_selector(
        names,
        constructor_base(&ctor.declaring.name, ctor.declaring.kind, ctor.declaring.modifiers),
        &types,
    )
}

/// `Type_selector` with colons replaced by underscores.
pub fn function_name(names: &NameTable, owner: &QualifiedName, selector: &str) -> String {
    let mut out = names.full_name(owner);
    out.push('_');
    out.push_str(&selector.replace(':', "_"));
    out
}

/// Selectors Clang would otherwise place in the `new`/`init`/`copy`
/// families, which changes ownership of the returned object.
pub fn needs_family_none(selector: &str) -> bool {
    let trimmed = selector.trim_start_matches('_');
    FAMILY_PREFIXES.iter().any(|prefix| {
        trimmed
            .strip_prefix(prefix)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_lowercase()))
    })
}

/// Source-level description of a method for diagnostics: `foo(int, T)`.
pub fn describe(name: &str, params: &[ResolvedType]) -> String {
    let params: Vec<String> = params.iter().map(ToString::to_string).collect();
    format!("{name}({})", params.join(", "))
}

/// Reject two members of one type that synthesize the same selector.
pub fn check_collisions(names: &NameTable, decl: &TypeDecl) -> Result<(), TranslateError> {
    let mut seen: FxHashMap<(u8, String), (String, Span)> = FxHashMap::default();
    let mut claim = |key: (u8, String), what: String, span: Span| -> Result<(), TranslateError> {
        if let Some((first, previous)) = seen.get(&key) {
            return Err(TranslateError::SelectorCollision {
                selector: key.1,
                first: first.clone(),
                second: what,
                span,
                previous: *previous,
            });
        }
        seen.insert(key, (what, span));
        Ok(())
    };
    for method in decl.methods() {
        let selector = method_selector(names, method)?;
        let group = u8::from(method.is_static());
        let span = if method.name_span.is_dummy() {
            method.span
        } else {
            method.name_span
        };
        claim(
            (group, selector),
            describe(&method.name, &method.param_types()),
            span,
        )?;
    }
    for ctor in decl.constructors() {
        let selector = constructor_selector(names, decl, Some(ctor));
        claim(
            (2, selector),
            describe(decl.name.simple_name(), &ctor.param_types()),
            ctor.span,
        )?;
    }
    Ok(())
}

/// Declaration order key: constructors first, then name
/// (case-insensitive), parameter count, and parameter keywords.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemberOrder {
    pub is_constructor: bool,
    pub name: String,
    pub keywords: Vec<String>,
}

impl MemberOrder {
    pub fn method(names: &NameTable, method: &MethodDecl) -> Self {
        MemberOrder {
            is_constructor: false,
            name: method.name.clone(),
            keywords: method
                .params
                .iter()
                .map(|p| type_keyword(names, &p.ty))
                .collect(),
        }
    }

    pub fn constructor(names: &NameTable, params: &[CtorParam]) -> Self {
        MemberOrder {
            is_constructor: true,
            name: String::new(),
            keywords: params.iter().map(|p| type_keyword(names, &p.ty)).collect(),
        }
    }
}

impl Ord for MemberOrder {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .is_constructor
            .cmp(&self.is_constructor)
            .then_with(|| self.name.to_lowercase().cmp(&other.name.to_lowercase()))
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.keywords.len().cmp(&other.keywords.len()))
            .then_with(|| self.keywords.cmp(&other.keywords))
    }
}

impl PartialOrd for MemberOrder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One `keyword:(type)name` piece of a method declaration.
pub struct SelectorPart<'s> {
    pub keyword: &'s str,
    pub ty: String,
    pub name: String,
}

/// Split a selector into keywords paired with parameters.
pub fn selector_parts<'s>(selector: &'s str, params: Vec<(String, String)>) -> Vec<SelectorPart<'s>> {
    selector
        .split_terminator(':')
        .zip(params)
        .map(|(keyword, (ty, name))| SelectorPart { keyword, ty, name })
        .collect()
}

/// Format a method declaration with continuation lines colon-aligned
/// under the first keyword, the way Xcode lays them out:
///
/// ```text
/// - (void)fooWithInt:(jint)i
/// withJavaLangRunnable:(id<JavaLangRunnable>)r
/// ```
pub fn format_method(prefix: &str, selector: &str, parts: &[SelectorPart<'_>]) -> String {
    if parts.is_empty() {
        return format!("{prefix}{selector}");
    }
    let colon_column = prefix.len() + parts[0].keyword.len();
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            out.push_str(prefix);
        } else {
            out.push('\n');
            let pad = colon_column.saturating_sub(part.keyword.len());
            out.push_str(&" ".repeat(pad));
        }
        out.push_str(part.keyword);
        out.push_str(":(");
        out.push_str(&part.ty);
        out.push(')');
        out.push_str(&part.name);
    }
    out
}
