//! Name mangling.
//!
//! Maps qualified source names onto flat Objective-C identifiers.
//!
//! # Scheme
//!
//! | Source | Generated |
//! |--------|-----------|
//! | `unit.test.Example` | `UnitTestExample` |
//! | `unit.test.Example.Inner` | `UnitTestExample_Inner` |
//! | `Example` (default package) | `Example` |
//! | `java.lang.String` | `NSString` |
//! | field `count` | ivar `count_`, static `UnitTestExample_count` |
//! | method `init()` | `init__` |
//! | parameter `in` | `inArg` |
//!
//! A package prefix (from `Options::package_prefixes` or a package-level
//! `@ObjectiveCName`) replaces the flattened package. The default name is
//! then kept as a compatibility alias.
//!
//! Type names are memoized behind a `parking_lot::RwLock`: the table is
//! populated single-threaded by [`NameTable::register`] and then shared by
//! every parallel unit translation, which may still add names for types
//! outside the batch.

mod reserved;

use std::fmt::Write as _;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use xlat_ir::{well_known, CompilationUnit, QualifiedName, TypeDecl};

use crate::{Options, TranslateError};

pub(crate) use reserved::is_reserved;

/// Suffix for method names that collide with reserved words or `NSObject`
/// messages.
const METHOD_SUFFIX: &str = "__";

/// Core types with a fixed Objective-C counterpart.
const CORE_TYPES: &[(&str, &str, &str)] = &[
    ("java.lang", "Class", "IOSClass"),
    ("java.lang", "Cloneable", "NSCopying"),
    ("java.lang", "Number", "NSNumber"),
    ("java.lang", "Object", "NSObject"),
    ("java.lang", "String", "NSString"),
];

pub struct NameTable {
    prefixes: FxHashMap<String, String>,
    explicit: FxHashMap<QualifiedName, String>,
    cache: RwLock<FxHashMap<QualifiedName, String>>,
    /// Flat name → first registered owner, for collision detection.
    claims: FxHashMap<String, QualifiedName>,
}

impl NameTable {
    pub fn new(options: &Options) -> Self {
        NameTable {
            prefixes: options.package_prefixes.clone(),
            explicit: FxHashMap::default(),
            cache: RwLock::new(FxHashMap::default()),
            claims: FxHashMap::default(),
        }
    }

    /// Record a unit's naming directives and claim its type names.
    ///
    /// Fails with E5003 when a type flattens to a name already claimed by a
    /// different type; earlier registrations win.
    pub fn register(&mut self, unit: &CompilationUnit) -> Result<(), TranslateError> {
        let package_name =
            xlat_ir::find_annotation(&unit.package_annotations, well_known::OBJECTIVE_C_NAME)
                .and_then(|a| a.string_value());
        if let Some(prefix) = package_name {
            self.prefixes
                .entry(unit.package.clone())
                .or_insert_with(|| prefix.to_owned());
        }

        for decl in unit.all_types() {
            if let Some(name) = explicit_type_name(decl) {
                if is_valid_identifier(name) && !decl.modifiers.is_private() {
                    self.explicit.insert(decl.name.clone(), name.to_owned());
                }
            }
        }
        // Directives may rename cached external types.
        self.cache.write().clear();

        // A unit claims all of its names or none.
        let mut pending: Vec<(String, &QualifiedName)> = Vec::new();
        for decl in unit.all_types() {
            let flat = self.full_name(&decl.name);
            let owner = self
                .claims
                .get(&flat)
                .or_else(|| pending.iter().find(|(f, _)| *f == flat).map(|&(_, n)| n));
            match owner {
                Some(owner) if *owner != decl.name => {
                    return Err(TranslateError::TypeNameCollision {
                        name: flat,
                        first: owner.to_string(),
                        second: decl.name.to_string(),
                        span: decl.span,
                    });
                }
                Some(_) => {}
                None => pending.push((flat, &decl.name)),
            }
        }
        for (flat, name) in pending {
            self.claims.insert(flat, name.clone());
        }
        Ok(())
    }

    /// Flattened package: the prefix override, or each segment capitalized.
    pub fn package_prefix(&self, package: &str) -> String {
        if let Some(prefix) = self.prefixes.get(package) {
            return prefix.clone();
        }
        camel_case_package(package)
    }

    /// The Objective-C name of a type.
    pub fn full_name(&self, name: &QualifiedName) -> String {
        if let Some(cached) = self.cache.read().get(name) {
            return cached.clone();
        }
        let computed = self.compute_full_name(name, true);
        self.cache.write().insert(name.clone(), computed.clone());
        computed
    }

    /// The name the type would have without prefix or explicit-name
    /// directives. Differs from [`NameTable::full_name`] only when a
    /// directive applies.
    pub fn default_full_name(&self, name: &QualifiedName) -> String {
        self.compute_full_name(name, false)
    }

    /// The old flattened name when a directive renamed the type.
    pub fn compatibility_alias(&self, name: &QualifiedName) -> Option<String> {
        let default = self.default_full_name(name);
        (default != self.full_name(name)).then_some(default)
    }

    /// `Some(prefix)` when the type's package has a prefix override.
    pub fn prefix_override(&self, package: &str) -> Option<&str> {
        self.prefixes.get(package).map(String::as_str)
    }

    fn compute_full_name(&self, name: &QualifiedName, directives: bool) -> String {
        if let Some(&(_, _, mapped)) = CORE_TYPES
            .iter()
            .find(|(pkg, simple, _)| name.is(pkg, simple))
        {
            return mapped.to_owned();
        }
        if directives {
            if let Some(explicit) = self.explicit.get(name) {
                return explicit.clone();
            }
        }
        if let Some(outer) = name.outer() {
            let mut out = self.compute_full_name(&outer, directives);
            out.push('_');
            encode_identifier(&mut out, name.simple_name(), false);
            return out;
        }

        let prefix = if directives {
            self.package_prefix(name.package())
        } else {
            camel_case_package(name.package())
        };
        let mut out = prefix;
        let at_start = out.is_empty();
        encode_identifier(&mut out, name.simple_name(), at_start);
        if at_start && is_reserved(&out) {
            out.push('_');
        }
        out
    }

    /// Local variables and fields as they appear in expressions.
    pub fn variable_name(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 1);
        encode_identifier(&mut out, name, true);
        if is_reserved(&out) || out == "initialize" {
            out.push('_');
        }
        out
    }

    /// Instance variable name: `count` → `count_`.
    pub fn ivar_name(&self, field: &str) -> String {
        let mut out = String::with_capacity(field.len() + 1);
        encode_identifier(&mut out, field, true);
        out.push('_');
        out
    }

    /// Storage for a static field: `Type_field`.
    pub fn static_var_name(&self, owner: &QualifiedName, field: &str) -> String {
        let mut out = self.full_name(owner);
        out.push('_');
        encode_identifier(&mut out, field, false);
        out
    }

    /// Parameter names additionally avoid the Objective-C type qualifiers.
    pub fn param_name(&self, name: &str) -> String {
        if reserved::is_param_qualifier(name) {
            return format!("{name}Arg");
        }
        self.variable_name(name)
    }

    /// Base of a method selector before parameter keywords.
    pub fn method_name(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        encode_identifier(&mut out, name, true);
        if is_reserved(&out) || reserved::is_nsobject_message(&out) {
            out.push_str(METHOD_SUFFIX);
        }
        out
    }
}

/// `@ObjectiveCName("X")` on a type, if present.
pub(crate) fn explicit_type_name(decl: &TypeDecl) -> Option<&str> {
    xlat_ir::find_annotation(&decl.annotations, well_known::OBJECTIVE_C_NAME)
        .and_then(|a| a.string_value())
}

/// Reject naming directives the generated code cannot honor.
pub(crate) fn validate_type_directives(decl: &TypeDecl) -> Result<(), TranslateError> {
    let has_directive = explicit_type_name(decl).is_some()
        || xlat_ir::find_annotation(&decl.annotations, well_known::SWIFT_NAME).is_some();
    if has_directive && decl.modifiers.is_private() {
        return Err(TranslateError::NameOnPrivateType {
            ty: decl.name.to_string(),
            span: decl.span,
        });
    }
    if let Some(name) = explicit_type_name(decl) {
        if !is_valid_identifier(name) {
            return Err(TranslateError::InvalidExplicitName {
                name: name.to_owned(),
                reason: "not a valid identifier".to_owned(),
                span: decl.span,
            });
        }
    }
    Ok(())
}

/// `unit.test` → `UnitTest`.
pub fn camel_case_package(package: &str) -> String {
    let mut out = String::with_capacity(package.len());
    for (i, segment) in package.split('.').filter(|s| !s.is_empty()).enumerate() {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            if i == 0 && first.is_ascii_digit() {
                out.push('_');
            }
            out.extend(first.to_uppercase());
            let mut rest = String::new();
            rest.extend(chars);
            encode_identifier(&mut out, &rest, false);
        }
    }
    out
}

/// Uppercase the first character.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Append `name`, rewriting only what the identifier grammar forbids.
///
/// Letters (including non-ASCII), digits, `_` and `$` pass through. Other
/// ASCII characters become `_xx` (hex code). A leading digit at the start
/// of an identifier is prefixed with `_`.
pub fn encode_identifier(out: &mut String, name: &str, at_start: bool) {
    for (i, c) in name.chars().enumerate() {
        match c {
            c if c.is_ascii_digit() => {
                if at_start && i == 0 {
                    out.push('_');
                }
                out.push(c);
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => out.push(c),
            c if !c.is_ascii() && c.is_alphanumeric() => out.push(c),
            c => encode_char_hex(out, c),
        }
    }
}

fn encode_char_hex(out: &mut String, c: char) {
    let code = c as u32;
    if code <= 0xff {
        let _ = write!(out, "_{code:02x}");
    } else {
        let _ = write!(out, "_u{code:04x}");
    }
}

#[cfg(test)]
mod tests;
