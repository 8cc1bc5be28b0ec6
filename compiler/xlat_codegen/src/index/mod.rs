//! Batch-wide type index.
//!
//! Built once, single-threaded, before any unit is translated. Each unit's
//! generator consults it to decide includes versus forward declarations, to
//! find inherited constructors and interface default methods, and to
//! answer assignability questions for array stores and casts.
//!
//! Types outside the batch are known only through a small table of core
//! library relationships; anything else is [`Assignable::Unknown`] and the
//! generated code falls back to runtime checks.

use rustc_hash::{FxHashMap, FxHashSet};
use xlat_ir::{
    CompilationUnit, ConstructorDecl, MethodDecl, Modifiers, Nesting, PrimitiveKind,
    QualifiedName, ResolvedType, TypeDecl, TypeKind,
};

use crate::Options;

/// What the index knows about one batch type.
#[derive(Clone, Debug)]
pub struct TypeSummary {
    pub name: QualifiedName,
    pub kind: TypeKind,
    pub nesting: Nesting,
    pub modifiers: Modifiers,
    pub superclass: Option<QualifiedName>,
    pub interfaces: Vec<QualifiedName>,
    /// Include path of the header declaring the type (`com/example/Foo.h`).
    pub header: String,
    /// Position of the declaring unit in the batch.
    pub unit: usize,
    /// Declared constructors, bodies stripped.
    pub constructors: Vec<ConstructorDecl>,
    /// Interface methods with a body, bodies stripped.
    pub default_methods: Vec<MethodDecl>,
    /// Annotation type elements, in declaration order.
    pub elements: Vec<MethodDecl>,
}

/// Result of a static assignability query.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Assignable {
    Yes,
    No,
    /// Depends on a type the index cannot see.
    Unknown,
}

/// Supertypes of core library types outside the batch.
const CORE_SUPERTYPES: &[(&str, &[&str])] = &[
    ("java.io.Serializable", &[]),
    ("java.lang.Boolean", &["java.lang.Object", "java.io.Serializable", "java.lang.Comparable"]),
    ("java.lang.Byte", &["java.lang.Number", "java.lang.Comparable"]),
    ("java.lang.CharSequence", &[]),
    ("java.lang.Character", &["java.lang.Object", "java.io.Serializable", "java.lang.Comparable"]),
    ("java.lang.Cloneable", &[]),
    ("java.lang.Comparable", &[]),
    ("java.lang.Double", &["java.lang.Number", "java.lang.Comparable"]),
    ("java.lang.Enum", &["java.lang.Object", "java.io.Serializable", "java.lang.Comparable"]),
    ("java.lang.Error", &["java.lang.Throwable"]),
    ("java.lang.Exception", &["java.lang.Throwable"]),
    ("java.lang.Float", &["java.lang.Number", "java.lang.Comparable"]),
    ("java.lang.IllegalArgumentException", &["java.lang.RuntimeException"]),
    ("java.lang.IllegalStateException", &["java.lang.RuntimeException"]),
    ("java.lang.Integer", &["java.lang.Number", "java.lang.Comparable"]),
    ("java.lang.Iterable", &[]),
    ("java.lang.Long", &["java.lang.Number", "java.lang.Comparable"]),
    ("java.lang.Number", &["java.lang.Object", "java.io.Serializable"]),
    ("java.lang.Object", &[]),
    ("java.lang.Runnable", &[]),
    ("java.lang.RuntimeException", &["java.lang.Exception"]),
    ("java.lang.Short", &["java.lang.Number", "java.lang.Comparable"]),
    ("java.lang.String", &["java.lang.Object", "java.io.Serializable", "java.lang.Comparable", "java.lang.CharSequence"]),
    ("java.lang.Throwable", &["java.lang.Object", "java.io.Serializable"]),
];

#[derive(Default)]
pub struct TypeIndex {
    types: FxHashMap<QualifiedName, TypeSummary>,
    /// Batch types in input order.
    order: Vec<QualifiedName>,
}

impl TypeIndex {
    pub fn build<'a>(units: impl IntoIterator<Item = &'a CompilationUnit>, options: &Options) -> Self {
        let mut index = TypeIndex::default();
        for (position, unit) in units.into_iter().enumerate() {
            index.add_unit(position, unit, options);
        }
        index
    }

    /// Index one unit. Later units never replace earlier summaries.
    pub fn add_unit(&mut self, position: usize, unit: &CompilationUnit, options: &Options) {
        let stem = output_stem(unit);
        for decl in unit.all_types() {
            if self.types.contains_key(&decl.name) {
                continue;
            }
            let header = if options.separate_headers && decl.name.is_nested() {
                format!("{stem}_{}.h", decl.name.names()[1..].join("_"))
            } else {
                format!("{stem}.h")
            };
            self.order.push(decl.name.clone());
            self.types
                .insert(decl.name.clone(), summarize(decl, header, position));
        }
    }

    pub fn get(&self, name: &QualifiedName) -> Option<&TypeSummary> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.types.contains_key(name)
    }

    /// Batch types in input order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeSummary> {
        self.order.iter().filter_map(|n| self.types.get(n))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Header that declares `name`: the batch header, the core runtime
    /// header, or the conventional path of the top-level type. `None` for
    /// types the prologue already provides.
    pub fn include_path(&self, name: &QualifiedName) -> Option<String> {
        if let Some(summary) = self.types.get(name) {
            return Some(summary.header.clone());
        }
        if name.is("java.lang", "Object")
            || name.is("java.lang", "String")
            || name.is("java.lang", "Cloneable")
            || name.is("java.lang", "Number")
        {
            return None;
        }
        if name.is("java.lang", "Class") {
            return Some("IOSClass.h".to_owned());
        }
        Some(format!("{}.h", name.source_path()))
    }

    /// Direct supertypes, superclass first, when known.
    pub fn direct_supertypes(&self, name: &QualifiedName) -> Option<Vec<QualifiedName>> {
        if let Some(summary) = self.types.get(name) {
            let mut out: Vec<QualifiedName> = summary.superclass.iter().cloned().collect();
            out.extend(summary.interfaces.iter().cloned());
            return Some(out);
        }
        let dotted = name.to_string();
        CORE_SUPERTYPES
            .binary_search_by(|(n, _)| n.cmp(&dotted.as_str()))
            .ok()
            .map(|i| {
                CORE_SUPERTYPES[i]
                    .1
                    .iter()
                    .map(|s| QualifiedName::top_level(s))
                    .collect()
            })
    }

    /// Superclass chain of a batch type, nearest first, stopping at the
    /// first type outside the batch (which is included).
    pub fn superclass_chain(&self, name: &QualifiedName) -> Vec<&TypeSummary> {
        let mut chain = Vec::new();
        let mut current = self.types.get(name).and_then(|s| s.superclass.as_ref());
        let mut seen = FxHashSet::default();
        while let Some(next) = current {
            if !seen.insert(next.clone()) {
                break;
            }
            match self.types.get(next) {
                Some(summary) => {
                    chain.push(summary);
                    current = summary.superclass.as_ref();
                }
                None => break,
            }
        }
        chain
    }

    /// Is a `sub` value assignable to a `sup` variable without conversion
    /// other than primitive widening?
    pub fn is_assignable(&self, sub: &ResolvedType, sup: &ResolvedType) -> Assignable {
        match (sub, sup) {
            (ResolvedType::Primitive(a), ResolvedType::Primitive(b)) => {
                bool_to_assignable(primitive_widens(*a, *b))
            }
            (ResolvedType::Primitive(_), _) | (_, ResolvedType::Primitive(_)) => Assignable::No,
            (_, ResolvedType::TypeVariable(_)) => Assignable::Unknown,
            (_, sup) if sup.is_object() => Assignable::Yes,
            (ResolvedType::Null, _) => Assignable::Yes,
            (ResolvedType::TypeVariable(_) | ResolvedType::Wildcard(_), _) => {
                match self.is_assignable(&sub.erasure(), sup) {
                    Assignable::Yes => Assignable::Yes,
                    _ => Assignable::Unknown,
                }
            }
            (_, ResolvedType::Wildcard(_)) => self.is_assignable(sub, &sup.erasure()),
            (ResolvedType::Array(a), ResolvedType::Array(b)) => {
                let a_prim = a.element.is_primitive();
                let b_prim = b.element.is_primitive();
                if a_prim || b_prim {
                    return bool_to_assignable(a.dimensions == b.dimensions && a.element == b.element);
                }
                if a.dimensions < b.dimensions {
                    // Only an erased element could hide the missing levels.
                    return match a.element.as_ref() {
                        ResolvedType::TypeVariable(_) => Assignable::Unknown,
                        _ => Assignable::No,
                    };
                }
                let sub_component = if a.dimensions == b.dimensions {
                    (*a.element).clone()
                } else {
                    ResolvedType::array_of((*a.element).clone(), a.dimensions - b.dimensions)
                };
                self.is_assignable(&sub_component, &b.element)
            }
            (ResolvedType::Array(_), sup) => {
                let Some(d) = sup.declared() else {
                    return Assignable::No;
                };
                bool_to_assignable(
                    d.name.is("java.lang", "Cloneable") || d.name.is("java.io", "Serializable"),
                )
            }
            (_, ResolvedType::Array(_)) => Assignable::No,
            (sub, sup) => match (sub.declared(), sup.declared()) {
                (Some(a), Some(b)) => self.is_subclass(&a.name, &b.name),
                _ => Assignable::Unknown,
            },
        }
    }

    /// Reachability over the supertype graph.
    fn is_subclass(&self, sub: &QualifiedName, sup: &QualifiedName) -> Assignable {
        let mut queue = vec![sub.clone()];
        let mut seen = FxHashSet::default();
        let mut complete = true;
        while let Some(next) = queue.pop() {
            if &next == sup {
                return Assignable::Yes;
            }
            if !seen.insert(next.clone()) {
                continue;
            }
            match self.direct_supertypes(&next) {
                Some(supers) => queue.extend(supers),
                None => complete = false,
            }
        }
        if complete {
            Assignable::No
        } else {
            Assignable::Unknown
        }
    }

    /// Static half of the covariant store check: false only when `value`
    /// can never be stored into an array of `element`. Everything else is
    /// left to the checked runtime store.
    pub fn may_store(&self, element: &ResolvedType, value: &ResolvedType) -> bool {
        self.is_assignable(value, element) != Assignable::No
    }
}

fn bool_to_assignable(b: bool) -> Assignable {
    if b {
        Assignable::Yes
    } else {
        Assignable::No
    }
}

/// Identity and widening primitive conversions.
pub fn primitive_widens(from: PrimitiveKind, to: PrimitiveKind) -> bool {
    use PrimitiveKind::{Byte, Char, Double, Float, Int, Long, Short};
    from == to
        || matches!(
            (from, to),
            (Byte, Short | Int | Long | Float | Double)
                | (Short | Char, Int | Long | Float | Double)
                | (Int, Long | Float | Double)
                | (Long, Float | Double)
                | (Float, Double)
        )
}

/// Source path without extension: `com/example/Foo.java` → `com/example/Foo`.
pub(crate) fn output_stem(unit: &CompilationUnit) -> String {
    let path = unit.file_name.as_str();
    path.rsplit_once('.')
        .filter(|(_, ext)| !ext.contains('/'))
        .map_or(path, |(stem, _)| stem)
        .to_owned()
}

fn summarize(decl: &TypeDecl, header: String, unit: usize) -> TypeSummary {
    let strip_ctor = |c: &ConstructorDecl| ConstructorDecl {
        body: None,
        ..c.clone()
    };
    let strip_method = |m: &MethodDecl| MethodDecl {
        body: None,
        native_code: None,
        ..m.clone()
    };
    TypeSummary {
        name: decl.name.clone(),
        kind: decl.kind,
        nesting: decl.nesting,
        modifiers: decl.modifiers,
        superclass: decl.superclass.as_ref().map(|s| s.name.clone()),
        interfaces: decl.interfaces.iter().map(|i| i.name.clone()).collect(),
        header,
        unit,
        constructors: decl.constructors().map(strip_ctor).collect(),
        default_methods: if decl.kind == TypeKind::Interface {
            decl.methods()
                .filter(|m| m.body.is_some() && !m.is_static())
                .map(strip_method)
                .collect()
        } else {
            Vec::new()
        },
        elements: if decl.kind == TypeKind::Annotation {
            decl.methods().map(strip_method).collect()
        } else {
            Vec::new()
        },
    }
}
