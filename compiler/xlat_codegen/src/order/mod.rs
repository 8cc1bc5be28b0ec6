//! Declaration order for types that share one output file.
//!
//! Objective-C needs the full `@interface` of a superclass (and the
//! `@protocol` of every adopted protocol) before a subtype is declared.
//! Other references only need a forward declaration, but declaring the
//! referenced type first keeps combined headers readable, so those edges
//! are honored when they can be.
//!
//! The order is a depth-first post-order walk started from each type in
//! input order: dependencies come out first, in the order they were first
//! seen, and independent types keep their input order. A member reference
//! that closes a cycle, or that leads to a subtype of a type still being
//! walked, is dropped and its target stays forward-declared. Every dropped
//! edge produces an [`OrderNote`], since another walk order would have
//! dropped a different edge of the same cycle.

use rustc_hash::{FxHashMap, FxHashSet};
use xlat_ir::QualifiedName;

use crate::stack::ensure_sufficient_stack;

/// What one type needs declared before it.
#[derive(Clone, Debug)]
pub struct TypeDeps {
    pub name: QualifiedName,
    /// Superclass and interfaces, in declaration order.
    pub supertypes: Vec<QualifiedName>,
    /// Types named by members only.
    pub references: Vec<QualifiedName>,
}

/// A dependency the chosen order could not honor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OrderNote {
    /// `from` is declared before `to` although it names it; `to` is
    /// forward-declared instead.
    ForwardDeclared {
        from: QualifiedName,
        to: QualifiedName,
    },
    /// Types whose supertype relation is circular. The front end should
    /// have rejected this; the types are emitted in walk order.
    SupertypeCycle { types: Vec<QualifiedName> },
}

impl std::fmt::Display for OrderNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderNote::ForwardDeclared { from, to } => {
                write!(f, "`{from}` precedes `{to}`, which is forward-declared")
            }
            OrderNote::SupertypeCycle { types } => {
                let names: Vec<String> = types.iter().map(ToString::to_string).collect();
                write!(f, "circular supertypes: {}", names.join(" -> "))
            }
        }
    }
}

/// Result of [`order_types`]: input positions in declaration order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ordering {
    pub order: Vec<usize>,
    pub notes: Vec<OrderNote>,
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum Mark {
    Unvisited,
    Active,
    Done,
}

struct Walk<'t> {
    types: &'t [TypeDeps],
    positions: FxHashMap<&'t QualifiedName, usize>,
    marks: Vec<Mark>,
    /// Positions currently on the walk, outermost first.
    path: Vec<usize>,
    out: Ordering,
}

/// Order `types` so that every type follows its supertypes and, where no
/// cycle prevents it, the types its members name.
///
/// Dependencies outside `types` are ignored. Duplicate names resolve to
/// their first occurrence.
pub fn order_types(types: &[TypeDeps]) -> Ordering {
    let mut positions = FxHashMap::default();
    for (i, deps) in types.iter().enumerate() {
        positions.entry(&deps.name).or_insert(i);
    }
    let mut walk = Walk {
        types,
        positions,
        marks: vec![Mark::Unvisited; types.len()],
        path: Vec::new(),
        out: Ordering {
            order: Vec::with_capacity(types.len()),
            notes: Vec::new(),
        },
    };
    for i in 0..types.len() {
        walk.visit(i);
    }
    walk.out
}

impl Walk<'_> {
    fn visit(&mut self, i: usize) {
        if self.marks[i] != Mark::Unvisited {
            return;
        }
        self.marks[i] = Mark::Active;
        self.path.push(i);
        let types = self.types;
        let deps = &types[i];
        for sup in &deps.supertypes {
            self.follow(i, sup, true);
        }
        for reference in &deps.references {
            self.follow(i, reference, false);
        }
        self.path.pop();
        self.marks[i] = Mark::Done;
        self.out.order.push(i);
    }

    fn follow(&mut self, from: usize, to: &QualifiedName, is_supertype: bool) {
        let Some(&target) = self.positions.get(to) else {
            return;
        };
        match self.marks[target] {
            Mark::Unvisited if !is_supertype && self.has_active_ancestor(target) => {
                self.note(OrderNote::ForwardDeclared {
                    from: self.types[from].name.clone(),
                    to: to.clone(),
                });
            }
            Mark::Unvisited => ensure_sufficient_stack(|| self.visit(target)),
            Mark::Done => {}
            Mark::Active if target == from && !is_supertype => {}
            Mark::Active => {
                let note = if is_supertype {
                    let start = self.path.iter().position(|&p| p == target).unwrap_or(0);
                    OrderNote::SupertypeCycle {
                        types: self.path[start..]
                            .iter()
                            .map(|&p| self.types[p].name.clone())
                            .collect(),
                    }
                } else {
                    OrderNote::ForwardDeclared {
                        from: self.types[from].name.clone(),
                        to: to.clone(),
                    }
                };
                self.note(note);
            }
        }
    }

    /// Would visiting `start` now put it before one of its supertypes?
    fn has_active_ancestor(&self, start: usize) -> bool {
        let mut stack = vec![start];
        let mut seen = FxHashSet::default();
        while let Some(i) = stack.pop() {
            if !seen.insert(i) {
                continue;
            }
            for sup in &self.types[i].supertypes {
                if let Some(&p) = self.positions.get(sup) {
                    if self.marks[p] == Mark::Active {
                        return true;
                    }
                    stack.push(p);
                }
            }
        }
        false
    }

    fn note(&mut self, note: OrderNote) {
        tracing::debug!(%note, "declaration order");
        self.out.notes.push(note);
    }
}
