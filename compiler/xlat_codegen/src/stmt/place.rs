//! Assignable storage.

/// A variable as the target of an assignment or increment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) enum Place {
    Local(String),
    /// `target->ivar`; `strong` when stores must retain.
    Ivar {
        target: String,
        ivar: String,
        strong: bool,
    },
    /// Static storage `Owner_field`. Another type's storage is reached
    /// through `JreLoadStaticRef`, which initializes the owner first.
    Static {
        owner: String,
        field: String,
        own: bool,
        strong: bool,
    },
    Element {
        class: String,
        array: String,
        index: String,
    },
}

impl Place {
    /// The storage as a C lvalue.
    pub fn lvalue(&self) -> String {
        match self {
            Place::Local(name) => name.clone(),
            Place::Ivar { target, ivar, .. } => format!("{target}->{ivar}"),
            Place::Static {
                owner, field, own: true, ..
            } => format!("{owner}_{field}"),
            Place::Static { owner, field, .. } => format!("*JreLoadStaticRef({owner}, {field})"),
            Place::Element {
                class,
                array,
                index,
            } => format!("*{class}_GetRef({array}, {index})"),
        }
    }

    /// Pointer to the storage.
    pub fn address(&self) -> String {
        match self {
            Place::Local(name) => format!("&{name}"),
            Place::Ivar { target, ivar, .. } => format!("&{target}->{ivar}"),
            Place::Static {
                owner, field, own: true, ..
            } => format!("&{owner}_{field}"),
            Place::Static { owner, field, .. } => format!("JreLoadStaticRef({owner}, {field})"),
            Place::Element {
                class,
                array,
                index,
            } => format!("{class}_GetRef({array}, {index})"),
        }
    }

    /// Stores go through a retaining helper.
    pub fn is_strong(&self) -> bool {
        match self {
            Place::Local(_) => false,
            Place::Ivar { strong, .. } | Place::Static { strong, .. } => *strong,
            Place::Element { class, .. } => class == "IOSObjectArray",
        }
    }

    pub fn is_object_element(&self) -> bool {
        matches!(self, Place::Element { class, .. } if class == "IOSObjectArray")
    }
}
