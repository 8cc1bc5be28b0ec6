//! `@Property` fields declared as Objective-C properties.

use xlat_ir::{well_known, FieldDecl, Span};

use crate::context::UnitContext;
use crate::plan::TypePlan;
use crate::stmt::declare;
use crate::TranslateError;

const ATTRIBUTES: &[&str] = &[
    "assign",
    "atomic",
    "class",
    "copy",
    "nonatomic",
    "nonnull",
    "null_resettable",
    "null_unspecified",
    "nullable",
    "readonly",
    "readwrite",
    "retain",
    "strong",
    "unsafe_unretained",
    "weak",
];

pub(crate) struct Property<'a> {
    pub field: &'a FieldDecl,
    pub name: String,
    pub ivar: String,
    pub attributes: Vec<String>,
}

impl Property<'_> {
    /// `@property (nonatomic, copy) NSString *name;`
    pub fn declaration(&self, cx: &UnitContext<'_>) -> Result<String, TranslateError> {
        let ty = cx.types.decl_type(&self.field.ty, self.field.span)?;
        let declared = declare(&ty, &self.name);
        if self.attributes.is_empty() {
            Ok(format!("@property {declared};"))
        } else {
            Ok(format!("@property ({}) {declared};", self.attributes.join(", ")))
        }
    }
}

/// Instance fields carrying `@Property`, with their attributes validated.
pub(crate) fn properties<'a>(
    cx: &UnitContext<'_>,
    plan: &TypePlan<'a>,
) -> Result<Vec<Property<'a>>, TranslateError> {
    let mut out = Vec::new();
    for ivar in &plan.ivars {
        let Some(field) = ivar.field else { continue };
        let Some(directive) = xlat_ir::find_annotation(&field.annotations, well_known::PROPERTY) else {
            continue;
        };
        let span = if directive.span.is_dummy() { field.span } else { directive.span };
        let attributes: Vec<String> = directive
            .string_value()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_owned)
            .collect();
        for attribute in &attributes {
            check_attribute(plan, attribute, span)?;
        }
        out.push(Property {
            field,
            name: cx.names.variable_name(&field.name),
            ivar: ivar.name.clone(),
            attributes,
        });
    }
    Ok(out)
}

fn check_attribute(plan: &TypePlan<'_>, attribute: &str, span: Span) -> Result<(), TranslateError> {
    let invalid = || TranslateError::InvalidPropertyAttribute {
        attribute: attribute.to_owned(),
        span,
    };
    let Some((key, value)) = attribute.split_once('=') else {
        return if ATTRIBUTES.contains(&attribute) { Ok(()) } else { Err(invalid()) };
    };
    let (role, arity) = match key.trim() {
        "getter" => ("getter", 0),
        "setter" => ("setter", 1),
        _ => return Err(invalid()),
    };
    let accessor = value.trim();
    let well_formed = if arity == 0 {
        !accessor.is_empty() && !accessor.contains(':')
    } else {
        accessor.ends_with(':') && accessor.matches(':').count() == 1
    };
    if !well_formed {
        return Err(invalid());
    }
    let found = plan
        .methods
        .iter()
        .any(|m| !m.is_static() && m.selector == accessor && m.decl.params.len() == arity);
    if found {
        Ok(())
    } else {
        Err(TranslateError::MissingPropertyAccessor {
            role,
            accessor: accessor.to_owned(),
            ty: plan.decl.name.to_string(),
            span,
        })
    }
}
