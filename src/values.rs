//! Rendering and cross-universe equality of annotation values.

use crate::canonical;
use crate::human::type_to_human_readable;
use crate::model::{AnnotationRef, AnnotationValue, Attribute, Literal, ValueRef};
use std::collections::HashMap;

pub fn to_human_readable(value: ValueRef<'_>) -> String {
    let universe = value.universe();
    match value.get() {
        AnnotationValue::Literal(literal) => literal.to_string(),
        AnnotationValue::Type(t) => format!("{}.class", type_to_human_readable(universe.type_ref(*t))),
        AnnotationValue::EnumConstant { enum_type, name } => {
            format!("{}.{name}", type_to_human_readable(universe.type_ref(*enum_type)))
        }
        AnnotationValue::Annotation(annotation) => {
            annotation_to_human_readable(AnnotationRef::new(universe, annotation))
        }
        AnnotationValue::Array(values) => {
            let items: Vec<String> = values.iter().map(|v| to_human_readable(value.with(v))).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

/// The form annotation values are compared by. It coincides with the human
/// readable form.
pub fn to_unique_string(value: ValueRef<'_>) -> String {
    to_human_readable(value)
}

/// `@Type(name = value, ...)`, or just `@Type` without explicit attributes.
pub fn annotation_to_human_readable(annotation: AnnotationRef<'_>) -> String {
    let mut out = format!("@{}", type_to_human_readable(annotation.annotation_type()));
    if !annotation.attributes().is_empty() {
        let attributes: Vec<String> = annotation
            .attributes()
            .iter()
            .map(|a| {
                format!(
                    "{} = {}",
                    a.name,
                    to_human_readable(ValueRef::new(annotation.universe(), &a.value))
                )
            })
            .collect();
        out.push('(');
        out.push_str(&attributes.join(", "));
        out.push(')');
    }
    out
}

/// Attributes keyed by name, for lookups that ignore declaration order.
pub fn key_attributes_by_name(attributes: &[Attribute]) -> HashMap<&str, &Attribute> {
    attributes.iter().map(|a| (a.name.as_str(), a)).collect()
}

/// Structural equality of two values, possibly from different universes.
///
/// Type references compare by canonical form and enum constants by constant
/// name. Annotations match when their types agree and every attribute has an
/// equally rendered counterpart, in any order. Arrays compare element-wise in
/// order. Values of different kinds are never equal.
pub fn is_equal(old: ValueRef<'_>, new: ValueRef<'_>) -> bool {
    match (old.get(), new.get()) {
        (AnnotationValue::Literal(a), AnnotationValue::Literal(b)) => literals_equal(a, b),
        (AnnotationValue::Type(a), AnnotationValue::Type(b)) => {
            canonical::to_unique_string(old.universe().type_ref(*a))
                == canonical::to_unique_string(new.universe().type_ref(*b))
        }
        (AnnotationValue::EnumConstant { name: a, .. }, AnnotationValue::EnumConstant { name: b, .. }) => a == b,
        (AnnotationValue::Annotation(a), AnnotationValue::Annotation(b)) => annotations_equal(
            AnnotationRef::new(old.universe(), a),
            AnnotationRef::new(new.universe(), b),
        ),
        (AnnotationValue::Array(a), AnnotationValue::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| is_equal(old.with(x), new.with(y)))
        }
        _ => false,
    }
}

pub fn annotations_equal(old: AnnotationRef<'_>, new: AnnotationRef<'_>) -> bool {
    if canonical::to_unique_string(old.annotation_type()) != canonical::to_unique_string(new.annotation_type()) {
        return false;
    }
    if old.attributes().len() != new.attributes().len() {
        return false;
    }

    let new_attributes = key_attributes_by_name(new.attributes());
    old.attributes().iter().all(|attribute| match new_attributes.get(attribute.name.as_str()) {
        Some(other) => {
            to_unique_string(ValueRef::new(old.universe(), &attribute.value))
                == to_unique_string(ValueRef::new(new.universe(), &other.value))
        }
        None => false,
    })
}

/// Literal equality where floating point values compare bitwise, so NaN
/// equals itself.
pub fn literals_equal(a: &Literal, b: &Literal) -> bool {
    match (a, b) {
        (Literal::Float(x), Literal::Float(y)) => x.to_bits() == y.to_bits(),
        (Literal::Double(x), Literal::Double(y)) => x.to_bits() == y.to_bits(),
        _ => a == b,
    }
}
