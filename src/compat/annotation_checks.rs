//! ANNOTATION checks: attribute values of matched annotations and annotation
//! presence on matched elements.

use crate::canonical;
use crate::compat::codes::Code;
use crate::compat::dispatch::{visit_pair, ElementPairVisitor, Node};
use crate::compat::types::{into_outcome, Attachment, CheckContext, CheckOutcome};
use crate::human::{element_to_human_readable, type_to_human_readable};
use crate::model::{Annotation, AnnotationRef, ElementRef, ValueRef};
use crate::values::{annotation_to_human_readable, is_equal, key_attributes_by_name, to_human_readable};

/// ANNOTATION_ATTRIBUTES
pub fn check_attribute_value_changed<'u>(
    ctx: &CheckContext,
    old: ElementRef<'u>,
    new: Option<ElementRef<'u>>,
) -> CheckOutcome<'u> {
    visit_pair(&mut AttributeValueChanged { ctx }, old, new)
}

/// ANNOTATION_PRESENCE
pub fn check_annotation_presence<'u>(
    ctx: &CheckContext,
    old: ElementRef<'u>,
    new: Option<ElementRef<'u>>,
) -> CheckOutcome<'u> {
    visit_pair(&mut AnnotationPresence { ctx }, old, new)
}

struct AttributeValueChanged<'c> {
    ctx: &'c CheckContext,
}

impl<'u> ElementPairVisitor<'u> for AttributeValueChanged<'_> {
    type Output = CheckOutcome<'u>;

    fn unmatched(&mut self, _element: ElementRef<'u>, _other: Option<ElementRef<'u>>) -> Self::Output {
        Ok(None)
    }

    fn visit_annotation(&mut self, old: Node<'u, Annotation>, new: Node<'u, Annotation>) -> Self::Output {
        compare_attributes(
            self.ctx,
            AnnotationRef::new(old.element.universe(), old.decl),
            AnnotationRef::new(new.element.universe(), new.decl),
        )
    }
}

/// Classifies every attribute name of two annotation instances exactly once:
/// removed, value changed (or unchanged), or added.
///
/// Old attributes are reported in declaration order, followed by the added
/// attributes in the new annotation's declaration order.
pub fn compare_attributes<'u>(
    ctx: &CheckContext,
    old: AnnotationRef<'u>,
    new: AnnotationRef<'u>,
) -> CheckOutcome<'u> {
    let mut differences = Vec::new();
    let old_type = type_to_human_readable(old.annotation_type());
    let mut remaining = key_attributes_by_name(new.attributes());

    for old_attribute in old.attributes() {
        let name = old_attribute.name.as_str();
        let old_value = ValueRef::new(old.universe(), &old_attribute.value);

        match remaining.remove(name) {
            None => differences.push(ctx.difference(
                Code::AnnotationAttributeRemoved,
                &[name.to_string(), old_type.clone()],
                vec![
                    Attachment::Attribute { name, value: old_value },
                    Attachment::Annotation(old),
                ],
            )?),
            Some(new_attribute) => {
                let new_value = ValueRef::new(new.universe(), &new_attribute.value);
                if !is_equal(old_value, new_value) {
                    differences.push(ctx.difference(
                        Code::AnnotationAttributeValueChanged,
                        &[
                            name.to_string(),
                            old_type.clone(),
                            to_human_readable(old_value),
                            to_human_readable(new_value),
                        ],
                        vec![
                            Attachment::Attribute { name, value: old_value },
                            Attachment::Annotation(old),
                            Attachment::Value(old_value),
                            Attachment::Value(new_value),
                        ],
                    )?);
                }
            }
        }
    }

    if !remaining.is_empty() {
        let new_type = type_to_human_readable(new.annotation_type());
        for new_attribute in new.attributes() {
            let name = new_attribute.name.as_str();
            if remaining.remove(name).is_none() {
                continue;
            }
            differences.push(ctx.difference(
                Code::AnnotationAttributeAdded,
                &[name.to_string(), new_type.clone()],
                vec![
                    Attachment::Attribute {
                        name,
                        value: ValueRef::new(new.universe(), &new_attribute.value),
                    },
                    Attachment::Annotation(new),
                ],
            )?);
        }
    }

    into_outcome(differences)
}

struct AnnotationPresence<'c> {
    ctx: &'c CheckContext,
}

impl<'u> ElementPairVisitor<'u> for AnnotationPresence<'_> {
    type Output = CheckOutcome<'u>;

    fn unmatched(&mut self, _element: ElementRef<'u>, _other: Option<ElementRef<'u>>) -> Self::Output {
        Ok(None)
    }

    fn default_match(&mut self, old: ElementRef<'u>, new: ElementRef<'u>) -> Self::Output {
        compare_presence(self.ctx, old, new)
    }

    fn visit_annotation(&mut self, _old: Node<'u, Annotation>, _new: Node<'u, Annotation>) -> Self::Output {
        Ok(None)
    }
}

fn keyed_annotations(element: ElementRef<'_>) -> Vec<(String, AnnotationRef<'_>)> {
    element
        .annotations()
        .filter_map(|a| a.as_annotation())
        .map(|a| (canonical::to_unique_string(a.annotation_type()), a))
        .collect()
}

fn compare_presence<'u>(ctx: &CheckContext, old: ElementRef<'u>, new: ElementRef<'u>) -> CheckOutcome<'u> {
    let old_annotations = keyed_annotations(old);
    let new_annotations = keyed_annotations(new);
    let mut differences = Vec::new();

    for (key, annotation) in &old_annotations {
        if !new_annotations.iter().any(|(k, _)| k == key) {
            differences.push(ctx.difference(
                Code::AnnotationRemoved,
                &[annotation_to_human_readable(*annotation), element_to_human_readable(old)],
                vec![Attachment::Annotation(*annotation), Attachment::Element(old)],
            )?);
        }
    }

    for (key, annotation) in &new_annotations {
        if !old_annotations.iter().any(|(k, _)| k == key) {
            differences.push(ctx.difference(
                Code::AnnotationAdded,
                &[annotation_to_human_readable(*annotation), element_to_human_readable(new)],
                vec![Attachment::Annotation(*annotation), Attachment::Element(new)],
            )?);
        }
    }

    into_outcome(differences)
}
