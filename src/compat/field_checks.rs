//! FIELD checks. Only variables declared directly in a type are fields;
//! method parameters are left to the METHOD checks.

use crate::canonical::to_unique_string;
use crate::compat::codes::Code;
use crate::compat::dispatch::{visit_pair, ElementPairVisitor, Node};
use crate::compat::types::{Attachment, CheckContext, CheckOutcome};
use crate::human::type_to_human_readable;
use crate::model::{ElementKind, ElementRef, VariableDeclaration};
use crate::values::literals_equal;

/// FIELD_TYPE
pub fn check_type_changed<'u>(
    ctx: &CheckContext,
    old: ElementRef<'u>,
    new: Option<ElementRef<'u>>,
) -> CheckOutcome<'u> {
    visit_pair(&mut FieldPairCheck { ctx, run: type_changed }, old, new)
}

/// FIELD_CONSTANT
pub fn check_constant_value<'u>(
    ctx: &CheckContext,
    old: ElementRef<'u>,
    new: Option<ElementRef<'u>>,
) -> CheckOutcome<'u> {
    visit_pair(&mut FieldPairCheck { ctx, run: constant_value }, old, new)
}

type FieldPairFn =
    for<'u> fn(&CheckContext, Node<'u, VariableDeclaration>, Node<'u, VariableDeclaration>) -> CheckOutcome<'u>;

struct FieldPairCheck<'c> {
    ctx: &'c CheckContext,
    run: FieldPairFn,
}

fn is_field(element: ElementRef<'_>) -> bool {
    element.enclosing().is_some_and(|e| e.kind() == ElementKind::Type)
}

impl<'u> ElementPairVisitor<'u> for FieldPairCheck<'_> {
    type Output = CheckOutcome<'u>;

    fn unmatched(&mut self, _element: ElementRef<'u>, _other: Option<ElementRef<'u>>) -> Self::Output {
        Ok(None)
    }

    fn visit_variable(
        &mut self,
        old: Node<'u, VariableDeclaration>,
        new: Node<'u, VariableDeclaration>,
    ) -> Self::Output {
        if !is_field(old.element) || !is_field(new.element) {
            return Ok(None);
        }
        (self.run)(self.ctx, old, new)
    }
}

fn type_changed<'u>(
    ctx: &CheckContext,
    old: Node<'u, VariableDeclaration>,
    new: Node<'u, VariableDeclaration>,
) -> CheckOutcome<'u> {
    let old_type = old.element.type_ref(old.decl.ty);
    let new_type = new.element.type_ref(new.decl.ty);
    if to_unique_string(old_type) == to_unique_string(new_type) {
        return Ok(None);
    }

    let difference = ctx.difference(
        Code::FieldTypeChanged,
        &[type_to_human_readable(old_type), type_to_human_readable(new_type)],
        vec![
            Attachment::Element(old.element),
            Attachment::Element(new.element),
            Attachment::Type(old_type),
            Attachment::Type(new_type),
        ],
    )?;
    Ok(Some(vec![difference]))
}

fn constant_value<'u>(
    ctx: &CheckContext,
    old: Node<'u, VariableDeclaration>,
    new: Node<'u, VariableDeclaration>,
) -> CheckOutcome<'u> {
    let (code, params) = match (&old.decl.constant_value, &new.decl.constant_value) {
        (None, None) => return Ok(None),
        (Some(o), Some(n)) if literals_equal(o, n) => return Ok(None),
        (Some(o), Some(n)) => (Code::FieldConstantValueChanged, vec![o.to_string(), n.to_string()]),
        (None, Some(n)) => (Code::FieldNowConstant, vec![n.to_string()]),
        (Some(o), None) => (Code::FieldNoLongerConstant, vec![o.to_string()]),
    };

    let difference = ctx.difference(
        code,
        &params,
        vec![Attachment::Element(old.element), Attachment::Element(new.element)],
    )?;
    Ok(Some(vec![difference]))
}
