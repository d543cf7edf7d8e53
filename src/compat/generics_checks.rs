//! GENERICS checks: formal type parameters of types and methods.
//!
//! Type parameters are matched by position and compared by their bounds,
//! so renaming `T` to `E` is not a change.

use crate::canonical::to_unique_string;
use crate::compat::codes::Code;
use crate::compat::dispatch::{visit_pair, ElementPairVisitor, Node};
use crate::compat::types::{into_outcome, Attachment, CheckContext, CheckOutcome};
use crate::human::element_to_human_readable;
use crate::model::{Declaration, ElementId, ElementRef, ExecutableDeclaration, TypeDeclaration, TypeRef};

const OBJECT: &str = "java.lang.Object";

/// GENERICS_FORMAL_TYPE_PARAMETERS
pub fn check_formal_type_parameters<'u>(
    ctx: &CheckContext,
    old: ElementRef<'u>,
    new: Option<ElementRef<'u>>,
) -> CheckOutcome<'u> {
    visit_pair(&mut FormalTypeParameters { ctx }, old, new)
}

struct FormalTypeParameters<'c> {
    ctx: &'c CheckContext,
}

impl<'u> ElementPairVisitor<'u> for FormalTypeParameters<'_> {
    type Output = CheckOutcome<'u>;

    fn unmatched(&mut self, _element: ElementRef<'u>, _other: Option<ElementRef<'u>>) -> Self::Output {
        Ok(None)
    }

    fn visit_type(&mut self, old: Node<'u, TypeDeclaration>, new: Node<'u, TypeDeclaration>) -> Self::Output {
        compare(self.ctx, old.element, &old.decl.type_parameters, new.element, &new.decl.type_parameters)
    }

    fn visit_executable(
        &mut self,
        old: Node<'u, ExecutableDeclaration>,
        new: Node<'u, ExecutableDeclaration>,
    ) -> Self::Output {
        compare(self.ctx, old.element, &old.decl.type_parameters, new.element, &new.decl.type_parameters)
    }
}

fn bounds<'u>(parameter: ElementRef<'u>) -> Vec<TypeRef<'u>> {
    match parameter.declaration() {
        Declaration::TypeParameter(decl) => decl.bounds.iter().map(|id| parameter.type_ref(*id)).collect(),
        _ => Vec::new(),
    }
}

/// Canonical form of the bounds, with a lone `java.lang.Object` bound treated
/// like no bound at all.
fn bounds_key(parameter: ElementRef<'_>) -> String {
    let keys: Vec<String> = bounds(parameter).into_iter().map(to_unique_string).collect();
    match keys.as_slice() {
        [only] if only == OBJECT => String::new(),
        _ => keys.join("&"),
    }
}

fn compare<'u>(
    ctx: &CheckContext,
    old: ElementRef<'u>,
    old_parameters: &[ElementId],
    new: ElementRef<'u>,
    new_parameters: &[ElementId],
) -> CheckOutcome<'u> {
    if old_parameters.is_empty() && !new_parameters.is_empty() {
        let difference = ctx.difference(
            Code::GenericsElementNowParameterized,
            &[element_to_human_readable(new)],
            vec![Attachment::Element(old), Attachment::Element(new)],
        )?;
        return Ok(Some(vec![difference]));
    }

    let mut differences = Vec::new();
    let common = old_parameters.len().min(new_parameters.len());

    for (old_id, new_id) in old_parameters.iter().zip(new_parameters) {
        let old_parameter = old.related(*old_id);
        let new_parameter = new.related(*new_id);
        if bounds_key(old_parameter) != bounds_key(new_parameter) {
            differences.push(ctx.difference(
                Code::GenericsFormalTypeParameterChanged,
                &[element_to_human_readable(old_parameter), element_to_human_readable(new_parameter)],
                vec![Attachment::Element(old_parameter), Attachment::Element(new_parameter)],
            )?);
        }
    }

    for id in &old_parameters[common..] {
        let parameter = old.related(*id);
        differences.push(ctx.difference(
            Code::GenericsFormalTypeParameterRemoved,
            &[element_to_human_readable(parameter)],
            vec![Attachment::Element(parameter), Attachment::Element(new)],
        )?);
    }

    for id in &new_parameters[common..] {
        let parameter = new.related(*id);
        differences.push(ctx.difference(
            Code::GenericsFormalTypeParameterAdded,
            &[element_to_human_readable(parameter)],
            vec![Attachment::Element(old), Attachment::Element(parameter)],
        )?);
    }

    into_outcome(differences)
}
