//! METHOD checks: return type, parameters, thrown exceptions and annotation
//! attribute defaults.

use crate::canonical::to_unique_string;
use crate::compat::codes::Code;
use crate::compat::dispatch::{visit_pair, ElementPairVisitor, Node};
use crate::compat::types::{into_outcome, Attachment, CheckContext, CheckOutcome};
use crate::hierarchy::is_subtype_of_any;
use crate::human::{element_to_human_readable, mark_parameter, type_to_human_readable};
use crate::model::{Declaration, ElementRef, ExecutableDeclaration, Type, TypeId, TypeRef, ValueRef};
use crate::values::{is_equal, to_human_readable};
use std::collections::HashSet;

/// Exceptions assignable to one of these are unchecked.
const UNCHECKED_ROOTS: &[&str] = &["java.lang.RuntimeException", "java.lang.Error"];

/// METHOD_RETURN_TYPE
pub fn check_return_type<'u>(
    ctx: &CheckContext,
    old: ElementRef<'u>,
    new: Option<ElementRef<'u>>,
) -> CheckOutcome<'u> {
    visit_pair(&mut MethodPairCheck { ctx, run: return_type }, old, new)
}

/// METHOD_PARAMETERS
pub fn check_parameters<'u>(
    ctx: &CheckContext,
    old: ElementRef<'u>,
    new: Option<ElementRef<'u>>,
) -> CheckOutcome<'u> {
    visit_pair(&mut MethodPairCheck { ctx, run: parameters }, old, new)
}

/// METHOD_EXCEPTIONS
pub fn check_exceptions<'u>(
    ctx: &CheckContext,
    old: ElementRef<'u>,
    new: Option<ElementRef<'u>>,
) -> CheckOutcome<'u> {
    visit_pair(&mut MethodPairCheck { ctx, run: exceptions }, old, new)
}

/// METHOD_DEFAULT_VALUE
pub fn check_default_value<'u>(
    ctx: &CheckContext,
    old: ElementRef<'u>,
    new: Option<ElementRef<'u>>,
) -> CheckOutcome<'u> {
    visit_pair(&mut MethodPairCheck { ctx, run: default_value }, old, new)
}

type MethodPairFn = for<'u> fn(
    &CheckContext,
    Node<'u, ExecutableDeclaration>,
    Node<'u, ExecutableDeclaration>,
) -> CheckOutcome<'u>;

struct MethodPairCheck<'c> {
    ctx: &'c CheckContext,
    run: MethodPairFn,
}

impl<'u> ElementPairVisitor<'u> for MethodPairCheck<'_> {
    type Output = CheckOutcome<'u>;

    fn unmatched(&mut self, _element: ElementRef<'u>, _other: Option<ElementRef<'u>>) -> Self::Output {
        Ok(None)
    }

    fn visit_executable(
        &mut self,
        old: Node<'u, ExecutableDeclaration>,
        new: Node<'u, ExecutableDeclaration>,
    ) -> Self::Output {
        (self.run)(self.ctx, old, new)
    }
}

fn pair_attachments<'u>(
    old: Node<'u, ExecutableDeclaration>,
    new: Node<'u, ExecutableDeclaration>,
) -> Vec<Attachment<'u>> {
    vec![Attachment::Element(old.element), Attachment::Element(new.element)]
}

fn return_type<'u>(
    ctx: &CheckContext,
    old: Node<'u, ExecutableDeclaration>,
    new: Node<'u, ExecutableDeclaration>,
) -> CheckOutcome<'u> {
    let old_type = old.element.type_ref(old.decl.return_type);
    let new_type = new.element.type_ref(new.decl.return_type);
    if to_unique_string(old_type) == to_unique_string(new_type) {
        return Ok(None);
    }

    // Same class, different type arguments
    let code = match (old_type.get(), new_type.get()) {
        (Type::Declared(a), Type::Declared(b)) if a.name == b.name => Code::MethodReturnTypeTypeParametersChanged,
        _ => Code::MethodReturnTypeChanged,
    };

    let mut attachments = pair_attachments(old, new);
    attachments.extend([Attachment::Type(old_type), Attachment::Type(new_type)]);
    let difference = ctx.difference(
        code,
        &[type_to_human_readable(old_type), type_to_human_readable(new_type)],
        attachments,
    )?;
    Ok(Some(vec![difference]))
}

fn parameter_type<'u>(parameter: ElementRef<'u>) -> Option<TypeRef<'u>> {
    match parameter.declaration() {
        Declaration::Variable(variable) => Some(parameter.type_ref(variable.ty)),
        _ => None,
    }
}

fn parameters<'u>(
    ctx: &CheckContext,
    old: Node<'u, ExecutableDeclaration>,
    new: Node<'u, ExecutableDeclaration>,
) -> CheckOutcome<'u> {
    if old.decl.parameters.len() != new.decl.parameters.len() {
        let difference = ctx.difference(
            Code::MethodNumberOfParametersChanged,
            &[element_to_human_readable(old.element), element_to_human_readable(new.element)],
            pair_attachments(old, new),
        )?;
        return Ok(Some(vec![difference]));
    }

    let mut differences = Vec::new();
    let new_signature = element_to_human_readable(new.element);

    for (index, (old_id, new_id)) in old.decl.parameters.iter().zip(&new.decl.parameters).enumerate() {
        let old_parameter = old.element.related(*old_id);
        let new_parameter = new.element.related(*new_id);
        let (Some(old_type), Some(new_type)) = (parameter_type(old_parameter), parameter_type(new_parameter)) else {
            continue;
        };
        if to_unique_string(old_type) == to_unique_string(new_type) {
            continue;
        }

        let marked = mark_parameter(&new_signature, index).unwrap_or_else(|| new_signature.clone());
        differences.push(ctx.difference(
            Code::MethodParameterTypeChanged,
            &[type_to_human_readable(old_type), type_to_human_readable(new_type), marked],
            vec![
                Attachment::Element(old_parameter),
                Attachment::Element(new_parameter),
                Attachment::Type(old_type),
                Attachment::Type(new_type),
            ],
        )?);
    }

    into_outcome(differences)
}

fn is_unchecked(exception: TypeRef<'_>) -> bool {
    is_subtype_of_any(exception, UNCHECKED_ROOTS)
}

fn thrown_types<'u>(node: Node<'u, ExecutableDeclaration>) -> Vec<TypeRef<'u>> {
    node.decl.thrown.iter().map(|id: &TypeId| node.element.type_ref(*id)).collect()
}

fn exceptions<'u>(
    ctx: &CheckContext,
    old: Node<'u, ExecutableDeclaration>,
    new: Node<'u, ExecutableDeclaration>,
) -> CheckOutcome<'u> {
    let old_thrown = thrown_types(old);
    let new_thrown = thrown_types(new);
    let old_keys: HashSet<String> = old_thrown.iter().map(|t| to_unique_string(*t)).collect();
    let new_keys: HashSet<String> = new_thrown.iter().map(|t| to_unique_string(*t)).collect();
    let mut differences = Vec::new();

    for exception in &old_thrown {
        if new_keys.contains(&to_unique_string(*exception)) {
            continue;
        }
        let code = if is_unchecked(*exception) {
            Code::MethodRuntimeExceptionRemoved
        } else {
            Code::MethodCheckedExceptionRemoved
        };
        let mut attachments = pair_attachments(old, new);
        attachments.push(Attachment::Type(*exception));
        differences.push(ctx.difference(code, &[type_to_human_readable(*exception)], attachments)?);
    }

    for exception in &new_thrown {
        if old_keys.contains(&to_unique_string(*exception)) {
            continue;
        }
        let code = if is_unchecked(*exception) {
            Code::MethodRuntimeExceptionAdded
        } else {
            Code::MethodCheckedExceptionAdded
        };
        let mut attachments = pair_attachments(old, new);
        attachments.push(Attachment::Type(*exception));
        differences.push(ctx.difference(code, &[type_to_human_readable(*exception)], attachments)?);
    }

    into_outcome(differences)
}

fn default_value<'u>(
    ctx: &CheckContext,
    old: Node<'u, ExecutableDeclaration>,
    new: Node<'u, ExecutableDeclaration>,
) -> CheckOutcome<'u> {
    let old_value = old.decl.default_value.as_ref().map(|v| ValueRef::new(old.element.universe(), v));
    let new_value = new.decl.default_value.as_ref().map(|v| ValueRef::new(new.element.universe(), v));

    let mut attachments = pair_attachments(old, new);
    let (code, params) = match (old_value, new_value) {
        (None, None) => return Ok(None),
        (Some(o), Some(n)) if is_equal(o, n) => return Ok(None),
        (Some(o), Some(n)) => {
            attachments.extend([Attachment::Value(o), Attachment::Value(n)]);
            (Code::MethodDefaultValueChanged, vec![to_human_readable(o), to_human_readable(n)])
        }
        (None, Some(n)) => {
            attachments.push(Attachment::Value(n));
            (Code::MethodDefaultValueAdded, vec![to_human_readable(n)])
        }
        (Some(o), None) => {
            attachments.push(Attachment::Value(o));
            (Code::MethodDefaultValueRemoved, vec![to_human_readable(o)])
        }
    };

    let difference = ctx.difference(code, &params, attachments)?;
    Ok(Some(vec![difference]))
}
