//! CLASS checks: type kind, superclass chain and implemented interfaces.

use crate::canonical::to_unique_string;
use crate::compat::codes::Code;
use crate::compat::dispatch::{visit_pair, ElementPairVisitor, Node};
use crate::compat::types::{into_outcome, Attachment, CheckContext, CheckOutcome};
use crate::hierarchy::{all_super_classes, fill_all_super_types};
use crate::human::type_to_human_readable;
use crate::model::{ElementRef, TypeDeclaration, TypeRef};
use std::collections::HashSet;

const OBJECT: &str = "java.lang.Object";

/// CLASS_KIND
pub fn check_kind_changed<'u>(
    ctx: &CheckContext,
    old: ElementRef<'u>,
    new: Option<ElementRef<'u>>,
) -> CheckOutcome<'u> {
    visit_pair(&mut TypePairCheck { ctx, run: kind_changed }, old, new)
}

/// CLASS_INHERITANCE
pub fn check_inheritance<'u>(
    ctx: &CheckContext,
    old: ElementRef<'u>,
    new: Option<ElementRef<'u>>,
) -> CheckOutcome<'u> {
    visit_pair(&mut TypePairCheck { ctx, run: inheritance }, old, new)
}

/// CLASS_INTERFACES
pub fn check_interfaces<'u>(
    ctx: &CheckContext,
    old: ElementRef<'u>,
    new: Option<ElementRef<'u>>,
) -> CheckOutcome<'u> {
    visit_pair(&mut TypePairCheck { ctx, run: interfaces }, old, new)
}

type TypePairFn = for<'u> fn(&CheckContext, Node<'u, TypeDeclaration>, Node<'u, TypeDeclaration>) -> CheckOutcome<'u>;

/// Runs a comparison on matched type elements and ignores everything else.
struct TypePairCheck<'c> {
    ctx: &'c CheckContext,
    run: TypePairFn,
}

impl<'u> ElementPairVisitor<'u> for TypePairCheck<'_> {
    type Output = CheckOutcome<'u>;

    fn unmatched(&mut self, _element: ElementRef<'u>, _other: Option<ElementRef<'u>>) -> Self::Output {
        Ok(None)
    }

    fn visit_type(&mut self, old: Node<'u, TypeDeclaration>, new: Node<'u, TypeDeclaration>) -> Self::Output {
        (self.run)(self.ctx, old, new)
    }
}

fn kind_changed<'u>(
    ctx: &CheckContext,
    old: Node<'u, TypeDeclaration>,
    new: Node<'u, TypeDeclaration>,
) -> CheckOutcome<'u> {
    if old.decl.kind == new.decl.kind {
        return Ok(None);
    }

    let difference = ctx.difference(
        Code::ClassKindChanged,
        &[old.decl.kind.as_str().to_string(), new.decl.kind.as_str().to_string()],
        vec![Attachment::Element(old.element), Attachment::Element(new.element)],
    )?;
    Ok(Some(vec![difference]))
}

/// The declared superclass followed by its own superclass chain, without
/// `java.lang.Object`.
fn superclass_chain<'u>(node: Node<'u, TypeDeclaration>) -> Vec<TypeRef<'u>> {
    let Some(superclass) = node.decl.superclass else {
        return Vec::new();
    };
    let first = node.element.type_ref(superclass);
    std::iter::once(first)
        .chain(all_super_classes(first))
        .filter(|t| to_unique_string(*t) != OBJECT)
        .collect()
}

fn inheritance<'u>(
    ctx: &CheckContext,
    old: Node<'u, TypeDeclaration>,
    new: Node<'u, TypeDeclaration>,
) -> CheckOutcome<'u> {
    let new_chain: HashSet<String> = superclass_chain(new).into_iter().map(to_unique_string).collect();
    let mut differences = Vec::new();

    for superclass in superclass_chain(old) {
        if !new_chain.contains(&to_unique_string(superclass)) {
            differences.push(ctx.difference(
                Code::ClassNoLongerInheritsFromClass,
                &[type_to_human_readable(superclass)],
                vec![
                    Attachment::Element(old.element),
                    Attachment::Element(new.element),
                    Attachment::Type(superclass),
                ],
            )?);
        }
    }

    into_outcome(differences)
}

/// Every interface the type implements, directly or through its supertypes.
fn implemented_interfaces<'u>(node: Node<'u, TypeDeclaration>) -> Vec<TypeRef<'u>> {
    let classes: HashSet<String> = superclass_chain(node).into_iter().map(to_unique_string).collect();

    let mut all = Vec::new();
    for id in node.decl.superclass.iter().chain(node.decl.interfaces.iter()) {
        let direct = node.element.type_ref(*id);
        if !all.iter().any(|t: &TypeRef<'_>| to_unique_string(*t) == to_unique_string(direct)) {
            all.push(direct);
        }
        fill_all_super_types(direct, &mut all);
    }

    all.into_iter()
        .filter(|t| {
            let key = to_unique_string(*t);
            key != OBJECT && !classes.contains(&key)
        })
        .collect()
}

fn interfaces<'u>(
    ctx: &CheckContext,
    old: Node<'u, TypeDeclaration>,
    new: Node<'u, TypeDeclaration>,
) -> CheckOutcome<'u> {
    let old_interfaces = implemented_interfaces(old);
    let new_interfaces = implemented_interfaces(new);
    let old_keys: HashSet<String> = old_interfaces.iter().map(|t| to_unique_string(*t)).collect();
    let new_keys: HashSet<String> = new_interfaces.iter().map(|t| to_unique_string(*t)).collect();
    let mut differences = Vec::new();

    for interface in &old_interfaces {
        if !new_keys.contains(&to_unique_string(*interface)) {
            differences.push(ctx.difference(
                Code::ClassNoLongerImplementsInterface,
                &[type_to_human_readable(*interface)],
                vec![
                    Attachment::Element(old.element),
                    Attachment::Element(new.element),
                    Attachment::Type(*interface),
                ],
            )?);
        }
    }

    for interface in &new_interfaces {
        if !old_keys.contains(&to_unique_string(*interface)) {
            differences.push(ctx.difference(
                Code::ClassNowImplementsInterface,
                &[type_to_human_readable(*interface)],
                vec![
                    Attachment::Element(old.element),
                    Attachment::Element(new.element),
                    Attachment::Type(*interface),
                ],
            )?);
        }
    }

    into_outcome(differences)
}
