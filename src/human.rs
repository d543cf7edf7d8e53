//! Human readable rendering of types and elements.
//!
//! The output is meant for difference messages, so it follows source syntax:
//! `? extends Number`, `<T> T com.acme.Box<T>::get(int) throws X`. When a
//! method parameter is rendered on its own, the whole enclosing signature is
//! rendered and the parameter is wrapped in `===` markers.

use crate::model::{
    Declaration, ElementId, ElementRef, ExecutableDeclaration, Type, TypeId, TypeRef, TypeVariableKey, Universe,
};
use crate::values;
use std::collections::HashSet;

/// Delimiter placed on both sides of a parameter highlighted within its
/// method's signature.
pub const PARAMETER_MARKER: &str = "===";

const OBJECT: &str = "java.lang.Object";

pub fn type_to_human_readable(t: TypeRef<'_>) -> String {
    let mut writer = HumanWriter::new(t.universe());
    writer.write_type(t.id());
    writer.out
}

pub fn element_to_human_readable(e: ElementRef<'_>) -> String {
    let mut writer = HumanWriter::new(e.universe());
    writer.write_element(e.id());
    writer.out
}

/// Wraps the `index`-th parameter of a rendered signature in
/// [`PARAMETER_MARKER`]s.
///
/// Parameters are split on commas at angle-bracket depth zero, so generic
/// arguments such as `Map<K, V>` stay in one piece. Returns `None` when the
/// signature has no parameter list or fewer than `index + 1` parameters.
pub fn mark_parameter(signature: &str, index: usize) -> Option<String> {
    let open = signature.find('(')?;
    let close = open + signature[open..].find(')')?;
    let params = &signature[open + 1..close];
    if params.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in params.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push((start, i));
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push((start, params.len()));

    let (mut from, to) = *segments.get(index)?;
    // parameters are joined with ", "
    if params[from..to].starts_with(' ') {
        from += 1;
    }

    let from = open + 1 + from;
    let to = open + 1 + to;
    Some(format!(
        "{}{PARAMETER_MARKER}{}{PARAMETER_MARKER}{}",
        &signature[..from],
        &signature[from..to],
        &signature[to..]
    ))
}

struct HumanWriter<'u> {
    universe: &'u Universe,
    out: String,
    visited: HashSet<TypeVariableKey<'u>>,
    /// Set while rendering a method signature; type variables then print
    /// bare names because their bounds are already in the `<...>` prefix.
    visiting_method: bool,
}

impl<'u> HumanWriter<'u> {
    fn new(universe: &'u Universe) -> Self {
        Self {
            universe,
            out: String::new(),
            visited: HashSet::new(),
            visiting_method: false,
        }
    }

    fn write_type(&mut self, id: TypeId) {
        match self.universe.ty(id) {
            Type::Primitive(kind) => self.out.push_str(kind.keyword()),
            Type::Array(component) => {
                self.write_type(*component);
                self.out.push_str("[]");
            }
            Type::Declared(declared) => {
                self.out.push_str(&declared.name);
                match declared.type_arguments() {
                    Ok(arguments) => self.write_type_arguments(arguments),
                    Err(e) => tracing::debug!(
                        type_name = %declared.name,
                        error = %e,
                        "Failed to enumerate type arguments. Class is missing?"
                    ),
                }
            }
            Type::TypeVariable(var) => {
                self.out.push_str(&var.name);
                if !self.visited.insert(var.key()) || self.visiting_method {
                    return;
                }

                if let Some(lower) = var.lower {
                    self.out.push_str(" super ");
                    self.write_type(lower);
                }

                self.out.push_str(" extends ");
                self.write_type(var.upper);
            }
            Type::Wildcard(wildcard) => {
                self.out.push('?');
                if let Some(super_bound) = wildcard.super_bound {
                    self.out.push_str(" super ");
                    self.write_type(super_bound);
                }
                if let Some(extends_bound) = wildcard.extends_bound {
                    self.out.push_str(" extends ");
                    self.write_type(extends_bound);
                }
            }
            Type::Intersection(bounds) => self.write_types(bounds),
            Type::Executable(executable) => {
                self.write_type_arguments(&executable.type_variables);

                let outer = std::mem::replace(&mut self.visiting_method, true);
                self.write_type(executable.return_type);
                self.out.push('(');
                self.write_types(&executable.parameters);
                self.out.push(')');
                if !executable.thrown.is_empty() {
                    self.out.push_str(" throws ");
                    self.write_types(&executable.thrown);
                }
                self.visiting_method = outer;
            }
            Type::NoType(kind) => self.out.push_str(kind.keyword()),
        }
    }

    fn write_type_arguments(&mut self, ids: &[TypeId]) {
        if ids.is_empty() {
            return;
        }
        self.out.push('<');
        self.write_types(ids);
        self.out.push('>');
    }

    fn write_types(&mut self, ids: &[TypeId]) {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.write_type(*id);
        }
    }

    fn write_elements(&mut self, ids: &[ElementId]) {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.write_element(*id);
        }
    }

    fn write_element(&mut self, id: ElementId) {
        let element = self.universe.element(id);
        match &element.declaration {
            Declaration::Package | Declaration::Unknown => self.out.push_str(&element.name),
            Declaration::Type(decl) => {
                self.out.push_str(&self.universe.qualified_name(id));
                if !decl.type_parameters.is_empty() {
                    self.out.push('<');
                    self.write_elements(&decl.type_parameters);
                    self.out.push('>');
                }
            }
            Declaration::Variable(decl) => {
                let parent = element.enclosing.map(|p| (p, &self.universe.element(p).declaration));
                match parent {
                    Some((parent, Declaration::Type(_))) => {
                        self.write_element(parent);
                        self.out.push('.');
                        self.out.push_str(&element.name);
                    }
                    Some((_, Declaration::Executable(_))) if self.visiting_method => self.write_type(decl.ty),
                    Some((parent, Declaration::Executable(method))) => self.write_parameter(id, parent, method),
                    _ => self.out.push_str(&element.name),
                }
            }
            Declaration::Executable(decl) => {
                let outer = std::mem::replace(&mut self.visiting_method, true);

                if !decl.type_parameters.is_empty() {
                    self.out.push('<');
                    self.write_elements(&decl.type_parameters);
                    self.out.push_str("> ");
                }

                self.write_type(decl.return_type);
                self.out.push(' ');
                if let Some(parent) = element.enclosing {
                    self.write_element(parent);
                    self.out.push_str("::");
                }
                self.out.push_str(&element.name);
                self.out.push('(');
                self.write_elements(&decl.parameters);
                self.out.push(')');

                if !decl.thrown.is_empty() {
                    self.out.push_str(" throws ");
                    self.write_types(&decl.thrown);
                }

                self.visiting_method = outer;
            }
            Declaration::TypeParameter(decl) => {
                self.out.push_str(&element.name);
                match decl.bounds.as_slice() {
                    [] => {}
                    [bound] => {
                        let rendered = type_to_human_readable(self.universe.type_ref(*bound));
                        if rendered != OBJECT {
                            self.out.push_str(" extends ");
                            self.out.push_str(&rendered);
                        }
                    }
                    bounds => {
                        self.out.push_str(" extends ");
                        self.write_types(bounds);
                    }
                }
            }
            Declaration::Annotation(annotation) => self.out.push_str(&values::annotation_to_human_readable(
                crate::model::AnnotationRef::new(self.universe, annotation),
            )),
        }
    }

    fn write_parameter(&mut self, id: ElementId, method_id: ElementId, method: &ExecutableDeclaration) {
        let signature = element_to_human_readable(self.universe.element_ref(method_id));
        let marked = method
            .parameters
            .iter()
            .position(|p| *p == id)
            .and_then(|index| mark_parameter(&signature, index));

        match marked {
            Some(marked) => self.out.push_str(&marked),
            None => {
                tracing::warn!(
                    parameter = %self.universe.element(id).name,
                    signature = %signature,
                    "Parameter not found in the signature of its executable"
                );
                self.out.push_str(&signature);
            }
        }
    }
}
