//! Canonical rendering of type expressions.
//!
//! The canonical form is used only for equality and hashing. Two structurally
//! identical types loaded into unrelated universes render to the same string,
//! because the output depends on names and shape alone, never on arena ids.
//!
//! Grammar:
//! - primitives and `void`/`package` render as their keyword
//! - arrays append `[]` to the component
//! - declared types render `qualified.Name<Arg1,Arg2>`
//! - type variables render `lower-upper+`, or `%` when re-entered through
//!   their own bounds
//! - wildcards render `super-` then `extends+`, each only when present
//! - intersections render every bound followed by `+`
//! - executables render `<Vars>Return(Param,...)throws:Thrown,...`

use crate::model::{Type, TypeId, TypeRef, TypeVariableKey, Universe};
use std::collections::HashSet;

/// Written in place of a type variable that is already being rendered.
pub const RECURSION_MARKER: char = '%';

/// Renders a type in canonical form.
pub fn to_unique_string(t: TypeRef<'_>) -> String {
    let mut writer = CanonicalWriter::new(t.universe());
    writer.write_type(t.id());
    writer.out
}

struct CanonicalWriter<'u> {
    universe: &'u Universe,
    out: String,
    // Keyed structurally so that distinct nodes for one logical variable
    // share a single cycle guard.
    visited: HashSet<TypeVariableKey<'u>>,
}

impl<'u> CanonicalWriter<'u> {
    fn new(universe: &'u Universe) -> Self {
        Self {
            universe,
            out: String::new(),
            visited: HashSet::new(),
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
                    Ok(arguments) => self.write_type_list(arguments),
                    Err(e) => tracing::warn!(
                        type_name = %declared.name,
                        error = %e,
                        "Omitting unresolved type arguments from canonical form"
                    ),
                }
            }
            Type::TypeVariable(var) => {
                if !self.visited.insert(var.key()) {
                    self.out.push(RECURSION_MARKER);
                    return;
                }

                if let Some(lower) = var.lower {
                    self.write_type(lower);
                    self.out.push('-');
                }

                self.write_type(var.upper);
                self.out.push('+');
            }
            Type::Wildcard(wildcard) => {
                if let Some(super_bound) = wildcard.super_bound {
                    self.write_type(super_bound);
                    self.out.push('-');
                }
                if let Some(extends_bound) = wildcard.extends_bound {
                    self.write_type(extends_bound);
                    self.out.push('+');
                }
            }
            Type::Intersection(bounds) => {
                for bound in bounds {
                    self.write_type(*bound);
                    self.out.push('+');
                }
            }
            Type::Executable(executable) => {
                self.write_type_list(&executable.type_variables);
                self.write_type(executable.return_type);
                self.out.push('(');
                self.write_joined(&executable.parameters);
                self.out.push(')');

                if !executable.thrown.is_empty() {
                    self.out.push_str("throws:");
                    self.write_joined(&executable.thrown);
                }
            }
            Type::NoType(kind) => self.out.push_str(kind.keyword()),
        }
    }

    fn write_type_list(&mut self, ids: &[TypeId]) {
        if ids.is_empty() {
            return;
        }
        self.out.push('<');
        self.write_joined(ids);
        self.out.push('>');
    }

    fn write_joined(&mut self, ids: &[TypeId]) {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.write_type(*id);
        }
    }
}
