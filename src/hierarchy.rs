//! Supertype queries over a single universe.
//!
//! Lookups that hit a missing class are not fatal: the walk stops, the
//! failure is logged at debug level and whatever was collected so far is
//! returned. Results compare across universes through canonical strings.

use crate::canonical::to_unique_string;
use crate::human::type_to_human_readable;
use crate::model::{ElementId, Type, TypeRef, Universe};
use std::collections::HashSet;

/// Upper limit on `$` characters tried by [`find_type_by_binary_name`].
const MAX_BINARY_NAME_SEPARATORS: usize = 8;

/// Types from different universes are the same when their canonical forms are.
pub fn is_same_type(a: TypeRef<'_>, b: TypeRef<'_>) -> bool {
    to_unique_string(a) == to_unique_string(b)
}

/// The superclass chain of `t`, nearest first. Interfaces are not included.
pub fn all_super_classes<'u>(t: TypeRef<'u>) -> Vec<TypeRef<'u>> {
    let universe = t.universe();
    let mut result = Vec::new();
    let mut seen = HashSet::from([to_unique_string(t)]);
    let mut current = t;

    loop {
        match universe.superclass(current.id()) {
            Ok(Some(id)) => {
                let superclass = current.to(id);
                if !seen.insert(to_unique_string(superclass)) {
                    tracing::debug!(
                        type_name = %type_to_human_readable(t),
                        "Superclass chain loops back on itself"
                    );
                    break;
                }
                result.push(superclass);
                current = superclass;
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(
                    type_name = %type_to_human_readable(t),
                    error = %e,
                    "Failed to find all super classes. Possibly missing classes?"
                );
                break;
            }
        }
    }

    result
}

/// Every supertype of `t`, classes and interfaces, depth first.
pub fn all_super_types<'u>(t: TypeRef<'u>) -> Vec<TypeRef<'u>> {
    let mut result = Vec::new();
    fill_all_super_types(t, &mut result);
    result
}

/// Appends every supertype of `t` to `result`. A supertype reachable along
/// several paths is appended once.
pub fn fill_all_super_types<'u>(t: TypeRef<'u>, result: &mut Vec<TypeRef<'u>>) {
    let mut seen: HashSet<String> = result.iter().map(|r| to_unique_string(*r)).collect();
    seen.insert(to_unique_string(t));
    fill(t, result, &mut seen);
}

fn fill<'u>(t: TypeRef<'u>, result: &mut Vec<TypeRef<'u>>, seen: &mut HashSet<String>) {
    match t.universe().direct_supertypes(t.id()) {
        Ok(supertypes) => {
            for id in supertypes {
                let supertype = t.to(id);
                if seen.insert(to_unique_string(supertype)) {
                    result.push(supertype);
                    fill(supertype, result, seen);
                }
            }
        }
        Err(e) => tracing::debug!(
            type_name = %type_to_human_readable(t),
            error = %e,
            "Failed to find all super types. Possibly missing classes?"
        ),
    }
}

/// Whether `t` is, or inherits from, one of `supertypes`. The candidates may
/// come from another universe.
pub fn is_subtype(t: TypeRef<'_>, supertypes: &[TypeRef<'_>]) -> bool {
    let wanted: HashSet<String> = supertypes.iter().map(|s| to_unique_string(*s)).collect();
    std::iter::once(t)
        .chain(all_super_types(t))
        .any(|candidate| wanted.contains(&to_unique_string(candidate)))
}

/// Like [`is_subtype`], but matches qualified class names and ignores type
/// arguments.
pub fn is_subtype_of_any(t: TypeRef<'_>, qualified_names: &[&str]) -> bool {
    std::iter::once(t)
        .chain(all_super_types(t))
        .any(|candidate| match candidate.get() {
            Type::Declared(declared) => qualified_names.contains(&declared.name.as_str()),
            _ => false,
        })
}

/// Finds a type element by its binary name, where nested classes are
/// separated by `$` (`com.acme.Outer$Inner`).
///
/// Each `$` may stand for a nesting separator or be a literal part of a class
/// name, so combinations are tried until one resolves, preferring literal `$`
/// characters left to right.
pub fn find_type_by_binary_name(universe: &Universe, binary_name: &str) -> Option<ElementId> {
    if let Some(found) = universe.find_type_element(binary_name) {
        return Some(found);
    }

    let positions: Vec<usize> = binary_name.match_indices('$').map(|(i, _)| i).collect();
    if positions.is_empty() {
        return None;
    }
    if positions.len() > MAX_BINARY_NAME_SEPARATORS {
        tracing::debug!(binary_name, "Too many '$' separators to try every nesting");
        return None;
    }

    let mut candidate = binary_name.as_bytes().to_vec();
    // Bit i set means the i-th `$` becomes a dot. Mask 0 was tried above.
    for mask in 1u32..(1 << positions.len()) {
        for (bit, position) in positions.iter().enumerate() {
            candidate[*position] = if mask & (1 << bit) != 0 { b'.' } else { b'$' };
        }
        if let Ok(name) = std::str::from_utf8(&candidate) {
            if let Some(found) = universe.find_type_element(name) {
                return Some(found);
            }
        }
    }

    None
}
