//! Check registry
//!
//! Every check is a plain function over one element pair. This table is the
//! single place checks are registered.

use crate::compat::categories::CheckCategory;
use crate::compat::types::{CheckContext, CheckOutcome};
use crate::compat::{annotation_checks, class_checks, field_checks, generics_checks, method_checks};
use crate::model::ElementRef;

/// Signature shared by all checks. `new` is `None` when the old element has
/// no counterpart.
pub type CheckFn = for<'u> fn(&CheckContext, ElementRef<'u>, Option<ElementRef<'u>>) -> CheckOutcome<'u>;

#[derive(Debug, Clone, Copy)]
pub struct CheckDescriptor {
    pub id: &'static str,
    pub category: CheckCategory,
    pub run: CheckFn,
}

/// Master check registry
pub fn get_check_registry() -> &'static [CheckDescriptor] {
    CHECKS
}

pub fn find_check(id: &str) -> Option<&'static CheckDescriptor> {
    CHECKS.iter().find(|c| c.id == id)
}

const CHECKS: &[CheckDescriptor] = &[
    // ANNOTATION checks (2 checks)
    CheckDescriptor {
        id: "ANNOTATION_ATTRIBUTES",
        category: CheckCategory::Annotation,
        run: annotation_checks::check_attribute_value_changed,
    },
    CheckDescriptor {
        id: "ANNOTATION_PRESENCE",
        category: CheckCategory::Annotation,
        run: annotation_checks::check_annotation_presence,
    },
    // CLASS checks (3 checks)
    CheckDescriptor {
        id: "CLASS_KIND",
        category: CheckCategory::Class,
        run: class_checks::check_kind_changed,
    },
    CheckDescriptor {
        id: "CLASS_INHERITANCE",
        category: CheckCategory::Class,
        run: class_checks::check_inheritance,
    },
    CheckDescriptor {
        id: "CLASS_INTERFACES",
        category: CheckCategory::Class,
        run: class_checks::check_interfaces,
    },
    // FIELD checks (2 checks)
    CheckDescriptor {
        id: "FIELD_TYPE",
        category: CheckCategory::Field,
        run: field_checks::check_type_changed,
    },
    CheckDescriptor {
        id: "FIELD_CONSTANT",
        category: CheckCategory::Field,
        run: field_checks::check_constant_value,
    },
    // METHOD checks (4 checks)
    CheckDescriptor {
        id: "METHOD_RETURN_TYPE",
        category: CheckCategory::Method,
        run: method_checks::check_return_type,
    },
    CheckDescriptor {
        id: "METHOD_PARAMETERS",
        category: CheckCategory::Method,
        run: method_checks::check_parameters,
    },
    CheckDescriptor {
        id: "METHOD_EXCEPTIONS",
        category: CheckCategory::Method,
        run: method_checks::check_exceptions,
    },
    CheckDescriptor {
        id: "METHOD_DEFAULT_VALUE",
        category: CheckCategory::Method,
        run: method_checks::check_default_value,
    },
    // GENERICS checks (1 check)
    CheckDescriptor {
        id: "GENERICS_FORMAL_TYPE_PARAMETERS",
        category: CheckCategory::Generics,
        run: generics_checks::check_formal_type_parameters,
    },
];

/// Get count of all registered checks
pub const fn get_check_count() -> usize {
    CHECKS.len()
}

/// Verify registry consistency (for testing)
pub fn verify_checks() -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();
    for check in CHECKS {
        if !seen.insert(check.id) {
            return Err(format!("Duplicate check ID: {}", check.id));
        }
        if !check.id.starts_with(check.category.id()) {
            return Err(format!(
                "Check {} is registered under category {}",
                check.id,
                check.category.id()
            ));
        }
    }
    Ok(())
}
