pub mod builder;
pub mod canonical;
pub mod compat;
pub mod error;
pub mod hierarchy;
pub mod human;
pub mod model;
pub mod surface;
pub mod values;

pub use error::{Error, Result};
pub use model::{ElementId, ElementRef, TypeId, TypeRef, Universe};
pub use surface::{ApiSurface, Comparison, Compatibility};

use model::Declaration;
use sha2::{Digest, Sha256};

/// Generates a semantic fingerprint for a declaration tree.
///
/// The fingerprint is a SHA-256 hash over one line per element: its kind,
/// its human readable rendering and, where the rendering leaves them out,
/// canonical supertypes, field types, constant values and annotation
/// defaults. The lines are sorted before hashing, so the fingerprint does not
/// depend on the order elements or types were added to the universe.
///
/// # Returns
///
/// The hex-encoded SHA-256 fingerprint string.
pub fn generate_fingerprint(universe: &Universe) -> String {
    let mut lines: Vec<String> = universe.elements().map(fingerprint_line).collect();
    lines.sort_unstable();

    let mut hasher = Sha256::new();
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

fn fingerprint_line(element: ElementRef<'_>) -> String {
    let mut line = format!("{}:{}", element.kind(), human::element_to_human_readable(element));

    match element.declaration() {
        Declaration::Type(decl) => {
            line.push_str(":kind=");
            line.push_str(decl.kind.as_str());
            if let Some(superclass) = decl.superclass {
                line.push_str(":extends=");
                line.push_str(&canonical::to_unique_string(element.type_ref(superclass)));
            }
            for interface in &decl.interfaces {
                line.push_str(":implements=");
                line.push_str(&canonical::to_unique_string(element.type_ref(*interface)));
            }
        }
        Declaration::Variable(decl) => {
            line.push(':');
            line.push_str(&canonical::to_unique_string(element.type_ref(decl.ty)));
            if let Some(value) = &decl.constant_value {
                line.push_str(&format!(":={value}"));
            }
        }
        Declaration::Executable(decl) => {
            if let Some(value) = &decl.default_value {
                let value = model::ValueRef::new(element.universe(), value);
                line.push_str(":default=");
                line.push_str(&values::to_human_readable(value));
            }
        }
        Declaration::Annotation(_) => {
            if let Some(target) = element.enclosing() {
                line.push_str(":on=");
                line.push_str(&human::element_to_human_readable(target));
            }
        }
        Declaration::Package | Declaration::TypeParameter(_) | Declaration::Unknown => {}
    }

    line
}
