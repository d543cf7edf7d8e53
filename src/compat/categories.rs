//! Check categories, named after the code category segment they emit

use serde::{Deserialize, Serialize};

/// Categories that group related checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckCategory {
    /// ANNOTATION category - annotations and their attribute values
    Annotation,
    /// CLASS category - type kind and inheritance
    Class,
    /// FIELD category - field types and constant values
    Field,
    /// METHOD category - signatures, exceptions and annotation defaults
    Method,
    /// GENERICS category - formal type parameters
    Generics,
}

impl CheckCategory {
    /// Get the string identifier for this category
    pub fn id(&self) -> &'static str {
        match self {
            CheckCategory::Annotation => "ANNOTATION",
            CheckCategory::Class => "CLASS",
            CheckCategory::Field => "FIELD",
            CheckCategory::Method => "METHOD",
            CheckCategory::Generics => "GENERICS",
        }
    }

    /// The category segment of the codes this category's checks emit
    pub fn code_segment(&self) -> &'static str {
        match self {
            CheckCategory::Annotation => "annotation",
            CheckCategory::Class => "class",
            CheckCategory::Field => "field",
            CheckCategory::Method => "method",
            CheckCategory::Generics => "generics",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CheckCategory::Annotation => "Checks annotations added to or removed from elements and changes of their attribute values.",
            CheckCategory::Class => "Checks changes of type kind, superclasses and implemented interfaces.",
            CheckCategory::Field => "Checks changes of field types and compile-time constant values.",
            CheckCategory::Method => {
                "Checks changes of return types, parameters, thrown exceptions and annotation attribute defaults."
            }
            CheckCategory::Generics => "Checks added, removed and changed formal type parameters.",
        }
    }

    /// Parse category from string ID
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "ANNOTATION" => Some(CheckCategory::Annotation),
            "CLASS" => Some(CheckCategory::Class),
            "FIELD" => Some(CheckCategory::Field),
            "METHOD" => Some(CheckCategory::Method),
            "GENERICS" => Some(CheckCategory::Generics),
            _ => None,
        }
    }

    /// Get all available categories
    pub fn all() -> Vec<Self> {
        vec![
            CheckCategory::Annotation,
            CheckCategory::Class,
            CheckCategory::Field,
            CheckCategory::Method,
            CheckCategory::Generics,
        ]
    }
}

impl std::fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for CheckCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| format!("Unknown check category: {s}"))
    }
}
