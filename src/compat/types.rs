//! Core types for API difference detection

use crate::compat::codes::Code;
use crate::compat::messages::{default_registry, Locale, Messages};
use crate::error::Result;
use crate::human::{element_to_human_readable, type_to_human_readable};
use crate::model::{AnnotationRef, ElementRef, TypeRef, ValueRef};
use crate::values::{annotation_to_human_readable, to_human_readable};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The dimension along which a difference is judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityType {
    /// Code compiled against the old API still compiles
    Source,
    /// Binaries linked against the old API still link and run
    Binary,
    /// Behaviour observed by callers stays the same
    Semantic,
}

impl CompatibilityType {
    pub const ALL: [CompatibilityType; 3] = [
        CompatibilityType::Source,
        CompatibilityType::Binary,
        CompatibilityType::Semantic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CompatibilityType::Source => "SOURCE",
            CompatibilityType::Binary => "BINARY",
            CompatibilityType::Semantic => "SEMANTIC",
        }
    }
}

impl std::fmt::Display for CompatibilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a difference in one dimension, from harmless to breaking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifferenceSeverity {
    NonBreaking,
    PotentiallyBreaking,
    Breaking,
}

impl DifferenceSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            DifferenceSeverity::NonBreaking => "NON_BREAKING",
            DifferenceSeverity::PotentiallyBreaking => "POTENTIALLY_BREAKING",
            DifferenceSeverity::Breaking => "BREAKING",
        }
    }
}

impl std::fmt::Display for DifferenceSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected API difference
#[derive(Debug, Clone, Serialize)]
pub struct Difference<'u> {
    /// Dotted difference code, e.g. `java.field.typeChanged`
    pub code: String,
    /// Short localized name
    pub name: String,
    /// Localized description with parameters substituted
    pub description: String,
    /// Severity per dimension. Dimensions a code does not classify are absent.
    pub classification: BTreeMap<CompatibilityType, DifferenceSeverity>,
    /// The elements, types and values the difference is about
    pub attachments: Vec<Attachment<'u>>,
}

impl<'u> Difference<'u> {
    pub fn builder() -> DifferenceBuilder<'u> {
        DifferenceBuilder::default()
    }

    pub fn severity(&self, dimension: CompatibilityType) -> Option<DifferenceSeverity> {
        self.classification.get(&dimension).copied()
    }

    /// The worst severity over all classified dimensions
    pub fn max_severity(&self) -> Option<DifferenceSeverity> {
        self.classification.values().copied().max()
    }

    pub fn is_breaking(&self) -> bool {
        self.max_severity() == Some(DifferenceSeverity::Breaking)
    }
}

#[derive(Debug, Default)]
pub struct DifferenceBuilder<'u> {
    code: String,
    name: String,
    description: String,
    classification: BTreeMap<CompatibilityType, DifferenceSeverity>,
    attachments: Vec<Attachment<'u>>,
}

impl<'u> DifferenceBuilder<'u> {
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn add_classification(mut self, dimension: CompatibilityType, severity: DifferenceSeverity) -> Self {
        self.classification.insert(dimension, severity);
        self
    }

    pub fn add_attachments(mut self, attachments: impl IntoIterator<Item = Attachment<'u>>) -> Self {
        self.attachments.extend(attachments);
        self
    }

    pub fn build(self) -> Difference<'u> {
        Difference {
            code: self.code,
            name: self.name,
            description: self.description,
            classification: self.classification,
            attachments: self.attachments,
        }
    }
}

/// Something a difference refers to
#[derive(Debug, Clone, Copy)]
pub enum Attachment<'u> {
    Element(ElementRef<'u>),
    Type(TypeRef<'u>),
    Annotation(AnnotationRef<'u>),
    Attribute { name: &'u str, value: ValueRef<'u> },
    Value(ValueRef<'u>),
}

impl Attachment<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Attachment::Element(_) => "element",
            Attachment::Type(_) => "type",
            Attachment::Annotation(_) => "annotation",
            Attachment::Attribute { .. } => "attribute",
            Attachment::Value(_) => "value",
        }
    }

    /// Human readable rendering of the attached item
    pub fn render(&self) -> String {
        match self {
            Attachment::Element(element) => element_to_human_readable(*element),
            Attachment::Type(t) => type_to_human_readable(*t),
            Attachment::Annotation(annotation) => annotation_to_human_readable(*annotation),
            Attachment::Attribute { name, value } => format!("{name} = {}", to_human_readable(*value)),
            Attachment::Value(value) => to_human_readable(*value),
        }
    }
}

impl Serialize for Attachment<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Attachment", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("rendered", &self.render())?;
        state.end()
    }
}

/// What a check reports for one element pair: `None` when it has nothing to
/// say. `Err` only carries failures to materialize a difference's messages.
pub type CheckOutcome<'u> = Result<Option<Vec<Difference<'u>>>>;

/// Collapses an empty list of differences into `None`
pub fn into_outcome(differences: Vec<Difference<'_>>) -> CheckOutcome<'_> {
    if differences.is_empty() {
        Ok(None)
    } else {
        Ok(Some(differences))
    }
}

/// Context shared by every check of one engine run
#[derive(Debug, Clone)]
pub struct CheckContext {
    messages: Arc<Messages>,
}

impl CheckContext {
    pub fn new(messages: Arc<Messages>) -> Self {
        Self { messages }
    }

    /// A context backed by the process-wide message registry
    pub fn for_locale(locale: &Locale) -> Result<Self> {
        Ok(Self::new(default_registry().messages(locale)?))
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn difference<'u>(
        &self,
        code: Code,
        params: &[String],
        attachments: Vec<Attachment<'u>>,
    ) -> Result<Difference<'u>> {
        code.create_difference_from(&self.messages, params, attachments)
    }
}
