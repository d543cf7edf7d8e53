//! The catalog of difference codes and their per-dimension severities.

use crate::compat::messages::{default_registry, format_message, Locale, Messages};
use crate::compat::types::{Attachment, CompatibilityType, Difference, DifferenceSeverity};
use crate::error::Result;
use const_format::concatcp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of every code string
pub const NAMESPACE: &str = "java";

const NB: Option<DifferenceSeverity> = Some(DifferenceSeverity::NonBreaking);
const PB: Option<DifferenceSeverity> = Some(DifferenceSeverity::PotentiallyBreaking);
const BR: Option<DifferenceSeverity> = Some(DifferenceSeverity::Breaking);
const NA: Option<DifferenceSeverity> = None;

macro_rules! code_catalog {
    ($($variant:ident => ($category:literal, $name:literal, $source:expr, $binary:expr, $semantic:expr),)+) => {
        /// A difference code. Severities are listed as source, binary, semantic.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum Code {
            $($variant,)+
        }

        impl Code {
            pub const ALL: &'static [Code] = &[$(Code::$variant,)+];

            /// The dotted code string, `java.<category>.<name>`
            pub const fn code(self) -> &'static str {
                match self {
                    $(Code::$variant => concatcp!(NAMESPACE, ".", $category, ".", $name),)+
                }
            }

            pub const fn category(self) -> &'static str {
                match self {
                    $(Code::$variant => $category,)+
                }
            }

            const fn severities(self) -> [Option<DifferenceSeverity>; 3] {
                match self {
                    $(Code::$variant => [$source, $binary, $semantic],)+
                }
            }
        }
    };
}

code_catalog! {
    MissingInOldApi => ("missing", "oldClass", PB, PB, NA),
    MissingInNewApi => ("missing", "newClass", PB, PB, NA),

    ElementNoLongerDeprecated => ("element", "noLongerDeprecated", NB, NB, NA),
    ElementNowDeprecated => ("element", "nowDeprecated", NB, NB, NA),

    ClassVisibilityIncreased => ("class", "visibilityIncreased", NB, NB, NA),
    ClassVisibilityReduced => ("class", "visibilityReduced", BR, BR, NA),
    ClassKindChanged => ("class", "kindChanged", BR, BR, NA),
    ClassNoLongerFinal => ("class", "noLongerFinal", NB, NB, NA),
    ClassNowFinal => ("class", "nowFinal", BR, BR, NA),
    ClassNoLongerAbstract => ("class", "noLongerAbstract", NB, NB, NA),
    ClassNowAbstract => ("class", "nowAbstract", BR, BR, NA),
    ClassAdded => ("class", "added", NB, NB, NA),
    ClassRemoved => ("class", "removed", BR, BR, NA),
    ClassNoLongerImplementsInterface => ("class", "noLongerImplementsInterface", BR, BR, NA),
    ClassNowImplementsInterface => ("class", "nowImplementsInterface", NB, NB, NA),
    ClassFinalClassInheritsFromNewClass => ("class", "finalClassInheritsFromNewClass", NB, NB, NA),
    ClassNonFinalClassInheritsFromNewClass => ("class", "nonFinalClassInheritsFromNewClass", PB, PB, NA),
    ClassNowCheckedException => ("class", "nowCheckedException", BR, NB, NA),
    ClassNoLongerInheritsFromClass => ("class", "noLongerInheritsFromClass", BR, BR, NA),
    ClassNonPublicPartOfApi => ("class", "nonPublicPartOfAPI", NB, NB, BR),
    ClassSuperTypeTypeParametersChanged => ("class", "superTypeTypeParametersChanged", PB, PB, NA),
    ClassExternalClassExposedInApi => ("class", "externalClassExposedInAPI", NB, NB, PB),
    ClassExternalClassNoLongerExposedInApi => ("class", "externalClassNoLongerExposedInAPI", BR, BR, NA),

    AnnotationAdded => ("annotation", "added", NB, NB, PB),
    AnnotationRemoved => ("annotation", "removed", NB, NB, PB),
    AnnotationAttributeValueChanged => ("annotation", "attributeValueChanged", NB, NB, PB),
    AnnotationAttributeAdded => ("annotation", "attributeAdded", NB, NB, PB),
    AnnotationAttributeRemoved => ("annotation", "attributeRemoved", NB, NB, PB),
    AnnotationNoLongerInherited => ("annotation", "noLongerInherited", NB, NB, PB),
    AnnotationNowInherited => ("annotation", "nowInherited", NB, NB, PB),
    AnnotationNoLongerPresent => ("annotation", "noLongerPresent", NB, NB, PB),

    FieldAddedStaticField => ("field", "addedStaticField", NB, NB, NA),
    FieldAdded => ("field", "added", NB, NB, NA),
    FieldRemoved => ("field", "removed", BR, BR, NA),
    FieldConstantRemoved => ("field", "removedWithConstant", BR, NB, PB),
    FieldConstantValueChanged => ("field", "constantValueChanged", NB, NB, BR),
    FieldNowConstant => ("field", "nowConstant", NB, NB, NA),
    FieldNoLongerConstant => ("field", "noLongerConstant", NB, NB, NA),
    FieldNowFinal => ("field", "nowFinal", BR, BR, NA),
    FieldNoLongerFinal => ("field", "noLongerFinal", NB, NB, NA),
    FieldNoLongerStatic => ("field", "noLongerStatic", BR, BR, NA),
    FieldNowStatic => ("field", "nowStatic", NB, BR, NA),
    FieldTypeChanged => ("field", "typeChanged", BR, BR, NA),
    FieldSerialVersionUidUnchanged => ("field", "serialVersionUIDUnchanged", NB, NB, PB),
    FieldVisibilityIncreased => ("field", "visibilityIncreased", NB, NB, NA),
    FieldVisibilityReduced => ("field", "visibilityReduced", BR, BR, NA),
    FieldEnumConstantOrderChanged => ("field", "enumConstantOrderChanged", NB, NB, PB),

    MethodDefaultValueAdded => ("method", "defaultValueAdded", NB, NB, NA),
    MethodDefaultValueChanged => ("method", "defaultValueChanged", NB, NB, PB),
    MethodDefaultValueRemoved => ("method", "defaultValueRemoved", BR, NB, BR),
    MethodAddedToInterface => ("method", "addedToInterface", BR, PB, NA),
    MethodAttributeWithNoDefaultAddedToAnnotationType => ("method", "attributeWithNoDefaultAddedToAnnotationType", BR, NB, BR),
    MethodAttributeWithDefaultAddedToAnnotationType => ("method", "attributeWithDefaultAddedToAnnotationType", NB, NB, NA),
    MethodAbstractMethodAdded => ("method", "abstractMethodAdded", BR, BR, NA),
    MethodAdded => ("method", "added", NB, NB, NA),
    MethodFinalMethodAddedToNonFinalClass => ("method", "finalMethodAddedToNonFinalClass", PB, PB, NA),
    MethodRemoved => ("method", "removed", BR, BR, NA),
    MethodOverridingMethodRemoved => ("method", "overridingMethodRemoved", NB, NB, NA),
    MethodReplacedByAbstractMethodInSuperclass => ("method", "replacedByAbstractMethodInSuperClass", BR, BR, NA),
    MethodNonFinalMethodReplacedByFinalInSuperclass => ("method", "nonFinalReplacedByFinalInSuperclass", PB, PB, NA),
    MethodAttributeRemovedFromAnnotationType => ("method", "attributeRemovedFromAnnotationType", BR, BR, NA),
    MethodNoLongerFinal => ("method", "noLongerFinal", NB, NB, NA),
    MethodNowFinal => ("method", "nowFinal", BR, BR, NA),
    MethodVisibilityIncreased => ("method", "visibilityIncreased", NB, NB, NA),
    MethodVisibilityReduced => ("method", "visibilityReduced", BR, BR, NA),
    MethodReturnTypeChanged => ("method", "returnTypeChanged", PB, BR, NA),
    MethodReturnTypeTypeParametersChanged => ("method", "returnTypeTypeParametersChanged", BR, NB, NA),
    MethodNumberOfParametersChanged => ("method", "numberOfParametersChanged", BR, BR, NA),
    MethodParameterTypeChanged => ("method", "parameterTypeChanged", PB, BR, NA),
    MethodNoLongerStatic => ("method", "noLongerStatic", BR, BR, NA),
    MethodNowStatic => ("method", "nowStatic", NB, BR, NA),
    MethodCheckedExceptionAdded => ("method", "exception.checkedAdded", BR, NB, NA),
    MethodRuntimeExceptionAdded => ("method", "exception.runtimeAdded", NB, NB, NA),
    MethodCheckedExceptionRemoved => ("method", "exception.checkedRemoved", BR, NB, NA),
    MethodRuntimeExceptionRemoved => ("method", "exception.runtimeRemoved", NB, NB, NA),

    GenericsElementNowParameterized => ("generics", "elementNowParameterized", NB, NB, PB),
    GenericsFormalTypeParameterAdded => ("generics", "formalTypeParameterAdded", BR, NB, NA),
    GenericsFormalTypeParameterRemoved => ("generics", "formalTypeParameterRemoved", BR, NB, NA),
    GenericsFormalTypeParameterChanged => ("generics", "formalTypeParameterChanged", BR, NB, NA),
}

impl Code {
    /// Looks a code up by its dotted string
    pub fn from_code(code: &str) -> Option<Code> {
        Code::ALL.iter().copied().find(|c| c.code() == code)
    }

    pub fn severity(self, dimension: CompatibilityType) -> Option<DifferenceSeverity> {
        let [source, binary, semantic] = self.severities();
        match dimension {
            CompatibilityType::Source => source,
            CompatibilityType::Binary => binary,
            CompatibilityType::Semantic => semantic,
        }
    }

    /// Severity per classified dimension. Unclassified dimensions are left out.
    pub fn classification(self) -> BTreeMap<CompatibilityType, DifferenceSeverity> {
        CompatibilityType::ALL
            .iter()
            .filter_map(|dimension| self.severity(*dimension).map(|s| (*dimension, s)))
            .collect()
    }

    /// A difference without parameters or attachments
    pub fn create_difference(self, locale: &Locale) -> Result<Difference<'static>> {
        self.create_difference_with(locale, &[], Vec::new())
    }

    /// A difference with its description formatted from `params`, using the
    /// process-wide message registry.
    pub fn create_difference_with<'u>(
        self,
        locale: &Locale,
        params: &[String],
        attachments: Vec<Attachment<'u>>,
    ) -> Result<Difference<'u>> {
        let messages = default_registry().messages(locale)?;
        self.create_difference_from(&messages, params, attachments)
    }

    pub fn create_difference_from<'u>(
        self,
        messages: &Messages,
        params: &[String],
        attachments: Vec<Attachment<'u>>,
    ) -> Result<Difference<'u>> {
        let message = messages.get(self.code())?;
        let mut builder = Difference::builder()
            .with_code(self.code())
            .with_name(message.name.as_str())
            .with_description(format_message(&message.description, params))
            .add_attachments(attachments);
        for (dimension, severity) in self.classification() {
            builder = builder.add_classification(dimension, severity);
        }
        Ok(builder.build())
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Code {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("Unknown difference code: {s}"))
    }
}
