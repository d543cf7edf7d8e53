//! Declaration tree model: the element and type universes that get compared.
//!
//! A [`Universe`] holds one independently loaded API surface. Types and
//! elements live in arenas and refer to each other by id, which lets type
//! variable bounds form cycles (`T extends Comparable<T>`) without shared
//! ownership. Handles such as [`TypeRef`] pair an id with the universe it
//! belongs to, so renderers and comparators always know where a node came from
//! and never compare nodes of two universes by identity.

use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

//==============================================================================
// Identifiers
//==============================================================================

/// Index of a [`Type`] inside its [`Universe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub usize);

/// Index of an [`Element`] inside its [`Universe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub usize);

//==============================================================================
// Type expressions
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
}

impl PrimitiveKind {
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Short => "short",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoTypeKind {
    Void,
    Package,
}

impl NoTypeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            NoTypeKind::Void => "void",
            NoTypeKind::Package => "package",
        }
    }
}

/// A reference to a named class or interface, possibly parameterized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredType {
    /// Fully qualified name of the referenced type
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<TypeId>,
    /// Set when the argument list could not be resolved, e.g. because the
    /// declaring class is missing from the classpath.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<String>,
}

impl DeclaredType {
    /// The type arguments, or an unresolved-symbol error when the producer
    /// could not complete them.
    pub fn type_arguments(&self) -> Result<&[TypeId]> {
        match &self.unresolved {
            Some(reason) => Err(Error::Unresolved(format!("{} ({reason})", self.name))),
            None => Ok(&self.arguments),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeVariable {
    /// Qualified name of the generic declaration that introduces the variable
    #[serde(default)]
    pub owner: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<TypeId>,
    pub upper: TypeId,
}

impl TypeVariable {
    pub fn key(&self) -> TypeVariableKey<'_> {
        TypeVariableKey {
            owner: &self.owner,
            name: &self.name,
        }
    }
}

/// Structural identity of a type variable.
///
/// Two nodes with the same key are the same logical variable even when the
/// producer stored them as distinct nodes, which is what cycle tracking during
/// rendering keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeVariableKey<'a> {
    pub owner: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WildcardType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_bound: Option<TypeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends_bound: Option<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutableType {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_variables: Vec<TypeId>,
    pub return_type: TypeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<TypeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thrown: Vec<TypeId>,
}

/// A node of a type expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Primitive(PrimitiveKind),
    /// Array of the component type
    Array(TypeId),
    Declared(DeclaredType),
    TypeVariable(TypeVariable),
    Wildcard(WildcardType),
    Intersection(Vec<TypeId>),
    Executable(ExecutableType),
    NoType(NoTypeKind),
}

impl Type {
    /// Ids of every type this node points at directly.
    fn referenced_types(&self) -> Vec<TypeId> {
        match self {
            Type::Primitive(_) | Type::NoType(_) => Vec::new(),
            Type::Array(component) => vec![*component],
            Type::Declared(declared) => declared.arguments.clone(),
            Type::TypeVariable(var) => var.lower.iter().copied().chain([var.upper]).collect(),
            Type::Wildcard(wildcard) => wildcard
                .super_bound
                .iter()
                .chain(wildcard.extends_bound.iter())
                .copied()
                .collect(),
            Type::Intersection(bounds) => bounds.clone(),
            Type::Executable(executable) => executable
                .type_variables
                .iter()
                .chain([&executable.return_type])
                .chain(executable.parameters.iter())
                .chain(executable.thrown.iter())
                .copied()
                .collect(),
        }
    }
}

//==============================================================================
// Annotation values
//==============================================================================

/// A constant value as it may appear in an annotation or a constant field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Char(char),
    Float(f32),
    Double(f64),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Boolean(v) => write!(f, "{v}"),
            Literal::Byte(v) => write!(f, "(byte){v}"),
            Literal::Short(v) => write!(f, "(short){v}"),
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Long(v) => write!(f, "{v}L"),
            Literal::Char(c) => {
                f.write_str("'")?;
                write_escaped(f, *c, '\'')?;
                f.write_str("'")
            }
            Literal::Float(v) => write!(f, "{v:?}f"),
            Literal::Double(v) => write!(f, "{v:?}"),
            Literal::String(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    write_escaped(f, c, '"')?;
                }
                f.write_str("\"")
            }
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, c: char, quote: char) -> fmt::Result {
    match c {
        '\\' => f.write_str("\\\\"),
        '\n' => f.write_str("\\n"),
        '\t' => f.write_str("\\t"),
        '\r' => f.write_str("\\r"),
        c if c == quote => write!(f, "\\{c}"),
        c => write!(f, "{c}"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: AnnotationValue,
}

/// An annotation instance: its type plus the explicitly given attribute
/// values, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub annotation_type: TypeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl Annotation {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationValue {
    Literal(Literal),
    /// A class literal (`Foo.class`)
    Type(TypeId),
    EnumConstant { enum_type: TypeId, name: String },
    Annotation(Annotation),
    Array(Vec<AnnotationValue>),
}

//==============================================================================
// Elements
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Package,
    Type,
    Variable,
    Executable,
    TypeParameter,
    Annotation,
    Unknown,
}

impl ElementKind {
    pub const ALL: [ElementKind; 7] = [
        ElementKind::Package,
        ElementKind::Type,
        ElementKind::Variable,
        ElementKind::Executable,
        ElementKind::TypeParameter,
        ElementKind::Annotation,
        ElementKind::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Package => "package",
            ElementKind::Type => "type",
            ElementKind::Variable => "variable",
            ElementKind::Executable => "executable",
            ElementKind::TypeParameter => "type_parameter",
            ElementKind::Annotation => "annotation",
            ElementKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The flavour of a type declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "@interface",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<TypeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ElementId>,
}

/// A field, enum constant or method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    #[serde(rename = "type")]
    pub ty: TypeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_value: Option<Literal>,
}

/// A method, constructor or annotation attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutableDeclaration {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<ElementId>,
    pub return_type: TypeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ElementId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thrown: Vec<TypeId>,
    /// Default value of an annotation attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<AnnotationValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeParameterDeclaration {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<TypeId>,
}

/// Kind-specific payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Declaration {
    Package,
    Type(TypeDeclaration),
    Variable(VariableDeclaration),
    Executable(ExecutableDeclaration),
    TypeParameter(TypeParameterDeclaration),
    Annotation(Annotation),
    Unknown,
}

impl Declaration {
    pub fn kind(&self) -> ElementKind {
        match self {
            Declaration::Package => ElementKind::Package,
            Declaration::Type(_) => ElementKind::Type,
            Declaration::Variable(_) => ElementKind::Variable,
            Declaration::Executable(_) => ElementKind::Executable,
            Declaration::TypeParameter(_) => ElementKind::TypeParameter,
            Declaration::Annotation(_) => ElementKind::Annotation,
            Declaration::Unknown => ElementKind::Unknown,
        }
    }
}

/// A node of a declaration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Simple name. Packages carry their full dotted name here.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enclosing: Option<ElementId>,
    /// Annotation elements attached to this element
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<ElementId>,
    pub declaration: Declaration,
}

impl Element {
    pub fn new(name: impl Into<String>, enclosing: Option<ElementId>, declaration: Declaration) -> Self {
        Self {
            name: name.into(),
            enclosing,
            annotations: Vec::new(),
            declaration,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.declaration.kind()
    }
}

//==============================================================================
// Universe
//==============================================================================

/// One independently loaded declaration tree with its type expressions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Universe {
    #[serde(default)]
    types: Vec<Type>,
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(skip)]
    type_index: OnceCell<HashMap<String, ElementId>>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserializes a universe from JSON and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let universe: Universe = serde_json::from_str(json)?;
        universe.validate()?;
        Ok(universe)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn add_type(&mut self, ty: Type) -> TypeId {
        self.types.push(ty);
        TypeId(self.types.len() - 1)
    }

    pub fn add_element(&mut self, element: Element) -> ElementId {
        self.type_index.take();
        self.elements.push(element);
        ElementId(self.elements.len() - 1)
    }

    pub fn type_mut(&mut self, id: TypeId) -> Option<&mut Type> {
        self.types.get_mut(id.0)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.type_index.take();
        self.elements.get_mut(id.0)
    }

    /// The type stored under `id`.
    ///
    /// Ids are only meaningful in the universe that issued them; passing a
    /// foreign id panics on a validated universe just like slice indexing.
    pub fn ty(&self, id: TypeId) -> &Type {
        &self.types[id.0]
    }

    /// The element stored under `id`. Same id contract as [`Universe::ty`].
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn type_ref(&self, id: TypeId) -> TypeRef<'_> {
        TypeRef { universe: self, id }
    }

    pub fn element_ref(&self, id: ElementId) -> ElementRef<'_> {
        ElementRef { universe: self, id }
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        (0..self.elements.len()).map(move |i| self.element_ref(ElementId(i)))
    }

    /// Dotted name of an element. Packages use their own name, types are
    /// prefixed by their enclosing package or type, everything else uses the
    /// simple name.
    pub fn qualified_name(&self, id: ElementId) -> String {
        let element = self.element(id);
        if !matches!(element.declaration, Declaration::Type(_)) {
            return element.name.clone();
        }

        let mut segments = vec![element.name.as_str()];
        let mut current = element.enclosing;
        let mut steps = 0;
        while let Some(parent_id) = current {
            steps += 1;
            if steps > self.elements.len() {
                break;
            }
            let parent = self.element(parent_id);
            match parent.declaration {
                Declaration::Type(_) => {
                    segments.push(parent.name.as_str());
                    current = parent.enclosing;
                }
                Declaration::Package => {
                    if !parent.name.is_empty() {
                        segments.push(parent.name.as_str());
                    }
                    break;
                }
                _ => break,
            }
        }

        segments.reverse();
        segments.join(".")
    }

    /// Looks up a type element by its qualified name.
    pub fn find_type_element(&self, qualified_name: &str) -> Option<ElementId> {
        self.type_index
            .get_or_init(|| {
                self.elements
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| matches!(e.declaration, Declaration::Type(_)))
                    .map(|(i, _)| (self.qualified_name(ElementId(i)), ElementId(i)))
                    .collect()
            })
            .get(qualified_name)
            .copied()
    }

    /// The immediate supertypes of a type: superclass first, then interfaces.
    ///
    /// Fails with [`Error::Unresolved`] when a declared type has no type
    /// element in this universe or its arguments could not be resolved.
    pub fn direct_supertypes(&self, id: TypeId) -> Result<Vec<TypeId>> {
        match self.ty(id) {
            Type::Declared(declared) => {
                declared.type_arguments()?;
                let element_id = self
                    .find_type_element(&declared.name)
                    .ok_or_else(|| Error::Unresolved(declared.name.clone()))?;
                match &self.element(element_id).declaration {
                    Declaration::Type(decl) => Ok(decl
                        .superclass
                        .iter()
                        .chain(decl.interfaces.iter())
                        .copied()
                        .collect()),
                    _ => Ok(Vec::new()),
                }
            }
            Type::TypeVariable(var) => Ok(vec![var.upper]),
            Type::Intersection(bounds) => Ok(bounds.clone()),
            _ => Ok(Vec::new()),
        }
    }

    /// The superclass of a declared type, or the upper bound of a type
    /// variable. Interfaces and types without a declared superclass yield
    /// `None`.
    pub fn superclass(&self, id: TypeId) -> Result<Option<TypeId>> {
        match self.ty(id) {
            Type::Declared(declared) => {
                declared.type_arguments()?;
                let element_id = self
                    .find_type_element(&declared.name)
                    .ok_or_else(|| Error::Unresolved(declared.name.clone()))?;
                match &self.element(element_id).declaration {
                    Declaration::Type(decl) => Ok(decl.superclass),
                    _ => Ok(None),
                }
            }
            Type::TypeVariable(var) => Ok(Some(var.upper)),
            _ => Ok(None),
        }
    }

    /// Checks the structural preconditions every renderer and check relies on.
    pub fn validate(&self) -> Result<()> {
        for (i, ty) in self.types.iter().enumerate() {
            for referenced in ty.referenced_types() {
                self.check_type_id(referenced, || format!("type #{i}"))?;
            }
        }

        for (i, element) in self.elements.iter().enumerate() {
            self.validate_element(ElementId(i), element)?;
        }

        self.check_type_cycles()?;
        self.check_enclosing_cycles()
    }

    fn validate_element(&self, id: ElementId, element: &Element) -> Result<()> {
        let owner = || format!("element #{} '{}'", id.0, element.name);

        if let Some(enclosing) = element.enclosing {
            self.check_element_id(enclosing, owner)?;
        }
        for annotation in &element.annotations {
            self.check_element_id(*annotation, owner)?;
            if !matches!(self.element(*annotation).declaration, Declaration::Annotation(_)) {
                return Err(Error::Malformed(format!(
                    "{} lists element #{} as an annotation",
                    owner(),
                    annotation.0
                )));
            }
        }

        match &element.declaration {
            Declaration::Package | Declaration::Unknown => {}
            Declaration::Type(decl) => {
                for e in decl.type_parameters.iter().chain(decl.members.iter()) {
                    self.check_element_id(*e, owner)?;
                }
                self.check_type_parameters(&decl.type_parameters, &owner)?;
                for t in decl.superclass.iter().chain(decl.interfaces.iter()) {
                    self.check_type_id(*t, owner)?;
                }
            }
            Declaration::Variable(decl) => {
                self.check_type_id(decl.ty, owner)?;
                if let Some(enclosing) = element.enclosing {
                    if let Declaration::Executable(method) = &self.element(enclosing).declaration {
                        if !method.parameters.contains(&id) {
                            return Err(Error::Malformed(format!(
                                "{} is enclosed by executable '{}' but is not one of its parameters",
                                owner(),
                                self.element(enclosing).name
                            )));
                        }
                    }
                }
            }
            Declaration::Executable(decl) => {
                for e in decl.type_parameters.iter().chain(decl.parameters.iter()) {
                    self.check_element_id(*e, owner)?;
                }
                self.check_type_parameters(&decl.type_parameters, &owner)?;
                for parameter in &decl.parameters {
                    let candidate = self.element(*parameter);
                    let is_own_variable = matches!(candidate.declaration, Declaration::Variable(_))
                        && candidate.enclosing == Some(id);
                    if !is_own_variable {
                        return Err(Error::Malformed(format!(
                            "{} lists element #{} as a parameter, which is not a variable enclosed by it",
                            owner(),
                            parameter.0
                        )));
                    }
                }
                for t in [&decl.return_type].into_iter().chain(decl.thrown.iter()) {
                    self.check_type_id(*t, owner)?;
                }
                if let Some(value) = &decl.default_value {
                    self.validate_value(value, &owner)?;
                }
            }
            Declaration::TypeParameter(decl) => {
                for t in &decl.bounds {
                    self.check_type_id(*t, owner)?;
                }
            }
            Declaration::Annotation(annotation) => self.validate_annotation(annotation, &owner)?,
        }

        Ok(())
    }

    fn validate_annotation(&self, annotation: &Annotation, owner: &dyn Fn() -> String) -> Result<()> {
        self.check_type_id(annotation.annotation_type, owner)?;
        for (i, attribute) in annotation.attributes.iter().enumerate() {
            if annotation.attributes[..i].iter().any(|a| a.name == attribute.name) {
                return Err(Error::Malformed(format!(
                    "{} has duplicate annotation attribute '{}'",
                    owner(),
                    attribute.name
                )));
            }
            self.validate_value(&attribute.value, owner)?;
        }
        Ok(())
    }

    fn validate_value(&self, value: &AnnotationValue, owner: &dyn Fn() -> String) -> Result<()> {
        match value {
            AnnotationValue::Literal(_) => Ok(()),
            AnnotationValue::Type(t) => self.check_type_id(*t, owner),
            AnnotationValue::EnumConstant { enum_type, .. } => self.check_type_id(*enum_type, owner),
            AnnotationValue::Annotation(annotation) => self.validate_annotation(annotation, owner),
            AnnotationValue::Array(values) => values.iter().try_for_each(|v| self.validate_value(v, owner)),
        }
    }

    fn check_type_id(&self, id: TypeId, owner: impl FnOnce() -> String) -> Result<()> {
        if id.0 < self.types.len() {
            Ok(())
        } else {
            Err(Error::Malformed(format!("{} references missing type #{}", owner(), id.0)))
        }
    }

    fn check_type_parameters(&self, ids: &[ElementId], owner: &dyn Fn() -> String) -> Result<()> {
        match ids
            .iter()
            .find(|e| !matches!(self.element(**e).declaration, Declaration::TypeParameter(_)))
        {
            Some(e) => Err(Error::Malformed(format!(
                "{} lists element #{} as a type parameter",
                owner(),
                e.0
            ))),
            None => Ok(()),
        }
    }

    fn check_element_id(&self, id: ElementId, owner: impl FnOnce() -> String) -> Result<()> {
        if id.0 < self.elements.len() {
            Ok(())
        } else {
            Err(Error::Malformed(format!("{} references missing element #{}", owner(), id.0)))
        }
    }

    /// Only type variables may close a cycle; any other loop would make
    /// rendering diverge.
    fn check_type_cycles(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit(universe: &Universe, id: TypeId, marks: &mut [Mark]) -> Result<()> {
            match marks[id.0] {
                Mark::Done => return Ok(()),
                Mark::InProgress => {
                    return Err(Error::Malformed(format!(
                        "type #{} is part of a cycle that does not pass through a type variable",
                        id.0
                    )));
                }
                Mark::Unvisited => {}
            }
            if matches!(universe.ty(id), Type::TypeVariable(_)) {
                marks[id.0] = Mark::Done;
                return Ok(());
            }
            marks[id.0] = Mark::InProgress;
            for next in universe.ty(id).referenced_types() {
                visit(universe, next, marks)?;
            }
            marks[id.0] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unvisited; self.types.len()];
        (0..self.types.len()).try_for_each(|i| visit(self, TypeId(i), &mut marks))
    }

    fn check_enclosing_cycles(&self) -> Result<()> {
        for (i, element) in self.elements.iter().enumerate() {
            let mut current = element.enclosing;
            let mut steps = 0;
            while let Some(parent) = current {
                steps += 1;
                if steps > self.elements.len() {
                    return Err(Error::Malformed(format!(
                        "element #{i} '{}' has a cyclic enclosing chain",
                        element.name
                    )));
                }
                current = self.element(parent).enclosing;
            }
        }
        Ok(())
    }
}

//==============================================================================
// Handles
//==============================================================================

/// A type node together with the universe it lives in.
#[derive(Clone, Copy)]
pub struct TypeRef<'u> {
    universe: &'u Universe,
    id: TypeId,
}

impl<'u> TypeRef<'u> {
    pub fn universe(self) -> &'u Universe {
        self.universe
    }

    pub fn id(self) -> TypeId {
        self.id
    }

    pub fn get(self) -> &'u Type {
        self.universe.ty(self.id)
    }

    /// Another type of the same universe.
    pub fn to(self, id: TypeId) -> TypeRef<'u> {
        TypeRef {
            universe: self.universe,
            id,
        }
    }
}

impl fmt::Debug for TypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.id.0).finish()
    }
}

impl fmt::Display for TypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::human::type_to_human_readable(*self))
    }
}

/// An element together with the universe it lives in.
#[derive(Clone, Copy)]
pub struct ElementRef<'u> {
    universe: &'u Universe,
    id: ElementId,
}

impl<'u> ElementRef<'u> {
    pub fn universe(self) -> &'u Universe {
        self.universe
    }

    pub fn id(self) -> ElementId {
        self.id
    }

    pub fn get(self) -> &'u Element {
        self.universe.element(self.id)
    }

    pub fn name(self) -> &'u str {
        &self.get().name
    }

    pub fn kind(self) -> ElementKind {
        self.get().kind()
    }

    pub fn declaration(self) -> &'u Declaration {
        &self.get().declaration
    }

    pub fn enclosing(self) -> Option<ElementRef<'u>> {
        self.get().enclosing.map(|id| self.related(id))
    }

    pub fn qualified_name(self) -> String {
        self.universe.qualified_name(self.id)
    }

    /// Annotation elements attached to this element, in declaration order.
    pub fn annotations(self) -> impl Iterator<Item = ElementRef<'u>> {
        self.get().annotations.iter().map(move |id| self.related(*id))
    }

    /// Another element of the same universe.
    pub fn related(self, id: ElementId) -> ElementRef<'u> {
        ElementRef {
            universe: self.universe,
            id,
        }
    }

    /// A type of the same universe.
    pub fn type_ref(self, id: TypeId) -> TypeRef<'u> {
        self.universe.type_ref(id)
    }

    /// The annotation payload when this is an annotation element.
    pub fn as_annotation(self) -> Option<AnnotationRef<'u>> {
        match self.declaration() {
            Declaration::Annotation(annotation) => Some(AnnotationRef::new(self.universe, annotation)),
            _ => None,
        }
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id.0)
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}

impl fmt::Display for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::human::element_to_human_readable(*self))
    }
}

/// An annotation instance together with its universe.
#[derive(Clone, Copy)]
pub struct AnnotationRef<'u> {
    universe: &'u Universe,
    annotation: &'u Annotation,
}

impl<'u> AnnotationRef<'u> {
    pub fn new(universe: &'u Universe, annotation: &'u Annotation) -> Self {
        Self { universe, annotation }
    }

    pub fn universe(self) -> &'u Universe {
        self.universe
    }

    pub fn get(self) -> &'u Annotation {
        self.annotation
    }

    pub fn annotation_type(self) -> TypeRef<'u> {
        self.universe.type_ref(self.annotation.annotation_type)
    }

    pub fn attributes(self) -> &'u [Attribute] {
        &self.annotation.attributes
    }

    pub fn attribute(self, name: &str) -> Option<ValueRef<'u>> {
        self.annotation
            .attribute(name)
            .map(|a| ValueRef::new(self.universe, &a.value))
    }
}

impl fmt::Debug for AnnotationRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnnotationRef").field(self.annotation).finish()
    }
}

/// An annotation value together with its universe.
#[derive(Clone, Copy)]
pub struct ValueRef<'u> {
    universe: &'u Universe,
    value: &'u AnnotationValue,
}

impl<'u> ValueRef<'u> {
    pub fn new(universe: &'u Universe, value: &'u AnnotationValue) -> Self {
        Self { universe, value }
    }

    pub fn universe(self) -> &'u Universe {
        self.universe
    }

    pub fn get(self) -> &'u AnnotationValue {
        self.value
    }

    /// A value of the same universe.
    pub fn with(self, value: &'u AnnotationValue) -> ValueRef<'u> {
        ValueRef::new(self.universe, value)
    }
}

impl fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueRef").field(self.value).finish()
    }
}

impl fmt::Display for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::values::to_human_readable(*self))
    }
}
