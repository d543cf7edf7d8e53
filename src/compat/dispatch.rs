//! Double dispatch over pairs of elements.
//!
//! A check implements [`ElementPairVisitor`] and overrides the arms for the
//! element kinds it cares about. [`visit_pair`] selects the arm from the kind
//! of the first element. When the second element is missing or of another
//! kind, [`ElementPairVisitor::unmatched`] handles the pair instead.

use crate::model::{
    Annotation, Declaration, ElementRef, ExecutableDeclaration, TypeDeclaration, TypeParameterDeclaration,
    VariableDeclaration,
};

/// An element handle together with its declaration narrowed to one kind.
/// Both borrow the universe for `'u`, so values read through `decl` may
/// outlive the node itself.
pub struct Node<'u, D> {
    pub element: ElementRef<'u>,
    pub decl: &'u D,
}

impl<'u, D> Node<'u, D> {
    pub fn new(element: ElementRef<'u>, decl: &'u D) -> Self {
        Self { element, decl }
    }
}

impl<D> Clone for Node<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for Node<'_, D> {}

impl<D> std::fmt::Debug for Node<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Node").field(&self.element).finish()
    }
}

pub trait ElementPairVisitor<'u> {
    type Output;

    /// Handles a lone element, or a pair whose kinds differ.
    fn unmatched(&mut self, element: ElementRef<'u>, other: Option<ElementRef<'u>>) -> Self::Output;

    /// Fallback for matched pairs whose kind arm is not overridden.
    fn default_match(&mut self, element: ElementRef<'u>, other: ElementRef<'u>) -> Self::Output {
        self.unmatched(element, Some(other))
    }

    fn visit_package(&mut self, element: ElementRef<'u>, other: ElementRef<'u>) -> Self::Output {
        self.default_match(element, other)
    }

    fn visit_type(&mut self, element: Node<'u, TypeDeclaration>, other: Node<'u, TypeDeclaration>) -> Self::Output {
        self.default_match(element.element, other.element)
    }

    fn visit_variable(
        &mut self,
        element: Node<'u, VariableDeclaration>,
        other: Node<'u, VariableDeclaration>,
    ) -> Self::Output {
        self.default_match(element.element, other.element)
    }

    fn visit_executable(
        &mut self,
        element: Node<'u, ExecutableDeclaration>,
        other: Node<'u, ExecutableDeclaration>,
    ) -> Self::Output {
        self.default_match(element.element, other.element)
    }

    fn visit_type_parameter(
        &mut self,
        element: Node<'u, TypeParameterDeclaration>,
        other: Node<'u, TypeParameterDeclaration>,
    ) -> Self::Output {
        self.default_match(element.element, other.element)
    }

    fn visit_annotation(&mut self, element: Node<'u, Annotation>, other: Node<'u, Annotation>) -> Self::Output {
        self.default_match(element.element, other.element)
    }
}

/// Dispatches `(element, other)` to the arm for `element`'s kind.
pub fn visit_pair<'u, V>(visitor: &mut V, element: ElementRef<'u>, other: Option<ElementRef<'u>>) -> V::Output
where
    V: ElementPairVisitor<'u> + ?Sized,
{
    let Some(other) = other else {
        return visitor.unmatched(element, None);
    };

    match (element.declaration(), other.declaration()) {
        (Declaration::Package, Declaration::Package) => visitor.visit_package(element, other),
        (Declaration::Type(a), Declaration::Type(b)) => {
            visitor.visit_type(Node::new(element, a), Node::new(other, b))
        }
        (Declaration::Variable(a), Declaration::Variable(b)) => {
            visitor.visit_variable(Node::new(element, a), Node::new(other, b))
        }
        (Declaration::Executable(a), Declaration::Executable(b)) => {
            visitor.visit_executable(Node::new(element, a), Node::new(other, b))
        }
        (Declaration::TypeParameter(a), Declaration::TypeParameter(b)) => {
            visitor.visit_type_parameter(Node::new(element, a), Node::new(other, b))
        }
        (Declaration::Annotation(a), Declaration::Annotation(b)) => {
            visitor.visit_annotation(Node::new(element, a), Node::new(other, b))
        }
        (
            Declaration::Package
            | Declaration::Type(_)
            | Declaration::Variable(_)
            | Declaration::Executable(_)
            | Declaration::TypeParameter(_)
            | Declaration::Annotation(_)
            | Declaration::Unknown,
            _,
        ) => visitor.unmatched(element, Some(other)),
    }
}

/// Dispatches a lone element, which always ends up in `unmatched`.
pub fn visit_single<'u, V>(visitor: &mut V, element: ElementRef<'u>) -> V::Output
where
    V: ElementPairVisitor<'u> + ?Sized,
{
    visitor.unmatched(element, None)
}
