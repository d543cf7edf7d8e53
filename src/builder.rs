//! Convenience constructors for assembling a [`Universe`] by hand.
//!
//! Tree producers normally deserialize a universe from JSON; these helpers
//! cover programmatic construction (fixtures, adapters, tests). Every helper
//! that creates a child element also registers it with its parent, so the
//! result passes [`Universe::validate`].

use crate::model::{
    Annotation, Attribute, Declaration, DeclaredType, Element, ElementId, ExecutableDeclaration,
    NoTypeKind, PrimitiveKind, Type, TypeDeclaration, TypeId, TypeKind, TypeParameterDeclaration,
    TypeVariable, Universe, VariableDeclaration, WildcardType,
};

impl Universe {
    pub fn primitive(&mut self, kind: PrimitiveKind) -> TypeId {
        self.add_type(Type::Primitive(kind))
    }

    pub fn void(&mut self) -> TypeId {
        self.add_type(Type::NoType(NoTypeKind::Void))
    }

    pub fn declared(&mut self, name: &str, arguments: &[TypeId]) -> TypeId {
        self.add_type(Type::Declared(DeclaredType {
            name: name.to_string(),
            arguments: arguments.to_vec(),
            unresolved: None,
        }))
    }

    /// A declared type whose arguments could not be resolved.
    pub fn unresolved_declared(&mut self, name: &str, reason: &str) -> TypeId {
        self.add_type(Type::Declared(DeclaredType {
            name: name.to_string(),
            arguments: Vec::new(),
            unresolved: Some(reason.to_string()),
        }))
    }

    pub fn array_of(&mut self, component: TypeId) -> TypeId {
        self.add_type(Type::Array(component))
    }

    pub fn wildcard(&mut self, extends_bound: Option<TypeId>, super_bound: Option<TypeId>) -> TypeId {
        self.add_type(Type::Wildcard(WildcardType {
            super_bound,
            extends_bound,
        }))
    }

    pub fn intersection(&mut self, bounds: &[TypeId]) -> TypeId {
        self.add_type(Type::Intersection(bounds.to_vec()))
    }

    pub fn type_variable(&mut self, owner: &str, name: &str, upper: TypeId) -> TypeId {
        self.add_type(Type::TypeVariable(TypeVariable {
            owner: owner.to_string(),
            name: name.to_string(),
            lower: None,
            upper,
        }))
    }

    /// Re-points the upper bound of a type variable. This is how
    /// self-referential bounds are closed after the bound type exists.
    pub fn set_upper_bound(&mut self, variable: TypeId, upper: TypeId) -> bool {
        match self.type_mut(variable) {
            Some(Type::TypeVariable(var)) => {
                var.upper = upper;
                true
            }
            _ => false,
        }
    }

    pub fn package(&mut self, name: &str) -> ElementId {
        self.add_element(Element::new(name, None, Declaration::Package))
    }

    pub fn class(&mut self, enclosing: ElementId, name: &str) -> ElementId {
        self.type_element(enclosing, name, TypeKind::Class)
    }

    pub fn interface(&mut self, enclosing: ElementId, name: &str) -> ElementId {
        self.type_element(enclosing, name, TypeKind::Interface)
    }

    pub fn type_element(&mut self, enclosing: ElementId, name: &str, kind: TypeKind) -> ElementId {
        let id = self.add_element(Element::new(
            name,
            Some(enclosing),
            Declaration::Type(TypeDeclaration {
                kind,
                ..Default::default()
            }),
        ));
        self.push_member(enclosing, id);
        id
    }

    /// Sets the superclass and interfaces of a type element.
    pub fn set_supertypes(&mut self, class: ElementId, superclass: Option<TypeId>, interfaces: &[TypeId]) {
        if let Some(Element {
            declaration: Declaration::Type(decl),
            ..
        }) = self.element_mut(class)
        {
            decl.superclass = superclass;
            decl.interfaces = interfaces.to_vec();
        }
    }

    pub fn field(&mut self, owner: ElementId, name: &str, ty: TypeId) -> ElementId {
        let id = self.add_element(Element::new(
            name,
            Some(owner),
            Declaration::Variable(VariableDeclaration {
                ty,
                constant_value: None,
            }),
        ));
        self.push_member(owner, id);
        id
    }

    /// Adds a method with one parameter per entry of `parameter_types`,
    /// named `arg0`, `arg1`, ...
    pub fn method(
        &mut self,
        owner: ElementId,
        name: &str,
        return_type: TypeId,
        parameter_types: &[TypeId],
    ) -> ElementId {
        let method = self.add_element(Element::new(
            name,
            Some(owner),
            Declaration::Executable(ExecutableDeclaration {
                type_parameters: Vec::new(),
                return_type,
                parameters: Vec::new(),
                thrown: Vec::new(),
                default_value: None,
            }),
        ));
        self.push_member(owner, method);

        for (i, ty) in parameter_types.iter().enumerate() {
            let parameter = self.add_element(Element::new(
                format!("arg{i}"),
                Some(method),
                Declaration::Variable(VariableDeclaration {
                    ty: *ty,
                    constant_value: None,
                }),
            ));
            if let Some(Element {
                declaration: Declaration::Executable(decl),
                ..
            }) = self.element_mut(method)
            {
                decl.parameters.push(parameter);
            }
        }

        method
    }

    pub fn set_thrown(&mut self, method: ElementId, thrown: &[TypeId]) {
        if let Some(Element {
            declaration: Declaration::Executable(decl),
            ..
        }) = self.element_mut(method)
        {
            decl.thrown = thrown.to_vec();
        }
    }

    /// Declares a type parameter on a type or executable element.
    pub fn type_parameter(&mut self, owner: ElementId, name: &str, bounds: &[TypeId]) -> ElementId {
        let id = self.add_element(Element::new(
            name,
            Some(owner),
            Declaration::TypeParameter(TypeParameterDeclaration {
                bounds: bounds.to_vec(),
            }),
        ));
        match self.element_mut(owner).map(|e| &mut e.declaration) {
            Some(Declaration::Type(decl)) => decl.type_parameters.push(id),
            Some(Declaration::Executable(decl)) => decl.type_parameters.push(id),
            _ => {}
        }
        id
    }

    /// Attaches an annotation element to `target`.
    pub fn annotate(&mut self, target: ElementId, annotation_type: TypeId, attributes: Vec<Attribute>) -> ElementId {
        let name = match self.ty(annotation_type) {
            Type::Declared(declared) => declared
                .name
                .rsplit('.')
                .next()
                .unwrap_or(declared.name.as_str())
                .to_string(),
            _ => String::new(),
        };
        let id = self.add_element(Element::new(
            name,
            Some(target),
            Declaration::Annotation(Annotation {
                annotation_type,
                attributes,
            }),
        ));
        if let Some(element) = self.element_mut(target) {
            element.annotations.push(id);
        }
        id
    }

    fn push_member(&mut self, owner: ElementId, member: ElementId) {
        if let Some(Element {
            declaration: Declaration::Type(decl),
            ..
        }) = self.element_mut(owner)
        {
            decl.members.push(member);
        }
    }
}
