//! Tests for the element pair dispatcher

use api_sign::compat::dispatch::{visit_pair, visit_single, ElementPairVisitor, Node};
use api_sign::model::{
    Annotation, Declaration, Element, ElementId, ElementKind, ElementRef, ExecutableDeclaration, PrimitiveKind,
    TypeDeclaration, TypeParameterDeclaration, Universe, VariableDeclaration,
};

/// One element of every kind, indexed like `ElementKind::ALL`
fn one_of_each() -> (Universe, Vec<ElementId>) {
    let mut universe = Universe::new();
    let package = universe.package("com.acme");
    let class = universe.class(package, "Widget");
    let int = universe.primitive(PrimitiveKind::Int);
    let field = universe.field(class, "size", int);
    let method = universe.method(class, "size", int, &[]);
    let type_parameter = universe.type_parameter(class, "T", &[]);
    let deprecated = universe.declared("java.lang.Deprecated", &[]);
    let annotation = universe.annotate(class, deprecated, Vec::new());
    let unknown = universe.add_element(Element::new("module-info", None, Declaration::Unknown));

    let ids = vec![package, class, field, method, type_parameter, annotation, unknown];
    for (id, kind) in ids.iter().zip(ElementKind::ALL) {
        assert_eq!(universe.element(*id).kind(), kind);
    }
    (universe, ids)
}

/// Reports which arm fired
struct ArmRecorder;

impl<'u> ElementPairVisitor<'u> for ArmRecorder {
    type Output = &'static str;

    fn unmatched(&mut self, _element: ElementRef<'u>, _other: Option<ElementRef<'u>>) -> Self::Output {
        "unmatched"
    }

    fn visit_package(&mut self, _element: ElementRef<'u>, _other: ElementRef<'u>) -> Self::Output {
        "package"
    }

    fn visit_type(&mut self, _element: Node<'u, TypeDeclaration>, _other: Node<'u, TypeDeclaration>) -> Self::Output {
        "type"
    }

    fn visit_variable(
        &mut self,
        _element: Node<'u, VariableDeclaration>,
        _other: Node<'u, VariableDeclaration>,
    ) -> Self::Output {
        "variable"
    }

    fn visit_executable(
        &mut self,
        _element: Node<'u, ExecutableDeclaration>,
        _other: Node<'u, ExecutableDeclaration>,
    ) -> Self::Output {
        "executable"
    }

    fn visit_type_parameter(
        &mut self,
        _element: Node<'u, TypeParameterDeclaration>,
        _other: Node<'u, TypeParameterDeclaration>,
    ) -> Self::Output {
        "type_parameter"
    }

    fn visit_annotation(&mut self, _element: Node<'u, Annotation>, _other: Node<'u, Annotation>) -> Self::Output {
        "annotation"
    }
}

/// Overrides nothing but the required arm
struct UnmatchedOnly;

impl<'u> ElementPairVisitor<'u> for UnmatchedOnly {
    type Output = (ElementId, Option<ElementId>);

    fn unmatched(&mut self, element: ElementRef<'u>, other: Option<ElementRef<'u>>) -> Self::Output {
        (element.id(), other.map(|o| o.id()))
    }
}

#[test]
fn test_every_kind_pair_has_exactly_one_outcome() {
    let (universe, ids) = one_of_each();
    let mut visitor = ArmRecorder;

    for (a, kind_a) in ids.iter().zip(ElementKind::ALL) {
        for (b, kind_b) in ids.iter().zip(ElementKind::ALL) {
            let arm = visit_pair(&mut visitor, universe.element_ref(*a), Some(universe.element_ref(*b)));
            let expected = if kind_a == kind_b && kind_a != ElementKind::Unknown {
                kind_a.as_str()
            } else {
                "unmatched"
            };
            assert_eq!(arm, expected, "{kind_a} vs {kind_b}");
        }
    }
}

#[test]
fn test_missing_counterpart_is_unmatched() {
    let (universe, ids) = one_of_each();
    let mut visitor = ArmRecorder;

    for id in &ids {
        assert_eq!(visit_pair(&mut visitor, universe.element_ref(*id), None), "unmatched");
        assert_eq!(visit_single(&mut visitor, universe.element_ref(*id)), "unmatched");
    }
}

#[test]
fn test_default_arms_delegate_to_unmatched() {
    let (universe, ids) = one_of_each();
    let mut visitor = UnmatchedOnly;

    for a in &ids {
        for b in &ids {
            let outcome = visit_pair(&mut visitor, universe.element_ref(*a), Some(universe.element_ref(*b)));
            assert_eq!(outcome, (*a, Some(*b)));
        }
    }
}

#[test]
fn test_pairs_across_universes() {
    let (old, old_ids) = one_of_each();
    let (new, new_ids) = one_of_each();
    let mut visitor = ArmRecorder;

    let arm = visit_pair(&mut visitor, old.element_ref(old_ids[3]), Some(new.element_ref(new_ids[3])));
    assert_eq!(arm, "executable");
}

#[test]
fn test_typed_arm_sees_narrowed_declaration() {
    struct FieldTypes;

    impl<'u> ElementPairVisitor<'u> for FieldTypes {
        type Output = Option<(String, String)>;

        fn unmatched(&mut self, _element: ElementRef<'u>, _other: Option<ElementRef<'u>>) -> Self::Output {
            None
        }

        fn visit_variable(
            &mut self,
            element: Node<'u, VariableDeclaration>,
            other: Node<'u, VariableDeclaration>,
        ) -> Self::Output {
            Some((
                element.element.type_ref(element.decl.ty).to_string(),
                other.element.type_ref(other.decl.ty).to_string(),
            ))
        }
    }

    let mut old = Universe::new();
    let package = old.package("com.acme");
    let class = old.class(package, "Widget");
    let int = old.primitive(PrimitiveKind::Int);
    let old_field = old.field(class, "size", int);

    let mut new = Universe::new();
    let package = new.package("com.acme");
    let class = new.class(package, "Widget");
    let long = new.primitive(PrimitiveKind::Long);
    let new_field = new.field(class, "size", long);

    let outcome = visit_pair(&mut FieldTypes, old.element_ref(old_field), Some(new.element_ref(new_field)));
    assert_eq!(outcome, Some(("int".to_string(), "long".to_string())));
}
