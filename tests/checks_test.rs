//! Tests for the class, field, method and generics checks

use api_sign::compat::registry::find_check;
use api_sign::compat::messages::Locale;
use api_sign::compat::{CheckContext, CheckOutcome, Difference};
use api_sign::model::{AnnotationValue, Declaration, ElementId, Literal, PrimitiveKind, TypeKind, Universe};

/// Builds `com.acme.Widget` and lets `f` add to it. Returns the universe and
/// the element `f` hands back as the subject under test.
fn widget(kind: TypeKind, f: impl FnOnce(&mut Universe, ElementId) -> ElementId) -> (Universe, ElementId) {
    let mut universe = Universe::new();
    let package = universe.package("com.acme");
    let class = universe.type_element(package, "Widget", kind);
    let subject = f(&mut universe, class);
    (universe, subject)
}

fn class(f: impl FnOnce(&mut Universe, ElementId) -> ElementId) -> (Universe, ElementId) {
    widget(TypeKind::Class, f)
}

fn run<'u>(check: &str, old: (&'u Universe, ElementId), new: (&'u Universe, ElementId)) -> CheckOutcome<'u> {
    let ctx = CheckContext::for_locale(&Locale::default()).unwrap();
    let descriptor = find_check(check).unwrap();
    (descriptor.run)(&ctx, old.0.element_ref(old.1), Some(new.0.element_ref(new.1)))
}

fn differences<'u>(check: &str, old: (&'u Universe, ElementId), new: (&'u Universe, ElementId)) -> Vec<Difference<'u>> {
    run(check, old, new).unwrap().unwrap_or_default()
}

fn codes(differences: &[Difference<'_>]) -> Vec<String> {
    differences.iter().map(|d| d.code.clone()).collect()
}

fn set_constant(universe: &mut Universe, field: ElementId, value: Option<Literal>) {
    if let Some(Declaration::Variable(decl)) = universe.element_mut(field).map(|e| &mut e.declaration) {
        decl.constant_value = value;
    }
}

fn set_default(universe: &mut Universe, method: ElementId, value: Option<AnnotationValue>) {
    if let Some(Declaration::Executable(decl)) = universe.element_mut(method).map(|e| &mut e.declaration) {
        decl.default_value = value;
    }
}

//==============================================================================
// CLASS
//==============================================================================

#[test]
fn test_class_kind_changed() {
    let (old, old_class) = widget(TypeKind::Class, |_, class| class);
    let (new, new_class) = widget(TypeKind::Interface, |_, class| class);

    let found = differences("CLASS_KIND", (&old, old_class), (&new, new_class));
    assert_eq!(codes(&found), vec!["java.class.kindChanged"]);
    assert_eq!(found[0].description, "The type changed from 'class' to 'interface'.");

    let (same, same_class) = widget(TypeKind::Class, |_, class| class);
    assert!(run("CLASS_KIND", (&old, old_class), (&same, same_class)).unwrap().is_none());
}

#[test]
fn test_superclass_removed_from_chain() {
    let (old, old_class) = class(|u, class| {
        let package = u.package("com.acme.base");
        u.class(package, "Base");
        let base = u.declared("com.acme.base.Base", &[]);
        u.set_supertypes(class, Some(base), &[]);
        class
    });
    let (new, new_class) = class(|u, class| {
        let object = u.declared("java.lang.Object", &[]);
        u.set_supertypes(class, Some(object), &[]);
        class
    });

    let found = differences("CLASS_INHERITANCE", (&old, old_class), (&new, new_class));
    assert_eq!(codes(&found), vec!["java.class.noLongerInheritsFromClass"]);
    assert_eq!(found[0].description, "The type no longer inherits from 'com.acme.base.Base'.");
    assert_eq!(found[0].attachments[2].render(), "com.acme.base.Base");
}

#[test]
fn test_object_superclass_is_not_reported() {
    let (old, old_class) = class(|u, class| {
        let object = u.declared("java.lang.Object", &[]);
        u.set_supertypes(class, Some(object), &[]);
        class
    });
    let (new, new_class) = class(|_, class| class);

    assert!(run("CLASS_INHERITANCE", (&old, old_class), (&new, new_class)).unwrap().is_none());
}

#[test]
fn test_interfaces_added_and_removed() {
    let (old, old_class) = class(|u, class| {
        let serializable = u.declared("java.io.Serializable", &[]);
        let closeable = u.declared("java.io.Closeable", &[]);
        u.set_supertypes(class, None, &[serializable, closeable]);
        class
    });
    let (new, new_class) = class(|u, class| {
        let closeable = u.declared("java.io.Closeable", &[]);
        let runnable = u.declared("java.lang.Runnable", &[]);
        u.set_supertypes(class, None, &[closeable, runnable]);
        class
    });

    let found = differences("CLASS_INTERFACES", (&old, old_class), (&new, new_class));
    assert_eq!(
        codes(&found),
        vec!["java.class.noLongerImplementsInterface", "java.class.nowImplementsInterface"]
    );
    assert_eq!(found[0].description, "The type no longer implements 'java.io.Serializable'.");
    assert_eq!(found[1].description, "The type now implements 'java.lang.Runnable'.");
}

#[test]
fn test_interface_inherited_through_superclass_still_counts() {
    let (old, old_class) = class(|u, class| {
        let package = u.package("com.acme.base");
        let base_class = u.class(package, "Base");
        let serializable = u.declared("java.io.Serializable", &[]);
        u.set_supertypes(base_class, None, &[serializable]);
        let base = u.declared("com.acme.base.Base", &[]);
        u.set_supertypes(class, Some(base), &[]);
        class
    });
    let (new, new_class) = class(|u, class| {
        let serializable = u.declared("java.io.Serializable", &[]);
        u.set_supertypes(class, None, &[serializable]);
        class
    });

    assert!(run("CLASS_INTERFACES", (&old, old_class), (&new, new_class)).unwrap().is_none());
    assert_eq!(
        codes(&differences("CLASS_INHERITANCE", (&old, old_class), (&new, new_class))),
        vec!["java.class.noLongerInheritsFromClass"]
    );
}

//==============================================================================
// FIELD
//==============================================================================

#[test]
fn test_field_type_changed() {
    let (old, old_field) = class(|u, class| {
        let int = u.primitive(PrimitiveKind::Int);
        u.field(class, "size", int)
    });
    let (new, new_field) = class(|u, class| {
        let long = u.primitive(PrimitiveKind::Long);
        u.field(class, "size", long)
    });

    let found = differences("FIELD_TYPE", (&old, old_field), (&new, new_field));
    assert_eq!(codes(&found), vec!["java.field.typeChanged"]);
    assert_eq!(found[0].description, "The type of the field changed from 'int' to 'long'.");
    assert_eq!(found[0].attachments[0].render(), "com.acme.Widget.size");
}

#[test]
fn test_field_type_check_skips_method_parameters() {
    fn first_parameter(universe: &Universe, method: ElementId) -> ElementId {
        match &universe.element(method).declaration {
            Declaration::Executable(decl) => decl.parameters[0],
            _ => panic!("not an executable"),
        }
    }

    let (old, old_method) = class(|u, class| {
        let void = u.void();
        let int = u.primitive(PrimitiveKind::Int);
        u.method(class, "resize", void, &[int])
    });
    let (new, new_method) = class(|u, class| {
        let void = u.void();
        let long = u.primitive(PrimitiveKind::Long);
        u.method(class, "resize", void, &[long])
    });

    let old_param = first_parameter(&old, old_method);
    let new_param = first_parameter(&new, new_method);
    assert!(run("FIELD_TYPE", (&old, old_param), (&new, new_param)).unwrap().is_none());
}

#[test]
fn test_field_constant_value_transitions() {
    fn constant(value: Option<Literal>) -> (Universe, ElementId) {
        class(|u, class| {
            let int = u.primitive(PrimitiveKind::Int);
            let field = u.field(class, "LIMIT", int);
            set_constant(u, field, value);
            field
        })
    }

    let (five, five_field) = constant(Some(Literal::Int(5)));
    let (six, six_field) = constant(Some(Literal::Int(6)));
    let (none, none_field) = constant(None);
    let (also_five, also_five_field) = constant(Some(Literal::Int(5)));

    let changed = differences("FIELD_CONSTANT", (&five, five_field), (&six, six_field));
    assert_eq!(codes(&changed), vec!["java.field.constantValueChanged"]);
    assert!(changed[0].description.starts_with("The constant value changed from '5' to '6'."));

    let now = differences("FIELD_CONSTANT", (&none, none_field), (&six, six_field));
    assert_eq!(codes(&now), vec!["java.field.nowConstant"]);
    assert_eq!(now[0].description, "The field is now a constant with value '6'.");

    let no_longer = differences("FIELD_CONSTANT", (&five, five_field), (&none, none_field));
    assert_eq!(codes(&no_longer), vec!["java.field.noLongerConstant"]);

    assert!(run("FIELD_CONSTANT", (&five, five_field), (&also_five, also_five_field)).unwrap().is_none());
    assert!(run("FIELD_CONSTANT", (&none, none_field), (&none, none_field)).unwrap().is_none());
}

//==============================================================================
// METHOD
//==============================================================================

#[test]
fn test_return_type_changed() {
    let (old, old_method) = class(|u, class| {
        let string = u.declared("java.lang.String", &[]);
        u.method(class, "name", string, &[])
    });
    let (new, new_method) = class(|u, class| {
        let object = u.declared("java.lang.Object", &[]);
        u.method(class, "name", object, &[])
    });

    let found = differences("METHOD_RETURN_TYPE", (&old, old_method), (&new, new_method));
    assert_eq!(codes(&found), vec!["java.method.returnTypeChanged"]);
    assert_eq!(
        found[0].description,
        "The return type changed from 'java.lang.String' to 'java.lang.Object'."
    );
}

#[test]
fn test_return_type_arguments_changed() {
    let (old, old_method) = class(|u, class| {
        let string = u.declared("java.lang.String", &[]);
        let list = u.declared("java.util.List", &[string]);
        u.method(class, "names", list, &[])
    });
    let (new, new_method) = class(|u, class| {
        let integer = u.declared("java.lang.Integer", &[]);
        let list = u.declared("java.util.List", &[integer]);
        u.method(class, "names", list, &[])
    });

    let found = differences("METHOD_RETURN_TYPE", (&old, old_method), (&new, new_method));
    assert_eq!(codes(&found), vec!["java.method.returnTypeTypeParametersChanged"]);
    assert_eq!(
        found[0].description,
        "The type parameters of the return type changed from 'java.util.List<java.lang.String>' to 'java.util.List<java.lang.Integer>'."
    );
}

#[test]
fn test_parameter_type_changed_marks_the_parameter() {
    let (old, old_method) = class(|u, class| {
        let void = u.void();
        let string = u.declared("java.lang.String", &[]);
        let int = u.primitive(PrimitiveKind::Int);
        u.method(class, "put", void, &[int, string])
    });
    let (new, new_method) = class(|u, class| {
        let void = u.void();
        let int = u.primitive(PrimitiveKind::Int);
        u.method(class, "put", void, &[int, int])
    });

    let found = differences("METHOD_PARAMETERS", (&old, old_method), (&new, new_method));
    assert_eq!(codes(&found), vec!["java.method.parameterTypeChanged"]);
    assert_eq!(
        found[0].description,
        "The type of the parameter changed from 'java.lang.String' to 'int': void com.acme.Widget::put(int, ===int===)"
    );
}

#[test]
fn test_number_of_parameters_changed() {
    let (old, old_method) = class(|u, class| {
        let void = u.void();
        let int = u.primitive(PrimitiveKind::Int);
        u.method(class, "put", void, &[int])
    });
    let (new, new_method) = class(|u, class| {
        let void = u.void();
        let int = u.primitive(PrimitiveKind::Int);
        u.method(class, "put", void, &[int, int])
    });

    let found = differences("METHOD_PARAMETERS", (&old, old_method), (&new, new_method));
    assert_eq!(codes(&found), vec!["java.method.numberOfParametersChanged"]);
    assert_eq!(
        found[0].description,
        "The number of parameters changed: 'void com.acme.Widget::put(int)' became 'void com.acme.Widget::put(int, int)'."
    );
}

#[test]
fn test_thrown_exceptions_are_classified_as_checked_or_runtime() {
    let (old, old_method) = class(|u, class| {
        let void = u.void();
        let io = u.declared("java.io.IOException", &[]);
        let method = u.method(class, "close", void, &[]);
        u.set_thrown(method, &[io]);
        method
    });
    let (new, new_method) = class(|u, class| {
        let package = u.package("com.acme.errors");
        let oops = u.class(package, "Oops");
        let runtime = u.declared("java.lang.RuntimeException", &[]);
        u.set_supertypes(oops, Some(runtime), &[]);

        let void = u.void();
        let thrown = u.declared("com.acme.errors.Oops", &[]);
        let method = u.method(class, "close", void, &[]);
        u.set_thrown(method, &[thrown]);
        method
    });

    let found = differences("METHOD_EXCEPTIONS", (&old, old_method), (&new, new_method));
    assert_eq!(
        codes(&found),
        vec!["java.method.exception.checkedRemoved", "java.method.exception.runtimeAdded"]
    );
    assert_eq!(
        found[0].description,
        "The method no longer throws the checked exception 'java.io.IOException'."
    );
}

#[test]
fn test_annotation_attribute_default_value() {
    fn attribute(default: Option<AnnotationValue>) -> (Universe, ElementId) {
        widget(TypeKind::Annotation, |u, class| {
            let int = u.primitive(PrimitiveKind::Int);
            let method = u.method(class, "max", int, &[]);
            set_default(u, method, default);
            method
        })
    }
    let int = |v| Some(AnnotationValue::Literal(Literal::Int(v)));

    let (one, one_method) = attribute(int(1));
    let (two, two_method) = attribute(int(2));
    let (none, none_method) = attribute(None);

    let changed = differences("METHOD_DEFAULT_VALUE", (&one, one_method), (&two, two_method));
    assert_eq!(codes(&changed), vec!["java.method.defaultValueChanged"]);
    assert_eq!(
        changed[0].description,
        "The default value of the annotation attribute changed from '1' to '2'."
    );
    // The values stay borrowed from the universes after the check returns
    assert_eq!(changed[0].attachments.len(), 4);
    assert_eq!(changed[0].attachments[2].kind(), "value");
    assert_eq!(changed[0].attachments[2].render(), "1");
    assert_eq!(changed[0].attachments[3].render(), "2");

    let added = differences("METHOD_DEFAULT_VALUE", (&none, none_method), (&one, one_method));
    assert_eq!(codes(&added), vec!["java.method.defaultValueAdded"]);

    let removed = differences("METHOD_DEFAULT_VALUE", (&two, two_method), (&none, none_method));
    assert_eq!(codes(&removed), vec!["java.method.defaultValueRemoved"]);

    assert!(run("METHOD_DEFAULT_VALUE", (&one, one_method), (&one, one_method)).unwrap().is_none());
}

//==============================================================================
// GENERICS
//==============================================================================

#[test]
fn test_element_now_parameterized() {
    let (old, old_class) = class(|_, class| class);
    let (new, new_class) = class(|u, class| {
        let object = u.declared("java.lang.Object", &[]);
        u.type_parameter(class, "T", &[object]);
        class
    });

    let found = differences("GENERICS_FORMAL_TYPE_PARAMETERS", (&old, old_class), (&new, new_class));
    assert_eq!(codes(&found), vec!["java.generics.elementNowParameterized"]);
    assert_eq!(found[0].description, "The element is now generic: 'com.acme.Widget<T>'.");
}

#[test]
fn test_type_parameter_bound_changed() {
    fn bounded(bound: &str) -> (Universe, ElementId) {
        class(|u, class| {
            let bound = u.declared(bound, &[]);
            u.type_parameter(class, "T", &[bound]);
            class
        })
    }
    let (old, old_class) = bounded("java.lang.Number");
    let (new, new_class) = bounded("java.lang.Integer");

    let found = differences("GENERICS_FORMAL_TYPE_PARAMETERS", (&old, old_class), (&new, new_class));
    assert_eq!(codes(&found), vec!["java.generics.formalTypeParameterChanged"]);
    assert_eq!(
        found[0].description,
        "Type parameter changed from 'T extends java.lang.Number' to 'T extends java.lang.Integer'."
    );
}

#[test]
fn test_renamed_type_parameter_is_not_a_change() {
    let (old, old_class) = class(|u, class| {
        let object = u.declared("java.lang.Object", &[]);
        u.type_parameter(class, "T", &[object]);
        class
    });
    let (new, new_class) = class(|u, class| {
        u.type_parameter(class, "E", &[]);
        class
    });

    assert!(
        run("GENERICS_FORMAL_TYPE_PARAMETERS", (&old, old_class), (&new, new_class))
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_type_parameter_removed_and_added() {
    fn with_parameters(names: &[&str]) -> (Universe, ElementId) {
        class(|u, class| {
            for name in names {
                u.type_parameter(class, name, &[]);
            }
            class
        })
    }
    let (two, two_class) = with_parameters(&["K", "V"]);
    let (one, one_class) = with_parameters(&["K"]);

    let removed = differences("GENERICS_FORMAL_TYPE_PARAMETERS", (&two, two_class), (&one, one_class));
    assert_eq!(codes(&removed), vec!["java.generics.formalTypeParameterRemoved"]);
    assert_eq!(removed[0].description, "Type parameter 'V' has been removed.");

    let added = differences("GENERICS_FORMAL_TYPE_PARAMETERS", (&one, one_class), (&two, two_class));
    assert_eq!(codes(&added), vec!["java.generics.formalTypeParameterAdded"]);
}

#[test]
fn test_method_type_parameters() {
    fn generic(bound: Option<&str>) -> (Universe, ElementId) {
        class(|u, class| {
            let void = u.void();
            let method = u.method(class, "sort", void, &[]);
            if let Some(bound) = bound {
                let bound = u.declared(bound, &[]);
                u.type_parameter(method, "T", &[bound]);
            }
            method
        })
    }
    let (plain, plain_method) = generic(None);
    let (bounded, bounded_method) = generic(Some("java.lang.Comparable"));

    let found = differences("GENERICS_FORMAL_TYPE_PARAMETERS", (&plain, plain_method), (&bounded, bounded_method));
    assert_eq!(codes(&found), vec!["java.generics.elementNowParameterized"]);
    assert_eq!(
        found[0].description,
        "The element is now generic: '<T extends java.lang.Comparable> void com.acme.Widget::sort()'."
    );
}
