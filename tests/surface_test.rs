//! End-to-end tests over comparison files

use api_sign::compat::{CheckConfig, CheckEngine};
use api_sign::model::{PrimitiveKind, Universe};
use api_sign::surface::{ApiSurface, Comparison, Compatibility, ElementPair};
use api_sign::{ElementId, Error};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn engine() -> CheckEngine {
    CheckEngine::new(&CheckConfig::default()).unwrap()
}

#[test]
fn test_breaking_changes_are_red() {
    let comparison = Comparison::from_file(fixture("widget_comparison.json")).unwrap();
    let (compatibility, report) = comparison.compare_with(&engine());

    assert_eq!(compatibility, Compatibility::Red);
    assert!(report.has_breaking_changes);

    let codes: Vec<&str> = report.differences.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(
        codes,
        vec![
            "java.field.typeChanged",
            "java.method.parameterTypeChanged",
            "java.annotation.attributeValueChanged",
        ]
    );
    assert_eq!(
        report.differences[1].description,
        "The type of the parameter changed from 'java.lang.String' to 'int': void com.acme.Widget::put(===int===)"
    );
    assert_eq!(report.summary.get("java.field.typeChanged"), Some(&1));
    assert_eq!(report.executed_checks.len(), engine().get_check_count());
    assert!(report.failed_checks.is_empty());
}

#[test]
fn test_ignored_breaking_codes_leave_yellow() {
    let comparison = Comparison::from_file(fixture("widget_comparison.json")).unwrap();
    let config = CheckConfig {
        ignore_codes: vec![
            "java.field.typeChanged".to_string(),
            "java.method.parameterTypeChanged".to_string(),
        ],
        ..CheckConfig::default()
    };
    let engine = CheckEngine::new(&config).unwrap();

    let (compatibility, report) = comparison.compare_with(&engine);

    assert_eq!(compatibility, Compatibility::Yellow);
    assert_eq!(report.differences.len(), 1);
    assert_eq!(report.differences[0].code, "java.annotation.attributeValueChanged");
    assert!(!report.has_breaking_changes);
}

#[test]
fn test_comparing_a_universe_with_itself_is_green() {
    let comparison = Comparison::from_file(fixture("widget_comparison.json")).unwrap();
    let same = Comparison {
        old: comparison.old.clone(),
        new: comparison.old,
        pairs: comparison.pairs,
    };

    let (compatibility, report) = same.compare_with(&engine());
    assert_eq!(compatibility, Compatibility::Green);
    assert!(report.differences.is_empty());
}

#[test]
fn test_unmatched_pairs_are_accepted() {
    let comparison = Comparison::from_file(fixture("widget_comparison.json")).unwrap();
    let removed = Comparison {
        old: comparison.old,
        new: comparison.new,
        pairs: vec![ElementPair {
            old: ElementId(2),
            new: None,
        }],
    };

    let (compatibility, report) = removed.compare_with(&engine());
    assert_eq!(compatibility, Compatibility::Green);
    assert_eq!(report.executed_checks.len(), engine().get_check_count());
}

#[test]
fn test_pair_referring_to_missing_element_is_malformed() {
    let content = std::fs::read_to_string(fixture("widget_comparison.json")).unwrap();
    let mut json: serde_json::Value = serde_json::from_str(&content).unwrap();
    json["pairs"] = serde_json::json!([{ "old": 1, "new": 42 }]);

    match Comparison::from_json_str(&json.to_string()) {
        Err(Error::Malformed(message)) => assert!(message.contains("#42"), "{message}"),
        other => panic!("expected a malformed comparison, got {other:?}"),
    }
}

#[test]
fn test_dangling_type_reference_is_malformed() {
    let result = ApiSurface::try_from_json(
        r#"{
            "types": [],
            "elements": [
                { "name": "com.acme", "declaration": "package" },
                { "name": "size", "enclosing": 0, "declaration": { "variable": { "type": 3 } } }
            ]
        }"#,
    );
    assert!(matches!(result, Err(Error::Malformed(_))));
}

#[test]
fn test_type_listing_itself_as_type_parameter_is_malformed() {
    let result = ApiSurface::try_from_json(
        r#"{
            "elements": [
                { "name": "com.acme", "declaration": "package" },
                {
                    "name": "Widget",
                    "enclosing": 0,
                    "declaration": { "type": { "kind": "class", "type_parameters": [1] } }
                }
            ]
        }"#,
    );
    match result {
        Err(Error::Malformed(message)) => assert!(message.contains("as a type parameter"), "{message}"),
        other => panic!("expected a malformed surface, got {other:?}"),
    }
}

#[test]
fn test_method_parameter_must_be_its_own_variable() {
    let method = |parameter: usize| {
        format!(
            r#"{{
                "types": [{{ "no_type": "void" }}, {{ "primitive": "int" }}],
                "elements": [
                    {{ "name": "com.acme", "declaration": "package" }},
                    {{ "name": "Widget", "enclosing": 0, "declaration": {{ "type": {{ "kind": "class", "members": [2, 3] }} }} }},
                    {{ "name": "put", "enclosing": 1, "declaration": {{ "executable": {{ "return_type": 0, "parameters": [{parameter}] }} }} }},
                    {{ "name": "size", "enclosing": 1, "declaration": {{ "variable": {{ "type": 1 }} }} }}
                ]
            }}"#
        )
    };

    // The method itself, and a field of the enclosing class
    for parameter in [2, 3] {
        match ApiSurface::try_from_json(&method(parameter)) {
            Err(Error::Malformed(message)) => assert!(message.contains("as a parameter"), "{message}"),
            other => panic!("expected a malformed surface for #{parameter}, got {other:?}"),
        }
    }
}

#[test]
fn test_report_serializes_to_json() {
    let comparison = Comparison::from_file(fixture("widget_comparison.json")).unwrap();
    let report = comparison.check(&engine());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["has_breaking_changes"], true);
    assert_eq!(json["differences"][0]["code"], "java.field.typeChanged");
    assert_eq!(json["differences"][0]["classification"]["BINARY"], "BREAKING");
    assert_eq!(json["differences"][0]["attachments"][0]["kind"], "element");
    assert_eq!(json["differences"][0]["attachments"][0]["rendered"], "com.acme.Widget.size");
}

#[test]
fn test_surface_fingerprint_survives_json_round_trip() {
    let mut universe = Universe::new();
    let package = universe.package("com.acme");
    let class = universe.class(package, "Widget");
    let int = universe.primitive(PrimitiveKind::Int);
    universe.field(class, "size", int);

    let json = universe.to_json_string().unwrap();
    let original = ApiSurface::from_universe(universe);
    let reloaded = ApiSurface::try_from_json(&json).unwrap();

    assert!(original.is_identical_to(&reloaded));
    assert_eq!(original.fingerprint.len(), 64);
}

#[test]
fn test_changed_surfaces_differ() {
    let comparison = Comparison::from_file(fixture("widget_comparison.json")).unwrap();
    let old = ApiSurface::from_universe(comparison.old);
    let new = ApiSurface::from_universe(comparison.new);
    assert!(!old.is_identical_to(&new));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Comparison::from_file(dir.path().join("missing.json"));
    assert!(matches!(result, Err(Error::Io(_))));
}
