use blockgraph::block::field::FieldValue;
use blockgraph::position::Position;
use blockgraph::variable::VariableId;

fn load(json: &str) -> blockgraph::Program {
    blockgraph::loader::from_json(json, 0).expect("load failed")
}

#[test]
fn loads_a_minimal_program() {
    let program = load(
        r#"{
        "variables": [{ "id": "v1", "name": "x" }],
        "chains": [{ "id": "b1", "kind": "variable_set", "fields": { "VAR": "v1" } }]
    }"#,
    );
    assert_eq!(program.variables.len(), 1);
    assert_eq!(program.chains.len(), 1);
    assert_eq!(program.chains[0].kind.as_str(), "variable_set");
}

#[test]
fn missing_maps_default_to_empty() {
    let program = load(r#"{ "chains": [{ "id": "b1", "kind": "number" }] }"#);
    let block = &program.chains[0];
    assert!(block.fields.is_empty());
    assert!(block.inputs.is_empty());
    assert!(block.next.is_none());
}

#[test]
fn unknown_kinds_load_fine() {
    // Which kinds are supported is the translator table's business, not the
    // model's.
    let program = load(r#"{ "chains": [{ "id": "b1", "kind": "teleport_home" }] }"#);
    assert_eq!(program.chains[0].kind.as_str(), "teleport_home");
}

#[test]
fn malformed_json_reports_a_spanned_error() {
    let source = "{ \"chains\": [ }";
    let error = blockgraph::loader::from_json(source, 7).expect_err("expected a load error");
    assert!(!error.message.is_empty());
    assert_eq!(error.file_id, 7);
    assert!(error.span.end <= source.len());
    assert!(error.span.start <= error.span.end);
}

#[test]
fn chain_iteration_follows_next_links() {
    let program = load(
        r#"{
        "chains": [{
            "id": "b1", "kind": "move_to",
            "next": { "id": "b2", "kind": "move_to", "next": { "id": "b3", "kind": "move_to" } }
        }]
    }"#,
    );
    let ids: Vec<&str> = program.chains[0]
        .iter_chain()
        .map(|b| b.id.as_str())
        .collect();
    assert_eq!(ids, vec!["b1", "b2", "b3"]);
}

#[test]
fn field_values_deserialize_untagged() {
    let program = load(
        r#"{
        "chains": [{
            "id": "b1", "kind": "number",
            "fields": { "NUM": 42, "VAR": "v1", "FLAG": true }
        }]
    }"#,
    );
    let block = &program.chains[0];
    assert_eq!(block.field("NUM"), Some(&FieldValue::Number(42.0)));
    assert_eq!(
        block.field("VAR"),
        Some(&FieldValue::Text("v1".to_string()))
    );
    assert_eq!(block.field("FLAG"), Some(&FieldValue::Boolean(true)));
    assert_eq!(block.field("VAR").and_then(FieldValue::as_text), Some("v1"));
    assert_eq!(block.field("NUM").and_then(FieldValue::as_text), None);
}

#[test]
fn text_fields_parse_as_numbers_leniently() {
    assert_eq!(FieldValue::Text(" 3.5 ".to_string()).as_number(), Some(3.5));
    assert_eq!(FieldValue::Text("sideways".to_string()).as_number(), None);
    assert_eq!(FieldValue::Boolean(true).as_number(), None);
}

#[test]
fn variable_table_resolves_by_id_only() {
    let program = load(
        r#"{
        "variables": [{ "id": "v1", "name": "count" }],
        "chains": []
    }"#,
    );
    let table = program.variable_table();
    assert_eq!(table.resolve(&VariableId::new("v1")), Some("count"));
    assert_eq!(table.resolve(&VariableId::new("count")), None);
}

#[test]
fn serialization_round_trips() {
    let program = load(
        r#"{
        "variables": [{ "id": "v1", "name": "x" }],
        "chains": [{
            "id": "b1", "kind": "variable_set", "fields": { "VAR": "v1" },
            "inputs": { "VALUE": { "id": "b2", "kind": "number", "fields": { "NUM": 7 } } }
        }]
    }"#,
    );
    let json = serde_json::to_string(&program).expect("serialize failed");
    let reloaded = blockgraph::loader::from_json(&json, 0).expect("reload failed");
    assert_eq!(reloaded.chains[0].id, program.chains[0].id);
    assert_eq!(
        reloaded.chains[0].input("VALUE").map(|b| b.id.clone()),
        program.chains[0].input("VALUE").map(|b| b.id.clone())
    );
}

#[test]
fn position_rounds_each_field_to_two_decimals() {
    let position = Position::parse("3.14159,2");
    assert_eq!(position.x, 3.14);
    assert_eq!(position.y, 2.0);
    assert_eq!(position.to_string(), "3.14,2.00");
}

#[test]
fn position_malformed_fields_become_nan() {
    let position = Position::parse("sideways,2");
    assert!(position.x.is_nan());
    assert_eq!(position.y, 2.0);
    assert!(!position.is_valid());

    let missing = Position::parse("5");
    assert_eq!(missing.x, 5.0);
    assert!(missing.y.is_nan());
    assert!(!missing.is_valid());

    assert!(Position::parse("3,4").is_valid());
}

#[test]
fn position_display_formats_fixed_width() {
    assert_eq!(Position::new(1.2345, 6.789).to_string(), "1.23,6.79");
    assert_eq!(Position::new(-0.5, 10.0).to_string(), "-0.50,10.00");
}
