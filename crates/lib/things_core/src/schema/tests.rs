use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;

use super::*;
use crate::error::ErrorKind;

fn todo_schema() -> Schema {
    Schema::object(vec![
        Field::required(
            "title",
            Schema::string()
                .min_len(1, "Title is required")
                .max_len(255, "Title too long"),
        ),
        Field::optional("notes", Schema::string().max_len(10, "Notes too long")),
        Field::optional(
            "tags",
            Schema::array(Schema::string().max_len(5, "Tag too long"))
                .max_items(2, "Too many tags"),
        ),
        Field::optional("max_results", Schema::integer().min(1.0, "too small").max(500.0, "too big")),
        Field::optional("completed", Schema::boolean()).with_default(false),
    ])
}

fn field_errors(err: ExecutionError) -> Vec<FieldError> {
    match err {
        ExecutionError::ValidationFailed(errors) => errors,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn defaults_applied_and_unknown_fields_dropped() {
    let args = todo_schema()
        .validate(&json!({ "title": "Buy milk", "colour": "blue" }))
        .unwrap();
    assert_eq!(
        args.into_value(),
        json!({ "title": "Buy milk", "completed": false })
    );
}

#[test]
fn null_arguments_are_treated_as_empty_object() {
    let err = todo_schema().validate(&Value::Null).unwrap_err();
    assert_eq!(
        field_errors(err),
        vec![FieldError::new("title", "Required")]
    );
}

#[test]
fn every_violation_is_collected_with_its_path() {
    let err = todo_schema()
        .validate(&json!({
            "title": "",
            "notes": "far too long for this",
            "tags": ["ok", "waytoolong"],
        }))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(
        field_errors(err),
        vec![
            FieldError::new("title", "Title is required"),
            FieldError::new("notes", "Notes too long"),
            FieldError::new("tags[1]", "Tag too long"),
        ]
    );
}

#[test]
fn array_length_limit_is_enforced() {
    let err = todo_schema()
        .validate(&json!({ "title": "x", "tags": ["a", "b", "c"] }))
        .unwrap_err();
    assert_eq!(field_errors(err), vec![FieldError::new("tags", "Too many tags")]);
}

#[test]
fn numeric_strings_and_boolean_strings_are_coerced() {
    let args = todo_schema()
        .validate(&json!({ "title": "x", "max_results": "25", "completed": "true" }))
        .unwrap();
    assert_eq!(args.get("max_results"), Some(&json!(25)));
    assert_eq!(args.get("completed"), Some(&json!(true)));
}

#[test]
fn integer_bounds_and_fractions_are_rejected() {
    let err = todo_schema()
        .validate(&json!({ "title": "x", "max_results": 501 }))
        .unwrap_err();
    assert_eq!(field_errors(err), vec![FieldError::new("max_results", "too big")]);

    let err = todo_schema()
        .validate(&json!({ "title": "x", "max_results": 2.5 }))
        .unwrap_err();
    assert_eq!(
        field_errors(err),
        vec![FieldError::new("max_results", "Expected integer, received float")]
    );
}

#[test]
fn wrong_types_report_received_type() {
    let err = todo_schema().validate(&json!({ "title": 42 })).unwrap_err();
    assert_eq!(
        field_errors(err),
        vec![FieldError::new("title", "Expected string, received number")]
    );
}

fn when_schema() -> Schema {
    Schema::union(vec![
        Schema::enumeration(["today", "tomorrow"]),
        Schema::string().pattern(r"^\d{4}-\d{2}-\d{2}$", "Invalid date format"),
    ])
}

#[test]
fn union_accepts_first_matching_branch() {
    let schema = Schema::object(vec![Field::optional("when", when_schema())]);
    assert!(schema.validate(&json!({ "when": "today" })).is_ok());
    assert!(schema.validate(&json!({ "when": "2025-06-03" })).is_ok());

    let err = schema.validate(&json!({ "when": "soon" })).unwrap_err();
    let errors = field_errors(err);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "when");
    assert!(errors[0].message.starts_with("Invalid input:"));
    assert!(errors[0].message.contains("Invalid date format"));
}

fn item_schema() -> Schema {
    Schema::tagged_union(
        "type",
        [
            (
                "todo",
                Schema::object(vec![
                    Field::required("type", Schema::literal("todo")),
                    Field::required("title", Schema::string().min_len(1, "Title is required")),
                ]),
            ),
            (
                "heading",
                Schema::object(vec![
                    Field::required("type", Schema::literal("heading")),
                    Field::required("title", Schema::string()),
                ]),
            ),
        ],
    )
}

#[test]
fn tagged_union_selects_variant_by_tag() {
    let schema = Schema::object(vec![Field::required("items", Schema::array(item_schema()))]);

    let args = schema
        .validate(&json!({ "items": [
            { "type": "heading", "title": "Phase 1", "extra": 1 },
            { "type": "todo", "title": "Plan" },
        ]}))
        .unwrap();
    assert_eq!(
        args.get("items"),
        Some(&json!([
            { "type": "heading", "title": "Phase 1" },
            { "type": "todo", "title": "Plan" },
        ]))
    );

    let err = schema
        .validate(&json!({ "items": [{ "type": "note", "title": "x" }] }))
        .unwrap_err();
    assert_eq!(
        field_errors(err),
        vec![FieldError::new(
            "items[0].type",
            "Invalid discriminator value. Expected 'todo' | 'heading', received 'note'"
        )]
    );
}

#[test]
fn at_least_one_of_rule_runs_after_fields() {
    let schema = Schema::object(vec![
        Field::optional("id", Schema::string()),
        Field::optional("query", Schema::string()),
    ])
    .at_least_one_of(["id", "query"], "Either id or query must be provided");

    assert!(schema.validate(&json!({ "query": "milk" })).is_ok());

    let err = schema.validate(&json!({ "id": "" })).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid parameters: Either id or query must be provided"
    );
}

#[test]
fn validated_args_parse_into_typed_struct() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Params {
        title: String,
        completed: bool,
        notes: Option<String>,
    }

    let params: Params = todo_schema()
        .validate(&json!({ "title": "Buy milk" }))
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(
        params,
        Params {
            title: "Buy milk".into(),
            completed: false,
            notes: None,
        }
    );
}

#[test]
fn describe_renders_object_properties_and_required() {
    let described = todo_schema().describe("Create a to-do").describe_json();
    assert_eq!(described["type"], "object");
    assert_eq!(described["description"], "Create a to-do");
    assert_eq!(described["required"], json!(["title"]));
    assert_eq!(
        described["properties"]["title"],
        json!({ "type": "string", "minLength": 1, "maxLength": 255 })
    );
    assert_eq!(described["properties"]["tags"]["maxItems"], 2);
    assert_eq!(described["properties"]["completed"]["default"], false);
    assert_eq!(described["properties"]["max_results"]["type"], "integer");
}

#[test]
fn describe_merges_enum_unions_of_one_type() {
    let schema = Schema::union(vec![
        Schema::enumeration(["inbox", "today"]),
        Schema::literal("logbook"),
    ]);
    assert_eq!(
        schema.describe_json(),
        json!({ "type": "string", "enum": ["inbox", "today", "logbook"] })
    );
}

#[test]
fn describe_collapses_same_type_unions_to_their_type() {
    let schema = when_schema().describe("When to schedule");
    assert_eq!(
        schema.describe_json(),
        json!({ "type": "string", "description": "When to schedule" })
    );
}

#[test]
fn describe_keeps_mixed_type_unions_as_any_of() {
    let schema = Schema::union(vec![
        Schema::enumeration(["all"]),
        Schema::integer().min(1.0, "too small"),
    ]);
    let described = schema.describe_json();
    let any_of = described["anyOf"].as_array().unwrap();
    assert_eq!(any_of.len(), 2);
    assert_eq!(any_of[0]["enum"], json!(["all"]));
    assert_eq!(any_of[1]["type"], "integer");
    assert!(described.get("type").is_none());
}

#[test]
fn describe_falls_back_to_string_for_any() {
    assert_eq!(Schema::any().describe_json(), json!({ "type": "string" }));
}

#[test]
fn describe_is_stable() {
    let schema = Schema::object(vec![Field::required("items", Schema::array(item_schema()))]);
    assert_eq!(schema.describe_json(), schema.describe_json());
}
