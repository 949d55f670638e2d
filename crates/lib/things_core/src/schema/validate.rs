use serde_json::{Map, Number, Value};

use super::{Bound, NumberRules, ObjectRule, ObjectSchema, Schema, SchemaKind, StringRules};
use crate::error::FieldError;

type Outcome = std::result::Result<Value, Vec<FieldError>>;

pub(super) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn fail(path: &str, message: impl Into<String>) -> Outcome {
    Err(vec![FieldError::new(path, message)])
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

pub(super) fn validate_node(schema: &Schema, value: &Value, path: &str) -> Outcome {
    match &schema.kind {
        SchemaKind::String(rules) => validate_string(rules, value, path),
        SchemaKind::Number(rules) => validate_number(rules, value, path),
        SchemaKind::Boolean => validate_boolean(value, path),
        SchemaKind::Array {
            items,
            min_items,
            max_items,
        } => validate_array(items, min_items.as_ref(), max_items.as_ref(), value, path),
        SchemaKind::Enum(options) => validate_enum(options, value, path),
        SchemaKind::Literal(expected) => {
            if value == expected {
                Ok(value.clone())
            } else {
                fail(path, format!("Invalid literal value, expected {expected}"))
            }
        }
        SchemaKind::Union(branches) => validate_union(branches, value, path),
        SchemaKind::TaggedUnion { tag, variants } => {
            validate_tagged_union(tag, variants, value, path)
        }
        SchemaKind::Object(object) => validate_object(object, value, path),
        SchemaKind::Any => Ok(value.clone()),
    }
}

fn validate_string(rules: &StringRules, value: &Value, path: &str) -> Outcome {
    let Value::String(s) = value else {
        return fail(
            path,
            format!("Expected string, received {}", type_name(value)),
        );
    };

    let len = s.chars().count();
    let mut errors = Vec::new();
    if let Some(Bound { limit, message }) = &rules.min_len {
        if len < *limit {
            errors.push(FieldError::new(path, message));
        }
    }
    if let Some(Bound { limit, message }) = &rules.max_len {
        if len > *limit {
            errors.push(FieldError::new(path, message));
        }
    }
    if let Some(pattern) = &rules.pattern {
        if !pattern.regex.is_match(s) {
            errors.push(FieldError::new(path, &pattern.message));
        }
    }

    if errors.is_empty() {
        Ok(value.clone())
    } else {
        Err(errors)
    }
}

/// Numbers arrive as JSON numbers or, from looser clients, numeric strings.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn validate_number(rules: &NumberRules, value: &Value, path: &str) -> Outcome {
    let Some(n) = coerce_number(value) else {
        return fail(
            path,
            format!("Expected number, received {}", type_name(value)),
        );
    };

    if rules.integer && n.fract() != 0.0 {
        return fail(path, "Expected integer, received float");
    }

    let mut errors = Vec::new();
    if let Some(Bound { limit, message }) = &rules.min {
        if n < *limit {
            errors.push(FieldError::new(path, message));
        }
    }
    if let Some(Bound { limit, message }) = &rules.max {
        if n > *limit {
            errors.push(FieldError::new(path, message));
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    match value {
        Value::Number(_) => Ok(value.clone()),
        _ if rules.integer => Ok(Value::Number(Number::from(n as i64))),
        _ => Number::from_f64(n)
            .map(Value::Number)
            .ok_or_else(|| vec![FieldError::new(path, "Expected number, received string")]),
    }
}

fn validate_boolean(value: &Value, path: &str) -> Outcome {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::String(s) if s == "true" => Ok(Value::Bool(true)),
        Value::String(s) if s == "false" => Ok(Value::Bool(false)),
        _ => fail(
            path,
            format!("Expected boolean, received {}", type_name(value)),
        ),
    }
}

fn validate_array(
    items: &Schema,
    min_items: Option<&Bound<usize>>,
    max_items: Option<&Bound<usize>>,
    value: &Value,
    path: &str,
) -> Outcome {
    let Value::Array(elements) = value else {
        return fail(
            path,
            format!("Expected array, received {}", type_name(value)),
        );
    };

    if let Some(bound) = min_items {
        if elements.len() < bound.limit {
            return fail(path, &bound.message);
        }
    }
    if let Some(bound) = max_items {
        if elements.len() > bound.limit {
            return fail(path, &bound.message);
        }
    }

    let mut out = Vec::with_capacity(elements.len());
    let mut errors = Vec::new();
    for (i, element) in elements.iter().enumerate() {
        match validate_node(items, element, &format!("{path}[{i}]")) {
            Ok(v) => out.push(v),
            Err(mut e) => errors.append(&mut e),
        }
    }

    if errors.is_empty() {
        Ok(Value::Array(out))
    } else {
        Err(errors)
    }
}

fn validate_enum(options: &[String], value: &Value, path: &str) -> Outcome {
    let expected = options
        .iter()
        .map(|o| format!("'{o}'"))
        .collect::<Vec<_>>()
        .join(" | ");

    match value {
        Value::String(s) if options.iter().any(|o| o == s) => Ok(value.clone()),
        Value::String(s) => fail(
            path,
            format!("Invalid enum value. Expected {expected}, received '{s}'"),
        ),
        _ => fail(
            path,
            format!("Expected {expected}, received {}", type_name(value)),
        ),
    }
}

fn validate_union(branches: &[Schema], value: &Value, path: &str) -> Outcome {
    let mut reasons = Vec::new();
    for branch in branches {
        match validate_node(branch, value, path) {
            Ok(v) => return Ok(v),
            Err(errors) => {
                if let Some(first) = errors.into_iter().next() {
                    reasons.push(first.message);
                }
            }
        }
    }
    fail(path, format!("Invalid input: {}", reasons.join("; or ")))
}

fn validate_tagged_union(
    tag: &str,
    variants: &[(String, Schema)],
    value: &Value,
    path: &str,
) -> Outcome {
    let Value::Object(map) = value else {
        return fail(
            path,
            format!("Expected object, received {}", type_name(value)),
        );
    };

    let expected = || {
        variants
            .iter()
            .map(|(name, _)| format!("'{name}'"))
            .collect::<Vec<_>>()
            .join(" | ")
    };
    let tag_path = child_path(path, tag);

    let Some(tag_value) = map.get(tag).and_then(Value::as_str) else {
        return fail(
            &tag_path,
            format!("Invalid discriminator value. Expected {}", expected()),
        );
    };

    match variants.iter().find(|(name, _)| name == tag_value) {
        Some((_, schema)) => validate_node(schema, value, path),
        None => fail(
            &tag_path,
            format!(
                "Invalid discriminator value. Expected {}, received '{tag_value}'",
                expected()
            ),
        ),
    }
}

/// Whether an object field counts as supplied for cross-field rules.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn validate_object(object: &ObjectSchema, value: &Value, path: &str) -> Outcome {
    let Value::Object(input) = value else {
        return fail(
            path,
            format!("Expected object, received {}", type_name(value)),
        );
    };

    let mut out = Map::new();
    let mut errors = Vec::new();

    for field in &object.fields {
        let field_path = child_path(path, &field.name);
        match input.get(&field.name).filter(|v| !v.is_null()) {
            Some(raw) => match validate_node(&field.schema, raw, &field_path) {
                Ok(v) => {
                    out.insert(field.name.clone(), v);
                }
                Err(mut e) => errors.append(&mut e),
            },
            None => {
                if let Some(default) = &field.default {
                    out.insert(field.name.clone(), default.clone());
                } else if field.required {
                    errors.push(FieldError::new(field_path, "Required"));
                }
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    for rule in &object.rules {
        match rule {
            ObjectRule::AtLeastOneOf { fields, message } => {
                if !fields.iter().any(|f| is_present(out.get(f))) {
                    errors.push(FieldError::new(path, message));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(Value::Object(out))
    } else {
        Err(errors)
    }
}
