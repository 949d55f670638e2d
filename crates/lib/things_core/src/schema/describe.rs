use serde_json::{Map, Value, json};

use super::{Schema, SchemaKind};

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(super) fn describe_node(schema: &Schema) -> Value {
    let mut out = match &schema.kind {
        SchemaKind::String(rules) => {
            let mut m = Map::new();
            m.insert("type".into(), json!("string"));
            if let Some(b) = &rules.min_len {
                m.insert("minLength".into(), json!(b.limit));
            }
            if let Some(b) = &rules.max_len {
                m.insert("maxLength".into(), json!(b.limit));
            }
            if let Some(p) = &rules.pattern {
                m.insert("pattern".into(), json!(p.regex.as_str()));
            }
            m
        }
        SchemaKind::Number(rules) => {
            let mut m = Map::new();
            let ty = if rules.integer { "integer" } else { "number" };
            m.insert("type".into(), json!(ty));
            if let Some(b) = &rules.min {
                m.insert("minimum".into(), json!(b.limit));
            }
            if let Some(b) = &rules.max {
                m.insert("maximum".into(), json!(b.limit));
            }
            m
        }
        SchemaKind::Boolean => object(json!({ "type": "boolean" })),
        SchemaKind::Array {
            items,
            min_items,
            max_items,
        } => {
            let mut m = Map::new();
            m.insert("type".into(), json!("array"));
            m.insert("items".into(), describe_node(items));
            if let Some(b) = min_items {
                m.insert("minItems".into(), json!(b.limit));
            }
            if let Some(b) = max_items {
                m.insert("maxItems".into(), json!(b.limit));
            }
            m
        }
        SchemaKind::Enum(options) => object(json!({ "type": "string", "enum": options })),
        SchemaKind::Literal(value) => object(json!({ "type": json_type(value), "enum": [value] })),
        SchemaKind::Union(branches) => describe_union(branches),
        SchemaKind::TaggedUnion { variants, .. } => {
            let any_of: Vec<Value> = variants.iter().map(|(_, s)| describe_node(s)).collect();
            object(json!({ "anyOf": any_of }))
        }
        SchemaKind::Object(obj) => {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for field in &obj.fields {
                let mut described = describe_node(&field.schema);
                if let (Some(default), Value::Object(m)) = (&field.default, &mut described) {
                    m.insert("default".into(), default.clone());
                }
                properties.insert(field.name.clone(), described);
                if field.required {
                    required.push(Value::String(field.name.clone()));
                }
            }

            let mut m = Map::new();
            m.insert("type".into(), json!("object"));
            m.insert("properties".into(), Value::Object(properties));
            if !required.is_empty() {
                m.insert("required".into(), Value::Array(required));
            }
            m
        }
        SchemaKind::Any => object(json!({ "type": "string" })),
    };

    if let Some(description) = &schema.description {
        out.insert("description".into(), json!(description));
    }
    Value::Object(out)
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(m) => m,
        _ => Map::new(),
    }
}

/// Branches sharing one primitive type merge into `{type}`, with a merged
/// `enum` when every branch is an enum. Mixed types stay an `anyOf` list.
fn describe_union(branches: &[Schema]) -> Map<String, Value> {
    let described: Vec<Value> = branches.iter().map(describe_node).collect();

    let first_type = described.first().and_then(|d| d.get("type")).cloned();
    let same_type = first_type
        .as_ref()
        .is_some_and(|t| described.iter().all(|d| d.get("type") == Some(t)));

    if let (true, Some(t)) = (same_type, first_type) {
        let mut m = Map::new();
        m.insert("type".into(), t);
        if described.iter().all(|d| d.get("enum").is_some()) {
            let mut merged: Vec<Value> = Vec::new();
            for d in &described {
                for v in d["enum"].as_array().into_iter().flatten() {
                    if !merged.contains(v) {
                        merged.push(v.clone());
                    }
                }
            }
            m.insert("enum".into(), Value::Array(merged));
        }
        return m;
    }

    let mut m = Map::new();
    m.insert("anyOf".into(), Value::Array(described));
    m
}
