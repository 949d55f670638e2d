//! Parameter schemas: declaration, validation and discovery description.
//!
//! A [`Schema`] is a tree of typed nodes built with the constructors on
//! [`Schema`] and [`Field`]. [`Schema::validate`] matches untrusted JSON
//! against it and yields [`ValidatedArgs`]; [`Schema::describe_json`] renders the
//! JSON-Schema document advertised to MCP clients.

mod describe;
mod validate;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ExecutionError, FieldError};

/// A limit paired with the message reported when it is violated.
#[derive(Debug, Clone)]
pub struct Bound<T> {
    pub limit: T,
    pub message: String,
}

/// A regular-expression constraint on a string.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub regex: Regex,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct StringRules {
    pub min_len: Option<Bound<usize>>,
    pub max_len: Option<Bound<usize>>,
    pub pattern: Option<Pattern>,
}

#[derive(Debug, Clone, Default)]
pub struct NumberRules {
    pub min: Option<Bound<f64>>,
    pub max: Option<Bound<f64>>,
    pub integer: bool,
}

/// Cross-field rule evaluated after every field of an object validated.
#[derive(Debug, Clone)]
pub enum ObjectRule {
    /// At least one of the named fields must be present and non-empty.
    AtLeastOneOf { fields: Vec<String>, message: String },
}

/// One named member of an object schema.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
    pub required: bool,
    pub default: Option<Value>,
}

impl Field {
    pub fn required(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            required: false,
            default: None,
        }
    }

    /// Optional field that takes `value` when the caller omits it.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub fields: Vec<Field>,
    pub rules: Vec<ObjectRule>,
}

#[derive(Debug, Clone)]
pub enum SchemaKind {
    String(StringRules),
    Number(NumberRules),
    Boolean,
    Array {
        items: Box<Schema>,
        min_items: Option<Bound<usize>>,
        max_items: Option<Bound<usize>>,
    },
    Enum(Vec<String>),
    Literal(Value),
    /// First branch that accepts the value wins.
    Union(Vec<Schema>),
    /// Objects selected by the string value of `tag`.
    TaggedUnion {
        tag: String,
        variants: Vec<(String, Schema)>,
    },
    Object(ObjectSchema),
    /// Accepts anything; described as a plain string.
    Any,
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub kind: SchemaKind,
    pub description: Option<String>,
}

impl Schema {
    fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String(StringRules::default()))
    }

    pub fn number() -> Self {
        Self::new(SchemaKind::Number(NumberRules::default()))
    }

    pub fn integer() -> Self {
        Self::new(SchemaKind::Number(NumberRules {
            integer: true,
            ..NumberRules::default()
        }))
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    pub fn array(items: Schema) -> Self {
        Self::new(SchemaKind::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        })
    }

    pub fn enumeration<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SchemaKind::Enum(options.into_iter().map(Into::into).collect()))
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(SchemaKind::Literal(value.into()))
    }

    pub fn union(branches: Vec<Schema>) -> Self {
        Self::new(SchemaKind::Union(branches))
    }

    /// Union of object schemas keyed by the string field `tag`.
    ///
    /// Each variant schema should declare the tag itself as a literal field so
    /// the tag survives validation.
    pub fn tagged_union<I, S>(tag: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = (S, Schema)>,
        S: Into<String>,
    {
        Self::new(SchemaKind::TaggedUnion {
            tag: tag.into(),
            variants: variants
                .into_iter()
                .map(|(name, schema)| (name.into(), schema))
                .collect(),
        })
    }

    pub fn object(fields: Vec<Field>) -> Self {
        Self::new(SchemaKind::Object(ObjectSchema {
            fields,
            rules: Vec::new(),
        }))
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn min_len(self, limit: usize, message: impl Into<String>) -> Self {
        self.with_string_rules(|rules| {
            rules.min_len = Some(Bound {
                limit,
                message: message.into(),
            })
        })
    }

    pub fn max_len(self, limit: usize, message: impl Into<String>) -> Self {
        self.with_string_rules(|rules| {
            rules.max_len = Some(Bound {
                limit,
                message: message.into(),
            })
        })
    }

    /// Constrain a string schema to a regular expression.
    ///
    /// Panics if `pattern` is not a valid regex; patterns are compile-time
    /// literals in this crate.
    pub fn pattern(self, pattern: &str, message: impl Into<String>) -> Self {
        let regex = Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern {pattern}: {e}"));
        self.with_string_rules(|rules| {
            rules.pattern = Some(Pattern {
                regex,
                message: message.into(),
            })
        })
    }

    pub fn min(self, limit: f64, message: impl Into<String>) -> Self {
        self.with_number_rules(|rules| {
            rules.min = Some(Bound {
                limit,
                message: message.into(),
            })
        })
    }

    pub fn max(self, limit: f64, message: impl Into<String>) -> Self {
        self.with_number_rules(|rules| {
            rules.max = Some(Bound {
                limit,
                message: message.into(),
            })
        })
    }

    pub fn min_items(mut self, limit: usize, message: impl Into<String>) -> Self {
        if let SchemaKind::Array { min_items, .. } = &mut self.kind {
            *min_items = Some(Bound {
                limit,
                message: message.into(),
            });
        }
        self
    }

    pub fn max_items(mut self, limit: usize, message: impl Into<String>) -> Self {
        if let SchemaKind::Array { max_items, .. } = &mut self.kind {
            *max_items = Some(Bound {
                limit,
                message: message.into(),
            });
        }
        self
    }

    /// Require at least one of `fields` on an object schema.
    pub fn at_least_one_of<I, S>(mut self, fields: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let SchemaKind::Object(object) = &mut self.kind {
            object.rules.push(ObjectRule::AtLeastOneOf {
                fields: fields.into_iter().map(Into::into).collect(),
                message: message.into(),
            });
        }
        self
    }

    fn with_string_rules(mut self, f: impl FnOnce(&mut StringRules)) -> Self {
        if let SchemaKind::String(rules) = &mut self.kind {
            f(rules);
        }
        self
    }

    fn with_number_rules(mut self, f: impl FnOnce(&mut NumberRules)) -> Self {
        if let SchemaKind::Number(rules) = &mut self.kind {
            f(rules);
        }
        self
    }

    /// Validate raw tool arguments against this (object) schema.
    ///
    /// A missing or `null` argument document is treated as `{}`.
    pub fn validate(&self, raw: &Value) -> Result<ValidatedArgs, ExecutionError> {
        let empty = Value::Object(Map::new());
        let input = if raw.is_null() { &empty } else { raw };

        match validate::validate_node(self, input, "") {
            Ok(Value::Object(map)) => Ok(ValidatedArgs(map)),
            Ok(other) => Err(ExecutionError::ValidationFailed(vec![FieldError::new(
                "",
                format!("Expected object, received {}", validate::type_name(&other)),
            )])),
            Err(errors) => Err(ExecutionError::ValidationFailed(errors)),
        }
    }

    /// Render the discovery (JSON-Schema) description of this schema.
    pub fn describe_json(&self) -> Value {
        describe::describe_node(self)
    }
}

/// Arguments that passed validation: defaults applied, unknown fields dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedArgs(Map<String, Value>);

impl ValidatedArgs {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Deserialize into a typed parameter struct.
    pub fn parse<T: DeserializeOwned>(self) -> Result<T, ExecutionError> {
        serde_json::from_value(Value::Object(self.0))
            .map_err(|e| ExecutionError::validation("", e.to_string()))
    }
}

#[cfg(test)]
mod tests;
