// Declarative request-shape validation. A schema lists fields and rules;
// checking a JSON document yields one FieldIssue per violated rule.
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::FieldIssue;

pub mod schemas;

pub const INVALID_TYPE: &str = "invalid_type";
pub const TOO_SMALL: &str = "too_small";
pub const INVALID_STRING: &str = "invalid_string";
pub const INVALID_ENUM_VALUE: &str = "invalid_enum_value";

#[derive(Debug, Clone, Copy)]
pub struct MinLength {
    pub len: usize,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Url,
}

#[derive(Debug, Clone)]
pub enum Rule {
    String {
        min: Option<MinLength>,
        format: Option<(StringFormat, &'static str)>,
    },
    Array {
        items: Box<Rule>,
        min: Option<MinLength>,
    },
    OneOf(&'static [&'static str]),
    Optional(Box<Rule>),
}

impl Rule {
    pub fn string() -> Self {
        Rule::String { min: None, format: None }
    }

    pub fn array(items: Rule) -> Self {
        Rule::Array {
            items: Box::new(items),
            min: None,
        }
    }

    pub fn one_of(values: &'static [&'static str]) -> Self {
        Rule::OneOf(values)
    }

    /// Minimum character count for strings, element count for arrays
    pub fn min(self, len: usize, message: &'static str) -> Self {
        let bound = Some(MinLength { len, message });
        match self {
            Rule::String { format, .. } => Rule::String { min: bound, format },
            Rule::Array { items, .. } => Rule::Array { items, min: bound },
            Rule::Optional(inner) => Rule::Optional(Box::new(inner.min(len, message))),
            other => other,
        }
    }

    pub fn email(self, message: &'static str) -> Self {
        self.with_format(StringFormat::Email, message)
    }

    pub fn url(self, message: &'static str) -> Self {
        self.with_format(StringFormat::Url, message)
    }

    pub fn optional(self) -> Self {
        Rule::Optional(Box::new(self))
    }

    fn with_format(self, kind: StringFormat, message: &'static str) -> Self {
        match self {
            Rule::String { min, .. } => Rule::String {
                min,
                format: Some((kind, message)),
            },
            other => other,
        }
    }

    fn check(&self, path: &str, value: Option<&Value>, issues: &mut Vec<FieldIssue>) {
        if let Rule::Optional(inner) = self {
            if value.is_some() {
                inner.check(path, value, issues);
            }
            return;
        }

        let Some(value) = value else {
            issues.push(FieldIssue::new(path, "Required", INVALID_TYPE));
            return;
        };

        match self {
            Rule::String { min, format } => {
                let Value::String(s) = value else {
                    issues.push(type_mismatch(path, "string", value));
                    return;
                };
                if let Some(bound) = min {
                    if s.chars().count() < bound.len {
                        issues.push(FieldIssue::new(path, bound.message, TOO_SMALL));
                    }
                }
                if let Some((kind, message)) = format {
                    let valid = match kind {
                        StringFormat::Email => is_email(s),
                        StringFormat::Url => url::Url::parse(s).is_ok(),
                    };
                    if !valid {
                        issues.push(FieldIssue::new(path, *message, INVALID_STRING));
                    }
                }
            }
            Rule::Array { items, min } => {
                let Value::Array(elements) = value else {
                    issues.push(type_mismatch(path, "array", value));
                    return;
                };
                for (index, element) in elements.iter().enumerate() {
                    items.check(&join_path(path, &index.to_string()), Some(element), issues);
                }
                if let Some(bound) = min {
                    if elements.len() < bound.len {
                        issues.push(FieldIssue::new(path, bound.message, TOO_SMALL));
                    }
                }
            }
            Rule::OneOf(allowed) => {
                let expected = allowed
                    .iter()
                    .map(|v| format!("'{}'", v))
                    .collect::<Vec<_>>()
                    .join(" | ");
                match value {
                    Value::String(s) if allowed.contains(&s.as_str()) => {}
                    Value::String(s) => issues.push(FieldIssue::new(
                        path,
                        format!("Invalid enum value. Expected {}, received '{}'", expected, s),
                        INVALID_ENUM_VALUE,
                    )),
                    other => issues.push(FieldIssue::new(
                        path,
                        format!("Expected {}, received {}", expected, type_name(other)),
                        INVALID_TYPE,
                    )),
                }
            }
            Rule::Optional(_) => {}
        }
    }
}

/// Ordered set of field rules for a JSON object
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: Vec<(&'static str, Rule)>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, rule: Rule) -> Self {
        self.fields.push((name, rule));
        self
    }

    /// Every violated rule, in declaration order
    pub fn check(&self, value: &Value) -> Vec<FieldIssue> {
        let Value::Object(map) = value else {
            return vec![type_mismatch("", "object", value)];
        };

        let mut issues = Vec::new();
        for (name, rule) in &self.fields {
            rule.check(name, map.get(*name), &mut issues);
        }
        issues
    }
}

/// Request payloads with a declared shape
pub trait Validate: DeserializeOwned {
    fn schema() -> ObjectSchema;

    /// Check the document, then deserialize it (unknown keys are dropped)
    fn from_document(document: Value) -> Result<Self, Vec<FieldIssue>> {
        let issues = Self::schema().check(&document);
        if !issues.is_empty() {
            return Err(issues);
        }
        serde_json::from_value(document)
            .map_err(|e| vec![FieldIssue::new("", e.to_string(), INVALID_TYPE)])
    }
}

fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}.{}", parent, child)
    }
}

fn type_mismatch(path: &str, expected: &str, received: &Value) -> FieldIssue {
    FieldIssue::new(
        path,
        format!("Expected {}, received {}", expected, type_name(received)),
        INVALID_TYPE,
    )
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
