use serde_json::{json, Map, Number, Value};

use crate::errors::FieldErrors;

/// Declared type (and constraint) of a single field.
#[derive(Debug, Clone)]
pub enum FieldType {
    Text { min_len: usize, msg: &'static str },
    Number { min: Option<f64>, max: Option<f64>, msg: &'static str },
    TextList,
    OneOf(&'static [&'static str]),
    Records { item: Shape, min_items: usize, max_items: usize },
}

impl FieldType {
    pub fn text() -> Self {
        FieldType::Text { min_len: 0, msg: "" }
    }

    pub fn non_empty(msg: &'static str) -> Self {
        FieldType::Text { min_len: 1, msg }
    }

    pub fn number() -> Self {
        FieldType::Number { min: None, max: None, msg: "" }
    }

    pub fn range(min: f64, max: f64, msg: &'static str) -> Self {
        FieldType::Number { min: Some(min), max: Some(max), msg }
    }

    pub fn at_least(min: f64, msg: &'static str) -> Self {
        FieldType::Number { min: Some(min), max: None, msg }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

/// Ordered field list describing one request or response record.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    fields: Vec<FieldSpec>,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: &'static str, ty: FieldType) -> Self {
        self.fields.push(FieldSpec { name, ty, required: true });
        self
    }

    pub fn optional(mut self, name: &'static str, ty: FieldType) -> Self {
        self.fields.push(FieldSpec { name, ty, required: false });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// JSON-schema style descriptor handed to the generation backend.
    pub fn json_schema(&self) -> Value {
        let mut props = Map::new();
        let mut required = Vec::new();
        for f in &self.fields {
            props.insert(f.name.to_string(), type_schema(&f.ty));
            if f.required {
                required.push(Value::String(f.name.to_string()));
            }
        }
        json!({ "type": "object", "properties": props, "required": required })
    }
}

fn type_schema(ty: &FieldType) -> Value {
    match ty {
        FieldType::Text { .. } => json!({ "type": "string" }),
        FieldType::Number { min, max, .. } => {
            let mut s = json!({ "type": "number" });
            if let Some(m) = min {
                s["minimum"] = json!(m);
            }
            if let Some(m) = max {
                s["maximum"] = json!(m);
            }
            s
        }
        FieldType::TextList => json!({ "type": "array", "items": { "type": "string" } }),
        FieldType::OneOf(values) => json!({ "type": "string", "enum": values }),
        FieldType::Records { item, min_items, max_items } => json!({
            "type": "array",
            "items": item.json_schema(),
            "minItems": min_items,
            "maxItems": max_items,
        }),
    }
}

/// Validate untyped caller input, coercing numeric strings where a number is
/// declared. Unknown fields are dropped from the normalized output.
pub fn validate(input: &Value, shape: &Shape) -> Result<Value, FieldErrors> {
    run(input, shape, true)
}

/// Strict variant for generated output: no coercion.
pub fn check(input: &Value, shape: &Shape) -> Result<Value, FieldErrors> {
    run(input, shape, false)
}

enum Failure {
    Msg(String),
    Nested(FieldErrors),
}

fn run(input: &Value, shape: &Shape, coerce: bool) -> Result<Value, FieldErrors> {
    let mut errs = FieldErrors::new();
    let obj = match input.as_object() {
        Some(o) => o,
        None => {
            errs.push("_root", "Expected an object.");
            return Err(errs);
        }
    };

    let mut out = Map::new();
    for spec in shape.fields() {
        match obj.get(spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    errs.push(spec.name, "Required");
                }
            }
            Some(v) => match field_value(v, &spec.ty, coerce) {
                Ok(norm) => {
                    out.insert(spec.name.to_string(), norm);
                }
                Err(Failure::Msg(m)) => errs.push(spec.name, m),
                Err(Failure::Nested(nested)) => errs.absorb(spec.name, nested),
            },
        }
    }

    if errs.is_empty() {
        Ok(Value::Object(out))
    } else {
        Err(errs)
    }
}

fn field_value(v: &Value, ty: &FieldType, coerce: bool) -> Result<Value, Failure> {
    match ty {
        FieldType::Text { min_len, msg } => {
            let s = v
                .as_str()
                .ok_or_else(|| Failure::Msg("Expected a string.".into()))?;
            if s.chars().count() < *min_len {
                return Err(Failure::Msg(msg.to_string()));
            }
            Ok(Value::String(s.to_string()))
        }
        FieldType::Number { min, max, msg } => {
            let (n, norm) = number_value(v, coerce)
                .ok_or_else(|| Failure::Msg("Expected a number.".into()))?;
            let below = min.map(|m| n < m).unwrap_or(false);
            let above = max.map(|m| n > m).unwrap_or(false);
            if below || above {
                let text = if msg.is_empty() { "Number out of range." } else { msg };
                return Err(Failure::Msg(text.to_string()));
            }
            Ok(norm)
        }
        FieldType::TextList => {
            let items = v
                .as_array()
                .ok_or_else(|| Failure::Msg("Expected a list of strings.".into()))?;
            if items.iter().any(|i| !i.is_string()) {
                return Err(Failure::Msg("Expected a list of strings.".into()));
            }
            Ok(v.clone())
        }
        FieldType::OneOf(values) => {
            let s = v.as_str().unwrap_or_default();
            if values.contains(&s) {
                Ok(Value::String(s.to_string()))
            } else {
                Err(Failure::Msg(format!("Expected one of: {}.", values.join(", "))))
            }
        }
        FieldType::Records { item, min_items, max_items } => {
            let items = v
                .as_array()
                .ok_or_else(|| Failure::Msg("Expected a list.".into()))?;
            if items.len() < *min_items || items.len() > *max_items {
                return Err(Failure::Msg(format!(
                    "Expected between {} and {} entries, got {}.",
                    min_items,
                    max_items,
                    items.len()
                )));
            }
            let mut nested = FieldErrors::new();
            let mut out = Vec::with_capacity(items.len());
            for (i, entry) in items.iter().enumerate() {
                match run(entry, item, coerce) {
                    Ok(norm) => out.push(norm),
                    Err(e) => nested.absorb(&format!("[{i}]"), e),
                }
            }
            if nested.is_empty() {
                Ok(Value::Array(out))
            } else {
                Err(Failure::Nested(nested))
            }
        }
    }
}

/// Returns the numeric value plus its normalized JSON form. Integers keep
/// their integer representation.
fn number_value(v: &Value, coerce: bool) -> Option<(f64, Value)> {
    match v {
        Value::Number(n) => n.as_f64().map(|f| (f, v.clone())),
        Value::String(s) if coerce => {
            let t = s.trim();
            if t.is_empty() {
                return None;
            }
            if let Ok(i) = t.parse::<i64>() {
                return Some((i as f64, Value::Number(i.into())));
            }
            let f = t.parse::<f64>().ok().filter(|f| f.is_finite())?;
            Number::from_f64(f).map(|n| (f, Value::Number(n)))
        }
        _ => None,
    }
}
