use crate::{
    error::FilterError,
    value::{FieldValue, Value},
};
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};

///
/// FieldSource
///
/// Injected capability for by-name operand resolution. The resolver depends
/// only on this contract, never on a concrete introspection mechanism.
///

pub trait FieldSource {
    /// Look up a field by case-insensitive name.
    ///
    /// `None` means the field is absent; `Some(Value::Null)` means the
    /// field is present but holds an empty optional. Both resolve to
    /// "no value" at the operand layer.
    fn field(&self, name: &str) -> Option<Value>;
}

///
/// Record
///
/// The canonical field source: an ordered list of named values. Build it
/// literal-style with `with`, or from any serializable named-field value
/// with `from_serialize`.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, PartialEq, Serialize, Deserialize)]
pub struct Record(Vec<(String, Value)>);

impl Record {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl FieldValue) -> Self {
        self.0.push((name.into(), value.to_value()));
        self
    }

    /// Build a record from any serializable named-field value.
    ///
    /// The value is serialized once through `serde_json`; anything that
    /// does not serialize to an object fails with `DataIsNotStruct`.
    /// `None` fields arrive as JSON null and later resolve as "no value".
    pub fn from_serialize<T: Serialize>(data: &T) -> Result<Self, FilterError> {
        let json = serde_json::to_value(data).map_err(|_| FilterError::DataIsNotStruct)?;
        let serde_json::Value::Object(map) = json else {
            return Err(FilterError::DataIsNotStruct);
        };

        Ok(Self(
            map.into_iter()
                .map(|(name, value)| (name, json_to_value(value)))
                .collect(),
        ))
    }
}

impl FieldSource for Record {
    fn field(&self, name: &str) -> Option<Value> {
        self.0
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }
}

fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(v) => Value::Bool(v),
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Value::Int(v)
            } else if let Some(v) = n.as_u64() {
                Value::Uint(v)
            } else {
                Value::Float(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(v) => Value::Text(v),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(json_to_value).collect())
        }
        // Nested structures are not addressable as operands.
        serde_json::Value::Object(_) => Value::Null,
    }
}

///
/// TESTS
///
