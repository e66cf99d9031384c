use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

///
/// Value
///
/// The resolved right-hand side of a condition: what lands in the
/// positional argument list, or gets rendered into a fingerprint entry.
///
/// `Null` is the explicit null sentinel ("render as SQL NULL"). An operand
/// that resolves to nothing at all is `Resolved::Missing`, not a `Value`.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Decimal(Decimal),
    Float(f64),
    Int(i64),
    Uint(u64),
    Text(String),
    Timestamp(DateTime<Utc>),
    /// Ordered list of values. Member order is preserved for rendering and
    /// fingerprints.
    List(Vec<Self>),
    Null,
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Build a `Value::List` from a slice of convertible items.
    pub fn from_slice<T: FieldValue>(items: &[T]) -> Self {
        Self::List(items.iter().map(FieldValue::to_value).collect())
    }

    /// Canonical text form used by fingerprint keys.
    ///
    /// Integers render in base 10, floats with six fractional digits,
    /// booleans as `true`/`false`, timestamps as a quoted RFC 3339 string,
    /// null as empty text. Lists join their members with commas.
    #[must_use]
    pub fn canonical_text(&self) -> String {
        match self {
            Self::Bool(v) => v.to_string(),
            Self::Decimal(v) => v.normalize().to_string(),
            Self::Float(v) => format!("{v:.6}"),
            Self::Int(v) => v.to_string(),
            Self::Uint(v) => v.to_string(),
            Self::Text(v) => v.clone(),
            Self::Timestamp(v) => {
                format!("'{}'", v.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            Self::List(items) => items
                .iter()
                .map(Self::canonical_text)
                .collect::<Vec<_>>()
                .join(","),
            Self::Null => String::new(),
        }
    }
}

///
/// FieldValue
///
/// Conversion boundary for values that can appear on the right-hand side of
/// a condition, and that typed column lookup can convert back out.
///

pub trait FieldValue {
    fn to_value(&self) -> Value;

    #[must_use]
    fn from_value(value: &Value) -> Option<Self>
    where
        Self: Sized;
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FieldValue for &str {
    fn to_value(&self) -> Value {
        Value::Text((*self).to_string())
    }

    // A borrowed string cannot be reconstructed from an owned value.
    fn from_value(_value: &Value) -> Option<Self> {
        None
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }

        T::from_value(value).map(Some)
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        let Value::List(items) = value else {
            return None;
        };

        items.iter().map(T::from_value).collect()
    }
}

// impl_field_value
macro_rules! impl_field_value {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl FieldValue for $type {
                fn to_value(&self) -> Value {
                    Value::$variant((*self).into())
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => (*v).try_into().ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_field_value!(
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    f64 => Float,
    bool => Bool,
    Decimal => Decimal,
    DateTime<Utc> => Timestamp,
);

///
/// TESTS
///
