use crate::{
    error::FilterError,
    record::FieldSource,
    value::{FieldValue, Value},
};
use serde::{Deserialize, Serialize};

///
/// Operand
///
/// The right-hand side of a condition before resolution: either a literal
/// carried on the condition itself, or the name of a field to look up
/// case-insensitively against the filter's data record at render time.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// A literal value supplied by the caller.
    Raw(Value),
    /// A field name resolved against the data record.
    Field(String),
}

impl Operand {
    pub fn raw(value: impl FieldValue) -> Self {
        Self::Raw(value.to_value())
    }

    /// The explicit null sentinel: renders as SQL `NULL`.
    #[must_use]
    pub const fn null() -> Self {
        Self::Raw(Value::Null)
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }
}

///
/// Resolved
///
/// Outcome of resolving one operand. `Null` is the explicit sentinel and
/// renders as `IS NULL`/`IS NOT NULL` where the kind supports it; `Missing`
/// means the operand produced no value at all (absent field, or a field
/// holding an empty optional) and the owning condition drops out of the
/// build.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Resolved {
    Value(Value),
    Null,
    Missing,
}

impl Resolved {
    /// Collapse into a `Value`, mapping both `Null` and `Missing` to
    /// `Value::Null`. For callers that have already handled the distinction.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(v) => v,
            Self::Null | Self::Missing => Value::Null,
        }
    }
}

/// Resolve one operand against an optional data record.
///
/// Raw operands pass their literal through, normalizing `Value::Null` to
/// the sentinel. Field operands require a record (`DataNotSet`) and a
/// non-empty name (`InvalidFieldName`); a lookup miss, or a field holding
/// `Value::Null`, resolves to `Missing`. The record is never mutated.
pub fn resolve(
    data: Option<&dyn FieldSource>,
    operand: &Operand,
) -> Result<Resolved, FilterError> {
    match operand {
        Operand::Raw(Value::Null) => Ok(Resolved::Null),
        Operand::Raw(value) => Ok(Resolved::Value(value.clone())),
        Operand::Field(name) => {
            if name.trim().is_empty() {
                return Err(FilterError::InvalidFieldName);
            }
            let Some(data) = data else {
                return Err(FilterError::DataNotSet);
            };
            match data.field(name) {
                Some(Value::Null) | None => Ok(Resolved::Missing),
                Some(value) => Ok(Resolved::Value(value)),
            }
        }
    }
}

/// Resolve an operand sequence, failing fast on the first error.
pub fn resolve_all(
    data: Option<&dyn FieldSource>,
    operands: &[Operand],
) -> Result<Vec<Resolved>, FilterError> {
    operands.iter().map(|operand| resolve(data, operand)).collect()
}

///
/// TESTS
///
