use super::{Condition, Describe, Rendered};
use crate::{
    error::FilterError,
    operand::{self, Operand, Resolved},
    placeholder::Placeholder,
    record::FieldSource,
    value::FieldValue,
};
use serde::{Deserialize, Serialize};

///
/// Between
///
/// Range test: `column BETWEEN ? AND ?`. Exactly two operands, enforced at
/// render time regardless of how the condition was constructed. A null or
/// absent bound skips the condition.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Between {
    pub column: String,
    pub values: Vec<Operand>,
}

impl Between {
    #[must_use]
    pub fn new(column: impl Into<String>, low: Operand, high: Operand) -> Self {
        Self {
            column: column.into(),
            values: vec![low, high],
        }
    }

    /// Literal bounds.
    #[must_use]
    pub fn raw(
        column: impl Into<String>,
        low: impl FieldValue,
        high: impl FieldValue,
    ) -> Self {
        Self::new(column, Operand::raw(low), Operand::raw(high))
    }

    /// Bounds resolved from the data record by field name.
    #[must_use]
    pub fn fields(
        column: impl Into<String>,
        low: impl Into<String>,
        high: impl Into<String>,
    ) -> Self {
        Self::new(column, Operand::field(low), Operand::field(high))
    }
}

impl Condition for Between {
    fn render(
        &self,
        data: Option<&dyn FieldSource>,
        ph: &mut Placeholder,
    ) -> Result<Rendered, FilterError> {
        if self.values.len() != 2 {
            return Err(FilterError::RangeSizeInvalid {
                found: self.values.len(),
            });
        }

        let mut bounds = Vec::with_capacity(2);
        for resolved in operand::resolve_all(data, &self.values)? {
            match resolved {
                Resolved::Value(value) => bounds.push(value),
                Resolved::Null | Resolved::Missing => return Ok(Rendered::Skip),
            }
        }

        let low = ph.next();
        let high = ph.next();
        Ok(Rendered::fragment(
            format!("{} BETWEEN {low} AND {high}", self.column),
            bounds,
        ))
    }

    fn describe(&self) -> Describe<'_> {
        Describe::Membership {
            column: &self.column,
            tag: "=+",
            operands: &self.values,
        }
    }
}

///
/// TESTS
///
