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
/// Membership conditions: `IN` and `NOT IN`.
///
/// Every operand must resolve to a concrete value; a null or absent member
/// poisons the whole test and the condition is skipped.
///

fn render_membership(
    column: &str,
    op: &str,
    operands: &[Operand],
    data: Option<&dyn FieldSource>,
    ph: &mut Placeholder,
) -> Result<Rendered, FilterError> {
    let mut values = Vec::with_capacity(operands.len());
    for resolved in operand::resolve_all(data, operands)? {
        match resolved {
            Resolved::Value(value) => values.push(value),
            Resolved::Null | Resolved::Missing => return Ok(Rendered::Skip),
        }
    }

    if values.is_empty() {
        return Ok(Rendered::Skip);
    }

    let markers: Vec<String> = values.iter().map(|_| ph.next()).collect();
    Ok(Rendered::fragment(
        format!("{column} {op} ({})", markers.join(",")),
        values,
    ))
}

macro_rules! membership_condition {
    ( $( $(#[$doc:meta])* $name:ident => ($op:literal, $tag:literal) ),* $(,)? ) => {
        $(
            $(#[$doc])*
            #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
            pub struct $name {
                pub column: String,
                pub values: Vec<Operand>,
            }

            impl $name {
                #[must_use]
                pub fn new(column: impl Into<String>, values: Vec<Operand>) -> Self {
                    Self {
                        column: column.into(),
                        values,
                    }
                }

                /// Literal member values.
                #[must_use]
                pub fn raw<T: FieldValue>(
                    column: impl Into<String>,
                    values: impl IntoIterator<Item = T>,
                ) -> Self {
                    Self::new(column, values.into_iter().map(Operand::raw).collect())
                }

                /// Member values resolved from the data record by field name.
                #[must_use]
                pub fn fields<S: Into<String>>(
                    column: impl Into<String>,
                    fields: impl IntoIterator<Item = S>,
                ) -> Self {
                    Self::new(column, fields.into_iter().map(Operand::field).collect())
                }
            }

            impl Condition for $name {
                fn render(
                    &self,
                    data: Option<&dyn FieldSource>,
                    ph: &mut Placeholder,
                ) -> Result<Rendered, FilterError> {
                    render_membership(&self.column, $op, &self.values, data, ph)
                }

                fn describe(&self) -> Describe<'_> {
                    Describe::Membership {
                        column: &self.column,
                        tag: $tag,
                        operands: &self.values,
                    }
                }
            }
        )*
    };
}

membership_condition!(
    /// Membership: `column IN (?,?,…)`.
    In => ("IN", "=|"),
    /// Negated membership: `column NOT IN (?,?,…)`.
    NotIn => ("NOT IN", "=!|"),
);

///
/// TESTS
///
