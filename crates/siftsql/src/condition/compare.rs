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
/// Single-operand comparison conditions.
///
/// A null-sentinel operand turns `Eq`/`Ne` into `IS NULL`/`IS NOT NULL`
/// with no argument and no offset advance; the ordering and pattern kinds
/// skip instead. An operand that resolves to no value skips the condition
/// entirely.
///

#[derive(Clone, Copy, Debug, PartialEq)]
enum NullForm {
    IsNull,
    IsNotNull,
    Skip,
}

fn render_compare(
    column: &str,
    op: &str,
    null_form: NullForm,
    operand: &Operand,
    data: Option<&dyn FieldSource>,
    ph: &mut Placeholder,
) -> Result<Rendered, FilterError> {
    match operand::resolve(data, operand)? {
        Resolved::Missing => Ok(Rendered::Skip),
        Resolved::Null => Ok(match null_form {
            NullForm::IsNull => Rendered::fragment(format!("{column} IS NULL"), Vec::new()),
            NullForm::IsNotNull => {
                Rendered::fragment(format!("{column} IS NOT NULL"), Vec::new())
            }
            NullForm::Skip => Rendered::Skip,
        }),
        Resolved::Value(value) => {
            let marker = ph.next();
            Ok(Rendered::fragment(
                format!("{column} {op} {marker}"),
                vec![value],
            ))
        }
    }
}

macro_rules! compare_condition {
    ( $( $(#[$doc:meta])* $name:ident => ($op:literal, $tag:literal, $null_form:expr) ),* $(,)? ) => {
        $(
            $(#[$doc])*
            #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
            pub struct $name {
                pub column: String,
                pub value: Operand,
            }

            impl $name {
                #[must_use]
                pub fn new(column: impl Into<String>, value: Operand) -> Self {
                    Self {
                        column: column.into(),
                        value,
                    }
                }

                /// Literal operand, carried on the condition itself.
                #[must_use]
                pub fn raw(column: impl Into<String>, value: impl FieldValue) -> Self {
                    Self::new(column, Operand::raw(value))
                }

                /// Operand resolved from the data record by field name.
                #[must_use]
                pub fn field(column: impl Into<String>, field: impl Into<String>) -> Self {
                    Self::new(column, Operand::field(field))
                }
            }

            impl Condition for $name {
                fn render(
                    &self,
                    data: Option<&dyn FieldSource>,
                    ph: &mut Placeholder,
                ) -> Result<Rendered, FilterError> {
                    render_compare(&self.column, $op, $null_form, &self.value, data, ph)
                }

                fn describe(&self) -> Describe<'_> {
                    Describe::Compare {
                        column: &self.column,
                        tag: $tag,
                        operand: &self.value,
                    }
                }
            }
        )*
    };
}

compare_condition!(
    /// Equality: `column = ?`, or `column IS NULL` for the null sentinel.
    Eq => ("=", "=", NullForm::IsNull),
    /// Inequality: `column <> ?`, or `column IS NOT NULL` for the null sentinel.
    Ne => ("<>", "=!", NullForm::IsNotNull),
    /// Pattern match: `column LIKE ?`.
    Like => ("LIKE", "=%", NullForm::Skip),
    /// Greater-than: `column > ?`.
    Gt => (">", "=>", NullForm::Skip),
    /// Greater-or-equal: `column >= ?`.
    Gte => (">=", "=>=", NullForm::Skip),
    /// Less-than: `column < ?`.
    Lt => ("<", "=<", NullForm::Skip),
    /// Less-or-equal: `column <= ?`.
    Lte => ("<=", "=<=", NullForm::Skip),
);

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::Record, value::Value};

    fn ph() -> Placeholder {
        Placeholder::new("@p", true, 0)
    }

    #[test]
    fn eq_renders_with_numbered_marker() {
        let cond = Eq::raw("first_name", "Zaldy");
        let mut ph = ph();
        let rendered = cond.render(None, &mut ph).unwrap();

        assert_eq!(
            rendered,
            Rendered::Fragment {
                sql: "first_name = @p1".to_string(),
                args: vec![Value::Text("Zaldy".to_string())],
            }
        );
        assert_eq!(ph.offset(), 1);
    }

    #[test]
    fn eq_null_sentinel_renders_is_null_without_argument() {
        let cond = Eq::new("age", Operand::null());
        let mut ph = ph();
        let rendered = cond.render(None, &mut ph).unwrap();

        assert_eq!(
            rendered,
            Rendered::Fragment {
                sql: "age IS NULL".to_string(),
                args: vec![],
            }
        );
        // No offset advance for the null form.
        assert_eq!(ph.offset(), 0);
    }

    #[test]
    fn ne_null_sentinel_renders_is_not_null() {
        let cond = Ne::new("age", Operand::null());
        let rendered = cond.render(None, &mut ph()).unwrap();
        assert_eq!(
            rendered,
            Rendered::Fragment {
                sql: "age IS NOT NULL".to_string(),
                args: vec![],
            }
        );
    }

    #[test]
    fn ordering_kinds_skip_on_null_sentinel() {
        for rendered in [
            Gt::new("age", Operand::null()).render(None, &mut ph()).unwrap(),
            Lte::new("age", Operand::null()).render(None, &mut ph()).unwrap(),
            Like::new("name", Operand::null()).render(None, &mut ph()).unwrap(),
        ] {
            assert_eq!(rendered, Rendered::Skip);
        }
    }

    #[test]
    fn missing_field_skips_the_condition() {
        let record = Record::new().with("other", 1i64);
        let cond = Eq::field("age", "age");
        let mut ph = ph();
        let rendered = cond.render(Some(&record), &mut ph).unwrap();

        assert_eq!(rendered, Rendered::Skip);
        assert_eq!(ph.offset(), 0);
    }

    #[test]
    fn field_operand_resolves_against_record() {
        let record = Record::new().with("Age", 46i64);
        let cond = Gte::field("age", "age");
        let rendered = cond.render(Some(&record), &mut ph()).unwrap();

        assert_eq!(
            rendered,
            Rendered::Fragment {
                sql: "age >= @p1".to_string(),
                args: vec![Value::Int(46)],
            }
        );
    }

    #[test]
    fn operator_texts() {
        let record = Record::new().with("n", 1i64);

        fn sql_of(cond: &dyn Condition, record: &Record) -> String {
            let mut ph = Placeholder::new("?", false, 0);
            match cond.render(Some(record), &mut ph).unwrap() {
                Rendered::Fragment { sql, .. } => sql,
                Rendered::Skip => panic!("expected fragment"),
            }
        }

        assert_eq!(sql_of(&Eq::field("n", "n"), &record), "n = ?");
        assert_eq!(sql_of(&Ne::field("n", "n"), &record), "n <> ?");
        assert_eq!(sql_of(&Like::field("n", "n"), &record), "n LIKE ?");
        assert_eq!(sql_of(&Gt::field("n", "n"), &record), "n > ?");
        assert_eq!(sql_of(&Gte::field("n", "n"), &record), "n >= ?");
        assert_eq!(sql_of(&Lt::field("n", "n"), &record), "n < ?");
        assert_eq!(sql_of(&Lte::field("n", "n"), &record), "n <= ?");
    }
}
