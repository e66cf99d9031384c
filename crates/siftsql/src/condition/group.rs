use super::{Condition, Describe, Rendered, Term};
use crate::{error::FilterError, placeholder::Placeholder, record::FieldSource};
use serde::{Deserialize, Serialize};

///
/// Condition groups.
///
/// A group renders its members in declaration order against the shared
/// placeholder, joins the surviving fragments, and wraps the result in
/// parentheses so the whole group composes as one logical unit. Members
/// that resolve to no value drop out; a group whose members all drop out
/// skips entirely. Member arguments flatten into one list in member order.
///

fn render_group(
    members: &[Term],
    joiner: &str,
    data: Option<&dyn FieldSource>,
    ph: &mut Placeholder,
) -> Result<Rendered, FilterError> {
    let mut parts = Vec::with_capacity(members.len());
    let mut args = Vec::new();

    for member in members {
        match member.render(data, ph)? {
            Rendered::Fragment {
                sql,
                args: member_args,
            } => {
                parts.push(sql);
                args.extend(member_args);
            }
            Rendered::Skip => {}
        }
    }

    if parts.is_empty() {
        return Ok(Rendered::Skip);
    }

    Ok(Rendered::fragment(format!("({})", parts.join(joiner)), args))
}

///
/// OrGroup
///
/// Two or more conditions joined with `OR`; the group itself is AND-ed with
/// its siblings. The minimum size applies to declared members and is also
/// checked here so nested groups cannot dodge it.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrGroup {
    pub members: Vec<Term>,
}

impl OrGroup {
    #[must_use]
    pub fn new(members: Vec<Term>) -> Self {
        Self { members }
    }

    #[must_use]
    pub fn push(mut self, member: impl Into<Term>) -> Self {
        self.members.push(member.into());
        self
    }
}

impl Condition for OrGroup {
    fn render(
        &self,
        data: Option<&dyn FieldSource>,
        ph: &mut Placeholder,
    ) -> Result<Rendered, FilterError> {
        if self.members.len() < 2 {
            return Err(FilterError::GroupTooSmall {
                found: self.members.len(),
            });
        }

        render_group(&self.members, " OR ", data, ph)
    }

    fn describe(&self) -> Describe<'_> {
        Describe::Group {
            members: &self.members,
        }
    }
}

///
/// AndGroup
///
/// Conditions joined with `AND`; a bracketed sub-expression usable as one
/// logical unit inside an or-group or at top level. No minimum size.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AndGroup {
    pub members: Vec<Term>,
}

impl AndGroup {
    #[must_use]
    pub fn new(members: Vec<Term>) -> Self {
        Self { members }
    }

    #[must_use]
    pub fn push(mut self, member: impl Into<Term>) -> Self {
        self.members.push(member.into());
        self
    }
}

impl Condition for AndGroup {
    fn render(
        &self,
        data: Option<&dyn FieldSource>,
        ph: &mut Placeholder,
    ) -> Result<Rendered, FilterError> {
        render_group(&self.members, " AND ", data, ph)
    }

    fn describe(&self) -> Describe<'_> {
        Describe::Group {
            members: &self.members,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        condition::{Eq, Like},
        operand::Operand,
        value::Value,
    };

    fn ph() -> Placeholder {
        Placeholder::new("@p", true, 0)
    }

    #[test]
    fn or_group_joins_members_and_shares_the_offset() {
        let group = OrGroup::default()
            .push(Eq::raw("nick_name", "James"))
            .push(Eq::raw("age", 32i64));
        let mut ph = ph();
        let rendered = group.render(None, &mut ph).unwrap();

        assert_eq!(
            rendered,
            Rendered::Fragment {
                sql: "(nick_name = @p1 OR age = @p2)".to_string(),
                args: vec![Value::Text("James".to_string()), Value::Int(32)],
            }
        );
        assert_eq!(ph.offset(), 2);
    }

    #[test]
    fn or_group_under_two_members_is_an_error() {
        let group = OrGroup::default().push(Eq::raw("a", 1i64));
        assert_eq!(
            group.render(None, &mut ph()).unwrap_err(),
            FilterError::GroupTooSmall { found: 1 }
        );

        let empty = OrGroup::default();
        assert_eq!(
            empty.render(None, &mut ph()).unwrap_err(),
            FilterError::GroupTooSmall { found: 0 }
        );
    }

    #[test]
    fn and_group_nests_inside_or_group() {
        let group = OrGroup::default()
            .push(Eq::raw("status", "NEW"))
            .push(
                AndGroup::default()
                    .push(Eq::raw("status", "OLD"))
                    .push(Like::raw("name", "J%")),
            );
        let rendered = group.render(None, &mut ph()).unwrap();

        assert_eq!(
            rendered,
            Rendered::Fragment {
                sql: "(status = @p1 OR (status = @p2 AND name LIKE @p3))".to_string(),
                args: vec![
                    Value::Text("NEW".to_string()),
                    Value::Text("OLD".to_string()),
                    Value::Text("J%".to_string()),
                ],
            }
        );
    }

    #[test]
    fn skipped_members_drop_out_of_the_fragment() {
        // The Like member resolves to the null sentinel and skips.
        let group = OrGroup::default()
            .push(Eq::raw("a", 1i64))
            .push(Like::new("b", Operand::null()));
        let rendered = group.render(None, &mut ph()).unwrap();

        assert_eq!(
            rendered,
            Rendered::Fragment {
                sql: "(a = @p1)".to_string(),
                args: vec![Value::Int(1)],
            }
        );
    }

    #[test]
    fn all_members_skipped_skips_the_group() {
        let group = OrGroup::default()
            .push(Like::new("a", Operand::null()))
            .push(Like::new("b", Operand::null()));
        assert_eq!(group.render(None, &mut ph()).unwrap(), Rendered::Skip);
    }

    #[test]
    fn group_collects_membership_arguments_flattened() {
        let group = OrGroup::default()
            .push(Eq::raw("name", "Zaldy"))
            .push(crate::condition::In::raw("age", [32i64, 34]));
        let rendered = group.render(None, &mut ph()).unwrap();

        assert_eq!(
            rendered,
            Rendered::Fragment {
                sql: "(name = @p1 OR age IN (@p2,@p3))".to_string(),
                args: vec![
                    Value::Text("Zaldy".to_string()),
                    Value::Int(32),
                    Value::Int(34),
                ],
            }
        );
    }
}
