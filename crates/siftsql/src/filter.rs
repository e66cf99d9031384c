use crate::{
    condition::{
        AndGroup, Between, Condition, Describe, Eq, Gt, Gte, In, Like, Lt, Lte, Ne, NotIn,
        OrGroup, Rendered, Term,
    },
    error::FilterError,
    operand::{self, Resolved},
    placeholder::Placeholder,
    record::{FieldSource, Record},
    value::{FieldValue, Value},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

///
/// Filter
///
/// Aggregate root: condition lists partitioned by kind, the optional data
/// record for by-name resolution, and the placeholder configuration.
///
/// Categories render in a fixed order (eq, or, and, ne, like, gt, gte,
/// lt, lte, in, not_in, between) so two filters with the same condition
/// sets always produce the same fragments and the same fingerprint.
///
/// Building never mutates the aggregate; the running placeholder offset is
/// threaded through the render calls and handed back on `Built`.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub eq: Vec<Eq>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub or: Vec<OrGroup>,
    #[serde(rename = "and", skip_serializing_if = "Vec::is_empty")]
    pub and_groups: Vec<AndGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ne: Vec<Ne>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub like: Vec<Like>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gt: Vec<Gt>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gte: Vec<Gte>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lt: Vec<Lt>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lte: Vec<Lte>,
    #[serde(rename = "in", skip_serializing_if = "Vec::is_empty")]
    pub in_list: Vec<In>,
    #[serde(rename = "not_in", skip_serializing_if = "Vec::is_empty")]
    pub not_in: Vec<NotIn>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub between: Vec<Between>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Record>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub placeholder: String,
    pub numbered: bool,
    pub offset: u32,
    pub allow_empty: bool,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Configuration ---

    #[must_use]
    pub fn with_placeholder(mut self, token: impl Into<String>) -> Self {
        self.placeholder = token.into();
        self
    }

    #[must_use]
    pub fn with_numbered(mut self, numbered: bool) -> Self {
        self.numbered = numbered;
        self
    }

    /// Starting value for placeholder numbering; the first rendered marker
    /// uses `offset + 1`.
    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: Record) -> Self {
        self.data = Some(data);
        self
    }

    // --- Append ---

    pub fn push_eq(&mut self, cond: Eq) -> &mut Self {
        self.eq.push(cond);
        self
    }

    pub fn push_ne(&mut self, cond: Ne) -> &mut Self {
        self.ne.push(cond);
        self
    }

    pub fn push_like(&mut self, cond: Like) -> &mut Self {
        self.like.push(cond);
        self
    }

    pub fn push_gt(&mut self, cond: Gt) -> &mut Self {
        self.gt.push(cond);
        self
    }

    pub fn push_gte(&mut self, cond: Gte) -> &mut Self {
        self.gte.push(cond);
        self
    }

    pub fn push_lt(&mut self, cond: Lt) -> &mut Self {
        self.lt.push(cond);
        self
    }

    pub fn push_lte(&mut self, cond: Lte) -> &mut Self {
        self.lte.push(cond);
        self
    }

    pub fn push_in(&mut self, cond: In) -> &mut Self {
        self.in_list.push(cond);
        self
    }

    pub fn push_not_in(&mut self, cond: NotIn) -> &mut Self {
        self.not_in.push(cond);
        self
    }

    pub fn push_between(&mut self, cond: Between) -> &mut Self {
        self.between.push(cond);
        self
    }

    pub fn push_or(&mut self, group: OrGroup) -> &mut Self {
        self.or.push(group);
        self
    }

    pub fn push_and(&mut self, group: AndGroup) -> &mut Self {
        self.and_groups.push(group);
        self
    }

    // --- Set (replace by column, or append) ---

    pub fn set_eq(&mut self, cond: Eq) -> &mut Self {
        upsert(&mut self.eq, cond, |c| &c.column);
        self
    }

    pub fn set_ne(&mut self, cond: Ne) -> &mut Self {
        upsert(&mut self.ne, cond, |c| &c.column);
        self
    }

    pub fn set_like(&mut self, cond: Like) -> &mut Self {
        upsert(&mut self.like, cond, |c| &c.column);
        self
    }

    pub fn set_gt(&mut self, cond: Gt) -> &mut Self {
        upsert(&mut self.gt, cond, |c| &c.column);
        self
    }

    pub fn set_gte(&mut self, cond: Gte) -> &mut Self {
        upsert(&mut self.gte, cond, |c| &c.column);
        self
    }

    pub fn set_lt(&mut self, cond: Lt) -> &mut Self {
        upsert(&mut self.lt, cond, |c| &c.column);
        self
    }

    pub fn set_lte(&mut self, cond: Lte) -> &mut Self {
        upsert(&mut self.lte, cond, |c| &c.column);
        self
    }

    pub fn set_in(&mut self, cond: In) -> &mut Self {
        upsert(&mut self.in_list, cond, |c| &c.column);
        self
    }

    pub fn set_not_in(&mut self, cond: NotIn) -> &mut Self {
        upsert(&mut self.not_in, cond, |c| &c.column);
        self
    }

    pub fn set_between(&mut self, cond: Between) -> &mut Self {
        upsert(&mut self.between, cond, |c| &c.column);
        self
    }

    // --- Build ---

    /// Assemble the filter into fragments plus a positional argument list.
    pub fn build(&self) -> Result<Built, FilterError> {
        self.build_at(self.offset)
    }

    /// Assemble with an explicit placeholder configuration, for hosting
    /// query layers that own the numbering scheme.
    pub fn build_with(
        &self,
        offset: u32,
        token: &str,
        numbered: bool,
    ) -> Result<Built, FilterError> {
        self.render_conditions(Placeholder::new(token, numbered, offset))
    }

    fn build_at(&self, offset: u32) -> Result<Built, FilterError> {
        self.render_conditions(Placeholder::new(&self.placeholder, self.numbered, offset))
    }

    fn render_conditions(&self, mut ph: Placeholder) -> Result<Built, FilterError> {
        if !self.has_conditions() && !self.allow_empty {
            return Err(FilterError::NoFilterSet);
        }
        self.validate_groups()?;

        let mut fragments = Vec::new();
        let mut args = Vec::new();
        let data = self.data_source();

        for condition in self.conditions() {
            match condition.render(data, &mut ph)? {
                Rendered::Fragment {
                    sql,
                    args: cond_args,
                } => {
                    fragments.push(sql);
                    args.extend(cond_args);
                }
                Rendered::Skip => {}
            }
        }

        trace!(
            fragments = fragments.len(),
            args = args.len(),
            next_offset = ph.offset(),
            "filter built"
        );

        Ok(Built {
            fragments,
            args,
            next_offset: ph.offset(),
        })
    }

    /// Append the built fragments as a `WHERE` clause onto an existing
    /// statement, extending its argument list. A build that produces no
    /// fragments leaves the statement untouched.
    pub fn weld(
        &self,
        sql: &str,
        args: &[Value],
        offset: u32,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let built = self.build_at(offset)?;
        let mut args = args.to_vec();

        if built.fragments.is_empty() {
            return Ok((sql.to_string(), args));
        }

        let stmt = sql.trim_end().trim_end_matches(';').trim_end();
        let welded = format!("{stmt} WHERE {}", built.where_clause());
        args.extend(built.args);

        debug!(fragments = built.fragments.len(), "filter welded onto statement");

        Ok((welded, args))
    }

    // --- Lookup ---

    /// Resolve the value of the first condition whose column matches
    /// `column` case-insensitively, scanning categories in build order and
    /// descending into groups. Multi-operand kinds resolve to a list.
    pub fn value_for(&self, column: &str) -> Result<Resolved, FilterError> {
        let data = self.data_source();
        for condition in self.conditions() {
            if let Some(found) = lookup_column(condition.describe(), column, data)? {
                return Ok(found);
            }
        }

        Err(FilterError::ColumnNotFound {
            column: column.to_string(),
        })
    }

    /// Typed column lookup.
    ///
    /// A missing value refuses with `TypeReflectionInvalid`, the null
    /// sentinel with `NullSource`, and a conversion failure with
    /// `DataAssertionMismatch`.
    pub fn value_for_as<T: FieldValue>(&self, column: &str) -> Result<T, FilterError> {
        match self.value_for(column)? {
            Resolved::Missing => Err(FilterError::TypeReflectionInvalid),
            Resolved::Null => Err(FilterError::NullSource),
            Resolved::Value(value) => {
                T::from_value(&value).ok_or(FilterError::DataAssertionMismatch)
            }
        }
    }

    // --- Inspection ---

    /// Whether any condition list is non-empty.
    #[must_use]
    pub fn has_conditions(&self) -> bool {
        !(self.eq.is_empty()
            && self.or.is_empty()
            && self.and_groups.is_empty()
            && self.ne.is_empty()
            && self.like.is_empty()
            && self.gt.is_empty()
            && self.gte.is_empty()
            && self.lt.is_empty()
            && self.lte.is_empty()
            && self.in_list.is_empty()
            && self.not_in.is_empty()
            && self.between.is_empty())
    }

    /// All conditions in the fixed category order.
    pub(crate) fn conditions(&self) -> impl Iterator<Item = &dyn Condition> {
        self.eq
            .iter()
            .map(|c| c as &dyn Condition)
            .chain(self.or.iter().map(|c| c as &dyn Condition))
            .chain(self.and_groups.iter().map(|c| c as &dyn Condition))
            .chain(self.ne.iter().map(|c| c as &dyn Condition))
            .chain(self.like.iter().map(|c| c as &dyn Condition))
            .chain(self.gt.iter().map(|c| c as &dyn Condition))
            .chain(self.gte.iter().map(|c| c as &dyn Condition))
            .chain(self.lt.iter().map(|c| c as &dyn Condition))
            .chain(self.lte.iter().map(|c| c as &dyn Condition))
            .chain(self.in_list.iter().map(|c| c as &dyn Condition))
            .chain(self.not_in.iter().map(|c| c as &dyn Condition))
            .chain(self.between.iter().map(|c| c as &dyn Condition))
    }

    pub(crate) fn data_source(&self) -> Option<&dyn FieldSource> {
        self.data.as_ref().map(|record| record as &dyn FieldSource)
    }

    // Or-groups must declare at least two members, including nested ones,
    // before any rendering happens.
    fn validate_groups(&self) -> Result<(), FilterError> {
        for group in &self.or {
            if group.members.len() < 2 {
                return Err(FilterError::GroupTooSmall {
                    found: group.members.len(),
                });
            }
            validate_members(&group.members)?;
        }
        for group in &self.and_groups {
            validate_members(&group.members)?;
        }

        Ok(())
    }
}

fn validate_members(members: &[Term]) -> Result<(), FilterError> {
    for member in members {
        match member {
            Term::Or(group) => {
                if group.members.len() < 2 {
                    return Err(FilterError::GroupTooSmall {
                        found: group.members.len(),
                    });
                }
                validate_members(&group.members)?;
            }
            Term::And(group) => validate_members(&group.members)?,
            _ => {}
        }
    }

    Ok(())
}

fn lookup_column(
    describe: Describe<'_>,
    column: &str,
    data: Option<&dyn FieldSource>,
) -> Result<Option<Resolved>, FilterError> {
    match describe {
        Describe::Compare {
            column: col,
            operand,
            ..
        } => {
            if col.eq_ignore_ascii_case(column) {
                return operand::resolve(data, operand).map(Some);
            }
        }
        Describe::Membership {
            column: col,
            operands,
            ..
        } => {
            if col.eq_ignore_ascii_case(column) {
                let values = operand::resolve_all(data, operands)?
                    .into_iter()
                    .map(Resolved::into_value)
                    .collect();
                return Ok(Some(Resolved::Value(Value::List(values))));
            }
        }
        Describe::Group { members } => {
            for member in members {
                if let Some(found) = lookup_column(member.describe(), column, data)? {
                    return Ok(Some(found));
                }
            }
        }
    }

    Ok(None)
}

// Replace the first entry with a matching column (case-insensitive) or append.
fn upsert<T>(list: &mut Vec<T>, cond: T, column: impl Fn(&T) -> &str) {
    match list
        .iter_mut()
        .find(|entry| column(entry).eq_ignore_ascii_case(column(&cond)))
    {
        Some(slot) => *slot = cond,
        None => list.push(cond),
    }
}

///
/// Built
///
/// Output of one build: fragments in category order, the parallel argument
/// list, and the placeholder offset after the last rendered parameter:
/// the continuation point for a follow-up statement.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Built {
    pub fragments: Vec<String>,
    pub args: Vec<Value>,
    pub next_offset: u32,
}

impl Built {
    /// Fragments joined with `AND`, ready to follow a `WHERE`.
    #[must_use]
    pub fn where_clause(&self) -> String {
        self.fragments.join(" AND ")
    }
}

///
/// TESTS
///
