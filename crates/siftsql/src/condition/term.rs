use super::{
    AndGroup, Between, Condition, Describe, Eq, Gt, Gte, In, Like, Lt, Lte, Ne, NotIn, OrGroup,
    Rendered,
};
use crate::{error::FilterError, placeholder::Placeholder, record::FieldSource};
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};

///
/// Term
///
/// The closed set of condition kinds. Group members and the lookup
/// machinery range over this enum; rendering always dispatches through the
/// `Condition` capability of the underlying kind.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Eq(Eq),
    Ne(Ne),
    Like(Like),
    Gt(Gt),
    Gte(Gte),
    Lt(Lt),
    Lte(Lte),
    In(In),
    NotIn(NotIn),
    Between(Between),
    Or(OrGroup),
    And(AndGroup),
}

impl Term {
    /// Combine with `other` under `AND`, flattening nested and-groups
    /// (`(a AND b) AND c` becomes one three-member group).
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::And(mut a), Self::And(mut b)) => {
                a.members.append(&mut b.members);
                Self::And(a)
            }
            (Self::And(mut a), b) => {
                a.members.push(b);
                Self::And(a)
            }
            (a, Self::And(mut b)) => {
                let mut members = vec![a];
                members.append(&mut b.members);
                Self::And(AndGroup::new(members))
            }
            (a, b) => Self::And(AndGroup::new(vec![a, b])),
        }
    }

    /// Combine with `other` under `OR`, flattening nested or-groups.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Or(mut a), Self::Or(mut b)) => {
                a.members.append(&mut b.members);
                Self::Or(a)
            }
            (Self::Or(mut a), b) => {
                a.members.push(b);
                Self::Or(a)
            }
            (a, Self::Or(mut b)) => {
                let mut members = vec![a];
                members.append(&mut b.members);
                Self::Or(OrGroup::new(members))
            }
            (a, b) => Self::Or(OrGroup::new(vec![a, b])),
        }
    }
}

impl Condition for Term {
    fn render(
        &self,
        data: Option<&dyn FieldSource>,
        ph: &mut Placeholder,
    ) -> Result<Rendered, FilterError> {
        match self {
            Self::Eq(c) => c.render(data, ph),
            Self::Ne(c) => c.render(data, ph),
            Self::Like(c) => c.render(data, ph),
            Self::Gt(c) => c.render(data, ph),
            Self::Gte(c) => c.render(data, ph),
            Self::Lt(c) => c.render(data, ph),
            Self::Lte(c) => c.render(data, ph),
            Self::In(c) => c.render(data, ph),
            Self::NotIn(c) => c.render(data, ph),
            Self::Between(c) => c.render(data, ph),
            Self::Or(c) => c.render(data, ph),
            Self::And(c) => c.render(data, ph),
        }
    }

    fn describe(&self) -> Describe<'_> {
        match self {
            Self::Eq(c) => c.describe(),
            Self::Ne(c) => c.describe(),
            Self::Like(c) => c.describe(),
            Self::Gt(c) => c.describe(),
            Self::Gte(c) => c.describe(),
            Self::Lt(c) => c.describe(),
            Self::Lte(c) => c.describe(),
            Self::In(c) => c.describe(),
            Self::NotIn(c) => c.describe(),
            Self::Between(c) => c.describe(),
            Self::Or(c) => c.describe(),
            Self::And(c) => c.describe(),
        }
    }
}

impl BitAnd for Term {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for Term {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

macro_rules! term_from {
    ( $( $kind:ident ),* $(,)? ) => {
        $(
            impl From<$kind> for Term {
                fn from(value: $kind) -> Self {
                    Self::$kind(value)
                }
            }
        )*
    };
}

term_from!(Eq, Ne, Like, Gt, Gte, Lt, Lte, In, NotIn, Between);

impl From<OrGroup> for Term {
    fn from(value: OrGroup) -> Self {
        Self::Or(value)
    }
}

impl From<AndGroup> for Term {
    fn from(value: AndGroup) -> Self {
        Self::And(value)
    }
}

///
/// TESTS
///
