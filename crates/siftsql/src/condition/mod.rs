mod compare;
mod group;
mod membership;
mod range;
mod term;

pub use compare::{Eq, Gt, Gte, Like, Lt, Lte, Ne};
pub use group::{AndGroup, OrGroup};
pub use membership::{In, NotIn};
pub use range::Between;
pub use term::Term;

use crate::{
    error::FilterError, operand::Operand, placeholder::Placeholder, record::FieldSource,
    value::Value,
};

///
/// Condition
///
/// Capability contract implemented by every predicate kind. `render`
/// produces the SQL fragment and its arguments against the shared
/// placeholder state; `describe` is the placeholder-free projection used by
/// fingerprinting and column lookup. Dispatch always goes through this
/// trait, never through kind inspection.
///

pub trait Condition {
    fn render(
        &self,
        data: Option<&dyn FieldSource>,
        ph: &mut Placeholder,
    ) -> Result<Rendered, FilterError>;

    fn describe(&self) -> Describe<'_>;
}

///
/// Rendered
///

#[derive(Clone, Debug, PartialEq)]
pub enum Rendered {
    /// One fragment plus the arguments it binds, in placeholder order.
    Fragment { sql: String, args: Vec<Value> },
    /// The condition is not applicable for this build; emit nothing.
    Skip,
}

impl Rendered {
    pub(crate) fn fragment(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self::Fragment {
            sql: sql.into(),
            args,
        }
    }
}

///
/// Describe
///
/// The semantic projection of a condition: column, kind tag, and operands,
/// free of any placeholder or offset state.
///

#[derive(Clone, Copy, Debug)]
pub enum Describe<'a> {
    Compare {
        column: &'a str,
        tag: &'static str,
        operand: &'a Operand,
    },
    Membership {
        column: &'a str,
        tag: &'static str,
        operands: &'a [Operand],
    },
    Group {
        members: &'a [Term],
    },
}
