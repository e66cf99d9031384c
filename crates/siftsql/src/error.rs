use thiserror::Error as ThisError;

///
/// FilterError
///
/// Failures surfaced while assembling, welding, or inspecting a filter.
/// Every operation returns the first failure it encounters; a failed build
/// never exposes partially accumulated fragments or arguments.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FilterError {
    #[error("no filters set")]
    NoFilterSet,

    #[error("column not found: {column}")]
    ColumnNotFound { column: String },

    #[error("data record was not set")]
    DataNotSet,

    #[error("field operand has an empty name")]
    InvalidFieldName,

    #[error("data record is not a named-field value")]
    DataIsNotStruct,

    #[error("resolved value does not match the requested type")]
    DataAssertionMismatch,

    #[error("referenced field resolved to no value")]
    TypeReflectionInvalid,

    #[error("or-group needs at least two members, found {found}")]
    GroupTooSmall { found: usize },

    #[error("between needs exactly two operands, found {found}")]
    RangeSizeInvalid { found: usize },

    #[error("typed lookup reached the null sentinel")]
    NullSource,
}
