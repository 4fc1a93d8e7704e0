//! The unified error type produced while compiling or evaluating a query
use crate::node::AtMostOneError;
use crate::spec::functions::FunctionValidationError;
use crate::spec::integer::IntegerError;
use crate::spec::selector::filter::NonSingularQueryError;

/// Error produced by [`Environment::compile`][crate::environment::Environment::compile] or
/// [`Environment::find`][crate::environment::Environment::find]
///
/// This collects every way a query can fail, from a malformed query string through to a
/// recursion-depth violation during evaluation, into a single type so that callers have one
/// thing to match on regardless of which stage of the pipeline raised it.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The query string does not conform to the JSONPath grammar
    #[error("{0}")]
    Syntax(String),
    /// A function call is not defined in the environment it was compiled against
    #[error("function name '{0}' is not defined")]
    Name(String),
    /// A comparison operand or function argument did not satisfy the JSONPath type system
    #[error(transparent)]
    Type(#[from] FunctionValidationError),
    /// A numeric literal fell outside the permitted index range
    #[error(transparent)]
    Index(#[from] IntegerError),
    /// A query that must be singular (e.g. a comparison operand) was not
    #[error(transparent)]
    NonSingularQuery(#[from] NonSingularQueryError),
    /// Descendant-segment traversal exceeded the configured recursion depth
    #[error("exceeded the maximum recursion depth of {0} while evaluating a descendant segment")]
    Recursion(usize),
    /// A query expected to yield at most one node yielded more than one
    #[error(transparent)]
    Cardinality(#[from] AtMostOneError),
}

impl Error {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax(message.into())
    }
}
