use std::ops::Deref;

use crate::parser::{CalculatePosition, Error as NomError};

/// Error produced when a JSONPath query string fails to parse or validate
///
/// A query string can fail for two distinct reasons: its grammar may be malformed (a
/// [`Self::Syntax`] error, with a 1-indexed position into the input), or it may parse cleanly but
/// reference an undefined function extension, or call one with the wrong number or type of
/// arguments (a [`Self::Validation`] error).
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The query string did not conform to JSONPath grammar
    #[error("at position {position}, {message}")]
    Syntax {
        /// The 1-indexed position in the input at which parsing failed
        position: usize,
        /// A description of the parsing failure
        message: Box<str>,
    },
    /// The query parsed, but failed semantic validation
    #[error(transparent)]
    Validation(#[from] jsonpath_core::error::Error),
}

impl ParseError {
    /// Get the 1-indexed error position, for a [`Self::Syntax`] error
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Syntax { position, .. } => Some(*position),
            Self::Validation(_) => None,
        }
    }
}

impl<I> From<(I, NomError<I>)> for ParseError
where
    I: Deref<Target = str> + std::fmt::Debug + nom::Offset,
{
    fn from((input, pe): (I, NomError<I>)) -> Self {
        #[cfg(feature = "trace")]
        tracing::trace!(input = %input.to_string(), parser_error = ?pe);
        match pe {
            NomError::NonSingularQuery(e) => {
                Self::Validation(jsonpath_core::error::Error::NonSingularQuery(e))
            }
            NomError::Verbose(v) => {
                let position = v.calculate_position(input);
                let message = v.to_string().into();
                Self::Syntax { position, message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ParseError;
    #[cfg(feature = "trace")]
    use test_log::test;

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ParseError>();
    }

    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<ParseError>();
    }
}
