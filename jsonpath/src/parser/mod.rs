use std::ops::Deref;

use nom::character::complete::char;
use nom::combinator::all_consuming;
use nom::error::{ContextError, ErrorKind, FromExternalError, VerboseError};
use nom::{branch::alt, combinator::map, multi::many0, sequence::preceded, IResult, Offset};
use jsonpath_core::spec::query::{Query, QueryKind};
use jsonpath_core::spec::segment::QuerySegment;
use jsonpath_core::spec::selector::filter::NonSingularQueryError;

use self::segment::parse_segment;

pub mod primitive;
pub mod segment;
pub mod selector;
pub(crate) mod utils;

/// Parser error type
///
/// Most parse failures are ordinary grammar mismatches, reported via the wrapped
/// [`VerboseError`]. A comparison operand that parses as a query but turns out not to be singular
/// is a distinct, semantically meaningful failure ([`NonSingularQueryError`]) that should survive
/// `alt`'s backtracking rather than being discarded in favor of a generic "no alternative
/// matched" message; [`Error::or`] prefers it over a [`Self::Verbose`] error from a sibling
/// branch.
#[derive(Debug)]
pub(crate) enum Error<I> {
    Verbose(VerboseError<I>),
    NonSingularQuery(NonSingularQueryError),
}

impl<I> nom::error::ParseError<I> for Error<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        Self::Verbose(VerboseError::from_error_kind(input, kind))
    }

    fn append(input: I, kind: ErrorKind, other: Self) -> Self {
        match other {
            Self::Verbose(v) => Self::Verbose(VerboseError::append(input, kind, v)),
            other @ Self::NonSingularQuery(_) => other,
        }
    }

    fn or(self, other: Self) -> Self {
        match (&self, &other) {
            (Self::NonSingularQuery(_), _) => self,
            (_, Self::NonSingularQuery(_)) => other,
            _ => other,
        }
    }
}

impl<I> ContextError<I> for Error<I> {
    fn add_context(input: I, ctx: &'static str, other: Self) -> Self {
        match other {
            Self::Verbose(v) => Self::Verbose(VerboseError::add_context(input, ctx, v)),
            other @ Self::NonSingularQuery(_) => other,
        }
    }
}

impl<I, E> FromExternalError<I, E> for Error<I> {
    fn from_external_error(input: I, kind: ErrorKind, e: E) -> Self {
        Self::Verbose(VerboseError::from_external_error(input, kind, e))
    }
}

impl<I> std::fmt::Display for Error<I>
where
    I: Deref<Target = str>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Verbose(v) => std::fmt::Display::fmt(v, f),
            Self::NonSingularQuery(e) => std::fmt::Display::fmt(e, f),
        }
    }
}

type PResult<'a, O> = IResult<&'a str, O, Error<&'a str>>;

/// Locates the position in the original input a [`VerboseError`] was raised at
///
/// `nom` accumulates errors as substrings of the original input; the position of an error is
/// recovered by measuring the byte offset between the original input and the substring at which
/// the deepest error occurred.
pub(crate) trait CalculatePosition<I> {
    fn calculate_position(&self, original_input: I) -> usize;
}

impl<I> CalculatePosition<I> for VerboseError<I>
where
    I: Offset + Deref<Target = str>,
{
    fn calculate_position(&self, original_input: I) -> usize {
        self.errors
            .first()
            .map(|(substring, _)| original_input.offset(substring) + 1)
            .unwrap_or(1)
    }
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_query_segments(input: &str) -> PResult<Vec<QuerySegment>> {
    many0(parse_segment)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_root_query(input: &str) -> PResult<Query> {
    map(preceded(char('$'), parse_query_segments), |segments| Query {
        kind: QueryKind::Root,
        segments,
    })(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_current_query(input: &str) -> PResult<Query> {
    map(preceded(char('@'), parse_query_segments), |segments| Query {
        kind: QueryKind::Current,
        segments,
    })(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_query(input: &str) -> PResult<Query> {
    alt((parse_root_query, parse_current_query))(input)
}

/// Parse an entire input string as a single JSONPath query, leaving no trailing input
///
/// This only checks grammar; the resulting [`Query`] still needs to be validated against a
/// function registry, e.g. with
/// [`Environment::compile`][jsonpath_core::environment::Environment::compile].
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub fn parse_query_main(input: &str) -> PResult<Query> {
    all_consuming(parse_root_query)(input)
}

#[cfg(test)]
mod tests {
    use jsonpath_core::spec::{
        query::QueryKind,
        segment::Segment,
        selector::{name::Name, Selector},
    };

    use super::{parse_query, parse_query_main};

    #[test]
    fn root_query() {
        {
            let (_, p) = parse_query("$").unwrap();
            assert!(matches!(p.kind, QueryKind::Root));
        }
        {
            let (_, p) = parse_query("$.name").unwrap();
            assert_eq!(p.segments[0].segment.as_dot_name().unwrap(), "name");
        }
        {
            let (_, p) = parse_query("$.names['first_name']..*").unwrap();
            assert_eq!(p.segments[0].segment.as_dot_name().unwrap(), "names");
            let clh = p.segments[1].segment.as_long_hand().unwrap();
            assert!(matches!(&clh[0], Selector::Name(Name(s)) if s == "first_name"));
            assert!(matches!(p.segments[2].segment, Segment::Wildcard));
        }
    }

    #[test]
    fn current_query() {
        {
            let (_, p) = parse_query("@").unwrap();
            assert!(matches!(p.kind, QueryKind::Current));
        }
    }

    #[test]
    fn no_tail() {
        assert!(parse_query_main("$.a['b']tail").is_err());
    }
}
