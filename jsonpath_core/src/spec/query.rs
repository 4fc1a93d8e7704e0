//! Types representing queries in JSONPath
use crate::{context::EvalContext, error::Error, node::Node};

use super::segment::QuerySegment;

mod sealed {
    use crate::spec::{
        segment::{QuerySegment, Segment},
        selector::{
            filter::{Filter, SingularQuery},
            index::Index,
            name::Name,
            slice::Slice,
            Selector,
        },
    };

    use super::Query;

    pub trait Sealed {}
    impl Sealed for Query {}
    impl Sealed for QuerySegment {}
    impl Sealed for Segment {}
    impl Sealed for Slice {}
    impl Sealed for Name {}
    impl Sealed for Selector {}
    impl Sealed for Index {}
    impl Sealed for Filter {}
    impl Sealed for SingularQuery {}
}

/// A type that is query-able
///
/// Every implementor takes the current node (carrying its own location) and the recursion depth
/// accumulated so far, and produces a list of located [`Node`]s or an [`Error::Recursion`] if a
/// descendant segment pushed `depth` past the configured limit.
pub trait Queryable: sealed::Sealed {
    /// Query `self` using the current node and the depth of recursion so far
    fn query<'b>(&self, ctx: &EvalContext, current: &Node<'b>, depth: usize) -> Result<Vec<Node<'b>>, Error>;
}

/// Represents a JSONPath expression
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Query {
    /// The kind of query, root (`$`), or current (`@`)
    pub kind: QueryKind,
    /// The segments constituting the query
    pub segments: Vec<QuerySegment>,
}

impl Query {
    /// Whether this query is guaranteed to select at most one node
    ///
    /// A query is singular if it contains no descendant segment and every segment's selector is
    /// itself singular (a name or index selector; never a wildcard, slice, filter, or a segment
    /// with more than one selector).
    pub fn is_singular(&self) -> bool {
        for s in &self.segments {
            if s.is_descendent() {
                return false;
            }
            if !s.segment.is_singular() {
                return false;
            }
        }
        true
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            QueryKind::Root => write!(f, "$")?,
            QueryKind::Current => write!(f, "@")?,
        }
        for s in &self.segments {
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

/// The kind of query
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub enum QueryKind {
    /// A query against the root of a JSON object, i.e., with `$`
    #[default]
    Root,
    /// A query against the current node within a JSON object, i.e., with `@`
    Current,
}

impl Queryable for Query {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Main Query", level = "trace", parent = None, ret))]
    fn query<'b>(&self, ctx: &EvalContext, current: &Node<'b>, depth: usize) -> Result<Vec<Node<'b>>, Error> {
        let root = current.root();
        let mut query = match self.kind {
            QueryKind::Root => vec![Node::root_node(root)],
            QueryKind::Current => vec![current.clone()],
        };
        for segment in &self.segments {
            let mut new_query = Vec::new();
            for q in &query {
                new_query.append(&mut segment.query(ctx, q, depth)?);
            }
            query = new_query;
        }
        Ok(query)
    }
}
