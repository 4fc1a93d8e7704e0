//! Types representing the different selectors in JSONPath
pub mod filter;
pub mod index;
pub mod name;
pub mod slice;

use crate::{context::EvalContext, error::Error, node::Node};

use self::{filter::Filter, index::Index, name::Name, slice::Slice};

use super::query::Queryable;

/// A JSONPath selector
#[derive(Debug, PartialEq, Clone)]
pub enum Selector {
    /// Select an object key
    Name(Name),
    /// Select all nodes
    ///
    /// For an object, this produces a nodelist of all member values; for an array, this produces a
    /// nodelist of all array elements.
    Wildcard,
    /// Select an array element
    Index(Index),
    /// Select a slice from an array
    ArraySlice(Slice),
    /// Use a filter to select nodes
    Filter(Filter),
}

impl Selector {
    /// Will the selector select at most only a single node
    pub fn is_singular(&self) -> bool {
        matches!(self, Selector::Name(_) | Selector::Index(_))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Name(name) => write!(f, "{name}"),
            Selector::Wildcard => write!(f, "*"),
            Selector::Index(index) => write!(f, "{index}"),
            Selector::ArraySlice(slice) => write!(f, "{slice}"),
            Selector::Filter(filter) => write!(f, "?{filter}"),
        }
    }
}

impl Queryable for Selector {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Selector", level = "trace", parent = None, ret))]
    fn query<'b>(&self, ctx: &EvalContext, current: &Node<'b>, depth: usize) -> Result<Vec<Node<'b>>, Error> {
        match self {
            Selector::Name(name) => name.query(ctx, current, depth),
            Selector::Wildcard => {
                let mut query = Vec::new();
                if let Some(list) = current.value().as_array() {
                    for (i, v) in list.iter().enumerate() {
                        query.push(current.clone_and_push(v, i));
                    }
                } else if let Some(obj) = current.value().as_object() {
                    let mut entries: Vec<_> = obj.iter().collect();
                    ctx.shuffle(&mut entries);
                    for (k, v) in entries {
                        query.push(current.clone_and_push(v, k));
                    }
                }
                Ok(query)
            }
            Selector::Index(index) => index.query(ctx, current, depth),
            Selector::ArraySlice(slice) => slice.query(ctx, current, depth),
            Selector::Filter(filter) => filter.query(ctx, current, depth),
        }
    }
}
