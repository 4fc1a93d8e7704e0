//! Index selectors in JSONPath
use crate::{context::EvalContext, error::Error, node::Node, spec::query::Queryable};

/// For selecting array elements by their index
///
/// Can use negative indices to index from the end of an array
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Index(pub isize);

impl std::fmt::Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{index}", index = self.0)
    }
}

impl Queryable for Index {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Index", level = "trace", parent = None, ret))]
    fn query<'b>(&self, _ctx: &EvalContext, current: &Node<'b>, _depth: usize) -> Result<Vec<Node<'b>>, Error> {
        let Some(list) = current.value().as_array() else {
            return Ok(vec![]);
        };
        let index = if self.0 < 0 {
            self.0
                .checked_abs()
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| list.len().checked_sub(i))
        } else {
            usize::try_from(self.0).ok()
        };
        Ok(index
            .and_then(|i| list.get(i).map(|v| (i, v)))
            .map(|(i, v)| vec![current.clone_and_push(v, i)])
            .unwrap_or_default())
    }
}

impl From<isize> for Index {
    fn from(i: isize) -> Self {
        Self(i)
    }
}
