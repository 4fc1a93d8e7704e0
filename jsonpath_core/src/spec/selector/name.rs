//! Name selector for selecting object keys in JSONPath
use crate::{context::EvalContext, error::Error, node::Node, spec::query::Queryable};

/// Select a single JSON object key
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Name(pub String);

impl Name {
    /// Get as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{name}'", name = self.0)
    }
}

impl Queryable for Name {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Name", level = "trace", parent = None, ret))]
    fn query<'b>(&self, _ctx: &EvalContext, current: &Node<'b>, _depth: usize) -> Result<Vec<Node<'b>>, Error> {
        Ok(current
            .value()
            .as_object()
            .and_then(|o| o.get_key_value(&self.0))
            .map(|(k, v)| vec![current.clone_and_push(v, k)])
            .unwrap_or_default())
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
