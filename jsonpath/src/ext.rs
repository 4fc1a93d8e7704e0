use serde_json::Value;

use crate::{JsonPath, Node, NodeList, ParseError};

/// Extension trait that allows for JSONPath queries directly on [`serde_json::Value`]
///
/// ## Usage
/// ```rust
/// use serde_json::json;
/// use jsonpath::{JsonPath, JsonPathExt};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let value = json!({"foo": ["bar", "baz"]});
/// let query = JsonPath::parse("$.foo[*]")?;
/// let nodes = value.json_path(&query)?;
/// assert_eq!(nodes.values(), vec!["bar", "baz"]);
/// # Ok(())
/// # }
/// ```
pub trait JsonPathExt {
    /// Query a [`serde_json::Value`] with a JSONPath query string
    fn json_path(&self, path: &JsonPath) -> Result<NodeList<'_>, ParseError>;

    /// Query a [`serde_json::Value`] with a JSONPath query string, returning at most one node
    fn json_path_one(&self, path: &JsonPath) -> Result<Option<Node<'_>>, ParseError>;

    /// Query a [`serde_json::Value`] with a JSONPath query string, returning an iterator over the
    /// resulting nodes
    fn json_path_iter(&self, path: &JsonPath) -> Result<std::vec::IntoIter<Node<'_>>, ParseError>;

    /// Whether a JSONPath query string would yield no nodes against this [`serde_json::Value`]
    fn json_path_empty(&self, path: &JsonPath) -> Result<bool, ParseError>;
}

impl JsonPathExt for Value {
    fn json_path(&self, path: &JsonPath) -> Result<NodeList<'_>, ParseError> {
        path.query(self)
    }

    fn json_path_one(&self, path: &JsonPath) -> Result<Option<Node<'_>>, ParseError> {
        path.find_one(self)
    }

    fn json_path_iter(&self, path: &JsonPath) -> Result<std::vec::IntoIter<Node<'_>>, ParseError> {
        path.iter(self)
    }

    fn json_path_empty(&self, path: &JsonPath) -> Result<bool, ParseError> {
        path.empty(self)
    }
}
