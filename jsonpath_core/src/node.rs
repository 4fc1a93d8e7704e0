//! Types representing query results: nodes, node lists, and normalized paths
use std::slice::Iter;

use serde::Serialize;
use serde_json::Value;

use crate::path::{NormalizedPath, PathElement};

/// A node produced by a JSONPath query
///
/// A node always carries its value, its location within the document it was queried from (as a
/// [`NormalizedPath`]), and a reference back to that document's root. Unlike APIs that offer a
/// value-only result alongside a separately-computed located result, every node here is located;
/// the location is cheap to carry (a `Vec` of borrowed path elements) and carrying it
/// unconditionally avoids two parallel result types that must be kept in sync.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    pub(crate) value: &'a Value,
    pub(crate) location: NormalizedPath<'a>,
    pub(crate) root: &'a Value,
}

impl<'a> Node<'a> {
    pub(crate) fn new(value: &'a Value, location: NormalizedPath<'a>, root: &'a Value) -> Self {
        Self {
            value,
            location,
            root,
        }
    }

    pub(crate) fn root_node(root: &'a Value) -> Self {
        Self {
            value: root,
            location: NormalizedPath::default(),
            root,
        }
    }

    /// The JSON value at this node
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// The location of this node within its document
    pub fn location(&self) -> &NormalizedPath<'a> {
        &self.location
    }

    /// The root of the document this node was produced from
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// The normalized path string for this node's location, e.g. `$['foo'][0]`
    pub fn path(&self) -> String {
        self.location.to_string()
    }

    pub(crate) fn clone_and_push<T: Into<PathElement<'a>>>(&self, child: &'a Value, elem: T) -> Self {
        Self {
            value: child,
            location: self.location.clone_and_push(elem),
            root: self.root,
        }
    }
}

impl<'a> PartialEq for Node<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.location == other.location
    }
}

impl<'a> Eq for Node<'a> {}

/// A list of nodes resulting from a JSONPath query
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NodeList<'a>(pub(crate) Vec<Node<'a>>);

impl<'a> NodeList<'a> {
    pub(crate) fn empty() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn values_only(values: Vec<&'a Value>, root: &'a Value) -> Self {
        Self(
            values
                .into_iter()
                .map(|v| Node::new(v, NormalizedPath::default(), root))
                .collect(),
        )
    }

    /// Extract _at most_ one node from a [`NodeList`]
    pub fn at_most_one(&self) -> Result<Option<Node<'a>>, AtMostOneError> {
        match self.0.len() {
            0 => Ok(None),
            1 => Ok(self.0.first().cloned()),
            n => Err(AtMostOneError(n)),
        }
    }

    /// Extract _exactly_ one node from a [`NodeList`]
    pub fn exactly_one(&self) -> Result<Node<'a>, ExactlyOneError> {
        match self.0.len() {
            0 => Err(ExactlyOneError::Empty),
            1 => Ok(self.0.first().unwrap().clone()),
            n => Err(ExactlyOneError::MoreThanOne(n)),
        }
    }

    /// Extract all nodes yielded by the query
    pub fn all(self) -> Vec<Node<'a>> {
        self.0
    }

    /// Extract the values of all nodes yielded by the query
    pub fn values(&self) -> Vec<&'a Value> {
        self.0.iter().map(|n| n.value).collect()
    }

    /// Get the length of a [`NodeList`]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if a [`NodeList`] is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get an iterator over a [`NodeList`]
    pub fn iter(&self) -> Iter<'_, Node<'a>> {
        self.0.iter()
    }

    /// Returns the first node in the [`NodeList`], or `None` if it is empty
    pub fn first(&self) -> Option<Node<'a>> {
        self.0.first().cloned()
    }

    /// Returns the last node in the [`NodeList`], or `None` if it is empty
    pub fn last(&self) -> Option<Node<'a>> {
        self.0.last().cloned()
    }

    /// Returns the node at the given index, or `None` if the index is out of bounds
    pub fn get(&self, index: usize) -> Option<Node<'a>> {
        self.0.get(index).cloned()
    }
}

impl<'a> From<Vec<Node<'a>>> for NodeList<'a> {
    fn from(nodes: Vec<Node<'a>>) -> Self {
        Self(nodes)
    }
}

impl<'a> IntoIterator for NodeList<'a> {
    type Item = Node<'a>;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> Serialize for NodeList<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde::Serialize::serialize(&self.values(), serializer)
    }
}

/// Error produced when expecting no more than one node from a query
#[derive(Debug, thiserror::Error)]
#[error("nodelist expected to contain at most one entry, but instead contains {0} entries")]
pub struct AtMostOneError(pub usize);

/// Error produced when expecting exactly one node from a query
#[derive(Debug, thiserror::Error)]
pub enum ExactlyOneError {
    /// The query resulted in an empty [`NodeList`]
    #[error("nodelist expected to contain one entry, but is empty")]
    Empty,
    /// The query resulted in a [`NodeList`] containing more than one node
    #[error("nodelist expected to contain one entry, but instead contains {0} entries")]
    MoreThanOne(usize),
}

impl ExactlyOneError {
    /// Check that it is the `Empty` variant
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Check that it is the `MoreThanOne` variant
    pub fn is_more_than_one(&self) -> bool {
        self.as_more_than_one().is_some()
    }

    /// Extract the number of nodes, if it was more than one, or `None` otherwise
    pub fn as_more_than_one(&self) -> Option<usize> {
        match self {
            ExactlyOneError::Empty => None,
            ExactlyOneError::MoreThanOne(u) => Some(*u),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Node, NodeList};
    use crate::path::NormalizedPath;
    use serde_json::json;

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<NodeList<'static>>();
    }

    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<NodeList<'static>>();
    }

    #[test]
    fn node_path_round_trips_through_location() {
        let root = json!({"foo": [1, 2, 3]});
        let mut loc = NormalizedPath::default();
        loc.push("foo");
        loc.push(1usize);
        let node = Node::new(&root["foo"][1], loc, &root);
        assert_eq!(node.path(), "$['foo'][1]");
        assert_eq!(node.value(), &json!(2));
    }
}
