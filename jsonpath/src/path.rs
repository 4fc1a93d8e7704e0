use std::str::FromStr;

use jsonpath_core::{
    environment::{CompiledQuery, DEFAULT_ENVIRONMENT},
    node::{Node, NodeList},
};
use serde::{de::Visitor, Deserialize, Serialize};
use serde_json::Value;

use crate::{parser::parse_query_main, ParseError};

/// A parsed JSON Path query string
///
/// This type represents a valid, parsed JSON Path query string, compiled and validated against
/// the default [`Environment`][jsonpath_core::environment::Environment]. Please refer to
/// [RFC 9535][rfc] for the details on what constitutes a valid JSON Path query.
///
/// # Usage
///
/// A `JsonPath` can be parsed directly from an `&str` using the [`parse`][JsonPath::parse] method:
/// ```rust
/// # use jsonpath::JsonPath;
/// # fn main() {
/// let path = JsonPath::parse("$.foo.*").expect("valid JSON Path");
/// # }
/// ```
/// It can then be used to query [`serde_json::Value`]'s with the [`query`][JsonPath::query] method:
/// ```rust
/// # use serde_json::json;
/// # use jsonpath::JsonPath;
/// # fn main() {
/// # let path = JsonPath::parse("$.foo.*").expect("valid JSON Path");
/// let value = json!({"foo": [1, 2, 3, 4]});
/// let nodes = path.query(&value).expect("evaluates");
/// assert_eq!(nodes.values(), vec![1, 2, 3, 4]);
/// # }
/// ```
///
/// [rfc]: https://www.rfc-editor.org/rfc/rfc9535.html
#[derive(Debug, PartialEq, Clone)]
pub struct JsonPath(CompiledQuery<'static>);

impl JsonPath {
    /// Create a [`JsonPath`] by parsing a valid JSON Path query string
    ///
    /// Parsing includes validating every function call the query contains against the default
    /// environment's function registry.
    ///
    /// # Example
    /// ```rust
    /// # use jsonpath::JsonPath;
    /// # fn main() {
    /// let path = JsonPath::parse("$.foo[1:10:2].baz").expect("valid JSON Path");
    /// # }
    /// ```
    pub fn parse(path_str: &str) -> Result<Self, ParseError> {
        let (_, query) = parse_query_main(path_str).map_err(|err| match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => (path_str, e),
            nom::Err::Incomplete(_) => unreachable!("we do not use streaming parsers"),
        })?;
        let compiled = DEFAULT_ENVIRONMENT.compile(query)?;
        Ok(Self(compiled))
    }

    /// Query a [`serde_json::Value`] using this [`JsonPath`]
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use jsonpath::JsonPath;
    /// # fn main() -> Result<(), jsonpath::ParseError> {
    /// let path = JsonPath::parse("$.foo[::2]")?;
    /// let value = json!({"foo": [1, 2, 3, 4]});
    /// let nodes = path.query(&value).expect("evaluates");
    /// assert_eq!(nodes.values(), vec![1, 3]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn query<'b>(&self, value: &'b Value) -> Result<NodeList<'b>, ParseError> {
        Ok(self.0.find(value)?)
    }

    /// Query a [`serde_json::Value`] using this [`JsonPath`], returning at most one node
    ///
    /// Returns an error if the query yields more than one node; prefer this over
    /// [`JsonPath::query`] when [`JsonPath::singular_query`] is known to hold.
    pub fn find_one<'b>(&self, value: &'b Value) -> Result<Option<Node<'b>>, ParseError> {
        Ok(self.0.find_one(value)?)
    }

    /// Query a [`serde_json::Value`] using this [`JsonPath`], returning an iterator over the
    /// resulting nodes
    pub fn iter<'b>(&self, value: &'b Value) -> Result<std::vec::IntoIter<Node<'b>>, ParseError> {
        Ok(self.0.iter(value)?)
    }

    /// Whether querying `value` with this [`JsonPath`] would yield no nodes
    pub fn empty(&self, value: &Value) -> Result<bool, ParseError> {
        Ok(self.0.empty(value)?)
    }

    /// Whether this query is guaranteed to select at most one node
    pub fn singular_query(&self) -> bool {
        self.0.singular_query()
    }
}

impl FromStr for JsonPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPath::parse(s)
    }
}

impl std::fmt::Display for JsonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{path}", path = self.0.query())
    }
}

impl Serialize for JsonPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct JsonPathVisitor;

        impl<'de> Visitor<'de> for JsonPathVisitor {
            type Value = JsonPath;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "a string representing a JSON Path query")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                JsonPath::parse(v).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(JsonPathVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{from_value, json, to_value};

    use crate::JsonPath;

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<JsonPath>();
    }

    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<JsonPath>();
    }

    #[test]
    fn serde_round_trip() {
        let j1 = json!("$.foo['bar'][1:10][?@.baz > 10 && @.foo.bar < 20]");
        let p1 = from_value::<JsonPath>(j1).expect("deserializes");
        let p2 = to_value(&p1)
            .and_then(from_value::<JsonPath>)
            .expect("round trip");
        assert_eq!(p1, p2);
    }
}
