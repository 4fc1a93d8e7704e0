//! The environment a query is compiled and evaluated against
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::{
    context::EvalContext,
    error::Error,
    node::{Node, NodeList},
    registry::FunctionRegistry,
    spec::{
        functions::{JsonPathType, JsonPathTypeKind},
        query::{Query, Queryable},
    },
    validate::validate_query,
};

/// The recursion-depth limit a new [`Environment`] enforces against descendant segments, absent
/// an explicit call to [`Environment::with_max_recursion_depth`]
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 100;

/// Holds the function registry and evaluation policy a query is compiled and run against
///
/// An `Environment` starts out seeded with the five function extensions the specification
/// defines (`length`, `count`, `match`, `search`, and `value`), and can be customized with
/// [`Environment::register_function`], [`Environment::with_max_recursion_depth`], and
/// [`Environment::with_nondeterministic`] before any query is compiled against it with
/// [`Environment::compile`].
#[derive(Debug, Clone)]
pub struct Environment {
    registry: FunctionRegistry,
    max_recursion_depth: usize,
    nondeterministic: bool,
    seed: Option<u64>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// A new environment seeded with the specification's built-in functions
    pub fn new() -> Self {
        Self {
            registry: FunctionRegistry::with_builtins(),
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            nondeterministic: false,
            seed: None,
        }
    }

    /// Register a custom function extension, overwriting any existing registration (including a
    /// built-in) under the same name
    pub fn register_function<F>(
        &mut self,
        name: impl Into<String>,
        arg_kinds: Vec<JsonPathTypeKind>,
        return_kind: JsonPathTypeKind,
        implementation: F,
    ) -> &mut Self
    where
        F: for<'a> Fn(Vec<JsonPathType<'a>>) -> JsonPathType<'a> + Send + Sync + 'static,
    {
        self.registry
            .register(name, arg_kinds, return_kind, implementation);
        self
    }

    /// Set the recursion-depth limit enforced against descendant segments
    pub fn with_max_recursion_depth(mut self, max_recursion_depth: usize) -> Self {
        self.max_recursion_depth = max_recursion_depth;
        self
    }

    /// Enable or disable nondeterministic evaluation, which shuffles the order object members are
    /// visited in (the specification explicitly permits, but does not require, this)
    pub fn with_nondeterministic(mut self, nondeterministic: bool) -> Self {
        self.nondeterministic = nondeterministic;
        self
    }

    /// Seed the random order used by nondeterministic evaluation, making it reproducible
    ///
    /// Without an explicit seed, nondeterministic mode draws its randomness from entropy. Tests
    /// that opt into nondeterministic evaluation should call this so their shuffled order is
    /// reproducible across runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate a parsed query against this environment's function registry, resolving every
    /// function call's return type, and wrap it as a [`CompiledQuery`] ready to evaluate
    pub fn compile(&self, mut query: Query) -> Result<CompiledQuery<'_>, Error> {
        validate_query(&mut query, &self.registry)?;
        Ok(CompiledQuery { query, env: self })
    }

    /// Evaluate an already-validated query against `value`
    pub fn find<'v>(&self, query: &Query, value: &'v Value) -> Result<NodeList<'v>, Error> {
        let ctx = EvalContext::new(
            &self.registry,
            self.max_recursion_depth,
            self.nondeterministic,
            self.seed,
        );
        let current = Node::root_node(value);
        let nodes = query.query(&ctx, &current, 0)?;
        Ok(nodes.into())
    }

    /// Evaluate an already-validated query against `value`, returning at most one node
    ///
    /// Returns an error if `query` yields more than one node; prefer this over [`Environment::find`]
    /// when [`Query::is_singular`] is known to hold.
    pub fn find_one<'v>(
        &self,
        query: &Query,
        value: &'v Value,
    ) -> Result<Option<Node<'v>>, Error> {
        let nodes = self.find(query, value)?;
        Ok(nodes.at_most_one()?)
    }
}

/// The default, global environment: the specification's built-in functions, deterministic
/// evaluation, and [`DEFAULT_MAX_RECURSION_DEPTH`]
///
/// Used by queries that were not compiled against a caller-supplied [`Environment`].
pub static DEFAULT_ENVIRONMENT: Lazy<Environment> = Lazy::new(Environment::new);

/// A [`Query`] that has been validated against an [`Environment`]'s function registry
///
/// Every function call reachable from the query has had its arity and argument types checked,
/// and its return type resolved, during [`Environment::compile`]. The query is now ready to
/// evaluate with [`CompiledQuery::find`].
#[derive(Debug, Clone)]
pub struct CompiledQuery<'env> {
    query: Query,
    env: &'env Environment,
}

impl<'env> PartialEq for CompiledQuery<'env> {
    fn eq(&self, other: &Self) -> bool {
        self.query == other.query
    }
}

impl<'env> std::fmt::Display for CompiledQuery<'env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.query)
    }
}

impl<'env> CompiledQuery<'env> {
    /// The validated query this wraps
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Evaluate the compiled query against `value`
    pub fn find<'v>(&self, value: &'v Value) -> Result<NodeList<'v>, Error> {
        self.env.find(&self.query, value)
    }

    /// Evaluate the compiled query against `value`, returning at most one node
    ///
    /// Returns an error if the query yields more than one node.
    pub fn find_one<'v>(&self, value: &'v Value) -> Result<Option<Node<'v>>, Error> {
        self.env.find_one(&self.query, value)
    }

    /// Evaluate the compiled query against `value`, returning an iterator over the resulting nodes
    pub fn iter<'v>(&self, value: &'v Value) -> Result<std::vec::IntoIter<Node<'v>>, Error> {
        Ok(self.find(value)?.into_iter())
    }

    /// Whether evaluating the compiled query against `value` would yield no nodes
    pub fn empty(&self, value: &Value) -> Result<bool, Error> {
        Ok(self.find(value)?.is_empty())
    }

    /// Whether this query is guaranteed to select at most one node
    ///
    /// See [`Query::is_singular`].
    pub fn singular_query(&self) -> bool {
        self.query.is_singular()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compiles_and_finds_with_builtins() {
        let env = Environment::new();
        let query = crate::spec::query::Query::default();
        let compiled = env.compile(query).unwrap();
        let value = json!({"a": 1});
        let nodes = compiled.find(&value).unwrap();
        assert_eq!(nodes.values(), vec![&value]);
    }

    #[test]
    fn rejects_unknown_function() {
        use crate::spec::{
            functions::{FunctionExpr, JsonPathTypeKind},
            segment::{QuerySegment, QuerySegmentKind, Segment},
            selector::{filter::{BasicExpr, Filter, LogicalAndExpr, LogicalOrExpr}, Selector},
        };

        let query = Query {
            kind: crate::spec::query::QueryKind::Root,
            segments: vec![QuerySegment {
                kind: QuerySegmentKind::Child,
                segment: Segment::LongHand(vec![Selector::Filter(Filter(LogicalOrExpr(vec![
                    LogicalAndExpr(vec![BasicExpr::FuncExpr(FunctionExpr {
                        name: "nope".to_owned(),
                        args: vec![],
                        return_type: JsonPathTypeKind::Nothing,
                    })]),
                ])))]),
            }],
        };
        let env = Environment::new();
        assert!(matches!(env.compile(query), Err(Error::Name(_))));
    }

    #[test]
    fn singular_query_contract() {
        let env = Environment::new();
        let query = crate::spec::query::Query::default();
        let compiled = env.compile(query).unwrap();
        assert!(compiled.singular_query());
        let value = json!({"a": 1});
        assert_eq!(compiled.find(&value).unwrap().len(), 1);
        assert!(compiled.find_one(&value).unwrap().is_some());
        assert_eq!(compiled.iter(&value).unwrap().count(), 1);
        assert!(!compiled.empty(&value).unwrap());
    }
}
