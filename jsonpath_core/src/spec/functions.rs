//! Function Extensions in JSONPath
//!
//! Function Extensions in JSONPath serve as a way to extend the capability of queries in a way
//! that the standard query syntax can not support. There are various functions included in
//! JSONPath, all of which conform to a specified type system.
//!
//! # The JSONPath Type System
//!
//! The type system used in JSONPath function extensions is comprised of three types: [`NodesType`],
//! [`ValueType`], and [`LogicalType`]. A function's actual argument and return types are declared
//! against [`JsonPathTypeKind`], and checked for well-typedness once, up front, by
//! [`crate::environment::Environment::compile`] rather than while parsing. The built-in functions
//! (`length`, `count`, `match`, `search`, `value`) and any caller-registered ones are resolved by
//! name from the [`crate::registry::FunctionRegistry`] threaded through evaluation in
//! [`crate::context::EvalContext`]; this type only holds the parsed name, arguments, and declared
//! return kind.
use std::collections::VecDeque;

use serde_json::Value;

use crate::{
    context::EvalContext,
    error::Error,
    node::{Node, NodeList},
};

use super::{
    query::{Query, Queryable},
    selector::filter::{Literal, LogicalOrExpr, SingularQuery, TestFilter},
};

/// JSONPath type representing a Nodelist
///
/// This is a thin wrapper around a [`NodeList`], and generally represents the result of a
/// JSONPath query. It may also be produced by a function.
#[derive(Debug)]
pub struct NodesType<'a>(NodeList<'a>);

impl<'a> NodesType<'a> {
    #[doc(hidden)]
    pub const fn type_kind() -> JsonPathTypeKind {
        JsonPathTypeKind::Nodelist
    }

    /// Extract the inner [`NodeList`]
    pub fn into_inner(self) -> NodeList<'a> {
        self.0
    }
}

impl<'a> From<NodeList<'a>> for NodesType<'a> {
    fn from(value: NodeList<'a>) -> Self {
        Self(value)
    }
}

impl<'a> TryFrom<JsonPathType<'a>> for NodesType<'a> {
    type Error = FunctionValidationError;

    fn try_from(value: JsonPathType<'a>) -> Result<Self, Self::Error> {
        match value {
            JsonPathType::Nodes(nl) => Ok(nl.into()),
            JsonPathType::Node(n) => Ok(Self(NodeList::values_only(vec![n], n))),
            JsonPathType::Nothing => Ok(Self(NodeList::empty())),
            other => Err(FunctionValidationError::MismatchTypeKind {
                expected: JsonPathTypeKind::Nodelist,
                received: other.as_kind(),
                position: 0,
            }),
        }
    }
}

/// JSONPath type representing `LogicalTrue` or `LogicalFalse`
#[derive(Debug, Default)]
pub enum LogicalType {
    /// True
    True,
    /// False
    #[default]
    False,
}

impl LogicalType {
    #[doc(hidden)]
    pub const fn type_kind() -> JsonPathTypeKind {
        JsonPathTypeKind::Logical
    }
}

impl<'a> From<JsonPathType<'a>> for LogicalType {
    fn from(value: JsonPathType<'a>) -> Self {
        match value {
            JsonPathType::Nodes(nl) => (!nl.is_empty()).into(),
            JsonPathType::Value(_) => Self::True,
            JsonPathType::Logical(l) => l,
            JsonPathType::Node(_) => Self::True,
            JsonPathType::Nothing => Self::False,
        }
    }
}

impl From<LogicalType> for bool {
    fn from(value: LogicalType) -> Self {
        matches!(value, LogicalType::True)
    }
}

impl From<bool> for LogicalType {
    fn from(value: bool) -> Self {
        match value {
            true => Self::True,
            false => Self::False,
        }
    }
}

/// JSONPath type representing a JSON value or Nothing
#[derive(Debug)]
pub enum ValueType<'a> {
    /// This may come from a literal value declared in a JSONPath query, or be produced by a
    /// function.
    Value(Value),
    /// This would be a reference to a location in the JSON object being queried, i.e., the result
    /// of a singular query, or produced by a function.
    Node(&'a Value),
    /// This would be the result of a singular query that does not result in any nodes, or be
    /// produced by a function.
    Nothing,
}

impl<'a> ValueType<'a> {
    #[doc(hidden)]
    pub const fn type_kind() -> JsonPathTypeKind {
        JsonPathTypeKind::Value
    }

    /// Convert to a reference of a [`serde_json::Value`] if possible
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ValueType::Value(v) => Some(v),
            ValueType::Node(v) => Some(v),
            ValueType::Nothing => None,
        }
    }

    /// Check if this `ValueType` is nothing
    pub fn is_nothing(&self) -> bool {
        matches!(self, ValueType::Nothing)
    }
}

impl<'a> TryFrom<JsonPathType<'a>> for ValueType<'a> {
    type Error = FunctionValidationError;

    fn try_from(value: JsonPathType<'a>) -> Result<Self, Self::Error> {
        match value {
            JsonPathType::Value(v) => Ok(Self::Value(v)),
            JsonPathType::Node(n) => Ok(Self::Node(n)),
            JsonPathType::Nothing => Ok(Self::Nothing),
            other => Err(FunctionValidationError::MismatchTypeKind {
                expected: JsonPathTypeKind::Value,
                received: other.as_kind(),
                position: 0,
            }),
        }
    }
}

impl<'a, T> From<T> for ValueType<'a>
where
    T: Into<Value>,
{
    fn from(value: T) -> Self {
        Self::Value(value.into())
    }
}

/// A dynamically-typed value flowing through function-extension evaluation
///
/// This is the runtime counterpart of [`JsonPathTypeKind`]; every function argument and result
/// takes this shape before being narrowed to [`NodesType`], [`ValueType`], or [`LogicalType`].
#[derive(Debug)]
pub enum JsonPathType<'a> {
    /// A nodelist
    Nodes(NodeList<'a>),
    /// A logical value
    Logical(LogicalType),
    /// A single node's value
    Node(&'a Value),
    /// An owned JSON value, e.g. from a literal or a function result
    Value(Value),
    /// No value at all
    Nothing,
}

impl<'a> JsonPathType<'a> {
    /// The [`JsonPathTypeKind`] this value carries
    pub fn as_kind(&self) -> JsonPathTypeKind {
        match self {
            JsonPathType::Nodes(_) => JsonPathTypeKind::Nodelist,
            JsonPathType::Value(_) => JsonPathTypeKind::Value,
            JsonPathType::Logical(_) => JsonPathTypeKind::Logical,
            JsonPathType::Node(_) => JsonPathTypeKind::Node,
            JsonPathType::Nothing => JsonPathTypeKind::Nothing,
        }
    }
}

impl<'a> From<NodesType<'a>> for JsonPathType<'a> {
    fn from(value: NodesType<'a>) -> Self {
        Self::Nodes(value.0)
    }
}

impl<'a> From<ValueType<'a>> for JsonPathType<'a> {
    fn from(value: ValueType<'a>) -> Self {
        match value {
            ValueType::Value(v) => Self::Value(v),
            ValueType::Node(n) => Self::Node(n),
            ValueType::Nothing => Self::Nothing,
        }
    }
}

impl<'a> From<LogicalType> for JsonPathType<'a> {
    fn from(value: LogicalType) -> Self {
        Self::Logical(value)
    }
}

/// The kind of a [`JsonPathType`], used to check well-typedness of function calls
#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonPathTypeKind {
    /// See [`NodesType`]
    Nodelist,
    /// A single node, as produced by a singular query
    Node,
    /// See [`ValueType`]
    Value,
    /// See [`LogicalType`]
    Logical,
    /// The absence of a value
    Nothing,
}

impl JsonPathTypeKind {
    /// Is a value of `self`'s kind usable where `other` is expected
    pub fn converts_to(&self, other: Self) -> bool {
        matches!(
            (self, other),
            (
                JsonPathTypeKind::Nodelist,
                JsonPathTypeKind::Nodelist | JsonPathTypeKind::Logical
            ) | (
                JsonPathTypeKind::Node,
                JsonPathTypeKind::Nodelist
                    | JsonPathTypeKind::Node
                    | JsonPathTypeKind::Value
                    | JsonPathTypeKind::Logical
            ) | (
                JsonPathTypeKind::Value,
                JsonPathTypeKind::Node | JsonPathTypeKind::Value
            ) | (JsonPathTypeKind::Logical, JsonPathTypeKind::Logical)
                | (
                    JsonPathTypeKind::Nothing,
                    JsonPathTypeKind::Value | JsonPathTypeKind::Node | JsonPathTypeKind::Logical
                )
        )
    }
}

impl std::fmt::Display for JsonPathTypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonPathTypeKind::Nodelist => write!(f, "NodesType"),
            JsonPathTypeKind::Logical => write!(f, "LogicalType"),
            JsonPathTypeKind::Node => write!(f, "ValueType"),
            JsonPathTypeKind::Value => write!(f, "ValueType"),
            JsonPathTypeKind::Nothing => write!(f, "ValueType"),
        }
    }
}

/// A parsed function call, e.g. `length(@.foo)`
///
/// Parsing never checks that `name` is defined or that `args` are well-typed; that happens once,
/// for the whole query, in [`crate::environment::Environment::compile`]. `return_type` is filled
/// in by that same validation pass and is only ever [`JsonPathTypeKind::Nothing`] prior to it.
#[doc(hidden)]
#[derive(Debug, PartialEq, Clone)]
pub struct FunctionExpr {
    /// The function's name
    pub name: String,
    /// The function's arguments, as parsed
    pub args: Vec<FunctionExprArg>,
    /// The function's declared return kind, filled in by validation
    pub return_type: JsonPathTypeKind,
}

impl FunctionExpr {
    #[cfg_attr(
        feature = "trace",
        tracing::instrument(name = "Evaluate Function Expr", level = "trace", parent = None, ret)
    )]
    pub(crate) fn evaluate<'a, 'b: 'a>(
        &'a self,
        ctx: &EvalContext,
        current: &Node<'b>,
        depth: usize,
    ) -> Result<JsonPathType<'b>, Error> {
        let mut args: VecDeque<JsonPathType> = VecDeque::with_capacity(self.args.len());
        for arg in &self.args {
            args.push_back(arg.evaluate(ctx, current, depth)?);
        }
        let signature = ctx
            .registry
            .get(&self.name)
            .ok_or_else(|| Error::Name(self.name.clone()))?;
        Ok((signature.implementation)(args.into_iter().collect()))
    }
}

impl std::fmt::Display for FunctionExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{name}(", name = self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            write!(
                f,
                "{arg}{comma}",
                comma = if i == self.args.len() - 1 { "" } else { "," }
            )?;
        }
        write!(f, ")")
    }
}

/// An argument to a [`FunctionExpr`]
#[doc(hidden)]
#[derive(Debug, PartialEq, Clone)]
pub enum FunctionExprArg {
    /// A literal value
    Literal(Literal),
    /// A singular query, e.g. `@.foo` or `$.foo[0]`
    SingularQuery(SingularQuery),
    /// A query that may produce any number of nodes, e.g. `@.*`
    FilterQuery(Query),
    /// A nested logical expression
    LogicalExpr(LogicalOrExpr),
    /// A nested function call
    FunctionExpr(FunctionExpr),
}

impl std::fmt::Display for FunctionExprArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionExprArg::Literal(lit) => write!(f, "{lit}"),
            FunctionExprArg::FilterQuery(query) => write!(f, "{query}"),
            FunctionExprArg::SingularQuery(sq) => write!(f, "{sq}"),
            FunctionExprArg::LogicalExpr(log) => write!(f, "{log}"),
            FunctionExprArg::FunctionExpr(func) => write!(f, "{func}"),
        }
    }
}

impl FunctionExprArg {
    #[cfg_attr(
        feature = "trace",
        tracing::instrument(name = "Evaluate Function Arg", level = "trace", parent = None, ret)
    )]
    fn evaluate<'a, 'b: 'a>(
        &'a self,
        ctx: &EvalContext,
        current: &Node<'b>,
        depth: usize,
    ) -> Result<JsonPathType<'b>, Error> {
        Ok(match self {
            FunctionExprArg::Literal(lit) => lit.into(),
            FunctionExprArg::SingularQuery(q) => match q.eval_query(current) {
                Some(n) => JsonPathType::Node(n.value()),
                None => JsonPathType::Nothing,
            },
            FunctionExprArg::FilterQuery(q) => {
                JsonPathType::Nodes(q.query(ctx, current, depth)?.into())
            }
            FunctionExprArg::LogicalExpr(l) => match l.test_filter(ctx, current, depth)? {
                true => JsonPathType::Logical(LogicalType::True),
                false => JsonPathType::Logical(LogicalType::False),
            },
            FunctionExprArg::FunctionExpr(f) => f.evaluate(ctx, current, depth)?,
        })
    }

    /// The [`JsonPathTypeKind`] this argument statically carries, used during validation
    pub(crate) fn as_type_kind(
        &self,
        registry: &crate::registry::FunctionRegistry,
    ) -> Result<JsonPathTypeKind, Error> {
        match self {
            FunctionExprArg::Literal(_) => Ok(JsonPathTypeKind::Value),
            FunctionExprArg::SingularQuery(_) => Ok(JsonPathTypeKind::Node),
            FunctionExprArg::FilterQuery(query) => {
                if query.is_singular() {
                    Ok(JsonPathTypeKind::Node)
                } else {
                    Ok(JsonPathTypeKind::Nodelist)
                }
            }
            FunctionExprArg::LogicalExpr(_) => Ok(JsonPathTypeKind::Logical),
            FunctionExprArg::FunctionExpr(func) => registry
                .get(&func.name)
                .map(|sig| sig.return_kind)
                .ok_or_else(|| Error::Name(func.name.clone())),
        }
    }
}

/// An error occurred while validating a function call
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FunctionValidationError {
    /// Mismatch in number of function arguments
    #[error("expected {expected} args, but received {received}")]
    NumberOfArgsMismatch {
        /// Expected number of arguments
        expected: usize,
        /// Received number of arguments
        received: usize,
    },
    /// The type of received argument does not match the function definition
    #[error("in argument position {position}, expected a type that converts to {expected}, received {received}")]
    MismatchTypeKind {
        /// Expected type
        expected: JsonPathTypeKind,
        /// Received type
        received: JsonPathTypeKind,
        /// Argument position
        position: usize,
    },
    /// A function whose declared return type is [`JsonPathTypeKind::Value`] was used directly as
    /// a filter's top-level expression
    #[error("function with incorrect return type used as a top-level filter expression")]
    IncorrectFunctionReturnType,
}

impl TestFilter for FunctionExpr {
    #[cfg_attr(
        feature = "trace",
        tracing::instrument(name = "Test Function Expr", level = "trace", parent = None, ret)
    )]
    fn test_filter<'b>(
        &self,
        ctx: &EvalContext,
        current: &Node<'b>,
        depth: usize,
    ) -> Result<bool, Error> {
        Ok(match self.evaluate(ctx, current, depth)? {
            JsonPathType::Nodes(nl) => !nl.is_empty(),
            JsonPathType::Value(v) => v.test_filter(ctx, current, depth)?,
            JsonPathType::Logical(l) => l.into(),
            JsonPathType::Node(n) => n.test_filter(ctx, current, depth)?,
            JsonPathType::Nothing => false,
        })
    }
}
