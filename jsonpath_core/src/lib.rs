//! Core data model, AST, and evaluator for [RFC 9535][rfc] JSONPath queries
//!
//! This crate has no parser; it is built around an already-parsed [`spec::query::Query`] and
//! provides everything needed to validate and evaluate one: the node and normalized-path types
//! results are expressed in ([`node`], [`path`]), the filter-expression type system and function
//! extension registry ([`spec::functions`]), and the [`environment::Environment`] that ties it all
//! together into a compile-then-evaluate pipeline. The `jsonpath` crate builds a parser on top of
//! this crate's AST types.
//!
//! [rfc]: https://www.rfc-editor.org/rfc/rfc9535.html
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod environment;
pub mod error;
pub mod node;
pub mod path;
pub mod spec;

mod context;
mod iregexp;
mod registry;
mod validate;
