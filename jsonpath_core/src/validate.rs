//! The semantic validation pass run once by [`Environment::compile`][crate::environment::Environment::compile]
//!
//! Parsing (in the `jsonpath` crate) only checks grammar: a function call like `foo(@.bar)` is
//! accepted as a `FunctionExpr` regardless of whether `foo` is defined, because a function call's
//! syntax is unambiguous without knowing anything about the function. This module walks the fully
//! parsed [`Query`] exactly once, resolving every function call against a [`FunctionRegistry`] to
//! check it exists, has the right number of arguments, and that each argument's declared
//! [`JsonPathTypeKind`] converts to what the function expects -- filling in `FunctionExpr::return_type`
//! as it goes -- and additionally rejects a function whose declared return type is
//! [`JsonPathTypeKind::Value`] when it is used directly as a filter's top-level expression (such a
//! function can only ever produce a "nothing" or a value, neither of which is well-typed as a
//! boolean test on its own).
use crate::{
    error::Error,
    registry::FunctionRegistry,
    spec::{
        functions::{FunctionExpr, FunctionExprArg, FunctionValidationError},
        query::Query,
        segment::{QuerySegment, Segment},
        selector::{
            filter::{BasicExpr, Comparable, ComparisonExpr, Filter, LogicalAndExpr, LogicalOrExpr},
            Selector,
        },
    },
};

/// Validate every function call reachable from `query`, filling in return types as it goes
pub(crate) fn validate_query(query: &mut Query, registry: &FunctionRegistry) -> Result<(), Error> {
    for segment in &mut query.segments {
        validate_segment(segment, registry)?;
    }
    Ok(())
}

fn validate_segment(segment: &mut QuerySegment, registry: &FunctionRegistry) -> Result<(), Error> {
    match &mut segment.segment {
        Segment::LongHand(selectors) => {
            for selector in selectors {
                validate_selector(selector, registry)?;
            }
        }
        Segment::DotName(_) | Segment::Wildcard => {}
    }
    Ok(())
}

fn validate_selector(selector: &mut Selector, registry: &FunctionRegistry) -> Result<(), Error> {
    if let Selector::Filter(Filter(expr)) = selector {
        validate_logical_or(expr, registry)?;
    }
    Ok(())
}

fn validate_logical_or(expr: &mut LogicalOrExpr, registry: &FunctionRegistry) -> Result<(), Error> {
    for and_expr in &mut expr.0 {
        validate_logical_and(and_expr, registry)?;
    }
    Ok(())
}

fn validate_logical_and(expr: &mut LogicalAndExpr, registry: &FunctionRegistry) -> Result<(), Error> {
    for basic in &mut expr.0 {
        validate_basic(basic, registry)?;
    }
    Ok(())
}

fn validate_basic(expr: &mut BasicExpr, registry: &FunctionRegistry) -> Result<(), Error> {
    match expr {
        BasicExpr::Paren(inner) | BasicExpr::NotParen(inner) => validate_logical_or(inner, registry)?,
        BasicExpr::Relation(rel) => validate_comparison(rel, registry)?,
        BasicExpr::Exist(exist) | BasicExpr::NotExist(exist) => {
            for segment in &mut exist.0.segments {
                validate_segment(segment, registry)?;
            }
        }
        BasicExpr::FuncExpr(func) | BasicExpr::NotFuncExpr(func) => {
            validate_function_expr(func, registry)?;
            if func.return_type == crate::spec::functions::JsonPathTypeKind::Value {
                return Err(Error::Type(FunctionValidationError::IncorrectFunctionReturnType));
            }
        }
    }
    Ok(())
}

fn validate_comparison(expr: &mut ComparisonExpr, registry: &FunctionRegistry) -> Result<(), Error> {
    validate_comparable(&mut expr.left, registry)?;
    validate_comparable(&mut expr.right, registry)
}

fn validate_comparable(comparable: &mut Comparable, registry: &FunctionRegistry) -> Result<(), Error> {
    if let Comparable::FunctionExpr(func) = comparable {
        validate_function_expr(func, registry)?;
    }
    Ok(())
}

fn validate_function_expr(func: &mut FunctionExpr, registry: &FunctionRegistry) -> Result<(), Error> {
    for arg in &mut func.args {
        validate_function_arg(arg, registry)?;
    }
    func.return_type = registry.validate_call(&func.name, &func.args)?;
    Ok(())
}

fn validate_function_arg(arg: &mut FunctionExprArg, registry: &FunctionRegistry) -> Result<(), Error> {
    match arg {
        FunctionExprArg::Literal(_) | FunctionExprArg::SingularQuery(_) => {}
        FunctionExprArg::FilterQuery(query) => validate_query(query, registry)?,
        FunctionExprArg::LogicalExpr(expr) => validate_logical_or(expr, registry)?,
        FunctionExprArg::FunctionExpr(func) => validate_function_expr(func, registry)?,
    }
    Ok(())
}
