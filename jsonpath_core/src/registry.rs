//! Runtime registration of JSONPath function extensions
//!
//! The IETF JSONPath specification defines `length`, `count`, `match`, `search`, and `value` as
//! function extensions usable in filter expressions. Rather than registering these at compile
//! time via a proc-macro and a global `inventory` collection, every [`Environment`][crate::environment::Environment]
//! owns its own [`FunctionRegistry`], seeded with the five built-ins, to which callers may add
//! their own functions with [`Environment::register_function`][crate::environment::Environment::register_function].
//! A [`FunctionExpr`][crate::spec::functions::FunctionExpr] resolves its implementation by name
//! from the registry at evaluation time, through [`EvalContext`][crate::context::EvalContext],
//! rather than caching it on the AST node.
use std::{collections::HashMap, sync::Arc};

use serde_json::{Number, Value};

use crate::{
    error::Error,
    iregexp,
    spec::functions::{
        FunctionExprArg, FunctionValidationError, JsonPathType, JsonPathTypeKind, NodesType,
    },
};

/// The implementation of a registered function: takes the evaluated arguments, in declared order,
/// and produces a result
pub type FunctionImpl =
    Arc<dyn for<'a> Fn(Vec<JsonPathType<'a>>) -> JsonPathType<'a> + Send + Sync>;

/// The declared signature and implementation of a registered function
#[derive(Clone)]
pub struct FunctionSignature {
    pub(crate) arg_kinds: Vec<JsonPathTypeKind>,
    pub(crate) return_kind: JsonPathTypeKind,
    pub(crate) implementation: FunctionImpl,
}

impl std::fmt::Debug for FunctionSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionSignature")
            .field("arg_kinds", &self.arg_kinds)
            .field("return_kind", &self.return_kind)
            .finish()
    }
}

/// A registry of named JSONPath function extensions
///
/// Built with [`FunctionRegistry::with_builtins`], which every [`Environment`][crate::environment::Environment]
/// starts from. Custom functions are added with [`FunctionRegistry::register`].
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionSignature>,
}

impl FunctionRegistry {
    /// An empty registry, with none of the standard functions defined
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// A registry seeded with the five function extensions defined by the specification:
    /// `length`, `count`, `match`, `search`, and `value`
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(
            "length",
            vec![JsonPathTypeKind::Value],
            JsonPathTypeKind::Value,
            length,
        );
        registry.register(
            "count",
            vec![JsonPathTypeKind::Nodelist],
            JsonPathTypeKind::Value,
            count,
        );
        registry.register(
            "match",
            vec![JsonPathTypeKind::Value, JsonPathTypeKind::Value],
            JsonPathTypeKind::Logical,
            match_fn,
        );
        registry.register(
            "search",
            vec![JsonPathTypeKind::Value, JsonPathTypeKind::Value],
            JsonPathTypeKind::Logical,
            search_fn,
        );
        registry.register(
            "value",
            vec![JsonPathTypeKind::Nodelist],
            JsonPathTypeKind::Value,
            value_fn,
        );
        registry
    }

    /// Register a function extension under `name`, overwriting any previous registration with
    /// the same name (including a built-in)
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        arg_kinds: Vec<JsonPathTypeKind>,
        return_kind: JsonPathTypeKind,
        implementation: F,
    ) where
        F: for<'a> Fn(Vec<JsonPathType<'a>>) -> JsonPathType<'a> + Send + Sync + 'static,
    {
        self.functions.insert(
            name.into(),
            FunctionSignature {
                arg_kinds,
                return_kind,
                implementation: Arc::new(implementation),
            },
        );
    }

    pub(crate) fn get(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    /// Check that a call to `name` with `args` is well-typed, returning the function's declared
    /// return kind on success
    pub(crate) fn validate_call(
        &self,
        name: &str,
        args: &[FunctionExprArg],
    ) -> Result<JsonPathTypeKind, Error> {
        let signature = self.get(name).ok_or_else(|| Error::Name(name.to_owned()))?;
        if args.len() != signature.arg_kinds.len() {
            return Err(Error::Type(FunctionValidationError::NumberOfArgsMismatch {
                expected: signature.arg_kinds.len(),
                received: args.len(),
            }));
        }
        for (position, (arg, expected)) in args.iter().zip(signature.arg_kinds.iter()).enumerate() {
            let received = arg.as_type_kind(self)?;
            if !received.converts_to(*expected) {
                return Err(Error::Type(FunctionValidationError::MismatchTypeKind {
                    expected: *expected,
                    received,
                    position,
                }));
            }
        }
        Ok(signature.return_kind)
    }
}

fn as_string(v: &JsonPathType) -> Option<String> {
    match v {
        JsonPathType::Value(Value::String(s)) => Some(s.clone()),
        JsonPathType::Node(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// `length(value)`: the length of a string (in Unicode scalar values), array, or object; nothing
/// for any other kind of value, per the specification
fn length<'a>(mut args: Vec<JsonPathType<'a>>) -> JsonPathType<'a> {
    let value = args.pop().and_then(|v| match v {
        JsonPathType::Value(v) => Some(v),
        JsonPathType::Node(v) => Some(v.clone()),
        _ => None,
    });
    match value {
        Some(Value::String(s)) => JsonPathType::Value(Number::from(s.chars().count()).into()),
        Some(Value::Array(a)) => JsonPathType::Value(Number::from(a.len()).into()),
        Some(Value::Object(o)) => JsonPathType::Value(Number::from(o.len()).into()),
        _ => JsonPathType::Nothing,
    }
}

/// `count(nodes)`: the number of nodes in a nodelist
///
/// A syntactically-singular argument (e.g. `count(@.a)`) parses as a bare query, not a nodelist,
/// so it evaluates to [`JsonPathType::Node`] or [`JsonPathType::Nothing`] rather than
/// [`JsonPathType::Nodes`]; [`NodesType`]'s conversion unpacks either of those into a one- or
/// zero-element nodelist the same way a syntactically-plural argument would.
fn count<'a>(mut args: Vec<JsonPathType<'a>>) -> JsonPathType<'a> {
    let nodes: NodesType<'a> = match args.remove(0).try_into() {
        Ok(nodes) => nodes,
        Err(_) => return JsonPathType::Value(Number::from(0u64).into()),
    };
    JsonPathType::Value(Number::from(nodes.into_inner().len()).into())
}

/// `match(string, pattern)`: whether the whole string matches the I-Regexp pattern
fn match_fn<'a>(args: Vec<JsonPathType<'a>>) -> JsonPathType<'a> {
    regex_fn(args, iregexp::compile_anchored)
}

/// `search(string, pattern)`: whether any substring of the string matches the I-Regexp pattern
fn search_fn<'a>(args: Vec<JsonPathType<'a>>) -> JsonPathType<'a> {
    regex_fn(args, iregexp::compile_unanchored)
}

fn regex_fn<'a>(
    args: Vec<JsonPathType<'a>>,
    compile: impl Fn(&str) -> Result<regex::Regex, crate::error::Error>,
) -> JsonPathType<'a> {
    let Some(s) = args.first().and_then(as_string) else {
        return JsonPathType::Logical(false.into());
    };
    let Some(pattern) = args.get(1).and_then(as_string) else {
        return JsonPathType::Logical(false.into());
    };
    match compile(&pattern) {
        Ok(re) => JsonPathType::Logical(re.is_match(&s).into()),
        Err(_) => JsonPathType::Logical(false.into()),
    }
}

/// `value(nodes)`: the value of the single node in a nodelist, or nothing if it does not contain
/// exactly one node
fn value_fn<'a>(mut args: Vec<JsonPathType<'a>>) -> JsonPathType<'a> {
    let nodes: NodesType<'a> = match args.remove(0).try_into() {
        Ok(nodes) => nodes,
        Err(_) => return JsonPathType::Nothing,
    };
    match nodes.into_inner().exactly_one() {
        Ok(node) => JsonPathType::Node(node.value()),
        Err(_) => JsonPathType::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_of_string_counts_scalar_values() {
        let result = length(vec![JsonPathType::Value(Value::String("foo".into()))]);
        assert!(matches!(result, JsonPathType::Value(Value::Number(n)) if n.as_u64() == Some(3)));
    }

    #[test]
    fn length_of_non_lengthable_is_nothing() {
        let result = length(vec![JsonPathType::Value(Value::Bool(true))]);
        assert!(matches!(result, JsonPathType::Nothing));
    }

    #[test]
    fn registry_validates_arity() {
        let registry = FunctionRegistry::with_builtins();
        let err = registry.validate_call("length", &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::Type(FunctionValidationError::NumberOfArgsMismatch {
                expected: 1,
                received: 0
            })
        ));
    }
}
