//! Evaluation context threaded through query execution
use std::cell::RefCell;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::registry::FunctionRegistry;

/// Per-query evaluation state threaded through every [`Queryable::query`][crate::spec::query::Queryable::query]
/// and [`TestFilter::test_filter`][crate::spec::selector::filter::TestFilter::test_filter] call
///
/// This is built once per call to [`Environment::find`][crate::environment::Environment::find] (or
/// [`CompiledQuery::find`][crate::environment::CompiledQuery::find]) and borrowed down through the
/// whole evaluation. It carries the function registry so [`FunctionExpr`][crate::spec::functions::FunctionExpr]
/// can resolve a call by name without the AST owning a reference to it, the recursion-depth limit
/// descendant segments are checked against, and, in nondeterministic mode, a seeded RNG used to
/// shuffle object-member traversal order.
pub struct EvalContext<'env> {
    pub(crate) registry: &'env FunctionRegistry,
    pub(crate) max_recursion_depth: usize,
    pub(crate) nondeterministic: bool,
    seed: Option<u64>,
    rng: RefCell<Option<StdRng>>,
}

impl<'env> EvalContext<'env> {
    pub(crate) fn new(
        registry: &'env FunctionRegistry,
        max_recursion_depth: usize,
        nondeterministic: bool,
        seed: Option<u64>,
    ) -> Self {
        Self {
            registry,
            max_recursion_depth,
            nondeterministic,
            seed,
            rng: RefCell::new(None),
        }
    }

    #[cfg(test)]
    pub(crate) fn seeded(registry: &'env FunctionRegistry, seed: u64) -> Self {
        Self {
            registry,
            max_recursion_depth: 100,
            nondeterministic: true,
            seed: Some(seed),
            rng: RefCell::new(None),
        }
    }

    /// Shuffle `items` in place if nondeterministic evaluation is enabled; a no-op otherwise
    pub(crate) fn shuffle<T>(&self, items: &mut [T]) {
        if !self.nondeterministic {
            return;
        }
        let mut guard = self.rng.borrow_mut();
        let rng = guard.get_or_insert_with(|| match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        });
        items.shuffle(rng);
    }
}
