//! Ordered "first success wins" evaluation of extraction strategies.
//!
//! Every heuristic cascade in the extractors is a slice of [`Strategy`]
//! values run through [`first_success`], so precedence is visible in one
//! place and each tier can be tested on its own.

use crate::error::ExtractError;

type StrategyFn<'s, I, O> = dyn Fn(&I) -> Result<Option<O>, ExtractError> + 's;

/// One named tier of a cascade.
///
/// `Ok(None)` means "nothing here, try the next tier"; an `Err` is logged and
/// also falls through.
pub struct Strategy<'s, I: ?Sized, O> {
    pub name: &'static str,
    run: Box<StrategyFn<'s, I, O>>,
}

impl<'s, I: ?Sized, O> Strategy<'s, I, O> {
    pub fn new<F>(name: &'static str, run: F) -> Self
    where
        F: Fn(&I) -> Result<Option<O>, ExtractError> + 's,
    {
        Self {
            name,
            run: Box::new(run),
        }
    }

    pub fn run(&self, input: &I) -> Result<Option<O>, ExtractError> {
        (self.run)(input)
    }
}

/// Runs `strategies` in order and returns the first `Ok(Some(_))` together
/// with the name of the tier that produced it. Later tiers are never run.
pub fn first_success<I: ?Sized, O>(
    input: &I,
    strategies: &[Strategy<'_, I, O>],
) -> Option<(&'static str, O)> {
    for strategy in strategies {
        match strategy.run(input) {
            Ok(Some(found)) => {
                tracing::debug!(tier = strategy.name, "cascade tier matched");
                return Some((strategy.name, found));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(tier = strategy.name, error = %e, "cascade tier failed; trying next");
            }
        }
    }
    None
}

/// `Some(items)` when `items` is non-empty. Collection-valued tiers use this
/// so an empty result falls through to the next tier.
#[must_use]
pub fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
