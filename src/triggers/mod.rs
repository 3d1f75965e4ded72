//! Trigger adapters
//!
//! Decide, when an item is rendered, whether the pager should load more.
//!
//! # Overview
//!
//! Triggers are stateless. Each one looks at the item that just appeared and
//! the full item list, checks that the target is loadable, and then asks it
//! for more data. The loadable check is advisory: the pager's own guard is
//! what keeps fetches single-flight.
//!
//! - `LastItem` - the last loaded item appeared
//! - `Threshold(n)` - an item within the last `n` appeared
//! - `Custom` - a caller-supplied predicate
//! - `Any` - any of several triggers

use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Predicate over (appeared item, all loaded items)
pub type TriggerFn<T> = Arc<dyn Fn(&T, &[T]) -> bool + Send + Sync>;

/// Something a trigger can ask for more data
pub trait LoadTarget {
    /// Advisory check: no fetch running, not finished, not failed
    fn is_loadable(&self) -> bool;

    /// Ask for the next page
    fn request_more(&self) -> Result<()>;
}

/// When an appearing item should trigger loading
pub enum Trigger<T> {
    /// The item is the last loaded item
    LastItem,
    /// The item's index is at least `count - max(1, n)`
    Threshold(usize),
    /// Caller-supplied predicate
    Custom(TriggerFn<T>),
    /// Any of the contained triggers
    Any(Vec<Trigger<T>>),
}

impl<T> Clone for Trigger<T> {
    fn clone(&self) -> Self {
        match self {
            Self::LastItem => Self::LastItem,
            Self::Threshold(n) => Self::Threshold(*n),
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
            Self::Any(triggers) => Self::Any(triggers.clone()),
        }
    }
}

impl<T> fmt::Debug for Trigger<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastItem => f.write_str("LastItem"),
            Self::Threshold(n) => write!(f, "Threshold({n})"),
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Any(triggers) => f.debug_tuple("Any").field(triggers).finish(),
        }
    }
}

impl<T> Default for Trigger<T> {
    fn default() -> Self {
        Self::LastItem
    }
}

impl<T> Trigger<T> {
    /// Fire on the last item
    pub fn last_item() -> Self {
        Self::LastItem
    }

    /// Fire within `n` items of the end
    pub fn threshold(n: usize) -> Self {
        Self::Threshold(n)
    }

    /// Fire when the predicate holds
    pub fn custom(predicate: impl Fn(&T, &[T]) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(predicate))
    }

    /// Fire when any of the triggers would
    pub fn any(triggers: Vec<Trigger<T>>) -> Self {
        Self::Any(triggers)
    }
}

impl<T: PartialEq> Trigger<T> {
    /// Evaluate the predicate alone, ignoring the target's state
    pub fn matches(&self, item: &T, items: &[T]) -> bool {
        match self {
            Self::LastItem => items.last() == Some(item),
            Self::Threshold(n) => {
                let start = items.len().saturating_sub((*n).max(1));
                items
                    .iter()
                    .position(|candidate| candidate == item)
                    .is_some_and(|index| index >= start)
            }
            Self::Custom(predicate) => predicate(item, items),
            Self::Any(triggers) => triggers.iter().any(|t| t.matches(item, items)),
        }
    }

    /// Ask the target for more data if it is loadable and the predicate holds
    ///
    /// Returns whether a request was sent.
    pub fn fire(&self, item: &T, items: &[T], target: &impl LoadTarget) -> Result<bool> {
        if !target.is_loadable() || !self.matches(item, items) {
            return Ok(false);
        }
        target.request_more()?;
        Ok(true)
    }
}
