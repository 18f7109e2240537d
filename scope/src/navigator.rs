//! Seam between the synchronizer and whatever owns the browser location.

use std::collections::VecDeque;

use crate::params::strip_query_prefix;

/// Read and replace the current location's query string.
pub trait Navigator {
    /// Query string currently observable, without the leading `?`.
    fn location_query(&self) -> String;

    /// Replace (never push) the current history entry's query string.
    ///
    /// Implementations may apply the change asynchronously; the new query
    /// does not have to be visible through [`Navigator::location_query`]
    /// when this returns.
    fn replace_query(&mut self, query: &str);
}

/// In-memory location, used for headless rendering and tests.
///
/// In deferred mode replacements are queued until [`MemoryNavigator::settle`]
/// is called, which models a router that confirms writes on a later tick.
#[derive(Debug, Default, Clone)]
pub struct MemoryNavigator {
    current: String,
    queued: VecDeque<String>,
    deferred: bool,
    replace_count: usize,
}

impl MemoryNavigator {
    /// Navigator whose replacements take effect immediately.
    pub fn new(query: &str) -> Self {
        Self {
            current: strip_query_prefix(query).to_string(),
            ..Self::default()
        }
    }

    /// Navigator whose replacements wait for [`MemoryNavigator::settle`].
    pub fn deferred(query: &str) -> Self {
        Self {
            deferred: true,
            ..Self::new(query)
        }
    }

    /// External navigation (back/forward, pasted link). Drops nothing from
    /// the queue: a later `settle` can still overwrite this location.
    pub fn navigate(&mut self, query: &str) {
        self.current = strip_query_prefix(query).to_string();
    }

    /// Apply the oldest queued replacement. Returns false when none is queued.
    pub fn settle_one(&mut self) -> bool {
        match self.queued.pop_front() {
            Some(query) => {
                self.current = query;
                true
            }
            None => false,
        }
    }

    /// Apply every queued replacement in order.
    pub fn settle(&mut self) -> usize {
        let mut applied = 0;
        while self.settle_one() {
            applied += 1;
        }
        applied
    }

    /// Number of `replace_query` calls received so far.
    pub fn replace_count(&self) -> usize {
        self.replace_count
    }

    pub fn queued(&self) -> usize {
        self.queued.len()
    }
}

impl Navigator for MemoryNavigator {
    fn location_query(&self) -> String {
        self.current.clone()
    }

    fn replace_query(&mut self, query: &str) {
        self.replace_count += 1;
        let query = strip_query_prefix(query).to_string();
        if self.deferred {
            self.queued.push_back(query);
        } else {
            self.current = query;
        }
    }
}
