//! Named word-phrase sets referenced from patterns as `<SET>name</SET>`.
//!
//! The graph only needs a membership predicate and each set's longest
//! phrase length; [`SetRegistry`] is that seam. [`SetCollection`] is the
//! in-memory registry backed by `DashMap`, so sets can be added while
//! graphs are being served.

use std::collections::HashSet;

use dashmap::DashMap;

/// Name of the built-in set matching any run of digits.
pub const NUMBER_SET: &str = "number";

/// Membership predicate over named sets.
///
/// Set names are compared lowercase; phrases are passed space-joined and
/// uppercase.
pub trait SetRegistry: Send + Sync {
    /// Whether `phrase` is a member of `set`.
    fn contains(&self, set: &str, phrase: &str) -> bool;

    /// Longest member phrase of `set` in words, or `None` if no such set.
    fn max_length(&self, set: &str) -> Option<usize>;

    /// Whether a set with this name is known.
    fn has_set(&self, set: &str) -> bool {
        self.max_length(set).is_some()
    }

    /// Every enumerable member of every set.
    fn all_members(&self) -> Vec<String>;
}

#[derive(Debug, Clone)]
enum Members {
    Listed(HashSet<String>),
    Digits,
}

/// One named set of phrases.
#[derive(Debug, Clone)]
pub struct WordSet {
    name: String,
    members: Members,
    max_length: usize,
}

impl WordSet {
    /// Build a set from phrases. Phrases are trimmed and uppercased.
    pub fn new<I, S>(name: &str, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let members: HashSet<String> = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_uppercase())
            .filter(|p| !p.is_empty())
            .collect();
        let max_length = members
            .iter()
            .map(|m| m.split(' ').count())
            .max()
            .unwrap_or(1);
        Self {
            name: name.to_lowercase(),
            members: Members::Listed(members),
            max_length,
        }
    }

    /// The `number` set: any single all-digit token.
    pub fn natural_numbers() -> Self {
        Self {
            name: NUMBER_SET.to_string(),
            members: Members::Digits,
            max_length: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn contains(&self, phrase: &str) -> bool {
        match &self.members {
            Members::Listed(members) => members.contains(phrase),
            Members::Digits => !phrase.is_empty() && phrase.bytes().all(|b| b.is_ascii_digit()),
        }
    }

    /// Enumerable members; empty for the digit set.
    pub fn members(&self) -> Vec<String> {
        match &self.members {
            Members::Listed(members) => members.iter().cloned().collect(),
            Members::Digits => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.members {
            Members::Listed(members) => members.len(),
            Members::Digits => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Concurrent in-memory set registry.
#[derive(Debug, Default)]
pub struct SetCollection {
    sets: DashMap<String, WordSet>,
}

impl SetCollection {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `number` set.
    pub fn with_builtins() -> Self {
        let sets = Self::new();
        sets.insert(WordSet::natural_numbers());
        sets
    }

    /// Add or replace a set.
    pub fn insert(&self, set: WordSet) {
        tracing::debug!(set = set.name(), members = set.len(), "registered set");
        self.sets.insert(set.name.clone(), set);
    }

    /// Remove a set by name.
    pub fn remove(&self, name: &str) -> Option<WordSet> {
        self.sets.remove(&name.to_lowercase()).map(|(_, s)| s)
    }

    pub fn get(&self, name: &str) -> Option<WordSet> {
        self.sets.get(&name.to_lowercase()).map(|s| s.value().clone())
    }

    /// Names of all registered sets.
    pub fn names(&self) -> Vec<String> {
        self.sets.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl SetRegistry for SetCollection {
    fn contains(&self, set: &str, phrase: &str) -> bool {
        self.sets
            .get(&set.to_lowercase())
            .is_some_and(|s| s.contains(phrase))
    }

    fn max_length(&self, set: &str) -> Option<usize> {
        self.sets.get(&set.to_lowercase()).map(|s| s.max_length())
    }

    fn all_members(&self) -> Vec<String> {
        self.sets.iter().flat_map(|s| s.members()).collect()
    }
}
