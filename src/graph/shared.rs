//! A graph that can learn new rules while it serves matches.
//!
//! One writer at a time holds the lock for the duration of a single
//! insertion or deletion; any number of readers match concurrently. Rule
//! bookkeeping touched by a match (activation counts, example inputs) is
//! already safe under a shared lock.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::category::Category;

use super::{GraphStats, Graphmaster, Match};

/// `Graphmaster` behind a single-writer, many-reader lock.
#[derive(Debug)]
pub struct SharedGraphmaster {
    inner: RwLock<Graphmaster>,
}

impl SharedGraphmaster {
    pub fn new(graph: Graphmaster) -> Self {
        Self {
            inner: RwLock::new(graph),
        }
    }

    /// Shared access for several reads under one lock.
    pub fn read(&self) -> RwLockReadGuard<'_, Graphmaster> {
        self.inner.read().expect("graph lock poisoned")
    }

    /// Exclusive access for batched mutation.
    pub fn write(&self) -> RwLockWriteGuard<'_, Graphmaster> {
        self.inner.write().expect("graph lock poisoned")
    }

    pub fn insert(&self, category: Arc<Category>) {
        self.write().insert(category);
    }

    pub fn add(&self, category: Category) -> Arc<Category> {
        self.write().add(category)
    }

    pub fn delete(&self, pattern: &str, that: &str, topic: &str) -> Option<Arc<Category>> {
        self.write().delete(pattern, that, topic)
    }

    pub fn delete_categories<'c>(
        &self,
        categories: impl IntoIterator<Item = &'c Arc<Category>>,
    ) -> usize {
        self.write().delete_categories(categories)
    }

    pub fn match_input(&self, input: &str, that: &str, topic: &str) -> Option<Match> {
        self.read().match_input(input, that, topic)
    }

    pub fn find_exact(&self, pattern: &str, that: &str, topic: &str) -> Option<Arc<Category>> {
        self.read().find_exact(pattern, that, topic)
    }

    pub fn exists(&self, pattern: &str, that: &str, topic: &str) -> bool {
        self.read().exists(pattern, that, topic)
    }

    pub fn categories(&self) -> Vec<Arc<Category>> {
        self.read().categories()
    }

    pub fn stats(&self) -> GraphStats {
        self.read().stats()
    }

    /// Swap in an empty graph with the same name, configuration and context,
    /// returning the categories the old one held.
    pub fn reset(&self) -> Vec<Arc<Category>> {
        let mut graph = self.write();
        let fresh = Graphmaster::with_context(
            graph.name.clone(),
            graph.config.clone(),
            Arc::clone(&graph.properties),
            Arc::clone(&graph.sets),
        );
        let old = std::mem::replace(&mut *graph, fresh);
        old.categories()
    }
}

impl From<Graphmaster> for SharedGraphmaster {
    fn from(graph: Graphmaster) -> Self {
        Self::new(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use std::thread;

    fn shared() -> SharedGraphmaster {
        Graphmaster::new("shared", GraphConfig::default()).into()
    }

    #[test]
    fn insert_and_match_through_lock() {
        let g = shared();
        let c = g.add(Category::new("HELLO", ""));
        assert!(g.exists("HELLO", "*", "*"));
        assert_eq!(g.match_input("hello", "x", "y").unwrap().category, c);
        assert_eq!(g.delete("HELLO", "*", "*"), Some(c));
        assert!(g.match_input("hello", "x", "y").is_none());
    }

    #[test]
    fn learn_while_matching() {
        let g = Arc::new(shared());
        let star = g.add(Category::new("*", ""));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let g = Arc::clone(&g);
                thread::spawn(move || {
                    for i in 0..200 {
                        let m = g.match_input(&format!("word{i}"), "x", "y");
                        assert!(m.is_some());
                    }
                })
            })
            .collect();
        let writer = {
            let g = Arc::clone(&g);
            thread::spawn(move || {
                for i in 0..200 {
                    g.add(Category::new(&format!("WORD{i}"), ""));
                }
            })
        };
        for r in readers {
            r.join().unwrap();
        }
        writer.join().unwrap();

        assert_eq!(g.categories().len(), 201);
        assert_ne!(g.match_input("word7", "x", "y").unwrap().category, star);
        // every match was counted, whichever rule it landed on
        let total: u64 = g.categories().iter().map(|c| c.activation_count()).sum();
        assert_eq!(total, 801);
    }

    #[test]
    fn reset_keeps_configuration() {
        let g = SharedGraphmaster::new(Graphmaster::new(
            "learned",
            GraphConfig::without_shortcuts(),
        ));
        g.add(Category::new("A", ""));
        g.add(Category::new("B", ""));
        let old = g.reset();
        assert_eq!(old.len(), 2);
        assert!(g.categories().is_empty());
        let graph = g.read();
        assert_eq!(graph.name(), "learned");
        assert!(!graph.config().enable_shortcuts);
    }
}
